use tracing::{info, warn};

use crate::core::{ProgramStatus, Simulation};
use crate::save::{
    SaveStorage, apply_save_data, export_to_base64, import_save, save_data_from_simulation,
};

use super::command::Command;

/// What the host should do after printing the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleAction {
    #[default]
    None,
    Clear,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsoleReply {
    pub lines: Vec<String>,
    pub action: ConsoleAction,
}

impl ConsoleReply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            action: ConsoleAction::None,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            action: ConsoleAction::None,
        }
    }

    fn action(action: ConsoleAction, text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            action,
        }
    }
}

const HELP: &[&str] = &[
    "clear: Clears the terminal",
    "close or exit: Closes the terminal",
    "help: Lists commands",
    "list programs: Lists available programs",
    "run <program>: Runs chosen program",
    "stop <program>: Stops chosen program execution",
    "status: Shows running programs",
    "compute prestige: Spend cycles to permanently increase all computing stats",
    "stats: Shows the ledger, multiplier and prestige preview",
    "click: Generates bits by hand",
    "convert [max] <from> <to>: Converts one unit, or every affordable unit",
    "buy <upgrade>: Purchases an upgrade",
    "upgrades: Lists upgrades of revealed tiers",
    "toggle <from> <to> [max]: Flips an auto-conversion toggle",
    "recompile: Trades all data for cycles",
    "parts / install <part> / uninstall <part>: Manages the rig",
    "save / export / import <base64>: Persistence",
    "pause / resume: Stops or restarts the simulation clock",
    "reset confirm: Wipes all progress",
];

const COMPUTING_LOCKED: &str =
    "Computing is locked. Compile 50 total cycles to access programs.";

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Parses and executes a console line.
pub fn execute_line(
    sim: &mut Simulation,
    storage: &mut dyn SaveStorage,
    line: &str,
) -> ConsoleReply {
    match line.parse::<Command>() {
        Ok(command) => execute(sim, storage, command),
        Err(err) => ConsoleReply::line(err.to_string()),
    }
}

pub fn execute(sim: &mut Simulation, storage: &mut dyn SaveStorage, command: Command) -> ConsoleReply {
    let needs_computing = matches!(
        command,
        Command::Run(_)
            | Command::Stop(_)
            | Command::Status
            | Command::ListPrograms
            | Command::ComputePrestige
    );
    if needs_computing && !sim.state.meta.computing_unlocked {
        return ConsoleReply::line(COMPUTING_LOCKED);
    }

    match command {
        Command::Help => ConsoleReply::lines(HELP.iter().map(|line| line.to_string()).collect()),
        Command::Clear => ConsoleReply::action(ConsoleAction::Clear, "[terminal ready]"),
        Command::Exit => ConsoleReply::action(ConsoleAction::Exit, "Exiting terminal..."),
        Command::Status => status(sim),
        Command::Stats => stats(sim),
        Command::ListPrograms => list_programs(sim),
        Command::Run(key) => match sim.run_program(&key) {
            Ok(()) => {
                let name = sim.programs.get(&key).map_or(key.as_str(), |p| p.name.as_str());
                ConsoleReply::line(format!("Running \"{name}\"..."))
            }
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Stop(key) => {
            let name = sim.programs.get(&key).map(|program| program.name.clone());
            match (sim.stop_program(&key), name) {
                (Ok(_), Some(name)) => ConsoleReply::line(format!("Stopped program: \"{name}\"")),
                (Ok(_), None) => ConsoleReply::line(format!("Stopped program: \"{key}\"")),
                (Err(err), _) => ConsoleReply::line(err.to_string()),
            }
        }
        Command::ComputePrestige => match sim.compute_prestige() {
            Ok(cost) => ConsoleReply::line(format!(
                "Computing Prestige! All computing stats increased by 1. ({} cycles spent)",
                format_amount(cost)
            )),
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Click => {
            let gained = sim.generate_bit();
            ConsoleReply::line(format!("+{} bits", format_amount(gained)))
        }
        Command::Convert { from, to, max } => {
            let result = if max {
                sim.manual_convert_max(from, to)
            } else {
                sim.manual_convert(from, to)
            };
            match result {
                Ok(receipt) => ConsoleReply::line(format!(
                    "Converted {} {from}s into {} {to}s",
                    format_amount(receipt.spent),
                    format_amount(receipt.gained)
                )),
                Err(err) => ConsoleReply::line(err.to_string()),
            }
        }
        Command::Buy(key) => match sim.purchase_upgrade(&key) {
            Ok(()) => ConsoleReply::line(format!("Purchased {key}")),
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Upgrades => upgrades(sim),
        Command::Toggle { pair, max } => match sim.toggle_auto_convert(pair, max) {
            Ok(value) => {
                let label = if max { pair.max_key() } else { pair.to_string() };
                let state = if value { "on" } else { "off" };
                ConsoleReply::line(format!("{label}: {state}"))
            }
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Recompile => match sim.recompile() {
            Ok(outcome) => {
                let mut lines = vec![format!(
                    "Recompiled and gained {} Cycles! Global boost increased.",
                    format_amount(outcome.awarded())
                )];
                if outcome.computing_unlocked {
                    lines.push("Computing unlocked! You can now access advanced programs.".to_string());
                }
                ConsoleReply::lines(lines)
            }
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Install(id) => match sim.install_part(&id) {
            Ok(()) => ConsoleReply::line(format!("Installed {id}")),
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Uninstall(id) => match sim.uninstall_part(&id) {
            Ok(()) => ConsoleReply::line(format!("Uninstalled {id}")),
            Err(err) => ConsoleReply::line(err.to_string()),
        },
        Command::Parts => parts(sim),
        Command::Save => match storage.save(&save_data_from_simulation(sim)) {
            Ok(()) => ConsoleReply::line("Game saved."),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "manual save failed");
                ConsoleReply::line(format!("Save failed: {err}"))
            }
        },
        Command::Export => match export_to_base64(&save_data_from_simulation(sim)) {
            Ok(encoded) => ConsoleReply::line(encoded),
            Err(err) => ConsoleReply::line(format!("Export failed: {err}")),
        },
        Command::Import(payload) => {
            let imported = import_save(&payload).and_then(|save| {
                apply_save_data(sim, &save)?;
                storage.save(&save)
            });
            match imported {
                Ok(()) => ConsoleReply::line("Save imported successfully!"),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "import failed");
                    ConsoleReply::line("Failed to import save. Invalid format.")
                }
            }
        }
        Command::Pause => {
            sim.paused = true;
            ConsoleReply::line("Simulation paused.")
        }
        Command::Resume => {
            sim.paused = false;
            ConsoleReply::line("Simulation resumed.")
        }
        Command::Reset { confirmed: false } => {
            ConsoleReply::line("This will wipe everything. Type 'reset confirm' to proceed.")
        }
        Command::Reset { confirmed: true } => {
            sim.reset();
            if let Err(err) = storage.clear() {
                warn!(error = %format!("{err:#}"), "failed clearing save after reset");
            }
            info!("progress wiped from console");
            ConsoleReply::line("All progress wiped.")
        }
    }
}

fn status(sim: &Simulation) -> ConsoleReply {
    let summaries = sim.programs.summaries();
    if summaries.is_empty() {
        return ConsoleReply::line("(no running programs)");
    }
    ConsoleReply::lines(
        summaries
            .into_iter()
            .map(|summary| match summary.status {
                ProgramStatus::Running { remaining, .. } => {
                    format!("[{}] {remaining}s left", summary.name)
                }
                ProgramStatus::Active => format!("[{}] Permanent", summary.name),
            })
            .collect(),
    )
}

fn stats(sim: &Simulation) -> ConsoleReply {
    let snapshot = sim.snapshot();
    let mut lines = snapshot
        .resources
        .iter()
        .filter(|(tier, _)| snapshot.revealed_tiers.contains(tier))
        .map(|(tier, amount)| {
            format!(
                "{tier}: {} ({:+.2}/tick)",
                format_amount(*amount),
                snapshot.tick_deltas.get(*tier)
            )
        })
        .collect::<Vec<_>>();
    lines.push(format!("Multiplier: x{:.2}", snapshot.global_multiplier));
    lines.push(format!(
        "Cycles: {} (next recompile +{}, {:.0}% to next cycle)",
        format_amount(snapshot.prestige_currency),
        snapshot.prestige_preview,
        snapshot.cycle_progress.fraction() * 100.0
    ));
    lines.push(format!(
        "Rig: processing {} | speed {:.2}x | memory {} MB | slots {}",
        snapshot.stats.processing_power,
        snapshot.stats.speed,
        snapshot.stats.memory,
        snapshot.stats.storage_slots
    ));
    if snapshot.paused {
        lines.push("(paused)".to_string());
    }
    ConsoleReply::lines(lines)
}

fn list_programs(sim: &Simulation) -> ConsoleReply {
    let catalog = sim.catalog();
    let cycles = sim.state.meta.prestige_currency;
    let mut lines = Vec::new();
    for schema in catalog.schemas() {
        if cycles < schema.unlock_threshold {
            continue;
        }
        for program in schema.programs.iter().filter_map(|key| catalog.program(key)) {
            let mut cost = format!("Cycles: {}", format_amount(program.cost));
            for (tier, amount) in &program.data_required {
                cost.push_str(&format!(", {} {tier}", format_amount(*amount)));
            }
            let detail = match program.duration {
                _ if program.permanent => "Permanent effect".to_string(),
                Some(seconds) => format!("Duration: {seconds}s"),
                None => String::new(),
            };
            lines.push(format!("{}: {} [{cost}] - {detail}", program.key, program.name));
        }
    }
    if lines.is_empty() {
        lines.push("(no programs unlocked)".to_string());
    }
    ConsoleReply::lines(lines)
}

fn upgrades(sim: &Simulation) -> ConsoleReply {
    let lines = sim
        .catalog()
        .upgrades_in_tier_order()
        .filter(|(tier, _)| sim.state.automation.is_revealed(*tier))
        .map(|(tier, upgrade)| {
            let mark = if sim.state.owned_upgrades.contains(&upgrade.key) {
                "x"
            } else {
                " "
            };
            format!(
                "[{mark}] {} ({} {tier}): {}",
                upgrade.key,
                format_amount(upgrade.cost),
                upgrade.description
            )
        })
        .collect();
    ConsoleReply::lines(lines)
}

fn parts(sim: &Simulation) -> ConsoleReply {
    let meta = &sim.state.meta;
    let mut lines = vec![format!(
        "Slots: {}/{}",
        meta.installed_parts.len(),
        meta.storage_slots
    )];
    for part in sim.catalog().parts() {
        let installed = meta.installed_parts.contains(&part.id);
        lines.push(format!(
            "{} {}: {} - {}",
            if installed { "*" } else { "-" },
            part.id,
            part.name,
            part.description
        ));
    }
    ConsoleReply::lines(lines)
}
