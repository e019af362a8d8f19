use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use bevy::prelude::*;
use memory_ascension::data::Catalog;
use memory_ascension::save::{FileStorage, LoadOutcome, load_or_reset};
use memory_ascension::Simulation;
use tracing::{error, info, warn};

use super::resources::{ConsoleInput, RuntimeConfig, SessionState};
use super::state::{AppPhase, SimRunState};

pub fn bootstrap_session(
    mut commands: Commands,
    config: Res<RuntimeConfig>,
    mut next_phase: ResMut<NextState<AppPhase>>,
    mut next_run_state: ResMut<NextState<SimRunState>>,
    mut exit: EventWriter<AppExit>,
) {
    let catalog = match &config.data_dir {
        Some(dir) => Catalog::from_dir(dir),
        None => Catalog::bundled(),
    };
    let catalog = match catalog {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            error!("failed to load game data: {err:#}");
            exit.send(AppExit::error());
            return;
        }
    };

    let mut simulation = Simulation::new(catalog).with_tick_millis(config.tick_millis());
    let mut storage = FileStorage::new(&config.save_path);
    match load_or_reset(&mut simulation, &mut storage) {
        Ok(LoadOutcome::Restored) => info!(path = %storage.path().display(), "save restored"),
        Ok(LoadOutcome::Reset) => {
            warn!(path = %storage.path().display(), "save was unreadable, starting over")
        }
        Ok(LoadOutcome::Fresh) => info!("starting a new game"),
        Err(err) => warn!("could not access save storage: {err:#}"),
    }

    next_run_state.set(if simulation.paused {
        SimRunState::Paused
    } else {
        SimRunState::Running
    });

    commands.insert_resource(SessionState {
        simulation,
        storage: Box::new(storage),
        tick_timer: Timer::from_seconds(config.tick_seconds(), TimerMode::Repeating),
        autosave_timer: Timer::from_seconds(
            config.auto_save_interval_seconds.max(1.0),
            TimerMode::Repeating,
        ),
        last_save_error: None,
    });

    next_phase.set(AppPhase::InGame);
}

pub fn spawn_console_reader(mut commands: Commands) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    commands.insert_resource(ConsoleInput {
        lines: receiver,
        closed: false,
    });
    println!("[terminal ready] type 'help' for commands");
}
