use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{AutomationState, MetaState, Simulation};
use crate::model::{ConversionPair, MAX_SUFFIX, Tier};

use super::{SAVE_VERSION, SaveData, SaveGeneration, SaveMeta, SaveSystems};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("save is corrupt: missing resource '{0}'")]
    Corrupt(Tier),
    #[error("save version {0} is newer than supported version {SAVE_VERSION}")]
    UnsupportedVersion(u32),
}

pub fn save_data_from_simulation(sim: &Simulation) -> SaveData {
    let state = &sim.state;
    let automation = &state.automation;
    let meta = &state.meta;

    let mut auto_convert_toggles = BTreeMap::new();
    for (pair, toggle) in &automation.auto_convert {
        auto_convert_toggles.insert(pair.to_string(), toggle.enabled);
        auto_convert_toggles.insert(pair.max_key(), toggle.max);
    }

    SaveData {
        version: SAVE_VERSION,
        resources: state
            .resources
            .iter()
            .map(|(tier, amount)| (tier.name().to_string(), amount))
            .collect(),
        upgrades: state.owned_upgrades.iter().cloned().collect(),
        generation: SaveGeneration {
            click_counter: state.generation.click_counter,
            conversion_counts: Tier::ALL
                .into_iter()
                .map(|tier| (tier, state.generation.conversion_count(tier)))
                .filter(|&(_, count)| count > 0)
                .collect(),
        },
        systems: SaveSystems {
            revealed_tiers: automation.revealed_tiers.iter().copied().collect(),
            auto_convert_toggles,
            auto_trade_batches: automation.auto_trade_batches.clone(),
            global_multiplier: automation.global_multiplier,
            global_conversion_speed: automation.global_conversion_speed,
            unlocks: automation.unlocks.iter().cloned().collect(),
        },
        meta: SaveMeta {
            prestige_currency: meta.prestige_currency,
            total_cycles: meta.total_cycles,
            computing_prestige_count: meta.computing_prestige_count,
            processing_power: meta.processing_power,
            speed: meta.speed,
            memory: meta.memory,
            storage_slots: meta.storage_slots,
            computing_unlocked: meta.computing_unlocked,
            passive_yield: meta.passive_yield.clone(),
            installed_parts: meta.installed_parts.clone(),
        },
        paused: sim.paused,
        total_ticks: sim.tick_index,
    }
}

/// Resets `sim` and restores `save` into it, rebuilding upgrade-derived state
/// by replaying owned upgrades. `sim` is untouched when the save is rejected.
pub fn apply_save_data(sim: &mut Simulation, save: &SaveData) -> Result<(), SaveError> {
    if save.version > SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion(save.version));
    }
    if let Some(missing) = Tier::ALL
        .into_iter()
        .find(|tier| !save.resources.contains_key(tier.name()))
    {
        return Err(SaveError::Corrupt(missing));
    }
    for key in save.resources.keys() {
        if Tier::from_name(key).is_none() {
            warn!(resource = %key, "ignoring unknown resource in save");
        }
    }

    sim.reset();
    let state = &mut sim.state;
    for tier in Tier::ALL {
        let amount = save.resources.get(tier.name()).copied().unwrap_or(0.0);
        state.resources.set(tier, amount);
    }
    restore_meta(&mut state.meta, &save.meta);
    state.owned_upgrades = save.upgrades.iter().cloned().collect();
    state.generation.click_counter = save.generation.click_counter;
    for (&tier, &count) in &save.generation.conversion_counts {
        state.generation.conversion_counts[tier.index()] = count;
    }
    let automation = &mut state.automation;
    automation.revealed_tiers.extend(save.systems.revealed_tiers.iter().copied());
    automation.unlocks = save.systems.unlocks.iter().cloned().collect();

    sim.replay_owned_upgrades();

    let automation = &mut sim.state.automation;
    overlay_toggles(automation, &save.systems.auto_convert_toggles);
    for (&pair, &batch) in &save.systems.auto_trade_batches {
        if batch > 0 {
            automation.auto_trade_batches.insert(pair, batch);
        }
    }
    let systems = &save.systems;
    if systems.global_multiplier.is_finite() && systems.global_multiplier > 0.0 {
        automation.global_multiplier = systems.global_multiplier;
    }
    if systems.global_conversion_speed.is_finite() && systems.global_conversion_speed > 0.0 {
        automation.global_conversion_speed = systems.global_conversion_speed;
    }
    sim.tick_index = save.total_ticks;
    sim.paused = save.paused;
    info!(
        upgrades = sim.state.owned_upgrades.len(),
        cycles = sim.state.meta.prestige_currency,
        "save restored"
    );
    Ok(())
}

fn restore_meta(meta: &mut MetaState, saved: &SaveMeta) {
    meta.prestige_currency = non_negative(saved.prestige_currency);
    meta.total_cycles = non_negative(saved.total_cycles);
    meta.computing_prestige_count = saved.computing_prestige_count;
    meta.processing_power = saved.processing_power;
    meta.speed = non_negative(saved.speed);
    meta.memory = saved.memory;
    meta.storage_slots = saved.storage_slots.max(1);
    meta.computing_unlocked = saved.computing_unlocked;
    meta.passive_yield = saved
        .passive_yield
        .iter()
        .filter(|&(_, &amount)| amount.is_finite() && amount > 0.0)
        .map(|(&tier, &amount)| (tier, amount))
        .collect();
    meta.installed_parts = saved.installed_parts.clone();
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Applies saved toggle choices on top of the replayed automation. Pairs the
/// owned upgrades do not unlock are ignored.
fn overlay_toggles(automation: &mut AutomationState, toggles: &BTreeMap<String, bool>) {
    for (key, &value) in toggles {
        let (base, max) = match key.strip_suffix(MAX_SUFFIX) {
            Some(base) => (base, true),
            None => (key.as_str(), false),
        };
        let pair = match base.parse::<ConversionPair>() {
            Ok(pair) => pair,
            Err(err) => {
                warn!(toggle = %key, error = %err, "ignoring malformed toggle in save");
                continue;
            }
        };
        if max && !automation.auto_convert_max_unlocked.contains(&pair) {
            debug!(%pair, "auto-max toggle saved without its unlock");
            continue;
        }
        let Some(toggle) = automation.auto_convert.get_mut(&pair) else {
            debug!(%pair, "auto-convert toggle saved without its upgrade");
            continue;
        };
        if max {
            toggle.max = value;
        } else {
            toggle.enabled = value;
        }
    }
}
