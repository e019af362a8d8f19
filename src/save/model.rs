use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ConversionPair, Tier};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaveGeneration {
    pub click_counter: u32,
    pub conversion_counts: BTreeMap<Tier, u64>,
}

/// Player-facing automation choices and persisted system stats. Everything
/// derived from owned upgrades is rebuilt by replay instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSystems {
    pub revealed_tiers: Vec<Tier>,
    /// `"<from>_to_<to>"` and `"<from>_to_<to>_max"` toggle values.
    pub auto_convert_toggles: BTreeMap<String, bool>,
    pub auto_trade_batches: BTreeMap<ConversionPair, u64>,
    pub global_multiplier: f64,
    pub global_conversion_speed: f64,
    pub unlocks: Vec<String>,
}

impl Default for SaveSystems {
    fn default() -> Self {
        Self {
            revealed_tiers: vec![Tier::Bit],
            auto_convert_toggles: BTreeMap::new(),
            auto_trade_batches: BTreeMap::new(),
            global_multiplier: 1.0,
            global_conversion_speed: crate::core::DEFAULT_CONVERSION_SPEED,
            unlocks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveMeta {
    pub prestige_currency: f64,
    pub total_cycles: f64,
    pub computing_prestige_count: u32,
    pub processing_power: u32,
    pub speed: f64,
    pub memory: u32,
    pub storage_slots: u32,
    pub computing_unlocked: bool,
    pub passive_yield: BTreeMap<Tier, f64>,
    pub installed_parts: Vec<String>,
}

impl Default for SaveMeta {
    fn default() -> Self {
        let meta = crate::core::MetaState::default();
        Self {
            prestige_currency: meta.prestige_currency,
            total_cycles: meta.total_cycles,
            computing_prestige_count: meta.computing_prestige_count,
            processing_power: meta.processing_power,
            speed: meta.speed,
            memory: meta.memory,
            storage_slots: meta.storage_slots,
            computing_unlocked: meta.computing_unlocked,
            passive_yield: meta.passive_yield,
            installed_parts: meta.installed_parts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    /// Keyed by tier name; every tier must be present.
    pub resources: BTreeMap<String, f64>,
    pub upgrades: Vec<String>,
    pub generation: SaveGeneration,
    pub systems: SaveSystems,
    pub meta: SaveMeta,
    pub paused: bool,
    pub total_ticks: u64,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            resources: Tier::ALL
                .into_iter()
                .map(|tier| (tier.name().to_string(), 0.0))
                .collect(),
            upgrades: Vec::new(),
            generation: SaveGeneration::default(),
            systems: SaveSystems::default(),
            meta: SaveMeta::default(),
            paused: false,
            total_ticks: 0,
        }
    }
}
