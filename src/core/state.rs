use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ConversionPair, FeatureFlag, TIER_COUNT, Tier};

use super::resource_store::ResourceStore;

pub const DEFAULT_CONVERSION_SPEED: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    pub manual_gain: f64,
    pub bit_gen_amount: f64,
    pub click_counter: u32,
    pub flags: BTreeSet<FeatureFlag>,
    /// Completed conversions, counted by target tier.
    pub conversion_counts: [u64; TIER_COUNT],
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            manual_gain: 1.0,
            bit_gen_amount: 0.0,
            click_counter: 0,
            flags: BTreeSet::new(),
            conversion_counts: [0; TIER_COUNT],
        }
    }
}

impl GenerationState {
    pub fn flag(&self, flag: FeatureFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn conversion_count(&self, tier: Tier) -> u64 {
        self.conversion_counts[tier.index()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoConvertToggle {
    pub enabled: bool,
    /// Convert every affordable unit; honoured only when the pair is unlocked.
    pub max: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutomationState {
    pub auto_convert: BTreeMap<ConversionPair, AutoConvertToggle>,
    pub auto_convert_max_unlocked: BTreeSet<ConversionPair>,
    pub convert_max_unlocked: BTreeSet<ConversionPair>,
    pub auto_trade_batches: BTreeMap<ConversionPair, u64>,
    pub conversion_bonuses: BTreeMap<Tier, f64>,
    pub global_multiplier: f64,
    /// Sum of flat multiplier boosts from owned upgrades.
    pub flat_multiplier_bonus: f64,
    pub global_conversion_speed: f64,
    pub revealed_tiers: BTreeSet<Tier>,
    pub unlocks: BTreeSet<String>,
    /// Cycles added on top of the next successful recompile.
    pub recompile_bonus: f64,
}

impl Default for AutomationState {
    fn default() -> Self {
        Self {
            auto_convert: BTreeMap::new(),
            auto_convert_max_unlocked: BTreeSet::new(),
            convert_max_unlocked: BTreeSet::new(),
            auto_trade_batches: BTreeMap::new(),
            conversion_bonuses: BTreeMap::new(),
            global_multiplier: 1.0,
            flat_multiplier_bonus: 0.0,
            global_conversion_speed: DEFAULT_CONVERSION_SPEED,
            revealed_tiers: BTreeSet::from([Tier::Bit]),
            unlocks: BTreeSet::new(),
            recompile_bonus: 0.0,
        }
    }
}

impl AutomationState {
    pub fn conversion_bonus(&self, target: Tier) -> f64 {
        self.conversion_bonuses.get(&target).copied().unwrap_or(1.0)
    }

    pub fn is_revealed(&self, tier: Tier) -> bool {
        self.revealed_tiers.contains(&tier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaState {
    pub prestige_currency: f64,
    pub total_cycles: f64,
    pub computing_prestige_count: u32,
    pub processing_power: u32,
    pub speed: f64,
    pub memory: u32,
    pub storage_slots: u32,
    pub computing_unlocked: bool,
    /// Flat amounts credited once per second, installed by programs.
    pub passive_yield: BTreeMap<Tier, f64>,
    pub installed_parts: Vec<String>,
}

impl Default for MetaState {
    fn default() -> Self {
        Self {
            prestige_currency: 0.0,
            total_cycles: 0.0,
            computing_prestige_count: 0,
            processing_power: 0,
            speed: 1.0,
            memory: 16,
            storage_slots: 1,
            computing_unlocked: false,
            passive_yield: BTreeMap::new(),
            installed_parts: Vec::new(),
        }
    }
}

/// Everything that survives a reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub resources: ResourceStore,
    pub generation: GenerationState,
    pub automation: AutomationState,
    pub meta: MetaState,
    pub owned_upgrades: BTreeSet<String>,
}
