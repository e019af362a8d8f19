use serde::{Deserialize, Serialize};

use crate::model::{Effect, Tier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDataFile {
    #[serde(default)]
    pub tiers: Vec<TierSchema>,
}

/// A tier's reveal threshold and the upgrades priced in that tier's currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSchema {
    pub tier: Tier,
    pub name: String,
    /// Balance of the previous tier needed to reveal this one.
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub upgrades: Vec<UpgradeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub cost: f64,
    pub effect: Effect,
}
