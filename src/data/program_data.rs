use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Effect, Tier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDataFile {
    #[serde(default)]
    pub schemas: Vec<ProgramSchema>,
    #[serde(default)]
    pub programs: Vec<ProgramDefinition>,
}

/// A group of programs that unlocks together once enough cycles are held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSchema {
    pub key: String,
    pub name: String,
    pub unlock_threshold: f64,
    #[serde(default)]
    pub programs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDefinition {
    pub key: String,
    pub name: String,
    /// Prestige currency spent at start.
    pub cost: f64,
    /// Collateral locked for the duration of the run.
    #[serde(default)]
    pub data_required: BTreeMap<Tier, f64>,
    /// Seconds; `None` for permanent programs.
    #[serde(default)]
    pub duration: Option<u32>,
    pub effect: Effect,
    #[serde(default)]
    pub permanent: bool,
}
