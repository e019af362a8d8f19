use thiserror::Error;

use crate::model::{ConversionPair, Tier, TierParseError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidKey(#[from] TierParseError),
    #[error("invalid conversion rate from {from} to {to}")]
    InvalidRate { from: Tier, to: Tier },
    #[error("conversion amount {0} must be positive")]
    InvalidAmount(f64),
    #[error("not enough {tier}s to convert (required {required}, available {available})")]
    Insufficient {
        tier: Tier,
        required: f64,
        available: f64,
    },
    #[error("convert max is locked for {0}")]
    ConvertMaxLocked(ConversionPair),
    #[error("auto-conversion is not available for {0}")]
    AutoConvertLocked(ConversionPair),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    #[error("unknown upgrade '{0}'")]
    Unknown(String),
    #[error("upgrade '{0}' is already owned")]
    AlreadyOwned(String),
    #[error("the {0} tier has not been revealed yet")]
    TierLocked(Tier),
    #[error("not enough {tier}s to purchase {key} (cost {cost})")]
    Insufficient { key: String, tier: Tier, cost: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgramError {
    #[error("program not found: \"{0}\"")]
    Unknown(String),
    #[error("you can only run {0} programs at a time (processing power)")]
    CapacityReached(u32),
    #[error("\"{0}\" has not been unlocked yet")]
    Locked(String),
    #[error("\"{0}\" is already running")]
    AlreadyRunning(String),
    #[error("you need {cost} cycles to run \"{name}\"")]
    InsufficientCycles { name: String, cost: f64 },
    #[error("not enough {tier}s to allocate for \"{name}\"")]
    InsufficientCollateral { name: String, tier: Tier },
    #[error("no running program found with key: \"{0}\"")]
    NotRunning(String),
    #[error("\"{0}\" is permanent and cannot be stopped")]
    Permanent(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrestigeError {
    #[error("not enough data to compile a new cycle")]
    NothingToCompile,
    #[error("not enough cycles, computing prestige requires {cost} cycles")]
    InsufficientCycles { cost: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RigError {
    #[error("unknown part '{0}'")]
    Unknown(String),
    #[error("part '{0}' is already installed")]
    AlreadyInstalled(String),
    #[error("part '{0}' is not installed")]
    NotInstalled(String),
    #[error("all {0} storage slots are occupied")]
    NoFreeSlot(u32),
}

/// Failure raised while interpreting an effect; logged and swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("effect parameter {name} = {value} is out of range")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("conversion bonus interval must be positive")]
    ZeroInterval,
}
