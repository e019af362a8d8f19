use std::fmt;

use serde::{Deserialize, Serialize};

use super::tier::{ConversionPair, Tier};

/// Boolean generation features that upgrades can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    /// Every fifth manual click grants a burst of bits.
    ClickBonus,
    /// Held nibbles add to the bit generation multiplier.
    NibbleBoost,
    /// Held bytes add a logarithmic bonus to the prestige preview.
    ByteBonus,
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClickBonus => "click_bonus",
            Self::NibbleBoost => "nibble_boost",
            Self::ByteBonus => "byte_bonus",
        };
        f.write_str(name)
    }
}

/// Declarative state mutation carried by an upgrade or a program.
///
/// Effects are interpreted by a single dispatcher in `core::effects`; the
/// catalog files describe them with an internal `kind` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    AddManualGain {
        amount: f64,
    },
    ScaleManualGain {
        factor: f64,
    },
    AddBitGeneration {
        amount: f64,
    },
    ScaleBitGeneration {
        factor: f64,
    },
    AutoConvert {
        pair: ConversionPair,
    },
    /// Overwrites the conversion yield multiplier of `target`.
    BonusYield {
        target: Tier,
        bonus: f64,
    },
    GlobalMultiplierBoost {
        amount: f64,
    },
    ToggleFeature {
        flag: FeatureFlag,
    },
    UnlockConvertMax {
        pair: ConversionPair,
    },
    UnlockAutoMax {
        pair: ConversionPair,
    },
    AutoTrade {
        pair: ConversionPair,
        batch: u64,
    },
    /// Adds `log2(held + 1) * rate` to the global multiplier every tick.
    ScalingBoost {
        resource: Tier,
        rate: f64,
    },
    /// Grants `reward` of `bonus` each time conversions into `from` cross a
    /// multiple of `per_amount`.
    ConversionBonus {
        from: Tier,
        bonus: Tier,
        per_amount: u64,
        reward: f64,
    },
    PassiveGenerate {
        resource: Tier,
        amount: f64,
    },
    RecompileBonus {
        cycles: f64,
    },
    GlobalSpeedBoost {
        factor: f64,
    },
    UnlockSystem {
        flag: String,
    },
    AddPassiveYield {
        resource: Tier,
        amount: f64,
    },
    TemporaryBoost {
        factor: f64,
        seconds: u32,
    },
}
