mod effect;
mod tier;

pub use effect::{Effect, FeatureFlag};
pub use tier::{ConversionPair, MAX_SUFFIX, TIER_COUNT, Tier, TierParseError};
