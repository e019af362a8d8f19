use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One step of the data progression, ordered from smallest to largest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bit,
    Nibble,
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
    Terabyte,
    Petabyte,
}

pub const TIER_COUNT: usize = 8;

const KIB: f64 = 1024.0;

impl Tier {
    pub const ALL: [Tier; TIER_COUNT] = [
        Tier::Bit,
        Tier::Nibble,
        Tier::Byte,
        Tier::Kilobyte,
        Tier::Megabyte,
        Tier::Gigabyte,
        Tier::Terabyte,
        Tier::Petabyte,
    ];

    /// Bit-equivalent value of one unit of this tier.
    pub fn weight(self) -> f64 {
        match self {
            Self::Bit => 1.0,
            Self::Nibble => 4.0,
            Self::Byte => 8.0,
            Self::Kilobyte => 8.0 * KIB,
            Self::Megabyte => 8.0 * KIB * KIB,
            Self::Gigabyte => 8.0 * KIB * KIB * KIB,
            Self::Terabyte => 8.0 * KIB * KIB * KIB * KIB,
            Self::Petabyte => 8.0 * KIB * KIB * KIB * KIB * KIB,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bit => "bit",
            Self::Nibble => "nibble",
            Self::Byte => "byte",
            Self::Kilobyte => "kilobyte",
            Self::Megabyte => "megabyte",
            Self::Gigabyte => "gigabyte",
            Self::Terabyte => "terabyte",
            Self::Petabyte => "petabyte",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.name() == name)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|index| Self::ALL[index])
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierParseError {
    #[error("unknown resource tier '{0}'")]
    UnknownTier(String),
    #[error("malformed conversion key '{0}', expected '<from>_to_<to>'")]
    MalformedPair(String),
    #[error("conversion pair '{0}' converts a tier into itself")]
    SameTier(String),
}

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::from_name(&normalized)
            .or_else(|| normalized.strip_suffix('s').and_then(Self::from_name))
            .ok_or_else(|| TierParseError::UnknownTier(s.to_string()))
    }
}

/// An ordered `<from>_to_<to>` pair used as the key of automation tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ConversionPair {
    pub from: Tier,
    pub to: Tier,
}

pub const MAX_SUFFIX: &str = "_max";

impl ConversionPair {
    pub fn new(from: Tier, to: Tier) -> Result<Self, TierParseError> {
        if from == to {
            return Err(TierParseError::SameTier(format!("{from}_to_{to}")));
        }
        Ok(Self { from, to })
    }

    /// Key of the "convert everything" sub-toggle for this pair.
    pub fn max_key(self) -> String {
        format!("{self}{MAX_SUFFIX}")
    }
}

impl fmt::Display for ConversionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_to_{}", self.from, self.to)
    }
}

impl TryFrom<String> for ConversionPair {
    type Error = TierParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConversionPair> for String {
    fn from(pair: ConversionPair) -> Self {
        pair.to_string()
    }
}

impl FromStr for ConversionPair {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((from, to)) = s.trim().split_once("_to_") else {
            return Err(TierParseError::MalformedPair(s.to_string()));
        };
        Self::new(from.parse()?, to.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversionPair, Tier, TierParseError};

    #[test]
    fn weights_strictly_increase_with_tier_order() {
        for window in Tier::ALL.windows(2) {
            assert!(window[0] < window[1]);
            assert!(window[0].weight() < window[1].weight());
        }
        assert_eq!(Tier::Kilobyte.weight(), 8192.0);
    }

    #[test]
    fn names_round_trip_and_accept_plurals() {
        for tier in Tier::ALL {
            assert_eq!(tier.name().parse::<Tier>(), Ok(tier));
        }
        assert_eq!("Bits".parse::<Tier>(), Ok(Tier::Bit));
        assert_eq!("bytes".parse::<Tier>(), Ok(Tier::Byte));
        assert!(matches!(
            "word".parse::<Tier>(),
            Err(TierParseError::UnknownTier(_))
        ));
    }

    #[test]
    fn pair_keys_parse_and_render() {
        let pair: ConversionPair = "bit_to_nibble".parse().expect("valid pair");
        assert_eq!(pair.from, Tier::Bit);
        assert_eq!(pair.to, Tier::Nibble);
        assert_eq!(pair.to_string(), "bit_to_nibble");
        assert_eq!(pair.max_key(), "bit_to_nibble_max");

        assert!(matches!(
            "bit_nibble".parse::<ConversionPair>(),
            Err(TierParseError::MalformedPair(_))
        ));
        assert!(matches!(
            "byte_to_byte".parse::<ConversionPair>(),
            Err(TierParseError::SameTier(_))
        ));
    }

    #[test]
    fn neighbours_follow_the_progression() {
        assert_eq!(Tier::Bit.previous(), None);
        assert_eq!(Tier::Nibble.previous(), Some(Tier::Bit));
        assert_eq!(Tier::Petabyte.next(), None);
        assert_eq!(Tier::Terabyte.next(), Some(Tier::Petabyte));
    }
}
