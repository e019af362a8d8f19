use std::str::FromStr;

use thiserror::Error;

use crate::model::{ConversionPair, Tier, TierParseError};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Exit,
    Status,
    Stats,
    ListPrograms,
    Run(String),
    Stop(String),
    ComputePrestige,
    Click,
    Convert { from: Tier, to: Tier, max: bool },
    Buy(String),
    Upgrades,
    Toggle { pair: ConversionPair, max: bool },
    Recompile,
    Install(String),
    Uninstall(String),
    Parts,
    Save,
    Export,
    Import(String),
    Pause,
    Resume,
    Reset { confirmed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: \"{0}\"")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Tier(#[from] TierParseError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let words = line.split_whitespace().collect::<Vec<_>>();
        let command = match words.as_slice() {
            ["help"] => Self::Help,
            ["clear"] => Self::Clear,
            ["exit"] | ["close"] | ["quit"] => Self::Exit,
            ["status"] => Self::Status,
            ["stats"] => Self::Stats,
            ["list", "programs"] => Self::ListPrograms,
            ["run", key] => Self::Run((*key).to_string()),
            ["run", ..] => return Err(CommandError::Usage("run <program>")),
            ["stop", key] => Self::Stop((*key).to_string()),
            ["stop", ..] => return Err(CommandError::Usage("stop <program>")),
            ["compute", "prestige"] => Self::ComputePrestige,
            ["click"] => Self::Click,
            ["convert", "max", from, to] => Self::Convert {
                from: from.parse()?,
                to: to.parse()?,
                max: true,
            },
            ["convert", from, to] => Self::Convert {
                from: from.parse()?,
                to: to.parse()?,
                max: false,
            },
            ["convert", ..] => return Err(CommandError::Usage("convert [max] <from> <to>")),
            ["buy", key] => Self::Buy((*key).to_string()),
            ["buy", ..] => return Err(CommandError::Usage("buy <upgrade>")),
            ["upgrades"] => Self::Upgrades,
            ["toggle", from, to] => Self::Toggle {
                pair: ConversionPair::new(from.parse()?, to.parse()?)?,
                max: false,
            },
            ["toggle", from, to, "max"] => Self::Toggle {
                pair: ConversionPair::new(from.parse()?, to.parse()?)?,
                max: true,
            },
            ["toggle", ..] => return Err(CommandError::Usage("toggle <from> <to> [max]")),
            ["recompile"] => Self::Recompile,
            ["install", id] => Self::Install((*id).to_string()),
            ["uninstall", id] => Self::Uninstall((*id).to_string()),
            ["parts"] => Self::Parts,
            ["save"] => Self::Save,
            ["export"] => Self::Export,
            ["import", payload] => Self::Import((*payload).to_string()),
            ["import", ..] => return Err(CommandError::Usage("import <base64>")),
            ["pause"] => Self::Pause,
            ["resume"] => Self::Resume,
            ["reset"] => Self::Reset { confirmed: false },
            ["reset", "confirm"] => Self::Reset { confirmed: true },
            _ => return Err(CommandError::Unknown(line.to_string())),
        };
        Ok(command)
    }
}
