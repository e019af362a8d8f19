use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::{PartDataFile, ProgramDataFile, UpgradeDataFile};

pub const UPGRADES_FILE_NAME: &str = "upgrades.json";
pub const PROGRAMS_FILE_NAME: &str = "programs.json";
pub const PARTS_FILE_NAME: &str = "parts.json";

const BUNDLED_UPGRADES: &str = include_str!("../../assets/data/upgrades.json");
const BUNDLED_PROGRAMS: &str = include_str!("../../assets/data/programs.json");
const BUNDLED_PARTS: &str = include_str!("../../assets/data/parts.json");

pub fn bundled_upgrade_data() -> Result<UpgradeDataFile> {
    parse_json(BUNDLED_UPGRADES, "bundled upgrade data")
}

pub fn bundled_program_data() -> Result<ProgramDataFile> {
    parse_json(BUNDLED_PROGRAMS, "bundled program data")
}

pub fn bundled_part_data() -> Result<PartDataFile> {
    parse_json(BUNDLED_PARTS, "bundled part data")
}

pub fn load_upgrade_data_from_path(path: impl AsRef<Path>) -> Result<UpgradeDataFile> {
    read_json(path.as_ref(), "upgrade data")
}

pub fn load_program_data_from_path(path: impl AsRef<Path>) -> Result<ProgramDataFile> {
    read_json(path.as_ref(), "program data")
}

pub fn load_part_data_from_path(path: impl AsRef<Path>) -> Result<PartDataFile> {
    read_json(path.as_ref(), "part data")
}

fn read_json<T>(path: &Path, label: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {label} file: {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing {label} file as JSON: {}", path.display()))
}

fn parse_json<T>(raw: &str, label: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(raw).with_context(|| format!("failed parsing {label} as JSON"))
}
