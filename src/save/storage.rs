use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::Simulation;

use super::{SaveData, apply_save_data, load_from_json_string, save_to_json_string};

/// Persistence collaborator: one save slot.
pub trait SaveStorage: Send + Sync {
    fn load(&self) -> Result<Option<SaveData>>;
    fn save(&mut self, data: &SaveData) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStorage for FileStorage {
    fn load(&self) -> Result<Option<SaveData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading save file: {}", self.path.display()))?;
        load_from_json_string(&raw)
            .with_context(|| format!("failed loading save file: {}", self.path.display()))
            .map(Some)
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        let json = save_to_json_string(data)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, json)
            .with_context(|| format!("failed writing save file: {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("failed replacing save file: {}", self.path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed removing save file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Keeps the serialized save in memory; used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Option<String>,
}

impl MemoryStorage {
    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }
}

impl SaveStorage for MemoryStorage {
    fn load(&self) -> Result<Option<SaveData>> {
        self.slot
            .as_deref()
            .map(load_from_json_string)
            .transpose()
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        self.slot = Some(save_to_json_string(data)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.slot = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored; the simulation starts fresh.
    Fresh,
    Restored,
    /// The stored save was unreadable or corrupt and has been wiped.
    Reset,
}

/// Restores the stored save into `sim`, falling back to a full reset when
/// the save cannot be used.
pub fn load_or_reset(sim: &mut Simulation, storage: &mut dyn SaveStorage) -> Result<LoadOutcome> {
    let save = match storage.load() {
        Ok(Some(save)) => save,
        Ok(None) => return Ok(LoadOutcome::Fresh),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "stored save is unreadable, resetting");
            return reset_storage(sim, storage);
        }
    };
    match apply_save_data(sim, &save) {
        Ok(()) => {
            info!("save loaded");
            Ok(LoadOutcome::Restored)
        }
        Err(err) => {
            warn!(error = %err, "incomplete save detected, resetting");
            reset_storage(sim, storage)
        }
    }
}

fn reset_storage(sim: &mut Simulation, storage: &mut dyn SaveStorage) -> Result<LoadOutcome> {
    sim.reset();
    storage.clear().context("failed clearing corrupt save")?;
    Ok(LoadOutcome::Reset)
}
