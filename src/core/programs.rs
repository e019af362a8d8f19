use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::data::ProgramDefinition;
use crate::model::{Effect, Tier};

use super::effects::{EffectContext, apply_effect_logged};
use super::error::ProgramError;
use super::resource_store::ResourceStore;

#[derive(Debug, Clone, PartialEq)]
pub struct RunningProgram {
    pub key: String,
    pub name: String,
    /// Whole seconds left; `None` once a permanent program is active.
    pub time_remaining: Option<u32>,
    pub total_duration: Option<u32>,
    pub effect: Effect,
    pub locked: BTreeMap<Tier, f64>,
    pub permanent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramStatus {
    Running { remaining: u32, total: u32 },
    Active,
}

/// Display view of one running program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSummary {
    pub key: String,
    pub name: String,
    pub status: ProgramStatus,
    pub locked: BTreeMap<Tier, f64>,
}

/// Gates checked before a program may start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchLimits {
    /// Concurrent program slots, at least one.
    pub capacity: u32,
    /// Prestige currency the program's schema requires.
    pub unlock_threshold: f64,
}

/// Timed and permanent programs, at most one entry per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramExecutor {
    running: Vec<RunningProgram>,
}

impl ProgramExecutor {
    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.running.iter().any(|program| program.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&RunningProgram> {
        self.running.iter().find(|program| program.key == key)
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }

    /// Starts `definition`, debiting its cycle cost and locking its
    /// collateral. Permanent programs apply their effect straight away.
    pub fn run(
        &mut self,
        ctx: &mut EffectContext<'_>,
        definition: &ProgramDefinition,
        limits: LaunchLimits,
    ) -> Result<(), ProgramError> {
        let capacity = limits.capacity.max(1);
        if self.running.len() >= capacity as usize {
            return Err(ProgramError::CapacityReached(capacity));
        }
        let meta = &ctx.state.meta;
        if meta.prestige_currency < limits.unlock_threshold {
            return Err(ProgramError::Locked(definition.name.clone()));
        }
        if self.is_running(&definition.key) {
            return Err(ProgramError::AlreadyRunning(definition.name.clone()));
        }
        if meta.prestige_currency < definition.cost {
            return Err(ProgramError::InsufficientCycles {
                name: definition.name.clone(),
                cost: definition.cost,
            });
        }
        let resources = &ctx.state.resources;
        if let Some((&tier, _)) = definition
            .data_required
            .iter()
            .find(|&(&tier, &amount)| !resources.can_afford(tier, amount))
        {
            return Err(ProgramError::InsufficientCollateral {
                name: definition.name.clone(),
                tier,
            });
        }

        ctx.state.meta.prestige_currency -= definition.cost;
        let mut locked = BTreeMap::new();
        for (&tier, &amount) in &definition.data_required {
            if ctx.state.resources.try_spend(tier, amount) {
                locked.insert(tier, amount);
            }
        }

        let duration = if definition.permanent {
            None
        } else {
            definition.duration
        };
        self.running.push(RunningProgram {
            key: definition.key.clone(),
            name: definition.name.clone(),
            time_remaining: duration,
            total_duration: duration,
            effect: definition.effect.clone(),
            locked,
            permanent: definition.permanent,
        });
        info!(program = %definition.key, permanent = definition.permanent, "program started");

        if definition.permanent {
            apply_effect_logged(ctx, &definition.key, &definition.effect);
        }
        Ok(())
    }

    /// Advances every timed program by one second and applies the effects of
    /// those that finish. Returns the keys that completed.
    pub fn tick_second(&mut self, ctx: &mut EffectContext<'_>) -> Vec<String> {
        let mut finished = Vec::new();
        self.running.retain_mut(|program| {
            let Some(remaining) = program.time_remaining.as_mut() else {
                return true;
            };
            *remaining = remaining.saturating_sub(1);
            if *remaining > 0 {
                return true;
            }
            finished.push((program.key.clone(), program.effect.clone()));
            false
        });

        finished
            .into_iter()
            .map(|(key, effect)| {
                apply_effect_logged(ctx, &key, &effect);
                info!(program = %key, "program completed");
                key
            })
            .collect()
    }

    /// Stops a timed program and returns the collateral it had locked.
    pub fn cancel(
        &mut self,
        key: &str,
        resources: &mut ResourceStore,
    ) -> Result<BTreeMap<Tier, f64>, ProgramError> {
        let index = self
            .running
            .iter()
            .position(|program| program.key == key)
            .ok_or_else(|| ProgramError::NotRunning(key.to_string()))?;
        if self.running[index].permanent {
            return Err(ProgramError::Permanent(self.running[index].name.clone()));
        }

        let program = self.running.remove(index);
        for (&tier, &amount) in &program.locked {
            resources.add(tier, amount);
        }
        info!(program = %key, "program cancelled, collateral refunded");
        debug!(refunded = ?program.locked);
        Ok(program.locked)
    }

    pub fn summaries(&self) -> Vec<ProgramSummary> {
        self.running
            .iter()
            .map(|program| ProgramSummary {
                key: program.key.clone(),
                name: program.name.clone(),
                status: match (program.time_remaining, program.total_duration) {
                    (Some(remaining), Some(total)) => ProgramStatus::Running { remaining, total },
                    _ => ProgramStatus::Active,
                },
                locked: program.locked.clone(),
            })
            .collect()
    }
}
