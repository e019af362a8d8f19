use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::Catalog;
use crate::model::{ConversionPair, Effect, FeatureFlag, Tier};

use super::conversion::{Conversion, ConversionReceipt, affordable_units, conversion_rate};
use super::effects::{EffectContext, TemporaryBoost, apply_effect_logged};
use super::error::{ConversionError, PrestigeError, ProgramError, PurchaseError, RigError};
use super::hooks::PassiveHookRegistry;
use super::prestige::{self, CycleProgress, MULTIPLIER_PER_CYCLE, RecompileOutcome};
use super::programs::{LaunchLimits, ProgramExecutor, ProgramSummary};
use super::resource_store::TickDeltas;
use super::rig::{self, RigStats};
use super::state::GameState;

pub const DEFAULT_TICK_MILLIS: u64 = 100;
const MILLIS_PER_SECOND: u64 = 1000;
/// Manual clicks needed for the click bonus burst.
const CLICK_BONUS_EVERY: u32 = 5;
const CLICK_BONUS_BITS: f64 = 5.0;
const NIBBLE_BOOST_RATE: f64 = 0.001;
/// Prestige currency required before kilobytes can be revealed.
const KILOBYTE_REVEAL_CYCLES: f64 = 50.0;

/// Upgrade effect committed by a purchase and applied at the next drain.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEffect {
    pub source: String,
    pub effect: Effect,
}

/// Pull-based view for display collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick_index: u64,
    pub paused: bool,
    pub resources: Vec<(Tier, f64)>,
    /// Net change per tier since the start of the last tick.
    pub tick_deltas: TickDeltas,
    pub revealed_tiers: Vec<Tier>,
    pub global_multiplier: f64,
    pub conversion_speed: f64,
    pub prestige_preview: u64,
    pub cycle_progress: CycleProgress,
    pub prestige_currency: f64,
    pub total_cycles: f64,
    pub computing_unlocked: bool,
    pub stats: RigStats,
    pub programs: Vec<ProgramSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub state: GameState,
    pub hooks: PassiveHookRegistry,
    pub programs: ProgramExecutor,
    pub boosts: Vec<TemporaryBoost>,
    pub paused: bool,
    pub tick_index: u64,
    pending_effects: VecDeque<PendingEffect>,
    catalog: Arc<Catalog>,
    tick_millis: u64,
    /// Milliseconds accumulated toward the next logical second.
    elapsed_millis: u64,
}

impl Simulation {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            state: GameState::default(),
            hooks: PassiveHookRegistry::default(),
            programs: ProgramExecutor::default(),
            boosts: Vec::new(),
            paused: false,
            tick_index: 0,
            pending_effects: VecDeque::new(),
            catalog,
            tick_millis: DEFAULT_TICK_MILLIS,
            elapsed_millis: 0,
        }
    }

    /// Sets how much wall time one call to [`Simulation::tick`] represents.
    pub fn with_tick_millis(mut self, tick_millis: u64) -> Self {
        self.tick_millis = tick_millis.clamp(1, MILLIS_PER_SECOND);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tick_millis(&self) -> u64 {
        self.tick_millis
    }

    pub fn pending_effects(&self) -> usize {
        self.pending_effects.len()
    }

    pub fn tick(&mut self) {
        self.state.resources.begin_tick();
        if self.paused {
            return;
        }

        self.tick_index += 1;

        self.flush_pending_effects();
        self.recalculate_global_multiplier();
        self.process_auto_generation();
        self.process_auto_conversions();
        self.process_auto_trades();

        self.elapsed_millis += self.tick_millis;
        while self.elapsed_millis >= MILLIS_PER_SECOND {
            self.elapsed_millis -= MILLIS_PER_SECOND;
            self.advance_second();
        }

        self.reveal_tiers();
    }

    /// Applies every deferred purchase effect in commit order.
    pub fn flush_pending_effects(&mut self) {
        while let Some(pending) = self.pending_effects.pop_front() {
            let mut ctx = EffectContext {
                state: &mut self.state,
                hooks: &mut self.hooks,
                boosts: &mut self.boosts,
            };
            apply_effect_logged(&mut ctx, &pending.source, &pending.effect);
        }
    }

    fn recalculate_global_multiplier(&mut self) {
        let automation = &mut self.state.automation;
        automation.global_multiplier = 1.0
            + self.state.meta.prestige_currency * MULTIPLIER_PER_CYCLE
            + automation.flat_multiplier_bonus;
        self.hooks.run(&mut self.state);
    }

    /// Global multiplier plus the held-nibble term when nibble boost is on.
    fn generation_multiplier(&self) -> f64 {
        let mut multiplier = self.state.automation.global_multiplier;
        if self.state.generation.flag(FeatureFlag::NibbleBoost) {
            multiplier += self.state.resources.get(Tier::Nibble) * NIBBLE_BOOST_RATE;
        }
        multiplier
    }

    fn process_auto_generation(&mut self) {
        let speed_factor = self.effective_stats().speed_factor();
        let boost: f64 = self.boosts.iter().map(|boost| boost.factor).product();
        let amount =
            self.state.generation.bit_gen_amount * self.generation_multiplier() * speed_factor * boost;
        self.state.resources.add(Tier::Bit, amount);
    }

    fn process_auto_conversions(&mut self) {
        let enabled = self
            .state
            .automation
            .auto_convert
            .iter()
            .filter(|(_, toggle)| toggle.enabled)
            .map(|(pair, toggle)| (*pair, toggle.max))
            .collect::<Vec<_>>();

        for (pair, wants_max) in enabled {
            let automation = &self.state.automation;
            let rate = conversion_rate(pair.from, pair.to);
            let available = affordable_units(&self.state.resources, pair.from, rate);
            if available == 0 {
                continue;
            }
            let units = if wants_max && automation.auto_convert_max_unlocked.contains(&pair) {
                available
            } else {
                1
            };
            debug!(%pair, units, "auto-converting");
            let conversion = Conversion::new(pair.from, pair.to, units as f64)
                .with_bonus(automation.conversion_bonus(pair.to))
                .with_multiplier(automation.global_multiplier);
            // Rejections are already logged by the engine.
            let _ = conversion.apply(&mut self.state.resources, &mut self.state.generation);
        }
    }

    fn process_auto_trades(&mut self) {
        let resources = &mut self.state.resources;
        for (pair, &batch) in &self.state.automation.auto_trade_batches {
            let batch = batch.max(1) as f64;
            let batches = (resources.get(pair.from) / batch).floor();
            if batches < 1.0 {
                continue;
            }
            if resources.try_spend(pair.from, batches * batch) {
                resources.add(pair.to, batches);
                debug!(%pair, batches, "auto-trade executed");
            }
        }
    }

    /// One logical second: boost countdown, program countdown, passive yield.
    fn advance_second(&mut self) {
        self.boosts.retain_mut(|boost| {
            boost.remaining_seconds = boost.remaining_seconds.saturating_sub(1);
            boost.remaining_seconds > 0
        });

        let mut ctx = EffectContext {
            state: &mut self.state,
            hooks: &mut self.hooks,
            boosts: &mut self.boosts,
        };
        self.programs.tick_second(&mut ctx);

        let state = &mut self.state;
        for (&tier, &amount) in &state.meta.passive_yield {
            state.resources.add(tier, amount);
        }
    }

    fn reveal_tiers(&mut self) {
        let automation = &mut self.state.automation;
        for tier in Tier::ALL {
            if automation.is_revealed(tier) {
                continue;
            }
            let Some(previous) = tier.previous() else {
                continue;
            };
            if !automation.is_revealed(previous) {
                break;
            }
            let threshold = self.catalog.reveal_threshold(tier).unwrap_or(f64::INFINITY);
            let gated = tier == Tier::Kilobyte
                && self.state.meta.prestige_currency < KILOBYTE_REVEAL_CYCLES;
            if gated || self.state.resources.get(previous) < threshold {
                break;
            }
            automation.revealed_tiers.insert(tier);
            info!(%tier, "tier revealed");
        }
    }

    /// Manual click. Returns the bits credited.
    pub fn generate_bit(&mut self) -> f64 {
        let generation = &mut self.state.generation;
        generation.click_counter += 1;
        let multiplier = self.generation_multiplier();
        let generation = &mut self.state.generation;
        let mut gained = 0.0;
        if generation.flag(FeatureFlag::ClickBonus) && generation.click_counter >= CLICK_BONUS_EVERY {
            gained += CLICK_BONUS_BITS * multiplier;
            generation.click_counter = 0;
        }
        gained += generation.manual_gain * multiplier;
        self.state.resources.add(Tier::Bit, gained);
        self.reveal_tiers();
        gained
    }

    /// Converts exactly one unit of `to`.
    pub fn manual_convert(
        &mut self,
        from: Tier,
        to: Tier,
    ) -> Result<ConversionReceipt, ConversionError> {
        let pair = ConversionPair::new(from, to)?;
        self.convert_units(pair, 1)
    }

    /// Converts every affordable unit in one diminished batch.
    pub fn manual_convert_max(
        &mut self,
        from: Tier,
        to: Tier,
    ) -> Result<ConversionReceipt, ConversionError> {
        let pair = ConversionPair::new(from, to)?;
        if !self.state.automation.convert_max_unlocked.contains(&pair) {
            return Err(ConversionError::ConvertMaxLocked(pair));
        }
        let rate = conversion_rate(from, to);
        let units = affordable_units(&self.state.resources, from, rate);
        self.convert_units(pair, units)
    }

    fn convert_units(
        &mut self,
        pair: ConversionPair,
        units: u64,
    ) -> Result<ConversionReceipt, ConversionError> {
        let rate = conversion_rate(pair.from, pair.to);
        if units == 0 || !self.state.resources.can_afford(pair.from, rate) {
            return Err(ConversionError::Insufficient {
                tier: pair.from,
                required: rate,
                available: self.state.resources.get(pair.from),
            });
        }
        let automation = &self.state.automation;
        let receipt = Conversion::new(pair.from, pair.to, units as f64)
            .with_bonus(automation.conversion_bonus(pair.to))
            .with_multiplier(automation.global_multiplier)
            .apply(&mut self.state.resources, &mut self.state.generation)?;
        self.reveal_tiers();
        Ok(receipt)
    }

    /// Flips the auto-conversion toggle of `pair` (or its max sub-toggle) and
    /// returns the new value.
    pub fn toggle_auto_convert(
        &mut self,
        pair: ConversionPair,
        max: bool,
    ) -> Result<bool, ConversionError> {
        let automation = &mut self.state.automation;
        if max && !automation.auto_convert_max_unlocked.contains(&pair) {
            return Err(ConversionError::ConvertMaxLocked(pair));
        }
        let toggle = automation
            .auto_convert
            .get_mut(&pair)
            .ok_or(ConversionError::AutoConvertLocked(pair))?;
        let value = if max {
            toggle.max = !toggle.max;
            toggle.max
        } else {
            toggle.enabled = !toggle.enabled;
            toggle.enabled
        };
        debug!(%pair, max, value, "auto-convert toggled");
        Ok(value)
    }

    /// Debits the upgrade cost and queues its effect for the next drain.
    pub fn purchase_upgrade(&mut self, key: &str) -> Result<(), PurchaseError> {
        let catalog = Arc::clone(&self.catalog);
        let (tier, upgrade) = catalog
            .upgrade(key)
            .ok_or_else(|| PurchaseError::Unknown(key.to_string()))?;
        if self.state.owned_upgrades.contains(key) {
            return Err(PurchaseError::AlreadyOwned(key.to_string()));
        }
        if !self.state.automation.is_revealed(tier) {
            return Err(PurchaseError::TierLocked(tier));
        }
        if !self.state.resources.try_spend(tier, upgrade.cost) {
            return Err(PurchaseError::Insufficient {
                key: key.to_string(),
                tier,
                cost: upgrade.cost,
            });
        }

        self.state.owned_upgrades.insert(upgrade.key.clone());
        self.pending_effects.push_back(PendingEffect {
            source: upgrade.key.clone(),
            effect: upgrade.effect.clone(),
        });
        info!(upgrade = %key, %tier, cost = upgrade.cost, "upgrade purchased");
        Ok(())
    }

    /// Re-applies the effect of every owned upgrade, in tier order, straight
    /// away. Unknown keys are dropped from the owned set.
    pub fn replay_owned_upgrades(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let unknown = self
            .state
            .owned_upgrades
            .iter()
            .filter(|key| catalog.upgrade(key).is_none())
            .cloned()
            .collect::<Vec<_>>();
        for key in unknown {
            warn!(upgrade = %key, "dropping unknown owned upgrade");
            self.state.owned_upgrades.remove(&key);
        }

        for (_, upgrade) in catalog.upgrades_in_tier_order() {
            if !self.state.owned_upgrades.contains(&upgrade.key) {
                continue;
            }
            let mut ctx = EffectContext {
                state: &mut self.state,
                hooks: &mut self.hooks,
                boosts: &mut self.boosts,
            };
            apply_effect_logged(&mut ctx, &upgrade.key, &upgrade.effect);
        }
    }

    pub fn effective_stats(&self) -> RigStats {
        rig::effective_stats(&self.state.meta, &self.catalog)
    }

    pub fn run_program(&mut self, key: &str) -> Result<(), ProgramError> {
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog
            .program(key)
            .ok_or_else(|| ProgramError::Unknown(key.to_string()))?;
        let limits = LaunchLimits {
            capacity: self.effective_stats().program_capacity(),
            unlock_threshold: catalog
                .schema_for_program(key)
                .map_or(0.0, |schema| schema.unlock_threshold),
        };
        let mut ctx = EffectContext {
            state: &mut self.state,
            hooks: &mut self.hooks,
            boosts: &mut self.boosts,
        };
        self.programs.run(&mut ctx, definition, limits)
    }

    pub fn stop_program(&mut self, key: &str) -> Result<BTreeMap<Tier, f64>, ProgramError> {
        self.programs.cancel(key, &mut self.state.resources)
    }

    pub fn prestige_preview(&self) -> u64 {
        prestige::calculate_prestige(&self.state)
    }

    pub fn cycle_progress(&self) -> CycleProgress {
        prestige::cycle_progress(self.state.resources.weighted_total())
    }

    pub fn recompile(&mut self) -> Result<RecompileOutcome, PrestigeError> {
        let outcome = prestige::recompile(&mut self.state, &mut self.hooks)?;
        self.pending_effects.clear();
        Ok(outcome)
    }

    pub fn compute_prestige(&mut self) -> Result<f64, PrestigeError> {
        prestige::compute_prestige(&mut self.state)
    }

    pub fn install_part(&mut self, id: &str) -> Result<(), RigError> {
        rig::install_part(&mut self.state.meta, &self.catalog, id)
    }

    pub fn uninstall_part(&mut self, id: &str) -> Result<(), RigError> {
        rig::uninstall_part(&mut self.state.meta, id)
    }

    /// Discards all progress, including prestige.
    pub fn reset(&mut self) {
        *self = Self::new(Arc::clone(&self.catalog)).with_tick_millis(self.tick_millis);
        info!("game reset");
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        Snapshot {
            tick_index: self.tick_index,
            paused: self.paused,
            resources: state.resources.iter().collect(),
            tick_deltas: state.resources.tick_deltas,
            revealed_tiers: state.automation.revealed_tiers.iter().copied().collect(),
            global_multiplier: state.automation.global_multiplier,
            conversion_speed: state.automation.global_conversion_speed,
            prestige_preview: self.prestige_preview(),
            cycle_progress: self.cycle_progress(),
            prestige_currency: state.meta.prestige_currency,
            total_cycles: state.meta.total_cycles,
            computing_unlocked: state.meta.computing_unlocked,
            stats: self.effective_stats(),
            programs: self.programs.summaries(),
        }
    }
}
