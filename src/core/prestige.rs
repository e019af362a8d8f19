use tracing::{info, warn};

use crate::model::{FeatureFlag, Tier};

use super::error::PrestigeError;
use super::hooks::PassiveHookRegistry;
use super::state::{AutomationState, GameState, GenerationState};

pub const BASE_CYCLE_THRESHOLD: f64 = 1000.0;
pub const CYCLE_THRESHOLD_GROWTH: f64 = 1.5;
pub const MULTIPLIER_PER_CYCLE: f64 = 0.1;
/// Cumulative cycles that open the computing console.
pub const COMPUTING_UNLOCK_CYCLES: f64 = 50.0;
pub const COMPUTING_PRESTIGE_BASE_COST: f64 = 300.0;

/// Where the weighted ledger sits on the escalating threshold curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleProgress {
    pub earned: u64,
    pub weighted_total: f64,
    /// Threshold most recently cleared, zero before the first.
    pub previous_threshold: f64,
    pub next_threshold: f64,
}

impl CycleProgress {
    /// Share of the way from the previous threshold to the next, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let span = self.next_threshold - self.previous_threshold;
        if span <= 0.0 || !span.is_finite() {
            return 0.0;
        }
        ((self.weighted_total - self.previous_threshold) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecompileOutcome {
    pub earned: u64,
    /// Flat cycles from recompile-bonus upgrades added on top of `earned`.
    pub bonus: f64,
    pub computing_unlocked: bool,
}

impl RecompileOutcome {
    pub fn awarded(&self) -> f64 {
        self.earned as f64 + self.bonus
    }
}

/// Walks the `1000 * 1.5^n` threshold increments against a weighted total.
pub fn cycle_progress(weighted_total: f64) -> CycleProgress {
    let mut earned = 0_u64;
    let mut previous = 0.0;
    let mut threshold = BASE_CYCLE_THRESHOLD;
    if weighted_total.is_finite() {
        while weighted_total >= threshold && threshold.is_finite() {
            earned += 1;
            previous = threshold;
            threshold += BASE_CYCLE_THRESHOLD * CYCLE_THRESHOLD_GROWTH.powf(earned as f64);
        }
    } else {
        warn!(weighted_total, "weighted ledger total is not finite");
    }
    CycleProgress {
        earned,
        weighted_total,
        previous_threshold: previous,
        next_threshold: threshold,
    }
}

/// Cycles a recompile would award right now, excluding the flat bonus.
pub fn calculate_prestige(state: &GameState) -> u64 {
    let mut earned = cycle_progress(state.resources.weighted_total()).earned;
    if state.generation.flag(FeatureFlag::ByteBonus) {
        earned += (state.resources.get(Tier::Byte) + 1.0).log2().floor() as u64;
    }
    earned
}

/// Awards cycles and soft-resets everything bought with data.
///
/// Prestige currency, total cycles, permanent stats, installed parts and
/// system unlocks survive; the ledger, generation, automation, owned
/// upgrades and passive hooks do not.
pub fn recompile(
    state: &mut GameState,
    hooks: &mut PassiveHookRegistry,
) -> Result<RecompileOutcome, PrestigeError> {
    let earned = calculate_prestige(state);
    if earned == 0 {
        return Err(PrestigeError::NothingToCompile);
    }
    let bonus = state.automation.recompile_bonus;
    let awarded = earned as f64 + bonus;
    let multiplier = state.automation.global_multiplier + earned as f64 * MULTIPLIER_PER_CYCLE;

    state.meta.prestige_currency += awarded;
    state.meta.total_cycles += awarded;

    state.resources.clear();
    state.generation = GenerationState::default();
    let unlocks = std::mem::take(&mut state.automation.unlocks);
    state.automation = AutomationState {
        global_multiplier: multiplier,
        unlocks,
        ..AutomationState::default()
    };
    state.owned_upgrades.clear();
    hooks.clear();

    let computing_unlocked =
        !state.meta.computing_unlocked && state.meta.total_cycles >= COMPUTING_UNLOCK_CYCLES;
    if computing_unlocked {
        state.meta.computing_unlocked = true;
        info!(total_cycles = state.meta.total_cycles, "computing unlocked");
    }
    info!(earned, bonus, "recompiled");

    Ok(RecompileOutcome {
        earned,
        bonus,
        computing_unlocked,
    })
}

pub fn computing_prestige_cost(times_done: u32) -> f64 {
    (COMPUTING_PRESTIGE_BASE_COST * CYCLE_THRESHOLD_GROWTH.powi(times_done as i32)).floor()
}

/// Spends cycles to raise every permanent computing stat by one. Returns the
/// cost paid.
pub fn compute_prestige(state: &mut GameState) -> Result<f64, PrestigeError> {
    let meta = &mut state.meta;
    let cost = computing_prestige_cost(meta.computing_prestige_count);
    if meta.prestige_currency < cost {
        return Err(PrestigeError::InsufficientCycles { cost });
    }
    meta.prestige_currency -= cost;
    meta.computing_prestige_count += 1;
    meta.processing_power += 1;
    meta.speed += 1.0;
    meta.memory += 1;
    meta.storage_slots += 1;
    info!(cost, count = meta.computing_prestige_count, "computing prestige");
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::{
        calculate_prestige, compute_prestige, computing_prestige_cost, cycle_progress, recompile,
    };
    use crate::core::error::PrestigeError;
    use crate::core::hooks::{HookKey, PassiveHook, PassiveHookRegistry};
    use crate::core::state::GameState;
    use crate::model::{FeatureFlag, Tier};

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn thresholds_escalate_geometrically() {
        assert_eq!(cycle_progress(999.0).earned, 0);
        assert_eq!(cycle_progress(1000.0).earned, 1);
        assert_eq!(cycle_progress(2499.0).earned, 1);
        assert_eq!(cycle_progress(2500.0).earned, 2);
        // 2500 + 1000 * 1.5^2
        assert_eq!(cycle_progress(4750.0).earned, 3);

        let progress = cycle_progress(1750.0);
        assert_close(progress.previous_threshold, 1000.0);
        assert_close(progress.next_threshold, 2500.0);
        assert_close(progress.fraction(), 0.5);
    }

    #[test]
    fn non_finite_totals_earn_nothing() {
        assert_eq!(cycle_progress(f64::INFINITY).earned, 0);
        assert_eq!(cycle_progress(f64::NAN).earned, 0);
    }

    #[test]
    fn byte_bonus_adds_logarithmic_cycles() {
        let mut state = GameState::default();
        state.resources.set(Tier::Byte, 125.0);
        assert_eq!(calculate_prestige(&state), 1);

        state.generation.flags.insert(FeatureFlag::ByteBonus);
        assert_eq!(calculate_prestige(&state), 1 + 6);
    }

    #[test]
    fn empty_ledger_cannot_recompile() {
        let mut state = GameState::default();
        let mut hooks = PassiveHookRegistry::default();
        let before = state.clone();

        assert_eq!(recompile(&mut state, &mut hooks), Err(PrestigeError::NothingToCompile));
        assert_eq!(state, before);
    }

    #[test]
    fn recompile_awards_and_resets() {
        let mut state = GameState::default();
        let mut hooks = PassiveHookRegistry::default();
        state.resources.set(Tier::Bit, 2600.0);
        state.resources.set(Tier::Nibble, 3.0);
        state.generation.manual_gain = 4.0;
        state.generation.conversion_counts[Tier::Nibble.index()] = 12;
        state.automation.global_multiplier = 1.4;
        state.automation.recompile_bonus = 1.5;
        state.automation.conversion_bonuses.insert(Tier::Byte, 1.25);
        state.automation.unlocks.insert("compilerUnlocked".to_string());
        state.owned_upgrades.insert("bitDoubler".to_string());
        state.meta.total_cycles = 48.0;
        hooks.register(
            HookKey::ScalingBoost(Tier::Byte),
            PassiveHook::ScalingBoost { resource: Tier::Byte, rate: 0.001 },
        );

        let outcome = recompile(&mut state, &mut hooks).expect("recompile");

        assert_eq!(outcome.earned, 2);
        assert_close(outcome.awarded(), 3.5);
        assert!(outcome.computing_unlocked);
        assert_close(state.meta.prestige_currency, 3.5);
        assert_close(state.meta.total_cycles, 51.5);
        assert_close(state.automation.global_multiplier, 1.6);
        assert!(state.resources.iter().all(|(_, amount)| amount == 0.0));
        assert_close(state.generation.manual_gain, 1.0);
        assert_eq!(state.generation.conversion_count(Tier::Nibble), 0);
        assert!(state.automation.conversion_bonuses.is_empty());
        assert_close(state.automation.recompile_bonus, 0.0);
        assert!(state.automation.unlocks.contains("compilerUnlocked"));
        assert_eq!(state.automation.revealed_tiers.len(), 1);
        assert!(state.owned_upgrades.is_empty());
        assert!(hooks.is_empty());
    }

    #[test]
    fn computing_prestige_cost_grows_and_raises_stats() {
        assert_close(computing_prestige_cost(0), 300.0);
        assert_close(computing_prestige_cost(1), 450.0);
        assert_close(computing_prestige_cost(2), 675.0);
        assert_close(computing_prestige_cost(3), 1012.0);

        let mut state = GameState::default();
        state.meta.prestige_currency = 500.0;
        assert_close(compute_prestige(&mut state).expect("affordable"), 300.0);
        assert_eq!(state.meta.processing_power, 1);
        assert_eq!(state.meta.storage_slots, 2);
        assert_eq!(state.meta.memory, 17);
        assert_close(state.meta.speed, 2.0);

        assert_eq!(
            compute_prestige(&mut state),
            Err(PrestigeError::InsufficientCycles { cost: 450.0 })
        );
        assert_close(state.meta.prestige_currency, 200.0);
    }
}
