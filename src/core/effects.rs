use tracing::{debug, warn};

use crate::model::Effect;

use super::error::EffectError;
use super::hooks::{HookKey, PassiveHook, PassiveHookRegistry};
use super::state::GameState;

/// Multiplier on automatic bit generation that expires after a countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporaryBoost {
    pub source: String,
    pub factor: f64,
    pub remaining_seconds: u32,
}

/// Mutable view of everything an effect is allowed to touch.
pub struct EffectContext<'a> {
    pub state: &'a mut GameState,
    pub hooks: &'a mut PassiveHookRegistry,
    pub boosts: &'a mut Vec<TemporaryBoost>,
}

fn finite(name: &'static str, value: f64) -> Result<f64, EffectError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EffectError::InvalidParameter { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, EffectError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EffectError::InvalidParameter { name, value })
    }
}

/// Interprets `effect` on behalf of `source` (an upgrade or program key).
pub fn apply_effect(
    ctx: &mut EffectContext<'_>,
    source: &str,
    effect: &Effect,
) -> Result<(), EffectError> {
    let state = &mut *ctx.state;
    match effect {
        Effect::AddManualGain { amount } => {
            state.generation.manual_gain += finite("amount", *amount)?;
        }
        Effect::ScaleManualGain { factor } => {
            state.generation.manual_gain *= positive("factor", *factor)?;
        }
        Effect::AddBitGeneration { amount } => {
            state.generation.bit_gen_amount += finite("amount", *amount)?;
        }
        Effect::ScaleBitGeneration { factor } => {
            state.generation.bit_gen_amount *= positive("factor", *factor)?;
        }
        Effect::AutoConvert { pair } => {
            state.automation.auto_convert.entry(*pair).or_default().enabled = true;
        }
        Effect::BonusYield { target, bonus } => {
            let bonus = positive("bonus", *bonus)?;
            state.automation.conversion_bonuses.insert(*target, bonus);
        }
        Effect::GlobalMultiplierBoost { amount } => {
            let amount = finite("amount", *amount)?;
            state.automation.flat_multiplier_bonus += amount;
            state.automation.global_multiplier += amount;
        }
        Effect::ToggleFeature { flag } => {
            if !state.generation.flags.insert(*flag) {
                debug!(%flag, "feature already enabled");
            }
        }
        Effect::UnlockConvertMax { pair } => {
            state.automation.convert_max_unlocked.insert(*pair);
        }
        Effect::UnlockAutoMax { pair } => {
            state.automation.auto_convert_max_unlocked.insert(*pair);
        }
        Effect::AutoTrade { pair, batch } => {
            if *batch == 0 {
                return Err(EffectError::InvalidParameter {
                    name: "batch",
                    value: 0.0,
                });
            }
            state.automation.auto_trade_batches.insert(*pair, *batch);
        }
        Effect::ScalingBoost { resource, rate } => {
            let rate = finite("rate", *rate)?;
            ctx.hooks.register(
                HookKey::ScalingBoost(*resource),
                PassiveHook::ScalingBoost {
                    resource: *resource,
                    rate,
                },
            );
        }
        Effect::ConversionBonus {
            from,
            bonus,
            per_amount,
            reward,
        } => {
            if *per_amount == 0 {
                return Err(EffectError::ZeroInterval);
            }
            let reward = positive("reward", *reward)?;
            ctx.hooks.register(
                HookKey::ConversionBonus {
                    from: *from,
                    bonus: *bonus,
                },
                PassiveHook::ConversionBonus {
                    from: *from,
                    bonus: *bonus,
                    per_amount: *per_amount,
                    reward,
                    last_seen: state.generation.conversion_count(*from),
                },
            );
        }
        Effect::PassiveGenerate { resource, amount } => {
            let amount = positive("amount", *amount)?;
            ctx.hooks.register(
                HookKey::Generator(source.to_string()),
                PassiveHook::Generate {
                    resource: *resource,
                    amount,
                },
            );
        }
        Effect::RecompileBonus { cycles } => {
            state.automation.recompile_bonus += positive("cycles", *cycles)?;
        }
        Effect::GlobalSpeedBoost { factor } => {
            state.automation.global_conversion_speed *= positive("factor", *factor)?;
        }
        Effect::UnlockSystem { flag } => {
            state.automation.unlocks.insert(flag.clone());
        }
        Effect::AddPassiveYield { resource, amount } => {
            let amount = positive("amount", *amount)?;
            *state.meta.passive_yield.entry(*resource).or_insert(0.0) += amount;
        }
        Effect::TemporaryBoost { factor, seconds } => {
            let factor = positive("factor", *factor)?;
            ctx.boosts.push(TemporaryBoost {
                source: source.to_string(),
                factor,
                remaining_seconds: *seconds,
            });
        }
    }
    Ok(())
}

/// Applies an effect, logging and swallowing any fault.
pub fn apply_effect_logged(ctx: &mut EffectContext<'_>, source: &str, effect: &Effect) -> bool {
    match apply_effect(ctx, source, effect) {
        Ok(()) => true,
        Err(err) => {
            warn!(source, error = %err, "effect failed to apply");
            false
        }
    }
}
