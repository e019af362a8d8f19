use std::collections::BTreeMap;

use tracing::debug;

use crate::model::Tier;

use super::state::GameState;

/// Conversion counters are folded back below this bound.
pub const CONVERSION_COUNT_WRAP: u64 = 1000;

/// Identity of a passive behaviour; a key is registered at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKey {
    ScalingBoost(Tier),
    ConversionBonus { from: Tier, bonus: Tier },
    /// Per-tick generator owned by the named upgrade.
    Generator(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PassiveHook {
    ScalingBoost {
        resource: Tier,
        rate: f64,
    },
    ConversionBonus {
        from: Tier,
        bonus: Tier,
        per_amount: u64,
        reward: f64,
        /// Counter value at the last run; multiples at or below it are paid.
        last_seen: u64,
    },
    Generate {
        resource: Tier,
        amount: f64,
    },
}

impl PassiveHook {
    fn run(&mut self, state: &mut GameState) {
        match self {
            Self::ScalingBoost { resource, rate } => {
                let held = state.resources.get(*resource);
                state.automation.global_multiplier += (held + 1.0).log2() * *rate;
            }
            Self::ConversionBonus {
                from,
                bonus,
                per_amount,
                reward,
                last_seen,
            } => {
                let count = state.generation.conversion_count(*from);
                let crossings = if *per_amount == 0 || count <= *last_seen {
                    0
                } else {
                    count / *per_amount - *last_seen / *per_amount
                };
                *last_seen = count;
                if crossings > 0 {
                    state.resources.add(*bonus, *reward * crossings as f64);
                    debug!(from = %from, bonus = %bonus, crossings, "conversion bonus awarded");
                }
            }
            Self::Generate { resource, amount } => {
                state.resources.add(*resource, *amount);
            }
        }
    }
}

/// Passive hooks in registration order, deduplicated by [`HookKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassiveHookRegistry {
    order: Vec<HookKey>,
    hooks: BTreeMap<HookKey, PassiveHook>,
}

impl PassiveHookRegistry {
    /// Inserts the hook unless its key is already present.
    pub fn register(&mut self, key: HookKey, hook: PassiveHook) -> bool {
        if self.hooks.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.hooks.insert(key, hook);
        true
    }

    pub fn contains(&self, key: &HookKey) -> bool {
        self.hooks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.hooks.clear();
    }

    /// Runs every hook once, then wraps the conversion counters they watch.
    pub fn run(&mut self, state: &mut GameState) {
        for key in &self.order {
            if let Some(hook) = self.hooks.get_mut(key) {
                hook.run(state);
            }
        }
        self.wrap_conversion_counts(state);
    }

    fn wrap_conversion_counts(&mut self, state: &mut GameState) {
        for tier in Tier::ALL {
            let count = state.generation.conversion_count(tier);
            if count < CONVERSION_COUNT_WRAP {
                continue;
            }
            let watched = self.hooks.values().any(
                |hook| matches!(hook, PassiveHook::ConversionBonus { from, .. } if *from == tier),
            );
            if !watched {
                continue;
            }
            // Fold by a multiple of every watching interval so absolute
            // multiples keep their position.
            let step = self
                .hooks
                .values()
                .filter_map(|hook| match hook {
                    PassiveHook::ConversionBonus {
                        from, per_amount, ..
                    } if *from == tier && *per_amount > 0 => Some(*per_amount),
                    _ => None,
                })
                .fold(CONVERSION_COUNT_WRAP, lcm);
            let folded = count - count % step;
            if folded == 0 {
                continue;
            }
            state.generation.conversion_counts[tier.index()] = count - folded;
            for hook in self.hooks.values_mut() {
                if let PassiveHook::ConversionBonus {
                    from, last_seen, ..
                } = hook
                {
                    if *from == tier {
                        *last_seen = last_seen.saturating_sub(folded);
                    }
                }
            }
        }
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

#[cfg(test)]
mod tests {
    use super::{HookKey, PassiveHook, PassiveHookRegistry};
    use crate::core::state::GameState;
    use crate::model::Tier;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    fn conversion_bonus(per_amount: u64) -> PassiveHook {
        PassiveHook::ConversionBonus {
            from: Tier::Nibble,
            bonus: Tier::Byte,
            per_amount,
            reward: 1.0,
            last_seen: 0,
        }
    }

    #[test]
    fn duplicate_keys_register_once_and_fire_once() {
        let mut registry = PassiveHookRegistry::default();
        let key = HookKey::ScalingBoost(Tier::Byte);
        let hook = PassiveHook::ScalingBoost {
            resource: Tier::Byte,
            rate: 0.5,
        };
        assert!(registry.register(key.clone(), hook.clone()));
        assert!(!registry.register(key, hook));
        assert_eq!(registry.len(), 1);

        let mut state = GameState::default();
        state.resources.set(Tier::Byte, 7.0);
        registry.run(&mut state);

        assert_close(state.automation.global_multiplier, 1.0 + 3.0 * 0.5);
    }

    #[test]
    fn conversion_bonus_awards_on_crossings_only() {
        let mut registry = PassiveHookRegistry::default();
        registry.register(
            HookKey::ConversionBonus {
                from: Tier::Nibble,
                bonus: Tier::Byte,
            },
            conversion_bonus(10),
        );
        let mut state = GameState::default();

        state.generation.conversion_counts[Tier::Nibble.index()] = 9;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 0.0);

        state.generation.conversion_counts[Tier::Nibble.index()] = 10;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 1.0);

        // An idle counter sitting on a multiple must not award again.
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 1.0);

        state.generation.conversion_counts[Tier::Nibble.index()] = 35;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 3.0);
    }

    #[test]
    fn late_registration_pays_at_the_next_absolute_multiple() {
        let mut registry = PassiveHookRegistry::default();
        let mut state = GameState::default();
        state.generation.conversion_counts[Tier::Nibble.index()] = 3;
        registry.register(
            HookKey::ConversionBonus {
                from: Tier::Nibble,
                bonus: Tier::Byte,
            },
            PassiveHook::ConversionBonus {
                from: Tier::Nibble,
                bonus: Tier::Byte,
                per_amount: 10,
                reward: 1.0,
                last_seen: 3,
            },
        );

        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 0.0);

        state.generation.conversion_counts[Tier::Nibble.index()] = 10;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 1.0);
    }

    #[test]
    fn watched_counters_wrap_without_losing_progress() {
        let mut registry = PassiveHookRegistry::default();
        registry.register(
            HookKey::ConversionBonus {
                from: Tier::Nibble,
                bonus: Tier::Byte,
            },
            conversion_bonus(5),
        );
        let mut state = GameState::default();

        state.generation.conversion_counts[Tier::Nibble.index()] = 999;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 199.0);

        state.generation.conversion_counts[Tier::Nibble.index()] = 1003;
        registry.run(&mut state);
        assert_eq!(state.generation.conversion_count(Tier::Nibble), 3);
        assert_close(state.resources.get(Tier::Byte), 200.0);

        state.generation.conversion_counts[Tier::Nibble.index()] = 5;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 201.0);
    }

    #[test]
    fn wrap_keeps_multiples_of_intervals_that_do_not_divide_it() {
        let mut registry = PassiveHookRegistry::default();
        registry.register(
            HookKey::ConversionBonus {
                from: Tier::Nibble,
                bonus: Tier::Byte,
            },
            conversion_bonus(7),
        );
        let mut state = GameState::default();

        state.generation.conversion_counts[Tier::Nibble.index()] = 1003;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 143.0);
        assert_eq!(state.generation.conversion_count(Tier::Nibble), 1003);

        state.generation.conversion_counts[Tier::Nibble.index()] = 7001;
        registry.run(&mut state);
        assert_close(state.resources.get(Tier::Byte), 1000.0);
        assert_eq!(state.generation.conversion_count(Tier::Nibble), 1);
    }

    #[test]
    fn unwatched_counters_are_left_alone() {
        let mut registry = PassiveHookRegistry::default();
        let mut state = GameState::default();
        state.generation.conversion_counts[Tier::Byte.index()] = 4096;

        registry.run(&mut state);

        assert_eq!(state.generation.conversion_count(Tier::Byte), 4096);
    }
}
