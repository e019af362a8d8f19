use tracing::warn;

use crate::model::Tier;

use super::error::ConversionError;
use super::resource_store::ResourceStore;
use super::state::GenerationState;

/// Exponent reduction never exceeds half, however large the batch.
pub const MAX_DIMINISHING: f64 = 0.5;

/// Units of `from` needed for one unit of `to`.
pub fn conversion_rate(from: Tier, to: Tier) -> f64 {
    to.weight() / from.weight()
}

/// `min(0.5, log10(max(1, amount)) / 20)`
pub fn diminishing_factor(amount: f64) -> f64 {
    (amount.max(1.0).log10() / 20.0).min(MAX_DIMINISHING)
}

pub fn effective_gain(amount: f64, bonus: f64, multiplier: f64) -> f64 {
    let raw_gain = amount * bonus * multiplier;
    raw_gain.powf(1.0 - diminishing_factor(amount))
}

/// Whole units of `to` affordable from the current `from` balance.
pub fn affordable_units(resources: &ResourceStore, from: Tier, rate: f64) -> u64 {
    if !(rate.is_finite() && rate > 0.0) {
        return 0;
    }
    let units = (resources.get(from) / rate).floor();
    if units.is_finite() && units > 0.0 {
        units as u64
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub from: Tier,
    pub to: Tier,
    pub amount: f64,
    pub rate: f64,
    pub bonus: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionReceipt {
    pub spent: f64,
    pub gained: f64,
}

impl Conversion {
    pub fn new(from: Tier, to: Tier, amount: f64) -> Self {
        Self {
            from,
            to,
            amount,
            rate: conversion_rate(from, to),
            bonus: 1.0,
            multiplier: 1.0,
        }
    }

    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Debits `rate * amount` of `from` and credits the diminished gain to
    /// `to`. Any rejection leaves both balances untouched.
    pub fn apply(
        &self,
        resources: &mut ResourceStore,
        generation: &mut GenerationState,
    ) -> Result<ConversionReceipt, ConversionError> {
        if self.from == self.to || !(self.rate.is_finite() && self.rate > 0.0) {
            warn!(from = %self.from, to = %self.to, rate = self.rate, "conversion skipped: invalid rate");
            return Err(ConversionError::InvalidRate {
                from: self.from,
                to: self.to,
            });
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            warn!(amount = self.amount, "conversion skipped: invalid amount");
            return Err(ConversionError::InvalidAmount(self.amount));
        }

        let cost = self.rate * self.amount;
        let available = resources.get(self.from);
        if !resources.try_spend(self.from, cost) {
            warn!(
                tier = %self.from,
                required = cost,
                available,
                "conversion skipped: insufficient resources"
            );
            return Err(ConversionError::Insufficient {
                tier: self.from,
                required: cost,
                available,
            });
        }

        let gained = effective_gain(self.amount, self.bonus, self.multiplier);
        resources.add(self.to, gained);
        let counter = &mut generation.conversion_counts[self.to.index()];
        *counter = counter.saturating_add(1);

        Ok(ConversionReceipt {
            spent: cost,
            gained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Conversion, affordable_units, conversion_rate, diminishing_factor, effective_gain,
    };
    use crate::core::error::ConversionError;
    use crate::core::resource_store::ResourceStore;
    use crate::core::state::GenerationState;
    use crate::model::Tier;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rates_follow_weight_ratios() {
        assert_close(conversion_rate(Tier::Bit, Tier::Nibble), 4.0);
        assert_close(conversion_rate(Tier::Nibble, Tier::Byte), 2.0);
        assert_close(conversion_rate(Tier::Byte, Tier::Kilobyte), 1024.0);
        assert_close(conversion_rate(Tier::Nibble, Tier::Bit), 0.25);
    }

    #[test]
    fn single_unit_conversion_has_no_penalty() {
        assert_eq!(diminishing_factor(1.0), 0.0);
        assert_close(effective_gain(1.0, 1.25, 3.0), 3.75);
    }

    #[test]
    fn diminishing_factor_saturates_at_half() {
        assert_close(diminishing_factor(10.0), 0.05);
        assert_close(diminishing_factor(1e10), 0.5);
        assert_close(diminishing_factor(1e30), 0.5);
    }

    #[test]
    fn successful_conversion_debits_credits_and_counts() {
        let mut resources = ResourceStore::default();
        let mut generation = GenerationState::default();
        resources.set(Tier::Bit, 10.0);

        let receipt = Conversion::new(Tier::Bit, Tier::Nibble, 2.0)
            .apply(&mut resources, &mut generation)
            .expect("affordable conversion");

        assert_close(receipt.spent, 8.0);
        assert_close(resources.get(Tier::Bit), 2.0);
        assert_close(resources.get(Tier::Nibble), 2.0_f64.powf(1.0 - 2.0_f64.log10() / 20.0));
        assert_eq!(generation.conversion_count(Tier::Nibble), 1);
    }

    #[test]
    fn insufficient_balance_rejects_without_partial_debit() {
        let mut resources = ResourceStore::default();
        let mut generation = GenerationState::default();
        resources.set(Tier::Bit, 7.0);

        let result = Conversion::new(Tier::Bit, Tier::Nibble, 2.0).apply(&mut resources, &mut generation);

        assert!(matches!(result, Err(ConversionError::Insufficient { .. })));
        assert_close(resources.get(Tier::Bit), 7.0);
        assert_close(resources.get(Tier::Nibble), 0.0);
        assert_eq!(generation.conversion_count(Tier::Nibble), 0);
    }

    #[test]
    fn affordable_units_floors_the_quotient() {
        let mut resources = ResourceStore::default();
        resources.set(Tier::Bit, 103.0);
        assert_eq!(affordable_units(&resources, Tier::Bit, 4.0), 25);
        assert_eq!(affordable_units(&resources, Tier::Bit, 0.0), 0);
    }
}
