use crate::model::{TIER_COUNT, Tier};

/// Per-tier amounts credited (positive) or debited (negative) this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickDeltas {
    amounts: [f64; TIER_COUNT],
}

impl TickDeltas {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, tier: Tier) -> f64 {
        self.amounts[tier.index()]
    }
}

/// Non-negative balance for every tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceStore {
    amounts: [f64; TIER_COUNT],
    pub tick_deltas: TickDeltas,
}

impl ResourceStore {
    pub fn begin_tick(&mut self) {
        self.tick_deltas.reset();
    }

    pub fn get(&self, tier: Tier) -> f64 {
        self.amounts[tier.index()]
    }

    /// Overwrites a balance; negative and non-finite values clamp to zero.
    pub fn set(&mut self, tier: Tier, amount: f64) {
        self.amounts[tier.index()] = if amount.is_finite() {
            amount.max(0.0)
        } else {
            0.0
        };
    }

    pub fn add(&mut self, tier: Tier, amount: f64) {
        if amount <= 0.0 || !amount.is_finite() {
            return;
        }
        self.amounts[tier.index()] += amount;
        self.tick_deltas.amounts[tier.index()] += amount;
    }

    pub fn can_afford(&self, tier: Tier, amount: f64) -> bool {
        self.get(tier) >= amount
    }

    /// Debits `amount` only when the whole amount is available.
    pub fn try_spend(&mut self, tier: Tier, amount: f64) -> bool {
        if amount < 0.0 || !self.can_afford(tier, amount) {
            return false;
        }
        let index = tier.index();
        self.amounts[index] = (self.amounts[index] - amount).max(0.0);
        self.tick_deltas.amounts[index] -= amount;
        true
    }

    pub fn clear(&mut self) {
        self.amounts = [0.0; TIER_COUNT];
    }

    /// Sum of every balance valued at its tier weight.
    pub fn weighted_total(&self) -> f64 {
        Tier::ALL
            .into_iter()
            .map(|tier| self.get(tier) * tier.weight())
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, f64)> + '_ {
        Tier::ALL.into_iter().map(|tier| (tier, self.get(tier)))
    }
}
