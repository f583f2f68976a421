//! Spendable allowance per player and gameweek.

use rust_decimal::Decimal;

use super::ledger::LedgerEntry;
use super::money::{round_money, Money};

/// `base + max(previous weekly, 0)`. Without a previous entry only the base
/// allowance is available.
#[must_use]
pub fn allowance_for(base: Money, previous: Option<&LedgerEntry>) -> Money {
    round_money(base + previous.map_or(Decimal::ZERO, LedgerEntry::rollable))
}

/// A player's allowance for one gameweek and what is already staked
/// against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceBudget {
    pub allowance: Money,
    pub staked: Money,
}

impl AllowanceBudget {
    #[must_use]
    pub fn new<I>(allowance: Money, stakes: I) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        Self {
            allowance,
            staked: stakes.into_iter().sum(),
        }
    }

    /// Allowance still available. Negative if the player is overcommitted.
    #[must_use]
    pub fn remaining(&self) -> Money {
        self.allowance - self.staked
    }

    /// Whether an additional `stake` fits.
    #[must_use]
    pub fn admits(&self, stake: Money) -> bool {
        stake <= self.remaining()
    }
}
