//! Long-term proposition pools and their settlement.
//!
//! A pool carries its own allowance. Backing the winning option earns
//! `allowance * numerator / denominator`; any other choice loses the
//! allowance. Outcomes can be corrected, so settlement always produces the
//! difference between the new and the previously applied impact.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{GameweekNumber, OptionId, PlayerId, PoolId};
use super::money::{round_money, Money};
use super::odds::FractionalOdds;

/// One mutually exclusive choice inside a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropositionOption {
    pub id: OptionId,
    pub description: String,
    pub odds: FractionalOdds,
}

/// A long-running bet with its own allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropositionPool {
    id: PoolId,
    gameweek: GameweekNumber,
    description: String,
    allowance: Money,
    options: Vec<PropositionOption>,
}

impl PropositionPool {
    /// Create a pool.
    ///
    /// # Errors
    /// Rejects pools without options, with a negative allowance, or with
    /// repeated option descriptions.
    pub fn try_new(
        id: PoolId,
        gameweek: GameweekNumber,
        description: impl Into<String>,
        allowance: Money,
        options: Vec<PropositionOption>,
    ) -> Result<Self, DomainError> {
        if allowance < Decimal::ZERO {
            return Err(DomainError::NegativeAllowance { allowance });
        }
        if options.is_empty() {
            return Err(DomainError::EmptyOptions);
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.description.as_str()) {
                return Err(DomainError::DuplicateOption {
                    description: option.description.clone(),
                });
            }
        }

        Ok(Self {
            id,
            gameweek,
            description: description.into(),
            allowance: round_money(allowance),
            options,
        })
    }

    #[must_use]
    pub const fn id(&self) -> &PoolId {
        &self.id
    }

    /// Gameweek the pool was opened in; bets close at its deadline.
    #[must_use]
    pub const fn gameweek(&self) -> GameweekNumber {
        self.gameweek
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn allowance(&self) -> Money {
        self.allowance
    }

    #[must_use]
    pub fn options(&self) -> &[PropositionOption] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&PropositionOption> {
        self.options.iter().find(|option| &option.id == id)
    }

    /// Ledger impact of backing `chosen` when `winner` is declared.
    ///
    /// # Errors
    /// Returns [`DomainError::UnknownOption`] if either option is not part
    /// of this pool.
    pub fn impact(&self, chosen: &OptionId, winner: &OptionId) -> Result<Money, DomainError> {
        let chosen = self
            .option(chosen)
            .ok_or_else(|| DomainError::UnknownOption {
                option: chosen.clone(),
            })?;
        if self.option(winner).is_none() {
            return Err(DomainError::UnknownOption {
                option: winner.clone(),
            });
        }

        if &chosen.id == winner {
            Ok(round_money(chosen.odds.win_ratio() * self.allowance))
        } else {
            Ok(-self.allowance)
        }
    }
}

/// A player's single choice within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropositionBet {
    pub pool: PoolId,
    pub player: PlayerId,
    pub option: OptionId,
}

/// The declared winner of a pool and the gameweek its impact was folded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropositionOutcome {
    pub pool: PoolId,
    pub winner: OptionId,
    pub gameweek: GameweekNumber,
}

/// Amount of a pool's impact folded into one player's gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAdjustment {
    pub pool: PoolId,
    pub player: PlayerId,
    pub gameweek: GameweekNumber,
    pub amount: Money,
}

/// Change in one bettor's position caused by declaring an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropositionDelta {
    pub player: PlayerId,
    pub old_impact: Money,
    pub new_impact: Money,
}

impl PropositionDelta {
    /// `new_impact - old_impact`; the only amount ever applied to a ledger.
    #[must_use]
    pub fn delta(&self) -> Money {
        self.new_impact - self.old_impact
    }
}

/// Compute per-bettor deltas for declaring `winner` on `pool`.
///
/// `previous` is the outcome already folded into the ledger, if any; its
/// impact is subtracted so corrections never double count.
///
/// # Errors
/// Returns [`DomainError::UnknownOption`] when `winner`, the previous
/// winner or a bet's option is not part of the pool.
pub fn settle_pool(
    pool: &PropositionPool,
    bets: &[PropositionBet],
    previous: Option<&PropositionOutcome>,
    winner: &OptionId,
) -> Result<Vec<PropositionDelta>, DomainError> {
    if pool.option(winner).is_none() {
        return Err(DomainError::UnknownOption {
            option: winner.clone(),
        });
    }

    bets.iter()
        .filter(|bet| &bet.pool == pool.id())
        .map(|bet| {
            let old_impact = match previous {
                Some(outcome) => pool.impact(&bet.option, &outcome.winner)?,
                None => Decimal::ZERO,
            };
            let new_impact = pool.impact(&bet.option, winner)?;
            Ok(PropositionDelta {
                player: bet.player.clone(),
                old_impact,
                new_impact,
            })
        })
        .collect()
}
