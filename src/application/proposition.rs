//! Declaring and correcting proposition outcomes.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::application::settlement::SettlementService;
use crate::application::state::PoolLocks;
use crate::domain::{
    settle_pool, GameweekIndex, GameweekNumber, Money, OptionId, PlayerId, PoolId,
    PropositionDelta, PropositionOutcome, SpecialAdjustment,
};
use crate::error::{ConsistencyError, Result, SettlementError, ValidationError};
use crate::port::outbound::store::{PoolStore, PropositionCommit};

/// Per-player change caused by a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredImpact {
    pub player: PlayerId,
    pub old_impact: Money,
    pub new_impact: Money,
    pub delta: Money,
    /// False while the gameweek is unsettled; the delta is folded in when
    /// that gameweek is settled.
    pub applied: bool,
}

/// Result of declaring an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationReport {
    pub pool: PoolId,
    pub winner: OptionId,
    pub gameweek: GameweekNumber,
    pub impacts: Vec<DeclaredImpact>,
    pub cascaded: Vec<GameweekNumber>,
}

/// Settles proposition pools into the ledger.
pub struct PropositionService<S> {
    store: Arc<S>,
    locks: Arc<PoolLocks>,
    settlement: SettlementService<S>,
}

impl<S: PoolStore> PropositionService<S> {
    #[must_use]
    pub fn new(store: Arc<S>, locks: Arc<PoolLocks>) -> Self {
        let settlement = SettlementService::new(Arc::clone(&store), Arc::clone(&locks));
        Self {
            store,
            locks,
            settlement,
        }
    }

    /// Declare (or correct) the winner of `pool`, folding the difference
    /// into `gameweek`.
    ///
    /// Declarations for one pool are serialized. Outcome, adjustments and
    /// entry updates are committed in one store call. Later settled
    /// gameweeks are re-settled afterwards.
    ///
    /// # Errors
    /// Unknown pool, option or gameweek; [`ConsistencyError`] when the
    /// recorded adjustments would not add up to the new impact.
    pub async fn declare_outcome(
        &self,
        pool_id: &PoolId,
        winner: &OptionId,
        gameweek: GameweekNumber,
    ) -> Result<DeclarationReport> {
        let impacts = {
            let _pool = self.locks.pool(pool_id).await;
            let _gameweek = self.locks.gameweek(gameweek).await;
            let mut impacts = self
                .commit(pool_id, winner, gameweek)
                .await
                .map_err(|err| {
                    warn!(pool = %pool_id, winner = %winner, gameweek, error = %err, "declaration refused");
                    err
                })?;

            // Bettors without an entry in an already settled gameweek get
            // one from re-settling it with the new adjustments.
            let unapplied = impacts.iter().any(|i| !i.applied && !i.delta.is_zero());
            if unapplied && self.settlement.is_complete(gameweek).await? {
                self.settlement.settle_locked(gameweek).await?;
                for impact in impacts.iter_mut().filter(|i| !i.delta.is_zero()) {
                    impact.applied = true;
                }
            }
            impacts
        };
        let cascaded = self.settlement.cascade_after(gameweek).await?;

        info!(
            pool = %pool_id,
            winner = %winner,
            gameweek,
            bettors = impacts.len(),
            cascaded = cascaded.len(),
            "proposition outcome declared"
        );
        Ok(DeclarationReport {
            pool: pool_id.clone(),
            winner: winner.clone(),
            gameweek,
            impacts,
            cascaded,
        })
    }

    async fn commit(
        &self,
        pool_id: &PoolId,
        winner: &OptionId,
        gameweek: GameweekNumber,
    ) -> Result<Vec<DeclaredImpact>> {
        let index = GameweekIndex::try_new(self.store.gameweeks().await?)?;
        if !index.contains(gameweek) {
            return Err(SettlementError::UnknownGameweek(gameweek).into());
        }
        let pool = self
            .store
            .pool(pool_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownPool(pool_id.clone()))?;
        if pool.option(winner).is_none() {
            return Err(ValidationError::UnknownOption {
                pool: pool_id.clone(),
                option: winner.clone(),
            }
            .into());
        }

        let bets = self.store.bets(pool_id).await?;
        let previous = self.store.outcome(pool_id).await?;
        let deltas = settle_pool(&pool, &bets, previous.as_ref(), winner)?;

        let recorded = recorded_totals(self.store.pool_adjustments(pool_id).await?);
        for delta in &deltas {
            check_consistency(pool_id, delta, &recorded)?;
        }

        let mut entries = self.store.entries(gameweek).await?;
        let mut impacts = Vec::with_capacity(deltas.len());
        let mut adjustments = Vec::new();
        let mut touched = Vec::new();

        for d in &deltas {
            let amount = d.delta();
            let mut applied = false;
            if !amount.is_zero() {
                adjustments.push(SpecialAdjustment {
                    pool: pool_id.clone(),
                    player: d.player.clone(),
                    gameweek,
                    amount,
                });
                if let Some(entry) = entries.iter_mut().find(|e| e.player() == &d.player) {
                    entry.apply_special(amount);
                    touched.push(entry.clone());
                    applied = true;
                }
            }
            impacts.push(DeclaredImpact {
                player: d.player.clone(),
                old_impact: d.old_impact,
                new_impact: d.new_impact,
                delta: amount,
                applied,
            });
        }

        let commit = PropositionCommit {
            outcome: PropositionOutcome {
                pool: pool_id.clone(),
                winner: winner.clone(),
                gameweek,
            },
            adjustments,
            entries: touched,
        };
        self.store.commit_proposition(&commit).await?;
        Ok(impacts)
    }
}

fn recorded_totals(adjustments: Vec<SpecialAdjustment>) -> HashMap<PlayerId, Money> {
    let mut totals: HashMap<PlayerId, Money> = HashMap::new();
    for adj in adjustments {
        *totals.entry(adj.player).or_insert(Decimal::ZERO) += adj.amount;
    }
    totals
}

fn check_consistency(
    pool: &PoolId,
    delta: &PropositionDelta,
    recorded: &HashMap<PlayerId, Money>,
) -> Result<()> {
    let total = recorded.get(&delta.player).copied().unwrap_or(Decimal::ZERO);
    if total + delta.delta() == delta.new_impact {
        Ok(())
    } else {
        Err(ConsistencyError {
            pool: pool.clone(),
            player: delta.player.clone(),
            recorded: total + delta.delta(),
            expected: delta.new_impact,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    fn delta(old: Money, new: Money) -> PropositionDelta {
        PropositionDelta {
            player: PlayerId::from("alice"),
            old_impact: old,
            new_impact: new,
        }
    }

    #[test]
    fn consistent_when_recorded_matches_old_impact() {
        let recorded: HashMap<PlayerId, Money> =
            [(PlayerId::from("alice"), dec!(90.91))].into_iter().collect();
        let pool = PoolId::from("title");
        assert!(check_consistency(&pool, &delta(dec!(90.91), dec!(-100)), &recorded).is_ok());
    }

    #[test]
    fn drift_is_reported() {
        let recorded: HashMap<PlayerId, Money> =
            [(PlayerId::from("alice"), dec!(50))].into_iter().collect();
        let pool = PoolId::from("title");
        let err = check_consistency(&pool, &delta(dec!(90.91), dec!(-100)), &recorded).unwrap_err();
        assert!(matches!(
            err,
            Error::Consistency(ConsistencyError { expected, .. }) if expected == dec!(-100)
        ));
    }

    #[test]
    fn first_declaration_needs_no_history() {
        let pool = PoolId::from("title");
        assert!(check_consistency(&pool, &delta(dec!(0), dec!(90.91)), &HashMap::new()).is_ok());
    }
}
