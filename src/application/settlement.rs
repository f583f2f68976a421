//! Results posting and gameweek settlement.
//!
//! Settling a gameweek loads every input, runs the pure ledger computation
//! and writes the whole gameweek with one `replace_entries` call. Later
//! gameweeks that were already settled are then re-settled in ascending
//! order so cumulative balances follow corrections.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::state::PoolLocks;
use crate::domain::{
    GameweekIndex, GameweekLedger, GameweekNumber, LedgerEntry, Money, PlayerId, ResultBook,
    Season, SettleBlock,
};
use crate::error::{Error, Result, SettlementError};
use crate::port::outbound::store::PoolStore;

/// What a settlement run changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub gameweek: GameweekNumber,
    pub entries: Vec<LedgerEntry>,
    /// Later gameweeks re-settled as a consequence, ascending.
    pub cascaded: Vec<GameweekNumber>,
}

/// Outcome of posting results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsReport {
    pub gameweek: GameweekNumber,
    pub posted: usize,
    /// Games still without a result.
    pub pending: usize,
    /// Present when the gameweek became complete and was settled.
    pub settlement: Option<SettlementReport>,
}

/// Posts results and maintains ledger entries.
pub struct SettlementService<S> {
    store: Arc<S>,
    locks: Arc<PoolLocks>,
}

impl<S> Clone for SettlementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: PoolStore> SettlementService<S> {
    #[must_use]
    pub fn new(store: Arc<S>, locks: Arc<PoolLocks>) -> Self {
        Self { store, locks }
    }

    /// Merge `results` into the gameweek's posted results. Once every game
    /// has a result the gameweek is settled.
    ///
    /// # Errors
    /// Fails for an unknown gameweek, a result for a game outside the
    /// gameweek, or any store/settlement failure.
    pub async fn post_results(
        &self,
        gameweek: GameweekNumber,
        results: ResultBook,
    ) -> Result<ResultsReport> {
        let guard = self.locks.gameweek(gameweek).await;
        self.require_gameweek(gameweek).await?;

        let games = self.store.games(gameweek).await?;
        for (game, _) in results.iter() {
            if !games.iter().any(|g| &g.id == game) {
                warn!(gameweek, game = %game, "result rejected: game not in gameweek");
                return Err(SettlementError::ForeignGame {
                    game: game.clone(),
                    gameweek,
                }
                .into());
            }
        }

        let mut book = self.store.results(gameweek).await?;
        let posted = results.len();
        for (game, result) in results.iter() {
            book.insert(game.clone(), result);
        }
        self.store.replace_results(gameweek, &book).await?;

        let pending = book.pending(&games).len();
        info!(gameweek, posted, pending, "results posted");

        let settlement = if pending == 0 {
            let entries = self.settle_locked(gameweek).await?;
            drop(guard);
            let cascaded = self.cascade_after(gameweek).await?;
            Some(SettlementReport {
                gameweek,
                entries,
                cascaded,
            })
        } else {
            None
        };

        Ok(ResultsReport {
            gameweek,
            posted,
            pending,
            settlement,
        })
    }

    /// Settle one gameweek and cascade into later settled gameweeks.
    ///
    /// # Errors
    /// [`SettlementError::ResultsIncomplete`] when a game has no result;
    /// stored entries are left untouched in that case.
    pub async fn settle_gameweek(&self, gameweek: GameweekNumber) -> Result<SettlementReport> {
        let entries = {
            let _guard = self.locks.gameweek(gameweek).await;
            self.settle_locked(gameweek).await?
        };
        let cascaded = self.cascade_after(gameweek).await?;

        Ok(SettlementReport {
            gameweek,
            entries,
            cascaded,
        })
    }

    /// Re-settle every already settled gameweek after `gameweek`, ascending.
    pub(crate) async fn cascade_after(
        &self,
        gameweek: GameweekNumber,
    ) -> Result<Vec<GameweekNumber>> {
        let later: Vec<GameweekNumber> = self
            .store
            .settled_gameweeks()
            .await?
            .into_iter()
            .filter(|&gw| gw > gameweek)
            .collect();

        for &gw in &later {
            let _guard = self.locks.gameweek(gw).await;
            self.settle_locked(gw).await?;
            debug!(gameweek = gw, after = gameweek, "cascaded re-settlement");
        }
        Ok(later)
    }

    /// Whether every game of a non-empty gameweek has a result.
    pub(crate) async fn is_complete(&self, gameweek: GameweekNumber) -> Result<bool> {
        let games = self.store.games(gameweek).await?;
        Ok(!games.is_empty() && self.store.results(gameweek).await?.is_complete(&games))
    }

    /// Settle with the gameweek lock already held by the caller.
    pub(crate) async fn settle_locked(&self, gameweek: GameweekNumber) -> Result<Vec<LedgerEntry>> {
        let season = self.require_gameweek(gameweek).await?;

        let games = self.store.games(gameweek).await?;
        let results = self.store.results(gameweek).await?;
        let wagers = self.store.wagers(gameweek).await?;
        let previous = match gameweek.checked_sub(1) {
            Some(prev) if prev > 0 => self.store.entries(prev).await?,
            _ => Vec::new(),
        };
        let specials = specials_by_player(
            self.store
                .gameweek_adjustments(gameweek)
                .await?
                .into_iter()
                .map(|adj| (adj.player, adj.amount)),
        );

        let ledger = GameweekLedger {
            gameweek,
            base_allowance: season.base_allowance(),
            games: &games,
            results: &results,
            wagers: &wagers,
            previous: &previous,
            specials: &specials,
        };
        let entries = ledger.settle().map_err(|block| {
            let err = match block {
                SettleBlock::Pending(pending) => SettlementError::ResultsIncomplete {
                    gameweek,
                    pending,
                },
                SettleBlock::Invalid(err) => SettlementError::Invalid(err),
            };
            warn!(gameweek, error = %err, "settlement refused");
            Error::from(err)
        })?;

        self.store.replace_entries(gameweek, &entries).await?;
        info!(gameweek, players = entries.len(), "gameweek settled");
        Ok(entries)
    }

    async fn require_gameweek(&self, gameweek: GameweekNumber) -> Result<Season> {
        let season = self.store.season().await?.ok_or(Error::NoSeason)?;
        let index = GameweekIndex::try_new(self.store.gameweeks().await?)
            .map_err(SettlementError::Invalid)?;
        if !index.contains(gameweek) {
            return Err(SettlementError::UnknownGameweek(gameweek).into());
        }
        Ok(season)
    }
}

fn specials_by_player<I>(amounts: I) -> HashMap<PlayerId, Money>
where
    I: IntoIterator<Item = (PlayerId, Money)>,
{
    let mut totals: HashMap<PlayerId, Money> = HashMap::new();
    for (player, amount) in amounts {
        *totals.entry(player).or_insert(Decimal::ZERO) += amount;
    }
    totals
}
