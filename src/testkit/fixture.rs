//! A seeded in-memory pool.
//!
//! Gameweeks are written straight to the store, so tests can lay out any
//! season shape without going through `open_gameweek`'s ordering checks.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use super::domain;
use crate::adapter::outbound::memory::MemoryStore;
use crate::application::{Pool, ResultsReport, WagerRequest};
use crate::domain::{
    Game, GameweekNumber, LedgerEntry, Money, PropositionPool, Season, Wager,
    DEFAULT_BASE_ALLOWANCE,
};
use crate::error::Result;
use crate::port::outbound::store::{LedgerStore, PropositionStore, SeasonStore};

pub struct PoolFixture {
    pub store: Arc<MemoryStore>,
    pub pool: Pool<MemoryStore>,
}

impl PoolFixture {
    /// Season with the default 100.00 allowance.
    pub async fn new() -> Self {
        Self::with_allowance(DEFAULT_BASE_ALLOWANCE).await
    }

    pub async fn with_allowance(base_allowance: Money) -> Self {
        let store = Arc::new(MemoryStore::new());
        let season = Season::try_new("Test season", base_allowance)
            .unwrap_or_else(|e| panic!("invalid season: {e}"));
        store
            .save_season(&season)
            .await
            .unwrap_or_else(|e| panic!("seed season: {e}"));
        let pool = Pool::new(Arc::clone(&store));
        Self { store, pool }
    }

    /// Gameweek open for a week, with `games`.
    pub async fn gameweek(&self, number: GameweekNumber, games: Vec<Game>) {
        self.gameweek_with_deadline(number, 7, games).await;
    }

    pub async fn gameweek_with_deadline(
        &self,
        number: GameweekNumber,
        days_to_deadline: i64,
        games: Vec<Game>,
    ) {
        self.store
            .save_gameweek(&domain::gameweek(number, days_to_deadline))
            .await
            .unwrap_or_else(|e| panic!("seed gameweek {number}: {e}"));
        self.store
            .save_games(&games)
            .await
            .unwrap_or_else(|e| panic!("seed games: {e}"));
    }

    /// Admit a wager through the admission service.
    pub async fn place(
        &self,
        player: &str,
        gameweek: GameweekNumber,
        stake: Money,
        picks: &[(&str, &str)],
    ) -> Result<Wager> {
        self.pool
            .admission
            .place_wager(
                WagerRequest {
                    player: domain::player(player),
                    gameweek,
                    stake,
                    legs: domain::legs(picks),
                },
                Utc::now(),
            )
            .await
    }

    pub async fn post(
        &self,
        gameweek: GameweekNumber,
        posted: &[(&str, &str)],
    ) -> Result<ResultsReport> {
        self.pool
            .settlement
            .post_results(gameweek, domain::results(posted))
            .await
    }

    pub async fn add_proposition(&self, pool: &PropositionPool) {
        self.store
            .save_pool(pool)
            .await
            .unwrap_or_else(|e| panic!("seed pool: {e}"));
    }

    /// Stored entry, panicking when absent.
    pub async fn entry(&self, player: &str, gameweek: GameweekNumber) -> LedgerEntry {
        self.store
            .entry(&domain::player(player), gameweek)
            .await
            .unwrap_or_else(|e| panic!("load entry: {e}"))
            .unwrap_or_else(|| panic!("no entry for {player} in gameweek {gameweek}"))
    }

    /// `(weekly, banked, provisional)` for a stored entry.
    pub async fn balances(&self, player: &str, gameweek: GameweekNumber) -> (Decimal, Decimal, Decimal) {
        let entry = self.entry(player, gameweek).await;
        (entry.weekly(), entry.banked(), entry.provisional())
    }
}
