//! Persistence ports for the season, wagers, ledger and propositions.
//!
//! Services depend only on these traits. Every multi-row write that must be
//! all-or-nothing is a single method so adapters can wrap it in one
//! transaction.

use std::future::Future;

use crate::domain::{
    Game, Gameweek, GameweekNumber, LedgerEntry, PlayerId, PoolId, PropositionBet,
    PropositionOutcome, PropositionPool, ResultBook, Season, SpecialAdjustment, Wager, WagerId,
};
use crate::error::Result;

/// Season settings, gameweeks, games and results.
pub trait SeasonStore: Send + Sync {
    /// The season this store holds, if initialised.
    fn season(&self) -> impl Future<Output = Result<Option<Season>>> + Send;

    /// Create or replace the season settings.
    fn save_season(&self, season: &Season) -> impl Future<Output = Result<()>> + Send;

    /// All gameweeks, in any order.
    fn gameweeks(&self) -> impl Future<Output = Result<Vec<Gameweek>>> + Send;

    /// Insert or replace a gameweek.
    fn save_gameweek(&self, gameweek: &Gameweek) -> impl Future<Output = Result<()>> + Send;

    /// Games of one gameweek.
    fn games(&self, gameweek: GameweekNumber) -> impl Future<Output = Result<Vec<Game>>> + Send;

    /// Insert or replace games.
    fn save_games(&self, games: &[Game]) -> impl Future<Output = Result<()>> + Send;

    /// Posted results for the games of one gameweek.
    fn results(&self, gameweek: GameweekNumber)
        -> impl Future<Output = Result<ResultBook>> + Send;

    /// Atomically replace every posted result of a gameweek.
    fn replace_results(
        &self,
        gameweek: GameweekNumber,
        results: &ResultBook,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Accumulator wagers.
pub trait WagerStore: Send + Sync {
    /// Every wager placed in a gameweek.
    fn wagers(&self, gameweek: GameweekNumber) -> impl Future<Output = Result<Vec<Wager>>> + Send;

    /// One player's wagers in a gameweek.
    fn player_wagers(
        &self,
        player: &PlayerId,
        gameweek: GameweekNumber,
    ) -> impl Future<Output = Result<Vec<Wager>>> + Send;

    fn wager(&self, id: &WagerId) -> impl Future<Output = Result<Option<Wager>>> + Send;

    /// Insert a wager, or replace the one with the same id.
    fn save_wager(&self, wager: &Wager) -> impl Future<Output = Result<()>> + Send;
}

/// Settled ledger entries.
pub trait LedgerStore: Send + Sync {
    fn entries(
        &self,
        gameweek: GameweekNumber,
    ) -> impl Future<Output = Result<Vec<LedgerEntry>>> + Send;

    fn entry(
        &self,
        player: &PlayerId,
        gameweek: GameweekNumber,
    ) -> impl Future<Output = Result<Option<LedgerEntry>>> + Send;

    /// Atomically delete every entry of `gameweek` and insert `entries`.
    fn replace_entries(
        &self,
        gameweek: GameweekNumber,
        entries: &[LedgerEntry],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Gameweeks that have at least one entry, ascending.
    fn settled_gameweeks(&self) -> impl Future<Output = Result<Vec<GameweekNumber>>> + Send;
}

/// Everything written when an outcome is declared, committed as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropositionCommit {
    pub outcome: PropositionOutcome,
    /// Deltas to add to the stored (pool, player, gameweek) adjustments.
    pub adjustments: Vec<SpecialAdjustment>,
    /// Updated entries of the declaring gameweek, replacing stored ones.
    pub entries: Vec<LedgerEntry>,
}

/// Proposition pools, bets, outcomes and special adjustments.
pub trait PropositionStore: Send + Sync {
    fn pools(&self) -> impl Future<Output = Result<Vec<PropositionPool>>> + Send;

    fn pool(&self, id: &PoolId) -> impl Future<Output = Result<Option<PropositionPool>>> + Send;

    /// Insert or replace a pool.
    fn save_pool(&self, pool: &PropositionPool) -> impl Future<Output = Result<()>> + Send;

    fn bets(&self, pool: &PoolId) -> impl Future<Output = Result<Vec<PropositionBet>>> + Send;

    /// Record a bet, replacing the player's earlier choice in the pool.
    fn save_bet(&self, bet: &PropositionBet) -> impl Future<Output = Result<()>> + Send;

    fn outcome(
        &self,
        pool: &PoolId,
    ) -> impl Future<Output = Result<Option<PropositionOutcome>>> + Send;

    /// Adjustments recorded for a pool across all gameweeks.
    fn pool_adjustments(
        &self,
        pool: &PoolId,
    ) -> impl Future<Output = Result<Vec<SpecialAdjustment>>> + Send;

    /// Adjustments folded into a gameweek across all pools.
    fn gameweek_adjustments(
        &self,
        gameweek: GameweekNumber,
    ) -> impl Future<Output = Result<Vec<SpecialAdjustment>>> + Send;

    /// Store outcome, adjustment deltas and entry updates atomically.
    fn commit_proposition(
        &self,
        commit: &PropositionCommit,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// The full store a pool needs.
pub trait PoolStore: SeasonStore + WagerStore + LedgerStore + PropositionStore {}

impl<T> PoolStore for T where T: SeasonStore + WagerStore + LedgerStore + PropositionStore {}
