//! In-memory store.
//!
//! Holds everything behind one `RwLock`, so each trait method, including
//! the multi-row replace and commit operations, is atomic.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::domain::{
    Game, GameId, Gameweek, GameweekNumber, LedgerEntry, PlayerId, PoolId, PropositionBet,
    PropositionOutcome, PropositionPool, ResultBook, Season, SpecialAdjustment, Wager, WagerId,
};
use crate::error::Result;
use crate::port::outbound::store::{
    LedgerStore, PropositionCommit, PropositionStore, SeasonStore, WagerStore,
};

type AdjustmentKey = (PoolId, PlayerId, GameweekNumber);

#[derive(Debug, Default)]
struct Inner {
    season: Option<Season>,
    gameweeks: BTreeMap<GameweekNumber, Gameweek>,
    games: BTreeMap<GameId, Game>,
    results: BTreeMap<GameweekNumber, ResultBook>,
    wagers: HashMap<WagerId, Wager>,
    entries: BTreeMap<(GameweekNumber, PlayerId), LedgerEntry>,
    pools: BTreeMap<PoolId, PropositionPool>,
    bets: BTreeMap<(PoolId, PlayerId), PropositionBet>,
    outcomes: HashMap<PoolId, PropositionOutcome>,
    adjustments: BTreeMap<AdjustmentKey, SpecialAdjustment>,
}

/// Store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeasonStore for MemoryStore {
    async fn season(&self) -> Result<Option<Season>> {
        Ok(self.inner.read().season.clone())
    }

    async fn save_season(&self, season: &Season) -> Result<()> {
        self.inner.write().season = Some(season.clone());
        Ok(())
    }

    async fn gameweeks(&self) -> Result<Vec<Gameweek>> {
        Ok(self.inner.read().gameweeks.values().cloned().collect())
    }

    async fn save_gameweek(&self, gameweek: &Gameweek) -> Result<()> {
        self.inner
            .write()
            .gameweeks
            .insert(gameweek.number, gameweek.clone());
        Ok(())
    }

    async fn games(&self, gameweek: GameweekNumber) -> Result<Vec<Game>> {
        Ok(self
            .inner
            .read()
            .games
            .values()
            .filter(|g| g.gameweek == gameweek)
            .cloned()
            .collect())
    }

    async fn save_games(&self, games: &[Game]) -> Result<()> {
        let mut inner = self.inner.write();
        for game in games {
            inner.games.insert(game.id.clone(), game.clone());
        }
        Ok(())
    }

    async fn results(&self, gameweek: GameweekNumber) -> Result<ResultBook> {
        Ok(self
            .inner
            .read()
            .results
            .get(&gameweek)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_results(&self, gameweek: GameweekNumber, results: &ResultBook) -> Result<()> {
        self.inner.write().results.insert(gameweek, results.clone());
        Ok(())
    }
}

impl WagerStore for MemoryStore {
    async fn wagers(&self, gameweek: GameweekNumber) -> Result<Vec<Wager>> {
        let mut wagers: Vec<Wager> = self
            .inner
            .read()
            .wagers
            .values()
            .filter(|w| w.gameweek() == gameweek)
            .cloned()
            .collect();
        wagers.sort_by(|a, b| a.placed_at().cmp(&b.placed_at()));
        Ok(wagers)
    }

    async fn player_wagers(&self, player: &PlayerId, gameweek: GameweekNumber) -> Result<Vec<Wager>> {
        let mut wagers: Vec<Wager> = self
            .inner
            .read()
            .wagers
            .values()
            .filter(|w| w.gameweek() == gameweek && w.player() == player)
            .cloned()
            .collect();
        wagers.sort_by(|a, b| a.placed_at().cmp(&b.placed_at()));
        Ok(wagers)
    }

    async fn wager(&self, id: &WagerId) -> Result<Option<Wager>> {
        Ok(self.inner.read().wagers.get(id).cloned())
    }

    async fn save_wager(&self, wager: &Wager) -> Result<()> {
        self.inner
            .write()
            .wagers
            .insert(wager.id().clone(), wager.clone());
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    async fn entries(&self, gameweek: GameweekNumber) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .inner
            .read()
            .entries
            .range((gameweek, PlayerId::from(""))..)
            .take_while(|((gw, _), _)| *gw == gameweek)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn entry(&self, player: &PlayerId, gameweek: GameweekNumber) -> Result<Option<LedgerEntry>> {
        Ok(self
            .inner
            .read()
            .entries
            .get(&(gameweek, player.clone()))
            .cloned())
    }

    async fn replace_entries(&self, gameweek: GameweekNumber, entries: &[LedgerEntry]) -> Result<()> {
        let mut inner = self.inner.write();
        inner.entries.retain(|(gw, _), _| *gw != gameweek);
        for entry in entries {
            inner
                .entries
                .insert((gameweek, entry.player().clone()), entry.clone());
        }
        Ok(())
    }

    async fn settled_gameweeks(&self) -> Result<Vec<GameweekNumber>> {
        let mut gameweeks: Vec<GameweekNumber> =
            self.inner.read().entries.keys().map(|(gw, _)| *gw).collect();
        gameweeks.dedup();
        Ok(gameweeks)
    }
}

impl PropositionStore for MemoryStore {
    async fn pools(&self) -> Result<Vec<PropositionPool>> {
        Ok(self.inner.read().pools.values().cloned().collect())
    }

    async fn pool(&self, id: &PoolId) -> Result<Option<PropositionPool>> {
        Ok(self.inner.read().pools.get(id).cloned())
    }

    async fn save_pool(&self, pool: &PropositionPool) -> Result<()> {
        self.inner
            .write()
            .pools
            .insert(pool.id().clone(), pool.clone());
        Ok(())
    }

    async fn bets(&self, pool: &PoolId) -> Result<Vec<PropositionBet>> {
        Ok(self
            .inner
            .read()
            .bets
            .values()
            .filter(|bet| &bet.pool == pool)
            .cloned()
            .collect())
    }

    async fn save_bet(&self, bet: &PropositionBet) -> Result<()> {
        self.inner
            .write()
            .bets
            .insert((bet.pool.clone(), bet.player.clone()), bet.clone());
        Ok(())
    }

    async fn outcome(&self, pool: &PoolId) -> Result<Option<PropositionOutcome>> {
        Ok(self.inner.read().outcomes.get(pool).cloned())
    }

    async fn pool_adjustments(&self, pool: &PoolId) -> Result<Vec<SpecialAdjustment>> {
        Ok(self
            .inner
            .read()
            .adjustments
            .values()
            .filter(|adj| &adj.pool == pool)
            .cloned()
            .collect())
    }

    async fn gameweek_adjustments(&self, gameweek: GameweekNumber) -> Result<Vec<SpecialAdjustment>> {
        Ok(self
            .inner
            .read()
            .adjustments
            .values()
            .filter(|adj| adj.gameweek == gameweek)
            .cloned()
            .collect())
    }

    async fn commit_proposition(&self, commit: &PropositionCommit) -> Result<()> {
        let mut inner = self.inner.write();
        let gameweek = commit.outcome.gameweek;
        inner
            .outcomes
            .insert(commit.outcome.pool.clone(), commit.outcome.clone());
        for delta in &commit.adjustments {
            let key = (delta.pool.clone(), delta.player.clone(), delta.gameweek);
            inner
                .adjustments
                .entry(key)
                .and_modify(|adj| adj.amount += delta.amount)
                .or_insert_with(|| delta.clone());
        }
        for entry in &commit.entries {
            inner
                .entries
                .insert((gameweek, entry.player().clone()), entry.clone());
        }
        Ok(())
    }
}
