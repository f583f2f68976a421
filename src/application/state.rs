//! Shared lock registry for serializing writes.
//!
//! Settlement and proposition declaration hold the gameweek lock
//! exclusively. Wager admission holds the (player, gameweek) lock and a
//! shared gameweek lock across its read-check-write, so no wager lands
//! while its gameweek is being settled. Declarations for one pool are
//! serialized on the pool lock.
//!
//! Acquisition order is pool, then player-gameweek, then gameweek.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::domain::{GameweekNumber, PlayerId, PoolId};

/// Lazily created async locks keyed by gameweek, player-gameweek and pool.
#[derive(Debug, Default)]
pub struct PoolLocks {
    gameweeks: DashMap<GameweekNumber, Arc<RwLock<()>>>,
    admissions: DashMap<(PlayerId, GameweekNumber), Arc<Mutex<()>>>,
    pools: DashMap<PoolId, Arc<Mutex<()>>>,
}

impl PoolLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a gameweek's ledger.
    pub async fn gameweek(&self, gameweek: GameweekNumber) -> OwnedRwLockWriteGuard<()> {
        let lock = self.gameweeks.entry(gameweek).or_default().clone();
        lock.write_owned().await
    }

    /// Shared access to a gameweek: blocks only while it is being settled.
    pub async fn gameweek_shared(&self, gameweek: GameweekNumber) -> OwnedRwLockReadGuard<()> {
        let lock = self.gameweeks.entry(gameweek).or_default().clone();
        lock.read_owned().await
    }

    /// Wait for exclusive access to one player's wagers in a gameweek.
    pub async fn admission(&self, player: &PlayerId, gameweek: GameweekNumber) -> OwnedMutexGuard<()> {
        let lock = self
            .admissions
            .entry((player.clone(), gameweek))
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Wait for exclusive access to a proposition pool's outcome.
    pub async fn pool(&self, pool: &PoolId) -> OwnedMutexGuard<()> {
        let lock = self.pools.entry(pool.clone()).or_default().clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_gameweek_is_exclusive() {
        let locks = Arc::new(PoolLocks::new());
        let guard = locks.gameweek(1).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.gameweek(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = PoolLocks::new();
        let _one = locks.gameweek(1).await;
        let _two = locks.gameweek(2).await;
        let _a = locks.admission(&PlayerId::from("a"), 1).await;
        let _b = locks.admission(&PlayerId::from("b"), 1).await;
        let _title = locks.pool(&PoolId::from("title")).await;
        let _cup = locks.pool(&PoolId::from("cup")).await;
    }

    #[tokio::test]
    async fn admissions_share_a_gameweek_but_settlement_waits() {
        let locks = Arc::new(PoolLocks::new());
        let first = locks.gameweek_shared(1).await;
        let second = locks.gameweek_shared(1).await;

        let settlement = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.gameweek(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!settlement.is_finished());

        drop(first);
        drop(second);
        settlement.await.unwrap();
    }

    #[tokio::test]
    async fn same_pool_is_exclusive() {
        let locks = Arc::new(PoolLocks::new());
        let guard = locks.pool(&PoolId::from("title")).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.pool(&PoolId::from("title")).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
