//! League table queries.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{standings, GameweekNumber, Standing};
use crate::error::Result;
use crate::port::outbound::store::PoolStore;

/// A ranked gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsReport {
    pub gameweek: GameweekNumber,
    pub rows: Vec<Standing>,
}

pub struct StandingsService<S> {
    store: Arc<S>,
}

impl<S: PoolStore> StandingsService<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Table for `gameweek`, or for the latest settled gameweek when `None`.
    /// Returns `None` when nothing has been settled yet.
    ///
    /// # Errors
    /// Store failures.
    pub async fn standings(
        &self,
        gameweek: Option<GameweekNumber>,
    ) -> Result<Option<StandingsReport>> {
        let gameweek = match gameweek {
            Some(gw) => gw,
            None => match self.store.settled_gameweeks().await?.last() {
                Some(&gw) => gw,
                None => return Ok(None),
            },
        };

        let current = self.store.entries(gameweek).await?;
        if current.is_empty() {
            return Ok(None);
        }
        let previous = match gameweek.checked_sub(1) {
            Some(prev) if prev > 0 => self.store.entries(prev).await?,
            _ => Vec::new(),
        };

        Ok(Some(StandingsReport {
            gameweek,
            rows: standings(&current, &previous),
        }))
    }
}
