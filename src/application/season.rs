//! Season setup: settings, gameweek sequence and fixture import.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::state::PoolLocks;
use crate::domain::{
    FractionalOdds, Game, GameId, Gameweek, GameweekIndex, GameweekNumber, Money, OptionId,
    PoolId, PropositionOption, PropositionPool, Season,
};
use crate::error::{Error, Result, SettlementError};
use crate::port::outbound::store::PoolStore;

/// JSON document accepted by [`SeasonService::import`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonImport {
    #[serde(default)]
    pub season: Option<SeasonSettings>,
    #[serde(default)]
    pub gameweeks: Vec<GameweekImport>,
    #[serde(default)]
    pub propositions: Vec<PoolImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSettings {
    pub name: String,
    pub base_allowance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameweekImport {
    pub number: GameweekNumber,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub spiel: Option<String>,
    #[serde(default)]
    pub games: Vec<GameImport>,
}

/// Odds are written as `"N/D"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameImport {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_odds: String,
    pub draw_odds: String,
    pub away_odds: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolImport {
    pub id: String,
    pub gameweek: GameweekNumber,
    pub description: String,
    pub allowance: Money,
    pub options: Vec<OptionImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionImport {
    pub id: String,
    pub description: String,
    pub odds: String,
}

/// Counts of what an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub gameweeks: usize,
    pub games: usize,
    pub pools: usize,
}

/// Season settings, gameweeks and fixtures.
pub struct SeasonService<S> {
    store: Arc<S>,
    locks: Arc<PoolLocks>,
}

impl<S: PoolStore> SeasonService<S> {
    #[must_use]
    pub fn new(store: Arc<S>, locks: Arc<PoolLocks>) -> Self {
        Self { store, locks }
    }

    /// Create or update the season settings.
    ///
    /// # Errors
    /// Store failures.
    pub async fn init(&self, season: &Season) -> Result<()> {
        self.store.save_season(season).await?;
        info!(season = season.name(), base_allowance = %season.base_allowance(), "season initialised");
        Ok(())
    }

    /// The ordered gameweek sequence.
    ///
    /// # Errors
    /// Store failures or a broken sequence at rest.
    pub async fn index(&self) -> Result<GameweekIndex> {
        Ok(GameweekIndex::try_new(self.store.gameweeks().await?)?)
    }

    /// Open the next gameweek. Refused while the latest gameweek still has
    /// games without results.
    ///
    /// # Errors
    /// [`Error::NoSeason`] or [`SettlementError::PreviousIncomplete`].
    pub async fn open_gameweek(
        &self,
        deadline: DateTime<Utc>,
        spiel: Option<String>,
    ) -> Result<Gameweek> {
        self.store.season().await?.ok_or(Error::NoSeason)?;
        let index = self.index().await?;
        if let Some(latest) = index.latest() {
            let _guard = self.locks.gameweek(latest.number).await;
            let games = self.store.games(latest.number).await?;
            if !self.store.results(latest.number).await?.is_complete(&games) {
                return Err(SettlementError::PreviousIncomplete(latest.number).into());
            }
        }

        let gameweek = Gameweek {
            number: index.next_number(),
            deadline,
            spiel,
        };
        self.store.save_gameweek(&gameweek).await?;
        info!(gameweek = gameweek.number, deadline = %gameweek.deadline, "gameweek opened");
        Ok(gameweek)
    }

    /// Highest gameweek with at least one game and every result posted.
    ///
    /// # Errors
    /// Store failures.
    pub async fn latest_complete_gameweek(&self) -> Result<Option<GameweekNumber>> {
        let index = self.index().await?;
        for gameweek in index.iter().rev() {
            let games = self.store.games(gameweek.number).await?;
            if games.is_empty() {
                continue;
            }
            if self.store.results(gameweek.number).await?.is_complete(&games) {
                return Ok(Some(gameweek.number));
            }
        }
        Ok(None)
    }

    /// Load a season document. Gameweeks may extend the existing sequence
    /// or update existing gameweeks; the result must stay contiguous.
    ///
    /// # Errors
    /// Invalid odds, a broken gameweek sequence, or a pool opened in an
    /// unknown gameweek. Nothing is written when validation fails.
    pub async fn import(&self, doc: SeasonImport) -> Result<ImportReport> {
        if let Some(settings) = &doc.season {
            let season = Season::try_new(settings.name.clone(), settings.base_allowance)?;
            self.init(&season).await?;
        }
        self.store.season().await?.ok_or(Error::NoSeason)?;

        let mut merged: BTreeMap<GameweekNumber, Gameweek> = self
            .store
            .gameweeks()
            .await?
            .into_iter()
            .map(|gw| (gw.number, gw))
            .collect();
        let mut games = Vec::new();
        for gw in &doc.gameweeks {
            merged.insert(
                gw.number,
                Gameweek {
                    number: gw.number,
                    deadline: gw.deadline,
                    spiel: gw.spiel.clone(),
                },
            );
            for game in &gw.games {
                games.push(Game {
                    id: GameId::from(game.id.as_str()),
                    gameweek: gw.number,
                    home_team: game.home_team.clone(),
                    away_team: game.away_team.clone(),
                    home_odds: parse_odds(&game.home_odds)?,
                    draw_odds: parse_odds(&game.draw_odds)?,
                    away_odds: parse_odds(&game.away_odds)?,
                });
            }
        }
        let index = GameweekIndex::try_new(merged.into_values().collect())?;

        let mut pools = Vec::with_capacity(doc.propositions.len());
        for pool in &doc.propositions {
            if !index.contains(pool.gameweek) {
                return Err(SettlementError::UnknownGameweek(pool.gameweek).into());
            }
            let options = pool
                .options
                .iter()
                .map(|opt| {
                    Ok(PropositionOption {
                        id: OptionId::from(opt.id.as_str()),
                        description: opt.description.clone(),
                        odds: parse_odds(&opt.odds)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            pools.push(PropositionPool::try_new(
                PoolId::from(pool.id.as_str()),
                pool.gameweek,
                pool.description.clone(),
                pool.allowance,
                options,
            )?);
        }

        for gw in &doc.gameweeks {
            if let Some(gameweek) = index.get(gw.number) {
                self.store.save_gameweek(gameweek).await?;
            }
        }
        self.store.save_games(&games).await?;
        for pool in &pools {
            self.store.save_pool(pool).await?;
        }

        let report = ImportReport {
            gameweeks: doc.gameweeks.len(),
            games: games.len(),
            pools: pools.len(),
        };
        info!(
            gameweeks = report.gameweeks,
            games = report.games,
            pools = report.pools,
            "season imported"
        );
        Ok(report)
    }
}

fn parse_odds(text: &str) -> Result<FractionalOdds> {
    text.parse().map_err(Error::Parse)
}
