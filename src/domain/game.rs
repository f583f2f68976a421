//! Games and the posted results for a gameweek.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::id::{GameId, GameweekNumber};
use super::odds::{FractionalOdds, GameResult, Outcome};

/// A fixture with odds for each of its three outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub gameweek: GameweekNumber,
    pub home_team: String,
    pub away_team: String,
    pub home_odds: FractionalOdds,
    pub draw_odds: FractionalOdds,
    pub away_odds: FractionalOdds,
}

impl Game {
    /// Odds offered for a predicted outcome.
    #[must_use]
    pub const fn odds_for(&self, outcome: Outcome) -> FractionalOdds {
        match outcome {
            Outcome::Home => self.home_odds,
            Outcome::Draw => self.draw_odds,
            Outcome::Away => self.away_odds,
        }
    }

    /// Human-readable fixture label, e.g. `Leeds vs Burnley`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Posted results keyed by game. A game with no entry is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBook {
    results: HashMap<GameId, GameResult>,
}

impl ResultBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the result for a game.
    pub fn insert(&mut self, game: GameId, result: GameResult) {
        self.results.insert(game, result);
    }

    #[must_use]
    pub fn get(&self, game: &GameId) -> Option<GameResult> {
        self.results.get(game).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GameId, GameResult)> {
        self.results.iter().map(|(game, result)| (game, *result))
    }

    /// Games from `games` that have no posted result yet.
    #[must_use]
    pub fn pending<'a>(&self, games: &'a [Game]) -> Vec<&'a GameId> {
        games
            .iter()
            .filter(|game| !self.results.contains_key(&game.id))
            .map(|game| &game.id)
            .collect()
    }

    /// True when every game in `games` has a result.
    #[must_use]
    pub fn is_complete(&self, games: &[Game]) -> bool {
        games.iter().all(|game| self.results.contains_key(&game.id))
    }
}

impl FromIterator<(GameId, GameResult)> for ResultBook {
    fn from_iter<I: IntoIterator<Item = (GameId, GameResult)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
