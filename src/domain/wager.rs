//! Accumulator wagers: leg resolution, pricing and weekly aggregation.
//!
//! An accumulator is all-or-nothing: one incorrect leg loses the whole
//! stake, postponed games are void and simply drop out of the product,
//! and a wager whose legs are all void returns its stake.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::game::{Game, ResultBook};
use super::id::{GameId, GameweekNumber, PlayerId, WagerId};
use super::money::{round_money, Money};
use super::odds::{GameResult, Outcome};

/// One game pick inside an accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub game: GameId,
    pub prediction: Outcome,
}

impl Leg {
    pub fn new(game: impl Into<GameId>, prediction: Outcome) -> Self {
        Self {
            game: game.into(),
            prediction,
        }
    }

    /// Resolve this leg against the posted results.
    #[must_use]
    pub fn state(&self, results: &ResultBook) -> LegState {
        match results.get(&self.game) {
            None => LegState::Pending,
            Some(GameResult::Postponed) => LegState::Void,
            Some(result) if result.winning_outcome() == Some(self.prediction) => LegState::Correct,
            Some(_) => LegState::Incorrect,
        }
    }
}

/// Resolution of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegState {
    Correct,
    Incorrect,
    Void,
    Pending,
}

/// Result of pricing a wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payout {
    /// At least one leg has no result yet.
    Pending,
    /// Amount returned to the player (stake included), unrounded.
    Settled(Money),
}

impl Payout {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Settled amount, if any.
    #[must_use]
    pub const fn amount(&self) -> Option<Money> {
        match self {
            Self::Pending => None,
            Self::Settled(amount) => Some(*amount),
        }
    }
}

/// A multi-leg accumulator placed by one player in one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    id: WagerId,
    player: PlayerId,
    gameweek: GameweekNumber,
    stake: Money,
    legs: Vec<Leg>,
    placed_at: DateTime<Utc>,
}

impl Wager {
    /// Create a new wager with a generated id.
    ///
    /// # Errors
    /// Returns a [`DomainError`] when the stake is not positive, there are
    /// no legs, or a game is picked twice.
    pub fn try_new(
        player: PlayerId,
        gameweek: GameweekNumber,
        stake: Money,
        legs: Vec<Leg>,
    ) -> Result<Self, DomainError> {
        Self::try_with_id(WagerId::new(), player, gameweek, stake, legs, Utc::now())
    }

    /// Create a wager with an explicit id, e.g. when editing or restoring
    /// a stored wager.
    ///
    /// # Errors
    /// Same rules as [`Wager::try_new`].
    pub fn try_with_id(
        id: WagerId,
        player: PlayerId,
        gameweek: GameweekNumber,
        stake: Money,
        legs: Vec<Leg>,
        placed_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if stake <= Decimal::ZERO {
            return Err(DomainError::NonPositiveStake { stake });
        }
        if legs.is_empty() {
            return Err(DomainError::EmptyLegs);
        }
        let mut seen = HashSet::with_capacity(legs.len());
        for leg in &legs {
            if !seen.insert(&leg.game) {
                return Err(DomainError::DuplicateGame {
                    game: leg.game.clone(),
                });
            }
        }

        Ok(Self {
            id,
            player,
            gameweek,
            stake: round_money(stake),
            legs,
            placed_at,
        })
    }

    #[must_use]
    pub const fn id(&self) -> &WagerId {
        &self.id
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerId {
        &self.player
    }

    #[must_use]
    pub const fn gameweek(&self) -> GameweekNumber {
        self.gameweek
    }

    #[must_use]
    pub const fn stake(&self) -> Money {
        self.stake
    }

    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    #[must_use]
    pub const fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Price this wager against `games` (for odds) and `results`.
    ///
    /// Pending legs make the whole wager pending. Otherwise an incorrect leg
    /// short-circuits to zero, void legs are skipped and correct legs
    /// multiply the running multiplier.
    ///
    /// # Errors
    /// Returns [`DomainError::UnknownGame`] when a leg references a game
    /// missing from `games`.
    pub fn price(&self, games: &[Game], results: &ResultBook) -> Result<Payout, DomainError> {
        if self
            .legs
            .iter()
            .any(|leg| leg.state(results) == LegState::Pending)
        {
            return Ok(Payout::Pending);
        }

        let mut multiplier = Decimal::ONE;
        for leg in &self.legs {
            match leg.state(results) {
                LegState::Void | LegState::Pending => {}
                LegState::Incorrect => return Ok(Payout::Settled(Decimal::ZERO)),
                LegState::Correct => {
                    let game = games.iter().find(|g| g.id == leg.game).ok_or_else(|| {
                        DomainError::UnknownGame {
                            game: leg.game.clone(),
                        }
                    })?;
                    multiplier *= game.odds_for(leg.prediction).payout_multiplier();
                }
            }
        }

        Ok(Payout::Settled(self.stake * multiplier))
    }
}

/// Sum a player's settled payouts for a gameweek and subtract the weekly
/// allowance, rounding the result to two places.
#[must_use]
pub fn weekly_net<I>(payouts: I, allowance: Money) -> Money
where
    I: IntoIterator<Item = Money>,
{
    let total: Money = payouts.into_iter().sum();
    round_money(total - allowance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::odds::FractionalOdds;
    use rust_decimal_macros::dec;

    fn odds(n: u32, d: u32) -> FractionalOdds {
        FractionalOdds::try_new(n, d).unwrap()
    }

    fn game(id: &str, home: (u32, u32), draw: (u32, u32), away: (u32, u32)) -> Game {
        Game {
            id: GameId::from(id),
            gameweek: 1,
            home_team: format!("{id}-home"),
            away_team: format!("{id}-away"),
            home_odds: odds(home.0, home.1),
            draw_odds: odds(draw.0, draw.1),
            away_odds: odds(away.0, away.1),
        }
    }

    fn wager(stake: Decimal, legs: Vec<Leg>) -> Wager {
        Wager::try_new(PlayerId::from("alice"), 1, stake, legs).unwrap()
    }

    fn results(pairs: &[(&str, GameResult)]) -> ResultBook {
        pairs
            .iter()
            .map(|(id, result)| (GameId::from(*id), *result))
            .collect()
    }

    #[test]
    fn rejects_structurally_invalid_wagers() {
        let player = PlayerId::from("alice");
        assert_eq!(
            Wager::try_new(player.clone(), 1, dec!(10), vec![]),
            Err(DomainError::EmptyLegs)
        );
        assert_eq!(
            Wager::try_new(player.clone(), 1, dec!(0), vec![Leg::new("g1", Outcome::Home)]),
            Err(DomainError::NonPositiveStake { stake: dec!(0) })
        );
        assert_eq!(
            Wager::try_new(
                player,
                1,
                dec!(10),
                vec![Leg::new("g1", Outcome::Home), Leg::new("g1", Outcome::Away)]
            ),
            Err(DomainError::DuplicateGame {
                game: GameId::from("g1")
            })
        );
    }

    #[test]
    fn leg_states_follow_results() {
        let book = results(&[("g1", GameResult::Home), ("g2", GameResult::Postponed)]);
        assert_eq!(Leg::new("g1", Outcome::Home).state(&book), LegState::Correct);
        assert_eq!(Leg::new("g1", Outcome::Draw).state(&book), LegState::Incorrect);
        assert_eq!(Leg::new("g2", Outcome::Away).state(&book), LegState::Void);
        assert_eq!(Leg::new("g3", Outcome::Away).state(&book), LegState::Pending);
    }

    #[test]
    fn single_leg_win_pays_stake_times_multiplier() {
        let games = vec![game("g", (1, 50), (1, 20), (100, 1))];
        let w = wager(dec!(100), vec![Leg::new("g", Outcome::Home)]);
        let payout = w.price(&games, &results(&[("g", GameResult::Home)])).unwrap();
        assert_eq!(payout, Payout::Settled(dec!(102)));
        assert_eq!(weekly_net([dec!(102)], dec!(100)), dec!(2.00));
    }

    #[test]
    fn any_incorrect_leg_loses_everything() {
        let games = vec![
            game("g1", (1, 2), (3, 4), (5, 6)),
            game("g2", (1, 2), (3, 4), (5, 6)),
            game("g3", (1, 2), (3, 4), (5, 6)),
        ];
        let w = wager(
            dec!(25),
            vec![
                Leg::new("g1", Outcome::Home),
                Leg::new("g2", Outcome::Away),
                Leg::new("g3", Outcome::Draw),
            ],
        );
        let book = results(&[
            ("g1", GameResult::Home),
            ("g2", GameResult::Away),
            ("g3", GameResult::Home),
        ]);
        assert_eq!(w.price(&games, &book).unwrap(), Payout::Settled(Decimal::ZERO));
    }

    #[test]
    fn all_void_legs_refund_the_stake() {
        let games = vec![game("g", (6, 5), (4, 3), (100, 1))];
        let book = results(&[("g", GameResult::Postponed)]);
        let payouts: Vec<Money> = [Outcome::Home, Outcome::Draw, Outcome::Away]
            .into_iter()
            .map(|pick| {
                wager(dec!(20), vec![Leg::new("g", pick)])
                    .price(&games, &book)
                    .unwrap()
                    .amount()
                    .unwrap()
            })
            .collect();

        assert_eq!(payouts, vec![dec!(20), dec!(20), dec!(20)]);
        assert_eq!(weekly_net(payouts, dec!(100)), dec!(-40.00));
    }

    #[test]
    fn void_leg_drops_out_of_the_product() {
        let games = vec![
            game("g1", (1, 2), (3, 4), (5, 6)),
            game("g2", (1, 2), (3, 4), (5, 6)),
        ];
        let w = wager(
            dec!(25),
            vec![Leg::new("g1", Outcome::Home), Leg::new("g2", Outcome::Away)],
        );
        let book = results(&[("g1", GameResult::Home), ("g2", GameResult::Postponed)]);
        assert_eq!(w.price(&games, &book).unwrap(), Payout::Settled(dec!(37.5)));
    }

    #[test]
    fn pending_leg_makes_wager_pending_even_with_a_loser() {
        let games = vec![
            game("g1", (1, 2), (3, 4), (5, 6)),
            game("g2", (1, 2), (3, 4), (5, 6)),
        ];
        let w = wager(
            dec!(25),
            vec![Leg::new("g1", Outcome::Draw), Leg::new("g2", Outcome::Away)],
        );
        let book = results(&[("g1", GameResult::Home)]);
        assert!(w.price(&games, &book).unwrap().is_pending());
    }

    #[test]
    fn winning_leg_on_unknown_game_is_an_error() {
        let w = wager(dec!(10), vec![Leg::new("ghost", Outcome::Home)]);
        let book = results(&[("ghost", GameResult::Home)]);
        assert_eq!(
            w.price(&[], &book),
            Err(DomainError::UnknownGame {
                game: GameId::from("ghost")
            })
        );
    }

    #[test]
    fn multi_leg_rounding_happens_only_in_weekly_net() {
        // 25 at 3/2 then 11/6 = 68.75; 25 at 11/6 = 45.8333..; net 14.58.
        let games = vec![
            game("g1", (1, 2), (3, 4), (5, 6)),
            game("g2", (1, 2), (3, 4), (5, 6)),
        ];
        let book = results(&[("g1", GameResult::Home), ("g2", GameResult::Away)]);
        let double = wager(
            dec!(25),
            vec![Leg::new("g1", Outcome::Home), Leg::new("g2", Outcome::Away)],
        );
        let single = wager(dec!(25), vec![Leg::new("g2", Outcome::Away)]);
        let lost = wager(dec!(50), vec![Leg::new("g1", Outcome::Away)]);

        let payouts: Vec<Money> = [double, single, lost]
            .iter()
            .map(|w| w.price(&games, &book).unwrap().amount().unwrap())
            .collect();
        assert_eq!(weekly_net(payouts, dec!(100)), dec!(14.58));
    }
}
