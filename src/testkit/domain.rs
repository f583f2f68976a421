//! Builders for domain values used across tests.
//!
//! Odds, outcomes and results are written the way the CLI accepts them
//! (`"10/11"`, `"H"`, `"P"`) so fixtures read like a fixture list.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    FractionalOdds, Game, GameId, GameResult, Gameweek, GameweekNumber, Leg, LedgerEntry, Money,
    OptionId, Outcome, PlayerId, PoolId, PropositionBet, PropositionOption, PropositionPool,
    ResultBook, Wager,
};

pub fn player(id: &str) -> PlayerId {
    PlayerId::from(id)
}

/// Parse `"N/D"` odds.
pub fn odds(raw: &str) -> FractionalOdds {
    raw.parse().unwrap_or_else(|e| panic!("bad odds {raw}: {e}"))
}

/// A game with the given home/draw/away odds.
pub fn game(id: &str, gameweek: GameweekNumber, home: &str, draw: &str, away: &str) -> Game {
    Game {
        id: GameId::from(id),
        gameweek,
        home_team: format!("{id} home"),
        away_team: format!("{id} away"),
        home_odds: odds(home),
        draw_odds: odds(draw),
        away_odds: odds(away),
    }
}

/// A game priced evens on every outcome.
pub fn evens(id: &str, gameweek: GameweekNumber) -> Game {
    game(id, gameweek, "1/1", "1/1", "1/1")
}

/// Legs from `(game, "H"|"D"|"A")` pairs.
pub fn legs(picks: &[(&str, &str)]) -> Vec<Leg> {
    picks
        .iter()
        .map(|(game, pick)| {
            let outcome: Outcome = pick.parse().unwrap_or_else(|e| panic!("{e}"));
            Leg::new(*game, outcome)
        })
        .collect()
}

pub fn wager(player_id: &str, gameweek: GameweekNumber, stake: Money, picks: &[(&str, &str)]) -> Wager {
    Wager::try_new(player(player_id), gameweek, stake, legs(picks))
        .unwrap_or_else(|e| panic!("invalid wager: {e}"))
}

/// Results from `(game, "H"|"D"|"A"|"P")` pairs.
pub fn results(posted: &[(&str, &str)]) -> ResultBook {
    let mut book = ResultBook::new();
    for (game, result) in posted {
        let result: GameResult = result.parse().unwrap_or_else(|e| panic!("{e}"));
        book.insert(GameId::from(*game), result);
    }
    book
}

/// Deadline `days` from now; negative values give a closed gameweek.
pub fn deadline_in(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

pub fn gameweek(number: GameweekNumber, days_to_deadline: i64) -> Gameweek {
    Gameweek::new(number, deadline_in(days_to_deadline))
}

pub fn option(id: &str, raw_odds: &str) -> PropositionOption {
    PropositionOption {
        id: OptionId::from(id),
        description: id.to_uppercase(),
        odds: odds(raw_odds),
    }
}

pub fn proposition(
    id: &str,
    gameweek: GameweekNumber,
    allowance: Money,
    options: Vec<PropositionOption>,
) -> PropositionPool {
    PropositionPool::try_new(PoolId::from(id), gameweek, id, allowance, options)
        .unwrap_or_else(|e| panic!("invalid pool: {e}"))
}

pub fn bet(pool: &str, player_id: &str, choice: &str) -> PropositionBet {
    PropositionBet {
        pool: PoolId::from(pool),
        player: player(player_id),
        option: OptionId::from(choice),
    }
}

pub fn entry(
    player_id: &str,
    gameweek: GameweekNumber,
    weekly: Money,
    special: Money,
    banked: Money,
) -> LedgerEntry {
    LedgerEntry::new(player(player_id), gameweek, weekly, special, banked)
}

/// Entry with only a `banked` balance.
pub fn banked(player_id: &str, gameweek: GameweekNumber, amount: Money) -> LedgerEntry {
    entry(player_id, gameweek, Decimal::ZERO, Decimal::ZERO, amount)
}
