//! Per-player, per-gameweek balance ledger.
//!
//! Each settled gameweek produces one [`LedgerEntry`] per player:
//!
//! - `weekly`: net result of the gameweek's wagers against the allowance
//! - `special`: proposition impacts folded into this gameweek
//! - `banked`: cumulative amount no longer at risk
//! - `provisional`: `banked + weekly` while `weekly` is positive, else `banked`
//!
//! Losses are banked immediately. Gains stay provisional while they are
//! rolled into the next gameweek's allowance and are banked only once the
//! player leaves them unstaked.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allowance::allowance_for;
use super::error::DomainError;
use super::game::{Game, ResultBook};
use super::id::{GameId, GameweekNumber, PlayerId};
use super::money::{round_money, Money};
use super::wager::{weekly_net, Payout, Wager};

/// Settled figures for one player in one gameweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    player: PlayerId,
    gameweek: GameweekNumber,
    weekly: Money,
    special: Money,
    banked: Money,
    provisional: Money,
}

impl LedgerEntry {
    /// Build an entry, deriving `provisional` from `banked` and `weekly`.
    #[must_use]
    pub fn new(
        player: PlayerId,
        gameweek: GameweekNumber,
        weekly: Money,
        special: Money,
        banked: Money,
    ) -> Self {
        let weekly = round_money(weekly);
        let banked = round_money(banked);
        Self {
            player,
            gameweek,
            weekly,
            special: round_money(special),
            banked,
            provisional: provisional_for(banked, weekly),
        }
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
    pub const fn weekly(&self) -> Money {
        self.weekly
    }

    #[must_use]
    pub const fn special(&self) -> Money {
        self.special
    }

    #[must_use]
    pub const fn banked(&self) -> Money {
        self.banked
    }

    #[must_use]
    pub const fn provisional(&self) -> Money {
        self.provisional
    }

    /// Positive part of `weekly`; the amount that may roll into the next
    /// gameweek's allowance.
    #[must_use]
    pub fn rollable(&self) -> Money {
        self.weekly.max(Decimal::ZERO)
    }

    /// Fold a proposition delta into this entry. `weekly` is untouched.
    pub fn apply_special(&mut self, delta: Money) {
        self.special += delta;
        self.banked += delta;
        self.provisional = provisional_for(self.banked, self.weekly);
    }
}

fn provisional_for(banked: Money, weekly: Money) -> Money {
    if weekly > Decimal::ZERO {
        banked + weekly
    } else {
        banked
    }
}

/// Inputs for one player's entry, gathered by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    pub player: PlayerId,
    /// Net weekly result (already rounded).
    pub weekly: Money,
    /// Allowance the player left unstaked this gameweek.
    pub week_unused: Money,
    /// Proposition impacts folded into this gameweek.
    pub special: Money,
}

/// Derive one player's entry from the previous gameweek's entry.
///
/// `banked = prev_banked + week_unused + min(weekly, 0) + special`.
#[must_use]
pub fn settle_entry(
    gameweek: GameweekNumber,
    previous: Option<&LedgerEntry>,
    input: EntryInput,
) -> LedgerEntry {
    let prev_banked = previous.map_or(Decimal::ZERO, LedgerEntry::banked);
    let enforce_banked = input.weekly.min(Decimal::ZERO);
    let banked = prev_banked + input.week_unused + enforce_banked + input.special;

    LedgerEntry::new(input.player, gameweek, input.weekly, input.special, banked)
}

/// Why a gameweek cannot be settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleBlock {
    /// Some games still have no result.
    Pending(Vec<GameId>),
    /// Inputs violate a domain rule.
    Invalid(DomainError),
}

impl From<DomainError> for SettleBlock {
    fn from(err: DomainError) -> Self {
        Self::Invalid(err)
    }
}

/// Everything needed to settle one gameweek, loaded up front.
#[derive(Debug, Clone, Copy)]
pub struct GameweekLedger<'a> {
    pub gameweek: GameweekNumber,
    pub base_allowance: Money,
    pub games: &'a [Game],
    pub results: &'a ResultBook,
    pub wagers: &'a [Wager],
    /// Entries of the previous gameweek; empty for the first gameweek.
    pub previous: &'a [LedgerEntry],
    /// Proposition impacts per player already folded into this gameweek.
    pub specials: &'a HashMap<PlayerId, Money>,
}

impl GameweekLedger<'_> {
    /// Produce the complete set of entries for this gameweek.
    ///
    /// Players who wagered are settled first, together with newcomers who
    /// only have a proposition adjustment (settled as staking nothing).
    /// Then every player with an entry in the previous gameweek but no
    /// wager forfeits the allowance and any rollable amount. Entries are
    /// returned ordered by player.
    ///
    /// # Errors
    /// [`SettleBlock::Pending`] when a game has no result, or
    /// [`SettleBlock::Invalid`] when a wager references an unknown game.
    pub fn settle(&self) -> Result<Vec<LedgerEntry>, SettleBlock> {
        let pending: Vec<GameId> = self
            .results
            .pending(self.games)
            .into_iter()
            .cloned()
            .collect();
        if !pending.is_empty() {
            return Err(SettleBlock::Pending(pending));
        }

        let previous: HashMap<&PlayerId, &LedgerEntry> = self
            .previous
            .iter()
            .map(|entry| (entry.player(), entry))
            .collect();

        let mut by_player: BTreeMap<&PlayerId, Vec<&Wager>> = BTreeMap::new();
        for wager in self.wagers.iter().filter(|w| w.gameweek() == self.gameweek) {
            by_player.entry(wager.player()).or_default().push(wager);
        }
        // A proposition win or loss with nothing else to carry it settles
        // like a week with nothing staked.
        for (player, amount) in self.specials {
            if !amount.is_zero() && !previous.contains_key(player) {
                by_player.entry(player).or_default();
            }
        }

        let mut entries = Vec::with_capacity(by_player.len() + self.previous.len());

        for (player, wagers) in &by_player {
            let mut payouts = Vec::with_capacity(wagers.len());
            for wager in wagers {
                match wager.price(self.games, self.results)? {
                    Payout::Settled(amount) => payouts.push(amount),
                    Payout::Pending => {
                        let missing = wager
                            .legs()
                            .iter()
                            .filter(|leg| self.results.get(&leg.game).is_none())
                            .map(|leg| leg.game.clone())
                            .collect();
                        return Err(SettleBlock::Pending(missing));
                    }
                }
            }

            let prev = previous.get(player).copied();
            let allowance = allowance_for(self.base_allowance, prev);
            let staked: Money = wagers.iter().map(|w| w.stake()).sum();

            let input = EntryInput {
                player: (*player).clone(),
                weekly: weekly_net(payouts, self.base_allowance),
                week_unused: (allowance - staked).max(Decimal::ZERO),
                special: self.special_for(player),
            };
            entries.push(settle_entry(self.gameweek, prev, input));
        }

        let mut absent: Vec<&LedgerEntry> = self
            .previous
            .iter()
            .filter(|entry| !by_player.contains_key(entry.player()))
            .collect();
        absent.sort_by(|a, b| a.player().cmp(b.player()));

        for prev in absent {
            let input = EntryInput {
                player: prev.player().clone(),
                weekly: -self.base_allowance,
                week_unused: prev.rollable(),
                special: self.special_for(prev.player()),
            };
            entries.push(settle_entry(self.gameweek, Some(prev), input));
        }

        entries.sort_by(|a, b| a.player().cmp(b.player()));
        Ok(entries)
    }

    fn special_for(&self, player: &PlayerId) -> Money {
        self.specials.get(player).copied().unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::odds::{FractionalOdds, GameResult, Outcome};
    use crate::domain::wager::Leg;
    use rust_decimal_macros::dec;

    fn odds(n: u32, d: u32) -> FractionalOdds {
        FractionalOdds::try_new(n, d).unwrap()
    }

    fn game(id: &str, gameweek: GameweekNumber) -> Game {
        Game {
            id: GameId::from(id),
            gameweek,
            home_team: format!("{id}-home"),
            away_team: format!("{id}-away"),
            home_odds: odds(1, 2),
            draw_odds: odds(3, 4),
            away_odds: odds(5, 6),
        }
    }

    fn wager(player: &str, gameweek: GameweekNumber, stake: Money, legs: &[(&str, Outcome)]) -> Wager {
        let legs = legs.iter().map(|(g, o)| Leg::new(*g, *o)).collect();
        Wager::try_new(PlayerId::from(player), gameweek, stake, legs).unwrap()
    }

    fn entry(player: &str, gameweek: GameweekNumber, weekly: Money, banked: Money) -> LedgerEntry {
        LedgerEntry::new(PlayerId::from(player), gameweek, weekly, Decimal::ZERO, banked)
    }

    fn find<'a>(entries: &'a [LedgerEntry], player: &str) -> &'a LedgerEntry {
        entries
            .iter()
            .find(|e| e.player().as_str() == player)
            .unwrap()
    }

    #[test]
    fn provisional_tracks_positive_weekly_only() {
        let up = entry("a", 1, dec!(12.5), dec!(40));
        assert_eq!(up.provisional(), dec!(52.5));
        let down = entry("b", 1, dec!(-12.5), dec!(40));
        assert_eq!(down.provisional(), dec!(40));
        let flat = entry("c", 1, dec!(0), dec!(40));
        assert_eq!(flat.provisional(), dec!(40));
    }

    #[test]
    fn apply_special_moves_banked_and_provisional() {
        let mut e = entry("a", 1, dec!(10), dec!(0));
        e.apply_special(dec!(90.91));
        assert_eq!(e.special(), dec!(90.91));
        assert_eq!(e.banked(), dec!(90.91));
        assert_eq!(e.provisional(), dec!(100.91));
        assert_eq!(e.weekly(), dec!(10));
    }

    #[test]
    fn settle_entry_banks_losses_and_unused() {
        let prev = entry("a", 1, dec!(50), dec!(0));
        let e = settle_entry(
            2,
            Some(&prev),
            EntryInput {
                player: PlayerId::from("a"),
                weekly: dec!(123),
                week_unused: dec!(50),
                special: Decimal::ZERO,
            },
        );
        assert_eq!(e.banked(), dec!(50));
        assert_eq!(e.provisional(), dec!(173));

        let lost = settle_entry(
            2,
            Some(&prev),
            EntryInput {
                player: PlayerId::from("a"),
                weekly: dec!(-100),
                week_unused: dec!(50),
                special: Decimal::ZERO,
            },
        );
        assert_eq!(lost.banked(), dec!(-50));
        assert_eq!(lost.provisional(), dec!(-50));
    }

    #[test]
    fn first_gameweek_settles_from_zero() {
        let games = vec![game("g1", 1), game("g2", 1)];
        let results: ResultBook = [
            (GameId::from("g1"), GameResult::Home),
            (GameId::from("g2"), GameResult::Away),
        ]
        .into_iter()
        .collect();
        let wagers = vec![
            wager("one", 1, dec!(100), &[("g1", Outcome::Home)]),
            wager("two", 1, dec!(50), &[("g1", Outcome::Away)]),
            wager("two", 1, dec!(25), &[("g2", Outcome::Away)]),
            wager("two", 1, dec!(25), &[("g1", Outcome::Home), ("g2", Outcome::Away)]),
        ];
        let specials = HashMap::new();

        let entries = GameweekLedger {
            gameweek: 1,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &wagers,
            previous: &[],
            specials: &specials,
        }
        .settle()
        .unwrap();

        let one = find(&entries, "one");
        assert_eq!(
            (one.weekly(), one.provisional(), one.banked()),
            (dec!(50.00), dec!(50.00), dec!(0.00))
        );
        let two = find(&entries, "two");
        assert_eq!(
            (two.weekly(), two.provisional(), two.banked()),
            (dec!(14.58), dec!(14.58), dec!(0.00))
        );
    }

    #[test]
    fn rollover_week_banks_unstaked_rollable() {
        let games = vec![game("g3", 2), game("g4", 2)];
        let results: ResultBook = [
            (GameId::from("g3"), GameResult::Home),
            (GameId::from("g4"), GameResult::Away),
        ]
        .into_iter()
        .collect();
        let wagers = vec![
            wager("one", 2, dec!(20), &[("g3", Outcome::Home)]),
            wager("one", 2, dec!(20), &[("g3", Outcome::Draw)]),
            wager("one", 2, dec!(20), &[("g3", Outcome::Away)]),
            wager("one", 2, dec!(40), &[("g4", Outcome::Away)]),
            wager("two", 2, dec!(50), &[("g3", Outcome::Away)]),
            wager("two", 2, dec!(25), &[("g4", Outcome::Away)]),
            wager("two", 2, dec!(25), &[("g3", Outcome::Home), ("g4", Outcome::Away)]),
        ];
        let previous = vec![entry("one", 1, dec!(50), dec!(0)), entry("two", 1, dec!(14.58), dec!(0))];
        let specials = HashMap::new();

        let entries = GameweekLedger {
            gameweek: 2,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &wagers,
            previous: &previous,
            specials: &specials,
        }
        .settle()
        .unwrap();

        let one = find(&entries, "one");
        assert_eq!(
            (one.weekly(), one.provisional(), one.banked()),
            (dec!(3.33), dec!(53.33), dec!(50.00))
        );
        let two = find(&entries, "two");
        assert_eq!(
            (two.weekly(), two.provisional(), two.banked()),
            (dec!(14.58), dec!(29.16), dec!(14.58))
        );
    }

    #[test]
    fn absent_player_forfeits_allowance_and_rollable() {
        let games = vec![game("g3", 2)];
        let results: ResultBook = [(GameId::from("g3"), GameResult::Home)].into_iter().collect();
        let previous = vec![entry("one", 1, dec!(50), dec!(0))];
        let specials = HashMap::new();

        let entries = GameweekLedger {
            gameweek: 2,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &[],
            previous: &previous,
            specials: &specials,
        }
        .settle()
        .unwrap();

        assert_eq!(entries.len(), 1);
        let one = &entries[0];
        assert_eq!(one.weekly(), dec!(-100.00));
        assert_eq!(one.banked(), dec!(-50.00));
        assert_eq!(one.provisional(), dec!(-50.00));
    }

    #[test]
    fn specials_are_folded_into_banked() {
        let games = vec![game("g1", 1)];
        let results: ResultBook = [(GameId::from("g1"), GameResult::Home)].into_iter().collect();
        let wagers = vec![wager("one", 1, dec!(100), &[("g1", Outcome::Away)])];
        let specials: HashMap<PlayerId, Money> =
            [(PlayerId::from("one"), dec!(100))].into_iter().collect();

        let entries = GameweekLedger {
            gameweek: 1,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &wagers,
            previous: &[],
            specials: &specials,
        }
        .settle()
        .unwrap();

        let one = &entries[0];
        assert_eq!(one.weekly(), dec!(-100.00));
        assert_eq!(one.special(), dec!(100.00));
        assert_eq!(one.banked(), dec!(0.00));
        assert_eq!(one.provisional(), dec!(0.00));
    }

    #[test]
    fn proposition_only_newcomer_gets_an_entry() {
        let games = vec![game("g1", 1)];
        let results: ResultBook = [(GameId::from("g1"), GameResult::Home)].into_iter().collect();
        let wagers = vec![wager("one", 1, dec!(10), &[("g1", Outcome::Home)])];
        let specials: HashMap<PlayerId, Money> = [
            (PlayerId::from("cat"), dec!(90.91)),
            (PlayerId::from("dog"), Decimal::ZERO),
        ]
        .into_iter()
        .collect();

        let entries = GameweekLedger {
            gameweek: 1,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &wagers,
            previous: &[],
            specials: &specials,
        }
        .settle()
        .unwrap();

        assert_eq!(entries.len(), 2);
        let cat = find(&entries, "cat");
        assert_eq!(cat.weekly(), dec!(-100.00));
        assert_eq!(cat.special(), dec!(90.91));
        assert_eq!(cat.banked(), dec!(90.91));
        assert_eq!(cat.provisional(), dec!(90.91));
    }

    #[test]
    fn incomplete_results_block_settlement() {
        let games = vec![game("g1", 1), game("g2", 1)];
        let results: ResultBook = [(GameId::from("g1"), GameResult::Home)].into_iter().collect();
        let specials = HashMap::new();

        let blocked = GameweekLedger {
            gameweek: 1,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &[],
            previous: &[],
            specials: &specials,
        }
        .settle();

        assert_eq!(blocked, Err(SettleBlock::Pending(vec![GameId::from("g2")])));
    }

    #[test]
    fn settling_twice_is_identical() {
        let games = vec![game("g1", 1)];
        let results: ResultBook = [(GameId::from("g1"), GameResult::Draw)].into_iter().collect();
        let wagers = vec![wager("one", 1, dec!(60), &[("g1", Outcome::Draw)])];
        let specials = HashMap::new();
        let ledger = GameweekLedger {
            gameweek: 1,
            base_allowance: dec!(100),
            games: &games,
            results: &results,
            wagers: &wagers,
            previous: &[],
            specials: &specials,
        };

        assert_eq!(ledger.settle().unwrap(), ledger.settle().unwrap());
    }
}
