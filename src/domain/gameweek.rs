//! Season settings and the ordered gameweek sequence.
//!
//! Gameweeks are addressed by number; "previous" and "next" are answered by
//! [`GameweekIndex`] instead of links stored on each gameweek.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::GameweekNumber;
use super::money::{round_money, Money};

/// Default weekly allowance when none is configured.
pub const DEFAULT_BASE_ALLOWANCE: Money = dec!(100.00);

/// Season-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    name: String,
    base_allowance: Money,
}

impl Season {
    /// # Errors
    /// Rejects a negative base allowance.
    pub fn try_new(name: impl Into<String>, base_allowance: Money) -> Result<Self, DomainError> {
        if base_allowance < Decimal::ZERO {
            return Err(DomainError::NegativeAllowance {
                allowance: base_allowance,
            });
        }
        Ok(Self {
            name: name.into(),
            base_allowance: round_money(base_allowance),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn base_allowance(&self) -> Money {
        self.base_allowance
    }
}

/// A betting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gameweek {
    pub number: GameweekNumber,
    pub deadline: DateTime<Utc>,
    /// Commissioner's note for the week.
    #[serde(default)]
    pub spiel: Option<String>,
}

impl Gameweek {
    #[must_use]
    pub const fn new(number: GameweekNumber, deadline: DateTime<Utc>) -> Self {
        Self {
            number,
            deadline,
            spiel: None,
        }
    }

    /// Whether betting is still open at `now`.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now < self.deadline
    }
}

/// Gameweeks ordered by number, guaranteed contiguous from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameweekIndex {
    gameweeks: Vec<Gameweek>,
}

impl GameweekIndex {
    /// Build the index, sorting by number.
    ///
    /// # Errors
    /// [`DomainError::BrokenSequence`] on gaps, duplicates, or a first
    /// gameweek other than 1.
    pub fn try_new(mut gameweeks: Vec<Gameweek>) -> Result<Self, DomainError> {
        gameweeks.sort_by_key(|gw| gw.number);
        for (expected, gw) in (1..).zip(&gameweeks) {
            if gw.number != expected {
                return Err(DomainError::BrokenSequence {
                    expected,
                    found: gw.number,
                });
            }
        }
        Ok(Self { gameweeks })
    }

    #[must_use]
    pub fn get(&self, number: GameweekNumber) -> Option<&Gameweek> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        self.gameweeks.get(idx)
    }

    #[must_use]
    pub fn contains(&self, number: GameweekNumber) -> bool {
        self.get(number).is_some()
    }

    #[must_use]
    pub fn is_first(&self, number: GameweekNumber) -> bool {
        number == 1 && self.contains(1)
    }

    #[must_use]
    pub fn previous(&self, number: GameweekNumber) -> Option<&Gameweek> {
        number.checked_sub(1).and_then(|prev| self.get(prev))
    }

    #[must_use]
    pub fn next(&self, number: GameweekNumber) -> Option<&Gameweek> {
        self.get(number + 1)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Gameweek> {
        self.gameweeks.last()
    }

    /// Number the next opened gameweek will get.
    #[must_use]
    pub fn next_number(&self) -> GameweekNumber {
        self.latest().map_or(1, |gw| gw.number + 1)
    }

    /// Gameweeks strictly after `number`, ascending.
    pub fn following(&self, number: GameweekNumber) -> impl Iterator<Item = &Gameweek> {
        self.gameweeks.iter().filter(move |gw| gw.number > number)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gameweek> {
        self.gameweeks.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gameweeks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gameweeks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gw(number: GameweekNumber) -> Gameweek {
        let deadline = Utc.with_ymd_and_hms(2024, 8, 10, 11, 0, 0).unwrap()
            + chrono::Duration::weeks(i64::from(number));
        Gameweek::new(number, deadline)
    }

    #[test]
    fn index_is_ordered_and_navigable() {
        let index = GameweekIndex::try_new(vec![gw(3), gw(1), gw(2)]).unwrap();
        assert!(index.is_first(1));
        assert!(!index.is_first(2));
        assert_eq!(index.previous(2).map(|g| g.number), Some(1));
        assert_eq!(index.previous(1), None);
        assert_eq!(index.next(2).map(|g| g.number), Some(3));
        assert_eq!(index.next(3), None);
        assert_eq!(index.latest().map(|g| g.number), Some(3));
        assert_eq!(index.next_number(), 4);
        let later: Vec<_> = index.following(1).map(|g| g.number).collect();
        assert_eq!(later, vec![2, 3]);
    }

    #[test]
    fn gaps_and_duplicates_are_rejected() {
        assert_eq!(
            GameweekIndex::try_new(vec![gw(1), gw(3)]),
            Err(DomainError::BrokenSequence {
                expected: 2,
                found: 3
            })
        );
        assert!(GameweekIndex::try_new(vec![gw(1), gw(1)]).is_err());
        assert!(GameweekIndex::try_new(vec![gw(2)]).is_err());
    }

    #[test]
    fn empty_index_starts_at_one() {
        let index = GameweekIndex::default();
        assert_eq!(index.next_number(), 1);
        assert!(index.get(0).is_none());
    }

    #[test]
    fn deadline_closes_betting() {
        let week = gw(1);
        assert!(week.is_open_at(week.deadline - chrono::Duration::seconds(1)));
        assert!(!week.is_open_at(week.deadline));
    }

    #[test]
    fn season_rounds_allowance() {
        let season = Season::try_new("2024/25", dec!(100.004)).unwrap();
        assert_eq!(season.base_allowance(), dec!(100.00));
        assert!(Season::try_new("x", dec!(-1)).is_err());
    }
}
