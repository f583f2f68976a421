//! Fractional odds, predicted outcomes and posted results.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Outcome a player can predict for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl Outcome {
    /// Single-letter code used at rest and on the command line.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Home => "H",
            Self::Draw => "D",
            Self::Away => "A",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" | "HOME" => Ok(Self::Home),
            "D" | "DRAW" => Ok(Self::Draw),
            "A" | "AWAY" => Ok(Self::Away),
            other => Err(format!("unknown outcome '{other}', expected H, D or A")),
        }
    }
}

/// Result posted by the commissioner for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
    #[serde(rename = "P")]
    Postponed,
}

impl GameResult {
    /// The outcome that won, or `None` when the game was postponed.
    #[must_use]
    pub const fn winning_outcome(self) -> Option<Outcome> {
        match self {
            Self::Home => Some(Outcome::Home),
            Self::Draw => Some(Outcome::Draw),
            Self::Away => Some(Outcome::Away),
            Self::Postponed => None,
        }
    }

    /// Single-letter code used at rest and on the command line.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Home => "H",
            Self::Draw => "D",
            Self::Away => "A",
            Self::Postponed => "P",
        }
    }
}

impl From<Outcome> for GameResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Home => Self::Home,
            Outcome::Draw => Self::Draw,
            Outcome::Away => Self::Away,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GameResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P" | "POSTPONED" => Ok(Self::Postponed),
            other => other
                .parse::<Outcome>()
                .map(Self::from)
                .map_err(|_| format!("unknown result '{other}', expected H, D, A or P")),
        }
    }
}

/// Fractional odds: for every `denominator` staked, `numerator + denominator`
/// is returned when the outcome occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOdds", into = "RawOdds")]
pub struct FractionalOdds {
    numerator: u32,
    denominator: u32,
}

#[derive(Serialize, Deserialize)]
struct RawOdds {
    numerator: u32,
    denominator: u32,
}

impl TryFrom<RawOdds> for FractionalOdds {
    type Error = DomainError;

    fn try_from(raw: RawOdds) -> Result<Self, Self::Error> {
        Self::try_new(raw.numerator, raw.denominator)
    }
}

impl From<FractionalOdds> for RawOdds {
    fn from(odds: FractionalOdds) -> Self {
        Self {
            numerator: odds.numerator,
            denominator: odds.denominator,
        }
    }
}

impl FractionalOdds {
    /// Create odds, validating that the denominator is at least one.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidOdds`] when `denominator == 0`.
    pub fn try_new(numerator: u32, denominator: u32) -> Result<Self, DomainError> {
        if denominator == 0 {
            return Err(DomainError::InvalidOdds {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    #[must_use]
    pub const fn numerator(&self) -> u32 {
        self.numerator
    }

    #[must_use]
    pub const fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Multiplier applied to the running stake when a leg at these odds wins:
    /// `(numerator + denominator) / denominator`.
    #[must_use]
    pub fn payout_multiplier(&self) -> Decimal {
        let numerator = Decimal::from(self.numerator) + Decimal::from(self.denominator);
        numerator / Decimal::from(self.denominator)
    }

    /// Profit per unit staked: `numerator / denominator`.
    #[must_use]
    pub fn win_ratio(&self) -> Decimal {
        Decimal::from(self.numerator) / Decimal::from(self.denominator)
    }
}

impl fmt::Display for FractionalOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for FractionalOdds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (numerator, denominator) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("odds '{s}' must look like N/D"))?;
        let numerator: u32 = numerator
            .trim()
            .parse()
            .map_err(|e| format!("invalid odds numerator '{numerator}': {e}"))?;
        let denominator: u32 = denominator
            .trim()
            .parse()
            .map_err(|e| format!("invalid odds denominator '{denominator}': {e}"))?;
        Self::try_new(numerator, denominator).map_err(|e| e.to_string())
    }
}
