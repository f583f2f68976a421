//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and by the pure
//! settlement functions when their inputs violate a domain rule.
//!
//! # Examples
//!
//! ```
//! use fglpool::domain::error::DomainError;
//! use fglpool::domain::odds::FractionalOdds;
//!
//! let result = FractionalOdds::try_new(5, 0);
//! assert!(matches!(result, Err(DomainError::InvalidOdds { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use super::id::{GameId, OptionId};

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Fractional odds need a denominator of at least one.
    #[error("invalid odds {numerator}/{denominator}: denominator must be at least 1")]
    InvalidOdds {
        /// The numerator that was provided.
        numerator: u32,
        /// The offending denominator.
        denominator: u32,
    },

    /// A wager must contain at least one leg.
    #[error("wager has no legs")]
    EmptyLegs,

    /// A wager may reference each game at most once.
    #[error("game {game} appears more than once in the wager")]
    DuplicateGame {
        /// The repeated game.
        game: GameId,
    },

    /// Stakes must be strictly positive.
    #[error("stake must be positive, got {stake}")]
    NonPositiveStake {
        /// The rejected stake.
        stake: Decimal,
    },

    /// A proposition pool needs at least one option.
    #[error("proposition pool has no options")]
    EmptyOptions,

    /// Option descriptions must be unique within a pool.
    #[error("proposition option '{description}' is defined more than once")]
    DuplicateOption {
        /// The repeated description.
        description: String,
    },

    /// A leg references a game the caller did not supply.
    #[error("unknown game {game}")]
    UnknownGame {
        /// The missing game.
        game: GameId,
    },

    /// A bet or outcome references an option the pool does not have.
    #[error("unknown proposition option {option}")]
    UnknownOption {
        /// The missing option.
        option: OptionId,
    },

    /// Gameweeks must be numbered 1, 2, 3, ... without gaps or repeats.
    #[error("gameweek sequence broken: expected {expected}, found {found}")]
    BrokenSequence {
        /// The number that should have come next.
        expected: u32,
        /// The number actually found.
        found: u32,
    },

    /// Allowances must not be negative.
    #[error("allowance must not be negative, got {allowance}")]
    NegativeAllowance {
        /// The rejected allowance.
        allowance: Decimal,
    },
}
