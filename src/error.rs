use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::{GameId, GameweekNumber, OptionId, PlayerId, PoolId, WagerId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Reasons a wager or proposition bet is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stake {stake} exceeds remaining allowance {remaining} (allowance {allowance})")]
    StakeExceedsAllowance {
        stake: Decimal,
        remaining: Decimal,
        allowance: Decimal,
    },

    #[error("betting for gameweek {gameweek} closed at {deadline}")]
    DeadlinePassed {
        gameweek: GameweekNumber,
        deadline: DateTime<Utc>,
    },

    #[error("gameweek {0} is already settled")]
    GameweekSettled(GameweekNumber),

    #[error("game {game} is not part of gameweek {gameweek}")]
    GameNotInGameweek {
        game: GameId,
        gameweek: GameweekNumber,
    },

    #[error("unknown gameweek {0}")]
    UnknownGameweek(GameweekNumber),

    #[error("unknown wager {0}")]
    UnknownWager(WagerId),

    #[error("wager {wager} belongs to {owner}, not {player}")]
    NotOwner {
        wager: WagerId,
        owner: PlayerId,
        player: PlayerId,
    },

    #[error("unknown proposition pool {0}")]
    UnknownPool(PoolId),

    #[error("option {option} is not part of pool {pool}")]
    UnknownOption { pool: PoolId, option: OptionId },

    #[error("outcome of pool {0} is already declared")]
    OutcomeDeclared(PoolId),

    #[error("player {player} has no proposition bet in pool {pool}")]
    NoBet { pool: PoolId, player: PlayerId },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Reasons a gameweek cannot be settled or a result cannot be posted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("gameweek {gameweek} has {} game(s) without a result", pending.len())]
    ResultsIncomplete {
        gameweek: GameweekNumber,
        pending: Vec<GameId>,
    },

    #[error("unknown gameweek {0}")]
    UnknownGameweek(GameweekNumber),

    #[error("game {game} is not part of gameweek {gameweek}")]
    ForeignGame {
        game: GameId,
        gameweek: GameweekNumber,
    },

    #[error("gameweek {0} still has pending results; finish it before opening another")]
    PreviousIncomplete(GameweekNumber),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Recorded proposition adjustments would no longer add up to the declared
/// impact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "pool {pool}: adjustments for {player} would total {recorded} but the declared impact is {expected}"
)]
pub struct ConsistencyError {
    pub pool: PoolId,
    pub player: PlayerId,
    pub recorded: Decimal,
    pub expected: Decimal,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("no season has been initialised")]
    NoSeason,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}
