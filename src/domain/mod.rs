//! Pool domain: odds, wagers, propositions and the balance ledger.
//!
//! Everything here is pure. Loading inputs and persisting results is the
//! job of the application services.

pub mod allowance;
pub mod error;
pub mod game;
pub mod gameweek;
pub mod id;
pub mod ledger;
pub mod money;
pub mod odds;
pub mod proposition;
pub mod standings;
pub mod wager;

pub use allowance::{allowance_for, AllowanceBudget};
pub use error::DomainError;
pub use game::{Game, ResultBook};
pub use gameweek::{Gameweek, GameweekIndex, Season, DEFAULT_BASE_ALLOWANCE};
pub use id::{GameId, GameweekNumber, OptionId, PlayerId, PoolId, WagerId};
pub use ledger::{settle_entry, EntryInput, GameweekLedger, LedgerEntry, SettleBlock};
pub use money::{round_money, Money};
pub use odds::{FractionalOdds, GameResult, Outcome};
pub use proposition::{
    settle_pool, PropositionBet, PropositionDelta, PropositionOption, PropositionOutcome,
    PropositionPool, SpecialAdjustment,
};
pub use standings::{rank, standings, Movement, Standing};
pub use wager::{weekly_net, Leg, LegState, Payout, Wager};
