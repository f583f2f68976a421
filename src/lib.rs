//! fglpool - season-long sports prediction pool.
//!
//! Players stake a weekly allowance on multi-leg accumulators and on
//! long-term proposition pools. Once a gameweek's results are in, the
//! ledger engine settles every player into a four-part entry (`weekly`,
//! `special`, `banked`, `provisional`) with rollover of unused allowance
//! and enforcement of losses.
//!
//! # Layout
//!
//! - [`domain`] - pure types and calculations: odds, wager pricing, the
//!   ledger engine, allowance rules, standings
//! - [`application`] - services that load through the store port, run the
//!   domain and write back under per-gameweek locks
//! - [`port`] - store traits the services depend on
//! - [`adapter`] - in-memory and SQLite stores, and the operator CLI
//! - [`infrastructure`] - configuration and logging
//! - [`error`] - error taxonomy
//!
//! # Example
//!
//! ```
//! use fglpool::domain::{settle_entry, EntryInput, PlayerId};
//! use rust_decimal_macros::dec;
//!
//! let entry = settle_entry(
//!     1,
//!     None,
//!     EntryInput {
//!         player: PlayerId::from("ann"),
//!         weekly: dec!(50.00),
//!         week_unused: dec!(0.00),
//!         special: dec!(0.00),
//!     },
//! );
//! assert_eq!(entry.provisional(), dec!(50.00));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
