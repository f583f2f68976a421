//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`domain`] - builders for games, wagers, results, pools and entries.
//! - [`fixture`] - a seeded in-memory pool with every service wired up.

pub mod domain;
pub mod fixture;
