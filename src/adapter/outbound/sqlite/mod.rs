//! SQLite persistence adapter.
//!
//! Provides a SQLite-backed implementation of every store port using
//! Diesel ORM with embedded migrations.

pub mod database;
pub mod store;

pub use database::connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteStore;

use crate::error::Result;

/// Open (creating if needed) the database at `path` and apply migrations.
///
/// # Errors
/// Returns an error if the pool cannot be created or migrations fail.
pub fn open(path: &str) -> Result<SqliteStore> {
    let pool = create_pool(path)?;
    run_migrations(&pool)?;
    Ok(SqliteStore::new(pool))
}
