//! Operator CLI.
//!
//! [`execute`] opens the SQLite store named by `--db`, `FGLPOOL_DATABASE` or
//! the config file (in that order) and hands the parsed command to
//! [`dispatch`], which works against any [`PoolStore`].

pub mod command;
pub mod diagnostic;
pub mod output;
pub mod paths;
pub mod proposition;
pub mod results;
pub mod season;
pub mod standings;
pub mod wager;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use self::command::{Cli, Commands, GameweekCommand, PropositionCommand, WagerCommand};
use crate::adapter::outbound::sqlite;
use crate::application::Pool;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::store::PoolStore;

/// Database file for this invocation.
#[must_use]
pub fn database_path(cli: &Cli, config: &Config) -> PathBuf {
    cli.db
        .clone()
        .or_else(|| config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(paths::default_database)
}

/// Open the configured database and run the command.
///
/// # Errors
/// Store setup failures or whatever the command returns.
pub async fn execute(cli: &Cli, config: &Config) -> Result<()> {
    let database = database_path(cli, config);
    paths::ensure_parent(&database)?;
    let store = sqlite::open(&database.to_string_lossy())?;
    debug!(database = %database.display(), "database opened");

    let pool = Pool::new(Arc::new(store));
    dispatch(&cli.command, &pool, config).await
}

/// Run one command against `pool`.
///
/// # Errors
/// Whatever the command's service returns.
pub async fn dispatch<S: PoolStore>(
    command: &Commands,
    pool: &Pool<S>,
    config: &Config,
) -> Result<()> {
    match command {
        Commands::Init(args) => season::init(pool, args, &config.season).await,
        Commands::Import(args) => season::import(pool, &args.file).await,
        Commands::Gameweek(GameweekCommand::Open(args)) => season::open_gameweek(pool, args).await,
        Commands::Gameweek(GameweekCommand::List) => season::list_gameweeks(pool).await,
        Commands::Wager(WagerCommand::Place(args)) => wager::place(pool, args).await,
        Commands::Wager(WagerCommand::Edit(args)) => wager::edit(pool, args).await,
        Commands::Wager(WagerCommand::List(args)) => wager::list(pool, args).await,
        Commands::Allowance(args) => wager::allowance(pool, args).await,
        Commands::Results(args) => results::post(pool, args).await,
        Commands::Settle(args) => results::settle(pool, args).await,
        Commands::Standings(args) => standings::show(pool, args).await,
        Commands::Proposition(PropositionCommand::Bet(args)) => proposition::bet(pool, args).await,
        Commands::Proposition(PropositionCommand::Declare(args)) => {
            proposition::declare(pool, args).await
        }
    }
}
