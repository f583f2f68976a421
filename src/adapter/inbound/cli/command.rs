//! Command-line interface definitions.
//!
//! The `fglpool` binary is the commissioner's tool: it sets up the season,
//! admits wagers, posts results and prints the league table.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use super::paths;
use crate::domain::{GameId, GameResult, GameweekNumber, Leg, Outcome};

/// Season-long sports prediction pool
#[derive(Parser, Debug)]
#[command(name = "fglpool")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Path to the pool database (overrides config and FGLPOOL_DATABASE)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update the season settings
    Init(InitArgs),

    /// Load gameweeks, games and proposition pools from a JSON file
    Import(ImportArgs),

    /// Manage gameweeks
    #[command(subcommand)]
    Gameweek(GameweekCommand),

    /// Place, edit and list accumulator wagers
    #[command(subcommand)]
    Wager(WagerCommand),

    /// Show a player's allowance for a gameweek
    Allowance(AllowanceArgs),

    /// Post results for a gameweek (settles once complete)
    Results(ResultsArgs),

    /// Re-run settlement for a gameweek
    Settle(SettleArgs),

    /// Show the league table
    Standings(StandingsArgs),

    /// Long-term proposition bets
    #[command(subcommand)]
    Proposition(PropositionCommand),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Season name (defaults to `[season].name` in config)
    #[arg(long)]
    pub name: Option<String>,

    /// Weekly base allowance (defaults to `[season].base_allowance`)
    #[arg(long)]
    pub allowance: Option<Decimal>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Season document (JSON)
    pub file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum GameweekCommand {
    /// Open the next gameweek
    Open(OpenGameweekArgs),
    /// List gameweeks
    List,
}

#[derive(Args, Debug)]
pub struct OpenGameweekArgs {
    /// Betting deadline (RFC 3339, e.g. 2024-08-17T11:00:00Z)
    #[arg(long)]
    pub deadline: DateTime<Utc>,

    /// Note shown to players
    #[arg(long)]
    pub spiel: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum WagerCommand {
    /// Place a new accumulator
    Place(PlaceWagerArgs),
    /// Replace the stake and legs of a wager
    Edit(EditWagerArgs),
    /// List wagers for a gameweek
    List(ListWagersArgs),
}

#[derive(Args, Debug)]
pub struct PlaceWagerArgs {
    #[arg(long)]
    pub player: String,

    #[arg(long)]
    pub gameweek: GameweekNumber,

    #[arg(long)]
    pub stake: Decimal,

    /// Leg as GAME=OUTCOME (H, D or A); repeat for each leg
    #[arg(long = "leg", value_parser = parse_leg, required = true)]
    pub legs: Vec<Leg>,
}

#[derive(Args, Debug)]
pub struct EditWagerArgs {
    /// Wager id
    #[arg(long)]
    pub id: String,

    /// Player making the edit (must own the wager)
    #[arg(long)]
    pub player: String,

    #[arg(long)]
    pub stake: Decimal,

    /// Leg as GAME=OUTCOME (H, D or A); repeat for each leg
    #[arg(long = "leg", value_parser = parse_leg, required = true)]
    pub legs: Vec<Leg>,
}

#[derive(Args, Debug)]
pub struct ListWagersArgs {
    #[arg(long)]
    pub gameweek: GameweekNumber,

    /// Only this player's wagers
    #[arg(long)]
    pub player: Option<String>,
}

#[derive(Args, Debug)]
pub struct AllowanceArgs {
    #[arg(long)]
    pub player: String,

    #[arg(long)]
    pub gameweek: GameweekNumber,
}

#[derive(Args, Debug)]
pub struct ResultsArgs {
    #[arg(long)]
    pub gameweek: GameweekNumber,

    /// Result as GAME=RESULT (H, D, A or P)
    #[arg(value_parser = parse_result, required = true)]
    pub results: Vec<(GameId, GameResult)>,
}

#[derive(Args, Debug)]
pub struct SettleArgs {
    #[arg(long)]
    pub gameweek: GameweekNumber,
}

#[derive(Args, Debug)]
pub struct StandingsArgs {
    /// Gameweek to rank (defaults to the latest settled)
    #[arg(long)]
    pub gameweek: Option<GameweekNumber>,
}

#[derive(Subcommand, Debug)]
pub enum PropositionCommand {
    /// Choose an option in a proposition pool
    Bet(PropositionBetArgs),
    /// Declare or correct a pool's winning option
    Declare(DeclareArgs),
}

#[derive(Args, Debug)]
pub struct PropositionBetArgs {
    #[arg(long)]
    pub pool: String,

    #[arg(long)]
    pub player: String,

    #[arg(long)]
    pub option: String,
}

#[derive(Args, Debug)]
pub struct DeclareArgs {
    #[arg(long)]
    pub pool: String,

    /// Winning option id
    #[arg(long)]
    pub winner: String,

    /// Gameweek the outcome is settled into
    #[arg(long)]
    pub gameweek: GameweekNumber,
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    let (game, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{raw}' must look like GAME=VALUE"))?;
    let game = game.trim();
    if game.is_empty() {
        return Err(format!("'{raw}' is missing a game id"));
    }
    Ok((game, value))
}

fn parse_leg(raw: &str) -> Result<Leg, String> {
    let (game, outcome) = split_pair(raw)?;
    Ok(Leg::new(game, outcome.parse::<Outcome>()?))
}

fn parse_result(raw: &str) -> Result<(GameId, GameResult), String> {
    let (game, result) = split_pair(raw)?;
    Ok((GameId::from(game), result.parse::<GameResult>()?))
}
