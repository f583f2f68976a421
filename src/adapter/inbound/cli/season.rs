//! Handlers for `init`, `import` and `gameweek`.

use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{InitArgs, OpenGameweekArgs};
use crate::adapter::inbound::cli::output;
use crate::application::{Pool, SeasonImport};
use crate::domain::Season;
use crate::error::Result;
use crate::infrastructure::config::SeasonConfig;
use crate::port::outbound::store::PoolStore;

#[derive(Tabled)]
struct GameweekRow {
    #[tabled(rename = "GW")]
    number: u32,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Betting")]
    status: &'static str,
    #[tabled(rename = "Note")]
    spiel: String,
}

/// Create or update the season. Flags win over `[season]` config.
pub async fn init<S: PoolStore>(
    pool: &Pool<S>,
    args: &InitArgs,
    defaults: &SeasonConfig,
) -> Result<()> {
    let season = Season::try_new(
        args.name.clone().unwrap_or_else(|| defaults.name.clone()),
        args.allowance.unwrap_or(defaults.base_allowance),
    )?;
    pool.season.init(&season).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "init", "season": season }));
        return Ok(());
    }
    output::success(&format!("Season {} ready", output::highlight(season.name())));
    output::field("Allowance", output::money(season.base_allowance()));
    Ok(())
}

pub async fn import<S: PoolStore>(pool: &Pool<S>, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let doc: SeasonImport = serde_json::from_str(&content)?;
    let report = pool.season.import(doc).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "import", "report": report }));
        return Ok(());
    }
    output::success(&format!("Imported {}", file.display()));
    output::field("Gameweeks", report.gameweeks);
    output::field("Games", report.games);
    output::field("Pools", report.pools);
    Ok(())
}

pub async fn open_gameweek<S: PoolStore>(pool: &Pool<S>, args: &OpenGameweekArgs) -> Result<()> {
    let gameweek = pool
        .season
        .open_gameweek(args.deadline, args.spiel.clone())
        .await?;

    if output::is_json() {
        output::json_output(json!({ "command": "gameweek.open", "gameweek": gameweek }));
        return Ok(());
    }
    output::success(&format!("Gameweek {} opened", gameweek.number));
    output::field("Deadline", gameweek.deadline.to_rfc3339());
    if let Some(spiel) = &gameweek.spiel {
        output::note(spiel);
    }
    output::hint("add fixtures with `fglpool import`");
    Ok(())
}

pub async fn list_gameweeks<S: PoolStore>(pool: &Pool<S>) -> Result<()> {
    let index = pool.season.index().await?;

    if output::is_json() {
        let gameweeks: Vec<_> = index.iter().collect();
        output::json_output(json!({ "command": "gameweek.list", "gameweeks": gameweeks }));
        return Ok(());
    }
    if index.is_empty() {
        output::note("No gameweeks yet");
        output::hint("open one with `fglpool gameweek open --deadline <RFC3339>`");
        return Ok(());
    }

    let now = Utc::now();
    let rows = index.iter().map(|gw| GameweekRow {
        number: gw.number,
        deadline: gw.deadline.format("%Y-%m-%d %H:%M UTC").to_string(),
        status: if gw.is_open_at(now) { "open" } else { "closed" },
        spiel: gw.spiel.clone().unwrap_or_default(),
    });
    output::section("Gameweeks");
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
