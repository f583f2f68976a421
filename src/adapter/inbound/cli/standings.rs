//! League table.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::StandingsArgs;
use crate::adapter::inbound::cli::output;
use crate::application::Pool;
use crate::domain::Standing;
use crate::error::Result;
use crate::port::outbound::store::PoolStore;

#[derive(Tabled)]
struct StandingRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Provisional")]
    provisional: String,
    #[tabled(rename = "Banked")]
    banked: String,
    #[tabled(rename = "Weekly")]
    weekly: String,
    #[tabled(rename = "Special")]
    special: String,
    #[tabled(rename = "Move")]
    movement: String,
}

impl From<&Standing> for StandingRow {
    fn from(row: &Standing) -> Self {
        Self {
            position: row.position,
            player: row.player.to_string(),
            provisional: format!("{:.2}", row.provisional),
            banked: format!("{:.2}", row.banked),
            weekly: format!("{:.2}", row.weekly),
            special: format!("{:.2}", row.special),
            movement: row.movement.to_string(),
        }
    }
}

pub async fn show<S: PoolStore>(pool: &Pool<S>, args: &StandingsArgs) -> Result<()> {
    let report = pool.standings.standings(args.gameweek).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "standings", "standings": report }));
        return Ok(());
    }
    let Some(report) = report else {
        output::note("Nothing has been settled yet");
        return Ok(());
    };
    output::section(&format!("Standings after gameweek {}", report.gameweek));
    output::lines(&Table::new(report.rows.iter().map(StandingRow::from)).to_string());
    Ok(())
}
