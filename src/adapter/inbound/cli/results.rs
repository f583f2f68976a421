//! Handlers for `results` and `settle`.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{ResultsArgs, SettleArgs};
use crate::adapter::inbound::cli::output;
use crate::application::{Pool, SettlementReport};
use crate::domain::{LedgerEntry, ResultBook};
use crate::error::Result;
use crate::port::outbound::store::PoolStore;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Weekly")]
    weekly: String,
    #[tabled(rename = "Special")]
    special: String,
    #[tabled(rename = "Banked")]
    banked: String,
    #[tabled(rename = "Provisional")]
    provisional: String,
}

impl From<&LedgerEntry> for EntryRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            player: entry.player().to_string(),
            weekly: format!("{:.2}", entry.weekly()),
            special: format!("{:.2}", entry.special()),
            banked: format!("{:.2}", entry.banked()),
            provisional: format!("{:.2}", entry.provisional()),
        }
    }
}

pub async fn post<S: PoolStore>(pool: &Pool<S>, args: &ResultsArgs) -> Result<()> {
    let mut book = ResultBook::new();
    for (game, result) in &args.results {
        book.insert(game.clone(), *result);
    }
    let report = pool.settlement.post_results(args.gameweek, book).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "results", "report": report }));
        return Ok(());
    }
    output::success(&format!(
        "Posted {} result(s) for gameweek {}",
        report.posted, report.gameweek
    ));
    match &report.settlement {
        Some(settlement) => print_settlement(settlement),
        None => output::note(&format!("{} game(s) still pending", report.pending)),
    }
    Ok(())
}

pub async fn settle<S: PoolStore>(pool: &Pool<S>, args: &SettleArgs) -> Result<()> {
    let report = pool.settlement.settle_gameweek(args.gameweek).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "settle", "report": report }));
        return Ok(());
    }
    print_settlement(&report);
    Ok(())
}

fn print_settlement(report: &SettlementReport) {
    output::section(&format!("Gameweek {} settled", report.gameweek));
    if report.entries.is_empty() {
        output::note("No players yet");
    } else {
        output::lines(&Table::new(report.entries.iter().map(EntryRow::from)).to_string());
    }
    if !report.cascaded.is_empty() {
        let later: Vec<String> = report.cascaded.iter().map(ToString::to_string).collect();
        output::note(&format!("Re-settled gameweek(s) {}", later.join(", ")));
    }
}
