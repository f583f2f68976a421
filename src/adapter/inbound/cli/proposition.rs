//! Handlers for `proposition bet|declare`.

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{DeclareArgs, PropositionBetArgs};
use crate::adapter::inbound::cli::output;
use crate::application::{DeclaredImpact, Pool};
use crate::domain::{OptionId, PlayerId, PoolId};
use crate::error::Result;
use crate::port::outbound::store::PoolStore;

#[derive(Tabled)]
struct ImpactRow {
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Was")]
    old_impact: String,
    #[tabled(rename = "Now")]
    new_impact: String,
    #[tabled(rename = "Change")]
    delta: String,
    #[tabled(rename = "Applied")]
    applied: &'static str,
}

impl From<&DeclaredImpact> for ImpactRow {
    fn from(impact: &DeclaredImpact) -> Self {
        Self {
            player: impact.player.to_string(),
            old_impact: format!("{:.2}", impact.old_impact),
            new_impact: format!("{:.2}", impact.new_impact),
            delta: format!("{:+.2}", impact.delta),
            applied: if impact.applied { "yes" } else { "pending" },
        }
    }
}

pub async fn bet<S: PoolStore>(pool: &Pool<S>, args: &PropositionBetArgs) -> Result<()> {
    let bet = pool
        .admission
        .place_proposition_bet(
            &PoolId::from(args.pool.as_str()),
            &PlayerId::from(args.player.as_str()),
            &OptionId::from(args.option.as_str()),
            Utc::now(),
        )
        .await?;

    if output::is_json() {
        output::json_output(json!({ "command": "proposition.bet", "bet": bet }));
        return Ok(());
    }
    output::success(&format!(
        "{} backs {} in {}",
        bet.player,
        output::highlight(&bet.option),
        bet.pool
    ));
    Ok(())
}

pub async fn declare<S: PoolStore>(pool: &Pool<S>, args: &DeclareArgs) -> Result<()> {
    let report = pool
        .propositions
        .declare_outcome(
            &PoolId::from(args.pool.as_str()),
            &OptionId::from(args.winner.as_str()),
            args.gameweek,
        )
        .await?;

    if output::is_json() {
        output::json_output(json!({ "command": "proposition.declare", "report": report }));
        return Ok(());
    }
    output::success(&format!(
        "{} won {} (settled in gameweek {})",
        output::highlight(&report.winner),
        report.pool,
        report.gameweek
    ));
    if report.impacts.is_empty() {
        output::note("No bets in this pool");
    } else {
        output::lines(&Table::new(report.impacts.iter().map(ImpactRow::from)).to_string());
    }
    if report.impacts.iter().any(|i| !i.applied) {
        output::hint("pending changes land when their gameweek is settled");
    }
    if !report.cascaded.is_empty() {
        let later: Vec<String> = report.cascaded.iter().map(ToString::to_string).collect();
        output::note(&format!("Re-settled gameweek(s) {}", later.join(", ")));
    }
    Ok(())
}
