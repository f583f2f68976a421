//! Handlers for `wager place|edit|list` and `allowance`.

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{
    AllowanceArgs, EditWagerArgs, ListWagersArgs, PlaceWagerArgs,
};
use crate::adapter::inbound::cli::output;
use crate::application::{Pool, WagerRequest, WagerView};
use crate::domain::{AllowanceBudget, Leg, PlayerId, Wager, WagerId};
use crate::error::Result;
use crate::port::outbound::store::PoolStore;

#[derive(Tabled)]
struct WagerRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Legs")]
    legs: String,
    #[tabled(rename = "Payout")]
    payout: String,
}

impl From<&WagerView> for WagerRow {
    fn from(view: &WagerView) -> Self {
        Self {
            id: view.wager.id().to_string(),
            player: view.wager.player().to_string(),
            stake: format!("{:.2}", view.wager.stake()),
            legs: describe_legs(view.wager.legs()),
            payout: view
                .payout
                .map_or_else(|| "pending".to_string(), |p| format!("{p:.2}")),
        }
    }
}

fn describe_legs(legs: &[Leg]) -> String {
    legs.iter()
        .map(|leg| format!("{}={}", leg.game, leg.prediction))
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn place<S: PoolStore>(pool: &Pool<S>, args: &PlaceWagerArgs) -> Result<()> {
    let request = WagerRequest {
        player: PlayerId::from(args.player.as_str()),
        gameweek: args.gameweek,
        stake: args.stake,
        legs: args.legs.clone(),
    };
    let wager = pool.admission.place_wager(request, Utc::now()).await?;
    admitted(pool, "wager.place", "Wager placed", &wager).await
}

pub async fn edit<S: PoolStore>(pool: &Pool<S>, args: &EditWagerArgs) -> Result<()> {
    let wager = pool
        .admission
        .edit_wager(
            &WagerId::from(args.id.as_str()),
            &PlayerId::from(args.player.as_str()),
            args.stake,
            args.legs.clone(),
            Utc::now(),
        )
        .await?;
    admitted(pool, "wager.edit", "Wager updated", &wager).await
}

async fn admitted<S: PoolStore>(
    pool: &Pool<S>,
    command: &str,
    headline: &str,
    wager: &Wager,
) -> Result<()> {
    let budget = pool
        .admission
        .unused_allowance(wager.player(), wager.gameweek())
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": command,
            "wager": wager,
            "remaining": budget.remaining(),
        }));
        return Ok(());
    }
    output::success(headline);
    output::field("Id", output::highlight(wager.id()));
    output::field("Stake", output::money(wager.stake()));
    output::field("Legs", describe_legs(wager.legs()));
    output::field("Remaining", output::money(budget.remaining()));
    Ok(())
}

pub async fn list<S: PoolStore>(pool: &Pool<S>, args: &ListWagersArgs) -> Result<()> {
    let player = args.player.as_deref().map(PlayerId::from);
    let views = pool.admission.wagers(args.gameweek, player.as_ref()).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "wager.list",
            "gameweek": args.gameweek,
            "wagers": views,
        }));
        return Ok(());
    }
    if views.is_empty() {
        output::note(&format!("No wagers in gameweek {}", args.gameweek));
        return Ok(());
    }
    output::section(&format!("Wagers, gameweek {}", args.gameweek));
    output::lines(&Table::new(views.iter().map(WagerRow::from)).to_string());
    Ok(())
}

pub async fn allowance<S: PoolStore>(pool: &Pool<S>, args: &AllowanceArgs) -> Result<()> {
    let player = PlayerId::from(args.player.as_str());
    let budget = pool.admission.unused_allowance(&player, args.gameweek).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "allowance",
            "player": player,
            "gameweek": args.gameweek,
            "allowance": budget.allowance,
            "staked": budget.staked,
            "remaining": budget.remaining(),
        }));
        return Ok(());
    }
    print_budget(&player, args.gameweek, &budget);
    Ok(())
}

fn print_budget(player: &PlayerId, gameweek: u32, budget: &AllowanceBudget) {
    output::section(&format!("{player}, gameweek {gameweek}"));
    output::field("Allowance", output::money(budget.allowance));
    output::field("Staked", output::money(budget.staked));
    output::field("Remaining", output::money(budget.remaining()));
}
