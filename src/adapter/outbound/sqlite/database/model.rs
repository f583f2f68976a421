//! Database model types for Diesel ORM.
//!
//! Decimal amounts are stored as TEXT and odds as `"N/D"` so values survive
//! at rest exactly as the domain holds them.

use diesel::prelude::*;

use super::schema::{
    games, gameweeks, ledger_entries, proposition_bets, proposition_outcomes, proposition_pools,
    results, season, special_adjustments, wagers,
};

/// The single season row.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = season)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SeasonRow {
    pub id: i32,
    pub name: String,
    pub base_allowance: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = gameweeks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameweekRow {
    pub number: i32,
    pub deadline: String,
    pub spiel: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameRow {
    pub id: String,
    pub gameweek: i32,
    pub home_team: String,
    pub away_team: String,
    pub home_odds: String,
    pub draw_odds: String,
    pub away_odds: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ResultRow {
    pub game_id: String,
    pub gameweek: i32,
    pub result: String,
}

/// Database row for a wager; `legs` is JSON.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = wagers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WagerRow {
    pub id: String,
    pub player: String,
    pub gameweek: i32,
    pub stake: String,
    pub legs: String,
    pub placed_at: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryRow {
    pub gameweek: i32,
    pub player: String,
    pub weekly: String,
    pub special: String,
    pub banked: String,
    pub provisional: String,
}

/// Database row for a proposition pool; `options` is JSON.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = proposition_pools)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropositionPoolRow {
    pub id: String,
    pub gameweek: i32,
    pub description: String,
    pub allowance: String,
    pub options: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = proposition_bets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropositionBetRow {
    pub pool_id: String,
    pub player: String,
    pub option_id: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = proposition_outcomes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropositionOutcomeRow {
    pub pool_id: String,
    pub winner: String,
    pub gameweek: i32,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = special_adjustments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SpecialAdjustmentRow {
    pub pool_id: String,
    pub player: String,
    pub gameweek: i32,
    pub amount: String,
}
