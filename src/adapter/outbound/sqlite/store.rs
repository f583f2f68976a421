//! SQLite pool store implementation.
//!
//! Persists the whole pool using Diesel. Operations that must be atomic
//! (`replace_results`, `replace_entries`, `commit_proposition`) run inside
//! one transaction.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    GameRow, GameweekRow, LedgerEntryRow, PropositionBetRow, PropositionOutcomeRow,
    PropositionPoolRow, ResultRow, SeasonRow, SpecialAdjustmentRow, WagerRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    games, gameweeks, ledger_entries, proposition_bets, proposition_outcomes, proposition_pools,
    results, season, special_adjustments, wagers,
};
use crate::domain::{
    FractionalOdds, Game, GameId, GameResult, Gameweek, GameweekNumber, LedgerEntry, Leg, OptionId,
    PlayerId, PoolId, PropositionBet, PropositionOption, PropositionOutcome, PropositionPool,
    ResultBook, Season, SpecialAdjustment, Wager, WagerId,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    LedgerStore, PropositionCommit, PropositionStore, SeasonStore, WagerStore,
};

const SEASON_ROW_ID: i32 = 1;

/// SQLite-backed implementation of every store port.
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

fn db_err(e: diesel::result::Error) -> Error {
    Error::Database(e.to_string())
}

fn parse_err(e: impl std::fmt::Display) -> Error {
    Error::Parse(e.to_string())
}

fn to_db_gameweek(gameweek: GameweekNumber) -> Result<i32> {
    i32::try_from(gameweek).map_err(parse_err)
}

fn from_db_gameweek(gameweek: i32) -> Result<GameweekNumber> {
    GameweekNumber::try_from(gameweek).map_err(parse_err)
}

fn parse_decimal(text: &str) -> Result<Decimal> {
    Decimal::from_str(text).map_err(parse_err)
}

fn parse_time(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)
        .map_err(parse_err)?
        .with_timezone(&Utc))
}

fn parse_odds(text: &str) -> Result<FractionalOdds> {
    FractionalOdds::from_str(text).map_err(Error::Parse)
}

fn game_to_row(game: &Game) -> Result<GameRow> {
    Ok(GameRow {
        id: game.id.to_string(),
        gameweek: to_db_gameweek(game.gameweek)?,
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        home_odds: game.home_odds.to_string(),
        draw_odds: game.draw_odds.to_string(),
        away_odds: game.away_odds.to_string(),
    })
}

fn game_from_row(row: GameRow) -> Result<Game> {
    Ok(Game {
        id: GameId::from(row.id),
        gameweek: from_db_gameweek(row.gameweek)?,
        home_team: row.home_team,
        away_team: row.away_team,
        home_odds: parse_odds(&row.home_odds)?,
        draw_odds: parse_odds(&row.draw_odds)?,
        away_odds: parse_odds(&row.away_odds)?,
    })
}

fn wager_to_row(wager: &Wager) -> Result<WagerRow> {
    Ok(WagerRow {
        id: wager.id().to_string(),
        player: wager.player().to_string(),
        gameweek: to_db_gameweek(wager.gameweek())?,
        stake: wager.stake().to_string(),
        legs: serde_json::to_string(wager.legs())?,
        placed_at: wager.placed_at().to_rfc3339(),
    })
}

fn wager_from_row(row: WagerRow) -> Result<Wager> {
    let legs: Vec<Leg> = serde_json::from_str(&row.legs)?;
    Ok(Wager::try_with_id(
        WagerId::from(row.id),
        PlayerId::from(row.player),
        from_db_gameweek(row.gameweek)?,
        parse_decimal(&row.stake)?,
        legs,
        parse_time(&row.placed_at)?,
    )?)
}

fn entry_to_row(entry: &LedgerEntry) -> Result<LedgerEntryRow> {
    Ok(LedgerEntryRow {
        gameweek: to_db_gameweek(entry.gameweek())?,
        player: entry.player().to_string(),
        weekly: entry.weekly().to_string(),
        special: entry.special().to_string(),
        banked: entry.banked().to_string(),
        provisional: entry.provisional().to_string(),
    })
}

fn entry_from_row(row: LedgerEntryRow) -> Result<LedgerEntry> {
    Ok(LedgerEntry::new(
        PlayerId::from(row.player),
        from_db_gameweek(row.gameweek)?,
        parse_decimal(&row.weekly)?,
        parse_decimal(&row.special)?,
        parse_decimal(&row.banked)?,
    ))
}

fn pool_from_row(row: PropositionPoolRow) -> Result<PropositionPool> {
    let options: Vec<PropositionOption> = serde_json::from_str(&row.options)?;
    Ok(PropositionPool::try_new(
        PoolId::from(row.id),
        from_db_gameweek(row.gameweek)?,
        row.description,
        parse_decimal(&row.allowance)?,
        options,
    )?)
}

fn adjustment_from_row(row: SpecialAdjustmentRow) -> Result<SpecialAdjustment> {
    Ok(SpecialAdjustment {
        pool: PoolId::from(row.pool_id),
        player: PlayerId::from(row.player),
        gameweek: from_db_gameweek(row.gameweek)?,
        amount: parse_decimal(&row.amount)?,
    })
}

impl SeasonStore for SqliteStore {
    async fn season(&self) -> Result<Option<Season>> {
        let mut conn = self.conn()?;
        let row: Option<SeasonRow> = season::table
            .find(SEASON_ROW_ID)
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;

        row.map(|row| Ok(Season::try_new(row.name, parse_decimal(&row.base_allowance)?)?))
            .transpose()
    }

    async fn save_season(&self, value: &Season) -> Result<()> {
        let row = SeasonRow {
            id: SEASON_ROW_ID,
            name: value.name().to_string(),
            base_allowance: value.base_allowance().to_string(),
        };
        let mut conn = self.conn()?;
        diesel::replace_into(season::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(())
    }

    async fn gameweeks(&self) -> Result<Vec<Gameweek>> {
        let mut conn = self.conn()?;
        let rows: Vec<GameweekRow> = gameweeks::table
            .order(gameweeks::number.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(Gameweek {
                    number: from_db_gameweek(row.number)?,
                    deadline: parse_time(&row.deadline)?,
                    spiel: row.spiel,
                })
            })
            .collect()
    }

    async fn save_gameweek(&self, gameweek: &Gameweek) -> Result<()> {
        let row = GameweekRow {
            number: to_db_gameweek(gameweek.number)?,
            deadline: gameweek.deadline.to_rfc3339(),
            spiel: gameweek.spiel.clone(),
        };
        let mut conn = self.conn()?;
        diesel::replace_into(gameweeks::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(())
    }

    async fn games(&self, gameweek: GameweekNumber) -> Result<Vec<Game>> {
        let mut conn = self.conn()?;
        let rows: Vec<GameRow> = games::table
            .filter(games::gameweek.eq(to_db_gameweek(gameweek)?))
            .order(games::id.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(game_from_row).collect()
    }

    async fn save_games(&self, values: &[Game]) -> Result<()> {
        let rows = values.iter().map(game_to_row).collect::<Result<Vec<_>>>()?;
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            for row in &rows {
                diesel::replace_into(games::table).values(row).execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(())
        })
        .map_err(db_err)
    }

    async fn results(&self, gameweek: GameweekNumber) -> Result<ResultBook> {
        let mut conn = self.conn()?;
        let rows: Vec<ResultRow> = results::table
            .filter(results::gameweek.eq(to_db_gameweek(gameweek)?))
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter()
            .map(|row| {
                let result = GameResult::from_str(&row.result).map_err(Error::Parse)?;
                Ok((GameId::from(row.game_id), result))
            })
            .collect()
    }

    async fn replace_results(&self, gameweek: GameweekNumber, book: &ResultBook) -> Result<()> {
        let gw = to_db_gameweek(gameweek)?;
        let rows: Vec<ResultRow> = book
            .iter()
            .map(|(game, result)| ResultRow {
                game_id: game.to_string(),
                gameweek: gw,
                result: result.code().to_string(),
            })
            .collect();

        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            diesel::delete(results::table.filter(results::gameweek.eq(gw))).execute(conn)?;
            for row in &rows {
                diesel::replace_into(results::table).values(row).execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(())
        })
        .map_err(db_err)
    }
}

impl WagerStore for SqliteStore {
    async fn wagers(&self, gameweek: GameweekNumber) -> Result<Vec<Wager>> {
        let mut conn = self.conn()?;
        let rows: Vec<WagerRow> = wagers::table
            .filter(wagers::gameweek.eq(to_db_gameweek(gameweek)?))
            .order(wagers::placed_at.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(wager_from_row).collect()
    }

    async fn player_wagers(&self, player: &PlayerId, gameweek: GameweekNumber) -> Result<Vec<Wager>> {
        let mut conn = self.conn()?;
        let rows: Vec<WagerRow> = wagers::table
            .filter(wagers::gameweek.eq(to_db_gameweek(gameweek)?))
            .filter(wagers::player.eq(player.as_str()))
            .order(wagers::placed_at.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(wager_from_row).collect()
    }

    async fn wager(&self, id: &WagerId) -> Result<Option<Wager>> {
        let mut conn = self.conn()?;
        let row: Option<WagerRow> = wagers::table
            .find(id.to_string())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;

        row.map(wager_from_row).transpose()
    }

    async fn save_wager(&self, wager: &Wager) -> Result<()> {
        let row = wager_to_row(wager)?;
        let mut conn = self.conn()?;
        diesel::replace_into(wagers::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(())
    }
}

impl LedgerStore for SqliteStore {
    async fn entries(&self, gameweek: GameweekNumber) -> Result<Vec<LedgerEntry>> {
        let mut conn = self.conn()?;
        let rows: Vec<LedgerEntryRow> = ledger_entries::table
            .filter(ledger_entries::gameweek.eq(to_db_gameweek(gameweek)?))
            .order(ledger_entries::player.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(entry_from_row).collect()
    }

    async fn entry(&self, player: &PlayerId, gameweek: GameweekNumber) -> Result<Option<LedgerEntry>> {
        let mut conn = self.conn()?;
        let row: Option<LedgerEntryRow> = ledger_entries::table
            .find((to_db_gameweek(gameweek)?, player.as_str()))
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;

        row.map(entry_from_row).transpose()
    }

    async fn replace_entries(&self, gameweek: GameweekNumber, entries: &[LedgerEntry]) -> Result<()> {
        let gw = to_db_gameweek(gameweek)?;
        let rows = entries.iter().map(entry_to_row).collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            diesel::delete(ledger_entries::table.filter(ledger_entries::gameweek.eq(gw)))
                .execute(conn)?;
            for row in &rows {
                diesel::insert_into(ledger_entries::table)
                    .values(row)
                    .execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(())
        })
        .map_err(db_err)
    }

    async fn settled_gameweeks(&self) -> Result<Vec<GameweekNumber>> {
        let mut conn = self.conn()?;
        let rows: Vec<i32> = ledger_entries::table
            .select(ledger_entries::gameweek)
            .distinct()
            .order(ledger_entries::gameweek.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(from_db_gameweek).collect()
    }
}

impl PropositionStore for SqliteStore {
    async fn pools(&self) -> Result<Vec<PropositionPool>> {
        let mut conn = self.conn()?;
        let rows: Vec<PropositionPoolRow> = proposition_pools::table
            .order(proposition_pools::id.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(pool_from_row).collect()
    }

    async fn pool(&self, id: &PoolId) -> Result<Option<PropositionPool>> {
        let mut conn = self.conn()?;
        let row: Option<PropositionPoolRow> = proposition_pools::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;

        row.map(pool_from_row).transpose()
    }

    async fn save_pool(&self, pool: &PropositionPool) -> Result<()> {
        let row = PropositionPoolRow {
            id: pool.id().to_string(),
            gameweek: to_db_gameweek(pool.gameweek())?,
            description: pool.description().to_string(),
            allowance: pool.allowance().to_string(),
            options: serde_json::to_string(pool.options())?,
        };
        let mut conn = self.conn()?;
        diesel::replace_into(proposition_pools::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(())
    }

    async fn bets(&self, pool: &PoolId) -> Result<Vec<PropositionBet>> {
        let mut conn = self.conn()?;
        let rows: Vec<PropositionBetRow> = proposition_bets::table
            .filter(proposition_bets::pool_id.eq(pool.as_str()))
            .order(proposition_bets::player.asc())
            .load(&mut conn)
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| PropositionBet {
                pool: PoolId::from(row.pool_id),
                player: PlayerId::from(row.player),
                option: OptionId::from(row.option_id),
            })
            .collect())
    }

    async fn save_bet(&self, bet: &PropositionBet) -> Result<()> {
        let row = PropositionBetRow {
            pool_id: bet.pool.to_string(),
            player: bet.player.to_string(),
            option_id: bet.option.to_string(),
        };
        let mut conn = self.conn()?;
        diesel::replace_into(proposition_bets::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db_err)?;
        Ok(())
    }

    async fn outcome(&self, pool: &PoolId) -> Result<Option<PropositionOutcome>> {
        let mut conn = self.conn()?;
        let row: Option<PropositionOutcomeRow> = proposition_outcomes::table
            .find(pool.as_str())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;

        row.map(|row| {
            Ok(PropositionOutcome {
                pool: PoolId::from(row.pool_id),
                winner: OptionId::from(row.winner),
                gameweek: from_db_gameweek(row.gameweek)?,
            })
        })
        .transpose()
    }

    async fn pool_adjustments(&self, pool: &PoolId) -> Result<Vec<SpecialAdjustment>> {
        let mut conn = self.conn()?;
        let rows: Vec<SpecialAdjustmentRow> = special_adjustments::table
            .filter(special_adjustments::pool_id.eq(pool.as_str()))
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(adjustment_from_row).collect()
    }

    async fn gameweek_adjustments(&self, gameweek: GameweekNumber) -> Result<Vec<SpecialAdjustment>> {
        let mut conn = self.conn()?;
        let rows: Vec<SpecialAdjustmentRow> = special_adjustments::table
            .filter(special_adjustments::gameweek.eq(to_db_gameweek(gameweek)?))
            .load(&mut conn)
            .map_err(db_err)?;

        rows.into_iter().map(adjustment_from_row).collect()
    }

    async fn commit_proposition(&self, commit: &PropositionCommit) -> Result<()> {
        let outcome = PropositionOutcomeRow {
            pool_id: commit.outcome.pool.to_string(),
            winner: commit.outcome.winner.to_string(),
            gameweek: to_db_gameweek(commit.outcome.gameweek)?,
        };
        let entries = commit
            .entries
            .iter()
            .map(entry_to_row)
            .collect::<Result<Vec<_>>>()?;
        let deltas = commit
            .adjustments
            .iter()
            .map(|adj| Ok((adj, to_db_gameweek(adj.gameweek)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            diesel::replace_into(proposition_outcomes::table)
                .values(&outcome)
                .execute(conn)
                .map_err(db_err)?;

            for (adj, gw) in &deltas {
                let key = (adj.pool.as_str(), adj.player.as_str(), *gw);
                let existing: Option<SpecialAdjustmentRow> = special_adjustments::table
                    .find(key)
                    .first(conn)
                    .optional()
                    .map_err(db_err)?;
                let total = match existing {
                    Some(row) => parse_decimal(&row.amount)? + adj.amount,
                    None => adj.amount,
                };
                diesel::replace_into(special_adjustments::table)
                    .values(&SpecialAdjustmentRow {
                        pool_id: adj.pool.to_string(),
                        player: adj.player.to_string(),
                        gameweek: *gw,
                        amount: total.to_string(),
                    })
                    .execute(conn)
                    .map_err(db_err)?;
            }

            for row in &entries {
                diesel::replace_into(ledger_entries::table)
                    .values(row)
                    .execute(conn)
                    .map_err(db_err)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use rust_decimal_macros::dec;

    fn setup() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteStore::new(pool))
    }

    #[tokio::test]
    async fn entries_keep_two_decimal_places() {
        let (_dir, store) = setup();
        let entry = LedgerEntry::new(PlayerId::from("two"), 2, dec!(14.58), dec!(0), dec!(14.58));
        store.replace_entries(2, &[entry.clone()]).await.unwrap();

        let loaded = store.entry(&PlayerId::from("two"), 2).await.unwrap().unwrap();
        assert_eq!(loaded, entry);
        assert_eq!(loaded.provisional(), dec!(29.16));
        assert_eq!(store.settled_gameweeks().await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn wagers_survive_a_round_trip() {
        let (_dir, store) = setup();
        let wager = Wager::try_new(
            PlayerId::from("one"),
            1,
            dec!(25),
            vec![Leg::new("g1", crate::domain::Outcome::Home)],
        )
        .unwrap();
        store.save_wager(&wager).await.unwrap();

        let loaded = store.wager(wager.id()).await.unwrap().unwrap();
        assert_eq!(loaded.legs(), wager.legs());
        assert_eq!(loaded.stake(), dec!(25));
    }
}
