//! Wager and proposition bet admission.
//!
//! Every admission runs under the (player, gameweek) lock so two concurrent
//! submissions can never jointly exceed the player's allowance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::state::PoolLocks;
use crate::domain::{
    allowance_for, round_money, AllowanceBudget, Game, Gameweek, GameweekIndex, GameweekNumber, Leg,
    Money, OptionId, PlayerId, PoolId, PropositionBet, Season, Wager, WagerId,
};
use crate::error::{Error, Result, ValidationError};
use crate::port::outbound::store::PoolStore;

/// A wager as submitted by a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WagerRequest {
    pub player: PlayerId,
    pub gameweek: GameweekNumber,
    pub stake: Money,
    pub legs: Vec<Leg>,
}

/// A stored wager with its current payout (`None` while legs are pending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WagerView {
    #[serde(flatten)]
    pub wager: Wager,
    pub payout: Option<Money>,
}

/// Admits wagers and proposition bets.
pub struct AdmissionService<S> {
    store: Arc<S>,
    locks: Arc<PoolLocks>,
}

impl<S: PoolStore> AdmissionService<S> {
    #[must_use]
    pub fn new(store: Arc<S>, locks: Arc<PoolLocks>) -> Self {
        Self { store, locks }
    }

    /// Admit a new wager.
    ///
    /// # Errors
    /// Any [`ValidationError`]: structure, deadline, a gameweek that is
    /// already settled, foreign game, or stake beyond the remaining
    /// allowance.
    pub async fn place_wager(&self, request: WagerRequest, now: DateTime<Utc>) -> Result<Wager> {
        let _guard = self.locks.admission(&request.player, request.gameweek).await;
        let _gameweek = self.locks.gameweek_shared(request.gameweek).await;
        let result = self.admit(None, request, now).await;
        log_admission(&result, "wager placed");
        result
    }

    /// Replace the stake and legs of an existing wager. The wager keeps its
    /// id and gameweek; its old stake does not count against the allowance.
    ///
    /// # Errors
    /// [`ValidationError::UnknownWager`], [`ValidationError::NotOwner`], or
    /// any rule checked by [`AdmissionService::place_wager`].
    pub async fn edit_wager(
        &self,
        id: &WagerId,
        player: &PlayerId,
        stake: Money,
        legs: Vec<Leg>,
        now: DateTime<Utc>,
    ) -> Result<Wager> {
        // Wagers never change gameweek, so this read only picks the lock.
        let gameweek = self
            .store
            .wager(id)
            .await?
            .ok_or_else(|| ValidationError::UnknownWager(id.clone()))?
            .gameweek();
        let _guard = self.locks.admission(player, gameweek).await;
        let _gameweek = self.locks.gameweek_shared(gameweek).await;

        let existing = self
            .store
            .wager(id)
            .await?
            .ok_or_else(|| ValidationError::UnknownWager(id.clone()))?;
        if existing.player() != player {
            return Err(ValidationError::NotOwner {
                wager: id.clone(),
                owner: existing.player().clone(),
                player: player.clone(),
            }
            .into());
        }

        let request = WagerRequest {
            player: player.clone(),
            gameweek,
            stake,
            legs,
        };
        let result = self.admit(Some(&existing), request, now).await;
        log_admission(&result, "wager edited");
        result
    }

    /// Allowance and stakes for a player in a gameweek.
    ///
    /// # Errors
    /// Fails when the season or gameweek is unknown.
    pub async fn unused_allowance(
        &self,
        player: &PlayerId,
        gameweek: GameweekNumber,
    ) -> Result<AllowanceBudget> {
        let (season, _) = self.load_gameweek(gameweek).await?;
        let wagers = self.store.player_wagers(player, gameweek).await?;
        let allowance = self.allowance(&season, player, gameweek).await?;
        Ok(AllowanceBudget::new(allowance, wagers.iter().map(Wager::stake)))
    }

    /// Wagers in a gameweek, oldest first, priced against the results
    /// posted so far.
    ///
    /// # Errors
    /// Store failures, or a wager referencing a game the store has lost.
    pub async fn wagers(
        &self,
        gameweek: GameweekNumber,
        player: Option<&PlayerId>,
    ) -> Result<Vec<WagerView>> {
        let wagers = match player {
            Some(player) => self.store.player_wagers(player, gameweek).await?,
            None => self.store.wagers(gameweek).await?,
        };
        let games = self.store.games(gameweek).await?;
        let results = self.store.results(gameweek).await?;
        wagers
            .into_iter()
            .map(|wager| -> Result<WagerView> {
                let payout = wager.price(&games, &results)?.amount().map(round_money);
                Ok(WagerView { wager, payout })
            })
            .collect()
    }

    /// Record a player's choice in a proposition pool, replacing any earlier
    /// choice.
    ///
    /// # Errors
    /// Unknown pool or option, outcome already declared, or the creating
    /// gameweek's deadline has passed.
    pub async fn place_proposition_bet(
        &self,
        pool: &PoolId,
        player: &PlayerId,
        option: &OptionId,
        now: DateTime<Utc>,
    ) -> Result<PropositionBet> {
        let result = self.admit_bet(pool, player, option, now).await;
        match &result {
            Ok(bet) => info!(pool = %bet.pool, player = %bet.player, option = %bet.option, "proposition bet placed"),
            Err(err) => warn!(pool = %pool, player = %player, error = %err, "proposition bet rejected"),
        }
        result
    }

    async fn admit_bet(
        &self,
        pool_id: &PoolId,
        player: &PlayerId,
        option: &OptionId,
        now: DateTime<Utc>,
    ) -> Result<PropositionBet> {
        let _pool_guard = self.locks.pool(pool_id).await;
        let pool = self
            .store
            .pool(pool_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownPool(pool_id.clone()))?;
        let _guard = self.locks.admission(player, pool.gameweek()).await;

        if pool.option(option).is_none() {
            return Err(ValidationError::UnknownOption {
                pool: pool_id.clone(),
                option: option.clone(),
            }
            .into());
        }
        if self.store.outcome(pool_id).await?.is_some() {
            return Err(ValidationError::OutcomeDeclared(pool_id.clone()).into());
        }
        let (_, gameweek) = self.load_gameweek(pool.gameweek()).await?;
        ensure_open(&gameweek, now)?;

        let bet = PropositionBet {
            pool: pool_id.clone(),
            player: player.clone(),
            option: option.clone(),
        };
        self.store.save_bet(&bet).await?;
        Ok(bet)
    }

    async fn admit(
        &self,
        existing: Option<&Wager>,
        request: WagerRequest,
        now: DateTime<Utc>,
    ) -> Result<Wager> {
        let (season, gameweek) = self.load_gameweek(request.gameweek).await?;
        ensure_open(&gameweek, now)?;
        let games = self.store.games(request.gameweek).await?;
        self.ensure_unsettled(request.gameweek, &games).await?;

        let wager = match existing {
            Some(old) => Wager::try_with_id(
                old.id().clone(),
                request.player.clone(),
                request.gameweek,
                request.stake,
                request.legs,
                now,
            ),
            None => Wager::try_new(
                request.player.clone(),
                request.gameweek,
                request.stake,
                request.legs,
            ),
        }
        .map_err(ValidationError::from)?;

        if let Some(leg) = wager
            .legs()
            .iter()
            .find(|leg| !games.iter().any(|g| g.id == leg.game))
        {
            return Err(ValidationError::GameNotInGameweek {
                game: leg.game.clone(),
                gameweek: request.gameweek,
            }
            .into());
        }

        let allowance = self
            .allowance(&season, &request.player, request.gameweek)
            .await?;
        let others = self
            .store
            .player_wagers(&request.player, request.gameweek)
            .await?;
        let budget = AllowanceBudget::new(
            allowance,
            others
                .iter()
                .filter(|w| existing.map_or(true, |old| old.id() != w.id()))
                .map(Wager::stake),
        );
        if !budget.admits(wager.stake()) {
            return Err(ValidationError::StakeExceedsAllowance {
                stake: wager.stake(),
                remaining: budget.remaining(),
                allowance,
            }
            .into());
        }

        self.store.save_wager(&wager).await?;
        Ok(wager)
    }

    /// Once every result is in, or entries exist, the ledger for the
    /// gameweek is fixed and a new stake would never be settled.
    async fn ensure_unsettled(&self, gameweek: GameweekNumber, games: &[Game]) -> Result<()> {
        let complete = !games.is_empty() && self.store.results(gameweek).await?.is_complete(games);
        if complete || !self.store.entries(gameweek).await?.is_empty() {
            return Err(ValidationError::GameweekSettled(gameweek).into());
        }
        Ok(())
    }

    async fn allowance(
        &self,
        season: &Season,
        player: &PlayerId,
        gameweek: GameweekNumber,
    ) -> Result<Money> {
        let previous = match gameweek.checked_sub(1) {
            Some(prev) if prev > 0 => self.store.entry(player, prev).await?,
            _ => None,
        };
        Ok(allowance_for(season.base_allowance(), previous.as_ref()))
    }

    async fn load_gameweek(&self, number: GameweekNumber) -> Result<(Season, Gameweek)> {
        let season = self.store.season().await?.ok_or(Error::NoSeason)?;
        let index = GameweekIndex::try_new(self.store.gameweeks().await?)?;
        let gameweek = index
            .get(number)
            .cloned()
            .ok_or(ValidationError::UnknownGameweek(number))?;
        Ok((season, gameweek))
    }
}

fn ensure_open(gameweek: &Gameweek, now: DateTime<Utc>) -> Result<()> {
    if gameweek.is_open_at(now) {
        Ok(())
    } else {
        Err(ValidationError::DeadlinePassed {
            gameweek: gameweek.number,
            deadline: gameweek.deadline,
        }
        .into())
    }
}

fn log_admission(result: &Result<Wager>, message: &'static str) {
    match result {
        Ok(wager) => info!(
            wager = %wager.id(),
            player = %wager.player(),
            gameweek = wager.gameweek(),
            stake = %wager.stake(),
            legs = wager.legs().len(),
            "{message}"
        ),
        Err(err) => warn!(error = %err, "wager rejected"),
    }
}
