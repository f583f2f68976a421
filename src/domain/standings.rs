//! Gameweek rankings and movement against the previous gameweek.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::id::{GameweekNumber, PlayerId};
use super::ledger::LedgerEntry;
use super::money::Money;

/// Position change relative to the previous gameweek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "places", rename_all = "snake_case")]
pub enum Movement {
    Up(usize),
    Down(usize),
    Unchanged,
    /// No entry in the previous gameweek.
    New,
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up(n) => write!(f, "+{n}"),
            Self::Down(n) => write!(f, "-{n}"),
            Self::Unchanged => f.write_str("="),
            Self::New => f.write_str("new"),
        }
    }
}

/// One row of a gameweek's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub position: usize,
    pub player: PlayerId,
    pub gameweek: GameweekNumber,
    pub weekly: Money,
    pub special: Money,
    pub banked: Money,
    pub provisional: Money,
    pub movement: Movement,
}

/// Entries sorted by `provisional` descending, ties by player id ascending.
#[must_use]
pub fn rank(entries: &[LedgerEntry]) -> Vec<&LedgerEntry> {
    let mut ranked: Vec<&LedgerEntry> = entries.iter().collect();
    ranked.sort_by(|a, b| {
        b.provisional()
            .cmp(&a.provisional())
            .then_with(|| a.player().cmp(b.player()))
    });
    ranked
}

/// Build the table for `current`, comparing positions with `previous`.
#[must_use]
pub fn standings(current: &[LedgerEntry], previous: &[LedgerEntry]) -> Vec<Standing> {
    let before: HashMap<&PlayerId, usize> = rank(previous)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| (entry.player(), i + 1))
        .collect();

    rank(current)
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let position = i + 1;
            let movement = match before.get(entry.player()) {
                None => Movement::New,
                Some(&old) if old > position => Movement::Up(old - position),
                Some(&old) if old < position => Movement::Down(position - old),
                Some(_) => Movement::Unchanged,
            };
            Standing {
                position,
                player: entry.player().clone(),
                gameweek: entry.gameweek(),
                weekly: entry.weekly(),
                special: entry.special(),
                banked: entry.banked(),
                provisional: entry.provisional(),
                movement,
            }
        })
        .collect()
}
