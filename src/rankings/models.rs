use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate counters for one player within one room/format pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub entered: u32,
    pub won: u32,
}

impl RankingRecord {
    /// Fraction of entered tournaments that were won
    pub fn win_rate(&self) -> f64 {
        if self.entered == 0 {
            return 0.0;
        }
        f64::from(self.won) / f64::from(self.entered)
    }
}

/// player id -> record
pub type FormatRankings = BTreeMap<String, RankingRecord>;
/// format -> players
pub type RoomRankings = BTreeMap<String, FormatRankings>;

/// The whole persisted mapping: room -> format -> player -> record
///
/// This is the unit of durability; every mutation rewrites it entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankingDocument {
    rooms: BTreeMap<String, RoomRankings>,
}

impl RankingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn room(&self, room: &str) -> Option<&RoomRankings> {
        self.rooms.get(room)
    }

    pub fn format(&self, room: &str, format: &str) -> Option<&FormatRankings> {
        self.room(room)?.get(format)
    }

    pub fn record(&self, room: &str, format: &str, player: &str) -> Option<RankingRecord> {
        self.format(room, format)?.get(player).copied()
    }

    /// Count one entry for each player, creating records as needed
    pub fn add_participation(&mut self, room: &str, format: &str, players: &[String]) {
        let format_rankings = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .entry(format.to_string())
            .or_default();

        for player in players {
            format_rankings.entry(player.clone()).or_default().entered += 1;
        }
    }

    /// Count one win for each listed player that already has a record.
    ///
    /// Returns the players that were skipped: those without a record, or
    /// whose win count would pass their entry count.
    pub fn add_wins(&mut self, room: &str, format: &str, winners: &[String]) -> Vec<String> {
        let mut skipped = Vec::new();

        for winner in winners {
            let record = self
                .rooms
                .get_mut(room)
                .and_then(|formats| formats.get_mut(format))
                .and_then(|players| players.get_mut(winner));

            match record {
                // won may never pass entered
                Some(record) if record.won < record.entered => record.won += 1,
                _ => skipped.push(winner.clone()),
            }
        }

        skipped
    }
}

/// A leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub player: String,
    pub entered: u32,
    pub won: u32,
}

impl RankedEntry {
    pub fn win_rate(&self) -> f64 {
        RankingRecord {
            entered: self.entered,
            won: self.won,
        }
        .win_rate()
    }
}
