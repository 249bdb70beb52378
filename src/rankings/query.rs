use serde::Serialize;
use std::fmt;

use super::{
    leaderboard::rank_players,
    models::{RankedEntry, RankingDocument, RankingRecord},
};
use crate::shared::to_id;

/// Result of a `room, format, player` ranking lookup
///
/// The not-found variants are ordinary outcomes meant for the person asking,
/// not failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Player {
        room: String,
        format: String,
        player: String,
        record: RankingRecord,
    },
    Leaderboard {
        room: String,
        format: String,
        entries: Vec<RankedEntry>,
    },
    UnknownRoom {
        room: String,
    },
    NoFormatGiven {
        room: String,
    },
    UnknownFormat {
        room: String,
        format: String,
    },
    UnknownPlayer {
        room: String,
        format: String,
        player: String,
    },
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(
            self,
            LookupOutcome::Player { .. } | LookupOutcome::Leaderboard { .. }
        )
    }
}

/// Resolve a comma separated `room, format, player` lookup.
///
/// Segments are normalized and read left to right. The room segment is
/// optional: when the first segment is not a known room, `current_room` is
/// used and the first segment is taken as the format.
pub fn resolve(document: &RankingDocument, query: &str, current_room: &str) -> LookupOutcome {
    let parts: Vec<String> = query.split(',').map(to_id).collect();

    let (room, rest) = match parts.split_first() {
        Some((first, rest)) if !first.is_empty() && document.room(first).is_some() => {
            (first.clone(), rest)
        }
        _ => (current_room.to_string(), parts.as_slice()),
    };

    let Some(room_rankings) = document.room(&room) else {
        return LookupOutcome::UnknownRoom { room };
    };

    let mut rest = rest.iter().filter(|part| !part.is_empty());

    let Some(format) = rest.next().cloned() else {
        return LookupOutcome::NoFormatGiven { room };
    };

    let Some(players) = room_rankings.get(&format) else {
        return LookupOutcome::UnknownFormat { room, format };
    };

    match rest.next().cloned() {
        Some(player) => match players.get(&player) {
            Some(record) => LookupOutcome::Player {
                room,
                format,
                player,
                record: *record,
            },
            None => LookupOutcome::UnknownPlayer {
                room,
                format,
                player,
            },
        },
        None => LookupOutcome::Leaderboard {
            entries: rank_players(players),
            room,
            format,
        },
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Player { player, record, .. } => write!(
                f,
                "{} has played {} and won {} ({:.1}% win rate)",
                player,
                record.entered,
                record.won,
                record.win_rate() * 100.0
            ),
            LookupOutcome::Leaderboard {
                format, entries, ..
            } => {
                if entries.is_empty() {
                    return write!(f, "Nobody has won a {} tournament yet", format);
                }
                write!(f, "{} rankings:", format)?;
                for entry in entries {
                    write!(
                        f,
                        " {}. {} ({}/{}, {:.1}%)",
                        entry.rank,
                        entry.player,
                        entry.won,
                        entry.entered,
                        entry.win_rate() * 100.0
                    )?;
                }
                Ok(())
            }
            LookupOutcome::UnknownRoom { room } => {
                write!(f, "The room {} has no data about rankings", room)
            }
            LookupOutcome::NoFormatGiven { .. } => write!(f, "No format given"),
            LookupOutcome::UnknownFormat { format, .. } => {
                write!(f, "The room has no data about the format {}", format)
            }
            LookupOutcome::UnknownPlayer {
                room,
                format,
                player,
            } => write!(f, "{} has no data for {} in {}", player, format, room),
        }
    }
}
