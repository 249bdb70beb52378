use std::cmp::Ordering;

use super::models::{FormatRankings, RankedEntry, RankingRecord};

/// Number of rows shown on a leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// Rank players by wins, then by win rate.
///
/// Players without a win are left off entirely. Filtering happens before
/// sorting, so every compared record has `entered >= 1`.
pub fn rank_players(players: &FormatRankings) -> Vec<RankedEntry> {
    let mut winners: Vec<(&String, &RankingRecord)> =
        players.iter().filter(|(_, record)| record.won > 0).collect();

    winners.sort_by(|(_, a), (_, b)| compare_records(a, b));

    winners
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(index, (player, record))| RankedEntry {
            rank: index + 1,
            player: player.clone(),
            entered: record.entered,
            won: record.won,
        })
        .collect()
}

fn compare_records(a: &RankingRecord, b: &RankingRecord) -> Ordering {
    b.won
        .cmp(&a.won)
        .then_with(|| b.win_rate().total_cmp(&a.win_rate()))
}
