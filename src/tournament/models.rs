use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::to_id;

/// Prefix the server puts in front of battle room ids
pub const BATTLE_ROOM_PREFIX: &str = "battle-";

/// Public host serving uploaded replays
pub const DEFAULT_REPLAY_BASE_URL: &str = "https://replay.pokemonshowdown.com/";

/// Public replay URL for a finished battle room
///
/// `battle-gen7nu-12345` becomes `{base}/gen7nu-12345`.
pub fn replay_url(base_url: &str, battle_room: &str) -> String {
    let battle_id = battle_room
        .strip_prefix(BATTLE_ROOM_PREFIX)
        .unwrap_or(battle_room);
    format!("{}/{}", base_url.trim_end_matches('/'), battle_id)
}

/// Smogon thread with sample teams for past-generation NU
pub const OLD_GEN_SAMPLE_TEAMS_URL: &str = "http://www.smogon.com/forums/threads/3562659/";

const PAST_GENERATIONS: [(&str, &str); 4] = [
    ("gen1", "RBY"),
    ("gen2", "GSC"),
    ("gen3", "RSE"),
    ("gen4", "DPP"),
];

/// Where a tournament is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentPhase {
    /// Sign-ups are open
    Open,
    /// The bracket is being played
    Running,
    /// The final match room is known
    Finals,
}

/// One tournament in one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub room: String,
    /// Format title, possibly corrected by a later update
    pub format: String,
    /// Normalized player ids in join order, without duplicates
    pub players: Vec<String>,
    pub started: bool,
    pub finals_room: Option<String>,
    pub winner: Option<String>,
    pub runner_up: Option<String>,
    pub replay_url: Option<String>,
    /// Whether the roster has been written to the ranking store
    pub participation_logged: bool,
}

impl Tournament {
    pub fn new(room: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            format: format.into(),
            players: Vec::new(),
            started: false,
            finals_room: None,
            winner: None,
            runner_up: None,
            replay_url: None,
            participation_logged: false,
        }
    }

    /// Key the ranking store files this tournament under
    pub fn format_id(&self) -> String {
        to_id(&self.format)
    }

    pub fn phase(&self) -> TournamentPhase {
        if self.finals_room.is_some() {
            TournamentPhase::Finals
        } else if self.started {
            TournamentPhase::Running
        } else {
            TournamentPhase::Open
        }
    }

    /// Add a player. Returns false if they were already signed up.
    pub fn add_player(&mut self, name: &str) -> bool {
        let id = to_id(name);
        if id.is_empty() || self.players.contains(&id) {
            return false;
        }
        self.players.push(id);
        true
    }

    /// Remove a player. Returns false if they were not signed up.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let id = to_id(name);
        let before = self.players.len();
        self.players.retain(|player| player != &id);
        self.players.len() != before
    }

    /// Chat notice pointing players of a generation-specific tournament to
    /// sample teams. Gen 1 to 4 also get a warning about the legal pool.
    pub fn old_gen_notice(&self) -> String {
        let format_id = self.format_id();
        if !format_id.starts_with("gen") {
            return "The current tour isn't a previous generation, so this command is disabled."
                .to_string();
        }

        let mut notice = String::new();
        if let Some((_, gen)) = PAST_GENERATIONS
            .iter()
            .find(|(prefix, _)| format_id.starts_with(prefix))
        {
            notice.push_str(&format!(
                "/wall Please note that bringing Pokemon that aren't **{} NU** will disqualify you\n",
                gen
            ));
        }
        notice.push_str(&format!("/wall Sample teams here: {}", OLD_GEN_SAMPLE_TEAMS_URL));
        notice
    }

    pub fn summary(&self, ended_at: DateTime<Utc>) -> TournamentSummary {
        TournamentSummary {
            room: self.room.clone(),
            title: self.format.clone(),
            winner: self.winner.clone(),
            runner_up: self.runner_up.clone(),
            player_count: self.players.len(),
            finals: self.replay_url.clone().or_else(|| self.finals_room.clone()),
            ended_at,
        }
    }
}

/// What is kept of a tournament once it is over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub room: String,
    pub title: String,
    pub winner: Option<String>,
    pub runner_up: Option<String>,
    pub player_count: usize,
    /// Replay URL of the final, or its room if no replay was saved
    pub finals: Option<String>,
    pub ended_at: DateTime<Utc>,
}
