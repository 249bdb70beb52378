use serde::{Deserialize, Deserializer, Serialize};

/// Bracket node state reported while a match is being played
pub const NODE_STATE_IN_PROGRESS: &str = "inprogress";

/// Events observed in a single room's tournament stream
///
/// Each variant corresponds to one `|tournament|...` (or related) protocol
/// line, decoded once at the boundary. The room the event belongs to travels
/// alongside it on the event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A tournament was created in the room
    TournamentCreated { format: String },

    /// A player signed up for the tournament
    PlayerJoined { player: String },

    /// A player dropped out of the tournament
    PlayerLeft { player: String },

    /// The bracket has been locked and the first round begins
    TournamentStarted,

    /// Partial tournament state pushed by the server
    TournamentUpdated { payload: UpdatePayload },

    /// Marks the end of a batch of update lines
    UpdateEnd,

    /// A tournament battle finished
    BattleEnded {
        player1: String,
        player2: String,
        result: BattleResult,
    },

    /// The tournament finished normally
    TournamentEnded { results: TournamentResults },

    /// The tournament was cancelled by a room moderator
    TournamentForceEnded,

    /// The server confirmed a replay upload for a battle room
    ReplaySaved { battle_id: String },
}

impl RoomEvent {
    /// Get a short name for the event type (for logging)
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::TournamentCreated { .. } => "create",
            RoomEvent::PlayerJoined { .. } => "join",
            RoomEvent::PlayerLeft { .. } => "leave",
            RoomEvent::TournamentStarted => "start",
            RoomEvent::TournamentUpdated { .. } => "update",
            RoomEvent::UpdateEnd => "updateEnd",
            RoomEvent::BattleEnded { .. } => "battleend",
            RoomEvent::TournamentEnded { .. } => "end",
            RoomEvent::TournamentForceEnded => "forceend",
            RoomEvent::ReplaySaved { .. } => "savereplay",
        }
    }
}

/// How an event reached the bot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Happened while the bot was in the room
    #[default]
    Live,
    /// Replayed by the server as part of a room's join backlog
    Backlog,
}

/// A decoded event together with how it was delivered
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMessage {
    pub event: RoomEvent,
    pub delivery: Delivery,
}

impl RoomMessage {
    pub fn live(event: RoomEvent) -> Self {
        Self {
            event,
            delivery: Delivery::Live,
        }
    }

    pub fn backlog(event: RoomEvent) -> Self {
        Self {
            event,
            delivery: Delivery::Backlog,
        }
    }

    pub fn is_backlog(&self) -> bool {
        self.delivery == Delivery::Backlog
    }
}

impl From<RoomEvent> for RoomMessage {
    fn from(event: RoomEvent) -> Self {
        Self::live(event)
    }
}

/// Outcome of a battle from the point of view of its first player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleResult {
    Win,
    Loss,
}

impl BattleResult {
    /// Anything other than an explicit "win" counts as a loss for player one
    pub fn from_protocol(value: &str) -> Self {
        if value == "win" {
            BattleResult::Win
        } else {
            BattleResult::Loss
        }
    }
}

/// Structured payload of a `|tournament|update|{json}` line
///
/// The server only sends the fields that changed, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    #[serde(default)]
    pub format: Option<String>,

    /// Opponents the bot may currently challenge
    #[serde(default)]
    pub challenges: Option<Vec<String>>,

    /// Whether someone is waiting on the bot to accept a challenge
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub challenged: Option<bool>,

    #[serde(default)]
    pub is_started: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub bracket_data: Option<BracketData>,
}

impl UpdatePayload {
    /// First opponent offered for a challenge, if any
    pub fn first_challenge(&self) -> Option<&str> {
        self.challenges.as_ref()?.first().map(String::as_str)
    }

    pub fn is_challenged(&self) -> bool {
        self.challenged.unwrap_or(false)
    }

    /// Room of the final match, when the bracket root is being played
    pub fn finals_room(&self) -> Option<&str> {
        let root = self.bracket_data.as_ref()?.root_node.as_ref()?;
        if root.state.as_deref()? != NODE_STATE_IN_PROGRESS {
            return None;
        }
        root.room.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketData {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub root_node: Option<BracketNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BracketNode {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub room: Option<String>,
}

/// Payload of a `|tournament|end|{json}` line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentResults {
    /// Finishing groups, best first
    #[serde(default)]
    pub results: Vec<Vec<String>>,
    #[serde(default)]
    pub format: Option<String>,
}

impl TournamentResults {
    pub fn winners(&self) -> &[String] {
        self.results.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Optional field that decodes to `None` when its shape is unexpected.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// `challenged` is a challenger name, a boolean or null depending on server version.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    let truthy = match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    };
    Ok(Some(truthy))
}
