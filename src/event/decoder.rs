use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::events::{BattleResult, RoomEvent, RoomMessage, TournamentResults, UpdatePayload};

/// Room that receives lines not preceded by a `>room` header
pub const DEFAULT_ROOM: &str = "lobby";

/// Errors that can occur while decoding a single protocol line
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Missing {field} in {kind} line")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct SaveReplayResponse {
    id: String,
}

/// Decoded line tagged with its room
pub type DecodedLine = (String, Result<RoomMessage, DecodeError>);

/// Incremental reader for the line-oriented server protocol
///
/// A `>room` line switches the current room; every following `|type|...`
/// line belongs to it until the next header. An `|init|` line marks the rest
/// of its chunk as the backlog the server replays when the bot joins a room.
#[derive(Debug, Clone)]
pub struct ProtocolReader {
    current_room: String,
    in_backlog: bool,
}

impl Default for ProtocolReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolReader {
    pub fn new() -> Self {
        Self {
            current_room: DEFAULT_ROOM.to_string(),
            in_backlog: false,
        }
    }

    /// Feed one raw line. Returns the decoded event (or the reason it could
    /// not be decoded) tagged with its room, or `None` for lines that carry
    /// no tournament information.
    ///
    /// A `>room` header starts a new chunk. A blank line ends the current one.
    pub fn feed(&mut self, line: &str) -> Option<DecodedLine> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(room) = line.strip_prefix('>') {
            self.end_chunk();
            self.current_room = room.trim().to_string();
            return None;
        }
        if line.is_empty() {
            self.end_chunk();
            return None;
        }
        if line == "|init" || line.starts_with("|init|") {
            debug!(room_id = %self.current_room, "Join backlog begins");
            self.in_backlog = true;
            return None;
        }

        let in_backlog = self.in_backlog;
        decode_line(line).transpose().map(|result| {
            let message = result.map(|event| {
                if in_backlog {
                    RoomMessage::backlog(event)
                } else {
                    RoomMessage::live(event)
                }
            });
            (self.current_room.clone(), message)
        })
    }

    /// Feed a whole socket message, then close it
    pub fn feed_chunk(&mut self, chunk: &str) -> Vec<DecodedLine> {
        let decoded = chunk.lines().filter_map(|line| self.feed(line)).collect();
        self.end_chunk();
        decoded
    }

    /// Close the current chunk. Backlog never carries over into the next one.
    pub fn end_chunk(&mut self) {
        self.in_backlog = false;
    }
}

/// Decode a whole message chunk as sent over the socket
pub fn decode_chunk(chunk: &str) -> Vec<DecodedLine> {
    ProtocolReader::new().feed_chunk(chunk)
}

/// Decode a single `|type|arg|...` line
pub fn decode_line(line: &str) -> Result<Option<RoomEvent>, DecodeError> {
    let Some(rest) = line.strip_prefix('|') else {
        return Ok(None);
    };
    let params: Vec<&str> = rest.split('|').collect();

    match params.as_slice() {
        ["tournament", kind, args @ ..] => decode_tournament(kind, args),
        ["queryresponse", "savereplay", args @ ..] => {
            let raw = args.join("|");
            let response: SaveReplayResponse =
                serde_json::from_str(&raw).map_err(|source| DecodeError::MalformedPayload {
                    kind: "savereplay",
                    source,
                })?;
            Ok(Some(RoomEvent::ReplaySaved {
                battle_id: response.id,
            }))
        }
        _ => Ok(None),
    }
}

fn decode_tournament(kind: &str, args: &[&str]) -> Result<Option<RoomEvent>, DecodeError> {
    let event = match kind {
        "create" => RoomEvent::TournamentCreated {
            format: required(args, 0, "create", "format")?,
        },
        "join" => RoomEvent::PlayerJoined {
            player: required(args, 0, "join", "player")?,
        },
        "leave" => RoomEvent::PlayerLeft {
            player: required(args, 0, "leave", "player")?,
        },
        "start" => RoomEvent::TournamentStarted,
        "update" => {
            // JSON may itself contain the separator
            let raw = args.join("|");
            let payload: UpdatePayload =
                serde_json::from_str(&raw).map_err(|source| DecodeError::MalformedPayload {
                    kind: "update",
                    source,
                })?;
            RoomEvent::TournamentUpdated { payload }
        }
        "updateEnd" => RoomEvent::UpdateEnd,
        "battleend" => RoomEvent::BattleEnded {
            player1: required(args, 0, "battleend", "player1")?,
            player2: required(args, 1, "battleend", "player2")?,
            result: BattleResult::from_protocol(&required(args, 2, "battleend", "result")?),
        },
        "end" => {
            let raw = args.join("|");
            let results: TournamentResults =
                serde_json::from_str(&raw).map_err(|source| DecodeError::MalformedPayload {
                    kind: "end",
                    source,
                })?;
            RoomEvent::TournamentEnded { results }
        }
        "forceend" => RoomEvent::TournamentForceEnded,
        other => {
            debug!(kind = %other, "Ignoring tournament line");
            return Ok(None);
        }
    };

    Ok(Some(event))
}

fn required(
    args: &[&str],
    index: usize,
    kind: &'static str,
    field: &'static str,
) -> Result<String, DecodeError> {
    args.get(index)
        .map(|value| value.to_string())
        .ok_or(DecodeError::MissingField { kind, field })
}
