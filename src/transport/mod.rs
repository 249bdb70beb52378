// Outbound actions sent back to the game server
//
// Actions are fire-and-forget: delivery is not confirmed or retried.

pub use channel::ChannelTransport;

mod channel;

use async_trait::async_trait;
use strum_macros::{AsRefStr, Display, EnumIter};

/// `/tour` subcommands the bot issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TourCommand {
    Join,
    Challenge,
    AcceptChallenge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    JoinRoom {
        room_id: String,
    },
    LeaveRoom {
        room_id: String,
    },
    TournamentCommand {
        room_id: String,
        command: TourCommand,
        args: Option<String>,
    },
    /// Register a packed team for the next challenge
    SubmitTeam {
        team: String,
    },
    SaveReplay {
        room_id: String,
    },
    Say {
        room_id: String,
        message: String,
    },
}

impl OutboundAction {
    /// Render the action as a `room|message` protocol line
    pub fn to_protocol_line(&self) -> String {
        match self {
            OutboundAction::JoinRoom { room_id } => format!("|/join {}", room_id),
            OutboundAction::LeaveRoom { room_id } => format!("|/leave {}", room_id),
            OutboundAction::TournamentCommand {
                room_id,
                command,
                args,
            } => match args {
                Some(args) => format!("{}|/tour {} {}", room_id, command, args),
                None => format!("{}|/tour {}", room_id, command),
            },
            OutboundAction::SubmitTeam { team } => format!("|/utm {}", team),
            OutboundAction::SaveReplay { room_id } => format!("{}|/savereplay", room_id),
            OutboundAction::Say { room_id, message } => format!("{}|{}", room_id, message),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, action: OutboundAction);

    async fn join_room(&self, room_id: &str) {
        self.send(OutboundAction::JoinRoom {
            room_id: room_id.to_string(),
        })
        .await;
    }

    async fn leave_room(&self, room_id: &str) {
        self.send(OutboundAction::LeaveRoom {
            room_id: room_id.to_string(),
        })
        .await;
    }

    async fn tournament_command(&self, room_id: &str, command: TourCommand, args: Option<&str>) {
        self.send(OutboundAction::TournamentCommand {
            room_id: room_id.to_string(),
            command,
            args: args.map(str::to_string),
        })
        .await;
    }

    async fn submit_team(&self, team: String) {
        self.send(OutboundAction::SubmitTeam { team }).await;
    }

    async fn save_replay(&self, room_id: &str) {
        self.send(OutboundAction::SaveReplay {
            room_id: room_id.to_string(),
        })
        .await;
    }

    async fn say(&self, room_id: &str, message: &str) {
        self.send(OutboundAction::Say {
            room_id: room_id.to_string(),
            message: message.to_string(),
        })
        .await;
    }
}
