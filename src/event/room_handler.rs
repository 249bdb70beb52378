use async_trait::async_trait;
use thiserror::Error;

use super::events::RoomMessage;
use crate::rankings::RankingError;

/// Errors that can occur when handling room events
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Ranking store error: {0}")]
    Rankings(#[from] RankingError),
}

/// Trait for components that react to a room's event stream
///
/// Events for one room are delivered to the handler one at a time and in
/// order; the handler is never invoked concurrently for the same room.
#[async_trait]
pub trait RoomEventHandler: Send + Sync {
    /// Handle a room event. `message.delivery` says whether it happened live
    /// or was replayed from the room's join backlog.
    ///
    /// Errors are reported by the subscription and never stop it, so a
    /// failing event does not affect the ones that follow.
    async fn handle_room_event(
        &self,
        room_id: &str,
        message: RoomMessage,
    ) -> Result<(), RoomEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
