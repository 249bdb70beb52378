use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    event::{RoomEventError, RoomEventHandler, RoomMessage},
    tournament::TournamentManager,
};

/// Event subscriber that feeds a room's events into the tournament tracker
pub struct TournamentRoomSubscriber {
    manager: Arc<TournamentManager>,
}

impl TournamentRoomSubscriber {
    pub fn new(manager: Arc<TournamentManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl RoomEventHandler for TournamentRoomSubscriber {
    async fn handle_room_event(
        &self,
        room_id: &str,
        message: RoomMessage,
    ) -> Result<(), RoomEventError> {
        self.manager.handle_message(room_id, message).await?;
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "TournamentRoomSubscriber"
    }
}
