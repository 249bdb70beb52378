#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::time::{sleep, Duration};

use tourbot::{ProtocolReader, RoomEvent};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed a raw server chunk through the protocol reader and wait for
    /// processing. Returns how many lines failed to decode.
    pub async fn send_protocol(&self, chunk: &str) -> usize {
        let mut failures = 0;

        for (room_id, decoded) in ProtocolReader::new().feed_chunk(chunk) {
            match decoded {
                Ok(message) => self.event_bus.emit_to_room(&room_id, message).await,
                Err(_) => failures += 1,
            }
        }

        sleep(Duration::from_millis(10)).await;
        failures
    }

    /// Send the chunk the server replays when the bot joins a room: an
    /// `|init|` line followed by the room's backlog
    pub async fn replay_join_backlog(&self, room_id: &str, backlog: &str) -> usize {
        self.send_protocol(&format!(">{}\n|init|chat\n|title|{}\n{}", room_id, room_id, backlog))
            .await
    }

    /// Emit a room event and wait for processing
    pub async fn emit_event(&self, room_id: &str, event: RoomEvent) {
        self.event_bus.emit_to_room(room_id, event).await;
        sleep(Duration::from_millis(10)).await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn create_tournament(&self, room_id: &str, format: &str) {
        self.send_protocol(&format!(">{}\n|tournament|create|{}", room_id, format))
            .await;
    }

    pub async fn join_players(&self, room_id: &str, players: &[&str]) {
        let mut chunk = format!(">{}", room_id);
        for player in players {
            chunk.push_str(&format!("\n|tournament|join|{}", player));
        }
        self.send_protocol(&chunk).await;
    }

    pub async fn start_tournament(&self, room_id: &str) {
        self.send_protocol(&format!(">{}\n|tournament|start|0", room_id))
            .await;
    }

    /// Create, fill and start a tournament in one go
    pub async fn run_to_start(&self, room_id: &str, format: &str, players: &[&str]) {
        self.create_tournament(room_id, format).await;
        self.join_players(room_id, players).await;
        self.start_tournament(room_id).await;
    }

    pub async fn send_update(&self, room_id: &str, json: &str) {
        self.send_protocol(&format!(">{}\n|tournament|update|{}", room_id, json))
            .await;
    }

    pub async fn announce_finals(&self, room_id: &str, battle_room: &str) {
        self.send_update(
            room_id,
            &format!(
                r#"{{"bracketData":{{"type":"tree","rootNode":{{"state":"inprogress","room":"{}"}}}}}}"#,
                battle_room
            ),
        )
        .await;
    }

    pub async fn end_tournament(&self, room_id: &str, winners: &[&str]) {
        let results = serde_json::json!({ "results": [winners], "format": "gen7nu" });
        self.send_protocol(&format!(">{}\n|tournament|end|{}", room_id, results))
            .await;
    }

    pub async fn clear_actions(&self) {
        self.transport.clear_actions().await;
    }
}
