use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{bus::EventBus, room_handler::RoomEventHandler};

/// Manages room event subscriptions and routes events to handlers
pub struct RoomSubscription {
    room_id: String,
    handler: Arc<dyn RoomEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(room_id: String, handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            room_id,
            handler,
            event_bus,
        }
    }

    /// Start the subscription - spawns a background task that listens to room events
    /// and routes them to the handler
    ///
    /// The queue is registered before this returns, so events emitted
    /// afterwards are never missed.
    pub async fn start(self) -> JoinHandle<()> {
        let room_id = self.room_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            room_id = %room_id,
            handler = handler_name,
            "Starting room subscription"
        );

        let mut receiver = self.event_bus.subscribe_to_room(&room_id).await;

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                debug!(
                    room_id = %room_id,
                    handler = handler_name,
                    event_type = message.event.event_type(),
                    backlog = message.is_backlog(),
                    "Received room event"
                );

                if let Err(e) = self.handler.handle_room_event(&room_id, message).await {
                    error!(
                        room_id = %room_id,
                        handler = handler_name,
                        error = %e,
                        "Room event handler failed"
                    );
                }
            }

            warn!(
                room_id = %room_id,
                handler = handler_name,
                "Room subscription ended - no more events"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RoomEvent, RoomEventError, RoomMessage};
    use crate::rankings::RankingError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tokio::time::{sleep, Duration, Instant};

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl RoomEventHandler for RecordingHandler {
        async fn handle_room_event(
            &self,
            _room_id: &str,
            message: RoomMessage,
        ) -> Result<(), RoomEventError> {
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            let name = match &message.event {
                RoomEvent::PlayerJoined { player } => player.clone(),
                other => other.event_type().to_string(),
            };
            self.seen.lock().await.push(name.clone());
            if name == "fail" {
                return Err(RankingError::Io(std::io::Error::other("disk full")).into());
            }
            Ok(())
        }

        fn handler_name(&self) -> &'static str {
            "RecordingHandler"
        }
    }

    fn joined(player: &str) -> RoomEvent {
        RoomEvent::PlayerJoined {
            player: player.to_string(),
        }
    }

    #[tokio::test]
    async fn delivers_events_in_order_and_survives_failures() {
        let bus = EventBus::new();
        let handler = Arc::new(RecordingHandler::default());
        let _handle = RoomSubscription::new("tours".to_string(), handler.clone(), bus.clone())
            .start()
            .await;

        for player in ["a", "fail", "b", "c"] {
            bus.emit_to_room("tours", joined(player)).await;
        }

        sleep(Duration::from_millis(50)).await;

        let seen = handler.seen.lock().await.clone();
        assert_eq!(seen, vec!["a", "fail", "b", "c"]);
    }

    #[tokio::test]
    async fn slow_handler_still_sees_every_event_of_a_burst() {
        let bus = EventBus::new();
        let handler = Arc::new(RecordingHandler {
            delay: Some(Duration::from_millis(1)),
            ..Default::default()
        });
        let _handle = RoomSubscription::new("tours".to_string(), handler.clone(), bus.clone())
            .start()
            .await;

        for n in 0..400 {
            bus.emit_to_room("tours", joined(&format!("p{n}"))).await;
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while handler.seen.lock().await.len() < 400 && Instant::now() < deadline {
            sleep(Duration::from_millis(20)).await;
        }

        let seen = handler.seen.lock().await.clone();
        let expected: Vec<String> = (0..400).map(|n| format!("p{n}")).collect();
        assert_eq!(seen, expected);
    }
}
