use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use super::events::RoomMessage;

/// Default number of queued events per room before emitters wait
pub const DEFAULT_ROOM_CAPACITY: usize = 256;

/// Event bus for distributing decoded protocol events to room subscribers
///
/// Each room has a single ordered queue. A full queue makes the emitter wait
/// for the room's handler, so events are never dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Room-specific event queues: room_id -> sender
    room_channels: Arc<RwLock<HashMap<String, mpsc::Sender<RoomMessage>>>>,
    room_capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_room_capacity(DEFAULT_ROOM_CAPACITY)
    }

    /// Creates a new event bus whose room queues hold `room_capacity` events
    pub fn with_room_capacity(room_capacity: usize) -> Self {
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
            room_capacity: room_capacity.max(1),
        }
    }

    /// Queues an event for the subscriber of a specific room
    pub async fn emit_to_room(&self, room_id: &str, message: impl Into<RoomMessage>) {
        let message = message.into();
        let event_type = message.event.event_type();

        let sender = {
            let room_channels = self.room_channels.read().await;
            room_channels.get(room_id).cloned()
        };
        let Some(sender) = sender else {
            debug!(room_id = %room_id, event_type, "Room event emitted with no subscriber");
            return;
        };

        match sender.send(message).await {
            Ok(()) => {
                debug!(
                    room_id = %room_id,
                    event_type,
                    free_slots = sender.capacity(),
                    "Room event emitted"
                );
            }
            Err(_) => {
                warn!(room_id = %room_id, event_type, "Room subscriber is gone - removing queue");
                let mut room_channels = self.room_channels.write().await;
                if room_channels
                    .get(room_id)
                    .is_some_and(|current| current.same_channel(&sender))
                {
                    room_channels.remove(room_id);
                }
            }
        }
    }

    /// Subscribe to events for a specific room
    ///
    /// A room has one consumer. Subscribing again replaces the previous queue.
    pub async fn subscribe_to_room(&self, room_id: &str) -> mpsc::Receiver<RoomMessage> {
        let (sender, receiver) = mpsc::channel(self.room_capacity);
        let mut room_channels = self.room_channels.write().await;
        if room_channels.insert(room_id.to_string(), sender).is_some() {
            warn!(room_id = %room_id, "Replacing existing room subscriber");
        } else {
            debug!(room_id = %room_id, "Room queue created");
        }
        receiver
    }
}
