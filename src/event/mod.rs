// Event-driven plumbing between the protocol reader and the tournament tracker
//
// Raw lines are decoded once into `RoomMessage`s, queued per room on the
// `EventBus`, and consumed by one `RoomSubscription` task per room.

// Public API - what other modules can use
pub use bus::EventBus;
pub use decoder::{
    decode_chunk, decode_line, DecodeError, DecodedLine, ProtocolReader, DEFAULT_ROOM,
};
pub use events::{
    BattleResult, BracketData, BracketNode, Delivery, RoomEvent, RoomMessage, TournamentResults,
    UpdatePayload,
};
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

// Internal modules
mod bus;
mod decoder;
mod events;
mod room_handler;
mod room_subscription;
