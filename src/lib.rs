// Library crate for the tournament tracking bot
// This file exposes the public API for integration tests

pub mod api;
pub mod bot;
pub mod config;
pub mod event;
pub mod rankings;
pub mod shared;
pub mod tournament;
pub mod transport;

// Re-export commonly used types for easier access in tests
pub use bot::{StaticTeamProvider, TeamProvider, TournamentRoomSubscriber};
pub use config::BotConfig;
pub use event::{EventBus, ProtocolReader, RoomEvent, RoomMessage, RoomSubscription};
pub use rankings::{
    InMemoryRankingRepository, JsonFileRankingRepository, LookupOutcome, RankingService,
};
pub use shared::{AppError, AppState};
pub use tournament::{Tournament, TournamentContext, TournamentManager};
pub use transport::{ChannelTransport, OutboundAction, TourCommand, Transport};
