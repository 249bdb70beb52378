pub mod team;
pub mod tournament_room_subscriber;

pub use team::{StaticTeamProvider, TeamError, TeamProvider};
pub use tournament_room_subscriber::TournamentRoomSubscriber;
