pub mod leaderboard;
pub mod query;
pub mod repository;
pub mod service;

mod errors;
pub mod models;

pub use errors::RankingError;
pub use leaderboard::{rank_players, LEADERBOARD_SIZE};
pub use models::*;
pub use query::LookupOutcome;
pub use repository::{InMemoryRankingRepository, JsonFileRankingRepository, RankingRepository};
pub use service::RankingService;
