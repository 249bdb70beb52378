pub mod manager;
pub mod models;
pub mod state_machine;

pub use manager::TournamentManager;
pub use models::{replay_url, Tournament, TournamentPhase, TournamentSummary};
pub use state_machine::{TournamentContext, TournamentStateMachine};
