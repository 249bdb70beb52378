use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::rankings::{RankingError, RankingService};
use crate::tournament::TournamentManager;

/// Shared application state for the query surface
#[derive(Clone)]
pub struct AppState {
    pub rankings: Arc<RankingService>,
    pub tournaments: Arc<TournamentManager>,
}

impl AppState {
    pub fn new(rankings: Arc<RankingService>, tournaments: Arc<TournamentManager>) -> Self {
        Self {
            rankings,
            tournaments,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ranking store error: {0}")]
    Rankings(#[from] RankingError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Rankings(err) => {
                tracing::error!(error = %err, "Ranking store unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ranking store unavailable".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Normalize a user, room or format name to its id form
///
/// Keeps ASCII letters and digits, lower-cased, so "Alice B." and "aliceb"
/// name the same player.
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::bot::StaticTeamProvider;
    use crate::rankings::InMemoryRankingRepository;
    use crate::tournament::TournamentContext;
    use crate::transport::{OutboundAction, Transport};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Transport that remembers every action it was asked to send
    #[derive(Default)]
    pub struct RecordingTransport {
        actions: Mutex<Vec<OutboundAction>>,
    }

    impl RecordingTransport {
        pub async fn actions(&self) -> Vec<OutboundAction> {
            self.actions.lock().await.clone()
        }

        pub async fn lines(&self) -> Vec<String> {
            self.actions
                .lock()
                .await
                .iter()
                .map(OutboundAction::to_protocol_line)
                .collect()
        }

        pub async fn clear(&self) {
            self.actions.lock().await.clear();
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, action: OutboundAction) {
            self.actions.lock().await.push(action);
        }
    }

    /// Everything a tournament needs, backed by in-memory fakes
    pub struct TestHarness {
        pub context: TournamentContext,
        pub transport: Arc<RecordingTransport>,
        pub rankings: Arc<RankingService>,
    }

    impl TestHarness {
        /// Harness whose team provider has a team for `gen7nu` only
        pub fn new() -> Self {
            Self::with_teams(StaticTeamProvider::new().with_team("gen7nu", "TEAM"))
        }

        pub fn with_teams(teams: StaticTeamProvider) -> Self {
            let transport = Arc::new(RecordingTransport::default());
            let rankings = Arc::new(RankingService::new(Arc::new(
                InMemoryRankingRepository::new(),
            )));
            let context = TournamentContext::new(rankings.clone(), Arc::new(teams), transport.clone());

            Self {
                context,
                transport,
                rankings,
            }
        }
    }

    impl Default for TestHarness {
        fn default() -> Self {
            Self::new()
        }
    }
}
