use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::DEFAULT_BOT_NAME;
use crate::event::DEFAULT_ROOM;
use crate::rankings::LookupOutcome;
use crate::shared::{AppError, AppState};
use crate::tournament::{Tournament, TournamentPhase, TournamentSummary};

#[derive(Debug, Deserialize)]
pub struct RankingQueryParams {
    /// `room, format, player` lookup text
    #[serde(default)]
    pub q: String,
    /// Room assumed when the lookup does not name one
    pub room: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankingQueryResponse {
    /// Chat-ready rendering of the outcome
    pub message: String,
    #[serde(flatten)]
    pub outcome: LookupOutcome,
}

#[derive(Debug, Serialize)]
pub struct TournamentView {
    pub phase: TournamentPhase,
    #[serde(flatten)]
    pub tournament: Tournament,
}

#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub message: String,
}

/// Read-only query routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { DEFAULT_BOT_NAME }))
        .route("/rankings", get(query_rankings))
        .route("/rooms/:room/history", get(room_history))
        .route("/rooms/:room/tournament", get(active_tournament))
        .route("/rooms/:room/oldgen", get(old_gen_notice))
        .with_state(state)
}

/// GET /rankings?q=room,format,player&room=current
#[instrument(name = "query_rankings", skip(state))]
pub async fn query_rankings(
    State(state): State<AppState>,
    Query(params): Query<RankingQueryParams>,
) -> Result<Json<RankingQueryResponse>, AppError> {
    let current_room = params.room.as_deref().unwrap_or(DEFAULT_ROOM);
    let outcome = state.rankings.lookup(&params.q, current_room).await?;

    info!(found = outcome.is_found(), "Rankings lookup resolved");

    Ok(Json(RankingQueryResponse {
        message: outcome.to_string(),
        outcome,
    }))
}

/// GET /rooms/:room/history
pub async fn room_history(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Json<Vec<TournamentSummary>> {
    Json(state.tournaments.history(&room).await)
}

/// GET /rooms/:room/tournament
pub async fn active_tournament(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<TournamentView>, AppError> {
    state
        .tournaments
        .active(&room)
        .await
        .map(|tournament| {
            Json(TournamentView {
                phase: tournament.phase(),
                tournament,
            })
        })
        .ok_or_else(|| AppError::NotFound(format!("No tournament running in {}", room)))
}

/// GET /rooms/:room/oldgen
pub async fn old_gen_notice(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<NoticeResponse>, AppError> {
    state
        .tournaments
        .old_gen_notice(&room)
        .await
        .map(|message| Json(NoticeResponse { message }))
        .ok_or_else(|| {
            AppError::NotFound("No tour is currently active, so this command is disabled.".to_string())
        })
}
