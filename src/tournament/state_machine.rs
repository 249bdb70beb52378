use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::{replay_url, Tournament, DEFAULT_REPLAY_BASE_URL};
use crate::{
    bot::TeamProvider,
    event::{BattleResult, RoomEvent, UpdatePayload},
    rankings::{RankingError, RankingService},
    transport::{TourCommand, Transport},
};

/// Collaborators shared by every tournament the bot tracks
#[derive(Clone)]
pub struct TournamentContext {
    pub rankings: Arc<RankingService>,
    pub teams: Arc<dyn TeamProvider>,
    pub transport: Arc<dyn Transport>,
    pub replay_base_url: String,
}

impl TournamentContext {
    pub fn new(
        rankings: Arc<RankingService>,
        teams: Arc<dyn TeamProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            rankings,
            teams,
            transport,
            replay_base_url: DEFAULT_REPLAY_BASE_URL.to_string(),
        }
    }

    pub fn with_replay_base_url(mut self, replay_base_url: impl Into<String>) -> Self {
        self.replay_base_url = replay_base_url.into();
        self
    }
}

/// Tracks one tournament from creation until the room closes it
///
/// The machine owns its `Tournament` exclusively and is driven by the room's
/// events in arrival order. It never ends itself; the manager discards it
/// when the room reports the tournament is over.
pub struct TournamentStateMachine {
    tournament: Tournament,
    context: TournamentContext,
}

impl TournamentStateMachine {
    pub fn new(room: &str, format: &str, context: TournamentContext) -> Self {
        Self {
            tournament: Tournament::new(room, format),
            context,
        }
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    /// Apply one room event
    ///
    /// Only a ranking store failure is returned; every other irregularity is
    /// absorbed here.
    #[instrument(
        skip(self, event),
        fields(room_id = %self.tournament.room, event_type = event.event_type())
    )]
    pub async fn handle(&mut self, event: RoomEvent) -> Result<(), RankingError> {
        match event {
            RoomEvent::PlayerJoined { player } => self.join(&player).await?,
            RoomEvent::PlayerLeft { player } => self.leave(&player),
            RoomEvent::TournamentStarted => self.start().await?,
            RoomEvent::TournamentUpdated { payload } => self.update(&payload).await,
            RoomEvent::BattleEnded {
                player1,
                player2,
                result,
            } => self.battle_end(player1, player2, result).await,
            RoomEvent::UpdateEnd => {}
            other => {
                debug!(
                    event_type = other.event_type(),
                    "Event is handled by the tournament manager"
                );
            }
        }

        Ok(())
    }

    /// Rebuild state from an event replayed out of the room's join backlog
    ///
    /// Only the roster, format and started flag are restored. Nothing is
    /// recorded and nothing is sent, since the bot was not present when the
    /// event happened.
    #[instrument(
        skip(self, event),
        fields(room_id = %self.tournament.room, event_type = event.event_type())
    )]
    pub fn replay(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::PlayerJoined { player } => {
                self.tournament.add_player(&player);
            }
            RoomEvent::PlayerLeft { player } => {
                self.tournament.remove_player(&player);
            }
            RoomEvent::TournamentStarted => self.tournament.started = true,
            RoomEvent::TournamentUpdated { payload } => {
                if let Some(format) = payload.format {
                    self.tournament.format = format;
                }
                if let Some(is_started) = payload.is_started {
                    self.tournament.started = is_started;
                }
            }
            other => {
                debug!(event_type = other.event_type(), "Not replayed from backlog");
            }
        }
    }

    /// Add a player. Once the roster has been recorded, a late entrant is
    /// recorded on their own so every player in a counted tournament has a
    /// record.
    pub async fn join(&mut self, player: &str) -> Result<(), RankingError> {
        if !self.tournament.add_player(player) {
            debug!(player = %player, "Player already joined");
            return Ok(());
        }
        debug!(player = %player, player_count = self.tournament.players.len(), "Player joined");

        if self.tournament.participation_logged {
            let recorded = self
                .context
                .rankings
                .record_participation(
                    &self.tournament.room,
                    &self.tournament.format_id(),
                    &[player.to_string()],
                )
                .await;
            if let Err(e) = recorded {
                self.tournament.remove_player(player);
                return Err(e);
            }
            info!(player = %player, "Late entrant recorded");
        }
        Ok(())
    }

    pub fn leave(&mut self, player: &str) {
        if self.tournament.remove_player(player) {
            debug!(player = %player, player_count = self.tournament.players.len(), "Player left");
        } else {
            warn!(player = %player, "Leave for a player who never joined");
        }
    }

    /// Mark the tournament started and count the roster once
    pub async fn start(&mut self) -> Result<(), RankingError> {
        self.tournament.started = true;

        if self.tournament.participation_logged {
            debug!("Participation already recorded, ignoring repeated start");
            return Ok(());
        }

        self.context
            .rankings
            .record_participation(
                &self.tournament.room,
                &self.tournament.format_id(),
                &self.tournament.players,
            )
            .await?;
        self.tournament.participation_logged = true;

        info!(
            format = %self.tournament.format,
            player_count = self.tournament.players.len(),
            "Tournament started"
        );
        Ok(())
    }

    pub async fn update(&mut self, payload: &UpdatePayload) {
        if let Some(format) = &payload.format {
            debug!(format = %format, "Format updated");
            self.tournament.format = format.clone();
        }

        if let Some(opponent) = payload.first_challenge() {
            if self.submit_team().await {
                info!(opponent = %opponent, "Challenging opponent");
                self.context
                    .transport
                    .tournament_command(&self.tournament.room, TourCommand::Challenge, Some(opponent))
                    .await;
            }
        } else if payload.is_challenged() {
            if self.submit_team().await {
                info!("Accepting challenge");
                self.context
                    .transport
                    .tournament_command(&self.tournament.room, TourCommand::AcceptChallenge, None)
                    .await;
            }
        }

        if let Some(is_started) = payload.is_started {
            self.tournament.started = is_started;
        }

        if let Some(finals_room) = payload.finals_room() {
            if self.tournament.finals_room.as_deref() != Some(finals_room) {
                info!(finals_room = %finals_room, "Finals in progress, joining");
                self.tournament.finals_room = Some(finals_room.to_string());
                self.context.transport.join_room(finals_room).await;
            }
        }
    }

    /// Resolve the final once its battle is over
    pub async fn battle_end(&mut self, player1: String, player2: String, result: BattleResult) {
        let Some(finals_room) = self.tournament.finals_room.clone() else {
            debug!("Battle ended outside the finals, ignoring");
            return;
        };

        let (winner, runner_up) = match result {
            BattleResult::Win => (player1, player2),
            BattleResult::Loss => (player2, player1),
        };

        info!(winner = %winner, runner_up = %runner_up, "Finals decided");
        self.tournament.winner = Some(winner);
        self.tournament.runner_up = Some(runner_up);

        self.context.transport.save_replay(&finals_room).await;
        self.tournament.replay_url = Some(replay_url(&self.context.replay_base_url, &finals_room));
    }

    /// Record the final standings. Wins only count when this tournament's
    /// roster was recorded, which is not the case if the bot arrived after
    /// the start.
    pub async fn finish(&mut self, winners: &[String]) -> Result<usize, RankingError> {
        if !self.tournament.participation_logged {
            debug!("Participation was never recorded, not recording wins");
            return Ok(0);
        }

        self.context
            .rankings
            .record_wins(&self.tournament.room, &self.tournament.format_id(), winners)
            .await
    }

    /// Register a team for the current format. Returns false when there is
    /// none, in which case no challenge may be sent or accepted.
    async fn submit_team(&self) -> bool {
        match self.context.teams.team_for(&self.tournament.format).await {
            Some(team) => {
                self.context.transport.submit_team(team).await;
                true
            }
            None => {
                debug!(format = %self.tournament.format, "No team for format, skipping");
                false
            }
        }
    }
}
