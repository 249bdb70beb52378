use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::{Tournament, TournamentSummary, BATTLE_ROOM_PREFIX};
use super::state_machine::{TournamentContext, TournamentStateMachine};
use crate::event::{RoomEvent, RoomMessage, TournamentResults};
use crate::rankings::RankingError;
use crate::shared::to_id;
use crate::transport::TourCommand;

type SharedMachine = Arc<Mutex<TournamentStateMachine>>;

/// Owns the active tournament of every room
///
/// Creation and teardown happen here; everything in between is delegated to
/// the room's `TournamentStateMachine`.
#[derive(Clone)]
pub struct TournamentManager {
    tournaments: Arc<RwLock<HashMap<String, SharedMachine>>>,
    history: Arc<RwLock<HashMap<String, Vec<TournamentSummary>>>>,
    context: TournamentContext,
    bot_id: String,
    join_tours: bool,
}

impl TournamentManager {
    pub fn new(context: TournamentContext, bot_name: &str) -> Self {
        Self {
            tournaments: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(HashMap::new())),
            context,
            bot_id: to_id(bot_name),
            join_tours: false,
        }
    }

    /// Sign up for newly created tournaments in supported formats
    pub fn with_join_tours(mut self, join_tours: bool) -> Self {
        self.join_tours = join_tours;
        self
    }

    /// Route a delivered event to the live or backlog path
    pub async fn handle_message(
        &self,
        room_id: &str,
        message: RoomMessage,
    ) -> Result<(), RankingError> {
        if message.is_backlog() {
            self.replay_event(room_id, message.event).await;
            Ok(())
        } else {
            self.handle_event(room_id, message.event).await
        }
    }

    #[instrument(skip(self, event), fields(event_type = event.event_type()))]
    pub async fn handle_event(&self, room_id: &str, event: RoomEvent) -> Result<(), RankingError> {
        match event {
            RoomEvent::TournamentCreated { format } => {
                self.create(room_id, &format, self.join_tours).await;
                Ok(())
            }
            RoomEvent::TournamentEnded { results } => self.end(room_id, results).await,
            RoomEvent::TournamentForceEnded => {
                if self.tournaments.write().await.remove(room_id).is_some() {
                    info!("Tournament force ended, nothing recorded");
                } else {
                    debug!("Force end without an active tournament");
                }
                Ok(())
            }
            RoomEvent::ReplaySaved { battle_id } => {
                let battle_room = format!("{}{}", BATTLE_ROOM_PREFIX, battle_id);
                debug!(battle_room = %battle_room, "Replay saved, leaving battle");
                self.context.transport.leave_room(&battle_room).await;
                Ok(())
            }
            RoomEvent::UpdateEnd => Ok(()),
            event => {
                let Some(machine) = self.machine(room_id).await else {
                    debug!("No active tournament in room, ignoring");
                    return Ok(());
                };
                let mut machine = machine.lock().await;
                machine.handle(event).await
            }
        }
    }

    /// Rebuild a room's tournament from its join backlog. Backlog events
    /// never sign up, record rankings or announce anything.
    #[instrument(skip(self, event), fields(event_type = event.event_type()))]
    pub async fn replay_event(&self, room_id: &str, event: RoomEvent) {
        match event {
            RoomEvent::TournamentCreated { format } => self.create(room_id, &format, false).await,
            RoomEvent::TournamentEnded { .. } | RoomEvent::TournamentForceEnded => {
                if self.tournaments.write().await.remove(room_id).is_some() {
                    debug!("Backlog tournament already over, discarded");
                }
            }
            event => {
                if let Some(machine) = self.machine(room_id).await {
                    machine.lock().await.replay(event);
                }
            }
        }
    }

    /// Notice about past-generation sample teams for the room's tournament,
    /// or `None` when no tournament is running
    pub async fn old_gen_notice(&self, room_id: &str) -> Option<String> {
        let machine = self.machine(room_id).await?;
        let machine = machine.lock().await;
        Some(machine.tournament().old_gen_notice())
    }

    /// Snapshot of the active tournament in a room
    pub async fn active(&self, room_id: &str) -> Option<Tournament> {
        let machine = self.machine(room_id).await?;
        let machine = machine.lock().await;
        Some(machine.tournament().clone())
    }

    /// Past tournaments of a room, oldest first
    pub async fn history(&self, room_id: &str) -> Vec<TournamentSummary> {
        self.history
            .read()
            .await
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn machine(&self, room_id: &str) -> Option<SharedMachine> {
        self.tournaments.read().await.get(room_id).cloned()
    }

    async fn create(&self, room_id: &str, format: &str, sign_up: bool) {
        let machine = TournamentStateMachine::new(room_id, format, self.context.clone());
        let replaced = self
            .tournaments
            .write()
            .await
            .insert(room_id.to_string(), Arc::new(Mutex::new(machine)));

        if replaced.is_some() {
            warn!("Tournament created while another was active, replacing it");
        }
        info!(format = %format, "Tournament created");

        if sign_up && self.context.teams.supports(format).await {
            self.context
                .transport
                .tournament_command(room_id, TourCommand::Join, None)
                .await;
        }
    }

    async fn end(&self, room_id: &str, results: TournamentResults) -> Result<(), RankingError> {
        let Some(machine) = self.tournaments.write().await.remove(room_id) else {
            debug!("Tournament ended without an active tournament");
            return Ok(());
        };
        let mut machine = machine.lock().await;

        let winners = results.winners();
        let recorded = machine.finish(winners).await;

        let mut tournament = machine.tournament().clone();
        if tournament.winner.is_none() {
            tournament.winner = winners.first().cloned();
        }

        if !winners.is_empty() {
            let message = self.announcement(&tournament.format, winners);
            self.context.transport.say(room_id, &message).await;
        }

        self.history
            .write()
            .await
            .entry(room_id.to_string())
            .or_default()
            .push(tournament.summary(Utc::now()));

        let recorded = recorded?;
        info!(recorded, winner_count = winners.len(), "Tournament ended");
        Ok(())
    }

    fn announcement(&self, format: &str, winners: &[String]) -> String {
        let (own, others): (Vec<&String>, Vec<&String>) = winners
            .iter()
            .partition(|winner| to_id(winner) == self.bot_id);

        let others = others
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        if own.is_empty() {
            return format!("Congratulations to {} for winning :)", others);
        }

        let mut message = format!("I won the {} tournament :o", format);
        if !others.is_empty() {
            message.push_str(&format!(
                "\nCongratulations to {} for also winning :)",
                others
            ));
        }
        message
    }
}
