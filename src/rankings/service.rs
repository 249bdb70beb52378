use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use super::{
    leaderboard::rank_players,
    models::{RankedEntry, RankingDocument, RankingRecord},
    query::{resolve, LookupOutcome},
    repository::RankingRepository,
    RankingError,
};
use crate::shared::to_id;

/// Durable aggregate statistics shared by every room
///
/// All mutations go through `transact`, which holds a single lock across the
/// whole load, mutate and save cycle so concurrent tournaments cannot lose
/// each other's updates. Queries read a snapshot without taking the lock.
pub struct RankingService {
    repository: Arc<dyn RankingRepository>,
    write_lock: AsyncMutex<()>,
}

impl RankingService {
    pub fn new(repository: Arc<dyn RankingRepository>) -> Self {
        Self {
            repository,
            write_lock: AsyncMutex::new(()),
        }
    }

    /// Run `mutate` against the full document and persist the result.
    ///
    /// Nothing is written when the mutation leaves the document unchanged,
    /// and nothing is applied if loading or saving fails.
    pub async fn transact<T, F>(&self, mutate: F) -> Result<T, RankingError>
    where
        F: FnOnce(&mut RankingDocument) -> T + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut document = self.repository.load().await?;
        let before = document.clone();
        let output = mutate(&mut document);

        if document != before {
            self.repository.save(&document).await?;
        }

        Ok(output)
    }

    /// Count one tournament entry for every player
    #[instrument(skip(self, players), fields(player_count = players.len()))]
    pub async fn record_participation(
        &self,
        room: &str,
        format: &str,
        players: &[String],
    ) -> Result<(), RankingError> {
        let players = normalized(players);
        if players.is_empty() {
            debug!("No players to record");
            return Ok(());
        }

        self.transact(|document| document.add_participation(room, format, &players))
            .await?;

        info!(player_count = players.len(), "Participation recorded");
        Ok(())
    }

    /// Count one win for every listed player that has a participation record.
    ///
    /// Returns how many wins were recorded.
    #[instrument(skip(self, winners))]
    pub async fn record_wins(
        &self,
        room: &str,
        format: &str,
        winners: &[String],
    ) -> Result<usize, RankingError> {
        let winners = normalized(winners);

        let skipped = self
            .transact(|document| document.add_wins(room, format, &winners))
            .await?;

        if !skipped.is_empty() {
            warn!(?skipped, "Skipped wins for players without a participation record");
        }

        let recorded = winners.len() - skipped.len();
        info!(recorded, "Wins recorded");
        Ok(recorded)
    }

    /// Read the current document without blocking writers
    pub async fn snapshot(&self) -> Result<RankingDocument, RankingError> {
        self.repository.load().await
    }

    /// Top ranked players for a room/format pair
    pub async fn leaderboard(
        &self,
        room: &str,
        format: &str,
    ) -> Result<Vec<RankedEntry>, RankingError> {
        let document = self.snapshot().await?;
        Ok(document
            .format(room, format)
            .map(rank_players)
            .unwrap_or_default())
    }

    pub async fn player_record(
        &self,
        room: &str,
        format: &str,
        player: &str,
    ) -> Result<Option<RankingRecord>, RankingError> {
        let document = self.snapshot().await?;
        Ok(document.record(room, format, &to_id(player)))
    }

    /// Formats with data for a room, or `None` for an unknown room
    pub async fn room_formats(&self, room: &str) -> Result<Option<Vec<String>>, RankingError> {
        let document = self.snapshot().await?;
        Ok(document
            .room(room)
            .map(|formats| formats.keys().cloned().collect()))
    }

    /// Resolve a `room, format, player` lookup against the current snapshot
    #[instrument(skip(self))]
    pub async fn lookup(
        &self,
        query: &str,
        current_room: &str,
    ) -> Result<LookupOutcome, RankingError> {
        let document = self.snapshot().await?;
        Ok(resolve(&document, query, current_room))
    }
}

/// Normalize ids, dropping blanks and duplicates while keeping order
fn normalized(players: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(players.len());
    for id in players.iter().map(|player| to_id(player)) {
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
