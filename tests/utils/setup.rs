#![allow(dead_code)] // Test utilities may not all be used in every test

use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

use tourbot::{
    rankings::RankingRepository, EventBus, InMemoryRankingRepository, JsonFileRankingRepository,
    RankingService, RoomSubscription, TournamentContext, TournamentManager,
    TournamentRoomSubscriber,
};

use super::mocks::{MockTeamProvider, MockTransport};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub event_bus: EventBus,
    pub transport: Arc<MockTransport>,
    pub teams: MockTeamProvider,
    pub rankings: Arc<RankingService>,
    pub manager: Arc<TournamentManager>,
    pub rooms: Vec<String>,
    pub _subscription_handles: Vec<JoinHandle<()>>,
}

pub struct TestSetupBuilder {
    rooms: Vec<String>,
    bot_name: String,
    join_tours: bool,
    teams: MockTeamProvider,
    rankings_path: Option<PathBuf>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            rooms: vec!["nu".to_string()],
            bot_name: "tourbot".to_string(),
            join_tours: false,
            teams: MockTeamProvider::new().with_team("gen7nu", "NU TEAM"),
            rankings_path: None,
        }
    }

    pub fn with_rooms(mut self, rooms: Vec<&str>) -> Self {
        self.rooms = rooms.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_bot_name(mut self, bot_name: &str) -> Self {
        self.bot_name = bot_name.to_string();
        self
    }

    pub fn with_join_tours(mut self) -> Self {
        self.join_tours = true;
        self
    }

    pub fn with_teams(mut self, teams: MockTeamProvider) -> Self {
        self.teams = teams;
        self
    }

    /// Persist rankings to a JSON file instead of memory
    pub fn with_rankings_file(mut self, path: PathBuf) -> Self {
        self.rankings_path = Some(path);
        self
    }

    pub async fn build(self) -> TestSetup {
        let event_bus = EventBus::new();
        let transport = Arc::new(MockTransport::new());

        let repository: Arc<dyn RankingRepository> = match &self.rankings_path {
            Some(path) => Arc::new(JsonFileRankingRepository::new(path)),
            None => Arc::new(InMemoryRankingRepository::new()),
        };
        let rankings = Arc::new(RankingService::new(repository));

        let context = TournamentContext::new(
            rankings.clone(),
            Arc::new(self.teams.clone()),
            transport.clone(),
        );
        let manager = Arc::new(
            TournamentManager::new(context, &self.bot_name).with_join_tours(self.join_tours),
        );

        let subscriber = Arc::new(TournamentRoomSubscriber::new(manager.clone()));
        let mut subscription_handles = Vec::new();
        for room in &self.rooms {
            let subscription =
                RoomSubscription::new(room.clone(), subscriber.clone(), event_bus.clone());
            subscription_handles.push(subscription.start().await);
        }

        TestSetup {
            event_bus,
            transport,
            teams: self.teams,
            rankings,
            manager,
            rooms: self.rooms,
            _subscription_handles: subscription_handles,
        }
    }
}
