#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tourbot::{shared::to_id, OutboundAction, TeamProvider, Transport};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone, Default)]
pub struct MockTransport {
    sent_actions: Arc<RwLock<Vec<OutboundAction>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn actions(&self) -> Vec<OutboundAction> {
        self.sent_actions.read().await.clone()
    }

    /// Sent actions rendered the way they go over the wire
    pub async fn lines(&self) -> Vec<String> {
        self.sent_actions
            .read()
            .await
            .iter()
            .map(OutboundAction::to_protocol_line)
            .collect()
    }

    pub async fn lines_for_room(&self, room_id: &str) -> Vec<String> {
        let prefix = format!("{}|", room_id);
        self.lines()
            .await
            .into_iter()
            .filter(|line| line.starts_with(&prefix))
            .collect()
    }

    pub async fn clear_actions(&self) {
        self.sent_actions.write().await.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, action: OutboundAction) {
        self.sent_actions.write().await.push(action);
    }
}

/// Team provider with one fixed team per format that counts requests
#[derive(Clone, Default)]
pub struct MockTeamProvider {
    teams: HashMap<String, String>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockTeamProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, format: &str, team: &str) -> Self {
        self.teams.insert(to_id(format), team.to_string());
        self
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl TeamProvider for MockTeamProvider {
    async fn team_for(&self, format: &str) -> Option<String> {
        self.requests.write().await.push(format.to_string());
        self.teams.get(&to_id(format)).cloned()
    }
}
