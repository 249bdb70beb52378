use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::shared::to_id;

#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Failed to read team file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid team file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of packed teams the bot registers before battling
#[async_trait]
pub trait TeamProvider: Send + Sync {
    /// A team for the format, or `None` if the bot cannot play it
    async fn team_for(&self, format: &str) -> Option<String>;

    async fn supports(&self, format: &str) -> bool {
        self.team_for(format).await.is_some()
    }
}

/// Fixed set of teams keyed by format id, picked at random per request
#[derive(Debug, Clone, Default)]
pub struct StaticTeamProvider {
    teams: HashMap<String, Vec<String>>,
}

impl StaticTeamProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, format: &str, team: impl Into<String>) -> Self {
        self.teams.entry(to_id(format)).or_default().push(team.into());
        self
    }

    /// Parse `{"format": ["team", ...], ...}`
    pub fn from_json_str(json: &str) -> Result<Self, TeamError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;

        let mut teams: HashMap<String, Vec<String>> = HashMap::new();
        for (format, list) in raw {
            teams.entry(to_id(&format)).or_default().extend(list);
        }
        Ok(Self { teams })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TeamError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let provider = Self::from_json_str(&contents)?;

        info!(
            path = %path.display(),
            formats = ?provider.formats(),
            "Loaded teams"
        );
        Ok(provider)
    }

    /// Format ids with at least one team, sorted
    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self
            .teams
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(format, _)| format.clone())
            .collect();
        formats.sort();
        formats
    }
}

#[async_trait]
impl TeamProvider for StaticTeamProvider {
    async fn team_for(&self, format: &str) -> Option<String> {
        let format_id = to_id(format);
        let team = self
            .teams
            .get(&format_id)
            .and_then(|list| list.choose(&mut rand::rng()))
            .cloned();

        if team.is_none() {
            debug!(format = %format_id, "No team for format");
        }
        team
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn looks_up_by_normalized_format() {
        let provider = StaticTeamProvider::new().with_team("gen7nu", "TEAM");

        assert_eq!(provider.team_for("[Gen 7] NU").await.as_deref(), Some("TEAM"));
        assert!(provider.supports("GEN7NU").await);
        assert!(!provider.supports("gen8ou").await);
        assert_eq!(provider.team_for("gen8ou").await, None);
    }

    #[tokio::test]
    async fn picks_one_of_the_configured_teams() {
        let provider = StaticTeamProvider::new()
            .with_team("gen7nu", "A")
            .with_team("gen7nu", "B");

        for _ in 0..10 {
            let team = provider.team_for("gen7nu").await.unwrap();
            assert!(team == "A" || team == "B");
        }
    }

    #[tokio::test]
    async fn empty_team_list_is_unsupported() {
        let provider =
            StaticTeamProvider::from_json_str(r#"{"gen7nu": [], "Gen 8 OU": ["X"]}"#).unwrap();

        assert!(!provider.supports("gen7nu").await);
        assert_eq!(provider.formats(), vec!["gen8ou"]);
    }

    #[test]
    fn loads_teams_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"gen7nu": ["TEAM"]}}"#).unwrap();

        let provider = StaticTeamProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.formats(), vec!["gen7nu"]);
    }

    #[test]
    fn rejects_malformed_team_file() {
        assert!(matches!(
            StaticTeamProvider::from_json_str("[1, 2]"),
            Err(TeamError::Parse(_))
        ));
    }
}
