use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{models::RankingDocument, RankingError};

/// Storage for the whole ranking document
///
/// Implementations load and save the document as a unit. They do not
/// serialize read-modify-write cycles themselves; `RankingService` does.
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// Load the full document. Absent storage loads as an empty document.
    async fn load(&self) -> Result<RankingDocument, RankingError>;

    /// Replace the full document.
    async fn save(&self, document: &RankingDocument) -> Result<(), RankingError>;
}

/// In-memory implementation of RankingRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryRankingRepository {
    document: Arc<RwLock<RankingDocument>>,
}

impl InMemoryRankingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankingRepository for InMemoryRankingRepository {
    async fn load(&self) -> Result<RankingDocument, RankingError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &RankingDocument) -> Result<(), RankingError> {
        *self.document.write().await = document.clone();
        Ok(())
    }
}

/// Ranking document kept as a pretty-printed JSON file
///
/// Saves go through a sibling temporary file that is renamed over the
/// target, so readers only ever see a complete document.
#[derive(Debug, Clone)]
pub struct JsonFileRankingRepository {
    path: PathBuf,
}

impl JsonFileRankingRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RankingRepository for JsonFileRankingRepository {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<RankingDocument, RankingError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Ranking file not found, starting empty");
                return Ok(RankingDocument::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            debug!(path = %self.path.display(), "Ranking file is empty");
            return Ok(RankingDocument::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    #[instrument(skip(self, document))]
    async fn save(&self, document: &RankingDocument) -> Result<(), RankingError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let payload = serde_json::to_string_pretty(document)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, payload).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!(path = %self.path.display(), "Ranking file written");
        Ok(())
    }
}
