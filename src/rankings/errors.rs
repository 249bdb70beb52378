use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Ranking storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ranking document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
