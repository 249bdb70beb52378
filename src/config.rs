use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::tournament::models::DEFAULT_REPLAY_BASE_URL;

pub const DEFAULT_BOT_NAME: &str = "tourbot";
pub const DEFAULT_RANKINGS_PATH: &str = "data/tournament-rankings.json";
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings loaded from `TOURBOT_*` environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// The bot's own user name
    pub bot_name: String,
    pub rankings_path: PathBuf,
    pub teams_path: Option<PathBuf>,
    pub join_tours: bool,
    pub http_bind: SocketAddr,
    pub replay_base_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind = get("TOURBOT_HTTP_BIND").unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        let http_bind: SocketAddr = bind.parse().map_err(|_| ConfigError::Invalid {
            key: "TOURBOT_HTTP_BIND",
            value: bind.clone(),
        })?;

        let join_tours = match get("TOURBOT_JOIN_TOURS") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                key: "TOURBOT_JOIN_TOURS",
                value,
            })?,
            None => false,
        };

        Ok(Self {
            bot_name: get("TOURBOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
            rankings_path: get("TOURBOT_RANKINGS_PATH")
                .unwrap_or_else(|| DEFAULT_RANKINGS_PATH.to_string())
                .into(),
            teams_path: get("TOURBOT_TEAMS_PATH").map(PathBuf::from),
            join_tours,
            http_bind,
            replay_base_url: get("TOURBOT_REPLAY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_REPLAY_BASE_URL.to_string()),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
