use crate::core::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH: &str = "session_config.json";
pub const SERVICE_URL_ENV: &str = "MOVE_SERVICE_URL";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Startup configuration. Every field is optional in the JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub service_url: String,
    pub default_elo: u32,
    pub human_delay_ms: u64,
    pub training_move_delay_ms: u64,
    pub restart_delay_ms: u64,
    pub request_timeout_ms: u64,
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// File if present, then the environment override for the service URL.
    pub fn load_or_default() -> Self {
        let config = Self::load(CONFIG_PATH).unwrap_or_default();
        config.with_env_override(std::env::var(SERVICE_URL_ENV).ok())
    }

    pub fn with_env_override(mut self, service_url: Option<String>) -> Self {
        if let Some(url) = service_url.filter(|u| !u.trim().is_empty()) {
            self.service_url = url.trim().to_string();
        }
        self
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::new(self.default_elo)
    }

    pub fn timings(&self) -> Timings {
        Timings {
            after_human_move: Duration::from_millis(self.human_delay_ms),
            between_training_moves: Duration::from_millis(self.training_move_delay_ms),
            before_restart: Duration::from_millis(self.restart_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            default_elo: Difficulty::default().elo(),
            human_delay_ms: 250,
            training_move_delay_ms: 500,
            restart_delay_ms: 1000,
            request_timeout_ms: 30_000,
        }
    }
}

/// Pacing delays used by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub after_human_move: Duration,
    pub between_training_moves: Duration,
    pub before_restart: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        SessionConfig::default().timings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.service_url, "http://localhost:5000");
        assert_eq!(config.difficulty(), Difficulty(1500));
        let timings = config.timings();
        assert_eq!(timings.after_human_move, Duration::from_millis(250));
        assert_eq!(timings.between_training_moves, Duration::from_millis(500));
        assert_eq!(timings.before_restart, Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_file() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"default_elo": 2200, "restart_delay_ms": 10}"#).unwrap();
        assert_eq!(config.default_elo, 2200);
        assert_eq!(config.restart_delay_ms, 10);
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
    }

    #[test]
    fn test_env_override() {
        let config = SessionConfig::default()
            .with_env_override(Some("https://chess.example.org".to_string()));
        assert_eq!(config.service_url, "https://chess.example.org");

        let config = SessionConfig::default().with_env_override(Some("  ".to_string()));
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
    }
}
