use chrono::Duration;
use serde::Deserialize;
use std::env;

pub const DEFAULT_ROTATION_INTERVAL_MINUTES: i64 = 15;
pub const DEFAULT_BOOKKEEPER_CHUNK_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Engine tunables. Passed explicitly into the orchestrator and the
/// bookkeeper so tests never depend on process-wide state.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Width of the fairness rotation window. Non-positive values fall
    /// back to the default.
    pub rotation_interval_minutes: i64,
    /// How many profile ids the bookkeeper writes per chunk.
    pub bookkeeper_chunk_size: usize,
    /// Page size used when the caller does not specify one.
    pub default_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rotation_interval_minutes: DEFAULT_ROTATION_INTERVAL_MINUTES,
            bookkeeper_chunk_size: DEFAULT_BOOKKEEPER_CHUNK_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    /// Load config from environment variables, falling back to defaults
    /// for anything absent or unparsable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            rotation_interval_minutes: env::var("ROTATION_INTERVAL_MINUTES")
                .unwrap_or_else(|_| DEFAULT_ROTATION_INTERVAL_MINUTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_ROTATION_INTERVAL_MINUTES),
            bookkeeper_chunk_size: env::var("BOOKKEEPER_CHUNK_SIZE")
                .unwrap_or_else(|_| DEFAULT_BOOKKEEPER_CHUNK_SIZE.to_string())
                .parse()
                .unwrap_or(DEFAULT_BOOKKEEPER_CHUNK_SIZE),
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
                .parse()
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Rotation window as a duration, with the non-positive fallback
    /// applied.
    pub fn rotation_interval(&self) -> Duration {
        let minutes = if self.rotation_interval_minutes > 0 {
            self.rotation_interval_minutes
        } else {
            DEFAULT_ROTATION_INTERVAL_MINUTES
        };
        Duration::minutes(minutes)
    }

    pub fn rotation_interval_millis(&self) -> i64 {
        self.rotation_interval().num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rotation_interval() {
        let config = EngineConfig::default();
        assert_eq!(config.rotation_interval_millis(), 15 * 60 * 1000);
    }

    #[test]
    fn test_non_positive_interval_falls_back() {
        let config = EngineConfig {
            rotation_interval_minutes: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.rotation_interval_millis(), 15 * 60 * 1000);

        let config = EngineConfig {
            rotation_interval_minutes: -5,
            ..EngineConfig::default()
        };
        assert_eq!(config.rotation_interval_millis(), 15 * 60 * 1000);
    }
}
