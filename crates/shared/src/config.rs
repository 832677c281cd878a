//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Settlement retry configuration.
    #[serde(default)]
    pub settlement: SettlementConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Settlement retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Maximum automatic retries before a settlement is terminally failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff steps in minutes, indexed by retry attempt.
    #[serde(default = "default_backoff_minutes")]
    pub backoff_minutes: Vec<i64>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_minutes() -> Vec<i64> {
    vec![15, 60, 240]
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_minutes: default_backoff_minutes(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERGUARD").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
