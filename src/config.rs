use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solve::SolveOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Service configuration, loaded from a TOML file.
///
/// Every section and field has a default, so a missing file degrades to
/// `Config::default()`:
///
/// ```
/// use tierpack::config::Config;
///
/// let config = Config::load("tierpack.toml").unwrap_or_default();
/// assert_eq!(config.server.listen, "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Address the optimize endpoint binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_owned()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Maximum seconds CBC may spend on one run.
    #[serde(default)]
    pub seconds_spent_limit: Option<u64>,

    /// CBC log level; 0 keeps the backend quiet.
    #[serde(default)]
    pub log_level: u32,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Returns the solver time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.solver.seconds_spent_limit.map(Duration::from_secs)
    }

    /// Per-run solver options derived from this configuration.
    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            time_limit: self.time_limit(),
            log_level: self.solver.log_level,
        }
    }
}
