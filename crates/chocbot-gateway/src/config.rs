//! Bot configuration
//!
//! Everything except the auth token, which is deliberately environment-only
//! (see [`crate::TOKEN_ENV_VAR`]).

use std::path::{Path, PathBuf};

use chocbot_core::QuizParams;
use serde::{Deserialize, Serialize};

/// Default ledger directory (volume-mounted in deployment)
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Default ledger file name
pub const DEFAULT_DATA_FILE: &str = "data.json";

/// Default platform gateway endpoint
pub const DEFAULT_GATEWAY_URL: &str = "ws://127.0.0.1:9443/gateway";

/// Main bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Directory holding the ledger document
    pub data_dir: PathBuf,

    /// Ledger file name inside `data_dir`
    pub data_file: String,

    /// Platform gateway websocket URL
    pub gateway_url: String,

    /// Quiz generation parameters
    pub quiz: QuizParams,

    /// Enable tracing output
    pub tracing: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            data_file: DEFAULT_DATA_FILE.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            quiz: QuizParams::default(),
            tracing: true,
        }
    }
}

impl BotConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ledger directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the ledger file name
    pub fn with_data_file(mut self, file: impl Into<String>) -> Self {
        self.data_file = file.into();
        self
    }

    /// Set the platform gateway URL
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Set the quiz parameters
    pub fn with_quiz(mut self, quiz: QuizParams) -> Self {
        self.quiz = quiz;
        self
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
