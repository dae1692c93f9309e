//! Layered configuration for the booking agent
//!
//! Settings resolve in three layers: built-in defaults, an optional config
//! file, then `BOOKING_AGENT_*` environment overrides.

pub mod settings;

pub use settings::{AgentConfig, LlmSettings, RuntimeEnvironment, Settings};

use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}
