//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::ConfigError;

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Orchestrator configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Language-model service configuration
    #[serde(default)]
    pub llm: LlmSettings,
}

/// Orchestrator loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum Thinking/ExecutingTool round trips per inbound message.
    /// Guards against a runaway model that keeps requesting tools.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Prior turns included in the prompt, most recent first.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// Reply used when a run ends without any model-produced text.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,

    /// Reply used when the language-model service itself fails.
    #[serde(default = "default_failure_reply")]
    pub failure_reply: String,
}

fn default_max_tool_rounds() -> u32 {
    5
}

fn default_history_turns() -> usize {
    10
}

fn default_fallback_reply() -> String {
    "I'm sorry, could you say that again?".to_string()
}

fn default_failure_reply() -> String {
    "Sorry, I'm having trouble processing your request right now.".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            history_turns: default_history_turns(),
            fallback_reply: default_fallback_reply(),
            failure_reply: default_failure_reply(),
        }
    }
}

/// Language-model service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// OpenAI-compatible endpoint base, e.g. "https://api.openai.com/v1".
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; optional for local endpoints.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Maximum tokens to generate per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_tokens() -> usize {
    512
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from an optional file with `BOOKING_AGENT_*` env overrides.
    ///
    /// Example override: `BOOKING_AGENT__AGENT__MAX_TOOL_ROUNDS=3`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("BOOKING_AGENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_tool_rounds must be at least 1".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.environment.is_strict() && self.llm.api_key.is_none() {
            if self.llm.endpoint.starts_with("http://localhost")
                || self.llm.endpoint.starts_with("http://127.0.0.1")
            {
                tracing::warn!("No LLM API key configured for local endpoint");
            } else {
                return Err(ConfigError::Invalid(
                    "llm.api_key is required for remote endpoints outside development"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}
