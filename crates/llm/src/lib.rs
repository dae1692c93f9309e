//! Language-model service boundary
//!
//! One trait, [`ChatBackend`], behind which live an OpenAI-compatible HTTP
//! backend with native tool calling and a scripted stub for deterministic
//! orchestrator tests.

pub mod backend;
pub mod stub;

pub use backend::{ChatBackend, OpenAiBackend, OpenAiConfig};
pub use stub::ScriptedBackend;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for booking_agent_core::Error {
    fn from(err: LlmError) -> Self {
        booking_agent_core::Error::Llm(err.to_string())
    }
}
