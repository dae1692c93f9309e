//! Crate-spanning error type.
//!
//! Leaf crates define their own `thiserror` enums; this type exists for
//! callers that need to carry any of them behind one boundary.

use thiserror::Error;

/// Top-level error for the booking agent.
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<crate::traits::RepositoryError> for Error {
    fn from(err: crate::traits::RepositoryError) -> Self {
        Error::Repository(err.to_string())
    }
}
