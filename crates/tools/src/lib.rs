//! Tool catalog and dispatch
//!
//! The catalog declares the operations the model may call; dispatch turns a
//! model-supplied invocation into a validated, typed request and executes it
//! against the scheduling operations. Tool names are part of the wire
//! contract with the language-model service and are not negotiable
//! mid-conversation.

pub mod catalog;
pub mod dispatch;
pub mod request;

pub use catalog::{names, tool_catalog};
pub use dispatch::ToolDispatcher;
pub use request::ToolRequest;

use thiserror::Error;

/// Tool parsing/validation errors.
///
/// These never escape the dispatcher; they are rendered into structured
/// failure payloads so the orchestration loop keeps running no matter what
/// the model sends.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidParams { tool: String, message: String },
}

impl From<ToolError> for booking_agent_core::Error {
    fn from(err: ToolError) -> Self {
        booking_agent_core::Error::Tool(err.to_string())
    }
}
