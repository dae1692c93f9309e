//! Conversation orchestration
//!
//! Couples the language-model backend to the scheduling tools: builds the
//! system prompt for each inbound message, runs the bounded tool-calling
//! loop, and persists the exchange to chat history.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{AgentReply, ConversationOrchestrator};
pub use prompt::system_prompt;
