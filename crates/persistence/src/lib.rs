//! In-memory reference stores for the booking agent
//!
//! Production deployments plug their own durable stores in behind the core
//! traits; these implementations back tests and local development, and pin
//! down the single-document semantics every real store must honor.

pub mod memory;

pub use memory::{MemoryChatHistory, MemoryRepository, PublishedEvent, RecordingPublisher};
