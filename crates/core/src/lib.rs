//! Core traits and types for the booking agent
//!
//! This crate provides foundational types used across all other crates:
//! - Business domain types (contacts, appointments, schedules, services)
//! - Conversation types (turns, roles, token usage)
//! - LLM boundary types (chat responses, tool declarations, tool calls)
//! - Collaborator traits (repository, chat history, notifications)
//! - Error types

pub mod conversation;
pub mod domain;
pub mod error;
pub mod llm_types;
pub mod traits;

pub use conversation::{TokenUsage, Turn, TurnRole};
pub use domain::{
    Appointment, AppointmentSettings, AppointmentStatus, BusinessProfile, BusinessSchedule,
    Contact, DaySchedule, Service, UNKNOWN_CONTACT_NAME,
};
pub use error::{Error, Result};
pub use llm_types::{ChatResponse, InputSchema, PropertySchema, ToolCallRequest, ToolDefinition};
pub use traits::{
    AppointmentPatch, AppointmentRepository, ChatHistoryStore, ContactPatch,
    NotificationPublisher, RepositoryError,
};
