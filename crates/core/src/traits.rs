//! Collaborator traits for pluggable backends.
//!
//! The core never caches contacts or appointments across calls; every
//! operation reads what it needs through these traits and writes back
//! single documents. No multi-document transaction is assumed available.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::conversation::Turn;
use crate::domain::{Appointment, AppointmentStatus, Contact};

/// Repository I/O errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Partial update for a contact. `None` fields are left untouched;
/// `current_appointment` uses a double Option so it can be cleared.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub display_name: Option<String>,
    pub current_appointment: Option<Option<Uuid>>,
    pub bot_enabled: Option<bool>,
}

impl ContactPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn set_appointment(id: Uuid) -> Self {
        Self {
            current_appointment: Some(Some(id)),
            ..Default::default()
        }
    }

    pub fn clear_appointment() -> Self {
        Self {
            current_appointment: Some(None),
            ..Default::default()
        }
    }
}

/// Partial update for an appointment.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<Option<String>>,
}

/// Durable store of contacts and appointments.
///
/// All operations are single-document; the booking race between concurrent
/// runs is narrowed by the scheduling layer, not by this trait.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_contact_by_phone(&self, phone: &str)
        -> Result<Option<Contact>, RepositoryError>;

    async fn create_contact(&self, contact: Contact) -> Result<Contact, RepositoryError>;

    async fn update_contact(&self, id: Uuid, patch: ContactPatch)
        -> Result<Contact, RepositoryError>;

    /// Appointments whose `[start, end)` overlaps the given window.
    async fn find_appointments_overlapping(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    async fn create_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, RepositoryError>;

    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, RepositoryError>;

    async fn find_appointment_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Appointment>, RepositoryError>;
}

/// Per-conversation chat history, keyed by phone number.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    /// Most recent `limit` turns in chronological order.
    async fn recent(&self, phone: &str, limit: usize) -> Result<Vec<Turn>, RepositoryError>;

    async fn append(&self, phone: &str, turn: Turn) -> Result<(), RepositoryError>;
}

/// Fire-and-forget event publication towards the business dashboard.
///
/// Publish failures must never fail the operation that raised the event;
/// callers log and move on.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(
        &self,
        owner_id: Uuid,
        event_type: &str,
        payload: Value,
    ) -> Result<(), RepositoryError>;
}
