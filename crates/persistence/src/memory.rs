//! In-memory implementations of the repository traits.
//!
//! Locks are held only for the duration of one map operation, mirroring the
//! single-document guarantee of the real stores: no cross-document
//! transaction, each read/write atomic on its own.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use booking_agent_core::conversation::Turn;
use booking_agent_core::domain::{Appointment, Contact};
use booking_agent_core::traits::{
    AppointmentPatch, AppointmentRepository, ChatHistoryStore, ContactPatch,
    NotificationPublisher, RepositoryError,
};

/// In-memory contact and appointment store.
#[derive(Default)]
pub struct MemoryRepository {
    contacts: RwLock<HashMap<Uuid, Contact>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored appointments, cancelled included.
    pub fn appointment_count(&self) -> usize {
        self.appointments.read().len()
    }
}

#[async_trait]
impl AppointmentRepository for MemoryRepository {
    async fn find_contact_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<Contact>, RepositoryError> {
        Ok(self
            .contacts
            .read()
            .values()
            .find(|c| c.phone_number == phone)
            .cloned())
    }

    async fn create_contact(&self, contact: Contact) -> Result<Contact, RepositoryError> {
        let mut contacts = self.contacts.write();
        if contacts
            .values()
            .any(|c| c.phone_number == contact.phone_number)
        {
            return Err(RepositoryError::Conflict(format!(
                "contact already exists for {}",
                contact.phone_number
            )));
        }
        contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update_contact(
        &self,
        id: Uuid,
        patch: ContactPatch,
    ) -> Result<Contact, RepositoryError> {
        let mut contacts = self.contacts.write();
        let contact = contacts
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("contact {id}")))?;

        if let Some(name) = patch.display_name {
            contact.display_name = name;
        }
        if let Some(appointment) = patch.current_appointment {
            contact.current_appointment = appointment;
        }
        if let Some(enabled) = patch.bot_enabled {
            contact.bot_enabled = enabled;
        }
        Ok(contact.clone())
    }

    async fn find_appointments_overlapping(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .values()
            .filter(|a| a.start < window_end && a.end > window_start)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start);
        Ok(found)
    }

    async fn create_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, RepositoryError> {
        self.appointments
            .write()
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, RepositoryError> {
        let mut appointments = self.appointments.write();
        let appointment = appointments
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("appointment {id}")))?;

        if let Some(start) = patch.start {
            appointment.start = start;
        }
        if let Some(end) = patch.end {
            appointment.end = end;
        }
        if let Some(status) = patch.status {
            appointment.status = status;
        }
        if let Some(notes) = patch.notes {
            appointment.notes = notes;
        }
        Ok(appointment.clone())
    }

    async fn find_appointment_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Appointment>, RepositoryError> {
        Ok(self.appointments.read().get(&id).cloned())
    }
}

/// In-memory per-phone chat history.
#[derive(Default)]
pub struct MemoryChatHistory {
    turns: RwLock<HashMap<String, Vec<Turn>>>,
}

impl MemoryChatHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatHistoryStore for MemoryChatHistory {
    async fn recent(&self, phone: &str, limit: usize) -> Result<Vec<Turn>, RepositoryError> {
        let turns = self.turns.read();
        let Some(history) = turns.get(phone) else {
            return Ok(Vec::new());
        };
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }

    async fn append(&self, phone: &str, turn: Turn) -> Result<(), RepositoryError> {
        self.turns
            .write()
            .entry(phone.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }
}

/// A notification event captured by [`RecordingPublisher`].
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub owner_id: Uuid,
    pub event_type: String,
    pub payload: Value,
}

/// Publisher that records events for assertion in tests and local runs.
#[derive(Default)]
pub struct RecordingPublisher {
    events: RwLock<Vec<PublishedEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn publish(
        &self,
        owner_id: Uuid,
        event_type: &str,
        payload: Value,
    ) -> Result<(), RepositoryError> {
        tracing::debug!(owner = %owner_id, event = event_type, "notification published");
        self.events.write().push(PublishedEvent {
            owner_id,
            event_type: event_type.to_string(),
            payload,
        });
        Ok(())
    }
}
