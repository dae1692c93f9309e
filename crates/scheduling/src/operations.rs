//! Booking mutations built on the availability calculator and the
//! appointment repository.
//!
//! All public operations convert their internal failures into soft,
//! human-readable outcomes at the tool boundary; the orchestration loop must
//! always receive a result it can feed back to the model.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use booking_agent_core::domain::{
    Appointment, AppointmentStatus, BusinessProfile, Contact,
};
use booking_agent_core::traits::{
    AppointmentPatch, AppointmentRepository, ContactPatch, NotificationPublisher,
    RepositoryError,
};

use crate::availability::{check_availability, AvailabilityResult};
use crate::clock::shift_to_zone;
use crate::ScheduleError;

/// Dashboard event emitted when a booking is created.
pub const EVENT_APPOINTMENT_BOOKED: &str = "appointment_booked";

/// Operation failures that have not yet been softened into user text.
#[derive(Error, Debug)]
pub enum OperationError {
    /// Raised only by `book`; cancel/reschedule treat a missing contact as a
    /// soft "nothing to act on" outcome instead.
    #[error("Contact not found for booking")]
    ContactNotFound,

    /// The slot was free at check time but taken before the insert landed.
    #[error("Slot no longer available: {0}")]
    SlotTaken(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Result of a successful booking.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub message: String,
}

/// The four scheduling operations plus contact rename, exposed to the agent
/// as tools.
pub struct SchedulingOperations {
    repo: Arc<dyn AppointmentRepository>,
    notifier: Arc<dyn NotificationPublisher>,
}

impl SchedulingOperations {
    pub fn new(
        repo: Arc<dyn AppointmentRepository>,
        notifier: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self { repo, notifier }
    }

    /// Read-only availability query for a candidate instant.
    ///
    /// Never fails: timezone and repository problems degrade to an
    /// unavailable result with a generic message, logged for the operator.
    pub async fn check_availability(
        &self,
        profile: &BusinessProfile,
        candidate: DateTime<Utc>,
    ) -> AvailabilityResult {
        self.check_availability_at(profile, candidate, Utc::now())
            .await
    }

    /// Availability with an explicit "now", used by tests to pin time.
    pub async fn check_availability_at(
        &self,
        profile: &BusinessProfile,
        candidate: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AvailabilityResult {
        tracing::debug!(candidate = %candidate, "checking availability");

        // Fetch everything within a day either side of the candidate; the
        // shift into the business timezone can move appointments across UTC
        // date boundaries, so the window is deliberately generous.
        let window_start = candidate - Duration::days(1);
        let window_end = candidate + Duration::days(2);

        let existing = match self
            .repo
            .find_appointments_overlapping(window_start, window_end)
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::error!(error = %e, "availability query failed");
                return AvailabilityResult {
                    available: false,
                    message: "Failed to check availability".to_string(),
                    slots: Vec::new(),
                };
            }
        };

        let active: Vec<Appointment> = existing
            .into_iter()
            .filter(|a| a.status != AppointmentStatus::Cancelled)
            .collect();

        match check_availability(
            candidate,
            now,
            &profile.hours,
            &profile.settings,
            &active,
        ) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "availability check error");
                AvailabilityResult {
                    available: false,
                    message: "Failed to check availability".to_string(),
                    slots: Vec::new(),
                }
            }
        }
    }

    /// Create a confirmed appointment for the contact behind `phone`.
    ///
    /// Availability is the caller's responsibility; the agent is expected to
    /// have called `check_availability` first. A last-moment overlap query
    /// still narrows the window in which two concurrent runs can claim the
    /// same slot, answering with a soft conflict instead of double-booking.
    pub async fn book(
        &self,
        profile: &BusinessProfile,
        candidate: DateTime<Utc>,
        service_name: &str,
        phone: &str,
        notes: Option<String>,
    ) -> Result<BookingConfirmation, OperationError> {
        let contact = self
            .repo
            .find_contact_by_phone(phone)
            .await?
            .ok_or(OperationError::ContactNotFound)?;

        let duration_minutes = profile.duration_for(service_name);
        let duration = Duration::minutes(i64::from(duration_minutes));
        let buffer = Duration::minutes(i64::from(profile.settings.buffer_minutes));
        let end = candidate + duration;

        // Re-validate right before the insert. Not transactional, but it
        // closes most of the gap between check and book.
        let overlapping = self
            .repo
            .find_appointments_overlapping(candidate - Duration::days(1), end + buffer)
            .await?;
        let conflict = overlapping.iter().any(|a| {
            a.status != AppointmentStatus::Cancelled
                && candidate < a.end + buffer
                && end + buffer > a.start
        });
        if conflict {
            return Err(OperationError::SlotTaken(
                "That slot was just taken. Please pick another time.".to_string(),
            ));
        }

        let appointment = self
            .repo
            .create_appointment(Appointment {
                id: Uuid::new_v4(),
                contact_id: contact.id,
                owner_id: profile.owner_id,
                start: candidate,
                end,
                service: if service_name.is_empty() {
                    "General".to_string()
                } else {
                    service_name.to_string()
                },
                status: AppointmentStatus::Confirmed,
                notes,
            })
            .await?;

        self.repo
            .update_contact(contact.id, ContactPatch::set_appointment(appointment.id))
            .await?;

        self.notify_booked(profile, &contact, &appointment).await;

        let local = shift_to_zone(candidate, &profile.settings.timezone)
            .map(|t| t.format("%Y-%m-%d %-I:%M %p").to_string())
            .unwrap_or_else(|_| candidate.to_rfc3339());

        tracing::info!(
            appointment = %appointment.id,
            contact = %contact.id,
            start = %candidate,
            "appointment booked"
        );

        Ok(BookingConfirmation {
            message: format!(
                "Appointment confirmed for {} ({} mins).",
                local, duration_minutes
            ),
            appointment,
        })
    }

    /// Cancel the contact's active appointment.
    ///
    /// Soft outcome: a missing contact or absent active appointment returns a
    /// "nothing to cancel" message, never an error, and no mutation happens.
    pub async fn cancel(
        &self,
        phone: &str,
        reason: Option<&str>,
    ) -> Result<String, OperationError> {
        let Some(contact) = self.repo.find_contact_by_phone(phone).await? else {
            return Ok("No active appointment found to cancel.".to_string());
        };
        let Some(appointment_id) = contact.current_appointment else {
            return Ok("No active appointment found to cancel.".to_string());
        };
        let Some(appointment) = self.repo.find_appointment_by_id(appointment_id).await? else {
            return Ok("Appointment not found.".to_string());
        };

        let cancellation = format!("Cancelled: {}", reason.unwrap_or("User request"));
        let notes = match appointment.notes {
            Some(existing) => format!("{} | {}", existing, cancellation),
            None => cancellation,
        };

        self.repo
            .update_appointment(
                appointment_id,
                AppointmentPatch {
                    status: Some(AppointmentStatus::Cancelled),
                    notes: Some(Some(notes)),
                    ..Default::default()
                },
            )
            .await?;

        self.repo
            .update_contact(contact.id, ContactPatch::clear_appointment())
            .await?;

        tracing::info!(appointment = %appointment_id, contact = %contact.id, "appointment cancelled");

        Ok("Appointment has been successfully cancelled.".to_string())
    }

    /// Move the contact's active appointment to a new start, preserving the
    /// original duration and keeping the appointment confirmed.
    pub async fn reschedule(
        &self,
        profile: &BusinessProfile,
        phone: &str,
        new_start: DateTime<Utc>,
    ) -> Result<String, OperationError> {
        let Some(contact) = self.repo.find_contact_by_phone(phone).await? else {
            return Ok(
                "No active appointment found to reschedule. Please book a new one.".to_string()
            );
        };
        let Some(appointment_id) = contact.current_appointment else {
            return Ok(
                "No active appointment found to reschedule. Please book a new one.".to_string()
            );
        };
        let Some(appointment) = self.repo.find_appointment_by_id(appointment_id).await? else {
            return Ok("Appointment not found.".to_string());
        };

        let duration = if appointment.end > appointment.start {
            appointment.end - appointment.start
        } else {
            Duration::minutes(i64::from(profile.settings.default_duration_minutes))
        };

        self.repo
            .update_appointment(
                appointment_id,
                AppointmentPatch {
                    start: Some(new_start),
                    end: Some(new_start + duration),
                    status: Some(AppointmentStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await?;

        let local = shift_to_zone(new_start, &profile.settings.timezone)
            .map(|t| t.format("%Y-%m-%d %-I:%M %p").to_string())
            .unwrap_or_else(|_| new_start.to_rfc3339());

        tracing::info!(appointment = %appointment_id, new_start = %new_start, "appointment rescheduled");

        Ok(format!("Appointment rescheduled to {}.", local))
    }

    /// Rename the contact behind `phone`.
    pub async fn update_contact_name(
        &self,
        phone: &str,
        name: &str,
    ) -> Result<String, OperationError> {
        let Some(contact) = self.repo.find_contact_by_phone(phone).await? else {
            return Ok("No contact found for this number.".to_string());
        };

        self.repo
            .update_contact(contact.id, ContactPatch::rename(name))
            .await?;

        Ok(format!("Updated name to {}", name))
    }

    /// Look up the contact for a phone number, creating one on first touch.
    pub async fn find_or_create_contact(
        &self,
        phone: &str,
    ) -> Result<Contact, OperationError> {
        if let Some(contact) = self.repo.find_contact_by_phone(phone).await? {
            return Ok(contact);
        }
        let contact = self.repo.create_contact(Contact::new(phone)).await?;
        tracing::info!(contact = %contact.id, phone = %phone, "created contact on first message");
        Ok(contact)
    }

    /// Active appointment for a contact, if any.
    pub async fn active_appointment(
        &self,
        contact: &Contact,
    ) -> Result<Option<Appointment>, OperationError> {
        let Some(id) = contact.current_appointment else {
            return Ok(None);
        };
        Ok(self.repo.find_appointment_by_id(id).await?)
    }

    /// Emit the booking event; failure to publish never fails the booking.
    async fn notify_booked(
        &self,
        profile: &BusinessProfile,
        contact: &Contact,
        appointment: &Appointment,
    ) {
        let payload = json!({
            "title": "New appointment booked",
            "message": format!(
                "{} booked {} for {}.",
                contact.display_name,
                appointment.service,
                appointment.start.to_rfc3339(),
            ),
            "appointment_id": appointment.id,
            "contact_id": contact.id,
        });

        if let Err(e) = self
            .notifier
            .publish(profile.owner_id, EVENT_APPOINTMENT_BOOKED, payload)
            .await
        {
            tracing::warn!(error = %e, "booking notification publish failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_agent_core::domain::{AppointmentSettings, BusinessSchedule, Service};
    use booking_agent_persistence::memory::{MemoryRepository, RecordingPublisher};
    use chrono::TimeZone;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            owner_id: Uuid::new_v4(),
            business_name: "Studio".to_string(),
            location: Some("Bogota".to_string()),
            services: vec![Service {
                name: "Consultation".to_string(),
                price: Some(50.0),
                duration_minutes: Some(45),
                description: None,
            }],
            hours: BusinessSchedule::default(),
            settings: AppointmentSettings::default(),
        }
    }

    fn ops() -> (SchedulingOperations, Arc<MemoryRepository>, Arc<RecordingPublisher>) {
        let repo = Arc::new(MemoryRepository::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let ops = SchedulingOperations::new(repo.clone(), publisher.clone());
        (ops, repo, publisher)
    }

    // Monday 09:00 in Bogota.
    fn monday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap()
    }

    fn early_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 5, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn booking_links_contact_and_emits_event() {
        let (ops, repo, publisher) = ops();
        let profile = profile();
        let contact = ops.find_or_create_contact("+573001112233").await.unwrap();

        let confirmation = ops
            .book(&profile, monday_morning(), "Consultation", "+573001112233", None)
            .await
            .unwrap();

        assert_eq!(confirmation.appointment.duration_minutes(), 45);
        assert_eq!(
            confirmation.appointment.status,
            AppointmentStatus::Confirmed
        );

        let stored = repo
            .find_contact_by_phone("+573001112233")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.current_appointment,
            Some(confirmation.appointment.id)
        );
        assert_eq!(stored.id, contact.id);

        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EVENT_APPOINTMENT_BOOKED);
    }

    #[tokio::test]
    async fn booking_unknown_contact_fails() {
        let (ops, _, _) = ops();
        let err = ops
            .book(&profile(), monday_morning(), "Consultation", "+570000000000", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::ContactNotFound));
    }

    #[tokio::test]
    async fn booked_slot_shows_unavailable_afterwards() {
        let (ops, _, _) = ops();
        let profile = profile();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        let before = ops
            .check_availability_at(&profile, monday_morning(), early_now())
            .await;
        assert!(before.available);

        ops.book(&profile, monday_morning(), "General", "+573001112233", None)
            .await
            .unwrap();

        // 09:10 local falls inside the 35 minute occupied window.
        let ten_past = Utc.with_ymd_and_hms(2024, 6, 10, 14, 10, 0).unwrap();
        let after = ops
            .check_availability_at(&profile, ten_past, early_now())
            .await;
        assert!(!after.available);
    }

    #[tokio::test]
    async fn double_booking_same_slot_is_refused() {
        let (ops, _, _) = ops();
        let profile = profile();
        ops.find_or_create_contact("+573001112233").await.unwrap();
        ops.find_or_create_contact("+573004445566").await.unwrap();

        ops.book(&profile, monday_morning(), "General", "+573001112233", None)
            .await
            .unwrap();

        let err = ops
            .book(&profile, monday_morning(), "General", "+573004445566", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::SlotTaken(_)));
    }

    #[tokio::test]
    async fn cancel_roundtrip_restores_contact() {
        let (ops, repo, _) = ops();
        let profile = profile();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        let confirmation = ops
            .book(&profile, monday_morning(), "General", "+573001112233", None)
            .await
            .unwrap();

        let message = ops
            .cancel("+573001112233", Some("travelling"))
            .await
            .unwrap();
        assert!(message.contains("successfully cancelled"));

        let contact = repo
            .find_contact_by_phone("+573001112233")
            .await
            .unwrap()
            .unwrap();
        assert!(contact.current_appointment.is_none());

        let appointment = repo
            .find_appointment_by_id(confirmation.appointment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Cancelled);
        assert!(appointment.notes.unwrap().contains("travelling"));
    }

    #[tokio::test]
    async fn cancel_without_active_appointment_is_soft() {
        let (ops, repo, _) = ops();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        let message = ops.cancel("+573001112233", None).await.unwrap();
        assert_eq!(message, "No active appointment found to cancel.");

        // No mutation happened.
        let contact = repo
            .find_contact_by_phone("+573001112233")
            .await
            .unwrap()
            .unwrap();
        assert!(contact.current_appointment.is_none());
    }

    #[tokio::test]
    async fn reschedule_preserves_duration_and_status() {
        let (ops, repo, _) = ops();
        let profile = profile();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        let confirmation = ops
            .book(&profile, monday_morning(), "Consultation", "+573001112233", None)
            .await
            .unwrap();
        let original_duration = confirmation.appointment.duration_minutes();

        // Tuesday 10:00 local.
        let new_start = Utc.with_ymd_and_hms(2024, 6, 11, 15, 0, 0).unwrap();
        let message = ops
            .reschedule(&profile, "+573001112233", new_start)
            .await
            .unwrap();
        assert!(message.contains("rescheduled"));

        let moved = repo
            .find_appointment_by_id(confirmation.appointment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.start, new_start);
        assert_eq!(moved.duration_minutes(), original_duration);
        assert_eq!(moved.status, AppointmentStatus::Confirmed);
    }

    #[tokio::test]
    async fn reschedule_without_appointment_is_soft() {
        let (ops, _, _) = ops();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        let new_start = Utc.with_ymd_and_hms(2024, 6, 11, 15, 0, 0).unwrap();
        let message = ops
            .reschedule(&profile(), "+573001112233", new_start)
            .await
            .unwrap();
        assert!(message.contains("No active appointment"));
    }

    #[tokio::test]
    async fn rename_updates_contact() {
        let (ops, repo, _) = ops();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        let message = ops
            .update_contact_name("+573001112233", "Valentina")
            .await
            .unwrap();
        assert!(message.contains("Valentina"));

        let contact = repo
            .find_contact_by_phone("+573001112233")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contact.display_name, "Valentina");
    }

    #[tokio::test]
    async fn cancelled_appointments_do_not_block_availability() {
        let (ops, _, _) = ops();
        let profile = profile();
        ops.find_or_create_contact("+573001112233").await.unwrap();

        ops.book(&profile, monday_morning(), "General", "+573001112233", None)
            .await
            .unwrap();
        ops.cancel("+573001112233", None).await.unwrap();

        let result = ops
            .check_availability_at(&profile, monday_morning(), early_now())
            .await;
        assert!(result.available);
    }
}
