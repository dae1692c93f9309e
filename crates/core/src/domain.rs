//! Business domain types: contacts, appointments, schedules, services.
//!
//! Appointments are stored as absolute UTC instants. All business-hours
//! reasoning happens in the business timezone and lives in the scheduling
//! crate; these types carry no timezone logic of their own.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown for contacts whose name has not been captured yet.
///
/// The agent treats this value as a signal to ask the caller for their name.
pub const UNKNOWN_CONTACT_NAME: &str = "Unknown";

/// A customer reachable over a messaging channel.
///
/// The phone number is the stable conversation identity; a contact is created
/// on the first inbound message from a new number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    /// Unique, stable identity for the conversation.
    pub phone_number: String,
    /// Display name, defaults to [`UNKNOWN_CONTACT_NAME`].
    pub display_name: String,
    /// At most one active appointment per contact.
    pub current_appointment: Option<Uuid>,
    /// Whether the bot responds to this contact at all.
    pub bot_enabled: bool,
}

impl Contact {
    /// Create a fresh contact for a phone number with no captured name.
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number: phone_number.into(),
            display_name: UNKNOWN_CONTACT_NAME.to_string(),
            current_appointment: None,
            bot_enabled: true,
        }
    }

    /// True when the caller's real name has not been captured yet.
    pub fn name_unknown(&self) -> bool {
        self.display_name == UNKNOWN_CONTACT_NAME || self.display_name.is_empty()
    }
}

/// Appointment lifecycle status.
///
/// Transitions are one-directional except reschedule, which keeps the
/// appointment `Confirmed` while replacing its start/end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub contact_id: Uuid,
    /// The business (persona) that owns this appointment.
    pub owner_id: Uuid,
    pub start: DateTime<Utc>,
    /// Always `start + duration`; stored denormalized for range queries.
    pub end: DateTime<Utc>,
    pub service: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Appointment {
    /// Duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A bookable service with an optional duration override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Overrides the default appointment duration when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Open/close window for one weekday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DaySchedule {
    pub is_open: bool,
    /// Ignored when `is_open` is false.
    #[serde(default = "default_open")]
    pub open: NaiveTime,
    /// Must be after `open` when the day is open.
    #[serde(default = "default_close")]
    pub close: NaiveTime,
}

fn default_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

fn default_close() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default()
}

impl DaySchedule {
    pub fn open(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            is_open: true,
            open,
            close,
        }
    }

    pub fn closed() -> Self {
        Self {
            is_open: false,
            open: default_open(),
            close: default_close(),
        }
    }
}

/// Weekly business hours keyed by weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSchedule {
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
    pub saturday: DaySchedule,
    pub sunday: DaySchedule,
}

impl BusinessSchedule {
    /// Mon-Fri open with the given window, weekend closed.
    pub fn weekdays(open: NaiveTime, close: NaiveTime) -> Self {
        let day = DaySchedule::open(open, close);
        Self {
            monday: day,
            tuesday: day,
            wednesday: day,
            thursday: day,
            friday: day,
            saturday: DaySchedule::closed(),
            sunday: DaySchedule::closed(),
        }
    }

    pub fn for_weekday(&self, weekday: Weekday) -> DaySchedule {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// Lowercase day name used in prompts and messages ("monday" .. "sunday").
    pub fn day_name(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        }
    }
}

impl Default for BusinessSchedule {
    fn default() -> Self {
        Self::weekdays(default_open(), default_close())
    }
}

/// Appointment timing settings for a business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentSettings {
    /// IANA timezone name, e.g. "America/Bogota".
    pub timezone: String,
    /// Duration used when the booked service has no override.
    pub default_duration_minutes: u32,
    /// Mandatory idle minutes after an appointment before another may start.
    pub buffer_minutes: u32,
}

impl Default for AppointmentSettings {
    fn default() -> Self {
        Self {
            timezone: "America/Bogota".to_string(),
            default_duration_minutes: 30,
            buffer_minutes: 5,
        }
    }
}

/// Everything the scheduling engine needs to know about one business.
///
/// The persona tone text that shapes the agent's voice is *not* part of this
/// profile; it is rendered elsewhere and handed to the orchestrator as an
/// opaque string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub owner_id: Uuid,
    pub business_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub hours: BusinessSchedule,
    #[serde(default)]
    pub settings: AppointmentSettings,
}

impl BusinessProfile {
    /// Case-insensitive service lookup by name.
    pub fn find_service(&self, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Duration for a named service, falling back to the default duration.
    pub fn duration_for(&self, service_name: &str) -> u32 {
        self.find_service(service_name)
            .and_then(|s| s.duration_minutes)
            .unwrap_or(self.settings.default_duration_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contact_has_unknown_name() {
        let contact = Contact::new("+573001112233");
        assert!(contact.name_unknown());
        assert!(contact.current_appointment.is_none());
        assert!(contact.bot_enabled);
    }

    #[test]
    fn weekday_schedule_closes_weekend() {
        let schedule = BusinessSchedule::default();
        assert!(schedule.for_weekday(Weekday::Wed).is_open);
        assert!(!schedule.for_weekday(Weekday::Sun).is_open);
    }

    #[test]
    fn duration_falls_back_to_default() {
        let profile = BusinessProfile {
            owner_id: Uuid::new_v4(),
            business_name: "Studio".to_string(),
            location: None,
            services: vec![Service {
                name: "Deep Tissue".to_string(),
                price: Some(80.0),
                duration_minutes: Some(60),
                description: None,
            }],
            hours: BusinessSchedule::default(),
            settings: AppointmentSettings::default(),
        };

        assert_eq!(profile.duration_for("deep tissue"), 60);
        assert_eq!(profile.duration_for("Haircut"), 30);
    }
}
