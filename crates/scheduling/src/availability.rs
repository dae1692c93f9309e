//! Availability computation for a candidate booking instant.
//!
//! The calculator answers two questions at once: is this exact instant
//! bookable, and what else is free on the same local day. Alternatives are
//! descriptive hints for the agent, never a reservation; a concurrent booking
//! can invalidate them before the caller acts.

use chrono::{Datelike, Duration, NaiveDateTime};

use booking_agent_core::domain::{Appointment, AppointmentSettings, BusinessSchedule};

use crate::clock::shift_to_zone;
use crate::ScheduleError;

/// Upper bound on alternative slots returned for one day.
pub const MAX_ALTERNATIVE_SLOTS: usize = 8;

/// Slot scan granularity in minutes. Fixed ticks keep slot boundaries
/// predictable regardless of appointment durations.
const SCAN_STEP_MINUTES: i64 = 30;

/// Outcome of an availability check.
#[derive(Debug, Clone)]
pub struct AvailabilityResult {
    pub available: bool,
    pub message: String,
    /// Free same-day slots strictly in the future, rendered as local
    /// wall-clock times ("9:00 AM"). Empty when the day was closed or the
    /// candidate fell outside business hours.
    pub slots: Vec<String>,
}

impl AvailabilityResult {
    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            slots: Vec::new(),
        }
    }

    /// Human-readable rendering of the slot list for the agent.
    ///
    /// Kept as a sentence rather than a structured list: the consumer is a
    /// language model, not a parser.
    pub fn slots_hint(&self) -> String {
        if self.slots.is_empty() {
            if self.available {
                "This is the last slot.".to_string()
            } else {
                "No other slots available today.".to_string()
            }
        } else if self.available {
            format!("Other available times today: {}...", self.slots.join(", "))
        } else {
            format!("Try these times: {}...", self.slots.join(", "))
        }
    }
}

/// An existing appointment's occupancy in shifted local time, trailing
/// buffer included.
#[derive(Debug, Clone, Copy)]
struct BusyInterval {
    start: NaiveDateTime,
    /// Appointment end (or start + default duration when the end is
    /// missing) plus the buffer.
    busy_end: NaiveDateTime,
}

/// Check whether `candidate` is bookable and collect same-day alternatives.
///
/// `now` is passed explicitly so callers can pin it in tests; production
/// callers pass the current instant. Both are shifted into the business
/// timezone before any comparison.
pub fn check_availability(
    candidate: chrono::DateTime<chrono::Utc>,
    now: chrono::DateTime<chrono::Utc>,
    schedule: &BusinessSchedule,
    settings: &AppointmentSettings,
    existing: &[Appointment],
) -> Result<AvailabilityResult, ScheduleError> {
    let tz = settings.timezone.as_str();
    let shifted_now = shift_to_zone(now, tz)?;
    let shifted_candidate = shift_to_zone(candidate, tz)?;

    let weekday = shifted_candidate.weekday();
    let day = schedule.for_weekday(weekday);
    let day_name = BusinessSchedule::day_name(weekday);

    if !day.is_open {
        return Ok(AvailabilityResult::unavailable(format!(
            "We are closed on {}s.",
            day_name
        )));
    }

    let open_at = shifted_candidate.date().and_time(day.open);
    let close_at = shifted_candidate.date().and_time(day.close);

    if shifted_candidate < open_at || shifted_candidate >= close_at {
        return Ok(AvailabilityResult::unavailable(format!(
            "That time is outside our business hours ({} - {}).",
            day.open.format("%H:%M"),
            day.close.format("%H:%M"),
        )));
    }

    let duration = Duration::minutes(i64::from(settings.default_duration_minutes));
    let buffer = Duration::minutes(i64::from(settings.buffer_minutes));

    let busy = busy_intervals(existing, settings, duration, buffer)?;

    let candidate_conflict = conflict_end(shifted_candidate, duration + buffer, &busy);

    // Scan the day on a fixed grid, jumping straight past busy blocks instead
    // of stepping through them minute by minute.
    let mut slots = Vec::new();
    let mut scan = open_at;
    while scan < close_at && slots.len() < MAX_ALTERNATIVE_SLOTS {
        if let Some(busy_until) = conflict_end(scan, duration + buffer, &busy) {
            scan = busy_until;
            continue;
        }

        let slot_end = scan + duration;
        if scan > shifted_now && slot_end <= close_at {
            slots.push(scan.format("%-I:%M %p").to_string());
        }
        scan += Duration::minutes(SCAN_STEP_MINUTES);
    }

    if candidate_conflict.is_some() {
        Ok(AvailabilityResult {
            available: false,
            message: "Slot is busy.".to_string(),
            slots,
        })
    } else {
        Ok(AvailabilityResult {
            available: true,
            message: "Slot available".to_string(),
            slots,
        })
    }
}

/// Shift existing appointments into local time and attach their buffer,
/// sorted by start.
fn busy_intervals(
    existing: &[Appointment],
    settings: &AppointmentSettings,
    default_duration: Duration,
    buffer: Duration,
) -> Result<Vec<BusyInterval>, ScheduleError> {
    let tz = settings.timezone.as_str();
    let mut intervals = Vec::with_capacity(existing.len());

    for appt in existing {
        let start = shift_to_zone(appt.start, tz)?;
        let end = if appt.end > appt.start {
            shift_to_zone(appt.end, tz)?
        } else {
            start + default_duration
        };
        intervals.push(BusyInterval {
            start,
            busy_end: end + buffer,
        });
    }

    intervals.sort_by_key(|b| b.start);
    Ok(intervals)
}

/// End of the first busy interval (in start order) that overlaps the
/// occupied window starting at `slot_start`, or `None` when the window is
/// free.
///
/// Half-open semantics: a window ending exactly where a busy interval begins
/// does not conflict, and vice versa.
fn conflict_end(
    slot_start: NaiveDateTime,
    occupied: Duration,
    busy: &[BusyInterval],
) -> Option<NaiveDateTime> {
    let slot_end = slot_start + occupied;
    busy.iter()
        .find(|b| slot_start < b.busy_end && slot_end > b.start)
        .map(|b| b.busy_end)
}
