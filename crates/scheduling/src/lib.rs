//! Scheduling engine for the booking agent
//!
//! Timezone-correct availability computation, slot generation, conflict
//! detection, and the booking mutations (book, cancel, reschedule).
//!
//! All comparisons against business hours happen on wall-clock values in the
//! business timezone, obtained by shifting absolute instants through the IANA
//! rules for that zone. The shift is the only place timezone arithmetic
//! happens; everything downstream works on naive local datetimes.

pub mod availability;
pub mod clock;
pub mod operations;

pub use availability::{check_availability, AvailabilityResult, MAX_ALTERNATIVE_SLOTS};
pub use clock::shift_to_zone;
pub use operations::{BookingConfirmation, OperationError, SchedulingOperations};

use thiserror::Error;

/// Scheduling errors.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Unrecognized timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid instant: {0}")]
    InvalidInstant(String),
}

impl From<ScheduleError> for booking_agent_core::Error {
    fn from(err: ScheduleError) -> Self {
        booking_agent_core::Error::Scheduling(err.to_string())
    }
}
