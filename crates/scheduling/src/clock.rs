//! Wall-clock shifting between UTC instants and a business timezone.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::ScheduleError;

/// Wall-clock value of `instant` inside the IANA zone `timezone`.
///
/// The instant itself is unchanged; the result is the calendar date and
/// time-of-day a clock on the wall in that zone would show, usable for direct
/// comparison against business-hours boundaries. DST transitions follow the
/// zone's rules, never a fixed offset.
pub fn shift_to_zone(
    instant: DateTime<Utc>,
    timezone: &str,
) -> Result<NaiveDateTime, ScheduleError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| ScheduleError::InvalidTimezone(timezone.to_string()))?;
    Ok(instant.with_timezone(&tz).naive_local())
}
