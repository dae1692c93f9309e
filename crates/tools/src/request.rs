//! Typed tool requests parsed from model-supplied invocations.
//!
//! The model names an operation by string and sends untyped JSON arguments;
//! parsing turns that into a closed set of variants, each carrying its own
//! validated argument struct, so execution is a single exhaustive match and
//! a malformed payload is rejected with a typed error up front.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{catalog::names, ToolError};

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    CheckAvailability {
        date_time: DateTime<Utc>,
    },
    BookAppointment {
        date_time: DateTime<Utc>,
        service_name: String,
        notes: Option<String>,
    },
    UpdateContactName {
        name: String,
    },
    CancelAppointment {
        reason: Option<String>,
    },
    RescheduleAppointment {
        new_date_time: DateTime<Utc>,
    },
}

#[derive(Deserialize)]
struct CheckAvailabilityArgs {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Deserialize)]
struct BookAppointmentArgs {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "serviceName")]
    service_name: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct UpdateContactNameArgs {
    name: String,
}

#[derive(Deserialize, Default)]
struct CancelAppointmentArgs {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct RescheduleAppointmentArgs {
    #[serde(rename = "newDateTime")]
    new_date_time: String,
}

impl ToolRequest {
    /// Parse an invocation by wire name and raw JSON arguments.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolError> {
        // Models occasionally send no arguments at all for optional-only
        // schemas; treat that as an empty object.
        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };

        match name {
            names::CHECK_AVAILABILITY => {
                let args: CheckAvailabilityArgs = decode(name, arguments)?;
                Ok(ToolRequest::CheckAvailability {
                    date_time: parse_instant(name, &args.date_time)?,
                })
            }
            names::BOOK_APPOINTMENT => {
                let args: BookAppointmentArgs = decode(name, arguments)?;
                Ok(ToolRequest::BookAppointment {
                    date_time: parse_instant(name, &args.date_time)?,
                    service_name: args.service_name,
                    notes: args.notes,
                })
            }
            names::UPDATE_CONTACT_NAME => {
                let args: UpdateContactNameArgs = decode(name, arguments)?;
                if args.name.trim().is_empty() {
                    return Err(ToolError::InvalidParams {
                        tool: name.to_string(),
                        message: "name must not be empty".to_string(),
                    });
                }
                Ok(ToolRequest::UpdateContactName {
                    name: args.name.trim().to_string(),
                })
            }
            names::CANCEL_APPOINTMENT => {
                let args: CancelAppointmentArgs = decode(name, arguments)?;
                Ok(ToolRequest::CancelAppointment {
                    reason: args.reason,
                })
            }
            names::RESCHEDULE_APPOINTMENT => {
                let args: RescheduleAppointmentArgs = decode(name, arguments)?;
                Ok(ToolRequest::RescheduleAppointment {
                    new_date_time: parse_instant(name, &args.new_date_time)?,
                })
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn decode<'a, T: Deserialize<'a>>(tool: &str, arguments: &'a str) -> Result<T, ToolError> {
    serde_json::from_str(arguments).map_err(|e| ToolError::InvalidParams {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn parse_instant(tool: &str, value: &str) -> Result<DateTime<Utc>, ToolError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ToolError::InvalidParams {
            tool: tool.to_string(),
            message: format!("'{value}' is not an ISO 8601 date-time"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_check_availability() {
        let request = ToolRequest::parse(
            names::CHECK_AVAILABILITY,
            r#"{"dateTime":"2024-06-10T14:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            ToolRequest::CheckAvailability {
                date_time: Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap(),
            }
        );
    }

    #[test]
    fn parses_booking_with_offset_timestamp() {
        let request = ToolRequest::parse(
            names::BOOK_APPOINTMENT,
            r#"{"dateTime":"2024-06-10T09:00:00-05:00","serviceName":"Haircut"}"#,
        )
        .unwrap();
        let ToolRequest::BookAppointment {
            date_time,
            service_name,
            notes,
        } = request
        else {
            panic!("wrong variant");
        };
        assert_eq!(
            date_time,
            Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap()
        );
        assert_eq!(service_name, "Haircut");
        assert!(notes.is_none());
    }

    #[test]
    fn cancel_accepts_empty_arguments() {
        let request = ToolRequest::parse(names::CANCEL_APPOINTMENT, "").unwrap();
        assert_eq!(request, ToolRequest::CancelAppointment { reason: None });

        let request = ToolRequest::parse(names::CANCEL_APPOINTMENT, "{}").unwrap();
        assert_eq!(request, ToolRequest::CancelAppointment { reason: None });
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = ToolRequest::parse("launchRocket", "{}").unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        let err = ToolRequest::parse(names::CHECK_AVAILABILITY, "not json").unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));

        let err =
            ToolRequest::parse(names::CHECK_AVAILABILITY, r#"{"dateTime":"tomorrow"}"#)
                .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err =
            ToolRequest::parse(names::UPDATE_CONTACT_NAME, r#"{"name":"  "}"#).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }
}
