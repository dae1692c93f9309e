//! Static declarations of the callable operations.

use booking_agent_core::llm_types::{InputSchema, PropertySchema, ToolDefinition};

/// Wire-contract tool names.
pub mod names {
    pub const CHECK_AVAILABILITY: &str = "checkAvailability";
    pub const BOOK_APPOINTMENT: &str = "bookAppointment";
    pub const UPDATE_CONTACT_NAME: &str = "updateContactName";
    pub const CANCEL_APPOINTMENT: &str = "cancelAppointment";
    pub const RESCHEDULE_APPOINTMENT: &str = "rescheduleAppointment";
}

/// The full tool catalog declared to the model on every round.
pub fn tool_catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: names::CHECK_AVAILABILITY.to_string(),
            description: "Check availability for a specific date and time.".to_string(),
            input_schema: InputSchema::object().property(
                "dateTime",
                PropertySchema::string("The date and time to check (ISO 8601 format)."),
                true,
            ),
        },
        ToolDefinition {
            name: names::BOOK_APPOINTMENT.to_string(),
            description: "Book an appointment.".to_string(),
            input_schema: InputSchema::object()
                .property(
                    "dateTime",
                    PropertySchema::string(
                        "The date and time of the appointment (ISO 8601 format).",
                    ),
                    true,
                )
                .property(
                    "serviceName",
                    PropertySchema::string("Name of the requested service."),
                    true,
                )
                .property(
                    "notes",
                    PropertySchema::string("Any special requests or notes from the customer."),
                    false,
                ),
        },
        ToolDefinition {
            name: names::UPDATE_CONTACT_NAME.to_string(),
            description: "Update the user's name.".to_string(),
            input_schema: InputSchema::object().property(
                "name",
                PropertySchema::string("The user's name."),
                true,
            ),
        },
        ToolDefinition {
            name: names::CANCEL_APPOINTMENT.to_string(),
            description: "Cancel the user's upcoming appointment.".to_string(),
            input_schema: InputSchema::object().property(
                "reason",
                PropertySchema::string("Reason for the cancellation."),
                false,
            ),
        },
        ToolDefinition {
            name: names::RESCHEDULE_APPOINTMENT.to_string(),
            description: "Reschedule the user's upcoming appointment.".to_string(),
            input_schema: InputSchema::object().property(
                "newDateTime",
                PropertySchema::string("The new date and time (ISO 8601 format)."),
                true,
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_declares_all_five_operations() {
        let catalog = tool_catalog();
        let declared: Vec<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            declared,
            vec![
                names::CHECK_AVAILABILITY,
                names::BOOK_APPOINTMENT,
                names::UPDATE_CONTACT_NAME,
                names::CANCEL_APPOINTMENT,
                names::RESCHEDULE_APPOINTMENT,
            ]
        );
    }

    #[test]
    fn booking_requires_date_and_service() {
        let catalog = tool_catalog();
        let book = catalog
            .iter()
            .find(|t| t.name == names::BOOK_APPOINTMENT)
            .unwrap();
        assert!(book.input_schema.required.contains(&"dateTime".to_string()));
        assert!(book
            .input_schema
            .required
            .contains(&"serviceName".to_string()));
        assert!(!book.input_schema.required.contains(&"notes".to_string()));
    }

    #[test]
    fn cancel_reason_is_optional() {
        let catalog = tool_catalog();
        let cancel = catalog
            .iter()
            .find(|t| t.name == names::CANCEL_APPOINTMENT)
            .unwrap();
        assert!(cancel.input_schema.required.is_empty());
    }
}
