//! Executes validated tool requests against the scheduling operations.
//!
//! Every execution produces a JSON payload string for the model, success or
//! not. Failures are rendered into the payload instead of propagated;
//! a tool round that errors must still feed something back into the
//! conversation so the model can recover or apologise.

use std::sync::Arc;

use serde_json::json;

use booking_agent_core::domain::BusinessProfile;
use booking_agent_core::llm_types::ToolCallRequest;
use booking_agent_scheduling::{OperationError, SchedulingOperations};

use crate::request::ToolRequest;

const BOOKING_FAILED: &str = "Failed to book appointment. Please try again.";
const OPERATION_FAILED: &str = "Something went wrong. Please try again.";

/// Routes model tool calls to their scheduling operations.
pub struct ToolDispatcher {
    operations: Arc<SchedulingOperations>,
}

impl ToolDispatcher {
    pub fn new(operations: Arc<SchedulingOperations>) -> Self {
        Self { operations }
    }

    /// Execute a tool call on behalf of the contact behind `phone`.
    ///
    /// Always returns a JSON payload; never an error.
    pub async fn execute(
        &self,
        profile: &BusinessProfile,
        phone: &str,
        call: &ToolCallRequest,
    ) -> String {
        let request = match ToolRequest::parse(&call.name, &call.arguments) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "rejected tool call");
                return failure(&e.to_string());
            }
        };

        tracing::debug!(tool = %call.name, phone = %phone, "executing tool call");

        match request {
            ToolRequest::CheckAvailability { date_time } => {
                let result = self.operations.check_availability(profile, date_time).await;
                let slots_key = if result.available {
                    "futureSlots"
                } else {
                    "alternativeSlots"
                };
                json!({
                    "available": result.available,
                    "message": result.message,
                    slots_key: result.slots_hint(),
                })
                .to_string()
            }
            ToolRequest::BookAppointment {
                date_time,
                service_name,
                notes,
            } => {
                match self
                    .operations
                    .book(profile, date_time, &service_name, phone, notes)
                    .await
                {
                    Ok(confirmation) => success(&confirmation.message),
                    Err(OperationError::SlotTaken(message)) => failure(&message),
                    Err(e) => {
                        tracing::error!(error = %e, "booking failed");
                        failure(BOOKING_FAILED)
                    }
                }
            }
            ToolRequest::UpdateContactName { name } => {
                match self.operations.update_contact_name(phone, &name).await {
                    Ok(message) => success(&message),
                    Err(e) => {
                        tracing::error!(error = %e, "contact rename failed");
                        failure(OPERATION_FAILED)
                    }
                }
            }
            ToolRequest::CancelAppointment { reason } => {
                match self.operations.cancel(phone, reason.as_deref()).await {
                    Ok(message) => success(&message),
                    Err(e) => {
                        tracing::error!(error = %e, "cancellation failed");
                        failure(OPERATION_FAILED)
                    }
                }
            }
            ToolRequest::RescheduleAppointment { new_date_time } => {
                match self
                    .operations
                    .reschedule(profile, phone, new_date_time)
                    .await
                {
                    Ok(message) => success(&message),
                    Err(e) => {
                        tracing::error!(error = %e, "reschedule failed");
                        failure(OPERATION_FAILED)
                    }
                }
            }
        }
    }
}

fn success(message: &str) -> String {
    json!({ "success": true, "message": message }).to_string()
}

fn failure(message: &str) -> String {
    json!({ "success": false, "message": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_agent_core::domain::{
        AppointmentSettings, BusinessSchedule, Service,
    };
    use booking_agent_persistence::memory::{MemoryRepository, RecordingPublisher};
    use serde_json::Value;
    use uuid::Uuid;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            owner_id: Uuid::new_v4(),
            business_name: "Studio".to_string(),
            location: None,
            services: vec![Service {
                name: "Haircut".to_string(),
                price: Some(25.0),
                duration_minutes: Some(30),
                description: None,
            }],
            hours: BusinessSchedule::default(),
            settings: AppointmentSettings::default(),
        }
    }

    fn dispatcher() -> (ToolDispatcher, Arc<SchedulingOperations>) {
        let repo = Arc::new(MemoryRepository::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let operations = Arc::new(SchedulingOperations::new(repo, publisher));
        (ToolDispatcher::new(operations.clone()), operations)
    }

    fn call(name: &str, arguments: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    fn parse(payload: &str) -> Value {
        serde_json::from_str(payload).unwrap()
    }

    #[tokio::test]
    async fn unknown_tool_returns_structured_failure() {
        let (dispatcher, _) = dispatcher();
        let payload = dispatcher
            .execute(&profile(), "+573001112233", &call("launchRocket", "{}"))
            .await;
        let value = parse(&payload);
        assert_eq!(value["success"], false);
        assert!(value["message"].as_str().unwrap().contains("launchRocket"));
    }

    #[tokio::test]
    async fn malformed_arguments_return_structured_failure() {
        let (dispatcher, _) = dispatcher();
        let payload = dispatcher
            .execute(
                &profile(),
                "+573001112233",
                &call(crate::names::CHECK_AVAILABILITY, "garbage"),
            )
            .await;
        let value = parse(&payload);
        assert_eq!(value["success"], false);
    }

    #[tokio::test]
    async fn availability_payload_carries_slot_hint() {
        let (dispatcher, _) = dispatcher();
        // Monday 2024-06-10, 09:00 in Bogota.
        let payload = dispatcher
            .execute(
                &profile(),
                "+573001112233",
                &call(
                    crate::names::CHECK_AVAILABILITY,
                    r#"{"dateTime":"2024-06-10T14:00:00Z"}"#,
                ),
            )
            .await;
        let value = parse(&payload);
        // The fixed date is in the past relative to the wall clock, so the
        // slot list content varies; the shape must not.
        assert!(value["available"].is_boolean());
        assert!(value["message"].is_string());
        let hint_key = if value["available"].as_bool().unwrap() {
            "futureSlots"
        } else {
            "alternativeSlots"
        };
        assert!(value[hint_key].is_string());
    }

    #[tokio::test]
    async fn booking_for_unknown_contact_fails_softly() {
        let (dispatcher, _) = dispatcher();
        let payload = dispatcher
            .execute(
                &profile(),
                "+570000000000",
                &call(
                    crate::names::BOOK_APPOINTMENT,
                    r#"{"dateTime":"2024-06-10T14:00:00Z","serviceName":"Haircut"}"#,
                ),
            )
            .await;
        let value = parse(&payload);
        assert_eq!(value["success"], false);
        assert_eq!(
            value["message"],
            "Failed to book appointment. Please try again."
        );
    }

    #[tokio::test]
    async fn book_then_cancel_via_dispatch() {
        let (dispatcher, operations) = dispatcher();
        let profile = profile();
        operations
            .find_or_create_contact("+573001112233")
            .await
            .unwrap();

        let payload = dispatcher
            .execute(
                &profile,
                "+573001112233",
                &call(
                    crate::names::BOOK_APPOINTMENT,
                    r#"{"dateTime":"2024-06-10T14:00:00Z","serviceName":"Haircut"}"#,
                ),
            )
            .await;
        let value = parse(&payload);
        assert_eq!(value["success"], true);
        assert!(value["message"]
            .as_str()
            .unwrap()
            .contains("Appointment confirmed"));

        let payload = dispatcher
            .execute(
                &profile,
                "+573001112233",
                &call(crate::names::CANCEL_APPOINTMENT, ""),
            )
            .await;
        let value = parse(&payload);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Appointment has been successfully cancelled.");
    }

    #[tokio::test]
    async fn rename_via_dispatch() {
        let (dispatcher, operations) = dispatcher();
        operations
            .find_or_create_contact("+573001112233")
            .await
            .unwrap();

        let payload = dispatcher
            .execute(
                &profile(),
                "+573001112233",
                &call(crate::names::UPDATE_CONTACT_NAME, r#"{"name":"Camila"}"#),
            )
            .await;
        let value = parse(&payload);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Updated name to Camila");
    }
}
