//! End-to-end booking conversation against in-memory stores and a scripted
//! model.

use std::sync::Arc;

use once_cell::sync::Lazy;
use uuid::Uuid;

use booking_agent_agent::ConversationOrchestrator;
use booking_agent_config::AgentConfig;
use booking_agent_core::conversation::TokenUsage;
use booking_agent_core::domain::{
    AppointmentSettings, AppointmentStatus, BusinessProfile, BusinessSchedule, Service,
};
use booking_agent_core::llm_types::{ChatResponse, ToolCallRequest};
use booking_agent_core::traits::{AppointmentRepository, ChatHistoryStore};
use booking_agent_llm::ScriptedBackend;
use booking_agent_persistence::memory::{
    MemoryChatHistory, MemoryRepository, RecordingPublisher,
};
use booking_agent_scheduling::SchedulingOperations;

static TRACING: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .init();
});

fn profile() -> BusinessProfile {
    BusinessProfile {
        owner_id: Uuid::new_v4(),
        business_name: "Bella Salon".to_string(),
        location: Some("Bogota".to_string()),
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

fn tool_call(name: &str, arguments: &str) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: vec![ToolCallRequest {
            id: format!("call_{name}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
        usage: TokenUsage::new(200, 30),
    }
}

#[tokio::test]
async fn check_then_book_then_confirm() {
    Lazy::force(&TRACING);

    // Monday 2024-06-10 14:00 UTC is 09:00 in Bogota, inside default hours.
    let script = ScriptedBackend::new(vec![
        Ok(tool_call(
            "checkAvailability",
            r#"{"dateTime":"2024-06-10T14:00:00Z"}"#,
        )),
        Ok(tool_call(
            "bookAppointment",
            r#"{"dateTime":"2024-06-10T14:00:00Z","serviceName":"Haircut"}"#,
        )),
        Ok(ChatResponse {
            content: Some("You're booked for a Haircut Monday at 9 AM!".to_string()),
            tool_calls: vec![],
            usage: TokenUsage::new(200, 30),
        }),
    ]);

    let backend = Arc::new(script);
    let repo = Arc::new(MemoryRepository::new());
    let history = Arc::new(MemoryChatHistory::new());
    let operations = Arc::new(SchedulingOperations::new(
        repo.clone(),
        Arc::new(RecordingPublisher::new()),
    ));
    let orchestrator = ConversationOrchestrator::new(
        backend.clone(),
        operations,
        history.clone(),
        AgentConfig::default(),
    );

    let profile = profile();
    let reply = orchestrator
        .handle_message(&profile, None, "+573001112233", "Can I get a haircut Monday at 9?")
        .await;

    assert_eq!(reply.text, "You're booked for a Haircut Monday at 9 AM!");
    assert_eq!(reply.usage.total_tokens, 3 * 230);
    assert_eq!(backend.call_count(), 3);

    // The booking landed in the store, confirmed, linked to the contact.
    let contact = repo
        .find_contact_by_phone("+573001112233")
        .await
        .unwrap()
        .unwrap();
    let appointment_id = contact.current_appointment.unwrap();
    let appointment = repo
        .find_appointment_by_id(appointment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(appointment.service, "Haircut");
    assert_eq!(appointment.duration_minutes(), 30);

    // The final model call saw both tool results in invocation order.
    let calls = backend.recorded_calls();
    let last = calls.last().unwrap();
    let tool_results: Vec<&str> = last
        .iter()
        .filter(|t| t.tool_call_id.is_some())
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(tool_results.len(), 2);
    assert!(tool_results[0].contains("Slot available"));
    assert!(tool_results[1].contains("Appointment confirmed"));

    // The exchange is now in history for the next run.
    let turns = history.recent("+573001112233", 10).await.unwrap();
    assert_eq!(turns.len(), 2);
}
