//! System-prompt assembly for the booking assistant.

use chrono::{DateTime, Utc, Weekday};

use booking_agent_core::domain::{Appointment, BusinessProfile, BusinessSchedule, Contact};
use booking_agent_scheduling::shift_to_zone;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Build the system prompt for one orchestration run.
///
/// `persona` is the business owner's tone text, passed through verbatim as
/// the opening paragraph; this builder never edits or templates it. The
/// factual sections (hours, services, time, appointment) are rendered around
/// it. Everything time-related is in the business timezone so the model
/// reasons in local wall-clock terms; tool arguments still travel as ISO
/// 8601 instants.
pub fn system_prompt(
    profile: &BusinessProfile,
    persona: Option<&str>,
    contact: &Contact,
    active_appointment: Option<&Appointment>,
    now: DateTime<Utc>,
) -> String {
    let mut prompt = String::new();

    match persona {
        Some(text) => prompt.push_str(text),
        None => {
            prompt.push_str(&format!(
                "You are a friendly, efficient booking assistant for {}",
                profile.business_name
            ));
            if let Some(location) = &profile.location {
                prompt.push_str(&format!(" in {}", location));
            }
            prompt.push('.');
        }
    }
    prompt.push_str(
        " Keep replies short and conversational; this is a chat, not an email. \
         Always check availability before booking. Never invent times, \
         prices, or services that are not listed below.\n\n",
    );

    let local_now = shift_to_zone(now, &profile.settings.timezone)
        .map(|t| t.format("%A, %Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| now.to_rfc3339());
    prompt.push_str(&format!(
        "Current local time: {} ({}).\n\n",
        local_now, profile.settings.timezone
    ));

    prompt.push_str("Business hours:\n");
    for weekday in WEEKDAYS {
        let day = profile.hours.for_weekday(weekday);
        let name = BusinessSchedule::day_name(weekday);
        if day.is_open {
            prompt.push_str(&format!(
                "- {}: {} - {}\n",
                name,
                day.open.format("%H:%M"),
                day.close.format("%H:%M"),
            ));
        } else {
            prompt.push_str(&format!("- {}: closed\n", name));
        }
    }

    if !profile.services.is_empty() {
        prompt.push_str("\nServices:\n");
        for service in &profile.services {
            prompt.push_str(&format!("- {}", service.name));
            if let Some(price) = service.price {
                prompt.push_str(&format!(" (${:.2})", price));
            }
            if let Some(minutes) = service.duration_minutes {
                prompt.push_str(&format!(", {} mins", minutes));
            }
            if let Some(description) = &service.description {
                prompt.push_str(&format!(" - {}", description));
            }
            prompt.push('\n');
        }
    }

    match active_appointment {
        Some(appointment) => {
            let local = shift_to_zone(appointment.start, &profile.settings.timezone)
                .map(|t| t.format("%Y-%m-%d %-I:%M %p").to_string())
                .unwrap_or_else(|_| appointment.start.to_rfc3339());
            prompt.push_str(&format!(
                "\nThe customer has an active appointment: {} on {}. \
                 They may want to reschedule or cancel it.\n",
                appointment.service, local
            ));
        }
        None => {
            prompt.push_str("\nThe customer has no active appointment.\n");
        }
    }

    if contact.name_unknown() {
        prompt.push_str(
            "\nThe customer's name is not on file. Ask for it naturally during \
             the conversation and save it with the updateContactName tool.\n",
        );
    } else {
        prompt.push_str(&format!(
            "\nThe customer's name is {}.\n",
            contact.display_name
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_agent_core::domain::{AppointmentSettings, Service};
    use chrono::TimeZone;
    use uuid::Uuid;

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

    #[test]
    fn prompt_names_business_hours_and_services() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
        let contact = Contact::new("+573001112233");
        let prompt = system_prompt(&profile(), None, &contact, None, now);

        assert!(prompt.contains("Bella Salon"));
        assert!(prompt.contains("monday: 09:00 - 17:00"));
        assert!(prompt.contains("sunday: closed"));
        assert!(prompt.contains("Haircut ($25.00), 30 mins"));
        assert!(prompt.contains("no active appointment"));
    }

    #[test]
    fn persona_text_passes_through_verbatim() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
        let contact = Contact::new("+573001112233");
        let persona = "Eres Valentina, la recepcionista de Bella Salon. Habla con calidez.";
        let prompt = system_prompt(&profile(), Some(persona), &contact, None, now);

        assert!(prompt.starts_with(persona));
        // The default intro is replaced, the factual sections are not.
        assert!(!prompt.contains("You are a friendly"));
        assert!(prompt.contains("Business hours:"));
    }

    #[test]
    fn unknown_name_triggers_capture_instruction() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
        let contact = Contact::new("+573001112233");
        let prompt = system_prompt(&profile(), None, &contact, None, now);
        assert!(prompt.contains("updateContactName"));

        let mut named = contact;
        named.display_name = "Camila".to_string();
        let prompt = system_prompt(&profile(), None, &named, None, now);
        assert!(!prompt.contains("updateContactName"));
        assert!(prompt.contains("Camila"));
    }

    #[test]
    fn active_appointment_is_described_in_local_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
        let contact = Contact::new("+573001112233");
        let appointment = Appointment {
            id: Uuid::new_v4(),
            contact_id: contact.id,
            owner_id: Uuid::new_v4(),
            // 15:00 UTC is 10:00 in Bogota.
            start: Utc.with_ymd_and_hms(2024, 6, 11, 15, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 11, 15, 30, 0).unwrap(),
            service: "Haircut".to_string(),
            status: booking_agent_core::domain::AppointmentStatus::Confirmed,
            notes: None,
        };
        let prompt = system_prompt(&profile(), None, &contact, Some(&appointment), now);
        assert!(prompt.contains("Haircut on 2024-06-11 10:00 AM"));
    }
}
