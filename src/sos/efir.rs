use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::efir::{EfirReport, EfirStatus};
use crate::models::profile::Profile;
use crate::models::sos_alert::{AlertType, SosAlert};
use crate::services::codes::{random_hash, timestamped_code};

pub fn fir_number(now: DateTime<Utc>) -> String {
    timestamped_code("FIR", now, 5)
}

/// Builds the E-FIR that accompanies a freshly raised alert.
pub fn derive_report(
    alert: &SosAlert,
    profile: Option<&Profile>,
    police_station: &str,
    now: DateTime<Utc>,
) -> EfirReport {
    EfirReport {
        id: Uuid::new_v4(),
        sos_alert_id: alert.id,
        fir_number: fir_number(now),
        blockchain_hash: random_hash(),
        police_station: Some(police_station.to_string()),
        officer_assigned: None,
        incident_details: incident_narrative(alert, profile, now),
        status: EfirStatus::Filed,
        pdf_url: None,
        created_at: now,
    }
}

pub fn incident_narrative(alert: &SosAlert, profile: Option<&Profile>, now: DateTime<Utc>) -> String {
    const NA: &str = "N/A";

    let name = profile.map(|p| p.name.as_str()).unwrap_or(NA);
    let nationality = profile.and_then(|p| p.nationality.as_deref()).unwrap_or(NA);
    let contact = profile.map(|p| p.emergency_contact.as_str()).unwrap_or(NA);
    let location = match &alert.location {
        Some(loc) => format!("Lat: {}, Lng: {}", loc.latitude, loc.longitude),
        None => "Location unavailable".to_string(),
    };
    let trigger = match alert.alert_type {
        AlertType::Manual => "Manual SOS control",
        AlertType::IotTrigger => "Wearable / IoT device",
    };

    format!(
        "EMERGENCY ALERT - TOURIST DISTRESS\n\
         \n\
         Tourist Details:\n\
         - Name: {name}\n\
         - Digital ID: {digital_id}\n\
         - Nationality: {nationality}\n\
         - Emergency Contact: {contact}\n\
         \n\
         Incident Information:\n\
         - Type: Tourist Emergency SOS Alert\n\
         - Time: {time}\n\
         - Location: {location}\n\
         - Severity: {severity}\n\
         \n\
         Alert Details:\n\
         - Trigger: {trigger}\n\
         - Status: {status}\n\
         - Auto-generated: Yes\n\
         \n\
         Filed automatically by TourGuard. Immediate assistance required.",
        digital_id = alert.digital_id.as_deref().unwrap_or(NA),
        time = now.format("%Y-%m-%d %H:%M:%S UTC"),
        severity = alert.severity.as_str().to_uppercase(),
        status = alert.status,
    )
}
