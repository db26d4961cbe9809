use chrono::Utc;
use tracing::{info, warn};

use crate::config::ServiceSettings;
use crate::db::Store;
use crate::models::message::DeviceSosMessage;
use crate::models::sos_alert::{AlertType, Severity};
use crate::sos::dispatch::{dispatch, SosRequest};
use crate::sos::location::ReportedPosition;

/// Turns one device SOS payload into an alert and its E-FIR.
///
/// Device triggers skip the hold gesture. Payloads that cannot be attributed
/// to a user are logged and dropped.
pub async fn process_message(
    store: &dyn Store,
    settings: &ServiceSettings,
    payload: &[u8],
) -> anyhow::Result<()> {
    // 1. Parse JSON
    let message: DeviceSosMessage = match serde_json::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to parse device message: {}", e);
            return Ok(());
        }
    };

    // 2. Extract data
    let user_id = match message.get_user_id() {
        Some(id) => id,
        None => {
            warn!("Device message missing user_id, skipping");
            return Ok(());
        }
    };
    let device_id = message.data.device_id.as_deref().unwrap_or("unknown");

    info!(
        "Processing SOS from device {} for user {} (message {})",
        device_id,
        user_id,
        message.uuid.as_deref().unwrap_or("-")
    );

    let request = SosRequest {
        user_id,
        alert_type: AlertType::IotTrigger,
        severity: message.severity().unwrap_or(Severity::Critical),
    };
    let position = ReportedPosition::new(message.coordinates(), false);

    // 3. Raise alert and E-FIR
    let confirmation = dispatch(store, &settings.sos, request, &position, Utc::now()).await?;
    info!(
        "Device {} raised alert {} (FIR {})",
        device_id, confirmation.alert_id, confirmation.fir_number
    );

    Ok(())
}
