use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::efir::derive_report;
use super::location::{locate_or_none, ReportedPosition};
use crate::config::SosSettings;
use crate::db::Store;
use crate::error::AppResult;
use crate::models::location::AlertLocation;
use crate::models::sos_alert::{AlertStatus, AlertType, Severity, SosAlert};

#[derive(Debug, Clone, Copy)]
pub struct SosRequest {
    pub user_id: Uuid,
    pub alert_type: AlertType,
    pub severity: Severity,
}

impl SosRequest {
    pub fn manual(user_id: Uuid) -> Self {
        Self {
            user_id,
            alert_type: AlertType::Manual,
            severity: Severity::Critical,
        }
    }
}

/// What the tourist is told once the alert is on record.
#[derive(Debug, Clone, Serialize)]
pub struct SosConfirmation {
    pub alert_id: Uuid,
    pub fir_number: String,
    pub digital_id: Option<String>,
    pub location: Option<AlertLocation>,
    pub emergency_contact_notified: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Raises an SOS alert and files its E-FIR.
///
/// Location and profile lookups are best effort; only the final write can
/// fail the call. Nothing is retried.
pub async fn dispatch(
    store: &dyn Store,
    settings: &SosSettings,
    request: SosRequest,
    position: &ReportedPosition,
    now: DateTime<Utc>,
) -> AppResult<SosConfirmation> {
    let location = locate_or_none(position).map(AlertLocation::from);

    let digital_id = match store.digital_id_by_user(request.user_id).await {
        Ok(found) => found.map(|d| d.digital_id),
        Err(e) => {
            warn!("Digital ID lookup failed for {}: {}", request.user_id, e);
            None
        }
    };
    let profile = match store.profile_by_user(request.user_id).await {
        Ok(found) => found,
        Err(e) => {
            warn!("Profile lookup failed for {}: {}", request.user_id, e);
            None
        }
    };

    let alert = SosAlert {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        digital_id,
        location,
        alert_type: request.alert_type,
        severity: request.severity,
        status: AlertStatus::Pending,
        notes: None,
        response_time: None,
        resolved_at: None,
        created_at: now,
    };
    let report = derive_report(&alert, profile.as_ref(), &settings.police_station, now);

    store.file_sos(&alert, &report).await?;
    info!(
        "SOS alert {} raised for user {} ({}, {})",
        alert.id, alert.user_id, alert.alert_type, alert.severity
    );

    let emergency_contact = profile.map(|p| p.emergency_contact);
    match &emergency_contact {
        Some(contact) => info!("Notifying emergency contact {} of alert {}", contact, alert.id),
        None => warn!("No emergency contact on file for user {}", alert.user_id),
    }

    Ok(SosConfirmation {
        alert_id: alert.id,
        fir_number: report.fir_number,
        digital_id: alert.digital_id,
        location: alert.location,
        emergency_contact_notified: emergency_contact,
        sent_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::location::Coordinates;

    #[tokio::test]
    async fn writes_alert_then_report() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let here = ReportedPosition::new(
            Some(Coordinates {
                latitude: 48.8566,
                longitude: 2.3522,
            }),
            false,
        );

        let confirmation = dispatch(
            &store,
            &SosSettings::default(),
            SosRequest::manual(user),
            &here,
            Utc::now(),
        )
        .await
        .unwrap();

        let writes = store.writes().await;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].table, "sos_alerts");
        assert_eq!(writes[0].id, confirmation.alert_id);
        assert_eq!(writes[1].table, "e_fir_reports");

        let reports = store.list_efir(Some(user)).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].sos_alert_id, confirmation.alert_id);
        assert_eq!(reports[0].fir_number, confirmation.fir_number);
    }

    #[tokio::test]
    async fn denied_location_still_raises_alert() {
        let store = MemoryStore::new();
        let denied = ReportedPosition::new(None, true);

        let confirmation = dispatch(
            &store,
            &SosSettings::default(),
            SosRequest::manual(Uuid::new_v4()),
            &denied,
            Utc::now(),
        )
        .await
        .unwrap();

        let alert = store.alert_by_id(confirmation.alert_id).await.unwrap().unwrap();
        assert!(alert.location.is_none());
        assert_eq!(alert.status, AlertStatus::Pending);
        assert_eq!(alert.severity, Severity::Critical);
    }
}
