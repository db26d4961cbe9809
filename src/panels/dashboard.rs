use serde::Serialize;

use crate::db::Store;
use crate::error::AppResult;
use crate::models::profile::Role;
use crate::models::sos_alert::AlertStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_tourists: usize,
    pub active_alerts: usize,
    pub efir_reports: usize,
    pub active_danger_zones: usize,
}

/// Headline counts for the admin overview. `alert_window` bounds how many
/// recent alerts are scanned for pending ones.
pub async fn stats(store: &dyn Store, alert_window: i64) -> AppResult<DashboardStats> {
    let (tourists, alerts, reports, zones) = futures::try_join!(
        store.list_profiles(Role::Tourist),
        store.list_alerts(alert_window),
        store.list_efir(None),
        store.list_danger_zones(true),
    )?;

    Ok(DashboardStats {
        total_tourists: tourists.len(),
        active_alerts: alerts
            .iter()
            .filter(|a| a.status == AlertStatus::Pending)
            .count(),
        efir_reports: reports.len(),
        active_danger_zones: zones.len(),
    })
}
