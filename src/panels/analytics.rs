//! Reports & analytics: incident totals and response times over the recent
//! alert window.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{contains_ignore_case, Filter};
use crate::db::Store;
use crate::error::AppResult;
use crate::models::danger_zone::RiskLevel;
use crate::models::sos_alert::{AlertStatus, AlertType, SosAlert};

#[derive(Debug, Clone, Default)]
pub struct AnalyticsQuery {
    pub search: String,
    pub alert_type: Filter<AlertType>,
    pub status: Filter<AlertStatus>,
}

impl AnalyticsQuery {
    /// Search covers the digital ID, the location address and the notes.
    pub fn matches(&self, alert: &SosAlert) -> bool {
        let search = self.search.trim();
        let matches_search = search.is_empty()
            || alert
                .digital_id
                .as_deref()
                .is_some_and(|d| contains_ignore_case(d, search))
            || alert
                .location
                .as_ref()
                .and_then(|l| l.address.as_deref())
                .is_some_and(|a| contains_ignore_case(a, search))
            || alert
                .notes
                .as_deref()
                .is_some_and(|n| contains_ignore_case(n, search));
        matches_search
            && self.alert_type.matches(&alert.alert_type)
            && self.status.matches(&alert.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentAnalytics {
    pub total_incidents: usize,
    pub resolved: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub manual_triggers: usize,
    pub device_triggers: usize,
    /// Mean minutes from alert to first response, one decimal place.
    pub average_response_minutes: Option<f64>,
    pub high_risk_zones: usize,
}

/// Minutes until someone picked the alert up. An alert resolved without
/// passing through `in_progress` counts its resolution time.
fn response_minutes(alert: &SosAlert) -> Option<f64> {
    let answered: DateTime<Utc> = alert.response_time.or(alert.resolved_at)?;
    let seconds = (answered - alert.created_at).num_seconds().max(0);
    Some(seconds as f64 / 60.0)
}

pub fn summarize<'a, I>(alerts: I, high_risk_zones: usize) -> IncidentAnalytics
where
    I: IntoIterator<Item = &'a SosAlert>,
{
    let mut summary = IncidentAnalytics {
        total_incidents: 0,
        resolved: 0,
        in_progress: 0,
        pending: 0,
        manual_triggers: 0,
        device_triggers: 0,
        average_response_minutes: None,
        high_risk_zones,
    };
    let mut response_total = 0.0;
    let mut responded = 0u32;

    for alert in alerts {
        summary.total_incidents += 1;
        match alert.status {
            AlertStatus::Pending => summary.pending += 1,
            AlertStatus::InProgress => summary.in_progress += 1,
            AlertStatus::Resolved => summary.resolved += 1,
        }
        match alert.alert_type {
            AlertType::Manual => summary.manual_triggers += 1,
            AlertType::IotTrigger => summary.device_triggers += 1,
        }
        if let Some(minutes) = response_minutes(alert) {
            response_total += minutes;
            responded += 1;
        }
    }

    if responded > 0 {
        let mean = response_total / f64::from(responded);
        summary.average_response_minutes = Some((mean * 10.0).round() / 10.0);
    }
    summary
}

/// Figures for the analytics panel over the most recent `alert_window` alerts.
pub async fn incident_analytics(
    store: &dyn Store,
    alert_window: i64,
    query: &AnalyticsQuery,
) -> AppResult<IncidentAnalytics> {
    let (alerts, zones) = futures::try_join!(
        store.list_alerts(alert_window),
        store.list_danger_zones(true),
    )?;

    let high_risk = zones
        .iter()
        .filter(|z| z.risk_level == RiskLevel::High)
        .count();
    Ok(summarize(
        alerts.iter().filter(|a| query.matches(a)),
        high_risk,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SosSettings;
    use crate::db::memory::MemoryStore;
    use crate::panels::incidents::{add_note, update_status};
    use crate::panels::zones::{self, NewDangerZone};
    use crate::sos::dispatch::{dispatch, SosRequest};
    use crate::sos::location::ReportedPosition;
    use chrono::Duration;
    use serde_json::json;
    use uuid::Uuid;

    async fn raise(store: &MemoryStore, alert_type: AlertType, at: DateTime<Utc>) -> Uuid {
        let request = SosRequest {
            alert_type,
            ..SosRequest::manual(Uuid::new_v4())
        };
        dispatch(
            store,
            &SosSettings::default(),
            request,
            &ReportedPosition::new(None, false),
            at,
        )
        .await
        .unwrap()
        .alert_id
    }

    #[tokio::test]
    async fn counts_statuses_and_averages_response() {
        let store = MemoryStore::new();
        let start = Utc::now() - Duration::hours(1);

        let first = raise(&store, AlertType::Manual, start).await;
        let second = raise(&store, AlertType::IotTrigger, start).await;
        raise(&store, AlertType::Manual, start).await;

        update_status(&store, first, AlertStatus::InProgress, start + Duration::minutes(6))
            .await
            .unwrap();
        update_status(&store, second, AlertStatus::Resolved, start + Duration::minutes(11))
            .await
            .unwrap();

        zones::create(
            &store,
            NewDangerZone {
                name: "Gare du Nord at night".into(),
                description: None,
                coordinates: json!({ "lat": 48.8809, "lng": 2.3553 }),
                risk_level: Some(RiskLevel::High),
                created_by: None,
            },
            Utc::now(),
        )
        .await
        .unwrap();

        let summary = incident_analytics(&store, 50, &AnalyticsQuery::default())
            .await
            .unwrap();
        assert_eq!(
            summary,
            IncidentAnalytics {
                total_incidents: 3,
                resolved: 1,
                in_progress: 1,
                pending: 1,
                manual_triggers: 2,
                device_triggers: 1,
                average_response_minutes: Some(8.5),
                high_risk_zones: 1,
            }
        );
    }

    #[tokio::test]
    async fn filters_narrow_the_summary() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let noted = raise(&store, AlertType::Manual, now).await;
        raise(&store, AlertType::IotTrigger, now).await;
        add_note(&store, noted, "Officer Martin", "Pickpocketing near Louvre", now)
            .await
            .unwrap();

        let devices = AnalyticsQuery {
            alert_type: Filter::Only(AlertType::IotTrigger),
            ..Default::default()
        };
        let summary = incident_analytics(&store, 50, &devices).await.unwrap();
        assert_eq!(summary.total_incidents, 1);
        assert_eq!(summary.device_triggers, 1);
        assert_eq!(summary.average_response_minutes, None);

        let search = AnalyticsQuery {
            search: "louvre".into(),
            status: Filter::Only(AlertStatus::Pending),
            ..Default::default()
        };
        assert_eq!(
            incident_analytics(&store, 50, &search).await.unwrap().total_incidents,
            1
        );
    }
}
