use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::Filter;
use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::sos_alert::{AlertStatus, Severity, SosAlert};

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertQuery {
    pub status: Filter<AlertStatus>,
    pub severity: Filter<Severity>,
}

impl AlertQuery {
    pub fn matches(&self, alert: &SosAlert) -> bool {
        self.status.matches(&alert.status) && self.severity.matches(&alert.severity)
    }
}

/// Most recent alerts, capped at `limit`, narrowed by `query`.
pub async fn list_alerts(
    store: &dyn Store,
    limit: i64,
    query: &AlertQuery,
) -> AppResult<Vec<SosAlert>> {
    let alerts = store.list_alerts(limit).await?;
    Ok(alerts.into_iter().filter(|a| query.matches(a)).collect())
}

pub async fn update_status(
    store: &dyn Store,
    id: Uuid,
    status: AlertStatus,
    now: DateTime<Utc>,
) -> AppResult<SosAlert> {
    let mut alert = store
        .alert_by_id(id)
        .await?
        .ok_or(AppError::NotFound("SOS alert"))?;

    alert.transition(status, now);
    store.update_alert_status(&alert).await?;

    info!("SOS alert {} moved to {}", id, status);
    Ok(alert)
}

/// Appends an investigation note, stamped with time and author.
pub async fn add_note(
    store: &dyn Store,
    id: Uuid,
    author: &str,
    note: &str,
    now: DateTime<Utc>,
) -> AppResult<SosAlert> {
    let note = note.trim();
    if note.is_empty() {
        return Err(AppError::Validation("Please enter a note.".to_string()));
    }

    let author = match author.trim() {
        "" => "Admin",
        name => name,
    };
    let entry = format!("[{}] {}: {}", now.format("%H:%M"), author, note);

    let alert = store
        .append_alert_note(id, &entry)
        .await?
        .ok_or(AppError::NotFound("SOS alert"))?;
    info!("Note added to SOS alert {} by {}", id, author);
    Ok(alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SosSettings;
    use crate::db::memory::MemoryStore;
    use crate::sos::dispatch::{dispatch, SosRequest};
    use crate::sos::location::ReportedPosition;
    use chrono::TimeZone;

    async fn raise(store: &MemoryStore, severity: Severity) -> Uuid {
        let request = SosRequest {
            severity,
            ..SosRequest::manual(Uuid::new_v4())
        };
        dispatch(
            store,
            &SosSettings::default(),
            request,
            &ReportedPosition::new(None, false),
            Utc::now(),
        )
        .await
        .unwrap()
        .alert_id
    }

    #[tokio::test]
    async fn status_filter_returns_only_matching_alerts() {
        let store = MemoryStore::new();
        let first = raise(&store, Severity::Critical).await;
        raise(&store, Severity::High).await;
        raise(&store, Severity::Critical).await;

        update_status(&store, first, AlertStatus::InProgress, Utc::now())
            .await
            .unwrap();

        let query = AlertQuery {
            status: Filter::Only(AlertStatus::Pending),
            ..Default::default()
        };
        let pending = list_alerts(&store, 50, &query).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|a| a.status == AlertStatus::Pending));

        let query = AlertQuery {
            status: Filter::Only(AlertStatus::Pending),
            severity: Filter::Only(Severity::Critical),
        };
        assert_eq!(list_alerts(&store, 50, &query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolving_stamps_resolution_time() {
        let store = MemoryStore::new();
        let id = raise(&store, Severity::Critical).await;
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();

        let resolved = update_status(&store, id, AlertStatus::Resolved, at).await.unwrap();
        assert_eq!(resolved.resolved_at, Some(at));

        let stored = store.alert_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, AlertStatus::Resolved);
        assert_eq!(stored.resolved_at, Some(at));
    }

    #[tokio::test]
    async fn unknown_alert_is_not_found() {
        let store = MemoryStore::new();
        let err = update_status(&store, Uuid::new_v4(), AlertStatus::Resolved, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn notes_append_with_time_and_author() {
        let store = MemoryStore::new();
        let id = raise(&store, Severity::High).await;
        let first = Utc.with_ymd_and_hms(2024, 1, 15, 9, 5, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 15, 10, 40, 0).unwrap();

        add_note(&store, id, "Officer Patel", "Unit dispatched", first)
            .await
            .unwrap();
        let alert = add_note(&store, id, "", "Tourist located", second).await.unwrap();

        assert_eq!(
            alert.notes.as_deref(),
            Some("[09:05] Officer Patel: Unit dispatched\n[10:40] Admin: Tourist located")
        );
        let stored = store.alert_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.notes, alert.notes);
    }

    #[tokio::test]
    async fn concurrent_notes_are_both_kept() {
        let store = MemoryStore::new();
        let id = raise(&store, Severity::High).await;
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap();

        let (a, b) = tokio::join!(
            add_note(&store, id, "Officer Patel", "Checking CCTV", at),
            add_note(&store, id, "Officer Dubois", "Calling hotel", at),
        );
        a.unwrap();
        b.unwrap();

        let notes = store.alert_by_id(id).await.unwrap().unwrap().notes.unwrap();
        assert_eq!(notes.lines().count(), 2);
        assert!(notes.contains("[11:00] Officer Patel: Checking CCTV"));
        assert!(notes.contains("[11:00] Officer Dubois: Calling hotel"));
    }

    #[tokio::test]
    async fn note_on_unknown_alert_is_not_found() {
        let store = MemoryStore::new();
        let err = add_note(&store, Uuid::new_v4(), "Admin", "Anyone?", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn blank_note_is_rejected_without_a_write() {
        let store = MemoryStore::new();
        let id = raise(&store, Severity::High).await;
        let before = store.writes().await.len();

        let err = add_note(&store, id, "Admin", "   ", Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.writes().await.len(), before);
    }
}
