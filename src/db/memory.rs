use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::models::danger_zone::DangerZone;
use crate::models::digital_id::DigitalTouristId;
use crate::models::efir::EfirReport;
use crate::models::profile::{Profile, Role};
use crate::models::sos_alert::SosAlert;

/// Only the most recent writes are kept.
const WRITE_LOG_CAP: usize = 1024;

/// One insert or update applied to a table, in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    pub table: &'static str,
    pub id: Uuid,
}

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    digital_ids: Vec<DigitalTouristId>,
    sos_alerts: Vec<SosAlert>,
    e_fir_reports: Vec<EfirReport>,
    danger_zones: Vec<DangerZone>,
    writes: VecDeque<WriteOp>,
}

impl Tables {
    fn record(&mut self, table: &'static str, id: Uuid) {
        if self.writes.len() == WRITE_LOG_CAP {
            self.writes.pop_front();
        }
        self.writes.push_back(WriteOp { table, id });
    }
}

/// In-process tables with the same ordering rules as [`super::postgres::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent writes, oldest first.
    pub async fn writes(&self) -> Vec<WriteOp> {
        self.tables.read().await.writes.iter().cloned().collect()
    }
}

fn newest_first<T, F>(mut rows: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    rows.sort_by_key(|r| std::cmp::Reverse(created_at(r)));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), sqlx::Error> {
        let mut t = self.tables.write().await;
        t.profiles.push(profile.clone());
        t.record("profiles", profile.id);
        Ok(())
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        let t = self.tables.read().await;
        Ok(t.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn list_profiles(&self, role: Role) -> Result<Vec<Profile>, sqlx::Error> {
        let t = self.tables.read().await;
        let rows = t.profiles.iter().filter(|p| p.role == role).cloned().collect();
        Ok(newest_first(rows, |p: &Profile| p.created_at))
    }

    async fn insert_digital_id(&self, id: &DigitalTouristId) -> Result<(), sqlx::Error> {
        let mut t = self.tables.write().await;
        t.digital_ids.push(id.clone());
        t.record("digital_tourist_ids", id.id);
        Ok(())
    }

    async fn digital_id_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<DigitalTouristId>, sqlx::Error> {
        let t = self.tables.read().await;
        let rows = t.digital_ids.iter().filter(|d| d.user_id == user_id).cloned().collect();
        Ok(newest_first(rows, |d: &DigitalTouristId| d.created_at).into_iter().next())
    }

    async fn digital_id_by_code(
        &self,
        code: &str,
    ) -> Result<Option<DigitalTouristId>, sqlx::Error> {
        let t = self.tables.read().await;
        Ok(t.digital_ids.iter().find(|d| d.digital_id == code).cloned())
    }

    async fn list_digital_ids(&self) -> Result<Vec<DigitalTouristId>, sqlx::Error> {
        let t = self.tables.read().await;
        Ok(newest_first(t.digital_ids.clone(), |d: &DigitalTouristId| d.created_at))
    }

    async fn file_sos(&self, alert: &SosAlert, report: &EfirReport) -> Result<(), sqlx::Error> {
        let mut t = self.tables.write().await;
        t.sos_alerts.push(alert.clone());
        t.record("sos_alerts", alert.id);
        t.e_fir_reports.push(report.clone());
        t.record("e_fir_reports", report.id);
        Ok(())
    }

    async fn alert_by_id(&self, id: Uuid) -> Result<Option<SosAlert>, sqlx::Error> {
        let t = self.tables.read().await;
        Ok(t.sos_alerts.iter().find(|a| a.id == id).cloned())
    }

    async fn list_alerts(&self, limit: i64) -> Result<Vec<SosAlert>, sqlx::Error> {
        let t = self.tables.read().await;
        let mut rows = newest_first(t.sos_alerts.clone(), |a: &SosAlert| a.created_at);
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn update_alert_status(&self, alert: &SosAlert) -> Result<(), sqlx::Error> {
        let mut t = self.tables.write().await;
        if let Some(row) = t.sos_alerts.iter_mut().find(|a| a.id == alert.id) {
            row.status = alert.status;
            row.response_time = alert.response_time;
            row.resolved_at = alert.resolved_at;
            t.record("sos_alerts", alert.id);
        }
        Ok(())
    }

    async fn append_alert_note(
        &self,
        id: Uuid,
        entry: &str,
    ) -> Result<Option<SosAlert>, sqlx::Error> {
        let mut t = self.tables.write().await;
        let Some(row) = t.sos_alerts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        row.notes = Some(match row.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{entry}"),
            _ => entry.to_string(),
        });
        let alert = row.clone();
        t.record("sos_alerts", id);
        Ok(Some(alert))
    }

    async fn list_efir(&self, user_id: Option<Uuid>) -> Result<Vec<EfirReport>, sqlx::Error> {
        let t = self.tables.read().await;
        let rows = t
            .e_fir_reports
            .iter()
            .filter(|r| match user_id {
                Some(user_id) => t
                    .sos_alerts
                    .iter()
                    .any(|a| a.id == r.sos_alert_id && a.user_id == user_id),
                None => true,
            })
            .cloned()
            .collect();
        Ok(newest_first(rows, |r: &EfirReport| r.created_at))
    }

    async fn list_danger_zones(&self, active_only: bool) -> Result<Vec<DangerZone>, sqlx::Error> {
        let t = self.tables.read().await;
        let rows = t
            .danger_zones
            .iter()
            .filter(|z| !active_only || z.active)
            .cloned()
            .collect();
        Ok(newest_first(rows, |z: &DangerZone| z.created_at))
    }

    async fn insert_danger_zone(&self, zone: &DangerZone) -> Result<(), sqlx::Error> {
        let mut t = self.tables.write().await;
        t.danger_zones.push(zone.clone());
        t.record("danger_zones", zone.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::danger_zone::RiskLevel;
    use chrono::Utc;
    use serde_json::json;

    fn zone(name: String) -> DangerZone {
        DangerZone {
            id: Uuid::new_v4(),
            name,
            description: None,
            coordinates: json!({ "lat": 48.8566, "lng": 2.3522 }),
            risk_level: RiskLevel::Low,
            active: true,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn write_log_keeps_only_recent_entries() {
        let store = MemoryStore::new();
        let mut last = Uuid::nil();
        for i in 0..WRITE_LOG_CAP + 10 {
            let zone = zone(format!("Zone {i}"));
            last = zone.id;
            store.insert_danger_zone(&zone).await.unwrap();
        }

        let writes = store.writes().await;
        assert_eq!(writes.len(), WRITE_LOG_CAP);
        assert_eq!(writes.last().map(|w| w.id), Some(last));
        assert_eq!(
            store.list_danger_zones(false).await.unwrap().len(),
            WRITE_LOG_CAP + 10
        );
    }
}
