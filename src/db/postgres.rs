use async_trait::async_trait;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use super::{queries, DbPool, Store};
use crate::models::danger_zone::DangerZone;
use crate::models::digital_id::DigitalTouristId;
use crate::models::efir::EfirReport;
use crate::models::profile::{Profile, Role};
use crate::models::sos_alert::SosAlert;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), sqlx::Error> {
        sqlx::query(queries::INSERT_PROFILE)
            .bind(profile.id)
            .bind(profile.user_id)
            .bind(&profile.name)
            .bind(&profile.nationality)
            .bind(&profile.phone)
            .bind(&profile.emergency_contact)
            .bind(&profile.kyc_document_number)
            .bind(&profile.profile_image_url)
            .bind(profile.role.as_str())
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_PROFILE_BY_USER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_profiles(&self, role: Role) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_PROFILES_BY_ROLE)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await
    }

    async fn insert_digital_id(&self, id: &DigitalTouristId) -> Result<(), sqlx::Error> {
        sqlx::query(queries::INSERT_DIGITAL_ID)
            .bind(id.id)
            .bind(id.user_id)
            .bind(&id.digital_id)
            .bind(&id.blockchain_hash)
            .bind(id.expiry_date)
            .bind(id.itinerary.as_ref().map(Json))
            .bind(&id.qr_code_url)
            .bind(&id.status)
            .bind(id.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn digital_id_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<DigitalTouristId>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_DIGITAL_ID_BY_USER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn digital_id_by_code(
        &self,
        code: &str,
    ) -> Result<Option<DigitalTouristId>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_DIGITAL_ID_BY_CODE)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_digital_ids(&self) -> Result<Vec<DigitalTouristId>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_DIGITAL_IDS)
            .fetch_all(&self.pool)
            .await
    }

    async fn file_sos(&self, alert: &SosAlert, report: &EfirReport) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(queries::INSERT_SOS_ALERT)
            .bind(alert.id)
            .bind(alert.user_id)
            .bind(&alert.digital_id)
            .bind(alert.location.as_ref().map(Json))
            .bind(alert.alert_type.as_str())
            .bind(alert.severity.as_str())
            .bind(alert.status.as_str())
            .bind(&alert.notes)
            .bind(alert.response_time)
            .bind(alert.resolved_at)
            .bind(alert.created_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query(queries::INSERT_E_FIR_REPORT)
            .bind(report.id)
            .bind(report.sos_alert_id)
            .bind(&report.fir_number)
            .bind(&report.blockchain_hash)
            .bind(&report.police_station)
            .bind(&report.officer_assigned)
            .bind(&report.incident_details)
            .bind(report.status.as_str())
            .bind(&report.pdf_url)
            .bind(report.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Filed alert {} with E-FIR {}", alert.id, report.fir_number);
        Ok(())
    }

    async fn alert_by_id(&self, id: Uuid) -> Result<Option<SosAlert>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_SOS_ALERT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_alerts(&self, limit: i64) -> Result<Vec<SosAlert>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_RECENT_SOS_ALERTS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_alert_status(&self, alert: &SosAlert) -> Result<(), sqlx::Error> {
        sqlx::query(queries::UPDATE_SOS_ALERT_STATUS)
            .bind(alert.id)
            .bind(alert.status.as_str())
            .bind(alert.response_time)
            .bind(alert.resolved_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn append_alert_note(
        &self,
        id: Uuid,
        entry: &str,
    ) -> Result<Option<SosAlert>, sqlx::Error> {
        sqlx::query_as(queries::APPEND_SOS_ALERT_NOTE)
            .bind(id)
            .bind(entry)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_efir(&self, user_id: Option<Uuid>) -> Result<Vec<EfirReport>, sqlx::Error> {
        match user_id {
            Some(user_id) => {
                sqlx::query_as(queries::SELECT_E_FIR_REPORTS_FOR_USER)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as(queries::SELECT_E_FIR_REPORTS)
                    .fetch_all(&self.pool)
                    .await
            }
        }
    }

    async fn list_danger_zones(&self, active_only: bool) -> Result<Vec<DangerZone>, sqlx::Error> {
        sqlx::query_as(queries::SELECT_DANGER_ZONES)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await
    }

    async fn insert_danger_zone(&self, zone: &DangerZone) -> Result<(), sqlx::Error> {
        sqlx::query(queries::INSERT_DANGER_ZONE)
            .bind(zone.id)
            .bind(&zone.name)
            .bind(&zone.description)
            .bind(Json(&zone.coordinates))
            .bind(zone.risk_level.as_str())
            .bind(zone.active)
            .bind(zone.created_by)
            .bind(zone.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
