use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::danger_zone::DangerZone;
use crate::models::digital_id::DigitalTouristId;
use crate::models::efir::EfirReport;
use crate::models::profile::{Profile, Role};
use crate::models::sos_alert::SosAlert;

pub mod memory;
pub mod postgres;
pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Record collections held by the backend.
///
/// Reads order by `created_at`, newest first. Writes trust the backend for
/// referential checks.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn insert_profile(&self, profile: &Profile) -> Result<(), sqlx::Error>;
    async fn profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error>;
    async fn list_profiles(&self, role: Role) -> Result<Vec<Profile>, sqlx::Error>;

    async fn insert_digital_id(&self, id: &DigitalTouristId) -> Result<(), sqlx::Error>;
    async fn digital_id_by_user(&self, user_id: Uuid)
        -> Result<Option<DigitalTouristId>, sqlx::Error>;
    async fn digital_id_by_code(&self, code: &str)
        -> Result<Option<DigitalTouristId>, sqlx::Error>;
    async fn list_digital_ids(&self) -> Result<Vec<DigitalTouristId>, sqlx::Error>;

    /// Writes an alert and the report derived from it as one unit: the
    /// alert first, then the report. Neither is visible if either fails.
    async fn file_sos(&self, alert: &SosAlert, report: &EfirReport) -> Result<(), sqlx::Error>;
    async fn alert_by_id(&self, id: Uuid) -> Result<Option<SosAlert>, sqlx::Error>;
    async fn list_alerts(&self, limit: i64) -> Result<Vec<SosAlert>, sqlx::Error>;
    async fn update_alert_status(&self, alert: &SosAlert) -> Result<(), sqlx::Error>;
    /// Appends one line to the alert's notes in a single write. `None` when
    /// the alert does not exist.
    async fn append_alert_note(&self, id: Uuid, entry: &str)
        -> Result<Option<SosAlert>, sqlx::Error>;

    async fn list_efir(&self, user_id: Option<Uuid>) -> Result<Vec<EfirReport>, sqlx::Error>;

    async fn list_danger_zones(&self, active_only: bool) -> Result<Vec<DangerZone>, sqlx::Error>;
    async fn insert_danger_zone(&self, zone: &DangerZone) -> Result<(), sqlx::Error>;
}
