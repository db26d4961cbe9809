use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::danger_zone::{DangerZone, RiskLevel};

#[derive(Debug, Deserialize)]
pub struct NewDangerZone {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub coordinates: Value,
    pub risk_level: Option<RiskLevel>,
    pub created_by: Option<Uuid>,
}

pub async fn active(store: &dyn Store) -> AppResult<Vec<DangerZone>> {
    Ok(store.list_danger_zones(true).await?)
}

pub async fn create(
    store: &dyn Store,
    zone: NewDangerZone,
    now: DateTime<Utc>,
) -> AppResult<DangerZone> {
    let name = zone.name.trim();
    if name.is_empty() || zone.coordinates.is_null() {
        return Err(AppError::Validation(
            "Zone name and coordinates are required.".to_string(),
        ));
    }

    let zone = DangerZone {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: zone.description,
        coordinates: zone.coordinates,
        risk_level: zone.risk_level.unwrap_or(RiskLevel::Medium),
        active: true,
        created_by: zone.created_by,
        created_at: now,
    };
    store.insert_danger_zone(&zone).await?;

    info!("Danger zone '{}' created ({} risk)", zone.name, zone.risk_level);
    Ok(zone)
}
