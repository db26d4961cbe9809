use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_text, text_enum};

text_enum! {
    RiskLevel as "risk level" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerZone {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub coordinates: Value,
    pub risk_level: RiskLevel,
    pub active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for DangerZone {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let coordinates: Json<Value> = row.try_get("coordinates")?;
        let risk_level: Option<String> = row.try_get("risk_level")?;
        let active: Option<bool> = row.try_get("active")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            coordinates: coordinates.0,
            risk_level: risk_level.map(decode_text).transpose()?.unwrap_or(RiskLevel::Medium),
            active: active.unwrap_or(true),
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
