use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::location::AlertLocation;
use super::{decode_text, text_enum};

text_enum! {
    AlertStatus as "alert status" {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
    }
}

text_enum! {
    Severity as "severity" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

text_enum! {
    /// How the alert was raised.
    AlertType as "alert type" {
        Manual => "manual",
        IotTrigger => "iot_trigger",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub digital_id: Option<String>,
    pub location: Option<AlertLocation>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub status: AlertStatus,
    pub notes: Option<String>,
    pub response_time: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SosAlert {
    /// Applies a status change, stamping the response or resolution time.
    pub fn transition(&mut self, status: AlertStatus, at: DateTime<Utc>) {
        self.status = status;
        self.response_time = (status == AlertStatus::InProgress).then_some(at);
        self.resolved_at = (status == AlertStatus::Resolved).then_some(at);
    }
}

impl<'r> FromRow<'r, PgRow> for SosAlert {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let location: Option<Json<AlertLocation>> = row.try_get("location")?;
        let alert_type: Option<String> = row.try_get("alert_type")?;
        let severity: Option<String> = row.try_get("severity")?;
        let status: Option<String> = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            digital_id: row.try_get("digital_id")?,
            location: location.map(|j| j.0),
            alert_type: alert_type.map(decode_text).transpose()?.unwrap_or(AlertType::Manual),
            severity: severity.map(decode_text).transpose()?.unwrap_or(Severity::Critical),
            status: status.map(decode_text).transpose()?.unwrap_or(AlertStatus::Pending),
            notes: row.try_get("notes")?,
            response_time: row.try_get("response_time")?,
            resolved_at: row.try_get("resolved_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
