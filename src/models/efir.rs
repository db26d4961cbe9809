use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_text, text_enum};

text_enum! {
    EfirStatus as "e-fir status" {
        Filed => "filed",
        UnderInvestigation => "under_investigation",
        Closed => "closed",
    }
}

/// Electronic First Information Report raised from an SOS alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfirReport {
    pub id: Uuid,
    pub sos_alert_id: Uuid,
    pub fir_number: String,
    pub blockchain_hash: String,
    pub police_station: Option<String>,
    pub officer_assigned: Option<String>,
    pub incident_details: String,
    pub status: EfirStatus,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for EfirReport {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: Option<String> = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            sos_alert_id: row.try_get("sos_alert_id")?,
            fir_number: row.try_get("fir_number")?,
            blockchain_hash: row.try_get("blockchain_hash")?,
            police_station: row.try_get("police_station")?,
            officer_assigned: row.try_get("officer_assigned")?,
            incident_details: row.try_get("incident_details")?,
            status: status.map(decode_text).transpose()?.unwrap_or(EfirStatus::Filed),
            pdf_url: row.try_get("pdf_url")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
