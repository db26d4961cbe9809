use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub destinations: Vec<String>,
    pub duration: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitalTouristId {
    pub id: Uuid,
    pub user_id: Uuid,
    pub digital_id: String,
    pub blockchain_hash: String,
    pub expiry_date: NaiveDate,
    pub itinerary: Option<Itinerary>,
    pub qr_code_url: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validity of an ID on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStatus {
    Active,
    Expired,
}

impl IdStatus {
    pub fn label(&self) -> &'static str {
        match self {
            IdStatus::Active => "Active",
            IdStatus::Expired => "Expired",
        }
    }
}

impl DigitalTouristId {
    /// An ID stays active through its expiry date and expires the day after.
    pub fn status_on(&self, today: NaiveDate) -> IdStatus {
        if self.expiry_date < today {
            IdStatus::Expired
        } else {
            IdStatus::Active
        }
    }
}

impl<'r> FromRow<'r, PgRow> for DigitalTouristId {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let itinerary: Option<Json<Itinerary>> = row.try_get("itinerary")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            digital_id: row.try_get("digital_id")?,
            blockchain_hash: row.try_get("blockchain_hash")?,
            expiry_date: row.try_get("expiry_date")?,
            itinerary: itinerary.map(|j| j.0),
            qr_code_url: row.try_get("qr_code_url")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_expiring(expiry: NaiveDate) -> DigitalTouristId {
        DigitalTouristId {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            digital_id: "TG1".into(),
            blockchain_hash: "0x00".into(),
            expiry_date: expiry,
            itinerary: None,
            qr_code_url: None,
            status: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expired_only_after_expiry_date() {
        let expiry = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let id = id_expiring(expiry);

        assert_eq!(id.status_on(expiry.pred_opt().unwrap()), IdStatus::Active);
        assert_eq!(id.status_on(expiry), IdStatus::Active);
        assert_eq!(id.status_on(expiry.succ_opt().unwrap()), IdStatus::Expired);
        assert_eq!(IdStatus::Expired.label(), "Expired");
    }
}
