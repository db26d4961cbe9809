use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_text, text_enum};

text_enum! {
    Role as "role" {
        Tourist => "tourist",
        Admin => "admin",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub nationality: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: String,
    pub kyc_document_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Profile {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: Option<String> = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            nationality: row.try_get("nationality")?,
            phone: row.try_get("phone")?,
            emergency_contact: row.try_get("emergency_contact")?,
            kyc_document_number: row.try_get("kyc_document_number")?,
            profile_image_url: row.try_get("profile_image_url")?,
            // NULL role is treated as a tourist, matching the column default
            role: match role {
                Some(r) => decode_text(r)?,
                None => Role::Tourist,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
