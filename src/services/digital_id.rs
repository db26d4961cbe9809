use chrono::{DateTime, Days, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::codes::{random_hash, timestamped_code};
use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::digital_id::{DigitalTouristId, IdStatus, Itinerary};
use crate::models::profile::Profile;

/// Itinerary recorded when the tourist did not provide one.
pub fn default_itinerary(validity_days: i64) -> Itinerary {
    Itinerary {
        destinations: Vec::new(),
        duration: Some(format!("{validity_days} days")),
        purpose: Some("Tourism".to_string()),
    }
}

pub async fn issue(
    store: &dyn Store,
    user_id: Uuid,
    itinerary: Option<Itinerary>,
    validity_days: i64,
    now: DateTime<Utc>,
) -> AppResult<DigitalTouristId> {
    let days = u64::try_from(validity_days)
        .map_err(|_| AppError::Validation("Validity must not be negative.".to_string()))?;
    let expiry_date = now
        .date_naive()
        .checked_add_days(Days::new(days))
        .ok_or_else(|| AppError::Validation("Validity is out of range.".to_string()))?;

    let id = DigitalTouristId {
        id: Uuid::new_v4(),
        user_id,
        digital_id: timestamped_code("TG", now, 9),
        blockchain_hash: random_hash(),
        expiry_date,
        itinerary: Some(itinerary.unwrap_or_else(|| default_itinerary(validity_days))),
        qr_code_url: None,
        status: Some("active".to_string()),
        created_at: now,
    };

    store.insert_digital_id(&id).await?;
    info!("Issued digital ID {} for user {}", id.digital_id, user_id);

    Ok(id)
}

/// Returns the user's current ID, issuing one on first use.
pub async fn get_or_issue(
    store: &dyn Store,
    user_id: Uuid,
    validity_days: i64,
    now: DateTime<Utc>,
) -> AppResult<DigitalTouristId> {
    match store.digital_id_by_user(user_id).await? {
        Some(existing) => Ok(existing),
        None => issue(store, user_id, None, validity_days, now).await,
    }
}

/// Digital ID card as shown to the tourist.
#[derive(Debug, Serialize)]
pub struct IdCard {
    #[serde(flatten)]
    pub id: DigitalTouristId,
    pub validity: IdStatus,
    pub validity_label: &'static str,
}

impl IdCard {
    pub fn new(id: DigitalTouristId, now: DateTime<Utc>) -> Self {
        let validity = id.status_on(now.date_naive());
        Self {
            id,
            validity,
            validity_label: validity.label(),
        }
    }
}

/// JSON document encoded into the ID's QR code.
pub fn qr_payload(
    id: &DigitalTouristId,
    profile: Option<&Profile>,
    verification_base_url: &str,
    now: DateTime<Utc>,
) -> Value {
    json!({
        "digitalId": id.digital_id,
        "name": profile.map(|p| p.name.as_str()),
        "nationality": profile.and_then(|p| p.nationality.as_deref()),
        "verificationUrl": format!(
            "{}/verify/{}",
            verification_base_url.trim_end_matches('/'),
            id.digital_id
        ),
        "timestamp": now.to_rfc3339(),
    })
}

/// A digital ID read from a QR code and confirmed against the backend.
///
/// Screens that act on a scanned tourist take this value as an argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScannedId(String);

impl ScannedId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn scan(store: &dyn Store, code: &str) -> AppResult<(ScannedId, DigitalTouristId)> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::Validation("QR code is empty.".to_string()));
    }

    let record = store
        .digital_id_by_code(code)
        .await?
        .ok_or(AppError::NotFound("digital ID"))?;

    info!("Scanned digital ID {}", record.digital_id);
    Ok((ScannedId(record.digital_id.clone()), record))
}
