use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::{contains_ignore_case, Filter};
use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::digital_id::{DigitalTouristId, IdStatus};
use crate::models::profile::{Profile, Role};
use crate::models::text_enum;
use crate::services::digital_id::ScannedId;

text_enum! {
    /// Digital ID state of a registered tourist.
    IdState as "id status" {
        Active => "active",
        Expired => "expired",
        Missing => "none",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TouristSummary {
    #[serde(flatten)]
    pub profile: Profile,
    pub digital_id: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub id_state: IdState,
}

impl TouristSummary {
    pub fn new(profile: Profile, id: Option<&DigitalTouristId>, today: NaiveDate) -> Self {
        let id_state = match id.map(|d| d.status_on(today)) {
            Some(IdStatus::Active) => IdState::Active,
            Some(IdStatus::Expired) => IdState::Expired,
            None => IdState::Missing,
        };
        Self {
            profile,
            digital_id: id.map(|d| d.digital_id.clone()),
            expiry_date: id.map(|d| d.expiry_date),
            id_state,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TouristQuery {
    pub search: String,
    pub id_state: Filter<IdState>,
}

impl TouristQuery {
    pub fn matches(&self, tourist: &TouristSummary) -> bool {
        let p = &tourist.profile;
        let search = self.search.trim();
        let matches_search = contains_ignore_case(&p.name, search)
            || p.nationality.as_deref().is_some_and(|n| contains_ignore_case(n, search))
            || p.phone.as_deref().is_some_and(|n| contains_ignore_case(n, search));
        matches_search && self.id_state.matches(&tourist.id_state)
    }
}

pub async fn list_tourists(
    store: &dyn Store,
    query: &TouristQuery,
    today: NaiveDate,
) -> AppResult<Vec<TouristSummary>> {
    let profiles = store.list_profiles(Role::Tourist).await?;

    // newest ID per user wins
    let mut ids: HashMap<Uuid, DigitalTouristId> = HashMap::new();
    for id in store.list_digital_ids().await? {
        ids.entry(id.user_id).or_insert(id);
    }

    Ok(profiles
        .into_iter()
        .map(|p| {
            let id = ids.get(&p.user_id);
            TouristSummary::new(p, id, today)
        })
        .filter(|t| query.matches(t))
        .collect())
}

/// Resolves the tourist behind a scanned QR code.
pub async fn lookup_scanned(
    store: &dyn Store,
    scanned: &ScannedId,
    today: NaiveDate,
) -> AppResult<TouristSummary> {
    let id = store
        .digital_id_by_code(scanned.as_str())
        .await?
        .ok_or(AppError::NotFound("digital ID"))?;
    let profile = store
        .profile_by_user(id.user_id)
        .await?
        .ok_or(AppError::NotFound("tourist profile"))?;
    Ok(TouristSummary::new(profile, Some(&id), today))
}
