use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::profile::{Profile, Role};

pub const MISSING_FIELDS: &str = "Please fill in all required fields.";

/// Tourist sign-up form. Credentials stay with the auth provider; `user_id`
/// is the id it assigned, when known.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub emergency_contact: String,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub preferred_language: Option<String>,
    pub kyc_document_number: Option<String>,
}

impl RegistrationForm {
    pub fn validate(&self) -> AppResult<()> {
        let required = [&self.name, &self.email, &self.phone, &self.emergency_contact];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::Validation(MISSING_FIELDS.to_string()));
        }
        Ok(())
    }

    pub fn preferred_language(&self) -> &str {
        self.preferred_language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or("English")
    }
}

pub async fn register(
    store: &dyn Store,
    form: RegistrationForm,
    now: DateTime<Utc>,
) -> AppResult<Profile> {
    form.validate()?;

    let profile = Profile {
        id: Uuid::new_v4(),
        user_id: form.user_id.unwrap_or_else(Uuid::new_v4),
        name: form.name.trim().to_string(),
        nationality: form.nationality.clone(),
        phone: Some(form.phone.trim().to_string()),
        emergency_contact: form.emergency_contact.trim().to_string(),
        kyc_document_number: form.kyc_document_number.clone(),
        profile_image_url: None,
        role: Role::Tourist,
        created_at: now,
        updated_at: now,
    };

    store.insert_profile(&profile).await?;
    info!(
        "Registered tourist {} (language: {})",
        profile.user_id,
        form.preferred_language()
    );

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn complete_form() -> RegistrationForm {
        RegistrationForm {
            name: "Sarah Johnson".into(),
            email: "sarah.j@email.com".into(),
            phone: "+1-555-0123".into(),
            emergency_contact: "+1-555-0456".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_required_field_blocks_write() {
        let store = MemoryStore::new();
        let form = RegistrationForm {
            emergency_contact: "  ".into(),
            ..complete_form()
        };

        let err = register(&store, form, Utc::now()).await.unwrap_err();

        assert_eq!(err.to_string(), MISSING_FIELDS);
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn complete_form_creates_tourist_profile() {
        let store = MemoryStore::new();

        let profile = register(&store, complete_form(), Utc::now()).await.unwrap();

        assert_eq!(profile.role, Role::Tourist);
        assert_eq!(profile.phone.as_deref(), Some("+1-555-0123"));
        let stored = store.profile_by_user(profile.user_id).await.unwrap();
        assert!(stored.is_some());
    }

    #[test]
    fn language_defaults_to_english() {
        assert_eq!(complete_form().preferred_language(), "English");
    }
}
