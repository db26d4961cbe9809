use serde::{Deserialize, Deserializer};
use tracing::warn;
use uuid::Uuid;

use super::location::Coordinates;
use super::sos_alert::Severity;

/// SOS trigger published by a wearable or IoT panic device.
#[derive(Debug, Deserialize)]
pub struct DeviceSosMessage {
    pub data: Data,
    #[serde(default)]
    pub metadata: Metadata,
    pub uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Data {
    #[serde(rename = "USER_ID")]
    pub user_id: Option<String>,
    #[serde(rename = "DEVICE_ID")]
    pub device_id: Option<String>,
    #[serde(rename = "LATITUD", default, deserialize_with = "parse_f64_option")]
    pub latitude: Option<f64>,
    #[serde(rename = "LONGITUD", default, deserialize_with = "parse_f64_option")]
    pub longitude: Option<f64>,
    #[serde(rename = "SEVERITY")]
    pub severity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    #[serde(rename = "USER_ID")]
    pub user_id: Option<String>,
}

impl DeviceSosMessage {
    pub fn get_user_id(&self) -> Option<Uuid> {
        self.data
            .user_id
            .as_deref()
            .or(self.metadata.user_id.as_deref())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
    }

    /// Both coordinates are needed; a lone latitude or longitude is dropped.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.data.latitude, self.data.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.data
            .severity
            .as_deref()
            .and_then(|s| s.trim().to_lowercase().parse().ok())
    }
}

/// Unreadable coordinates become `None` so the alert still goes out.
fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            match s.parse::<f64>() {
                Ok(f) => Ok(Some(f)),
                Err(e) => {
                    warn!("Ignoring unreadable coordinate '{}': {}", s, e);
                    Ok(None)
                }
            }
        }
        None => Ok(None),
    }
}
