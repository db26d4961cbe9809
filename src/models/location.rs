use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location attached to an SOS alert, stored as JSON on the alert row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl From<Coordinates> for AlertLocation {
    fn from(c: Coordinates) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
            address: Some(format!("{:.6}, {:.6}", c.latitude, c.longitude)),
        }
    }
}
