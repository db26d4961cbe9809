use thiserror::Error;
use tracing::warn;

use crate::models::location::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    Denied,
    #[error("location unavailable")]
    Unavailable,
}

/// Position the device attached to its request, or the reason it has none.
#[derive(Debug, Clone, Copy)]
pub struct ReportedPosition(pub Result<Coordinates, LocationError>);

impl ReportedPosition {
    pub fn new(coordinates: Option<Coordinates>, denied: bool) -> Self {
        Self(match coordinates {
            Some(c) => Ok(c),
            None if denied => Err(LocationError::Denied),
            None => Err(LocationError::Unavailable),
        })
    }

    /// Out-of-range coordinates count as unavailable.
    pub fn current_position(&self) -> Result<Coordinates, LocationError> {
        let position = self.0?;
        let valid = (-90.0..=90.0).contains(&position.latitude)
            && (-180.0..=180.0).contains(&position.longitude);
        if valid {
            Ok(position)
        } else {
            Err(LocationError::Unavailable)
        }
    }
}

/// Never fails: any error becomes "no location".
pub fn locate_or_none(position: &ReportedPosition) -> Option<Coordinates> {
    match position.current_position() {
        Ok(position) => Some(position),
        Err(e) => {
            warn!("Sending SOS without location: {}", e);
            None
        }
    }
}
