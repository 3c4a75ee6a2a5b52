//! Error types for the station backend.

use chargedesk_core::ChargeDeskError;

/// Errors from a station backend.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    #[error("station state unavailable: {0}")]
    StateUnavailable(String),
}

impl From<StationError> for ChargeDeskError {
    fn from(err: StationError) -> Self {
        ChargeDeskError::Station(err.to_string())
    }
}
