//! The station backend seam.

use async_trait::async_trait;

use chargedesk_core::{RebootRequest, RebootResponse, StationStatus};

use crate::error::StationError;

/// Remote operations on charging stations.
///
/// Business failures (unknown station, offline station, failed restart) are
/// reported in-band through `None` or `RebootResponse::success`; `Err` is
/// reserved for the backend itself being unusable.
#[async_trait]
pub trait StationBackend: Send + Sync {
    /// Look up a station's current status. `None` if the id is not a station.
    async fn check_station_status(
        &self,
        station_id: &str,
    ) -> Result<Option<StationStatus>, StationError>;

    /// Attempt a remote restart of a station.
    async fn reboot_station(&self, request: RebootRequest) -> Result<RebootResponse, StationError>;

    /// Every station the backend knows about, sorted by id.
    async fn list_stations(&self) -> Result<Vec<StationStatus>, StationError>;
}
