//! Station backend for ChargeDesk.
//!
//! Defines the `StationBackend` seam the chat tools call through and a
//! random-driven simulator standing in for real charge point control.

pub mod backend;
pub mod error;
pub mod mock;

pub use backend::StationBackend;
pub use error::StationError;
pub use mock::{is_station_id, normalize_station_id, MockStationService, DEMO_STATION_ID};
