//! Random-driven station simulator.
//!
//! Stands in for a charge point management backend. Status checks and
//! reboots take a random amount of time and have random outcomes; one demo
//! station (`ST001`) always reports an online station with a stuck connector
//! so the reboot flow can be exercised end to end.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use tracing::{debug, info};

use chargedesk_core::config::StationConfig;
use chargedesk_core::{ConnectorStatus, RebootRequest, RebootResponse, StationStatus};

use crate::backend::StationBackend;
use crate::error::StationError;

/// Station that always reports online with a stuck connector.
pub const DEMO_STATION_ID: &str = "ST001";

/// Share of seeded stations that start online.
const SEED_ONLINE_RATE: f64 = 0.75;
/// Share of lazily discovered stations that are online.
const DISCOVERED_ONLINE_RATE: f64 = 2.0 / 3.0;

static STATION_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ST[A-Z0-9]{3}$").expect("Invalid station id regex"));

/// Normalize user-typed station ids ("st001 " -> "ST001").
pub fn normalize_station_id(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Whether a normalized id looks like a station code.
pub fn is_station_id(id: &str) -> bool {
    STATION_ID_PATTERN.is_match(id)
}

/// In-memory simulator implementing [`StationBackend`].
pub struct MockStationService {
    stations: Mutex<HashMap<String, StationStatus>>,
    rng: Mutex<StdRng>,
    config: StationConfig,
}

impl MockStationService {
    /// Create a simulator seeded from the OS random source.
    pub fn new(config: StationConfig) -> Self {
        Self::from_rng(config, StdRng::from_os_rng())
    }

    /// Create a simulator with a fixed seed for reproducible runs.
    pub fn with_seed(config: StationConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: StationConfig, mut rng: StdRng) -> Self {
        let now = Utc::now();
        let stations = config
            .seed_station_ids
            .iter()
            .map(|raw| {
                let station_id = normalize_station_id(raw);
                let status = StationStatus {
                    station_id: station_id.clone(),
                    is_online: rng.random_bool(SEED_ONLINE_RATE),
                    connector_status: random_connector_status(&mut rng),
                    last_seen: now - ChronoDuration::minutes(rng.random_range(1..=60)),
                };
                (station_id, status)
            })
            .collect::<HashMap<_, _>>();

        info!(stations = stations.len(), "Station simulator seeded");

        Self {
            stations: Mutex::new(stations),
            rng: Mutex::new(rng),
            config,
        }
    }

    fn stations(&self) -> Result<MutexGuard<'_, HashMap<String, StationStatus>>, StationError> {
        self.stations
            .lock()
            .map_err(|e| StationError::StateUnavailable(format!("station lock poisoned: {}", e)))
    }

    fn rng(&self) -> Result<MutexGuard<'_, StdRng>, StationError> {
        self.rng
            .lock()
            .map_err(|e| StationError::StateUnavailable(format!("rng lock poisoned: {}", e)))
    }

    fn random_delay(&self, [min, max]: [u64; 2]) -> Result<Duration, StationError> {
        let millis = self.rng()?.random_range(min..=max.max(min));
        Ok(Duration::from_millis(millis))
    }
}

fn random_connector_status(rng: &mut StdRng) -> ConnectorStatus {
    ConnectorStatus::ALL[rng.random_range(0..ConnectorStatus::ALL.len())]
}

#[async_trait]
impl StationBackend for MockStationService {
    async fn check_station_status(
        &self,
        station_id: &str,
    ) -> Result<Option<StationStatus>, StationError> {
        let delay = self.random_delay(self.config.check_delay_ms)?;
        tokio::time::sleep(delay).await;

        let station_id = normalize_station_id(station_id);
        let now = Utc::now();
        let mut stations = self.stations()?;
        let mut rng = self.rng()?;

        if let Some(station) = stations.get_mut(&station_id) {
            if station_id == DEMO_STATION_ID {
                station.is_online = true;
                station.connector_status = ConnectorStatus::Stuck;
                station.last_seen = now;
            } else if rng.random_bool(self.config.status_drift_rate) {
                station.connector_status = random_connector_status(&mut rng);
                station.last_seen = now;
            }
            debug!(
                station_id = %station.station_id,
                online = station.is_online,
                connector = %station.connector_status,
                "Station status checked"
            );
            return Ok(Some(station.clone()));
        }

        if !is_station_id(&station_id) {
            debug!(station_id = %station_id, "Not a station id");
            return Ok(None);
        }

        let station = StationStatus {
            station_id: station_id.clone(),
            is_online: rng.random_bool(DISCOVERED_ONLINE_RATE),
            connector_status: random_connector_status(&mut rng),
            last_seen: now - ChronoDuration::minutes(rng.random_range(1..=30)),
        };
        stations.insert(station_id, station.clone());
        info!(
            station_id = %station.station_id,
            online = station.is_online,
            connector = %station.connector_status,
            "Discovered new station"
        );
        Ok(Some(station))
    }

    async fn reboot_station(&self, request: RebootRequest) -> Result<RebootResponse, StationError> {
        let delay = self.random_delay(self.config.reboot_delay_ms)?;
        tokio::time::sleep(delay).await;

        let station_id = normalize_station_id(&request.station_id);
        let mut stations = self.stations()?;

        let Some(station) = stations.get_mut(&station_id) else {
            info!(station_id = %station_id, "Reboot requested for unknown station");
            return Ok(RebootResponse {
                success: false,
                message: format!("Station {} not found", station_id),
                station_id,
            });
        };

        if !station.is_online {
            info!(station_id = %station_id, "Reboot refused, station offline");
            return Ok(RebootResponse {
                success: false,
                message: format!("Station {} is offline and cannot be rebooted", station_id),
                station_id,
            });
        }

        if self.rng()?.random_bool(self.config.reboot_success_rate) {
            station.connector_status = ConnectorStatus::Available;
            station.last_seen = Utc::now();
            info!(station_id = %station_id, reason = %request.reason, "Station rebooted");
            Ok(RebootResponse {
                success: true,
                message: format!("Station {} rebooted successfully", station_id),
                station_id,
            })
        } else {
            info!(station_id = %station_id, "Simulated reboot failure");
            Ok(RebootResponse {
                success: false,
                message: format!(
                    "Failed to reboot station {}. Please contact technical support.",
                    station_id
                ),
                station_id,
            })
        }
    }

    async fn list_stations(&self) -> Result<Vec<StationStatus>, StationError> {
        let mut all: Vec<StationStatus> = self.stations()?.values().cloned().collect();
        all.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        Ok(all)
    }
}
