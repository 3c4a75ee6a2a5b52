//! Shared configuration, errors, and domain types for ChargeDesk.

pub mod config;
pub mod error;
pub mod types;

pub use config::ChargeDeskConfig;
pub use error::{ChargeDeskError, Result};
pub use types::*;
