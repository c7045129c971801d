//! Core library for the Xweather polling adapter.
//!
//! This crate defines:
//! - Configuration handling for one adapter instance
//! - An HTTP client for the Xweather data API
//! - The refresh coordinator that aggregates the endpoint payloads into
//!   immutable snapshots
//! - Snapshot readers answering point queries with graceful degradation
//!
//! It is used by `xweather-cli`, but can also be reused by other binaries or
//! services embedding the adapter.

pub mod client;
pub mod condition;
pub mod config;
pub mod coordinator;
pub mod model;
pub mod pollutant;
pub mod reader;
pub mod units;

pub use client::{FetchError, WeatherApi, XweatherClient};
pub use config::Config;
pub use coordinator::{Coordinator, Published, RefreshState, UpdateError};
pub use model::{PayloadRecord, Period, Pollutant, Section, Snapshot};
pub use reader::{CURRENT_FIELDS, DAILY_FIELDS, FieldSpec, SnapshotReader};
pub use units::Units;

/// Integration identifier used in stable entity naming.
pub const DOMAIN: &str = "xweather";
