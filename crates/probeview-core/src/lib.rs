//! Probeview Core - configuration and coordinate formatting
//!
//! This crate provides the engine-independent pieces of Probeview:
//! - Viewer configuration and the sensor catalog (TOML)
//! - Coordinate formatting for the readout panel and exports

pub mod config;
pub mod coords;

pub use config::{ConfigError, SensorGeometry, SensorSpec, ViewerConfig, load_config};
pub use coords::{Axis, display_fields, export_string, parse_coordinate};
