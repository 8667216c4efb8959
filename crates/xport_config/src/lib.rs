//! Parsing and validation of `xport.toml` export run configuration.
//!
//! This crate reads the per-run configuration file and produces a strongly-typed
//! [`ExportConfig`] covering chained-run sharing, named lookups, and precision.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
