//! Configuration module for belssb-meter
//!
//! This module provides configuration management including:
//! - Config file location (working directory or platform config dir)
//! - Per-source layers (CLI flags, `BELSSB_*` env vars, YAML file)
//! - Merging into typed settings

pub mod layer;
pub mod paths;
pub mod settings;

pub use layer::ConfigLayer;
pub use paths::ConfigPaths;
pub use settings::Settings;
