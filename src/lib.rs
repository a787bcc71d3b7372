//! belssb-meter - submit electricity meter readings to BELSSB
//!
//! This library provides the core functionality behind the `belssb-submit`
//! command. It resolves configuration, validates readings against the
//! tariff, and drives a Playwright-controlled Chromium through the
//! third-party form widget on the utility's site.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Config file lookup, per-source layers and merged settings
//! - `error`: Custom error types and exit codes
//! - `models`: Tariffs, validated readings and the form payload
//! - `period`: Billing period cutoff check
//! - `browser`: Playwright script generation, execution and success detection
//! - `discover`: Form structure discovery
//! - `cli`: Command handlers
//! - `logging`: Tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use belssb_meter::browser::{submit_reading, BrowserOptions};
//! use belssb_meter::config::{ConfigLayer, Settings};
//!
//! let settings = Settings::resolve(cli_layer, ConfigLayer::from_env(), file_layer)?;
//! let reading = settings.reading()?;
//! let options = BrowserOptions::from_settings(&settings, false, false);
//! let submission = submit_reading(&reading, &settings.contact(), &options)?;
//! ```

pub mod browser;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod logging;
pub mod models;
pub mod period;

pub use error::{MeterError, MeterResult};
