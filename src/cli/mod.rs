//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the browser and config layers.

pub mod discover;
pub mod show;
pub mod submit;

pub use discover::{handle_discover_command, DiscoverArgs};
pub use show::handle_config_command;
pub use submit::{handle_submit, SubmitArgs};
