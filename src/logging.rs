//! Tracing setup
//!
//! All diagnostics go to stderr so stdout only ever carries the result.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "belssb_meter=info";

/// Filter used by `--debug`
pub const DEBUG_FILTER: &str = "belssb_meter=debug";

/// Pick the filter directive for this run
pub fn filter_directive(debug: bool, rust_log: Option<&str>) -> String {
    match (debug, rust_log) {
        (true, _) => DEBUG_FILTER.to_string(),
        (false, Some(value)) if !value.trim().is_empty() => value.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global subscriber
pub fn init(debug: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::try_new(filter_directive(debug, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
