//! Submit command (the default action)
//!
//! Resolves configuration, validates the reading and drives the browser.

use std::path::PathBuf;

use clap::Args;
use tracing::{debug, warn};

use crate::browser::{submit_reading, BrowserOptions, Submission};
use crate::config::{ConfigLayer, ConfigPaths, Settings};
use crate::error::MeterResult;
use crate::models::Tariff;
use crate::period;

/// Flags shared by the default submit action and the `config` command
#[derive(Args, Debug, Clone, Default)]
pub struct SubmitArgs {
    /// Path to YAML config file (default: ./config.yaml, then the user config dir)
    #[arg(short, long, env = "BELSSB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Account / contract number (лицевой счёт). Overrides env and config.
    #[arg(short, long)]
    pub account: Option<String>,

    /// Tariff type. Overrides env and config.
    #[arg(short, long, value_enum)]
    pub tariff: Option<Tariff>,

    /// Показания общие (день) / day / semi-peak reading
    #[arg(short, long)]
    pub day: Option<String>,

    /// Показания ночь (night). Required for two-zone and three-zone.
    #[arg(short, long)]
    pub night: Option<String>,

    /// Показания пик (peak). Required for three-zone only.
    #[arg(short, long)]
    pub peak: Option<String>,

    /// Email for contact. Overrides env and config.
    #[arg(short, long)]
    pub email: Option<String>,

    /// Phone number (e.g. 9123456789). Overrides env and config.
    #[arg(long)]
    pub phone: Option<String>,

    /// Run browser in headed mode (visible window). Use if captcha appears.
    #[arg(long)]
    pub headed: bool,

    /// Do not warn when run after the 25th of the month
    #[arg(long)]
    pub no_warn_date: bool,

    /// Log frame URLs and form-field discovery to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

impl SubmitArgs {
    /// Values given on the command line
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            account: self.account.clone(),
            tariff: self.tariff.map(|t| t.as_str().to_string()),
            day: self.day.clone(),
            night: self.night.clone(),
            peak: self.peak.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            ..Default::default()
        }
    }

    /// Config file layer from `--config` or the default locations
    pub fn file_layer(&self) -> MeterResult<ConfigLayer> {
        let paths = ConfigPaths::resolve(self.config.as_deref());
        if paths.is_explicit() && !paths.exists() {
            warn!(path = %paths.config_file().display(), "config file not found");
        }
        ConfigLayer::load(paths.config_file())
    }

    /// Merge CLI, environment and config file
    pub fn settings(&self) -> MeterResult<Settings> {
        Settings::resolve(self.layer(), ConfigLayer::from_env(), self.file_layer()?)
    }
}

/// Handle the submit action
pub fn handle_submit(args: &SubmitArgs) -> MeterResult<Submission> {
    let settings = args.settings()?;
    let reading = settings.reading()?;
    debug!(account = %reading.account, tariff = %reading.tariff, "reading validated");

    if let Some(message) = period::cutoff_notice(period::today(), args.no_warn_date) {
        warn!("{}", message);
    }

    let options = BrowserOptions::from_settings(&settings, args.headed, args.debug);
    let submission = submit_reading(&reading, &settings.contact(), &options)?;

    println!("{}", submission.message);
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_layer() {
        let args = SubmitArgs {
            account: Some("123".into()),
            tariff: Some(Tariff::ThreeZone),
            day: Some("1".into()),
            ..Default::default()
        };

        let layer = args.layer();
        assert_eq!(layer.account.as_deref(), Some("123"));
        assert_eq!(layer.tariff.as_deref(), Some("three-zone"));
        assert_eq!(layer.night, None);
        assert_eq!(layer.url, None);
    }

    #[test]
    fn test_file_layer_from_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("meter.yaml");
        std::fs::write(&path, "account: '555'\ntariff: two-zone\n").unwrap();

        let args = SubmitArgs {
            config: Some(path),
            ..Default::default()
        };
        let layer = args.file_layer().unwrap();
        assert_eq!(layer.account.as_deref(), Some("555"));
        assert_eq!(layer.tariff.as_deref(), Some("two-zone"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("meter.yaml");
        std::fs::write(&path, "account: '555'\nday: 10\n").unwrap();

        let args = SubmitArgs {
            config: Some(path),
            account: Some("777".into()),
            ..Default::default()
        };
        let settings =
            Settings::resolve(args.layer(), ConfigLayer::default(), args.file_layer().unwrap())
                .unwrap();
        assert_eq!(settings.account, "777");
        assert_eq!(settings.day.as_deref(), Some("10"));
    }
}
