//! Resolved settings for belssb-meter
//!
//! Merges the command line, environment and config file layers with a fixed
//! precedence: CLI > env > file > default.

use std::fmt;

use tracing::debug;

use super::layer::ConfigLayer;
use crate::error::{MeterError, MeterResult};
use crate::models::{Contact, Reading, Tariff};

/// Address of the meter reading form
pub const DEFAULT_URL: &str = "https://www.belssb.ru/individuals/pokaz/";

/// Node.js executable looked up on `PATH`
pub const DEFAULT_NODE: &str = "node";

/// Fully merged configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub account: String,
    pub tariff: Tariff,
    pub day: Option<String>,
    pub night: Option<String>,
    pub peak: Option<String>,
    pub email: String,
    pub phone: String,
    pub url: String,
    pub node: String,
    pub node_path: Option<String>,
}

impl Settings {
    /// Merge the three sources, highest precedence first
    ///
    /// # Errors
    ///
    /// Returns [`MeterError::MissingAccount`] if no layer names an account and
    /// a validation error for an unknown tariff.
    pub fn resolve(cli: ConfigLayer, env: ConfigLayer, file: ConfigLayer) -> MeterResult<Self> {
        let merged = cli.normalized().or(env.normalized()).or(file.normalized());
        debug!(merged = ?merged.redacted(), "merged configuration layers");

        let account = merged
            .account
            .map(|a| a.trim().to_string())
            .ok_or(MeterError::MissingAccount)?;

        let tariff = match merged.tariff.as_deref() {
            Some(raw) => raw.parse::<Tariff>()?,
            None => Tariff::default(),
        };

        Ok(Self {
            account,
            tariff,
            day: merged.day,
            night: merged.night,
            peak: merged.peak,
            email: merged.email.unwrap_or_default(),
            phone: merged.phone.unwrap_or_default(),
            url: merged.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            node: merged.node.unwrap_or_else(|| DEFAULT_NODE.to_string()),
            node_path: merged.node_path,
        })
    }

    /// Validate the readings against the tariff
    pub fn reading(&self) -> MeterResult<Reading> {
        Reading::validate(
            self.account.as_str(),
            self.tariff,
            self.day.as_deref(),
            self.night.as_deref(),
            self.peak.as_deref(),
        )
    }

    pub fn contact(&self) -> Contact {
        Contact::new(self.email.as_str(), self.phone.as_str())
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: Option<&str>| value.unwrap_or("-").to_string();

        writeln!(f, "  Account:   {}", self.account)?;
        writeln!(f, "  Tariff:    {}", self.tariff)?;
        writeln!(f, "  Day:       {}", show(self.day.as_deref()))?;
        writeln!(f, "  Night:     {}", show(self.night.as_deref()))?;
        writeln!(f, "  Peak:      {}", show(self.peak.as_deref()))?;
        writeln!(
            f,
            "  Email:     {}",
            show(Some(self.email.as_str()).filter(|e| !e.is_empty()))
        )?;
        writeln!(f, "  Phone:     {}", mask_phone(&self.phone))?;
        writeln!(f, "  Form URL:  {}", self.url)?;
        writeln!(f, "  Node:      {}", self.node)?;
        write!(f, "  NODE_PATH: {}", show(self.node_path.as_deref()))
    }
}

/// Hide all but the last four digits
fn mask_phone(phone: &str) -> String {
    let digits = Contact::new("", phone).phone_digits();
    if digits.is_empty() {
        return "-".to_string();
    }
    let visible = digits.len().min(4);
    format!(
        "{}{}",
        "*".repeat(digits.len() - visible),
        &digits[digits.len() - visible..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(account: Option<&str>, tariff: Option<&str>, day: Option<&str>) -> ConfigLayer {
        ConfigLayer {
            account: account.map(String::from),
            tariff: tariff.map(String::from),
            day: day.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_precedence_cli_env_file() {
        let cli = layer(Some("cli"), None, None);
        let env = layer(Some("env"), Some("two-zone"), None);
        let file = layer(Some("file"), Some("three-zone"), Some("100"));

        let settings = Settings::resolve(cli, env, file).unwrap();
        assert_eq!(settings.account, "cli");
        assert_eq!(settings.tariff, Tariff::TwoZone);
        assert_eq!(settings.day.as_deref(), Some("100"));
    }

    #[test]
    fn test_env_beats_file() {
        let settings = Settings::resolve(
            ConfigLayer::default(),
            layer(Some("env"), None, Some("5")),
            layer(Some("file"), None, Some("6")),
        )
        .unwrap();
        assert_eq!(settings.account, "env");
        assert_eq!(settings.day.as_deref(), Some("5"));
    }

    #[test]
    fn test_blank_values_fall_through() {
        let settings = Settings::resolve(
            layer(Some(""), Some("  "), None),
            ConfigLayer::default(),
            layer(Some("file"), Some("three-zone"), None),
        )
        .unwrap();
        assert_eq!(settings.account, "file");
        assert_eq!(settings.tariff, Tariff::ThreeZone);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(
            layer(Some("1"), None, None),
            ConfigLayer::default(),
            ConfigLayer::default(),
        )
        .unwrap();
        assert_eq!(settings.tariff, Tariff::Single);
        assert_eq!(settings.email, "");
        assert_eq!(settings.phone, "");
        assert_eq!(settings.url, DEFAULT_URL);
        assert_eq!(settings.node, DEFAULT_NODE);
        assert_eq!(settings.node_path, None);
    }

    #[test]
    fn test_missing_account() {
        let err = Settings::resolve(
            ConfigLayer::default(),
            ConfigLayer::default(),
            layer(None, None, Some("1")),
        )
        .unwrap_err();
        assert!(matches!(err, MeterError::MissingAccount));
    }

    #[test]
    fn test_invalid_tariff() {
        let err = Settings::resolve(
            layer(Some("1"), None, None),
            layer(None, Some("four-zone"), None),
            ConfigLayer::default(),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_reading_uses_tariff() {
        let settings = Settings::resolve(
            layer(Some("1"), Some("two-zone"), Some("10")),
            ConfigLayer::default(),
            ConfigLayer::default(),
        )
        .unwrap();
        let err = settings.reading().unwrap_err();
        assert!(err.to_string().contains("--night"));
    }

    #[test]
    fn test_display_masks_phone() {
        let mut settings = Settings::resolve(
            layer(Some("42"), None, Some("10")),
            ConfigLayer::default(),
            ConfigLayer::default(),
        )
        .unwrap();
        settings.phone = "+7 912 345-67-89".into();

        let shown = settings.to_string();
        assert!(shown.contains("******6789"));
        assert!(!shown.contains("9123456789"));
        assert!(shown.contains("Account:   42"));
    }
}
