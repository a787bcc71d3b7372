//! One source of configuration values
//!
//! The command line, the environment and the YAML file each produce a
//! [`ConfigLayer`]; layers are stacked with [`ConfigLayer::or`].

use std::path::Path;

use serde::{de, Deserialize, Deserializer};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{MeterError, MeterResult};

/// Prefix shared by all environment variables
pub const ENV_PREFIX: &str = "BELSSB_";

/// Partially specified configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    /// Account / contract number
    #[serde(deserialize_with = "scalar")]
    pub account: Option<String>,
    /// Tariff spelling (`single`, `two-zone`, `three-zone`)
    #[serde(deserialize_with = "scalar")]
    pub tariff: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub day: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub night: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub peak: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub email: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub phone: Option<String>,
    /// Form page URL
    #[serde(deserialize_with = "scalar")]
    pub url: Option<String>,
    /// Node.js executable
    #[serde(deserialize_with = "scalar")]
    pub node: Option<String>,
    /// `NODE_PATH` for resolving the playwright package
    #[serde(deserialize_with = "scalar")]
    pub node_path: Option<String>,
}

impl ConfigLayer {
    /// Load the YAML config file
    ///
    /// A missing file yields an empty layer; an empty document too.
    pub fn load(path: &Path) -> MeterResult<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            MeterError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let layer = Self::from_yaml(&contents).map_err(|e| {
            MeterError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loaded config file");
        Ok(layer)
    }

    /// Parse a YAML document
    pub fn from_yaml(contents: &str) -> MeterResult<Self> {
        let has_content = contents.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#') && line != "---"
        });
        if !has_content {
            return Ok(Self::default());
        }

        let layer: Option<Self> = serde_yaml::from_str(contents)?;
        Ok(layer.unwrap_or_default().normalized())
    }

    /// Read `BELSSB_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }

    /// Build a layer from `(name, value)` pairs
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let slot = match name {
                "ACCOUNT" => &mut layer.account,
                "TARIFF" => &mut layer.tariff,
                "DAY" => &mut layer.day,
                "NIGHT" => &mut layer.night,
                "PEAK" => &mut layer.peak,
                "EMAIL" => &mut layer.email,
                "PHONE" => &mut layer.phone,
                "URL" => &mut layer.url,
                "NODE" => &mut layer.node,
                "NODE_PATH" => &mut layer.node_path,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        layer.normalized()
    }

    /// Fill every unset field from `lower`
    pub fn or(self, lower: Self) -> Self {
        Self {
            account: self.account.or(lower.account),
            tariff: self.tariff.or(lower.tariff),
            day: self.day.or(lower.day),
            night: self.night.or(lower.night),
            peak: self.peak.or(lower.peak),
            email: self.email.or(lower.email),
            phone: self.phone.or(lower.phone),
            url: self.url.or(lower.url),
            node: self.node.or(lower.node),
            node_path: self.node_path.or(lower.node_path),
        }
    }

    /// Copy with the contact details hidden, for logging
    pub fn redacted(&self) -> Self {
        let hide = |value: &Option<String>| value.as_ref().map(|_| "<redacted>".to_string());
        Self {
            email: hide(&self.email),
            phone: hide(&self.phone),
            ..self.clone()
        }
    }

    /// Treat blank strings as unset
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            account: keep(self.account),
            tariff: keep(self.tariff),
            day: keep(self.day),
            night: keep(self.night),
            peak: keep(self.peak),
            email: keep(self.email),
            phone: keep(self.phone),
            url: keep(self.url),
            node: keep(self.node),
            node_path: keep(self.node_path),
        }
    }
}

/// Accept strings and bare YAML numbers (`day: 12345`) alike
///
/// Numbers keep the text YAML resolved them to, so `1500.0` stays `1500.0`
/// and integers up to `u64::MAX` are not rounded through a float.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(de::Error::custom("expected a string or a number")),
    }
}
