//! Tariff schemes
//!
//! A tariff decides which meter zones must be reported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MeterError;

/// A single register of the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// General, day or semi-peak reading
    Day,
    /// Night reading
    Night,
    /// Peak reading
    Peak,
}

impl Zone {
    /// Command-line flag that supplies this zone
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Day => "--day",
            Self::Night => "--night",
            Self::Peak => "--peak",
        }
    }
}

/// Billing scheme of the meter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Tariff {
    /// One-zone tariff, day reading only
    #[default]
    Single,
    /// Day and night
    TwoZone,
    /// Day (semi-peak), night and peak
    ThreeZone,
}

impl Tariff {
    /// All tariffs, in display order
    pub const ALL: [Tariff; 3] = [Tariff::Single, Tariff::TwoZone, Tariff::ThreeZone];

    /// Canonical spelling used on the CLI, in env vars and in YAML
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::TwoZone => "two-zone",
            Self::ThreeZone => "three-zone",
        }
    }

    /// Zones that must be present for this tariff
    pub fn required_zones(&self) -> &'static [Zone] {
        match self {
            Self::Single => &[Zone::Day],
            Self::TwoZone => &[Zone::Day, Zone::Night],
            Self::ThreeZone => &[Zone::Day, Zone::Night, Zone::Peak],
        }
    }

    /// Whether the tariff requires the given zone
    pub fn requires(&self, zone: Zone) -> bool {
        self.required_zones().contains(&zone)
    }
}

impl fmt::Display for Tariff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tariff {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                MeterError::validation(format!(
                    "Invalid tariff: '{}'. Valid tariffs: single, two-zone, three-zone.",
                    s
                ))
            })
    }
}
