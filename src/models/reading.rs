//! Meter readings and the form payload built from them
//!
//! A [`Reading`] can only be constructed through [`Reading::validate`], so
//! every reading that reaches the browser already satisfies its tariff.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::tariff::{Tariff, Zone};
use crate::error::{MeterError, MeterResult};

/// Number of trailing phone digits the form accepts
const PHONE_DIGITS: usize = 10;

/// Country code sent alongside a phone number
const PHONE_COUNTRY: &str = "7";

/// A numeric meter register value
///
/// Keeps the trimmed text as entered; the form receives it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterValue(String);

impl MeterValue {
    /// Parse a reading, accepting `123`, `123.4`, `123,4`, `123.` and `.5`
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if is_numeric(trimmed) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// The value as entered (trimmed)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_numeric(s: &str) -> bool {
    let normalized = s.replace(',', ".");
    if normalized.is_empty() {
        return false;
    }
    if normalized.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    match normalized.split_once('.') {
        Some((int, frac)) => {
            !(int.is_empty() && frac.is_empty())
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// A validated submission for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub account: String,
    pub tariff: Tariff,
    pub day: MeterValue,
    pub night: Option<MeterValue>,
    pub peak: Option<MeterValue>,
}

impl Reading {
    /// Validate raw readings against the tariff
    ///
    /// Day is always required; night for two- and three-zone tariffs; peak
    /// for three-zone only. Zones the tariff does not use are dropped.
    pub fn validate(
        account: impl Into<String>,
        tariff: Tariff,
        day: Option<&str>,
        night: Option<&str>,
        peak: Option<&str>,
    ) -> MeterResult<Self> {
        let account = account.into();
        if account.trim().is_empty() {
            return Err(MeterError::MissingAccount);
        }

        let day = require(day, Zone::Day, tariff)?;
        let night = if tariff.requires(Zone::Night) {
            Some(require(night, Zone::Night, tariff)?)
        } else {
            None
        };
        let peak = if tariff.requires(Zone::Peak) {
            Some(require(peak, Zone::Peak, tariff)?)
        } else {
            None
        };

        Ok(Self {
            account: account.trim().to_string(),
            tariff,
            day,
            night,
            peak,
        })
    }

    /// Value for a zone, if this reading carries it
    pub fn value(&self, zone: Zone) -> Option<&MeterValue> {
        match zone {
            Zone::Day => Some(&self.day),
            Zone::Night => self.night.as_ref(),
            Zone::Peak => self.peak.as_ref(),
        }
    }
}

fn require(raw: Option<&str>, zone: Zone, tariff: Tariff) -> MeterResult<MeterValue> {
    raw.and_then(MeterValue::parse).ok_or_else(|| {
        let message = match zone {
            Zone::Day => "Missing or invalid --day (general/day/semi-peak reading).".to_string(),
            Zone::Night | Zone::Peak => format!(
                "Missing or invalid {} for {} tariff.",
                zone.flag(),
                tariff
            ),
        };
        MeterError::validation(message)
    })
}

/// Contact details attached to the submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn new(email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Last ten digits of the phone number, separators removed
    pub fn phone_digits(&self) -> String {
        let digits: Vec<char> = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        let start = digits.len().saturating_sub(PHONE_DIGITS);
        digits[start..].iter().collect()
    }

    /// Country code for the phone widget, empty without a phone
    pub fn phone_country(&self) -> &'static str {
        if self.phone_digits().is_empty() {
            ""
        } else {
            PHONE_COUNTRY
        }
    }
}

/// Field name to value map handed to the form filler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<&'static str, String>);

impl FormFields {
    pub const ACCOUNT: &'static str = "input-account";
    pub const DAY: &'static str = "c_day";
    pub const NIGHT: &'static str = "c_night";
    pub const PEAK: &'static str = "c_peak";
    pub const EMAIL: &'static str = "email";
    pub const PHONE: &'static str = "phone";
    pub const PHONE_COUNTRY: &'static str = "phoneCountry";

    /// Build the payload for a reading
    pub fn new(reading: &Reading, contact: &Contact) -> Self {
        let zone_value = |zone| {
            reading
                .value(zone)
                .map(|v| v.as_str().to_string())
                .unwrap_or_default()
        };

        let mut fields = BTreeMap::new();
        fields.insert(Self::ACCOUNT, reading.account.clone());
        fields.insert(Self::DAY, zone_value(Zone::Day));
        fields.insert(Self::NIGHT, zone_value(Zone::Night));
        fields.insert(Self::PEAK, zone_value(Zone::Peak));
        fields.insert(Self::EMAIL, contact.email.trim().to_string());
        fields.insert(Self::PHONE, contact.phone_digits());
        fields.insert(Self::PHONE_COUNTRY, contact.phone_country().to_string());
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of fields that will actually be written
    pub fn non_empty(&self) -> usize {
        self.0.values().filter(|v| !v.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_value_accepts() {
        for input in ["12345", " 12345 ", "123.4", "123,4", "12.", ".5", "0012,5"] {
            assert!(MeterValue::parse(input).is_some(), "{input:?} should parse");
        }
        assert_eq!(MeterValue::parse(" 12,5 ").unwrap().as_str(), "12,5");
    }

    #[test]
    fn test_meter_value_rejects() {
        for input in ["", "   ", ".", "-1", "1e3", "1.2.3", "1,2.3", "12a", "١٢"] {
            assert!(MeterValue::parse(input).is_none(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_single_requires_day_only() {
        let reading =
            Reading::validate("1234", Tariff::Single, Some("100"), Some("x"), None).unwrap();
        assert_eq!(reading.day.as_str(), "100");
        assert!(reading.night.is_none());
        assert!(reading.peak.is_none());
    }

    #[test]
    fn test_missing_day() {
        let err = Reading::validate("1234", Tariff::Single, None, None, None).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("--day"));
    }

    #[test]
    fn test_two_zone_requires_night() {
        let err =
            Reading::validate("1234", Tariff::TwoZone, Some("100"), None, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing or invalid --night for two-zone tariff."
        );

        let reading =
            Reading::validate("1234", Tariff::TwoZone, Some("100"), Some("50"), Some("9"))
                .unwrap();
        assert_eq!(reading.night.unwrap().as_str(), "50");
        assert!(reading.peak.is_none());
    }

    #[test]
    fn test_three_zone_requires_peak() {
        let err = Reading::validate("1234", Tariff::ThreeZone, Some("1"), Some("2"), None)
            .unwrap_err();
        assert!(err.to_string().contains("--peak"));

        let err = Reading::validate("1234", Tariff::ThreeZone, Some("1"), None, Some("3"))
            .unwrap_err();
        assert!(err.to_string().contains("--night"));
    }

    #[test]
    fn test_blank_account() {
        let err = Reading::validate("  ", Tariff::Single, Some("1"), None, None).unwrap_err();
        assert!(matches!(err, MeterError::MissingAccount));
    }

    #[test]
    fn test_phone_digits() {
        assert_eq!(Contact::new("", "+7 (912) 345-67-89").phone_digits(), "9123456789");
        assert_eq!(Contact::new("", "912").phone_digits(), "912");
        assert_eq!(Contact::new("", "").phone_country(), "");
        assert_eq!(Contact::new("", "8-912-345-67-89").phone_country(), "7");
    }

    #[test]
    fn test_form_fields() {
        let reading =
            Reading::validate("000123", Tariff::TwoZone, Some("10,5"), Some("3"), Some("7"))
                .unwrap();
        let fields = FormFields::new(&reading, &Contact::new("a@b.ru", "89123456789"));

        assert_eq!(fields.get(FormFields::ACCOUNT), Some("000123"));
        assert_eq!(fields.get(FormFields::DAY), Some("10,5"));
        assert_eq!(fields.get(FormFields::NIGHT), Some("3"));
        assert_eq!(fields.get(FormFields::PEAK), Some(""));
        assert_eq!(fields.get(FormFields::PHONE), Some("9123456789"));
        assert_eq!(fields.get(FormFields::PHONE_COUNTRY), Some("7"));
        assert_eq!(fields.non_empty(), 6);

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["input-account"], "000123");
    }
}
