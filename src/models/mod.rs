//! Core data models for belssb-meter
//!
//! This module contains the tariff schemes, validated readings and the
//! payload that is written into the web form.

pub mod reading;
pub mod tariff;

pub use reading::{Contact, FormFields, MeterValue, Reading};
pub use tariff::{Tariff, Zone};
