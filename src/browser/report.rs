//! Result printed by the form script
//!
//! The script writes a `---RESULT---` marker followed by one JSON object on
//! stdout. Keys are camelCase, stages snake_case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the script stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Form filled and submitted; success still to be decided
    Filled,
    /// No target contained enough form fields
    FormNotFound,
    /// Fields filled but no submit button could be clicked
    SubmitNotFound,
    /// Playwright timed out (navigation or waiting)
    Timeout,
    /// Any other script failure
    Error,
}

/// Document the form was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillTarget {
    /// A Formy iframe
    Frame,
    /// The main page, possibly behind shadow roots
    Page,
}

impl fmt::Display for FillTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame => write!(f, "formy frame"),
            Self::Page => write!(f, "main page"),
        }
    }
}

/// Outcome reported by the form script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptReport {
    pub stage: Stage,
    #[serde(default)]
    pub filled: u32,
    #[serde(default)]
    pub submit_clicked: bool,
    #[serde(default)]
    pub target: Option<FillTarget>,
    #[serde(default)]
    pub success_seen: bool,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub message: Option<String>,
}
