//! Browser automation for the reading form
//!
//! The form lives in a Formy widget that is rendered either inside an iframe
//! or behind shadow roots on the main page. A generated Playwright script
//! does the DOM work in Node.js; this module builds that script, runs it and
//! turns its report into a [`Submission`] or an error.

pub mod detect;
pub mod report;
pub mod runner;
pub mod script;

use std::time::Duration;

use tracing::{debug, info};

use crate::config::settings::{Settings, DEFAULT_NODE, DEFAULT_URL};
use crate::error::{MeterError, MeterResult};
use crate::models::{Contact, FormFields, Reading};

pub use detect::{SuccessDetector, SUCCESS_TEXT};
pub use report::{FillTarget, ScriptReport, Stage};
pub use runner::PlaywrightRunner;
pub use script::{DiscoverScript, FormScript};

/// Time allowed for starting the browser on top of the form waits
const LAUNCH_SLACK: Duration = Duration::from_secs(60);

/// How the browser is launched and how long it waits
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Page with the reading form
    pub url: String,
    /// Show the browser window (lets a human solve a captcha)
    pub headed: bool,
    /// Print frame URLs and discovered field names
    pub debug: bool,
    /// Node.js executable
    pub node: String,
    /// `NODE_PATH` for resolving the playwright package
    pub node_path: Option<String>,
    /// Navigation timeout
    pub form_timeout: Duration,
    /// Pause after load for the widget to render
    pub widget_settle: Duration,
    /// Polls for a Formy iframe
    pub widget_poll_attempts: u32,
    pub widget_poll_interval: Duration,
    /// Wait for the success banner after submitting
    pub submit_timeout: Duration,
    /// Fallback submit button click timeout
    pub click_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            headed: false,
            debug: false,
            node: DEFAULT_NODE.to_string(),
            node_path: None,
            form_timeout: Duration::from_secs(20),
            widget_settle: Duration::from_secs(8),
            widget_poll_attempts: 12,
            widget_poll_interval: Duration::from_secs(1),
            submit_timeout: Duration::from_secs(15),
            click_timeout: Duration::from_secs(5),
        }
    }
}

impl BrowserOptions {
    /// Options for the configured page and runtime
    pub fn from_settings(settings: &Settings, headed: bool, debug: bool) -> Self {
        Self {
            url: settings.url.clone(),
            headed,
            debug,
            node: settings.node.clone(),
            node_path: settings.node_path.clone(),
            ..Default::default()
        }
    }

    /// Upper bound for a whole script run: every configured wait plus
    /// slack for launching Chromium
    pub fn script_deadline(&self) -> Duration {
        self.form_timeout
            + self.widget_settle
            + self.widget_poll_interval * self.widget_poll_attempts
            + self.click_timeout
            + self.submit_timeout
            + LAUNCH_SLACK
    }

    pub fn runner(&self) -> PlaywrightRunner {
        PlaywrightRunner::new(self.node.as_str(), self.node_path.as_deref())
            .with_deadline(self.script_deadline())
    }
}

/// An accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Text printed for the user (the success banner)
    pub message: String,
    /// Where the form was found
    pub target: Option<FillTarget>,
    /// Number of fields written
    pub filled: u32,
}

/// Fill and submit the form, then check for the success banner
pub fn submit_reading(
    reading: &Reading,
    contact: &Contact,
    options: &BrowserOptions,
) -> MeterResult<Submission> {
    let runner = options.runner();
    let version = runner.check_node()?;

    let fields = FormFields::new(reading, contact);
    let script = FormScript::new(&fields, options).render()?;

    info!(
        account = %reading.account,
        tariff = %reading.tariff,
        fields = fields.non_empty(),
        headed = options.headed,
        node = %version,
        "submitting meter reading"
    );
    let report: ScriptReport = runner.run(&script)?;
    debug!(stage = ?report.stage, filled = report.filled, target = ?report.target, "script finished");

    interpret(report, &SuccessDetector::default())
}

/// Map the script report onto the outcome of the run
pub fn interpret(report: ScriptReport, detector: &SuccessDetector) -> MeterResult<Submission> {
    let message = || report.message.clone().unwrap_or_default();

    match report.stage {
        Stage::Timeout => Err(MeterError::Timeout(message())),
        Stage::Error => Err(MeterError::Browser(message())),
        Stage::FormNotFound => Err(MeterError::FormNotFound),
        Stage::SubmitNotFound => {
            debug!(reason = %message(), "fallback submit click failed");
            Err(MeterError::SubmitNotFound)
        }
        Stage::Filled if report.success_seen || detector.detect(&report.body_text) => {
            Ok(Submission {
                message: detector.text().to_string(),
                target: report.target,
                filled: report.filled,
            })
        }
        Stage::Filled => Err(MeterError::SuccessNotFound {
            snippet: SuccessDetector::snippet(&report.body_text),
        }),
    }
}
