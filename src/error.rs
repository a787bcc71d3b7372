//! Custom error types for belssb-meter
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every error maps onto one of the process
//! exit codes: 2 for invalid input, 1 for a failed submission.

use thiserror::Error;

/// Exit code for a successful submission
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for a submission that did not go through
pub const EXIT_SUBMISSION_FAILED: u8 = 1;

/// Exit code for invalid input (config, account, readings)
pub const EXIT_INVALID_INPUT: u8 = 2;

/// The main error type for belssb-meter operations
#[derive(Error, Debug)]
pub enum MeterError {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// No account number in any configuration source
    #[error("Account number is required (--account, BELSSB_ACCOUNT or config.account).")]
    MissingAccount,

    /// Reading values or tariff did not validate
    #[error("{0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Node.js (or the Playwright package) is not available
    #[error("Node.js runtime not available ({0}). Install Node.js and run: npm install playwright && npx playwright install chromium")]
    RuntimeMissing(String),

    /// The browser script crashed or produced no report
    #[error("Browser error: {0}")]
    Browser(String),

    /// The page or the submission timed out
    #[error("Timeout while loading or submitting the form. Try --headed or run again. ({0})")]
    Timeout(String),

    /// No target contained the reading form
    #[error("Could not find form fields (form may have changed or not loaded).")]
    FormNotFound,

    /// The form was filled but no submit button could be clicked
    #[error("Could not find or click submit button.")]
    SubmitNotFound,

    /// Submission finished without the success banner
    #[error("Success message not found. Page snippet: {snippet}")]
    SuccessNotFound { snippet: String },
}

impl MeterError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an input problem rather than a submission failure
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MissingAccount | Self::Validation(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        if self.is_invalid_input() {
            EXIT_INVALID_INPUT
        } else {
            EXIT_SUBMISSION_FAILED
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for MeterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MeterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for MeterError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for belssb-meter operations
pub type MeterResult<T> = Result<T, MeterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeterError::Config("bad yaml".into());
        assert_eq!(err.to_string(), "Configuration error: bad yaml");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MeterError::MissingAccount.exit_code(), EXIT_INVALID_INPUT);
        assert_eq!(MeterError::validation("x").exit_code(), EXIT_INVALID_INPUT);
        assert_eq!(MeterError::Config("x".into()).exit_code(), EXIT_INVALID_INPUT);
        assert_eq!(MeterError::FormNotFound.exit_code(), EXIT_SUBMISSION_FAILED);
        assert_eq!(
            MeterError::Timeout("page.goto".into()).exit_code(),
            EXIT_SUBMISSION_FAILED
        );
        assert_eq!(
            MeterError::RuntimeMissing("node".into()).exit_code(),
            EXIT_SUBMISSION_FAILED
        );
    }

    #[test]
    fn test_success_not_found_message() {
        let err = MeterError::SuccessNotFound {
            snippet: "Ошибка".into(),
        };
        assert_eq!(
            err.to_string(),
            "Success message not found. Page snippet: Ошибка"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MeterError = io_err.into();
        assert!(matches!(err, MeterError::Io(_)));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_from_yaml_error_is_config() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{").unwrap_err();
        let err: MeterError = yaml_err.into();
        assert!(matches!(err, MeterError::Config(_)));
    }
}
