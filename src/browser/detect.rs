//! Success banner detection

/// Banner shown by the form after an accepted submission
pub const SUCCESS_TEXT: &str = "Сообщение успешно отправлено";

/// Maximum number of characters of page text quoted in errors
pub const SNIPPET_CHARS: usize = 500;

/// Looks for the success banner in the text of the page
#[derive(Debug, Clone)]
pub struct SuccessDetector {
    text: String,
}

impl Default for SuccessDetector {
    fn default() -> Self {
        Self::new(SUCCESS_TEXT)
    }
}

impl SuccessDetector {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Banner text this detector matches
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the page body contains the banner
    pub fn detect(&self, body: &str) -> bool {
        body.contains(&self.text)
    }

    /// Leading part of the page body for error messages
    pub fn snippet(body: &str) -> String {
        if body.is_empty() {
            return "No content".to_string();
        }
        body.chars().take(SNIPPET_CHARS).collect()
    }
}
