//! Error types for the walkthrough suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Extension bundle not found at {0}")]
    ExtensionNotFound(String),

    #[error("Could not resolve extension identifier: {0}")]
    ExtensionId(String),

    #[error("WebDriver session could not be created: {0}")]
    SessionStartup(String),

    #[error("WebDriver error ({error}): {message}")]
    WebDriver { error: String, message: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Gave up after {attempts} attempt(s): {last}")]
    RetryExhausted { attempts: u32, last: Box<E2eError> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl E2eError {
    /// Conditions a polling wait is allowed to outlast
    pub fn is_transient(&self) -> bool {
        matches!(self, E2eError::ElementNotFound(_) | E2eError::StaleElement(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
