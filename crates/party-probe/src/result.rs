//! Result and error types for party-probe.
//!
//! Three failure kinds are scenario-fatal and never retried: a [`Timeout`]
//! names the UI state that never materialized, a [`Rejection`] carries the
//! literal popup text, and an [`AssertionMismatch`] carries both the
//! expected and the observed value. The remaining variants cover the
//! infrastructure around them (browser, driver, config).
//!
//! [`Timeout`]: ProbeError::Timeout
//! [`Rejection`]: ProbeError::Rejection
//! [`AssertionMismatch`]: ProbeError::AssertionMismatch

use thiserror::Error;

/// Result type for party-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or verifying the character creator
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An expected UI state did not materialize within its bound
    #[error("Timed out after {ms}ms waiting for {awaited}")]
    Timeout {
        /// Description of the awaited state
        awaited: String,
        /// Bound in milliseconds
        ms: u64,
    },

    /// The application rejected a submission through its popup
    #[error("Character creation failed with popup message: {message}")]
    Rejection {
        /// Literal popup text
        message: String,
    },

    /// An observed value differs from the expected one
    #[error("Assertion failed for {subject}: expected {expected:?}, got {actual:?}")]
    AssertionMismatch {
        /// What was checked
        subject: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set PARTY_PROBE_CHROMIUM")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Primitive driver operation failed
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A fixture draft does not satisfy the point budget it claims to
    #[error("Invalid draft '{name}': {reason}")]
    InvalidDraft {
        /// Draft name
        name: String,
        /// Why it is invalid
        reason: String,
    },

    /// Operation called in the wrong scenario state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a timeout error for an awaited state
    #[must_use]
    pub fn timeout(awaited: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            awaited: awaited.into(),
            ms,
        }
    }

    /// Create an assertion mismatch
    #[must_use]
    pub fn mismatch(
        subject: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::AssertionMismatch {
            subject: subject.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is a timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this is a popup rejection
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejection { .. })
    }

    /// Whether this is an assertion mismatch
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::AssertionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_names_awaited_state() {
        let err = ProbeError::timeout("roster container attached", 5000);
        assert!(err.is_timeout());
        let msg = err.to_string();
        assert!(msg.contains("roster container attached"));
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn test_rejection_surfaces_literal_text() {
        let err = ProbeError::Rejection {
            message: "Musisz wydać wszystkie punkty!".to_string(),
        };
        assert!(err.is_rejection());
        assert!(err.to_string().contains("Musisz wydać wszystkie punkty!"));
    }

    #[test]
    fn test_mismatch_carries_both_values() {
        let err = ProbeError::mismatch("roster count", 4, 3);
        assert!(err.is_mismatch());
        let msg = err.to_string();
        assert!(msg.contains("\"4\""));
        assert!(msg.contains("\"3\""));
        assert!(!err.is_timeout());
    }
}
