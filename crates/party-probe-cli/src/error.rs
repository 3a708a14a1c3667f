//! CLI error types

use party_probe::ProbeError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad command-line input
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Scenario name not in the catalog
    #[error("Unknown scenario '{name}' (see `party-probe list`)")]
    UnknownScenario {
        /// Requested name
        name: String,
    },

    /// At least one scenario failed
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed {
        /// Failed count
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// Could not start the async runtime
    #[error("Runtime error: {message}")]
    Runtime {
        /// Error message
        message: String,
    },

    /// Report could not be written
    #[error("Report generation error: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the harness library
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scenario_message() {
        let err = CliError::UnknownScenario {
            name: "fly".into(),
        };
        assert!(err.to_string().contains("'fly'"));
    }

    #[test]
    fn test_scenarios_failed_message() {
        let err = CliError::ScenariosFailed {
            failed: 2,
            total: 10,
        };
        assert_eq!(err.to_string(), "2 of 10 scenarios failed");
    }

    #[test]
    fn test_probe_error_is_transparent() {
        let err = CliError::from(ProbeError::config("bad url"));
        assert_eq!(err.to_string(), "Configuration error: bad url");
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(CliError::from(io), CliError::Io(_)));
    }
}
