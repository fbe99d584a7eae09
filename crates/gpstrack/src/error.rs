//! Error types for gpstrack.
//!
//! This module defines all error types used throughout the gpstrack crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::route::LoggerState;

/// The main error type for gpstrack operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// User input failed validation. Nothing was mutated.
    #[error("validation error: {message}")]
    Validation {
        /// The first rule that was violated.
        message: String,
    },

    // === Project Errors ===
    /// No project file exists under the given name.
    #[error("project not found: {name}")]
    ProjectNotFound {
        /// Name of the requested project.
        name: String,
    },

    /// A project file exists but could not be parsed.
    #[error("failed to parse project file {path}: {source}")]
    ProjectParse {
        /// Path to the malformed file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    // === Route Errors ===
    /// No route log file exists under the given name.
    #[error("route session not found: {name}")]
    SessionNotFound {
        /// File name of the requested session.
        name: String,
    },

    /// The route logger was asked to do something its current state forbids.
    #[error("cannot {operation}: route logger is {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the logger was in.
        state: LoggerState,
    },

    /// The pending metadata queue reached its configured capacity.
    #[error("pending metadata queue is full ({capacity} entries)")]
    PendingQueueFull {
        /// The configured capacity.
        capacity: usize,
    },

    /// The position source failed to produce a coordinate.
    #[error("location unavailable: {0}")]
    Location(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for gpstrack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new location error.
    #[must_use]
    pub fn location(message: impl Into<String>) -> Self {
        Self::Location(message.into())
    }

    /// Create an invalid state error for the given operation.
    #[must_use]
    pub fn invalid_state(operation: &'static str, state: LoggerState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Check if this error was caused by bad user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error indicates a missing project or session.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. } | Self::SessionNotFound { .. }
        )
    }

    /// Check if this error is a rejected logger state transition.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("project name cannot be empty");
        assert_eq!(
            err.to_string(),
            "validation error: project name cannot be empty"
        );

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_invalid_state_display() {
        let err = Error::invalid_state("start", LoggerState::Logging);
        assert_eq!(err.to_string(), "cannot start: route logger is logging");

        let err = Error::invalid_state("stop", LoggerState::Idle);
        assert_eq!(err.to_string(), "cannot stop: route logger is idle");
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::validation("x").is_validation());
        assert!(!Error::internal("x").is_validation());

        let missing = Error::ProjectNotFound {
            name: "Survey1".to_string(),
        };
        assert!(missing.is_not_found());
        let missing = Error::SessionNotFound {
            name: "route_Survey1_1.jsonl".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(!Error::validation("x").is_not_found());

        assert!(Error::invalid_state("submit metadata", LoggerState::Idle).is_invalid_state());
        assert!(!Error::internal("x").is_invalid_state());
    }

    #[test]
    fn test_project_not_found_display() {
        let err = Error::ProjectNotFound {
            name: "Survey1".to_string(),
        };
        assert!(err.to_string().contains("Survey1"));
    }

    #[test]
    fn test_pending_queue_full_display() {
        let err = Error::PendingQueueFull { capacity: 8 };
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_project_parse_error_display() {
        let source = serde_json::from_str::<i32>("{").unwrap_err();
        let err = Error::ProjectParse {
            path: PathBuf::from("/data/projects/Survey1.json"),
            source,
        };
        assert!(err.to_string().contains("Survey1.json"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "max_lines must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("max_lines"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
