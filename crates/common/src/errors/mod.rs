//! Error types for JournalScope
//!
//! Provides a typed error taxonomy with:
//! - Distinct variants for every failure mode the engine reports
//! - Machine-readable error codes
//! - Recoverability and client/server classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request shape errors (1xxx)
    InvalidArgument,

    // Resource errors (4xxx)
    JournalNotFound,
    ReportNotFound,
    PartialNotFound,

    // Caller aborts (6xxx)
    Cancelled,

    // Store errors (7xxx)
    StoreUnavailable,

    // Internal errors (9xxx)
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::InvalidArgument => 1001,

            ErrorCode::JournalNotFound => 4002,
            ErrorCode::ReportNotFound => 4003,
            ErrorCode::PartialNotFound => 4004,

            ErrorCode::Cancelled => 6001,

            ErrorCode::StoreUnavailable => 7001,

            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request shape errors
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        field: Option<String>,
    },

    // Resource errors
    #[error("Journal not found: {id}")]
    JournalNotFound { id: i64 },

    #[error("None of the requested journals exist: {ids:?}")]
    JournalsNotFound { ids: Vec<i64> },

    #[error("Report not found: {id}")]
    ReportNotFound { id: i64 },

    #[error("Only {resolved} of the requested journals resolved; missing: {missing:?}")]
    PartialNotFound { missing: Vec<i64>, resolved: usize },

    // Caller aborts
    #[error("Operation cancelled: {reason}")]
    Cancelled { reason: String },

    // Store errors
    #[error("Catalog store unavailable: {message}")]
    StoreUnavailable { message: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for an argument error tied to a field
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            AppError::JournalNotFound { .. } | AppError::JournalsNotFound { .. } => {
                ErrorCode::JournalNotFound
            }
            AppError::ReportNotFound { .. } => ErrorCode::ReportNotFound,
            AppError::PartialNotFound { .. } => ErrorCode::PartialNotFound,
            AppError::Cancelled { .. } => ErrorCode::Cancelled,
            AppError::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Whether the referenced resource simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::JournalNotFound { .. }
                | AppError::JournalsNotFound { .. }
                | AppError::ReportNotFound { .. }
        )
    }

    /// Degraded-but-meaningful conditions a caller may choose to accept
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::PartialNotFound { .. })
    }

    /// Check if this error was caused by the request rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidArgument { .. }
                | AppError::JournalNotFound { .. }
                | AppError::JournalsNotFound { .. }
                | AppError::ReportNotFound { .. }
                | AppError::PartialNotFound { .. }
                | AppError::Cancelled { .. }
        )
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

/// Structured error payload for callers that forward errors as JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorDetails {
    fn from(err: &AppError) -> Self {
        let details = match err {
            AppError::PartialNotFound { missing, resolved } => Some(serde_json::json!({
                "missing": missing,
                "resolved": resolved,
            })),
            AppError::JournalsNotFound { ids } => Some(serde_json::json!({ "missing": ids })),
            AppError::InvalidArgument { field: Some(field), .. } => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        };

        ErrorDetails {
            code: err.code(),
            message: err.to_string(),
            details,
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|f| f.to_string());
        AppError::InvalidArgument {
            message: errors.to_string(),
            field,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::JournalNotFound { id: 7 };
        assert_eq!(err.code(), ErrorCode::JournalNotFound);
        assert_eq!(err.code().as_code(), 4002);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_argument_is_client_error() {
        let err = AppError::invalid("journal_ids", "at least two journals are required");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_partial_not_found_is_recoverable() {
        let err = AppError::PartialNotFound {
            missing: vec![3, 4],
            resolved: 1,
        };
        assert!(err.is_recoverable());

        let details = ErrorDetails::from(&err);
        assert_eq!(details.code, ErrorCode::PartialNotFound);
        assert_eq!(details.details.unwrap()["missing"], serde_json::json!([3, 4]));
    }

    #[test]
    fn test_store_errors_are_server_errors() {
        let err = AppError::from(sea_orm::DbErr::Custom("connection reset".into()));
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert!(err.is_server_error());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_all_journals_missing_is_not_found() {
        let err = AppError::JournalsNotFound { ids: vec![77, 78] };
        assert!(err.is_not_found());
        assert!(!err.is_recoverable());
        assert_eq!(err.code().as_code(), 4002);

        let details = ErrorDetails::from(&err);
        assert_eq!(details.details.unwrap()["missing"], serde_json::json!([77, 78]));
    }
}
