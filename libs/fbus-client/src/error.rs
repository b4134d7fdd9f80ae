//! Client Error Types
//!
//! Every facade method returns one of these variants; nothing is retried or
//! suppressed inside the client.

use fbus_protocol::{RecordError, ResultKind};
use thiserror::Error;

use crate::operation::Operation;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, FbusError>;

/// FBUS client errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FbusError {
    /// Caller-supplied argument out of contract, detected before dispatch
    #[error("Invalid parameter {param}: {reason}")]
    InvalidParameter { param: &'static str, reason: String },

    /// Operation attempted without the required session state
    #[error("Invalid state for {operation}: client is {state}")]
    InvalidState { operation: Operation, state: String },

    /// Entry point could not be resolved in the native service
    #[error("Operation {operation} not available: {reason}")]
    OperationNotAvailable { operation: Operation, reason: String },

    /// Native service returned a non-success outcome
    #[error("Operation {operation} failed: {kind}")]
    OperationFailed {
        operation: Operation,
        code: u32,
        kind: ResultKind,
    },

    /// Record buffer or record value error
    #[error(transparent)]
    MalformedRecord(#[from] RecordError),

    /// Native library could not be loaded
    #[error("Failed to load native library {path}: {reason}")]
    Library { path: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FbusError {
    pub(crate) fn invalid_parameter(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            reason: reason.into(),
        }
    }

    /// Classified native outcome, when the error came from the native service
    pub fn result_kind(&self) -> Option<ResultKind> {
        match self {
            Self::OperationFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the application may reasonably retry the call
    pub fn is_retryable(&self) -> bool {
        self.result_kind().is_some_and(ResultKind::is_retryable)
    }

    /// Stable identifier for logs and error reports
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::OperationNotAvailable { .. } => "OPERATION_NOT_AVAILABLE",
            Self::OperationFailed { .. } => "OPERATION_FAILED",
            Self::MalformedRecord(e) => e.error_code(),
            Self::Library { .. } => "LIBRARY_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<figment::Error> for FbusError {
    fn from(err: figment::Error) -> Self {
        FbusError::Config(format!("Failed to load configuration: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_failed() {
        let err = FbusError::OperationFailed {
            operation: Operation::ReadInputs,
            code: 14,
            kind: ResultKind::classify(14),
        };
        assert_eq!(
            err.to_string(),
            "Operation fbusReadInputs failed: request timed out (14)"
        );
        assert!(err.is_retryable());
        assert_eq!(err.result_kind(), Some(ResultKind::Timeout));
        assert_eq!(err.error_code(), "OPERATION_FAILED");
    }

    #[test]
    fn test_local_errors_are_not_retryable() {
        let err = FbusError::invalid_parameter("port", "must be in 1..=100");
        assert!(!err.is_retryable());
        assert_eq!(err.result_kind(), None);

        let err = FbusError::OperationFailed {
            operation: Operation::Open,
            code: 3,
            kind: ResultKind::IncorrectParam,
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_record_error_conversion() {
        let err: FbusError = RecordError::Malformed {
            record: "CommonConfiguration",
            expected: 20,
            actual: 19,
        }
        .into();
        assert_eq!(err.error_code(), "MALFORMED_RECORD");
        assert!(err.to_string().contains("CommonConfiguration"));
    }
}
