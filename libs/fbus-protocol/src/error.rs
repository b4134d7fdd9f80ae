//! Record Error Types

use thiserror::Error;

use crate::module_type::ModuleType;

/// Result type for record operations
pub type Result<T> = std::result::Result<T, RecordError>;

/// Record catalog errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Buffer length differs from the record's fixed size
    #[error("Malformed record {record}: expected {expected} bytes, got {actual}")]
    Malformed {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Text does not fit a fixed-length character field
    #[error("Text too long: {length} bytes does not fit a {capacity}-byte field")]
    TextTooLong { capacity: usize, length: usize },

    /// Payload does not fit a raw data window
    #[error("Payload too long: {length} bytes exceeds the {capacity}-byte window")]
    PayloadTooLong { capacity: usize, length: usize },

    /// Descriptor reports a different module type than the device family
    #[error("Module type mismatch: family {expected} expects code {}, descriptor reports {actual}", .expected.code())]
    ModuleTypeMismatch { expected: ModuleType, actual: u32 },

    /// Descriptor region size disagrees with the device family layout
    #[error("Region size mismatch for {region}: family declares {expected} bytes, module reports {actual}")]
    RegionSizeMismatch {
        region: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl RecordError {
    /// Stable identifier for logs and error reports
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "MALFORMED_RECORD",
            Self::TextTooLong { .. } => "TEXT_TOO_LONG",
            Self::PayloadTooLong { .. } => "PAYLOAD_TOO_LONG",
            Self::ModuleTypeMismatch { .. } => "MODULE_TYPE_MISMATCH",
            Self::RegionSizeMismatch { .. } => "REGION_SIZE_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RecordError::Malformed {
            record: "ModuleDescriptor",
            expected: 53,
            actual: 52,
        };
        assert_eq!(
            err.to_string(),
            "Malformed record ModuleDescriptor: expected 53 bytes, got 52"
        );
        assert_eq!(err.error_code(), "MALFORMED_RECORD");

        let err = RecordError::ModuleTypeMismatch {
            expected: ModuleType::Aim724,
            actual: 1,
        };
        assert!(err.to_string().contains("AIM724"));
    }
}
