// src/deploy/result.rs

//! Operation outcome model
//!
//! Every install/uninstall/validation ends in an `OperationResult` built
//! through exactly one of two factory paths: success or failure. There is
//! no partial state.

use crate::deploy::errors::format_status_code;
use crate::package::PackageDescriptor;
use chrono::{DateTime, Utc};
use strum_macros::Display;

/// What kind of operation produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OperationType {
    Install,
    Uninstall,
    Validation,
}

/// Outcome of an install, uninstall, or validation
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub success: bool,
    pub operation: OperationType,
    /// Human text; always non-empty and actionable
    pub message: String,
    /// Platform code rendered as 8 uppercase hex digits
    pub error_code: Option<String>,
    /// Raw diagnostic text preserved for troubleshooting
    pub technical_details: Option<String>,
    /// The descriptor involved in the operation
    pub package: PackageDescriptor,
    pub timestamp: DateTime<Utc>,
}

impl OperationResult {
    /// Successful outcome.
    pub fn succeeded(
        operation: OperationType,
        package: PackageDescriptor,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            operation,
            message: message.into(),
            error_code: None,
            technical_details: None,
            package,
            timestamp: Utc::now(),
        }
    }

    /// Failed outcome with optional platform code and diagnostics.
    pub fn failed(
        operation: OperationType,
        package: PackageDescriptor,
        message: impl Into<String>,
        error_code: Option<u32>,
        technical_details: Option<String>,
    ) -> Self {
        Self {
            success: false,
            operation,
            message: message.into(),
            error_code: error_code.map(format_status_code),
            technical_details,
            package,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_error_fields() {
        let result = OperationResult::succeeded(
            OperationType::Install,
            PackageDescriptor::empty(),
            "installed",
        );
        assert!(result.success);
        assert!(result.error_code.is_none());
        assert!(result.technical_details.is_none());
    }

    #[test]
    fn test_failure_formats_code() {
        let result = OperationResult::failed(
            OperationType::Uninstall,
            PackageDescriptor::empty(),
            "failed",
            Some(0x8007_3CFA),
            Some("raw".to_string()),
        );
        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("0x80073CFA"));
        assert_eq!(result.technical_details.as_deref(), Some("raw"));
    }
}
