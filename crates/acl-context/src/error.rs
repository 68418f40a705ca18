//! Error types for permission guards
//!
//! A guard fails either because access was refused ([`PermissionDenied`]) or
//! because the registry could not evaluate the request ([`AclError`]).

use std::collections::BTreeMap;

use acl_registry::{AclError, Decision};
use thiserror::Error;

/// Access to a guarded operation was refused.
///
/// Raised for both `Denied` and `Unspecified` decisions; `decision` tells
/// them apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PermissionDenied {
    /// Human readable reason.
    pub message: String,
    /// Operation that was checked.
    pub operation: String,
    /// Resource that was checked.
    pub resource: String,
    /// The decision that led to the refusal.
    pub decision: Decision,
    /// Caller-supplied details attached to the guard.
    pub details: BTreeMap<String, String>,
}

impl PermissionDenied {
    /// Default message when the guard does not set one.
    pub const DEFAULT_MESSAGE: &'static str = "Permission denied";

    /// Check if a deny rule matched, rather than no rule at all.
    pub fn is_explicit(&self) -> bool {
        self.decision.is_denied()
    }

    /// Look up a caller-supplied detail.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

/// Guard error types.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The caller's roles do not grant access
    #[error(transparent)]
    Denied(#[from] PermissionDenied),

    /// The registry rejected the request
    #[error(transparent)]
    Acl(#[from] AclError),
}

/// Result type for guard operations.
pub type ContextResult<T> = Result<T, ContextError>;

impl ContextError {
    /// Check if this is a refusal rather than an evaluation failure.
    pub fn is_denied(&self) -> bool {
        matches!(self, ContextError::Denied(_))
    }

    /// Get error code for reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            ContextError::Denied(_) => "PERMISSION_DENIED",
            ContextError::Acl(err) => err.error_code(),
        }
    }
}
