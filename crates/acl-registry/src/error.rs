//! Error types for registry operations
//!
//! This module defines the errors raised while registering roles, resources
//! and rules, and while evaluating permission queries.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned by an assertion predicate.
///
/// Assertion failures are carried to the caller unmodified inside
/// [`AclError::Assertion`].
pub type AssertionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The kind of entity stored in a hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A role (principal category).
    Role,
    /// A resource (object category).
    Resource,
}

impl EntityKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Role => "role",
            EntityKind::Resource => "resource",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry error types.
#[derive(Debug, Error)]
pub enum AclError {
    /// A role or resource was used before being registered
    #[error("Unknown {kind}: {name}")]
    UnknownEntity {
        /// Whether a role or a resource was missing.
        kind: EntityKind,
        /// Debug rendering of the missing key.
        name: String,
    },

    /// Adding the parent edge would close a cycle in the hierarchy
    #[error("Cyclic {kind} hierarchy: {node} cannot inherit from {parent}")]
    CyclicHierarchy {
        /// Whether the role or the resource graph was affected.
        kind: EntityKind,
        /// Debug rendering of the child node.
        node: String,
        /// Debug rendering of the rejected parent.
        parent: String,
    },

    /// An assertion predicate failed while being evaluated
    #[error(transparent)]
    Assertion(AssertionError),

    /// A policy document could not be parsed
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

/// Result type for registry operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Build an `UnknownEntity` error from any debuggable key.
    pub fn unknown<K: fmt::Debug>(kind: EntityKind, key: &K) -> Self {
        AclError::UnknownEntity {
            kind,
            name: format!("{:?}", key),
        }
    }

    /// Check if this error is a precondition violation by the caller.
    ///
    /// Assertion failures come from caller-supplied code as well, but are
    /// raised during evaluation rather than by misuse of the registry.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AclError::UnknownEntity { .. } | AclError::CyclicHierarchy { .. } | AclError::InvalidPolicy(_)
        )
    }

    /// Get error code for reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AclError::UnknownEntity { kind: EntityKind::Role, .. } => "UNKNOWN_ROLE",
            AclError::UnknownEntity { kind: EntityKind::Resource, .. } => "UNKNOWN_RESOURCE",
            AclError::CyclicHierarchy { .. } => "CYCLIC_HIERARCHY",
            AclError::Assertion(_) => "ASSERTION_FAILED",
            AclError::InvalidPolicy(_) => "INVALID_POLICY",
        }
    }
}
