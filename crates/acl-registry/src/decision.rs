//! # Decisions
//!
//! The tri-state outcome of a permission query.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a permission query.
///
/// `Unspecified` means no rule matched. Callers decide what it means; the usual
/// choice is to treat it as a denial (see [`Decision::allowed_or`]).
///
/// # Example
///
/// ```
/// use acl_registry::Decision;
///
/// assert!(Decision::Allowed.is_allowed());
/// assert_eq!(Decision::Unspecified.to_option(), None);
/// assert!(!Decision::Unspecified.allowed_or(false));
/// assert_eq!(Decision::from_option(Some(false)), Decision::Denied);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// An allow rule matched and no deny rule did.
    Allowed,
    /// A deny rule matched.
    Denied,
    /// No rule matched.
    #[default]
    Unspecified,
}

impl Decision {
    /// Check if access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    /// Check if access was explicitly denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied)
    }

    /// Check if no rule applied.
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Decision::Unspecified)
    }

    /// `Some(true)` for allowed, `Some(false)` for denied, `None` for unspecified.
    pub fn to_option(self) -> Option<bool> {
        match self {
            Decision::Allowed => Some(true),
            Decision::Denied => Some(false),
            Decision::Unspecified => None,
        }
    }

    /// Build a decision from an optional boolean.
    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(true) => Decision::Allowed,
            Some(false) => Decision::Denied,
            None => Decision::Unspecified,
        }
    }

    /// Collapse to a boolean, using `default` for `Unspecified`.
    pub fn allowed_or(self, default: bool) -> bool {
        self.to_option().unwrap_or(default)
    }

    /// Get the string representation of the decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allowed => "allowed",
            Decision::Denied => "denied",
            Decision::Unspecified => "unspecified",
        }
    }
}

impl From<bool> for Decision {
    fn from(value: bool) -> Self {
        if value {
            Decision::Allowed
        } else {
            Decision::Denied
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
