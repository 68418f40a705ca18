//! # Selectors
//!
//! A selector names either one concrete role, operation or resource, or the
//! `Any` wildcard that matches every value in that position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete key or the `Any` wildcard.
///
/// Rules keyed on `Any` match every role (resp. operation, resource), and every
/// inheritance closure ends with `Any`.
///
/// # Example
///
/// ```
/// use acl_registry::Selector;
///
/// let role: Selector<&str> = "editor".into();
/// assert_eq!(role.exact(), Some(&"editor"));
/// assert!(Selector::<&str>::Any.is_any());
/// assert_eq!(role.to_string(), "editor");
/// assert_eq!(Selector::<&str>::Any.to_string(), "*");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Selector<T> {
    /// Wildcard matching every value.
    Any,
    /// A single concrete value.
    Exact(T),
}

impl<T> Selector<T> {
    /// Check if this is the wildcard.
    pub fn is_any(&self) -> bool {
        matches!(self, Selector::Any)
    }

    /// Get the concrete value, if any.
    pub fn exact(&self) -> Option<&T> {
        match self {
            Selector::Any => None,
            Selector::Exact(value) => Some(value),
        }
    }

    /// Convert `&Selector<T>` into `Selector<&T>`.
    pub fn as_ref(&self) -> Selector<&T> {
        match self {
            Selector::Any => Selector::Any,
            Selector::Exact(value) => Selector::Exact(value),
        }
    }

    /// Map the concrete value, keeping `Any` as is.
    pub fn map<U, F>(self, f: F) -> Selector<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Selector::Any => Selector::Any,
            Selector::Exact(value) => Selector::Exact(f(value)),
        }
    }

    /// Build a selector from an optional value; `None` becomes `Any`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Selector::Exact(value),
            None => Selector::Any,
        }
    }

    /// Consume the selector and return the concrete value, if any.
    pub fn into_exact(self) -> Option<T> {
        match self {
            Selector::Any => None,
            Selector::Exact(value) => Some(value),
        }
    }
}

impl<T: Clone> Selector<&T> {
    /// Convert `Selector<&T>` into `Selector<T>` by cloning the value.
    pub fn cloned(self) -> Selector<T> {
        self.map(T::clone)
    }
}

impl<T> From<T> for Selector<T> {
    fn from(value: T) -> Self {
        Selector::Exact(value)
    }
}

impl From<&str> for Selector<String> {
    fn from(value: &str) -> Self {
        Selector::Exact(value.to_string())
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Any => f.write_str("*"),
            Selector::Exact(value) => value.fmt(f),
        }
    }
}
