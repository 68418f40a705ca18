//! Registry configuration.
//!
//! Configuration is built with [`Default`] or loaded from environment
//! variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// What to do when a parent edge would close a cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Reject the edge with `AclError::CyclicHierarchy`.
    #[default]
    Reject,
    /// Store the edge. Closures still terminate; every member of the cycle
    /// inherits from every other member.
    Permit,
}

impl CyclePolicy {
    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" | "deny" | "strict" => Some(CyclePolicy::Reject),
            "permit" | "allow" | "ignore" => Some(CyclePolicy::Permit),
            _ => None,
        }
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Cycle handling for role and resource hierarchies.
    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    /// Skip evaluation in `is_any_allowed` once every remaining role is
    /// deny-only and nothing has granted access yet.
    #[serde(default = "default_short_circuit")]
    pub short_circuit_deny_only: bool,
}

fn default_short_circuit() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::Reject,
            short_circuit_deny_only: true,
        }
    }
}

impl RegistryConfig {
    /// Environment variable selecting the cycle policy.
    pub const CYCLE_POLICY_VAR: &'static str = "ACL_CYCLE_POLICY";
    /// Environment variable toggling the deny-only short circuit.
    pub const SHORT_CIRCUIT_VAR: &'static str = "ACL_SHORT_CIRCUIT_DENY_ONLY";

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACL_CYCLE_POLICY`: `reject` or `permit` (default: reject)
    /// - `ACL_SHORT_CIRCUIT_DENY_ONLY`: `true`/`false`/`1`/`0` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let cycle_policy = match lookup(Self::CYCLE_POLICY_VAR) {
            Some(value) => CyclePolicy::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: Self::CYCLE_POLICY_VAR.to_string(),
                message: format!("expected 'reject' or 'permit', got '{}'", value),
            })?,
            None => default.cycle_policy,
        };

        let short_circuit_deny_only = match lookup(Self::SHORT_CIRCUIT_VAR) {
            Some(value) => parse_flag(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: Self::SHORT_CIRCUIT_VAR.to_string(),
                message: format!("expected a boolean, got '{}'", value),
            })?,
            None => default.short_circuit_deny_only,
        };

        Ok(Self {
            cycle_policy,
            short_circuit_deny_only,
        })
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
