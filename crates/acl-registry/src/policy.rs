//! # Policy Documents
//!
//! Declarative role, resource and rule definitions used to seed a registry.
//!
//! ```json
//! {
//!   "roles": [
//!     { "name": "user" },
//!     { "name": "writer", "parents": ["user"] }
//!   ],
//!   "resources": [{ "name": "post" }, { "name": "news", "parents": ["post"] }],
//!   "rules": [
//!     { "effect": "allow", "role": "writer", "operation": "view", "resource": "post" },
//!     { "effect": "deny", "operation": "delete" }
//!   ]
//! }
//! ```
//!
//! An omitted `role`, `operation` or `resource` means "any". Assertions are
//! code and cannot be expressed in a document; add them with
//! [`Registry::allow_if`] / [`Registry::deny_if`] after applying.

use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;
use crate::error::{AclError, AclResult};
use crate::registry::{Effect, Registry};
use crate::selector::Selector;

/// A role or resource declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityDecl {
    /// Key of the role or resource.
    pub name: String,
    /// Parents it inherits from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// A rule declaration. `None` fields mean "any".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDecl {
    /// Allow or deny.
    pub effect: Effect,
    /// Role the rule is keyed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Operation the rule is keyed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Resource the rule is keyed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// A full set of declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDocument {
    /// Roles, applied in order.
    #[serde(default)]
    pub roles: Vec<EntityDecl>,
    /// Resources, applied in order.
    #[serde(default)]
    pub resources: Vec<EntityDecl>,
    /// Rules, applied after all roles and resources.
    #[serde(default)]
    pub rules: Vec<RuleDecl>,
}

impl PolicyDocument {
    /// Parse a document from JSON.
    ///
    /// # Example
    ///
    /// ```
    /// use acl_registry::{Decision, PolicyDocument};
    ///
    /// let doc = PolicyDocument::from_json(r#"{
    ///     "roles": [{ "name": "reader" }],
    ///     "resources": [{ "name": "wiki" }],
    ///     "rules": [{ "effect": "allow", "role": "reader", "operation": "view", "resource": "wiki" }]
    /// }"#).unwrap();
    ///
    /// let acl = doc.build(Default::default()).unwrap();
    /// assert_eq!(acl.is_allowed("reader", "view", "wiki").unwrap(), Decision::Allowed);
    /// ```
    pub fn from_json(json: &str) -> AclResult<Self> {
        serde_json::from_str(json).map_err(|e| AclError::InvalidPolicy(e.to_string()))
    }

    /// Serialize the document to pretty JSON.
    pub fn to_json(&self) -> AclResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AclError::InvalidPolicy(e.to_string()))
    }

    /// Build a fresh registry from this document.
    pub fn build(&self, config: RegistryConfig) -> AclResult<Registry<String, String, String>> {
        let mut registry = Registry::with_config(config);
        registry.apply(self)?;
        Ok(registry)
    }
}

impl Registry<String, String, String> {
    /// Register everything declared in `document`.
    ///
    /// Declarations are applied in order: roles, resources, then rules. On error
    /// the declarations applied so far are kept.
    pub fn apply(&mut self, document: &PolicyDocument) -> AclResult<()> {
        for role in &document.roles {
            self.add_role(role.name.clone(), role.parents.iter().cloned())?;
        }
        for resource in &document.resources {
            self.add_resource(resource.name.clone(), resource.parents.iter().cloned())?;
        }
        for rule in &document.rules {
            self.add_rule(
                rule.effect,
                Selector::from_option(rule.role.clone()),
                Selector::from_option(rule.operation.clone()),
                Selector::from_option(rule.resource.clone()),
            )?;
        }
        tracing::debug!(
            roles = document.roles.len(),
            resources = document.resources.len(),
            rules = document.rules.len(),
            "Applied policy document"
        );
        Ok(())
    }
}
