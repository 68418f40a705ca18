//! # Registry
//!
//! The access control list: role and resource hierarchies plus the allow and
//! deny rule tables.
//!
//! ## Evaluation
//!
//! ```text
//! roles      = closure(role)          [role, ancestors..., *]
//! operations = {operation, *}
//! resources  = closure(resource)      [resource, ancestors..., *]
//!
//! for (r, o, s) in roles × operations × resources:
//!     denied[(r, o, s)] holds   -> Denied (stop)
//!     allowed[(r, o, s)] holds  -> Allowed (keep scanning)
//! ```
//!
//! A matching deny always wins. An allow only turns `Unspecified` into
//! `Allowed`, so the result never depends on registration order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregate::{self, RoleCheck};
use crate::assertion::{Assertion, AssertionContext, Extras};
use crate::config::RegistryConfig;
use crate::decision::Decision;
use crate::error::{AclError, AclResult, EntityKind};
use crate::hierarchy::Hierarchy;
use crate::selector::Selector;

/// Bounds shared by role, resource and operation keys.
pub trait Key: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Key for T {}

/// Whether a rule grants or refuses access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Grant access.
    Allow,
    /// Refuse access. Always wins over `Allow`.
    Deny,
}

/// Which rule tables a per-role check consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Consult both the deny and the allow table.
    Full,
    /// Consult only the deny table; access was already granted elsewhere.
    DenyOnly,
}

type RuleKey<R, S, O> = (Selector<R>, Selector<O>, Selector<S>);
type SharedAssertion<R, S, O> = Arc<dyn Assertion<R, S, O>>;
type RuleTable<R, S, O> = HashMap<RuleKey<R, S, O>, Option<SharedAssertion<R, S, O>>>;

/// Registry of roles, resources and permission rules.
///
/// Roles and resources are opaque keys; operations default to `String`.
///
/// # Example
///
/// ```
/// use acl_registry::{Decision, Registry};
///
/// let mut acl: Registry<&str, &str, &str> = Registry::new();
/// acl.add_role("user", []).unwrap();
/// acl.add_role("writer", ["user"]).unwrap();
/// acl.add_resource("post", []).unwrap();
/// acl.add_resource("news", ["post"]).unwrap();
///
/// acl.allow("user", "view", "news").unwrap();
/// acl.deny("writer", "view", "post").unwrap();
///
/// assert_eq!(acl.is_allowed("user", "view", "news").unwrap(), Decision::Allowed);
/// assert_eq!(acl.is_allowed("writer", "view", "news").unwrap(), Decision::Denied);
/// assert_eq!(acl.is_allowed("user", "edit", "news").unwrap(), Decision::Unspecified);
/// ```
pub struct Registry<R = String, S = R, O = String> {
    config: RegistryConfig,
    roles: Hierarchy<R>,
    resources: Hierarchy<S>,
    allowed: RuleTable<R, S, O>,
    denied: RuleTable<R, S, O>,
    /// Roles with no allow rule on themselves or any ancestor.
    deny_only: HashSet<R>,
    /// Set once an allow rule is keyed on the `Any` role.
    any_role_allowed: bool,
}

impl<R, S, O> Registry<R, S, O>
where
    R: Key,
    S: Key,
    O: Key,
{
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            roles: Hierarchy::new(EntityKind::Role),
            resources: Hierarchy::new(EntityKind::Resource),
            allowed: HashMap::new(),
            denied: HashMap::new(),
            deny_only: HashSet::new(),
            any_role_allowed: false,
        }
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Add a role, or merge more parents into an existing role.
    ///
    /// The role inherits every rule granted to or denied for its parents.
    /// Parents that were never registered are registered as root roles.
    ///
    /// # Errors
    ///
    /// `CyclicHierarchy` if a new parent edge would close a cycle and the
    /// configuration rejects cycles.
    pub fn add_role<I>(&mut self, role: R, parents: I) -> AclResult<()>
    where
        I: IntoIterator<Item = R>,
    {
        let parents: Vec<R> = parents.into_iter().collect();
        let new_parents: Vec<R> = parents
            .iter()
            .filter(|p| !self.roles.contains(p))
            .cloned()
            .collect();

        let created = self
            .roles
            .insert(role.clone(), parents.iter().cloned(), self.config.cycle_policy)?;

        // Implicitly registered parents have no rules yet
        self.deny_only.extend(new_parents);

        let inherits_grant = parents.iter().any(|p| !self.deny_only.contains(p));
        if inherits_grant {
            self.clear_deny_only(&role);
        } else if created {
            self.deny_only.insert(role.clone());
        }

        tracing::debug!(role = ?role, parents = ?parents, created, "Registered role");
        Ok(())
    }

    /// Add a resource, or merge more parents into an existing resource.
    ///
    /// Rules on a parent resource apply to all of its descendants.
    ///
    /// # Errors
    ///
    /// `CyclicHierarchy` under the same conditions as [`Registry::add_role`].
    pub fn add_resource<I>(&mut self, resource: S, parents: I) -> AclResult<()>
    where
        I: IntoIterator<Item = S>,
    {
        let parents: Vec<S> = parents.into_iter().collect();
        let created = self.resources.insert(
            resource.clone(),
            parents.iter().cloned(),
            self.config.cycle_policy,
        )?;
        tracing::debug!(resource = ?resource, parents = ?parents, created, "Registered resource");
        Ok(())
    }

    /// Allow `role` (and every role inheriting from it) to perform `operation`
    /// on `resource` (and every resource inheriting from it).
    ///
    /// Any of the three may be [`Selector::Any`]. Replaces an existing allow
    /// rule for the same triple.
    pub fn allow(
        &mut self,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<()> {
        self.insert_rule(Effect::Allow, role.into(), operation.into(), resource.into(), None)
    }

    /// Like [`Registry::allow`], but the rule only applies while `assertion` holds.
    pub fn allow_if<A>(
        &mut self,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
        assertion: A,
    ) -> AclResult<()>
    where
        A: Assertion<R, S, O> + 'static,
    {
        self.insert_rule(
            Effect::Allow,
            role.into(),
            operation.into(),
            resource.into(),
            Some(Arc::new(assertion)),
        )
    }

    /// Deny `role` (and every role inheriting from it) the `operation` on
    /// `resource` (and every resource inheriting from it).
    pub fn deny(
        &mut self,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<()> {
        self.insert_rule(Effect::Deny, role.into(), operation.into(), resource.into(), None)
    }

    /// Like [`Registry::deny`], but the rule only applies while `assertion` holds.
    pub fn deny_if<A>(
        &mut self,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
        assertion: A,
    ) -> AclResult<()>
    where
        A: Assertion<R, S, O> + 'static,
    {
        self.insert_rule(
            Effect::Deny,
            role.into(),
            operation.into(),
            resource.into(),
            Some(Arc::new(assertion)),
        )
    }

    /// Store a rule in the table for `effect`.
    pub fn add_rule(
        &mut self,
        effect: Effect,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<()> {
        self.insert_rule(effect, role.into(), operation.into(), resource.into(), None)
    }

    fn insert_rule(
        &mut self,
        effect: Effect,
        role: Selector<R>,
        operation: Selector<O>,
        resource: Selector<S>,
        assertion: Option<SharedAssertion<R, S, O>>,
    ) -> AclResult<()> {
        self.roles.ensure_known(&role)?;
        self.resources.ensure_known(&resource)?;

        tracing::debug!(
            effect = ?effect,
            role = ?role,
            operation = ?operation,
            resource = ?resource,
            conditional = assertion.is_some(),
            "Stored rule"
        );

        match effect {
            Effect::Allow => {
                match &role {
                    Selector::Any => self.any_role_allowed = true,
                    Selector::Exact(r) => self.clear_deny_only(r),
                }
                self.allowed.insert((role, operation, resource), assertion);
            }
            Effect::Deny => {
                self.denied.insert((role, operation, resource), assertion);
            }
        }
        Ok(())
    }

    /// Drop `role` and everything below it from the deny-only set.
    fn clear_deny_only(&mut self, role: &R) {
        if self.deny_only.remove(role) {
            for child in self.roles.descendants(role) {
                self.deny_only.remove(&child);
            }
        }
    }

    /// Check whether `role` may perform `operation` on `resource`.
    ///
    /// # Returns
    ///
    /// `Denied` if any deny rule matches, otherwise `Allowed` if any allow
    /// rule matches, otherwise `Unspecified`.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` for an unregistered role or resource, `Assertion` if an
    /// assertion fails.
    pub fn is_allowed(
        &self,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<Decision> {
        self.is_allowed_with(role, operation, resource, &Extras::new())
    }

    /// Like [`Registry::is_allowed`], passing `extras` to every assertion.
    pub fn is_allowed_with(
        &self,
        role: impl Into<Selector<R>>,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
        extras: &Extras,
    ) -> AclResult<Decision> {
        self.check_role(
            &role.into(),
            &operation.into(),
            &resource.into(),
            extras,
            CheckMode::Full,
        )
    }

    /// Evaluate one role, consulting the tables selected by `mode`.
    pub fn check_role(
        &self,
        role: &Selector<R>,
        operation: &Selector<O>,
        resource: &Selector<S>,
        extras: &Extras,
        mode: CheckMode,
    ) -> AclResult<Decision> {
        self.roles.ensure_known(role)?;
        self.resources.ensure_known(resource)?;

        let roles = self.roles.closure(role);
        let operations = match operation {
            Selector::Any => vec![Selector::Any],
            Selector::Exact(_) => vec![operation.clone(), Selector::Any],
        };
        let resources = self.resources.closure(resource);

        let ctx = AssertionContext {
            registry: self,
            role,
            operation,
            resource,
            extras,
        };

        let mut decision = Decision::Unspecified;
        for r in &roles {
            for o in &operations {
                for s in &resources {
                    let key = (r.clone(), o.clone(), s.clone());

                    if let Some(assertion) = self.denied.get(&key) {
                        if holds(assertion, &ctx)? {
                            tracing::trace!(role = ?r, operation = ?o, resource = ?s, "Deny rule matched");
                            return Ok(Decision::Denied);
                        }
                    }

                    if mode == CheckMode::Full {
                        if let Some(assertion) = self.allowed.get(&key) {
                            if holds(assertion, &ctx)? {
                                tracing::trace!(role = ?r, operation = ?o, resource = ?s, "Allow rule matched");
                                decision = Decision::Allowed;
                            }
                        }
                    }
                }
            }
        }

        tracing::trace!(role = ?role, operation = ?operation, resource = ?resource, decision = %decision, "Evaluated role");
        Ok(decision)
    }

    /// Check whether any of `roles` may perform `operation` on `resource`.
    ///
    /// Roles are evaluated in the given order. A deny for any role wins; see
    /// [`crate::aggregate::is_any_allowed`] for the exact rules.
    pub fn is_any_allowed(
        &self,
        roles: &[R],
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<Decision> {
        self.is_any_allowed_with(roles, operation, resource, &Extras::new())
    }

    /// Like [`Registry::is_any_allowed`], passing `extras` to every assertion.
    pub fn is_any_allowed_with(
        &self,
        roles: &[R],
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
        extras: &Extras,
    ) -> AclResult<Decision> {
        aggregate::is_any_allowed(self, roles, &operation.into(), &resource.into(), extras)
    }

    /// Check if a role has no allow rule on itself or any ancestor.
    ///
    /// Unknown roles are never deny-only.
    pub fn is_deny_only(&self, role: &R) -> bool {
        !self.any_role_allowed && self.deny_only.contains(role)
    }

    /// Check if a role is registered.
    pub fn has_role(&self, role: &R) -> bool {
        self.roles.contains(role)
    }

    /// Check if a resource is registered.
    pub fn has_resource(&self, resource: &S) -> bool {
        self.resources.contains(resource)
    }

    /// Direct parents of a role.
    pub fn role_parents(&self, role: &R) -> &[R] {
        self.roles.parents(role)
    }

    /// Direct parents of a resource.
    pub fn resource_parents(&self, resource: &S) -> &[S] {
        self.resources.parents(resource)
    }

    /// All registered roles, in no particular order.
    pub fn roles(&self) -> impl Iterator<Item = &R> {
        self.roles.nodes()
    }

    /// All registered resources, in no particular order.
    pub fn resources(&self) -> impl Iterator<Item = &S> {
        self.resources.nodes()
    }

    /// The role hierarchy.
    pub fn role_hierarchy(&self) -> &Hierarchy<R> {
        &self.roles
    }

    /// The resource hierarchy.
    pub fn resource_hierarchy(&self) -> &Hierarchy<S> {
        &self.resources
    }

    /// Number of stored rules with the given effect.
    pub fn rule_count(&self, effect: Effect) -> usize {
        match effect {
            Effect::Allow => self.allowed.len(),
            Effect::Deny => self.denied.len(),
        }
    }
}

/// A missing assertion always holds.
fn holds<R, S, O>(
    assertion: &Option<SharedAssertion<R, S, O>>,
    ctx: &AssertionContext<'_, R, S, O>,
) -> AclResult<bool> {
    match assertion {
        None => Ok(true),
        Some(assertion) => assertion.check(ctx).map_err(AclError::Assertion),
    }
}

impl<R, S, O> RoleCheck<R, S, O> for Registry<R, S, O>
where
    R: Key,
    S: Key,
    O: Key,
{
    fn check_role(
        &self,
        role: &Selector<R>,
        operation: &Selector<O>,
        resource: &Selector<S>,
        extras: &Extras,
        mode: CheckMode,
    ) -> AclResult<Decision> {
        Registry::check_role(self, role, operation, resource, extras, mode)
    }

    fn is_deny_only(&self, role: &R) -> bool {
        Registry::is_deny_only(self, role)
    }

    fn short_circuit_deny_only(&self) -> bool {
        self.config.short_circuit_deny_only
    }
}

impl<R, S, O> Default for Registry<R, S, O>
where
    R: Key,
    S: Key,
    O: Key,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S, O> fmt::Debug for Registry<R, S, O>
where
    R: fmt::Debug,
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("roles", &self.roles)
            .field("resources", &self.resources)
            .field("allowed", &self.allowed.len())
            .field("denied", &self.denied.len())
            .field("any_role_allowed", &self.any_role_allowed)
            .finish()
    }
}
