//! Identity context and permission guards.
//!
//! [`IdentityContext`] pairs a registry with a [`RoleLoader`]. Each call to
//! [`IdentityContext::check_permission`] builds a [`PermissionContext`] that
//! can be used in three ways, all backed by the same check:
//!
//! - **Explicit**: `guard.check()?`
//! - **Boolean**: `guard.is_granted()?`
//! - **Scoped**: `let _scope = guard.enter()?;` or `guard.protect(|| ...)`
//!
//! `Unspecified` decisions are refused, like explicit denials.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use acl_registry::{AclResult, Decision, Key, Registry, Selector};

use crate::error::{ContextError, ContextResult, PermissionDenied};
use crate::loader::RoleLoader;

/// The registry plus the source of the current caller's roles.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use acl_context::IdentityContext;
/// use acl_registry::Registry;
///
/// let mut acl: Registry<&str, &str, &str> = Registry::new();
/// acl.add_role("staff", []).unwrap();
/// acl.add_resource("article", []).unwrap();
/// acl.allow("staff", "view", "article").unwrap();
///
/// let context = IdentityContext::new(Arc::new(acl), || vec!["staff"]);
/// assert!(context.has_permission("view", "article").unwrap());
/// assert!(!context.has_permission("edit", "article").unwrap());
///
/// let err = context.check_permission("edit", "article").check().unwrap_err();
/// assert!(err.is_denied());
/// ```
pub struct IdentityContext<R, S = R, O = String> {
    registry: Arc<Registry<R, S, O>>,
    loader: Arc<dyn RoleLoader<R>>,
}

impl<R, S, O> IdentityContext<R, S, O>
where
    R: Key,
    S: Key,
    O: Key,
{
    /// Create a context over `registry`, loading roles from `loader`.
    pub fn new<L>(registry: Arc<Registry<R, S, O>>, loader: L) -> Self
    where
        L: RoleLoader<R> + 'static,
    {
        Self {
            registry,
            loader: Arc::new(loader),
        }
    }

    /// Replace the role loader.
    pub fn set_role_loader<L>(&mut self, loader: L)
    where
        L: RoleLoader<R> + 'static,
    {
        self.loader = Arc::new(loader);
    }

    /// The registry checks are evaluated against.
    pub fn registry(&self) -> &Arc<Registry<R, S, O>> {
        &self.registry
    }

    /// Load the current caller's roles.
    pub fn load_roles(&self) -> Vec<R> {
        self.loader.load_roles()
    }

    /// Evaluate the caller's roles and return the raw decision.
    pub fn decision(
        &self,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<Decision> {
        let roles = self.load_roles();
        self.registry.is_any_allowed(&roles, operation, resource)
    }

    /// Build a guard for `operation` on `resource`.
    ///
    /// Nothing is evaluated until the guard is used.
    pub fn check_permission(
        &self,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> PermissionContext<'_, R, S, O> {
        PermissionContext {
            context: self,
            operation: operation.into(),
            resource: resource.into(),
            message: PermissionDenied::DEFAULT_MESSAGE.to_string(),
            details: BTreeMap::new(),
            depth: Cell::new(0),
        }
    }

    /// Check if the caller may perform `operation` on `resource`.
    pub fn has_permission(
        &self,
        operation: impl Into<Selector<O>>,
        resource: impl Into<Selector<S>>,
    ) -> AclResult<bool> {
        self.check_permission(operation, resource).is_granted()
    }
}

/// A reusable permission guard.
///
/// Roles are loaded afresh on every check, so a guard built once reflects
/// later changes of the role loader's answer.
pub struct PermissionContext<'a, R, S = R, O = String> {
    context: &'a IdentityContext<R, S, O>,
    operation: Selector<O>,
    resource: Selector<S>,
    message: String,
    details: BTreeMap<String, String>,
    depth: Cell<usize>,
}

impl<'a, R, S, O> PermissionContext<'a, R, S, O>
where
    R: Key,
    S: Key,
    O: Key,
{
    /// Set the message carried by [`PermissionDenied`].
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a detail to [`PermissionDenied`].
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Evaluate the guard.
    ///
    /// # Errors
    ///
    /// `ContextError::Denied` unless the decision is `Allowed`;
    /// `ContextError::Acl` if the registry cannot evaluate the request.
    pub fn check(&self) -> ContextResult<()> {
        let decision = self
            .context
            .decision(self.operation.clone(), self.resource.clone())?;
        tracing::debug!(
            operation = ?self.operation,
            resource = ?self.resource,
            decision = %decision,
            "Permission check"
        );

        if decision.is_allowed() {
            Ok(())
        } else {
            Err(ContextError::Denied(self.denied(decision)))
        }
    }

    /// Evaluate the guard as a boolean.
    ///
    /// Refusals become `false`; registry errors still propagate.
    pub fn is_granted(&self) -> AclResult<bool> {
        match self.check() {
            Ok(()) => Ok(true),
            Err(ContextError::Denied(_)) => Ok(false),
            Err(ContextError::Acl(err)) => Err(err),
        }
    }

    /// Evaluate the guard and open a scope.
    ///
    /// [`PermissionContext::in_context`] reports `true` while the returned
    /// scope is alive. Dropping it has no other effect.
    pub fn enter(&self) -> ContextResult<PermissionScope<'_, 'a, R, S, O>> {
        self.check()?;
        self.depth.set(self.depth.get() + 1);
        Ok(PermissionScope { guard: self })
    }

    /// Run `f` inside a scope, or fail without running it.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use acl_context::IdentityContext;
    /// use acl_registry::Registry;
    ///
    /// let mut acl: Registry<&str, &str, &str> = Registry::new();
    /// acl.add_role("staff", []).unwrap();
    /// acl.add_resource("article", []).unwrap();
    /// acl.allow("staff", "view", "article").unwrap();
    ///
    /// let context = IdentityContext::new(Arc::new(acl), || vec!["staff"]);
    /// let view = context.check_permission("view", "article");
    /// assert_eq!(view.protect(|| "<view>").unwrap(), "<view>");
    /// ```
    pub fn protect<T, F>(&self, f: F) -> ContextResult<T>
    where
        F: FnOnce() -> T,
    {
        let _scope = self.enter()?;
        Ok(f())
    }

    /// Check if a scope opened by [`PermissionContext::enter`] is alive.
    pub fn in_context(&self) -> bool {
        self.depth.get() > 0
    }

    fn denied(&self, decision: Decision) -> PermissionDenied {
        PermissionDenied {
            message: self.message.clone(),
            operation: format!("{:?}", self.operation),
            resource: format!("{:?}", self.resource),
            decision,
            details: self.details.clone(),
        }
    }
}

/// A granted scope. See [`PermissionContext::enter`].
pub struct PermissionScope<'g, 'a, R, S, O> {
    guard: &'g PermissionContext<'a, R, S, O>,
}

impl<R, S, O> Drop for PermissionScope<'_, '_, R, S, O> {
    fn drop(&mut self) {
        let depth = self.guard.depth.get();
        self.guard.depth.set(depth.saturating_sub(1));
    }
}
