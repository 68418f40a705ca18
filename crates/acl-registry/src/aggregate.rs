//! # Multi-Role Evaluation
//!
//! Combines the per-role decisions of a principal holding several roles.
//!
//! ## Rules
//!
//! - Roles are evaluated in the order given, never reordered or deduplicated.
//! - A `Denied` role ends the evaluation with `Denied`.
//! - An `Allowed` role is remembered; later roles are still checked, but only
//!   against the deny table.
//! - While nothing has granted access, if every remaining role is deny-only
//!   the evaluation stops with `Denied` without checking them.
//! - Otherwise the result is `Allowed` if some role was allowed, else `Unspecified`.

use crate::assertion::Extras;
use crate::decision::Decision;
use crate::error::AclResult;
use crate::registry::CheckMode;
use crate::selector::Selector;

/// Per-role evaluation used by [`is_any_allowed`].
///
/// [`crate::Registry`] implements this trait. Wrapping it lets callers observe
/// or adjust exactly which roles get evaluated.
pub trait RoleCheck<R, S, O> {
    /// Evaluate a single role.
    fn check_role(
        &self,
        role: &Selector<R>,
        operation: &Selector<O>,
        resource: &Selector<S>,
        extras: &Extras,
        mode: CheckMode,
    ) -> AclResult<Decision>;

    /// Check if the role can only ever be denied or unspecified.
    fn is_deny_only(&self, role: &R) -> bool;

    /// Whether deny-only roles may be skipped.
    fn short_circuit_deny_only(&self) -> bool {
        true
    }
}

/// Evaluate `roles` in order against one request.
///
/// # Example
///
/// ```
/// use acl_registry::{Decision, Registry};
///
/// let mut acl: Registry<&str, &str, &str> = Registry::new();
/// acl.add_role("reader", []).unwrap();
/// acl.add_role("banned", []).unwrap();
/// acl.add_resource("wiki", []).unwrap();
/// acl.allow("reader", "view", "wiki").unwrap();
/// acl.deny("banned", "view", "wiki").unwrap();
///
/// assert_eq!(acl.is_any_allowed(&["reader"], "view", "wiki").unwrap(), Decision::Allowed);
/// assert_eq!(acl.is_any_allowed(&["reader", "banned"], "view", "wiki").unwrap(), Decision::Denied);
/// assert_eq!(acl.is_any_allowed(&[], "view", "wiki").unwrap(), Decision::Unspecified);
/// ```
pub fn is_any_allowed<R, S, O, C>(
    checker: &C,
    roles: &[R],
    operation: &Selector<O>,
    resource: &Selector<S>,
    extras: &Extras,
) -> AclResult<Decision>
where
    R: Clone + std::fmt::Debug,
    C: RoleCheck<R, S, O> + ?Sized,
{
    // Every role after this index is deny-only
    let last_grantor = if checker.short_circuit_deny_only() {
        roles.iter().rposition(|role| !checker.is_deny_only(role))
    } else {
        roles.len().checked_sub(1)
    };

    let mut current = Decision::Unspecified;
    for (index, role) in roles.iter().enumerate() {
        let remaining_deny_only = last_grantor.map_or(true, |last| index > last);
        if !current.is_allowed() && remaining_deny_only {
            tracing::trace!(skipped = roles.len() - index, "Remaining roles are deny-only");
            return Ok(Decision::Denied);
        }

        let mode = if current.is_allowed() {
            CheckMode::DenyOnly
        } else {
            CheckMode::Full
        };

        let role = Selector::Exact(role.clone());
        match checker.check_role(&role, operation, resource, extras, mode)? {
            Decision::Denied => {
                tracing::trace!(role = ?role, "Role denied");
                return Ok(Decision::Denied);
            }
            Decision::Allowed => current = Decision::Allowed,
            Decision::Unspecified => {}
        }
    }

    Ok(current)
}
