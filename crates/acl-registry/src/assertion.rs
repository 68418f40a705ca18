//! # Assertions
//!
//! Runtime predicates that condition a rule. A rule with an assertion only
//! takes effect when the assertion holds for the request being evaluated.
//!
//! Assertions receive everything they need through [`AssertionContext`]: the
//! registry, the request as the caller passed it, and an [`Extras`] bag for
//! external state such as the current principal or the target object.

use serde_json::Value;

use crate::error::AssertionError;
use crate::registry::Registry;
use crate::selector::Selector;

/// Free-form request context handed to assertions.
pub type Extras = serde_json::Map<String, Value>;

/// The request an assertion is evaluated against.
///
/// `role`, `operation` and `resource` are the values the query was made with,
/// not the (possibly inherited) keys of the rule that matched.
pub struct AssertionContext<'a, R, S, O> {
    /// Registry evaluating the query.
    pub registry: &'a Registry<R, S, O>,
    /// Role the query was made for.
    pub role: &'a Selector<R>,
    /// Operation being authorized.
    pub operation: &'a Selector<O>,
    /// Resource being accessed.
    pub resource: &'a Selector<S>,
    /// Caller-supplied context.
    pub extras: &'a Extras,
}

impl<'a, R, S, O> AssertionContext<'a, R, S, O> {
    /// Look up a value in the caller-supplied context.
    pub fn extra(&self, key: &str) -> Option<&'a Value> {
        self.extras.get(key)
    }
}

/// A predicate conditioning an allow or deny rule.
///
/// Errors are propagated to the caller of the permission query unchanged.
///
/// Implemented for any `Fn(&AssertionContext) -> Result<bool, AssertionError>`;
/// use [`predicate`] for infallible closures.
pub trait Assertion<R, S, O>: Send + Sync {
    /// Evaluate the predicate.
    fn check(&self, ctx: &AssertionContext<'_, R, S, O>) -> Result<bool, AssertionError>;
}

impl<R, S, O, F> Assertion<R, S, O> for F
where
    F: Fn(&AssertionContext<'_, R, S, O>) -> Result<bool, AssertionError> + Send + Sync,
{
    fn check(&self, ctx: &AssertionContext<'_, R, S, O>) -> Result<bool, AssertionError> {
        self(ctx)
    }
}

/// An infallible assertion built by [`predicate`].
pub struct Predicate<F>(F);

impl<R, S, O, F> Assertion<R, S, O> for Predicate<F>
where
    F: Fn(&AssertionContext<'_, R, S, O>) -> bool + Send + Sync,
{
    fn check(&self, ctx: &AssertionContext<'_, R, S, O>) -> Result<bool, AssertionError> {
        Ok((self.0)(ctx))
    }
}

/// Wrap an infallible closure as an assertion.
///
/// # Example
///
/// ```
/// use acl_registry::{assertion, Registry};
///
/// let mut acl: Registry<&str, &str, &str> = Registry::new();
/// acl.add_role("writer", []).unwrap();
/// acl.add_resource("news", []).unwrap();
/// acl.allow_if(
///     "writer",
///     "edit",
///     "news",
///     assertion::predicate(|ctx| ctx.extra("owner").is_some()),
/// )
/// .unwrap();
///
/// assert!(acl.is_allowed("writer", "edit", "news").unwrap().is_unspecified());
/// ```
pub fn predicate<R, S, O, F>(f: F) -> Predicate<F>
where
    F: Fn(&AssertionContext<'_, R, S, O>) -> bool + Send + Sync,
{
    Predicate(f)
}

/// Wrap a fallible closure as an assertion.
///
/// Equivalent to passing the closure directly, but lets the compiler infer
/// the argument type.
pub fn fallible<R, S, O, F>(f: F) -> F
where
    F: Fn(&AssertionContext<'_, R, S, O>) -> Result<bool, AssertionError> + Send + Sync,
{
    f
}
