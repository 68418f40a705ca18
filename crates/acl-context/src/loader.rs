//! Role loaders.
//!
//! A loader produces the roles of the current caller, in the order they must
//! be evaluated. The context asks it again on every check.

/// Produces the ordered roles of the current caller.
///
/// Implemented for any `Fn() -> Vec<R>`.
///
/// # Example
///
/// ```
/// use acl_context::RoleLoader;
///
/// let loader = || vec!["staff", "editor"];
/// assert_eq!(loader.load_roles(), vec!["staff", "editor"]);
/// ```
pub trait RoleLoader<R>: Send + Sync {
    /// Load the caller's roles.
    fn load_roles(&self) -> Vec<R>;
}

impl<R, F> RoleLoader<R> for F
where
    F: Fn() -> Vec<R> + Send + Sync,
{
    fn load_roles(&self) -> Vec<R> {
        self()
    }
}

/// A fixed list of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRoles<R>(pub Vec<R>);

impl<R> StaticRoles<R> {
    /// Create a loader that always returns `roles`.
    pub fn new<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        Self(roles.into_iter().collect())
    }
}

impl<R> RoleLoader<R> for StaticRoles<R>
where
    R: Clone + Send + Sync,
{
    fn load_roles(&self) -> Vec<R> {
        self.0.clone()
    }
}
