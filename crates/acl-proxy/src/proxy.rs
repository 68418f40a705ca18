//! Registry proxy that translates models into identities.

use acl_registry::{
    AclError, AclResult, Assertion, Decision, EntityKind, Extras, Key, Registry, RegistryConfig,
    Selector,
};

use crate::identity::{Identity, IntoIdentity};

/// A [`Registry`] keyed by [`Identity`], accepting names, model types and
/// model instances wherever a role or resource is expected.
///
/// Model identities are registered the first time they are seen. An
/// instance is registered with its model type as parent, so rules on the
/// type apply to every instance. Queries may register identities too, which
/// is why they take `&mut self`.
///
/// # Example
///
/// ```
/// use acl_proxy::{instance, model, Model, RegistryProxy};
///
/// struct Post {
///     title: String,
/// }
///
/// impl Model for Post {
///     fn model_id(&self) -> String {
///         self.title.clone()
///     }
/// }
///
/// let mut proxy: RegistryProxy = RegistryProxy::new();
/// proxy.add_role("staff", Vec::<&str>::new()).unwrap();
/// proxy.allow("staff", "read", model::<Post>()).unwrap();
///
/// let post = Post { title: "hello".to_string() };
/// assert!(proxy.is_allowed("staff", "read", instance(&post)).unwrap().is_allowed());
/// ```
pub struct RegistryProxy<O = String> {
    acl: Registry<Identity, Identity, O>,
}

impl<O: Key> RegistryProxy<O> {
    /// Create a proxy over an empty registry.
    pub fn new() -> Self {
        Self::from_registry(Registry::new())
    }

    /// Create a proxy over an empty registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::from_registry(Registry::with_config(config))
    }

    /// Wrap an existing registry.
    pub fn from_registry(acl: Registry<Identity, Identity, O>) -> Self {
        Self { acl }
    }

    /// The wrapped registry.
    pub fn registry(&self) -> &Registry<Identity, Identity, O> {
        &self.acl
    }

    /// Unwrap the registry.
    pub fn into_inner(self) -> Registry<Identity, Identity, O> {
        self.acl
    }

    /// Add a role, registering model identities among it and its parents.
    ///
    /// See [`Registry::add_role`].
    pub fn add_role<I, P>(&mut self, role: I, parents: P) -> AclResult<()>
    where
        I: IntoIdentity,
        P: IntoIterator,
        P::Item: IntoIdentity,
    {
        let role = self.resolve_exact(role, EntityKind::Role)?;
        let parents = parents
            .into_iter()
            .map(|parent| self.resolve_exact(parent, EntityKind::Role))
            .collect::<AclResult<Vec<_>>>()?;
        self.acl.add_role(role, parents)
    }

    /// Add a resource, registering model identities among it and its parents.
    ///
    /// See [`Registry::add_resource`].
    pub fn add_resource<I, P>(&mut self, resource: I, parents: P) -> AclResult<()>
    where
        I: IntoIdentity,
        P: IntoIterator,
        P::Item: IntoIdentity,
    {
        let resource = self.resolve_exact(resource, EntityKind::Resource)?;
        let parents = parents
            .into_iter()
            .map(|parent| self.resolve_exact(parent, EntityKind::Resource))
            .collect::<AclResult<Vec<_>>>()?;
        self.acl.add_resource(resource, parents)
    }

    /// See [`Registry::allow`].
    pub fn allow(
        &mut self,
        role: impl IntoIdentity,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
    ) -> AclResult<()> {
        let role = self.resolve(role, EntityKind::Role)?;
        let resource = self.resolve(resource, EntityKind::Resource)?;
        self.acl.allow(role, operation, resource)
    }

    /// See [`Registry::allow_if`].
    pub fn allow_if<A>(
        &mut self,
        role: impl IntoIdentity,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
        assertion: A,
    ) -> AclResult<()>
    where
        A: Assertion<Identity, Identity, O> + 'static,
    {
        let role = self.resolve(role, EntityKind::Role)?;
        let resource = self.resolve(resource, EntityKind::Resource)?;
        self.acl.allow_if(role, operation, resource, assertion)
    }

    /// See [`Registry::deny`].
    pub fn deny(
        &mut self,
        role: impl IntoIdentity,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
    ) -> AclResult<()> {
        let role = self.resolve(role, EntityKind::Role)?;
        let resource = self.resolve(resource, EntityKind::Resource)?;
        self.acl.deny(role, operation, resource)
    }

    /// See [`Registry::deny_if`].
    pub fn deny_if<A>(
        &mut self,
        role: impl IntoIdentity,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
        assertion: A,
    ) -> AclResult<()>
    where
        A: Assertion<Identity, Identity, O> + 'static,
    {
        let role = self.resolve(role, EntityKind::Role)?;
        let resource = self.resolve(resource, EntityKind::Resource)?;
        self.acl.deny_if(role, operation, resource, assertion)
    }

    /// See [`Registry::is_allowed`].
    pub fn is_allowed(
        &mut self,
        role: impl IntoIdentity,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
    ) -> AclResult<Decision> {
        self.is_allowed_with(role, operation, resource, &Extras::new())
    }

    /// Like [`RegistryProxy::is_allowed`], passing `extras` to every assertion.
    pub fn is_allowed_with(
        &mut self,
        role: impl IntoIdentity,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
        extras: &Extras,
    ) -> AclResult<Decision> {
        let role = self.resolve(role, EntityKind::Role)?;
        let resource = self.resolve(resource, EntityKind::Resource)?;
        self.acl.is_allowed_with(role, operation, resource, extras)
    }

    /// See [`Registry::is_any_allowed`].
    pub fn is_any_allowed<I>(
        &mut self,
        roles: I,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
    ) -> AclResult<Decision>
    where
        I: IntoIterator,
        I::Item: IntoIdentity,
    {
        self.is_any_allowed_with(roles, operation, resource, &Extras::new())
    }

    /// Like [`RegistryProxy::is_any_allowed`], passing `extras` to every assertion.
    ///
    /// A wildcard in `roles` fails with `UnknownEntity`.
    pub fn is_any_allowed_with<I>(
        &mut self,
        roles: I,
        operation: impl Into<Selector<O>>,
        resource: impl IntoIdentity,
        extras: &Extras,
    ) -> AclResult<Decision>
    where
        I: IntoIterator,
        I::Item: IntoIdentity,
    {
        let roles = roles
            .into_iter()
            .map(|role| self.resolve_exact(role, EntityKind::Role))
            .collect::<AclResult<Vec<_>>>()?;
        let resource = self.resolve(resource, EntityKind::Resource)?;
        self.acl.is_any_allowed_with(&roles, operation, resource, extras)
    }

    fn resolve(&mut self, value: impl IntoIdentity, kind: EntityKind) -> AclResult<Selector<Identity>> {
        let selector = value.into_identity(kind);
        if let Selector::Exact(identity) = &selector {
            self.register(identity)?;
        }
        Ok(selector)
    }

    /// Like `resolve`, for positions where the wildcard has no meaning.
    fn resolve_exact(&mut self, value: impl IntoIdentity, kind: EntityKind) -> AclResult<Identity> {
        match self.resolve(value, kind)? {
            Selector::Exact(identity) => Ok(identity),
            Selector::Any => Err(AclError::UnknownEntity {
                kind,
                name: Selector::<Identity>::Any.to_string(),
            }),
        }
    }

    fn register(&mut self, identity: &Identity) -> AclResult<()> {
        let Identity::Model { kind, .. } = identity else {
            return Ok(());
        };

        let known = match kind {
            EntityKind::Role => self.acl.has_role(identity),
            EntityKind::Resource => self.acl.has_resource(identity),
        };
        if known {
            return Ok(());
        }

        let parents: Vec<Identity> = identity.class().into_iter().collect();
        match kind {
            EntityKind::Role => self.acl.add_role(identity.clone(), parents)?,
            EntityKind::Resource => self.acl.add_resource(identity.clone(), parents)?,
        }
        tracing::debug!(identity = %identity, "Registered model identity");
        Ok(())
    }
}

impl<O: Key> Default for RegistryProxy<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Key> std::fmt::Debug for RegistryProxy<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryProxy")
            .field("acl", &self.acl)
            .finish()
    }
}
