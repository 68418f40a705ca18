//! Identities for domain models.
//!
//! A model type maps to a class identity and each instance to an instance
//! identity whose parent is its class. Plain names pass through unchanged.

use std::fmt;
use std::marker::PhantomData;

use acl_registry::{EntityKind, Selector};
use serde::{Deserialize, Serialize};

/// A domain type that takes part in access control.
///
/// # Example
///
/// ```
/// use acl_proxy::Model;
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
/// assert!(Post::model_name().ends_with("Post"));
/// ```
pub trait Model {
    /// Fully qualified name of the model type.
    fn model_name() -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Identifier of this instance, unique within the model type.
    fn model_id(&self) -> String;
}

/// A registry key produced by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Identity {
    /// A plain name, never registered automatically.
    Named {
        /// The name as given.
        name: String,
    },
    /// A model type (`id` is `None`) or one of its instances.
    Model {
        /// Whether the identity is used as a role or a resource.
        kind: EntityKind,
        /// Fully qualified model name, from [`Model::model_name`].
        model: String,
        /// Instance id, from [`Model::model_id`].
        id: Option<String>,
    },
}

impl Identity {
    /// A plain named identity.
    pub fn named(name: impl Into<String>) -> Self {
        Identity::Named { name: name.into() }
    }

    /// The class identity of model `M`.
    pub fn model_type<M: Model + ?Sized>(kind: EntityKind) -> Self {
        Identity::Model {
            kind,
            model: M::model_name(),
            id: None,
        }
    }

    /// The identity of one instance of model `M`.
    pub fn instance<M: Model + ?Sized>(kind: EntityKind, instance: &M) -> Self {
        Identity::Model {
            kind,
            model: M::model_name(),
            id: Some(instance.model_id()),
        }
    }

    /// The wildcard, matching every identity.
    pub fn any() -> Selector<Identity> {
        Selector::Any
    }

    /// Check if this identity stands for a model type or instance.
    pub fn is_model(&self) -> bool {
        matches!(self, Identity::Model { .. })
    }

    /// The instance id, if this is a model instance.
    pub fn id(&self) -> Option<&str> {
        match self {
            Identity::Model { id, .. } => id.as_deref(),
            Identity::Named { .. } => None,
        }
    }

    /// The class identity of a model instance.
    pub fn class(&self) -> Option<Identity> {
        match self {
            Identity::Model {
                kind,
                model,
                id: Some(_),
            } => Some(Identity::Model {
                kind: *kind,
                model: model.clone(),
                id: None,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Named { name } => f.write_str(name),
            Identity::Model {
                kind,
                model,
                id: None,
            } => write!(f, "{}-model:{}", kind, model),
            Identity::Model {
                kind,
                model,
                id: Some(id),
            } => write!(f, "{}-model:{}#{}", kind, model, id),
        }
    }
}

/// The model type `M` itself, as opposed to one of its instances.
pub struct ModelType<M: ?Sized>(PhantomData<fn() -> Box<M>>);

impl<M: ?Sized> Clone for ModelType<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for ModelType<M> {}

impl<M: ?Sized> fmt::Debug for ModelType<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelType<{}>", std::any::type_name::<M>())
    }
}

/// Refer to model `M` as a whole.
pub fn model<M: Model + ?Sized>() -> ModelType<M> {
    ModelType(PhantomData)
}

/// A borrowed model instance.
#[derive(Debug)]
pub struct Instance<'a, M: ?Sized>(pub &'a M);

impl<M: ?Sized> Clone for Instance<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for Instance<'_, M> {}

/// Refer to a single model instance.
pub fn instance<M: Model + ?Sized>(value: &M) -> Instance<'_, M> {
    Instance(value)
}

/// Conversion into a registry key for a role or a resource.
///
/// `kind` is ignored by plain names and by values that already are
/// identities.
pub trait IntoIdentity {
    fn into_identity(self, kind: EntityKind) -> Selector<Identity>;
}

impl IntoIdentity for &str {
    fn into_identity(self, _kind: EntityKind) -> Selector<Identity> {
        Selector::Exact(Identity::named(self))
    }
}

impl IntoIdentity for String {
    fn into_identity(self, _kind: EntityKind) -> Selector<Identity> {
        Selector::Exact(Identity::named(self))
    }
}

impl IntoIdentity for Identity {
    fn into_identity(self, _kind: EntityKind) -> Selector<Identity> {
        Selector::Exact(self)
    }
}

impl IntoIdentity for Selector<Identity> {
    fn into_identity(self, _kind: EntityKind) -> Selector<Identity> {
        self
    }
}

impl<M: Model + ?Sized> IntoIdentity for ModelType<M> {
    fn into_identity(self, kind: EntityKind) -> Selector<Identity> {
        Selector::Exact(Identity::model_type::<M>(kind))
    }
}

impl<M: Model + ?Sized> IntoIdentity for Instance<'_, M> {
    fn into_identity(self, kind: EntityKind) -> Selector<Identity> {
        Selector::Exact(Identity::instance(kind, self.0))
    }
}
