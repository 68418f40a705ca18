//! # ACL Proxy
//!
//! Maps domain models onto registry keys.
//!
//! ## Overview
//!
//! The acl-proxy crate handles:
//! - **Identities**: [`Identity`] keys for plain names, model types and model instances
//! - **Auto-registration**: Model identities join the registry on first use
//! - **Inheritance**: Instances inherit every rule placed on their model type
//!
//! ## Usage
//!
//! ```rust
//! use acl_proxy::{instance, model, Model, RegistryProxy};
//!
//! struct Group {
//!     name: String,
//! }
//!
//! impl Model for Group {
//!     fn model_id(&self) -> String {
//!         self.name.clone()
//!     }
//! }
//!
//! let mut proxy: RegistryProxy = RegistryProxy::new();
//! proxy.add_role("staff", Vec::<&str>::new()).unwrap();
//! proxy.allow("staff", "join", model::<Group>()).unwrap();
//!
//! let group = Group { name: "rustaceans".to_string() };
//! let decision = proxy.is_allowed("staff", "join", instance(&group)).unwrap();
//! assert!(decision.is_allowed());
//! ```

pub mod identity;
pub mod proxy;

// Re-export main types for convenience
pub use identity::{instance, model, Identity, Instance, IntoIdentity, Model, ModelType};
pub use proxy::RegistryProxy;
