//! # ACL Context
//!
//! Permission guards bound to the roles of the current caller.
//!
//! ## Overview
//!
//! The acl-context crate handles:
//! - **Role loading**: A [`RoleLoader`] yields the caller's roles, in order, on every check
//! - **Guards**: [`PermissionContext`] checks one (operation, resource) pair
//! - **Refusals**: [`PermissionDenied`] carries the message and details set on the guard
//!
//! A guard is used explicitly ([`PermissionContext::check`]), as a boolean
//! ([`PermissionContext::is_granted`]), or as a scope
//! ([`PermissionContext::enter`] and [`PermissionContext::protect`]).
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use acl_context::{IdentityContext, StaticRoles};
//! use acl_registry::{Registry, Selector};
//!
//! let mut acl: Registry<&str, &str, &str> = Registry::new();
//! acl.add_role("staff", []).unwrap();
//! acl.add_role("badguy", ["staff"]).unwrap();
//! acl.add_resource("article", []).unwrap();
//! acl.allow("staff", "view", "article").unwrap();
//! acl.deny("badguy", Selector::Any, "article").unwrap();
//!
//! let context = IdentityContext::new(Arc::new(acl), StaticRoles::new(["badguy"]));
//! let view = context
//!     .check_permission("view", "article")
//!     .with_message("can not view");
//!
//! let err = view.protect(|| "<view>").unwrap_err();
//! assert_eq!(err.to_string(), "can not view");
//! ```

pub mod context;
pub mod error;
pub mod loader;

// Re-export main types for convenience
pub use context::{IdentityContext, PermissionContext, PermissionScope};
pub use error::{ContextError, ContextResult, PermissionDenied};
pub use loader::{RoleLoader, StaticRoles};
