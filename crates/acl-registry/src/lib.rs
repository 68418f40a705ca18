//! # ACL Registry
//!
//! An in-process role-based access control evaluator. Given roles, resources
//! and permission rules, it answers whether a (role, operation, resource)
//! triple is allowed, denied, or unspecified.
//!
//! ## Overview
//!
//! The acl-registry crate handles:
//! - **Hierarchies**: Roles and resources inherit from any number of parents
//! - **Rules**: Allow and deny rules keyed by (role, operation, resource), with `Any` wildcards
//! - **Assertions**: Runtime predicates that condition a rule
//! - **Multi-role checks**: Ordered evaluation of every role a principal holds
//!
//! ## Architecture
//!
//! ```text
//! Hierarchy (roles)  ──┐
//!                      ├──► Registry::check_role ──► Decision
//! Hierarchy (resources)┘            ▲
//!                                   │
//!           aggregate::is_any_allowed (ordered, short-circuiting)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use acl_registry::{Decision, Registry, Selector};
//!
//! let mut acl: Registry<&str, &str, &str> = Registry::new();
//! acl.add_role("user", []).unwrap();
//! acl.add_role("actived_user", ["user"]).unwrap();
//! acl.add_role("writer", ["actived_user"]).unwrap();
//! acl.add_role("manager", ["actived_user"]).unwrap();
//! acl.add_role("editor", ["writer", "manager"]).unwrap();
//! acl.add_role("super", []).unwrap();
//!
//! acl.add_resource("post", []).unwrap();
//! acl.add_resource("news", ["post"]).unwrap();
//!
//! acl.allow("actived_user", "view", "news").unwrap();
//! acl.allow("super", Selector::Any, Selector::Any).unwrap();
//!
//! assert_eq!(acl.is_allowed("editor", "view", "news").unwrap(), Decision::Allowed);
//! assert_eq!(acl.is_allowed("user", "view", "news").unwrap(), Decision::Unspecified);
//! assert_eq!(acl.is_allowed("super", "delete", "post").unwrap(), Decision::Allowed);
//! ```
//!
//! ## Decisions
//!
//! Queries return a tri-state [`Decision`]. `Denied` means a deny rule matched
//! and always wins. `Unspecified` means no rule matched; most callers treat it
//! as a denial.
//!
//! ## Concurrency
//!
//! The registry is a plain in-memory structure. Mutation takes `&mut self` and
//! queries take `&self`, so sharing it across threads means wrapping it in a
//! lock of the caller's choice.

pub mod aggregate;
pub mod assertion;
pub mod config;
pub mod decision;
pub mod error;
pub mod hierarchy;
pub mod policy;
pub mod registry;
pub mod selector;

// Re-export main types for convenience
pub use aggregate::RoleCheck;
pub use assertion::{Assertion, AssertionContext, Extras};
pub use config::{ConfigError, CyclePolicy, RegistryConfig};
pub use decision::Decision;
pub use error::{AclError, AclResult, AssertionError, EntityKind};
pub use hierarchy::Hierarchy;
pub use policy::{EntityDecl, PolicyDocument, RuleDecl};
pub use registry::{CheckMode, Effect, Key, Registry};
pub use selector::Selector;

// Assertions receive JSON values through `Extras`
pub use serde_json::{json, Value};
