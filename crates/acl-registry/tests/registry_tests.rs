//! Integration tests for rule evaluation over role and resource hierarchies.
//!
//! Fixture:
//!
//! ```text
//! roles:     user < actived_user < writer  < editor
//!                   actived_user < manager < editor
//!            super
//! resources: comment
//!            post < news < event
//!            post < infor
//! rules:     allow(super, *, *)
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use acl_registry::assertion::{self, AssertionContext};
use acl_registry::{json, AclError, Decision, Extras, Registry, Selector};

type Acl = Registry<&'static str, &'static str, &'static str>;
type Ctx<'a> = AssertionContext<'a, &'static str, &'static str, &'static str>;

const ALL_RESOURCES: [&str; 5] = ["comment", "post", "news", "infor", "event"];

fn fixture() -> Acl {
    let mut acl = Acl::new();

    acl.add_role("user", []).unwrap();
    acl.add_role("actived_user", ["user"]).unwrap();
    acl.add_role("writer", ["actived_user"]).unwrap();
    acl.add_role("manager", ["actived_user"]).unwrap();
    acl.add_role("editor", ["writer", "manager"]).unwrap();
    acl.add_role("super", []).unwrap();

    acl.add_resource("comment", []).unwrap();
    acl.add_resource("post", []).unwrap();
    acl.add_resource("news", ["post"]).unwrap();
    acl.add_resource("infor", ["post"]).unwrap();
    acl.add_resource("event", ["news"]).unwrap();

    acl.allow("super", Selector::Any, Selector::Any).unwrap();
    acl
}

fn allowed(decision: Decision) -> bool {
    decision.allowed_or(false)
}

#[test]
fn test_allow() {
    let mut acl = fixture();
    acl.allow("actived_user", "view", "news").unwrap();
    acl.allow("writer", "new", "news").unwrap();

    // "view" operation
    let roles = ["actived_user", "writer", "manager", "editor"];
    for role in roles {
        for resource in ["news", "event"] {
            assert!(allowed(acl.is_allowed(role, "view", resource).unwrap()));
        }
        for resource in ["post", "infor"] {
            assert!(!allowed(acl.is_allowed(role, "view", resource).unwrap()));
        }
    }
    for resource in ["news", "event"] {
        assert!(allowed(acl.is_any_allowed(&roles, "view", resource).unwrap()));
    }
    for resource in ["post", "infor"] {
        assert!(!allowed(acl.is_any_allowed(&roles, "view", resource).unwrap()));
    }

    for resource in ["post", "news", "infor", "event"] {
        assert!(!allowed(acl.is_allowed("user", "view", resource).unwrap()));
        assert!(allowed(acl.is_allowed("super", "view", resource).unwrap()));
        assert!(allowed(acl.is_allowed("super", "new", resource).unwrap()));
        assert!(allowed(acl.is_any_allowed(&["user", "super"], "view", resource).unwrap()));
    }

    // "new" operation
    let roles = ["writer", "editor"];
    for role in roles {
        for resource in ["news", "event"] {
            assert!(allowed(acl.is_allowed(role, "new", resource).unwrap()));
        }
        for resource in ["post", "infor"] {
            assert!(!allowed(acl.is_allowed(role, "new", resource).unwrap()));
        }
    }

    let roles = ["user", "manager"];
    for resource in ["news", "event", "post", "infor"] {
        for role in roles {
            assert!(!allowed(acl.is_allowed(role, "new", resource).unwrap()));
        }
        assert!(!allowed(acl.is_any_allowed(&roles, "new", resource).unwrap()));
    }
}

#[test]
fn test_deny() {
    let mut acl = fixture();
    acl.allow("actived_user", "new", "comment").unwrap();
    acl.deny("manager", "new", "comment").unwrap();

    let roles = ["actived_user", "writer"];
    for role in roles {
        assert_eq!(acl.is_allowed(role, "new", "comment").unwrap(), Decision::Allowed);
    }
    assert_eq!(acl.is_any_allowed(&roles, "new", "comment").unwrap(), Decision::Allowed);

    let roles = ["manager", "editor"];
    for role in roles {
        assert_eq!(acl.is_allowed(role, "new", "comment").unwrap(), Decision::Denied);
    }
    assert_eq!(acl.is_any_allowed(&roles, "new", "comment").unwrap(), Decision::Denied);

    // A denied role anywhere in the list wins
    assert_eq!(
        acl.is_any_allowed(&["writer", "manager"], "new", "comment").unwrap(),
        Decision::Denied
    );
}

#[test]
fn test_undefined() {
    let acl = fixture();
    let roles = ["user", "actived_user", "writer", "manager", "editor"];

    for resource in ALL_RESOURCES {
        for role in roles {
            assert_eq!(acl.is_allowed(role, "x", resource).unwrap(), Decision::Unspecified);
            assert_eq!(acl.is_allowed(role, "", resource).unwrap(), Decision::Unspecified);
            assert_eq!(acl.is_allowed(role, Selector::Any, resource).unwrap(), Decision::Unspecified);
        }
        assert!(!allowed(acl.is_any_allowed(&roles, "x", resource).unwrap()));
        assert!(!allowed(acl.is_any_allowed(&roles, "", resource).unwrap()));
        assert!(!allowed(acl.is_any_allowed(&roles, Selector::Any, resource).unwrap()));
    }

    // The wildcard rule on `super`
    let resources = ALL_RESOURCES
        .iter()
        .map(|r| Selector::Exact(*r))
        .chain([Selector::Any]);
    for resource in resources {
        for operation in [Selector::Exact("undefined"), Selector::Exact("x"), Selector::Exact(""), Selector::Any] {
            assert_eq!(
                acl.is_allowed("super", operation, resource).unwrap(),
                Decision::Allowed
            );
        }
    }
}

#[test]
fn test_assertion() {
    let mut acl = fixture();
    let news_id = Arc::new(AtomicI64::new(1));

    let db = Arc::clone(&news_id);
    let check = assertion::predicate(move |_: &Ctx<'_>| db.load(Ordering::SeqCst) == 10);

    acl.add_role("writer2", ["writer"]).unwrap();
    acl.allow_if("writer", "edit", "news", check).unwrap();
    acl.allow("manager", "edit", "news").unwrap();

    // Assertion does not hold
    assert!(!allowed(acl.is_allowed("writer", "edit", "news").unwrap()));
    assert!(!allowed(acl.is_allowed("writer2", "edit", "news").unwrap()));
    assert!(allowed(acl.is_allowed("manager", "edit", "news").unwrap()));
    assert!(allowed(acl.is_allowed("editor", "edit", "news").unwrap()));

    // Assertion holds
    news_id.store(10, Ordering::SeqCst);
    assert!(allowed(acl.is_allowed("writer", "edit", "news").unwrap()));
    assert!(allowed(acl.is_allowed("writer2", "edit", "news").unwrap()));
    assert!(allowed(acl.is_allowed("editor", "edit", "news").unwrap()));
    assert!(allowed(acl.is_allowed("manager", "edit", "news").unwrap()));
}

#[test]
fn test_conditional_deny() {
    let mut acl = fixture();
    acl.allow("actived_user", "edit", "comment").unwrap();
    acl.deny_if(
        "actived_user",
        "edit",
        "comment",
        assertion::predicate(|ctx: &Ctx<'_>| ctx.extra("locked") == Some(&json!(true))),
    )
    .unwrap();

    assert_eq!(acl.is_allowed("writer", "edit", "comment").unwrap(), Decision::Allowed);

    let mut extras = Extras::new();
    extras.insert("locked".to_string(), json!(true));
    assert_eq!(
        acl.is_allowed_with("writer", "edit", "comment", &extras).unwrap(),
        Decision::Denied
    );
}

#[test]
fn test_assertion_sees_queried_request() {
    let mut acl = fixture();
    acl.allow_if(
        "actived_user",
        "view",
        "post",
        assertion::predicate(|ctx: &Ctx<'_>| {
            ctx.role == &Selector::Exact("editor")
                && ctx.operation == &Selector::Exact("view")
                && ctx.resource == &Selector::Exact("event")
        }),
    )
    .unwrap();

    assert_eq!(acl.is_allowed("editor", "view", "event").unwrap(), Decision::Allowed);
    assert_eq!(acl.is_allowed("writer", "view", "event").unwrap(), Decision::Unspecified);
}

#[test]
fn test_assertion_error_propagates() {
    let mut acl = fixture();
    acl.allow_if(
        "writer",
        "publish",
        "news",
        assertion::fallible(|_: &Ctx<'_>| Err("ownership lookup failed".into())),
    )
    .unwrap();

    let err = acl.is_allowed("editor", "publish", "news").unwrap_err();
    assert!(matches!(err, AclError::Assertion(_)));
    assert_eq!(err.to_string(), "ownership lookup failed");

    let err = acl.is_any_allowed(&["user", "editor"], "publish", "news").unwrap_err();
    assert!(matches!(err, AclError::Assertion(_)));
}

#[test]
fn test_is_any_allowed() {
    let mut acl = fixture();
    acl.allow("writer", "new", "news").unwrap();

    assert_eq!(acl.is_any_allowed(&[], "new", "news").unwrap(), Decision::Unspecified);
    assert_eq!(acl.is_any_allowed(&["manager", "writer"], "new", "news").unwrap(), Decision::Allowed);
    assert_eq!(acl.is_any_allowed(&["writer", "writer"], "new", "news").unwrap(), Decision::Allowed);

    // No role can ever be granted anything: denied without evaluation
    let mut strict = Acl::new();
    strict.add_role("guest", []).unwrap();
    strict.add_resource("wiki", []).unwrap();
    assert_eq!(strict.is_any_allowed(&["guest"], "view", "wiki").unwrap(), Decision::Denied);
    assert_eq!(strict.is_allowed("guest", "view", "wiki").unwrap(), Decision::Unspecified);
}

#[test]
fn test_unknown_entities() {
    let acl = fixture();
    assert!(matches!(
        acl.is_allowed("ghost", "view", "news"),
        Err(AclError::UnknownEntity { .. })
    ));
    assert!(matches!(
        acl.is_allowed("user", "view", "nowhere"),
        Err(AclError::UnknownEntity { .. })
    ));
    assert!(matches!(
        acl.is_any_allowed(&["user", "ghost"], "view", "news"),
        Err(AclError::UnknownEntity { .. })
    ));
}

#[test]
fn test_blog_scenario() {
    let mut acl = Acl::new();
    acl.add_role("user", []).unwrap();
    acl.add_role("actived_user", ["user"]).unwrap();
    acl.add_role("writer", ["actived_user"]).unwrap();
    acl.add_role("manager", ["actived_user"]).unwrap();
    acl.add_role("editor", ["writer", "manager"]).unwrap();
    acl.add_resource("post", []).unwrap();
    acl.add_resource("news", ["post"]).unwrap();

    acl.allow("actived_user", "view", "news").unwrap();

    assert_eq!(acl.is_allowed("editor", "view", "news").unwrap(), Decision::Allowed);
    assert_eq!(acl.is_allowed("user", "view", "news").unwrap(), Decision::Unspecified);
    assert_eq!(acl.is_allowed("editor", "view", "post").unwrap(), Decision::Unspecified);
}

#[test]
fn test_wildcard_role_rule() {
    let mut acl = fixture();
    acl.allow(Selector::Any, "read", "post").unwrap();
    acl.deny(Selector::Any, "delete", Selector::Any).unwrap();

    for role in ["user", "editor", "super"] {
        assert_eq!(acl.is_allowed(role, "read", "event").unwrap(), Decision::Allowed);
        assert_eq!(acl.is_allowed(role, "delete", "comment").unwrap(), Decision::Denied);
    }
    assert_eq!(acl.is_allowed("user", "read", "comment").unwrap(), Decision::Unspecified);

    // The Any-role allow makes every role a potential grantor
    assert_eq!(acl.is_any_allowed(&["user"], "read", "news").unwrap(), Decision::Allowed);
}

#[test]
fn test_transitive_multi_parent_closure() {
    let mut acl = Acl::new();
    acl.add_role("c", []).unwrap();
    acl.add_role("a", ["c"]).unwrap();
    acl.add_role("b", []).unwrap();
    acl.add_role("member", ["a", "b"]).unwrap();
    acl.add_resource("ledger", []).unwrap();

    acl.allow("c", "audit", "ledger").unwrap();
    assert_eq!(acl.is_allowed("member", "audit", "ledger").unwrap(), Decision::Allowed);
    assert_eq!(acl.is_allowed("b", "audit", "ledger").unwrap(), Decision::Unspecified);
}

#[test]
fn test_inherited_allow_assertion_runs_after_grant() {
    let mut acl = fixture();
    acl.allow("writer", "view", "news").unwrap();
    acl.allow_if(
        "user",
        "view",
        "news",
        assertion::fallible(|_: &Ctx<'_>| Err("ownership lookup failed".into())),
    )
    .unwrap();

    let err = acl.is_allowed("writer", "view", "news").unwrap_err();
    assert!(matches!(err, AclError::Assertion(_)));
    assert_eq!(err.to_string(), "ownership lookup failed");
}

#[test]
fn test_every_matching_allow_assertion_is_evaluated() {
    let mut acl = fixture();
    let calls = Arc::new(AtomicI64::new(0));

    let counter = Arc::clone(&calls);
    acl.allow("writer", "view", "news").unwrap();
    acl.allow_if(
        "user",
        "view",
        "news",
        assertion::predicate(move |_: &Ctx<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }),
    )
    .unwrap();

    assert_eq!(acl.is_allowed("writer", "view", "news").unwrap(), Decision::Allowed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
