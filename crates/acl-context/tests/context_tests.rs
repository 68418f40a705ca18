//! Guard behaviour across the ways a guard can be used.
//!
//! Fixture:
//!
//! ```text
//! roles:     staff < editor
//!            staff < badguy
//! resources: article
//! rules:     allow(staff, view, article)
//!            allow(editor, edit, article)
//!            deny(badguy, *, article)
//! ```

use std::sync::{Arc, Mutex};

use acl_context::{ContextError, ContextResult, IdentityContext, StaticRoles};
use acl_registry::{Decision, Registry, Selector};

type Acl = Registry<&'static str, &'static str, &'static str>;
type Context = IdentityContext<&'static str, &'static str, &'static str>;

/// Roles the current caller holds; tests swap them between checks.
#[derive(Clone, Default)]
struct Session(Arc<Mutex<Vec<&'static str>>>);

impl Session {
    fn become_roles(&self, roles: &[&'static str]) {
        *self.0.lock().unwrap() = roles.to_vec();
    }
}

fn fixture() -> (Context, Session) {
    let mut acl = Acl::new();
    acl.add_role("staff", []).unwrap();
    acl.add_role("editor", ["staff"]).unwrap();
    acl.add_role("badguy", ["staff"]).unwrap();
    acl.add_resource("article", []).unwrap();

    acl.allow("staff", "view", "article").unwrap();
    acl.allow("editor", "edit", "article").unwrap();
    acl.deny("badguy", Selector::Any, "article").unwrap();

    let session = Session::default();
    let roles = session.clone();
    let context = IdentityContext::new(Arc::new(acl), move || roles.0.lock().unwrap().clone());
    (context, session)
}

const STAFF: &[&[&str]] = &[&["staff"]];
const EDITOR: &[&[&str]] = &[&["editor"], &["staff", "editor"]];
const BADGUY: &[&[&str]] = &[
    &["badguy"],
    &["staff", "badguy"],
    &["editor", "badguy"],
    &["staff", "editor", "badguy"],
];

/// Drive `view` and `edit` through every role combination of the fixture.
fn assert_guarded<V, E>(session: &Session, view: V, edit: E)
where
    V: Fn() -> ContextResult<bool>,
    E: Fn() -> ContextResult<bool>,
{
    for roles in STAFF {
        session.become_roles(roles);
        assert!(view().unwrap(), "{roles:?} should view");
        assert!(edit().unwrap_err().is_denied(), "{roles:?} should not edit");
    }

    for roles in EDITOR {
        session.become_roles(roles);
        assert!(view().unwrap(), "{roles:?} should view");
        assert!(edit().unwrap(), "{roles:?} should edit");
    }

    for roles in BADGUY {
        session.become_roles(roles);
        assert!(view().unwrap_err().is_denied(), "{roles:?} should not view");
        assert!(edit().unwrap_err().is_denied(), "{roles:?} should not edit");
    }
}

#[test]
fn test_protect() {
    let (context, session) = fixture();
    let view = context.check_permission("view", "article");
    let edit = context.check_permission("edit", "article");

    assert_guarded(&session, || view.protect(|| true), || edit.protect(|| true));
}

#[test]
fn test_scoped_guard() {
    let (context, session) = fixture();

    let view_article = || -> ContextResult<bool> {
        let guard = context.check_permission("view", "article");
        let _scope = guard.enter()?;
        Ok(guard.in_context())
    };
    let edit_article = || -> ContextResult<bool> {
        let guard = context.check_permission("edit", "article");
        let _scope = guard.enter()?;
        Ok(guard.in_context())
    };

    assert_guarded(&session, view_article, edit_article);
}

#[test]
fn test_check_function() {
    let (context, session) = fixture();
    let view = context.check_permission("view", "article");
    let edit = context.check_permission("edit", "article");

    assert_guarded(
        &session,
        || view.check().map(|()| true),
        || edit.check().map(|()| true),
    );
}

#[test]
fn test_is_granted() {
    let (context, session) = fixture();
    let view = context.check_permission("view", "article");
    let edit = context.check_permission("edit", "article");

    for roles in STAFF {
        session.become_roles(roles);
        assert!(view.is_granted().unwrap());
        assert!(!edit.is_granted().unwrap());
    }
    for roles in EDITOR {
        session.become_roles(roles);
        assert!(view.is_granted().unwrap());
        assert!(edit.is_granted().unwrap());
    }
    for roles in BADGUY {
        session.become_roles(roles);
        assert!(!view.is_granted().unwrap());
        assert!(!edit.is_granted().unwrap());
    }
}

#[test]
fn test_refusal_reports_decision() {
    let (context, session) = fixture();
    let edit = context
        .check_permission("edit", "article")
        .with_message("can not edit")
        .with_detail("article_id", "7");

    session.become_roles(&["staff"]);
    match edit.check() {
        Err(ContextError::Denied(denied)) => {
            assert_eq!(denied.message, "can not edit");
            assert_eq!(denied.decision, Decision::Unspecified);
            assert!(!denied.is_explicit());
            assert_eq!(denied.detail("article_id"), Some("7"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    session.become_roles(&["badguy"]);
    match edit.check() {
        Err(ContextError::Denied(denied)) => {
            assert_eq!(denied.decision, Decision::Denied);
            assert!(denied.is_explicit());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_protect_skips_body_when_refused() {
    let (context, session) = fixture();
    session.become_roles(&["staff"]);

    let mut ran = false;
    let result = context.check_permission("edit", "article").protect(|| ran = true);
    assert!(result.unwrap_err().is_denied());
    assert!(!ran);
}

#[test]
fn test_set_role_loader() {
    let (mut context, _session) = fixture();
    context.set_role_loader(StaticRoles::new(["editor"]));
    assert_eq!(context.load_roles(), vec!["editor"]);
    assert!(context.has_permission("edit", "article").unwrap());
    assert_eq!(context.decision("delete", "article").unwrap(), Decision::Unspecified);
}

#[test]
fn test_no_roles() {
    let (context, session) = fixture();
    session.become_roles(&[]);
    assert_eq!(context.decision("view", "article").unwrap(), Decision::Unspecified);
    assert!(!context.has_permission("view", "article").unwrap());
}

#[test]
fn test_unknown_role_is_not_a_refusal() {
    let (context, session) = fixture();
    session.become_roles(&["ghost"]);
    let err = context.check_permission("view", "article").check().unwrap_err();
    assert!(!err.is_denied());
    assert!(context.has_permission("view", "article").is_err());
}
