//! End-to-end flow: provider → hook → renderers, as an application uses it.

use std::time::Duration;

use rolegate_auth::{User, resolver_fn, resolver_from_user};
use rolegate_ui::{
    Branch, IfPermission, IfRole, OUTSIDE_PROVIDER_MESSAGE, PermissionProvider, PermissionScope,
    PermissionView, use_permission, use_permission_resolver,
};

#[tokio::test]
async fn hook_exposes_user_and_predicates() {
    let user = User::new().with_role("admin").with_permissions(["read", "write"]);
    let provider = PermissionProvider::new(resolver_from_user(user.clone()));

    let state = provider
        .render(&PermissionScope::root(), use_permission)
        .unwrap();

    assert_eq!(state.user(), user);
    assert!(state.has_role("admin"));
    assert!(!state.has_role("user"));
    assert!(state.has_permission("read"));
    assert!(!state.has_permission("delete"));
    assert!(!state.loading());
}

#[tokio::test]
async fn hook_handles_async_resolver() {
    let user = User::new().with_role("user").with_permissions(["read"]);
    let expected = user.clone();
    let provider = PermissionProvider::new(resolver_fn(move || {
        let user = user.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, anyhow::Error>(user)
        }
    }));

    let state = provider
        .render(&PermissionScope::root(), use_permission)
        .unwrap();
    assert!(state.loading());

    let loaded = state.loaded().await;
    assert!(!loaded.loading);
    assert_eq!(loaded.user, expected);
    assert_eq!(state.user(), expected);
}

#[tokio::test]
async fn renderers_wait_for_resolution_then_pick_a_branch() {
    let provider = PermissionProvider::new(resolver_fn(|| async {
        tokio::task::yield_now().await;
        Ok::<_, anyhow::Error>(User::new().with_permissions(["read"]))
    }));
    let state = provider
        .render(&PermissionScope::root(), use_permission)
        .unwrap();

    let read = IfPermission::new("read", "Read Content");
    let write = IfPermission::new("write", "Write Content").fallback("No Write Access");

    assert_eq!(read.render(&state), None);
    assert_eq!(write.render(&state), None);

    state.loaded().await;

    assert_eq!(read.render(&state), Some(&"Read Content"));
    assert_eq!(write.render(&state), Some(&"No Write Access"));
}

#[tokio::test]
async fn nested_provider_gates_its_subtree_independently() {
    let root = PermissionScope::root();
    let outer = PermissionProvider::new(resolver_from_user(User::new().with_role("user")));
    let inner = PermissionProvider::new(resolver_from_user(User::new().with_role("admin")));

    let (outer_branch, inner_branch) = outer.render(&root, |outer_scope| {
        let gate = IfRole::new("admin", "Admin Content").fallback("Access Denied");

        let outer_state = use_permission(outer_scope).unwrap();
        let inner_state = inner
            .render(outer_scope, use_permission)
            .unwrap();

        (gate.branch(&outer_state), gate.branch(&inner_state))
    });

    assert_eq!(outer_branch, Branch::Fallback);
    assert_eq!(inner_branch, Branch::Primary);
}

#[test]
fn resolver_accessor_outside_provider_fails() {
    let err = use_permission_resolver(&PermissionScope::root()).unwrap_err();
    assert_eq!(err.to_string(), OUTSIDE_PROVIDER_MESSAGE);
}

#[test]
fn resolver_accessor_inside_provider_returns_provided_resolver() {
    let resolver = resolver_from_user(User::new().with_role("admin"));
    let provider = PermissionProvider::new(resolver.clone());

    let found = provider
        .render(&PermissionScope::root(), use_permission_resolver)
        .unwrap();
    assert!(rolegate_auth::same_resolver(&found, &resolver));
}

#[tokio::test]
async fn predicates_on_interim_state_answer_against_unresolved_user() {
    let scope = PermissionScope::root().provide(resolver_fn(|| {
        futures::future::pending::<Result<User, anyhow::Error>>()
    }));
    let state = use_permission(&scope).unwrap().snapshot();

    assert!(state.is_loading());
    assert_eq!(state.user, User::unresolved());
    assert!(!state.has_role("admin"));
    assert!(!state.has_permission("read"));
}
