use leptos::*;
use rolegate_auth::SharedResolver;

use crate::frontend::{current_scope, use_permission};
use crate::state::PermissionView;

/// Makes `resolver` the current resolver for `children`.
#[component]
pub fn PermissionProvider(resolver: SharedResolver, children: Children) -> impl IntoView {
    provide_context(current_scope().provide(resolver));
    children()
}

#[component]
pub fn IfRole(
    #[prop(into)] role: String,
    children: ChildrenFn,
    #[prop(optional, into)] fallback: ViewFn,
) -> impl IntoView {
    // Outside a provider this is a programmer error, as with `expect_context`.
    let resolution = use_permission().unwrap_or_else(|err| panic!("{err}"));

    move || {
        let state = resolution.get();
        if state.is_loading() {
            ().into_view()
        } else if state.has_role(&role) {
            children().into_view()
        } else {
            fallback.run()
        }
    }
}

#[component]
pub fn IfPermission(
    #[prop(into)] permission: String,
    children: ChildrenFn,
    #[prop(optional, into)] fallback: ViewFn,
) -> impl IntoView {
    let resolution = use_permission().unwrap_or_else(|err| panic!("{err}"));

    move || {
        let state = resolution.get();
        if state.is_loading() {
            ().into_view()
        } else if state.has_permission(&permission) {
            children().into_view()
        } else {
            fallback.run()
        }
    }
}
