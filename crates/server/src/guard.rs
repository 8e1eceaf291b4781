//! Server-side route guard.
//!
//! A guard wraps a caller-supplied guard function (request context → user)
//! and a set of [`GuardOptions`]. Each invocation is independent: the guard
//! keeps no state between requests.

use std::future::Future;

use rolegate_auth::{AuthzError, Permission, Role, User, authorize};
use serde::{Deserialize, Serialize};

/// Where denied requests go when no redirect is configured.
pub const DEFAULT_REDIRECT: &str = "/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardOptions {
    /// Exact role the user must have. Empty means no constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,

    /// Every listed permission must be present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permissions: Option<Vec<Permission>>,

    /// Redirect target on denial; empty or absent means [`DEFAULT_REDIRECT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl GuardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_role(mut self, role: impl Into<Role>) -> Self {
        self.required_role = Some(role.into());
        self
    }

    pub fn require_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.required_permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn redirect_to(mut self, destination: impl Into<String>) -> Self {
        self.redirect = Some(destination.into());
        self
    }

    pub fn destination(&self) -> &str {
        self.redirect
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_REDIRECT)
    }

    /// Check `user` against these options.
    pub fn check(&self, user: &User) -> Result<(), AuthzError> {
        authorize(
            user,
            self.required_role.as_ref(),
            self.required_permissions.as_deref(),
        )
    }

    /// Turn a resolved user into a decision.
    pub fn evaluate(&self, user: &User) -> GuardDecision {
        match self.check(user) {
            Ok(()) => {
                tracing::debug!("guard allowed request");
                GuardDecision::allow()
            }
            Err(reason) => {
                let destination = self.destination();
                tracing::info!(%reason, destination, "guard denied request");
                GuardDecision::redirect(destination)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub destination: String,
    pub permanent: bool,
}

/// Outcome of one guard invocation.
///
/// Serialises to `{"redirect":{"destination":"/","permanent":false}}` or
/// `{"props":{}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuardDecision {
    Redirect(Redirect),
    Props(serde_json::Map<String, serde_json::Value>),
}

impl GuardDecision {
    /// Continue with an empty props payload; page data is the caller's job.
    pub fn allow() -> Self {
        Self::Props(serde_json::Map::new())
    }

    /// Non-permanent redirect.
    pub fn redirect(destination: impl Into<String>) -> Self {
        Self::Redirect(Redirect {
            destination: destination.into(),
            permanent: false,
        })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Redirect(r) => Some(&r.destination),
            Self::Props(_) => None,
        }
    }
}

/// A guard function bound to its options.
#[derive(Debug, Clone)]
pub struct Guard<F> {
    guard_fn: F,
    options: GuardOptions,
}

/// Build a guard from a guard function and options.
///
/// The guard function is `Fn(C) -> Future<Output = Result<User, E>>`; a
/// synchronous function simply returns a ready future.
pub fn build_guard<F>(guard_fn: F, options: GuardOptions) -> Guard<F> {
    Guard { guard_fn, options }
}

impl<F> Guard<F> {
    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    /// Run the guard for one request.
    ///
    /// The guard function is invoked exactly once. Its error is returned
    /// untouched; denial is a normal [`GuardDecision::Redirect`].
    pub async fn handle<C, Fut, E>(&self, ctx: C) -> Result<GuardDecision, E>
    where
        F: Fn(C) -> Fut,
        Fut: Future<Output = Result<User, E>>,
    {
        let user = (self.guard_fn)(ctx).await?;
        Ok(self.options.evaluate(&user))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn returning(user: User) -> impl Fn(()) -> std::future::Ready<Result<User, Infallible>> {
        move |_| std::future::ready(Ok(user.clone()))
    }

    #[tokio::test]
    async fn required_role_mismatch_redirects_to_default() {
        let guard = build_guard(
            returning(User::new().with_role("user")),
            GuardOptions::new().require_role("admin"),
        );

        let decision = guard.handle(()).await.unwrap();
        assert_eq!(
            decision,
            GuardDecision::Redirect(Redirect {
                destination: "/".to_string(),
                permanent: false,
            })
        );
    }

    #[tokio::test]
    async fn required_role_match_continues_with_empty_props() {
        let guard = build_guard(
            returning(User::new().with_role("admin")),
            GuardOptions::new().require_role("admin"),
        );

        let decision = guard.handle(()).await.unwrap();
        assert_eq!(decision, GuardDecision::Props(serde_json::Map::new()));
    }

    #[tokio::test]
    async fn missing_one_required_permission_redirects() {
        let options = GuardOptions::new()
            .require_permissions(["a", "b"])
            .redirect_to("/login");

        let partial = build_guard(returning(User::new().with_permissions(["a"])), options.clone());
        let decision = partial.handle(()).await.unwrap();
        assert_eq!(decision.destination(), Some("/login"));

        let full = build_guard(returning(User::new().with_permissions(["a", "b"])), options);
        assert!(!full.handle(()).await.unwrap().is_redirect());
    }

    #[tokio::test]
    async fn absent_permissions_fail_required_permissions() {
        let guard = build_guard(
            returning(User::new().with_role("admin")),
            GuardOptions::new().require_permissions(["a"]),
        );
        assert!(guard.handle(()).await.unwrap().is_redirect());
    }

    #[tokio::test]
    async fn role_and_permissions_are_both_enforced() {
        let options = GuardOptions::new()
            .require_role("admin")
            .require_permissions(["reports.read"]);

        let wrong_role = User::new().with_role("user").with_permissions(["reports.read"]);
        let guard = build_guard(returning(wrong_role), options.clone());
        assert!(guard.handle(()).await.unwrap().is_redirect());

        let ok = User::new().with_role("admin").with_permissions(["reports.read"]);
        let guard = build_guard(returning(ok), options);
        assert!(!guard.handle(()).await.unwrap().is_redirect());
    }

    #[tokio::test]
    async fn no_requirements_always_continue() {
        let guard = build_guard(returning(User::new()), GuardOptions::new());
        assert_eq!(guard.handle(()).await.unwrap(), GuardDecision::allow());
    }

    #[tokio::test]
    async fn empty_redirect_falls_back_to_root() {
        let guard = build_guard(
            returning(User::new()),
            GuardOptions::new().require_role("admin").redirect_to(""),
        );
        assert_eq!(guard.handle(()).await.unwrap().destination(), Some("/"));
    }

    #[tokio::test]
    async fn guard_fn_errors_propagate_untouched() {
        let guard = build_guard(
            |_: ()| async { Err::<User, _>("backend unavailable") },
            GuardOptions::new().require_role("admin"),
        );
        assert_eq!(guard.handle(()).await, Err("backend unavailable"));
    }

    #[tokio::test]
    async fn guard_fn_runs_once_per_invocation_with_the_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let guard = build_guard(
            move |role: &'static str| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::task::yield_now().await;
                    Ok::<_, Infallible>(User::new().with_role(role))
                }
            },
            GuardOptions::new().require_role("admin"),
        );

        assert!(!guard.handle("admin").await.unwrap().is_redirect());
        assert!(guard.handle("user").await.unwrap().is_redirect());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn decisions_serialise_to_the_page_contract() {
        let redirect = serde_json::to_value(GuardDecision::redirect("/")).unwrap();
        assert_eq!(
            redirect,
            serde_json::json!({ "redirect": { "destination": "/", "permanent": false } })
        );

        let props = serde_json::to_value(GuardDecision::allow()).unwrap();
        assert_eq!(props, serde_json::json!({ "props": {} }));
    }

    #[test]
    fn options_load_from_camel_case_json() {
        let options: GuardOptions = serde_json::from_str(
            r#"{ "requiredRole": "admin", "requiredPermissions": ["a", "b"], "redirect": "/login" }"#,
        )
        .unwrap();

        assert_eq!(
            options,
            GuardOptions::new()
                .require_role("admin")
                .require_permissions(["a", "b"])
                .redirect_to("/login")
        );
        assert_eq!(GuardOptions::new().destination(), DEFAULT_REDIRECT);
    }
}
