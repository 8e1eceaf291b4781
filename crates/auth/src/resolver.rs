//! Resolver contract: the caller-supplied capability that produces a [`User`].
//!
//! Every resolver answers through the same asynchronous contract, even when
//! the answer is already known. Consumers that care about immediacy (the UI
//! state machine) poll the returned future once before deciding to wait.

use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use thiserror::Error;

use crate::User;

/// Failure reported by a resolver.
///
/// This crate never translates or recovers from it; it exists so the failure
/// can travel to whoever owns the resolver.
#[derive(Debug, Error)]
#[error("permission resolver failed: {0:#}")]
pub struct ResolveError(anyhow::Error);

impl ResolveError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

pub type ResolveFuture = BoxFuture<'static, Result<User, ResolveError>>;

/// Zero-argument capability producing the current user's role/permissions.
///
/// Implementations own all transport, retry and timeout policy.
pub trait Resolver: Send + Sync + 'static {
    fn resolve(&self) -> ResolveFuture;
}

/// Resolver handle as passed through scopes.
///
/// Identity (pointer equality of the allocation) is what decides whether a
/// resolution has to be re-run; cloning the handle keeps the identity.
pub type SharedResolver = Arc<dyn Resolver>;

impl core::fmt::Debug for dyn Resolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

/// Reference identity of two resolver handles.
pub fn same_resolver(a: &SharedResolver, b: &SharedResolver) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

struct FnResolver<F>(F);

impl<F, Fut, E> Resolver for FnResolver<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<User, E>> + Send + 'static,
    E: Into<anyhow::Error> + 'static,
{
    fn resolve(&self) -> ResolveFuture {
        (self.0)().map(|res| res.map_err(ResolveError::new)).boxed()
    }
}

/// Wrap an async closure as a resolver.
///
/// ```
/// use rolegate_auth::{resolver_fn, User};
///
/// let resolver = resolver_fn(|| async { Ok::<_, anyhow::Error>(User::new().with_role("admin")) });
/// # let _ = resolver;
/// ```
pub fn resolver_fn<F, Fut, E>(f: F) -> SharedResolver
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<User, E>> + Send + 'static,
    E: Into<anyhow::Error> + 'static,
{
    Arc::new(FnResolver(f))
}

struct StaticResolver(User);

impl Resolver for StaticResolver {
    fn resolve(&self) -> ResolveFuture {
        future::ready(Ok(self.0.clone())).boxed()
    }
}

/// A resolver that always answers immediately with `user`.
pub fn resolver_from_user(user: User) -> SharedResolver {
    Arc::new(StaticResolver(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_resolver_is_immediately_ready() {
        let user = User::new().with_role("admin");
        let resolver = resolver_from_user(user.clone());

        let resolved = resolver.resolve().now_or_never();
        assert_eq!(resolved.map(|r| r.unwrap()), Some(user));
    }

    #[test]
    fn fn_resolver_wraps_errors() {
        let resolver = resolver_fn(|| async { Err::<User, _>(anyhow::anyhow!("backend down")) });

        let err = futures::executor::block_on(resolver.resolve()).unwrap_err();
        assert_eq!(err.to_string(), "permission resolver failed: backend down");
    }

    #[test]
    fn identity_follows_the_allocation() {
        let a = resolver_from_user(User::new());
        let b = resolver_from_user(User::new());
        let a2 = Arc::clone(&a);

        assert!(same_resolver(&a, &a2));
        assert!(!same_resolver(&a, &b));
    }

    #[test]
    fn shared_handles_are_debug() {
        let resolver = resolver_from_user(User::new());
        assert_eq!(format!("{resolver:?}"), "Resolver { .. }");

        let outcome: Result<SharedResolver, &str> = Err("unconfigured");
        assert_eq!(outcome.unwrap_err(), "unconfigured");
    }
}
