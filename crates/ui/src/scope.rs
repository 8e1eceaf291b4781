//! Resolver scope: which resolver is visible to a subtree.
//!
//! Scopes are explicit handles threaded through component construction. A
//! child scope created with [`PermissionScope::provide`] shadows the outer
//! resolver for its own subtree only; the parent handle is never modified.

use rolegate_auth::SharedResolver;
use thiserror::Error;

/// Stable message of [`ConfigurationError`].
pub const OUTSIDE_PROVIDER_MESSAGE: &str =
    "usePermissionResolver must be used within PermissionProvider";

/// The resolver accessor was used where no provider configured one.
///
/// This is a programmer error; nothing in this crate recovers from it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{}", OUTSIDE_PROVIDER_MESSAGE)]
pub struct ConfigurationError;

#[derive(Clone, Default)]
pub struct PermissionScope {
    resolver: Option<SharedResolver>,
}

impl PermissionScope {
    /// Scope with no resolver configured.
    pub fn root() -> Self {
        Self::default()
    }

    /// Child scope in which `resolver` is the current resolver.
    pub fn provide(&self, resolver: SharedResolver) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.resolver.is_some()
    }

    /// The nearest configured resolver.
    pub fn resolver(&self) -> Result<SharedResolver, ConfigurationError> {
        self.resolver.clone().ok_or(ConfigurationError)
    }
}

impl core::fmt::Debug for PermissionScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermissionScope")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Resolver accessor for descendants of a provider.
pub fn use_permission_resolver(
    scope: &PermissionScope,
) -> Result<SharedResolver, ConfigurationError> {
    scope.resolver()
}

/// Scope-configuring wrapper.
///
/// Requiring the resolver at construction makes an unconfigured provider
/// unrepresentable; only code outside every provider can hit
/// [`ConfigurationError`].
#[derive(Clone)]
pub struct PermissionProvider {
    resolver: SharedResolver,
}

impl PermissionProvider {
    pub fn new(resolver: SharedResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &SharedResolver {
        &self.resolver
    }

    /// Scope for this provider's children, nested inside `parent`.
    pub fn scope(&self, parent: &PermissionScope) -> PermissionScope {
        parent.provide(self.resolver.clone())
    }

    /// Build this provider's children inside its scope.
    pub fn render<V>(&self, parent: &PermissionScope, children: impl FnOnce(&PermissionScope) -> V) -> V {
        children(&self.scope(parent))
    }
}

impl core::fmt::Debug for PermissionProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermissionProvider").finish_non_exhaustive()
    }
}
