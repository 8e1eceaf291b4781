//! Resolved identity: an optional role and an optional permission set.

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// The outcome of a resolver call.
///
/// A missing field means "unknown / none", which is different from an
/// empty-but-present permission list. Both fields are skipped when absent so
/// that a JSON round-trip preserves that distinction.
///
/// A `User` is never patched in place once resolved; consumers replace it
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Ordered; duplicates are allowed and harmless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
}

impl User {
    /// A user with neither a role nor a permission list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interim value held while a resolution is still pending: no role and an
    /// empty (present) permission list.
    pub fn unresolved() -> Self {
        Self {
            role: None,
            permissions: Some(Vec::new()),
        }
    }

    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Permissions as a slice; an absent list reads as empty.
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_deref().unwrap_or(&[])
    }

    /// Exact, case-sensitive role comparison.
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_ref().is_some_and(|r| r.as_str() == role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions().iter().any(|p| p.as_str() == permission)
    }

    /// True when every listed permission is present.
    pub fn has_all_permissions<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        required
            .into_iter()
            .all(|p| self.has_permission(p.as_str()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
