//! Conditional renderers.
//!
//! `IfRole` and `IfPermission` pick between two already-built subtrees. They
//! are generic over the view type `V` so any host tree (strings in tests,
//! Leptos views in the browser) can be gated.

use futures::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;

use crate::state::{PermissionState, PermissionView};

/// Which subtree a renderer shows for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Still loading: render nothing at all.
    Pending,
    Primary,
    Fallback,
}

#[derive(Debug, Clone)]
struct Gate<V> {
    children: V,
    fallback: Option<V>,
}

impl<V> Gate<V> {
    fn branch(loading: bool, allowed: impl FnOnce() -> bool) -> Branch {
        if loading {
            Branch::Pending
        } else if allowed() {
            Branch::Primary
        } else {
            Branch::Fallback
        }
    }

    fn view(&self, branch: Branch) -> Option<&V> {
        match branch {
            Branch::Pending => None,
            Branch::Primary => Some(&self.children),
            Branch::Fallback => self.fallback.as_ref(),
        }
    }
}

/// Renders `children` when the user has `role`, otherwise `fallback`.
#[derive(Debug, Clone)]
pub struct IfRole<V> {
    role: String,
    gate: Gate<V>,
}

impl<V> IfRole<V> {
    pub fn new(role: impl Into<String>, children: V) -> Self {
        Self {
            role: role.into(),
            gate: Gate {
                children,
                fallback: None,
            },
        }
    }

    pub fn fallback(mut self, fallback: V) -> Self {
        self.gate.fallback = Some(fallback);
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn branch(&self, state: &impl PermissionView) -> Branch {
        Gate::<V>::branch(state.is_loading(), || state.has_role(&self.role))
    }

    /// `None` renders nothing.
    pub fn render(&self, state: &impl PermissionView) -> Option<&V> {
        self.gate.view(self.branch(state))
    }
}

impl<V> IfRole<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Re-rendered output: the current render, then one per state change.
    pub fn watch(self, state: &PermissionState) -> impl Stream<Item = Option<V>> + Send + use<V> {
        WatchStream::new(state.subscribe()).map(move |res| self.render(&res).cloned())
    }
}

/// Renders `children` when the user holds `permission`, otherwise `fallback`.
#[derive(Debug, Clone)]
pub struct IfPermission<V> {
    permission: String,
    gate: Gate<V>,
}

impl<V> IfPermission<V> {
    pub fn new(permission: impl Into<String>, children: V) -> Self {
        Self {
            permission: permission.into(),
            gate: Gate {
                children,
                fallback: None,
            },
        }
    }

    pub fn fallback(mut self, fallback: V) -> Self {
        self.gate.fallback = Some(fallback);
        self
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }

    pub fn branch(&self, state: &impl PermissionView) -> Branch {
        Gate::<V>::branch(state.is_loading(), || state.has_permission(&self.permission))
    }

    /// `None` renders nothing.
    pub fn render(&self, state: &impl PermissionView) -> Option<&V> {
        self.gate.view(self.branch(state))
    }
}

impl<V> IfPermission<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Re-rendered output: the current render, then one per state change.
    pub fn watch(self, state: &PermissionState) -> impl Stream<Item = Option<V>> + Send + use<V> {
        WatchStream::new(state.subscribe()).map(move |res| self.render(&res).cloned())
    }
}
