//! `rolegate-ui`
//!
//! **Responsibility:** declarative role/permission gating for component trees.
//!
//! This crate provides:
//! - Resolver scopes (`PermissionProvider`, `use_permission_resolver`)
//! - A per-subtree resolution state machine (`use_permission`)
//! - Conditional renderers (`IfRole`, `IfPermission`)
//!
//! The resolver is called once per mounted state machine and its answer is
//! cached for that state machine's lifetime.

pub mod components;
pub mod scope;
pub mod spawn;
pub mod state;

/// Leptos bindings (browser builds only).
#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use components::{Branch, IfPermission, IfRole};
pub use scope::{
    ConfigurationError, OUTSIDE_PROVIDER_MESSAGE, PermissionProvider, PermissionScope,
    use_permission_resolver,
};
pub use spawn::{SpawnError, Spawner};
pub use state::{PermissionState, PermissionView, Resolution, UseError};

#[cfg(not(target_arch = "wasm32"))]
pub use spawn::TokioSpawner;
#[cfg(not(target_arch = "wasm32"))]
pub use state::use_permission;
