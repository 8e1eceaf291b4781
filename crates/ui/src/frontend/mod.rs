//! Leptos bindings for the browser.
//!
//! Scope propagation goes through Leptos context here, since the host already
//! threads it implicitly through the component tree.

mod components;

pub use components::{IfPermission, IfRole, PermissionProvider};

use std::sync::Arc;

use futures::future::BoxFuture;
use leptos::*;
use rolegate_auth::SharedResolver;

use crate::scope::{ConfigurationError, PermissionScope};
use crate::spawn::{SpawnError, Spawner};
use crate::state::{PermissionState, Resolution, UseError};

/// Drives deferred resolutions on the browser's microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawner;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        spawn_local(task);
        Ok(())
    }
}

fn current_scope() -> PermissionScope {
    use_context::<PermissionScope>().unwrap_or_default()
}

/// Resolver of the nearest enclosing [`PermissionProvider`].
pub fn use_permission_resolver() -> Result<SharedResolver, ConfigurationError> {
    current_scope().resolver()
}

/// Mount a state machine for the calling component and mirror it into a
/// signal. The state machine is dropped (and any pending resolution aborted)
/// when the component is cleaned up.
pub fn use_permission() -> Result<ReadSignal<Resolution>, UseError> {
    let state = PermissionState::mount_with(&current_scope(), Arc::new(LocalSpawner))?;

    let (resolution, set_resolution) = create_signal(state.snapshot());
    let mut rx = state.subscribe();
    spawn_local(async move {
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            set_resolution.set(next);
        }
    });

    on_cleanup(move || drop(state));

    Ok(resolution)
}
