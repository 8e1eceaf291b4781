//! Permission resolution state machine.
//!
//! One [`PermissionState`] per consuming subtree. On mount it invokes the
//! scope's resolver exactly once and caches the answer; it re-invokes only
//! when the scope hands it a different resolver reference.
//!
//! ```text
//!   mount / rebind(new resolver)
//!            │
//!            ▼
//!   Loading(attempt n) ── future ready on first poll ──► Loaded
//!            │
//!            └── pending ──► spawned ──► settles ──► Loaded (if still attempt n)
//! ```
//!
//! Every transition is stamped with an attempt number. A settlement carrying
//! an older attempt is discarded, so a superseded resolver can never
//! overwrite the state produced for its replacement.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, FutureExt, abortable};
use rolegate_auth::{ResolveError, SharedResolver, User, same_resolver};
use thiserror::Error;
use tokio::sync::watch;

use crate::scope::{ConfigurationError, PermissionScope};
use crate::spawn::{SpawnError, Spawner};

#[derive(Debug, Error)]
pub enum UseError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

/// Read side shared by everything that gates on permissions.
pub trait PermissionView {
    fn is_loading(&self) -> bool;
    fn has_role(&self, role: &str) -> bool;
    fn has_permission(&self, permission: &str) -> bool;
}

/// Snapshot of one state machine.
///
/// While `loading` is true, `user` is the interim [`User::unresolved`] value
/// and must not be trusted.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub user: User,
    pub loading: bool,
    attempt: u64,
    resolved_at: Option<DateTime<Utc>>,
    failure: Option<Arc<ResolveError>>,
}

impl Resolution {
    fn pending(attempt: u64) -> Self {
        Self {
            user: User::unresolved(),
            loading: true,
            attempt,
            resolved_at: None,
            failure: None,
        }
    }

    /// Monotonic attempt number; bumps on every resolver change.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Failure of the current attempt. The state stays loading after a
    /// failure; this is how a caller tells "failed" from "slow".
    pub fn failure(&self) -> Option<&Arc<ResolveError>> {
        self.failure.as_ref()
    }
}

impl PermissionView for Resolution {
    fn is_loading(&self) -> bool {
        self.loading
    }

    fn has_role(&self, role: &str) -> bool {
        self.user.has_role(role)
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.user.has_permission(permission)
    }
}

struct Binding {
    resolver: SharedResolver,
    in_flight: Option<AbortHandle>,
    /// The resolver was invoked but its answer could not be driven; the next
    /// rebind restarts it even if the reference is unchanged.
    stalled: bool,
}

struct Inner {
    state: watch::Sender<Resolution>,
    binding: Mutex<Binding>,
    spawner: Arc<dyn Spawner>,
}

impl Inner {
    fn binding(&self) -> MutexGuard<'_, Binding> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke `resolver` for `attempt`. Returns the abort handle of the
    /// spawned task when the answer is not immediately available.
    fn start(
        self: &Arc<Self>,
        attempt: u64,
        resolver: &SharedResolver,
    ) -> Result<Option<AbortHandle>, SpawnError> {
        tracing::debug!(attempt, "invoking permission resolver");

        let mut fut = resolver.resolve();

        // Immediate answers commit synchronously, before mount returns.
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        if let Poll::Ready(result) = fut.poll_unpin(&mut cx) {
            self.commit(attempt, result);
            return Ok(None);
        }

        let (fut, handle) = abortable(fut);
        let weak: Weak<Self> = Arc::downgrade(self);
        let task = async move {
            let Ok(result) = fut.await else {
                tracing::debug!(attempt, "superseded resolution aborted");
                return;
            };
            if let Some(inner) = weak.upgrade() {
                inner.commit(attempt, result);
            }
        };

        self.spawner.spawn(task.boxed())?;
        Ok(Some(handle))
    }

    fn commit(&self, attempt: u64, result: Result<User, ResolveError>) {
        self.state.send_if_modified(move |state| {
            if state.attempt != attempt {
                tracing::debug!(
                    attempt,
                    current = state.attempt,
                    "discarding stale resolution"
                );
                return false;
            }
            if !state.loading {
                return false;
            }

            match result {
                Ok(user) => {
                    tracing::debug!(
                        attempt,
                        role = user.role().map(|r| r.as_str()),
                        permissions = user.permissions().len(),
                        "permissions resolved"
                    );
                    state.user = user;
                    state.loading = false;
                    state.resolved_at = Some(Utc::now());
                    state.failure = None;
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "permission resolver failed");
                    state.failure = Some(Arc::new(err));
                }
            }
            true
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let binding = self.binding.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = binding.in_flight.take() {
            handle.abort();
        }
    }
}

/// Cached permission state for one subtree.
///
/// Clones are handles to the same instance. Dropping the last handle
/// (unmount) aborts a pending resolution.
#[derive(Clone)]
pub struct PermissionState {
    inner: Arc<Inner>,
}

impl PermissionState {
    /// Mount against `scope`, driving deferred resolutions on the current
    /// tokio runtime.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn mount(scope: &PermissionScope) -> Result<Self, UseError> {
        Self::mount_with(scope, Arc::new(crate::spawn::TokioSpawner))
    }

    pub fn mount_with(scope: &PermissionScope, spawner: Arc<dyn Spawner>) -> Result<Self, UseError> {
        let resolver = scope.resolver()?;
        let attempt = 1;

        let (state, _) = watch::channel(Resolution::pending(attempt));
        let inner = Arc::new(Inner {
            state,
            binding: Mutex::new(Binding {
                resolver: resolver.clone(),
                in_flight: None,
                stalled: false,
            }),
            spawner,
        });

        let in_flight = inner.start(attempt, &resolver)?;
        inner.binding().in_flight = in_flight;

        Ok(Self { inner })
    }

    /// Re-read the resolver from `scope` (e.g. after the provider re-rendered).
    ///
    /// Same reference: nothing happens. Different reference: back to loading,
    /// the pending attempt is aborted and the new resolver is invoked once.
    /// Returns whether a new resolution was started.
    ///
    /// If the new resolution cannot be driven ([`UseError::Spawn`]), the state
    /// stays loading and the next rebind retries it.
    pub fn rebind(&self, scope: &PermissionScope) -> Result<bool, UseError> {
        let resolver = scope.resolver()?;

        let mut binding = self.inner.binding();
        if !binding.stalled && same_resolver(&binding.resolver, &resolver) {
            return Ok(false);
        }

        if let Some(handle) = binding.in_flight.take() {
            handle.abort();
        }
        binding.resolver = resolver.clone();
        binding.stalled = true;

        let mut attempt = 0;
        self.inner.state.send_modify(|state| {
            attempt = state.attempt + 1;
            *state = Resolution::pending(attempt);
        });

        binding.in_flight = self.inner.start(attempt, &resolver)?;
        binding.stalled = false;
        Ok(true)
    }

    pub fn snapshot(&self) -> Resolution {
        self.inner.state.borrow().clone()
    }

    pub fn user(&self) -> User {
        self.inner.state.borrow().user.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn failure(&self) -> Option<Arc<ResolveError>> {
        self.inner.state.borrow().failure.clone()
    }

    pub fn resolver(&self) -> SharedResolver {
        self.inner.binding().resolver.clone()
    }

    /// Receiver notified on every committed transition.
    pub fn subscribe(&self) -> watch::Receiver<Resolution> {
        self.inner.state.subscribe()
    }

    /// Wait until the current attempt has produced a user.
    ///
    /// Never completes if the resolver never settles or fails.
    pub async fn loaded(&self) -> Resolution {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`; this only happens during teardown.
            Err(_) => self.snapshot(),
        }
    }
}

impl PermissionView for PermissionState {
    fn is_loading(&self) -> bool {
        self.loading()
    }

    fn has_role(&self, role: &str) -> bool {
        self.inner.state.borrow().user.has_role(role)
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.inner.state.borrow().user.has_permission(permission)
    }
}

impl core::fmt::Debug for PermissionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermissionState")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Permission hook: mount a state machine for the subtree under `scope`.
#[cfg(not(target_arch = "wasm32"))]
pub fn use_permission(scope: &PermissionScope) -> Result<PermissionState, UseError> {
    PermissionState::mount(scope)
}
