//! Executors for deferred resolutions.
//!
//! The state machine only needs "run this future to completion somewhere".
//! Native builds use the ambient tokio runtime; the browser binding supplies
//! its own spawner.

use futures::future::BoxFuture;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot drive pending resolution: {0}")]
pub struct SpawnError(String);

impl SpawnError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub trait Spawner: Send + Sync + 'static {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> Result<(), SpawnError>;
}

/// Spawns onto the tokio runtime the caller is running in.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

#[cfg(not(target_arch = "wasm32"))]
impl Spawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| SpawnError::new(e.to_string()))?;

        // Detached; cancellation goes through the state machine's abort handle.
        drop(handle.spawn(task));
        Ok(())
    }
}
