//! Process-wide rasterizer backend lifecycle.
//!
//! Parley and `vello_cpu` keep no global state, so there is nothing to initialize. The backend
//! is a lifecycle token: it appears on first use and is torn down when the last
//! [`BackendGuard`] is dropped, and each appearance gets a new generation number. Acquisition is
//! serialized through a mutex, so concurrent render calls on different threads share one live
//! generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::foundation::error::{RenderTextError, RenderTextResult};

static BACKEND: Mutex<Weak<BackendState>> = Mutex::new(Weak::new());
static GENERATION: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct BackendState {
    generation: u64,
}

impl Drop for BackendState {
    fn drop(&mut self) {
        tracing::debug!(generation = self.generation, "rasterizer backend torn down");
    }
}

/// Shared reference to the live rasterizer backend.
///
/// Every [`FontHandle`](crate::FontHandle) holds one, so the backend outlives all fonts
/// opened against it.
#[derive(Clone, Debug)]
pub struct BackendGuard {
    state: Arc<BackendState>,
}

impl BackendGuard {
    /// Monotonic counter identifying which initialization this guard belongs to.
    pub fn generation(&self) -> u64 {
        self.state.generation
    }
}

/// Acquire the backend, initializing it if no guard is currently alive.
pub fn acquire() -> RenderTextResult<BackendGuard> {
    let mut slot = BACKEND
        .lock()
        .map_err(|_| RenderTextError::font_load("rasterizer backend lock poisoned"))?;
    if let Some(state) = slot.upgrade() {
        return Ok(BackendGuard { state });
    }

    let generation = GENERATION.fetch_add(1, Ordering::Relaxed) + 1;
    let state = Arc::new(BackendState { generation });
    *slot = Arc::downgrade(&state);
    tracing::debug!(generation, "rasterizer backend initialized");
    Ok(BackendGuard { state })
}

/// Number of guards currently keeping the backend alive.
pub fn live_guards() -> usize {
    BACKEND.lock().map(|slot| slot.strong_count()).unwrap_or(0)
}

#[cfg(test)]
#[path = "../tests/unit/backend.rs"]
mod tests;
