//! At-most-one in-flight load per entity
//!
//! A [`LoadSlot`] is a small state machine, `Idle -> Loading -> Loaded`.
//! While `Loading`, every caller receives a clone of the same shared future,
//! so concurrent requests for the full model collapse into one remote call.
//! The slot leaves `Loading` in exactly one place: the tail of that shared
//! future, after the work (fetch and apply) has finished.

use crate::error::NovaError;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Shared handle to an in-flight load
pub type LoadFuture = Shared<BoxFuture<'static, Result<(), NovaError>>>;

#[derive(Default)]
enum LoadState {
    #[default]
    Idle,
    Loading(LoadFuture),
    Loaded,
}

#[derive(Default)]
struct SlotInner {
    /// Bumped on reset so a load started before the reset cannot settle
    /// the slot after it
    generation: u64,
    state: LoadState,
}

/// Memoizing slot for one entity's full load
#[derive(Clone, Default)]
pub struct LoadSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl LoadSlot {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight load, or start one with `work`.
    ///
    /// Returns `None` when the entity is already loaded; `work` is only
    /// invoked when the slot is idle.
    pub fn load<F, Fut>(&self, work: F) -> Option<LoadFuture>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), NovaError>> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        match &inner.state {
            LoadState::Loaded => None,
            LoadState::Loading(pending) => Some(pending.clone()),
            LoadState::Idle => {
                let generation = inner.generation;
                let slot = Arc::clone(&self.inner);
                let work = work();
                let shared = async move {
                    let outcome = work.await;
                    let mut inner = slot.lock();
                    if inner.generation == generation
                        && matches!(inner.state, LoadState::Loading(_))
                    {
                        inner.state = if outcome.is_ok() {
                            LoadState::Loaded
                        } else {
                            LoadState::Idle
                        };
                    }
                    outcome
                }
                .boxed()
                .shared();
                inner.state = LoadState::Loading(shared.clone());
                Some(shared)
            }
        }
    }

    /// Load unless already loaded, waiting for the result
    ///
    /// # Errors
    /// Returns the error of the (possibly shared) load
    pub async fn ensure<F, Fut>(&self, work: F) -> Result<(), NovaError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), NovaError>> + Send + 'static,
    {
        match self.load(work) {
            Some(pending) => pending.await,
            None => Ok(()),
        }
    }

    /// The in-flight load, if any
    #[must_use]
    pub fn pending(&self) -> Option<LoadFuture> {
        match &self.inner.lock().state {
            LoadState::Loading(pending) => Some(pending.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.inner.lock().state, LoadState::Loaded)
    }

    /// Forget loaded data; a load still in flight will not settle this slot
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = LoadState::Idle;
    }
}

impl std::fmt::Debug for LoadSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        let state = match inner.state {
            LoadState::Idle => "idle",
            LoadState::Loading(_) => "loading",
            LoadState::Loaded => "loaded",
        };
        f.debug_struct("LoadSlot")
            .field("generation", &inner.generation)
            .field("state", &state)
            .finish()
    }
}
