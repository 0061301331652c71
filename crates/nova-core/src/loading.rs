//! Scoped loading overlay

use crate::services::LoadingOverlayService;
use crate::types::LoadingToken;
use std::sync::Arc;

/// Keeps the loading overlay up while alive.
///
/// The overlay is ended exactly once when the scope is dropped, which
/// covers success, `?` early returns, panics and futures dropped mid-await.
#[must_use = "the overlay ends as soon as the scope is dropped"]
pub struct LoadingScope {
    overlay: Arc<dyn LoadingOverlayService>,
    token: LoadingToken,
}

impl LoadingScope {
    pub fn begin(overlay: Arc<dyn LoadingOverlayService>) -> Self {
        let token = overlay.begin_loading();
        tracing::trace!(token = token.0, "loading overlay started");
        Self { overlay, token }
    }

    #[inline]
    #[must_use]
    pub fn token(&self) -> LoadingToken {
        self.token
    }
}

impl Drop for LoadingScope {
    fn drop(&mut self) {
        tracing::trace!(token = self.token.0, "loading overlay ended");
        self.overlay.end_loading(self.token);
    }
}
