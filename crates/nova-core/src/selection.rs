//! Current and explorer-tree selection

use crate::diagram::DiagramLoader;
use crate::handle::ArtifactHandle;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

/// Tracks which artifact is open and which is highlighted in the explorer.
///
/// Selecting a new artifact cancels any diagram load still in flight for
/// the previous one.
pub struct SelectionManager {
    explorer: RwLock<Option<ArtifactHandle>>,
    current: RwLock<Option<ArtifactHandle>>,
    diagrams: Arc<DiagramLoader>,
    selected: watch::Sender<Option<i32>>,
}

impl SelectionManager {
    #[must_use]
    pub fn new(diagrams: Arc<DiagramLoader>) -> Self {
        let (selected, _) = watch::channel(None);
        Self {
            explorer: RwLock::new(None),
            current: RwLock::new(None),
            diagrams,
            selected,
        }
    }

    /// Highlight `artifact` in the explorer tree
    pub fn set_explorer_artifact(&self, artifact: ArtifactHandle) {
        tracing::trace!(id = artifact.id(), "explorer selection");
        *self.explorer.write() = Some(artifact);
    }

    #[must_use]
    pub fn explorer_artifact(&self) -> Option<ArtifactHandle> {
        self.explorer.read().clone()
    }

    /// Make `artifact` the current one
    pub fn set_artifact(&self, artifact: ArtifactHandle) {
        self.diagrams.cancel_pending();
        let id = artifact.id();
        *self.current.write() = Some(artifact);
        self.selected.send_replace(Some(id));
        tracing::debug!(id, "artifact selected");
    }

    #[must_use]
    pub fn artifact(&self) -> Option<ArtifactHandle> {
        self.current.read().clone()
    }

    /// Watch the id of the current artifact
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<i32>> {
        self.selected.subscribe()
    }

    pub fn clear(&self) {
        *self.explorer.write() = None;
        *self.current.write() = None;
        self.selected.send_replace(None);
    }
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("current", &*self.selected.borrow())
            .finish_non_exhaustive()
    }
}
