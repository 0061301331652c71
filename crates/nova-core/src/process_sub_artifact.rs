//! Shapes of a process as stateful sub-artifacts

use crate::error::NovaError;
use crate::load_slot::LoadSlot;
use crate::stateful_artifact::{ArtifactState, StatefulArtifact};
use crate::sub_artifact_collection::Keyed;
use nova_artifact::{ItemTypePredefined, ProcessShape, SubArtifactModel};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// One shape of a [`StatefulProcessArtifact`](crate::StatefulProcessArtifact).
///
/// Holds the live shape data edited in the process graph, plus the full
/// sub-artifact details which are fetched lazily by
/// [`load_properties`](Self::load_properties). State flags are read from the
/// owner, so they follow its saves, pins and deletion.
pub struct StatefulProcessSubArtifact {
    id: i32,
    owner: Weak<StatefulArtifact>,
    shape: RwLock<ProcessShape>,
    details: RwLock<Option<SubArtifactModel>>,
    /// Owner edit generation of this shape's last edit, 0 if never edited
    edited: AtomicU64,
    load: LoadSlot,
    revision: watch::Sender<u64>,
}

impl StatefulProcessSubArtifact {
    #[must_use]
    pub fn new(shape: ProcessShape, owner: Weak<StatefulArtifact>) -> Arc<Self> {
        let (revision, _) = watch::channel(0);

        Arc::new(Self {
            id: shape.id,
            owner,
            shape: RwLock::new(shape),
            details: RwLock::new(None),
            edited: AtomicU64::new(0),
            load: LoadSlot::new(),
            revision,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.shape.read().name.clone()
    }

    /// Snapshot of the live shape
    #[must_use]
    pub fn shape(&self) -> ProcessShape {
        self.shape.read().clone()
    }

    /// Shape type prefix, or the owning process's when the shape has none
    #[must_use]
    pub fn prefix(&self) -> String {
        let prefix = self.shape.read().type_prefix.clone();
        if !prefix.is_empty() {
            return prefix;
        }
        self.owner.upgrade().map(|o| o.prefix()).unwrap_or_default()
    }

    /// Shape type, or the owning process's type when the shape has none
    #[must_use]
    pub fn predefined_type(&self) -> ItemTypePredefined {
        let predefined = self.shape.read().base_item_type_predefined;
        if predefined != ItemTypePredefined::None {
            return predefined;
        }
        self.owner
            .upgrade()
            .map_or(ItemTypePredefined::None, |o| o.predefined_type())
    }

    pub(crate) fn update_shape(&self, edit: impl FnOnce(&mut ProcessShape)) {
        edit(&mut self.shape.write());
        if let Some(owner) = self.owner.upgrade() {
            self.edited.store(owner.mark_changed(), Ordering::SeqCst);
        }
        self.bump();
    }

    /// The owner's state. `dirty` only while this shape has an edit the
    /// owner has not saved yet.
    #[must_use]
    pub fn artifact_state(&self) -> ArtifactState {
        let Some(owner) = self.owner.upgrade() else {
            return ArtifactState::default();
        };
        let edited = self.edited.load(Ordering::SeqCst);
        let mut state = owner.artifact_state();
        state.dirty = state.dirty && edited > owner.clean_generation();
        state
    }

    /// Details fetched by the last properties load
    #[must_use]
    pub fn details(&self) -> Option<SubArtifactModel> {
        self.details.read().clone()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.load.is_loaded()
    }

    /// Watch for changes; the value is a revision counter
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Load the full sub-artifact properties.
    ///
    /// Joins a load already in flight. Shapes of a process that was never
    /// saved or published, and shapes created locally, have nothing on the
    /// server: they resolve to `self` without a request.
    ///
    /// # Errors
    /// - `NovaError::Detached` if the owning process was dropped
    /// - the fetch error, also sent on the owner's error stream
    pub async fn load_properties(self: &Arc<Self>) -> Result<Arc<Self>, NovaError> {
        let owner = self.owner.upgrade().ok_or(NovaError::Detached)?;
        if !owner.has_artifact_ever_been_saved_or_published() || self.shape.read().is_new() {
            tracing::trace!(id = self.id, "sub-artifact properties load skipped");
            return Ok(Arc::clone(self));
        }

        let this = Arc::clone(self);
        self.load
            .ensure(move || async move {
                let model = owner
                    .services()
                    .artifacts
                    .get_sub_artifact(owner.id(), this.id, owner.pinned_version())
                    .await
                    .map_err(|e| owner.fail(e))?;
                tracing::debug!(id = this.id, owner = owner.id(), "sub-artifact properties loaded");
                *this.details.write() = Some(model);
                this.bump();
                Ok(())
            })
            .await?;
        Ok(Arc::clone(self))
    }
}

impl Keyed for StatefulProcessSubArtifact {
    fn key(&self) -> i32 {
        self.id
    }
}

impl std::fmt::Debug for StatefulProcessSubArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulProcessSubArtifact")
            .field("id", &self.id)
            .field("load", &self.load)
            .finish_non_exhaustive()
    }
}
