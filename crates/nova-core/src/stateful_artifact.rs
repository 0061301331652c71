//! Live, mutable wrapper around one artifact
//!
//! A [`StatefulArtifact`] overlays client-side state (dirty, lock,
//! historical, deleted) on top of the server model and owns the save and
//! publish pipeline. Loads go through a [`LoadSlot`], so any number of
//! concurrent `get_observable` calls issue a single request.
//!
//! Failures of remote calls made on behalf of the artifact are also
//! broadcast on its error stream; see [`StatefulArtifact::errors`].
//!
//! Every local edit bumps an edit generation. A save records the generation
//! it sent and only clears `dirty` if no edit landed while it was in flight.

use crate::error::NovaError;
use crate::load_slot::LoadSlot;
use crate::messages::MessageKey;
use crate::services::Services;
use chrono::{DateTime, Utc};
use nova_artifact::{
    ArtifactChanges, ArtifactModel, ChangesBuilder, FieldDescriptor, ItemTypePredefined,
    LockResultKind, UserRef,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Who holds the edit lock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LockOwner {
    #[default]
    None,
    CurrentUser,
    OtherUser(UserRef),
}

/// Client-side state flags of an artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactState {
    pub dirty: bool,
    /// No edit permission
    pub read_only: bool,
    /// Showing a pinned version or a deleted artifact
    pub historical: bool,
    pub deleted: bool,
    pub deleted_by_id: Option<i32>,
    pub deleted_by_display_name: Option<String>,
    pub deleted_date_time: Option<DateTime<Utc>>,
    pub lock: LockOwner,
    pub locked_date_time: Option<DateTime<Utc>>,
}

impl ArtifactState {
    /// Whether edits are refused
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
            || self.historical
            || self.deleted
            || matches!(self.lock, LockOwner::OtherUser(_))
    }
}

pub struct StatefulArtifact {
    id: i32,
    services: Services,
    model: RwLock<ArtifactModel>,
    state: RwLock<ArtifactState>,
    pinned_version: RwLock<Option<i32>>,
    changes: Mutex<ChangesBuilder>,
    /// Bumped on every local edit
    edits: AtomicU64,
    /// Edit generation of the last save or discard
    clean_edits: AtomicU64,
    load: LoadSlot,
    errors: broadcast::Sender<NovaError>,
}

impl StatefulArtifact {
    /// Wrap a plain model
    #[must_use]
    pub fn new(model: ArtifactModel, services: Services) -> Arc<Self> {
        let (errors, _) = broadcast::channel(services.config.error_stream_capacity.max(1));
        let state = ArtifactState {
            read_only: !model.permissions.can_edit(),
            lock: match &model.locked_by_user {
                Some(user) => LockOwner::OtherUser(user.clone()),
                None => LockOwner::None,
            },
            locked_date_time: model.locked_date_time,
            ..ArtifactState::default()
        };

        Arc::new(Self {
            id: model.id,
            changes: Mutex::new(ChangesBuilder::new(model.id)),
            edits: AtomicU64::new(0),
            clean_edits: AtomicU64::new(0),
            model: RwLock::new(model),
            state: RwLock::new(state),
            pinned_version: RwLock::new(None),
            load: LoadSlot::new(),
            services,
            errors,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn project_id(&self) -> i32 {
        self.model.read().project_id
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<i32> {
        self.model.read().parent_id
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.model.read().name.clone()
    }

    #[must_use]
    pub fn prefix(&self) -> String {
        self.model.read().prefix.clone()
    }

    #[must_use]
    pub fn predefined_type(&self) -> ItemTypePredefined {
        self.model.read().predefined_type
    }

    /// Server version of the loaded model
    #[must_use]
    pub fn version(&self) -> i32 {
        self.model.read().version
    }

    /// Snapshot of the server model
    #[must_use]
    pub fn model(&self) -> ArtifactModel {
        self.model.read().clone()
    }

    /// Snapshot of the state flags
    #[must_use]
    pub fn artifact_state(&self) -> ArtifactState {
        self.state.read().clone()
    }

    #[inline]
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    #[must_use]
    pub fn pinned_version(&self) -> Option<i32> {
        *self.pinned_version.read()
    }

    /// Show this artifact at a fixed version; it becomes historical
    pub fn pin_version(&self, version: i32) {
        *self.pinned_version.write() = Some(version);
        self.state.write().historical = true;
        tracing::debug!(id = self.id, version, "artifact pinned to version");
    }

    /// Overlay deletion info; a deleted artifact is shown as historical
    pub fn mark_deleted(&self, deleted_by: Option<&UserRef>, deleted_at: Option<DateTime<Utc>>) {
        let mut state = self.state.write();
        state.deleted = true;
        state.historical = true;
        state.deleted_by_id = deleted_by.map(|u| u.id);
        state.deleted_by_display_name = deleted_by.map(|u| u.display_name.clone());
        state.deleted_date_time = deleted_at;
    }

    /// Published at least once, or a draft was saved
    #[must_use]
    pub fn has_artifact_ever_been_saved_or_published(&self) -> bool {
        self.model.read().is_persisted()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.load.is_loaded()
    }

    /// Subscribe to failures of remote calls made for this artifact
    #[must_use]
    pub fn errors(&self) -> broadcast::Receiver<NovaError> {
        self.errors.subscribe()
    }

    /// Publish an error on the error stream and hand it back
    pub(crate) fn fail(&self, err: NovaError) -> NovaError {
        tracing::warn!(id = self.id, error = %err, "artifact operation failed");
        // no subscribers is fine
        let _ = self.errors.send(err.clone());
        err
    }

    /// Full load of the artifact details, shared by concurrent callers
    ///
    /// # Errors
    /// Returns the load error, which is also sent on the error stream
    pub async fn get_observable(self: &Arc<Self>) -> Result<(), NovaError> {
        let this = Arc::clone(self);
        self.load
            .ensure(move || async move {
                let version = this.pinned_version();
                let model = this
                    .services
                    .artifacts
                    .get_artifact(this.id, version)
                    .await
                    .map_err(|e| this.fail(e))?;
                this.on_load(model);
                Ok(())
            })
            .await
    }

    fn on_load(&self, model: ArtifactModel) {
        tracing::debug!(id = self.id, version = model.version, "artifact details loaded");
        {
            let mut state = self.state.write();
            state.read_only = !model.permissions.can_edit();
            if state.lock != LockOwner::CurrentUser {
                state.lock = model
                    .locked_by_user
                    .clone()
                    .map_or(LockOwner::None, LockOwner::OtherUser);
                state.locked_date_time = model.locked_date_time;
            }
        }
        *self.model.write() = model;
    }

    /// Drop loaded data so the next access fetches again. Unsaved changes
    /// are discarded.
    pub fn unload(&self) {
        let mut changes = self.changes.lock();
        let mut state = self.state.write();
        if state.dirty {
            tracing::warn!(id = self.id, "unloading artifact with unsaved changes");
        }
        state.dirty = false;
        *changes = ChangesBuilder::new(self.id);
        self.clean_edits
            .store(self.edits.load(Ordering::SeqCst), Ordering::SeqCst);
        self.load.reset();
    }

    /// Unload and load again
    ///
    /// # Errors
    /// Returns the reload error
    pub async fn refresh(self: &Arc<Self>) -> Result<(), NovaError> {
        self.unload();
        self.get_observable().await
    }

    /// Rename the artifact
    ///
    /// # Errors
    /// Fails if the artifact is read-only or the lock cannot be taken
    pub async fn set_name(&self, name: impl Into<String>) -> Result<(), NovaError> {
        self.ensure_editable()?;
        let name = name.into();
        self.model.write().name.clone_from(&name);
        self.record(|c| c.name(name));
        self.process_on_update().await
    }

    /// # Errors
    /// Fails if the artifact is read-only or the lock cannot be taken
    pub async fn set_description(&self, description: impl Into<String>) -> Result<(), NovaError> {
        self.ensure_editable()?;
        let description = description.into();
        self.model.write().description = Some(description.clone());
        self.record(|c| c.description(description));
        self.process_on_update().await
    }

    /// # Errors
    /// Fails if the artifact is read-only or the lock cannot be taken
    pub async fn set_property_value(
        &self,
        property_type_id: i32,
        value: serde_json::Value,
    ) -> Result<(), NovaError> {
        self.ensure_editable()?;
        {
            let mut model = self.model.write();
            if let Some(property) = model
                .custom_property_values
                .iter_mut()
                .find(|p| p.property_type_id == property_type_id)
            {
                property.value = value.clone();
            }
        }
        self.record(|c| c.property(property_type_id, value));
        self.process_on_update().await
    }

    fn record(&self, change: impl FnOnce(ChangesBuilder) -> ChangesBuilder) {
        let mut changes = self.changes.lock();
        *changes = change(std::mem::take(&mut *changes));
        self.edits.fetch_add(1, Ordering::SeqCst);
    }

    /// Note an edit applied outside the pending change set, such as the
    /// process graph. Returns the new edit generation.
    pub(crate) fn mark_changed(&self) -> u64 {
        let generation = self.edits.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().dirty = true;
        generation
    }

    #[inline]
    pub(crate) fn edit_generation(&self) -> u64 {
        self.edits.load(Ordering::SeqCst)
    }

    /// Edits up to this generation are saved or discarded
    #[inline]
    pub(crate) fn clean_generation(&self) -> u64 {
        self.clean_edits.load(Ordering::SeqCst)
    }

    fn ensure_editable(&self) -> Result<(), NovaError> {
        if self.state.read().is_read_only() {
            return Err(NovaError::ReadOnly(self.id));
        }
        Ok(())
    }

    /// Record that the artifact changed locally: mark it dirty and take the
    /// edit lock
    ///
    /// # Errors
    /// Fails if the artifact is read-only or the lock cannot be taken
    pub async fn process_on_update(&self) -> Result<(), NovaError> {
        self.ensure_editable()?;
        self.state.write().dirty = true;
        self.lock().await
    }

    /// Take the edit lock unless this user already holds it
    ///
    /// # Errors
    /// `NovaError::LockFailed` when the server refuses
    pub async fn lock(&self) -> Result<(), NovaError> {
        if self.state.read().lock == LockOwner::CurrentUser {
            return Ok(());
        }

        let result = self
            .services
            .artifacts
            .lock(self.id)
            .await
            .map_err(|e| self.fail(e))?;

        let reason = result.result;
        if reason == LockResultKind::Success {
            tracing::debug!(id = self.id, "edit lock acquired");
            let mut state = self.state.write();
            state.lock = LockOwner::CurrentUser;
            state.locked_date_time = result.locked_date_time;
            return Ok(());
        }

        let message = {
            let mut state = self.state.write();
            state.dirty = false;
            match reason {
                LockResultKind::AlreadyLocked => {
                    if let Some(owner) = result.lock_owner {
                        state.lock = LockOwner::OtherUser(owner);
                    }
                    Some(MessageKey::ArtifactLockAlreadyLocked)
                }
                LockResultKind::DoesNotExist => {
                    state.deleted = true;
                    Some(MessageKey::ArtifactLockDoesNotExist)
                }
                _ => None,
            }
        };
        if let Some(key) = message {
            self.services.add_error(key);
        }
        Err(NovaError::LockFailed {
            id: self.id,
            reason,
        })
    }

    /// Changes collected since the last save
    #[must_use]
    pub fn artifact_to_save(&self) -> ArtifactChanges {
        self.changes.lock().clone().build()
    }

    /// Persist pending changes
    ///
    /// # Errors
    /// Returns the update error, which is also sent on the error stream
    pub async fn save(self: &Arc<Self>) -> Result<(), NovaError> {
        // a reload would discard edits made while the request was running
        if self.commit().await? && !self.is_dirty() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Persist pending changes, keeping the in-memory state
    ///
    /// # Errors
    /// Returns the update error, which is also sent on the error stream
    pub async fn auto_save(&self) -> Result<(), NovaError> {
        self.commit().await.map(|_| ())
    }

    async fn commit(&self) -> Result<bool, NovaError> {
        if !self.is_dirty() {
            tracing::debug!(id = self.id, "nothing to save");
            return Ok(false);
        }
        let generation = self.edit_generation();
        let changes = self.artifact_to_save();
        self.services
            .artifacts
            .update_artifact(changes)
            .await
            .map_err(|e| self.fail(e))?;
        self.on_saved(generation);
        Ok(true)
    }

    /// Record a save that sent every edit up to `generation`. The artifact
    /// stays dirty, with its pending changes, if it was edited since.
    pub(crate) fn on_saved(&self, generation: u64) {
        self.model.write().last_saved_on = Some(Utc::now());
        let mut changes = self.changes.lock();
        let mut state = self.state.write();
        self.clean_edits.fetch_max(generation, Ordering::SeqCst);
        if self.edits.load(Ordering::SeqCst) == generation {
            state.dirty = false;
            *changes = ChangesBuilder::new(self.id);
            tracing::info!(id = self.id, "artifact saved");
        } else {
            tracing::debug!(id = self.id, "artifact edited during save, still dirty");
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Publish, saving first when dirty
    ///
    /// # Errors
    /// Returns the first failing step
    pub async fn publish(self: &Arc<Self>) -> Result<(), NovaError> {
        self.save().await?;
        self.publish_changes().await?;
        self.refresh().await
    }

    /// Publish the saved draft and post the success message
    pub(crate) async fn publish_changes(&self) -> Result<(), NovaError> {
        self.services
            .artifacts
            .publish(self.id)
            .await
            .map_err(|e| self.fail(e))?;
        {
            let mut state = self.state.write();
            state.lock = LockOwner::None;
            state.locked_date_time = None;
        }
        tracing::info!(id = self.id, "artifact published");
        self.services.add_info(MessageKey::PublishSuccess);
        Ok(())
    }

    /// Property editor fields, editable only when the artifact is
    #[must_use]
    pub fn field_descriptors(&self) -> Vec<FieldDescriptor> {
        let read_only = self.state.read().is_read_only();
        self.model
            .read()
            .custom_property_values
            .iter()
            .map(|p| FieldDescriptor::for_property(p, read_only))
            .collect()
    }
}

impl std::fmt::Debug for StatefulArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulArtifact")
            .field("id", &self.id)
            .field("state", &*self.state.read())
            .field("load", &self.load)
            .finish_non_exhaustive()
    }
}
