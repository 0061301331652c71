//! Process artifacts: a stateful artifact plus its shape graph
//!
//! The process graph is loaded separately from the artifact details and is
//! kept as live state on the [`StatefulProcessArtifact`]. Shapes live in the
//! [`SubArtifactCollection`], one [`StatefulProcessSubArtifact`] per shape,
//! so the graph and the collection can never disagree on membership.
//!
//! Every edit goes through [`StatefulArtifact::process_on_update`] before it
//! is applied, which marks the artifact dirty and takes the edit lock. Once
//! applied, the edit bumps the base artifact's edit generation.

use crate::error::NovaError;
use crate::load_slot::LoadSlot;
use crate::messages::MessageKey;
use crate::process_sub_artifact::StatefulProcessSubArtifact;
use crate::processor::ProcessModelProcessor;
use crate::stateful_artifact::{ArtifactState, StatefulArtifact};
use crate::sub_artifact_collection::SubArtifactCollection;
use nova_artifact::{
    ArtifactChanges, ChangesBuilder, DecisionBranchDestinationLink, ItemTypePredefined, ModelError,
    PersonaReference, ProcessLink, ProcessModel, ProcessShape, PropertyValueInformation,
    PropertyValues,
};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct ProcessState {
    type_prefix: String,
    base_item_type_predefined: ItemTypePredefined,
    links: Vec<ProcessLink>,
    decision_branch_destination_links: Vec<DecisionBranchDestinationLink>,
    property_values: PropertyValues,
    artifact_persona_references: Vec<PersonaReference>,
    sub_artifact_persona_references: Vec<PersonaReference>,
}

pub struct StatefulProcessArtifact {
    base: Arc<StatefulArtifact>,
    process: RwLock<ProcessState>,
    sub_artifacts: SubArtifactCollection<Arc<StatefulProcessSubArtifact>>,
    load: LoadSlot,
}

impl StatefulProcessArtifact {
    #[must_use]
    pub fn new(base: Arc<StatefulArtifact>) -> Arc<Self> {
        Arc::new(Self {
            base,
            process: RwLock::new(ProcessState::default()),
            sub_artifacts: SubArtifactCollection::new(),
            load: LoadSlot::new(),
        })
    }

    /// Generic artifact behind the process
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Arc<StatefulArtifact> {
        &self.base
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.base.id()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.base.name()
    }

    #[must_use]
    pub fn artifact_state(&self) -> ArtifactState {
        self.base.artifact_state()
    }

    #[inline]
    #[must_use]
    pub fn sub_artifacts(&self) -> &SubArtifactCollection<Arc<StatefulProcessSubArtifact>> {
        &self.sub_artifacts
    }

    /// Shapes in graph order
    #[must_use]
    pub fn shapes(&self) -> Vec<ProcessShape> {
        self.sub_artifacts.list().iter().map(|s| s.shape()).collect()
    }

    #[must_use]
    pub fn links(&self) -> Vec<ProcessLink> {
        self.process.read().links.clone()
    }

    #[must_use]
    pub fn decision_branch_destination_links(&self) -> Vec<DecisionBranchDestinationLink> {
        self.process.read().decision_branch_destination_links.clone()
    }

    #[must_use]
    pub fn property_values(&self) -> PropertyValues {
        self.process.read().property_values.clone()
    }

    #[must_use]
    pub fn artifact_persona_references(&self) -> Vec<PersonaReference> {
        self.process.read().artifact_persona_references.clone()
    }

    #[must_use]
    pub fn sub_artifact_persona_references(&self) -> Vec<PersonaReference> {
        self.process.read().sub_artifact_persona_references.clone()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.load.is_loaded()
    }

    /// Load artifact details and the process graph.
    ///
    /// Concurrent callers share one in-flight load, so the graph is fetched
    /// once no matter how many callers are waiting.
    ///
    /// # Errors
    /// Returns the load error, which is also sent on the error stream
    pub async fn get_observable(self: &Arc<Self>) -> Result<(), NovaError> {
        let this = Arc::clone(self);
        self.load
            .ensure(move || async move {
                this.base.get_observable().await?;
                let model = this
                    .base
                    .services()
                    .processes
                    .get_process(this.id(), this.base.pinned_version())
                    .await
                    .map_err(|e| this.base.fail(e))?;
                this.on_load(model).map_err(|e| this.base.fail(e))
            })
            .await
    }

    fn on_load(&self, model: ProcessModel) -> Result<(), NovaError> {
        model.validate()?;

        let owner = Arc::downgrade(&self.base);
        let shapes = model
            .shapes
            .into_iter()
            .map(|shape| StatefulProcessSubArtifact::new(shape, owner.clone()));
        self.sub_artifacts.initialise(shapes)?;

        // name stays as loaded with the artifact details
        *self.process.write() = ProcessState {
            type_prefix: model.type_prefix,
            base_item_type_predefined: model.base_item_type_predefined,
            links: model.links,
            decision_branch_destination_links: model.decision_branch_destination_links,
            property_values: model.property_values,
            artifact_persona_references: model.artifact_persona_references,
            sub_artifact_persona_references: model.sub_artifact_persona_references,
        };

        tracing::debug!(
            id = self.id(),
            shapes = self.sub_artifacts.len(),
            "process graph loaded"
        );
        Ok(())
    }

    /// Drop loaded data so the next access fetches again
    pub fn unload(&self) {
        self.base.unload();
        self.load.reset();
    }

    /// # Errors
    /// Returns the reload error
    pub async fn refresh(self: &Arc<Self>) -> Result<(), NovaError> {
        self.unload();
        self.get_observable().await
    }

    /// Edit one shape in place
    ///
    /// # Errors
    /// Fails for unknown shapes, read-only artifacts, or when the lock
    /// cannot be taken
    pub async fn update_shape(
        &self,
        id: i32,
        edit: impl FnOnce(&mut ProcessShape),
    ) -> Result<(), NovaError> {
        let shape = self
            .sub_artifacts
            .get(id)
            .ok_or(ModelError::UnknownShape(id))?;
        self.base.process_on_update().await?;
        shape.update_shape(edit);
        Ok(())
    }

    /// # Errors
    /// Fails for duplicate ids, read-only artifacts, or when the lock
    /// cannot be taken
    pub async fn add_shape(&self, shape: ProcessShape) -> Result<(), NovaError> {
        if self.sub_artifacts.contains(shape.id) {
            return Err(NovaError::DuplicateId(shape.id));
        }
        self.base.process_on_update().await?;
        let sub = StatefulProcessSubArtifact::new(shape, Arc::downgrade(&self.base));
        self.sub_artifacts.add(sub)?;
        self.base.mark_changed();
        Ok(())
    }

    /// Remove a shape together with every link touching it
    ///
    /// # Errors
    /// Fails for unknown shapes, read-only artifacts, or when the lock
    /// cannot be taken
    pub async fn remove_shape(&self, id: i32) -> Result<(), NovaError> {
        if !self.sub_artifacts.contains(id) {
            return Err(ModelError::UnknownShape(id).into());
        }
        self.base.process_on_update().await?;
        self.sub_artifacts.remove(id);

        {
            let mut process = self.process.write();
            process
                .links
                .retain(|l| l.source_id != id && l.destination_id != id);
            process.decision_branch_destination_links.retain_mut(|d| {
                d.source_ids.retain(|s| *s != id);
                d.destination_id != id && !d.source_ids.is_empty()
            });
        }
        self.base.mark_changed();
        Ok(())
    }

    /// # Errors
    /// Fails when an endpoint is missing, for read-only artifacts, or when
    /// the lock cannot be taken
    pub async fn add_link(&self, link: ProcessLink) -> Result<(), NovaError> {
        if !self.sub_artifacts.contains(link.source_id)
            || !self.sub_artifacts.contains(link.destination_id)
        {
            return Err(ModelError::DanglingLink {
                source_id: link.source_id,
                destination_id: link.destination_id,
            }
            .into());
        }
        self.base.process_on_update().await?;
        self.process.write().links.push(link);
        self.base.mark_changed();
        Ok(())
    }

    /// Returns whether a link was removed
    ///
    /// # Errors
    /// Fails for read-only artifacts or when the lock cannot be taken
    pub async fn remove_link(&self, source_id: i32, destination_id: i32) -> Result<bool, NovaError> {
        let exists = self
            .process
            .read()
            .links
            .iter()
            .any(|l| l.source_id == source_id && l.destination_id == destination_id);
        if !exists {
            return Ok(false);
        }
        self.base.process_on_update().await?;
        self.process
            .write()
            .links
            .retain(|l| !(l.source_id == source_id && l.destination_id == destination_id));
        self.base.mark_changed();
        Ok(true)
    }

    /// # Errors
    /// Fails for read-only artifacts or when the lock cannot be taken
    pub async fn set_persona_references(
        &self,
        artifact: Vec<PersonaReference>,
        sub_artifact: Vec<PersonaReference>,
    ) -> Result<(), NovaError> {
        self.base.process_on_update().await?;
        {
            let mut process = self.process.write();
            process.artifact_persona_references = artifact;
            process.sub_artifact_persona_references = sub_artifact;
        }
        self.base.mark_changed();
        Ok(())
    }

    /// Set a process-level property such as `clientType`
    ///
    /// # Errors
    /// Fails for read-only artifacts or when the lock cannot be taken
    pub async fn set_property_value(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), NovaError> {
        self.base.process_on_update().await?;
        self.process
            .write()
            .property_values
            .entry(key.to_string())
            .and_modify(|p| p.value = value.clone())
            .or_insert_with(|| PropertyValueInformation::new(key, value));
        self.base.mark_changed();
        Ok(())
    }

    /// The process graph as it stands in memory
    fn snapshot(&self) -> ProcessModel {
        let process = self.process.read();
        ProcessModel {
            id: self.id(),
            name: self.base.name(),
            project_id: self.base.project_id(),
            type_prefix: process.type_prefix.clone(),
            base_item_type_predefined: process.base_item_type_predefined,
            shapes: self.shapes(),
            links: process.links.clone(),
            decision_branch_destination_links: process.decision_branch_destination_links.clone(),
            property_values: process.property_values.clone(),
            artifact_persona_references: process.artifact_persona_references.clone(),
            sub_artifact_persona_references: process.sub_artifact_persona_references.clone(),
        }
    }

    /// Pending changes with the current process graph attached
    #[must_use]
    pub fn artifact_to_save(&self) -> ArtifactChanges {
        ChangesBuilder::from(self.base.artifact_to_save())
            .process(ProcessModelProcessor::new().process(self.snapshot()))
            .build()
    }

    /// Persist pending changes through the process update endpoint
    ///
    /// # Errors
    /// Returns the update error, which is also sent on the error stream
    pub async fn save(self: &Arc<Self>) -> Result<(), NovaError> {
        // a reload would discard edits made while the request was running
        if self.commit().await? && !self.base.is_dirty() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Persist pending changes, keeping the in-memory graph
    ///
    /// # Errors
    /// Returns the update error, which is also sent on the error stream
    pub async fn auto_save(&self) -> Result<(), NovaError> {
        self.commit().await.map(|_| ())
    }

    async fn commit(&self) -> Result<bool, NovaError> {
        if !self.base.is_dirty() {
            tracing::debug!(id = self.id(), "nothing to save");
            return Ok(false);
        }
        let generation = self.base.edit_generation();
        let changes = self.artifact_to_save();
        self.base
            .services()
            .processes
            .update_process(self.id(), changes)
            .await
            .map_err(|e| self.base.fail(e))?;
        self.base.on_saved(generation);
        Ok(true)
    }

    /// Save if needed, publish, and remind the user to regenerate stories
    ///
    /// # Errors
    /// Returns the first failing step
    pub async fn publish(self: &Arc<Self>) -> Result<(), NovaError> {
        self.save().await?;
        self.base.publish_changes().await?;
        self.base
            .services()
            .add_info(MessageKey::ProcessRegenerateUserStories);
        self.refresh().await
    }
}

impl std::fmt::Debug for StatefulProcessArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulProcessArtifact")
            .field("base", &self.base)
            .field("shapes", &self.sub_artifacts.len())
            .field("load", &self.load)
            .finish_non_exhaustive()
    }
}
