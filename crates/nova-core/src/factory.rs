//! Builds the right stateful wrapper for a model

use crate::handle::ArtifactHandle;
use crate::process_artifact::StatefulProcessArtifact;
use crate::services::Services;
use crate::stateful_artifact::StatefulArtifact;
use nova_artifact::{ArtifactModel, ItemTypePredefined};

#[derive(Debug, Clone)]
pub struct StatefulArtifactFactory {
    services: Services,
}

impl StatefulArtifactFactory {
    #[inline]
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Wrap `model`; process artifacts get the process specialization
    #[must_use]
    pub fn create_stateful_artifact(&self, model: ArtifactModel) -> ArtifactHandle {
        let kind = model.predefined_type;
        let base = StatefulArtifact::new(model, self.services.clone());
        tracing::trace!(id = base.id(), %kind, "stateful artifact created");
        match kind {
            ItemTypePredefined::Process => StatefulProcessArtifact::new(base).into(),
            _ => base.into(),
        }
    }
}
