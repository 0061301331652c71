//! Type-erased stateful artifact

use crate::error::NovaError;
use crate::process_artifact::StatefulProcessArtifact;
use crate::stateful_artifact::{ArtifactState, StatefulArtifact};
use nova_artifact::ItemTypePredefined;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A stateful artifact of any kind, as handed out by the factory
#[derive(Debug, Clone)]
pub enum ArtifactHandle {
    Artifact(Arc<StatefulArtifact>),
    Process(Arc<StatefulProcessArtifact>),
}

impl ArtifactHandle {
    /// Generic artifact state shared by every kind
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Arc<StatefulArtifact> {
        match self {
            Self::Artifact(artifact) => artifact,
            Self::Process(process) => process.base(),
        }
    }

    #[must_use]
    pub fn as_process(&self) -> Option<&Arc<StatefulProcessArtifact>> {
        match self {
            Self::Process(process) => Some(process),
            Self::Artifact(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.base().id()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.base().name()
    }

    #[must_use]
    pub fn predefined_type(&self) -> ItemTypePredefined {
        self.base().predefined_type()
    }

    #[must_use]
    pub fn artifact_state(&self) -> ArtifactState {
        self.base().artifact_state()
    }

    #[must_use]
    pub fn errors(&self) -> broadcast::Receiver<NovaError> {
        self.base().errors()
    }

    /// Whether both handles wrap the same instance
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(self.base(), other.base())
    }

    /// # Errors
    /// Returns the load error
    pub async fn get_observable(&self) -> Result<(), NovaError> {
        match self {
            Self::Artifact(artifact) => artifact.get_observable().await,
            Self::Process(process) => process.get_observable().await,
        }
    }

    pub fn unload(&self) {
        match self {
            Self::Artifact(artifact) => artifact.unload(),
            Self::Process(process) => process.unload(),
        }
    }

    /// # Errors
    /// Returns the reload error
    pub async fn refresh(&self) -> Result<(), NovaError> {
        match self {
            Self::Artifact(artifact) => artifact.refresh().await,
            Self::Process(process) => process.refresh().await,
        }
    }

    /// # Errors
    /// Returns the save error
    pub async fn save(&self) -> Result<(), NovaError> {
        match self {
            Self::Artifact(artifact) => artifact.save().await,
            Self::Process(process) => process.save().await,
        }
    }

    /// # Errors
    /// Returns the save error
    pub async fn auto_save(&self) -> Result<(), NovaError> {
        match self {
            Self::Artifact(artifact) => artifact.auto_save().await,
            Self::Process(process) => process.auto_save().await,
        }
    }

    /// # Errors
    /// Returns the first failing step
    pub async fn publish(&self) -> Result<(), NovaError> {
        match self {
            Self::Artifact(artifact) => artifact.publish().await,
            Self::Process(process) => process.publish().await,
        }
    }
}

impl From<Arc<StatefulArtifact>> for ArtifactHandle {
    fn from(artifact: Arc<StatefulArtifact>) -> Self {
        Self::Artifact(artifact)
    }
}

impl From<Arc<StatefulProcessArtifact>> for ArtifactHandle {
    fn from(process: Arc<StatefulProcessArtifact>) -> Self {
        Self::Process(process)
    }
}
