//! Session cache of stateful artifacts

use crate::handle::ArtifactHandle;
use dashmap::DashMap;

/// Stateful artifacts by id, shared by every navigation of a session
#[derive(Debug, Default)]
pub struct ArtifactManager {
    artifacts: DashMap<i32, ArtifactHandle>,
}

impl ArtifactManager {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<ArtifactHandle> {
        self.artifacts.get(&id).map(|entry| entry.value().clone())
    }

    /// Cache `artifact`, replacing any wrapper with the same id
    pub fn add(&self, artifact: ArtifactHandle) {
        if let Some(previous) = self.artifacts.insert(artifact.id(), artifact) {
            tracing::trace!(id = previous.id(), "replaced cached artifact");
        }
    }

    pub fn remove(&self, id: i32) -> Option<ArtifactHandle> {
        self.artifacts.remove(&id).map(|(_, artifact)| artifact)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
