//! Navigation session: everything that outlives a single navigation

use crate::artifact_manager::ArtifactManager;
use crate::diagram::DiagramLoader;
use crate::factory::StatefulArtifactFactory;
use crate::item_state_service::ItemStateService;
use crate::selection::SelectionManager;
use crate::services::Services;
use crate::types::EditorTab;
use parking_lot::RwLock;
use std::sync::Arc;

/// Explicit context passed to every controller instead of process-wide
/// singletons. Dropping the session drops its cache and selection.
#[derive(Debug)]
pub struct Session {
    services: Services,
    factory: StatefulArtifactFactory,
    artifacts: ArtifactManager,
    selection: SelectionManager,
    diagrams: Arc<DiagramLoader>,
    active_editor: RwLock<Option<EditorTab>>,
}

impl Session {
    #[must_use]
    pub fn new(services: Services) -> Arc<Self> {
        let diagrams = Arc::new(DiagramLoader::new(services.diagrams.clone()));
        Arc::new(Self {
            factory: StatefulArtifactFactory::new(services.clone()),
            artifacts: ArtifactManager::new(),
            selection: SelectionManager::new(Arc::clone(&diagrams)),
            diagrams,
            active_editor: RwLock::new(None),
            services,
        })
    }

    #[inline]
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    #[inline]
    #[must_use]
    pub fn factory(&self) -> &StatefulArtifactFactory {
        &self.factory
    }

    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &ArtifactManager {
        &self.artifacts
    }

    #[inline]
    #[must_use]
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    #[inline]
    #[must_use]
    pub fn diagrams(&self) -> &DiagramLoader {
        &self.diagrams
    }

    #[must_use]
    pub fn item_state_service(&self) -> ItemStateService {
        ItemStateService::new(self.services.clone())
    }

    #[must_use]
    pub fn active_editor(&self) -> Option<EditorTab> {
        *self.active_editor.read()
    }

    pub fn set_active_editor(&self, tab: EditorTab) {
        *self.active_editor.write() = Some(tab);
    }
}
