//! Mock collaborators for unit tests

use crate::messages::Localization;
use crate::services::{
    MockArtifactService, MockDiagramService, MockItemInfoService, MockLoadingOverlayService,
    MockMessageService, MockNavigationService, MockProcessService, MockProjectManager, Services,
};
use crate::types::NovaConfig;
use std::sync::Arc;

/// One mock per collaborator; set expectations, then convert
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) item_info: MockItemInfoService,
    pub(crate) artifacts: MockArtifactService,
    pub(crate) processes: MockProcessService,
    pub(crate) diagrams: MockDiagramService,
    pub(crate) projects: MockProjectManager,
    pub(crate) navigation: MockNavigationService,
    pub(crate) messages: MockMessageService,
    pub(crate) loading: MockLoadingOverlayService,
}

impl Mocks {
    pub(crate) fn into_services(self) -> Services {
        Services {
            config: Arc::new(NovaConfig::default()),
            localization: Arc::new(Localization::new()),
            item_info: Arc::new(self.item_info),
            artifacts: Arc::new(self.artifacts),
            processes: Arc::new(self.processes),
            diagrams: Arc::new(self.diagrams),
            projects: Arc::new(self.projects),
            navigation: Arc::new(self.navigation),
            messages: Arc::new(self.messages),
            loading: Arc::new(self.loading),
        }
    }
}
