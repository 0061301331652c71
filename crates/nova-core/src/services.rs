//! Collaborator contracts
//!
//! Everything the state layer talks to is behind a trait: remote stores,
//! navigation, the message area and the loading overlay. [`Services`] bundles
//! one implementation of each so it can be handed around as a unit.

use crate::error::NovaError;
use crate::messages::{Localization, MessageKey, MessageLevel, UserMessage};
use crate::types::{LoadingToken, NavigationTarget, NovaConfig};
use async_trait::async_trait;
use nova_artifact::{
    ArtifactChanges, ArtifactModel, DiagramModel, ItemInfoResult, LockResult, ProcessModel,
    SubArtifactModel,
};
use std::sync::Arc;

/// Resolves a bare id to an item descriptor
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemInfoService: Send + Sync {
    async fn get(&self, id: i32) -> Result<ItemInfoResult, NovaError>;
}

/// Artifact store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactService: Send + Sync {
    async fn get_artifact(&self, id: i32, version: Option<i32>)
        -> Result<ArtifactModel, NovaError>;

    async fn get_sub_artifact(
        &self,
        artifact_id: i32,
        sub_artifact_id: i32,
        version: Option<i32>,
    ) -> Result<SubArtifactModel, NovaError>;

    async fn update_artifact(&self, changes: ArtifactChanges) -> Result<(), NovaError>;

    async fn lock(&self, id: i32) -> Result<LockResult, NovaError>;

    async fn publish(&self, id: i32) -> Result<(), NovaError>;
}

/// Process-specific endpoints of the artifact store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessService: Send + Sync {
    async fn get_process(&self, id: i32, version: Option<i32>)
        -> Result<ProcessModel, NovaError>;

    async fn update_process(&self, id: i32, changes: ArtifactChanges) -> Result<(), NovaError>;
}

/// Diagram payloads for graphical editors
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiagramService: Send + Sync {
    async fn get_diagram(&self, id: i32, version: Option<i32>)
        -> Result<DiagramModel, NovaError>;
}

/// Opens projects in the explorer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectManager: Send + Sync {
    async fn open_project(&self, id: i32) -> Result<(), NovaError>;
}

/// Router
#[cfg_attr(test, mockall::automock)]
pub trait NavigationService: Send + Sync {
    fn navigate_to(&self, target: NavigationTarget);

    fn navigate_to_main(&self, redirect: bool);

    fn reload_current_state(&self);
}

/// User-visible message area
#[cfg_attr(test, mockall::automock)]
pub trait MessageService: Send + Sync {
    fn add_message(&self, message: UserMessage);

    /// Drop messages that survive navigation
    fn clear_sticky_messages(&self);
}

/// Global loading overlay
#[cfg_attr(test, mockall::automock)]
pub trait LoadingOverlayService: Send + Sync {
    fn begin_loading(&self) -> LoadingToken;

    fn end_loading(&self, token: LoadingToken);
}

/// One implementation of every collaborator
#[derive(Clone)]
pub struct Services {
    pub config: Arc<NovaConfig>,
    pub localization: Arc<Localization>,
    pub item_info: Arc<dyn ItemInfoService>,
    pub artifacts: Arc<dyn ArtifactService>,
    pub processes: Arc<dyn ProcessService>,
    pub diagrams: Arc<dyn DiagramService>,
    pub projects: Arc<dyn ProjectManager>,
    pub navigation: Arc<dyn NavigationService>,
    pub messages: Arc<dyn MessageService>,
    pub loading: Arc<dyn LoadingOverlayService>,
}

impl Services {
    /// Post a localized error
    pub fn add_error(&self, key: MessageKey) {
        self.post(MessageLevel::Error, key);
    }

    /// Post a localized informational message
    pub fn add_info(&self, key: MessageKey) {
        self.post(MessageLevel::Info, key);
    }

    fn post(&self, level: MessageLevel, key: MessageKey) {
        tracing::debug!(key = key.as_str(), ?level, "posting message");
        self.messages
            .add_message(self.localization.message(level, key));
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
