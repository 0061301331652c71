//! Item state controller
//!
//! Decides what a resolved item turns into when the user navigates to it:
//! - Sub-artifacts redirect to their owning artifact
//! - Projects are opened and shown on the general tab
//! - Ordinary artifacts are wrapped, optionally pinned to a version or
//!   marked deleted, and selected
//! - Baselines, reviews and unknown kinds are refused with a message

use crate::error::NovaError;
use crate::handle::ArtifactHandle;
use crate::messages::MessageKey;
use crate::session::Session;
use crate::types::{EditorTab, NavigationTarget, StateParams};
use nova_artifact::{ArtifactModel, ItemInfoResult, ItemKind, ItemTypePredefined};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;

/// How a navigation ended
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// Sent to another item
    Redirected(NavigationTarget),
    /// Artifact selected and shown on `tab`
    Selected {
        artifact: ArtifactHandle,
        tab: EditorTab,
    },
    /// Requested version past the last one; sent to the main view
    VersionNotFound { requested: i32, available: i32 },
    /// Item kind cannot be opened
    NotAvailable(ItemTypePredefined),
}

impl NavigationOutcome {
    #[must_use]
    pub fn selected(&self) -> Option<&ArtifactHandle> {
        match self {
            Self::Selected { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

/// One navigation to one resolved item
#[derive(Debug)]
pub struct ItemStateController {
    session: Arc<Session>,
    info: ItemInfoResult,
    params: StateParams,
}

impl ItemStateController {
    #[inline]
    #[must_use]
    pub fn new(info: ItemInfoResult, params: StateParams, session: Arc<Session>) -> Self {
        Self {
            session,
            info,
            params,
        }
    }

    /// Run the navigation
    ///
    /// # Workflow
    /// 1. Clear sticky messages
    /// 2. Evict a stale cached wrapper for this id
    /// 3. Dispatch on the item kind
    ///
    /// # Errors
    /// Only collaborator failures (opening a project) are returned; refused
    /// navigations are reported through [`NavigationOutcome`]
    pub async fn run(self) -> Result<NavigationOutcome, NovaError> {
        let services = self.session.services();
        services.messages.clear_sticky_messages();
        self.evict_stale();

        tracing::info!("Navigating to item {} ({:?})", self.info.id, self.info.kind());
        match self.info.kind() {
            ItemKind::SubArtifact => Ok(self.redirect_to_owner()),
            ItemKind::Project => self.open_project().await,
            ItemKind::Artifact if self.is_supported() => Ok(self.open_artifact().await),
            ItemKind::Artifact => {
                let kind = self.info.predefined_type;
                tracing::warn!("Item {} of type {} cannot be opened", self.info.id, kind);
                services.add_error(MessageKey::ArtifactGoToNotAvailable);
                Ok(NavigationOutcome::NotAvailable(kind))
            }
        }
    }

    fn is_supported(&self) -> bool {
        !matches!(
            self.info.predefined_type,
            ItemTypePredefined::None | ItemTypePredefined::Unknown(_)
        ) && !self.info.predefined_type.is_baseline_or_review()
    }

    fn evict_stale(&self) {
        if self.params.requested_version().is_some() {
            return;
        }
        let manager = self.session.artifacts();
        if let Some(cached) = manager.get(self.info.id) {
            if !cached.artifact_state().deleted {
                tracing::debug!(id = self.info.id, "unloading cached artifact");
                cached.unload();
                manager.remove(self.info.id);
            }
        }
    }

    fn redirect_to_owner(&self) -> NavigationOutcome {
        let target = NavigationTarget::redirect_to(self.info.id);
        tracing::debug!(
            sub_artifact = ?self.info.sub_artifact_id,
            owner = self.info.id,
            "redirecting to owning artifact"
        );
        self.session.services().navigation.navigate_to(target.clone());
        NavigationOutcome::Redirected(target)
    }

    async fn open_project(&self) -> Result<NavigationOutcome, NovaError> {
        self.session
            .services()
            .projects
            .open_project(self.info.id)
            .await?;

        let model = ArtifactModel::project(self.info.id, self.info.name.clone());
        let artifact = self.session.factory().create_stateful_artifact(model);
        Ok(self.defer_select(artifact).await)
    }

    async fn open_artifact(&self) -> NavigationOutcome {
        let services = self.session.services();
        let artifact = self
            .session
            .factory()
            .create_stateful_artifact(ArtifactModel::from(&self.info));

        if let Some(requested) = self.params.requested_version() {
            let available = self.info.version_count;
            if requested > available {
                tracing::warn!(
                    "Version {} of item {} not found (latest {})",
                    requested,
                    self.info.id,
                    available
                );
                services.add_error(MessageKey::ArtifactVersionNotFound);
                services.navigation.navigate_to_main(true);
                return NavigationOutcome::VersionNotFound {
                    requested,
                    available,
                };
            }
            artifact.base().pin_version(requested);
        } else if self.info.is_deleted {
            artifact
                .base()
                .mark_deleted(self.info.deleted_by_user.as_ref(), self.info.deleted_date_time);
        }

        self.defer_select(artifact).await
    }

    /// Select on the next scheduler turn and pick the editor tab
    async fn defer_select(&self, artifact: ArtifactHandle) -> NavigationOutcome {
        tokio::task::yield_now().await;

        self.session.artifacts().add(artifact.clone());
        self.select(&artifact);

        let tab = EditorTab::for_item(
            artifact.predefined_type(),
            self.info.parent_id,
            self.info.project_id,
        );
        self.session.set_active_editor(tab);
        tracing::info!("Selected artifact {} on the {} tab", artifact.id(), tab.as_str());
        NavigationOutcome::Selected { artifact, tab }
    }

    fn select(&self, artifact: &ArtifactHandle) {
        let selection = self.session.selection();
        if self.params.path.is_none() {
            selection.set_explorer_artifact(artifact.clone());
        }
        selection.set_artifact(artifact.clone());
        self.watch_errors(artifact);
    }

    /// React to failures on the artifact's error stream until it is dropped
    fn watch_errors(&self, artifact: &ArtifactHandle) {
        let id = artifact.id();
        let mut errors = artifact.errors();
        let session: Weak<Session> = Arc::downgrade(&self.session);

        tokio::spawn(async move {
            loop {
                let err = match errors.recv().await {
                    Ok(err) => err,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(id, skipped, "artifact error stream lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(session) = session.upgrade() else {
                    break;
                };
                handle_artifact_error(&session, id, &err);
            }
            tracing::trace!(id, "artifact error watcher finished");
        });
    }
}

/// Error-stream policy for the active artifact
fn handle_artifact_error(session: &Session, id: i32, err: &NovaError) {
    let active = session.selection().artifact().map(|a| a.id());
    if active != Some(id) {
        tracing::debug!(id, error = %err, "ignoring error of inactive artifact");
        return;
    }

    let navigation = &session.services().navigation;
    if err.is_not_found() {
        tracing::info!("Artifact {} no longer exists, reloading", id);
        navigation.reload_current_state();
    } else if err.is_session_fatal() {
        tracing::warn!("Artifact {} failed with {}, leaving to main view", id, err);
        navigation.navigate_to_main(true);
    }
}

/// Resolves a route and runs the controller for it
#[derive(Debug, Clone)]
pub struct Navigator {
    session: Arc<Session>,
}

impl Navigator {
    #[inline]
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Resolve `params.id` and navigate to it
    ///
    /// # Errors
    /// Resolution failures (already messaged when not found) and controller
    /// errors
    pub async fn navigate(&self, params: StateParams) -> Result<NavigationOutcome, NovaError> {
        let info = self
            .session
            .item_state_service()
            .get_item_info_result(&params.id)
            .await?;
        ItemStateController::new(info, params, Arc::clone(&self.session))
            .run()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpStatus;
    use crate::testing::Mocks;
    use mockall::predicate::eq;

    fn info(value: serde_json::Value) -> ItemInfoResult {
        serde_json::from_value(value).unwrap()
    }

    fn document(id: i32) -> ItemInfoResult {
        info(serde_json::json!({
            "id": id, "projectId": 1, "parentId": 1, "name": "Spec",
            "predefinedType": ItemTypePredefined::Document.code(), "versionCount": 3
        }))
    }

    fn quiet(mocks: &mut Mocks) {
        mocks.messages.expect_clear_sticky_messages().return_const(());
    }

    #[tokio::test]
    async fn sub_artifact_redirects_to_owner() {
        let mut mocks = Mocks::default();
        quiet(&mut mocks);
        mocks
            .navigation
            .expect_navigate_to()
            .with(eq(NavigationTarget::redirect_to(30)))
            .times(1)
            .return_const(());
        let session = Session::new(mocks.into_services());
        let item = info(serde_json::json!({
            "id": 30, "subArtifactId": 31, "projectId": 1, "name": "Task",
            "predefinedType": ItemTypePredefined::ProcessShape.code()
        }));

        let outcome = ItemStateController::new(item, StateParams::new("31"), session.clone())
            .run()
            .await
            .unwrap();
        assert!(matches!(outcome, NavigationOutcome::Redirected(_)));
        assert!(session.selection().artifact().is_none());
    }

    #[tokio::test]
    async fn project_opens_on_general_tab() {
        let mut mocks = Mocks::default();
        quiet(&mut mocks);
        mocks
            .projects
            .expect_open_project()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        let session = Session::new(mocks.into_services());
        let item = info(serde_json::json!({
            "id": 1, "projectId": 1, "name": "Payments",
            "predefinedType": ItemTypePredefined::Project.code()
        }));

        let outcome = ItemStateController::new(item, StateParams::new("1"), session.clone())
            .run()
            .await
            .unwrap();
        let NavigationOutcome::Selected { artifact, tab } = outcome else {
            panic!("project was not selected");
        };
        assert_eq!(tab, EditorTab::General);
        assert_eq!(artifact.name(), "Payments");
        assert_eq!(artifact.predefined_type(), ItemTypePredefined::Project);
        assert_eq!(session.active_editor(), Some(EditorTab::General));
    }

    #[tokio::test]
    async fn project_open_failure_propagates() {
        let mut mocks = Mocks::default();
        quiet(&mut mocks);
        mocks
            .projects
            .expect_open_project()
            .returning(|_| Err(NovaError::api(HttpStatus::Forbidden, "no access")));
        let session = Session::new(mocks.into_services());
        let item = info(serde_json::json!({
            "id": 1, "projectId": 1, "name": "Payments",
            "predefinedType": ItemTypePredefined::Project.code()
        }));

        let err = ItemStateController::new(item, StateParams::new("1"), session.clone())
            .run()
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(HttpStatus::Forbidden));
        assert!(session.selection().artifact().is_none());
    }

    #[tokio::test]
    async fn baselines_and_reviews_are_not_available() {
        for kind in [
            ItemTypePredefined::ArtifactBaseline,
            ItemTypePredefined::BaselineFolder,
            ItemTypePredefined::ArtifactReviewPackage,
            ItemTypePredefined::Review,
            ItemTypePredefined::Unknown(77),
        ] {
            let mut mocks = Mocks::default();
            quiet(&mut mocks);
            mocks
                .messages
                .expect_add_message()
                .withf(|m| m.key == MessageKey::ArtifactGoToNotAvailable)
                .times(1)
                .return_const(());
            let session = Session::new(mocks.into_services());
            let item = info(serde_json::json!({
                "id": 50, "projectId": 1, "name": "B", "predefinedType": kind.code()
            }));

            let outcome = ItemStateController::new(item, StateParams::new("50"), session.clone())
                .run()
                .await
                .unwrap();
            assert!(matches!(outcome, NavigationOutcome::NotAvailable(k) if k == kind));
            assert!(session.artifacts().is_empty());
        }
    }

    #[tokio::test]
    async fn pinned_version_is_historical() {
        let mut mocks = Mocks::default();
        quiet(&mut mocks);
        let session = Session::new(mocks.into_services());

        let outcome = ItemStateController::new(
            document(30),
            StateParams::new("30").with_version("2"),
            session.clone(),
        )
        .run()
        .await
        .unwrap();

        let artifact = outcome.selected().unwrap();
        assert_eq!(artifact.base().pinned_version(), Some(2));
        assert!(artifact.artifact_state().historical);
    }

    #[tokio::test]
    async fn cached_wrapper_is_replaced() {
        let mut mocks = Mocks::default();
        quiet(&mut mocks);
        let session = Session::new(mocks.into_services());
        let stale = session
            .factory()
            .create_stateful_artifact(ArtifactModel::from(&document(30)));
        session.artifacts().add(stale.clone());

        let outcome = ItemStateController::new(document(30), StateParams::new("30"), session.clone())
            .run()
            .await
            .unwrap();

        let fresh = outcome.selected().unwrap();
        assert!(!fresh.same_instance(&stale));
        assert!(session.artifacts().get(30).unwrap().same_instance(fresh));
    }

    #[tokio::test]
    async fn error_stream_drives_navigation() {
        let mut mocks = Mocks::default();
        quiet(&mut mocks);
        mocks
            .artifacts
            .expect_get_artifact()
            .returning(|_, _| Err(NovaError::api(HttpStatus::ServerError, "boom")));
        let (tx, rx) = std::sync::mpsc::channel();
        mocks
            .navigation
            .expect_navigate_to_main()
            .with(eq(true))
            .times(1)
            .returning(move |_| {
                let _ = tx.send(());
            });
        let session = Session::new(mocks.into_services());

        let outcome = ItemStateController::new(document(30), StateParams::new("30"), session.clone())
            .run()
            .await
            .unwrap();
        let artifact = outcome.selected().unwrap().clone();

        assert!(artifact.get_observable().await.is_err());
        for _ in 0..100 {
            if rx.try_recv().is_ok() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("navigate_to_main was not called");
    }
}
