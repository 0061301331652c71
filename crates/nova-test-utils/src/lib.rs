//! Testing utilities for the Nova workspace
//!
//! In-memory fakes for every collaborator of the state layer, with call
//! counters, a gate for holding remote calls open, and recorders for the
//! user-facing side effects.

#![allow(missing_docs)]

use async_trait::async_trait;
use nova_artifact::{
    ArtifactChanges, ArtifactModel, DiagramModel, ItemInfoResult, ItemTypePredefined, LockResult,
    ProcessLink, ProcessModel, ProcessShape, PropertyValues, ShapeFlags, SubArtifactModel, UserRef,
};
use nova_core::{
    ArtifactService, DiagramService, HttpStatus, ItemInfoService, Localization,
    LoadingOverlayService, LoadingToken, MessageKey, MessageService, NavigationService,
    NavigationTarget, NovaConfig, NovaError, ProcessService, ProjectManager, Services, UserMessage,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Per-endpoint call counters
#[derive(Debug, Default)]
pub struct Calls {
    pub item_info: AtomicUsize,
    pub get_artifact: AtomicUsize,
    pub get_sub_artifact: AtomicUsize,
    pub update_artifact: AtomicUsize,
    pub lock: AtomicUsize,
    pub publish: AtomicUsize,
    pub get_process: AtomicUsize,
    pub update_process: AtomicUsize,
    pub get_diagram: AtomicUsize,
    pub open_project: AtomicUsize,
}

impl Calls {
    /// Total requests of any kind
    pub fn total(&self) -> usize {
        [
            &self.item_info,
            &self.get_artifact,
            &self.get_sub_artifact,
            &self.update_artifact,
            &self.lock,
            &self.publish,
            &self.get_process,
            &self.update_process,
            &self.get_diagram,
            &self.open_project,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

/// In-memory artifact, process and admin stores
#[derive(Debug)]
pub struct FakeBackend {
    pub calls: Calls,
    items: Mutex<HashMap<i32, ItemInfoResult>>,
    artifacts: Mutex<HashMap<i32, ArtifactModel>>,
    processes: Mutex<HashMap<i32, ProcessModel>>,
    diagrams: Mutex<HashMap<i32, DiagramModel>>,
    failures: Mutex<HashMap<i32, HttpStatus>>,
    process_updates: Mutex<Vec<(i32, serde_json::Value)>>,
    open: watch::Sender<bool>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            calls: Calls::default(),
            items: Mutex::default(),
            artifacts: Mutex::default(),
            processes: Mutex::default(),
            diagrams: Mutex::default(),
            failures: Mutex::default(),
            process_updates: Mutex::default(),
            open,
        }
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_item(self: &Arc<Self>, info: ItemInfoResult) -> Arc<Self> {
        self.artifacts
            .lock()
            .entry(info.id)
            .or_insert_with(|| ArtifactModel::from(&info));
        self.items.lock().insert(info.id, info);
        Arc::clone(self)
    }

    pub fn with_artifact(self: &Arc<Self>, model: ArtifactModel) -> Arc<Self> {
        self.artifacts.lock().insert(model.id, model);
        Arc::clone(self)
    }

    pub fn with_process(self: &Arc<Self>, model: ProcessModel) -> Arc<Self> {
        self.processes.lock().insert(model.id, model);
        Arc::clone(self)
    }

    pub fn with_diagram(self: &Arc<Self>, model: DiagramModel) -> Arc<Self> {
        self.diagrams.lock().insert(model.id, model);
        Arc::clone(self)
    }

    /// Make every request for `id` fail with `status`
    pub fn fail(&self, id: i32, status: HttpStatus) {
        self.failures.lock().insert(id, status);
    }

    /// Hold every remote call until [`release`](Self::release)
    pub fn hold(&self) {
        self.open.send_replace(false);
    }

    pub fn release(&self) {
        self.open.send_replace(true);
    }

    /// Bodies sent to the process update endpoint, as serialized JSON
    pub fn process_updates(&self) -> Vec<(i32, serde_json::Value)> {
        self.process_updates.lock().clone()
    }

    async fn enter(&self, counter: &AtomicUsize, id: i32) -> Result<(), NovaError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.subscribe();
        // the sender lives in self
        let _ = open.wait_for(|open| *open).await;
        match self.failures.lock().get(&id) {
            Some(status) => Err(NovaError::api(*status, format!("fake failure for {id}"))),
            None => Ok(()),
        }
    }

    fn not_found(id: i32) -> NovaError {
        NovaError::api(HttpStatus::NotFound, format!("no item {id}"))
    }
}

#[async_trait]
impl ItemInfoService for FakeBackend {
    async fn get(&self, id: i32) -> Result<ItemInfoResult, NovaError> {
        self.enter(&self.calls.item_info, id).await?;
        self.items
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }
}

#[async_trait]
impl ArtifactService for FakeBackend {
    async fn get_artifact(&self, id: i32, _version: Option<i32>) -> Result<ArtifactModel, NovaError> {
        self.enter(&self.calls.get_artifact, id).await?;
        self.artifacts
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn get_sub_artifact(
        &self,
        artifact_id: i32,
        sub_artifact_id: i32,
        _version: Option<i32>,
    ) -> Result<SubArtifactModel, NovaError> {
        self.enter(&self.calls.get_sub_artifact, artifact_id).await?;
        let processes = self.processes.lock();
        let shape = processes
            .get(&artifact_id)
            .and_then(|p| p.shape(sub_artifact_id))
            .ok_or_else(|| Self::not_found(sub_artifact_id))?;
        Ok(SubArtifactModel {
            id: shape.id,
            parent_id: artifact_id,
            name: shape.name.clone(),
            description: None,
            predefined_type: shape.base_item_type_predefined,
            custom_property_values: Vec::new(),
        })
    }

    async fn update_artifact(&self, changes: ArtifactChanges) -> Result<(), NovaError> {
        self.enter(&self.calls.update_artifact, changes.id).await?;
        if let Some(model) = self.artifacts.lock().get_mut(&changes.id) {
            if let Some(name) = changes.name {
                model.name = name;
            }
            model.last_saved_on = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn lock(&self, id: i32) -> Result<LockResult, NovaError> {
        self.enter(&self.calls.lock, id).await?;
        Ok(LockResult::success(UserRef::new(1, "Test User")))
    }

    async fn publish(&self, id: i32) -> Result<(), NovaError> {
        self.enter(&self.calls.publish, id).await?;
        if let Some(model) = self.artifacts.lock().get_mut(&id) {
            model.version = model.version.max(0) + 1;
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessService for FakeBackend {
    async fn get_process(&self, id: i32, _version: Option<i32>) -> Result<ProcessModel, NovaError> {
        self.enter(&self.calls.get_process, id).await?;
        self.processes
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update_process(&self, id: i32, changes: ArtifactChanges) -> Result<(), NovaError> {
        self.enter(&self.calls.update_process, id).await?;
        let body = serde_json::to_value(&changes)?;
        self.process_updates.lock().push((id, body));
        if let Some(model) = self.artifacts.lock().get_mut(&id) {
            model.last_saved_on = Some(chrono::Utc::now());
        }
        if let Some(process) = changes.process {
            self.processes.lock().insert(id, process);
        }
        Ok(())
    }
}

#[async_trait]
impl DiagramService for FakeBackend {
    async fn get_diagram(&self, id: i32, _version: Option<i32>) -> Result<DiagramModel, NovaError> {
        self.enter(&self.calls.get_diagram, id).await?;
        self.diagrams
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }
}

#[async_trait]
impl ProjectManager for FakeBackend {
    async fn open_project(&self, id: i32) -> Result<(), NovaError> {
        self.enter(&self.calls.open_project, id).await
    }
}

/// Message service that keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingMessages {
    messages: Mutex<Vec<UserMessage>>,
    pub sticky_clears: AtomicUsize,
}

impl RecordingMessages {
    pub fn messages(&self) -> Vec<UserMessage> {
        self.messages.lock().clone()
    }

    pub fn keys(&self) -> Vec<MessageKey> {
        self.messages.lock().iter().map(|m| m.key).collect()
    }
}

impl MessageService for RecordingMessages {
    fn add_message(&self, message: UserMessage) {
        self.messages.lock().push(message);
    }

    fn clear_sticky_messages(&self) {
        self.sticky_clears.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    To(NavigationTarget),
    Main { redirect: bool },
    Reload,
}

/// Router that records where it was sent
#[derive(Debug, Default)]
pub struct RecordingNavigation {
    events: Mutex<Vec<NavigationEvent>>,
}

impl RecordingNavigation {
    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events.lock().clone()
    }
}

impl NavigationService for RecordingNavigation {
    fn navigate_to(&self, target: NavigationTarget) {
        self.events.lock().push(NavigationEvent::To(target));
    }

    fn navigate_to_main(&self, redirect: bool) {
        self.events.lock().push(NavigationEvent::Main { redirect });
    }

    fn reload_current_state(&self) {
        self.events.lock().push(NavigationEvent::Reload);
    }
}

/// Overlay that hands out unique tokens and tracks which are still open
#[derive(Debug, Default)]
pub struct CountingOverlay {
    next: AtomicU64,
    pub begun: AtomicUsize,
    pub ended: AtomicUsize,
    open: Mutex<HashSet<LoadingToken>>,
}

impl CountingOverlay {
    pub fn open_tokens(&self) -> usize {
        self.open.lock().len()
    }
}

impl LoadingOverlayService for CountingOverlay {
    fn begin_loading(&self) -> LoadingToken {
        let token = LoadingToken(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.begun.fetch_add(1, Ordering::SeqCst);
        self.open.lock().insert(token);
        token
    }

    fn end_loading(&self, token: LoadingToken) {
        self.ended.fetch_add(1, Ordering::SeqCst);
        assert!(self.open.lock().remove(&token), "overlay token {token:?} ended twice");
    }
}

/// Fakes wired together
#[derive(Debug, Clone)]
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub messages: Arc<RecordingMessages>,
    pub navigation: Arc<RecordingNavigation>,
    pub overlay: Arc<CountingOverlay>,
}

impl Harness {
    pub fn new(backend: Arc<FakeBackend>) -> Self {
        Self {
            backend,
            messages: Arc::default(),
            navigation: Arc::default(),
            overlay: Arc::default(),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            config: Arc::new(NovaConfig::default()),
            localization: Arc::new(Localization::new()),
            item_info: self.backend.clone(),
            artifacts: self.backend.clone(),
            processes: self.backend.clone(),
            diagrams: self.backend.clone(),
            projects: self.backend.clone(),
            navigation: self.navigation.clone(),
            messages: self.messages.clone(),
            loading: self.overlay.clone(),
        }
    }
}

/// Item descriptor for an ordinary artifact
pub fn item_info(id: i32, predefined_type: ItemTypePredefined, version_count: i32) -> ItemInfoResult {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "projectId": 1,
        "parentId": 1,
        "name": format!("Item {id}"),
        "prefix": "PRO",
        "predefinedType": predefined_type.code(),
        "versionCount": version_count,
        "permissions": 31
    }))
    .expect("fixture item info")
}

/// Descriptor of a deleted artifact
pub fn deleted_item_info(id: i32, by: &str, at: &str) -> ItemInfoResult {
    let mut info = item_info(id, ItemTypePredefined::Document, 2);
    info.is_deleted = true;
    info.deleted_by_user = Some(UserRef::new(9, by));
    info.deleted_date_time = Some(at.parse().expect("fixture timestamp"));
    info
}

pub fn shape(id: i32, parent_id: i32) -> ProcessShape {
    ProcessShape {
        id,
        name: format!("Shape {id}"),
        project_id: 1,
        parent_id,
        type_prefix: "PROS".into(),
        base_item_type_predefined: ItemTypePredefined::ProcessShape,
        property_values: PropertyValues::new(),
        associated_artifact: None,
        persona_reference: None,
        flags: ShapeFlags::default(),
    }
}

/// Linear process `id` with `shapes` shapes numbered from `id + 1`
pub fn process_model(id: i32, shapes: i32) -> ProcessModel {
    let ids: Vec<i32> = (1..=shapes).map(|n| id + n).collect();
    ProcessModel {
        id,
        name: format!("Process {id}"),
        project_id: 1,
        type_prefix: "PRO".into(),
        base_item_type_predefined: ItemTypePredefined::Process,
        shapes: ids.iter().map(|s| shape(*s, id)).collect(),
        links: ids
            .windows(2)
            .map(|w| ProcessLink {
                source_id: w[0],
                destination_id: w[1],
                orderindex: 0.0,
                label: None,
            })
            .collect(),
        ..ProcessModel::default()
    }
}
