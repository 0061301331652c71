use nova_artifact::{ArtifactModel, ItemTypePredefined};
use nova_core::{
    EditorTab, HttpStatus, MessageKey, NavigationOutcome, Navigator, NovaError, Session,
    StateParams,
};
use nova_test_utils::{
    deleted_item_info, item_info, process_model, FakeBackend, Harness, NavigationEvent,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn navigator(harness: &Harness) -> Navigator {
    Navigator::new(Session::new(harness.services()))
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_malformed_ids_make_no_requests() {
    let harness = Harness::new(FakeBackend::new());
    let service = Session::new(harness.services()).item_state_service();

    for raw in ["", " ", "abc", "NaN", "Infinity", "-Infinity", "4.2", "1e3", "0x10"] {
        let err = service.get_item_info_result(raw).await.unwrap_err();
        assert!(matches!(err, NovaError::InvalidId(_)), "{raw:?}");
    }
    assert_eq!(harness.backend.calls.total(), 0);
    assert_eq!(harness.overlay.begun.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_lookups_each_own_one_overlay() {
    let backend = FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 1));
    let harness = Harness::new(backend.clone());
    let service = Session::new(harness.services()).item_state_service();

    backend.hold();
    let overlay = harness.overlay.clone();
    let (a, b, ()) = tokio::join!(
        service.get_item_info_result("30"),
        service.get_item_info_result("30"),
        async {
            while overlay.begun.load(Ordering::SeqCst) < 2 {
                tokio::task::yield_now().await;
            }
            assert_eq!(overlay.open_tokens(), 2);
            backend.release();
        }
    );

    assert_eq!(a.unwrap().id, 30);
    assert_eq!(b.unwrap().id, 30);
    assert_eq!(harness.overlay.begun.load(Ordering::SeqCst), 2);
    assert_eq!(harness.overlay.ended.load(Ordering::SeqCst), 2);
    assert_eq!(harness.overlay.open_tokens(), 0);
}

#[tokio::test]
async fn test_failed_lookups_still_end_their_overlays() {
    let backend = FakeBackend::new();
    backend.fail(30, HttpStatus::ServerError);
    let harness = Harness::new(backend.clone());
    let service = Session::new(harness.services()).item_state_service();

    backend.hold();
    let overlay = harness.overlay.clone();
    let (a, b, ()) = tokio::join!(
        service.get_item_info_result("30"),
        service.get_item_info_result("30"),
        async {
            while overlay.begun.load(Ordering::SeqCst) < 2 {
                tokio::task::yield_now().await;
            }
            backend.release();
        }
    );

    assert_eq!(a.unwrap_err().status(), Some(HttpStatus::ServerError));
    assert!(b.is_err());
    assert_eq!(harness.overlay.ended.load(Ordering::SeqCst), 2);
    assert_eq!(harness.overlay.open_tokens(), 0);
    assert!(harness.messages.keys().is_empty());
}

#[tokio::test]
async fn test_missing_item_posts_not_found() {
    let harness = Harness::new(FakeBackend::new());
    let err = navigator(&harness)
        .navigate(StateParams::new("404"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(harness.messages.keys(), vec![MessageKey::HttpErrorNotFound]);
    assert!(harness.navigation.events().is_empty());
}

#[tokio::test]
async fn test_deleted_artifact_gets_deleted_overlay() {
    let info = deleted_item_info(30, "Dana Reyes", "2024-03-01T10:00:00Z");
    let deleted_at = info.deleted_date_time;
    let harness = Harness::new(FakeBackend::new().with_item(info));

    let outcome = navigator(&harness)
        .navigate(StateParams::new("30"))
        .await
        .unwrap();

    let state = outcome.selected().unwrap().artifact_state();
    assert!(state.deleted);
    assert!(state.historical);
    assert_eq!(state.deleted_by_display_name.as_deref(), Some("Dana Reyes"));
    assert_eq!(state.deleted_date_time, deleted_at);
    assert_eq!(harness.messages.sticky_clears.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_version_past_latest_goes_to_main() {
    let harness =
        Harness::new(FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 3)));
    let navigator = navigator(&harness);

    let outcome = navigator
        .navigate(StateParams::new("30").with_version("4"))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        NavigationOutcome::VersionNotFound {
            requested: 4,
            available: 3
        }
    ));
    assert!(navigator.session().selection().artifact().is_none());
    assert_eq!(harness.messages.keys(), vec![MessageKey::ArtifactVersionNotFound]);
    assert_eq!(
        harness.navigation.events(),
        vec![NavigationEvent::Main { redirect: true }]
    );
}

#[tokio::test]
async fn test_latest_version_is_allowed() {
    let harness =
        Harness::new(FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 3)));

    let outcome = navigator(&harness)
        .navigate(StateParams::new("30").with_version("3"))
        .await
        .unwrap();

    let artifact = outcome.selected().unwrap();
    assert_eq!(artifact.base().pinned_version(), Some(3));
    assert!(artifact.artifact_state().historical);
}

#[tokio::test]
async fn test_path_parameter_skips_explorer_selection() {
    let harness =
        Harness::new(FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 1)));

    let deep_link = navigator(&harness);
    deep_link
        .navigate(StateParams::new("30").with_path("1/2/30"))
        .await
        .unwrap();
    let selection = deep_link.session().selection();
    assert!(selection.explorer_artifact().is_none());
    assert_eq!(selection.artifact().map(|a| a.id()), Some(30));

    let tree_click = navigator(&harness);
    tree_click.navigate(StateParams::new("30")).await.unwrap();
    let selection = tree_click.session().selection();
    assert_eq!(selection.explorer_artifact().map(|a| a.id()), Some(30));
    assert_eq!(selection.artifact().map(|a| a.id()), Some(30));
}

#[tokio::test]
async fn test_editor_tab_follows_item_type() {
    let cases = [
        (ItemTypePredefined::Process, EditorTab::Process),
        (ItemTypePredefined::Glossary, EditorTab::Glossary),
        (ItemTypePredefined::Storyboard, EditorTab::Diagram),
        (ItemTypePredefined::ArtifactCollection, EditorTab::Collection),
        (ItemTypePredefined::CollectionFolder, EditorTab::General),
        (ItemTypePredefined::TextualRequirement, EditorTab::Details),
    ];
    for (kind, expected) in cases {
        let harness = Harness::new(FakeBackend::new().with_item(item_info(30, kind, 1)));
        let outcome = navigator(&harness)
            .navigate(StateParams::new("30"))
            .await
            .unwrap();
        let NavigationOutcome::Selected { tab, .. } = outcome else {
            panic!("{kind} was not selected");
        };
        assert_eq!(tab, expected, "{kind}");
    }
}

#[tokio::test]
async fn test_not_found_on_error_stream_reloads_state() {
    let backend = FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 1));
    let harness = Harness::new(backend.clone());

    let outcome = navigator(&harness)
        .navigate(StateParams::new("30"))
        .await
        .unwrap();
    backend.fail(30, HttpStatus::NotFound);

    assert!(outcome.selected().unwrap().get_observable().await.is_err());
    settle().await;
    assert_eq!(harness.navigation.events(), vec![NavigationEvent::Reload]);
}

#[tokio::test]
async fn test_unauthorized_on_error_stream_leaves_to_main() {
    let backend = FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 1));
    let harness = Harness::new(backend.clone());

    let outcome = navigator(&harness)
        .navigate(StateParams::new("30"))
        .await
        .unwrap();
    backend.fail(30, HttpStatus::Unauthorized);

    assert!(outcome.selected().unwrap().get_observable().await.is_err());
    settle().await;
    assert_eq!(
        harness.navigation.events(),
        vec![NavigationEvent::Main { redirect: true }]
    );
}

#[tokio::test]
async fn test_renavigation_replaces_cached_wrapper() {
    let harness =
        Harness::new(FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 1)));
    let navigator = navigator(&harness);

    let first = navigator.navigate(StateParams::new("30")).await.unwrap();
    let first = first.selected().unwrap().clone();
    first.get_observable().await.unwrap();

    let second = navigator.navigate(StateParams::new("30")).await.unwrap();
    let second = second.selected().unwrap();

    assert!(!second.same_instance(&first));
    assert!(!first.base().is_loaded());
    assert_eq!(navigator.session().artifacts().len(), 1);
}

#[tokio::test]
async fn test_reselect_cancels_pending_diagram_load() {
    let backend = FakeBackend::new().with_item(item_info(30, ItemTypePredefined::Document, 1));
    let harness = Harness::new(backend.clone());
    let session = Session::new(harness.services());
    let other = session
        .factory()
        .create_stateful_artifact(ArtifactModel::new(31, 1, "Other", ItemTypePredefined::Document));

    backend.hold();
    let (result, ()) = tokio::join!(session.diagrams().load(30, None), async {
        while backend.calls.get_diagram.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        session.selection().set_artifact(other.clone());
    });

    assert!(matches!(result, Err(NovaError::Cancelled)));
    backend.release();
}

#[tokio::test]
async fn test_project_navigation_opens_project() {
    let project = serde_json::from_value(serde_json::json!({
        "id": 1, "projectId": 1, "name": "Payments",
        "predefinedType": ItemTypePredefined::Project.code()
    }))
    .unwrap();
    let backend = FakeBackend::new().with_item(project);
    let harness = Harness::new(backend.clone());

    let outcome = navigator(&harness)
        .navigate(StateParams::new("1"))
        .await
        .unwrap();

    assert_eq!(backend.calls.open_project.load(Ordering::SeqCst), 1);
    let NavigationOutcome::Selected { artifact, tab } = outcome else {
        panic!("project was not selected");
    };
    assert_eq!(artifact.name(), "Payments");
    assert_eq!(tab, EditorTab::General);
}

#[tokio::test]
async fn test_process_navigation_yields_process_wrapper() {
    let backend = FakeBackend::new()
        .with_item(item_info(40, ItemTypePredefined::Process, 2))
        .with_process(process_model(40, 3));
    let harness = Harness::new(backend);

    let outcome = navigator(&harness)
        .navigate(StateParams::new("40"))
        .await
        .unwrap();
    let process = Arc::clone(outcome.selected().unwrap().as_process().unwrap());

    process.get_observable().await.unwrap();
    assert_eq!(process.shapes().len(), 3);
}
