use nova_artifact::{ArtifactModel, ItemTypePredefined, ProcessLink};
use nova_core::{MessageKey, Session, StatefulProcessArtifact};
use nova_test_utils::{item_info, process_model, shape, FakeBackend, Harness};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn open_process(harness: &Harness, id: i32, version_count: i32) -> Arc<StatefulProcessArtifact> {
    let session = Session::new(harness.services());
    let model = ArtifactModel::from(&item_info(id, ItemTypePredefined::Process, version_count));
    let handle = session.factory().create_stateful_artifact(model);
    Arc::clone(handle.as_process().expect("process wrapper"))
}

fn backend_with_process(id: i32, version_count: i32) -> Arc<FakeBackend> {
    FakeBackend::new()
        .with_item(item_info(id, ItemTypePredefined::Process, version_count))
        .with_process(process_model(id, 3))
}

#[tokio::test]
async fn test_concurrent_loads_issue_one_request() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);

    backend.hold();
    let (a, b, c, ()) = tokio::join!(
        process.get_observable(),
        process.get_observable(),
        process.get_observable(),
        async {
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            backend.release();
        }
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(backend.calls.get_artifact.load(Ordering::SeqCst), 1);
    assert_eq!(backend.calls.get_process.load(Ordering::SeqCst), 1);

    process.get_observable().await.unwrap();
    assert_eq!(backend.calls.get_process.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_shape_becomes_a_sub_artifact() {
    let harness = Harness::new(backend_with_process(40, 2));
    let process = open_process(&harness, 40, 2);

    process.get_observable().await.unwrap();

    let subs = process.sub_artifacts().list();
    assert_eq!(subs.len(), process.shapes().len());
    for sub in &subs {
        let state = sub.artifact_state();
        assert!(!state.dirty);
        assert!(!state.historical);
    }
    let ids: Vec<_> = subs.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![41, 42, 43]);
}

#[tokio::test]
async fn test_reload_replaces_sub_artifacts() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();
    let before = process.sub_artifacts().get(41).unwrap();

    backend.with_process(process_model(40, 5));
    process.refresh().await.unwrap();

    assert_eq!(process.sub_artifacts().len(), 5);
    assert!(!Arc::ptr_eq(&before, &process.sub_artifacts().get(41).unwrap()));
}

#[tokio::test]
async fn test_process_name_is_not_refreshed_from_graph() {
    let harness = Harness::new(backend_with_process(40, 2));
    let process = open_process(&harness, 40, 2);

    process.get_observable().await.unwrap();

    // the graph payload is named "Process 40"; the artifact details win
    assert_eq!(process.name(), "Item 40");
}

#[tokio::test]
async fn test_unsaved_process_shapes_load_nothing() {
    let backend = backend_with_process(50, 0);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 50, 0);
    process.get_observable().await.unwrap();
    let before = backend.calls.total();

    let sub = process.sub_artifacts().get(51).unwrap();
    let resolved = sub.load_properties().await.unwrap();

    assert!(Arc::ptr_eq(&resolved, &sub));
    assert_eq!(backend.calls.total(), before);
    assert!(sub.details().is_none());
}

#[tokio::test]
async fn test_saved_process_shapes_load_details() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();

    let sub = process.sub_artifacts().get(42).unwrap();
    backend.hold();
    let (a, b, ()) = tokio::join!(sub.load_properties(), sub.load_properties(), async {
        while backend.calls.get_sub_artifact.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        tokio::task::yield_now().await;
        backend.release();
    });
    assert!(a.is_ok() && b.is_ok());

    assert_eq!(backend.calls.get_sub_artifact.load(Ordering::SeqCst), 1);
    assert_eq!(sub.details().unwrap().name, "Shape 42");
}

#[tokio::test]
async fn test_save_sends_current_graph() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();

    process
        .update_shape(42, |s| s.name = "Pay by card".into())
        .await
        .unwrap();
    process.add_shape(shape(-1, 40)).await.unwrap();
    process
        .add_link(ProcessLink {
            source_id: 43,
            destination_id: -1,
            orderindex: 0.0,
            label: Some("then".into()),
        })
        .await
        .unwrap();
    assert!(process.artifact_state().dirty);

    process.save().await.unwrap();

    let updates = backend.process_updates();
    assert_eq!(updates.len(), 1);
    let (id, body) = &updates[0];
    assert_eq!(*id, 40);
    let graph = &body["process"];
    assert!(graph.is_object());
    assert_eq!(graph["shapes"][1]["name"], json!("Pay by card"));
    assert_eq!(graph["shapes"].as_array().unwrap().len(), 4);
    assert!(graph["links"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["sourceId"] == json!(43) && l["destinationId"] == json!(-1)));

    assert!(!process.artifact_state().dirty);
    assert_eq!(backend.calls.lock.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_auto_save_keeps_loaded_graph() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();

    process
        .set_property_value("clientType", json!(1))
        .await
        .unwrap();
    process.auto_save().await.unwrap();

    assert_eq!(backend.process_updates().len(), 1);
    assert_eq!(backend.calls.get_process.load(Ordering::SeqCst), 1);
    assert!(process.is_loaded());
    assert!(!process.artifact_state().dirty);
}

#[tokio::test]
async fn test_publish_posts_both_messages_in_order() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();

    process.remove_shape(43).await.unwrap();
    process.publish().await.unwrap();

    assert_eq!(backend.calls.update_process.load(Ordering::SeqCst), 1);
    assert_eq!(backend.calls.publish.load(Ordering::SeqCst), 1);
    assert_eq!(
        harness.messages.keys(),
        vec![
            MessageKey::PublishSuccess,
            MessageKey::ProcessRegenerateUserStories
        ]
    );
    assert_eq!(process.shapes().len(), 2);
}

#[tokio::test]
async fn test_edit_during_auto_save_is_kept() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();
    process
        .update_shape(41, |s| s.name = "first".into())
        .await
        .unwrap();

    backend.hold();
    let (saved, edited) = tokio::join!(process.auto_save(), async {
        while backend.calls.update_process.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        let edited = process
            .update_shape(42, |s| s.name = "second".into())
            .await;
        backend.release();
        edited
    });
    saved.unwrap();
    edited.unwrap();

    let updates = backend.process_updates();
    assert_eq!(updates[0].1["process"]["shapes"][1]["name"], json!("Shape 42"));
    assert!(process.artifact_state().dirty);
    assert!(process.sub_artifacts().get(42).unwrap().artifact_state().dirty);
    assert!(!process.sub_artifacts().get(41).unwrap().artifact_state().dirty);

    process.auto_save().await.unwrap();
    let updates = backend.process_updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].1["process"]["shapes"][1]["name"], json!("second"));
    assert!(!process.artifact_state().dirty);
}

#[tokio::test]
async fn test_shape_state_follows_process() {
    let backend = backend_with_process(40, 2);
    let harness = Harness::new(backend.clone());
    let process = open_process(&harness, 40, 2);
    process.get_observable().await.unwrap();
    let sub = process.sub_artifacts().get(41).unwrap();

    process
        .update_shape(41, |s| s.name = "Renamed".into())
        .await
        .unwrap();
    assert!(sub.artifact_state().dirty);
    process.auto_save().await.unwrap();
    assert!(!process.artifact_state().dirty);
    assert!(!sub.artifact_state().dirty);

    process.base().mark_deleted(None, None);
    let state = sub.artifact_state();
    assert!(state.deleted);
    assert!(state.is_read_only());
}
