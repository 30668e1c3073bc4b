//! Control router integration tests

mod helpers;

use helpers::{settle, MockSource, Rig};
use playout_common::AutoPoolOptions;
use playout_sched::{ContentSourceManager, ControlRouter, Error};
use serde_json::{json, Value};
use std::sync::Arc;

fn setup() -> (Rig, ContentSourceManager, ControlRouter) {
    let rig = Rig::new();
    let manager = ContentSourceManager::new(rig.player.clone(), AutoPoolOptions::default(), 64);
    let router = ControlRouter::new(rig.player.clone(), manager.clone());
    (rig, manager, router)
}

fn media(name: &str, duration_ms: u64) -> Value {
    json!({
        "type": "Image",
        "name": name,
        "location": format!("/media/{}.png", name),
        "durationMs": duration_ms,
    })
}

fn queue_names(state: &Value) -> Vec<String> {
    state["queue"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["media"]["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_queue_editing_through_router() {
    let (_rig, _manager, router) = setup();

    for name in ["a", "b", "c"] {
        let result = router
            .dispatch("player.enqueue", json!({ "media": media(name, 1000) }))
            .await
            .unwrap();
        assert!(result["blockId"].is_string());
    }
    router
        .dispatch("player.insert", json!({ "index": 1, "media": media("x", 500) }))
        .await
        .unwrap();
    router
        .dispatch("player.reorder", json!({ "from": 3, "to": 0 }))
        .await
        .unwrap();
    let removed = router
        .dispatch("player.remove", json!({ "index": 2 }))
        .await
        .unwrap();
    assert_eq!(removed["media"]["name"], "x");

    let state = router.dispatch("player.state", Value::Null).await.unwrap();
    assert_eq!(queue_names(&state), vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_skip_and_go_to_default() {
    let (rig, _manager, router) = setup();
    router
        .dispatch("player.enqueue", json!({ "media": media("a", 1000) }))
        .await
        .unwrap();

    let current = router.dispatch("player.skip", Value::Null).await.unwrap();
    assert_eq!(current["media"]["name"], "a");

    router
        .dispatch("player.go_to_default", json!({ "unloadDelayMs": 0 }))
        .await
        .unwrap();
    assert_eq!(
        rig.player.current_block().await.unwrap().media().name(),
        "standby"
    );
}

#[tokio::test]
async fn test_play_now_bypasses_queue() {
    let (rig, _manager, router) = setup();
    router
        .dispatch("player.enqueue", json!({ "media": media("queued", 1000) }))
        .await
        .unwrap();
    router
        .dispatch("player.play_now", json!({ "media": media("breaking", 30_000) }))
        .await
        .unwrap();

    assert_eq!(
        rig.player.current_block().await.unwrap().media().name(),
        "breaking"
    );
    assert_eq!(rig.player.queue_len().await, 1);

    router.dispatch("player.restart", Value::Null).await.unwrap();
    assert_eq!(rig.image.restarts(), 1);
}

#[tokio::test]
async fn test_queue_errors_propagate() {
    let (_rig, _manager, router) = setup();
    let err = router
        .dispatch("player.remove", json!({ "index": 0 }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Queue(_)));
}

#[tokio::test]
async fn test_missing_params_are_bad_request() {
    let (_rig, _manager, router) = setup();
    let err = router.dispatch("player.enqueue", Value::Null).await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn test_source_routes() {
    let (_rig, manager, router) = setup();
    let source = Arc::new(MockSource::new("promos"));
    let id = manager.add_source(source).unwrap();

    let sources = router.dispatch("sources.list", Value::Null).await.unwrap();
    assert_eq!(sources[0]["name"], "promos");
    assert_eq!(sources[0]["kind"], "Mock");
    assert_eq!(sources[0]["inPool"], true);

    let pool = router
        .dispatch("sources.set_in_pool", json!({ "id": id, "inPool": false }))
        .await
        .unwrap();
    assert_eq!(pool[0]["inPool"], false);

    router
        .dispatch("sources.refresh", json!({ "id": id }))
        .await
        .unwrap();
    router
        .dispatch("sources.remove", json!({ "id": id }))
        .await
        .unwrap();
    let err = router
        .dispatch("sources.remove", json!({ "id": id }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(_)));
}

#[tokio::test]
async fn test_autopool_routes() {
    let (rig, manager, router) = setup();
    let source = Arc::new(MockSource::new("promos"));
    manager.add_source(source.clone()).unwrap();

    let response = router
        .dispatch("autopool.set_target", json!({ "targetQueueSize": 2 }))
        .await
        .unwrap();
    assert_eq!(response["options"]["targetQueueSize"], 2);
    assert_eq!(source.polls(), 0);

    router
        .dispatch("autopool.set_pull_order", json!({ "pullOrder": "OneEach" }))
        .await
        .unwrap();
    router
        .dispatch("autopool.set_enabled", json!({ "enabled": true }))
        .await
        .unwrap();
    settle().await;

    assert_eq!(source.polls(), 2);
    assert_eq!(rig.player.queue_len().await, 2);

    let response = router.dispatch("autopool.get", Value::Null).await.unwrap();
    assert_eq!(response["options"]["enabled"], true);
    assert_eq!(response["options"]["pullOrder"], "OneEach");
    assert_eq!(response["refill"]["inProgress"], false);

    let response = router
        .dispatch(
            "autopool.set",
            json!({ "enabled": false, "targetQueueSize": 5, "pullOrder": "Random" }),
        )
        .await
        .unwrap();
    assert_eq!(response["options"]["enabled"], false);
    assert_eq!(manager.options().target_queue_size, 5);
}
