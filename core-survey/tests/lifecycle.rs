//! Host suspend/resume handling.

mod common;

use bridge_traits::background::LifecycleState;
use bridge_traits::sdk::Placement;
use common::{Harness, RecordingListener};
use core_runtime::events::Phase;
use core_survey::OptionTable;
use std::sync::Arc;

#[tokio::test]
async fn resume_reattaches_with_stored_config() {
    let harness = Harness::initialized().await;
    assert!(harness.bridge.start_lifecycle_watch().await.unwrap());

    harness
        .bridge
        .load(Some(
            &OptionTable::new()
                .with("yAlign", "center")
                .with("xAlign", "left")
                .with("padding", 4),
        ))
        .unwrap();
    harness.settle().await;
    assert_eq!(harness.sdk.attaches().len(), 1);

    harness.lifecycle.set_state(LifecycleState::Suspended);
    harness.settle().await;
    harness.lifecycle.set_state(LifecycleState::Foreground);

    let sdk = harness.sdk.clone();
    assert!(harness.wait_until(|| sdk.attaches().len() == 2).await);

    let attaches = harness.sdk.attaches();
    assert_eq!(attaches[1], attaches[0]);
    assert_eq!(attaches[1].placement, Placement::MiddleLeft);
    assert_eq!(attaches[1].padding, 4);
}

#[tokio::test]
async fn resume_before_any_load_is_ignored() {
    let harness = Harness::initialized().await;
    harness.bridge.start_lifecycle_watch().await.unwrap();

    harness.lifecycle.set_state(LifecycleState::Background);
    harness.settle().await;
    harness.lifecycle.set_state(LifecycleState::Foreground);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    harness.settle().await;

    assert!(harness.sdk.attaches().is_empty());
}

#[tokio::test]
async fn custom_mode_survives_resume() {
    let harness = Harness::initialized().await;
    harness.bridge.start_lifecycle_watch().await.unwrap();

    harness
        .bridge
        .load(Some(&OptionTable::new().with("customMode", true)))
        .unwrap();
    harness.settle().await;

    harness.lifecycle.set_state(LifecycleState::Suspended);
    harness.settle().await;
    harness.lifecycle.set_state(LifecycleState::Foreground);

    let sdk = harness.sdk.clone();
    assert!(harness.wait_until(|| sdk.calls().len() == 4).await);
    assert_eq!(harness.sdk.calls(), vec!["attach", "hide", "attach", "hide"]);
}

#[tokio::test]
async fn resume_after_shutdown_is_ignored() {
    let harness = Harness::initialized().await;
    harness.bridge.start_lifecycle_watch().await.unwrap();
    harness.bridge.load(None).unwrap();
    harness.settle().await;

    harness.bridge.shutdown();
    harness.lifecycle.set_state(LifecycleState::Suspended);
    harness.lifecycle.set_state(LifecycleState::Foreground);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    harness.settle().await;

    assert_eq!(harness.sdk.attaches().len(), 1);
}

#[tokio::test]
async fn resume_reattaches_session_started_after_shutdown() {
    let harness = Harness::initialized().await;
    harness.bridge.start_lifecycle_watch().await.unwrap();

    harness.bridge.shutdown();
    let fresh = Arc::new(RecordingListener::default());
    harness
        .bridge
        .init(fresh.clone(), &OptionTable::new().with("apiKey", "K2"))
        .unwrap();
    harness.settle().await;
    harness.bridge.load(None).unwrap();
    harness.settle().await;
    assert_eq!(harness.sdk.attaches().len(), 1);

    harness.lifecycle.set_state(LifecycleState::Suspended);
    harness.settle().await;
    harness.lifecycle.set_state(LifecycleState::Foreground);

    let sdk = harness.sdk.clone();
    assert!(harness.wait_until(|| sdk.attaches().len() == 2).await);
    assert_eq!(harness.sdk.attaches()[1].api_key, "K2");
    assert_eq!(fresh.phases(), vec![Phase::Init]);
}

#[tokio::test]
async fn explicit_resume_hook() {
    let harness = Harness::initialized().await;

    assert!(!harness.bridge.on_resumed().unwrap());

    harness.bridge.load(None).unwrap();
    assert!(harness.bridge.on_resumed().unwrap());
    harness.settle().await;

    assert_eq!(harness.sdk.attaches().len(), 2);
}
