//! The name-based entry point scripting hosts call.

mod common;

use bridge_traits::host::HostListener;
use bridge_traits::console::{LogEntry, LogLevel, LoggerSink};
use common::{Harness, RecordingListener};
use core_runtime::events::Phase;
use core_runtime::logging::LoggerSinkLayer;
use core_survey::{invoke, CommandError, ListenerHandle, OptionValue};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;

fn listener_arg(listener: &Arc<RecordingListener>) -> OptionValue {
    let listener: Arc<dyn HostListener> = listener.clone();
    OptionValue::Function(ListenerHandle::new(listener))
}

fn options(value: serde_json::Value) -> OptionValue {
    OptionValue::from(value)
}

#[tokio::test]
async fn init_through_registry() {
    let harness = Harness::new();

    let result = invoke(
        &harness.bridge,
        "init",
        &[
            listener_arg(&harness.listener),
            options(json!({ "apiKey": "K", "rewardMode": true })),
        ],
    )
    .unwrap();
    harness.settle().await;

    assert_eq!(result, None);
    assert_eq!(harness.listener.phases(), vec![Phase::Init]);
    assert!(harness.bridge.snapshot().config.reward_mode);
}

#[tokio::test]
async fn init_argument_checks_in_order() {
    let harness = Harness::new();

    let err = invoke(&harness.bridge, "init", &[listener_arg(&harness.listener)]).unwrap_err();
    assert_eq!(err.to_string(), "2 arguments expected. got 1");

    let err = invoke(
        &harness.bridge,
        "init",
        &["nope".into(), options(json!({ "apiKey": "K" }))],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "listener function expected, got: string");

    let err = invoke(
        &harness.bridge,
        "init",
        &[listener_arg(&harness.listener), OptionValue::Bool(true)],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "options table expected. Got boolean");

    let err = invoke(
        &harness.bridge,
        "init",
        &[listener_arg(&harness.listener), options(json!({}))],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "options.apiKey is required");

    assert!(harness.bridge.can_init());
}

#[tokio::test]
async fn double_init_checked_before_arity() {
    let harness = Harness::initialized().await;

    let err = invoke(&harness.bridge, "init", &[]).unwrap_err();
    assert!(matches!(err, CommandError::AlreadyInitialized));
}

#[tokio::test]
async fn operational_check_precedes_arity() {
    let harness = Harness::new();

    let err = invoke(
        &harness.bridge,
        "load",
        &[OptionValue::Nil, OptionValue::Nil],
    )
    .unwrap_err();
    assert!(matches!(err, CommandError::NotInitialized));
}

#[tokio::test]
async fn load_argument_checks() {
    let harness = Harness::initialized().await;

    let err = invoke(
        &harness.bridge,
        "load",
        &[options(json!({})), options(json!({}))],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "0 or 1 argument expected. got 2");

    let err = invoke(&harness.bridge, "load", &[OptionValue::Number(3.0)]).unwrap_err();
    assert_eq!(err.to_string(), "options table expected. Got number");

    let err = invoke(
        &harness.bridge,
        "load",
        &[options(json!({ "padding": "wide" }))],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "options.padding expected (number). Got string");

    harness.settle().await;
    assert!(harness.sdk.attaches().is_empty());

    invoke(&harness.bridge, "load", &[OptionValue::Nil]).unwrap();
    invoke(&harness.bridge, "load", &[]).unwrap();
    harness.settle().await;
    assert_eq!(harness.sdk.attaches().len(), 2);
}

#[tokio::test]
async fn is_loaded_returns_boolean() {
    let harness = Harness::initialized().await;

    let value = invoke(&harness.bridge, "isLoaded", &[]).unwrap();
    assert_eq!(value, Some(OptionValue::Bool(false)));
}

#[tokio::test]
async fn set_user_details_argument_checks() {
    let harness = Harness::initialized().await;

    let err = invoke(&harness.bridge, "setUserDetails", &[]).unwrap_err();
    assert_eq!(err.to_string(), "missing options table.");

    let err = invoke(&harness.bridge, "setUserDetails", &["male".into()]).unwrap_err();
    assert_eq!(err.to_string(), "options table expected. Got string");

    let err = invoke(
        &harness.bridge,
        "setUserDetails",
        &[options(json!({ "location": { "latitude": 1.5, "altitude": 3 } }))],
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Invalid option 'location.altitude'");

    invoke(
        &harness.bridge,
        "setUserDetails",
        &[options(json!({
            "gender": "female",
            "twitterId": "@someone",
            "age": 30,
            "location": { "latitude": 1.5, "longitude": 2.5 }
        }))],
    )
    .unwrap();
}

#[tokio::test]
async fn unknown_command_is_rejected() {
    let harness = Harness::initialized().await;

    let err = invoke(&harness.bridge, "destroy", &[]).unwrap_err();
    assert!(matches!(err, CommandError::UnknownCommand(name) if name == "destroy"));
}

#[tokio::test]
async fn rejections_reach_host_console_with_signature() {
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    #[async_trait::async_trait]
    impl LoggerSink for CapturingSink {
        async fn log(&self, entry: LogEntry) -> bridge_traits::error::Result<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Warn
        }
    }

    let sink = Arc::new(CapturingSink::default());
    let forwarded: Arc<dyn LoggerSink> = sink.clone();
    let subscriber = tracing_subscriber::registry().with(LoggerSinkLayer::new(Some(forwarded)));
    let _guard = tracing::subscriber::set_default(subscriber);

    let harness = Harness::new();
    let _ = invoke(&harness.bridge, "show", &[]);

    let sink_ref = sink.clone();
    assert!(
        harness
            .wait_until(|| !sink_ref.entries.lock().unwrap().is_empty())
            .await
    );
    let entries = sink.entries.lock().unwrap();
    assert_eq!(
        entries[0].console_line(),
        "ERROR: pollfish.show(), init() must be called before calling other API functions"
    );
}
