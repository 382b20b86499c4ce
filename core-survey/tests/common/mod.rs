//! Shared fixtures: a recording SDK, a recording listener and a bridge wired
//! to desktop executors.

#![allow(dead_code)]

use bridge_desktop::{DesktopLifecycleObserver, SerialExecutor, StaticAppMetadata};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::host::{HostEvent, HostListener};
use bridge_traits::sdk::{AttachRequest, SdkCallback, SdkCallbackSink, SurveyInfo, SurveySdk};
use core_runtime::config::BridgeConfig;
use core_runtime::events::{OutboundEvent, Phase};
use core_survey::{OptionTable, SurveyBridge};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// SDK stand-in that records every call and lets tests fire callbacks.
#[derive(Default)]
pub struct RecordingSdk {
    calls: Mutex<Vec<&'static str>>,
    attaches: Mutex<Vec<AttachRequest>>,
    sink: Mutex<Option<Arc<dyn SdkCallbackSink>>>,
    present: AtomicBool,
}

impl RecordingSdk {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attaches(&self) -> Vec<AttachRequest> {
        self.attaches.lock().unwrap().clone()
    }

    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    /// Delivers `callback` the way the SDK would, from the test thread.
    pub fn fire(&self, callback: SdkCallback) {
        let sink = self.sink.lock().unwrap().clone();
        if let Some(sink) = sink {
            sink.deliver(callback);
        }
    }
}

impl SurveySdk for RecordingSdk {
    fn attach(&self, request: &AttachRequest, callbacks: Arc<dyn SdkCallbackSink>) -> BridgeResult<()> {
        self.calls.lock().unwrap().push("attach");
        self.attaches.lock().unwrap().push(request.clone());
        *self.sink.lock().unwrap() = Some(callbacks);
        Ok(())
    }

    fn show(&self) -> BridgeResult<()> {
        self.calls.lock().unwrap().push("show");
        Ok(())
    }

    fn hide(&self) -> BridgeResult<()> {
        self.calls.lock().unwrap().push("hide");
        Ok(())
    }

    fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }
}

/// Host listener that keeps every delivered event.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.events()
            .iter()
            .filter_map(OutboundEvent::from_host_event)
            .map(|event| event.phase)
            .collect()
    }
}

impl HostListener for RecordingListener {
    fn on_event(&self, event: &HostEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub struct Harness {
    pub bridge: Arc<SurveyBridge>,
    pub sdk: Arc<RecordingSdk>,
    pub listener: Arc<RecordingListener>,
    pub lifecycle: Arc<DesktopLifecycleObserver>,
    ui: SerialExecutor,
    host: SerialExecutor,
}

impl Harness {
    /// Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let sdk = Arc::new(RecordingSdk::default());
        let ui = SerialExecutor::new("ui").unwrap();
        let host = SerialExecutor::new("host").unwrap();
        let lifecycle = Arc::new(DesktopLifecycleObserver::new());

        let config = BridgeConfig::builder()
            .sdk(sdk.clone())
            .ui_executor(Arc::new(ui.clone()))
            .host_dispatcher(Arc::new(host.clone()))
            .lifecycle_observer(lifecycle.clone())
            .app_metadata(Arc::new(
                StaticAppMetadata::new().with("targetedAppStore", "google"),
            ))
            .build()
            .unwrap();

        Self {
            bridge: Arc::new(SurveyBridge::new(config)),
            sdk,
            listener: Arc::new(RecordingListener::default()),
            lifecycle,
            ui,
            host,
        }
    }

    /// A harness whose `init` round-trip already completed.
    pub async fn initialized() -> Self {
        let harness = Self::new();
        harness
            .bridge
            .init(harness.listener.clone(), &OptionTable::new().with("apiKey", "K"))
            .unwrap();
        harness.settle().await;
        harness
    }

    /// Drains both execution contexts, including tasks one queues on the other.
    pub async fn settle(&self) {
        for _ in 0..2 {
            self.ui.flush().await.unwrap();
            self.host.flush().await.unwrap();
        }
    }

    /// Polls `condition`, settling between attempts, for up to two seconds.
    pub async fn wait_until(&self, condition: impl Fn() -> bool) -> bool {
        for _ in 0..200 {
            self.settle().await;
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

pub fn survey_info(class: &str) -> SurveyInfo {
    SurveyInfo {
        survey_cpa: 95,
        survey_ir: 60,
        survey_loi: 8,
        survey_class: class.to_string(),
        reward_name: "Gems".to_string(),
        reward_value: "40".to_string(),
    }
}
