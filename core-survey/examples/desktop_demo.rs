//! # Survey Bridge Desktop Example
//!
//! Wires a [`SurveyBridge`] to the desktop executors and a scripted SDK, then
//! walks one survey through init, load, display and completion while a host
//! listener prints every event.
//!
//! Run with: `cargo run --example desktop_demo --package core-survey`

use anyhow::Result;
use bridge_desktop::{DesktopLifecycleObserver, SerialExecutor, StaticAppMetadata};
use bridge_traits::host::{HostEvent, HostListener};
use bridge_traits::sdk::{AttachRequest, SdkCallback, SdkCallbackSink, SurveyInfo, SurveySdk};
use bridge_traits::console::{ConsoleLogger, LogLevel};
use core_runtime::config::BridgeConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_survey::{invoke, OptionTable, SurveyBridge};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Scripted SDK
// ============================================================================

/// Pretends to be the survey SDK: prints calls and keeps the callback sink
/// so the demo can play the SDK's part.
#[derive(Default)]
struct ScriptedSdk {
    sink: Mutex<Option<Arc<dyn SdkCallbackSink>>>,
    present: AtomicBool,
}

impl ScriptedSdk {
    fn fire(&self, callback: SdkCallback) {
        let sink = self.sink.lock().ok().and_then(|sink| sink.clone());
        if let Some(sink) = sink {
            println!("sdk      -> {}", callback.name());
            if matches!(callback, SdkCallback::SurveyReceived(_)) {
                self.present.store(true, Ordering::SeqCst);
            }
            sink.deliver(callback);
        }
    }
}

impl SurveySdk for ScriptedSdk {
    fn attach(
        &self,
        request: &AttachRequest,
        callbacks: Arc<dyn SdkCallbackSink>,
    ) -> bridge_traits::error::Result<()> {
        println!(
            "sdk      <- attach placement={:?} padding={} release={}",
            request.placement, request.padding, request.release_mode
        );
        if let Ok(mut sink) = self.sink.lock() {
            *sink = Some(callbacks);
        }
        Ok(())
    }

    fn show(&self) -> bridge_traits::error::Result<()> {
        println!("sdk      <- show");
        Ok(())
    }

    fn hide(&self) -> bridge_traits::error::Result<()> {
        println!("sdk      <- hide");
        Ok(())
    }

    fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }
}

struct PrintingListener;

impl HostListener for PrintingListener {
    fn on_event(&self, event: &HostEvent) {
        match serde_json::to_string(event) {
            Ok(json) => println!("listener <- {}", json),
            Err(err) => println!("listener <- unprintable event: {}", err),
        }
    }
}

fn sample_survey() -> SurveyInfo {
    SurveyInfo {
        survey_cpa: 120,
        survey_ir: 45,
        survey_loi: 6,
        survey_class: "Pollfish/Basic".to_string(),
        reward_name: "Coins".to_string(),
        reward_value: "250".to_string(),
    }
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug)
            .with_stdout(false)
            .with_logger_sink(Arc::new(ConsoleLogger::default())),
    )?;

    let sdk = Arc::new(ScriptedSdk::default());
    let lifecycle = Arc::new(DesktopLifecycleObserver::new());
    let config = BridgeConfig::builder()
        .sdk(sdk.clone())
        .ui_executor(Arc::new(SerialExecutor::new("ui")?))
        .host_dispatcher(Arc::new(SerialExecutor::new("host")?))
        .lifecycle_observer(lifecycle.clone())
        .app_metadata(Arc::new(
            StaticAppMetadata::new().with("targetedAppStore", "google"),
        ))
        .build()?;
    let bridge = Arc::new(SurveyBridge::new(config));
    bridge.start_lifecycle_watch().await?;

    println!("== init");
    let listener: Arc<dyn HostListener> = Arc::new(PrintingListener);
    bridge.init(
        listener,
        &OptionTable::new()
            .with("apiKey", "demo-api-key-0000")
            .with("developerMode", true),
    )?;
    pause().await;

    println!("== rejected load");
    let rejected = invoke(
        &bridge,
        "load",
        &[OptionTable::new().with("yAlign", "middle").into()],
    );
    println!("load result: {:?}", rejected.err().map(|err| err.to_string()));

    println!("== load");
    bridge.set_user_details(&OptionTable::new().with("gender", "female"))?;
    bridge.load(Some(
        &OptionTable::new()
            .with("yAlign", "bottom")
            .with("xAlign", "right")
            .with("padding", 8),
    ))?;
    pause().await;

    sdk.fire(SdkCallback::SurveyReceived(Some(sample_survey())));
    pause().await;
    let loaded = invoke(&bridge, "isLoaded", &[])?;
    println!("isLoaded: {:?}", loaded.and_then(|value| value.as_bool()));

    println!("== show");
    invoke(&bridge, "show", &[])?;
    pause().await;
    sdk.fire(SdkCallback::Opened);
    sdk.fire(SdkCallback::SurveyCompleted(sample_survey()));
    sdk.fire(SdkCallback::Closed);
    pause().await;

    println!("== resume");
    lifecycle.set_state(bridge_traits::background::LifecycleState::Background);
    pause().await;
    lifecycle.set_state(bridge_traits::background::LifecycleState::Foreground);
    pause().await;

    bridge.shutdown();
    let after = invoke(&bridge, "show", &[]);
    println!(
        "after shutdown: {:?}",
        after.err().map(|err| err.to_string())
    );
    Ok(())
}
