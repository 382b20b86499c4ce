//! # Host Bridge Traits
//!
//! Collaborator contracts that sit on either side of the survey bridge.
//!
//! ## Overview
//!
//! The bridge orchestrates a third-party survey SDK on behalf of a scripting
//! host. Neither side is implemented here: this crate only defines what the
//! core requires from them, so that each platform (Android, iOS, desktop test
//! harness) can ship its own adapters.
//!
//! ## Traits
//!
//! ### Survey SDK
//! - [`SurveySdk`](sdk::SurveySdk) - Attach/initialize, show, hide, presence check
//! - [`SdkCallbackSink`](sdk::SdkCallbackSink) - Receives the SDK's asynchronous callbacks
//!
//! ### Host Integration
//! - [`HostListener`](host::HostListener) - The single listener registered by `init`
//! - [`TaskExecutor`](background::TaskExecutor) - Designated execution contexts
//!   (UI-affine SDK context, host callback-delivery context)
//! - [`LifecycleObserver`](background::LifecycleObserver) - Host suspend/resume transitions
//! - [`AppMetadata`](device::AppMetadata) - Application/device metadata lookup
//!
//! ### Utilities
//! - [`LoggerSink`](console::LoggerSink) - Forward structured logs to the host logging channel
//!
//! ## Threading
//!
//! SDK callbacks fire on the SDK's own thread while commands arrive on the
//! host's script thread. Every trait here therefore requires `Send + Sync`,
//! and every call that must run on a particular context goes through a
//! [`TaskExecutor`](background::TaskExecutor) rather than being invoked inline.
//!
//! ## Error Handling
//!
//! Adapters convert platform failures into [`BridgeError`](error::BridgeError).
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::error::Result;
//! use bridge_traits::sdk::{AttachRequest, SdkCallbackSink, SurveySdk};
//! use std::sync::Arc;
//!
//! struct AndroidSdk { /* JNI handles */ }
//!
//! impl SurveySdk for AndroidSdk {
//!     fn attach(&self, request: &AttachRequest, callbacks: Arc<dyn SdkCallbackSink>) -> Result<()> {
//!         // Params.Builder(...).build() + Pollfish.initWith(...)
//!         todo!()
//!     }
//!     fn show(&self) -> Result<()> { todo!() }
//!     fn hide(&self) -> Result<()> { todo!() }
//!     fn is_present(&self) -> bool { todo!() }
//! }
//! ```

pub mod background;
pub mod console;
pub mod device;
pub mod error;
pub mod host;
pub mod sdk;

pub use error::BridgeError;

// Re-export commonly used types
pub use background::{LifecycleChangeStream, LifecycleObserver, LifecycleState, Task, TaskExecutor};
pub use device::AppMetadata;
pub use host::{EventValue, HostEvent, HostListener};
pub use sdk::{
    AttachRequest, Gender, Placement, SdkCallback, SdkCallbackSink, SurveyInfo, SurveySdk,
    UserAttributes,
};
pub use console::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
