//! Execution Contexts and Host Lifecycle
//!
//! Provides the task-queue abstraction the bridge uses to reach the SDK's
//! UI-affine context and the host's callback-delivery context, plus the
//! host's foreground/background signal.

use crate::error::Result;

/// Unit of work submitted to an execution context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Execution context trait
///
/// Abstracts a platform context that must run certain work:
/// - **Android**: `Activity::runOnUiThread` for SDK calls,
///   `CoronaRuntimeTaskDispatcher` for listener delivery
/// - **iOS**: main dispatch queue
/// - **Desktop**: a dedicated single-worker queue
///
/// # Ordering
///
/// Implementations must run tasks in submission order and never run two
/// tasks concurrently. The bridge relies on this to keep event delivery in
/// the order events were produced.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::background::TaskExecutor;
///
/// fn hide_on_ui(ui: &dyn TaskExecutor, sdk: Arc<dyn SurveySdk>) -> Result<()> {
///     ui.submit(Box::new(move || {
///         let _ = sdk.hide();
///     }))
/// }
/// ```
pub trait TaskExecutor: Send + Sync {
    /// Enqueue `task`. Returns immediately; the task runs later, never
    /// inline on the caller's stack.
    ///
    /// Fails only when the context has shut down.
    fn submit(&self, task: Task) -> Result<()>;

    /// Human-readable context name used in logs
    fn name(&self) -> &str {
        "executor"
    }
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Host runtime is in the foreground and active
    Foreground,
    /// Host runtime is in the background
    Background,
    /// Host runtime is suspended (rendering, timers and audio paused)
    Suspended,
}

/// Lifecycle observer trait
///
/// Notifies the bridge about host runtime transitions. A return to
/// [`LifecycleState::Foreground`] makes the bridge re-attach the SDK with
/// the stored configuration, so placement and modes survive suspend/resume.
///
/// # Platform Support
///
/// - **Android**: `CoronaRuntimeListener::onResumed` / `onSuspended`
/// - **iOS**: UIApplication notifications
/// - **Desktop**: explicit host signal
#[async_trait::async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// Get current lifecycle state
    async fn get_state(&self) -> Result<LifecycleState>;

    /// Subscribe to lifecycle state changes
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle state changes
#[async_trait::async_trait]
pub trait LifecycleChangeStream: Send {
    /// Get the next lifecycle state update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleState>;
}
