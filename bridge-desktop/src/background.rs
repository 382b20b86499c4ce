//! Execution Context and Lifecycle Implementation

use async_trait::async_trait;
use bridge_traits::{
    background::{LifecycleChangeStream, LifecycleObserver, LifecycleState, Task, TaskExecutor},
    error::{BridgeError, Result},
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

/// Single-worker FIFO executor for desktop.
///
/// Tasks run one at a time, in submission order, on a Tokio task spawned
/// when the executor is created. A panicking task is logged and the queue
/// keeps going.
#[derive(Debug, Clone)]
pub struct SerialExecutor {
    name: String,
    sender: mpsc::UnboundedSender<Task>,
}

impl SerialExecutor {
    /// Spawns the worker on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// `BridgeError::NotAvailable` when called outside a Tokio runtime.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| {
            BridgeError::NotAvailable(format!("SerialExecutor needs a Tokio runtime: {}", e))
        })?;
        Ok(Self::with_handle(name, &handle))
    }

    /// Spawns the worker on `handle`.
    pub fn with_handle(name: impl Into<String>, handle: &Handle) -> Self {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        let worker_name = name.clone();

        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                if catch_unwind(AssertUnwindSafe(task)).is_err() {
                    warn!(executor = %worker_name, "Task panicked; continuing with next task");
                }
            }
            debug!(executor = %worker_name, "Executor queue closed");
        });

        Self { name, sender }
    }

    /// Resolves once every task submitted before this call has run.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.submit(Box::new(move || {
            let _ = tx.send(());
        }))?;
        rx.await
            .map_err(|_| BridgeError::ContextClosed(format!("{} worker stopped", self.name)))
    }
}

impl TaskExecutor for SerialExecutor {
    fn submit(&self, task: Task) -> Result<()> {
        self.sender
            .send(task)
            .map_err(|_| BridgeError::ContextClosed(format!("{} queue is closed", self.name)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Desktop lifecycle observer.
///
/// Desktop hosts have no OS-driven suspend, so the embedding application
/// reports transitions through [`DesktopLifecycleObserver::set_state`].
#[derive(Debug)]
pub struct DesktopLifecycleObserver {
    state: watch::Sender<LifecycleState>,
}

impl DesktopLifecycleObserver {
    /// Create an observer that starts in the foreground.
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Foreground);
        Self { state }
    }

    /// Publishes a transition to every subscriber.
    pub fn set_state(&self, state: LifecycleState) {
        self.state.send_replace(state);
    }
}

impl Default for DesktopLifecycleObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecycleObserver for DesktopLifecycleObserver {
    async fn get_state(&self) -> Result<LifecycleState> {
        Ok(*self.state.borrow())
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        Ok(Box::new(DesktopLifecycleChangeStream {
            receiver: self.state.subscribe(),
        }))
    }
}

/// Yields each published state after subscription.
struct DesktopLifecycleChangeStream {
    receiver: watch::Receiver<LifecycleState>,
}

#[async_trait]
impl LifecycleChangeStream for DesktopLifecycleChangeStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        self.receiver.changed().await.ok()?;
        let state = *self.receiver.borrow_and_update();
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_tasks_in_order() {
        let executor = SerialExecutor::new("ui").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = Arc::clone(&seen);
            executor
                .submit(Box::new(move || seen.lock().unwrap().push(i)))
                .unwrap();
        }
        executor.flush().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_stop_queue() {
        let executor = SerialExecutor::new("host").unwrap();
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);

        executor.submit(Box::new(|| panic!("boom"))).unwrap();
        executor
            .submit(Box::new(move || *flag.lock().unwrap() = true))
            .unwrap();
        executor.flush().await.unwrap();

        assert!(*ran.lock().unwrap());
    }

    #[test]
    fn test_requires_runtime() {
        assert!(matches!(
            SerialExecutor::new("ui"),
            Err(BridgeError::NotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_executor_name() {
        let executor = SerialExecutor::new("ui").unwrap();
        assert_eq!(executor.name(), "ui");
    }

    #[tokio::test]
    async fn test_lifecycle_observer_starts_foreground() {
        let observer = DesktopLifecycleObserver::new();
        assert_eq!(
            observer.get_state().await.unwrap(),
            LifecycleState::Foreground
        );
    }

    #[tokio::test]
    async fn test_lifecycle_stream_reports_transitions() {
        let observer = DesktopLifecycleObserver::new();
        let mut stream = observer.subscribe_changes().await.unwrap();

        observer.set_state(LifecycleState::Suspended);
        let next = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .unwrap();
        assert_eq!(next, Some(LifecycleState::Suspended));
        assert_eq!(
            observer.get_state().await.unwrap(),
            LifecycleState::Suspended
        );
    }

    #[tokio::test]
    async fn test_lifecycle_stream_ends_when_observer_dropped() {
        let observer = DesktopLifecycleObserver::new();
        let mut stream = observer.subscribe_changes().await.unwrap();
        drop(observer);
        assert_eq!(stream.next().await, None);
    }
}
