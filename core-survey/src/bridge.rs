//! # Survey Bridge
//!
//! The command surface the host calls, plus the host lifecycle hooks.
//!
//! ## Overview
//!
//! `SurveyBridge` owns one [`Session`](crate::session::Session) and wires the
//! components together:
//!
//! ```text
//! host command ─> options ─> registration check ─> session update ─> coordinator ─> UI executor ─> SDK
//!                                                                                                  │
//! host listener <─ host executor <─ dispatcher <─ reconciler <──────── SDK callbacks ──────────────┘
//! ```
//!
//! Commands never block. Anything that depends on the SDK shows up later as
//! an event on the registered listener.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//! use core_survey::{OptionTable, SurveyBridge};
//!
//! let bridge = Arc::new(SurveyBridge::new(BridgeConfig::builder().sdk(sdk).build()?));
//! bridge.start_lifecycle_watch().await?;
//!
//! bridge.init(listener, &OptionTable::new().with("apiKey", "YOUR_KEY"))?;
//! // after the `init` event:
//! bridge.load(Some(&OptionTable::new().with("yAlign", "top")))?;
//! ```

use crate::commands::Command;
use crate::coordinator::RequestCoordinator;
use crate::dispatcher::EventDispatcher;
use crate::error::{CommandError, Result};
use crate::options::{InitOptions, LoadOptions, OptionTable, UserDetailsOptions};
use crate::placement;
use crate::reconciler::CallbackReconciler;
use crate::session::{ListenerHandle, RequestConfig, SessionHandle, SessionSnapshot};
use bridge_traits::background::{LifecycleState, Task};
use bridge_traits::host::HostListener;
use bridge_traits::sdk::{SdkCallbackSink, UserAttributes};
use core_runtime::config::BridgeConfig;
use core_runtime::events::{EventBus, EventStream, OutboundEvent};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub struct SurveyBridge {
    config: BridgeConfig,
    session: SessionHandle,
    dispatcher: Arc<EventDispatcher>,
    coordinator: RequestCoordinator,
    lifecycle_watch: Mutex<Option<CancellationToken>>,
}

impl SurveyBridge {
    /// Creates the bridge with an empty session.
    pub fn new(config: BridgeConfig) -> Self {
        let session = SessionHandle::new();
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::clone(&config.host_dispatcher),
            EventBus::new(config.event_buffer_size),
            config.identity.event_name.clone(),
            config.identity.provider.clone(),
        ));
        let reconciler: Arc<dyn SdkCallbackSink> = Arc::new(CallbackReconciler::new(
            session.clone(),
            Arc::clone(&dispatcher),
        ));
        let coordinator = RequestCoordinator::new(
            session.clone(),
            Arc::clone(&config.sdk),
            Arc::clone(&config.ui_executor),
            reconciler,
        );

        Self {
            config,
            session,
            dispatcher,
            coordinator,
            lifecycle_watch: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Stream of every event delivered to the listener, in delivery order.
    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.dispatcher.bus().subscribe())
    }

    pub fn can_init(&self) -> bool {
        self.session.lock().can_init()
    }

    pub fn ensure_operational(&self) -> Result<()> {
        self.session.lock().ensure_operational()
    }

    /// Runs `f`, logging a rejection with the command's signature.
    pub(crate) fn run<T>(&self, command: Command, f: impl FnOnce() -> Result<T>) -> Result<T> {
        f().map_err(|err| {
            let signature = command.signature(self.config.identity.library());
            error!(command = %signature, "{}", err);
            err
        })
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Registers `listener` and stores the request defaults.
    ///
    /// Registration completes asynchronously on the UI context, which
    /// dispatches `{phase: "init"}`. Until then other commands fail with
    /// [`CommandError::NotRegistered`].
    #[instrument(level = "debug", skip_all)]
    pub fn init(&self, listener: Arc<dyn HostListener>, options: &OptionTable) -> Result<()> {
        self.run(Command::Init, || {
            self.init_inner(ListenerHandle::new(listener), options)
        })
    }

    pub(crate) fn init_inner(&self, listener: ListenerHandle, options: &OptionTable) -> Result<()> {
        if !self.can_init() {
            return Err(CommandError::AlreadyInitialized);
        }
        let options = InitOptions::parse(options)?;
        let listener_id = listener.id();

        {
            let mut session = self.session.lock();
            // a concurrent init may have won since the first check
            if !session.can_init() {
                return Err(CommandError::AlreadyInitialized);
            }
            session.mark_initiated(listener);
            session.config = RequestConfig {
                api_key: options.api_key,
                request_id: options.request_uuid,
                developer_mode: options.developer_mode,
                reward_mode: options.reward_mode,
                ..RequestConfig::default()
            };
        }

        if let Err(e) = self
            .config
            .ui_executor
            .submit(self.registration_task(listener_id))
        {
            self.session.lock().reset();
            return Err(e.into());
        }

        debug!(%listener_id, "Registration queued");
        Ok(())
    }

    fn registration_task(&self, listener_id: Uuid) -> Task {
        let session = self.session.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let identity = self.config.identity.clone();
        let sdk_version = self.config.sdk_version().to_string();

        Box::new(move || {
            let mut session = session.lock();
            if session.listener().map(ListenerHandle::id) != Some(listener_id) {
                debug!("Session reset before registration completed");
                return;
            }
            info!(
                plugin = %identity.plugin_name,
                version = %identity.plugin_version,
                sdk = %sdk_version,
                "Survey plugin registered"
            );
            dispatcher.dispatch(&session, OutboundEvent::init());
            session.confirm_registration();
        })
    }

    /// Stores the presentation options and runs the attach cycle.
    ///
    /// Omitted options fall back to their defaults; every `load` restates
    /// the full presentation config.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&self, options: Option<&OptionTable>) -> Result<()> {
        self.run(Command::Load, || self.load_inner(options))
    }

    pub(crate) fn load_inner(&self, options: Option<&OptionTable>) -> Result<()> {
        self.ensure_operational()?;
        let options = match options {
            Some(table) => LoadOptions::parse(table)?,
            None => LoadOptions::default(),
        };
        let placement = placement::resolve(options.y_align, options.x_align);

        {
            let mut session = self.session.lock();
            session.ensure_operational()?;
            let config = &mut session.config;
            config.placement = placement;
            config.padding = options.padding;
            config.custom_mode = options.custom_mode;
            config.offerwall_mode = options.offerwall_mode;
            config.reward_mode = options.reward_mode;
            session.loaded_once = true;
        }

        debug!(%placement, "Load accepted");
        self.coordinator.request()?;
        Ok(())
    }

    /// Presents the survey if the SDK reports one ready.
    #[instrument(level = "debug", skip_all)]
    pub fn show(&self) -> Result<()> {
        self.run(Command::Show, || self.show_inner())
    }

    pub(crate) fn show_inner(&self) -> Result<()> {
        self.ensure_operational()?;
        self.coordinator.show()
    }

    /// Hides the survey if one is ready.
    #[instrument(level = "debug", skip_all)]
    pub fn hide(&self) -> Result<()> {
        self.run(Command::Hide, || self.hide_inner())
    }

    pub(crate) fn hide_inner(&self) -> Result<()> {
        self.ensure_operational()?;
        self.coordinator.hide()
    }

    /// Whether a survey can be shown right now.
    #[instrument(level = "debug", skip_all)]
    pub fn is_loaded(&self) -> Result<bool> {
        self.run(Command::IsLoaded, || self.is_loaded_inner())
    }

    pub(crate) fn is_loaded_inner(&self) -> Result<bool> {
        self.ensure_operational()?;
        Ok(self.coordinator.is_loaded())
    }

    /// Replaces the stored user attributes. They reach the SDK with the
    /// next attach.
    #[instrument(level = "debug", skip_all)]
    pub fn set_user_details(&self, options: &OptionTable) -> Result<()> {
        self.run(Command::SetUserDetails, || self.set_user_details_inner(options))
    }

    pub(crate) fn set_user_details_inner(&self, options: &OptionTable) -> Result<()> {
        self.ensure_operational()?;
        let details = UserDetailsOptions::parse(options)?;

        if details.facebook_id.is_some() || details.twitter_id.is_some() || details.location.is_some() {
            debug!("Identity and location details accepted but not forwarded");
        }

        let mut session = self.session.lock();
        if let Some(request_id) = details.request_uuid {
            session.config.request_id = Some(request_id);
        }
        session.config.user_attributes = Some(UserAttributes {
            gender: details.gender,
        });
        Ok(())
    }

    // ========================================================================
    // Host Lifecycle
    // ========================================================================

    /// Host returned to the foreground: re-issue the attach cycle.
    ///
    /// Returns whether an attach was queued.
    pub fn on_resumed(&self) -> Result<bool> {
        let queued = self.coordinator.request()?;
        debug!(queued, "Host resumed");
        Ok(queued)
    }

    /// Host left the foreground. Nothing to do beyond noting it.
    pub fn on_suspended(&self, state: LifecycleState) {
        debug!(?state, "Host suspended; session kept");
    }

    /// Follows the configured lifecycle observer until the bridge is dropped.
    ///
    /// The watcher outlives [`shutdown`]: a session started by a later `init`
    /// is re-attached on resume like the first one. Returns `Ok(false)` when
    /// no observer is configured. Calling it again replaces the previous
    /// watcher.
    ///
    /// [`shutdown`]: SurveyBridge::shutdown
    pub async fn start_lifecycle_watch(self: &Arc<Self>) -> Result<bool> {
        let Some(observer) = self.config.lifecycle_observer.clone() else {
            debug!("No lifecycle observer configured");
            return Ok(false);
        };

        let mut changes = observer.subscribe_changes().await?;
        let token = CancellationToken::new();
        if let Some(previous) = self.watch_slot().replace(token.clone()) {
            previous.cancel();
        }

        let bridge: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    change = changes.next() => {
                        let Some(state) = change else { break };
                        let Some(bridge) = bridge.upgrade() else { break };
                        match state {
                            LifecycleState::Foreground => {
                                if let Err(e) = bridge.on_resumed() {
                                    warn!(error = %e, "Re-attach on resume failed");
                                }
                            }
                            other => bridge.on_suspended(other),
                        }
                    }
                }
            }
            debug!("Lifecycle watcher stopped");
        });

        Ok(true)
    }

    /// Tears the session down: releases the listener and clears all state.
    /// A later `init` starts over; the lifecycle watcher keeps running.
    pub fn shutdown(&self) {
        self.session.lock().reset();
        info!("Survey bridge shut down");
    }

    fn watch_slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.lifecycle_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SurveyBridge {
    fn drop(&mut self) {
        if let Some(token) = self.watch_slot().take() {
            token.cancel();
        }
    }
}
