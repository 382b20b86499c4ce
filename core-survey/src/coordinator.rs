//! # Request Coordinator
//!
//! Issues SDK calls on the UI-affine execution context.
//!
//! ## Overview
//!
//! The attach cycle re-sends the whole stored [`RequestConfig`] to the SDK.
//! It runs after every accepted `load` and every host resume, but only once
//! a `load` has been accepted at least once. Attaching is idempotent on the
//! SDK side, so a resume simply restores placement and modes.
//!
//! With `custom_mode` set, attach is immediately followed by `hide` so the
//! SDK never presents its own indicator.
//!
//! Every submission is fire-and-forget. SDK failures inside a task are
//! logged; the caller only learns whether the task was queued.
//!
//! [`RequestConfig`]: crate::session::RequestConfig

use crate::error::Result;
use crate::session::SessionHandle;
use bridge_traits::background::TaskExecutor;
use bridge_traits::sdk::{SdkCallbackSink, SurveySdk};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RequestCoordinator {
    session: SessionHandle,
    sdk: Arc<dyn SurveySdk>,
    ui: Arc<dyn TaskExecutor>,
    callbacks: Arc<dyn SdkCallbackSink>,
}

impl RequestCoordinator {
    pub fn new(
        session: SessionHandle,
        sdk: Arc<dyn SurveySdk>,
        ui: Arc<dyn TaskExecutor>,
        callbacks: Arc<dyn SdkCallbackSink>,
    ) -> Self {
        Self {
            session,
            sdk,
            ui,
            callbacks,
        }
    }

    /// Queues an attach with the current config snapshot.
    ///
    /// Returns `Ok(false)` without queuing anything until a `load` has been
    /// accepted.
    pub fn request(&self) -> Result<bool> {
        let (request, custom_mode) = {
            let session = self.session.lock();
            if !session.loaded_once {
                debug!("No load accepted yet; attach skipped");
                return Ok(false);
            }
            let config = session.config();
            (config.attach_request(), config.custom_mode)
        };

        let sdk = Arc::clone(&self.sdk);
        let callbacks = Arc::clone(&self.callbacks);

        self.ui.submit(Box::new(move || {
            info!(
                placement = %request.placement,
                padding = request.padding,
                release_mode = request.release_mode,
                offerwall_mode = request.offerwall_mode,
                reward_mode = request.reward_mode,
                custom_mode,
                "Attaching survey SDK"
            );
            if let Err(e) = sdk.attach(&request, callbacks) {
                warn!(error = %e, "SDK attach failed");
                return;
            }
            if custom_mode {
                if let Err(e) = sdk.hide() {
                    warn!(error = %e, "SDK hide after custom-mode attach failed");
                }
            }
        }))?;

        Ok(true)
    }

    /// Queues a present. Readiness is refreshed from the SDK first.
    pub fn show(&self) -> Result<()> {
        let sdk = Arc::clone(&self.sdk);
        let session = self.session.clone();

        self.ui.submit(Box::new(move || {
            let ready = sdk.is_present();
            session.lock().survey_ready = ready;

            if !ready {
                warn!("Survey not ready");
                return;
            }
            if let Err(e) = sdk.show() {
                warn!(error = %e, "SDK show failed");
            }
        }))?;

        Ok(())
    }

    /// Queues a hide when a survey is ready.
    pub fn hide(&self) -> Result<()> {
        let sdk = Arc::clone(&self.sdk);
        let session = self.session.clone();

        self.ui.submit(Box::new(move || {
            let ready = session.lock().survey_ready;

            if !ready {
                warn!("Survey not ready");
                return;
            }
            if let Err(e) = sdk.hide() {
                warn!(error = %e, "SDK hide failed");
            }
        }))?;

        Ok(())
    }

    /// SDK presence combined with the load state. The result is stored as
    /// the new readiness.
    pub fn is_loaded(&self) -> bool {
        // read-only query, callable off the UI context (see `SurveySdk::is_present`)
        let present = self.sdk.is_present();
        let mut session = self.session.lock();
        let loaded = present && session.loaded_once;
        session.survey_ready = loaded;
        loaded
    }
}
