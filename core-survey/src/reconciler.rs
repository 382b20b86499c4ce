//! # Callback Reconciler
//!
//! Consumes the SDK's six callbacks, keeps `survey_ready`/`survey_open` in
//! step with them and produces the matching outbound event.
//!
//! ```text
//! received ─────────────> ready=true   ─> loaded
//! completed ────────────> ready=false  ─> completed
//! not available ────────> ready=false  ─> failed(notAvailable)
//! not eligible ─────────> ready=false  ─> failed(notEligible)
//! opened ───────────────> open=true    ─> displayed
//! closed (open) ────────> open=false   ─> closed
//! closed (not open) ────> dropped
//! ```
//!
//! The SDK also fires `closed` when only its indicator hides. Those are the
//! closes that arrive while no survey panel is open, and they must not reach
//! the host.
//!
//! The flag update and the dispatch happen under one session lock, so a
//! concurrent callback can never observe the new flag before the event for it
//! was queued. Callbacks arriving while no listener is registered (before
//! `init` or after `shutdown`) are dropped without touching the flags.

use crate::dispatcher::EventDispatcher;
use crate::session::{Session, SessionHandle};
use bridge_traits::sdk::{SdkCallback, SdkCallbackSink, SurveyInfo};
use core_runtime::events::{FailureReason, OutboundEvent};
use std::sync::Arc;
use tracing::{debug, error};

pub struct CallbackReconciler {
    session: SessionHandle,
    dispatcher: Arc<EventDispatcher>,
}

impl CallbackReconciler {
    pub fn new(session: SessionHandle, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            session,
            dispatcher,
        }
    }

    /// Applies `callback` to the session flags and returns the event to
    /// publish, if any.
    pub fn transition(session: &mut Session, callback: SdkCallback) -> Option<OutboundEvent> {
        match callback {
            SdkCallback::SurveyReceived(info) => {
                session.survey_ready = true;
                let info = info.unwrap_or_default();
                encode(OutboundEvent::loaded(&info), &info)
            }
            SdkCallback::SurveyCompleted(info) => {
                session.survey_ready = false;
                encode(OutboundEvent::completed(&info), &info)
            }
            SdkCallback::SurveyNotAvailable => {
                session.survey_ready = false;
                Some(OutboundEvent::failed(FailureReason::NotAvailable))
            }
            SdkCallback::UserNotEligible => {
                session.survey_ready = false;
                Some(OutboundEvent::failed(FailureReason::NotEligible))
            }
            SdkCallback::Opened => {
                session.survey_open = true;
                Some(OutboundEvent::displayed())
            }
            SdkCallback::Closed if session.survey_open => {
                session.survey_open = false;
                Some(OutboundEvent::closed())
            }
            SdkCallback::Closed => {
                debug!("Indicator close without open survey; dropped");
                None
            }
        }
    }
}

fn encode(
    event: core_runtime::Result<OutboundEvent>,
    info: &SurveyInfo,
) -> Option<OutboundEvent> {
    match event {
        Ok(event) => Some(event),
        Err(e) => {
            error!(error = %e, survey_class = %info.survey_class, "Failed to encode survey metadata");
            None
        }
    }
}

impl SdkCallbackSink for CallbackReconciler {
    fn deliver(&self, callback: SdkCallback) {
        let name = callback.name();
        let mut session = self.session.lock();
        // flags belong to the listener's session; a torn-down session stays clean
        if session.listener().is_none() {
            debug!(callback = name, "No active session; SDK callback dropped");
            return;
        }
        match Self::transition(&mut session, callback) {
            Some(event) => {
                debug!(callback = name, phase = %event.phase, "SDK callback reconciled");
                self.dispatcher.dispatch(&session, event);
            }
            None => debug!(callback = name, "SDK callback produced no event"),
        }
    }
}
