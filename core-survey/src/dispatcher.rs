//! # Event Dispatcher
//!
//! Normalizes outbound events and hands them to the host's callback-delivery
//! context.
//!
//! Events are submitted in the order `dispatch` is called; the host executor
//! runs them FIFO, so the listener sees them in production order. Each
//! delivered event is mirrored onto the [`EventBus`] after the listener
//! returns.

use crate::session::Session;
use bridge_traits::background::TaskExecutor;
use core_runtime::events::{EventBus, OutboundEvent};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct EventDispatcher {
    host: Arc<dyn TaskExecutor>,
    bus: EventBus,
    event_name: String,
    provider: String,
}

impl EventDispatcher {
    pub fn new(
        host: Arc<dyn TaskExecutor>,
        bus: EventBus,
        event_name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            host,
            bus,
            event_name: event_name.into(),
            provider: provider.into(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Fills `isError` (false) and `provider` when the producer left them out.
    pub fn normalize(&self, mut event: OutboundEvent) -> OutboundEvent {
        event.is_error.get_or_insert(false);
        if event.provider.is_none() {
            event.provider = Some(self.provider.clone());
        }
        event
    }

    /// Queues `event` for the listener registered in `session`.
    ///
    /// Silent no-op without a listener. Never blocks and never reports
    /// delivery back to the caller.
    pub fn dispatch(&self, session: &Session, event: OutboundEvent) {
        let Some(listener) = session.listener().cloned() else {
            debug!(phase = %event.phase, "No listener registered; event dropped");
            return;
        };

        let phase = event.phase;
        let host_event = self.normalize(event).to_host_event(&self.event_name);
        let bus = self.bus.clone();

        let submitted = self.host.submit(Box::new(move || {
            listener.notify(&host_event);
            // no subscribers is fine
            let _ = bus.emit(host_event);
        }));

        match submitted {
            Ok(()) => debug!(%phase, executor = self.host.name(), "Event queued"),
            Err(e) => warn!(%phase, error = %e, "Failed to queue event for host"),
        }
    }
}
