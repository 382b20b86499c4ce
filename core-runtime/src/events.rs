//! # Outbound Event Model
//!
//! Typed representation of the notifications the bridge sends to the host,
//! plus a broadcast tap for in-process observers.
//!
//! ## Overview
//!
//! Every notification the host receives carries exactly one [`Phase`] and the
//! provider tag. Survey-originated events additionally carry `type = "survey"`;
//! loaded/completed events carry the survey metadata as a JSON string in
//! `data`; failures carry a reason code in `response` and `isError = true`.
//!
//! ```text
//! SDK callback ──> OutboundEvent ──> HostEvent (flat table) ──> dispatcher ──> listener
//!                                                                   │
//!                                                                   └──> EventBus (tap)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{OutboundEvent, Phase, EVENT_NAME};
//!
//! let event = OutboundEvent::displayed();
//! assert_eq!(event.phase, Phase::Displayed);
//!
//! let table = event.to_host_event(EVENT_NAME);
//! assert_eq!(table.get("phase").and_then(|v| v.as_str()), Some("displayed"));
//! ```
//!
//! ## Event Bus
//!
//! [`EventBus`] wraps `tokio::sync::broadcast`. The dispatcher mirrors each
//! delivered event onto it so diagnostics and tests can observe the exact
//! sequence the listener saw. A subscriber that falls behind receives
//! `RecvError::Lagged(n)` and keeps going; `RecvError::Closed` means the
//! bridge was torn down.

use bridge_traits::host::{EventValue, HostEvent};
use bridge_traits::sdk::SurveyInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::error::Result;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Host event name for every bridge notification.
pub const EVENT_NAME: &str = "adsRequest";

/// Provider tag stamped on every bridge notification.
pub const PROVIDER_NAME: &str = "pollfish";

/// Field names of the host event table.
pub mod keys {
    pub const PHASE: &str = "phase";
    pub const TYPE: &str = "type";
    pub const DATA: &str = "data";
    pub const RESPONSE: &str = "response";
    pub const IS_ERROR: &str = "isError";
    pub const PROVIDER: &str = "provider";
}

// ============================================================================
// Event Types
// ============================================================================

/// Lifecycle stage reported by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Loaded,
    Displayed,
    Closed,
    Completed,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Loaded => "loaded",
            Phase::Displayed => "displayed",
            Phase::Closed => "closed",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "init" => Some(Phase::Init),
            "loaded" => Some(Phase::Loaded),
            "displayed" => Some(Phase::Displayed),
            "closed" => Some(Phase::Closed),
            "completed" => Some(Phase::Completed),
            "failed" => Some(Phase::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reason codes reported in `response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    #[serde(rename = "notAvailable")]
    NotAvailable,
    #[serde(rename = "notEligible")]
    NotEligible,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NotAvailable => "notAvailable",
            FailureReason::NotEligible => "notEligible",
        }
    }
}

/// Only survey-originated events carry a type today.
pub const TYPE_SURVEY: &str = "survey";

/// Survey metadata as published in the `data` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
    pub playful_survey: bool,
    pub survey_price: i64,
    #[serde(rename = "surveyCPA")]
    pub survey_cpa: i64,
    #[serde(rename = "surveyIR")]
    pub survey_ir: i64,
    #[serde(rename = "surveyLOI")]
    pub survey_loi: i64,
    pub survey_class: String,
    pub reward_name: String,
    pub reward_value: String,
}

impl From<&SurveyInfo> for SurveyData {
    fn from(info: &SurveyInfo) -> Self {
        Self {
            playful_survey: info.survey_class.ends_with("Playful"),
            survey_price: info.survey_cpa,
            survey_cpa: info.survey_cpa,
            survey_ir: info.survey_ir,
            survey_loi: info.survey_loi,
            survey_class: info.survey_class.clone(),
            reward_name: info.reward_name.clone(),
            reward_value: info.reward_value.clone(),
        }
    }
}

impl SurveyData {
    /// Encodes the metadata as the JSON string carried in `data`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A notification produced by the bridge, before normalization.
///
/// `is_error` and `provider` are optional on purpose: producers set them only
/// when they mean it, and the dispatcher fills the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    pub phase: Phase,
    pub event_type: Option<String>,
    pub data: Option<String>,
    pub response: Option<FailureReason>,
    pub is_error: Option<bool>,
    pub provider: Option<String>,
}

impl OutboundEvent {
    fn bare(phase: Phase) -> Self {
        Self {
            phase,
            event_type: None,
            data: None,
            response: None,
            is_error: None,
            provider: None,
        }
    }

    fn survey(phase: Phase) -> Self {
        Self {
            event_type: Some(TYPE_SURVEY.to_string()),
            ..Self::bare(phase)
        }
    }

    /// Registration completed.
    pub fn init() -> Self {
        Self::bare(Phase::Init)
    }

    /// A survey became available.
    pub fn loaded(info: &SurveyInfo) -> Result<Self> {
        Ok(Self {
            data: Some(SurveyData::from(info).to_json()?),
            ..Self::survey(Phase::Loaded)
        })
    }

    /// The user completed a survey.
    pub fn completed(info: &SurveyInfo) -> Result<Self> {
        Ok(Self {
            data: Some(SurveyData::from(info).to_json()?),
            ..Self::survey(Phase::Completed)
        })
    }

    /// The survey panel opened.
    pub fn displayed() -> Self {
        Self::survey(Phase::Displayed)
    }

    /// The survey panel closed.
    pub fn closed() -> Self {
        Self::survey(Phase::Closed)
    }

    /// No survey can be shown.
    pub fn failed(reason: FailureReason) -> Self {
        Self {
            response: Some(reason),
            is_error: Some(true),
            ..Self::survey(Phase::Failed)
        }
    }

    /// Flattens the event into the table shape delivered to the host.
    ///
    /// Only fields the producer set are written.
    pub fn to_host_event(&self, name: &str) -> HostEvent {
        let mut event = HostEvent::new(name).with_field(keys::PHASE, self.phase.as_str());
        if let Some(event_type) = &self.event_type {
            event.insert(keys::TYPE, event_type.as_str());
        }
        if let Some(data) = &self.data {
            event.insert(keys::DATA, data.as_str());
        }
        if let Some(response) = self.response {
            event.insert(keys::RESPONSE, response.as_str());
        }
        if let Some(is_error) = self.is_error {
            event.insert(keys::IS_ERROR, is_error);
        }
        if let Some(provider) = &self.provider {
            event.insert(keys::PROVIDER, provider.as_str());
        }
        event
    }

    /// Reads a host table back into the typed form.
    ///
    /// Returns `None` when `phase` is missing or unknown.
    pub fn from_host_event(event: &HostEvent) -> Option<Self> {
        let phase = event
            .get(keys::PHASE)
            .and_then(EventValue::as_str)
            .and_then(Phase::from_name)?;
        let text = |key: &str| {
            event
                .get(key)
                .and_then(EventValue::as_str)
                .map(str::to_string)
        };
        let response = match event.get(keys::RESPONSE).and_then(EventValue::as_str) {
            Some("notAvailable") => Some(FailureReason::NotAvailable),
            Some("notEligible") => Some(FailureReason::NotEligible),
            _ => None,
        };

        Some(Self {
            phase,
            event_type: text(keys::TYPE),
            data: text(keys::DATA),
            response,
            is_error: event.get(keys::IS_ERROR).and_then(EventValue::as_bool),
            provider: text(keys::PROVIDER),
        })
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast tap of delivered host events.
///
/// # Example
///
/// ```rust
/// use bridge_traits::host::HostEvent;
/// use core_runtime::events::EventBus;
///
/// # #[tokio::main]
/// # async fn main() {
/// let bus = EventBus::new(16);
/// let mut subscriber = bus.subscribe();
///
/// bus.emit(HostEvent::new("adsRequest").with_field("phase", "init")).ok();
/// let received = subscriber.recv().await.unwrap();
/// assert_eq!(received.name, "adsRequest");
/// # }
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: HostEvent) -> std::result::Result<usize, SendError<HostEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<HostEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// A subscriber that only yields events of selected phases.
pub struct EventStream {
    receiver: Receiver<HostEvent>,
    phases: Option<Vec<Phase>>,
}

impl EventStream {
    pub fn new(receiver: Receiver<HostEvent>) -> Self {
        Self {
            receiver,
            phases: None,
        }
    }

    /// Restricts the stream to `phases`.
    pub fn only(mut self, phases: &[Phase]) -> Self {
        self.phases = Some(phases.to_vec());
        self
    }

    fn accepts(&self, event: &HostEvent) -> bool {
        let Some(phases) = &self.phases else {
            return true;
        };
        event
            .get(keys::PHASE)
            .and_then(EventValue::as_str)
            .and_then(Phase::from_name)
            .is_some_and(|phase| phases.contains(&phase))
    }

    /// Receives the next matching event.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if the bus was dropped.
    pub async fn recv(&mut self) -> std::result::Result<HostEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns the next matching event without waiting, if one is buffered.
    pub fn try_recv(&mut self) -> Option<std::result::Result<HostEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("phases", &self.phases)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
