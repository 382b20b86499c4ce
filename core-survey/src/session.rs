//! # Session State
//!
//! One [`Session`] exists per bridge instance. It is shared between the
//! command surface (host script calls) and the SDK callback sink, so every
//! access goes through [`SessionHandle`], which serializes it behind a mutex.
//!
//! Flags:
//! - `registered` - the `init` round-trip completed
//! - `loaded_once` - at least one `load` was accepted
//! - `survey_open` - the full survey panel is on screen
//! - `survey_ready` - the SDK has content to present

use bridge_traits::host::{HostEvent, HostListener};
use bridge_traits::sdk::{AttachRequest, Placement, UserAttributes};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// The host callback registered by `init`.
///
/// Two handles are equal only when they came from the same registration.
#[derive(Clone)]
pub struct ListenerHandle {
    id: Uuid,
    listener: Arc<dyn HostListener>,
}

impl ListenerHandle {
    pub fn new(listener: Arc<dyn HostListener>) -> Self {
        Self {
            id: Uuid::new_v4(),
            listener,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn listener(&self) -> Arc<dyn HostListener> {
        Arc::clone(&self.listener)
    }

    /// Invokes the host callback.
    pub fn notify(&self, event: &HostEvent) {
        self.listener.on_event(event);
    }
}

impl PartialEq for ListenerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id)
            .finish()
    }
}

/// Configuration sent to the SDK with every attach call.
///
/// Built up by `init`, `load` and `setUserDetails`; only cleared on teardown.
#[derive(Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub api_key: String,
    pub request_id: Option<String>,
    pub placement: Placement,
    pub padding: i32,
    pub developer_mode: bool,
    pub custom_mode: bool,
    pub offerwall_mode: bool,
    pub reward_mode: bool,
    pub user_attributes: Option<UserAttributes>,
}

impl RequestConfig {
    /// Snapshot handed to the SDK. Release mode is the inverse of developer mode.
    pub fn attach_request(&self) -> AttachRequest {
        AttachRequest {
            api_key: self.api_key.clone(),
            request_uuid: self.request_id.clone(),
            placement: self.placement,
            padding: self.padding,
            release_mode: !self.developer_mode,
            offerwall_mode: self.offerwall_mode,
            reward_mode: self.reward_mode,
            user_attributes: self.user_attributes.clone(),
        }
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field(
                "api_key",
                &core_runtime::logging::mask_api_key(&self.api_key),
            )
            .field("request_id", &self.request_id)
            .field("placement", &self.placement)
            .field("padding", &self.padding)
            .field("developer_mode", &self.developer_mode)
            .field("custom_mode", &self.custom_mode)
            .field("offerwall_mode", &self.offerwall_mode)
            .field("reward_mode", &self.reward_mode)
            .field("user_attributes", &self.user_attributes)
            .finish()
    }
}

/// Mutable bridge state.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) listener: Option<ListenerHandle>,
    pub(crate) registered: bool,
    pub(crate) loaded_once: bool,
    pub(crate) survey_open: bool,
    pub(crate) survey_ready: bool,
    pub(crate) config: RequestConfig,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> Option<&ListenerHandle> {
        self.listener.as_ref()
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Releases the listener and clears every flag and stored option.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            has_listener: self.listener.is_some(),
            registered: self.registered,
            loaded_once: self.loaded_once,
            survey_open: self.survey_open,
            survey_ready: self.survey_ready,
            config: self.config.clone(),
        }
    }
}

/// Point-in-time copy of the session, without the listener itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub has_listener: bool,
    pub registered: bool,
    pub loaded_once: bool,
    pub survey_open: bool,
    pub survey_ready: bool,
    pub config: RequestConfig,
}

/// Shared, lock-protected session.
///
/// The guard may be held across a [`TaskExecutor::submit`]: submit only
/// queues, so listener code never runs under the lock. This is what keeps a
/// flag update and its dispatch atomic. Never hold it across a direct SDK
/// call, which may re-enter the bridge on the same thread.
///
/// [`TaskExecutor::submit`]: bridge_traits::background::TaskExecutor::submit
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session. A poisoned lock is recovered; session fields are
    /// plain values and stay consistent across a panicking listener.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }
}
