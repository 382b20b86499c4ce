//! # Registration State
//!
//! Gate for every command other than `init`. Registration is a two-step
//! handshake: `init` stores the listener synchronously, then the registration
//! task on the UI context confirms it. Commands in between are rejected as
//! not yet registered.

use crate::error::{CommandError, Result};
use crate::session::{ListenerHandle, Session};

impl Session {
    /// True while no listener is registered.
    pub fn can_init(&self) -> bool {
        self.listener.is_none()
    }

    /// Stores the listener handle. Registration is not confirmed yet.
    pub fn mark_initiated(&mut self, listener: ListenerHandle) {
        self.listener = Some(listener);
        self.registered = false;
    }

    /// Marks the registration round-trip complete.
    ///
    /// Ignored when the listener was released in the meantime.
    pub fn confirm_registration(&mut self) -> bool {
        if self.listener.is_some() {
            self.registered = true;
        }
        self.registered
    }

    pub fn is_operational(&self) -> bool {
        self.listener.is_some() && self.registered
    }

    /// Fails with the reason the session is not operational.
    pub fn ensure_operational(&self) -> Result<()> {
        if self.listener.is_none() {
            return Err(CommandError::NotInitialized);
        }
        if !self.registered {
            return Err(CommandError::NotRegistered);
        }
        Ok(())
    }
}
