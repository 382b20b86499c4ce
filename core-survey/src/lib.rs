//! # Survey Bridge Core
//!
//! Exposes a third-party survey SDK to a scripting host through six
//! commands and republishes the SDK's callbacks as one event stream.
//!
//! ## Overview
//!
//! - [`options`] - per-command option validation
//! - [`placement`] - alignment pair to SDK anchor
//! - [`session`] / [`registration`] - shared state and the init gate
//! - [`coordinator`] - SDK calls on the UI context, re-attach on resume
//! - [`dispatcher`] - ordered delivery to the host listener
//! - [`reconciler`] - SDK callbacks to flags and events
//! - [`bridge`] - the command surface
//! - [`commands`] - name/arity-checked entry point for scripting hosts
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//! use core_survey::{commands, OptionTable, OptionValue, SurveyBridge};
//!
//! let bridge = SurveyBridge::new(BridgeConfig::builder().sdk(sdk).build()?);
//! bridge.init(listener, &OptionTable::new().with("apiKey", "YOUR_KEY"))?;
//! commands::invoke(&bridge, "load", &[OptionTable::new().with("xAlign", "left").into()])?;
//! ```

pub mod bridge;
pub mod commands;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod options;
pub mod placement;
pub mod reconciler;
pub mod registration;
pub mod session;

pub use bridge::SurveyBridge;
pub use commands::{invoke, Command};
pub use error::{CommandError, Result};
pub use options::{OptionTable, OptionValue};
pub use session::{ListenerHandle, SessionSnapshot};
