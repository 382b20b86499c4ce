//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map onto the individual workspace
//! crates. Host integrations can depend on `survey-bridge-workspace`, enable
//! `desktop-shims` (in-process executors and lifecycle observer) or
//! `headless` (bring your own adapters), and reach the members through the
//! re-exports below.

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
#[cfg(any(feature = "desktop-shims", feature = "headless"))]
pub use core_runtime;
#[cfg(any(feature = "desktop-shims", feature = "headless"))]
pub use core_survey;
