//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (macOS, Windows, Linux) and for tests.
//!
//! ## Overview
//!
//! Desktop has no UI thread the survey SDK insists on, and no host runtime
//! that suspends. This crate stands in for both:
//! - `SerialExecutor` - a single-worker FIFO queue on the Tokio runtime,
//!   used for both the UI context and the host dispatcher
//! - `DesktopLifecycleObserver` - a lifecycle signal the embedding app
//!   drives explicitly
//! - `StaticAppMetadata` - an in-memory metadata table
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopLifecycleObserver, SerialExecutor};
//! use bridge_traits::LifecycleState;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ui = SerialExecutor::new("ui").unwrap();
//!     let lifecycle = DesktopLifecycleObserver::new();
//!
//!     // Use in BridgeConfig, then later:
//!     lifecycle.set_state(LifecycleState::Foreground);
//! }
//! ```

mod background;
mod metadata;

pub use background::{DesktopLifecycleObserver, SerialExecutor};
pub use metadata::StaticAppMetadata;
