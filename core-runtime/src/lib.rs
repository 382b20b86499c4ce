//! # Core Runtime Module
//!
//! Provides the ambient runtime infrastructure for the survey bridge:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Outbound event model and event bus
//!
//! ## Overview
//!
//! This crate holds everything the bridge needs that is not survey
//! orchestration proper: how events are shaped before they reach the host,
//! how logs reach the host console, and how collaborators are wired in.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
