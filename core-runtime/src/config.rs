//! # Bridge Configuration Module
//!
//! Wires host-provided collaborators into the survey bridge.
//!
//! ## Overview
//!
//! The builder constructs a [`BridgeConfig`] holding every collaborator the
//! bridge talks to. It fails fast when a required capability is missing so a
//! misconfigured host learns about it at start-up rather than on the first
//! survey callback.
//!
//! ## Required Dependencies
//!
//! - `SurveySdk` - the third-party SDK adapter
//! - `TaskExecutor` (UI) - the SDK's UI-affine execution context
//! - `TaskExecutor` (host) - the host's callback-delivery context
//!
//! When the `desktop-shims` feature is enabled, both executors default to a
//! `bridge_desktop::SerialExecutor` if not provided.
//!
//! ## Optional Dependencies
//!
//! - `AppMetadata` - selects the SDK build string logged at registration
//! - `LifecycleObserver` - host resume signal driving re-attach
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .sdk(Arc::new(AndroidSurveySdk::new(activity)))
//!     .ui_executor(Arc::new(UiThreadExecutor::new(activity)))
//!     .host_dispatcher(Arc::new(RuntimeTaskDispatcher::new(runtime)))
//!     .app_metadata(Arc::new(ManifestMetadata::new(context)))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::{DEFAULT_EVENT_BUFFER_SIZE, EVENT_NAME, PROVIDER_NAME};
use bridge_traits::{AppMetadata, LifecycleObserver, SurveySdk, TaskExecutor};
use std::fmt;
use std::sync::Arc;

/// Metadata key naming the store the host app was built for.
pub const TARGET_STORE_METADATA_KEY: &str = "targetedAppStore";

/// Names and version strings the bridge reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginIdentity {
    /// Library name as the host script requires it
    pub plugin_name: String,
    /// Plugin version
    pub plugin_version: String,
    /// Provider tag stamped on every event
    pub provider: String,
    /// Host event name for every notification
    pub event_name: String,
    /// SDK build string for Google Play builds
    pub google_sdk_version: String,
    /// SDK build string for every other store
    pub universal_sdk_version: String,
}

impl Default for PluginIdentity {
    fn default() -> Self {
        Self {
            plugin_name: "plugin.pollfish".to_string(),
            plugin_version: "1.2.0".to_string(),
            provider: PROVIDER_NAME.to_string(),
            event_name: EVENT_NAME.to_string(),
            google_sdk_version: "6.4.0 for Google Play".to_string(),
            universal_sdk_version: "6.4.0 Universal".to_string(),
        }
    }
}

impl PluginIdentity {
    /// Short library name used in command signatures (`pollfish.init(...)`).
    pub fn library(&self) -> &str {
        self.plugin_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.plugin_name)
    }

    /// Picks the SDK build string for the store the app targets.
    ///
    /// `google*` stores get the Google Play build, anything else (including
    /// no metadata at all) the universal build.
    pub fn sdk_version_for(&self, target_store: Option<&str>) -> &str {
        match target_store {
            Some(store) if store.starts_with("google") => &self.google_sdk_version,
            _ => &self.universal_sdk_version,
        }
    }

    /// Validates the identity
    pub fn validate(&self) -> Result<()> {
        if self.plugin_name.trim().is_empty() {
            return Err(Error::Config("Plugin name cannot be empty".to_string()));
        }
        if self.provider.trim().is_empty() {
            return Err(Error::Config("Provider tag cannot be empty".to_string()));
        }
        if self.event_name.trim().is_empty() {
            return Err(Error::Config("Event name cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Bridge configuration.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Survey SDK adapter (required)
    pub sdk: Arc<dyn SurveySdk>,

    /// UI-affine context every SDK call runs on (required)
    pub ui_executor: Arc<dyn TaskExecutor>,

    /// Context the host listener is invoked on (required)
    pub host_dispatcher: Arc<dyn TaskExecutor>,

    /// Application metadata lookup (optional)
    pub app_metadata: Option<Arc<dyn AppMetadata>>,

    /// Host lifecycle signal (optional)
    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,

    /// Names and versions reported by the bridge
    pub identity: PluginIdentity,

    /// Capacity of the delivered-event broadcast tap
    pub event_buffer_size: usize,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("sdk", &"SurveySdk { ... }")
            .field("ui_executor", &self.ui_executor.name())
            .field("host_dispatcher", &self.host_dispatcher.name())
            .field(
                "app_metadata",
                &self.app_metadata.as_ref().map(|_| "AppMetadata { ... }"),
            )
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .field("identity", &self.identity)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl BridgeConfig {
    /// Creates a new builder for constructing a `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Identity strings are non-empty
    /// - Event buffer size is within (0, 4096]
    pub fn validate(&self) -> Result<()> {
        self.identity.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > 4096 {
            return Err(Error::Config(
                "Event buffer size exceeds maximum of 4096".to_string(),
            ));
        }

        Ok(())
    }

    /// SDK build string for this app, from `targetedAppStore` metadata.
    pub fn sdk_version(&self) -> &str {
        let store = self
            .app_metadata
            .as_ref()
            .and_then(|metadata| metadata.get(TARGET_STORE_METADATA_KEY));
        self.identity.sdk_version_for(store.as_deref())
    }
}

fn sdk_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SurveySdk".to_string(),
        message: "A SurveySdk adapter is required. \
                  Android: wrap the SDK's initWith/show/hide/isPresent calls. \
                  iOS: wrap the SDK's Objective-C entry points."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn executor_missing_error(role: &str) -> Error {
    Error::CapabilityMissing {
        capability: format!("TaskExecutor ({})", role),
        message: format!(
            "A {} executor is required. \
             Desktop: enable the 'desktop-shims' feature to use SerialExecutor. \
             Mobile: inject the platform's {} context.",
            role, role
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_executor(role: &str) -> Result<Arc<dyn TaskExecutor>> {
    use bridge_desktop::SerialExecutor;

    let executor = SerialExecutor::new(role).map_err(|e| Error::CapabilityMissing {
        capability: format!("TaskExecutor ({})", role),
        message: format!("Default SerialExecutor unavailable: {}", e),
    })?;
    let executor: Arc<dyn TaskExecutor> = Arc::new(executor);
    Ok(executor)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_executor(role: &str) -> Result<Arc<dyn TaskExecutor>> {
    Err(executor_missing_error(role))
}

/// Builder for constructing [`BridgeConfig`] instances.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    sdk: Option<Arc<dyn SurveySdk>>,
    ui_executor: Option<Arc<dyn TaskExecutor>>,
    host_dispatcher: Option<Arc<dyn TaskExecutor>>,
    app_metadata: Option<Arc<dyn AppMetadata>>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
    identity: Option<PluginIdentity>,
    event_buffer_size: Option<usize>,
}

impl BridgeConfigBuilder {
    /// Sets the survey SDK adapter.
    pub fn sdk(mut self, sdk: Arc<dyn SurveySdk>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    /// Sets the UI-affine executor SDK calls are marshaled onto.
    pub fn ui_executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.ui_executor = Some(executor);
        self
    }

    /// Sets the executor the host listener is invoked on.
    pub fn host_dispatcher(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.host_dispatcher = Some(executor);
        self
    }

    /// Sets the application metadata lookup.
    pub fn app_metadata(mut self, metadata: Arc<dyn AppMetadata>) -> Self {
        self.app_metadata = Some(metadata);
        self
    }

    /// Sets the host lifecycle observer.
    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Overrides the plugin identity.
    pub fn identity(mut self, identity: PluginIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the delivered-event tap capacity.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - `Error::CapabilityMissing` when the SDK adapter or an executor is
    ///   missing and no default is available
    /// - `Error::Config` when validation fails
    pub fn build(self) -> Result<BridgeConfig> {
        let sdk = self.sdk.ok_or_else(sdk_missing_error)?;

        let ui_executor = match self.ui_executor {
            Some(executor) => executor,
            None => provide_default_executor("ui")?,
        };

        let host_dispatcher = match self.host_dispatcher {
            Some(executor) => executor,
            None => provide_default_executor("host")?,
        };

        let config = BridgeConfig {
            sdk,
            ui_executor,
            host_dispatcher,
            app_metadata: self.app_metadata,
            lifecycle_observer: self.lifecycle_observer,
            identity: self.identity.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
