//! Application Metadata Access

/// Read-only lookup into the host application's packaged metadata
/// (Android manifest `<meta-data>`, iOS `Info.plist`).
///
/// The bridge only uses it to report which SDK build is linked.
pub trait AppMetadata: Send + Sync {
    /// Returns the metadata value for `name`, or `None` when absent.
    fn get(&self, name: &str) -> Option<String>;
}
