//! In-memory application metadata

use bridge_traits::device::AppMetadata;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Metadata table for hosts without a packaged manifest.
#[derive(Debug, Default)]
pub struct StaticAppMetadata {
    values: RwLock<HashMap<String, String>>,
}

impl StaticAppMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name`, replacing any previous value.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }
}

impl AppMetadata for StaticAppMetadata {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key() {
        assert_eq!(StaticAppMetadata::new().get("targetedAppStore"), None);
    }

    #[test]
    fn test_insert_replaces() {
        let metadata = StaticAppMetadata::new().with("targetedAppStore", "amazon");
        metadata.insert("targetedAppStore", "google");
        assert_eq!(
            metadata.get("targetedAppStore"),
            Some("google".to_string())
        );
    }

    #[test]
    fn test_insert_survives_poisoned_lock() {
        let metadata = std::sync::Arc::new(StaticAppMetadata::new());
        let poisoner = metadata.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.values.write().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(metadata.values.is_poisoned());

        metadata.insert("targetedAppStore", "google");
        assert_eq!(
            metadata.get("targetedAppStore"),
            Some("google".to_string())
        );
    }
}
