//! secrets::traits
//!
//! Secret storage trait.
//!
//! Keys are namespaced strings such as `github.token`. Values are raw
//! secrets and never appear in errors or logs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages describe the storage, never the stored value.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secrets: {0}")]
    ReadError(String),

    #[error("failed to write secrets: {0}")]
    WriteError(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Key-value storage for secrets.
pub trait SecretStore: Send + Sync {
    /// Get a secret, `Ok(None)` if it is not stored.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Store a secret, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Remove a secret. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Whether a secret is stored under `key`.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Process-local secret store.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SecretError::ReadError("disk full".into());
        assert!(err.to_string().contains("read"));

        let err = SecretError::WriteError("read-only filesystem".into());
        assert!(err.to_string().contains("write"));

        let err = SecretError::PermissionDenied("secrets.toml".into());
        assert!(err.to_string().contains("permission"));
    }

    #[test]
    fn memory_store_set_get_delete() {
        let store = MemorySecretStore::new();
        assert!(!store.exists("github.token").unwrap());

        store.set("github.token", "abc").unwrap();
        assert_eq!(store.get("github.token").unwrap().as_deref(), Some("abc"));
        assert!(store.exists("github.token").unwrap());

        store.delete("github.token").unwrap();
        store.delete("github.token").unwrap();
        assert!(store.get("github.token").unwrap().is_none());
    }
}
