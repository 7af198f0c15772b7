//! Core traits and types for secret storage

use thiserror::Error;

use crate::types::Value;

/// A secret read from a store: a JSON object of fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Secret {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Secret {
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// Build a secret from a JSON value, which must be an object
    pub fn from_json(path: &str, json: serde_json::Value) -> SecretStoreResult<Self> {
        match json {
            serde_json::Value::Object(data) => Ok(Self { data }),
            other => Err(SecretStoreError::InvalidData {
                path: path.to_string(),
                message: format!("expected a JSON object, got {other}"),
            }),
        }
    }

    /// The secret's data as a decoded mapping
    pub fn to_value(&self) -> Value {
        Value::from(serde_json::Value::Object(self.data.clone()))
    }
}

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("Invalid secret data at {path}: {message}")]
    InvalidData { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Key-value secret store capability
///
/// Paths are `/`-separated. `list` returns the direct children of a path;
/// names ending in `/` are sub-paths rather than secrets.
///
/// Implementations can be:
/// - In-memory for testing (`MemorySecretStore`)
/// - Custom clients (Vault, cloud secret managers, etc.)
///
/// # Example
///
/// ```
/// use strata_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("secret/app/db", serde_json::json!({"password": "hunter2"})).unwrap();
///
/// assert!(store.read("secret/app/db").unwrap().is_some());
/// assert_eq!(store.list("secret/app").unwrap(), vec!["db".to_string()]);
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Check if this store is available
    fn is_available(&self) -> bool {
        true
    }

    /// Read the secret at `path`, `None` if nothing is stored there
    fn read(&self, path: &str) -> SecretStoreResult<Option<Secret>>;

    /// List entry names directly under `path`
    fn list(&self, path: &str) -> SecretStoreResult<Vec<String>>;

    /// Check if a secret exists
    fn exists(&self, path: &str) -> SecretStoreResult<bool> {
        Ok(self.read(path)?.is_some())
    }
}
