//! In-memory secret store

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::traits::{Secret, SecretStore, SecretStoreError, SecretStoreResult};

/// In-memory secret store for testing and ephemeral use
///
/// Listing follows the usual key-value secret engine layout: `list("a")`
/// returns the direct children of `a`, with nested paths reported once as
/// `name/`.
///
/// # Thread Safety
///
/// The store uses `RwLock` internally and is safe to use from multiple threads.
///
/// # Example
///
/// ```
/// use strata_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("kv/app/api", serde_json::json!({"token": "t"})).unwrap();
/// store.insert("kv/app/staging/api", serde_json::json!({"token": "s"})).unwrap();
///
/// assert_eq!(store.list("kv/app").unwrap(), vec!["api".to_string(), "staging/".to_string()]);
/// ```
#[derive(Debug)]
pub struct MemorySecretStore {
    secrets: RwLock<BTreeMap<String, Secret>>,
    available: AtomicBool,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            secrets: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Create a memory store with initial secrets
    pub fn with_secrets(initial: impl IntoIterator<Item = (String, Secret)>) -> Self {
        let store = Self::new();
        {
            let mut secrets = store.secrets.write();
            for (path, secret) in initial {
                secrets.insert(normalize_path(&path), secret);
            }
        }
        store
    }

    /// Store a JSON object at `path`
    pub fn insert(&self, path: &str, data: serde_json::Value) -> SecretStoreResult<()> {
        let secret = Secret::from_json(path, data)?;
        self.insert_secret(path, secret);
        Ok(())
    }

    /// Store a secret at `path`
    pub fn insert_secret(&self, path: &str, secret: Secret) {
        self.secrets.write().insert(normalize_path(path), secret);
    }

    /// Remove the secret at `path`
    pub fn remove(&self, path: &str) -> Option<Secret> {
        self.secrets.write().remove(&normalize_path(path))
    }

    /// Clear all secrets from the store
    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    /// Get the number of secrets in the store
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the store reachable or not; an unavailable store fails every call
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> SecretStoreResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(SecretStoreError::NotAvailable(self.name().to_string()))
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn read(&self, path: &str) -> SecretStoreResult<Option<Secret>> {
        self.ensure_available()?;
        Ok(self.secrets.read().get(&normalize_path(path)).cloned())
    }

    fn list(&self, path: &str) -> SecretStoreResult<Vec<String>> {
        self.ensure_available()?;

        let base = normalize_path(path);
        let prefix = if base.is_empty() {
            String::new()
        } else {
            format!("{base}/")
        };

        let secrets = self.secrets.read();
        let entries: BTreeSet<String> = secrets
            .keys()
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.is_empty())
            .map(|rest| match rest.split_once('/') {
                Some((dir, _)) => format!("{dir}/"),
                None => rest.to_string(),
            })
            .collect();

        Ok(entries.into_iter().collect())
    }
}

impl Clone for MemorySecretStore {
    fn clone(&self) -> Self {
        Self {
            secrets: RwLock::new(self.secrets.read().clone()),
            available: AtomicBool::new(self.is_available()),
        }
    }
}

/// Collapse repeated and surrounding slashes
fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_name() {
        let store = MemorySecretStore::new();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySecretStore::new();

        assert!(store.is_empty());
        assert_eq!(store.read("secret/a").unwrap(), None);

        store.insert("secret/a", json!({"k": "v"})).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.exists("secret/a").unwrap());

        let secret = store.read("secret/a").unwrap().unwrap();
        assert_eq!(secret.data["k"], "v");

        store.remove("secret/a");
        assert!(!store.exists("secret/a").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_paths_are_normalized() {
        let store = MemorySecretStore::new();
        store.insert("/secret//app/", json!({})).unwrap();
        assert!(store.read("secret/app").unwrap().is_some());
    }

    #[test]
    fn test_memory_store_rejects_non_object() {
        let store = MemorySecretStore::new();
        assert!(matches!(
            store.insert("secret/a", json!("plain")),
            Err(SecretStoreError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_memory_store_list() {
        let store = MemorySecretStore::new();
        store.insert("secret/app/db", json!({})).unwrap();
        store.insert("secret/app/api", json!({})).unwrap();
        store.insert("secret/app/staging/db", json!({})).unwrap();
        store.insert("secret/app/staging/cache", json!({})).unwrap();
        store.insert("secret/other", json!({})).unwrap();

        assert_eq!(
            store.list("secret/app").unwrap(),
            vec!["api".to_string(), "db".to_string(), "staging/".to_string()]
        );
        assert_eq!(
            store.list("secret/app/staging/").unwrap(),
            vec!["cache".to_string(), "db".to_string()]
        );
        assert!(store.list("secret/none").unwrap().is_empty());
        assert_eq!(store.list("").unwrap(), vec!["secret/".to_string()]);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let store = MemorySecretStore::new();
        store.set_available(false);

        assert!(matches!(store.read("a"), Err(SecretStoreError::NotAvailable(_))));
        assert!(matches!(store.list("a"), Err(SecretStoreError::NotAvailable(_))));

        store.set_available(true);
        assert!(store.read("a").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_with_secrets() {
        let secret = Secret::from_json("a", json!({"x": 1})).unwrap();
        let store = MemorySecretStore::with_secrets([("/a/b".to_string(), secret.clone())]);
        assert_eq!(store.read("a/b").unwrap(), Some(secret));
    }

    #[test]
    fn test_memory_store_clone() {
        let store = MemorySecretStore::new();
        store.insert("key", json!({"v": 1})).unwrap();

        let cloned = store.clone();
        cloned.insert("key", json!({"v": 2})).unwrap();

        assert_eq!(store.read("key").unwrap().unwrap().data["v"], 1);
        assert_eq!(cloned.read("key").unwrap().unwrap().data["v"], 2);
    }

    #[test]
    fn test_memory_store_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemorySecretStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                let path = format!("secret/key_{}", i);
                store_clone.insert(&path, json!({"i": i})).unwrap();
                assert!(store_clone.read(&path).unwrap().is_some());
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
        assert_eq!(store.list("secret").unwrap().len(), 10);
    }
}
