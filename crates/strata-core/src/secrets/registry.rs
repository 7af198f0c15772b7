//! Secret store registry for discovering and creating stores by name
//!
//! Declarative configuration files refer to secret stores by name. Hosts
//! register a factory for their real client (e.g. a Vault client) before
//! loading such a file.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::memory_store::MemorySecretStore;
use super::traits::SecretStore;

/// Factory function type for creating secret stores
pub type StoreFactory = Box<dyn Fn() -> Arc<dyn SecretStore> + Send + Sync>;

/// Definition of a registered secret store
pub struct StoreDefinition {
    /// Unique name for this store
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: StoreFactory,
}

impl std::fmt::Debug for StoreDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Global registry of secret stores
static REGISTRY: Lazy<RwLock<HashMap<String, StoreDefinition>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(
        "memory".to_string(),
        StoreDefinition {
            name: "memory".to_string(),
            description: "Empty in-memory store for testing".to_string(),
            factory: Box::new(|| Arc::new(MemorySecretStore::new())),
        },
    );

    RwLock::new(map)
});

/// Register a secret store type, replacing any previous one with the same name
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strata_core::secrets::{
///     create_secret_store, register_secret_store, MemorySecretStore, SecretStore,
/// };
///
/// let shared = Arc::new(MemorySecretStore::new());
/// let handle = shared.clone();
/// register_secret_store(
///     "fixtures",
///     "Pre-filled store",
///     Box::new(move || handle.clone() as Arc<dyn SecretStore>),
/// );
///
/// assert!(create_secret_store("fixtures").is_some());
/// ```
pub fn register_secret_store(name: &str, description: &str, factory: StoreFactory) {
    tracing::debug!(store = name, "registering secret store");
    REGISTRY.write().insert(
        name.to_string(),
        StoreDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Create a secret store by name, or `None` if the name is not registered
pub fn create_secret_store(name: &str) -> Option<Arc<dyn SecretStore>> {
    REGISTRY.read().get(name).map(|def| (def.factory)())
}

/// List all registered secret stores as (name, description) pairs
pub fn list_secret_stores() -> Vec<(String, String)> {
    let mut stores: Vec<_> = REGISTRY
        .read()
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    stores.sort();
    stores
}

/// Check if a store is registered
pub fn has_secret_store(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Unregister a secret store (mainly for testing)
pub fn unregister_secret_store(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_stores_registered() {
        assert!(has_secret_store("memory"));
    }

    #[test]
    fn test_create_memory_store() {
        let store = create_secret_store("memory").unwrap();
        assert_eq!(store.name(), "memory");
        assert!(store.list("").unwrap().is_empty());
    }

    #[test]
    fn test_create_unknown_store() {
        assert!(create_secret_store("nonexistent_xyz").is_none());
    }

    #[test]
    fn test_list_stores() {
        let stores = list_secret_stores();
        let names: Vec<_> = stores.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"memory"));
    }

    #[test]
    fn test_register_custom_store() {
        let shared = Arc::new(MemorySecretStore::new());
        shared
            .insert("kv/app", serde_json::json!({"a": 1}))
            .unwrap();
        let handle = shared.clone();

        register_secret_store(
            "test_custom_store",
            "A test store",
            Box::new(move || handle.clone() as Arc<dyn SecretStore>),
        );
        assert!(has_secret_store("test_custom_store"));

        // Every created instance is the same pre-filled store
        let store = create_secret_store("test_custom_store").unwrap();
        assert!(store.read("kv/app").unwrap().is_some());

        assert!(unregister_secret_store("test_custom_store"));
        assert!(!has_secret_store("test_custom_store"));
    }
}
