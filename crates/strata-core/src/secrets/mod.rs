//! Secret storage abstractions and implementations
//!
//! This module provides a pluggable secret storage capability with:
//! - `SecretStore` trait (`read`/`list`) for wrapping real clients
//! - Built-in `MemorySecretStore`
//! - A registry for creating stores by name from declarative configuration

mod traits;
mod memory_store;
mod registry;

pub use traits::{SecretStore, Secret, SecretStoreError, SecretStoreResult};
pub use memory_store::MemorySecretStore;
pub use registry::{
    register_secret_store, create_secret_store, list_secret_stores,
    has_secret_store, unregister_secret_store, StoreDefinition, StoreFactory,
};
