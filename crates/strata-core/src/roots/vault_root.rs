//! Secret-store root

use std::sync::Arc;

use super::path::join_secret_path;
use super::traits::Root;
use crate::error::ConfigResult;
use crate::secrets::SecretStore;
use crate::types::Value;

/// Root reading secrets at `<base>/<namespace>/<key>` from a secret store
///
/// A present secret contributes its data as one mapping; an absent one
/// contributes nothing. Store failures propagate.
#[derive(Clone)]
pub struct VaultRoot {
    store: Arc<dyn SecretStore>,
    path: String,
}

impl VaultRoot {
    pub fn new(store: Arc<dyn SecretStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    /// Base path inside the store
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }
}

impl Root for VaultRoot {
    fn describe(&self) -> String {
        format!("{}:{}", self.store.name(), self.path)
    }

    fn fetch(&self, namespace: Option<&str>, key: &str) -> ConfigResult<Vec<Value>> {
        let full_path = join_secret_path(&[&self.path, namespace.unwrap_or(""), key]);
        tracing::trace!(store = self.store.name(), path = %full_path, "reading secret");

        Ok(self
            .store
            .read(&full_path)?
            .map(|secret| vec![secret.to_value()])
            .unwrap_or_default())
    }

    fn list_keys(&self, namespace: Option<&str>) -> ConfigResult<Vec<String>> {
        let dir = join_secret_path(&[&self.path, namespace.unwrap_or("")]);
        Ok(self
            .store
            .list(&dir)?
            .into_iter()
            .filter(|entry| !entry.ends_with('/'))
            .collect())
    }
}

impl std::fmt::Debug for VaultRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultRoot")
            .field("store", &self.store.name())
            .field("path", &self.path)
            .finish()
    }
}
