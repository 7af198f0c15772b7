//! Overlays: named precedence tiers over the configured roots

use indexmap::IndexSet;

use crate::error::ConfigResult;
use crate::roots::SharedRoot;
use crate::types::Value;

/// A named precedence tier
///
/// Searches every root under its namespace (`None` = the roots' top level).
/// The root list always mirrors the owning configuration's, newest root
/// first; the name is only used for diagnostics.
#[derive(Debug, Clone)]
pub struct Overlay {
    name: String,
    namespace: Option<String>,
    roots: Vec<SharedRoot>,
}

impl Overlay {
    pub fn new(name: impl Into<String>, namespace: Option<String>, roots: Vec<SharedRoot>) -> Self {
        Self {
            name: name.into(),
            namespace,
            roots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn roots(&self) -> &[SharedRoot] {
        &self.roots
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<SharedRoot>) {
        self.roots = roots;
    }

    /// All decoded values for `key` at this tier, lowest precedence first
    ///
    /// Roots are visited oldest first, so a later-added root overrides the
    /// ones before it once the values are merged. Values are concatenated,
    /// not merged.
    pub fn load(&self, key: &str) -> ConfigResult<Vec<Value>> {
        let mut values = Vec::new();
        for root in self.roots.iter().rev() {
            let found = root.fetch(self.namespace(), key)?;
            if !found.is_empty() {
                tracing::debug!(
                    overlay = %self.name,
                    root = %root.describe(),
                    key,
                    count = found.len(),
                    "found config values"
                );
            }
            values.extend(found);
        }
        Ok(values)
    }

    /// Distinct key names defined at this tier across all roots
    pub fn all_keys(&self) -> ConfigResult<Vec<String>> {
        let mut keys = IndexSet::new();
        for root in &self.roots {
            keys.extend(root.list_keys(self.namespace())?);
        }
        Ok(keys.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerRegistry;
    use crate::roots::{FileRoot, VaultRoot};
    use crate::secrets::MemorySecretStore;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_load_visits_oldest_root_first() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("foo.yml"), "from: file\n").unwrap();

        let store = Arc::new(MemorySecretStore::new());
        store.insert("kv/foo", serde_json::json!({"from": "vault"})).unwrap();

        let roots: Vec<SharedRoot> = vec![
            Arc::new(VaultRoot::new(store, "kv")),
            Arc::new(FileRoot::new(dir.path(), HandlerRegistry::with_defaults())),
        ];
        let overlay = Overlay::new("root", None, roots);

        let values = overlay.load("foo").unwrap();
        assert_eq!(
            values,
            vec![
                Value::mapping([("from", Value::from("file"))]),
                Value::mapping([("from", Value::from("vault"))]),
            ]
        );
        assert!(overlay.load("bar").unwrap().is_empty());
    }

    #[test]
    fn test_all_keys_is_deduplicated_union() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        fs::create_dir_all(a.path().join("staging")).unwrap();
        fs::create_dir_all(b.path().join("staging")).unwrap();
        fs::write(a.path().join("staging/foo.yml"), "").unwrap();
        fs::write(b.path().join("staging/foo.json"), "{}").unwrap();
        fs::write(b.path().join("staging/bar.yml"), "").unwrap();
        fs::write(b.path().join("top.yml"), "").unwrap();

        let handlers = HandlerRegistry::with_defaults();
        let roots: Vec<SharedRoot> = vec![
            Arc::new(FileRoot::new(a.path(), handlers.clone())),
            Arc::new(FileRoot::new(b.path(), handlers)),
        ];
        let overlay = Overlay::new("environment", Some("staging".to_string()), roots);

        assert_eq!(overlay.all_keys().unwrap(), vec!["foo", "bar"]);
        assert_eq!(overlay.namespace(), Some("staging"));
        assert_eq!(overlay.name(), "environment");
    }
}
