//! Key lookup across all overlays

use indexmap::IndexSet;

use super::merge::merge_all;
use crate::config::Configuration;
use crate::error::{ConfigError, ConfigResult};
use crate::types::ConfigValue;

/// Resolves a key against a configuration's overlays
///
/// Every value found for the key is deep-merged in overlay order, then from
/// oldest to newest root within each overlay. Later overlays override earlier
/// ones regardless of root order. Each call re-reads the roots; nothing is
/// cached here.
#[derive(Debug, Clone, Copy)]
pub struct Finder<'a> {
    config: &'a Configuration,
}

impl<'a> Finder<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Load and merge every definition of `key`
    ///
    /// Mappings come back as [`ConfigValue::Hash`]. The result is sealed when
    /// the configuration's `freeze` flag is set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::KeyNotFound`] if no overlay defines `key`; decode and
    /// backend errors from any root abort the whole lookup.
    pub fn load(&self, key: &str) -> ConfigResult<ConfigValue> {
        if !self.all_key_names()?.iter().any(|name| name == key) {
            return Err(ConfigError::key_not_found(key));
        }

        let mut all_data = Vec::new();
        for overlay in self.config.overlays() {
            all_data.extend(overlay.load(key)?);
        }
        tracing::debug!(key, sources = all_data.len(), "merging config values");

        let merged = merge_all(all_data);
        let mut result = merged.map(ConfigValue::from).unwrap_or(ConfigValue::Null);

        if self.config.freeze() {
            result.seal();
        }
        Ok(result)
    }

    /// Names of all keys defined by any overlay, without duplicates
    pub fn all_key_names(&self) -> ConfigResult<Vec<String>> {
        let mut names = IndexSet::new();
        for overlay in self.config.overlays() {
            names.extend(overlay.all_keys()?);
        }
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config_at(dir: &TempDir) -> Configuration {
        let mut config = Configuration::new();
        config.set_root(dir.path()).unwrap();
        config
    }

    #[test]
    fn test_overlay_merge_scenario() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a: 1\nb:\n  x: 1\n");
        write(dir.path(), "staging/foo.yml", "b:\n  y: 2\n");

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("staging"));

        let value = Finder::new(&config).load("foo").unwrap();
        assert_eq!(value.dig("a").and_then(|v| v.as_i64()), Some(1));
        assert_eq!(value.dig("b.x").and_then(|v| v.as_i64()), Some(1));
        assert_eq!(value.dig("b.y").and_then(|v| v.as_i64()), Some(2));
    }

    #[test]
    fn test_later_overlay_wins() {
        let dir = tempdir().unwrap();
        write(dir.path(), "db.yml", "host: localhost\nport: 5432\n");
        write(dir.path(), "production/db.yml", "host: db.prod\n");
        write(dir.path(), "tenant-a/db.yml", "host: db.tenant-a\n");

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("production"));
        config.define_overlay("tenant", Some("tenant-a"));

        let value = Finder::new(&config).load("db").unwrap();
        assert_eq!(value.get("host").and_then(|v| v.as_str()), Some("db.tenant-a"));
        assert_eq!(value.get("port").and_then(|v| v.as_i64()), Some(5432));
    }

    #[test]
    fn test_key_only_in_overlay_is_found() {
        let dir = tempdir().unwrap();
        write(dir.path(), "staging/feature.json", r#"{"enabled": true}"#);

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("staging"));

        let value = Finder::new(&config).load("feature").unwrap();
        assert_eq!(value.get("enabled").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn test_missing_key() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a: 1\n");
        let config = config_at(&dir);

        let err = Finder::new(&config).load("missing").unwrap_err();
        assert!(matches!(err, ConfigError::KeyNotFound(ref key) if key == "missing"));
    }

    #[test]
    fn test_absent_vault_secret_contributes_nothing() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.json", r#"{"a": 1}"#);

        let store = Arc::new(MemorySecretStore::new());
        let mut config = config_at(&dir);
        config.add_vault_root(store, "base");

        let value = Finder::new(&config).load("foo").unwrap();
        assert_eq!(value.to_json(), serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_vault_root_added_later_has_precedence() {
        let dir = tempdir().unwrap();
        write(dir.path(), "db.yml", "user: app\npassword: changeme\n");

        let store = Arc::new(MemorySecretStore::new());
        store
            .insert("secret/config/db", serde_json::json!({"password": "s3cret"}))
            .unwrap();

        let mut config = config_at(&dir);
        config.add_vault_root(store, "secret/config");

        let value = Finder::new(&config).load("db").unwrap();
        assert_eq!(value.get("user").and_then(|v| v.as_str()), Some("app"));
        assert_eq!(value.get("password").and_then(|v| v.as_str()), Some("s3cret"));
    }

    #[test]
    fn test_both_extensions_are_merged() {
        let dir = tempdir().unwrap();
        write(dir.path(), "app.yml", "name: base\nport: 80\n");
        write(dir.path(), "app.yaml.erb", "port: ${STRATA_TEST_UNSET_APP_PORT:-8080}\n");

        let config = config_at(&dir);
        let value = Finder::new(&config).load("app").unwrap();

        assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("base"));
        assert_eq!(value.get("port").and_then(|v| v.as_i64()), Some(8080));
    }

    #[test]
    fn test_non_mapping_override() {
        let dir = tempdir().unwrap();
        write(dir.path(), "hosts.yml", "primary: a\n");
        write(dir.path(), "staging/hosts.yml", "- b\n- c\n");

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("staging"));

        let value = Finder::new(&config).load("hosts").unwrap();
        let list = value.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).and_then(|v| v.as_str()), Some("b"));
    }

    #[test]
    fn test_freeze_seals_result() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a:\n  b: 1\n");

        let mut config = config_at(&dir);
        config.set_freeze(true);

        let mut value = Finder::new(&config).load("foo").unwrap();
        assert!(value.is_frozen());

        let ConfigValue::Hash(hash) = &mut value else {
            panic!("expected hash");
        };
        assert!(matches!(hash.insert("c", 2), Err(ConfigError::Frozen(_))));
        assert!(hash.get("a").unwrap().is_frozen());
    }

    #[test]
    fn test_unfrozen_results_are_independent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a: 1\n");
        let config = config_at(&dir);
        let finder = Finder::new(&config);

        let mut first = finder.load("foo").unwrap();
        let ConfigValue::Hash(hash) = &mut first else {
            panic!("expected hash");
        };
        hash.insert("a", 99).unwrap();

        let second = finder.load("foo").unwrap();
        assert_eq!(second.get("a").and_then(|v| v.as_i64()), Some(1));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a: [1, 2]\nb: {c: d}\n");
        let config = config_at(&dir);
        let finder = Finder::new(&config);

        assert_eq!(finder.load("foo").unwrap(), finder.load("foo").unwrap());
    }

    #[test]
    fn test_decode_error_aborts_load() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a: 1\n");
        write(dir.path(), "staging/foo.json", "{broken");

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("staging"));

        let err = Finder::new(&config).load("foo").unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }

    #[test]
    fn test_backend_error_is_not_key_not_found() {
        let dir = tempdir().unwrap();
        write(dir.path(), "foo.yml", "a: 1\n");
        write(dir.path(), "staging", "a plain file where a directory belongs");

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("staging"));
        let finder = Finder::new(&config);

        assert!(matches!(
            finder.load("foo"),
            Err(ConfigError::BackendUnavailable { .. })
        ));
        assert!(matches!(
            finder.all_key_names(),
            Err(ConfigError::BackendUnavailable { .. })
        ));
    }

    #[test]
    fn test_empty_file_loads_as_null() {
        let dir = tempdir().unwrap();
        write(dir.path(), "empty.json", "null");
        let config = config_at(&dir);

        assert!(Finder::new(&config).load("empty").unwrap().is_null());
    }

    #[test]
    fn test_all_key_names() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.yml", "x: 1\n");
        write(dir.path(), "a.yml", "x: 1\n");
        write(dir.path(), "staging/c.yml", "x: 1\n");
        write(dir.path(), "staging/a.yml", "x: 2\n");
        write(dir.path(), "production/d.yml", "x: 1\n");

        let mut config = config_at(&dir);
        config.define_overlay("environment", Some("staging"));

        assert_eq!(
            Finder::new(&config).all_key_names().unwrap(),
            vec!["a", "b", "c"]
        );
    }
}
