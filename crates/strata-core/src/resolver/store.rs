//! Cached access to resolved configuration

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::finder::Finder;
use crate::config::Configuration;
use crate::error::ConfigResult;
use crate::types::ConfigValue;

/// Configuration handle with a per-key cache
///
/// Holds the only cache in the resolver stack: a key is loaded through
/// [`Finder`] on first access and served from memory afterwards, unless the
/// configuration sets `always_reload`.
///
/// # Example
///
/// ```no_run
/// use strata_core::{Configuration, Strata};
///
/// let mut config = Configuration::new();
/// config.set_root("~/app/config")?;
/// config.define_overlay("environment", Some("production"));
///
/// let strata = Strata::new(config)?;
/// let db = strata.get("database")?;
/// println!("{:?}", db.dig("primary.host"));
/// # Ok::<(), strata_core::ConfigError>(())
/// ```
pub struct Strata {
    config: Configuration,
    cache: RwLock<IndexMap<String, ConfigValue>>,
}

impl Strata {
    /// Wrap `config`, loading every key up front when `preload` is set
    pub fn new(config: Configuration) -> ConfigResult<Self> {
        let strata = Self {
            config,
            cache: RwLock::new(IndexMap::new()),
        };
        if strata.config.preload() {
            strata.preload()?;
        }
        Ok(strata)
    }

    fn preload(&self) -> ConfigResult<()> {
        let names = self.all_key_names()?;
        tracing::debug!(count = names.len(), "preloading config keys");
        for name in names {
            self.get(&name)?;
        }
        Ok(())
    }

    /// Resolved value for `key`
    pub fn get(&self, key: &str) -> ConfigResult<ConfigValue> {
        if self.config.always_reload() {
            self.cache.write().shift_remove(key);
        } else if let Some(value) = self.cache.read().get(key) {
            tracing::trace!(key, "config cache hit");
            return Ok(value.clone());
        }

        tracing::trace!(key, "config cache miss");
        let value = self.finder().load(key)?;
        self.cache.write().insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Drop any cached value for `key` and load it again
    pub fn reload(&self, key: &str) -> ConfigResult<ConfigValue> {
        self.cache.write().shift_remove(key);
        let value = self.finder().load(key)?;
        self.cache.write().insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Keys currently held in the cache, in load order
    pub fn keys(&self) -> Vec<String> {
        self.cache.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Every key any overlay defines, cached or not
    pub fn all_key_names(&self) -> ConfigResult<Vec<String>> {
        self.finder().all_key_names()
    }

    pub fn finder(&self) -> Finder<'_> {
        Finder::new(&self.config)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }
}

impl std::fmt::Debug for Strata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strata")
            .field("config", &self.config)
            .field("cached", &self.keys())
            .finish()
    }
}
