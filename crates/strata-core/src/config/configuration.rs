//! Programmatic configuration of roots, overlays and handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigResult;
use crate::handlers::{DecodeResult, HandlerRegistry};
use crate::resolver::{Finder, Overlay};
use crate::roots::{expand_path, FileRoot, SharedRoot, VaultRoot};
use crate::secrets::SecretStore;

/// Name of the overlay every configuration starts with
pub const ROOT_OVERLAY: &str = "root";

/// Wires roots, overlays and handlers together
///
/// A fresh configuration searches the current directory with the default
/// handlers (`yml`, `yaml`, `yml.erb`, `yaml.erb`, `json`) through a single
/// `root` overlay.
///
/// Every overlay shares the configuration's root list: adding a root makes it
/// visible to all overlays defined so far and later.
///
/// # Example
///
/// ```no_run
/// use strata_core::Configuration;
///
/// let mut config = Configuration::new();
/// config.set_root("/etc/myapp")?;
/// config.add_root("~/.myapp")?;
/// config.define_overlay_with("environment", || std::env::var("APP_ENV").ok());
/// config.set_freeze(true);
/// # Ok::<(), strata_core::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Configuration {
    roots: Vec<SharedRoot>,
    overlays: Vec<Overlay>,
    handlers: HandlerRegistry,
    always_reload: bool,
    preload: bool,
    freeze: bool,
}

impl Configuration {
    pub fn new() -> Self {
        Self::with_registry(HandlerRegistry::with_defaults())
    }

    /// Build a configuration that decodes through `handlers`
    ///
    /// Pass [`HandlerRegistry::shared()`] to share handler definitions with
    /// every other configuration doing the same.
    pub fn with_registry(handlers: HandlerRegistry) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let roots: Vec<SharedRoot> = vec![Arc::new(FileRoot::new(cwd, handlers.clone()))];
        let overlays = vec![Overlay::new(ROOT_OVERLAY, None, roots.clone())];

        Self {
            roots,
            overlays,
            handlers,
            always_reload: false,
            preload: false,
            freeze: false,
        }
    }

    /// Search only the directory at `path`, discarding all overlays
    pub fn set_root(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let root = self.file_root(path.as_ref())?;
        self.reset_roots(root);
        Ok(())
    }

    /// Search only `path` in `store`, discarding all overlays
    pub fn set_vault_root(&mut self, store: Arc<dyn SecretStore>, path: impl Into<String>) {
        self.reset_roots(Arc::new(VaultRoot::new(store, path)));
    }

    /// Add the directory at `path` ahead of the existing roots
    ///
    /// The new root takes precedence over every earlier root within each
    /// overlay.
    pub fn add_root(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let root = self.file_root(path.as_ref())?;
        self.insert_root(root);
        Ok(())
    }

    /// Add `path` in `store` ahead of the existing roots
    pub fn add_vault_root(&mut self, store: Arc<dyn SecretStore>, path: impl Into<String>) {
        self.insert_root(Arc::new(VaultRoot::new(store, path)));
    }

    /// Add any [`Root`](crate::roots::Root) implementation ahead of the existing roots
    pub fn insert_root(&mut self, root: SharedRoot) {
        tracing::debug!(root = %root.describe(), "adding config root");
        self.roots.insert(0, root);
        for overlay in &mut self.overlays {
            overlay.set_roots(self.roots.clone());
        }
    }

    fn file_root(&self, path: &Path) -> ConfigResult<SharedRoot> {
        let path = expand_path(path)?;
        Ok(Arc::new(FileRoot::new(path, self.handlers.clone())))
    }

    fn reset_roots(&mut self, root: SharedRoot) {
        tracing::debug!(root = %root.describe(), "replacing config roots");
        self.roots = vec![root];
        self.overlays = vec![Overlay::new(ROOT_OVERLAY, None, self.roots.clone())];
    }

    /// Register `decoder` for files ending in any of `extensions`
    ///
    /// Existing handlers keep priority for extensions they already cover.
    pub fn define_handler<I, S, F>(&mut self, extensions: I, decoder: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> DecodeResult + Send + Sync + 'static,
    {
        self.handlers.register(extensions, decoder);
    }

    /// Append an overlay searching `namespace` in every root
    ///
    /// A `None` namespace searches the roots' top level again.
    pub fn define_overlay(&mut self, name: impl Into<String>, namespace: Option<&str>) {
        let name = name.into();
        tracing::debug!(overlay = %name, namespace, "defining overlay");
        self.overlays.push(Overlay::new(
            name,
            namespace.map(str::to_string),
            self.roots.clone(),
        ));
    }

    /// Append an overlay whose namespace is computed by `namespace`
    pub fn define_overlay_with<F>(&mut self, name: impl Into<String>, namespace: F)
    where
        F: FnOnce() -> Option<String>,
    {
        let namespace = namespace();
        self.define_overlay(name, namespace.as_deref());
    }

    pub fn roots(&self) -> &[SharedRoot] {
        &self.roots
    }

    /// Overlays in precedence order, lowest first
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Whether every access re-reads the sources
    pub fn always_reload(&self) -> bool {
        self.always_reload
    }

    pub fn set_always_reload(&mut self, always_reload: bool) {
        self.always_reload = always_reload;
    }

    /// Whether all keys are loaded when a [`Strata`](crate::Strata) is created
    pub fn preload(&self) -> bool {
        self.preload
    }

    pub fn set_preload(&mut self, preload: bool) {
        self.preload = preload;
    }

    /// Whether loaded values are sealed against mutation
    pub fn freeze(&self) -> bool {
        self.freeze
    }

    pub fn set_freeze(&mut self, freeze: bool) {
        self.freeze = freeze;
    }

    /// Uncached lookup over this configuration
    pub fn finder(&self) -> Finder<'_> {
        Finder::new(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
