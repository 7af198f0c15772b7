//! Declarative configuration (YAML)
//!
//! Describes roots, overlays, handlers and flags in a file such as
//! `~/.config/strata/config.yaml`:
//!
//! ```yaml
//! roots:
//!   - type: file
//!     path: /etc/myapp
//!   - type: vault
//!     store: memory
//!     path: secret/myapp
//! overlays:
//!   - name: environment
//!     namespace: production
//! handlers:
//!   - extensions: [conf]
//!     format: yaml
//! freeze: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::configuration::Configuration;
use crate::error::{ConfigError, ConfigResult};
use crate::handlers::HandlerFormat;
use crate::secrets::create_secret_store;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// Roots, lowest precedence first. The first replaces the default
    /// current-directory root.
    #[serde(default)]
    pub roots: Vec<RootSpec>,

    /// Overlays after the implicit `root` overlay, lowest precedence first
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,

    /// Extra handlers, appended after the defaults
    #[serde(default)]
    pub handlers: Vec<HandlerSpec>,

    #[serde(default)]
    pub always_reload: bool,

    #[serde(default)]
    pub preload: bool,

    #[serde(default)]
    pub freeze: bool,
}

/// A root entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RootSpec {
    /// Directory on disk (`~` and relative paths are expanded)
    File { path: PathBuf },
    /// Path inside a secret store created by name from the store registry
    Vault { store: String, path: String },
}

/// An overlay entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlaySpec {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A handler entry mapping extensions to a built-in format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerSpec {
    pub extensions: Vec<String>,
    pub format: HandlerFormat,
}

impl ConfigFile {
    /// User-level config path (`~/.config/strata/config.yaml`)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        config_dir.join("strata").join("config.yaml")
    }

    /// Parse from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            ConfigError::InvalidConfiguration(format!("Failed to parse YAML: {}", e))
        })
    }

    /// Load from a file; a missing file yields the empty description
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Serialize back to YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ConfigError::InvalidConfiguration(format!("Failed to serialize YAML: {}", e))
        })
    }

    /// Apply roots, handlers, overlays and flags to `config`
    ///
    /// Roots go first since replacing the root list also resets overlays.
    pub fn apply(&self, config: &mut Configuration) -> ConfigResult<()> {
        for (index, root) in self.roots.iter().enumerate() {
            let replace = index == 0;
            match root {
                RootSpec::File { path } if replace => config.set_root(path)?,
                RootSpec::File { path } => config.add_root(path)?,
                RootSpec::Vault { store, path } => {
                    let secrets = create_secret_store(store).ok_or_else(|| {
                        ConfigError::InvalidConfiguration(format!(
                            "Unknown secret store: {}",
                            store
                        ))
                    })?;
                    if replace {
                        config.set_vault_root(secrets, path.clone());
                    } else {
                        config.add_vault_root(secrets, path.clone());
                    }
                }
            }
        }

        for handler in &self.handlers {
            if handler.extensions.is_empty() {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "handler for format {} lists no extensions",
                    handler.format.as_str()
                )));
            }
            config
                .handlers()
                .register_format(handler.extensions.iter().cloned(), handler.format);
        }

        for overlay in &self.overlays {
            config.define_overlay(overlay.name.clone(), overlay.namespace.as_deref());
        }

        config.set_always_reload(self.always_reload);
        config.set_preload(self.preload);
        config.set_freeze(self.freeze);
        Ok(())
    }

    /// Build a fresh [`Configuration`] from this description
    pub fn into_configuration(self) -> ConfigResult<Configuration> {
        let mut config = Configuration::new();
        self.apply(&mut config)?;
        Ok(config)
    }
}
