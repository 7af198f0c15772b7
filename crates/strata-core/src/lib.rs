//! Strata Core
//!
//! Layered configuration lookup. A key such as `database` is searched for in
//! every overlay (base, environment, tenant, ...) across every root (config
//! directories or secret-store paths), and all definitions found are
//! deep-merged, the more specific ones winning.
//!
//! ```text
//! config/
//!   database.yml            # overlay "root"
//!   production/database.yml # overlay "environment" = production
//! ```
//!
//! ```rust,no_run
//! use strata_core::{Configuration, Strata};
//!
//! let mut config = Configuration::new();
//! config.set_root("config")?;
//! config.define_overlay("environment", Some("production"));
//! config.set_freeze(true);
//!
//! let strata = Strata::new(config)?;
//! let database = strata.get("database")?;
//! let host = database.dig("primary.host").and_then(|v| v.as_str());
//! # Ok::<(), strata_core::ConfigError>(())
//! ```
//!
//! ## Custom formats
//!
//! Handlers map file extensions to decoders. Each [`Configuration`] owns its
//! registry; [`HandlerRegistry::shared()`] gives a process-wide one instead.
//!
//! ```rust,ignore
//! config.define_handler(["toml"], |body: &str| {
//!     let parsed: serde_json::Value = toml::from_str(body)?;
//!     Ok(parsed.into())
//! });
//! ```

pub mod error;
pub mod types;
pub mod handlers;
pub mod secrets;
pub mod roots;
pub mod resolver;
pub mod config;

// Re-export commonly used types
pub use error::{ConfigError, ConfigResult};

pub use types::{Value, Mapping, ConfigValue, ConfigHash, ConfigList};

pub use handlers::{HandlerRegistry, HandlerEntry, HandlerFormat, Decoder, DecodeResult};

pub use secrets::{
    SecretStore, Secret, SecretStoreError, SecretStoreResult,
    MemorySecretStore,
    register_secret_store, create_secret_store, list_secret_stores,
};

pub use roots::{Root, SharedRoot, FileRoot, VaultRoot};

pub use resolver::{Overlay, Finder, Strata, deep_merge};

pub use config::{Configuration, ConfigFile};
