//! Root trait definition

use std::sync::Arc;

use crate::error::ConfigResult;
use crate::types::Value;

/// A source of raw configuration content
///
/// Implementations:
/// - `FileRoot`: `<base>/<namespace>/<key>.<ext>` files on disk
/// - `VaultRoot`: secrets at `<base>/<namespace>/<key>` in a secret store
pub trait Root: Send + Sync + std::fmt::Debug {
    /// Short description used in log output, e.g. `file:/etc/app`
    fn describe(&self) -> String;

    /// Decoded values for `key` under `namespace` (`None` = the root namespace)
    ///
    /// An empty result means this root does not define the key.
    fn fetch(&self, namespace: Option<&str>, key: &str) -> ConfigResult<Vec<Value>>;

    /// Distinct key names visible under `namespace`
    fn list_keys(&self, namespace: Option<&str>) -> ConfigResult<Vec<String>>;
}

/// Type alias for an Arc-wrapped root
pub type SharedRoot = Arc<dyn Root>;
