//! Filesystem root

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use super::traits::Root;
use crate::error::{ConfigError, ConfigResult};
use crate::handlers::HandlerRegistry;
use crate::types::Value;

/// Root reading `<base>/<namespace>/<key>.<ext>` files
///
/// Every extension known to the handler registry is a candidate. A key with
/// both `app.yml` and `app.json` yields two values, in extension registration
/// order.
///
/// A missing namespace directory simply defines no keys.
#[derive(Debug, Clone)]
pub struct FileRoot {
    path: PathBuf,
    handlers: HandlerRegistry,
}

impl FileRoot {
    /// Create a root at `path`, decoding with `handlers`
    pub fn new(path: impl Into<PathBuf>, handlers: HandlerRegistry) -> Self {
        Self {
            path: path.into(),
            handlers,
        }
    }

    /// Base directory of this root
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir_for(&self, namespace: Option<&str>) -> PathBuf {
        match namespace {
            Some(ns) if !ns.is_empty() => self.path.join(ns),
            _ => self.path.clone(),
        }
    }

    /// Existing files for `key`, in extension registration order
    fn files_for(&self, namespace: Option<&str>, key: &str) -> Vec<PathBuf> {
        let dir = self.dir_for(namespace);
        self.handlers
            .extensions()
            .iter()
            .map(|ext| dir.join(format!("{key}.{ext}")))
            .filter(|candidate| candidate.is_file())
            .collect()
    }

    fn decode_file(&self, file: &Path) -> ConfigResult<Option<Value>> {
        let name = file.to_string_lossy();
        let Some(decoder) = self.handlers.decoder_for(&name) else {
            return Ok(None);
        };

        let content = fs::read_to_string(file).map_err(|e| ConfigError::decode(&*name, e))?;
        let value = decoder(&content).map_err(|e| ConfigError::decode(&*name, e))?;
        Ok(Some(value))
    }
}

impl Root for FileRoot {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn fetch(&self, namespace: Option<&str>, key: &str) -> ConfigResult<Vec<Value>> {
        let mut values = Vec::new();
        for file in self.files_for(namespace, key) {
            tracing::trace!(file = %file.display(), "decoding config file");
            if let Some(value) = self.decode_file(&file)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn list_keys(&self, namespace: Option<&str>) -> ConfigResult<Vec<String>> {
        let dir = self.dir_for(namespace);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ConfigError::backend_unavailable(
                    "filesystem",
                    format!("{}: {}", dir.display(), e),
                ))
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ConfigError::backend_unavailable("filesystem", format!("{}: {}", dir.display(), e))
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let keys: IndexSet<String> = names
            .iter()
            .filter_map(|name| self.handlers.strip_extension(name))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();

        Ok(keys.into_iter().collect())
    }
}
