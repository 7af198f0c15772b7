//! Path helpers for roots

use std::path::{Component, Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Expand a root directory like a shell would
///
/// A leading `~` becomes the home directory, relative paths are resolved
/// against the current directory, and `.`/`..` components are folded away.
pub fn expand_path(path: impl AsRef<Path>) -> ConfigResult<PathBuf> {
    let path = path.as_ref();

    let expanded = match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or_else(|| {
                ConfigError::InvalidConfiguration(format!(
                    "cannot expand {}: no home directory",
                    path.display()
                ))
            })?;
            home.join(rest)
        }
        Err(_) => path.to_path_buf(),
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map_err(|e| ConfigError::backend_unavailable("filesystem", e))?
            .join(expanded)
    };

    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Join secret-store path segments with `/`, skipping empty ones
pub fn join_secret_path(segments: &[&str]) -> String {
    segments
        .iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
