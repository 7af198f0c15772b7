//! Configuration roots
//!
//! A root turns a (namespace, key) pair into decoded values:
//! - `FileRoot` reads `<base>/<namespace>/<key>.<ext>` through the handler registry
//! - `VaultRoot` reads `<base>/<namespace>/<key>` from a `SecretStore`

mod traits;
mod file_root;
mod vault_root;
mod path;

pub use traits::{Root, SharedRoot};
pub use file_root::FileRoot;
pub use vault_root::VaultRoot;
pub use path::{expand_path, join_secret_path};
