//! Error types for configuration lookup

use thiserror::Error;

use crate::secrets::SecretStoreError;

/// Errors that can occur while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No overlay/root defines the requested key
    #[error("Can't find config files for key: {0:?}")]
    KeyNotFound(String),

    /// A located file or secret failed to decode under its handler
    #[error("Failed to decode {source_name}: {message}")]
    Decode { source_name: String, message: String },

    /// Filesystem or secret store access failed
    #[error("{backend} unavailable: {message}")]
    BackendUnavailable { backend: String, message: String },

    /// Attempted to mutate a sealed value
    #[error("Cannot modify frozen value: {0}")]
    Frozen(String),

    /// Declarative configuration could not be applied
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ConfigError {
    /// Create a key-not-found error
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound(key.into())
    }

    /// Create a decode error
    pub fn decode(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create a backend-unavailable error
    pub fn backend_unavailable(backend: impl Into<String>, message: impl ToString) -> Self {
        Self::BackendUnavailable {
            backend: backend.into(),
            message: message.to_string(),
        }
    }
}

impl From<SecretStoreError> for ConfigError {
    fn from(err: SecretStoreError) -> Self {
        match err {
            SecretStoreError::InvalidData { path, message } => Self::Decode {
                source_name: path,
                message,
            },
            other => Self::BackendUnavailable {
                backend: "secret store".to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
