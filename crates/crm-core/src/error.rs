//! Error types for the Chat CRM engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Chat CRM workspace.
///
/// Most engine operations never surface these to their callers: transient
/// storage failures are logged and the in-memory state stays authoritative.
/// The variants exist for the storage and configuration layers, whose callers
/// decide how to degrade.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CrmError {
    /// File system failure in a durable store
    #[error("IO error: {message}")]
    Io { message: String },

    /// Durable key-value store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted data or config that failed to (de)serialize
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Unusable configuration or unresolvable paths
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine plumbing failure, e.g. the engine loop has stopped
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrmError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Storage failures the engine logs and rides out instead of reporting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Storage(_))
    }
}

impl From<std::io::Error> for CrmError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CrmError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for CrmError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::TomlParseError(_) | MigrationError::TomlSerializeError(_) => {
                Self::Serialization {
                    format: "TOML".to_string(),
                    message: err.to_string(),
                }
            }
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            MigrationError::IoError { .. } => Self::Io {
                message: err.to_string(),
            },
            _ => Self::Config(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for CrmError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_transient() {
        let err: CrmError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_transient());
        assert!(!err.is_serialization());
    }

    #[test]
    fn test_config_error_is_not_transient() {
        let err = CrmError::config("bad probe list");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Configuration error: bad probe list");
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: CrmError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }
}
