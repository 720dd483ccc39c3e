//! Path management for Chat CRM files.
//!
//! ```text
//! ~/.config/chat-crm/          # Config directory
//! └── config.toml              # Engine configuration
//!
//! ~/.local/share/chat-crm/     # Data directory
//! └── storage/
//!     └── local.json           # Durable key-value namespace
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "chat-crm";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for crm_core::CrmError {
    fn from(e: PathError) -> Self {
        crm_core::CrmError::config(e.to_string())
    }
}

/// Resolves config and storage locations, honouring explicit overrides.
#[derive(Debug, Clone, Default)]
pub struct CrmPaths {
    config_file: Option<PathBuf>,
    storage_dir: Option<PathBuf>,
}

impl CrmPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    pub fn with_storage_dir(mut self, path: Option<PathBuf>) -> Self {
        self.storage_dir = path;
        self
    }

    /// `~/.config/chat-crm/config.toml` unless overridden.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        if let Some(path) = &self.config_file {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// `~/.local/share/chat-crm/storage` unless overridden.
    pub fn storage_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(path) = &self.storage_dir {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join("storage"))
            .ok_or(PathError::HomeDirNotFound)
    }
}
