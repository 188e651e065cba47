//! Host application folder registry

pub mod comfy;

pub use comfy::ComfyFolderRegistry;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Registry lookup failures.
///
/// `UnknownKey` means the host has never heard of the category. A known
/// category with no configured folders is `Ok(vec![])`, not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("key '{0}' is not registered")]
    UnknownKey(String),

    #[error("{0}")]
    Failed(String),
}

/// Lookup service mapping category keys to candidate folders
#[async_trait]
pub trait FolderRegistry: Send + Sync {
    /// Returns a unique identifier for this registry (e.g., "comfyui")
    fn id(&self) -> &'static str;

    /// One-time setup, invoked once per run before the first lookup
    async fn init(&mut self, _host_root: &Path) -> Result<(), RegistryError> {
        Ok(())
    }

    /// Candidate folders for `key`, preferred first
    async fn folder_paths(&self, key: &str) -> Result<Vec<PathBuf>, RegistryError>;
}
