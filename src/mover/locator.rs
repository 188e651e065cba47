//! Category key → destination folder

use crate::pipeline::Reporter;
use crate::registry::{FolderRegistry, RegistryError};
use crate::resolver::ResolutionTables;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocateError {
    #[error("key '{0}' is unknown to the folder registry and has no built-in default folder")]
    UnknownKey(String),

    #[error("key '{0}' is registered but has no folders configured")]
    NoPathsConfigured(String),

    #[error("folder registry lookup for '{key}' failed: {reason}")]
    Registry { key: String, reason: String },

    #[error("failed to create destination folder {path}: {reason}")]
    CreateDir { path: PathBuf, reason: String },
}

/// Finds (and creates) the destination folder for a category key.
///
/// Lookup results, including failures, are cached for the locator's
/// lifetime so the registry is asked about each key at most once. Folder
/// creation is repeated on every call.
pub struct DestinationLocator<'a> {
    registry: &'a dyn FolderRegistry,
    tables: &'a ResolutionTables,
    host_root: PathBuf,
    cache: HashMap<String, Result<PathBuf, LocateError>>,
}

impl<'a> DestinationLocator<'a> {
    pub fn new(
        registry: &'a dyn FolderRegistry,
        tables: &'a ResolutionTables,
        host_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            tables,
            host_root: host_root.into(),
            cache: HashMap::new(),
        }
    }

    pub async fn locate(&mut self, category_key: &str, reporter: &Reporter) -> Result<PathBuf, LocateError> {
        let key = category_key.to_lowercase();

        let lookup = match self.cache.get(&key) {
            Some(cached) => {
                debug!("Destination cache hit for '{}'", key);
                cached.clone()
            }
            None => {
                let result = self.lookup(&key, reporter).await;
                self.cache.insert(key.clone(), result.clone());
                result
            }
        };

        let folder = lookup?;
        fs::create_dir_all(&folder)
            .await
            .map_err(|e| LocateError::CreateDir {
                path: folder.clone(),
                reason: e.to_string(),
            })?;
        Ok(folder)
    }

    async fn lookup(&self, key: &str, reporter: &Reporter) -> Result<PathBuf, LocateError> {
        match self.registry.folder_paths(key).await {
            Ok(paths) => match paths.into_iter().next() {
                Some(folder) => {
                    let folder = self.anchor(folder);
                    reporter
                        .info(format!(
                            "  Info: Using {} folder '{}' (key: '{}')",
                            self.registry.id(),
                            folder.display(),
                            key
                        ))
                        .await;
                    Ok(folder)
                }
                None => Err(LocateError::NoPathsConfigured(key.to_string())),
            },
            Err(RegistryError::UnknownKey(_)) => {
                reporter
                    .info(format!(
                        "  Info: Key '{}' not found in {} configuration. Trying built-in default folders...",
                        key,
                        self.registry.id()
                    ))
                    .await;

                match self.tables.fallback_subdir(key) {
                    Some(subdir) => {
                        let folder = self.host_root.join("models").join(subdir);
                        reporter
                            .info(format!(
                                "  Info: Using default folder '{}' (key: '{}')",
                                folder.display(),
                                key
                            ))
                            .await;
                        Ok(folder)
                    }
                    None => Err(LocateError::UnknownKey(key.to_string())),
                }
            }
            Err(RegistryError::Failed(reason)) => Err(LocateError::Registry {
                key: key.to_string(),
                reason,
            }),
        }
    }

    /// Relative registry paths are taken relative to the host root
    fn anchor(&self, folder: PathBuf) -> PathBuf {
        if folder.is_absolute() {
            folder
        } else {
            self.host_root.join(folder)
        }
    }

    pub fn host_root(&self) -> &Path {
        &self.host_root
    }
}
