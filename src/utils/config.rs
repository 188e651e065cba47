//! Run configuration and the persisted path record

use crate::metadata::MetadataSource;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Default id of the metadata table in HTML exports
pub const DEFAULT_TABLE_ID: &str = "modelTable";

/// Parameters for a single move run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Folder scanned for downloaded artifacts
    pub source_root: PathBuf,

    /// Root of the host application installation
    pub host_root: PathBuf,

    /// Where the filename → label mapping comes from
    pub metadata: MetadataSource,

    /// Reference catalog enabling catalog-derived resolution
    pub catalog_path: Option<PathBuf>,

    /// Capacity of the status channel
    pub event_buffer: usize,
}

impl RunSettings {
    pub fn new(source_root: PathBuf, host_root: PathBuf, metadata: MetadataSource) -> Self {
        Self {
            source_root,
            host_root,
            metadata,
            catalog_path: None,
            event_buffer: 100,
        }
    }

    pub fn with_catalog(mut self, catalog_path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(catalog_path.into());
        self
    }
}

/// Positional path record: source root, host root, optional last metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathConfig {
    pub source_root: PathBuf,
    pub host_root: PathBuf,
    pub metadata_path: Option<PathBuf>,
}

impl PathConfig {
    /// Load the record. `Ok(None)` when no usable record exists.
    pub async fn load(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            debug!("No path config at {:?}", config_path);
            return Ok(None);
        }

        let content = fs::read_to_string(config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config = Self::parse(&content);
        if config.is_none() {
            warn!("Configuration file {:?} format is incorrect", config_path);
        }
        Ok(config)
    }

    /// Parse the record text, ignoring blank lines.
    pub fn parse(content: &str) -> Option<Self> {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if lines.len() < 2 {
            return None;
        }

        Some(Self {
            source_root: PathBuf::from(lines[0]),
            host_root: PathBuf::from(lines[1]),
            metadata_path: lines.get(2).map(PathBuf::from),
        })
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "{}\n{}\n",
            self.source_root.display(),
            self.host_root.display()
        );
        if let Some(metadata) = &self.metadata_path {
            out.push_str(&format!("{}\n", metadata.display()));
        }
        out
    }

    /// Rewrite the record, creating its parent folder if needed.
    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        fs::write(config_path, self.render())
            .await
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;

        debug!("Paths saved to config file: {:?}", config_path);
        Ok(())
    }

    /// Human-readable warnings for stored paths that are not folders.
    pub fn validation_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.source_root.is_dir() {
            warnings.push(format!(
                "Source path '{}' is not a valid folder",
                self.source_root.display()
            ));
        }
        if !self.host_root.is_dir() {
            warnings.push(format!(
                "Host root '{}' is not a valid folder",
                self.host_root.display()
            ));
        }
        warnings
    }
}
