//! Default locations for ModelMover's own files
//!
//! The path record and the optional reference catalog live under the platform
//! configuration directory (`~/.config/modelmover` on Linux,
//! `~/Library/Application Support/modelmover` on macOS, `%APPDATA%\modelmover` on Windows).
//! Relative paths are never used so the tool behaves the same regardless of the
//! directory it is launched from.

use std::path::PathBuf;
use tracing::{debug, warn};

/// File name of the persisted path record
pub const CONFIG_FILE: &str = "modelmover_config.txt";

/// File name of the reference catalog looked up by default
pub const CATALOG_FILE: &str = "extracted_models.json";

/// Get the configuration directory for ModelMover.
pub fn get_app_config_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .map(|base| base.join("modelmover"))
        .unwrap_or_else(|| {
            warn!("Could not determine config directory, using temp dir");
            std::env::temp_dir().join("modelmover")
        });

    debug!("Config directory: {:?}", dir);
    dir
}

/// Get the default path of the path record.
pub fn get_config_path() -> PathBuf {
    get_app_config_dir().join(CONFIG_FILE)
}

/// Get the default reference catalog, only if it exists.
pub fn get_default_catalog_path() -> Option<PathBuf> {
    let path = get_app_config_dir().join(CATALOG_FILE);
    path.is_file().then_some(path)
}
