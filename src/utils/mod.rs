//! Utility modules for error handling and configuration

pub mod app_paths;
pub mod config;
pub mod error;

// Re-export for convenience
pub use app_paths::{get_app_config_dir, get_config_path, get_default_catalog_path};
pub use config::{PathConfig, RunSettings, DEFAULT_TABLE_ID};
pub use error::{MoverError, ParseError};
