//! Error handling for ModelMover

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a run before any file is touched
#[derive(Debug, Error)]
pub enum MoverError {
    #[error("A move run is already in progress")]
    Busy,

    #[error("Source folder is not a valid directory: {0}")]
    InvalidSourceRoot(PathBuf),

    #[error("Host root is not a valid directory: {0}")]
    InvalidHostRoot(PathBuf),

    #[error("Failed to parse metadata: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to load reference catalog {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("Folder registry initialization failed: {0}")]
    RegistryInit(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Metadata source failures
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Could not read metadata source {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find table with id '{0}'")]
    TableNotFound(String),

    #[error("Could not locate filename/type columns in headers {0:?}")]
    MissingColumns(Vec<String>),

    #[error("No entries could be parsed ({0} lines failed). Expected 'filename -> key' per line")]
    NoUsableLines(usize),
}
