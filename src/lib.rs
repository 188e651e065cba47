//! ModelMover library
//!
//! Moves downloaded model files into the folders a ComfyUI installation
//! expects, driven by a `filename → type` mapping.

pub mod metadata;
pub mod mover;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod utils;

// Re-export main types for easier use
pub use metadata::{MetadataEntry, MetadataMapping, MetadataSource, ParseMode};
pub use mover::{is_artifact, MoveOutcome, MoveStatus, RunSummary};
pub use pipeline::{PipelineEvent, PipelineRunner, RunHandle, Severity, StatusMessage};
pub use registry::{ComfyFolderRegistry, FolderRegistry, RegistryError};
pub use resolver::{ReferenceCatalog, ResolutionTier, TypeResolver};
pub use utils::{MoverError, ParseError, PathConfig, RunSettings};
