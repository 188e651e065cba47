use crate::mover::{MoveOutcome, MoveStatus};
use crate::pipeline::Reporter;
use crate::resolver::ResolutionResult;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Relative location of a candidate inside the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeName {
    /// Folders between the source root and the file, empty for top level
    pub subdir: PathBuf,
    pub leaf: String,
}

impl RelativeName {
    /// Split a metadata file name into subdirectory and leaf.
    ///
    /// Both separators are accepted. Absolute names and names that climb
    /// out of the root are rejected.
    pub fn parse(filename: &str) -> Result<Self, String> {
        let normalized = filename.trim().replace('\\', "/");
        if normalized.starts_with('/') || has_drive_prefix(&normalized) {
            return Err(format!("absolute path '{}' is not allowed", filename));
        }

        let mut parts: Vec<&str> = Vec::new();
        for part in normalized.split('/') {
            match part {
                "" | "." => continue,
                ".." => return Err(format!("path '{}' leaves the source folder", filename)),
                other => parts.push(other),
            }
        }

        let leaf = parts
            .pop()
            .ok_or_else(|| format!("'{}' does not name a file", filename))?
            .to_string();
        let subdir = parts.iter().collect::<PathBuf>();

        // Only plain components may remain
        if subdir
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(format!("path '{}' is not a plain relative path", filename));
        }

        Ok(Self { subdir, leaf })
    }

    pub fn relative_path(&self) -> PathBuf {
        self.subdir.join(&self.leaf)
    }
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Moves one file from the source root into a destination folder
pub struct MoveExecutor {
    source_root: PathBuf,
}

impl MoveExecutor {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Move the file named by `resolution` into `dest_root`, keeping any
    /// subdirectory it had under the source root.
    ///
    /// Never fails as a whole; problems end up in the outcome.
    pub async fn execute(
        &self,
        resolution: &ResolutionResult,
        type_label: &str,
        dest_root: &Path,
        reporter: &Reporter,
    ) -> MoveOutcome {
        let filename = resolution.source_filename.as_str();
        let outcome = |status: MoveStatus, detail: String| {
            MoveOutcome::new(filename, type_label, status, detail)
                .with_category(resolution.category_key.clone())
        };

        let name = match RelativeName::parse(filename) {
            Ok(name) => name,
            Err(reason) => {
                reporter.error(format!("  Error: {}", reason)).await;
                return outcome(MoveStatus::Error, reason);
            }
        };

        let source = match self.find_source(&name).await {
            Some(source) => source,
            None => {
                let detail = format!(
                    "not found in source folder '{}'",
                    self.source_root.display()
                );
                reporter
                    .warn(format!("  Skipped: '{}' {}", filename, detail))
                    .await;
                return outcome(MoveStatus::SkippedNotFound, detail);
            }
        };

        let dest_dir = dest_root.join(&name.subdir);
        if let Err(e) = fs::create_dir_all(&dest_dir).await {
            let detail = format!("failed to create '{}': {}", dest_dir.display(), e);
            reporter.error(format!("  Error: {}", detail)).await;
            return outcome(MoveStatus::Error, detail);
        }

        let destination = dest_dir.join(&name.leaf);
        let replacing = fs::try_exists(&destination).await.unwrap_or(false);
        if replacing {
            reporter
                .warn(format!(
                    "  Warning: '{}' already exists and will be overwritten",
                    destination.display()
                ))
                .await;
        }

        match relocate(&source, &destination).await {
            Ok(()) => {
                reporter
                    .info(format!(
                        "  Moved: '{}' -> '{}'",
                        filename,
                        destination.display()
                    ))
                    .await;
                let status = if replacing {
                    MoveStatus::Overwritten
                } else {
                    MoveStatus::Moved
                };
                outcome(status, destination.display().to_string()).with_destination(destination)
            }
            Err(e) => {
                let detail = e.to_string();
                reporter.error(format!("  Error: {}", detail)).await;
                outcome(MoveStatus::Error, detail)
            }
        }
    }

    /// Full relative path first, then the bare file name at the root
    async fn find_source(&self, name: &RelativeName) -> Option<PathBuf> {
        let full = self.source_root.join(name.relative_path());
        if is_file(&full).await {
            return Some(full);
        }
        if name.subdir.as_os_str().is_empty() {
            return None;
        }

        let bare = self.source_root.join(&name.leaf);
        if is_file(&bare).await {
            debug!("Found '{}' by file name only", name.leaf);
            return Some(bare);
        }
        None
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Why a file could not be moved
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("failed to move '{from}': {error}")]
    Move { from: PathBuf, error: io::Error },

    #[error("copied to '{to}' but could not remove '{from}': {error}; the file now exists in both places")]
    SourceKept {
        from: PathBuf,
        to: PathBuf,
        error: io::Error,
    },
}

/// Rename, or copy across when source and destination are on different devices.
async fn relocate(source: &Path, destination: &Path) -> Result<(), RelocateError> {
    match fs::rename(source, destination).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "rename {} -> {} crosses devices, copying instead",
                source.display(),
                destination.display()
            );
            copy_across(source, destination).await
        }
        Err(e) => Err(RelocateError::Move {
            from: source.to_path_buf(),
            error: e,
        }),
    }
}

/// Copy through a hidden temp file next to `destination`, then remove the source.
async fn copy_across(source: &Path, destination: &Path) -> Result<(), RelocateError> {
    let failed = |error: io::Error| RelocateError::Move {
        from: source.to_path_buf(),
        error,
    };

    let dir = destination.parent().unwrap_or_else(|| Path::new("."));
    let leaf = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{}.{}.partial", leaf, Uuid::new_v4()));

    if let Err(e) = fs::copy(source, &temp).await {
        let _ = fs::remove_file(&temp).await;
        return Err(failed(e));
    }
    if let Err(e) = fs::rename(&temp, destination).await {
        let _ = fs::remove_file(&temp).await;
        return Err(failed(e));
    }

    finish_copy(source, destination, fs::remove_file(source).await)
}

/// A copy only counts as a move once the source is gone
fn finish_copy(
    source: &Path,
    destination: &Path,
    removed: io::Result<()>,
) -> Result<(), RelocateError> {
    removed.map_err(|error| {
        warn!("Source {} left behind after copy: {}", source.display(), error);
        RelocateError::SourceKept {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            error,
        }
    })
}
