use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Final state of one candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveStatus {
    Moved,
    /// Moved, replacing an existing file at the destination
    Overwritten,
    SkippedNoMapping,
    SkippedNotArtifact,
    SkippedNotFound,
    SkippedNoDestination,
    Error,
}

impl MoveStatus {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveStatus::Moved | MoveStatus::Overwritten)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            MoveStatus::SkippedNoMapping
                | MoveStatus::SkippedNotArtifact
                | MoveStatus::SkippedNotFound
                | MoveStatus::SkippedNoDestination
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveStatus::Moved => "moved",
            MoveStatus::Overwritten => "overwritten",
            MoveStatus::SkippedNoMapping => "skipped: no mapping",
            MoveStatus::SkippedNotArtifact => "skipped: not a model file",
            MoveStatus::SkippedNotFound => "skipped: not found",
            MoveStatus::SkippedNoDestination => "skipped: no destination",
            MoveStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// File name as written in the metadata
    pub filename: String,
    pub type_label: String,
    pub category_key: Option<String>,
    pub status: MoveStatus,
    pub detail: String,
    pub destination: Option<PathBuf>,
}

impl MoveOutcome {
    pub fn new(
        filename: impl Into<String>,
        type_label: impl Into<String>,
        status: MoveStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            type_label: type_label.into(),
            category_key: None,
            status,
            detail: detail.into(),
            destination: None,
        }
    }

    pub fn with_category(mut self, key: impl Into<String>) -> Self {
        self.category_key = Some(key.into());
        self
    }

    pub fn with_destination(mut self, destination: PathBuf) -> Self {
        self.destination = Some(destination);
        self
    }
}

/// Counts for a finished run.
///
/// `moved` includes overwrites; `skipped` is the sum of the per-reason counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub moved: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub errors: usize,
    pub skipped_no_mapping: usize,
    pub skipped_not_artifact: usize,
    pub skipped_not_found: usize,
    pub skipped_no_destination: usize,
    /// Labels no strategy could resolve
    pub unresolved_labels: BTreeSet<String>,
    pub outcomes: Vec<MoveOutcome>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: MoveOutcome) {
        match outcome.status {
            MoveStatus::Moved => self.moved += 1,
            MoveStatus::Overwritten => {
                self.moved += 1;
                self.overwritten += 1;
            }
            MoveStatus::SkippedNoMapping => {
                self.skipped_no_mapping += 1;
                self.unresolved_labels.insert(outcome.type_label.clone());
            }
            MoveStatus::SkippedNotArtifact => self.skipped_not_artifact += 1,
            MoveStatus::SkippedNotFound => self.skipped_not_found += 1,
            MoveStatus::SkippedNoDestination => self.skipped_no_destination += 1,
            MoveStatus::Error => self.errors += 1,
        }
        if outcome.status.is_skipped() {
            self.skipped += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Candidates considered
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcome_for(&self, filename: &str) -> Option<&MoveOutcome> {
        self.outcomes.iter().find(|o| o.filename == filename)
    }
}
