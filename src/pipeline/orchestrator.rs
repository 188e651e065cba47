use crate::metadata::{parse_source, MetadataEntry};
use crate::mover::{
    is_artifact, DestinationLocator, MoveExecutor, MoveOutcome, MoveStatus, RunSummary,
};
use crate::pipeline::{PipelineEvent, Reporter, RunContext};
use crate::resolver::TypeResolver;
use crate::utils::MoverError;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs one pass over a metadata mapping: resolve, locate, filter, move
pub struct Orchestrator {
    run_id: String,
    context: RunContext,
    reporter: Reporter,
}

impl Orchestrator {
    pub fn new(run_id: impl Into<String>, context: RunContext, reporter: Reporter) -> Self {
        Self {
            run_id: run_id.into(),
            context,
            reporter,
        }
    }

    /// Execute the run.
    ///
    /// Errors are returned only for setup failures, before any file is
    /// touched. Per-file problems are recorded in the summary.
    pub async fn run(mut self) -> Result<RunSummary, MoverError> {
        let mut summary = RunSummary::new(self.run_id.clone());

        let source_root = absolute_dir(&self.context.settings.source_root)
            .ok_or_else(|| MoverError::InvalidSourceRoot(self.context.settings.source_root.clone()))?;
        let host_root = absolute_dir(&self.context.settings.host_root)
            .ok_or_else(|| MoverError::InvalidHostRoot(self.context.settings.host_root.clone()))?;
        info!(
            "Run {}: source {} -> host {}",
            self.run_id,
            source_root.display(),
            host_root.display()
        );

        let mapping = parse_source(&self.context.settings.metadata, &self.reporter).await?;
        if mapping.is_empty() {
            self.reporter
                .info("No model entries to process.")
                .await;
            summary.finish();
            return Ok(summary);
        }

        if let Err(e) = self.context.registry.init(&host_root).await {
            self.reporter
                .error(format!("Error: could not initialize folder registry: {}", e))
                .await;
            return Err(MoverError::RegistryInit(e.to_string()));
        }

        let resolver = TypeResolver::for_mode(
            self.context.settings.metadata.mode,
            self.context.catalog.clone(),
            self.context.tables.clone(),
        );
        debug!("Resolution chain: {:?}", resolver.strategy_ids());

        let mut locator = DestinationLocator::new(
            self.context.registry.as_ref(),
            self.context.tables.as_ref(),
            &host_root,
        );
        let executor = MoveExecutor::new(&source_root);

        let total = mapping.len();
        self.reporter
            .info(format!(
                "Processing {} entries from '{}'...",
                total,
                source_root.display()
            ))
            .await;

        for (index, entry) in mapping.iter().enumerate() {
            self.reporter
                .info(format!(
                    "[{}/{}] Checking: '{}' (type: '{}')",
                    index + 1,
                    total,
                    entry.source_filename,
                    entry.type_label
                ))
                .await;

            let outcome = process_entry(entry, &resolver, &mut locator, &executor, &self.reporter).await;
            self.reporter
                .send(PipelineEvent::Outcome(outcome.clone()))
                .await;
            summary.record(outcome);
        }

        summary.finish();
        report_summary(&summary, &self.reporter).await;
        Ok(summary)
    }
}

async fn process_entry(
    entry: &MetadataEntry,
    resolver: &TypeResolver,
    locator: &mut DestinationLocator<'_>,
    executor: &MoveExecutor,
    reporter: &Reporter,
) -> MoveOutcome {
    let filename = entry.source_filename.as_str();
    let label = entry.type_label.as_str();

    let Some(resolution) = resolver.resolve(entry) else {
        reporter
            .warn(format!(
                "  Skipped: no folder mapping for type '{}' ('{}')",
                label, filename
            ))
            .await;
        return MoveOutcome::new(
            filename,
            label,
            MoveStatus::SkippedNoMapping,
            format!("type '{}' has no folder mapping", label),
        );
    };
    debug!(
        "'{}' resolved to '{}' via {} tier",
        filename,
        resolution.category_key,
        resolution.tier.as_str()
    );

    let dest_root = match locator.locate(&resolution.category_key, reporter).await {
        Ok(dest_root) => dest_root,
        Err(e) => {
            reporter
                .warn(format!("  Skipped: '{}': {}", filename, e))
                .await;
            return MoveOutcome::new(
                filename,
                label,
                MoveStatus::SkippedNoDestination,
                e.to_string(),
            )
            .with_category(resolution.category_key);
        }
    };

    if !is_artifact(filename) {
        reporter
            .info(format!(
                "  Skipped: '{}' does not look like a model file",
                filename
            ))
            .await;
        return MoveOutcome::new(
            filename,
            label,
            MoveStatus::SkippedNotArtifact,
            "not a model file",
        )
        .with_category(resolution.category_key);
    }

    executor.execute(&resolution, label, &dest_root, reporter).await
}

async fn report_summary(summary: &RunSummary, reporter: &Reporter) {
    reporter.info("--- Move operation summary ---").await;
    reporter
        .info(format!(
            "Moved: {} (overwritten: {})",
            summary.moved, summary.overwritten
        ))
        .await;
    reporter
        .info(format!(
            "Skipped: {} (no mapping: {}, not a model file: {}, not found: {}, no destination: {})",
            summary.skipped,
            summary.skipped_no_mapping,
            summary.skipped_not_artifact,
            summary.skipped_not_found,
            summary.skipped_no_destination
        ))
        .await;
    if !summary.unresolved_labels.is_empty() {
        let labels: Vec<&str> = summary.unresolved_labels.iter().map(String::as_str).collect();
        reporter
            .warn(format!("Unmapped types: {}", labels.join(", ")))
            .await;
    }
    if summary.has_errors() {
        reporter
            .error(format!("Errors: {}", summary.errors))
            .await;
    } else {
        reporter.info("Errors: 0").await;
    }
}

fn absolute_dir(path: &Path) -> Option<PathBuf> {
    let absolute = path.absolutize().ok()?.into_owned();
    absolute.is_dir().then_some(absolute)
}
