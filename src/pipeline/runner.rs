use crate::mover::RunSummary;
use crate::pipeline::{Orchestrator, PipelineEvent, Reporter, RunContext};
use crate::registry::FolderRegistry;
use crate::resolver::{ReferenceCatalog, ResolutionTables};
use crate::utils::{MoverError, RunSettings};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

/// Starts runs on background tasks, one at a time.
///
/// Loaded catalogs are kept for the runner's lifetime, keyed by path.
#[derive(Clone)]
pub struct PipelineRunner {
    active: Arc<AtomicBool>,
    catalogs: Arc<Mutex<HashMap<PathBuf, Arc<ReferenceCatalog>>>>,
    tables: Arc<ResolutionTables>,
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRunner {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            catalogs: Arc::new(Mutex::new(HashMap::new())),
            tables: Arc::new(ResolutionTables::default()),
        }
    }

    pub fn with_tables(mut self, tables: ResolutionTables) -> Self {
        self.tables = Arc::new(tables);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start a run. Must be called from within a tokio runtime.
    pub fn start(
        &self,
        settings: RunSettings,
        registry: Box<dyn FolderRegistry>,
    ) -> Result<RunHandle, MoverError> {
        let guard = BusyGuard::acquire(self.active.clone()).ok_or(MoverError::Busy)?;

        let run_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(settings.event_buffer.max(1));
        let catalogs = self.catalogs.clone();
        let tables = self.tables.clone();
        let task_run_id = run_id.clone();

        let task = tokio::spawn(async move {
            let reporter = Reporter::new(tx);
            reporter
                .send(PipelineEvent::Started {
                    run_id: task_run_id.clone(),
                })
                .await;

            let result =
                run_pipeline(task_run_id, settings, registry, catalogs, tables, &reporter).await;

            // Free the runner before the final event goes out
            drop(guard);

            match &result {
                Ok(summary) => {
                    info!(
                        "Run {} finished: {} moved, {} skipped, {} errors",
                        summary.run_id, summary.moved, summary.skipped, summary.errors
                    );
                    reporter.send(PipelineEvent::Finished(summary.clone())).await;
                }
                Err(e) => {
                    error!("Run aborted: {}", e);
                    reporter.send(PipelineEvent::Aborted(e.to_string())).await;
                }
            }
            result
        });

        Ok(RunHandle {
            run_id,
            events: rx,
            task,
        })
    }
}

async fn run_pipeline(
    run_id: String,
    settings: RunSettings,
    registry: Box<dyn FolderRegistry>,
    catalogs: Arc<Mutex<HashMap<PathBuf, Arc<ReferenceCatalog>>>>,
    tables: Arc<ResolutionTables>,
    reporter: &Reporter,
) -> Result<RunSummary, MoverError> {
    let catalog = match settings.catalog_path.clone() {
        Some(path) => match cached_catalog(&catalogs, &path).await {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                reporter.error(format!("Error: {}", e)).await;
                return Err(e);
            }
        },
        None => None,
    };

    let mut context = RunContext::new(settings, registry).with_tables(tables);
    if let Some(catalog) = catalog {
        context = context.with_catalog(catalog);
    }

    Orchestrator::new(run_id, context, reporter.clone()).run().await
}

async fn cached_catalog(
    catalogs: &Mutex<HashMap<PathBuf, Arc<ReferenceCatalog>>>,
    path: &Path,
) -> Result<Arc<ReferenceCatalog>, MoverError> {
    let mut cache = catalogs.lock().await;
    if let Some(catalog) = cache.get(path) {
        return Ok(catalog.clone());
    }
    let catalog = Arc::new(ReferenceCatalog::load(path).await?);
    cache.insert(path.to_path_buf(), catalog.clone());
    Ok(catalog)
}

/// Marks the runner busy for as long as it lives
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Receiving end of a started run
pub struct RunHandle {
    pub run_id: String,
    events: mpsc::Receiver<PipelineEvent>,
    task: JoinHandle<Result<RunSummary, MoverError>>,
}

impl RunHandle {
    /// Next event in emission order; `None` once the run is over
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.recv().await
    }

    /// Wait for the run, discarding any unread events
    pub async fn wait(self) -> Result<RunSummary, MoverError> {
        self.collect().await.1
    }

    /// Drain all remaining events, then return them with the run result
    pub async fn collect(mut self) -> (Vec<PipelineEvent>, Result<RunSummary, MoverError>) {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        let result = match self.task.await {
            Ok(result) => result,
            Err(e) => Err(MoverError::OperationFailed(format!("run task failed: {}", e))),
        };
        (events, result)
    }
}
