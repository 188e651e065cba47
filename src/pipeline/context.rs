use crate::registry::FolderRegistry;
use crate::resolver::{ReferenceCatalog, ResolutionTables};
use crate::utils::RunSettings;
use std::sync::Arc;

/// Everything one run needs, owned by that run's orchestrator
pub struct RunContext {
    pub settings: RunSettings,
    pub registry: Box<dyn FolderRegistry>,
    /// Present only when a catalog path was configured
    pub catalog: Option<Arc<ReferenceCatalog>>,
    pub tables: Arc<ResolutionTables>,
}

impl RunContext {
    pub fn new(settings: RunSettings, registry: Box<dyn FolderRegistry>) -> Self {
        Self {
            settings,
            registry,
            catalog: None,
            tables: Arc::new(ResolutionTables::default()),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<ReferenceCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_tables(mut self, tables: Arc<ResolutionTables>) -> Self {
        self.tables = tables;
        self
    }
}
