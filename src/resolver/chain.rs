use crate::metadata::{MetadataEntry, ParseMode};
use crate::resolver::catalog::ReferenceCatalog;
use crate::resolver::models::{ResolutionResult, ResolutionTier};
use crate::resolver::strategies::{CategoryKeyStrategy, CatalogStrategy, NodeTypeStrategy};
use crate::resolver::tables::ResolutionTables;
use crate::resolver::traits::ResolutionStrategy;
use std::sync::Arc;
use tracing::debug;

/// Ordered chain of resolution strategies; the first strategy with an answer wins
pub struct TypeResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl TypeResolver {
    pub fn new(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Standard chain for a metadata mode.
    ///
    /// The catalog strategy is present only when a catalog was loaded. The
    /// category-key strategy is only used for line-pairs input, whose labels
    /// are destination keys rather than node types.
    pub fn for_mode(
        mode: ParseMode,
        catalog: Option<Arc<ReferenceCatalog>>,
        tables: Arc<ResolutionTables>,
    ) -> Self {
        let mut strategies: Vec<Box<dyn ResolutionStrategy>> = Vec::new();
        if let Some(catalog) = catalog {
            strategies.push(Box::new(CatalogStrategy::new(catalog, tables.clone())));
        }
        strategies.push(Box::new(NodeTypeStrategy::new(tables)));
        if mode == ParseMode::LinePairs {
            strategies.push(Box::new(CategoryKeyStrategy::new()));
        }
        Self::new(strategies)
    }

    /// Lowercase category key and the tier that produced it
    pub fn resolve_label(&self, label: &str) -> Option<(String, ResolutionTier)> {
        for strategy in &self.strategies {
            if let Some(key) = strategy.resolve(label) {
                debug!("Label '{}' resolved by {} -> '{}'", label, strategy.id(), key);
                return Some((key.to_lowercase(), strategy.tier()));
            }
        }
        debug!("Label '{}' not resolvable", label);
        None
    }

    pub fn resolve(&self, entry: &MetadataEntry) -> Option<ResolutionResult> {
        self.resolve_label(&entry.type_label)
            .map(|(category_key, tier)| ResolutionResult {
                source_filename: entry.source_filename.clone(),
                category_key,
                tier,
            })
    }

    pub fn strategy_ids(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.id()).collect()
    }
}
