use crate::resolver::catalog::ReferenceCatalog;
use crate::resolver::models::ResolutionTier;
use crate::resolver::tables::ResolutionTables;
use crate::resolver::traits::ResolutionStrategy;
use std::sync::Arc;

/// Catalog entry → declared output types → output-type table.
///
/// Output types are tried in the order the catalog lists them.
pub struct CatalogStrategy {
    catalog: Arc<ReferenceCatalog>,
    tables: Arc<ResolutionTables>,
}

impl CatalogStrategy {
    pub fn new(catalog: Arc<ReferenceCatalog>, tables: Arc<ResolutionTables>) -> Self {
        Self { catalog, tables }
    }
}

impl ResolutionStrategy for CatalogStrategy {
    fn id(&self) -> &'static str {
        "catalog-output-types"
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Primary
    }

    fn resolve(&self, label: &str) -> Option<String> {
        self.catalog
            .output_types(label)?
            .iter()
            .find_map(|out| self.tables.category_for_output_type(out))
            .map(str::to_string)
    }
}

/// Curated node-type table, exact match
pub struct NodeTypeStrategy {
    tables: Arc<ResolutionTables>,
}

impl NodeTypeStrategy {
    pub fn new(tables: Arc<ResolutionTables>) -> Self {
        Self { tables }
    }
}

impl ResolutionStrategy for NodeTypeStrategy {
    fn id(&self) -> &'static str {
        "node-type-table"
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Secondary
    }

    fn resolve(&self, label: &str) -> Option<String> {
        self.tables
            .category_for_node_type(label)
            .map(str::to_string)
    }
}

/// Takes the label itself as the category key (line-pairs input).
///
/// Any well-formed key is accepted; whether the host has a folder for it
/// is up to the destination locator.
#[derive(Debug, Default)]
pub struct CategoryKeyStrategy;

impl CategoryKeyStrategy {
    pub fn new() -> Self {
        Self
    }
}

fn is_well_formed_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

impl ResolutionStrategy for CategoryKeyStrategy {
    fn id(&self) -> &'static str {
        "category-key"
    }

    fn tier(&self) -> ResolutionTier {
        ResolutionTier::Fallback
    }

    fn resolve(&self, label: &str) -> Option<String> {
        let key = label.trim().to_lowercase();
        is_well_formed_key(&key).then_some(key)
    }
}
