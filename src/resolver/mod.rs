//! Type label → category key resolution

pub mod catalog;
pub mod chain;
pub mod models;
pub mod strategies;
pub mod tables;
pub mod traits;

pub use catalog::{CatalogEntry, ReferenceCatalog};
pub use chain::TypeResolver;
pub use models::{ResolutionResult, ResolutionTier};
pub use strategies::{CategoryKeyStrategy, CatalogStrategy, NodeTypeStrategy};
pub use tables::ResolutionTables;
pub use traits::ResolutionStrategy;
