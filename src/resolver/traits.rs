use crate::resolver::models::ResolutionTier;

/// One step of the label resolution chain.
///
/// Strategies are pure lookups: no I/O, no shared mutable state. The chain
/// asks each one in order and keeps the first answer.
pub trait ResolutionStrategy: Send + Sync {
    /// Identifier used in logs (e.g. "catalog-output-types")
    fn id(&self) -> &'static str;

    /// Tier recorded on results produced by this strategy
    fn tier(&self) -> ResolutionTier;

    /// Category key for `label`, if this strategy knows it
    fn resolve(&self, label: &str) -> Option<String>;
}
