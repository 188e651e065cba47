use serde::{Deserialize, Serialize};

/// Which strategy produced a category key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionTier {
    /// Derived from the reference catalog's declared output types
    Primary,
    /// Curated node-type table
    Secondary,
    /// Label already is a known category key
    Fallback,
}

impl ResolutionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Primary => "primary",
            ResolutionTier::Secondary => "secondary",
            ResolutionTier::Fallback => "fallback",
        }
    }
}

/// A metadata entry bound to a destination category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub source_filename: String,
    /// Lowercase category key
    pub category_key: String,
    pub tier: ResolutionTier,
}
