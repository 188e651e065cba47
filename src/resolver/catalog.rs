//! Reference catalog of loader nodes and their declared output types

use crate::utils::MoverError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// One node description. Fields other than `output_types` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub output_types: Vec<String>,
}

/// Catalog keyed by node type label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl ReferenceCatalog {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, outputs)| {
                    (
                        label.into(),
                        CatalogEntry {
                            output_types: outputs.into_iter().map(Into::into).collect(),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a catalog file. Missing or malformed files are fatal setup errors.
    pub async fn load(path: &Path) -> Result<Self, MoverError> {
        let json = fs::read_to_string(path)
            .await
            .map_err(|e| MoverError::Catalog {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let catalog = Self::from_json_str(&json).map_err(|e| MoverError::Catalog {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Loaded reference catalog with {} entries", catalog.len());
        Ok(catalog)
    }

    /// Declared output types for `label`, in listed order
    pub fn output_types(&self, label: &str) -> Option<&[String]> {
        self.entries.get(label).map(|e| e.output_types.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let json = r#"{
            "LoraLoader": {"output_types": ["MODEL", "CLIP"], "category": "loaders"},
            "Empty": {}
        }"#;
        let catalog = ReferenceCatalog::from_json_str(json).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.output_types("LoraLoader"),
            Some(&["MODEL".to_string(), "CLIP".to_string()][..])
        );
        assert_eq!(catalog.output_types("Empty"), Some(&[][..]));
        assert_eq!(catalog.output_types("Missing"), None);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_catalog_error() {
        let err = ReferenceCatalog::load(Path::new("/no/such/extracted_models.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, MoverError::Catalog { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_json_is_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted_models.json");
        tokio::fs::write(&path, "[not an object").await.unwrap();

        let err = ReferenceCatalog::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("extracted_models.json"));
    }
}
