//! ComfyUI model folder layout
//!
//! Mirrors ComfyUI's built-in `folder_names_and_paths` table, including the
//! legacy `clip`/`unet` names, and merges the optional
//! `extra_model_paths.yaml` found in the installation root.

use super::{FolderRegistry, RegistryError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File ComfyUI reads additional model folders from
pub const EXTRA_PATHS_FILE: &str = "extra_model_paths.yaml";

/// Built-in category → folders relative to `<root>/models`
const BUILTIN_FOLDERS: &[(&str, &[&str])] = &[
    ("checkpoints", &["checkpoints"]),
    ("configs", &["configs"]),
    ("loras", &["loras"]),
    ("vae", &["vae"]),
    ("text_encoders", &["text_encoders", "clip"]),
    ("diffusion_models", &["unet", "diffusion_models"]),
    ("clip_vision", &["clip_vision"]),
    ("style_models", &["style_models"]),
    ("embeddings", &["embeddings"]),
    ("diffusers", &["diffusers"]),
    ("vae_approx", &["vae_approx"]),
    ("controlnet", &["controlnet", "t2i_adapter"]),
    ("gligen", &["gligen"]),
    ("upscale_models", &["upscale_models"]),
    ("hypernetworks", &["hypernetworks"]),
    ("photomaker", &["photomaker"]),
    ("classifiers", &["classifiers"]),
];

/// Old category names still accepted by ComfyUI
const LEGACY_NAMES: &[(&str, &str)] = &[("clip", "text_encoders"), ("unet", "diffusion_models")];

fn canonical_key(key: &str) -> String {
    let key = key.to_lowercase();
    LEGACY_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, current)| current.to_string())
        .unwrap_or(key)
}

/// Folder registry for a ComfyUI installation
#[derive(Debug, Clone)]
pub struct ComfyFolderRegistry {
    base_dir: PathBuf,
    folders: HashMap<String, Vec<PathBuf>>,
}

impl ComfyFolderRegistry {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let models_dir = base_dir.join("models");

        let folders = BUILTIN_FOLDERS
            .iter()
            .map(|(key, subdirs)| {
                let paths = subdirs.iter().map(|s| models_dir.join(s)).collect();
                (key.to_string(), paths)
            })
            .collect();

        Self { base_dir, folders }
    }

    /// Register a folder for `key`. Default folders go to the front of the list.
    pub fn add_folder(&mut self, key: &str, path: PathBuf, is_default: bool) {
        let paths = self.folders.entry(canonical_key(key)).or_default();
        if let Some(pos) = paths.iter().position(|p| *p == path) {
            if !is_default {
                return;
            }
            paths.remove(pos);
        }
        if is_default {
            paths.insert(0, path);
        } else {
            paths.push(path);
        }
    }

    /// Merge an `extra_model_paths.yaml` document. Returns how many folders were added.
    ///
    /// Each top-level section may set `base_path` (relative paths resolve
    /// against `yaml_dir`) and `is_default`; every other string field is a
    /// category key with one folder per line.
    pub fn apply_extra_paths(&mut self, yaml: &str, yaml_dir: &Path) -> Result<usize, RegistryError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| RegistryError::Failed(format!("invalid {}: {}", EXTRA_PATHS_FILE, e)))?;

        let Some(sections) = doc.as_mapping() else {
            return Ok(0);
        };

        let mut added = 0;
        for (name, section) in sections {
            let Some(section) = section.as_mapping() else {
                continue;
            };

            let base = match section.get("base_path").and_then(|v| v.as_str()) {
                Some(base) => yaml_dir.join(base.trim()),
                None => yaml_dir.to_path_buf(),
            };
            let is_default = section
                .get("is_default")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            for (key, value) in section {
                let (Some(key), Some(value)) = (key.as_str(), value.as_str()) else {
                    continue;
                };
                if key == "base_path" || key == "is_default" {
                    continue;
                }

                for line in value.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    let path = base.join(line);
                    debug!("Extra path [{:?}] {} -> {:?}", name.as_str(), key, path);
                    self.add_folder(key, path, is_default);
                    added += 1;
                }
            }
        }

        Ok(added)
    }
}

#[async_trait]
impl FolderRegistry for ComfyFolderRegistry {
    fn id(&self) -> &'static str {
        "comfyui"
    }

    async fn init(&mut self, host_root: &Path) -> Result<(), RegistryError> {
        let is_dir = fs::metadata(host_root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(RegistryError::Failed(format!(
                "ComfyUI path '{}' is not a valid directory",
                host_root.display()
            )));
        }
        if host_root != self.base_dir {
            *self = Self::new(host_root);
        }

        let extra = host_root.join(EXTRA_PATHS_FILE);
        let has_extra = fs::metadata(&extra)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if has_extra {
            let yaml = fs::read_to_string(&extra)
                .await
                .map_err(|e| RegistryError::Failed(format!("{}: {}", extra.display(), e)))?;
            let added = self.apply_extra_paths(&yaml, host_root)?;
            info!("Loaded {} extra model folders from {:?}", added, extra);
        }

        Ok(())
    }

    async fn folder_paths(&self, key: &str) -> Result<Vec<PathBuf>, RegistryError> {
        self.folders
            .get(&canonical_key(key))
            .cloned()
            .ok_or_else(|| RegistryError::UnknownKey(key.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_lookup() {
        let registry = ComfyFolderRegistry::new("/comfy");
        assert_eq!(
            registry.folder_paths("loras").await.unwrap(),
            vec![PathBuf::from("/comfy/models/loras")]
        );
        assert_eq!(
            registry.folder_paths("controlnet").await.unwrap()[1],
            PathBuf::from("/comfy/models/t2i_adapter")
        );
    }

    #[tokio::test]
    async fn test_legacy_names() {
        let registry = ComfyFolderRegistry::new("/comfy");
        assert_eq!(
            registry.folder_paths("clip").await.unwrap()[0],
            PathBuf::from("/comfy/models/text_encoders")
        );
        assert_eq!(
            registry.folder_paths("UNET").await.unwrap()[0],
            PathBuf::from("/comfy/models/unet")
        );
    }

    #[test]
    fn test_unknown_key() {
        let registry = ComfyFolderRegistry::new("/comfy");
        let err = tokio_test::block_on(registry.folder_paths("InstantID")).unwrap_err();
        assert_eq!(err, RegistryError::UnknownKey("instantid".to_string()));
    }

    #[tokio::test]
    async fn test_extra_paths_default_and_appended() {
        let mut registry = ComfyFolderRegistry::new("/comfy");
        let yaml = r#"
a111:
    base_path: /sd
    checkpoints: models/Stable-diffusion
    loras: |
        models/Lora
        models/LyCORIS
    ipadapter: models/ipadapter
preferred:
    base_path: /fast
    is_default: true
    loras: loras
"#;
        let added = registry.apply_extra_paths(yaml, Path::new("/comfy")).unwrap();
        assert_eq!(added, 5);

        let loras = registry.folder_paths("loras").await.unwrap();
        assert_eq!(
            loras,
            vec![
                PathBuf::from("/fast/loras"),
                PathBuf::from("/comfy/models/loras"),
                PathBuf::from("/sd/models/Lora"),
                PathBuf::from("/sd/models/LyCORIS"),
            ]
        );
        assert_eq!(
            registry.folder_paths("ipadapter").await.unwrap(),
            vec![PathBuf::from("/sd/models/ipadapter")]
        );
    }

    #[test]
    fn test_extra_paths_invalid_yaml() {
        let mut registry = ComfyFolderRegistry::new("/comfy");
        let err = registry
            .apply_extra_paths("a: [unclosed", Path::new("/comfy"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Failed(_)));
    }

    #[tokio::test]
    async fn test_init_reads_extra_paths_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join(EXTRA_PATHS_FILE),
            "custom:\n    instantid: models/instantid\n",
        )
        .await
        .unwrap();

        let mut registry = ComfyFolderRegistry::new(dir.path());
        registry.init(dir.path()).await.unwrap();
        assert_eq!(
            registry.folder_paths("instantid").await.unwrap(),
            vec![dir.path().join("models/instantid")]
        );
    }

    #[tokio::test]
    async fn test_init_rejects_missing_root() {
        let mut registry = ComfyFolderRegistry::new("/no/such/comfy");
        let err = registry.init(Path::new("/no/such/comfy")).await.unwrap_err();
        assert!(err.to_string().contains("not a valid directory"));
    }
}
