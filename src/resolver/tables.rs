//! Static vocabularies used to resolve labels and locate folders

use std::collections::HashMap;

/// Catalog output type (uppercase) → category key
const OUTPUT_TYPE_CATEGORIES: &[(&str, &str)] = &[
    ("MODEL", "checkpoints"),
    ("VAE", "vae"),
    ("CLIP", "clip"),
    ("CONTROL_NET", "controlnet"),
    ("LORA", "loras"),
    ("UPSCALE_MODEL", "upscale_models"),
    ("STYLE_MODEL", "style_models"),
    ("GLIGEN", "gligen"),
    ("CLIP_VISION", "clip_vision"),
    ("HYPERNETWORK", "hypernetworks"),
    ("UNET", "unet"),
    ("PHOTOMAKER", "photomaker"),
    ("SAM_MODEL", "sams"),
    ("MOTION_MODULE", "animatediff_models"),
    ("AUTOENCODER", "vae"),
    ("SAM2_MODEL", "sams"),
    ("GROUNDING_DINO_MODEL", "grounding-dino"),
];

/// Loader node type (exact) → category key
const NODE_TYPE_CATEGORIES: &[(&str, &str)] = &[
    ("CheckpointLoaderSimple", "checkpoints"),
    ("CheckpointLoader", "checkpoints"),
    ("LoraLoaderModelOnly", "loras"),
    ("LoraLoader", "loras"),
    ("VAELoader", "vae"),
    ("ControlNetLoader", "controlnet"),
    ("UpscaleModelLoader", "upscale_models"),
    ("CLIPLoader", "clip"),
    ("DualCLIPLoader", "clip"),
    ("CLIPLoaderGGUF", "clip"),
    ("UnetLoaderGGUF", "unet"),
    ("InstantIDModelLoader", "instantid"),
];

/// Category key → subdirectory under `<host>/models` when the registry does not know the key
const FALLBACK_SUBDIRS: &[(&str, &str)] = &[
    ("instantid", "instantid"),
    ("ipadapter", "ipadapter"),
    ("animatediff_models", "animatediff_models"),
    ("sams", "sams"),
    ("grounding-dino", "grounding-dino"),
    ("insightface", "insightface"),
    ("checkpoints", "checkpoints"),
    ("loras", "loras"),
    ("vae", "vae"),
    ("clip", "clip"),
    ("unet", "unet"),
    ("controlnet", "controlnet"),
    ("upscale_models", "upscale_models"),
    ("clip_vision", "clip_vision"),
    ("style_models", "style_models"),
    ("embeddings", "embeddings"),
    ("gligen", "gligen"),
    ("hypernetworks", "hypernetworks"),
    ("photomaker", "photomaker"),
];

/// The three lookup tables consulted during a run.
///
/// `Default` carries the built-in vocabularies; tests and embedders can
/// build their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTables {
    output_types: HashMap<String, String>,
    node_types: HashMap<String, String>,
    fallback_subdirs: HashMap<String, String>,
}

impl Default for ResolutionTables {
    fn default() -> Self {
        Self::new(OUTPUT_TYPE_CATEGORIES, NODE_TYPE_CATEGORIES, FALLBACK_SUBDIRS)
    }
}

impl ResolutionTables {
    pub fn new(
        output_types: &[(&str, &str)],
        node_types: &[(&str, &str)],
        fallback_subdirs: &[(&str, &str)],
    ) -> Self {
        Self {
            output_types: output_types
                .iter()
                .map(|(k, v)| (k.to_uppercase(), v.to_lowercase()))
                .collect(),
            node_types: node_types
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_lowercase()))
                .collect(),
            fallback_subdirs: fallback_subdirs
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
        }
    }

    /// Category for a declared output type, matched case-insensitively
    pub fn category_for_output_type(&self, output_type: &str) -> Option<&str> {
        self.output_types
            .get(&output_type.to_uppercase())
            .map(String::as_str)
    }

    /// Category for a node type, matched exactly
    pub fn category_for_node_type(&self, node_type: &str) -> Option<&str> {
        self.node_types.get(node_type).map(String::as_str)
    }

    pub fn fallback_subdir(&self, category_key: &str) -> Option<&str> {
        self.fallback_subdirs
            .get(&category_key.to_lowercase())
            .map(String::as_str)
    }
}
