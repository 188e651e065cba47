//! Decides whether a metadata filename names a movable model file

/// Extensions of model weight files
pub const ARTIFACT_EXTENSIONS: &[&str] = &[
    ".safetensors",
    ".ckpt",
    ".pt",
    ".pth",
    ".bin",
    ".onnx",
    ".gguf",
    ".sft",
];

/// Configuration files that loaders also reference but which are never moved
pub const CONFIG_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".json", ".toml"];

/// Placeholder values that loader widgets show instead of a file
pub const SENTINEL_NAMES: &[&str] = &["none", "baked vae", "default", "taesd", "taesdxl", "taef1"];

/// True when `filename` looks like a model artifact. Unknown extensions are rejected.
pub fn is_artifact(filename: &str) -> bool {
    let name = filename.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }

    let leaf = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(&name);
    if SENTINEL_NAMES.contains(&leaf) || SENTINEL_NAMES.contains(&name.as_str()) {
        return false;
    }

    if CONFIG_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return false;
    }

    ARTIFACT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}
