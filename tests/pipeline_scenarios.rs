//! End-to-end runs over temp folders with an in-memory folder registry.

use async_trait::async_trait;
use modelmover::metadata::{MetadataSource, ParseMode};
use modelmover::{
    ComfyFolderRegistry, FolderRegistry, MoveStatus, PipelineEvent, PipelineRunner, RegistryError, RunSettings,
    RunSummary,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Knows `checkpoints`, `vae` and an empty `embeddings`; everything else is unknown
struct FakeRegistry {
    folders: HashMap<String, Vec<PathBuf>>,
    lookups: Arc<AtomicUsize>,
}

impl FakeRegistry {
    fn new(host: &Path) -> Self {
        let mut folders = HashMap::new();
        folders.insert(
            "checkpoints".to_string(),
            vec![host.join("models").join("checkpoints")],
        );
        folders.insert("vae".to_string(), vec![host.join("models").join("vae")]);
        folders.insert("embeddings".to_string(), Vec::new());
        Self {
            folders,
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FolderRegistry for FakeRegistry {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn folder_paths(&self, key: &str) -> Result<Vec<PathBuf>, RegistryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.folders
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownKey(key.to_string()))
    }
}

struct Fixture {
    source: TempDir,
    host: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            source: TempDir::new().expect("source dir"),
            host: TempDir::new().expect("host dir"),
        }
    }

    fn add_source(&self, relative: &str, contents: &[u8]) {
        let path = self.source.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn host_file(&self, relative: &str) -> PathBuf {
        self.host.path().join(relative)
    }

    fn settings(&self, metadata: MetadataSource) -> RunSettings {
        RunSettings::new(
            self.source.path().to_path_buf(),
            self.host.path().to_path_buf(),
            metadata,
        )
    }

    fn write_table(&self, rows: &[(&str, &str)]) -> PathBuf {
        let mut html = String::from(
            "<html><body><table id=\"modelTable\"><tr><th>文件名</th><th>节点类型</th></tr>",
        );
        for (file, label) in rows {
            html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", file, label));
        }
        html.push_str("</table></body></html>");

        let path = self.host.path().join("export.html");
        std::fs::write(&path, html).unwrap();
        path
    }
}

async fn run(settings: RunSettings, registry: FakeRegistry) -> RunSummary {
    run_with(settings, Box::new(registry)).await
}

async fn run_with(settings: RunSettings, registry: Box<dyn FolderRegistry>) -> RunSummary {
    let runner = PipelineRunner::new();
    let handle = runner.start(settings, registry).expect("start");
    handle.wait().await.expect("run completes")
}

#[tokio::test]
async fn moves_via_fallback_folder() {
    let fx = Fixture::new();
    fx.add_source("detail.safetensors", b"lora");
    let table = fx.write_table(&[("detail.safetensors", "LoraLoader")]);

    let summary = run(
        fx.settings(MetadataSource::new(table, ParseMode::Tabular)),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.moved, 1);
    assert_eq!(summary.overwritten, 0);
    assert_eq!(summary.errors, 0);
    assert!(fx.host_file("models/loras/detail.safetensors").is_file());
    assert!(!fx.source.path().join("detail.safetensors").exists());
}

#[tokio::test]
async fn overwrite_counts_as_moved_and_overwritten() {
    let fx = Fixture::new();
    fx.add_source("base.safetensors", b"new");
    std::fs::create_dir_all(fx.host_file("models/checkpoints")).unwrap();
    std::fs::write(fx.host_file("models/checkpoints/base.safetensors"), b"old").unwrap();
    let table = fx.write_table(&[("base.safetensors", "CheckpointLoaderSimple")]);

    let summary = run(
        fx.settings(MetadataSource::new(table, ParseMode::Tabular)),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.moved, 1);
    assert_eq!(summary.overwritten, 1);
    assert_eq!(
        std::fs::read(fx.host_file("models/checkpoints/base.safetensors")).unwrap(),
        b"new"
    );
}

#[tokio::test]
async fn ghost_file_is_skipped_not_an_error() {
    let fx = Fixture::new();
    let table = fx.write_table(&[("ghost.safetensors", "VAELoader")]);

    let summary = run(
        fx.settings(MetadataSource::new(table, ParseMode::Tabular)),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.errors, 0);
    assert_eq!(summary.skipped_not_found, 1);
    assert_eq!(
        summary.outcome_for("ghost.safetensors").unwrap().status,
        MoveStatus::SkippedNotFound
    );
}

#[tokio::test]
async fn unknown_label_is_skipped_while_others_move() {
    let fx = Fixture::new();
    fx.add_source("a.safetensors", b"a");
    fx.add_source("b.safetensors", b"b");
    fx.add_source("c.safetensors", b"c");
    let table = fx.write_table(&[
        ("a.safetensors", "VAELoader"),
        ("b.safetensors", "SomeCustomNode"),
        ("c.safetensors", "CheckpointLoaderSimple"),
    ]);

    let summary = run(
        fx.settings(MetadataSource::new(table, ParseMode::Tabular)),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.moved, 2);
    assert_eq!(summary.skipped_no_mapping, 1);
    assert!(summary.unresolved_labels.contains("SomeCustomNode"));
    assert!(fx.source.path().join("b.safetensors").exists());
    assert!(fx.host_file("models/vae/a.safetensors").is_file());
    assert!(fx.host_file("models/checkpoints/c.safetensors").is_file());
}

#[tokio::test]
async fn registry_is_queried_once_per_key() {
    let fx = Fixture::new();
    let mut pairs = String::new();
    for i in 0..5 {
        fx.add_source(&format!("v{}.safetensors", i), b"v");
        pairs.push_str(&format!("v{}.safetensors -> vae\n", i));
    }
    pairs.push_str("x.safetensors -> instantid\ny.safetensors -> instantid\n");
    fx.add_source("x.safetensors", b"x");
    fx.add_source("y.safetensors", b"y");

    let registry = FakeRegistry::new(fx.host.path());
    let lookups = registry.lookups.clone();
    let summary = run(
        fx.settings(MetadataSource::inline(pairs, ParseMode::LinePairs)),
        registry,
    )
    .await;

    assert_eq!(summary.moved, 7);
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_registry_entry_does_not_fall_back() {
    let fx = Fixture::new();
    fx.add_source("style.safetensors", b"e");

    let summary = run(
        fx.settings(MetadataSource::inline(
            "style.safetensors -> embeddings",
            ParseMode::LinePairs,
        )),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.skipped_no_destination, 1);
    assert!(!fx.host_file("models/embeddings").exists());
    assert!(fx.source.path().join("style.safetensors").exists());
}

#[tokio::test]
async fn subdirectories_survive_every_tier() {
    let fx = Fixture::new();
    fx.add_source("sdxl/primary.safetensors", b"p");
    fx.add_source("sd15/secondary.safetensors", b"s");
    fx.add_source("flux/fallback.safetensors", b"f");

    let catalog = fx.host.path().join("catalog.json");
    std::fs::write(&catalog, r#"{"MyVaeNode": {"output_types": ["VAE"]}}"#).unwrap();
    let table = fx.write_table(&[
        ("sdxl/primary.safetensors", "MyVaeNode"),
        ("sd15/secondary.safetensors", "VAELoader"),
    ]);

    let tabular = run(
        fx.settings(MetadataSource::new(table, ParseMode::Tabular))
            .with_catalog(&catalog),
        FakeRegistry::new(fx.host.path()),
    )
    .await;
    assert_eq!(tabular.moved, 2);

    let pairs = run(
        fx.settings(MetadataSource::inline(
            "flux/fallback.safetensors -> instantid",
            ParseMode::LinePairs,
        )),
        FakeRegistry::new(fx.host.path()),
    )
    .await;
    assert_eq!(pairs.moved, 1);

    assert!(fx.host_file("models/vae/sdxl/primary.safetensors").is_file());
    assert!(fx.host_file("models/vae/sd15/secondary.safetensors").is_file());
    assert!(fx
        .host_file("models/instantid/flux/fallback.safetensors")
        .is_file());
}

#[tokio::test]
async fn catalog_wins_over_node_type_table() {
    let fx = Fixture::new();
    fx.add_source("m.safetensors", b"m");
    let catalog = fx.host.path().join("catalog.json");
    std::fs::write(&catalog, r#"{"VAELoader": {"output_types": ["MODEL"]}}"#).unwrap();
    let table = fx.write_table(&[("m.safetensors", "VAELoader")]);

    let summary = run(
        fx.settings(MetadataSource::new(table, ParseMode::Tabular))
            .with_catalog(&catalog),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.moved, 1);
    assert!(fx.host_file("models/checkpoints/m.safetensors").is_file());
}

#[tokio::test]
async fn missing_catalog_aborts_before_moving() {
    let fx = Fixture::new();
    fx.add_source("m.safetensors", b"m");
    let table = fx.write_table(&[("m.safetensors", "VAELoader")]);

    let runner = PipelineRunner::new();
    let handle = runner
        .start(
            fx.settings(MetadataSource::new(table, ParseMode::Tabular))
                .with_catalog(fx.host.path().join("missing.json")),
            Box::new(FakeRegistry::new(fx.host.path())),
        )
        .unwrap();
    let (events, result) = handle.collect().await;

    assert!(result.is_err());
    assert!(matches!(events.last(), Some(PipelineEvent::Aborted(_))));
    assert!(fx.source.path().join("m.safetensors").exists());
}

#[tokio::test]
async fn events_arrive_in_order() {
    let fx = Fixture::new();
    fx.add_source("a.safetensors", b"a");
    fx.add_source("notes.txt", b"n");

    let runner = PipelineRunner::new();
    let handle = runner
        .start(
            fx.settings(MetadataSource::inline(
                "a.safetensors -> vae\nnotes.txt -> vae\nthis line is junk",
                ParseMode::LinePairs,
            )),
            Box::new(FakeRegistry::new(fx.host.path())),
        )
        .unwrap();
    let (events, result) = handle.collect().await;
    let summary = result.unwrap();

    assert!(matches!(events.first(), Some(PipelineEvent::Started { .. })));
    assert!(matches!(events.last(), Some(PipelineEvent::Finished(_))));

    let outcomes: Vec<MoveStatus> = events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Outcome(o) => Some(o.status),
            _ => None,
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![MoveStatus::Moved, MoveStatus::SkippedNotArtifact]
    );
    assert_eq!(summary.skipped_not_artifact, 1);
}

#[tokio::test]
async fn io_error_does_not_stop_later_files() {
    let fx = Fixture::new();
    fx.add_source("a.safetensors", b"a");
    fx.add_source("b.safetensors", b"b");
    // A non-empty folder occupies the first file's destination
    std::fs::create_dir_all(fx.host_file("models/vae/a.safetensors/inner")).unwrap();

    let summary = run(
        fx.settings(MetadataSource::inline(
            "a.safetensors -> vae\nb.safetensors -> vae",
            ParseMode::LinePairs,
        )),
        FakeRegistry::new(fx.host.path()),
    )
    .await;

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.moved, 1);
    assert_eq!(
        summary.outcome_for("a.safetensors").unwrap().status,
        MoveStatus::Error
    );
    assert_eq!(
        summary.outcome_for("b.safetensors").unwrap().status,
        MoveStatus::Moved
    );
    assert!(fx.source.path().join("a.safetensors").is_file());
    assert!(fx.host_file("models/vae/b.safetensors").is_file());
}

#[tokio::test]
async fn keys_from_extra_model_paths_are_honoured() {
    let fx = Fixture::new();
    fx.add_source("pulid_v1.safetensors", b"p");
    fx.add_source("odd.safetensors", b"o");
    std::fs::write(
        fx.host_file("extra_model_paths.yaml"),
        "custom:\n    pulid: models/pulid\n",
    )
    .unwrap();

    let summary = run_with(
        fx.settings(MetadataSource::inline(
            "pulid_v1.safetensors -> pulid\nodd.safetensors -> nowhere_key",
            ParseMode::LinePairs,
        )),
        Box::new(ComfyFolderRegistry::new(fx.host.path())),
    )
    .await;

    assert_eq!(summary.moved, 1);
    assert_eq!(summary.skipped_no_mapping, 0);
    assert!(fx.host_file("models/pulid/pulid_v1.safetensors").is_file());

    // Unknown to the host and to the default folders
    assert_eq!(
        summary.outcome_for("odd.safetensors").unwrap().status,
        MoveStatus::SkippedNoDestination
    );
    assert!(fx.source.path().join("odd.safetensors").is_file());
}
