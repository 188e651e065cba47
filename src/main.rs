//! ModelMover - sorts downloaded model files into a ComfyUI installation
//!
//! Reads a `filename → type` mapping (an exported HTML table or plain
//! `filename -> key` lines) and moves each listed file into the folder
//! ComfyUI uses for that type.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use modelmover::metadata::{MetadataSource, ParseMode};
use modelmover::utils::{get_config_path, get_default_catalog_path, DEFAULT_TABLE_ID};
use modelmover::{
    ComfyFolderRegistry, MoverError, PathConfig, PipelineEvent, PipelineRunner, RunSettings,
    RunSummary, Severity,
};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[derive(Parser)]
#[command(name = "modelmover", version, about = "Move downloaded models into ComfyUI folders")]
struct Cli {
    /// Path record to read defaults from and save to
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Move the files listed in a metadata source
    Run(RunArgs),
    /// List the files in the source folder
    List {
        /// Source folder (defaults to the saved one)
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Folder containing the downloaded files
    #[arg(long)]
    source: Option<PathBuf>,

    /// ComfyUI installation root
    #[arg(long)]
    host: Option<PathBuf>,

    /// HTML file with a filename/node type table
    #[arg(long, conflicts_with = "pairs")]
    table: Option<PathBuf>,

    /// Text file of `filename -> key` lines, or `-` for stdin
    #[arg(long)]
    pairs: Option<PathBuf>,

    /// Id of the table element to read
    #[arg(long, default_value = DEFAULT_TABLE_ID)]
    table_id: String,

    /// Reference catalog (JSON) used to resolve node types by output type
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    yes: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let rt = tokio::runtime::Runtime::new()?;
    let success = rt.block_on(async move {
        match cli.command {
            Command::Run(args) => run_command(args, &config_path).await,
            Command::List { source } => list_command(source, &config_path).await,
        }
    })?;

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

async fn load_saved(config_path: &Path) -> Option<PathConfig> {
    match PathConfig::load(config_path).await {
        Ok(saved) => {
            if let Some(saved) = &saved {
                for warning in saved.validation_warnings() {
                    eprintln!("Warning: {}", warning);
                }
            }
            saved
        }
        Err(e) => {
            eprintln!("Warning: could not read saved paths: {:#}", e);
            None
        }
    }
}

async fn run_command(args: RunArgs, config_path: &Path) -> Result<bool> {
    let saved = load_saved(config_path).await;

    let source_root = args
        .source
        .or_else(|| saved.as_ref().map(|s| s.source_root.clone()))
        .context("No source folder given and none saved; use --source")?;
    let host_root = args
        .host
        .or_else(|| saved.as_ref().map(|s| s.host_root.clone()))
        .context("No ComfyUI root given and none saved; use --host")?;

    let from_stdin = args.pairs.as_deref() == Some(Path::new("-"));
    if from_stdin && !args.yes {
        bail!("Reading pairs from stdin requires --yes");
    }

    let (metadata, saved_metadata_path) = match (&args.pairs, &args.table) {
        (Some(pairs), _) => {
            let source = if from_stdin {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read pairs from stdin")?;
                MetadataSource::inline(text, ParseMode::LinePairs)
            } else {
                MetadataSource::new(pairs, ParseMode::LinePairs)
            };
            // Pairs runs keep the previously saved table path
            (source, saved.as_ref().and_then(|s| s.metadata_path.clone()))
        }
        (None, table) => {
            let table = table
                .clone()
                .or_else(|| saved.as_ref().and_then(|s| s.metadata_path.clone()))
                .context("No metadata given and none saved; use --table or --pairs")?;
            let source = MetadataSource::new(&table, ParseMode::Tabular).with_table_id(&args.table_id);
            (source, Some(table))
        }
    };

    println!("Source folder: {}", source_root.display());
    println!("ComfyUI root:  {}", host_root.display());
    println!("Metadata:      {} ({})", metadata.display_name(), metadata.mode.as_str());

    if !args.yes && !confirm()? {
        println!("Operation cancelled.");
        return Ok(true);
    }

    let record = PathConfig {
        source_root: source_root.clone(),
        host_root: host_root.clone(),
        metadata_path: saved_metadata_path,
    };
    if let Err(e) = record.save(config_path).await {
        eprintln!("Warning: {:#}", e);
    }

    let mut settings = RunSettings::new(source_root, host_root.clone(), metadata);
    if let Some(catalog) = args.catalog.or_else(get_default_catalog_path) {
        debug!("Using reference catalog {:?}", catalog);
        settings = settings.with_catalog(catalog);
    }

    let runner = PipelineRunner::new();
    let mut handle = runner.start(settings, Box::new(ComfyFolderRegistry::new(&host_root)))?;

    while let Some(event) = handle.next_event().await {
        match event {
            PipelineEvent::Started { run_id } => debug!("Run {} started", run_id),
            PipelineEvent::Status(message) => {
                let line = match message.severity {
                    Severity::Info => message.text,
                    _ => format!("[{}] {}", message.severity.as_str(), message.text),
                };
                if args.json {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
            PipelineEvent::Outcome(outcome) => {
                debug!("{} -> {}", outcome.filename, outcome.status.as_str())
            }
            PipelineEvent::Finished(finished) => {
                debug!("Run {} finished", finished.run_id)
            }
            PipelineEvent::Aborted(reason) => eprintln!("Run aborted: {}", reason),
        }
    }
    let result = handle.wait().await;
    if let Err(MoverError::OperationFailed(reason)) = &result {
        eprintln!("Run failed: {}", reason);
    }

    if let (true, Ok(summary)) = (args.json, &result) {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }

    Ok(run_succeeded(&result))
}

/// Exit status: only a completed run without per-file errors succeeds
fn run_succeeded(result: &Result<RunSummary, MoverError>) -> bool {
    matches!(result, Ok(summary) if !summary.has_errors())
}

fn confirm() -> Result<bool> {
    println!();
    println!("WARNING: files that already exist in the destination folders WILL be overwritten.");
    print!("Proceed with moving files? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn list_command(source: Option<PathBuf>, config_path: &Path) -> Result<bool> {
    let source_root = match source {
        Some(source) => source,
        None => load_saved(config_path)
            .await
            .map(|s| s.source_root)
            .context("No source folder given and none saved; use --source")?,
    };

    let mut entries = fs::read_dir(&source_root)
        .await
        .with_context(|| format!("Could not read source folder {}", source_root.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    if names.is_empty() {
        println!("No files found in {}", source_root.display());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(true)
}
