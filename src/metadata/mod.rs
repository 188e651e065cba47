//! Metadata sources: HTML tables and `filename -> key` text

pub mod models;
pub mod pairs;
pub mod table;

pub use models::{MetadataEntry, MetadataInput, MetadataMapping, MetadataSource, ParseMode};
pub use pairs::{parse_pair_line, parse_pairs_text, LineFailure, PairsParse};
pub use table::{parse_table_html, TableParse};

use crate::pipeline::Reporter;
use crate::utils::ParseError;
use tokio::fs;
use tracing::debug;

/// Read a metadata source and turn it into a `filename → label` mapping,
/// reporting progress and per-line diagnostics as it goes.
pub async fn parse_source(
    source: &MetadataSource,
    reporter: &Reporter,
) -> Result<MetadataMapping, ParseError> {
    let text = match &source.input {
        MetadataInput::File(path) => {
            fs::read_to_string(path)
                .await
                .map_err(|e| ParseError::Unreadable {
                    path: path.clone(),
                    source: e,
                })?
        }
        MetadataInput::Inline(text) => text.clone(),
    };

    match source.mode {
        ParseMode::Tabular => parse_table_source(source, &text, reporter).await,
        ParseMode::LinePairs => parse_pairs_source(&text, reporter).await,
    }
}

async fn parse_table_source(
    source: &MetadataSource,
    html: &str,
    reporter: &Reporter,
) -> Result<MetadataMapping, ParseError> {
    reporter
        .info(format!("Starting to parse HTML file: {}...", source.display_name()))
        .await;

    let parsed = match parse_table_html(html, &source.table_id) {
        Ok(parsed) => parsed,
        Err(e) => {
            reporter.error(format!("Error: {}", e)).await;
            return Err(e);
        }
    };
    debug!("Table headers: {:?}", parsed.headers);

    if parsed.data_rows == 0 {
        reporter
            .warn("Warning: Not enough data rows found in HTML table.")
            .await;
    }
    if parsed.skipped_rows > 0 {
        reporter
            .info(format!(
                "Skipped {} rows without both a filename and a node type.",
                parsed.skipped_rows
            ))
            .await;
    }
    if parsed.duplicate_rows > 0 {
        reporter
            .warn(format!(
                "{} rows repeated an earlier filename; the last node type was kept.",
                parsed.duplicate_rows
            ))
            .await;
    }

    reporter
        .info(format!(
            "Successfully parsed {} model entries from HTML file.",
            parsed.mapping.len()
        ))
        .await;
    Ok(parsed.mapping)
}

async fn parse_pairs_source(text: &str, reporter: &Reporter) -> Result<MetadataMapping, ParseError> {
    reporter.info("Parsing line-pairs text...").await;

    let parsed = parse_pairs_text(text);
    for failure in &parsed.failures {
        reporter
            .warn(format!(
                "  Warning: Could not parse line {}: '{}'. Expected format: 'filename -> key'. Skipping.",
                failure.line_no, failure.text
            ))
            .await;
    }

    if parsed.parsed_lines > 0 {
        reporter
            .info(format!(
                "Successfully parsed {} entries from line-pairs text.",
                parsed.parsed_lines
            ))
            .await;
    }
    if !parsed.failures.is_empty() {
        reporter
            .warn(format!("Could not parse {} lines.", parsed.failures.len()))
            .await;
    }

    if parsed.all_failed() {
        reporter
            .error("No entries were parsed due to format errors.")
            .await;
        return Err(ParseError::NoUsableLines(parsed.failures.len()));
    }
    if parsed.non_blank_lines == 0 {
        reporter
            .warn("Line-pairs text was empty or contained only whitespace.")
            .await;
    }

    Ok(parsed.mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineEvent, Severity};
    use tokio::sync::mpsc;

    fn reporter() -> (Reporter, mpsc::Receiver<PipelineEvent>) {
        let (tx, rx) = mpsc::channel(256);
        (Reporter::new(tx), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<PipelineEvent>) -> Vec<(Severity, String)> {
        let mut out = Vec::new();
        while let Ok(PipelineEvent::Status(msg)) = rx.try_recv() {
            out.push((msg.severity, msg.text));
        }
        out
    }

    #[tokio::test]
    async fn test_pairs_reports_bad_lines() {
        let (reporter, mut rx) = reporter();
        let source = MetadataSource::inline("a.pt -> vae\nbad\n", ParseMode::LinePairs);

        let mapping = parse_source(&source, &reporter).await.unwrap();
        assert_eq!(mapping.len(), 1);

        let messages = drain(&mut rx);
        assert!(messages
            .iter()
            .any(|(s, t)| *s == Severity::Warning && t.contains("line 2")));
    }

    #[tokio::test]
    async fn test_pairs_all_failed_is_error() {
        let (reporter, _rx) = reporter();
        let source = MetadataSource::inline("bad\nworse\n", ParseMode::LinePairs);

        let err = parse_source(&source, &reporter).await.unwrap_err();
        assert!(matches!(err, ParseError::NoUsableLines(2)));
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let (reporter, _rx) = reporter();
        let source = MetadataSource::new("/no/such/models.html", ParseMode::Tabular);

        let err = parse_source(&source, &reporter).await.unwrap_err();
        assert!(matches!(err, ParseError::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_table_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.html");
        tokio::fs::write(
            &path,
            r#"<table id="modelTable"><tr><th>Filename</th><th>Type</th></tr>
               <tr><td>a.safetensors</td><td>LoraLoader</td></tr></table>"#,
        )
        .await
        .unwrap();

        let (reporter, mut rx) = reporter();
        let mapping = parse_source(&MetadataSource::new(&path, ParseMode::Tabular), &reporter)
            .await
            .unwrap();
        assert_eq!(mapping.get("a.safetensors"), Some("LoraLoader"));

        let messages = drain(&mut rx);
        assert!(messages.iter().any(|(_, t)| t.contains("models.html")));
    }
}
