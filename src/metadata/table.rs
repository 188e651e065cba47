//! HTML table metadata exports

use crate::metadata::models::MetadataMapping;
use crate::utils::ParseError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("valid selector"));
static DATA_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));

/// Header prefixes identifying the filename column (compared lowercase)
const FILENAME_PREFIXES: &[&str] = &["文件名", "filename", "file name"];

/// Header prefixes identifying the type column (compared lowercase)
const TYPE_PREFIXES: &[&str] = &["节点类型", "node type", "type"];

/// Result of reading one metadata table
#[derive(Debug, Clone, Default)]
pub struct TableParse {
    pub mapping: MetadataMapping,
    pub headers: Vec<String>,
    /// Data rows below the header row
    pub data_rows: usize,
    /// Data rows lacking a filename or type value
    pub skipped_rows: usize,
    /// Data rows whose filename was already seen
    pub duplicate_rows: usize,
}

/// Extract the `filename → node type` mapping from the table with `table_id`.
///
/// A missing table or missing header columns fail the whole parse; incomplete
/// data rows are only counted.
pub fn parse_table_html(html: &str, table_id: &str) -> Result<TableParse, ParseError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE)
        .find(|t| t.value().id() == Some(table_id))
        .ok_or_else(|| ParseError::TableNotFound(table_id.to_string()))?;

    let rows: Vec<ElementRef> = table.select(&ROW).collect();
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Err(ParseError::MissingColumns(Vec::new()));
    };

    let mut headers: Vec<String> = header_row.select(&HEADER_CELL).map(cell_text).collect();
    if headers.is_empty() {
        headers = header_row.select(&DATA_CELL).map(cell_text).collect();
    }

    let (filename_idx, type_idx) = match locate_columns(&headers) {
        Some(columns) => columns,
        None => return Err(ParseError::MissingColumns(headers)),
    };

    let mut parsed = TableParse {
        headers,
        data_rows: data_rows.len(),
        ..Default::default()
    };

    for row in data_rows {
        let cells: Vec<String> = row.select(&DATA_CELL).map(cell_text).collect();
        let filename = cells.get(filename_idx).map(String::as_str).unwrap_or("");
        let node_type = cells.get(type_idx).map(String::as_str).unwrap_or("");

        if filename.is_empty() || node_type.is_empty() {
            parsed.skipped_rows += 1;
            continue;
        }

        if !parsed.mapping.insert(filename, node_type) {
            parsed.duplicate_rows += 1;
        }
    }

    Ok(parsed)
}

/// Find `(filename, type)` column indexes by header prefix.
fn locate_columns(headers: &[String]) -> Option<(usize, usize)> {
    let mut filename_idx = None;
    let mut type_idx = None;

    for (i, header) in headers.iter().enumerate() {
        let lower = header.to_lowercase();
        if filename_idx.is_none() && has_prefix(&lower, FILENAME_PREFIXES) {
            filename_idx = Some(i);
        } else if type_idx.is_none() && has_prefix(&lower, TYPE_PREFIXES) {
            type_idx = Some(i);
        }
    }

    Some((filename_idx?, type_idx?))
}

fn has_prefix(header: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| header.starts_with(p))
}

/// Concatenate the cell's text nodes, each trimmed.
fn cell_text(cell: ElementRef) -> String {
    cell.text().map(str::trim).collect::<String>()
}
