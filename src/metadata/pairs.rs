//! Line-oriented `filename -> key` metadata

use crate::metadata::models::MetadataMapping;
use once_cell::sync::Lazy;
use regex::Regex;

static PAIR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.+?)\s*->\s*(\w+)\s*$").expect("valid pattern"));

/// A line that did not match `filename -> key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    /// 1-based line number in the input
    pub line_no: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct PairsParse {
    pub mapping: MetadataMapping,
    pub failures: Vec<LineFailure>,
    /// Lines that matched the pattern, including repeated filenames
    pub parsed_lines: usize,
    pub non_blank_lines: usize,
}

impl PairsParse {
    /// True when there was input but not a single line could be used
    pub fn all_failed(&self) -> bool {
        self.parsed_lines == 0 && !self.failures.is_empty()
    }
}

/// Parse one line. The label is lowercased.
pub fn parse_pair_line(line: &str) -> Option<(String, String)> {
    let caps = PAIR_LINE.captures(line)?;
    let filename = caps.get(1)?.as_str().trim();
    let label = caps.get(2)?.as_str().trim().to_lowercase();
    Some((filename.to_string(), label))
}

pub fn parse_pairs_text(text: &str) -> PairsParse {
    let mut parsed = PairsParse::default();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        parsed.non_blank_lines += 1;

        match parse_pair_line(line) {
            Some((filename, label)) => {
                parsed.mapping.insert(filename, label);
                parsed.parsed_lines += 1;
            }
            None => parsed.failures.push(LineFailure {
                line_no: i + 1,
                text: line.to_string(),
            }),
        }
    }

    parsed
}
