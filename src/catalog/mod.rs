//! Catalog: the fixed set of translation exercises
//!
//! # Components
//! - `mod.rs`: `SentencePair`, `Catalog` and the delimited-text parser
//! - `source.rs`: per-session memoized loading from disk

pub mod source;

pub use source::CatalogSource;

use crate::error::{Result, TrainerError};
use std::path::Path;
use tracing::warn;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One exercise: a Portuguese sentence and its English translation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentencePair {
    pub source_text: String,
    pub target_text: String,
}

impl SentencePair {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        SentencePair {
            source_text: source_text.into(),
            target_text: target_text.into(),
        }
    }
}

/// Column layout of the catalog file
#[derive(Clone, Debug)]
pub struct CatalogFormat {
    pub delimiter: u8,
    pub source_column: String,
    pub target_column: String,
}

impl Default for CatalogFormat {
    fn default() -> Self {
        CatalogFormat {
            delimiter: b',',
            source_column: "PT".to_string(),
            target_column: "EN".to_string(),
        }
    }
}

/// Ordered, immutable list of sentence pairs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pairs: Vec<SentencePair>,
}

impl Catalog {
    #[allow(dead_code)]
    pub fn new(pairs: Vec<SentencePair>) -> Self {
        Catalog { pairs }
    }

    /// Parse catalog bytes. `origin` is only used in error messages.
    ///
    /// Every cell is kept as text, so a numeric cell like `42` becomes the
    /// string `"42"`. Rows with an empty source cell are skipped.
    pub fn parse(bytes: &[u8], format: &CatalogFormat, origin: &Path) -> Result<Self> {
        let unavailable = |reason: String| TrainerError::CatalogUnavailable {
            path: origin.to_path_buf(),
            reason,
        };

        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| unavailable(format!("failed to read header row: {e}")))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| unavailable(format!("required column '{name}' not found")))
        };
        let source_idx = column(&format.source_column)?;
        let target_idx = column(&format.target_column)?;

        let mut pairs = Vec::new();
        for (row, record) in reader.records().enumerate() {
            // Header is line 1
            let line = row + 2;
            let record = record.map_err(|e| unavailable(format!("line {line}: {e}")))?;

            let source = record.get(source_idx).unwrap_or("");
            if source.trim().is_empty() {
                warn!(line, "skipping catalog row without source text");
                continue;
            }
            let target = record.get(target_idx).ok_or_else(|| {
                unavailable(format!("line {line}: missing '{}' value", format.target_column))
            })?;
            pairs.push(SentencePair::new(source, target));
        }

        Ok(Catalog { pairs })
    }

    pub fn pairs(&self) -> &[SentencePair] {
        &self.pairs
    }

    pub fn get(&self, index: usize) -> Option<&SentencePair> {
        self.pairs.get(index)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
