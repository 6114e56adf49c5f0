//! Durable ledger storage
//!
//! Layout: `;`-delimited UTF-8 with a byte-order mark, one header row,
//! columns `source;target;successes;failures;accuracy`. Writes go to a
//! temp file beside the ledger and are renamed over it, so a failed write
//! leaves the previous ledger intact. No locking: concurrent sessions on
//! one file are last-writer-wins.

use super::{Ledger, LedgerEntry};
use crate::catalog::Catalog;
use crate::error::{Result, TrainerError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const DELIMITER: u8 = b';';
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Accepted header names for each counter column. The first is written.
const SUCCESS_HEADERS: [&str; 2] = ["successes", "Acertos"];
const FAILURE_HEADERS: [&str; 2] = ["failures", "Erros"];
const ACCURACY_HEADERS: [&str; 2] = ["accuracy", "Percentual"];

/// Header names of the two text columns
#[derive(Clone, Debug)]
pub struct LedgerColumns {
    pub source: String,
    pub target: String,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        LedgerColumns {
            source: "PT".to_string(),
            target: "EN".to_string(),
        }
    }
}

/// Ledger file location and layout
#[derive(Clone, Debug)]
pub struct LedgerStore {
    path: PathBuf,
    columns: LedgerColumns,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>, columns: LedgerColumns) -> Self {
        LedgerStore {
            path: path.into(),
            columns,
        }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored ledger, or start a zeroed one, then reconcile it
    /// against `catalog`
    pub fn load_or_init(&self, catalog: &Catalog) -> Result<Ledger> {
        let mut ledger = if self.path.exists() {
            let bytes = fs::read(&self.path).map_err(|e| self.corrupt(e.to_string()))?;
            let ledger = self.parse(&bytes)?;
            info!(path = %self.path.display(), entries = ledger.len(), "ledger loaded");
            ledger
        } else {
            info!(path = %self.path.display(), "no ledger on disk, starting fresh");
            Ledger::default()
        };

        let report = ledger.reconcile(catalog);
        if report.pruned > 0 {
            warn!(pruned = report.pruned, "dropped ledger entries no longer in catalog");
        }
        if report.added > 0 {
            debug!(added = report.added, "added ledger entries for new sentences");
        }

        Ok(ledger)
    }

    /// Parse ledger bytes. Counter columns that are absent default to zero.
    pub fn parse(&self, bytes: &[u8]) -> Result<Ledger> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| self.corrupt(format!("failed to read header row: {e}")))?
            .clone();
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|name| *name == h.trim()))
        };

        let source_idx = find(&[self.columns.source.as_str()])
            .ok_or_else(|| self.corrupt(format!("column '{}' not found", self.columns.source)))?;
        let target_idx = find(&[self.columns.target.as_str()]);
        let success_idx = find(&SUCCESS_HEADERS);
        let failure_idx = find(&FAILURE_HEADERS);
        let accuracy_idx = find(&ACCURACY_HEADERS);

        let mut entries = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let line = row + 2;
            let record = record.map_err(|e| self.corrupt(format!("line {line}: {e}")))?;
            let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

            let source_text = record.get(source_idx).unwrap_or("");
            if source_text.trim().is_empty() {
                warn!(line, "skipping ledger row without source text");
                continue;
            }

            entries.push(LedgerEntry {
                source_text: source_text.to_string(),
                target_text: target_idx
                    .and_then(|i| record.get(i))
                    .unwrap_or("")
                    .to_string(),
                successes: self.parse_count(cell(success_idx), line)?,
                failures: self.parse_count(cell(failure_idx), line)?,
                accuracy: self.parse_accuracy(cell(accuracy_idx), line)?,
            });
        }

        Ok(Ledger::from_entries(entries))
    }

    /// Recompute accuracy and replace the ledger file with `ledger`
    pub fn persist(&self, ledger: &mut Ledger) -> Result<()> {
        ledger.recompute_accuracy();
        self.write_atomic(ledger)
            .map_err(|source| TrainerError::PersistenceFailure {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), entries = ledger.len(), "ledger persisted");
        Ok(())
    }

    fn write_atomic(&self, ledger: &Ledger) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(UTF8_BOM)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(DELIMITER)
                .from_writer(tmp.as_file_mut());
            writer.write_record([
                self.columns.source.as_str(),
                self.columns.target.as_str(),
                SUCCESS_HEADERS[0],
                FAILURE_HEADERS[0],
                ACCURACY_HEADERS[0],
            ])?;
            for entry in ledger.entries() {
                writer.write_record(&[
                    entry.source_text.clone(),
                    entry.target_text.clone(),
                    entry.successes.to_string(),
                    entry.failures.to_string(),
                    entry.accuracy.to_string(),
                ])?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Counters may have been written as floats (`3.0`) by other tools
    fn parse_count(&self, raw: &str, line: usize) -> Result<u32> {
        if raw.is_empty() {
            return Ok(0);
        }
        if let Ok(n) = raw.parse::<u32>() {
            return Ok(n);
        }
        match raw.parse::<f64>() {
            Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
            _ => Err(self.corrupt(format!("line {line}: invalid counter '{raw}'"))),
        }
    }

    fn parse_accuracy(&self, raw: &str, line: usize) -> Result<f64> {
        if raw.is_empty() {
            return Ok(0.0);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            _ => Err(self.corrupt(format!("line {line}: invalid accuracy '{raw}'"))),
        }
    }

    fn corrupt(&self, reason: String) -> TrainerError {
        TrainerError::LedgerCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
