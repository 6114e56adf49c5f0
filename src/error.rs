//! Error taxonomy for the trainer
//!
//! Every failure is fatal to the operation that raised it. Nothing here is
//! retried; callers propagate with `?` up to `main`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the catalog, ledger, selector and session layers
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Catalog file missing, unreadable or lacking a required column
    #[error("catalog unavailable at {path}: {reason}")]
    CatalogUnavailable { path: PathBuf, reason: String },

    /// Ledger file exists but cannot be parsed
    #[error("ledger corrupt at {path}: {reason}")]
    LedgerCorrupt { path: PathBuf, reason: String },

    /// Writing the ledger failed; the previous file is left untouched
    #[error("failed to persist ledger to {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Nothing to select from
    #[error("catalog has no sentences")]
    EmptyCatalog,

    /// Session action issued in a phase that does not accept it
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    /// Configuration file unreadable or invalid
    #[error("invalid configuration ({path}): {reason}")]
    Config { path: String, reason: String },

    /// Ledger export could not be serialized
    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Terminal I/O failure in the interactive shell
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
