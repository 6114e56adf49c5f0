//! Trainer configuration with layered resolution.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via `CliOverrides`)
//! 2. Environment variables (`TRAINER_CATALOG`, `TRAINER_LEDGER`)
//! 3. Config file (`--config`, or `trainer.toml` in the working directory)
//! 4. Compiled defaults

use crate::catalog::CatalogFormat;
use crate::error::{Result, TrainerError};
use crate::ledger::LedgerColumns;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "trainer.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Sentence pairs, one per row
    pub catalog_path: PathBuf,
    /// Single ASCII character separating catalog fields
    pub catalog_delimiter: char,
    pub source_column: String,
    pub target_column: String,
    /// Performance ledger, rewritten after every check
    pub ledger_path: PathBuf,
    pub log_path: PathBuf,
    /// Fixed rng seed for reproducible sentence order
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            catalog_path: PathBuf::from("frases.csv"),
            catalog_delimiter: ',',
            source_column: "PT".to_string(),
            target_column: "EN".to_string(),
            ledger_path: PathBuf::from("desempenho.csv"),
            log_path: PathBuf::from("trainer.log"),
            seed: None,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub catalog_path: Option<PathBuf>,
    pub ledger_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl TrainerConfig {
    /// Resolve configuration from all layers.
    ///
    /// An explicit `config_path` must exist; the default `trainer.toml` is
    /// optional.
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| TrainerError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| TrainerError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string (for testing).
    #[allow(dead_code)]
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| TrainerError::Config {
            path: "<string>".to_string(),
            reason: e.to_string(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("TRAINER_CATALOG") {
            self.catalog_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("TRAINER_LEDGER") {
            self.ledger_path = PathBuf::from(path);
        }
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(path) = &cli.catalog_path {
            self.catalog_path = path.clone();
        }
        if let Some(path) = &cli.ledger_path {
            self.ledger_path = path.clone();
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| TrainerError::Config {
            path: "<resolved>".to_string(),
            reason: reason.to_string(),
        };

        if self.source_column.trim().is_empty() || self.target_column.trim().is_empty() {
            return Err(invalid("column names must not be empty"));
        }
        if self.source_column == self.target_column {
            return Err(invalid("source_column and target_column must differ"));
        }
        if !self.catalog_delimiter.is_ascii() || self.catalog_delimiter == '"' {
            return Err(invalid("catalog_delimiter must be a single ASCII character other than '\"'"));
        }
        if self.catalog_path == self.ledger_path {
            return Err(invalid("catalog_path and ledger_path must differ"));
        }
        Ok(())
    }

    pub fn catalog_format(&self) -> CatalogFormat {
        CatalogFormat {
            delimiter: self.catalog_delimiter as u8,
            source_column: self.source_column.clone(),
            target_column: self.target_column.clone(),
        }
    }

    pub fn ledger_columns(&self) -> LedgerColumns {
        LedgerColumns {
            source: self.source_column.clone(),
            target: self.target_column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = TrainerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog_format().delimiter, b',');
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TrainerConfig::from_toml(
            r#"
            ledger_path = "data/ledger.csv"
            catalog_delimiter = ";"
            seed = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger_path, PathBuf::from("data/ledger.csv"));
        assert_eq!(config.catalog_delimiter, ';');
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.source_column, "PT");
    }

    #[test]
    fn test_bad_toml() {
        let err = TrainerConfig::from_toml("seed = \"soon\"").unwrap_err();
        assert!(matches!(err, TrainerError::Config { .. }));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = TrainerConfig::from_toml("seed = 1").unwrap();
        config.apply_cli_overrides(&CliOverrides {
            catalog_path: Some(PathBuf::from("other.csv")),
            ledger_path: None,
            seed: Some(5),
        });
        assert_eq!(config.catalog_path, PathBuf::from("other.csv"));
        assert_eq!(config.ledger_path, PathBuf::from("desempenho.csv"));
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = TrainerConfig::default();
        config.target_column = "PT".to_string();
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.catalog_delimiter = 'ç';
        assert!(config.validate().is_err());

        let mut config = TrainerConfig::default();
        config.ledger_path = config.catalog_path.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainerConfig::load(Some(dir.path().join("none.toml").as_path()), &CliOverrides::default())
            .unwrap_err();
        assert!(matches!(err, TrainerError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trainer.toml");
        fs::write(&path, "source_column = \"pt\"\ntarget_column = \"en\"\n").unwrap();
        let config = TrainerConfig::load(Some(path.as_path()), &CliOverrides::default()).unwrap();
        assert_eq!(config.ledger_columns().source, "pt");
    }
}
