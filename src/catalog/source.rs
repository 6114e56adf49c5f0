//! Memoized catalog loading
//!
//! The catalog is read once per session. A restart calls `invalidate`
//! so the next `load` picks up edits to the file.

use super::{Catalog, CatalogFormat};
use crate::error::{Result, TrainerError};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Catalog file plus its cached parse
pub struct CatalogSource {
    path: PathBuf,
    format: CatalogFormat,
    cached: Option<Catalog>,
}

impl CatalogSource {
    pub fn new(path: impl Into<PathBuf>, format: CatalogFormat) -> Self {
        CatalogSource {
            path: path.into(),
            format,
            cached: None,
        }
    }

    /// Read and parse the file on first use, then serve the cached value
    pub fn load(&mut self) -> Result<&Catalog> {
        let catalog = match self.cached.take() {
            Some(catalog) => catalog,
            None => {
                let bytes = fs::read(&self.path).map_err(|e| TrainerError::CatalogUnavailable {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })?;
                let catalog = Catalog::parse(&bytes, &self.format, &self.path)?;
                info!(path = %self.path.display(), sentences = catalog.len(), "catalog loaded");
                catalog
            }
        };

        Ok(self.cached.insert(catalog))
    }

    /// Drop the cached catalog
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    #[allow(dead_code)]
    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = CatalogSource::new(dir.path().join("nope.csv"), CatalogFormat::default());
        let err = source.load().unwrap_err();
        assert!(matches!(err, TrainerError::CatalogUnavailable { .. }));
        assert!(!source.is_loaded());
    }

    #[test]
    fn test_load_is_memoized_until_invalidated() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PT,EN").unwrap();
        writeln!(file, "Olá,Hello").unwrap();
        file.flush().unwrap();

        let mut source = CatalogSource::new(file.path(), CatalogFormat::default());
        assert_eq!(source.load().unwrap().len(), 1);

        writeln!(file, "Tchau,Bye").unwrap();
        file.flush().unwrap();
        assert_eq!(source.load().unwrap().len(), 1);

        source.invalidate();
        assert_eq!(source.load().unwrap().len(), 2);
    }
}
