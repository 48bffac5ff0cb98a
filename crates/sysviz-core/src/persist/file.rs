//! Filesystem-backed package storage.

use super::{BoxFuture, PersistError, PersistResult, PkgDocument, PkgStore};
use std::path::{Path, PathBuf};

/// Stores package documents as pretty-printed JSON files.
///
/// The locator is a filesystem path. Parent directories are created on save.
#[derive(Debug, Default)]
pub struct FilePkgStore;

impl FilePkgStore {
    pub fn new() -> Self {
        Self
    }

    /// Default directory for package files, under the platform data dir.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sysviz")
            .join("packages")
    }

    fn write_doc(path: &Path, doc: &PkgDocument) -> PersistResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PersistError::Io(e.to_string()))?;
        }
        let json = doc.to_json()?;
        std::fs::write(path, json).map_err(|e| PersistError::Io(e.to_string()))?;
        log::info!("saved package '{}' to {}", doc.name, path.display());
        Ok(())
    }

    fn read_doc(path: &Path) -> PersistResult<PkgDocument> {
        if !path.exists() {
            return Err(PersistError::NotFound(path.display().to_string()));
        }
        let json = std::fs::read_to_string(path).map_err(|e| PersistError::Io(e.to_string()))?;
        PkgDocument::from_json(&json)
    }
}

impl PkgStore for FilePkgStore {
    fn save<'a>(&'a self, locator: &str, doc: &PkgDocument) -> BoxFuture<'a, PersistResult<()>> {
        let path = PathBuf::from(locator);
        let doc = doc.clone();
        Box::pin(async move { Self::write_doc(&path, &doc) })
    }

    fn load<'a>(&'a self, locator: &str) -> BoxFuture<'a, PersistResult<PkgDocument>> {
        let path = PathBuf::from(locator);
        Box::pin(async move { Self::read_doc(&path) })
    }

    fn exists<'a>(&'a self, locator: &str) -> BoxFuture<'a, PersistResult<bool>> {
        let path = PathBuf::from(locator);
        Box::pin(async move { Ok(path.exists()) })
    }
}
