//! In-memory package storage, for tests and ephemeral sessions.

use super::{BoxFuture, PersistError, PersistResult, PkgDocument, PkgStore};
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps documents in a map keyed by locator. Nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryPkgStore {
    docs: RwLock<HashMap<String, PkgDocument>>,
}

impl MemoryPkgStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PkgStore for MemoryPkgStore {
    fn save<'a>(&'a self, locator: &str, doc: &PkgDocument) -> BoxFuture<'a, PersistResult<()>> {
        let locator = locator.to_string();
        let doc = doc.clone();
        Box::pin(async move {
            let mut docs = self
                .docs
                .write()
                .map_err(|_| PersistError::Io("store lock poisoned".to_string()))?;
            docs.insert(locator, doc);
            Ok(())
        })
    }

    fn load<'a>(&'a self, locator: &str) -> BoxFuture<'a, PersistResult<PkgDocument>> {
        let locator = locator.to_string();
        Box::pin(async move {
            let docs = self
                .docs
                .read()
                .map_err(|_| PersistError::Io("store lock poisoned".to_string()))?;
            docs.get(&locator)
                .cloned()
                .ok_or(PersistError::NotFound(locator))
        })
    }

    fn exists<'a>(&'a self, locator: &str) -> BoxFuture<'a, PersistResult<bool>> {
        let locator = locator.to_string();
        Box::pin(async move {
            let docs = self
                .docs
                .read()
                .map_err(|_| PersistError::Io("store lock poisoned".to_string()))?;
            Ok(docs.contains_key(&locator))
        })
    }
}
