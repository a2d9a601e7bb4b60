use std::path::PathBuf;
use std::sync::Arc;

use crate::dbs::{FileStore, MemoryStore};
use crate::error::Result;
use crate::trait_client::KeyValueStore;
use crate::PersistClient;

/// Chooses the storage backend; no path means in-memory
#[derive(Debug, Default)]
pub struct PersistClientBuilder {
    path: Option<PathBuf>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    pub fn build(self) -> Result<PersistClient> {
        let store: Arc<dyn KeyValueStore> = match self.path {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(PersistClient::new(store))
    }
}
