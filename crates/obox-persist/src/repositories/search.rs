use std::sync::Arc;

use crate::dbs::{keys, read_json, write_json};
use crate::error::Result;
use crate::models::Section;
use crate::trait_client::KeyValueStore;

/// Sections cached under `search_<searchId>`
#[derive(Clone)]
pub struct SearchCacheRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SearchCacheRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get_sections(&self, search_id: &str) -> Result<Option<Vec<Section>>> {
        read_json(self.store.as_ref(), &keys::search(search_id))
    }

    pub fn save_sections(&self, search_id: &str, sections: &[Section]) -> Result<()> {
        write_json(self.store.as_ref(), &keys::search(search_id), sections)
    }

    pub fn delete_sections(&self, search_id: &str) -> Result<()> {
        self.store.remove(&keys::search(search_id))
    }
}
