mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::trait_client::KeyValueStore;

/// Key layout of the local store
pub mod keys {
    pub const THREADS: &str = "threads";
    pub const THEME: &str = "theme";
    pub const API_KEY: &str = "api_key";

    pub fn messages(thread_id: &str) -> String {
        format!("messages_{}", thread_id)
    }

    pub fn search(search_id: &str) -> String {
        format!("search_{}", search_id)
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    store.set(key, serde_json::to_string(value)?)
}
