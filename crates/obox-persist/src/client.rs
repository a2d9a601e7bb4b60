use std::sync::Arc;
use tracing::info;

use crate::dbs::MemoryStore;
use crate::error::Result;
use crate::repositories::{
    CredentialRepository, MessageRepository, PreferencesRepository, SearchCacheRepository,
    ThreadRepository,
};
use crate::trait_client::KeyValueStore;

/// Typed access to every record kept in the local store
#[derive(Clone)]
pub struct PersistClient {
    thread_repo: ThreadRepository,
    message_repo: MessageRepository,
    search_repo: SearchCacheRepository,
    preferences_repo: PreferencesRepository,
    credential_repo: CredentialRepository,
}

impl PersistClient {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            thread_repo: ThreadRepository::new(store.clone()),
            message_repo: MessageRepository::new(store.clone()),
            search_repo: SearchCacheRepository::new(store.clone()),
            preferences_repo: PreferencesRepository::new(store.clone()),
            credential_repo: CredentialRepository::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn threads(&self) -> &ThreadRepository {
        &self.thread_repo
    }

    pub fn messages(&self) -> &MessageRepository {
        &self.message_repo
    }

    pub fn searches(&self) -> &SearchCacheRepository {
        &self.search_repo
    }

    pub fn preferences(&self) -> &PreferencesRepository {
        &self.preferences_repo
    }

    pub fn credentials(&self) -> &CredentialRepository {
        &self.credential_repo
    }

    /// Delete a thread with its messages and every source set they reference
    ///
    /// Keys are removed one by one; a failure part way leaves the remaining
    /// keys in place.
    pub fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let messages = self.message_repo.get_messages(thread_id)?;
        for search_id in messages.iter().filter_map(|m| m.search_id.as_deref()) {
            self.search_repo.delete_sections(search_id)?;
        }

        self.message_repo.delete_messages(thread_id)?;
        let removed = self.thread_repo.remove_thread(thread_id)?;
        info!(
            "Deleted thread {} ({} messages, listed: {})",
            thread_id,
            messages.len(),
            removed
        );
        Ok(())
    }
}
