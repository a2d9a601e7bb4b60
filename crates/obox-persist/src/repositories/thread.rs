use chrono::Utc;
use std::sync::Arc;

use crate::dbs::{keys, read_json, write_json};
use crate::error::{PersistError, Result};
use crate::models::Thread;
use crate::trait_client::KeyValueStore;

#[derive(Clone)]
pub struct ThreadRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ThreadRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<Vec<Thread>> {
        Ok(read_json(self.store.as_ref(), keys::THREADS)?.unwrap_or_default())
    }

    fn save(&self, threads: &[Thread]) -> Result<()> {
        write_json(self.store.as_ref(), keys::THREADS, threads)
    }

    /// List threads, most recently updated first
    pub fn list_threads(&self) -> Result<Vec<Thread>> {
        let mut threads = self.load()?;
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }

    /// Get thread by ID
    pub fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.load()?.into_iter().find(|t| t.id == thread_id))
    }

    /// Create a new thread titled by the trimmed query
    pub fn create_thread(&self, title: &str) -> Result<Thread> {
        let thread = Thread::new(title);

        let mut threads = self.load()?;
        threads.push(thread.clone());
        self.save(&threads)?;

        Ok(thread)
    }

    /// Touch thread (update updated_at)
    pub fn touch_thread(&self, thread_id: &str) -> Result<()> {
        let mut threads = self.load()?;
        let thread = threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        thread.updated_at = Utc::now();
        self.save(&threads)
    }

    /// Drop the thread from the list; returns whether it was present
    pub fn remove_thread(&self, thread_id: &str) -> Result<bool> {
        let mut threads = self.load()?;
        let before = threads.len();
        threads.retain(|t| t.id != thread_id);
        if threads.len() == before {
            return Ok(false);
        }
        self.save(&threads)?;
        Ok(true)
    }
}
