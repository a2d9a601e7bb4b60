use std::sync::Arc;

use crate::dbs::{keys, read_json, write_json};
use crate::error::Result;
use crate::models::Message;
use crate::trait_client::KeyValueStore;

/// Per-thread message lists, stored whole under `messages_<threadId>`
#[derive(Clone)]
pub struct MessageRepository {
    store: Arc<dyn KeyValueStore>,
}

impl MessageRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Get all messages for a thread, in turn order
    pub fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        Ok(read_json(self.store.as_ref(), &keys::messages(thread_id))?.unwrap_or_default())
    }

    /// Replace the thread's message list
    pub fn save_messages(&self, thread_id: &str, messages: &[Message]) -> Result<()> {
        write_json(self.store.as_ref(), &keys::messages(thread_id), messages)
    }

    pub fn delete_messages(&self, thread_id: &str) -> Result<()> {
        self.store.remove(&keys::messages(thread_id))
    }
}
