use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::dbs::{keys, read_json, write_json};
use crate::error::Result;
use crate::models::StoredCredential;
use crate::trait_client::{CredentialStore, KeyValueStore};

/// Credential capability backed by the `api_key` entry
#[derive(Clone)]
pub struct CredentialRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl CredentialStore for CredentialRepository {
    fn get(&self) -> Result<Option<String>> {
        let Some(stored) = read_json::<StoredCredential>(self.store.as_ref(), keys::API_KEY)? else {
            return Ok(None);
        };

        if stored.is_expired(Utc::now()) {
            debug!("Stored API key expired, removing it");
            self.store.remove(keys::API_KEY)?;
            return Ok(None);
        }
        Ok(Some(stored.key))
    }

    fn set(&self, key: &str, ttl: Option<Duration>) -> Result<()> {
        let stored = StoredCredential {
            key: key.trim().to_string(),
            expires_at: ttl.map(|ttl| Utc::now() + ttl),
        };
        write_json(self.store.as_ref(), keys::API_KEY, &stored)
    }

    fn expire(&self) -> Result<()> {
        self.store.remove(keys::API_KEY)
    }
}
