use chrono::Duration;

use crate::error::Result;

/// Synchronous string key-value storage
///
/// Every write is visible to the next read. There is no atomicity across
/// keys; callers that touch several keys must tolerate a partial write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Narrow capability over the stored API key override
pub trait CredentialStore: Send + Sync {
    /// Current override, or None when absent or expired
    fn get(&self) -> Result<Option<String>>;

    /// Store an override, optionally expiring after `ttl`
    fn set(&self, key: &str, ttl: Option<Duration>) -> Result<()>;

    /// Drop the override
    fn expire(&self) -> Result<()>;
}
