pub mod models;
pub mod repositories;
pub mod dbs;
pub mod client;
pub mod error;
pub mod builder;
pub mod trait_client;

pub use models::{Message, Role, Section, StoredCredential, Thread, Theme};
pub use repositories::{
    CredentialRepository, MessageRepository, PreferencesRepository, SearchCacheRepository,
    ThreadRepository,
};
pub use dbs::{keys, FileStore, MemoryStore};
pub use client::PersistClient;
pub use error::{PersistError, Result};
pub use builder::PersistClientBuilder;
pub use trait_client::{CredentialStore, KeyValueStore};
