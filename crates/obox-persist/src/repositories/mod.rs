mod credential;
mod message;
mod preferences;
mod search;
mod thread;

pub use credential::CredentialRepository;
pub use message::MessageRepository;
pub use preferences::PreferencesRepository;
pub use search::SearchCacheRepository;
pub use thread::ThreadRepository;
