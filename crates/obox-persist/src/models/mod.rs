mod message;
mod preferences;
mod section;
mod thread;

pub use message::{Message, Role};
pub use preferences::{StoredCredential, Theme};
pub use section::Section;
pub use thread::Thread;
