pub mod action;
pub mod config;
pub mod events;

pub use action::{ChatAction, PendingAction};
pub use config::{ChatConfig, QUERY_SUGGESTIONS};
pub use events::TurnEvent;
