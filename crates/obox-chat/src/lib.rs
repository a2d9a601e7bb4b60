pub mod builder;
pub mod context;
pub mod display;
pub mod error;
pub mod prompt;
pub mod reconciler;
pub mod session;
pub mod types;

pub use builder::ChatSessionBuilder;
pub use context::AppContext;
pub use display::{group_for_display, DisplayGroup};
pub use error::{ChatError, Result};
pub use prompt::{
    assemble_turns, augment_query, build_prompt, Prompt, PromptTemplate, AUGMENTED_INSTRUCTION,
    PLAIN_INSTRUCTION,
};
pub use reconciler::{reconcile, set_message_text, Reconciled};
pub use session::{ChatSession, TurnOutcome, ERROR_RESPONSE_TEXT};
pub use types::{ChatAction, ChatConfig, PendingAction, TurnEvent, QUERY_SUGGESTIONS};

// Re-export the records sessions hand back
pub use obox_persist::{Message, Role, Section, Theme, Thread};
