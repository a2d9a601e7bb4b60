use obox_llm::LlmError;
use obox_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Unknown chat action: {0}")]
    UnknownAction(String),

    #[error("Thread {0} already has messages")]
    ThreadNotEmpty(String),

    #[error("Message {0} not found in thread")]
    MessageNotFound(String),

    #[error("Thread id is required to create a model message")]
    MissingThreadId,

    #[error("Prompt does not end with a user turn")]
    EmptyPrompt,

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Query exceeds {limit} characters")]
    QueryTooLong { limit: usize },

    #[error("A response is already being generated")]
    Busy,

    #[error("No pending chat action")]
    NothingPending,

    #[error("Session is missing {0}")]
    Incomplete(&'static str),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl ChatError {
    /// Broken usage or history invariants, as opposed to rejected input or I/O
    pub fn is_invariant(&self) -> bool {
        matches!(
            self,
            Self::UnknownAction(_)
                | Self::ThreadNotEmpty(_)
                | Self::MessageNotFound(_)
                | Self::MissingThreadId
                | Self::EmptyPrompt
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
