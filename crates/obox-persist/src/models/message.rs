use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use obox_llm::Role;

/// One entry of a thread's ordered message list
///
/// `text` of a model message starts empty and is filled when its
/// generation settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_id: Option<String>,
    pub text: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(thread_id: Option<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            search_id: None,
            text: text.into(),
            role,
            created_at: Some(Utc::now()),
        }
    }

    pub fn user(thread_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Some(thread_id.into()), Role::User, text)
    }

    /// Empty model message awaiting generation
    pub fn placeholder(thread_id: impl Into<String>) -> Self {
        Self::new(Some(thread_id.into()), Role::Model, "")
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_model(&self) -> bool {
        self.role == Role::Model
    }
}
