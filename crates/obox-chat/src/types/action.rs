use obox_persist::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

/// How a pending message changes the thread's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    /// First message of an empty thread
    New,
    /// Another user message at the end
    Append,
    /// Reserved; reconciles to no change
    UserRefresh,
    /// Another answer right after the subject message
    BotRefresh,
}

impl ChatAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Append => "append",
            Self::UserRefresh => "user_refresh",
            Self::BotRefresh => "bot_refresh",
        }
    }
}

impl fmt::Display for ChatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatAction {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "append" => Ok(Self::Append),
            "user_refresh" => Ok(Self::UserRefresh),
            "bot_refresh" => Ok(Self::BotRefresh),
            other => Err(ChatError::UnknownAction(other.to_string())),
        }
    }
}

/// Action plus the message it applies to
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub action: ChatAction,
    pub message: Message,
}

impl PendingAction {
    pub fn new(action: ChatAction, message: Message) -> Self {
        Self { action, message }
    }
}
