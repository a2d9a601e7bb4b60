use obox_persist::Message;
use serde::{Deserialize, Serialize};

/// Progress of one generation turn, as seen by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Placeholder inserted and persisted
    Started {
        thread_id: String,
        message_id: String,
    },

    /// Sections found and cached for this answer
    Sources {
        search_id: String,
        count: usize,
    },

    /// One animation frame
    Delta {
        display: String,
        fresh: String,
    },

    Completed {
        message: Message,
    },

    /// The placeholder now carries the error text
    Failed {
        message: Message,
        error: String,
        credential: bool,
    },

    /// `message.text` holds what had been shown
    Cancelled {
        message: Message,
    },

    /// Nothing to generate for this action
    Skipped,

    /// The turn could not run at all
    Error {
        message: String,
    },
}

impl TurnEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Started { .. } | Self::Sources { .. } | Self::Delta { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_tagged() {
        let event = TurnEvent::Sources {
            search_id: "s1".to_string(),
            count: 3,
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "sources");
        assert_eq!(value["search_id"], "s1");
        assert!(!event.is_terminal());
        assert!(TurnEvent::Skipped.is_terminal());
    }
}
