use obox_persist::Message;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::types::{ChatAction, PendingAction};

/// Message list after applying a pending action
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub messages: Vec<Message>,
    /// Placeholder awaiting generation, if the action produced one
    pub active_id: Option<String>,
}

fn placeholder(thread_id: Option<&str>) -> Result<Message> {
    let thread_id = thread_id.ok_or(ChatError::MissingThreadId)?;
    Ok(Message::placeholder(thread_id))
}

/// Apply `pending` to the thread's current `messages`
///
/// Every action except `user_refresh` inserts exactly one empty model
/// message and names it as the active target.
pub fn reconcile(
    thread_id: Option<&str>,
    messages: &[Message],
    pending: &PendingAction,
) -> Result<Reconciled> {
    match pending.action {
        ChatAction::New => {
            if !messages.is_empty() {
                return Err(ChatError::ThreadNotEmpty(
                    thread_id.unwrap_or_default().to_string(),
                ));
            }
            let model = placeholder(thread_id)?;
            let active_id = model.id.clone();
            Ok(Reconciled {
                messages: vec![pending.message.clone(), model],
                active_id: Some(active_id),
            })
        }
        ChatAction::Append => {
            let model = placeholder(thread_id)?;
            let active_id = model.id.clone();
            let mut next = Vec::with_capacity(messages.len() + 2);
            next.extend_from_slice(messages);
            next.push(pending.message.clone());
            next.push(model);
            Ok(Reconciled {
                messages: next,
                active_id: Some(active_id),
            })
        }
        ChatAction::UserRefresh => {
            debug!("user_refresh for {} leaves the thread unchanged", pending.message.id);
            Ok(Reconciled {
                messages: messages.to_vec(),
                active_id: None,
            })
        }
        ChatAction::BotRefresh => {
            let position = messages
                .iter()
                .position(|m| m.id == pending.message.id)
                .ok_or_else(|| ChatError::MessageNotFound(pending.message.id.clone()))?;

            let model = placeholder(thread_id)?;
            let active_id = model.id.clone();
            let mut next = messages.to_vec();
            next.insert(position + 1, model);
            Ok(Reconciled {
                messages: next,
                active_id: Some(active_id),
            })
        }
    }
}

/// Replace the text of the message with `id`
pub fn set_message_text(messages: &mut [Message], id: &str, text: impl Into<String>) -> Result<()> {
    let message = messages
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| ChatError::MessageNotFound(id.to_string()))?;
    message.text = text.into();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use obox_persist::Role;

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    fn model(thread_id: &str, text: &str) -> Message {
        Message::new(Some(thread_id.to_string()), Role::Model, text)
    }

    #[test]
    fn test_new_on_empty_thread() {
        let user = Message::user("t1", "q");
        let pending = PendingAction::new(ChatAction::New, user.clone());

        let out = reconcile(Some("t1"), &[], &pending).unwrap();

        assert_eq!(out.messages.len(), 2);
        assert_eq!(out.messages[0], user);
        assert!(out.messages[1].is_model());
        assert!(out.messages[1].text.is_empty());
        assert_eq!(out.messages[1].thread_id.as_deref(), Some("t1"));
        assert_eq!(out.active_id.as_deref(), Some(out.messages[1].id.as_str()));
    }

    #[test]
    fn test_new_on_populated_thread_is_fatal() {
        let existing = vec![Message::user("t1", "old")];
        let pending = PendingAction::new(ChatAction::New, Message::user("t1", "q"));

        let err = reconcile(Some("t1"), &existing, &pending).unwrap_err();

        assert!(matches!(err, ChatError::ThreadNotEmpty(_)));
    }

    #[test]
    fn test_append_adds_user_then_placeholder() {
        let existing = vec![Message::user("t1", "q1"), model("t1", "a1")];
        let user = Message::user("t1", "q2");
        let pending = PendingAction::new(ChatAction::Append, user.clone());

        let out = reconcile(Some("t1"), &existing, &pending).unwrap();

        assert_eq!(out.messages.len(), 4);
        assert_eq!(out.messages[2], user);
        assert!(out.messages[3].is_model());
        assert_eq!(out.active_id.as_deref(), Some(out.messages[3].id.as_str()));
    }

    #[test]
    fn test_bot_refresh_inserts_after_subject() {
        let u1 = Message::user("t1", "q1");
        let m1 = model("t1", "a1");
        let u2 = Message::user("t1", "q2");
        let m2 = model("t1", "a2");
        let existing = vec![u1.clone(), m1.clone(), u2.clone(), m2.clone()];
        let pending = PendingAction::new(ChatAction::BotRefresh, m1.clone());

        let out = reconcile(Some("t1"), &existing, &pending).unwrap();

        let active = out.active_id.clone().unwrap();
        assert_eq!(
            ids(&out.messages),
            vec![u1.id.as_str(), m1.id.as_str(), active.as_str(), u2.id.as_str(), m2.id.as_str()]
        );
    }

    #[test]
    fn test_bot_refresh_at_end() {
        let u1 = Message::user("t1", "q1");
        let m1 = model("t1", "a1");
        let pending = PendingAction::new(ChatAction::BotRefresh, m1.clone());

        let out = reconcile(Some("t1"), &[u1, m1], &pending).unwrap();

        assert_eq!(out.messages.len(), 3);
        assert_eq!(out.active_id.as_deref(), Some(out.messages[2].id.as_str()));
    }

    #[test]
    fn test_bot_refresh_missing_subject_is_fatal() {
        let existing = vec![Message::user("t1", "q1")];
        let pending = PendingAction::new(ChatAction::BotRefresh, model("t1", "gone"));

        let err = reconcile(Some("t1"), &existing, &pending).unwrap_err();

        assert!(matches!(err, ChatError::MessageNotFound(_)));
        assert!(err.is_invariant());
    }

    #[test]
    fn test_user_refresh_is_noop() {
        let existing = vec![Message::user("t1", "q1"), model("t1", "a1")];
        let pending = PendingAction::new(ChatAction::UserRefresh, existing[0].clone());

        let out = reconcile(Some("t1"), &existing, &pending).unwrap();

        assert_eq!(out.messages, existing);
        assert!(out.active_id.is_none());
    }

    #[test]
    fn test_missing_thread_id_is_fatal() {
        let pending = PendingAction::new(ChatAction::Append, Message::user("t1", "q"));

        assert!(matches!(
            reconcile(None, &[], &pending),
            Err(ChatError::MissingThreadId)
        ));
    }

    #[test]
    fn test_set_message_text() {
        let mut messages = vec![model("t1", "")];
        let id = messages[0].id.clone();

        set_message_text(&mut messages, &id, "done").unwrap();

        assert_eq!(messages[0].text, "done");
        assert!(set_message_text(&mut messages, "nope", "x").is_err());
    }
}
