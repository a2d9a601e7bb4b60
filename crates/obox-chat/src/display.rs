use obox_persist::Message;
use std::cmp::Ordering;

/// One visible entry: the newest message of a same-role run
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayGroup<'a> {
    pub shown: &'a Message,
    /// Older alternatives, newest first; undated ones last
    pub collapsed: Vec<&'a Message>,
}

impl DisplayGroup<'_> {
    pub fn has_multiple(&self) -> bool {
        !self.collapsed.is_empty()
    }
}

/// Newer of two messages; an undated message loses to a dated one
fn newer<'a>(latest: &'a Message, current: &'a Message) -> &'a Message {
    match (latest.created_at, current.created_at) {
        (None, _) => current,
        (_, None) => latest,
        (Some(a), Some(b)) if b > a => current,
        _ => latest,
    }
}

fn newest_first(a: &&Message, b: &&Message) -> Ordering {
    match (a.created_at, b.created_at) {
        (None, None) => Ordering::Equal,
        (None, _) => Ordering::Greater,
        (_, None) => Ordering::Less,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

/// Group consecutive same-role messages for display
pub fn group_for_display(messages: &[Message]) -> Vec<DisplayGroup<'_>> {
    messages
        .chunk_by(|a, b| a.role == b.role)
        .map(|run| {
            let shown = run[1..].iter().fold(&run[0], newer);
            let mut collapsed: Vec<&Message> = run.iter().filter(|m| m.id != shown.id).collect();
            collapsed.sort_by(newest_first);
            DisplayGroup { shown, collapsed }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use obox_persist::Role;

    fn at(role: Role, text: &str, offset_secs: Option<i64>) -> Message {
        let mut message = Message::new(Some("t1".to_string()), role, text);
        message.created_at = offset_secs.map(|s| Utc::now() + Duration::seconds(s));
        message
    }

    #[test]
    fn test_alternating_roles_are_separate_groups() {
        let messages = vec![
            at(Role::User, "q1", Some(0)),
            at(Role::Model, "a1", Some(1)),
            at(Role::User, "q2", Some(2)),
        ];

        let groups = group_for_display(&messages);

        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| !g.has_multiple()));
    }

    #[test]
    fn test_latest_of_run_is_shown() {
        let messages = vec![
            at(Role::User, "q1", Some(0)),
            at(Role::Model, "a1", Some(1)),
            at(Role::Model, "a2", Some(3)),
            at(Role::Model, "a3", Some(2)),
        ];

        let groups = group_for_display(&messages);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].shown.text, "a2");
        let collapsed: Vec<&str> = groups[1].collapsed.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(collapsed, vec!["a3", "a1"]);
    }

    #[test]
    fn test_undated_messages_sort_last() {
        let messages = vec![
            at(Role::Model, "undated", None),
            at(Role::Model, "old", Some(1)),
            at(Role::Model, "new", Some(5)),
            at(Role::Model, "mid", Some(3)),
        ];

        let groups = group_for_display(&messages);

        assert_eq!(groups[0].shown.text, "new");
        let collapsed: Vec<&str> = groups[0].collapsed.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(collapsed, vec!["mid", "old", "undated"]);
    }

    #[test]
    fn test_empty_history() {
        assert!(group_for_display(&[]).is_empty());
    }
}
