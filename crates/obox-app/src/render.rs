use obox_chat::{group_for_display, Message, Role, Section, Thread, QUERY_SUGGESTIONS};
use std::fmt::Write;

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Model => "obox",
    }
}

/// Conversation as shown: one entry per same-role run
pub fn conversation(messages: &[Message]) -> String {
    let mut out = String::new();
    for group in group_for_display(messages) {
        let shown = group.shown;
        let _ = writeln!(out, "{} ({}):", speaker(shown.role), shown.id);
        let _ = writeln!(out, "{}", shown.text);
        if let Some(search_id) = &shown.search_id {
            let _ = writeln!(out, "  sources: /sources {}", search_id);
        }
        if group.has_multiple() {
            let _ = writeln!(out, "  {} earlier version(s):", group.collapsed.len());
            for older in &group.collapsed {
                let _ = writeln!(out, "    - {} {}", older.id, preview(&older.text, 60));
            }
        }
        out.push('\n');
    }
    out
}

pub fn sources(sections: &[Section]) -> String {
    if sections.is_empty() {
        return "No sources.\n".to_string();
    }
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        let _ = writeln!(out, "[{}] {}", i + 1, section.title);
        let _ = writeln!(out, "    {}", section.url);
        let _ = writeln!(out, "    {}", preview(&section.text, 120));
    }
    out
}

pub fn threads(threads: &[Thread]) -> String {
    if threads.is_empty() {
        return "No threads yet.\n".to_string();
    }
    let mut out = String::new();
    for thread in threads {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            thread.updated_at.format("%Y-%m-%d %H:%M"),
            thread.id,
            thread.title
        );
    }
    out
}

pub fn suggestions() -> String {
    let mut out = String::from("Try one of these (/suggest <n>):\n");
    for (i, query) in QUERY_SUGGESTIONS.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, query);
    }
    out
}

/// Short form of an API key for confirmation messages
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 6 {
        return key.to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// First `max` characters on one line
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{}…", cut)
}
