use obox_llm::{Role, Turn};
use obox_persist::{Message, Section};
use tracing::debug;

use crate::error::{ChatError, Result};

pub const PLAIN_INSTRUCTION: &str = "Bạn là trợ lý Obox. Tập trung trả lời truy vấn theo các hướng dẫn sau:
- Diễn đạt phải chi tiết, đầy đủ và toàn diện. Phân tích sâu sắc các khái niệm và thông tin liên quan bằng từ ngữ phổ thông. Đánh dấu từ khóa, thuật ngữ, từ đầy đủ của từ viết tắt trong dấu backtick. 
Ví dụ về định dạng: \"1. WARP là một mạng riêng ảo (`Virtual Private Network, VPN`) tích hợp trong ứng dụng `1.1.1.1` của `Cloudflare`...\"";

pub const AUGMENTED_INSTRUCTION: &str = "Bạn là trợ lý Obox. Bạn được cung cấp tài liệu ngẫu nhiên được đặt trong thẻ XML có định dạng sau:
<sources>
Nguồn 1
---
Nguồn 2
</sources>.

Tập trung trả lời truy vấn đặt trong ba dấu nháy kép (\"\"\") theo các hướng dẫn sau:
- Đầu tiên, trả lời truy vấn bằng kiến thức của bạn.
- Nếu không có tài liệu liên quan đến truy vấn, hãy trả lời truy vấn bằng kiến thức của bạn.
- Đảm bảo câu trả lời phải liên quan đến truy vấn.
- Diễn đạt chi tiết, đầy đủ và toàn diện. Phân tích làm rõ sâu sắc các khái niệm và thông tin liên quan bằng từ ngữ phổ thông. Đánh dấu từ khóa, thuật ngữ, từ đầy đủ của từ viết tắt trong dấu backtick. 
Ví dụ về định dạng: \"1. WARP là một mạng riêng ảo (`Virtual Private Network, VPN`) tích hợp trong ứng dụng `1.1.1.1` của `Cloudflare`...\"";

/// Instruction and query layout for one turn, picked once per turn
#[derive(Debug, Clone, PartialEq)]
pub enum PromptTemplate {
    Plain,
    Augmented(Vec<Section>),
}

impl PromptTemplate {
    /// `Augmented` only when there is at least one section
    pub fn from_sections(sections: Vec<Section>) -> Self {
        if sections.is_empty() {
            Self::Plain
        } else {
            Self::Augmented(sections)
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Plain => PLAIN_INSTRUCTION,
            Self::Augmented(_) => AUGMENTED_INSTRUCTION,
        }
    }

    pub fn sections(&self) -> &[Section] {
        match self {
            Self::Plain => &[],
            Self::Augmented(sections) => sections,
        }
    }

    /// Rewrite the final user turn for this template
    pub fn apply(&self, turns: &mut [Turn]) -> Result<()> {
        let Self::Augmented(sections) = self else {
            return Ok(());
        };
        let last = turns
            .last_mut()
            .filter(|turn| turn.role == Role::User)
            .ok_or(ChatError::EmptyPrompt)?;
        let query = augment_query(last.text(), sections);
        last.set_text(query);
        Ok(())
    }
}

/// Wrap a query and the section texts in the source-aware layout
pub fn augment_query(query: &str, sections: &[Section]) -> String {
    let sources = sections
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n");
    format!("Truy vấn: \"\"\"{}\"\"\"\n\n<sources>\n{}\n</sources>", query, sources)
}

/// History sent for the placeholder `active_id`
///
/// Messages after the placeholder are ignored. Of each run of same-role
/// messages only the last is kept, and a trailing model message (the
/// placeholder itself, normally) is dropped. Blank model messages are
/// never sent.
pub fn assemble_turns(messages: &[Message], active_id: &str) -> Result<Vec<Turn>> {
    let end = messages
        .iter()
        .position(|m| m.id == active_id)
        .ok_or_else(|| ChatError::MessageNotFound(active_id.to_string()))?;
    let window = &messages[..=end];

    let turns: Vec<Turn> = window
        .iter()
        .enumerate()
        .filter(|(index, message)| match window.get(index + 1) {
            Some(next) => next.role != message.role,
            None => !message.is_model(),
        })
        // An answer cancelled before any text was shown has nothing to send
        .filter(|(_, message)| !(message.is_model() && message.text.trim().is_empty()))
        .map(|(_, message)| Turn::new(message.role, message.text.clone()))
        .collect();

    match turns.last() {
        Some(turn) if turn.role == Role::User => Ok(turns),
        _ => Err(ChatError::EmptyPrompt),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub instruction: String,
    pub turns: Vec<Turn>,
}

impl Prompt {
    /// Text of the final user turn
    pub fn query(&self) -> &str {
        self.turns.last().map(Turn::text).unwrap_or_default()
    }
}

pub fn build_prompt(messages: &[Message], active_id: &str, template: &PromptTemplate) -> Result<Prompt> {
    let mut turns = assemble_turns(messages, active_id)?;
    template.apply(&mut turns)?;
    debug!(
        "Built prompt with {} turns and {} sources",
        turns.len(),
        template.sections().len()
    );
    Ok(Prompt {
        instruction: template.instruction().to_string(),
        turns,
    })
}
