use obox_llm::{AnimationConfig, DEFAULT_MODEL, DEFAULT_REASONING_MODEL};

/// Starter queries offered on the home view
pub const QUERY_SUGGESTIONS: &[&str] = &[
    "nextdns",
    "web tải nhạc",
    "so sánh deepseek với chatgpt",
    "ngành xây dựng",
    "ngân hàng tốt nhất",
    "ưu điểm ví momo",
    "chrome extension",
    "đánh giá iphone 16e",
    "RAG là gì",
];

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub reasoning_model: String,
    pub animation: AnimationConfig,
    /// Longest accepted query, in characters
    pub max_query_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            animation: AnimationConfig::default(),
            max_query_chars: 5000,
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models(mut self, model: impl Into<String>, reasoning_model: impl Into<String>) -> Self {
        self.model = model.into();
        self.reasoning_model = reasoning_model.into();
        self
    }

    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_max_query_chars(mut self, max: usize) -> Self {
        self.max_query_chars = max;
        self
    }

    pub fn model_for(&self, reasoning: bool) -> &str {
        if reasoning {
            &self.reasoning_model
        } else {
            &self.model
        }
    }
}
