pub mod error;
pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod gemini;
pub mod config;

pub use error::{LlmError, Result};
pub use traits::{ContentGenerator, FragmentStream, GenerateRequest};
pub use streaming::{parse_gemini_sse_stream, ChunkPayload, GeminiFrameParser, GenerateContentChunk};
pub use buffer_utils::{
    parse_sse_stream, AnimationConfig, AnimationOutcome, ResponseAnimator, SseFrameBuffer,
    SseFrameParser,
};
pub use gemini::GeminiClient;
pub use config::{GeminiConfig, DEFAULT_MODEL, DEFAULT_REASONING_MODEL};
pub use types::{GenerateContentRequest, Part, Role, SystemInstruction, Turn};

// Re-exported so callers can cancel generations without a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
