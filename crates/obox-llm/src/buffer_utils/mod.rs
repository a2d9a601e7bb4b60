mod buffering;
mod sse_parser;
mod animation;

pub use buffering::SseFrameBuffer;
pub use sse_parser::{SseFrameParser, parse_sse_stream};
pub use animation::{AnimationConfig, AnimationOutcome, ResponseAnimator};
