use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::buffering::SseFrameBuffer;
use crate::error::{LlmError, Result};
use crate::traits::FragmentStream;

/// Strategy pattern for turning SSE frame payloads into text fragments
pub trait SseFrameParser: Send {
    /// Parse one frame payload. `Ok(None)` means the frame carried no text.
    fn parse_frame(&self, data: &str) -> Result<Option<String>>;

    /// Check if this payload signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data.trim() == "[DONE]"
    }
}

/// Generic SSE decoder over any byte-chunk stream
///
/// Malformed frames are logged and skipped. The stream ends at end of body,
/// at a `[DONE]` payload, or as soon as `cancel` fires; cancellation is not
/// reported as an error.
pub fn parse_sse_stream<S, B, E, P>(body: S, parser: P, cancel: CancellationToken) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
    P: SseFrameParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(body);
        let mut buffer = SseFrameBuffer::with_capacity(4096);

        'read: loop {
            if cancel.is_cancelled() {
                debug!("SSE decoding cancelled before read");
                break;
            }

            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("SSE decoding cancelled during read");
                    break;
                }
                chunk = byte_chunks.next() => chunk,
            };

            let end_of_body = match chunk {
                Some(Ok(bytes)) => {
                    buffer.extend(bytes.as_ref());
                    false
                }
                Some(Err(e)) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    break;
                }
                None => true,
            };

            // Process all complete frames in buffer
            loop {
                if cancel.is_cancelled() {
                    debug!("SSE decoding cancelled between frames");
                    break 'read;
                }

                let event = if end_of_body {
                    buffer.finish()
                } else {
                    buffer.next_event()
                };

                let data = match event {
                    Some(Ok(data)) => data,
                    Some(Err(e)) => {
                        warn!("Skipping undecodable SSE line: {}", e);
                        continue;
                    }
                    None => break,
                };

                if parser.is_done_marker(&data) {
                    debug!("SSE stream reached [DONE]");
                    break 'read;
                }

                match parser.parse_frame(&data) {
                    Ok(Some(text)) => yield Ok(text),
                    Ok(None) => {}
                    Err(e) => warn!("Skipping malformed SSE frame: {} ({})", e, data),
                }
            }

            if end_of_body {
                break;
            }
        }
    })
}
