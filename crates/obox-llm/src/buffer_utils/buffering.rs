use crate::error::{LlmError, Result};
use std::collections::VecDeque;

/// Circular buffer that reassembles server-sent events from arbitrary byte chunks
///
/// Bytes stay queued until a full line is available, so a multi-byte UTF-8
/// sequence split across two reads is decoded intact.
pub struct SseFrameBuffer {
    buffer: VecDeque<u8>,
    data_lines: Vec<String>,
}

impl SseFrameBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            data_lines: Vec::new(),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the data payload of the next complete event
    ///
    /// Returns None until a blank line terminates an event that carried at
    /// least one `data:` field.
    pub fn next_event(&mut self) -> Option<Result<String>> {
        loop {
            let line = match self.next_line()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };

            if line.is_empty() {
                if self.data_lines.is_empty() {
                    continue;
                }
                return Some(Ok(self.take_data()));
            }

            self.accept_line(&line);
        }
    }

    /// Drain whatever event is left once the body has ended
    ///
    /// A final event without its blank-line terminator is still dispatched.
    pub fn finish(&mut self) -> Option<Result<String>> {
        if let Some(event) = self.next_event() {
            return Some(event);
        }

        if !self.buffer.is_empty() {
            let rest: Vec<u8> = self.buffer.drain(..).collect();
            match String::from_utf8(rest) {
                Ok(line) => self.accept_line(line.trim_end_matches('\r')),
                Err(e) => return Some(Err(LlmError::Stream(format!("Invalid UTF-8: {}", e)))),
            }
        }

        if self.data_lines.is_empty() {
            None
        } else {
            Some(Ok(self.take_data()))
        }
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.data_lines.is_empty()
    }

    /// Extract next line (up to \n) without its terminator
    fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        line_bytes.pop();
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }

        Some(
            String::from_utf8(line_bytes)
                .map_err(|e| LlmError::Stream(format!("Invalid UTF-8: {}", e))),
        )
    }

    // Only `data` fields matter here; comments and `event:`/`id:` lines are dropped
    fn accept_line(&mut self, line: &str) {
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.strip_prefix(' ').unwrap_or(data);
            self.data_lines.push(data.to_string());
        }
    }

    fn take_data(&mut self) -> String {
        std::mem::take(&mut self.data_lines).join("\n")
    }
}
