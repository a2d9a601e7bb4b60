use reqwest::Response;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::buffer_utils::{parse_sse_stream, SseFrameParser};
use crate::error::Result;
use crate::traits::FragmentStream;

/// One `data:` payload of a `streamGenerateContent?alt=sse` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ChunkError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ChunkPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}

impl GenerateContentChunk {
    /// Text of the first candidate; non-blank parts joined by a paragraph break
    pub fn content(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .filter(|text| !text.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
            .unwrap_or_default()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }
}

/// A frame may carry a single response object or a batch of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChunkPayload {
    Batch(Vec<GenerateContentChunk>),
    Single(GenerateContentChunk),
}

impl ChunkPayload {
    /// Extracted text; an API error embedded in the stream is surfaced as text
    pub fn text(&self) -> String {
        match self {
            Self::Single(chunk) => {
                let content = chunk.content();
                if !content.is_empty() {
                    return content;
                }
                chunk
                    .error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_default()
            }
            Self::Batch(chunks) => chunks.iter().map(GenerateContentChunk::content).collect(),
        }
    }
}

/// Frame parser for Gemini SSE payloads
pub struct GeminiFrameParser;

impl SseFrameParser for GeminiFrameParser {
    fn parse_frame(&self, data: &str) -> Result<Option<String>> {
        let payload: ChunkPayload = serde_json::from_str(data)?;
        let text = payload.text();

        if let ChunkPayload::Single(chunk) = &payload {
            if let Some(reason) = chunk.finish_reason() {
                tracing::debug!("Gemini candidate finished: {}", reason);
            }
        }

        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

pub fn parse_gemini_sse_stream(response: Response, cancel: CancellationToken) -> FragmentStream {
    parse_sse_stream(response.bytes_stream(), GeminiFrameParser, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Option<String> {
        GeminiFrameParser.parse_frame(data).unwrap()
    }

    #[test]
    fn test_single_part() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Xin chào"}],"role":"model"}}]}"#;
        assert_eq!(parse(data), Some("Xin chào".to_string()));
    }

    #[test]
    fn test_multiple_parts_joined_with_paragraph_break() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"one"},{"text":"  "},{"text":"two"}]}}]}"#;
        assert_eq!(parse(data), Some("one\n\ntwo".to_string()));
    }

    #[test]
    fn test_batch_payload_is_concatenated() {
        let data = r#"[{"candidates":[{"content":{"parts":[{"text":"a"}]}}]},{"candidates":[{"content":{"parts":[{"text":"b"}]}}]}]"#;
        assert_eq!(parse(data), Some("ab".to_string()));
    }

    #[test]
    fn test_error_message_surfaces_as_text() {
        let data = r#"{"error":{"code":429,"message":"Resource has been exhausted"}}"#;
        assert_eq!(parse(data), Some("Resource has been exhausted".to_string()));
    }

    #[test]
    fn test_usage_only_frame_has_no_text() {
        let data = r#"{"candidates":[{"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert_eq!(parse(data), None);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(GeminiFrameParser.parse_frame("{not json").is_err());
    }
}
