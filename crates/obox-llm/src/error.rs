use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("API key appears broken or limit reached: {0}")]
    Credential(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid frame payload: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Generation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl LlmError {
    /// Classify a non-2xx response from the generation endpoint.
    ///
    /// 401/403 are always credential failures. Gemini answers an invalid key
    /// with a 400 whose message names the key, so that case is a credential
    /// failure too.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        let mentions_key = {
            let lower = message.to_lowercase();
            lower.contains("api key") || lower.contains("api_key")
        };

        match status {
            401 | 403 => LlmError::Credential(message),
            400 if mentions_key => LlmError::Credential(message),
            _ => LlmError::Status { status, message },
        }
    }

    /// The user can fix this by supplying a different API key
    pub fn is_credential(&self) -> bool {
        matches!(self, LlmError::Credential(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LlmError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_is_credential() {
        let err = LlmError::from_status(403, r#"{"error":{"message":"Permission denied"}}"#);
        assert!(err.is_credential());
    }

    #[test]
    fn test_bad_request_naming_key_is_credential() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let err = LlmError::from_status(400, body);
        assert!(err.is_credential());
    }

    #[test]
    fn test_server_error_keeps_status() {
        let err = LlmError::from_status(500, "upstream exploded");
        match err {
            LlmError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("Expected Status, got {:?}", other),
        }
    }
}
