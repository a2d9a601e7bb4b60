// Gemini streaming client implementation

use crate::config::GeminiConfig;
use crate::error::{LlmError, Result};
use crate::streaming::parse_gemini_sse_stream;
use crate::traits::{ContentGenerator, FragmentStream, GenerateRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini client (HTTP direct, no SDK)
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create new client; the key may also be supplied per request
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: GEMINI_API_BASE.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let client = Self::new(config.api_key.clone())?;
        Ok(match &config.base_url {
            Some(base_url) => client.with_base_url(base_url.clone()),
            None => client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}:streamGenerateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_stream(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream> {
        let api_key = request
            .api_key
            .clone()
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| LlmError::Credential("No API key configured".to_string()))?;

        debug!("Using instruction: {}", request.instruction);
        for turn in &request.contents {
            debug!("Prompt turn {}: {:?}", turn.role, turn.text());
        }
        info!(
            "Requesting {} with {} turns",
            request.model,
            request.contents.len()
        );

        let send = self
            .http_client
            .post(self.endpoint(&request.model))
            .query(&[("alt", "sse"), ("key", api_key.as_str())])
            .json(&request.to_body())
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LlmError::Cancelled),
            response = send => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = LlmError::from_status(status.as_u16(), &body);
            warn!("Generation request rejected: {}", error);
            return Err(error);
        }

        Ok(parse_gemini_sse_stream(response, cancel))
    }
}
