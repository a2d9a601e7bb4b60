use crate::error::Result;
use crate::types::{GenerateContentRequest, SystemInstruction, Turn};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Lazy sequence of text fragments produced by a streaming generation
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for streaming text generation
///
/// The returned stream observes `cancel` at every read and frame boundary and
/// ends quietly once it fires.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_stream(
        &self,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentStream>;
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub instruction: String,
    pub contents: Vec<Turn>,
    /// Overrides the key the client was built with
    pub api_key: Option<String>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, instruction: impl Into<String>, contents: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            contents,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn to_body(&self) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: SystemInstruction::new(self.instruction.clone()),
            contents: self.contents.clone(),
        }
    }
}
