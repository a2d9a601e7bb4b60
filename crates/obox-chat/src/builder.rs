use obox_llm::ContentGenerator;
use obox_persist::PersistClient;
use obox_search::SectionSource;
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::{ChatError, Result};
use crate::session::ChatSession;
use crate::types::ChatConfig;

/// Builder for constructing a ChatSession with optional components
#[derive(Default)]
pub struct ChatSessionBuilder {
    generator: Option<Arc<dyn ContentGenerator>>,
    search: Option<Arc<dyn SectionSource>>,
    persist: Option<PersistClient>,
    context: Option<AppContext>,
    config: ChatConfig,
}

impl ChatSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation client
    pub fn generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Enable source search
    pub fn search(mut self, search: Arc<dyn SectionSource>) -> Self {
        self.search = Some(search);
        self
    }

    /// Storage; defaults to an in-memory store
    pub fn persist(mut self, persist: PersistClient) -> Self {
        self.persist = Some(persist);
        self
    }

    /// Share an existing context; defaults to one built from the storage
    pub fn context(mut self, context: AppContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        let generator = self
            .generator
            .ok_or(ChatError::Incomplete("a content generator"))?;
        let persist = self.persist.unwrap_or_else(PersistClient::in_memory);
        let context = self
            .context
            .unwrap_or_else(|| AppContext::new(persist.clone()));

        Ok(ChatSession::new(
            context,
            persist,
            generator,
            self.search,
            self.config,
        ))
    }
}
