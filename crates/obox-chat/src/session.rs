use chrono::Duration;
use obox_llm::{
    AnimationOutcome, CancellationToken, ContentGenerator, GenerateRequest, LlmError,
    ResponseAnimator,
};
use obox_persist::{CredentialStore, Message, PersistClient, Section, Thread};
use obox_search::SectionSource;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::builder::ChatSessionBuilder;
use crate::context::AppContext;
use crate::error::{ChatError, Result};
use crate::prompt::{assemble_turns, build_prompt, PromptTemplate};
use crate::reconciler::{reconcile, set_message_text, Reconciled};
use crate::types::{ChatAction, ChatConfig, PendingAction, TurnEvent};

/// Text left in a placeholder whose generation failed
pub const ERROR_RESPONSE_TEXT: &str = "Error generating response. Please try again.";

/// How a generation turn settled
#[derive(Debug)]
pub enum TurnOutcome {
    /// The action produced no placeholder
    Skipped,
    Completed { message: Message },
    Failed { message: Message, error: LlmError },
    /// The placeholder keeps what had been shown
    Cancelled { message: Message },
}

impl TurnOutcome {
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Skipped => None,
            Self::Completed { message }
            | Self::Failed { message, .. }
            | Self::Cancelled { message } => Some(message),
        }
    }

    /// The key was rejected; retrying with a new one is worthwhile
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, Self::Failed { error, .. } if error.is_credential())
    }
}

impl From<TurnOutcome> for TurnEvent {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Skipped => TurnEvent::Skipped,
            TurnOutcome::Completed { message } => TurnEvent::Completed { message },
            TurnOutcome::Failed { message, error } => TurnEvent::Failed {
                credential: error.is_credential(),
                error: error.to_string(),
                message,
            },
            TurnOutcome::Cancelled { message } => TurnEvent::Cancelled { message },
        }
    }
}

/// Releases the context's generation slot when a turn ends, however it ends
struct GenerationGuard<'a>(&'a AppContext);

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.0.end_generation();
    }
}

/// Drives turns: query submission, reconciliation, search, generation and persistence
pub struct ChatSession {
    context: AppContext,
    persist: PersistClient,
    generator: Arc<dyn ContentGenerator>,
    search: Option<Arc<dyn SectionSource>>,
    config: ChatConfig,
}

impl ChatSession {
    pub(crate) fn new(
        context: AppContext,
        persist: PersistClient,
        generator: Arc<dyn ContentGenerator>,
        search: Option<Arc<dyn SectionSource>>,
        config: ChatConfig,
    ) -> Self {
        Self {
            context,
            persist,
            generator,
            search,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> ChatSessionBuilder {
        ChatSessionBuilder::new()
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn persist(&self) -> &PersistClient {
        &self.persist
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Threads for the sidebar, most recently updated first
    pub fn threads(&self) -> Result<Vec<Thread>> {
        Ok(self.persist.threads().list_threads()?)
    }

    /// Validate a query and record it as the pending action
    ///
    /// Without a thread a new one is created, titled by the trimmed query.
    /// Returns the thread the query belongs to.
    pub fn submit_query(&self, thread_id: Option<&str>, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyQuery);
        }
        if text.chars().count() > self.config.max_query_chars {
            return Err(ChatError::QueryTooLong {
                limit: self.config.max_query_chars,
            });
        }
        if self.context.is_generating() {
            return Err(ChatError::Busy);
        }

        let (thread_id, action) = match thread_id {
            Some(id) => (id.to_string(), ChatAction::Append),
            None => {
                let thread = self.persist.threads().create_thread(text)?;
                info!("Created thread {} ({:?})", thread.id, thread.title);
                (thread.id, ChatAction::New)
            }
        };

        let message = Message::user(thread_id.clone(), text);
        self.context
            .set_pending(Some(PendingAction::new(action, message)));
        Ok(thread_id)
    }

    /// Ask for another answer placed right after `message_id`
    pub fn regenerate(&self, thread_id: &str, message_id: &str) -> Result<()> {
        if self.context.is_generating() {
            return Err(ChatError::Busy);
        }

        let subject = self
            .persist
            .messages()
            .get_messages(thread_id)?
            .into_iter()
            .find(|m| m.id == message_id)
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;

        self.context
            .set_pending(Some(PendingAction::new(ChatAction::BotRefresh, subject)));
        Ok(())
    }

    /// Load a thread's messages; the source panel starts closed
    pub fn open_thread(&self, thread_id: &str) -> Result<Vec<Message>> {
        self.context.close_sources();
        let messages = self.persist.messages().get_messages(thread_id)?;
        debug!("Loaded {} messages for thread {}", messages.len(), thread_id);
        Ok(messages)
    }

    pub fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let shown = self.context.search_id();
        let messages = self.persist.messages().get_messages(thread_id)?;
        if messages
            .iter()
            .any(|m| m.search_id.is_some() && m.search_id == shown)
        {
            self.context.close_sources();
        }

        self.persist.delete_thread(thread_id)?;
        Ok(())
    }

    /// Cached sections of one answer; empty if none were kept
    pub fn sources(&self, search_id: &str) -> Result<Vec<Section>> {
        Ok(self
            .persist
            .searches()
            .get_sections(search_id)?
            .unwrap_or_default())
    }

    /// Toggle the source panel; Some(sections) when it ends up open
    pub fn toggle_sources(&self, search_id: &str) -> Result<Option<Vec<Section>>> {
        if self.context.toggle_sources(search_id) {
            Ok(Some(self.sources(search_id)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_api_key(&self, key: &str, ttl: Option<Duration>) -> Result<()> {
        self.persist.credentials().set(key, ttl)?;
        Ok(())
    }

    pub fn clear_api_key(&self) -> Result<()> {
        self.persist.credentials().expire()?;
        Ok(())
    }

    fn api_key_override(&self) -> Option<String> {
        self.persist.credentials().get().unwrap_or_else(|e| {
            warn!("Ignoring unreadable API key override: {}", e);
            None
        })
    }

    /// Search for `query` when enabled; any failure falls back to the plain template
    async fn resolve_template(&self, query: &str, cancel: &CancellationToken) -> PromptTemplate {
        let Some(search) = self.search.as_ref().filter(|_| self.context.search_enabled()) else {
            return PromptTemplate::Plain;
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PromptTemplate::Plain,
            result = search.search(query) => result,
        };

        match result {
            Ok(sections) => {
                if sections.is_empty() {
                    info!("Search found no sections");
                }
                PromptTemplate::from_sections(sections)
            }
            Err(e) => {
                warn!("Search failed, answering without sources: {}", e);
                PromptTemplate::Plain
            }
        }
    }

    /// Run the pending action for `thread_id` to completion
    ///
    /// Invariant violations are returned as errors. Generation failures are
    /// not: they leave the error text in the placeholder and come back as
    /// `TurnOutcome::Failed`.
    pub async fn process_pending<F>(
        &self,
        thread_id: &str,
        cancel: CancellationToken,
        mut on_event: F,
    ) -> Result<TurnOutcome>
    where
        F: FnMut(TurnEvent) + Send,
    {
        if !self.context.try_begin_generation() {
            return Err(ChatError::Busy);
        }
        let _guard = GenerationGuard(&self.context);

        let pending = self.context.take_pending().ok_or(ChatError::NothingPending)?;
        info!("Processing {} for thread {}", pending.action, thread_id);

        let history = self.persist.messages().get_messages(thread_id)?;
        let Reconciled {
            mut messages,
            active_id,
        } = reconcile(Some(thread_id), &history, &pending)?;
        let Some(active_id) = active_id else {
            return Ok(TurnOutcome::Skipped);
        };

        self.persist.messages().save_messages(thread_id, &messages)?;
        on_event(TurnEvent::Started {
            thread_id: thread_id.to_string(),
            message_id: active_id.clone(),
        });

        let query = assemble_turns(&messages, &active_id)?
            .last()
            .map(|turn| turn.text().to_string())
            .unwrap_or_default();
        let template = self.resolve_template(&query, &cancel).await;

        if let PromptTemplate::Augmented(sections) = &template {
            let search_id = Uuid::new_v4().to_string();
            self.persist.searches().save_sections(&search_id, sections)?;
            if let Some(active) = messages.iter_mut().find(|m| m.id == active_id) {
                active.search_id = Some(search_id.clone());
            }
            self.persist.messages().save_messages(thread_id, &messages)?;
            self.context.set_search_id(Some(search_id.clone()));
            on_event(TurnEvent::Sources {
                search_id,
                count: sections.len(),
            });
        }

        let prompt = build_prompt(&messages, &active_id, &template)?;
        let model = self.config.model_for(self.context.reason_enabled());
        let request = GenerateRequest::new(model, prompt.instruction, prompt.turns)
            .with_api_key(self.api_key_override());

        let fragments = match self.generator.generate_stream(request, cancel.clone()).await {
            Ok(fragments) => fragments,
            Err(LlmError::Cancelled) => {
                return self.settle_cancelled(thread_id, &mut messages, &active_id, String::new());
            }
            Err(error) => return self.settle_failed(thread_id, &mut messages, &active_id, error),
        };

        let animator = ResponseAnimator::new(self.config.animation.clone());
        let outcome = animator
            .run(fragments, &cancel, |display, fresh| {
                on_event(TurnEvent::Delta {
                    display: display.to_string(),
                    fresh: fresh.to_string(),
                })
            })
            .await;

        match outcome {
            AnimationOutcome::Completed { text } => {
                set_message_text(&mut messages, &active_id, text)?;
                self.persist.messages().save_messages(thread_id, &messages)?;
                if let Err(e) = self.persist.threads().touch_thread(thread_id) {
                    warn!("Could not bump thread {}: {}", thread_id, e);
                }
                info!("Completed answer {} in thread {}", active_id, thread_id);
                Ok(TurnOutcome::Completed {
                    message: find(&messages, &active_id)?,
                })
            }
            AnimationOutcome::Failed { error, .. } => {
                self.settle_failed(thread_id, &mut messages, &active_id, error)
            }
            AnimationOutcome::Cancelled { displayed } => {
                self.settle_cancelled(thread_id, &mut messages, &active_id, displayed)
            }
        }
    }

    fn settle_failed(
        &self,
        thread_id: &str,
        messages: &mut [Message],
        active_id: &str,
        error: LlmError,
    ) -> Result<TurnOutcome> {
        if error.is_credential() {
            warn!("Generation rejected the API key: {}", error);
        } else {
            error!("Error generating response: {}", error);
        }

        set_message_text(messages, active_id, ERROR_RESPONSE_TEXT)?;
        self.persist.messages().save_messages(thread_id, messages)?;
        Ok(TurnOutcome::Failed {
            message: find(messages, active_id)?,
            error,
        })
    }

    /// Keep what had been shown; the thread is not bumped
    fn settle_cancelled(
        &self,
        thread_id: &str,
        messages: &mut [Message],
        active_id: &str,
        displayed: String,
    ) -> Result<TurnOutcome> {
        info!("Generation of {} cancelled", active_id);
        set_message_text(messages, active_id, displayed)?;
        self.persist.messages().save_messages(thread_id, messages)?;
        Ok(TurnOutcome::Cancelled {
            message: find(messages, active_id)?,
        })
    }

    /// Run the pending action on a background task, streaming its events
    ///
    /// The last event is always terminal (see `TurnEvent::is_terminal`).
    pub fn spawn_turn(
        self: &Arc<Self>,
        thread_id: String,
        cancel: CancellationToken,
    ) -> mpsc::UnboundedReceiver<TurnEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::clone(self);

        tokio::spawn(async move {
            let events = tx.clone();
            let result = session
                .process_pending(&thread_id, cancel, move |event| {
                    let _ = events.send(event);
                })
                .await;

            let terminal = match result {
                Ok(outcome) => TurnEvent::from(outcome),
                Err(e) => {
                    error!("Turn for thread {} failed: {}", thread_id, e);
                    TurnEvent::Error {
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(terminal);
        });

        rx
    }
}

fn find(messages: &[Message], id: &str) -> Result<Message> {
    messages
        .iter()
        .find(|m| m.id == id)
        .cloned()
        .ok_or_else(|| ChatError::MessageNotFound(id.to_string()))
}
