use anyhow::Context;
use obox_chat::{ChatSession, TurnEvent};
use obox_llm::{CancellationToken, GeminiClient};
use obox_persist::{PersistClient, PersistClientBuilder};
use obox_search::SearchClient;
use std::io::Write;
use std::sync::Arc;

use crate::config::Config;

/// Everything the terminal host needs, wired once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: PersistClient,
    pub session: Arc<ChatSession>,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        tracing::info!("Opening local storage at {:?}", config.storage.path);
        let persist = PersistClientBuilder::new()
            .path(&config.storage.path)
            .build()
            .context("Failed to open local storage")?;

        let generator =
            GeminiClient::from_config(&config.gemini()).context("Failed to build Gemini client")?;

        let mut builder = ChatSession::builder()
            .generator(Arc::new(generator))
            .persist(persist.clone())
            .config(config.chat());

        if !config.search.base_url.trim().is_empty() {
            tracing::info!("Search backend at {}", config.search.base_url);
            let search = SearchClient::new(&config.search.base_url)
                .context("Failed to build search client")?;
            builder = builder.search(Arc::new(search));
        }

        let session = builder.build().context("Failed to build chat session")?;
        session.context().set_search_enabled(config.search.enabled);
        session.context().set_reason_enabled(config.llm.reasoning);

        Ok(Self {
            config: Arc::new(config),
            persist,
            session: Arc::new(session),
        })
    }

    /// Run the pending action, writing fresh text to `out` as it is revealed
    ///
    /// Returns the terminal event of the turn.
    pub async fn run_turn<W: Write>(
        &self,
        thread_id: &str,
        cancel: CancellationToken,
        out: &mut W,
    ) -> anyhow::Result<TurnEvent> {
        let mut events = self.session.spawn_turn(thread_id.to_string(), cancel);

        while let Some(event) = events.recv().await {
            match &event {
                TurnEvent::Sources { count, .. } => {
                    writeln!(out, "[{} sources]", count)?;
                }
                TurnEvent::Delta { fresh, .. } => {
                    write!(out, "{}", fresh)?;
                    out.flush()?;
                }
                _ => {}
            }
            if event.is_terminal() {
                writeln!(out)?;
                return Ok(event);
            }
        }

        anyhow::bail!("Turn for thread {} ended without a result", thread_id)
    }
}
