use anyhow::Context;
use obox_app::{
    command::HELP, config::Config, logging::init_logging, render, AppState, Command, Route,
};
use obox_chat::{group_for_display, Message, TurnEvent, QUERY_SUGGESTIONS};
use obox_llm::CancellationToken;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const KEY_HINT: &str = "Gemini API key appears broken or limit reached. \
Get an API key from https://aistudio.google.com/apikey and paste it below (empty line to skip).";

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);
    tracing::info!("Starting Obox");

    let state = AppState::from_config(config)?;
    let mut shell = Shell::new(state);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render::suggestions());
    println!("Type /help for commands.");

    loop {
        shell.prompt()?;
        let line = tokio::select! {
            line = input.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = shell.handle(command, &mut input).await {
            tracing::debug!("Command failed: {:?}", e);
            println!("error: {}", e);
        }
    }

    tracing::info!("Bye");
    Ok(())
}

/// Terminal view state: the current route and its loaded messages
struct Shell {
    state: AppState,
    route: Route,
    messages: Vec<Message>,
}

impl Shell {
    fn new(state: AppState) -> Self {
        Self {
            state,
            route: Route::Home,
            messages: Vec::new(),
        }
    }

    fn prompt(&self) -> anyhow::Result<()> {
        let context = self.state.session.context();
        let flags = format!(
            "{}{}",
            if context.search_enabled() { "search " } else { "" },
            if context.reason_enabled() { "reason " } else { "" },
        );
        print!("{}[{}]> ", flags, self.route);
        std::io::stdout().flush()?;
        Ok(())
    }

    async fn handle(&mut self, command: Command, input: &mut Input) -> anyhow::Result<()> {
        let session = self.state.session.clone();

        match command {
            Command::Query(text) => self.ask(&text, input).await?,
            Command::Suggest(n) => {
                let query = QUERY_SUGGESTIONS
                    .get(n - 1)
                    .with_context(|| format!("There are {} suggestions", QUERY_SUGGESTIONS.len()))?;
                println!("> {}", query);
                self.ask(query, input).await?;
            }
            Command::Home => {
                self.route = Route::Home;
                self.messages.clear();
                println!("{}", render::suggestions());
            }
            Command::Go(route) => self.navigate(route)?,
            Command::Threads => print!("{}", render::threads(&session.threads()?)),
            Command::Sidebar => {
                if session.context().toggle_sidebar() {
                    print!("{}", render::threads(&session.threads()?));
                } else {
                    println!("Sidebar hidden.");
                }
            }
            Command::Regenerate(message_id) => {
                let thread_id = self.current_thread()?;
                let message_id = match message_id {
                    Some(id) => id,
                    None => self.latest_answer()?.id.clone(),
                };
                session.regenerate(&thread_id, &message_id)?;
                self.generate(&thread_id, input).await?;
            }
            Command::Sources(search_id) => {
                let search_id = match search_id {
                    Some(id) => id,
                    None => self
                        .messages
                        .iter()
                        .rev()
                        .find_map(|m| m.search_id.clone())
                        .context("No answer in this thread has sources")?,
                };
                match session.toggle_sources(&search_id)? {
                    Some(sections) => print!("{}", render::sources(&sections)),
                    None => println!("Sources hidden."),
                }
            }
            Command::Delete(thread_id) => {
                let thread_id = match thread_id {
                    Some(id) => id,
                    None => self.current_thread()?,
                };
                session.delete_thread(&thread_id)?;
                if self.route.thread_id() == Some(thread_id.as_str()) {
                    self.route = Route::Home;
                    self.messages.clear();
                }
                println!("Deleted {}.", thread_id);
            }
            Command::Search(enabled) => session.context().set_search_enabled(enabled),
            Command::Reason(enabled) => session.context().set_reason_enabled(enabled),
            Command::Theme(theme) => {
                session.context().set_theme(theme)?;
                println!("Theme set to {}.", theme);
            }
            Command::Key(key) => {
                session.set_api_key(&key, None)?;
                println!("Using key {}.", render::mask_key(key.trim()));
            }
            Command::ForgetKey => {
                session.clear_api_key()?;
                println!("Stored key removed.");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
        Ok(())
    }

    fn navigate(&mut self, route: Route) -> anyhow::Result<()> {
        match &route {
            Route::Home => self.messages.clear(),
            Route::Thread(id) => {
                self.state
                    .persist
                    .threads()
                    .get_thread(id)?
                    .with_context(|| format!("No thread {}", id))?;
                self.messages = self.state.session.open_thread(id)?;
                print!("{}", render::conversation(&self.messages));
            }
        }
        self.route = route;
        Ok(())
    }

    async fn ask(&mut self, text: &str, input: &mut Input) -> anyhow::Result<()> {
        let thread_id = self
            .state
            .session
            .submit_query(self.route.thread_id(), text)?;
        self.route = Route::Thread(thread_id.clone());
        self.generate(&thread_id, input).await
    }

    /// Run pending turns until one settles without asking for a new key
    async fn generate(&mut self, thread_id: &str, input: &mut Input) -> anyhow::Result<()> {
        loop {
            let event = self.run_once(thread_id).await?;
            self.messages = self.state.persist.messages().get_messages(thread_id)?;

            match event {
                TurnEvent::Failed {
                    message,
                    error,
                    credential,
                } => {
                    tracing::warn!("Generation failed: {}", error);
                    println!("{}", message.text);
                    if !credential {
                        return Ok(());
                    }

                    println!("{}", KEY_HINT);
                    let key = input.next_line().await?.unwrap_or_default();
                    if key.trim().is_empty() {
                        return Ok(());
                    }
                    self.state.session.set_api_key(&key, None)?;
                    self.state.session.regenerate(thread_id, &message.id)?;
                }
                TurnEvent::Cancelled { .. } => {
                    println!("(stopped)");
                    return Ok(());
                }
                TurnEvent::Error { message } => anyhow::bail!(message),
                _ => return Ok(()),
            }
        }
    }

    async fn run_once(&self, thread_id: &str) -> anyhow::Result<TurnEvent> {
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let mut stdout = std::io::stdout();
        let result = self.state.run_turn(thread_id, cancel, &mut stdout).await;
        watcher.abort();
        result
    }

    fn current_thread(&self) -> anyhow::Result<String> {
        self.route
            .thread_id()
            .map(String::from)
            .context("Open a thread first (/threads, /open <id>)")
    }

    fn latest_answer(&self) -> anyhow::Result<&Message> {
        group_for_display(&self.messages)
            .into_iter()
            .rev()
            .map(|group| group.shown)
            .find(|m| m.is_model())
            .context("No answer to regenerate")
    }
}
