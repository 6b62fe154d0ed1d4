//! Attache application binary - composition root.
//!
//! Ties together all Attache crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Wire the mock capability backends, credential store, and memory store
//! 3. Build the classifier, task router, and confirmation engine
//! 4. Run an interactive chat REPL against the conversation controller

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use attache_backends::{
    AuthHandleIssuer, CalendarBackend, CapabilityBackend, CredentialStore,
    InMemoryCredentialStore, MailBackend, MockCalendar, MockDocuments, MockIssues, MockMail,
    Service,
};
use attache_chat::ConversationController;
use attache_core::AttacheConfig;
use attache_memory::{InMemoryStore, MemoryStore};
use attache_task::handler::{
    AuthenticationHandler, CalendarHandler, EmailHandler, IntegrationHandler, SearchHandler,
    TriggerHandler,
};
use attache_task::{AuthGate, ConfirmationEngine, KeywordClassifier, TaskRouter, TriggerStore};

#[derive(Parser)]
#[command(name = "attache", about = "Conversational task-delegation assistant")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "~/.attache/config.toml")]
    config: String,

    /// User id for this session.
    #[arg(long, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session (default).
    Chat,
    /// Print the effective configuration.
    Config,
}

/// Everything the REPL needs, wired once at startup.
struct App {
    controller: ConversationController,
    credentials: Arc<InMemoryCredentialStore>,
    issuer: Arc<AuthHandleIssuer>,
    triggers: Arc<TriggerStore>,
    memory: Arc<InMemoryStore>,
    context_turns: usize,
}

fn build_app(config: AttacheConfig) -> App {
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let issuer = Arc::new(AuthHandleIssuer::new(
        Arc::clone(&credentials) as Arc<dyn CredentialStore>
    ));
    let gate = Arc::new(AuthGate::new(
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        Arc::clone(&issuer),
    ));

    let mail = Arc::new(MockMail::new());
    let calendar = Arc::new(MockCalendar::new());
    let documents = Arc::new(MockDocuments);
    let issues = Arc::new(MockIssues);
    let memory = Arc::new(InMemoryStore::new(config.chat.history_capacity));
    let triggers = Arc::new(TriggerStore::new());

    let mut router = TaskRouter::new();
    router.register(Box::new(EmailHandler::new(
        Arc::clone(&gate),
        Arc::clone(&mail) as Arc<dyn MailBackend>,
        config.search.per_backend_limit,
    )));
    router.register(Box::new(CalendarHandler::new(
        Arc::clone(&gate),
        Arc::clone(&calendar) as Arc<dyn CalendarBackend>,
        config.search.per_backend_limit,
        config.recurrence.max_occurrences,
    )));
    router.register(Box::new(SearchHandler::new(
        Arc::clone(&mail) as Arc<dyn CapabilityBackend>,
        Arc::clone(&calendar) as Arc<dyn CapabilityBackend>,
        Arc::clone(&documents) as Arc<dyn CapabilityBackend>,
        Arc::clone(&issues) as Arc<dyn CapabilityBackend>,
        config.search.per_backend_limit,
    )));
    router.register(Box::new(TriggerHandler::new(Arc::clone(&triggers))));
    router.register(Box::new(IntegrationHandler::new(
        Arc::clone(&gate),
        Arc::clone(&documents) as Arc<dyn CapabilityBackend>,
        Arc::clone(&issues) as Arc<dyn CapabilityBackend>,
        config.search.per_backend_limit,
    )));
    router.register(Box::new(AuthenticationHandler::new(Arc::clone(&gate))));

    let engine = ConfirmationEngine::new(
        Arc::clone(&memory) as Arc<dyn MemoryStore>,
        Arc::clone(&mail) as Arc<dyn MailBackend>,
        Arc::clone(&calendar) as Arc<dyn CalendarBackend>,
    );

    let context_turns = config.chat.context_turns;
    let controller = ConversationController::new(
        Arc::new(KeywordClassifier::new()),
        router,
        engine,
        Arc::clone(&memory) as Arc<dyn MemoryStore>,
        config,
    );

    App {
        controller,
        credentials,
        issuer,
        triggers,
        memory,
        context_turns,
    }
}

/// Handle a `:command` REPL meta-line. Returns `false` to exit.
fn handle_meta(app: &App, user: &str, line: &str) -> bool {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();

    match command {
        ":quit" | ":q" => return false,
        ":grant" => match arg.parse::<Service>() {
            Ok(service) => {
                app.credentials.grant(user, service);
                println!("Granted {} credential for {}", service, user);
            }
            Err(e) => println!("{}", e),
        },
        ":consume" => match app.issuer.consume(arg) {
            Some(handle) => println!(
                "Authenticated {} for {} via handle",
                handle.service, handle.user_id
            ),
            None => println!("Unknown or already-consumed handle"),
        },
        ":history" => match app.memory.recent_interactions(user, app.context_turns) {
            Ok(interactions) if interactions.is_empty() => println!("No history yet"),
            Ok(interactions) => {
                for i in interactions {
                    println!("you: {}", i.user_message);
                    println!("attache: {}", i.response);
                }
            }
            Err(e) => println!("{}", e),
        },
        ":triggers" => match app.triggers.check(user, None) {
            Ok(triggers) if triggers.is_empty() => println!("No active triggers"),
            Ok(triggers) => {
                for t in triggers {
                    println!("{} [{}] {} -> {}", t.id, t.trigger_type, t.condition, t.action);
                }
            }
            Err(e) => println!("{}", e),
        },
        _ => println!("Commands: :grant <service>, :consume <token>, :triggers, :history, :quit"),
    }
    true
}

async fn run_chat(app: App, user: String) {
    println!("attache ready. Type a message, or :help for commands.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(':') {
            if !handle_meta(&app, &user, line) {
                break;
            }
            continue;
        }

        match app.controller.handle_message(&user, line).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => println!("{}", e),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = shellexpand_home(&cli.config);
    let config = AttacheConfig::load_or_default(&config_path);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Config => match config.to_toml() {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("Failed to render config: {}", e),
        },
        Command::Chat => {
            let app = build_app(config);
            run_chat(app, cli.user).await;
        }
    }
}

/// Expand a leading `~` to the user's home directory.
fn shellexpand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
