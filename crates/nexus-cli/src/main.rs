//! Nexus command line: a terminal-driven session coordinator plus history
//! and memory lookups against the backend.

mod console;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use console::{ConsoleVoice, StderrNotifier};
use nexus_backend::{HistoryItem, HttpBackend};
use nexus_core::{NexusConfig, ToolCall};
use nexus_session::{ClientTools, GrantedMicrophone, SessionCoordinator, VoiceEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nexus", about = "Nexus voice note-taking and coaching client")]
struct Cli {
    /// Path to config file (environment variables override it)
    #[arg(short, long, default_value = "nexus.toml")]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a session from the terminal: typed lines are user speech
    Repl,
    /// List saved sessions, or print one session's notes
    History {
        /// Id of the session to open
        id: Option<String>,
    },
    /// Ask memory the way the agent does
    Search {
        /// Search text
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print the resolved configuration
    Config,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = NexusConfig::load(&cli.config).map_err(|e| {
        anyhow::anyhow!("Failed to load config '{}': {}", cli.config.display(), e)
    })?;
    config.warn_missing();

    match cli.command {
        Commands::Repl => run_repl(config).await?,
        Commands::History { id } => {
            let coordinator = offline_coordinator(config);
            let items = coordinator.load_history().await;
            match id {
                Some(id) => {
                    let notes = session_notes(&items, &id)
                        .ok_or_else(|| anyhow::anyhow!("No saved session with id '{id}'"))?;
                    println!("{notes}");
                }
                None => print_history(&items),
            }
        }
        Commands::Search { query } => {
            let coordinator = offline_coordinator(config);
            println!("{}", coordinator.search_memory(&query.join(" ")).await);
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// A coordinator for one-shot commands; its voice side is never used.
fn offline_coordinator(config: NexusConfig) -> SessionCoordinator {
    let (tx, _rx) = mpsc::unbounded_channel();
    let backend = Arc::new(HttpBackend::new(config.api_url.clone()));
    SessionCoordinator::new(config, Arc::new(ConsoleVoice::new(tx)), backend)
}

const REPL_HELP: &str = "\
Commands:
  /toggle               connect or disconnect the current persona
  /mode <mode> [topic]  switch persona (scribe, debate, coach)
  /end                  save the session and go back to scribe
  /search <query>       search memory
  /history [id]         open the history vault, or one session's notes
  /status               show coordinator state
  /quit                 leave
Anything else is spoken by you; prefix with 'ai:' to speak as the agent.";

async fn run_repl(config: NexusConfig) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let voice = Arc::new(ConsoleVoice::new(tx.clone()));
    let backend = Arc::new(HttpBackend::new(config.api_url.clone()));
    let coordinator = Arc::new(
        SessionCoordinator::new(config, voice, backend)
            .with_permission(Arc::new(GrantedMicrophone))
            .with_notifier(Arc::new(StderrNotifier)),
    );
    let tools = ClientTools::new(coordinator.clone());

    let pump = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                coordinator.handle_event(event);
            }
        })
    };

    info!("Nexus REPL started");
    println!("{REPL_HELP}");
    println!("[{}] {}", coordinator.active_persona().label(), coordinator.status_message());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "/quit" | "/exit" => break,
            "/help" => println!("{REPL_HELP}"),
            "/toggle" => {
                let outcome = coordinator.toggle_session().await;
                println!("toggle: {outcome:?}");
            }
            "/mode" => {
                let (mode, topic) = rest.split_once(' ').unwrap_or((rest, ""));
                let args = serde_json::json!({"mode": mode, "topic": topic.trim()});
                let result = tools.call(ToolCall::new("change_mode", args)).await;
                if result.is_error {
                    println!("error: {}", result.content);
                }
            }
            "/end" => {
                tools
                    .call(ToolCall::new("end_session", serde_json::json!({})))
                    .await;
            }
            "/search" => {
                let args = serde_json::json!({"query": rest});
                let result = tools.call(ToolCall::new("search_memory", args)).await;
                println!("{}", result.content);
            }
            "/history" => {
                let result = tools
                    .call(ToolCall::new("open_history", serde_json::json!({})))
                    .await;
                println!("{}", result.content);
                let items = coordinator.load_history().await;
                if rest.is_empty() {
                    print_history(&items);
                } else {
                    match session_notes(&items, rest) {
                        Some(notes) => println!("{notes}"),
                        None => println!("No saved session with id '{rest}'"),
                    }
                }
                coordinator.close_history();
            }
            "/status" => {
                println!("{}", serde_json::to_string_pretty(&coordinator.snapshot())?);
            }
            _ => {
                let (source, message) = match line.strip_prefix("ai:") {
                    Some(said) => ("ai", said.trim()),
                    None => ("user", line),
                };
                // through the pump, so it lands after any pending connect event
                tx.send(VoiceEvent::Message {
                    source: source.to_string(),
                    message: message.to_string(),
                })?;
            }
        }
        tokio::task::yield_now().await;
        println!("[{}] {}", coordinator.active_persona().label(), coordinator.status_message());
    }

    coordinator.teardown();
    drop(tools);
    drop(tx);
    pump.abort();
    info!("Nexus REPL stopped");
    Ok(())
}

fn format_created_at(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Full notes of the saved session `id`.
fn session_notes<'a>(items: &'a [HistoryItem], id: &str) -> Option<&'a str> {
    items
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.formatted_markdown.as_str())
        .filter(|notes| !notes.trim().is_empty())
}

fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("No memories found. Start a conversation to scribe your first idea.");
        return;
    }
    for item in items {
        let badge = item
            .persona()
            .map(|p| p.label().to_string())
            .unwrap_or_else(|| item.session_type.clone());
        let title = item.title.as_deref().unwrap_or("Untitled Session");
        println!(
            "[{badge}] {title}  ({})  id: {}",
            format_created_at(&item.created_at),
            item.id
        );
        if let Some(desc) = &item.short_description {
            println!("    {desc}");
        }
    }
    println!("\nTotal: {} session(s)", items.len());
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_created_at() {
        assert_eq!(format_created_at("2024-03-12T10:05:00"), "Mar 12, 2024 10:05");
        assert_eq!(
            format_created_at("2024-03-12T10:05:00.123456"),
            "Mar 12, 2024 10:05"
        );
        assert_eq!(format_created_at("yesterday"), "yesterday");
    }

    fn item(id: &str, notes: &str) -> HistoryItem {
        HistoryItem {
            id: id.into(),
            session_type: "debate".into(),
            title: Some("Drone Ethics".into()),
            short_description: None,
            created_at: "2024-03-12T10:05:00".into(),
            formatted_markdown: notes.into(),
        }
    }

    #[test]
    fn test_session_notes_by_id() {
        let items = vec![item("a1", "# Drones\n- pros"), item("b2", "  ")];
        assert_eq!(session_notes(&items, "a1"), Some("# Drones\n- pros"));
        // blank notes are treated as missing
        assert_eq!(session_notes(&items, "b2"), None);
        assert_eq!(session_notes(&items, "zz"), None);
    }

    #[test]
    fn test_cli_parses_history_id() {
        let cli = Cli::try_parse_from(["nexus", "history", "65f0"]).unwrap();
        match cli.command {
            Commands::History { id } => assert_eq!(id.as_deref(), Some("65f0")),
            _ => panic!("expected history"),
        }
        let cli = Cli::try_parse_from(["nexus", "history"]).unwrap();
        assert!(matches!(cli.command, Commands::History { id: None }));
    }

    #[test]
    fn test_cli_parses_search_words() {
        let cli = Cli::try_parse_from(["nexus", "search", "drone", "ethics"]).unwrap();
        match cli.command {
            Commands::Search { query } => assert_eq!(query, vec!["drone", "ethics"]),
            _ => panic!("expected search"),
        }
        assert_eq!(cli.config, PathBuf::from("nexus.toml"));
    }
}
