use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use todo_chat::cli;
use todo_chat::config::TodoChatConfig;

#[derive(Parser)]
#[command(
    name = "todo-chat",
    version,
    about = "Manage a to-do list by chatting with an LLM"
)]
struct Cli {
    /// Config file (defaults to ~/.todo-chat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the assistant (default)
    Chat,
    /// List all to-dos
    List,
    /// Add a to-do
    Add {
        /// Text of the to-do
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Search to-dos by substring (case-insensitive)
    Search {
        query: String,
    },
    /// Delete a to-do by id
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; the key may already be in the environment.
    dotenvy::dotenv().ok();

    let config = match &cli.config {
        Some(path) => TodoChatConfig::load_required(path)?,
        None => TodoChatConfig::load()?,
    };

    // Log to stderr so stdout stays clean for the conversation.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cli::chat::chat(&config).await?,
        Command::List => cli::list::list(&config)?,
        Command::Add { text } => cli::add::add(&config, &text.join(" "))?,
        Command::Search { query } => cli::search::search(&config, &query)?,
        Command::Delete { id } => cli::delete::delete(&config, id)?,
    }

    Ok(())
}
