//! Line-based chat demo against the real agent API.
//!
//! Run with: cargo run -p chat-repl
//!
//! Reads one prompt per line from stdin and prints the refreshed
//! transcript after each exchange. Ctrl-D exits. The API key comes from
//! the config file or the `JULES_API_KEY` environment variable.

use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use agent_chat_client::HttpAgentClient;
use agent_chat_core::{AgentApi, AgentConfig, Role};
use agent_chat_session::{ConversationController, SubmitOutcome, storage::MemoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = AgentConfig::load_default().unwrap_or_default();
    if config.api_key.is_empty() {
        if let Ok(key) = std::env::var("JULES_API_KEY") {
            config.api_key = key;
        }
    }

    let api = Arc::new(HttpAgentClient::new(config.api_key.clone()));
    if !api.has_api_key() {
        eprintln!("No API key configured; set JULES_API_KEY or save one to the config file.");
    }

    let sources = api.list_sources().await;
    if !sources.is_empty() {
        println!("Available sources:");
        for source in &sources {
            println!("  {}", source.display_name.as_deref().unwrap_or(&source.name));
        }
    }

    let store = Arc::new(MemoryStore::new());
    let controller = ConversationController::new(api, store, config.source_context());

    let stdin = std::io::stdin();
    print_prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        match controller.submit(&line).await {
            Ok(SubmitOutcome::Completed) => {
                for record in controller.messages().await {
                    let who = match record.role {
                        Role::User => "you",
                        Role::Agent => "agent",
                    };
                    println!("[{who}] {}", record.content);
                }
            }
            Ok(SubmitOutcome::EmptyInput) => {}
            Ok(SubmitOutcome::Busy) => println!("(a send is still in flight, input dropped)"),
            Err(err) => tracing::error!("send failed: {err}"),
        }
        print_prompt()?;
    }

    Ok(())
}

fn print_prompt() -> std::io::Result<()> {
    let mut out = std::io::stdout();
    write!(out, "> ")?;
    out.flush()
}
