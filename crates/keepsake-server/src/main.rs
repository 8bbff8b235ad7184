// src/main.rs
// Keepsake - Memory companion backend for elder care

use anyhow::Result;
use clap::{Parser, Subcommand};
use keepsake::config::EnvConfig;
use keepsake::db::DatabasePool;
use keepsake::llm::{CompletionBackend, CompletionClient};
use keepsake::web;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(about = "Memory companion backend for elder care")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Generate the daily summary for one elder (for external schedulers)
    Summarize {
        /// Elder identifier
        #[arg(short, long)]
        elder_id: String,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

fn default_db_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".keepsake/keepsake.db")
}

/// Build the completion backend from configuration, if a key is present.
fn make_backend(config: &EnvConfig) -> Result<Option<Arc<dyn CompletionBackend>>> {
    match config.api_keys.completion.clone() {
        Some(key) => {
            let client = CompletionClient::new(key, &config.completion)?;
            Ok(Some(Arc::new(client) as Arc<dyn CompletionBackend>))
        }
        None => Ok(None),
    }
}

async fn open_pool(config: &EnvConfig) -> Result<Arc<DatabasePool>> {
    let db_path = config.db_path.clone().unwrap_or_else(default_db_path);
    Ok(Arc::new(DatabasePool::open(&db_path).await?))
}

async fn run_server(port: u16) -> Result<()> {
    let config = EnvConfig::load();

    let validation = config.validate();
    if !validation.is_valid() {
        anyhow::bail!("configuration invalid:\n{}", validation.report());
    }
    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    let pool = open_pool(&config).await?;
    let backend = make_backend(&config)?;
    if backend.is_none() {
        warn!("Serving without a completion backend - ask/summarize will return errors");
    }

    let state = web::state::AppState::new(pool, backend);
    let app = web::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Keepsake listening on http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_summarize(elder_id: String, date: Option<String>) -> Result<()> {
    let config = EnvConfig::load();
    let pool = open_pool(&config).await?;
    let backend = make_backend(&config)?
        .ok_or_else(|| anyhow::anyhow!("summarize requires a completion API key"))?;

    let stored =
        keepsake::summarize::generate_daily_summary(&pool, &backend, &elder_id, date.as_deref())
            .await?;

    println!(
        "{} [{} memories]: {}",
        stored.day, stored.memories_count, stored.summary
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".keepsake/.env"));
    }
    let _ = dotenvy::dotenv();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        None => run_server(3000).await?,
        Some(Commands::Serve { port }) => run_server(port).await?,
        Some(Commands::Summarize { elder_id, date }) => run_summarize(elder_id, date).await?,
    }

    Ok(())
}
