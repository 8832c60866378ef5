//! StoryCrafter Gateway Binary
//!
//! # Usage
//! ```bash
//! storycrafter-gateway [--config gateway.json] [--host 127.0.0.1] [--port 8000] [--db storycrafter.db] [--verbose]
//! ```

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use storycrafter_agent::{ProviderCredentials, ProviderFactory};
use storycrafter_core::storage::StoryStore;
use storycrafter_gateway::{Gateway, GatewayConfig};
use tracing_subscriber::EnvFilter;

/// StoryCrafter Gateway - requirements in, backlog artifacts out
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Host to bind to (overrides config and STORYCRAFTER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config and STORYCRAFTER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database path (overrides config and STORYCRAFTER_DB)
    #[arg(long)]
    db: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    // Initialize logging; RUST_LOG wins when set
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_target(false)
            .init();
    }

    let mut config = GatewayConfig::load(args.config.as_deref()).context("Loading gateway configuration")?;
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(db) = args.db {
        config = config.with_database_path(db);
    }

    let credentials = ProviderCredentials::from_env();
    let configured = credentials.configured();
    if configured.is_empty() {
        tracing::warn!("No provider API key found; generation requests will fail with 503");
    } else {
        tracing::info!(providers = ?configured.iter().map(|k| k.as_str()).collect::<Vec<_>>(), "Model providers configured");
    }

    let store = StoryStore::open(&config.database_path)?;

    print_banner(&config);

    let gateway = Gateway::new(config, store, Arc::new(ProviderFactory::new(credentials)));
    gateway.start().await?;

    Ok(())
}

fn print_banner(config: &GatewayConfig) {
    println!();
    println!("StoryCrafter Gateway v{}", storycrafter_gateway::VERSION);
    println!("   ├─ http://{}:{}", config.host, config.port);
    println!("   └─ database: {}", config.database_path);
    println!();
    println!("Endpoints");
    println!("   ├─ POST /signup, POST /token");
    println!("   ├─ /projects/, /chats/, /chats/:id/messages/");
    println!("   └─ POST /api/generate-story");
    println!();
    println!("Press Ctrl+C to stop the gateway");
    println!();
}
