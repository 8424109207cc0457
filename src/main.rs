use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use marlin::bootstrap;
use marlin::config::{ConfigSource, EnvSource, Settings};
use marlin::server;
use marlin::social::PostRequest;

#[derive(Parser)]
#[command(
    name = "marlin",
    version,
    about = "Marlin Marketing Agent: AI greetings and multi-channel social posting."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Port to listen on (overrides PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Address to bind (overrides HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// SQLite database for idempotency records (overrides IDEMPOTENCY_DB; use :memory: for ephemeral)
    #[arg(long, global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Generate one AI greeting and print it
    Hello,
    /// Publish one post in-process and print the JSON response
    Post {
        /// Post text
        text: Option<String>,

        /// Target channel, repeatable (defaults to SOCIAL_DEFAULT_CHANNELS)
        #[arg(short, long = "channel")]
        channels: Vec<String>,

        /// Media URL, repeatable
        #[arg(short, long = "media")]
        media: Vec<String>,

        /// Idempotency key
        #[arg(short = 'k', long)]
        idempotency_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config: Arc<dyn ConfigSource> = Arc::new(EnvSource);
    let mut settings = Settings::load(config.as_ref()).context("invalid configuration")?;

    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(db) = cli.db {
        settings.idempotency_db = Some(db);
    }

    init_tracing(&settings.log_level);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = bootstrap::bootstrap(settings, config)?;
            server::serve(state).await
        }
        Command::Hello => {
            let greeting = bootstrap::build_greeting(&settings)?;
            let greeting = greeting.generate().await?;
            println!("{}", greeting.message);
            eprintln!("  [tokens] {}", greeting.tokens_used);
            Ok(())
        }
        Command::Post {
            text,
            channels,
            media,
            idempotency_key,
        } => {
            let orchestrator = bootstrap::build_orchestrator(&settings, config)?;
            let request = post_request(text, channels, media, idempotency_key);
            let response = orchestrator.submit(request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

/// Build the request for `marlin post`. Flags that were never given stay
/// `None`, so an absent `--channel` falls back to the configured defaults.
fn post_request(
    text: Option<String>,
    channels: Vec<String>,
    media: Vec<String>,
    idempotency_key: Option<String>,
) -> PostRequest {
    PostRequest {
        text,
        media_urls: (!media.is_empty()).then_some(media),
        channels: (!channels.is_empty()).then_some(channels),
        idempotency_key,
        metadata: None,
    }
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL` applies to the whole process.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
