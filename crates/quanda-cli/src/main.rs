//! Quanda CLI
//!
//! Main entry point for running the Quanda question-answering server.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use quanda_orchestrator::{
    create_router, AppState, GeminiClient, Generator, ServiceConfig,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the Gemini API credential.
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Quanda - Question Answering Service
///
/// Serves an HTTP endpoint that answers free-text questions, solving
/// mathematical ones locally and delegating the rest to a generative
/// backend.
#[derive(Parser, Debug)]
#[command(name = "quanda")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: quanda.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Port for the HTTP server (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Quanda starting");
    tracing::debug!(config = ?args.config, "Config file");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the HTTP server.
///
/// 1. Load config and apply CLI overrides
/// 2. Read the API credential once, at startup
/// 3. Build the generative client and router
/// 4. Serve until interrupted
async fn run_server(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI argument overrides
    if let Some(port) = args.port {
        config.port = port;
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    // Fail at startup rather than on the first request if the
    // credential is missing.
    let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
        anyhow::anyhow!(
            "{API_KEY_ENV} is not set\n\nSuggestion: Export your Gemini API key as {API_KEY_ENV}"
        )
    })?;

    let generator: Arc<dyn Generator> = Arc::new(
        GeminiClient::new(
            api_key,
            Duration::from_secs(config.generation_timeout_secs),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build generative client: {e}"))?,
    );

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let router = create_router(AppState::new(config, generator));

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    tracing::info!(%addr, "HTTP server listening");
    println!("Quanda listening on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router).await?;

    Ok(())
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<ServiceConfig> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            ServiceConfig::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => ServiceConfig::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Prints the loaded configuration.
fn print_config(config: &ServiceConfig) {
    println!("Configuration loaded:");
    println!("  Model: {}", config.model);
    println!("  Answer format: {:?}", config.answer_format);
    println!("  Generation timeout: {}s", config.generation_timeout_secs);
    println!("  Port: {}", config.port);
}
