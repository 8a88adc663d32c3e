use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{init_logging, load_config};
use database::{EmployeeRepository, connect};
use protocol::Request;
use server::Client;

/// The main entry point for the personnel records service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Request(args) => handle_request(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Employee records over a persistent TCP connection, stored in PostgreSQL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the records server.
    Serve(ServeArgs),
    /// Send a single request to a running server and print the response.
    Request(RequestArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Configuration file. Defaults to `config.toml` in the working directory, if present.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct RequestArgs {
    /// One of INSERT, UPDATE, SELECT, DELETE.
    #[arg(long)]
    operation: String,

    /// The request payload as a JSON object (e.g. '{"id": 3}').
    #[arg(long, default_value = "{}")]
    data: String,

    /// Server address (host:port). Defaults to the configured server address.
    #[arg(long)]
    addr: Option<String>,

    /// Configuration file used to find the server when `--addr` is not given.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    // Flushes the log file on drop; must live as long as the server.
    let _log_guard = init_logging(&config.logging).context("failed to initialize logging")?;

    tracing::info!(?config, "Configuration loaded.");

    let pool = connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    let store = Arc::new(EmployeeRepository::new(pool));

    let listener = server::bind(&config.server.address()).await?;
    server::run(listener, store, shutdown_signal()).await?;

    tracing::info!("Records server stopped.");
    Ok(())
}

async fn handle_request(args: RequestArgs) -> anyhow::Result<()> {
    let addr = match args.addr {
        Some(addr) => addr,
        None => load_config(args.config.as_deref())
            .context("failed to load configuration")?
            .server
            .address(),
    };

    let data = serde_json::from_str(&args.data).context("--data is not valid JSON")?;
    let request = Request { operation: args.operation, data };

    let mut client = Client::connect(addr.as_str())
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    let response = client.send(&request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server runs until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
}
