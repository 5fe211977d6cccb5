//! `toolgate`: multi-tenant virtual file system, hybrid search, and session
//! memory over MCP.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use toolgate_infrastructure::config::AppConfig;

/// Multi-tenant tool-invocation gateway.
#[derive(Parser)]
#[command(name = "toolgate")]
#[command(about = "Multi-tenant virtual file system, hybrid search, and session memory over MCP")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to a `toolgate.toml` configuration file. Missing files are skipped silently.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `toolgate_server=debug`. Overrides the config file's `log_level`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the gateway over stdio, authenticated with a single bearer token for the process lifetime.
    ServeStdio {
        /// Bearer token (or `identity@api-key` form) every tool call runs under.
        #[arg(long, env = "TOOLGATE_API_KEY")]
        api_key: String,
    },
    /// Serve the gateway over streamable HTTP, authenticating each connection from its own Authorization header.
    ServeHttp {
        /// Address to bind the HTTP listener to.
        #[arg(long, default_value = "127.0.0.1:8787")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    toolgate_infrastructure::logging::init(cli.log_level.as_deref().unwrap_or(&config.log_level), &config.log_error_detail);

    let app = toolgate::build(&config).await.context("wiring application")?;
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let worker_handles = toolgate::spawn_background_tasks(&app, shutdown_rx);

    let result = match cli.command {
        Commands::ServeStdio { api_key } => toolgate_server::transport::serve_stdio(app.dispatch, &api_key).await,
        Commands::ServeHttp { bind } => toolgate_server::transport::serve_http(app.dispatch, &bind).await,
    };

    let _ = shutdown_tx.send(true);
    for handle in worker_handles {
        let _ = handle.await;
    }

    result
}
