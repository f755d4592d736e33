//! hostsvc server binary: starts the job-submission REST API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hostsvc_rest::config::ServiceConfig;
use hostsvc_rest::handlers::build_router;
use hostsvc_rest::state::AppState;
use tracing_subscriber::EnvFilter;

/// Job-submission REST service.
#[derive(Debug, Parser)]
#[command(name = "hostsvc", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bind address (overrides the config file).
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides HOSTSVC_PORT and the config file).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("hostsvc_rest=info,hostsvc_dynalloc=info,hostsvc_intrdr=info,warn")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to load config");
            e
        })?,
        None => ServiceConfig::default(),
    };

    let env_port = std::env::var("HOSTSVC_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok());
    if let Some(port) = cli.port.or(env_port) {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let dataset_dir = config.host.dataset_dir.clone();
    let codepage = config.submit.native_codepage.clone();

    let state = Arc::new(AppState::new(config)?);
    let router = build_router(state);

    tracing::info!(
        bind_addr = %bind_addr,
        dataset_dir = %dataset_dir,
        codepage = %codepage,
        "hostsvc server starting"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
