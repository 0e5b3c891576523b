//! ftserver - Entry Point
//!
//! Serves a directory over a control channel plus per-request data channels.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use ftserver::server::{ConfigOverrides, Server, ServerConfig};
use ftserver::utils::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "ftserver", version, about = "Two-channel file transfer server")]
struct Cli {
    /// Control port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Configuration file (defaults to ./ftserver.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Address to bind the control listener to
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging();

    let overrides = ConfigOverrides {
        control_port: Some(cli.port),
        server_root: cli.root,
        bind_address: cli.bind,
    };

    let config = match ServerConfig::load(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if !config.server_root.is_dir() {
        error!("Server root {} is not a directory", config.server_root_str());
        std::process::exit(1);
    }

    info!("Launching ftserver...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("ftserver stopped");
}
