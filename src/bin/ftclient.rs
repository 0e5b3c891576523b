//! ftclient - requests a listing or a file from an ftserver.

use clap::{ArgGroup, Parser};
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

use ftserver::FtClient;
use ftserver::ftclient::GetOutcome;
use ftserver::utils::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "ftclient", version, about = "Client for ftserver")]
#[command(group(ArgGroup::new("action").required(true).args(["list", "get"])))]
struct Cli {
    /// Server host
    server_host: String,

    /// Server control port
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    server_port: u16,

    /// Port to receive the data connection on (0 picks one)
    data_port: u16,

    /// List the server directory
    #[arg(short = 'l')]
    list: bool,

    /// Retrieve FILENAME
    #[arg(short = 'g', value_name = "FILENAME")]
    get: Option<String>,

    /// Where to save a retrieved file (defaults to FILENAME)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing local file
    #[arg(short, long)]
    force: bool,

    /// Seconds to wait for each server response
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(cli.timeout);

    let target = match &cli.get {
        Some(filename) => {
            let target = cli.output.clone().unwrap_or_else(|| PathBuf::from(filename));
            if target.exists() && !cli.force {
                return Err(format!(
                    "{} already exists; pass --force to overwrite",
                    target.display()
                )
                .into());
            }
            Some(target)
        }
        None => None,
    };

    let mut client = FtClient::connect(&cli.server_host, cli.server_port, timeout).await?;

    match (&cli.get, target) {
        (Some(filename), Some(target)) => match client.get(filename, cli.data_port).await? {
            GetOutcome::Received(bytes) => {
                tokio::fs::write(&target, &bytes).await?;
                info!("Saved {} ({} bytes)", target.display(), bytes.len());
            }
            GetOutcome::NotFound => {
                error!("{} was not found on the server", filename);
            }
        },
        _ => {
            let listing = client.list(cli.data_port).await?;
            print!("{}", String::from_utf8_lossy(&listing));
        }
    }

    client.exit().await?;
    Ok(())
}
