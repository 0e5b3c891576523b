use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::time::Duration;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::client::handle_client;
use crate::error::FtServerError;
use crate::error::handlers::handle_error;
use crate::server::config::ServerConfig;
use crate::utils::network;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts control connections and runs one session task per connection.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the control listener described by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, FtServerError> {
        config.validate()?;

        let listener = network::bind(
            &config.bind_address,
            &config.control_port_str(),
            config.listen_backlog,
        )
        .await?;

        Ok(Self::from_listener(listener, config))
    }

    /// Wraps an already bound listener.
    pub fn from_listener(listener: TcpListener, config: ServerConfig) -> Self {
        Self {
            listener,
            config: Arc::new(config),
        }
    }

    /// Serves until the process is stopped.
    pub async fn start(self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Serves until `shutdown` resolves, then aborts outstanding sessions.
    ///
    /// Finished session tasks are reaped in the same loop that accepts, so a
    /// crashed or failed session never takes the accept loop down with it.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        match self.listener.local_addr() {
            Ok(addr) => info!(
                "Serving {} on {}",
                self.config.server_root_str(),
                addr
            ),
            Err(e) => warn!("Listener address unavailable: {}", e),
        }

        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping {} session(s)", sessions.len());
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("Client connected: {}", addr);
                        let config = Arc::clone(&self.config);
                        sessions.spawn(async move {
                            if let Err(e) = handle_client(stream, addr, config).await {
                                handle_error(&addr, &e);
                            }
                        });
                    }
                    Err(e) => accept_failed(&e).await,
                },
                Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            error!("Session task panicked: {}", e);
                        }
                    }
                }
            }
        }

        sessions.shutdown().await;
    }
}

/// Logs a failed accept and pauses before the loop accepts again.
///
/// Persistent failures such as EMFILE would otherwise spin the loop.
async fn accept_failed(e: &io::Error) {
    error!("Error accepting connection: {}", e);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}
