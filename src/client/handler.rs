use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::client::session::{ControlLine, ControlSession};
use crate::client::state::SessionState;
use crate::error::handlers::{handle_error, is_soft};
use crate::error::{FtServerError, TransferError};
use crate::protocol::responses::ERROR_INVALID_COMMAND;
use crate::protocol::{Command, parse_command};
use crate::server::ServerConfig;
use crate::storage::list_directory;
use crate::transfer::{DataChannel, handle_file_download, negotiate};

/// A request that is served over a data channel.
enum Transfer<'a> {
    List,
    Get(&'a str),
}

/// Runs the command loop for one control connection until `EXIT`, peer
/// close, or a fatal error. Both channels are closed on return.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    config: Arc<ServerConfig>,
) -> Result<(), FtServerError> {
    let mut session = ControlSession::new(stream, client_addr, config.max_command_length);

    let result = run_session(&mut session, &config).await;

    session.transition(SessionState::Closed);
    if let Err(e) = session.shutdown().await {
        debug!("Client {}: control shutdown failed: {}", client_addr, e);
    }
    info!("Client {} disconnected", client_addr);
    result
}

async fn run_session(session: &mut ControlSession, config: &ServerConfig) -> Result<(), FtServerError> {
    let client_addr = session.peer_addr();

    loop {
        let line = match session.read_line().await? {
            ControlLine::Line(line) => line,
            ControlLine::Closed => {
                info!("Connection closed by client {}", client_addr);
                return Ok(());
            }
            ControlLine::TooLong => {
                return Err(FtServerError::LineTooLong(config.max_command_length));
            }
        };

        let command = parse_command(&line);
        info!("Received from {}: {:?}", client_addr, command);

        let outcome = match &command {
            Command::Exit => {
                info!("Client {} requested to exit", client_addr);
                return Ok(());
            }
            Command::Invalid(raw) => {
                warn!("Client {} sent invalid command {:?}", client_addr, raw);
                session.send_token(ERROR_INVALID_COMMAND).await?;
                continue;
            }
            Command::List => serve(session, config, Transfer::List).await,
            Command::Get(name) => serve(session, config, Transfer::Get(name)).await,
        };

        match outcome {
            Ok(()) => {}
            Err(e) if is_soft(&e) => handle_error(&client_addr, &e),
            Err(e) => return Err(e),
        }
    }
}

/// Negotiates a fresh data channel, serves one transfer over it and closes
/// it whatever the outcome.
async fn serve(
    session: &mut ControlSession,
    config: &ServerConfig,
    transfer: Transfer<'_>,
) -> Result<(), FtServerError> {
    session.transition(SessionState::Negotiating);
    let mut channel = negotiate(session, config).await?;

    session.transition(SessionState::Serving);
    let result = match transfer {
        Transfer::List => send_listing(&mut channel, config).await,
        Transfer::Get(name) => handle_file_download(
            session.writer_mut(),
            channel.stream_mut(),
            &config.server_root,
            name,
            config.chunk_size,
        )
        .await
        .map(|_| ())
        .map_err(FtServerError::from),
    };

    let data_peer = channel.peer_addr();
    if let Err(e) = channel.close().await {
        warn!("Closing data channel to {} failed: {}", data_peer, e);
    }
    session.transition(SessionState::AwaitingCommand);
    result
}

async fn send_listing(channel: &mut DataChannel, config: &ServerConfig) -> Result<(), FtServerError> {
    let listing = list_directory(&config.server_root, config.max_listing_bytes).await?;
    channel.send(&listing).await.map_err(TransferError::Io)?;
    Ok(())
}
