//! Module `data_channel`
//!
//! Negotiates the per-request data connection. The server announces
//! `HELLO`, the client answers `DATA_PORT <port>`, and the server connects
//! back to that port on the host the control connection came from. The
//! client never chooses the host.

use log::{debug, info};
use std::io;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::client::session::{ControlLine, ControlSession};
use crate::error::NegotiationError;
use crate::protocol::responses::{DATA_PORT, HELLO};
use crate::protocol::validate_port;
use crate::server::ServerConfig;
use crate::utils::network;

/// A short-lived outbound connection carrying one request's payload.
pub struct DataChannel {
    stream: TcpStream,
    peer: SocketAddr,
}

impl DataChannel {
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        Ok(Self { stream, peer })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Writes a complete payload.
    pub async fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.stream.write_all(payload).await?;
        self.stream.flush().await
    }

    /// Closes the channel; the peer reads EOF as end of payload.
    pub async fn close(mut self) -> io::Result<()> {
        debug!("Closing data channel to {}", self.peer);
        self.stream.shutdown().await
    }
}

/// Extracts the port from a `DATA_PORT <port>` line.
///
/// The verb must be followed by exactly one space and a port that passes
/// [`validate_port`]; nothing is truncated.
pub fn parse_data_port(line: &str) -> Result<u16, NegotiationError> {
    let port = line
        .strip_prefix(DATA_PORT)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or_else(|| NegotiationError::UnexpectedCommand(line.to_string()))?;

    validate_port(port).map_err(NegotiationError::DataPortParse)
}

/// Runs the data-port handshake and opens the data channel.
pub async fn negotiate(
    session: &mut ControlSession,
    config: &ServerConfig,
) -> Result<DataChannel, NegotiationError> {
    session.send_token(HELLO).await?;

    let wait = config.negotiation_timeout();
    let line = match tokio::time::timeout(wait, session.read_line()).await {
        Ok(line) => line?,
        Err(_) => return Err(NegotiationError::Timeout(wait)),
    };

    let line = match line {
        ControlLine::Line(line) => line,
        ControlLine::TooLong => {
            return Err(NegotiationError::UnexpectedCommand(
                "<oversized line>".to_string(),
            ));
        }
        ControlLine::Closed => return Err(NegotiationError::ConnectionClosed),
    };

    let port = parse_data_port(&line)?;
    let host = session.peer_addr().ip().to_string();

    debug!("Client {} requested data port {}", session.peer_addr(), port);
    let stream = network::connect(&host, &port.to_string(), config.connect_timeout()).await?;
    let channel = DataChannel::new(stream)?;

    info!(
        "Data channel open to {} for client {}",
        channel.peer_addr(),
        session.peer_addr()
    );
    Ok(channel)
}
