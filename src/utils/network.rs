//! Network utilities
//!
//! Resolves host/port pairs and walks the candidate endpoints until one
//! connects (outbound) or binds (listening).

use log::{debug, warn};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream, lookup_host};

use crate::error::NetworkError;
use crate::protocol::validate_port;

/// Resolves `host:port` into candidate endpoints, in resolver order.
///
/// The port is textual and must be a number in 1..=65535. Nothing is cached.
pub async fn resolve(host: &str, port: &str) -> Result<Vec<SocketAddr>, NetworkError> {
    let target = format!("{}:{}", host, port);
    let port = validate_port(port).map_err(|e| NetworkError::Resolution {
        target: target.clone(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;

    let candidates: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| NetworkError::Resolution {
            target: target.clone(),
            source,
        })?
        .collect();

    debug!("Resolved {} to {:?}", target, candidates);
    Ok(candidates)
}

/// Connects to the first reachable endpoint for `host:port`.
///
/// Each candidate gets its own `timeout`.
pub async fn connect(host: &str, port: &str, timeout: Duration) -> Result<TcpStream, NetworkError> {
    let target = format!("{}:{}", host, port);
    let candidates = resolve(host, port).await?;

    let mut last_error = None;
    for addr in &candidates {
        match tokio::time::timeout(timeout, TcpStream::connect(*addr)).await {
            Ok(Ok(stream)) => {
                debug!("Connected to {}", addr);
                return Ok(stream);
            }
            Ok(Err(e)) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
            Err(_) => {
                debug!("Connect to {} timed out after {:?}", addr, timeout);
                last_error = Some(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {} timed out", addr),
                ));
            }
        }
    }

    Err(NetworkError::NoReachableEndpoint {
        target,
        attempts: candidates.len(),
        last_error,
    })
}

/// Binds a listener on the first endpoint for `host:port` that accepts it.
///
/// `SO_REUSEADDR` is set before binding so restarts on the same port do not
/// fail while old sockets linger in TIME_WAIT.
pub async fn bind(host: &str, port: &str, backlog: u32) -> Result<TcpListener, NetworkError> {
    let target = format!("{}:{}", host, port);
    let candidates = resolve(host, port).await?;

    let mut last_error = None;
    for addr in &candidates {
        match bind_reusable(*addr, backlog) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                warn!("Bind to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(NetworkError::NoReachableEndpoint {
        target,
        attempts: candidates.len(),
        last_error,
    })
}

fn bind_reusable(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}
