//! Error handlers
//!
//! Classifies session errors and logs them at the right level.

use crate::error::types::{FtServerError, TransferError};
use log::{error, info, warn};
use std::net::SocketAddr;

/// Returns true for failures the session survives.
pub fn is_soft(err: &FtServerError) -> bool {
    matches!(err, FtServerError::Transfer(TransferError::FileNotFound(_)))
}

/// Log a session error against the peer it happened to.
pub fn handle_error(peer: &SocketAddr, err: &FtServerError) {
    match err {
        e if is_soft(e) => info!("Client {}: {}", peer, e),
        FtServerError::Negotiation(e) => warn!("Client {}: negotiation failed: {}", peer, e),
        e => error!("Client {}: {}", peer, e),
    }
}
