//! Error types
//!
//! Defines domain-specific error types for each concern of the transfer server.

use std::fmt;
use std::io;
use std::time::Duration;

/// Rejection reasons produced by the port and filename validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPort,
    NonNumericPort(String),
    PortOutOfRange(String),
    EmptyFilename,
    IllegalFilenameChar { name: String, ch: char },
    ReservedFilename(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPort => write!(f, "Port is empty"),
            ValidationError::NonNumericPort(p) => write!(f, "Port is not numeric: {:?}", p),
            ValidationError::PortOutOfRange(p) => {
                write!(f, "Port {} outside the range 1-65535", p)
            }
            ValidationError::EmptyFilename => write!(f, "Filename is empty"),
            ValidationError::IllegalFilenameChar { name, ch } => {
                write!(f, "Filename {:?} contains illegal character {:?}", name, ch)
            }
            ValidationError::ReservedFilename(n) => write!(f, "Filename {:?} is reserved", n),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Address resolution and connection errors
#[derive(Debug)]
pub enum NetworkError {
    Resolution { target: String, source: io::Error },
    NoReachableEndpoint {
        target: String,
        attempts: usize,
        last_error: Option<io::Error>,
    },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Resolution { target, source } => {
                write!(f, "Failed to resolve {}: {}", target, source)
            }
            NetworkError::NoReachableEndpoint {
                target,
                attempts,
                last_error,
            } => {
                write!(f, "No reachable endpoint for {} ({} tried)", target, attempts)?;
                if let Some(e) = last_error {
                    write!(f, ": {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for NetworkError {}

/// Data channel negotiation errors
#[derive(Debug)]
pub enum NegotiationError {
    UnexpectedCommand(String),
    DataPortParse(ValidationError),
    ConnectionClosed,
    Timeout(Duration),
    Network(NetworkError),
    Io(io::Error),
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationError::UnexpectedCommand(line) => {
                write!(f, "Expected DATA_PORT, got {:?}", line)
            }
            NegotiationError::DataPortParse(e) => write!(f, "Invalid data port: {}", e),
            NegotiationError::ConnectionClosed => {
                write!(f, "Control connection closed during negotiation")
            }
            NegotiationError::Timeout(d) => {
                write!(f, "No DATA_PORT received within {}s", d.as_secs())
            }
            NegotiationError::Network(e) => write!(f, "Data channel connect failed: {}", e),
            NegotiationError::Io(e) => write!(f, "Control channel I/O error: {}", e),
        }
    }
}

impl std::error::Error for NegotiationError {}

impl From<NetworkError> for NegotiationError {
    fn from(error: NetworkError) -> Self {
        NegotiationError::Network(error)
    }
}

impl From<io::Error> for NegotiationError {
    fn from(error: io::Error) -> Self {
        NegotiationError::Io(error)
    }
}

/// Directory listing errors
#[derive(Debug)]
pub enum StorageError {
    ListingTruncated { limit: usize, entries: usize },
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ListingTruncated { limit, entries } => write!(
                f,
                "Listing of {} entries exceeds the {} byte ceiling",
                entries, limit
            ),
            StorageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

/// File transfer errors
#[derive(Debug)]
pub enum TransferError {
    /// Reported to the client as `ERROR_FILE_NOT_FOUND`; the session continues.
    FileNotFound(String),
    Io(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::FileNotFound(name) => write!(f, "File not found: {}", name),
            TransferError::Io(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::Io(error)
    }
}

/// Errors seen by the command-line client
#[derive(Debug)]
pub enum ClientError {
    Network(NetworkError),
    Io(io::Error),
    /// The server answered `ERROR_INVALID_COMMAND`
    Rejected(String),
    /// The server sent something other than the expected token
    UnexpectedReply { expected: &'static str, got: String },
    ConnectionClosed,
    Timeout(Duration),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(e) => write!(f, "{}", e),
            ClientError::Io(e) => write!(f, "I/O error: {}", e),
            ClientError::Rejected(cmd) => write!(f, "Server rejected command {:?}", cmd),
            ClientError::UnexpectedReply { expected, got } => {
                write!(f, "Expected {}, server sent {:?}", expected, got)
            }
            ClientError::ConnectionClosed => write!(f, "Server closed the control connection"),
            ClientError::Timeout(d) => write!(f, "No response within {}s", d.as_secs()),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<NetworkError> for ClientError {
    fn from(error: NetworkError) -> Self {
        ClientError::Network(error)
    }
}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        ClientError::Io(error)
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum FtServerError {
    Config(config::ConfigError),
    Network(NetworkError),
    Negotiation(NegotiationError),
    Storage(StorageError),
    Transfer(TransferError),
    ControlIo(io::Error),
    LineTooLong(usize),
}

impl fmt::Display for FtServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtServerError::Config(e) => write!(f, "Configuration error: {}", e),
            FtServerError::Network(e) => write!(f, "Network error: {}", e),
            FtServerError::Negotiation(e) => write!(f, "Negotiation error: {}", e),
            FtServerError::Storage(e) => write!(f, "Storage error: {}", e),
            FtServerError::Transfer(e) => write!(f, "Transfer error: {}", e),
            FtServerError::ControlIo(e) => write!(f, "Control channel I/O error: {}", e),
            FtServerError::LineTooLong(limit) => {
                write!(f, "Control line exceeds {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for FtServerError {}

impl From<config::ConfigError> for FtServerError {
    fn from(error: config::ConfigError) -> Self {
        FtServerError::Config(error)
    }
}

impl From<NetworkError> for FtServerError {
    fn from(error: NetworkError) -> Self {
        FtServerError::Network(error)
    }
}

impl From<NegotiationError> for FtServerError {
    fn from(error: NegotiationError) -> Self {
        FtServerError::Negotiation(error)
    }
}

impl From<StorageError> for FtServerError {
    fn from(error: StorageError) -> Self {
        FtServerError::Storage(error)
    }
}

impl From<TransferError> for FtServerError {
    fn from(error: TransferError) -> Self {
        FtServerError::Transfer(error)
    }
}

impl From<io::Error> for FtServerError {
    fn from(error: io::Error) -> Self {
        FtServerError::ControlIo(error)
    }
}
