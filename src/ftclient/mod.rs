//! Client side of the protocol
//!
//! Connects to a server, issues a single request per data channel and
//! collects the payload. The client listens for the data channel on the
//! same local address its control connection uses, since the server always
//! connects back to the control peer's host.

use log::{debug, info};
use std::net::IpAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::error::ClientError;
use crate::protocol::responses::{
    ERROR_FILE_NOT_FOUND, ERROR_INVALID_COMMAND, HELLO, OK, format_data_port, trim_line,
};
use crate::storage::DirectoryEntry;
use crate::utils::network;

/// Result of a GET request.
#[derive(Debug, PartialEq, Eq)]
pub enum GetOutcome {
    Received(Vec<u8>),
    NotFound,
}

/// A connected control session, seen from the client.
pub struct FtClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    local_ip: IpAddr,
    timeout: Duration,
}

impl FtClient {
    /// Opens the control connection. `timeout` bounds connecting and every
    /// wait for a server reply or data connection.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, ClientError> {
        let stream = network::connect(host, &port.to_string(), timeout).await?;
        let local_ip = stream.local_addr()?.ip();
        info!("Connected to {}:{}", host, port);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            local_ip,
            timeout,
        })
    }

    /// Requests a directory listing. `data_port` 0 picks an ephemeral port.
    pub async fn list(&mut self, data_port: u16) -> Result<Vec<u8>, ClientError> {
        let mut data = self.open_data_channel("LIST", data_port).await?;
        self.read_payload(&mut data).await
    }

    /// Requests a file. `data_port` 0 picks an ephemeral port.
    pub async fn get(&mut self, filename: &str, data_port: u16) -> Result<GetOutcome, ClientError> {
        let mut data = self
            .open_data_channel(&format!("GET {}", filename), data_port)
            .await?;

        let status = self.read_token().await?;
        match status.as_str() {
            OK => Ok(GetOutcome::Received(self.read_payload(&mut data).await?)),
            ERROR_FILE_NOT_FOUND => {
                // The server still closes the channel; wait for it.
                self.read_payload(&mut data).await?;
                Ok(GetOutcome::NotFound)
            }
            _ => Err(ClientError::UnexpectedReply {
                expected: OK,
                got: status,
            }),
        }
    }

    /// Sends a raw control line and returns the server's one-line reply.
    pub async fn raw_command(&mut self, line: &str) -> Result<String, ClientError> {
        self.send_line(line).await?;
        self.read_token().await
    }

    /// Ends the session.
    pub async fn exit(mut self) -> Result<(), ClientError> {
        self.send_line("EXIT").await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    async fn open_data_channel(
        &mut self,
        command: &str,
        data_port: u16,
    ) -> Result<TcpStream, ClientError> {
        self.send_line(command).await?;

        let reply = self.read_token().await?;
        match reply.as_str() {
            HELLO => {}
            ERROR_INVALID_COMMAND => return Err(ClientError::Rejected(command.to_string())),
            _ => {
                return Err(ClientError::UnexpectedReply {
                    expected: HELLO,
                    got: reply,
                });
            }
        }

        let listener = TcpListener::bind((self.local_ip, data_port)).await?;
        let port = listener.local_addr()?.port();
        self.writer.write_all(format_data_port(port).as_bytes()).await?;
        self.writer.flush().await?;
        debug!("Waiting for data connection on port {}", port);

        let (stream, from) = tokio::time::timeout(self.timeout, listener.accept())
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;
        debug!("Data connection from {}", from);
        Ok(stream)
    }

    async fn read_payload(&self, data: &mut TcpStream) -> Result<Vec<u8>, ClientError> {
        let mut payload = Vec::new();
        tokio::time::timeout(self.timeout, data.read_to_end(&mut payload))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;
        Ok(payload)
    }

    async fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        self.writer.write_all(format!("{}\n", line).as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_token(&mut self) -> Result<String, ClientError> {
        let mut line = String::new();
        let n = tokio::time::timeout(self.timeout, self.reader.read_line(&mut line))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(trim_line(&line).to_string())
    }
}

/// Parses a listing payload back into entries, skipping malformed lines.
pub fn parse_listing(payload: &[u8]) -> Vec<DirectoryEntry> {
    String::from_utf8_lossy(payload)
        .lines()
        .filter_map(|line| {
            let (size, name) = line.split_once('\t')?;
            Some(DirectoryEntry {
                name: name.to_string(),
                size: size.parse().ok()?,
            })
        })
        .collect()
}
