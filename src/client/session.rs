//! Control session
//!
//! Wraps one accepted control connection: line-oriented reads bounded by the
//! configured command length, token writes, and the peer address captured at
//! accept time.

use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::client::state::SessionState;
use crate::protocol::responses::format_response;
use log::debug;

/// Outcome of reading one line from the control channel.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlLine {
    /// A line with its terminator stripped
    Line(String),
    /// The line exceeded the configured maximum length
    TooLong,
    /// The peer closed the connection
    Closed,
}

/// One accepted control connection, owned by its session task.
pub struct ControlSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    state: SessionState,
    max_line: usize,
}

impl ControlSession {
    pub fn new(stream: TcpStream, peer: SocketAddr, max_line: usize) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            state: SessionState::AwaitingCommand,
            max_line,
        }
    }

    /// Remote address of the control connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Moves the session to `next`, logging the transition.
    pub fn transition(&mut self, next: SessionState) {
        debug!("Client {}: {} -> {}", self.peer, self.state, next);
        self.state = next;
    }

    /// Writer half, for components that report status on the control channel.
    pub fn writer_mut(&mut self) -> &mut OwnedWriteHalf {
        &mut self.writer
    }

    /// Reads one `\n`-terminated line of at most `max_line` bytes, not
    /// counting the `\n` or `\r\n` terminator.
    ///
    /// An unterminated line followed by EOF is still returned as a line.
    pub async fn read_line(&mut self) -> io::Result<ControlLine> {
        let mut buf = Vec::new();
        let limit = self.max_line as u64 + 2;

        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await?;

        if n == 0 {
            return Ok(ControlLine::Closed);
        }

        let line = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.len() > self.max_line {
            return Ok(ControlLine::TooLong);
        }
        Ok(ControlLine::Line(String::from_utf8_lossy(line).into_owned()))
    }

    /// Sends a newline-terminated token on the control channel.
    pub async fn send_token(&mut self, token: &str) -> io::Result<()> {
        self.writer.write_all(format_response(token).as_bytes()).await?;
        self.writer.flush().await
    }

    /// Closes the write side so the peer sees EOF.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn session_pair(max_line: usize) -> (ControlSession, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (server, peer) = listener.accept().await.unwrap();
        (ControlSession::new(server, peer, max_line), client)
    }

    #[tokio::test]
    async fn reads_lines_and_strips_terminators() {
        let (mut session, mut client) = session_pair(64).await;
        client.write_all(b"LIST\r\nGET a.txt\nEXIT").await.unwrap();
        client.shutdown().await.unwrap();

        assert_eq!(session.read_line().await.unwrap(), ControlLine::Line("LIST".into()));
        assert_eq!(
            session.read_line().await.unwrap(),
            ControlLine::Line("GET a.txt".into())
        );
        assert_eq!(session.read_line().await.unwrap(), ControlLine::Line("EXIT".into()));
        assert_eq!(session.read_line().await.unwrap(), ControlLine::Closed);
    }

    #[tokio::test]
    async fn overlong_lines_are_flagged() {
        let (mut session, mut client) = session_pair(8).await;
        client.write_all(b"GET averyveryverylongname\n").await.unwrap();

        assert_eq!(session.read_line().await.unwrap(), ControlLine::TooLong);
    }

    #[tokio::test]
    async fn line_at_the_limit_is_accepted() {
        let (mut session, mut client) = session_pair(5).await;
        client.write_all(b"LIST\n").await.unwrap();

        assert_eq!(session.read_line().await.unwrap(), ControlLine::Line("LIST".into()));
    }

    #[tokio::test]
    async fn crlf_does_not_count_against_the_limit() {
        let (mut session, mut client) = session_pair(8).await;
        client.write_all(b"GET a.bc\r\nGET ab.cd\r\n").await.unwrap();

        assert_eq!(
            session.read_line().await.unwrap(),
            ControlLine::Line("GET a.bc".into())
        );
        assert_eq!(session.read_line().await.unwrap(), ControlLine::TooLong);
    }

    #[tokio::test]
    async fn tokens_are_newline_terminated() {
        let (mut session, mut client) = session_pair(64).await;
        session.send_token("HELLO").await.unwrap();
        session.shutdown().await.unwrap();

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HELLO\n");
    }
}
