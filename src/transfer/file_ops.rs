//! Module `file_ops`
//!
//! Streams a file from the server root to an open data channel, reporting
//! the `OK` / `ERROR_FILE_NOT_FOUND` status on the control channel first.

use log::{error, info};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransferError;
use crate::protocol::responses::{ERROR_FILE_NOT_FOUND, OK, format_response};
use crate::storage::find_file;

async fn write_status<C>(control: &mut C, token: &str) -> Result<(), TransferError>
where
    C: AsyncWrite + Unpin,
{
    control.write_all(format_response(token).as_bytes()).await?;
    control.flush().await?;
    Ok(())
}

/// Sends `filename` from `root` over `data` in `chunk_size` pieces.
///
/// A missing file is answered with `ERROR_FILE_NOT_FOUND` on `control` and
/// `data` is left untouched. Each chunk is fully written, short writes
/// included, before the next read. Returns the number of bytes sent. The
/// data channel is not closed here.
pub async fn handle_file_download<C, D>(
    control: &mut C,
    data: &mut D,
    root: &Path,
    filename: &str,
    chunk_size: usize,
) -> Result<u64, TransferError>
where
    C: AsyncWrite + Unpin,
    D: AsyncWrite + Unpin,
{
    let path = match find_file(root, filename).await? {
        Some(path) => path,
        None => {
            write_status(control, ERROR_FILE_NOT_FOUND).await?;
            return Err(TransferError::FileNotFound(filename.to_string()));
        }
    };

    write_status(control, OK).await?;
    info!("Starting file download: {}", path.display());

    let mut file = File::open(&path).await?;
    let total_bytes_sent = match send_chunks(&mut file, data, chunk_size).await {
        Ok(n) => n,
        Err(e) => {
            error!("Transfer of {} failed: {}", path.display(), e);
            return Err(e);
        }
    };

    info!(
        "File download completed successfully: {} ({} bytes)",
        filename, total_bytes_sent
    );
    Ok(total_bytes_sent)
}

/// Copies `source` to `data` in `chunk_size` pieces and flushes.
async fn send_chunks<R, D>(source: &mut R, data: &mut D, chunk_size: usize) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin,
    D: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let n = source.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        data.write_all(&buffer[..n]).await?;
        total += n as u64;
    }

    data.flush().await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Yields `good` once, then fails every read.
    struct FailingReader {
        good: Option<Vec<u8>>,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.get_mut().good.take() {
                Some(bytes) => {
                    buf.put_slice(&bytes);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::other("disk went away"))),
            }
        }
    }

    /// Accepts at most `max` bytes per write call.
    struct TrickleWriter {
        written: Vec<u8>,
        max: usize,
    }

    impl AsyncWrite for TrickleWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            let n = buf.len().min(this.max);
            this.written.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn sends_ok_then_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.txt"), b"abc").unwrap();

        let mut control = Vec::new();
        let mut data = Vec::new();
        let sent = handle_file_download(&mut control, &mut data, dir.path(), "report.txt", 1025)
            .await
            .unwrap();

        assert_eq!(sent, 3);
        assert_eq!(control, b"OK\n");
        assert_eq!(data, b"abc");
    }

    #[tokio::test]
    async fn missing_file_touches_only_the_control_channel() {
        let dir = tempfile::tempdir().unwrap();

        let mut control = Vec::new();
        let mut data = Vec::new();
        let err = handle_file_download(&mut control, &mut data, dir.path(), "missing.txt", 1025)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::FileNotFound(ref n) if n == "missing.txt"));
        assert_eq!(control, b"ERROR_FILE_NOT_FOUND\n");
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn short_writes_are_resumed() {
        let dir = tempfile::tempdir().unwrap();
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(dir.path().join("blob.bin"), &content).unwrap();

        let mut control = Vec::new();
        let mut data = TrickleWriter {
            written: Vec::new(),
            max: 7,
        };
        let sent = handle_file_download(&mut control, &mut data, dir.path(), "blob.bin", 1025)
            .await
            .unwrap();

        assert_eq!(sent, content.len() as u64);
        assert_eq!(data.written, content);
    }

    #[tokio::test]
    async fn stalled_data_channel_is_a_transfer_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), b"xyz").unwrap();

        let mut control = Vec::new();
        let mut data = TrickleWriter {
            written: Vec::new(),
            max: 0,
        };
        let err = handle_file_download(&mut control, &mut data, dir.path(), "a.bin", 16)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Io(ref e) if e.kind() == io::ErrorKind::WriteZero));
    }

    #[tokio::test]
    async fn empty_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty"), b"").unwrap();

        let mut control = Vec::new();
        let mut data = Vec::new();
        let sent = handle_file_download(&mut control, &mut data, dir.path(), "empty", 8)
            .await
            .unwrap();

        assert_eq!(sent, 0);
        assert_eq!(control, b"OK\n");
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn read_error_is_a_transfer_error() {
        let mut source = FailingReader {
            good: Some(b"abc".to_vec()),
        };
        let mut data = Vec::new();
        let err = send_chunks(&mut source, &mut data, 16).await.unwrap_err();

        assert!(matches!(err, TransferError::Io(ref e) if e.kind() == io::ErrorKind::Other));
        assert_eq!(data, b"abc");
    }
}
