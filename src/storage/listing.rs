//! Directory listing
//!
//! Enumerates the server root and renders it as `"<size>\t<name>\n"` lines.

use log::{debug, info};
use std::path::Path;
use tokio::fs;

use crate::error::StorageError;
use crate::storage::results::DirectoryEntry;

/// Enumerates `root`, including the `.` and `..` markers.
///
/// Markers come first, then entries in the order the filesystem returns
/// them. Sizes come from `stat`, falling back to `lstat` for dangling links.
pub async fn enumerate(root: &Path) -> Result<Vec<DirectoryEntry>, StorageError> {
    let mut entries = Vec::new();

    for marker in [".", ".."] {
        let size = fs::metadata(root.join(marker)).await?.len();
        entries.push(DirectoryEntry {
            name: marker.to_string(),
            size,
        });
    }

    let mut dir = fs::read_dir(root).await?;
    while let Some(entry) = dir.next_entry().await? {
        let size = match fs::metadata(entry.path()).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                debug!("stat {} failed ({}), using lstat", entry.path().display(), e);
                entry.metadata().await?.len()
            }
        };
        entries.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            size,
        });
    }

    Ok(entries)
}

/// Serializes entries, failing instead of dropping any that do not fit.
pub fn render(entries: &[DirectoryEntry], max_bytes: usize) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    for entry in entries {
        buf.extend_from_slice(entry.to_string().as_bytes());
        if buf.len() > max_bytes {
            return Err(StorageError::ListingTruncated {
                limit: max_bytes,
                entries: entries.len(),
            });
        }
    }
    Ok(buf)
}

/// Lists `root` as a listing payload of at most `max_bytes`.
pub async fn list_directory(root: &Path, max_bytes: usize) -> Result<Vec<u8>, StorageError> {
    let entries = enumerate(root).await?;
    let listing = render(&entries, max_bytes)?;

    info!(
        "Listed {} - {} entries, {} bytes",
        root.display(),
        entries.len(),
        listing.len()
    );
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_every_entry_with_its_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        std::fs::write(dir.path().join("empty"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = list_directory(dir.path(), 64 * 1024).await.unwrap();
        let text = String::from_utf8(listing).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        let on_disk = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(lines.len(), on_disk + 2);
        assert!(lines.contains(&"3\ta.txt"));
        assert!(lines.contains(&"0\tempty"));
        assert!(lines[0].ends_with("\t."));
        assert!(lines[1].ends_with("\t.."));
        assert!(lines.iter().any(|l| l.ends_with("\tsub")));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn empty_directory_still_has_markers() {
        let dir = tempfile::tempdir().unwrap();
        let entries = enumerate(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".", ".."]);
    }

    // Oversized listings fail loudly rather than silently omitting entries.
    #[test]
    fn oversized_listing_is_rejected() {
        let entries: Vec<DirectoryEntry> = (0..10)
            .map(|i| DirectoryEntry {
                name: format!("file{}.bin", i),
                size: 1024,
            })
            .collect();

        let err = render(&entries, 32).unwrap_err();
        assert!(matches!(
            err,
            StorageError::ListingTruncated {
                limit: 32,
                entries: 10
            }
        ));
    }

    #[test]
    fn listing_exactly_at_the_ceiling_fits() {
        let entries = vec![DirectoryEntry {
            name: "a".into(),
            size: 7,
        }];
        assert_eq!(render(&entries, 4).unwrap(), b"7\ta\n");
    }

    #[tokio::test]
    async fn missing_root_is_an_io_error() {
        let err = list_directory(Path::new("/nonexistent/ftserver-root"), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
