//! File system lookups
//!
//! Existence checks scoped to the server root.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Looks up `filename` among the entries of `root`.
///
/// The match is exact and case-sensitive against the directory's own entry
/// names, so nothing outside `root` can be reached. Only regular files count;
/// directories and symlinks are reported as missing.
pub async fn find_file(root: &Path, filename: &str) -> io::Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(root).await?;

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_str() != Some(filename) {
            continue;
        }
        let file_type = entry.file_type().await?;
        return Ok(file_type.is_file().then(|| entry.path()));
    }

    Ok(None)
}
