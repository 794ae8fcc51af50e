//! Persistence for the dedup state and the feed document.
//!
//! Both files are replaced atomically: the new content goes to a sibling
//! temp file which is flushed and then renamed over the target, so a crash
//! mid-write leaves the previous version intact.
//!
//! ```text
//! {output}/
//! ├── state.json      # dedup set + topic visit records
//! └── tamilmv.xml     # RSS 2.0 feed, append-only entries
//! ```

pub mod feed;
pub mod local;

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::SyncState;

// Re-export for convenience
pub use feed::FeedFile;
pub use local::LocalStateStore;

/// Trait for dedup state backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state, or an empty state if none was saved yet.
    async fn load(&self) -> Result<SyncState>;

    /// Persist the state atomically.
    async fn save(&self, state: &SyncState) -> Result<()>;
}

/// Write bytes atomically (write to temp, then rename).
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(tmp, path).await
}

/// Read bytes, returning None if the file doesn't exist.
pub(crate) async fn read_optional(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/test.txt");

        write_atomic(&path, b"hello").await.unwrap();
        let data = read_optional(&path).await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("nested/test.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");

        write_atomic(&path, b"first version").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();
        assert_eq!(read_optional(&path).await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let data = read_optional(&tmp.path().join("nope.txt")).await.unwrap();
        assert!(data.is_none());
    }
}
