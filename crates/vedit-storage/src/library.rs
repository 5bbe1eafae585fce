//! Media library rooted at fixed directories.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Library configuration.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory for uploaded originals
    pub originals_dir: PathBuf,
    /// Directory for proxies and edit outputs
    pub proxies_dir: PathBuf,
    /// Directory for timeline intermediates
    pub work_dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            originals_dir: PathBuf::from("data/originals"),
            proxies_dir: PathBuf::from("data/proxies"),
            work_dir: PathBuf::from("data/work"),
        }
    }
}

impl LibraryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            originals_dir: std::env::var("ORIGINALS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.originals_dir),
            proxies_dir: std::env::var("PROXIES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.proxies_dir),
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
        }
    }
}

/// Listing of catalog contents.
#[derive(Debug, Clone, Serialize)]
pub struct MediaListing {
    pub originals: Vec<String>,
    pub proxies: Vec<String>,
}

/// Path resolution and listing over the fixed directory roots.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    config: LibraryConfig,
}

impl MediaLibrary {
    /// Open the library, creating the directory roots if needed.
    pub async fn new(config: LibraryConfig) -> StorageResult<Self> {
        tokio::fs::create_dir_all(&config.originals_dir).await?;
        tokio::fs::create_dir_all(&config.proxies_dir).await?;
        tokio::fs::create_dir_all(&config.work_dir).await?;
        debug!(
            "Media library opened (originals: {}, proxies: {}, work: {})",
            config.originals_dir.display(),
            config.proxies_dir.display(),
            config.work_dir.display()
        );
        Ok(Self { config })
    }

    /// Open from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::new(LibraryConfig::from_env()).await
    }

    /// Resolve a filename inside the originals directory.
    pub fn original_path(&self, filename: &str) -> StorageResult<PathBuf> {
        Ok(self.config.originals_dir.join(sanitize(filename)?))
    }

    /// Resolve a filename inside the proxies directory.
    pub fn proxy_path(&self, filename: &str) -> StorageResult<PathBuf> {
        Ok(self.config.proxies_dir.join(sanitize(filename)?))
    }

    /// Resolve a filename inside the work directory.
    pub fn work_path(&self, filename: &str) -> StorageResult<PathBuf> {
        Ok(self.config.work_dir.join(sanitize(filename)?))
    }

    /// List catalog contents, sorted for stable output.
    pub async fn list(&self) -> StorageResult<MediaListing> {
        Ok(MediaListing {
            originals: list_dir(&self.config.originals_dir).await?,
            proxies: list_dir(&self.config.proxies_dir).await?,
        })
    }
}

async fn list_dir(dir: &Path) -> StorageResult<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Reject names that could escape the library roots.
fn sanitize(filename: &str) -> StorageResult<&str> {
    if filename.is_empty() {
        return Err(StorageError::InvalidFilename("empty filename".to_string()));
    }
    if filename.contains('/') || filename.contains('\\') || filename.contains('\0') {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    if filename == "." || filename == ".." {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn library(root: &Path) -> MediaLibrary {
        MediaLibrary::new(LibraryConfig {
            originals_dir: root.join("originals"),
            proxies_dir: root.join("proxies"),
            work_dir: root.join("work"),
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize("../etc/passwd").is_err());
        assert!(sanitize("a/b.mp4").is_err());
        assert!(sanitize("..").is_err());
        assert!(sanitize("").is_err());
        assert!(sanitize("clip.mp4").is_ok());
    }

    #[tokio::test]
    async fn test_new_creates_roots() {
        let tmp = tempdir().unwrap();
        let lib = library(tmp.path()).await;
        assert!(tmp.path().join("originals").is_dir());
        assert!(tmp.path().join("work").is_dir());

        let listing = lib.list().await.unwrap();
        assert!(listing.originals.is_empty());
        assert!(listing.proxies.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_files_only() {
        let tmp = tempdir().unwrap();
        let lib = library(tmp.path()).await;

        tokio::fs::write(lib.original_path("b.mp4").unwrap(), b"x")
            .await
            .unwrap();
        tokio::fs::write(lib.original_path("a.mp4").unwrap(), b"x")
            .await
            .unwrap();
        tokio::fs::create_dir(tmp.path().join("originals").join("subdir"))
            .await
            .unwrap();

        let listing = lib.list().await.unwrap();
        assert_eq!(listing.originals, vec!["a.mp4", "b.mp4"]);
    }

    #[tokio::test]
    async fn test_paths_resolve_under_roots() {
        let tmp = tempdir().unwrap();
        let lib = library(tmp.path()).await;
        let path = lib.proxy_path("proxy_a.mp4").unwrap();
        assert!(path.starts_with(tmp.path().join("proxies")));
    }
}
