// src/storage/local.rs

//! Directory-backed blob store
//!
//! Writes the distribution to disk with the same layout the remote bucket
//! would have, so it can be served by any static file server.

use super::BlobStore;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub struct LocalStore {
    root: PathBuf,
    base_url: String,
}

impl LocalStore {
    /// Store under `root`, reporting `file://` URLs
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let base_url = format!("file://{}", root.display());
        Self { root, base_url }
    }

    /// Store under `root`, reporting URLs under `base_url` (e.g. a CDN prefix)
    pub fn with_base_url(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a storage key to a file under the root
    fn file_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::PathTraversal(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalStore {
    fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<String> {
        let target = self.file_path(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::UploadError(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        fs::write(&target, data).map_err(|e| {
            Error::UploadError(format!("Failed to write {}: {e}", target.display()))
        })?;
        debug!("Wrote {} ({})", target.display(), content_type);

        Ok(self.public_url(path))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let path = url
            .strip_prefix(&self.base_url)
            .map(|p| p.trim_start_matches('/'))
            .ok_or_else(|| Error::DownloadError(format!("{url} is not served by this store")))?;
        let source = self.file_path(path)?;
        fs::read(&source)
            .map_err(|e| Error::DownloadError(format!("Failed to read {}: {e}", source.display())))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_upload_writes_nested_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::with_base_url(dir.path(), "https://cdn.example/books/");

        let url = store
            .upload("book/OEBPS/ch1.xhtml", b"<html/>", "application/xhtml+xml")
            .unwrap();
        assert_eq!(url, "https://cdn.example/books/book/OEBPS/ch1.xhtml");
        assert_eq!(
            fs::read(dir.path().join("book/OEBPS/ch1.xhtml")).unwrap(),
            b"<html/>"
        );
        assert_eq!(store.download(&url).unwrap(), b"<html/>");
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let err = store.upload("book/../../etc/passwd", b"x", "text/plain").unwrap_err();
        assert!(matches!(err, Error::PathTraversal(_)));
    }

    #[test]
    fn test_download_foreign_url() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.download("https://elsewhere.example/x").is_err());
    }
}
