// src/storage/mod.rs
//! Blob storage backends
//!
//! The materializer persists every resource and generated document through a
//! [`BlobStore`]. Backends:
//! - [`StorageClient`]: Supabase-compatible object storage over HTTP
//! - [`LocalStore`]: a directory on disk
//! - [`MemoryStore`]: in-process map, for dry runs and tests
//!
//! Stores do not retry. A failed call surfaces the backend's response so the
//! caller can decide whether the item was required.

mod http;
mod local;
mod memory;

pub use http::StorageClient;
pub use local::LocalStore;
pub use memory::{MemoryStore, StoredObject};

use crate::content_type;
use crate::error::Result;
use tracing::debug;

/// Persistence seam for materialized publications
pub trait BlobStore {
    /// Store `data` at `path` and return its public URL
    fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Fetch the bytes behind `url`
    fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Public URL an object at `path` would have, without touching the backend
    fn public_url(&self, path: &str) -> String;

    /// Fetch the object stored at `path`
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.download(&self.public_url(path))
    }

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Upload `data` with the Content-Type resolved from `path`
pub fn upload_with_resolved_type<S: BlobStore + ?Sized>(
    store: &S,
    path: &str,
    data: &[u8],
) -> Result<String> {
    let content_type = content_type::resolve(path);
    debug!("Uploading {} ({} bytes, {}) to {}", path, data.len(), content_type, store.name());
    store.upload(path, data, content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_with_resolved_type() {
        let store = MemoryStore::new("out");
        let url = upload_with_resolved_type(&store, "book/manifest.json", b"{}").unwrap();
        assert_eq!(url, "memory://out/book/manifest.json");

        let object = store.get("book/manifest.json").unwrap();
        assert_eq!(object.content_type, "application/webpub+json; charset=utf-8");
    }
}
