// src/storage/memory.rs

//! In-memory blob store

use super::BlobStore;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// An object held by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Records uploads in memory; paths containing a configured marker fail
#[derive(Debug, Default)]
pub struct MemoryStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    uploads: Mutex<Vec<String>>,
    fail_markers: Vec<String>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Fail every upload whose path contains `marker`
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_markers.push(marker.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().get(path).cloned()
    }

    /// Stored paths in lexicographic order
    pub fn paths(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }

    /// Every upload call in the order it happened, including overwrites
    pub fn upload_log(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }

    /// Number of upload calls made for `path`
    pub fn upload_count(&self, path: &str) -> usize {
        self.uploads.lock().iter().filter(|p| *p == path).count()
    }
}

impl BlobStore for MemoryStore {
    fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<String> {
        if self.fail_markers.iter().any(|m| path.contains(m.as_str())) {
            return Err(Error::UploadError(format!(
                "unexpected status code 500 for {path}, response: injected failure"
            )));
        }

        self.uploads.lock().push(path.to_string());
        self.objects.lock().insert(
            path.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(path))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let prefix = format!("memory://{}/", self.bucket);
        url.strip_prefix(&prefix)
            .and_then(|path| self.get(path))
            .map(|object| object.data)
            .ok_or_else(|| Error::DownloadError(format!("unexpected status code 404 for {url}")))
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}/{}", self.bucket, path)
    }

    fn name(&self) -> &str {
        &self.bucket
    }
}
