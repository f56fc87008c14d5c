// src/publication/asset.rs

//! Publication assets
//!
//! An asset is the raw container a publication was parsed from. It knows its
//! name and media type and can produce a [`Fetcher`] over its contents.

use super::fetcher::{ArchiveFetcher, Fetcher};
use crate::error::{Error, Result};
use std::sync::Arc;

pub const EPUB_MEDIA_TYPE: &str = "application/epub+zip";

/// ZIP local file header signature
const ZIP_SIGNATURE: &[u8; 2] = b"PK";

/// Capability to name a container and open a fetcher over it
pub trait PublicationAsset {
    fn name(&self) -> &str;

    fn media_type(&self) -> &str;

    fn create_fetcher(&self) -> Result<Box<dyn Fetcher>>;
}

/// An EPUB archive held in memory
#[derive(Clone)]
pub struct EpubAsset {
    name: String,
    data: Arc<[u8]>,
}

impl EpubAsset {
    /// Wrap archive bytes, rejecting data that cannot be a ZIP container
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let name = name.into();
        let data = data.into();

        if data.len() < 4 {
            return Err(Error::InvalidArchive(format!(
                "{name}: file too small to be a valid EPUB"
            )));
        }
        if !data.starts_with(ZIP_SIGNATURE) {
            return Err(Error::InvalidArchive(format!(
                "{name}: file does not appear to be a valid EPUB (missing ZIP signature)"
            )));
        }

        Ok(Self { name, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl PublicationAsset for EpubAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        EPUB_MEDIA_TYPE
    }

    fn create_fetcher(&self) -> Result<Box<dyn Fetcher>> {
        let fetcher = ArchiveFetcher::new(self.name.clone(), Arc::clone(&self.data))?;
        Ok(Box::new(fetcher))
    }
}
