// src/publication/mod.rs

//! Publication model consumed by the materializer
//!
//! The Source Manifest arrives already parsed, in Readium Web Publication
//! Manifest shape. Resource bytes are read through a [`Fetcher`] obtained
//! from a [`PublicationAsset`].

mod asset;
mod fetcher;
pub mod href;

pub use asset::{EpubAsset, PublicationAsset, EPUB_MEDIA_TYPE};
pub use fetcher::{ArchiveFetcher, Fetcher, MemoryFetcher};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::debug;

/// A reference to a resource, possibly with nested children (TOC only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_rels",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub rel: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Link>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel.push(rel.into());
        self
    }

    pub fn with_child(mut self, child: Link) -> Self {
        self.children.push(child);
        self
    }

    /// Title, treating an empty string as absent
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// The href without its fragment
    pub fn base_href(&self) -> &str {
        href::base_href(&self.href)
    }

    pub fn has_rel(&self, rel: &str) -> bool {
        self.rel.iter().any(|r| r == rel)
    }
}

/// `rel` is either a single string or an array of strings
fn deserialize_rels<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(rel)) => vec![rel],
        Some(OneOrMany::Many(rels)) => rels,
        None => Vec::new(),
    })
}

/// Parsed publication structure produced by the upstream parser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceManifest {
    /// Opaque metadata, passed through unchanged
    #[serde(default)]
    pub metadata: serde_json::Value,

    #[serde(rename = "readingOrder", default)]
    pub reading_order: Vec<Link>,

    #[serde(rename = "toc", alias = "tableOfContents", default)]
    pub table_of_contents: Vec<Link>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub resources: Vec<Link>,
}

impl SourceManifest {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Error::InvalidRequest(format!("Invalid source manifest: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            Error::IoError(format!("Failed to read manifest {}: {e}", path.display()))
        })?;
        Self::from_json(&data)
    }

    /// Find the declared link for a base href
    ///
    /// Searches reading order, then resources, then the TOC tree, so that a
    /// TOC or auxiliary reference can inherit the declared media type.
    pub fn find_link(&self, base: &str) -> Option<&Link> {
        let base = href::relative_href(href::base_href(base));
        self.reading_order
            .iter()
            .chain(self.resources.iter())
            .find(|l| same_resource(l, base))
            .or_else(|| find_in_tree(&self.table_of_contents, base))
    }
}

/// Whether `link` points at `base`, ignoring fragment and leading slash
fn same_resource(link: &Link, base: &str) -> bool {
    href::relative_href(link.base_href()) == base
}

fn find_in_tree<'a>(links: &'a [Link], base: &str) -> Option<&'a Link> {
    for link in links {
        if same_resource(link, base) {
            return Some(link);
        }
        if let Some(found) = find_in_tree(&link.children, base) {
            return Some(found);
        }
    }
    None
}

/// A parsed publication plus the means to read its resources
pub struct Publication {
    manifest: SourceManifest,
    fetcher: Box<dyn Fetcher>,
}

impl Publication {
    pub fn new(manifest: SourceManifest, fetcher: Box<dyn Fetcher>) -> Self {
        Self { manifest, fetcher }
    }

    /// Open a publication from an asset and its already-parsed manifest
    pub fn open(asset: &dyn PublicationAsset, manifest: SourceManifest) -> Result<Self> {
        debug!("Opening publication {} ({})", asset.name(), asset.media_type());
        let fetcher = asset.create_fetcher()?;
        Ok(Self::new(manifest, fetcher))
    }

    pub fn manifest(&self) -> &SourceManifest {
        &self.manifest
    }

    /// Read the full content of the resource behind `link`
    pub fn get(&self, link: &Link) -> Result<Vec<u8>> {
        self.fetcher.read(&link.href)
    }
}

impl std::fmt::Debug for Publication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publication")
            .field("fetcher", &self.fetcher.name())
            .field("reading_order", &self.manifest.reading_order.len())
            .field("resources", &self.manifest.resources.len())
            .finish()
    }
}
