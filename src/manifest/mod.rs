// src/manifest/mod.rs
//! Web publication manifest synthesis
//!
//! Builds the `manifest.json` served next to the materialized resources.
//! References are relative to the manifest by default, so the whole
//! distribution can be moved as a unit. [`HrefMode::Absolute`] instead
//! resolves every internal reference to the URL its resource was stored at.
//!
//! Struct fields are declared in lexicographic key order so the serialized
//! document has sorted keys.

pub mod landmarks;

pub use landmarks::Landmark;

use crate::config::HrefMode;
use crate::content_type::{READIUM_CONTENT, READIUM_POSITIONS, WEBPUB_MANIFEST};
use crate::error::Result;
use crate::materialize::ResourceMap;
use crate::publication::{Link, SourceManifest, href};
use crate::storage::BlobStore;
use serde::{Deserialize, Serialize};

pub const WEBPUB_CONTEXT: &str = "https://readium.org/webpub-manifest/context.jsonld";

/// Storage location of the manifest, relative to the base path
pub const MANIFEST_PATH: &str = "manifest.json";
/// Storage location of the content index, relative to the base path
pub const CONTENT_PATH: &str = "readium/content.json";
/// Storage location of the position list, relative to the base path
pub const POSITIONS_PATH: &str = "readium/positions.json";

/// The synthesized manifest document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPubManifest {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub landmarks: Vec<ManifestLink>,
    pub links: Vec<ManifestLink>,
    pub metadata: serde_json::Value,
    #[serde(rename = "readingOrder")]
    pub reading_order: Vec<ManifestLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ManifestLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toc: Vec<TocEntry>,
}

impl WebPubManifest {
    /// Pretty-printed JSON with a two-space indent
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestLink {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<Rel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Link relation: a single value serializes as a string, several as an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rel {
    One(String),
    Many(Vec<String>),
}

impl Rel {
    pub fn from_rels(rels: &[String]) -> Option<Self> {
        match rels {
            [] => None,
            [one] => Some(Rel::One(one.clone())),
            many => Some(Rel::Many(many.to_vec())),
        }
    }

    pub fn contains(&self, rel: &str) -> bool {
        match self {
            Rel::One(r) => r == rel,
            Rel::Many(rs) => rs.iter().any(|r| r == rel),
        }
    }
}

/// Whether a resource href names a navigation document
fn is_navigation_document(href: &str) -> bool {
    href.contains("toc.xhtml") || href.contains("toc.ncx")
}

/// Assembles a [`WebPubManifest`] from a source manifest and its materialized resources
pub struct ManifestBuilder<'a, S: BlobStore + ?Sized> {
    source: &'a SourceManifest,
    resources: &'a ResourceMap,
    store: &'a S,
    base_path: &'a str,
    mode: HrefMode,
}

impl<'a, S: BlobStore + ?Sized> ManifestBuilder<'a, S> {
    pub fn new(
        source: &'a SourceManifest,
        resources: &'a ResourceMap,
        store: &'a S,
        base_path: &'a str,
    ) -> Self {
        Self {
            source,
            resources,
            store,
            base_path,
            mode: HrefMode::default(),
        }
    }

    pub fn href_mode(mut self, mode: HrefMode) -> Self {
        self.mode = mode;
        self
    }

    /// Absolute URL of the manifest itself
    pub fn self_url(&self) -> String {
        self.artifact_url(MANIFEST_PATH)
    }

    fn artifact_url(&self, relative: &str) -> String {
        self.store
            .public_url(&format!("{}/{}", self.base_path, relative))
    }

    /// Output form of a source href
    ///
    /// External and reserved hrefs pass through unchanged.
    fn href(&self, source: &str) -> String {
        if !href::is_internal(source) {
            return source.to_string();
        }
        match self.mode {
            HrefMode::Relative => href::relative_href(source).to_string(),
            HrefMode::Absolute => self.resources.resolve(source, |base| {
                self.store
                    .public_url(&href::storage_path(self.base_path, base))
            }),
        }
    }

    /// Output href for a generated `readium/*` artifact
    fn artifact_href(&self, relative: &str) -> String {
        match self.mode {
            HrefMode::Relative => relative.to_string(),
            HrefMode::Absolute => self.artifact_url(relative),
        }
    }

    pub fn build(&self) -> WebPubManifest {
        let metadata = match &self.source.metadata {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        };

        WebPubManifest {
            context: WEBPUB_CONTEXT.to_string(),
            landmarks: self.landmarks(),
            links: self.links(),
            metadata,
            reading_order: self.reading_order(),
            resources: self.resources(),
            toc: self.source.table_of_contents.iter().map(|l| self.toc_entry(l)).collect(),
        }
    }

    fn reading_order(&self) -> Vec<ManifestLink> {
        self.source
            .reading_order
            .iter()
            .map(|link| ManifestLink {
                href: self.href(&link.href),
                title: link.title().map(str::to_string),
                media_type: link.media_type.clone(),
                ..Default::default()
            })
            .collect()
    }

    fn toc_entry(&self, link: &Link) -> TocEntry {
        TocEntry {
            children: link.children.iter().map(|c| self.toc_entry(c)).collect(),
            href: self.href(&link.href),
            title: link.title().map(str::to_string),
        }
    }

    fn landmarks(&self) -> Vec<ManifestLink> {
        landmarks::discover(self.source)
            .into_iter()
            .map(|landmark| ManifestLink {
                href: self.href(&landmark.href),
                title: landmark.title,
                ..Default::default()
            })
            .collect()
    }

    /// Required links first, then every auxiliary link that is not a landmark
    fn links(&self) -> Vec<ManifestLink> {
        let mut links = vec![
            ManifestLink {
                href: self.self_url(),
                rel: Some(Rel::One("self".to_string())),
                media_type: Some(WEBPUB_MANIFEST.to_string()),
                ..Default::default()
            },
            ManifestLink {
                href: self.artifact_href(CONTENT_PATH),
                media_type: Some(READIUM_CONTENT.to_string()),
                ..Default::default()
            },
            ManifestLink {
                href: self.artifact_href(POSITIONS_PATH),
                media_type: Some(READIUM_POSITIONS.to_string()),
                ..Default::default()
            },
        ];

        links.extend(
            self.source
                .links
                .iter()
                .filter(|link| !landmarks::is_declared_landmark(link))
                .map(|link| ManifestLink {
                    href: self.href(&link.href),
                    rel: Rel::from_rels(&link.rel),
                    media_type: link.media_type.clone(),
                    ..Default::default()
                }),
        );

        links
    }

    fn resources(&self) -> Vec<ManifestLink> {
        self.source
            .resources
            .iter()
            .map(|link| {
                let mut rels = link.rel.clone();
                if is_navigation_document(&link.href) && !rels.iter().any(|r| r == "contents") {
                    rels.push("contents".to_string());
                }
                ManifestLink {
                    href: self.href(&link.href),
                    rel: Rel::from_rels(&rels),
                    media_type: link.media_type.clone(),
                    ..Default::default()
                }
            })
            .collect()
    }
}
