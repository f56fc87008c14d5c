// src/content.rs
//! Content index (`content.json`)
//!
//! A nested projection of the table of contents. Publications without a TOC
//! fall back to a flat list built from the reading order.

use crate::error::Result;
use crate::publication::{Link, SourceManifest, href};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub metadata: ContentMetadata,
    pub structure: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Number of top-level entries in `structure`
    #[serde(rename = "numberOfItems")]
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentItem>,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl ContentItem {
    /// Project a TOC link and its descendants
    pub fn from_link(link: &Link) -> Self {
        Self {
            children: link.children.iter().map(Self::from_link).collect(),
            ..Self::flat(link)
        }
    }

    /// Project a link without descending into children
    fn flat(link: &Link) -> Self {
        Self {
            href: href::relative_href(&link.href).to_string(),
            title: link.title().map(str::to_string),
            media_type: link.media_type.clone(),
            children: Vec::new(),
        }
    }
}

impl ContentDocument {
    pub fn build(manifest: &SourceManifest) -> Self {
        let structure: Vec<ContentItem> = if manifest.table_of_contents.is_empty() {
            manifest.reading_order.iter().map(ContentItem::flat).collect()
        } else {
            manifest
                .table_of_contents
                .iter()
                .map(ContentItem::from_link)
                .collect()
        };

        Self {
            metadata: ContentMetadata {
                item_count: structure.len(),
            },
            structure,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
