// src/positions.rs
//! Position list generation
//!
//! Estimates pagination for the reading order: each document is split into
//! positions of roughly [`CHARS_PER_POSITION`] characters, and every position
//! records how far it sits within its document and within the whole
//! publication.
//!
//! Generation is two-pass. The first pass reads every reading-order document
//! to learn its size; the second emits positions once the publication total
//! is known.

use crate::error::Result;
use crate::publication::{Publication, href};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Characters covered by a single position
pub const CHARS_PER_POSITION: usize = 1024;

/// The `positions.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionList {
    /// Number of entries in `positions`
    pub total: usize,
    pub positions: Vec<Position>,
}

/// A single position in the publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Document href, relative to the manifest
    pub href: String,
    pub locations: Locations,
    /// Media type of the document, when declared
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locations {
    /// 1-based, contiguous across the publication
    pub position: usize,
    /// Offset within the document, 0.0 to 1.0
    pub progression: f64,
    /// Offset within the publication, 0.0 to 1.0
    #[serde(rename = "totalProgression")]
    pub total_progression: f64,
}

/// Size of one reading-order document, gathered in the first pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub href: String,
    pub media_type: Option<String>,
    pub char_count: usize,
    pub position_count: usize,
}

impl ResourceInfo {
    pub fn new(href: impl Into<String>, media_type: Option<String>, char_count: usize) -> Self {
        Self {
            href: href.into(),
            media_type,
            char_count,
            position_count: position_count(char_count),
        }
    }
}

/// Number of positions for a document of `char_count` characters (at least 1)
pub fn position_count(char_count: usize) -> usize {
    char_count.div_ceil(CHARS_PER_POSITION).max(1)
}

impl PositionList {
    /// Build the list for the reading order of `publication`
    ///
    /// Documents that cannot be read are logged and left out; they neither
    /// contribute positions nor count towards the publication total.
    pub fn build(publication: &Publication) -> Self {
        let infos = measure(publication);
        Self::from_resources(&infos)
    }

    /// Second pass: emit positions for already-measured documents
    pub fn from_resources(infos: &[ResourceInfo]) -> Self {
        let total_chars: usize = infos.iter().map(|i| i.char_count).sum();
        let mut positions = Vec::with_capacity(infos.iter().map(|i| i.position_count).sum());
        let mut counter = 1;
        let mut cumulative_chars = 0;

        for info in infos {
            let relative = href::relative_href(&info.href);
            let n = info.position_count;

            for i in 0..n {
                let progression = if n > 1 {
                    i as f64 / (n - 1) as f64
                } else {
                    0.0
                };

                let total_progression = if total_chars > 0 {
                    let chars_at = cumulative_chars + i * info.char_count / n;
                    (chars_at as f64 / total_chars as f64).min(1.0)
                } else {
                    0.0
                };

                positions.push(Position {
                    href: relative.to_string(),
                    locations: Locations {
                        position: counter,
                        progression,
                        total_progression,
                    },
                    media_type: info.media_type.clone(),
                });
                counter += 1;
            }

            cumulative_chars += info.char_count;
        }

        debug!(
            "Generated {} positions over {} characters",
            positions.len(),
            total_chars
        );
        Self {
            total: positions.len(),
            positions,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// First pass: read every reading-order document and record its size
pub fn measure(publication: &Publication) -> Vec<ResourceInfo> {
    let reading_order = &publication.manifest().reading_order;
    let mut infos = Vec::with_capacity(reading_order.len());

    for link in reading_order {
        match publication.get(link) {
            Ok(data) => {
                infos.push(ResourceInfo::new(
                    link.href.clone(),
                    link.media_type.clone(),
                    data.len(),
                ));
            }
            Err(e) => warn!("Failed to read {} for positions: {}", link.href, e),
        }
    }

    infos
}
