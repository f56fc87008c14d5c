// src/materialize/mod.rs
//! Resource materialization
//!
//! Walks every reference collection of a publication, persisting each
//! distinct resource exactly once and recording where it went.
//!
//! Collections are visited in a fixed order:
//! 1. reading order
//! 2. table of contents, every depth, reduced to base hrefs
//! 3. auxiliary links that point inside the publication
//! 4. declared resources
//!
//! A failure in collections 1, 2 or 4 aborts the walk. Auxiliary links are
//! best-effort: a failure there is logged and the link is skipped.

mod resource_map;

pub use resource_map::ResourceMap;

use crate::content_type;
use crate::error::Result;
use crate::publication::{Link, Publication, href};
use crate::rewrite;
use crate::storage::{self, BlobStore};
use std::fmt;
use tracing::{debug, info, warn};

/// Which collection a candidate href came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    ReadingOrder,
    TableOfContents,
    Link,
    Resource,
}

impl Origin {
    /// Whether a failure on this collection aborts the walk
    pub fn is_required(self) -> bool {
        !matches!(self, Origin::Link)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::ReadingOrder => write!(f, "reading order"),
            Origin::TableOfContents => write!(f, "TOC"),
            Origin::Link => write!(f, "link"),
            Origin::Resource => write!(f, "resource"),
        }
    }
}

/// Outcome of a completed walk
#[derive(Debug, Default)]
pub struct WalkReport {
    pub resources: ResourceMap,
    /// Number of uploads performed
    pub uploaded: usize,
    /// Number of HTML documents passed through the link rewriter
    pub rewritten: usize,
    /// Total bytes uploaded
    pub bytes: u64,
    /// Best-effort hrefs that could not be materialized
    pub skipped: Vec<String>,
}

/// Persist every resource of `publication` under `base_path`
pub fn materialize_resources<S>(
    publication: &Publication,
    store: &S,
    base_path: &str,
) -> Result<WalkReport>
where
    S: BlobStore + ?Sized,
{
    ResourceWalker::new(publication, store, base_path).walk()
}

/// Single-use walker holding the state of one materialization
pub struct ResourceWalker<'a, S: BlobStore + ?Sized> {
    publication: &'a Publication,
    store: &'a S,
    base_path: &'a str,
    report: WalkReport,
}

impl<'a, S: BlobStore + ?Sized> ResourceWalker<'a, S> {
    pub fn new(publication: &'a Publication, store: &'a S, base_path: &'a str) -> Self {
        Self {
            publication,
            store,
            base_path,
            report: WalkReport::default(),
        }
    }

    pub fn walk(mut self) -> Result<WalkReport> {
        let publication: &'a Publication = self.publication;
        let manifest = publication.manifest();

        for link in &manifest.reading_order {
            self.visit(Origin::ReadingOrder, link.base_href(), link.media_type.as_deref())?;
        }

        let mut toc_hrefs = Vec::new();
        collect_toc_hrefs(&manifest.table_of_contents, &mut toc_hrefs);
        for base in toc_hrefs {
            let media_type = self.declared_type(base);
            self.visit(Origin::TableOfContents, base, media_type)?;
        }

        for link in manifest.links.iter().filter(|l| href::is_internal(&l.href)) {
            let base = link.base_href();
            let media_type = self.declared_type(base);
            self.visit(Origin::Link, base, media_type)?;
        }

        for link in &manifest.resources {
            self.visit(Origin::Resource, link.base_href(), link.media_type.as_deref())?;
        }

        info!(
            "Materialized {} resources ({} bytes, {} rewritten, {} skipped)",
            self.report.uploaded,
            self.report.bytes,
            self.report.rewritten,
            self.report.skipped.len()
        );
        Ok(self.report)
    }

    /// Media type declared for `base` anywhere in the manifest
    fn declared_type(&self, base: &str) -> Option<&'a str> {
        let publication: &'a Publication = self.publication;
        publication
            .manifest()
            .find_link(base)
            .and_then(|l| l.media_type.as_deref())
    }

    /// Apply the failure policy of `origin` around [`Self::process`]
    fn visit(&mut self, origin: Origin, base: &str, media_type: Option<&str>) -> Result<()> {
        if base.is_empty() {
            return Ok(());
        }

        match self.process(base, media_type) {
            Ok(()) => Ok(()),
            Err(e) if origin.is_required() => {
                warn!("Failed to process {} resource {}: {}", origin, base, e);
                Err(e)
            }
            Err(e) => {
                warn!("Skipping {} resource {}: {}", origin, base, e);
                self.report.skipped.push(base.to_string());
                Ok(())
            }
        }
    }

    fn process(&mut self, base: &str, media_type: Option<&str>) -> Result<()> {
        if self.report.resources.contains(base) {
            return Ok(());
        }

        let mut link = Link::new(base);
        link.media_type = media_type.map(str::to_string);
        let mut data = self.publication.get(&link)?;

        if content_type::is_html(media_type, base) {
            data = rewrite::rewrite_links(&data);
            self.report.rewritten += 1;
        }

        let path = href::storage_path(self.base_path, base);
        let url = storage::upload_with_resolved_type(self.store, &path, &data)?;
        debug!("{} -> {}", base, url);

        self.report.uploaded += 1;
        self.report.bytes += data.len() as u64;
        self.report.resources.insert(base, url);
        Ok(())
    }
}

/// Base hrefs of a TOC forest in depth-first order
fn collect_toc_hrefs<'a>(links: &'a [Link], out: &mut Vec<&'a str>) {
    for link in links {
        out.push(link.base_href());
        collect_toc_hrefs(&link.children, out);
    }
}
