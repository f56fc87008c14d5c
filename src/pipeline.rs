// src/pipeline.rs
//! End-to-end materialization of one publication
//!
//! Steps, in order:
//! 1. persist every resource ([`crate::materialize`])
//! 2. build and upload `readium/positions.json`
//! 3. build and upload `readium/content.json`
//! 4. synthesize and upload `manifest.json`
//!
//! Any failure aborts the run. Objects uploaded before the failure stay in
//! the store.

use crate::config::HrefMode;
use crate::content::ContentDocument;
use crate::error::Result;
use crate::manifest::{CONTENT_PATH, MANIFEST_PATH, ManifestBuilder, POSITIONS_PATH};
use crate::materialize;
use crate::positions::PositionList;
use crate::publication::Publication;
use crate::storage::{self, BlobStore};
use tracing::info;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Public URL of the uploaded manifest
    pub manifest_url: String,
    /// Prefix every object was stored under
    pub base_path: String,
    /// Distinct resources persisted
    pub resource_count: usize,
    /// Entries in the position list
    pub position_count: usize,
    /// Best-effort links that were skipped
    pub skipped: Vec<String>,
}

/// Storage prefix for a source file name
///
/// The extension is dropped and path separators become `_`, so
/// `fiction/moby-dick.epub` is stored under `fiction_moby-dick`. Only a dot
/// inside the final `/`-separated segment starts an extension, and a leading
/// dot (`.hidden`) does not.
pub fn sanitize_base_path(filename: &str) -> String {
    let name_start = filename.rfind('/').map_or(0, |i| i + 1);
    let stem = match filename[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &filename[..name_start + dot],
        _ => filename,
    };
    stem.replace(['/', '\\'], "_")
}

/// Materialize `publication` into `store` under `base_path`
pub fn process<S>(
    publication: &Publication,
    store: &S,
    base_path: &str,
    href_mode: HrefMode,
) -> Result<ProcessResult>
where
    S: BlobStore + ?Sized,
{
    info!("Materializing publication into {} under {}", store.name(), base_path);

    let walk = materialize::materialize_resources(publication, store, base_path)?;

    let positions = PositionList::build(publication);
    let positions_path = format!("{base_path}/{POSITIONS_PATH}");
    storage::upload_with_resolved_type(store, &positions_path, &positions.to_json()?)?;

    let content = ContentDocument::build(publication.manifest());
    let content_path = format!("{base_path}/{CONTENT_PATH}");
    storage::upload_with_resolved_type(store, &content_path, &content.to_json()?)?;

    let manifest = ManifestBuilder::new(publication.manifest(), &walk.resources, store, base_path)
        .href_mode(href_mode)
        .build();
    let manifest_path = format!("{base_path}/{MANIFEST_PATH}");
    let manifest_url =
        storage::upload_with_resolved_type(store, &manifest_path, &manifest.to_json()?)?;

    info!(
        "Published {} ({} resources, {} positions)",
        manifest_url,
        walk.resources.len(),
        positions.total
    );

    Ok(ProcessResult {
        manifest_url,
        base_path: base_path.to_string(),
        resource_count: walk.resources.len(),
        position_count: positions.total,
        skipped: walk.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::publication::{Link, MemoryFetcher, SourceManifest};
    use crate::storage::MemoryStore;

    fn publication() -> Publication {
        let manifest = SourceManifest {
            reading_order: vec![Link::new("ch1.xhtml").with_type("application/xhtml+xml")],
            resources: vec![Link::new("style.css").with_type("text/css")],
            ..Default::default()
        };
        let fetcher = MemoryFetcher::new()
            .with("ch1.xhtml", "<p>hello</p>")
            .with("style.css", "p{}");
        Publication::new(manifest, Box::new(fetcher))
    }

    #[test]
    fn test_sanitize_base_path() {
        assert_eq!(sanitize_base_path("book.epub"), "book");
        assert_eq!(sanitize_base_path("a/b/book.epub"), "a_b_book");
        assert_eq!(sanitize_base_path("a\\b.epub"), "a_b");
        assert_eq!(sanitize_base_path("noext"), "noext");
        assert_eq!(sanitize_base_path("my.book.epub"), "my.book");
        assert_eq!(sanitize_base_path("shelf.d/noext"), "shelf.d_noext");
        assert_eq!(sanitize_base_path("a/.hidden"), "a_.hidden");
    }

    #[test]
    fn test_sanitize_base_path_trailing_separators() {
        assert_eq!(sanitize_base_path("x.\u{e9}//"), "x.\u{e9}__");
        assert_eq!(sanitize_base_path("book.epub/"), "book.epub_");
        assert_eq!(sanitize_base_path("caf\u{e9}.\u{e9}pub"), "caf\u{e9}");
    }

    #[test]
    fn test_process_uploads_artifacts_last() {
        let store = MemoryStore::new("out");
        let result = process(&publication(), &store, "book", HrefMode::Relative).unwrap();

        assert_eq!(result.manifest_url, "memory://out/book/manifest.json");
        assert_eq!(result.resource_count, 2);
        assert_eq!(result.position_count, 1);
        assert_eq!(
            store.upload_log(),
            vec![
                "book/ch1.xhtml",
                "book/style.css",
                "book/readium/positions.json",
                "book/readium/content.json",
                "book/manifest.json",
            ]
        );
        assert_eq!(
            store.get("book/manifest.json").unwrap().content_type,
            "application/webpub+json; charset=utf-8"
        );
    }

    #[test]
    fn test_manifest_upload_failure_is_fatal() {
        let store = MemoryStore::new("out").failing_on("manifest.json");
        let err = process(&publication(), &store, "book", HrefMode::Relative).unwrap_err();

        assert!(matches!(err, Error::UploadError(_)));
        assert!(store.get("book/readium/content.json").is_some());
    }
}
