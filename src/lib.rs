// src/lib.rs

//! Quire publication materializer
//!
//! Turns a parsed EPUB publication into a self-contained web publication:
//! every resource re-hosted under one storage prefix, internal hyperlinks
//! rewritten to stay valid there, and a Readium manifest with a content index
//! and position list generated alongside.
//!
//! # Architecture
//!
//! - Publication: source manifest plus a fetcher over the EPUB archive
//! - Materializer: walks reading order, TOC, links and resources, uploading
//!   each distinct resource once
//! - Generators: position list, content index and manifest, all built from
//!   the source manifest
//! - Storage: object storage over HTTP, a local directory, or memory

pub mod config;
pub mod content;
pub mod content_type;
mod error;
pub mod ingest;
pub mod manifest;
pub mod materialize;
pub mod pipeline;
pub mod positions;
pub mod publication;
pub mod rewrite;
pub mod storage;

pub use config::{Config, HrefMode};
pub use content::ContentDocument;
pub use error::{Error, Result};
pub use ingest::{ErrorResponse, IngestRequest, Ingestor, Reply, Response};
pub use manifest::{ManifestBuilder, WebPubManifest};
pub use materialize::{ResourceMap, WalkReport, materialize_resources};
pub use pipeline::{ProcessResult, process, sanitize_base_path};
pub use positions::PositionList;
pub use publication::{EpubAsset, Link, Publication, PublicationAsset, SourceManifest};
pub use storage::{BlobStore, LocalStore, MemoryStore, StorageClient};
