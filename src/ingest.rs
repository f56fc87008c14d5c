// src/ingest.rs
//! Request handling for remote ingestion
//!
//! A request names a source EPUB by file name. The archive is downloaded from
//! the source store, opened, materialized into the output store, and the
//! outcome is reported as a JSON envelope:
//!
//! ```json
//! {"message": "EPUB processed successfully", "status": 200,
//!  "data": {"manifest_url": "...", "filename": "..."}}
//! ```
//!
//! Failures are reported as `{"error": "...", "status": 400|500}`.

use crate::config::HrefMode;
use crate::error::{Error, Result};
use crate::pipeline::{self, ProcessResult};
use crate::publication::{EpubAsset, Publication, SourceManifest};
use crate::storage::BlobStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

pub const MISSING_FILENAME: &str =
    "Missing 'filename' parameter. Provide EPUB filename in request body: {\"filename\":\"...\"}";

pub const SUCCESS_MESSAGE: &str = "EPUB processed successfully";

/// A validated ingestion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    filename: String,
}

impl IngestRequest {
    /// Validate a source file name
    ///
    /// A single leading slash is removed. Names containing `..` are rejected.
    pub fn new(filename: &str) -> Result<Self> {
        let filename = filename.strip_prefix('/').unwrap_or(filename);
        if filename.is_empty() {
            return Err(Error::InvalidRequest(MISSING_FILENAME.to_string()));
        }
        if filename.contains("..") {
            return Err(Error::PathTraversal(filename.to_string()));
        }
        Ok(Self {
            filename: filename.to_string(),
        })
    }

    /// Parse a `{"filename": "..."}` request body
    ///
    /// A body that is not a JSON object of strings is treated like one
    /// without a file name.
    pub fn from_body(body: &str) -> Result<Self> {
        let filename = serde_json::from_str::<HashMap<String, String>>(body)
            .ok()
            .and_then(|mut fields| fields.remove("filename"))
            .unwrap_or_default();
        if filename.is_empty() {
            return Err(Error::InvalidRequest(MISSING_FILENAME.to_string()));
        }
        Self::new(&filename)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Storage prefix for the materialized publication
    pub fn base_path(&self) -> String {
        pipeline::sanitize_base_path(&self.filename)
    }
}

/// Success envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    pub manifest_url: String,
    pub filename: String,
}

/// Failure envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    pub fn from_error(error: &Error) -> Self {
        Self::new(error.status_code(), error.to_string())
    }

    /// For transports that only accept POST
    pub fn method_not_allowed() -> Self {
        Self::new(
            405,
            "Method not allowed. This endpoint only accepts POST requests.",
        )
    }
}

/// Either envelope, with its status code
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(Response),
    Failure(ErrorResponse),
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Success(r) => r.status,
            Reply::Failure(e) => e.status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn to_json(&self) -> Result<String> {
        let body = match self {
            Reply::Success(r) => serde_json::to_string(r)?,
            Reply::Failure(e) => serde_json::to_string(e)?,
        };
        Ok(body)
    }
}

/// Downloads source archives from one store and materializes them into another
pub struct Ingestor<'a, D: BlobStore + ?Sized, S: BlobStore + ?Sized> {
    source: &'a D,
    output: &'a S,
    href_mode: HrefMode,
}

impl<'a, D: BlobStore + ?Sized, S: BlobStore + ?Sized> Ingestor<'a, D, S> {
    pub fn new(source: &'a D, output: &'a S) -> Self {
        Self {
            source,
            output,
            href_mode: HrefMode::default(),
        }
    }

    pub fn href_mode(mut self, mode: HrefMode) -> Self {
        self.href_mode = mode;
        self
    }

    /// Download the archive named by `request`
    pub fn download(&self, request: &IngestRequest) -> Result<EpubAsset> {
        info!("Downloading EPUB {} from {}", request.filename(), self.source.name());
        let data = self.source.fetch(request.filename())?;
        info!("Successfully downloaded EPUB file ({} bytes)", data.len());
        EpubAsset::new(request.filename(), data)
    }

    /// Materialize an already-downloaded archive
    pub fn materialize(
        &self,
        request: &IngestRequest,
        asset: &EpubAsset,
        manifest: SourceManifest,
    ) -> Result<ProcessResult> {
        let publication = Publication::open(asset, manifest)?;
        pipeline::process(
            &publication,
            self.output,
            &request.base_path(),
            self.href_mode,
        )
    }

    /// Run a request end to end
    pub fn run(&self, request: &IngestRequest, manifest: SourceManifest) -> Result<ProcessResult> {
        let asset = self.download(request)?;
        self.materialize(request, &asset, manifest)
    }

    /// Handle a raw request body and produce the response envelope
    pub fn handle(&self, body: &str, manifest: SourceManifest) -> Reply {
        let request = match IngestRequest::from_body(body) {
            Ok(request) => request,
            Err(e) => return failure(&e, None),
        };
        info!("Processing EPUB file: {}", request.filename());

        let asset = match self.download(&request) {
            Ok(asset) => asset,
            Err(e) => return failure(&e, Some("Failed to download EPUB")),
        };

        match self.materialize(&request, &asset, manifest) {
            Ok(result) => Reply::Success(Response {
                message: SUCCESS_MESSAGE.to_string(),
                status: 200,
                data: Some(ResponseData {
                    manifest_url: result.manifest_url,
                    filename: request.filename().to_string(),
                }),
            }),
            Err(e) => failure(&e, Some("Failed to process EPUB")),
        }
    }
}

fn failure(error: &Error, stage: Option<&str>) -> Reply {
    warn!("Request failed: {}", error);
    let mut response = ErrorResponse::from_error(error);
    if let Some(stage) = stage {
        response.error = format!("{stage}: {}", response.error);
    }
    Reply::Failure(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_strips_leading_slash() {
        let request = IngestRequest::new("/shelf/book.epub").unwrap();
        assert_eq!(request.filename(), "shelf/book.epub");
        assert_eq!(request.base_path(), "shelf_book");
    }

    #[test]
    fn test_request_rejects_traversal() {
        let err = IngestRequest::new("../secret.epub").unwrap_err();
        assert!(matches!(err, Error::PathTraversal(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_from_body() {
        let request = IngestRequest::from_body(r#"{"filename":"book.epub"}"#).unwrap();
        assert_eq!(request.filename(), "book.epub");

        for body in ["", "{}", r#"{"filename":""}"#, "not json", r#"{"filename":3}"#] {
            let err = IngestRequest::from_body(body).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{body}");
            assert!(err.to_string().contains(MISSING_FILENAME));
        }
    }

    #[test]
    fn test_envelopes_serialize() {
        let reply = Reply::Success(Response {
            message: SUCCESS_MESSAGE.to_string(),
            status: 200,
            data: Some(ResponseData {
                manifest_url: "https://x/m.json".to_string(),
                filename: "book.epub".to_string(),
            }),
        });
        let value: serde_json::Value = serde_json::from_str(&reply.to_json().unwrap()).unwrap();
        assert_eq!(value["data"]["manifest_url"], "https://x/m.json");
        assert_eq!(value["status"], 200);

        let reply = Reply::Failure(ErrorResponse::method_not_allowed());
        assert_eq!(reply.status(), 405);
        let value: serde_json::Value = serde_json::from_str(&reply.to_json().unwrap()).unwrap();
        assert!(value.get("data").is_none());
        assert!(value["error"].as_str().unwrap().starts_with("Method not allowed"));
    }
}
