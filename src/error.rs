// src/error.rs

//! Error types shared across the crate

use thiserror::Error;

/// Errors produced while materializing a publication
#[derive(Error, Debug)]
pub enum Error {
    /// The inbound request was malformed or missing required fields
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A filename tried to escape its storage prefix
    #[error("Invalid filename: path traversal not allowed: {0}")]
    PathTraversal(String),

    /// The downloaded source does not look like an EPUB archive
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// A link did not resolve to any resource in the publication
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A resource exists but its bytes could not be read
    #[error("Failed to read resource: {0}")]
    ReadError(String),

    /// The blob store rejected or failed an upload
    #[error("Upload failed: {0}")]
    UploadError(String),

    /// The blob store rejected or failed a download
    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// HTTP-style status code for the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) | Error::PathTraversal(_) | Error::InvalidArchive(_) => 400,
            _ => 500,
        }
    }

    /// Whether the error came from the caller rather than a collaborator
    pub fn is_input_error(&self) -> bool {
        self.status_code() == 400
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
