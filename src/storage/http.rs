// src/storage/http.rs

//! HTTP client for Supabase-compatible object storage
//!
//! Objects live under `{url}/storage/v1/object/{bucket}/{path}` and are
//! served publicly from `{url}/storage/v1/object/public/{bucket}/{path}`.
//! Every request carries the service key both as `apikey` and as a bearer
//! token.

use super::BlobStore;
use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::{debug, info};

/// Blocking object-storage client bound to one bucket
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
    user_agent: String,
}

impl StorageClient {
    /// Create a client for `bucket` using the storage settings in `config`
    pub fn new(config: &Config, bucket: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            service_key: config.service_key.clone(),
            bucket: bucket.to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Same connection pool and credentials, different bucket
    pub fn with_bucket(&self, bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..self.clone()
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Authenticated object URL for `path`
    pub fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("User-Agent", &self.user_agent)
    }
}

/// Drain the body of a failed response for diagnostics
fn failure_body(response: Response) -> String {
    response.text().unwrap_or_default()
}

impl BlobStore for StorageClient {
    fn upload(&self, path: &str, data: &[u8], content_type: &str) -> Result<String> {
        let url = self.object_url(path);
        debug!("POST {} ({} bytes)", url, data.len());

        let mut request = self
            .authorize(self.client.post(&url))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(data.to_vec());

        // Browsers should display JSON documents rather than download them
        if path.to_ascii_lowercase().ends_with(".json") {
            request = request.header("Content-Disposition", "inline");
        }

        let response = request
            .send()
            .map_err(|e| Error::UploadError(format!("Failed to upload {path}: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(Error::UploadError(format!(
                "unexpected status code {} for {}, response: {}",
                status.as_u16(),
                path,
                failure_body(response)
            )));
        }

        Ok(self.public_url(path))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading {}", url);

        let response = self
            .authorize(self.client.get(url))
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::DownloadError(format!(
                "unexpected status code {} for {}, response: {}",
                status.as_u16(),
                url,
                failure_body(response)
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        Ok(bytes.to_vec())
    }

    /// Sources are read through the authenticated endpoint, not the public one
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.download(&self.object_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn name(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        let config = Config {
            storage_url: "https://proj.supabase.co/".to_string(),
            service_key: "key".to_string(),
            ..Config::default()
        };
        StorageClient::new(&config, "readium-manifests").unwrap()
    }

    #[test]
    fn test_object_and_public_urls() {
        let client = client();
        assert_eq!(
            client.object_url("book/manifest.json"),
            "https://proj.supabase.co/storage/v1/object/readium-manifests/book/manifest.json"
        );
        assert_eq!(
            client.public_url("book/manifest.json"),
            "https://proj.supabase.co/storage/v1/object/public/readium-manifests/book/manifest.json"
        );
    }

    #[test]
    fn test_with_bucket() {
        let source = client().with_bucket("epubs");
        assert_eq!(source.bucket(), "epubs");
        assert_eq!(
            source.object_url("dir/book.epub"),
            "https://proj.supabase.co/storage/v1/object/epubs/dir/book.epub"
        );
        assert_eq!(source.name(), "epubs");
    }
}
