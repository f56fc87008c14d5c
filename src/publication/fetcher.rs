// src/publication/fetcher.rs

//! Resource fetchers
//!
//! A fetcher reads the whole content of a resource by href. Lookups ignore
//! the fragment and a leading slash, and fall back to the percent-decoded
//! path so `chapter%201.xhtml` finds `chapter 1.xhtml`.

use super::href;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

/// Whole-resource read access to a publication's files
pub trait Fetcher: Send + Sync {
    /// Read the full content of the resource at `href`
    fn read(&self, href: &str) -> Result<Vec<u8>>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Archive entry names to try for `href`, most literal first
fn candidate_paths(href: &str) -> Vec<String> {
    let path = href::relative_href(href::base_href(href));
    let mut candidates = vec![path.to_string()];
    if let Ok(decoded) = urlencoding::decode(path) {
        if decoded != path {
            candidates.push(decoded.into_owned());
        }
    }
    candidates
}

/// Fetcher over an in-memory ZIP archive
pub struct ArchiveFetcher {
    archive: Mutex<ZipArchive<Cursor<Arc<[u8]>>>>,
    name: String,
}

impl ArchiveFetcher {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let name = name.into();
        let archive = ZipArchive::new(Cursor::new(data.into()))
            .map_err(|e| Error::InvalidArchive(format!("Unable to open {name}: {e}")))?;
        debug!("Opened archive {} with {} entries", name, archive.len());

        Ok(Self {
            archive: Mutex::new(archive),
            name,
        })
    }
}

impl Fetcher for ArchiveFetcher {
    fn read(&self, href: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.lock();

        for path in candidate_paths(href) {
            match archive.by_name(&path) {
                Ok(mut file) => {
                    let mut buf = Vec::with_capacity(file.size() as usize);
                    file.read_to_end(&mut buf)
                        .map_err(|e| Error::ReadError(format!("{path}: {e}")))?;
                    return Ok(buf);
                }
                Err(ZipError::FileNotFound) => continue,
                Err(e) => return Err(Error::ReadError(format!("{path}: {e}"))),
            }
        }

        Err(Error::ResourceNotFound(href.to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fetcher over a map of paths to bytes
#[derive(Debug, Default, Clone)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    pub fn with(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl Fetcher for MemoryFetcher {
    fn read(&self, href: &str) -> Result<Vec<u8>> {
        candidate_paths(href)
            .iter()
            .find_map(|path| self.files.get(path))
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(href.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_candidate_paths() {
        assert_eq!(candidate_paths("/OEBPS/ch1.xhtml#s"), vec!["OEBPS/ch1.xhtml"]);
        assert_eq!(
            candidate_paths("OEBPS/chapter%201.xhtml"),
            vec!["OEBPS/chapter%201.xhtml", "OEBPS/chapter 1.xhtml"]
        );
    }

    #[test]
    fn test_archive_fetcher_reads_entries() {
        let data = build_zip(&[
            ("mimetype", &b"application/epub+zip"[..]),
            ("OEBPS/chapter 1.xhtml", &b"<html>one</html>"[..]),
        ]);
        let fetcher = ArchiveFetcher::new("book.epub", data).unwrap();

        assert_eq!(fetcher.read("mimetype").unwrap(), b"application/epub+zip");
        assert_eq!(
            fetcher.read("/OEBPS/chapter%201.xhtml#p3").unwrap(),
            b"<html>one</html>"
        );
        assert!(matches!(
            fetcher.read("OEBPS/missing.xhtml"),
            Err(Error::ResourceNotFound(_))
        ));
        assert_eq!(fetcher.name(), "book.epub");
    }

    #[test]
    fn test_archive_fetcher_rejects_garbage() {
        let result = ArchiveFetcher::new("bad.epub", b"PK not really".to_vec());
        assert!(matches!(result, Err(Error::InvalidArchive(_))));
    }

    #[test]
    fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new().with("a/b.css", "body{}");
        assert_eq!(fetcher.read("/a/b.css").unwrap(), b"body{}");
        assert!(fetcher.read("a/c.css").is_err());
    }
}
