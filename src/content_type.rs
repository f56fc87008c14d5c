// src/content_type.rs
//! Content-Type resolution for persisted artifacts

use std::path::Path;

pub const WEBPUB_MANIFEST: &str = "application/webpub+json";
pub const READIUM_CONTENT: &str = "application/vnd.readium.content+json";
pub const READIUM_POSITIONS: &str = "application/vnd.readium.position-list+json";
pub const XHTML: &str = "application/xhtml+xml";
pub const HTML: &str = "text/html";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve the Content-Type to send when storing `path`
///
/// The three Readium artifacts are matched by file name before the
/// extension table is consulted. Matching is case-insensitive.
pub fn resolve(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();

    if lower.ends_with("manifest.json") {
        return "application/webpub+json; charset=utf-8";
    }
    if lower.ends_with("content.json") {
        return "application/vnd.readium.content+json; charset=utf-8";
    }
    if lower.ends_with("positions.json") {
        return "application/vnd.readium.position-list+json; charset=utf-8";
    }

    let ext = Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext {
        "json" => "application/json; charset=utf-8",
        "html" | "htm" => HTML,
        "xhtml" => XHTML,
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "xml" => "application/xml",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        _ => OCTET_STREAM,
    }
}

/// Whether a media type or file name denotes an HTML document
pub fn is_html(media_type: Option<&str>, href: &str) -> bool {
    if let Some(mt) = media_type {
        let essence = mt.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(XHTML) || essence.eq_ignore_ascii_case(HTML) {
            return true;
        }
    }
    let lower = href.to_ascii_lowercase();
    lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
}
