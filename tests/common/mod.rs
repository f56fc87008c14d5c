// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use quire::{Link, SourceManifest};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const CHAPTER_ONE: &str = r#"<html><body>
<p>Call me Ishmael.</p>
<a href="./ch2.xhtml#start">Next</a>
<a href="https://example.org/whales">Whales</a>
<a href='#fn1'>1</a>
</body></html>"#;

pub const CHAPTER_TWO: &str = r#"<html><body><p id="start">Carpet-Bag.</p>
<a href="/OEBPS/ch1.xhtml">Back</a></body></html>"#;

/// Build an EPUB-shaped ZIP archive in memory.
pub fn build_epub(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    writer.start_file("mimetype", options).unwrap();
    writer.write_all(b"application/epub+zip").unwrap();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A small two-chapter book: archive bytes plus its parsed manifest.
///
/// The TOC references chapter one through a fragment and the stylesheet is
/// only reachable through `resources`.
pub fn sample_book() -> (Vec<u8>, SourceManifest) {
    let cover = [0x89, b'P', b'N', b'G'];
    let archive = build_epub(&[
        ("OEBPS/ch1.xhtml", CHAPTER_ONE.as_bytes()),
        ("OEBPS/ch2.xhtml", CHAPTER_TWO.as_bytes()),
        ("OEBPS/toc.xhtml", &b"<nav><a href=\"ch1.xhtml\">One</a></nav>"[..]),
        ("OEBPS/style.css", &b"p { margin: 0 }"[..]),
        ("OEBPS/cover.png", &cover[..]),
    ]);

    (archive, sample_manifest())
}

pub fn sample_manifest() -> SourceManifest {
    SourceManifest {
        metadata: serde_json::json!({
            "title": "Moby-Dick",
            "author": "Herman Melville",
            "language": "en"
        }),
        reading_order: vec![
            Link::new("/OEBPS/ch1.xhtml")
                .with_type("application/xhtml+xml")
                .with_title("Loomings"),
            Link::new("OEBPS/ch2.xhtml").with_type("application/xhtml+xml"),
        ],
        table_of_contents: vec![
            Link::new("OEBPS/toc.xhtml").with_title("Table of Contents"),
            Link::new("OEBPS/ch1.xhtml#top")
                .with_title("Loomings")
                .with_child(Link::new("OEBPS/ch2.xhtml#start").with_title("The Carpet-Bag")),
        ],
        links: vec![
            Link::new("https://creativecommons.org/publicdomain/mark/1.0/").with_rel("license"),
            Link::new("~readium/positions.json")
                .with_type("application/vnd.readium.position-list+json"),
        ],
        resources: vec![
            Link::new("OEBPS/toc.xhtml").with_type("application/xhtml+xml"),
            Link::new("OEBPS/style.css").with_type("text/css"),
            Link::new("OEBPS/cover.png")
                .with_type("image/png")
                .with_rel("cover"),
        ],
    }
}
