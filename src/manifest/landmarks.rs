// src/manifest/landmarks.rs

//! Landmark discovery
//!
//! Landmarks are well-known entry points (table of contents, start of the
//! text, copyright page). Sources are tried in order:
//! 1. auxiliary links marked by `rel` or by an exact well-known title
//! 2. top-level TOC entries whose title mentions a landmark
//! 3. the first reading-order document, when nothing else matched
//!
//! Each base href yields at most one landmark. A leading slash does not make
//! an href distinct.

use crate::publication::{Link, SourceManifest, href};
use std::collections::HashSet;

/// `rel` values that mark an auxiliary link as a landmark
pub const LANDMARK_RELS: [&str; 3] = ["contents", "start", "copyright"];

pub const TABLE_OF_CONTENTS: &str = "Table of Contents";
pub const BEGIN_READING: &str = "Begin Reading";
pub const COPYRIGHT_PAGE: &str = "Copyright Page";

/// A discovered landmark; `href` is still the source href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub href: String,
    pub title: Option<String>,
}

impl Landmark {
    fn new(href: &str, title: Option<&str>) -> Self {
        Self {
            href: href.to_string(),
            title: title.map(str::to_string),
        }
    }
}

/// Whether an auxiliary link is itself declared as a landmark
pub fn is_declared_landmark(link: &Link) -> bool {
    LANDMARK_RELS.iter().any(|rel| link.has_rel(rel))
        || matches!(
            link.title(),
            Some(TABLE_OF_CONTENTS | BEGIN_READING | COPYRIGHT_PAGE)
        )
}

/// Canonical landmark label for a TOC title, if it looks like one
pub fn classify_title(title: &str) -> Option<&'static str> {
    let title = title.to_lowercase();
    if title.contains("table of contents") || title.contains("contents") || title.contains("toc") {
        Some(TABLE_OF_CONTENTS)
    } else if title.contains("begin reading") || title.contains("start") {
        Some(BEGIN_READING)
    } else if title.contains("copyright") {
        Some(COPYRIGHT_PAGE)
    } else {
        None
    }
}

/// Discover landmarks for `manifest`
pub fn discover(manifest: &SourceManifest) -> Vec<Landmark> {
    let mut landmarks = Vec::new();
    let mut seen = HashSet::new();

    for link in manifest.links.iter().filter(|l| is_declared_landmark(l)) {
        if seen.insert(href::relative_href(link.base_href())) {
            landmarks.push(Landmark::new(&link.href, link.title()));
        }
    }

    for link in &manifest.table_of_contents {
        let Some(label) = link.title().and_then(classify_title) else {
            continue;
        };
        if seen.insert(href::relative_href(link.base_href())) {
            landmarks.push(Landmark::new(&link.href, Some(label)));
        }
    }

    if landmarks.is_empty() {
        if let Some(first) = manifest.reading_order.first() {
            landmarks.push(Landmark::new(&first.href, Some(BEGIN_READING)));
        }
    }

    landmarks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_title() {
        assert_eq!(classify_title("Contents"), Some(TABLE_OF_CONTENTS));
        assert_eq!(classify_title("TOC"), Some(TABLE_OF_CONTENTS));
        assert_eq!(classify_title("Start Here"), Some(BEGIN_READING));
        assert_eq!(classify_title("Copyright Notice"), Some(COPYRIGHT_PAGE));
        assert_eq!(classify_title("Chapter 1"), None);
    }

    #[test]
    fn test_declared_by_rel_or_title() {
        assert!(is_declared_landmark(&Link::new("toc.xhtml").with_rel("contents")));
        assert!(is_declared_landmark(
            &Link::new("c.xhtml").with_title("Copyright Page")
        ));
        assert!(!is_declared_landmark(
            &Link::new("c.xhtml").with_title("copyright page")
        ));
        assert!(!is_declared_landmark(&Link::new("l.xhtml").with_rel("license")));
    }

    #[test]
    fn test_fallback_to_first_document() {
        let manifest = SourceManifest {
            reading_order: vec![Link::new("ch1.xhtml"), Link::new("ch2.xhtml")],
            table_of_contents: vec![Link::new("ch1.xhtml").with_title("Chapter 1")],
            ..Default::default()
        };
        assert_eq!(
            discover(&manifest),
            vec![Landmark::new("ch1.xhtml", Some(BEGIN_READING))]
        );
    }

    #[test]
    fn test_no_landmarks_without_reading_order() {
        assert!(discover(&SourceManifest::default()).is_empty());
    }

    #[test]
    fn test_dedup_by_base_href() {
        let manifest = SourceManifest {
            links: vec![Link::new("nav.xhtml#toc").with_rel("contents")],
            table_of_contents: vec![
                Link::new("nav.xhtml#toc2").with_title("Table of Contents"),
                Link::new("copy.xhtml").with_title("Copyright"),
                Link::new("ch1.xhtml").with_title("Start"),
            ],
            ..Default::default()
        };
        let landmarks = discover(&manifest);

        assert_eq!(landmarks.len(), 3);
        assert_eq!(landmarks[0], Landmark::new("nav.xhtml#toc", None));
        assert_eq!(
            landmarks[1],
            Landmark::new("copy.xhtml", Some(COPYRIGHT_PAGE))
        );
        assert_eq!(landmarks[2], Landmark::new("ch1.xhtml", Some(BEGIN_READING)));
    }

    #[test]
    fn test_dedup_ignores_leading_slash() {
        let manifest = SourceManifest {
            links: vec![Link::new("/OEBPS/toc.xhtml").with_rel("contents")],
            table_of_contents: vec![Link::new("OEBPS/toc.xhtml").with_title("Contents")],
            ..Default::default()
        };
        assert_eq!(
            discover(&manifest),
            vec![Landmark::new("/OEBPS/toc.xhtml", None)]
        );
    }

    #[test]
    fn test_nested_toc_entries_are_not_scanned() {
        let manifest = SourceManifest {
            table_of_contents: vec![
                Link::new("part1.xhtml")
                    .with_title("Part One")
                    .with_child(Link::new("copy.xhtml").with_title("Copyright")),
            ],
            reading_order: vec![Link::new("part1.xhtml")],
            ..Default::default()
        };
        assert_eq!(
            discover(&manifest),
            vec![Landmark::new("part1.xhtml", Some(BEGIN_READING))]
        );
    }
}
