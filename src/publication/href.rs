// src/publication/href.rs

//! HREF helpers
//!
//! Publication hrefs are relative locators that may carry a `#fragment`.
//! Only the part before the fragment identifies a stored resource.

/// Split an href into its base and its fragment (including the `#`)
pub fn split_fragment(href: &str) -> (&str, Option<&str>) {
    match href.find('#') {
        Some(idx) => (&href[..idx], Some(&href[idx..])),
        None => (href, None),
    }
}

/// The href without any fragment
pub fn base_href(href: &str) -> &str {
    split_fragment(href).0
}

/// The href with a single leading slash removed
pub fn relative_href(href: &str) -> &str {
    href.strip_prefix('/').unwrap_or(href)
}

/// Whether the href points outside the publication
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// Whether the href uses the reserved `~` marker for generated services
pub fn is_reserved(href: &str) -> bool {
    href.starts_with('~')
}

/// Whether the href refers to a resource stored alongside the manifest
pub fn is_internal(href: &str) -> bool {
    !is_external(href) && !is_reserved(href)
}

/// Storage key for an href under `base_path`
pub fn storage_path(base_path: &str, href: &str) -> String {
    format!("{}/{}", base_path, relative_href(base_href(href)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fragment() {
        assert_eq!(split_fragment("chap1.xhtml#section2"), ("chap1.xhtml", Some("#section2")));
        assert_eq!(split_fragment("chap1.xhtml"), ("chap1.xhtml", None));
        assert_eq!(split_fragment("#top"), ("", Some("#top")));
    }

    #[test]
    fn test_relative_href() {
        assert_eq!(relative_href("/OEBPS/ch1.xhtml"), "OEBPS/ch1.xhtml");
        assert_eq!(relative_href("OEBPS/ch1.xhtml"), "OEBPS/ch1.xhtml");
        assert_eq!(relative_href("//x"), "/x");
    }

    #[test]
    fn test_link_classes() {
        assert!(is_external("https://creativecommons.org/licenses/by/4.0/"));
        assert!(is_external("http://example.com"));
        assert!(is_reserved("~readium/positions.json"));
        assert!(is_internal("OEBPS/copyright.xhtml"));
        assert!(!is_internal("~readium/content.json"));
    }

    #[test]
    fn test_storage_path_drops_fragment() {
        assert_eq!(storage_path("my_book", "/chap1.xhtml#section2"), "my_book/chap1.xhtml");
        assert_eq!(storage_path("my_book", "images/cover.jpg"), "my_book/images/cover.jpg");
    }
}
