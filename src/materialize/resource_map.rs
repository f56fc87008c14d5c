// src/materialize/resource_map.rs

//! Mapping from source hrefs to persisted locations

use crate::publication::href;
use std::collections::HashMap;

/// Base href (fragment stripped) to the URL it was persisted at
///
/// Keys are also stripped of a leading slash, matching the storage path the
/// href maps to. Insertion is first-writer-wins: once an href is mapped, later inserts are
/// ignored, so a resource is never re-uploaded under a different URL.
#[derive(Debug, Clone, Default)]
pub struct ResourceMap {
    entries: HashMap<String, String>,
}

/// Map key for an href
fn key(href: &str) -> &str {
    href::relative_href(href::base_href(href))
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, href: &str) -> bool {
        self.entries.contains_key(key(href))
    }

    pub fn get(&self, href: &str) -> Option<&str> {
        self.entries.get(key(href)).map(String::as_str)
    }

    /// Record `url` for `href`; returns false if the href was already mapped
    pub fn insert(&mut self, href: &str, url: impl Into<String>) -> bool {
        let key = key(href);
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), url.into());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute URL for `href`, keeping its fragment
    ///
    /// Unmapped hrefs are resolved with `fallback`, which receives the base
    /// href. Pure fragments (`#note`) are returned unchanged.
    pub fn resolve<F>(&self, href: &str, fallback: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        let (base, fragment) = href::split_fragment(href);
        if base.is_empty() {
            return href.to_string();
        }

        let mut url = match self.entries.get(key(base)) {
            Some(url) => url.clone(),
            None => fallback(base),
        };
        if let Some(fragment) = fragment {
            url.push_str(fragment);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let mut map = ResourceMap::new();
        assert!(map.is_empty());
        assert!(map.insert("ch1.xhtml", "https://a/ch1.xhtml"));
        assert!(!map.insert("ch1.xhtml#s2", "https://b/ch1.xhtml"));
        assert_eq!(map.get("ch1.xhtml"), Some("https://a/ch1.xhtml"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_leading_slash_is_same_key() {
        let mut map = ResourceMap::new();
        map.insert("/OEBPS/ch1.xhtml", "https://a/OEBPS/ch1.xhtml");
        assert!(map.contains("OEBPS/ch1.xhtml"));
        assert!(!map.insert("OEBPS/ch1.xhtml", "https://b/OEBPS/ch1.xhtml"));
    }

    #[test]
    fn test_lookup_ignores_fragment() {
        let mut map = ResourceMap::new();
        map.insert("chap1.xhtml", "https://cdn/book/chap1.xhtml");
        assert!(map.contains("chap1.xhtml#section2"));
        assert_eq!(
            map.resolve("chap1.xhtml#section2", |_| unreachable!()),
            "https://cdn/book/chap1.xhtml#section2"
        );
    }

    #[test]
    fn test_resolve_fallback_and_pure_fragment() {
        let map = ResourceMap::new();
        assert_eq!(
            map.resolve("missing.xhtml#x", |base| format!("https://cdn/book/{base}")),
            "https://cdn/book/missing.xhtml#x"
        );
        assert_eq!(map.resolve("#top", |_| unreachable!()), "#top");
    }
}
