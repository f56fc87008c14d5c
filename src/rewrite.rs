// src/rewrite.rs
//! Anchor rewriting for XHTML/HTML resources
//!
//! Internal anchors are normalized so a reader can resolve them against the
//! manifest's own location. External, `mailto:`, `data:` and same-document
//! anchors are left byte-for-byte untouched, as is everything outside the
//! matched `href` values.
//!
//! `..` segments are not followed and targets are not checked for existence.

use regex::bytes::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// `<a ... href="value" ...>` with single or double quotes
static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<a(?:\s+[^>]*?)?\s+href\s*=\s*["'])([^"']+)(["'][^>]*>)"#).unwrap()
});

/// Prefixes of href values that are never rewritten
const PRESERVED_PREFIXES: [&[u8]; 5] = [b"http://", b"https://", b"mailto:", b"data:", b"#"];

/// Whether an href value must be kept verbatim
pub fn is_preserved(href: &[u8]) -> bool {
    PRESERVED_PREFIXES.iter().any(|p| href.starts_with(p))
}

/// Strip a leading `./` and then a leading `/`, keeping the link relative
pub fn normalize_relative_link(link: &str) -> &str {
    let link = link.strip_prefix("./").unwrap_or(link);
    link.strip_prefix('/').unwrap_or(link)
}

fn normalize_bytes(link: &[u8]) -> &[u8] {
    let link = link.strip_prefix(b"./").unwrap_or(link);
    link.strip_prefix(b"/").unwrap_or(link)
}

/// Rewrite internal anchor hrefs in `content`
pub fn rewrite_links(content: &[u8]) -> Vec<u8> {
    let rewritten = ANCHOR_HREF_RE.replace_all(content, |caps: &Captures| {
        let value = &caps[2];
        if is_preserved(value) {
            return caps[0].to_vec();
        }

        let mut out = Vec::with_capacity(caps[0].len());
        out.extend_from_slice(&caps[1]);
        out.extend_from_slice(normalize_bytes(value));
        out.extend_from_slice(&caps[3]);
        out
    });

    match rewritten {
        Cow::Borrowed(_) => content.to_vec(),
        Cow::Owned(bytes) => bytes,
    }
}
