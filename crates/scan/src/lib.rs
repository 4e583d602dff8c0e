//! Link extraction and substitution for imported markup.
//!
//! Finds the values of `href` and `src` attributes (double-quoted,
//! single-quoted or unquoted) and hands each to a caller-supplied function,
//! splicing the returned text back in place. Everything outside attribute
//! values, including the quotes themselves, is preserved byte for byte.
//!
//! Markup is never parsed into a tree or re-serialized.
//!
//! Values are passed through exactly as written, so entity-encoded URLs
//! (`/search?a=1&amp;b=2`) reach the resolver still encoded.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::instrument;

static LINK_ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[\s"'])(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#).unwrap()
});

fn value<'h>(captures: &Captures<'h>) -> Option<regex::Match<'h>> {
    captures.get(1).or_else(|| captures.get(2)).or_else(|| captures.get(3))
}

/// Lists every link-bearing attribute value in document order.
///
/// ```
/// let html = r#"<a href="/about">About</a> <img src='/logo.gif'>"#;
/// assert_eq!(relink_scan::scan_urls(html), ["/about", "/logo.gif"]);
/// ```
pub fn scan_urls(content: &str) -> Vec<&str> {
    LINK_ATTRIBUTE_REGEX.captures_iter(content).filter_map(|c| value(&c)).map(|m| m.as_str()).collect()
}

/// Rewrites every link-bearing attribute value with `resolve`, returning the
/// new content and whether anything actually changed.
///
/// `resolve` is called exactly once per value, in document order. Returning
/// the value unchanged leaves the content untouched at that position.
///
/// ```
/// let html = r#"<a href="/about">About</a> <a href="mailto:x@y.com">Mail</a>"#;
/// let (rewritten, changed) = relink_scan::rewrite(html, |url| match url {
///     "/about" => "[content_link,id=42]".to_string(),
///     other => other.to_string(),
/// });
/// assert!(changed);
/// assert_eq!(rewritten, r#"<a href="[content_link,id=42]">About</a> <a href="mailto:x@y.com">Mail</a>"#);
/// ```
#[instrument(level = "debug", skip_all, fields(content_size = content.len()))]
pub fn rewrite(content: &str, mut resolve: impl FnMut(&str) -> String) -> (String, bool) {
    let mut output = String::with_capacity(content.len());
    let mut last = 0;
    let mut changed = false;
    for captures in LINK_ATTRIBUTE_REGEX.captures_iter(content) {
        let Some(found) = value(&captures) else {
            continue;
        };
        let replacement = resolve(found.as_str());
        if replacement != found.as_str() {
            output.push_str(&content[last..found.start()]);
            output.push_str(&replacement);
            last = found.end();
            changed = true;
        }
    }
    output.push_str(&content[last..]);
    tracing::trace!(changed, "Rewrote content");
    (output, changed)
}
