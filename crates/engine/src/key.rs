//! Lookup key derivation.
//!
//! Content and asset keys are derived differently, and the difference must
//! be kept:
//!
//! - **Content keys** come from the *path* of the (processed) URL joined onto
//!   the base URL. Pages were imported under their crawled, host-normalized
//!   address, and the URL processor may have cleaned the path up further, so
//!   only the path carries meaning.
//! - **Asset keys** come from the URL exactly as it appeared in the markup
//!   (fragment and one trailing slash removed), joined onto the base URL.
//!   Files were imported under the address they were linked with; no host or
//!   processor normalization was ever applied to them.
//!
//! "Fixing" either rule to match the other makes previously matching links
//! silently stop resolving.

/// Splits on the first `#`. The fragment excludes the `#` itself.
///
/// ```
/// use relink_engine::key::split_fragment;
/// assert_eq!(split_fragment("/about#team"), ("/about", Some("team")));
/// assert_eq!(split_fragment("/about#"), ("/about", Some("")));
/// assert_eq!(split_fragment("/about"), ("/about", None));
/// ```
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((url, fragment)) => (url, Some(fragment)),
        None => (url, None),
    }
}

/// Removes a fragment and a single trailing `/`.
pub fn normalize(url: &str) -> &str {
    let (url, _) = split_fragment(url);
    url.strip_suffix('/').unwrap_or(url)
}

/// Returns the path component of `url`: scheme, authority and query removed.
///
/// ```
/// use relink_engine::key::path_component;
/// assert_eq!(path_component("http://example.com/about?x=1"), "/about");
/// assert_eq!(path_component("//cdn.example.com/a.js"), "/a.js");
/// assert_eq!(path_component("/about"), "/about");
/// assert_eq!(path_component("http://example.com"), "");
/// ```
pub fn path_component(url: &str) -> &str {
    let rest = match url.split_once("://") {
        Some((scheme, after)) if is_scheme(scheme) => strip_authority(after),
        _ => match url.strip_prefix("//") {
            Some(after) => strip_authority(after),
            None => match url.split_once(':') {
                // `scheme:path` with no authority; a colon after the first
                // slash belongs to the path.
                Some((scheme, after)) if is_scheme(scheme) => after,
                _ => url,
            },
        },
    };
    rest.split_once('?').map_or(rest, |(path, _)| path)
}

fn strip_authority(after_scheme: &str) -> &str {
    match after_scheme.find(['/', '?']) {
        Some(index) => &after_scheme[index..],
        None => "",
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Joins `path` onto `base` with exactly one `/` between them.
///
/// An empty path yields the base itself, so the site root (`/`) resolves to
/// the base URL's own entry.
///
/// ```
/// use relink_engine::key::join;
/// assert_eq!(join("http://example.com/", "/about"), "http://example.com/about");
/// assert_eq!(join("http://example.com", ""), "http://example.com");
/// assert_eq!(join("", "about"), "/about");
/// ```
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => format!("/{path}"),
        (false, false) => format!("{base}/{path}"),
    }
}

/// Key used against the content lookup table.
pub fn content_key(url: &str, base_url: &str) -> String {
    let (url, _) = split_fragment(url);
    let path = path_component(url);
    join(base_url, path.strip_suffix('/').unwrap_or(path))
}

/// Key used against the asset lookup table. *Not* reduced to a
/// path first, see the [module documentation](self).
pub fn asset_key(url: &str, base_url: &str) -> String {
    join(base_url, normalize(url))
}
