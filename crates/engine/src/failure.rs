//! Unresolved links, as recorded during a run.

use crate::consts::FAILURE_LINE_REGEX;
use crate::error::{Error, ErrorKind};
use crate::scheme::has_scheme;
use exn::{OptionExt, ResultExt};
use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const UNRESOLVED_PREFIX: &str = "Couldn't rewrite";
const MISSING_ASSET_PREFIX: &str = "Missing asset";

/// Why a link could not be rewritten, derived from the URL's shape when the
/// report is written rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureCategory {
    /// Absolute http(s) URL that slipped past the scheme check.
    ThirdParty,
    /// Uses one of the configured non-HTTP schemes.
    BadScheme,
    /// A relative or rooted path matching nothing that was imported.
    BadImport,
    /// Matched an asset whose record no longer exists.
    MissingAsset,
    /// Anything else; malformed or unexpected input.
    Junk,
}
impl FailureCategory {
    /// Every category, in report order.
    pub const ALL: [Self; 5] = [Self::ThirdParty, Self::BadScheme, Self::BadImport, Self::MissingAsset, Self::Junk];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ThirdParty => "Third Party",
            Self::BadScheme => "Bad Scheme",
            Self::BadImport => "Bad Import",
            Self::MissingAsset => "Missing Asset",
            Self::Junk => "Junk",
        }
    }

    /// Classifies an unresolved URL by its text alone. Rules apply in order;
    /// [`MissingAsset`](Self::MissingAsset) is never produced here since it
    /// can't be seen in the URL.
    pub fn classify(url: &str, non_http_schemes: &[impl AsRef<str>]) -> Self {
        let url = url.trim();
        if url.contains("http://") || url.contains("https://") {
            Self::ThirdParty
        } else if has_scheme(url, non_http_schemes) {
            Self::BadScheme
        } else if is_path_like(url) {
            Self::BadImport
        } else {
            Self::Junk
        }
    }
}
impl Display for FailureCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label())
    }
}

fn is_path_like(url: &str) -> bool {
    if url.starts_with('/') || url.starts_with("./") || url.starts_with("../") {
        return true;
    }
    let first_segment = url.split('/').next().unwrap_or(url);
    url.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) && !first_segment.contains(':')
}

/// A single unresolved link and the record it was found in.
///
/// Displays as the line written to the failure log:
///
/// ```text
/// Couldn't rewrite: /old-page Found in Page: About Us (ID:12)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub original_url: String,
    pub context_title: String,
    pub context_id: u64,
    /// The asset table matched but the asset itself is gone.
    pub missing_asset: bool,
}
impl FailureEntry {
    pub fn unresolved(original_url: impl Into<String>, context: &Context) -> Self {
        Self {
            original_url: original_url.into(),
            context_title: context.title.clone(),
            context_id: context.id,
            missing_asset: false,
        }
    }

    pub fn missing_asset(original_url: impl Into<String>, context: &Context) -> Self {
        Self { missing_asset: true, ..Self::unresolved(original_url, context) }
    }

    pub fn category(&self, non_http_schemes: &[impl AsRef<str>]) -> FailureCategory {
        match self.missing_asset {
            true => FailureCategory::MissingAsset,
            false => FailureCategory::classify(&self.original_url, non_http_schemes),
        }
    }
}
impl Display for FailureEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let prefix = match self.missing_asset {
            true => MISSING_ASSET_PREFIX,
            false => UNRESOLVED_PREFIX,
        };
        write!(
            f,
            "{prefix}: {} Found in Page: {} (ID:{})",
            single_line(&self.original_url),
            single_line(&self.context_title),
            self.context_id
        )
    }
}

/// Line breaks become spaces so every entry stays on one log line.
fn single_line(text: &str) -> Cow<'_, str> {
    match text.contains(['\r', '\n']) {
        true => Cow::Owned(text.replace(['\r', '\n'], " ")),
        false => Cow::Borrowed(text),
    }
}
impl FromStr for FailureEntry {
    type Err = Error;

    /// Parses a line previously produced by [`Display`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end();
        let invalid = || ErrorKind::InvalidFailureLine(line.to_string());
        let captures = FAILURE_LINE_REGEX.captures(line).ok_or_raise(invalid)?;
        Ok(Self {
            missing_asset: &captures[1] == MISSING_ASSET_PREFIX,
            original_url: captures[2].to_string(),
            context_title: captures[3].to_string(),
            context_id: captures[4].parse::<u64>().or_raise(invalid)?,
        })
    }
}

/// The record whose fields are being rewritten, threaded into every
/// [`Engine::resolve`](crate::Engine::resolve) call so failures can name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub id: u64,
    pub title: String,
}
impl Context {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self { id, title: title.into() }
    }
}

/// Append-only, insertion-ordered list of failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLog(Vec<FailureEntry>);

impl FailureLog {
    pub fn push(&mut self, entry: FailureEntry) {
        self.0.push(entry);
    }

    /// Appends another log after this one. Merging per-record logs in record
    /// order reproduces the sequential ordering exactly.
    pub fn extend(&mut self, other: FailureLog) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailureEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_entries(self) -> Vec<FailureEntry> {
        self.0
    }
}
impl FromIterator<FailureEntry> for FailureLog {
    fn from_iter<T: IntoIterator<Item = FailureEntry>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_NON_HTTP_SCHEMES;
    use rstest::rstest;

    #[rstest]
    #[case("http://thirdparty.example.org/x", FailureCategory::ThirdParty)]
    #[case(" https://example.com", FailureCategory::ThirdParty)]
    #[case("HTTP://EXAMPLE.COM", FailureCategory::Junk)]
    #[case("//cdn.example.org/lib.js", FailureCategory::BadImport)]
    #[case("/go?to=http://elsewhere", FailureCategory::ThirdParty)]
    #[case("mailto:someone@example.com", FailureCategory::BadScheme)]
    #[case("Skype:someone", FailureCategory::BadScheme)]
    #[case("/old-page-never-imported", FailureCategory::BadImport)]
    #[case("../sibling/page", FailureCategory::BadImport)]
    #[case("./here", FailureCategory::BadImport)]
    #[case("page.html", FailureCategory::BadImport)]
    #[case("javascript:void(0)", FailureCategory::Junk)]
    #[case("{{ broken }}", FailureCategory::Junk)]
    #[case("", FailureCategory::Junk)]
    fn test_classify(#[case] url: &str, #[case] expected: FailureCategory) {
        assert_eq!(FailureCategory::classify(url, DEFAULT_NON_HTTP_SCHEMES), expected);
    }

    #[test]
    fn test_entry_display() {
        let entry = FailureEntry::unresolved("/old", &Context::new(12, "About Us"));
        assert_eq!(entry.to_string(), "Couldn't rewrite: /old Found in Page: About Us (ID:12)");
        let entry = FailureEntry::missing_asset("/files/gone.pdf", &Context::new(3, "Downloads"));
        assert_eq!(entry.to_string(), "Missing asset: /files/gone.pdf Found in Page: Downloads (ID:3)");
    }

    #[rstest]
    #[case("Couldn't rewrite: /old Found in Page: About Us (ID:12)")]
    #[case("Missing asset: /files/gone.pdf Found in Page: Downloads (ID:3)")]
    #[case("Couldn't rewrite: /a b Found in Page: Title (with parens) (ID:9)")]
    fn test_entry_parses_own_output(#[case] line: &str) {
        let entry: FailureEntry = line.parse().unwrap();
        assert_eq!(entry.to_string(), line);
    }

    #[test]
    fn test_entry_display_stays_on_one_line() {
        let entry = FailureEntry::unresolved("/a\nb", &Context::new(5, "Multi\r\nline title"));
        let line = entry.to_string();
        assert_eq!(line, "Couldn't rewrite: /a b Found in Page: Multi  line title (ID:5)");
        let parsed: FailureEntry = line.parse().unwrap();
        assert_eq!(parsed.context_id, 5);
        assert_eq!(parsed.original_url, "/a b");
    }

    #[test]
    fn test_entry_parse_rejects_other_lines() {
        assert!("Third Party: 4".parse::<FailureEntry>().is_err());
        assert!("".parse::<FailureEntry>().is_err());
    }

    #[test]
    fn test_missing_asset_category_comes_from_flag() {
        let entry = FailureEntry::missing_asset("/files/gone.pdf", &Context::new(3, "Downloads"));
        assert_eq!(entry.category(DEFAULT_NON_HTTP_SCHEMES), FailureCategory::MissingAsset);
    }

    #[test]
    fn test_log_preserves_order() {
        let context = Context::new(1, "Home");
        let mut log = FailureLog::default();
        log.push(FailureEntry::unresolved("/b", &context));
        let mut other = FailureLog::default();
        other.push(FailureEntry::unresolved("/a", &context));
        log.extend(other);
        let urls: Vec<_> = log.iter().map(|e| e.original_url.as_str()).collect();
        assert_eq!(urls, ["/b", "/a"]);
        assert_eq!(log.len(), 2);
    }
}
