//! Pluggable URL normalization applied before key derivation.
//!
//! A crawler often rewrote page URLs while importing (dropping `.html`
//! extensions, for example), so links found in the content must go through
//! the same rewrite before they can match the content lookup table. The
//! processor is chosen per import source and injected into the
//! [`Engine`](crate::Engine); [`NoopProcessor`] is the default.

use crate::error::{ErrorKind, Result};

/// Output of a [`UrlProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUrl {
    pub url: String,
    pub mime: Option<String>,
}
impl ProcessedUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), mime: None }
    }
}

pub trait UrlProcessor {
    /// Human-readable name, for logging.
    fn name(&self) -> &str;

    /// Rewrites `url`. An error, or an empty URL in the result, makes the
    /// engine carry on with the unprocessed URL.
    fn process(&self, url: &str, mime_hint: Option<&str>) -> Result<ProcessedUrl>;
}

/// Returns every URL unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

impl UrlProcessor for NoopProcessor {
    fn name(&self) -> &str {
        "none"
    }

    fn process(&self, url: &str, mime_hint: Option<&str>) -> Result<ProcessedUrl> {
        Ok(ProcessedUrl { url: url.to_string(), mime: mime_hint.map(str::to_string) })
    }
}

/// Extensions of server-rendered pages, compared case-insensitively.
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "shtml", "php", "asp", "aspx", "jsp", "cfm"];

/// Strips page-like extensions (`.html`, `.php`, `.aspx`, ...) from the last
/// path segment, keeping any query string.
///
/// Only applies to pages: when a mime hint is given and it isn't
/// `text/html`, the URL is returned unchanged.
///
/// ```
/// use relink_engine::{DropExtensions, UrlProcessor};
/// let processed = DropExtensions.process("/news/item.aspx?id=4", None).unwrap();
/// assert_eq!(processed.url, "/news/item?id=4");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DropExtensions;

impl UrlProcessor for DropExtensions {
    fn name(&self) -> &str {
        "drop-extensions"
    }

    fn process(&self, url: &str, mime_hint: Option<&str>) -> Result<ProcessedUrl> {
        if url.chars().any(char::is_control) {
            exn::bail!(ErrorKind::InvalidUrl(url.to_string()));
        }
        let mime = mime_hint.map(str::to_string);
        if mime_hint.is_some_and(|mime| !mime.starts_with("text/html")) {
            return Ok(ProcessedUrl { url: url.to_string(), mime });
        }
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };
        let segment_start = path.rfind('/').map_or(0, |index| index + 1);
        let path = match path[segment_start..].rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty() && PAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)) =>
            {
                &path[..path.len() - ext.len() - 1]
            },
            _ => path,
        };
        let url = match query {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };
        Ok(ProcessedUrl { url, mime })
    }
}

/// Processor selection, as named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ProcessorKind {
    #[default]
    None,
    DropExtensions,
}
impl ProcessorKind {
    pub fn build(self) -> Box<dyn UrlProcessor> {
        match self {
            Self::None => Box::new(NoopProcessor),
            Self::DropExtensions => Box::new(DropExtensions),
        }
    }
}
