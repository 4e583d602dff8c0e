use crate::consts::CONTENT_LINK_SHORTCODE;
use crate::error::ErrorKind;
use crate::failure::{Context, FailureCategory, FailureEntry, FailureLog};
use crate::processor::{NoopProcessor, UrlProcessor};
use crate::{EngineConfig, LookupTable, key, scheme};
use std::borrow::Cow;
use tracing::instrument;

/// Looks up the canonical relative link of an asset by its identifier.
///
/// Implemented by whatever owns the imported records. `None` means the asset
/// is gone (deleted after import, or never fully written).
pub trait AssetResolver {
    fn asset_link(&self, id: u64) -> Option<String>;
}

/// Outcome of resolving a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Left untouched on purpose; not a failure.
    Ignored,
    /// Rewrite to a content reference. `fragment` is empty or `ID=<anchor>`.
    ResolvedContent { id: u64, fragment: String },
    /// Rewrite to the asset's relative link.
    ResolvedAsset { id: u64, link: String },
    /// Left untouched, and recorded in the engine's [`FailureLog`].
    Failed { category: FailureCategory },
}
impl Resolution {
    /// Text to splice in place of `original`.
    ///
    /// ```
    /// use relink_engine::Resolution;
    /// let content = Resolution::ResolvedContent { id: 42, fragment: "ID=team".to_string() };
    /// assert_eq!(content.token("/about#team"), "[content_link,id=42]?ID=team");
    /// assert_eq!(Resolution::Ignored.token("mailto:x@y.com"), "mailto:x@y.com");
    /// ```
    pub fn token<'a>(&'a self, original: &'a str) -> Cow<'a, str> {
        match self {
            Self::Ignored | Self::Failed { .. } => Cow::Borrowed(original),
            Self::ResolvedContent { id, fragment } if fragment.is_empty() => {
                Cow::Owned(format!("[{CONTENT_LINK_SHORTCODE},id={id}]"))
            },
            Self::ResolvedContent { id, fragment } => {
                Cow::Owned(format!("[{CONTENT_LINK_SHORTCODE},id={id}]?{fragment}"))
            },
            Self::ResolvedAsset { link, .. } => Cow::Borrowed(link),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::ResolvedContent { .. } | Self::ResolvedAsset { .. })
    }
}

/// Rewrites links from imported content into internal references.
///
/// Holds the two lookup tables for a run and accumulates failures. Built once
/// per source; [`resolve`](Self::resolve) is then called once per URL found.
///
/// # Resolution order
///
/// 1. Split off the fragment (`#team` becomes `ID=team`).
/// 2. Run the [`UrlProcessor`]. Errors or empty results fall back to the
///    unprocessed URL.
/// 3. [Scheme check](crate::scheme): empty, non-HTTP, absolute, or already
///    rewritten URLs are [`Ignored`](Resolution::Ignored).
/// 4. Content table, keyed by [`key::content_key`] of the processed URL.
/// 5. Asset table, keyed by [`key::asset_key`] of the *unprocessed* URL.
/// 6. Otherwise record a failure.
///
/// Content is always tried first: the two key spaces can collide, and a page
/// reference is the more useful result.
pub struct Engine {
    config: EngineConfig,
    content: LookupTable,
    assets: LookupTable,
    processor: Box<dyn UrlProcessor>,
    failures: FailureLog,
}
impl Engine {
    pub fn new(config: EngineConfig, content: LookupTable, assets: LookupTable) -> Self {
        Self { config, content, assets, processor: Box::new(NoopProcessor), failures: FailureLog::default() }
    }

    pub fn with_processor(mut self, processor: Box<dyn UrlProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content_table(&self) -> &LookupTable {
        &self.content
    }

    pub fn asset_table(&self) -> &LookupTable {
        &self.assets
    }

    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Hands over the failures recorded so far, leaving an empty log behind.
    pub fn take_failures(&mut self) -> FailureLog {
        std::mem::take(&mut self.failures)
    }

    /// Resolves one URL found inside the record described by `context`.
    ///
    /// Never fails: unresolvable links come back as
    /// [`Failed`](Resolution::Failed) and are appended to the failure log.
    #[instrument(level = "trace", skip(self, context, assets), fields(record = context.id))]
    pub fn resolve(&mut self, raw_url: &str, context: &Context, assets: &dyn AssetResolver) -> Resolution {
        let (url, fragment) = key::split_fragment(raw_url);
        let fragment = match fragment {
            Some(anchor) if !anchor.is_empty() => format!("ID={anchor}"),
            _ => String::new(),
        };

        let processed = self.process(url);
        if scheme::should_ignore(&processed, &self.config) {
            return Resolution::Ignored;
        }

        let content_key = key::content_key(&processed, &self.config.base_url);
        if let Some(id) = self.content.get(&content_key) {
            tracing::trace!(key = content_key.as_str(), id, "Resolved to content");
            return Resolution::ResolvedContent { id, fragment };
        }

        // Asset keys use the URL as written, before processing.
        let asset_key = key::asset_key(url, &self.config.base_url);
        if let Some(id) = self.assets.get(&asset_key) {
            return match assets.asset_link(id) {
                Some(link) => {
                    tracing::trace!(key = asset_key.as_str(), id, "Resolved to asset");
                    Resolution::ResolvedAsset { id, link }
                },
                None => {
                    tracing::debug!(url = raw_url, id, record = context.id, "Asset in lookup table no longer exists");
                    self.failures.push(FailureEntry::missing_asset(raw_url, context));
                    Resolution::Failed { category: FailureCategory::MissingAsset }
                },
            };
        }

        let category = FailureCategory::classify(raw_url, &self.config.non_http_schemes);
        tracing::debug!(url = raw_url, %category, record = context.id, "Could not rewrite link");
        self.failures.push(FailureEntry::unresolved(raw_url, context));
        Resolution::Failed { category }
    }

    /// Runs the configured processor, degrading to the input on any problem.
    fn process<'a>(&self, url: &'a str) -> Cow<'a, str> {
        match self.processor.process(url, None) {
            Ok(processed) if !processed.url.trim().is_empty() => Cow::Owned(processed.url),
            Ok(_) if url.trim().is_empty() => Cow::Borrowed(url),
            Ok(_) => {
                tracing::warn!(url, processor = self.processor.name(), "URL processor returned an empty URL");
                Cow::Borrowed(url)
            },
            Err(e) => {
                let reason: &ErrorKind = &e;
                tracing::warn!(url, processor = self.processor.name(), error = %reason, "URL processor failed");
                Cow::Borrowed(url)
            },
        }
    }
}
