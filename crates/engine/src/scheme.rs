//! Eligibility checks run before any lookup.

use crate::EngineConfig;

/// Why a URL was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    Empty,
    NonHttpScheme,
    /// Starts with `http`: absolute, so it points at another site (or at the
    /// crawled site by its full address, which the import never rewrote).
    Absolute,
    AlreadyProcessed,
}

/// First matching rule wins; `None` means the URL is eligible for resolution.
pub fn ignore_reason(url: &str, config: &EngineConfig) -> Option<IgnoreReason> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Some(IgnoreReason::Empty);
    }
    if has_scheme(trimmed, &config.non_http_schemes) {
        return Some(IgnoreReason::NonHttpScheme);
    }
    // Literal and case-sensitive on purpose: `HTTP://` and ` http://` fall
    // through and get reported as third-party failures.
    if url.starts_with("http") {
        return Some(IgnoreReason::Absolute);
    }
    if config.ignore_marker.is_match(url) {
        return Some(IgnoreReason::AlreadyProcessed);
    }
    None
}

pub fn should_ignore(url: &str, config: &EngineConfig) -> bool {
    match ignore_reason(url, config) {
        Some(reason) => {
            tracing::trace!(url, ?reason, "Ignoring URL");
            true
        },
        None => false,
    }
}

/// Returns `true` if `url` starts with one of `schemes` followed by `:`,
/// ignoring ASCII case.
pub fn has_scheme(url: &str, schemes: &[impl AsRef<str>]) -> bool {
    schemes.iter().map(AsRef::as_ref).any(|scheme| {
        url.as_bytes().get(scheme.len()) == Some(&b':')
            && url.get(..scheme.len()).is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}
