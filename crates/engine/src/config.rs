use crate::consts::{DEFAULT_NON_HTTP_SCHEMES, IGNORE_MARKER_REGEX};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;

/// Per-run engine settings.
///
/// The scheme list and ignore marker are data, not constants: sites differ in
/// which pseudo-schemes their editors used (`skype:`, `notes:`, ...) and a
/// destination system may use a different token shape.
///
/// | Setting            | Default                                               |
/// |--------------------|-------------------------------------------------------|
/// | `base_url`         | `""`                                                  |
/// | `non_http_schemes` | `mailto`, `tel`, `ftp`, `res`, `skype`, `ssh`         |
/// | `ignore_marker`    | `^\[(?:content_link\|asset_link)\|^/?assets/`         |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The crawled site's root URL, which relative links are joined onto.
    pub base_url: String,
    /// Compared case-insensitively against the text before the first `:`.
    pub non_http_schemes: Vec<String>,
    /// URLs matching this are already rewritten.
    pub ignore_marker: Regex,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            non_http_schemes: DEFAULT_NON_HTTP_SCHEMES.iter().map(|s| s.to_string()).collect(),
            ignore_marker: IGNORE_MARKER_REGEX.clone(),
        }
    }
}
impl EngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn with_schemes(mut self, schemes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.non_http_schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the ignore marker, failing fast on an invalid pattern.
    pub fn with_ignore_marker(mut self, pattern: impl AsRef<str>) -> Result<Self> {
        let pattern = pattern.as_ref();
        self.ignore_marker =
            Regex::new(pattern).or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))?;
        Ok(self)
    }
}
