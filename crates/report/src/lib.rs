//! Categorized summaries of unresolved links, and the persisted failure log.
//!
//! The rendered report is also the file format: a header line, the five
//! category counts in a fixed order, then every failure line in the order it
//! was recorded. [`parse_log`] reads the failure lines back so an old log can
//! be summarized again.

mod error;

pub use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
pub use relink_engine::FailureCategory;
use relink_engine::{FailureEntry, FailureLog};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use time::UtcDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::instrument;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Failure counts, one per [`FailureCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub third_party: usize,
    pub bad_scheme: usize,
    pub bad_import: usize,
    pub missing_asset: usize,
    pub junk: usize,
}
impl CategoryCounts {
    pub fn get(&self, category: FailureCategory) -> usize {
        match category {
            FailureCategory::ThirdParty => self.third_party,
            FailureCategory::BadScheme => self.bad_scheme,
            FailureCategory::BadImport => self.bad_import,
            FailureCategory::MissingAsset => self.missing_asset,
            FailureCategory::Junk => self.junk,
        }
    }

    fn increment(&mut self, category: FailureCategory) {
        let counter = match category {
            FailureCategory::ThirdParty => &mut self.third_party,
            FailureCategory::BadScheme => &mut self.bad_scheme,
            FailureCategory::BadImport => &mut self.bad_import,
            FailureCategory::MissingAsset => &mut self.missing_asset,
            FailureCategory::Junk => &mut self.junk,
        };
        *counter += 1;
    }

    /// Categories and their counts, in report order.
    pub fn iter(&self) -> impl Iterator<Item = (FailureCategory, usize)> + '_ {
        FailureCategory::ALL.into_iter().map(move |category| (category, self.get(category)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub counts: CategoryCounts,
    pub total: usize,
    /// The full report text, exactly as persisted.
    pub rendered: String,
}

/// Classifies a single failure description line, or a bare URL.
///
/// A line the engine wrote is classified through its entry, so the missing
/// asset prefix is honoured. Anything else is classified as a URL.
pub fn classify(text: &str, non_http_schemes: &[impl AsRef<str>]) -> FailureCategory {
    match text.parse::<FailureEntry>() {
        Ok(entry) => entry.category(non_http_schemes),
        Err(_) => FailureCategory::classify(text, non_http_schemes),
    }
}

/// Counts and renders a failure log.
///
/// Identical input and timestamp always render to identical bytes.
#[instrument(level = "debug", skip_all, fields(failures = log.len()))]
pub fn summarize(
    log: &FailureLog,
    non_http_schemes: &[impl AsRef<str>],
    generated_at: UtcDateTime,
) -> Result<Summary> {
    let mut counts = CategoryCounts::default();
    for entry in log.iter() {
        counts.increment(entry.category(non_http_schemes));
    }
    let total = log.len();
    let timestamp = generated_at.format(TIMESTAMP_FORMAT).or_raise(|| ErrorKind::Timestamp)?;
    let rendered = Rendered { timestamp: &timestamp, counts: &counts, log }.to_string();
    Ok(Summary { counts, total, rendered })
}

struct Rendered<'a> {
    timestamp: &'a str,
    counts: &'a CategoryCounts,
    log: &'a FailureLog,
}
impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Link rewrite failures generated at {}: {} total", self.timestamp, self.log.len())?;
        writeln!(f)?;
        for (category, count) in self.counts.iter() {
            writeln!(f, "{category}: {count}")?;
        }
        writeln!(f)?;
        for entry in self.log.iter() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Reads the failure lines back out of a rendered report. Header, count and
/// blank lines are skipped, as is anything else that isn't a failure line.
pub fn parse_log(text: &str) -> FailureLog {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match line.parse::<FailureEntry>() {
            Ok(entry) => Some(entry),
            Err(_) => {
                tracing::trace!(line, "Skipping non-failure line");
                None
            },
        })
        .collect()
}

pub fn read_log(path: &Path) -> Result<FailureLog> {
    let text = std::fs::read_to_string(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    let log = parse_log(&text);
    tracing::debug!(path = %path.display(), failures = log.len(), "Read failure log");
    Ok(log)
}

#[instrument(level = "debug", skip(path, summary), fields(path = %path.display(), total = summary.total))]
pub fn write_log(path: &Path, summary: &Summary) -> Result<()> {
    std::fs::write(path, &summary.rendered).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    tracing::info!("Wrote failure log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relink_engine::{Context, DEFAULT_NON_HTTP_SCHEMES};
    use rstest::rstest;

    fn generated_at() -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn log() -> FailureLog {
        let home = Context::new(1, "Home");
        let downloads = Context::new(3, "Downloads");
        [
            FailureEntry::unresolved("http://thirdparty.example.org/x", &home),
            FailureEntry::unresolved("/old-page-never-imported", &home),
            FailureEntry::unresolved("mailto:someone@example.com", &home),
            FailureEntry::missing_asset("/files/gone.pdf", &downloads),
            FailureEntry::unresolved("../sibling", &downloads),
            FailureEntry::unresolved("javascript:void(0)", &downloads),
        ]
        .into_iter()
        .collect()
    }

    const EXPECTED: &str = "\
Link rewrite failures generated at 2023-11-14T22:13:20Z: 6 total

Third Party: 1
Bad Scheme: 1
Bad Import: 2
Missing Asset: 1
Junk: 1

Couldn't rewrite: http://thirdparty.example.org/x Found in Page: Home (ID:1)
Couldn't rewrite: /old-page-never-imported Found in Page: Home (ID:1)
Couldn't rewrite: mailto:someone@example.com Found in Page: Home (ID:1)
Missing asset: /files/gone.pdf Found in Page: Downloads (ID:3)
Couldn't rewrite: ../sibling Found in Page: Downloads (ID:3)
Couldn't rewrite: javascript:void(0) Found in Page: Downloads (ID:3)
";

    #[test]
    fn test_summarize_renders_report() {
        let summary = summarize(&log(), DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        assert_eq!(summary.rendered, EXPECTED);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.counts.total(), summary.total);
        assert_eq!(summary.counts.bad_import, 2);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let first = summarize(&log(), DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        let second = summarize(&log(), DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        assert_eq!(first.rendered.as_bytes(), second.rendered.as_bytes());
    }

    #[test]
    fn test_empty_log() {
        let summary = summarize(&FailureLog::default(), DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        assert_eq!(summary.total, 0);
        assert!(summary.counts.iter().all(|(_, count)| count == 0));
        assert!(summary.rendered.starts_with("Link rewrite failures generated at 2023-11-14T22:13:20Z: 0 total\n"));
        assert!(summary.rendered.ends_with("Junk: 0\n\n"));
    }

    #[test]
    fn test_counts_follow_report_order() {
        let summary = summarize(&log(), DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        let order: Vec<_> = summary.counts.iter().map(|(category, _)| category).collect();
        assert_eq!(order, FailureCategory::ALL);
    }

    #[test]
    fn test_parse_log_recovers_entries() {
        let parsed = parse_log(EXPECTED);
        assert_eq!(parsed, log());
        let summary = summarize(&parsed, DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        assert_eq!(summary.rendered, EXPECTED);
    }

    #[rstest]
    #[case("Couldn't rewrite: https://elsewhere.org Found in Page: Home (ID:1)", FailureCategory::ThirdParty)]
    #[case("Missing asset: /files/gone.pdf Found in Page: Home (ID:1)", FailureCategory::MissingAsset)]
    #[case("Couldn't rewrite: tel:555 Found in Page: Home (ID:1)", FailureCategory::BadScheme)]
    #[case("/old-page", FailureCategory::BadImport)]
    #[case("<<>>", FailureCategory::Junk)]
    fn test_classify_lines(#[case] text: &str, #[case] expected: FailureCategory) {
        assert_eq!(classify(text, DEFAULT_NON_HTTP_SCHEMES), expected);
    }

    #[test]
    fn test_multi_line_values_survive_a_reread() {
        let context = Context::new(4, "Multi\nline title");
        let log: FailureLog =
            [FailureEntry::unresolved("/a\nb", &context), FailureEntry::missing_asset("/files/x\r\n.pdf", &context)]
                .into_iter()
                .collect();
        let summary = summarize(&log, DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        assert_eq!(summary.total, 2);

        let parsed = parse_log(&summary.rendered);
        assert_eq!(parsed.len(), 2);
        let again = summarize(&parsed, DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        assert_eq!(again.counts, summary.counts);
        assert_eq!(again.rendered, summary.rendered);
    }

    #[test]
    fn test_write_then_read_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.log");
        let summary = summarize(&log(), DEFAULT_NON_HTTP_SCHEMES, generated_at()).unwrap();
        write_log(&path, &summary).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), EXPECTED);
        assert_eq!(read_log(&path).unwrap(), log());
    }

    #[test]
    fn test_read_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let error = read_log(&dir.path().join("missing.log")).unwrap_err();
        assert!(matches!(&*error, ErrorKind::Io(_)));
        assert!(error.is_retryable());
    }
}
