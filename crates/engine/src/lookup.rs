use crate::UrlProcessor;
use crate::key;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Immutable mapping from a normalized original URL to an internal identifier.
///
/// Built once per run and only read afterwards. Keys are exact-match strings:
/// a key derived under a different rule simply never matches, which the
/// engine treats as "try the next table".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable(BTreeMap<String, u64>);

impl LookupTable {
    /// Builds the content table from `(original_url, id)` pairs.
    ///
    /// Each original URL passes through the same `processor` and
    /// [`key::content_key`] rule used at resolution time.
    pub fn for_content<'a>(
        records: impl IntoIterator<Item = (&'a str, u64)>,
        base_url: &str,
        processor: &dyn UrlProcessor,
    ) -> Self {
        Self::build(records.into_iter().map(|(url, id)| {
            let processed = match processor.process(url, None) {
                Ok(processed) if !processed.url.trim().is_empty() => processed.url,
                _ => url.to_string(),
            };
            (key::content_key(&processed, base_url), id)
        }))
    }

    /// Builds the asset table from `(original_url, id)` pairs.
    ///
    /// Asset original URLs are recorded as absolute addresses at import time;
    /// they are only stripped of a fragment and trailing slash, never reduced
    /// to a path.
    pub fn for_assets<'a>(records: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self::build(records.into_iter().map(|(url, id)| (key::normalize(url).to_string(), id)))
    }

    fn build(pairs: impl Iterator<Item = (String, u64)>) -> Self {
        let mut map = BTreeMap::new();
        for (key, id) in pairs {
            match map.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(id);
                },
                // First record wins; records are listed in a stable order.
                Entry::Occupied(entry) => {
                    tracing::warn!(key = entry.key().as_str(), kept = *entry.get(), dropped = id, "Duplicate lookup key");
                },
            }
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(key, id)| (key.as_str(), *id))
    }
}
impl<K: Into<String>> FromIterator<(K, u64)> for LookupTable {
    /// Takes keys verbatim. Use [`for_content`](Self::for_content) or
    /// [`for_assets`](Self::for_assets) to build from original URLs.
    fn from_iter<T: IntoIterator<Item = (K, u64)>>(iter: T) -> Self {
        Self::build(iter.into_iter().map(|(key, id)| (key.into(), id)))
    }
}
