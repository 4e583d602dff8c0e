use relink_engine::ProcessorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An imported page.
///
/// `fields` holds the draft text fields the rewriter works on, keyed by field
/// name. `live` is the published copy, only updated when a save publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: u64,
    pub original_url: String,
    pub title: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub live: BTreeMap<String, String>,
}
impl ContentRecord {
    pub fn new(id: u64, original_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            original_url: original_url.into(),
            title: title.into(),
            fields: BTreeMap::new(),
            live: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Copies the draft fields over the published ones.
    pub fn publish(&mut self) {
        self.live = self.fields.clone();
    }
}

/// An imported file (image, document, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: u64,
    /// Absolute URL the file was crawled from.
    pub original_url: String,
    /// Where the file now lives, e.g. `/assets/logo.gif`.
    pub link: String,
}
impl AssetRecord {
    pub fn new(id: u64, original_url: impl Into<String>, link: impl Into<String>) -> Self {
        Self { id, original_url: original_url.into(), link: link.into() }
    }
}

/// Everything imported from one crawled site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub base_url: String,
    #[serde(default)]
    pub url_processor: ProcessorKind,
    #[serde(default)]
    pub content: Vec<ContentRecord>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}
impl Source {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            url_processor: ProcessorKind::default(),
            content: Vec::new(),
            assets: Vec::new(),
        }
    }

    pub fn info(&self) -> SourceInfo {
        SourceInfo {
            id: self.id.clone(),
            base_url: self.base_url.clone(),
            url_processor: self.url_processor,
            content_count: self.content.len(),
            asset_count: self.assets.len(),
        }
    }
}

/// A source without its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub id: String,
    pub base_url: String,
    pub url_processor: ProcessorKind,
    pub content_count: usize,
    pub asset_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_source() {
        let json = r#"{
            "id": "oldsite",
            "base_url": "http://example.com",
            "content": [{"id": 42, "original_url": "http://example.com/about", "title": "About"}]
        }"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.url_processor, ProcessorKind::None);
        assert!(source.assets.is_empty());
        assert_eq!(source.content[0], ContentRecord::new(42, "http://example.com/about", "About"));
    }

    #[test]
    fn test_deserialize_processor_kind() {
        let json = r#"{"id": "s", "base_url": "http://example.com", "url_processor": "drop-extensions"}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.url_processor, ProcessorKind::DropExtensions);
        assert_eq!(serde_json::to_value(ProcessorKind::DropExtensions).unwrap(), "drop-extensions");
    }

    #[test]
    fn test_publish_copies_fields() {
        let mut record = ContentRecord::new(1, "http://example.com/", "Home").with_field("content", "<p>hi</p>");
        assert!(record.live.is_empty());
        record.publish();
        assert_eq!(record.live, record.fields);
        assert_eq!(record.field("content"), Some("<p>hi</p>"));
        assert_eq!(record.field("summary"), None);
    }
}
