//! In-memory repository for testing.

use crate::error::{ErrorKind, Result};
use crate::models::{AssetRecord, ContentRecord, Source, SourceInfo};
use crate::repository::ContentRepository;
use exn::OptionExt;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory repository for testing.
///
/// Keeps every save it receives, in order, so tests can assert on what a
/// batch run wrote. Saves of selected records can be made to fail.
///
/// # Examples
///
/// ```
/// use relink_source::{ContentRecord, ContentRepository, MemoryRepository, Source};
///
/// let mut source = Source::new("oldsite", "http://example.com");
/// source.content.push(ContentRecord::new(1, "http://example.com/", "Home"));
/// let mut repository = MemoryRepository::with_sources([source]);
///
/// let record = repository.list_content_records("oldsite").unwrap().remove(0);
/// repository.save_content("oldsite", &record, false).unwrap();
/// assert_eq!(repository.saves().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRepository {
    sources: BTreeMap<String, Source>,
    saves: Vec<(String, ContentRecord, bool)>,
    failing: BTreeSet<u64>,
}
impl MemoryRepository {
    /// Later sources with a duplicate ID replace earlier ones.
    pub fn with_sources(sources: impl IntoIterator<Item = Source>) -> Self {
        Self {
            sources: sources.into_iter().map(|source| (source.id.clone(), source)).collect(),
            ..Self::default()
        }
    }

    /// Makes every save of record `id` fail with an I/O error.
    pub fn fail_saves_for(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    /// Every successful save as `(source ID, record, published)`, in order.
    pub fn saves(&self) -> &[(String, ContentRecord, bool)] {
        &self.saves
    }

    pub fn source_data(&self, source_id: &str) -> Option<&Source> {
        self.sources.get(source_id)
    }
}

impl ContentRepository for MemoryRepository {
    fn sources(&self) -> Vec<SourceInfo> {
        self.sources.values().map(Source::info).collect()
    }

    fn list_content_records(&self, source_id: &str) -> Result<Vec<ContentRecord>> {
        let source = self.sources.get(source_id).ok_or_raise(|| ErrorKind::SourceNotFound(source_id.to_string()))?;
        Ok(source.content.clone())
    }

    fn list_asset_records(&self, source_id: &str) -> Result<Vec<AssetRecord>> {
        let source = self.sources.get(source_id).ok_or_raise(|| ErrorKind::SourceNotFound(source_id.to_string()))?;
        Ok(source.assets.clone())
    }

    fn resolve_asset_by_id(&self, source_id: &str, id: u64) -> Option<AssetRecord> {
        self.sources.get(source_id)?.assets.iter().find(|asset| asset.id == id).cloned()
    }

    fn save_content(&mut self, source_id: &str, record: &ContentRecord, publish: bool) -> Result<()> {
        if self.failing.contains(&record.id) {
            exn::bail!(ErrorKind::Io(format!("memory://{source_id}/{}", record.id).into()));
        }
        let source =
            self.sources.get_mut(source_id).ok_or_raise(|| ErrorKind::SourceNotFound(source_id.to_string()))?;
        let stored = source
            .content
            .iter_mut()
            .find(|stored| stored.id == record.id)
            .ok_or_raise(|| ErrorKind::RecordNotFound(source_id.to_string(), record.id))?;
        stored.fields = record.fields.clone();
        if publish {
            stored.publish();
        }
        self.saves.push((source_id.to_string(), stored.clone(), publish));
        Ok(())
    }
}
