//! Repository trait and implementations.

mod json;
#[cfg(feature = "mock")]
mod memory;

pub use self::json::JsonRepository;
#[cfg(feature = "mock")]
pub use self::memory::MemoryRepository;
use crate::error::Result;
use crate::models::{AssetRecord, ContentRecord, SourceInfo};
use relink_engine::AssetResolver;

/// Where imported records are read from and rewritten content is saved to.
pub trait ContentRepository {
    /// All known sources, ordered by identifier.
    fn sources(&self) -> Vec<SourceInfo>;

    fn source(&self, source_id: &str) -> Option<SourceInfo> {
        self.sources().into_iter().find(|info| info.id == source_id)
    }

    /// Content records of a source, in import order.
    fn list_content_records(&self, source_id: &str) -> Result<Vec<ContentRecord>>;

    fn list_asset_records(&self, source_id: &str) -> Result<Vec<AssetRecord>>;

    /// Looks an asset up by ID. Each source numbers its own assets, so the
    /// lookup never leaves `source_id`.
    fn resolve_asset_by_id(&self, source_id: &str, id: u64) -> Option<AssetRecord>;

    /// Replaces the stored draft fields of `record`. With `publish`, the
    /// published copy is updated as well.
    ///
    /// Saves may be buffered until [`flush`](Self::flush).
    fn save_content(&mut self, source_id: &str, record: &ContentRecord, publish: bool) -> Result<()>;

    /// Persists buffered saves.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Resolves assets for the engine from a single source of a repository.
#[derive(Debug)]
pub struct SourceAssets<'a, R: ?Sized> {
    repository: &'a R,
    source_id: &'a str,
}
impl<'a, R: ContentRepository + ?Sized> SourceAssets<'a, R> {
    pub fn new(repository: &'a R, source_id: &'a str) -> Self {
        Self { repository, source_id }
    }
}
impl<R: ContentRepository + ?Sized> AssetResolver for SourceAssets<'_, R> {
    fn asset_link(&self, id: u64) -> Option<String> {
        self.repository.resolve_asset_by_id(self.source_id, id).map(|asset| asset.link)
    }
}
