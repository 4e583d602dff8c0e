//! Repository over a directory of JSON source exports.

use crate::error::{ErrorKind, Result};
use crate::models::{AssetRecord, ContentRecord, Source, SourceInfo};
use crate::repository::ContentRepository;
use exn::{OptionExt, ResultExt};
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Reads every `*.json` file in a directory as a [`Source`].
///
/// Saves update the in-memory copy. [`flush`](ContentRepository::flush)
/// then rewrites each changed source file once. In dry-run mode nothing is
/// ever written.
///
/// # Examples
///
/// ```no_run
/// use relink_source::{ContentRepository, JsonRepository};
///
/// # fn example() -> relink_source::error::Result<()> {
/// let repository = JsonRepository::open("./sources", true)?;
/// for source in repository.sources() {
///     println!("{}: {} records", source.id, source.content_count);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonRepository {
    dir: PathBuf,
    dry_run: bool,
    sources: BTreeMap<String, (PathBuf, Source)>,
    unsaved: BTreeSet<String>,
}
impl JsonRepository {
    #[instrument(level = "debug", skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>, dry_run: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            exn::bail!(ErrorKind::NotFound(dir));
        }
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
            .or_raise(|| ErrorKind::Io(dir.clone()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut sources: BTreeMap<String, (PathBuf, Source)> = BTreeMap::new();
        for path in paths {
            let source = Self::read(&path)?;
            match sources.entry(source.id.clone()) {
                Entry::Occupied(entry) => {
                    tracing::warn!(
                        source = %source.id,
                        kept = %entry.get().0.display(),
                        dropped = %path.display(),
                        "Duplicate source ID; keeping the first file"
                    );
                },
                Entry::Vacant(entry) => {
                    tracing::debug!(source = %source.id, path = %path.display(), "Loaded source");
                    entry.insert((path, source));
                },
            }
        }
        Ok(Self { dir, dry_run, sources, unsaved: BTreeSet::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn read(path: &Path) -> Result<Source> {
        let text = std::fs::read_to_string(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        serde_json::from_str(&text).or_raise(|| ErrorKind::InvalidData(path.to_path_buf()))
    }

    fn write(path: &Path, source: &Source) -> Result<()> {
        let mut text = serde_json::to_string_pretty(source).or_raise(|| ErrorKind::InvalidData(path.to_path_buf()))?;
        text.push('\n');
        std::fs::write(path, text).or_raise(|| ErrorKind::Io(path.to_path_buf()))
    }

    fn get(&self, source_id: &str) -> Result<&Source> {
        self.sources
            .get(source_id)
            .map(|(_, source)| source)
            .ok_or_raise(|| ErrorKind::SourceNotFound(source_id.to_string()))
    }
}

impl ContentRepository for JsonRepository {
    fn sources(&self) -> Vec<SourceInfo> {
        self.sources.values().map(|(_, source)| source.info()).collect()
    }

    fn list_content_records(&self, source_id: &str) -> Result<Vec<ContentRecord>> {
        Ok(self.get(source_id)?.content.clone())
    }

    fn list_asset_records(&self, source_id: &str) -> Result<Vec<AssetRecord>> {
        Ok(self.get(source_id)?.assets.clone())
    }

    fn resolve_asset_by_id(&self, source_id: &str, id: u64) -> Option<AssetRecord> {
        let (_, source) = self.sources.get(source_id)?;
        source.assets.iter().find(|asset| asset.id == id).cloned()
    }

    #[instrument(level = "debug", skip(self, record), fields(record = record.id, dry_run = self.dry_run))]
    fn save_content(&mut self, source_id: &str, record: &ContentRecord, publish: bool) -> Result<()> {
        let (_, source) = self
            .sources
            .get_mut(source_id)
            .ok_or_raise(|| ErrorKind::SourceNotFound(source_id.to_string()))?;
        let stored = source
            .content
            .iter_mut()
            .find(|stored| stored.id == record.id)
            .ok_or_raise(|| ErrorKind::RecordNotFound(source_id.to_string(), record.id))?;
        stored.fields = record.fields.clone();
        if publish {
            stored.publish();
        }
        self.unsaved.insert(source_id.to_string());
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(sources = self.unsaved.len(), dry_run = self.dry_run))]
    fn flush(&mut self) -> Result<()> {
        if self.dry_run {
            tracing::debug!("Dry run; not writing source files");
            self.unsaved.clear();
            return Ok(());
        }
        while let Some(source_id) = self.unsaved.pop_first() {
            let Some((path, source)) = self.sources.get(&source_id) else {
                continue;
            };
            if let Err(e) = Self::write(path, source) {
                self.unsaved.insert(source_id);
                return Err(e);
            }
            tracing::info!(source = %source_id, path = %path.display(), "Wrote source file");
        }
        Ok(())
    }
}
