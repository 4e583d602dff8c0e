//! Drives the engine over every record of a source.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use relink_config::Config;
use relink_engine::{Context, Engine, LookupTable, Resolution};
use relink_source::error::ErrorKind as SourceErrorKind;
use relink_source::{ContentRepository, SourceAssets, SourceInfo};
use tracing::instrument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records_processed: usize,
    pub records_modified: usize,
    pub fields_modified: usize,
    pub save_failures: usize,
}

/// Builds both lookup tables for `source` and an engine over them.
#[instrument(level = "debug", skip_all, fields(source = %source.id))]
pub fn build_engine(repository: &impl ContentRepository, source: &SourceInfo, config: &Config) -> Result<Engine> {
    let engine_config = config.engine_config(&source.base_url).or_raise(|| ErrorKind::Config)?;
    let processor = source.url_processor.build();
    let content = repository.list_content_records(&source.id).or_raise(|| ErrorKind::Source)?;
    let assets = repository.list_asset_records(&source.id).or_raise(|| ErrorKind::Source)?;

    let content_table = LookupTable::for_content(
        content.iter().map(|record| (record.original_url.as_str(), record.id)),
        &source.base_url,
        processor.as_ref(),
    );
    let asset_table = LookupTable::for_assets(assets.iter().map(|asset| (asset.original_url.as_str(), asset.id)));
    tracing::info!(content = content_table.len(), assets = asset_table.len(), "Built lookup tables");
    Ok(Engine::new(engine_config, content_table, asset_table).with_processor(processor))
}

/// Rewrites the configured fields of every record, in record order, saving
/// each record that changed, then flushes the repository.
///
/// A record that fails to save is logged and counted; the run carries on
/// with the next one.
#[instrument(level = "info", skip(repository, engine, fields))]
pub fn rewrite_source<R: ContentRepository>(
    repository: &mut R,
    engine: &mut Engine,
    source_id: &str,
    fields: &[String],
    publish: bool,
) -> Result<RunStats> {
    let records = repository.list_content_records(source_id).or_raise(|| ErrorKind::Source)?;
    let mut stats = RunStats::default();
    for mut record in records {
        stats.records_processed += 1;
        let context = Context::new(record.id, &record.title);
        let mut modified = 0;
        let assets = SourceAssets::new(&*repository, source_id);
        for field in fields {
            let Some(text) = record.fields.get(field) else {
                continue;
            };
            let (rewritten, changed) =
                relink_scan::rewrite(text, |url| engine.resolve(url, &context, &assets).token(url).into_owned());
            if changed {
                record.fields.insert(field.clone(), rewritten);
                modified += 1;
            }
        }
        if modified == 0 {
            continue;
        }
        stats.records_modified += 1;
        stats.fields_modified += modified;
        match repository.save_content(source_id, &record, publish) {
            Ok(()) => tracing::debug!(record = record.id, fields = modified, publish, "Saved record"),
            Err(e) => {
                let reason: &SourceErrorKind = &e;
                tracing::error!(record = record.id, error = %reason, "Could not save record");
                stats.save_failures += 1;
            },
        }
    }
    repository.flush().or_raise(|| ErrorKind::Source)?;
    Ok(stats)
}

/// One link found while inspecting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedLink {
    pub field: String,
    pub url: String,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedRecord {
    pub id: u64,
    pub title: String,
    pub links: Vec<InspectedLink>,
}

/// Resolves every link of every record without changing or saving anything.
/// Failures still accumulate in the engine; callers decide whether to keep them.
pub fn inspect_source(
    repository: &impl ContentRepository,
    engine: &mut Engine,
    source_id: &str,
    fields: &[String],
) -> Result<Vec<InspectedRecord>> {
    let records = repository.list_content_records(source_id).or_raise(|| ErrorKind::Source)?;
    let assets = SourceAssets::new(repository, source_id);
    let mut inspected = Vec::with_capacity(records.len());
    for record in records {
        let context = Context::new(record.id, &record.title);
        let mut links = Vec::new();
        for field in fields {
            let Some(text) = record.field(field) else {
                continue;
            };
            for url in relink_scan::scan_urls(text) {
                let resolution = engine.resolve(url, &context, &assets);
                links.push(InspectedLink { field: field.clone(), url: url.to_string(), resolution });
            }
        }
        inspected.push(InspectedRecord { id: record.id, title: record.title, links });
    }
    Ok(inspected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relink_engine::{FailureCategory, ProcessorKind};
    use relink_source::{AssetRecord, ContentRecord, MemoryRepository, Source};

    fn source() -> Source {
        let mut source = Source::new("oldsite", "http://example.com");
        source.url_processor = ProcessorKind::DropExtensions;
        source.content = vec![
            ContentRecord::new(1, "http://example.com/", "Home").with_field(
                "content",
                r#"<a href="/about.html#team">Team</a> <img src="/files/logo.gif"> <a href="/gone">Gone</a>"#,
            ),
            ContentRecord::new(2, "http://example.com/about", "About")
                .with_field("content", r#"<a href="mailto:hi@example.com">Mail</a>"#)
                .with_field("summary", r#"<a href="/">Home</a>"#),
            ContentRecord::new(3, "http://example.com/contact", "Contact"),
        ];
        source.assets = vec![
            AssetRecord::new(7, "http://example.com/files/logo.gif", "/assets/logo.gif"),
            AssetRecord::new(8, "http://example.com/files/old.pdf", "/assets/old.pdf"),
        ];
        source
    }

    fn fields() -> Vec<String> {
        vec!["content".to_string(), "summary".to_string()]
    }

    fn setup(repository: &MemoryRepository) -> Engine {
        let info = repository.source("oldsite").unwrap();
        build_engine(repository, &info, &Config::default()).unwrap()
    }

    #[test]
    fn test_build_engine_tables() {
        let repository = MemoryRepository::with_sources([source()]);
        let engine = setup(&repository);
        assert_eq!(engine.content_table().get("http://example.com/about"), Some(2));
        assert_eq!(engine.content_table().get("http://example.com"), Some(1));
        assert_eq!(engine.asset_table().get("http://example.com/files/logo.gif"), Some(7));
        assert_eq!(engine.content_table().len(), 3);
        assert_eq!(engine.asset_table().len(), 2);
    }

    #[test]
    fn test_rewrite_source() {
        let mut repository = MemoryRepository::with_sources([source()]);
        let mut engine = setup(&repository);
        let stats = rewrite_source(&mut repository, &mut engine, "oldsite", &fields(), false).unwrap();
        assert_eq!(
            stats,
            RunStats { records_processed: 3, records_modified: 2, fields_modified: 2, save_failures: 0 }
        );

        let saved = &repository.saves()[0].1;
        assert_eq!(
            saved.field("content"),
            Some(
                r#"<a href="[content_link,id=2]?ID=team">Team</a> <img src="/assets/logo.gif"> <a href="/gone">Gone</a>"#
            )
        );
        let saved = &repository.saves()[1].1;
        assert_eq!(saved.field("summary"), Some(r#"<a href="[content_link,id=1]">Home</a>"#));
        assert_eq!(saved.field("content"), Some(r#"<a href="mailto:hi@example.com">Mail</a>"#));
        assert!(repository.saves().iter().all(|(_, _, published)| !published));

        let failures: Vec<_> = engine.failures().iter().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].original_url, "/gone");
        assert_eq!((failures[0].context_id, failures[0].context_title.as_str()), (1, "Home"));
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let mut repository = MemoryRepository::with_sources([source()]);
        let mut engine = setup(&repository);
        rewrite_source(&mut repository, &mut engine, "oldsite", &fields(), false).unwrap();
        let mut engine = setup(&repository);
        let stats = rewrite_source(&mut repository, &mut engine, "oldsite", &fields(), false).unwrap();
        assert_eq!(stats.records_modified, 0);
        assert_eq!(repository.saves().len(), 2);
        assert_eq!(engine.failures().len(), 1);
    }

    #[test]
    fn test_save_failure_does_not_stop_the_run() {
        let mut repository = MemoryRepository::with_sources([source()]).fail_saves_for(1);
        let mut engine = setup(&repository);
        let stats = rewrite_source(&mut repository, &mut engine, "oldsite", &fields(), true).unwrap();
        assert_eq!(stats.save_failures, 1);
        assert_eq!(stats.records_modified, 2);
        assert_eq!(repository.saves().len(), 1);
        let (_, saved, published) = &repository.saves()[0];
        assert_eq!(saved.id, 2);
        assert!(published);
        assert_eq!(saved.live, saved.fields);
    }

    #[test]
    fn test_missing_asset() {
        let mut source = source();
        source.assets.remove(0);
        let mut repository = MemoryRepository::with_sources([source]);
        let mut engine = setup(&repository);
        // The table still knows the asset, but the record is gone.
        engine = Engine::new(
            engine.config().clone(),
            engine.content_table().clone(),
            [("http://example.com/files/logo.gif", 7)].into_iter().collect(),
        );
        rewrite_source(&mut repository, &mut engine, "oldsite", &fields(), false).unwrap();
        let missing: Vec<_> = engine.failures().iter().filter(|entry| entry.missing_asset).collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].original_url, "/files/logo.gif");
    }

    #[test]
    fn test_assets_resolve_from_the_rewritten_source() {
        let mut other = Source::new("elsewhere", "http://elsewhere.example");
        other.assets = vec![AssetRecord::new(7, "http://elsewhere.example/logo.gif", "/assets/elsewhere/logo.gif")];
        let mut repository = MemoryRepository::with_sources([other, source()]);
        let mut engine = setup(&repository);
        rewrite_source(&mut repository, &mut engine, "oldsite", &fields(), false).unwrap();
        let saved = &repository.saves()[0].1;
        assert!(saved.field("content").unwrap().contains(r#"<img src="/assets/logo.gif">"#));
    }

    #[test]
    fn test_unknown_source() {
        let mut repository = MemoryRepository::with_sources([source()]);
        let mut engine = setup(&repository);
        let error = rewrite_source(&mut repository, &mut engine, "elsewhere", &fields(), false).unwrap_err();
        assert_eq!(*error, ErrorKind::Source);
    }

    #[test]
    fn test_inspect_source() {
        let repository = MemoryRepository::with_sources([source()]);
        let mut engine = setup(&repository);
        let inspected = inspect_source(&repository, &mut engine, "oldsite", &fields()).unwrap();
        assert_eq!(inspected.len(), 3);
        let home = &inspected[0];
        assert_eq!(home.links.len(), 3);
        assert_eq!(home.links[0].resolution, Resolution::ResolvedContent { id: 2, fragment: "ID=team".to_string() });
        assert_eq!(home.links[1].resolution, Resolution::ResolvedAsset { id: 7, link: "/assets/logo.gif".to_string() });
        assert_eq!(home.links[2].resolution, Resolution::Failed { category: FailureCategory::BadImport });
        assert_eq!(inspected[1].links[0].resolution, Resolution::Ignored);
        assert_eq!(inspected[1].links[1].field, "summary");
        assert!(inspected[2].links.is_empty());
        assert!(repository.saves().is_empty());
    }
}
