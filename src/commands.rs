use crate::batch::{self, RunStats};
use crate::cli::{Cli, Command, RewriteArgs};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use relink_config::Config;
use relink_engine::{Engine, Resolution};
use relink_report::Summary;
use relink_source::{ContentRepository, JsonRepository, SourceInfo};
use std::path::Path;
use time::UtcDateTime;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");
    match cli.command {
        Command::Rewrite(args) => rewrite(&config, args),
        Command::Inspect { source } => inspect(&config, source.as_deref()),
        Command::Report { file } => report(&config, &file),
    }
}

/// Opens the sources directory and finds `source_id` in it. A missing or
/// unknown source is not an error; it is reported and there is nothing to do.
fn open_source(
    config: &Config,
    source_id: Option<&str>,
    dry_run: bool,
) -> Result<Option<(JsonRepository, SourceInfo)>> {
    let Some(source_id) = source_id else {
        println!("No source given; nothing to do.");
        return Ok(None);
    };
    let repository = JsonRepository::open(&config.sources_dir, dry_run).or_raise(|| ErrorKind::Source)?;
    match repository.source(source_id) {
        Some(info) => Ok(Some((repository, info))),
        None => {
            println!("Source `{source_id}` not found in {}; nothing to do.", config.sources_dir.display());
            Ok(None)
        },
    }
}

fn rewrite(config: &Config, args: RewriteArgs) -> Result<()> {
    let Some((mut repository, source)) = open_source(config, args.source.as_deref(), args.dry_run)? else {
        return Ok(());
    };
    let mut engine = batch::build_engine(&repository, &source, config)?;
    if args.dry_run {
        print_tables(&engine);
        return Ok(());
    }

    let publish = args.publish || config.publish;
    let stats = batch::rewrite_source(&mut repository, &mut engine, &source.id, &config.fields, publish)?;
    let failures = engine.take_failures();
    let summary = relink_report::summarize(&failures, &config.links.non_http_schemes, UtcDateTime::now())
        .or_raise(|| ErrorKind::Report)?;
    let log_path = args.failure_log.unwrap_or_else(|| config.failure_log.clone());
    relink_report::write_log(&log_path, &summary).or_raise(|| ErrorKind::Report)?;
    print_stats(&stats, &summary, &log_path);
    Ok(())
}

fn inspect(config: &Config, source_id: Option<&str>) -> Result<()> {
    let Some((repository, source)) = open_source(config, source_id, true)? else {
        return Ok(());
    };
    let mut engine = batch::build_engine(&repository, &source, config)?;
    for record in batch::inspect_source(&repository, &mut engine, &source.id, &config.fields)? {
        println!("[ID:{}] {}", record.id, record.title);
        for link in &record.links {
            println!("  {}: {} => {}", link.field, link.url, describe(&link.resolution, &link.url));
        }
    }
    Ok(())
}

fn report(config: &Config, file: &Path) -> Result<()> {
    let log = relink_report::read_log(file).or_raise(|| ErrorKind::Report)?;
    let summary = relink_report::summarize(&log, &config.links.non_http_schemes, UtcDateTime::now())
        .or_raise(|| ErrorKind::Report)?;
    print!("{}", summary.rendered);
    Ok(())
}

fn describe(resolution: &Resolution, url: &str) -> String {
    match resolution {
        Resolution::Ignored => "ignored".to_string(),
        Resolution::Failed { category } => format!("unresolved ({category})"),
        resolved => resolved.token(url).into_owned(),
    }
}

fn print_tables(engine: &Engine) {
    println!("Content lookup ({} entries):", engine.content_table().len());
    for (key, id) in engine.content_table().iter() {
        println!("  {key} => {id}");
    }
    println!("Asset lookup ({} entries):", engine.asset_table().len());
    for (key, id) in engine.asset_table().iter() {
        println!("  {key} => {id}");
    }
}

fn print_stats(stats: &RunStats, summary: &Summary, log_path: &Path) {
    println!("Records processed: {}", stats.records_processed);
    println!("Records modified: {}", stats.records_modified);
    println!("Fields modified: {}", stats.fields_modified);
    if stats.save_failures > 0 {
        println!("Records not saved: {}", stats.save_failures);
    }
    println!("Failures: {}", summary.total);
    for (category, count) in summary.counts.iter() {
        println!("  {category}: {count}");
    }
    println!("Failure log: {}", log_path.display());
}
