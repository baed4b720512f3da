//! `notesync sync`: upload notes from mapped folders.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use futures::StreamExt;

use notesync_core::{config, vault, CollectionMapping, Config, SyncOutcome};
use notesync_notion::{NotionClient, NotionError};
use notesync_sync::{
    run_batch, BatchItem, BatchOptions, BatchReport, DryRunStore, MemoryStore, Orchestrator,
    PageStore, SyncOptions,
};

/// Arguments for `notesync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Mapped vault folders to sync (omit when using `--all`).
    #[arg(required_unless_present = "all")]
    pub folders: Vec<String>,

    /// Sync every mapped folder.
    #[arg(long, conflicts_with = "folders")]
    pub all: bool,

    /// Archive pages with the same title and upload again instead of skipping.
    #[arg(long)]
    pub update: bool,

    /// Only consider notes modified in the last N days.
    #[arg(long, value_name = "DAYS")]
    pub since: Option<u32>,

    /// Query Notion but only log creates and archives.
    #[arg(long)]
    pub dry_run: bool,

    /// Delay after each created page (defaults to the config's `pacing_ms`).
    #[arg(long, value_name = "MS")]
    pub pacing_ms: Option<u64>,

    /// Stop at the first note that fails.
    #[arg(long)]
    pub abort_on_failure: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<ExitCode> {
        let cfg = config::load().context("failed to load config")?;
        let mappings = self.mappings(&cfg)?;
        if mappings.is_empty() {
            println!("No collections configured.");
            println!("Run: notesync collections add <folder> <database-id>");
            return Ok(ExitCode::SUCCESS);
        }

        let store = build_store(self.dry_run)?;
        let orchestrator = Orchestrator::new(store, cfg.tag_key.clone());
        let options = BatchOptions {
            pacing: self
                .pacing_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| cfg.pacing()),
            abort_on_failure: self.abort_on_failure,
            sync: SyncOptions {
                update_existing: self.update,
                ..SyncOptions::default()
            },
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let failed = runtime.block_on(self.sync_all(&cfg, &mappings, &orchestrator, &options))?;

        Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    fn mappings(&self, cfg: &Config) -> Result<Vec<CollectionMapping>> {
        if self.all {
            return Ok(cfg.collections.clone());
        }
        self.folders
            .iter()
            .map(|f| cfg.collection(f).cloned().map_err(anyhow::Error::from))
            .collect()
    }

    /// Returns `true` if any note failed.
    async fn sync_all(
        &self,
        cfg: &Config,
        mappings: &[CollectionMapping],
        orchestrator: &Orchestrator,
        options: &BatchOptions,
    ) -> Result<bool> {
        let since = self
            .since
            .map(|days| Utc::now() - chrono::Duration::days(i64::from(days)));
        let mut any_failed = false;

        for mapping in mappings {
            let dir = cfg.folder_path(&mapping.folder);
            match sync_folder(&dir, mapping, since, orchestrator, options).await {
                Ok(report) => {
                    print_summary(&mapping.folder.0, &report, self.dry_run);
                    any_failed |= report.has_failures();
                }
                Err(e) => {
                    println!("{}  '{}': {e:#}", "✗".red(), mapping.folder);
                    any_failed = true;
                }
            }
            if any_failed && self.abort_on_failure {
                break;
            }
        }
        Ok(any_failed)
    }
}

async fn sync_folder(
    dir: &Path,
    mapping: &CollectionMapping,
    since: Option<chrono::DateTime<Utc>>,
    orchestrator: &Orchestrator,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let scanned = vault::scan(dir, since)
        .with_context(|| format!("cannot scan folder '{}'", mapping.folder))?;

    let mut report = BatchReport::default();
    let mut files = Vec::with_capacity(scanned.len());
    for entry in scanned {
        match entry {
            Ok(file) => files.push(file),
            Err(e) => {
                println!("  {}  {e}", "✗".red());
                report.record(&SyncOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        }
    }
    if report.has_failures() && options.abort_on_failure {
        return Ok(report);
    }

    let mut items = Box::pin(run_batch(orchestrator, files, &mapping.database_id, options));
    while let Some(item) = items.next().await {
        print_item(&item);
        report.record(&item.outcome);
    }
    Ok(report)
}

fn build_store(dry_run: bool) -> Result<Arc<dyn PageStore>> {
    match NotionClient::from_env() {
        Ok(client) => {
            let client: Arc<dyn PageStore> = Arc::new(client);
            Ok(if dry_run {
                Arc::new(DryRunStore::new(client))
            } else {
                client
            })
        }
        Err(NotionError::MissingToken { var }) if dry_run => {
            tracing::warn!("{var} is not set; dry run treats every collection as empty");
            Ok(Arc::new(DryRunStore::new(Arc::new(MemoryStore::new()))))
        }
        Err(e) => Err(e).context("cannot create Notion client"),
    }
}

fn print_item(item: &BatchItem) {
    let title = item.file.identity().title;
    let file = item
        .file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match &item.outcome {
        SyncOutcome::Created { tier } => {
            println!("  {}  {title}  ({file}, {tier})", "+".green())
        }
        SyncOutcome::Replaced { tier, archived } => println!(
            "  {}  {title}  ({file}, {tier}, {archived} archived)",
            "↻".yellow()
        ),
        SyncOutcome::SkippedExists => println!("  {}  {title}  (exists)", "·".bright_black()),
        SyncOutcome::Failed { reason } => {
            println!("  {}  {title}  ({file}): {reason}", "✗".red())
        }
    }
}

fn print_summary(folder: &str, report: &BatchReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let mark = if report.has_failures() {
        "✗".red().bold().to_string()
    } else {
        "✓".green().bold().to_string()
    };
    if report.total() == 0 {
        println!("{prefix}{mark} '{folder}': nothing to do");
        return;
    }
    println!(
        "{prefix}{mark} '{folder}' synced ({} created, {} replaced, {} skipped, {} failed)",
        report.created, report.replaced, report.skipped, report.failed
    );
}
