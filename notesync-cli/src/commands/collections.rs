//! `notesync collections list|add|remove`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use notesync_core::{config, vault, CollectionId, Config, FolderName};

/// Manage folder → database mappings.
#[derive(Subcommand, Debug)]
pub enum CollectionsCommand {
    /// List mappings with the number of notes in each folder.
    List(ListArgs),

    /// Map a vault folder to a database (replaces an existing mapping).
    Add(AddArgs),

    /// Remove the mapping for a folder.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Folder name inside the vault (e.g. "resource").
    pub folder: String,

    /// Target database id.
    pub database_id: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub folder: String,
}

pub fn run(cmd: CollectionsCommand) -> Result<()> {
    match cmd {
        CollectionsCommand::List(args) => list(args),
        CollectionsCommand::Add(args) => add(args),
        CollectionsCommand::Remove(args) => remove(args),
    }
}

#[derive(Debug, Serialize)]
struct CollectionRow {
    folder: String,
    database_id: String,
    path: String,
    /// `None` when the folder cannot be listed.
    notes: Option<usize>,
}

#[derive(Tabled)]
struct CollectionTableRow {
    #[tabled(rename = "Folder")]
    folder: String,
    #[tabled(rename = "Database")]
    database_id: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

fn rows(cfg: &Config) -> Vec<CollectionRow> {
    cfg.collections
        .iter()
        .map(|m| {
            let dir = cfg.folder_path(&m.folder);
            let notes = match vault::list_candidates(&dir, None) {
                Ok(candidates) => Some(candidates.len()),
                Err(e) => {
                    tracing::warn!("{e}");
                    None
                }
            };
            CollectionRow {
                folder: m.folder.to_string(),
                database_id: m.database_id.to_string(),
                path: dir.display().to_string(),
                notes,
            }
        })
        .collect()
}

fn list(args: ListArgs) -> Result<()> {
    let cfg = config::load().context("failed to load config")?;
    let rows = rows(&cfg);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("failed to serialize collections JSON")?
        );
        return Ok(());
    }

    println!("Vault: {}", cfg.vault.display());
    if rows.is_empty() {
        println!("No collections configured.");
        println!("Run: notesync collections add <folder> <database-id>");
        return Ok(());
    }
    let table_rows: Vec<CollectionTableRow> = rows
        .into_iter()
        .map(|r| CollectionTableRow {
            folder: r.folder,
            database_id: r.database_id,
            notes: r
                .notes
                .map_or_else(|| "missing".to_string(), |n| n.to_string()),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn add(args: AddArgs) -> Result<()> {
    let mut cfg = config::load().context("failed to load config")?;
    cfg.set_collection(
        FolderName::from(args.folder.as_str()),
        CollectionId::from(args.database_id.as_str()),
    );
    config::save(&cfg).context("failed to save config")?;

    let dir = cfg.folder_path(&FolderName::from(args.folder.as_str()));
    println!("✓ '{}' → {}", args.folder, args.database_id);
    if !dir.is_dir() {
        println!("  Warning: {} does not exist yet", dir.display());
    }
    Ok(())
}

fn remove(args: RemoveArgs) -> Result<()> {
    let mut cfg = config::load().context("failed to load config")?;
    if !cfg.remove_collection(&args.folder) {
        anyhow::bail!("no collection is mapped to folder '{}'", args.folder);
    }
    config::save(&cfg).context("failed to save config")?;
    println!("✓ Removed '{}'", args.folder);
    Ok(())
}
