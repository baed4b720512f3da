//! `notesync inspect <file>`: show what sync would send for one note.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;

use notesync_core::config::{self, DEFAULT_TAG_KEY};
use notesync_core::{FileRecord, PageProperties, RenderTier};
use notesync_notion::payload;
use notesync_renderer::ContentRenderer;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    Rich,
    PlainText,
    Empty,
}

impl From<TierArg> for RenderTier {
    fn from(t: TierArg) -> Self {
        match t {
            TierArg::Rich => RenderTier::Rich,
            TierArg::PlainText => RenderTier::PlainText,
            TierArg::Empty => RenderTier::Empty,
        }
    }
}

/// Arguments for `notesync inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Markdown note to inspect.
    pub file: PathBuf,

    /// Render tier to show.
    #[arg(long, value_enum, default_value = "rich")]
    pub tier: TierArg,
}

impl InspectArgs {
    pub fn run(self) -> Result<()> {
        let raw = std::fs::read_to_string(&self.file)
            .with_context(|| format!("cannot read '{}'", self.file.display()))?;
        let record = FileRecord::parse(self.file.clone(), raw, None)?;

        // Inspect works without a config; fall back to the default tag key.
        let tag_key = config::load()
            .map(|c| c.tag_key)
            .unwrap_or_else(|_| DEFAULT_TAG_KEY.to_string());

        let identity = record.identity();
        let properties = PageProperties::build(&identity, &record.frontmatter, &tag_key);
        let tier = RenderTier::from(self.tier);
        let blocks = ContentRenderer::default()
            .render(&record.body, &record.frontmatter.urls(), tier)
            .with_context(|| format!("cannot render '{}' at tier {tier}", self.file.display()))?;

        let out = json!({
            "title": identity.title,
            "date": identity.date,
            "tier": tier,
            "properties": payload::properties(&properties),
            "blocks": blocks,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("failed to serialize inspect output")?
        );
        Ok(())
    }
}
