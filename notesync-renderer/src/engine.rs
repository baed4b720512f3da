//! Tiered content rendering: [`ContentRenderer`].
//!
//! # Tiers
//!
//! | Tier         | Output                                                        |
//! |--------------|---------------------------------------------------------------|
//! | `Rich`       | URL prelude + converted body (first `# ` line removed)        |
//! | `PlainText`  | URL prelude + one `markdown` code block holding the raw body  |
//! | `Empty`      | nothing                                                       |

use std::sync::Arc;

use notesync_core::RenderTier;

use crate::block::{Block, MAX_BLOCKS_PER_REQUEST, MAX_RICH_TEXT_ITEMS, MAX_TEXT_LEN};
use crate::convert::{CmarkConverter, MarkdownConverter};
use crate::error::RenderError;

/// Language tag of the plain-text tier's single code block.
pub const PLAIN_TEXT_LANGUAGE: &str = "markdown";

/// Fallback for code languages the remote does not recognise.
pub const FALLBACK_LANGUAGE: &str = "plain text";

// ---------------------------------------------------------------------------
// Code language normalisation
// ---------------------------------------------------------------------------

const LANGUAGES: &[&str] = &[
    "abap", "arduino", "bash", "basic", "c", "clojure", "coffeescript", "c++", "c#", "css",
    "dart", "diff", "docker", "elixir", "elm", "erlang", "flow", "fortran", "f#", "gherkin",
    "glsl", "go", "graphql", "groovy", "haskell", "html", "java", "javascript", "json", "julia",
    "kotlin", "latex", "less", "lisp", "livescript", "lua", "makefile", "markdown", "markup",
    "matlab", "mermaid", "nix", "objective-c", "ocaml", "pascal", "perl", "php", "plain text",
    "powershell", "prolog", "protobuf", "python", "r", "reason", "ruby", "rust", "sass", "scala",
    "scheme", "scss", "shell", "sql", "swift", "typescript", "vb.net", "verilog", "vhdl",
    "visual basic", "webassembly", "xml", "yaml", "java/c/c++/c#",
];

const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("yml", "yaml"),
    ("cpp", "c++"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("fsharp", "f#"),
    ("sh", "shell"),
    ("zsh", "shell"),
    ("console", "shell"),
    ("md", "markdown"),
    ("golang", "go"),
    ("dockerfile", "docker"),
    ("make", "makefile"),
    ("objc", "objective-c"),
    ("ps1", "powershell"),
    ("proto", "protobuf"),
    ("tex", "latex"),
    ("text", "plain text"),
    ("txt", "plain text"),
    ("plaintext", "plain text"),
    ("htm", "html"),
    ("kt", "kotlin"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("wasm", "webassembly"),
];

/// Map a fenced-code info word to a language name the remote accepts.
pub fn normalize_language(raw: &str) -> &'static str {
    let lower = raw.trim().to_lowercase();
    if let Some(lang) = LANGUAGES.iter().find(|l| **l == lower) {
        return lang;
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, lang)| *lang)
        .unwrap_or(FALLBACK_LANGUAGE)
}

fn normalize_code_blocks(blocks: &mut [Block]) {
    for block in blocks {
        if let Block::Code(code) = block {
            code.language = normalize_language(&code.language).to_string();
            if let Some(first) = code.rich_text.first_mut() {
                first.annotations = None;
            }
        }
        if let Some(children) = block.children_mut() {
            normalize_code_blocks(children);
        }
    }
}

// ---------------------------------------------------------------------------
// Body helpers
// ---------------------------------------------------------------------------

/// Remove the first line starting with `# `, once.
pub fn remove_first_heading(body: &str) -> String {
    let mut lines: Vec<&str> = body.split('\n').collect();
    if let Some(idx) = lines.iter().position(|l| l.starts_with("# ")) {
        lines.remove(idx);
    }
    lines.join("\n")
}

fn url_prelude(body: &str, urls: &[String]) -> Vec<Block> {
    if urls.is_empty() {
        return vec![];
    }
    let mut blocks: Vec<Block> = urls.iter().map(|u| Block::link_paragraph(u)).collect();
    if !body.trim_start().starts_with('#') {
        blocks.push(Block::blank());
    }
    blocks
}

// ---------------------------------------------------------------------------
// ContentRenderer
// ---------------------------------------------------------------------------

/// Turns a note body into the block sequence for one [`RenderTier`].
///
/// Create once and reuse; the converter is shared behind an `Arc`.
#[derive(Clone)]
pub struct ContentRenderer {
    converter: Arc<dyn MarkdownConverter>,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        ContentRenderer::new(Arc::new(CmarkConverter))
    }
}

impl std::fmt::Debug for ContentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRenderer").finish_non_exhaustive()
    }
}

impl ContentRenderer {
    pub fn new(converter: Arc<dyn MarkdownConverter>) -> Self {
        ContentRenderer { converter }
    }

    /// Render `body` at `tier`, prefixing one link paragraph per entry in `urls`.
    ///
    /// `Empty` always yields an empty sequence. Every other tier is checked
    /// against the per-request block ceilings before it is returned.
    pub fn render(
        &self,
        body: &str,
        urls: &[String],
        tier: RenderTier,
    ) -> Result<Vec<Block>, RenderError> {
        let content = match tier {
            RenderTier::Empty => return Ok(vec![]),
            RenderTier::Rich => {
                let mut blocks = self.converter.to_blocks(&remove_first_heading(body))?;
                normalize_code_blocks(&mut blocks);
                blocks
            }
            RenderTier::PlainText => plain_text(body)?,
        };

        let mut blocks = url_prelude(body, urls);
        blocks.extend(content);

        if blocks.len() > MAX_BLOCKS_PER_REQUEST {
            return Err(RenderError::TooLarge(format!(
                "{} blocks (max {MAX_BLOCKS_PER_REQUEST} per request)",
                blocks.len()
            )));
        }
        blocks.iter().try_for_each(Block::check_limits)?;
        tracing::trace!("rendered {} block(s) at tier {tier}", blocks.len());
        Ok(blocks)
    }
}

fn plain_text(body: &str) -> Result<Vec<Block>, RenderError> {
    let text = body.trim();
    if text.is_empty() {
        return Ok(vec![]);
    }
    let block = Block::code(text, PLAIN_TEXT_LANGUAGE);
    let chunks = block.rich_text().len();
    if chunks > MAX_RICH_TEXT_ITEMS {
        return Err(RenderError::TooLarge(format!(
            "body needs {chunks} chunks of {MAX_TEXT_LEN} characters (max {MAX_RICH_TEXT_ITEMS})"
        )));
    }
    Ok(vec![block])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
