//! Block model serialized in the remote page API's JSON shape.
//!
//! ```json
//! {"object": "block", "type": "paragraph", "paragraph": {"rich_text": [...]}}
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::RenderError;

/// Maximum characters in one rich-text run.
pub const MAX_TEXT_LEN: usize = 2000;
/// Maximum rich-text runs in one block.
pub const MAX_RICH_TEXT_ITEMS: usize = 100;
/// Maximum top-level blocks in one create call.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;
/// Maximum levels of `children` below a top-level block in one create call.
pub const MAX_NESTING_DEPTH: usize = 2;

// ---------------------------------------------------------------------------
// Rich text
// ---------------------------------------------------------------------------

/// Inline styling of a rich-text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Annotations {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

/// One run of text: `{"type": "text", "text": {...}, "annotations": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: TextContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

impl RichText {
    /// Unstyled run.
    pub fn plain(content: impl Into<String>) -> Self {
        RichText {
            kind: "text",
            text: TextContent {
                content: content.into(),
                link: None,
            },
            annotations: None,
        }
    }

    /// Unstyled run linking to `url`.
    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        let mut rt = RichText::plain(content);
        rt.text.link = Some(Link { url: url.into() });
        rt
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn content(&self) -> &str {
        &self.text.content
    }

    fn same_style(&self, other: &RichText) -> bool {
        self.annotations == other.annotations && self.text.link == other.text.link
    }
}

/// Append `content` to `runs`, merging with the last run when styling matches.
pub(crate) fn push_run(runs: &mut Vec<RichText>, run: RichText) {
    if run.text.content.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.same_style(&run) => last.text.content.push_str(&run.text.content),
        _ => runs.push(run),
    }
}

/// Split runs longer than [`MAX_TEXT_LEN`] characters into several runs.
pub fn split_long_runs(runs: Vec<RichText>) -> Vec<RichText> {
    let mut out = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.content.chars().count() <= MAX_TEXT_LEN {
            out.push(run);
            continue;
        }
        for chunk in chunk_chars(&run.text.content, MAX_TEXT_LEN) {
            let mut piece = run.clone();
            piece.text.content = chunk.to_string();
            out.push(piece);
        }
    }
    out
}

/// Split `text` into slices of at most `max` characters.
pub fn chunk_chars(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == max {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Payload shared by text-bearing blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub rich_text: Vec<RichText>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToDoBlock {
    pub rich_text: Vec<RichText>,
    pub checked: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlock {
    #[serde(rename = "type")]
    kind: &'static str,
    pub external: ExternalFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct EmptyObject {}

/// One content block of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Quote(TextBlock),
    Code(CodeBlock),
    Image(ImageBlock),
    Divider,
}

impl Block {
    pub fn paragraph(rich_text: Vec<RichText>) -> Self {
        Block::Paragraph(TextBlock {
            rich_text,
            children: vec![],
        })
    }

    /// An empty paragraph, used as a visual separator.
    pub fn blank() -> Self {
        Block::paragraph(vec![])
    }

    /// A paragraph showing `url` as a link to itself.
    pub fn link_paragraph(url: &str) -> Self {
        Block::paragraph(vec![RichText::link(url, url)])
    }

    /// A code block holding `text` split into runs of [`MAX_TEXT_LEN`].
    pub fn code(text: &str, language: impl Into<String>) -> Self {
        let rich_text = chunk_chars(text, MAX_TEXT_LEN)
            .into_iter()
            .map(RichText::plain)
            .collect();
        Block::Code(CodeBlock {
            rich_text,
            language: language.into(),
        })
    }

    pub fn image(url: impl Into<String>) -> Self {
        Block::Image(ImageBlock {
            kind: "external",
            external: ExternalFile { url: url.into() },
        })
    }

    /// The `type` discriminator used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading1(_) => "heading_1",
            Block::Heading2(_) => "heading_2",
            Block::Heading3(_) => "heading_3",
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::ToDo(_) => "to_do",
            Block::Quote(_) => "quote",
            Block::Code(_) => "code",
            Block::Image(_) => "image",
            Block::Divider => "divider",
        }
    }

    pub fn rich_text(&self) -> &[RichText] {
        match self {
            Block::Paragraph(b)
            | Block::Heading1(b)
            | Block::Heading2(b)
            | Block::Heading3(b)
            | Block::BulletedListItem(b)
            | Block::NumberedListItem(b)
            | Block::Quote(b) => &b.rich_text,
            Block::ToDo(b) => &b.rich_text,
            Block::Code(b) => &b.rich_text,
            Block::Image(_) | Block::Divider => &[],
        }
    }

    pub fn children(&self) -> &[Block] {
        match self {
            Block::Paragraph(b)
            | Block::Heading1(b)
            | Block::Heading2(b)
            | Block::Heading3(b)
            | Block::BulletedListItem(b)
            | Block::NumberedListItem(b)
            | Block::Quote(b) => &b.children,
            Block::ToDo(b) => &b.children,
            Block::Code(_) | Block::Image(_) | Block::Divider => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::Paragraph(b)
            | Block::Heading1(b)
            | Block::Heading2(b)
            | Block::Heading3(b)
            | Block::BulletedListItem(b)
            | Block::NumberedListItem(b)
            | Block::Quote(b) => Some(&mut b.children),
            Block::ToDo(b) => Some(&mut b.children),
            Block::Code(_) | Block::Image(_) | Block::Divider => None,
        }
    }

    /// Concatenated text of this block's own runs.
    pub fn plain_text(&self) -> String {
        self.rich_text().iter().map(RichText::content).collect()
    }

    /// Levels of `children` below this block (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check per-block rich-text limits, recursively.
    pub fn check_limits(&self) -> Result<(), RenderError> {
        let runs = self.rich_text().len();
        if runs > MAX_RICH_TEXT_ITEMS {
            return Err(RenderError::TooLarge(format!(
                "{} block has {runs} text runs (max {MAX_RICH_TEXT_ITEMS})",
                self.type_name()
            )));
        }
        self.children().iter().try_for_each(Block::check_limits)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("object", "block")?;
        map.serialize_entry("type", self.type_name())?;
        let key = self.type_name();
        match self {
            Block::Paragraph(b)
            | Block::Heading1(b)
            | Block::Heading2(b)
            | Block::Heading3(b)
            | Block::BulletedListItem(b)
            | Block::NumberedListItem(b)
            | Block::Quote(b) => map.serialize_entry(key, b)?,
            Block::ToDo(b) => map.serialize_entry(key, b)?,
            Block::Code(b) => map.serialize_entry(key, b)?,
            Block::Image(b) => map.serialize_entry(key, b)?,
            Block::Divider => map.serialize_entry(key, &EmptyObject {})?,
        }
        map.end()
    }
}
