//! Markdown → block conversion over pulldown-cmark events.
//!
//! [`MarkdownConverter`] is the seam the content renderer delegates to for its
//! rich tier; [`CmarkConverter`] is the default implementation.
//!
//! Supported: paragraphs, headings (levels 4–6 clamp to 3), bulleted /
//! numbered / task lists with nesting, quotes, code, dividers, external
//! images, and bold / italic / strikethrough / code / link inline styling.
//! Tables and nesting deeper than [`MAX_NESTING_DEPTH`] are reported as
//! [`RenderError::Malformed`].

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::block::{
    push_run, split_long_runs, Annotations, Block, RichText, TextBlock, ToDoBlock,
    MAX_NESTING_DEPTH,
};
use crate::error::RenderError;

/// Converts Markdown text into a block tree.
pub trait MarkdownConverter: Send + Sync {
    fn to_blocks(&self, markdown: &str) -> Result<Vec<Block>, RenderError>;
}

/// pulldown-cmark based [`MarkdownConverter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkConverter;

impl MarkdownConverter for CmarkConverter {
    fn to_blocks(&self, markdown: &str) -> Result<Vec<Block>, RenderError> {
        let options =
            Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES;
        let mut builder = TreeBuilder::default();
        for event in Parser::new_ext(markdown, options) {
            builder.event(event)?;
        }
        let blocks = builder.finish();

        for block in &blocks {
            if block.depth() > MAX_NESTING_DEPTH {
                return Err(RenderError::Malformed(format!(
                    "{} nested {} levels deep (max {MAX_NESTING_DEPTH})",
                    block.type_name(),
                    block.depth()
                )));
            }
            block.check_limits()?;
        }
        Ok(blocks)
    }
}

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Paragraph,
    Heading(u8),
    Item { ordered: bool },
    Quote,
}

#[derive(Debug)]
struct BlockFrame {
    kind: Kind,
    rich: Vec<RichText>,
    children: Vec<Block>,
    /// Blocks emitted right after this one (images found inline).
    trailing: Vec<Block>,
    checked: Option<bool>,
    /// First paragraph of a list item or quote: its text becomes the parent's.
    merge_into_parent: bool,
}

impl BlockFrame {
    fn new(kind: Kind) -> Self {
        BlockFrame {
            kind,
            rich: vec![],
            children: vec![],
            trailing: vec![],
            checked: None,
            merge_into_parent: false,
        }
    }

    fn is_blank(&self) -> bool {
        self.rich.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug)]
enum Style {
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
}

#[derive(Debug)]
enum Frame {
    Block(BlockFrame),
    List { ordered: bool },
    Code { language: String, text: String },
    Image { url: String, alt: String },
    Style(Style),
    Opaque,
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    out: Vec<Block>,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.start(tag)?,
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text, false),
            Event::Code(text) => self.text(&text, true),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html, false),
            Event::SoftBreak | Event::HardBreak => self.text("\n", false),
            Event::Rule => self.emit(Block::Divider),
            Event::TaskListMarker(checked) => {
                let item = self.stack.iter_mut().rev().find_map(|f| match f {
                    Frame::Block(b) if matches!(b.kind, Kind::Item { .. }) => Some(b),
                    _ => None,
                });
                if let Some(item) = item {
                    item.checked = Some(checked);
                }
            }
            Event::FootnoteReference(label) => self.text(&format!("[^{label}]"), false),
            _ => {}
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<(), RenderError> {
        let frame = match tag {
            Tag::Paragraph => {
                let mut frame = BlockFrame::new(Kind::Paragraph);
                frame.merge_into_parent = matches!(
                    self.stack.last(),
                    Some(Frame::Block(parent))
                        if matches!(parent.kind, Kind::Item { .. } | Kind::Quote) && parent.is_blank()
                );
                Frame::Block(frame)
            }
            Tag::Heading { level, .. } => Frame::Block(BlockFrame::new(Kind::Heading(heading_level(level)))),
            Tag::BlockQuote { .. } => Frame::Block(BlockFrame::new(Kind::Quote)),
            Tag::HtmlBlock => Frame::Block(BlockFrame::new(Kind::Paragraph)),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                Frame::Code {
                    language,
                    text: String::new(),
                }
            }
            Tag::List(start) => Frame::List {
                ordered: start.is_some(),
            },
            Tag::Item => {
                let ordered = self
                    .stack
                    .iter()
                    .rev()
                    .find_map(|f| match f {
                        Frame::List { ordered } => Some(*ordered),
                        _ => None,
                    })
                    .unwrap_or(false);
                Frame::Block(BlockFrame::new(Kind::Item { ordered }))
            }
            Tag::Table { .. } => {
                return Err(RenderError::Malformed(
                    "tables cannot be represented as blocks".to_string(),
                ))
            }
            Tag::Emphasis => Frame::Style(Style::Emphasis),
            Tag::Strong => Frame::Style(Style::Strong),
            Tag::Strikethrough => Frame::Style(Style::Strikethrough),
            Tag::Link { dest_url, .. } => Frame::Style(Style::Link(dest_url.to_string())),
            Tag::Image { dest_url, .. } => Frame::Image {
                url: dest_url.to_string(),
                alt: String::new(),
            },
            _ => Frame::Opaque,
        };
        self.stack.push(frame);
        Ok(())
    }

    fn end(&mut self) {
        match self.stack.pop() {
            Some(Frame::Block(frame)) => self.finish_block(frame),
            Some(Frame::Code { language, text }) => {
                self.emit(Block::code(text.trim_end_matches('\n'), language));
            }
            Some(Frame::Image { url, alt }) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    match self.nearest_block() {
                        Some(frame) => frame.trailing.push(Block::image(url)),
                        None => self.out.push(Block::image(url)),
                    }
                } else {
                    self.text(&alt, false);
                }
            }
            Some(Frame::List { .. } | Frame::Style(_) | Frame::Opaque) | None => {}
        }
    }

    fn text(&mut self, text: &str, code: bool) {
        let annotations = self.annotations(code);
        let link = self.link();

        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Code { text: buf, .. } => {
                    buf.push_str(text);
                    return;
                }
                Frame::Image { alt, .. } => {
                    alt.push_str(text);
                    return;
                }
                Frame::Block(block) => {
                    push_run(&mut block.rich, styled(text, annotations, link));
                    return;
                }
                _ => {}
            }
        }

        // Inline content outside any container.
        let mut runs = vec![];
        push_run(&mut runs, styled(text, annotations, link));
        if !runs.is_empty() {
            self.out.push(Block::paragraph(runs));
        }
    }

    fn finish_block(&mut self, mut frame: BlockFrame) {
        if let Some(last) = frame.rich.last_mut() {
            let trimmed = last.text.content.trim_end_matches('\n').len();
            last.text.content.truncate(trimmed);
            if last.text.content.is_empty() {
                frame.rich.pop();
            }
        }
        let rich = split_long_runs(frame.rich);

        if frame.merge_into_parent {
            if let Some(parent) = self.nearest_block() {
                parent.rich.extend(rich);
                parent.trailing.extend(frame.trailing);
                return;
            }
        }

        let children = frame.children;
        let block = match frame.kind {
            Kind::Paragraph if rich.is_empty() => None,
            Kind::Paragraph => Some(Block::Paragraph(TextBlock { rich_text: rich, children })),
            Kind::Heading(1) => Some(Block::Heading1(TextBlock { rich_text: rich, children })),
            Kind::Heading(2) => Some(Block::Heading2(TextBlock { rich_text: rich, children })),
            Kind::Heading(_) => Some(Block::Heading3(TextBlock { rich_text: rich, children })),
            Kind::Quote => Some(Block::Quote(TextBlock { rich_text: rich, children })),
            Kind::Item { ordered } => Some(match frame.checked {
                Some(checked) => Block::ToDo(ToDoBlock {
                    rich_text: rich,
                    checked,
                    children,
                }),
                None if ordered => Block::NumberedListItem(TextBlock { rich_text: rich, children }),
                None => Block::BulletedListItem(TextBlock { rich_text: rich, children }),
            }),
        };

        if let Some(block) = block {
            self.emit(block);
        }
        for extra in frame.trailing {
            self.emit(extra);
        }
    }

    /// Attach `block` to the innermost open container, or to the output.
    fn emit(&mut self, block: Block) {
        match self.nearest_block() {
            Some(parent) => parent.children.push(block),
            None => self.out.push(block),
        }
    }

    fn nearest_block(&mut self) -> Option<&mut BlockFrame> {
        self.stack.iter_mut().rev().find_map(|f| match f {
            Frame::Block(b) => Some(b),
            _ => None,
        })
    }

    fn annotations(&self, code: bool) -> Annotations {
        let mut a = Annotations {
            code,
            ..Annotations::default()
        };
        for frame in &self.stack {
            match frame {
                Frame::Style(Style::Emphasis) => a.italic = true,
                Frame::Style(Style::Strong) => a.bold = true,
                Frame::Style(Style::Strikethrough) => a.strikethrough = true,
                _ => {}
            }
        }
        a
    }

    fn link(&self) -> Option<String> {
        self.stack.iter().rev().find_map(|f| match f {
            Frame::Style(Style::Link(url)) => Some(url.clone()),
            _ => None,
        })
    }

    fn finish(mut self) -> Vec<Block> {
        while !self.stack.is_empty() {
            self.end();
        }
        self.out
    }
}

fn styled(text: &str, annotations: Annotations, link: Option<String>) -> RichText {
    let run = match link {
        Some(url) => RichText::link(text, url),
        None => RichText::plain(text),
    };
    run.with_annotations(annotations)
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MAX_TEXT_LEN;

    fn convert(md: &str) -> Vec<Block> {
        CmarkConverter.to_blocks(md).expect("convert")
    }

    #[test]
    fn paragraphs_and_headings() {
        let blocks = convert("# One\n\n## Two\n\n#### Four\n\nText here.");
        let types: Vec<_> = blocks.iter().map(Block::type_name).collect();
        assert_eq!(types, vec!["heading_1", "heading_2", "heading_3", "paragraph"]);
        assert_eq!(blocks[3].plain_text(), "Text here.");
    }

    #[test]
    fn inline_styles_become_annotations() {
        let blocks = convert("plain **bold** _it_ ~~gone~~ `code` [link](https://x.dev)");
        let runs = blocks[0].rich_text();
        let bold = runs.iter().find(|r| r.content() == "bold").unwrap();
        assert!(bold.annotations.as_ref().unwrap().bold);
        let it = runs.iter().find(|r| r.content() == "it").unwrap();
        assert!(it.annotations.as_ref().unwrap().italic);
        let gone = runs.iter().find(|r| r.content() == "gone").unwrap();
        assert!(gone.annotations.as_ref().unwrap().strikethrough);
        let code = runs.iter().find(|r| r.content() == "code").unwrap();
        assert!(code.annotations.as_ref().unwrap().code);
        let link = runs.iter().find(|r| r.content() == "link").unwrap();
        assert_eq!(link.text.link.as_ref().unwrap().url, "https://x.dev");
    }

    #[test]
    fn lists_nest_as_children() {
        let blocks = convert("- a\n  - b\n- c\n\n1. one\n2. two");
        let types: Vec<_> = blocks.iter().map(Block::type_name).collect();
        assert_eq!(
            types,
            vec![
                "bulleted_list_item",
                "bulleted_list_item",
                "numbered_list_item",
                "numbered_list_item"
            ]
        );
        assert_eq!(blocks[0].plain_text(), "a");
        assert_eq!(blocks[0].children()[0].plain_text(), "b");
    }

    #[test]
    fn loose_list_item_keeps_first_paragraph_as_text() {
        let blocks = convert("- first\n\n  second\n\n- next");
        assert_eq!(blocks[0].plain_text(), "first");
        assert_eq!(blocks[0].children()[0].type_name(), "paragraph");
        assert_eq!(blocks[0].children()[0].plain_text(), "second");
    }

    #[test]
    fn task_items_become_to_do() {
        let blocks = convert("- [x] done\n- [ ] open");
        match (&blocks[0], &blocks[1]) {
            (Block::ToDo(a), Block::ToDo(b)) => {
                assert!(a.checked);
                assert!(!b.checked);
            }
            other => panic!("expected to_do blocks, got {other:?}"),
        }
        assert_eq!(blocks[0].plain_text(), "done");
    }

    #[test]
    fn fenced_code_keeps_language_and_text() {
        let blocks = convert("```rust title=x\nfn main() {}\n```");
        match &blocks[0] {
            Block::Code(code) => {
                assert_eq!(code.language, "rust");
                assert_eq!(blocks[0].plain_text(), "fn main() {}");
            }
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn quote_and_divider() {
        let blocks = convert("> quoted\n\n---\n\nafter");
        let types: Vec<_> = blocks.iter().map(Block::type_name).collect();
        assert_eq!(types, vec!["quote", "divider", "paragraph"]);
        assert_eq!(blocks[0].plain_text(), "quoted");
    }

    #[test]
    fn external_image_follows_its_paragraph() {
        let blocks = convert("see ![alt](https://x.dev/a.png) here");
        let types: Vec<_> = blocks.iter().map(Block::type_name).collect();
        assert_eq!(types, vec!["paragraph", "image"]);
        assert_eq!(blocks[0].plain_text(), "see  here");
    }

    #[test]
    fn local_image_falls_back_to_alt_text() {
        let blocks = convert("![diagram](attachments/d.png)");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "diagram");
    }

    #[test]
    fn long_paragraph_is_split_into_runs() {
        let text = "y".repeat(MAX_TEXT_LEN + 10);
        let blocks = convert(&text);
        assert_eq!(blocks[0].rich_text().len(), 2);
        assert_eq!(blocks[0].plain_text(), text);
    }

    #[test]
    fn tables_are_malformed() {
        let err = CmarkConverter
            .to_blocks("| a | b |\n|---|---|\n| 1 | 2 |")
            .unwrap_err();
        assert!(matches!(err, RenderError::Malformed(_)));
    }

    #[test]
    fn deep_nesting_is_malformed() {
        let md = "- a\n  - b\n    - c\n      - d";
        let err = CmarkConverter.to_blocks(md).unwrap_err();
        assert!(matches!(err, RenderError::Malformed(_)));
    }

    #[test]
    fn two_levels_of_nesting_are_accepted() {
        let blocks = convert("- a\n  - b\n    - c");
        assert_eq!(blocks[0].depth(), 2);
    }
}
