//! Markdown Parser
//!
//! This module turns Markdown text into a `mdocx_ast::Document`. Tokenizing is
//! delegated to `pulldown-cmark`; this module folds its event stream into the
//! block/inline tree the DOCX renderer walks.
//!
//! # Supported Syntax
//!
//! - CommonMark blocks: headings, paragraphs, block quotes, code blocks,
//!   lists, thematic breaks, HTML blocks
//! - Emphasis extras (`~~strike~~`), tables and task lists by default
//! - Footnotes, smart punctuation and heading anchors when enabled
//!
//! # Example
//!
//! ```
//! use mdocx_ast::Block;
//! use mdocx_core::parse;
//!
//! let doc = parse("# Title\n\nHello *world*.").unwrap();
//! assert_eq!(doc.len(), 2);
//! assert!(matches!(doc.blocks[0], Block::Heading(_)));
//! ```

use mdocx_ast::{
    plain_text, Alignment, Block, CodeBlock, Document, FootnoteDefinition, FormatType, Heading,
    Image, Inline, Link, List, ListItem, ListType, Paragraph, Quote, Table, TableCell, TableRow,
};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Parser, Tag};
use tracing::{debug, trace};

use crate::error::{ParseError, Result};
use crate::options::PipelineOptions;

/// Deepest container nesting accepted before parsing is aborted
pub const MAX_NESTING_DEPTH: usize = 128;

/// An open container while folding the event stream
#[derive(Debug)]
enum Frame {
    Paragraph(Vec<Inline>),
    /// Paragraph opened for bare text inside a tight list item
    ImplicitParagraph(Vec<Inline>),
    Heading {
        level: u8,
        anchor: Option<String>,
        text: Vec<Inline>,
    },
    Quote(Vec<Block>),
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    HtmlBlock(String),
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item {
        task: Option<bool>,
        blocks: Vec<Block>,
    },
    Footnote {
        label: String,
        blocks: Vec<Block>,
    },
    Table {
        alignments: Vec<Option<Alignment>>,
        rows: Vec<TableRow>,
    },
    Row {
        is_header: bool,
        cells: Vec<TableCell>,
    },
    Cell(Vec<Inline>),
    Format(FormatType, Vec<Inline>),
    Link {
        url: String,
        title: Option<String>,
        text: Vec<Inline>,
    },
    Image {
        src: String,
        title: Option<String>,
        alt: Vec<Inline>,
    },
    /// Container we do not model; its content flows to the enclosing frame
    Transparent,
}

impl Frame {
    fn inlines_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Frame::Paragraph(inlines)
            | Frame::ImplicitParagraph(inlines)
            | Frame::Cell(inlines)
            | Frame::Format(_, inlines) => Some(inlines),
            Frame::Heading { text, .. } | Frame::Link { text, .. } => Some(text),
            Frame::Image { alt, .. } => Some(alt),
            _ => None,
        }
    }

    fn blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Frame::Quote(blocks)
            | Frame::Item { blocks, .. }
            | Frame::Footnote { blocks, .. } => Some(blocks),
            _ => None,
        }
    }
}

/// Folds pulldown-cmark events into a document tree
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Block>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn build<'a>(mut self, events: impl Iterator<Item = Event<'a>>) -> Result<Document> {
        for event in events {
            self.handle(event)?;
        }
        self.close_implicit();

        if !self.stack.is_empty() {
            return Err(ParseError::Unbalanced(format!(
                "{} container(s) left open at end of input",
                self.stack.len()
            )));
        }

        Ok(Document { blocks: self.root })
    }

    fn handle(&mut self, event: Event<'_>) -> Result<()> {
        match event {
            Event::Start(tag) => self.start(tag)?,
            Event::End(_) => self.end()?,
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) => self.html(&html),
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.into_string())),
            Event::FootnoteReference(label) => {
                self.push_inline(Inline::FootnoteReference(label.into_string()))
            }
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::ThematicBreak),
            Event::TaskListMarker(checked) => self.mark_task(checked),
            other => trace!(?other, "Ignoring unsupported Markdown event"),
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<()> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }

        let frame = match tag {
            // Block containers
            Tag::Paragraph => {
                self.close_implicit();
                Frame::Paragraph(Vec::new())
            }
            Tag::Heading { level, id, .. } => {
                self.close_implicit();
                Frame::Heading {
                    level: level as u8,
                    anchor: id.map(CowStr::into_string),
                    text: Vec::new(),
                }
            }
            Tag::BlockQuote(_) => {
                self.close_implicit();
                Frame::Quote(Vec::new())
            }
            Tag::CodeBlock(kind) => {
                self.close_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                Frame::CodeBlock {
                    language,
                    content: String::new(),
                }
            }
            Tag::HtmlBlock => {
                self.close_implicit();
                Frame::HtmlBlock(String::new())
            }
            Tag::List(start) => {
                self.close_implicit();
                Frame::List {
                    start,
                    items: Vec::new(),
                }
            }
            Tag::Item => {
                self.close_implicit();
                Frame::Item {
                    task: None,
                    blocks: Vec::new(),
                }
            }
            Tag::FootnoteDefinition(label) => {
                self.close_implicit();
                Frame::Footnote {
                    label: label.into_string(),
                    blocks: Vec::new(),
                }
            }
            Tag::Table(alignments) => {
                self.close_implicit();
                Frame::Table {
                    alignments: alignments.into_iter().map(convert_alignment).collect(),
                    rows: Vec::new(),
                }
            }
            Tag::TableHead => Frame::Row {
                is_header: true,
                cells: Vec::new(),
            },
            Tag::TableRow => Frame::Row {
                is_header: false,
                cells: Vec::new(),
            },
            Tag::TableCell => Frame::Cell(Vec::new()),

            // Inline containers
            Tag::Emphasis => self.inline_frame(Frame::Format(FormatType::Emphasis, Vec::new())),
            Tag::Strong => self.inline_frame(Frame::Format(FormatType::Strong, Vec::new())),
            Tag::Strikethrough => {
                self.inline_frame(Frame::Format(FormatType::Strikethrough, Vec::new()))
            }
            Tag::Link {
                dest_url, title, ..
            } => self.inline_frame(Frame::Link {
                url: dest_url.into_string(),
                title: non_empty(title),
                text: Vec::new(),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.inline_frame(Frame::Image {
                src: dest_url.into_string(),
                title: non_empty(title),
                alt: Vec::new(),
            }),

            other => {
                trace!(?other, "Passing through unsupported Markdown container");
                Frame::Transparent
            }
        };

        self.stack.push(frame);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.close_implicit();
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| ParseError::Unbalanced("container closed without being opened".into()))?;

        match frame {
            Frame::Paragraph(inlines) | Frame::ImplicitParagraph(inlines) => {
                self.push_block(Block::Paragraph(Paragraph { inlines }))
            }
            Frame::Heading {
                level,
                anchor,
                text,
            } => self.push_block(Block::Heading(Heading {
                level,
                text,
                anchor,
            })),
            Frame::Quote(blocks) => self.push_block(Block::Quote(Quote { blocks })),
            Frame::CodeBlock { language, content } => {
                self.push_block(Block::CodeBlock(CodeBlock { content, language }))
            }
            Frame::HtmlBlock(content) => self.push_block(Block::Html(content)),
            Frame::List { start, items } => {
                let list_type = if start.is_some() {
                    ListType::Ordered
                } else {
                    ListType::Unordered
                };
                self.push_block(Block::List(List {
                    list_type,
                    start,
                    items,
                }))
            }
            Frame::Item { task, blocks } => match self.stack.last_mut() {
                Some(Frame::List { items, .. }) => items.push(ListItem {
                    content: blocks,
                    task,
                }),
                _ => return Err(ParseError::Unbalanced("list item outside of a list".into())),
            },
            Frame::Footnote { label, blocks } => {
                self.push_block(Block::FootnoteDefinition(FootnoteDefinition { label, blocks }))
            }
            Frame::Table { alignments, rows } => {
                self.push_block(Block::Table(Table { alignments, rows }))
            }
            Frame::Row { is_header, cells } => match self.stack.last_mut() {
                Some(Frame::Table { rows, .. }) => rows.push(TableRow { cells, is_header }),
                _ => return Err(ParseError::Unbalanced("table row outside of a table".into())),
            },
            Frame::Cell(inlines) => match self.stack.last_mut() {
                Some(Frame::Row { cells, .. }) => cells.push(TableCell { inlines }),
                _ => return Err(ParseError::Unbalanced("table cell outside of a row".into())),
            },
            Frame::Format(kind, inlines) => self.push_inline(Inline::Format(kind, inlines)),
            Frame::Link { url, title, text } => {
                self.push_inline(Inline::Link(Link { url, title, text }))
            }
            Frame::Image { src, title, alt } => self.push_inline(Inline::Image(Image {
                src,
                alt: plain_text(&alt),
                title,
            })),
            Frame::Transparent => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::CodeBlock { content, .. }) | Some(Frame::HtmlBlock(content)) => {
                content.push_str(text)
            }
            _ => self.push_inline(Inline::Text(text.to_string())),
        }
    }

    fn html(&mut self, html: &str) {
        match self.stack.last_mut() {
            Some(Frame::HtmlBlock(content)) => content.push_str(html),
            _ => self.push_inline(Inline::Html(html.to_string())),
        }
    }

    fn mark_task(&mut self, checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Item { task, .. } = frame {
                *task = Some(checked);
                return;
            }
        }
    }

    /// Opens an implicit paragraph when inline content lands in a block container
    fn ensure_inline_container(&mut self) {
        let has_inlines = self
            .stack
            .last_mut()
            .is_some_and(|frame| frame.inlines_mut().is_some());
        if !has_inlines {
            self.stack.push(Frame::ImplicitParagraph(Vec::new()));
        }
    }

    fn inline_frame(&mut self, frame: Frame) -> Frame {
        self.ensure_inline_container();
        frame
    }

    fn push_inline(&mut self, inline: Inline) {
        self.ensure_inline_container();
        let Some(inlines) = self.stack.last_mut().and_then(Frame::inlines_mut) else {
            return;
        };
        // pulldown-cmark splits text at delimiters; keep runs contiguous
        if let (Some(Inline::Text(last)), Inline::Text(text)) = (inlines.last_mut(), &inline) {
            last.push_str(text);
        } else {
            inlines.push(inline);
        }
    }

    fn close_implicit(&mut self) {
        if matches!(self.stack.last(), Some(Frame::ImplicitParagraph(_))) {
            if let Some(Frame::ImplicitParagraph(inlines)) = self.stack.pop() {
                self.attach_block(Block::Paragraph(Paragraph { inlines }));
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        self.close_implicit();
        self.attach_block(block);
    }

    fn attach_block(&mut self, block: Block) {
        for frame in self.stack.iter_mut().rev() {
            if let Some(blocks) = frame.blocks_mut() {
                blocks.push(block);
                return;
            }
        }
        self.root.push(block);
    }
}

fn convert_alignment(alignment: pulldown_cmark::Alignment) -> Option<Alignment> {
    match alignment {
        pulldown_cmark::Alignment::None => None,
        pulldown_cmark::Alignment::Left => Some(Alignment::Left),
        pulldown_cmark::Alignment::Center => Some(Alignment::Center),
        pulldown_cmark::Alignment::Right => Some(Alignment::Right),
    }
}

fn non_empty(text: CowStr<'_>) -> Option<String> {
    (!text.is_empty()).then(|| text.into_string())
}

/// Parse Markdown with the default pipeline
pub fn parse(text: &str) -> Result<Document> {
    parse_with_options(text, &PipelineOptions::default())
}

/// Parse Markdown with an explicit set of extensions
pub fn parse_with_options(text: &str, options: &PipelineOptions) -> Result<Document> {
    let parser = Parser::new_ext(text, options.to_cmark_options());
    let document = TreeBuilder::default().build(parser)?;
    debug!(blocks = document.len(), "Parsed Markdown");
    Ok(document)
}
