//! Block-level elements for document structure
//!
//! Blocks mirror the Markdown constructs the pipeline recognises:
//! paragraphs, headings, lists, tables, code, quotes and footnotes.

use serde::{Deserialize, Serialize};

use crate::inline::Inline;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A section heading
    Heading(Heading),
    /// An ordered or unordered list
    List(List),
    /// A table
    Table(Table),
    /// A fenced or indented code block
    CodeBlock(CodeBlock),
    /// A block quote
    Quote(Quote),
    /// Raw HTML block, kept as literal text
    Html(String),
    /// A footnote definition
    FootnoteDefinition(FootnoteDefinition),
    /// A thematic break (`---`)
    ThematicBreak,
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content within the paragraph
    pub inlines: Vec<Inline>,
}

/// A section heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (1-6, where 1 is the highest)
    pub level: u8,
    /// Heading text content
    pub text: Vec<Inline>,
    /// Explicit anchor (`# Title {#anchor}`)
    pub anchor: Option<String>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Type of list
    pub list_type: ListType,
    /// First number of an ordered list
    pub start: Option<u64>,
    /// List items
    pub items: Vec<ListItem>,
}

/// List type variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListType {
    /// Bullet list
    Unordered,
    /// Numbered list
    Ordered,
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListItem {
    /// Item content (can contain nested lists)
    pub content: Vec<Block>,
    /// Task list state: `Some(true)` for `[x]`, `Some(false)` for `[ ]`
    pub task: Option<bool>,
}

/// A table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Per-column alignment
    pub alignments: Vec<Option<Alignment>>,
    /// Table rows
    pub rows: Vec<TableRow>,
}

/// A table row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
    /// Whether this is a header row
    pub is_header: bool,
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content
    pub inlines: Vec<Inline>,
}

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// A code block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeBlock {
    /// The literal content
    pub content: String,
    /// Language from the fence info string
    pub language: Option<String>,
}

impl CodeBlock {
    /// Lines of the block, without the trailing newline
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content
            .strip_suffix('\n')
            .unwrap_or(&self.content)
            .split('\n')
    }
}

/// A block quote
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted blocks
    pub blocks: Vec<Block>,
}

/// A footnote definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FootnoteDefinition {
    /// Footnote label
    pub label: String,
    /// Footnote content
    pub blocks: Vec<Block>,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            level: 1,
            text: Vec::new(),
            anchor: None,
        }
    }
}
