//! mdocx-ast - Document tree definitions
//!
//! This crate provides the tree produced by the Markdown pipeline and walked
//! by the DOCX renderer.

pub mod block;
pub mod document;
pub mod inline;

pub use block::{
    Alignment, Block, CodeBlock, FootnoteDefinition, Heading, List, ListItem, ListType, Paragraph,
    Quote, Table, TableCell, TableRow,
};
pub use document::Document;
pub use inline::{plain_text, FormatType, Image, Inline, Link};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
