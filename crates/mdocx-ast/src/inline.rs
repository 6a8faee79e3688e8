//! Inline elements for document content
//!
//! This module defines inline-level elements that appear within blocks,
//! such as text, emphasis, code spans, links, and images.

use serde::{Deserialize, Serialize};

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text content
    Text(String),
    /// Formatted content (emphasis, strong, strikethrough)
    Format(FormatType, Vec<Inline>),
    /// A code span
    Code(String),
    /// A hyperlink
    Link(Link),
    /// An inline image
    Image(Image),
    /// A soft line break (rendered as a space)
    SoftBreak,
    /// A hard line break
    HardBreak,
    /// Raw inline HTML, kept as literal text
    Html(String),
    /// A footnote reference (`[^label]`)
    FootnoteReference(String),
}

/// Text formatting types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatType {
    /// `*emphasis*`
    Emphasis,
    /// `**strong**`
    Strong,
    /// `~~strikethrough~~`
    Strikethrough,
}

/// A hyperlink element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The URL target (`#fragment` for internal anchors)
    pub url: String,
    /// Optional link title
    pub title: Option<String>,
    /// The link text
    pub text: Vec<Inline>,
}

impl Link {
    /// Whether the link points inside the document
    pub fn is_internal(&self) -> bool {
        self.url.starts_with('#')
    }
}

/// An image element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Image source path or URL
    pub src: String,
    /// Alternative text
    pub alt: String,
    /// Optional image title
    pub title: Option<String>,
}

/// Extract plain text from a sequence of inline elements
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        push_text(inline, &mut out);
    }
    out
}

fn push_text(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) | Inline::Code(text) | Inline::Html(text) => out.push_str(text),
        Inline::Format(_, inner) => inner.iter().for_each(|i| push_text(i, out)),
        Inline::Link(link) => link.text.iter().for_each(|i| push_text(i, out)),
        Inline::Image(image) => out.push_str(&image.alt),
        Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        Inline::FootnoteReference(_) => {}
    }
}
