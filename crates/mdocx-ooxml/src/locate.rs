//! Paragraph lookup by text

use crate::body::Paragraph;
use crate::package::DocumentPackage;

/// First paragraph of the package body whose text contains `text`
///
/// Paragraphs are visited in document order, table cells included. A match
/// needs `text` inside one text node; text split across runs is not found.
/// Comparison is case-sensitive. Returns `None` when nothing matches.
pub fn find_paragraph_containing_text<'p>(
    package: &'p DocumentPackage<'_>,
    text: &str,
) -> Option<&'p Paragraph> {
    package.body().find_paragraph_containing(text)
}
