//! # mdocx-ooxml
//!
//! Template-backed DOCX assembly for mdocx.
//!
//! This crate provides functionality to:
//! - Resolve DOCX templates by name from embedded or caller-supplied contexts
//! - Open a template package in memory, reset it and locate paragraphs
//! - Render a parsed Markdown tree into the package and flush it to a stream
//!
//! ## Example: Converting Markdown
//!
//! ```no_run
//! use mdocx_ooxml::{to_docx_stream, DocumentStyles};
//!
//! let styles = DocumentStyles::default();
//! let stream = to_docx_stream("# Title\n\nHello *world*.", Some(&styles), None)?;
//! assert_eq!(stream.position(), 0);
//! # Ok::<(), mdocx_ooxml::OoxmlError>(())
//! ```
//!
//! ## Example: Working with a Package
//!
//! ```no_run
//! use mdocx_ooxml::{find_paragraph_containing_text, TemplateLoader, STANDARD_PLACEHOLDER};
//!
//! let mut buffer = TemplateLoader::new().standard()?;
//! let package = buffer.open()?;
//! let placeholder = find_paragraph_containing_text(&package, STANDARD_PLACEHOLDER);
//! assert!(placeholder.is_some());
//! # Ok::<(), mdocx_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod body;
pub mod config;
pub mod convert;
pub mod error;
pub mod locate;
pub mod numbering;
pub mod package;
pub mod relationships;
pub mod renderer;
pub mod styles;
pub mod template;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::OoxmlArchive;
pub use body::{
    Body, BodyElement, Container, Hyperlink, NumberingRef, Paragraph, ParagraphChild, Run,
    RunContent, RunProperties, Table, TableCell, TableRow,
};
pub use config::{Config, CONFIG_FILE_NAME};
pub use convert::{to_docx_stream, Converter};
pub use error::{OoxmlError, Result};
pub use locate::find_paragraph_containing_text;
pub use numbering::{AbstractNum, Numbering, NumberingInstance};
pub use package::{DocumentPackage, PackageBuffer};
pub use relationships::{Relationship, Relationships};
pub use renderer::{DocxRenderer, Renderer};
pub use styles::{DocumentStyles, Style, StyleIssue, StyleSheet, StyleType};
pub use template::{
    DirectoryResolver, EmbeddedResources, ResolverChain, ResourceResolver, TemplateLoader,
    STANDARD_PLACEHOLDER, STANDARD_TEMPLATE,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
