//! mdocx-core - Markdown parsing pipeline
//!
//! Parses Markdown into the `mdocx_ast` document tree under a configurable set
//! of extensions.
//!
//! # Example
//!
//! ```
//! use mdocx_core::{parse_with_options, PipelineOptions};
//!
//! let doc = parse_with_options("| a |\n|---|\n| 1 |\n", &PipelineOptions::default()).unwrap();
//! assert_eq!(doc.len(), 1);
//! ```

pub mod error;
pub mod options;
pub mod parser;

pub use error::{ParseError, Result};
pub use options::PipelineOptions;
pub use parser::{parse, parse_with_options, MAX_NESTING_DEPTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
