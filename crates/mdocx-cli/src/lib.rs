//! mdocx CLI - Command-line interface library
//!
//! This library provides the CLI functionality for mdocx:
//! - Convert: Markdown to DOCX through a template
//! - Template: write the standard template out for customisation
//!
//! # Library Usage
//!
//! ```ignore
//! use mdocx_cli::{convert_command, ConvertOptions};
//!
//! let written = convert_command(&ConvertOptions::new("notes.md"))?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert with the standard template
//! mdocx convert notes.md --output notes.docx
//!
//! # Fill the {{content}} paragraph of a customised template
//! mdocx convert notes.md --template-dir templates --template corporate.docx --placeholder '{{content}}'
//!
//! # Write the standard template to start customising it
//! mdocx template --output corporate.docx
//! ```

pub mod app;

pub use app::{convert_command, init_logging, run_cli, template_command, ConvertOptions};
