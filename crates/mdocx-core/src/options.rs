//! Markdown pipeline options
//!
//! Selects which Markdown extensions the parser recognises. The default
//! pipeline enables the emphasis extras (strikethrough) together with tables
//! and task lists.

use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};

/// Extension switches for the Markdown pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// `~~strikethrough~~`
    pub emphasis_extras: bool,
    /// GitHub-style pipe tables
    pub tables: bool,
    /// `- [ ]` / `- [x]` list items
    pub task_lists: bool,
    /// `[^label]` references and definitions
    pub footnotes: bool,
    /// Curly quotes, dashes and ellipses
    pub smart_punctuation: bool,
    /// `# Heading {#anchor}`
    pub heading_attributes: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            emphasis_extras: true,
            tables: true,
            task_lists: true,
            footnotes: false,
            smart_punctuation: false,
            heading_attributes: false,
        }
    }
}

impl PipelineOptions {
    /// CommonMark only, every extension disabled
    pub fn baseline() -> Self {
        Self {
            emphasis_extras: false,
            tables: false,
            task_lists: false,
            footnotes: false,
            smart_punctuation: false,
            heading_attributes: false,
        }
    }

    /// Every supported extension enabled
    pub fn all() -> Self {
        Self {
            emphasis_extras: true,
            tables: true,
            task_lists: true,
            footnotes: true,
            smart_punctuation: true,
            heading_attributes: true,
        }
    }

    pub(crate) fn to_cmark_options(&self) -> Options {
        let mut options = Options::empty();
        if self.emphasis_extras {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.task_lists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.heading_attributes {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}
