//! Document root

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::inline::plain_text;

/// A parsed Markdown document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level block
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Whether the document has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of top-level blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Text of the first top-level level-1 heading, if any
    pub fn title(&self) -> Option<String> {
        self.blocks.iter().find_map(|block| match block {
            Block::Heading(h) if h.level == 1 => {
                let text = plain_text(&h.text);
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            _ => None,
        })
    }
}
