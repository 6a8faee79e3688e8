//! Error types for Markdown parsing

use thiserror::Error;

/// Errors that can occur while building the document tree
#[derive(Error, Debug)]
pub enum ParseError {
    /// Container nesting exceeded the supported depth
    #[error("Markdown nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },

    /// The event stream closed a container that was never opened
    #[error("Unbalanced Markdown structure: {0}")]
    Unbalanced(String),
}

/// Result type alias for parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
