//! Error types for template loading, package handling and rendering

use thiserror::Error;

/// Errors that can occur while assembling a DOCX package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// No resolution context could supply the named template
    #[error("Template resource not found: {0}")]
    ResourceNotFound(String),

    /// The template bytes are not a usable WordprocessingML package
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    /// The rendering collaborator failed
    #[error("Rendering failed: {0}")]
    Rendering(String),

    /// The output buffer does not hold a complete package
    #[error("Output stream in unexpected state: {0}")]
    StreamState(String),

    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error from the Markdown pipeline
    #[error("Markdown parsing error: {0}")]
    Parse(#[from] mdocx_core::ParseError),

    /// Error reading a configuration file
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
