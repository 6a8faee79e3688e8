//! `mdocx.toml` configuration
//!
//! ```toml
//! [styles]
//! paragraph = "BodyText"
//! code_font = "Fira Code"
//!
//! [pipeline]
//! footnotes = true
//! ```

use std::path::Path;

use mdocx_core::PipelineOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::styles::DocumentStyles;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "mdocx.toml";

/// Conversion settings read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub styles: DocumentStyles,
    pub pipeline: PipelineOptions,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}
