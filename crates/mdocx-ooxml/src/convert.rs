//! Markdown to DOCX conversion
//!
//! [`Converter`] ties the pieces together: it loads a fresh copy of the
//! template, resets it, parses the Markdown, lets the renderer fill the body
//! and hands back the flushed package as a rewound stream.
//!
//! ```no_run
//! use mdocx_ooxml::Converter;
//!
//! let stream = Converter::new().convert("# Report\n\nHello *world*.")?;
//! std::fs::write("report.docx", stream.into_inner())?;
//! # Ok::<(), mdocx_ooxml::OoxmlError>(())
//! ```

use std::io::Cursor;
use std::path::Path;

use mdocx_core::PipelineOptions;
use tracing::{info, warn};

use crate::body::BodyElement;
use crate::error::Result;
use crate::renderer::{DocxRenderer, Renderer};
use crate::styles::DocumentStyles;
use crate::template::{TemplateLoader, STANDARD_TEMPLATE};

/// Converts Markdown into template-backed DOCX packages
///
/// Every conversion works on its own copy of the template, so one converter
/// can be shared between threads.
pub struct Converter {
    loader: TemplateLoader,
    template: String,
    renderer: Box<dyn Renderer>,
    styles: DocumentStyles,
    pipeline: PipelineOptions,
}

impl Converter {
    /// Converter using the standard template and the default renderer
    pub fn new() -> Self {
        Self {
            loader: TemplateLoader::new(),
            template: STANDARD_TEMPLATE.to_string(),
            renderer: Box::new(DocxRenderer),
            styles: DocumentStyles::default(),
            pipeline: PipelineOptions::default(),
        }
    }

    pub fn with_loader(mut self, loader: TemplateLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Name of the template resource to load
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.template = name.into();
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_styles(mut self, styles: DocumentStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineOptions) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn styles(&self) -> &DocumentStyles {
        &self.styles
    }

    pub fn pipeline(&self) -> &PipelineOptions {
        &self.pipeline
    }

    /// Convert Markdown into a complete DOCX stream positioned at offset 0
    ///
    /// The template body is cleared first, so the output holds only the
    /// rendered content (styles, numbering definitions and other parts come
    /// from the template). A renderer failure releases the package without
    /// flushing and returns the error.
    pub fn convert(&self, markdown: &str) -> Result<Cursor<Vec<u8>>> {
        let (buffer, _) = self.loader.open(&self.template, true, |package| {
            let document = mdocx_core::parse_with_options(markdown, &self.pipeline)?;
            self.renderer.render(package, &self.styles, &document)
        })?;
        let stream = buffer.into_stream()?;
        info!(
            template = %self.template,
            bytes = stream.get_ref().len(),
            "Converted Markdown to DOCX"
        );
        Ok(stream)
    }

    /// Convert Markdown into the template at the paragraph holding `placeholder`
    ///
    /// The template is kept as is. The first top-level paragraph containing
    /// `placeholder` is replaced by the rendered content; everything after it
    /// stays after the content. When no paragraph matches, the content is
    /// appended at the end of the body, before its section properties.
    pub fn convert_at_placeholder(
        &self,
        markdown: &str,
        placeholder: &str,
    ) -> Result<Cursor<Vec<u8>>> {
        let (buffer, found) = self.loader.open(&self.template, false, |package| {
            let document = mdocx_core::parse_with_options(markdown, &self.pipeline)?;

            let body = package.body_mut();
            let (at, found) = match body.position_of_paragraph_containing(placeholder) {
                Some(index) => {
                    body.remove(index);
                    (index, true)
                }
                None => {
                    warn!(placeholder, "Placeholder not found; appending to the body");
                    let keep = body
                        .elements()
                        .last()
                        .is_some_and(BodyElement::is_section_properties);
                    let at = if keep { body.len() - 1 } else { body.len() };
                    (at, false)
                }
            };

            // Rendered blocks land at the end of the body; move them into place
            let before = package.body().len();
            self.renderer.render(package, &self.styles, &document)?;
            let body = package.body_mut();
            let rendered = body.split_off(before);
            body.insert_all(at, rendered);
            Ok(found)
        })?;

        let stream = buffer.into_stream()?;
        info!(
            template = %self.template,
            placeholder,
            found,
            bytes = stream.get_ref().len(),
            "Converted Markdown into template"
        );
        Ok(stream)
    }

    /// Convert Markdown and return the package bytes
    pub fn convert_to_bytes(&self, markdown: &str) -> Result<Vec<u8>> {
        Ok(self.convert(markdown)?.into_inner())
    }

    /// Convert a Markdown file and write the package to `output`
    pub fn convert_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let markdown = std::fs::read_to_string(input.as_ref())?;
        let bytes = self.convert_to_bytes(&markdown)?;
        std::fs::write(output.as_ref(), bytes)?;
        Ok(())
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("loader", &self.loader)
            .field("template", &self.template)
            .field("styles", &self.styles)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Convert Markdown with the standard template and default renderer
///
/// `None` selects the default style configuration and pipeline options.
pub fn to_docx_stream(
    markdown: &str,
    styles: Option<&DocumentStyles>,
    pipeline: Option<&PipelineOptions>,
) -> Result<Cursor<Vec<u8>>> {
    let mut converter = Converter::new();
    if let Some(styles) = styles {
        converter = converter.with_styles(styles.clone());
    }
    if let Some(pipeline) = pipeline {
        converter = converter.with_pipeline(pipeline.clone());
    }
    converter.convert(markdown)
}
