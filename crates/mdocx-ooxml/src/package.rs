//! In-memory package buffer and the open document package
//!
//! A [`PackageBuffer`] owns the bytes of one DOCX package. Opening it yields a
//! [`DocumentPackage`] that mutably borrows the buffer, so at most one package
//! is bound to a buffer at a time. Edits live in the package until
//! [`DocumentPackage::close`] flushes them; dropping a package without closing
//! it releases the buffer untouched.

use std::io::Cursor;

use tracing::debug;

use crate::archive::OoxmlArchive;
use crate::body::Body;
use crate::error::{OoxmlError, Result};
use crate::numbering::Numbering;
use crate::relationships::Relationships;
use crate::styles::StyleSheet;
use crate::xml::{self, XmlElement, XmlNode, R_NS, W_NS};

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Numbering definitions part
pub const NUMBERING_PART: &str = "word/numbering.xml";
/// Style definitions part
pub const STYLES_PART: &str = "word/styles.xml";
/// Relationships of the main document part
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
/// Core properties part (title, creator)
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Owned bytes of a DOCX package
#[derive(Debug, Clone, Default)]
pub struct PackageBuffer {
    stream: Cursor<Vec<u8>>,
}

impl PackageBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding a copy of `bytes`
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: Cursor::new(bytes.into()),
        }
    }

    /// Open the package held in this buffer for editing
    pub fn open(&mut self) -> Result<DocumentPackage<'_>> {
        DocumentPackage::open(self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.stream.get_ref()
    }

    pub fn len(&self) -> usize {
        self.stream.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.get_ref().is_empty()
    }

    /// Current stream position
    pub fn position(&self) -> u64 {
        self.stream.position()
    }

    /// Check that the buffer holds a ZIP package
    pub fn verify(&self) -> Result<()> {
        if self.as_bytes().starts_with(ZIP_MAGIC) {
            Ok(())
        } else {
            Err(OoxmlError::StreamState(format!(
                "buffer of {} bytes does not start with a ZIP header",
                self.len()
            )))
        }
    }

    /// Verify the package and hand out the stream rewound to offset 0
    pub fn into_stream(mut self) -> Result<Cursor<Vec<u8>>> {
        self.verify()?;
        self.stream.set_position(0);
        Ok(self.stream)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.stream.into_inner()
    }

    /// Replace the contents with freshly written bytes, positioned at the end
    fn replace(&mut self, bytes: Vec<u8>) {
        let end = bytes.len() as u64;
        self.stream = Cursor::new(bytes);
        self.stream.set_position(end);
    }
}

/// An opened, editable WordprocessingML package bound to a buffer
#[derive(Debug)]
pub struct DocumentPackage<'a> {
    buffer: &'a mut PackageBuffer,
    archive: OoxmlArchive,
    /// `w:document` with its body children moved into `body`
    root: XmlElement,
    body: Body,
    numbering: Option<Numbering>,
    relationships: Relationships,
    title: Option<String>,
}

impl<'a> DocumentPackage<'a> {
    /// Open the package held in `buffer`
    ///
    /// Fails with [`OoxmlError::MalformedTemplate`] when the bytes are not a
    /// ZIP package or the main part has no body.
    pub fn open(buffer: &'a mut PackageBuffer) -> Result<Self> {
        let archive = OoxmlArchive::from_reader(Cursor::new(buffer.as_bytes()))
            .map_err(|e| malformed("package is not a readable ZIP archive", e))?;

        let document_xml = archive.get(DOCUMENT_PART).ok_or_else(|| {
            OoxmlError::MalformedTemplate(format!("package has no {DOCUMENT_PART}"))
        })?;
        let mut root = xml::parse(document_xml).map_err(|e| malformed(DOCUMENT_PART, e))?;
        if root.local_name() != "document" {
            return Err(OoxmlError::MalformedTemplate(format!(
                "{DOCUMENT_PART} has root <{}>",
                root.name
            )));
        }
        let body_element = root.child_mut("body").ok_or_else(|| {
            OoxmlError::MalformedTemplate(format!("{DOCUMENT_PART} has no body"))
        })?;
        let body = Body::from_nodes(std::mem::take(&mut body_element.children));

        let numbering = archive
            .get(NUMBERING_PART)
            .map(Numbering::parse)
            .transpose()
            .map_err(|e| malformed(NUMBERING_PART, e))?;
        let relationships = archive
            .get(DOCUMENT_RELS_PART)
            .map(Relationships::parse)
            .transpose()
            .map_err(|e| malformed(DOCUMENT_RELS_PART, e))?
            .unwrap_or_default();

        debug!(
            parts = archive.len(),
            body_elements = body.len(),
            has_numbering = numbering.is_some(),
            "Opened document package"
        );

        Ok(Self {
            buffer,
            archive,
            root,
            body,
            numbering,
            relationships,
            title: None,
        })
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Numbering part, when the template has one
    pub fn numbering(&self) -> Option<&Numbering> {
        self.numbering.as_ref()
    }

    pub fn numbering_mut(&mut self) -> Option<&mut Numbering> {
        self.numbering.as_mut()
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.relationships
    }

    /// Set the document title written to the core properties on close
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Styles defined by the package, when it has a styles part
    pub fn style_sheet(&self) -> Result<Option<StyleSheet>> {
        self.archive.get(STYLES_PART).map(StyleSheet::parse).transpose()
    }

    /// Reset to an empty but styled document
    ///
    /// Removes every body child (the trailing section properties included)
    /// and every numbering instance. Abstract numbering definitions, styles
    /// and all other parts are left alone. Calling it twice is the same as
    /// calling it once.
    pub fn clean(&mut self) {
        let removed = self.body.len();
        self.body.clear();
        if let Some(numbering) = self.numbering.as_mut() {
            numbering.clear_instances();
        }
        debug!(removed, "Cleaned document package");
    }

    /// Flush every edited part into the bound buffer and release it
    pub fn close(self) -> Result<()> {
        let DocumentPackage {
            buffer,
            mut archive,
            mut root,
            body,
            numbering,
            relationships,
            title,
        } = self;

        if let Some(body_element) = root.child_mut("body") {
            body_element.children = body.to_nodes();
        }
        ensure_namespace(&mut root, "w", W_NS);
        ensure_namespace(&mut root, "r", R_NS);
        archive.set_string(DOCUMENT_PART, root.to_part_xml());

        if let Some(numbering) = &numbering {
            archive.set_string(NUMBERING_PART, numbering.to_xml());
        }
        if !relationships.is_empty() || archive.contains(DOCUMENT_RELS_PART) {
            archive.set_string(DOCUMENT_RELS_PART, relationships.to_xml());
        }
        if let Some(title) = &title {
            write_title(&mut archive, title)?;
        }

        let mut out = Cursor::new(Vec::new());
        archive.write_to(&mut out)?;
        let bytes = out.into_inner();
        debug!(bytes = bytes.len(), "Flushed document package");
        buffer.replace(bytes);
        Ok(())
    }
}

fn malformed(context: &str, error: impl std::fmt::Display) -> OoxmlError {
    OoxmlError::MalformedTemplate(format!("{context}: {error}"))
}

fn ensure_namespace(root: &mut XmlElement, prefix: &str, uri: &str) {
    let name = format!("xmlns:{prefix}");
    if !root.attributes.iter().any(|(n, _)| *n == name) {
        root.attributes.push((name, uri.to_string()));
    }
}

/// Update `dc:title` in the core properties part, if the package has one
fn write_title(archive: &mut OoxmlArchive, title: &str) -> Result<()> {
    let Some(core) = archive.get(CORE_PROPERTIES_PART) else {
        return Ok(());
    };
    let mut root = xml::parse(core)?;

    match root.child_mut("title") {
        Some(element) => element.children = vec![XmlNode::Text(title.to_string())],
        None => {
            ensure_namespace(&mut root, "dc", DC_NS);
            root.children
                .push(XmlNode::Element(XmlElement::new("dc:title").with_text(title)));
        }
    }

    archive.set_string(CORE_PROPERTIES_PART, root.to_part_xml());
    Ok(())
}
