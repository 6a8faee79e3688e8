//! Typed model of the document body
//!
//! The renderer builds paragraphs, runs and tables through this model and the
//! locator searches it. Anything the model does not understand is carried as
//! a raw [`XmlElement`] and written back untouched.

use crate::xml::{XmlElement, XmlNode};

/// Usable text width of the standard template (A4, 1" margins), in twips
pub const TEXT_WIDTH_TWIPS: u32 = 9026;

const P_PR_ORDER: &[&str] = &[
    "pStyle",
    "keepNext",
    "keepLines",
    "pageBreakBefore",
    "framePr",
    "widowControl",
    "numPr",
    "suppressLineNumbers",
    "pBdr",
    "shd",
    "tabs",
    "suppressAutoHyphens",
    "kinsoku",
    "wordWrap",
    "overflowPunct",
    "topLinePunct",
    "autoSpaceDE",
    "autoSpaceDN",
    "bidi",
    "adjustRightInd",
    "snapToGrid",
    "spacing",
    "ind",
    "contextualSpacing",
    "mirrorIndents",
    "suppressOverlap",
    "jc",
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

const R_PR_ORDER: &[&str] = &[
    "rStyle",
    "rFonts",
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

const TBL_PR_ORDER: &[&str] = &[
    "tblStyle",
    "tblpPr",
    "tblOverlap",
    "bidiVisual",
    "tblStyleRowBandSize",
    "tblStyleColBandSize",
    "tblW",
    "jc",
    "tblCellSpacing",
    "tblInd",
    "tblBorders",
    "shd",
    "tblLayout",
    "tblCellMar",
    "tblLook",
];

const TR_PR_ORDER: &[&str] = &[
    "cnfStyle",
    "divId",
    "gridBefore",
    "gridAfter",
    "wBefore",
    "wAfter",
    "cantSplit",
    "trHeight",
    "tblHeader",
    "tblCellSpacing",
    "jc",
    "hidden",
];

/// Sort property children into schema order; unknown names go last
fn sort_by_schema(children: &mut [XmlElement], order: &[&str]) {
    children.sort_by_key(|e| {
        order
            .iter()
            .position(|name| *name == e.local_name())
            .unwrap_or(order.len())
    });
}

fn val(element: &XmlElement) -> Option<String> {
    element.attr("val").map(str::to_string)
}

/// OOXML on/off property: present means on unless `w:val` says otherwise
fn is_on(element: &XmlElement) -> bool {
    !matches!(element.attr("val"), Some("0" | "false" | "off"))
}

fn property_element(name: &str, children: Vec<XmlElement>) -> Option<XmlElement> {
    if children.is_empty() {
        return None;
    }
    let mut element = XmlElement::new(name);
    element.children = children.into_iter().map(XmlNode::Element).collect();
    Some(element)
}

// ============================================================================
// Body
// ============================================================================

/// A block-level child of `w:body`
#[derive(Debug, Clone, PartialEq)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
    /// Block-level content control or custom XML wrapping body content
    Container(Container),
    /// Anything else (`w:sectPr`, bookmarks), kept verbatim
    Raw(XmlElement),
}

impl BodyElement {
    /// Classify a parsed element
    pub fn from_element(element: XmlElement) -> Self {
        let name = element.local_name().to_string();
        match name.as_str() {
            "p" => BodyElement::Paragraph(Paragraph::from_element(element)),
            "tbl" => match Table::from_element(&element) {
                Some(table) => BodyElement::Table(table),
                None => BodyElement::Raw(element),
            },
            "sdt" | "customXml" => BodyElement::Container(Container::from_element(element)),
            _ => BodyElement::Raw(element),
        }
    }

    pub fn to_element(&self) -> XmlElement {
        match self {
            BodyElement::Paragraph(p) => p.to_element(),
            BodyElement::Table(t) => t.to_element(),
            BodyElement::Container(c) => c.to_element(),
            BodyElement::Raw(e) => e.clone(),
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Whether this is the body's section properties element
    pub fn is_section_properties(&self) -> bool {
        matches!(self, BodyElement::Raw(e) if e.local_name() == "sectPr")
    }
}

impl From<Paragraph> for BodyElement {
    fn from(paragraph: Paragraph) -> Self {
        BodyElement::Paragraph(paragraph)
    }
}

impl From<Table> for BodyElement {
    fn from(table: Table) -> Self {
        BodyElement::Table(table)
    }
}

/// The ordered block-level content of `w:body`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    elements: Vec<BodyElement>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the children of a parsed `w:body`
    pub fn from_nodes(nodes: Vec<XmlNode>) -> Self {
        Self {
            elements: elements_from(nodes),
        }
    }

    /// Serialize back into `w:body` children
    pub fn to_nodes(&self) -> Vec<XmlNode> {
        self.elements
            .iter()
            .map(|e| XmlNode::Element(e.to_element()))
            .collect()
    }

    pub fn elements(&self) -> &[BodyElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, element: impl Into<BodyElement>) {
        self.elements.push(element.into());
    }

    pub fn insert(&mut self, index: usize, element: impl Into<BodyElement>) {
        self.elements.insert(index, element.into());
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = BodyElement>) {
        self.elements.extend(elements);
    }

    /// Remove and return everything from `at` onwards
    pub fn split_off(&mut self, at: usize) -> Vec<BodyElement> {
        self.elements.split_off(at)
    }

    /// Remove and return the element at `index`
    pub fn remove(&mut self, index: usize) -> BodyElement {
        self.elements.remove(index)
    }

    /// Insert `elements` in order starting at `index`
    pub fn insert_all(&mut self, index: usize, elements: impl IntoIterator<Item = BodyElement>) {
        self.elements.splice(index..index, elements);
    }

    /// Remove every child element
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Trailing `w:sectPr`, if the body has one
    pub fn section_properties(&self) -> Option<&XmlElement> {
        match self.elements.last() {
            Some(BodyElement::Raw(e)) if e.local_name() == "sectPr" => Some(e),
            _ => None,
        }
    }

    /// All paragraphs in document order, including those inside tables
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs(&self.elements, &mut out);
        out
    }

    /// First paragraph in document order holding a text node that contains `needle`
    ///
    /// Each `w:t` is tested on its own: text split across runs does not match.
    pub fn find_paragraph_containing(&self, needle: &str) -> Option<&Paragraph> {
        find_in(&self.elements, needle)
    }

    /// Index of the first top-level block holding a paragraph that contains `needle`
    ///
    /// The block is either the paragraph itself or the content control around
    /// it. Paragraphs inside tables are not considered.
    pub fn position_of_paragraph_containing(&self, needle: &str) -> Option<usize> {
        self.elements.iter().position(|e| match e {
            BodyElement::Paragraph(p) => p.contains_text(needle),
            BodyElement::Container(c) => find_in(&c.content, needle).is_some(),
            BodyElement::Table(_) | BodyElement::Raw(_) => false,
        })
    }

    /// Highest `w:id` carried by a bookmark anywhere in the body
    pub fn max_bookmark_id(&self) -> Option<u32> {
        self.elements
            .iter()
            .filter_map(|e| max_bookmark_id_in(&e.to_element()))
            .max()
    }
}

fn max_bookmark_id_in(element: &XmlElement) -> Option<u32> {
    let own = match element.local_name() {
        "bookmarkStart" | "bookmarkEnd" => element.attr("id").and_then(|v| v.parse().ok()),
        _ => None,
    };
    element
        .elements()
        .filter_map(max_bookmark_id_in)
        .chain(own)
        .max()
}

fn elements_from(nodes: Vec<XmlNode>) -> Vec<BodyElement> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            XmlNode::Element(e) => Some(BodyElement::from_element(e)),
            XmlNode::Text(_) => None,
        })
        .collect()
}

fn collect_paragraphs<'b>(elements: &'b [BodyElement], out: &mut Vec<&'b Paragraph>) {
    for element in elements {
        match element {
            BodyElement::Paragraph(p) => out.push(p),
            BodyElement::Table(t) => {
                for cell in t.rows.iter().flat_map(|r| &r.cells) {
                    collect_paragraphs(&cell.content, out);
                }
            }
            BodyElement::Container(c) => collect_paragraphs(&c.content, out),
            BodyElement::Raw(_) => {}
        }
    }
}

fn find_in<'b>(elements: &'b [BodyElement], needle: &str) -> Option<&'b Paragraph> {
    elements.iter().find_map(|element| match element {
        BodyElement::Paragraph(p) if p.contains_text(needle) => Some(p),
        BodyElement::Table(t) => t
            .rows
            .iter()
            .flat_map(|r| &r.cells)
            .find_map(|cell| find_in(&cell.content, needle)),
        BodyElement::Container(c) => find_in(&c.content, needle),
        _ => None,
    })
}

/// Block-level `w:sdt` or `w:customXml` with its content parsed as body elements
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// The wrapper with its block content taken out
    pub element: XmlElement,
    pub content: Vec<BodyElement>,
}

impl Container {
    fn from_element(mut element: XmlElement) -> Self {
        let nodes = if element.local_name() == "sdt" {
            element
                .child_mut("sdtContent")
                .map(|slot| std::mem::take(&mut slot.children))
                .unwrap_or_default()
        } else {
            // customXml: properties stay on the wrapper, the rest is content
            let (properties, content): (Vec<XmlNode>, Vec<XmlNode>) =
                std::mem::take(&mut element.children)
                    .into_iter()
                    .partition(|node| matches!(node, XmlNode::Element(e) if e.local_name() == "customXmlPr"));
            element.children = properties;
            content
        };
        Self {
            element,
            content: elements_from(nodes),
        }
    }

    fn to_element(&self) -> XmlElement {
        let mut element = self.element.clone();
        let nodes: Vec<XmlNode> = self
            .content
            .iter()
            .map(|e| XmlNode::Element(e.to_element()))
            .collect();
        if element.local_name() != "sdt" {
            element.children.extend(nodes);
            return element;
        }
        match element.child_mut("sdtContent") {
            Some(slot) => slot.children = nodes,
            None => {
                let mut slot = XmlElement::new("w:sdtContent");
                slot.children = nodes;
                element.children.push(XmlNode::Element(slot));
            }
        }
        element
    }
}

// ============================================================================
// Paragraphs
// ============================================================================

/// A `w:p` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    /// Attributes of `w:p` itself (revision ids and the like)
    pub attributes: Vec<(String, String)>,
    pub properties: ParagraphProperties,
    pub children: Vec<ParagraphChild>,
}

/// Paragraph properties (`w:pPr`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParagraphProperties {
    pub style_id: Option<String>,
    pub numbering: Option<NumberingRef>,
    /// `w:jc` value (`left`, `center`, `right`, `both`)
    pub justification: Option<String>,
    /// Remaining property elements, kept verbatim
    pub extra: Vec<XmlElement>,
}

/// A paragraph's list membership (`w:numPr`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u8,
}

/// Inline-level child of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphChild {
    Run(Run),
    Hyperlink(Hyperlink),
    Raw(XmlElement),
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty paragraph with a style
    pub fn with_style(style_id: impl Into<String>) -> Self {
        let mut paragraph = Self::new();
        paragraph.properties.style_id = Some(style_id.into());
        paragraph
    }

    pub fn style_id(&self) -> Option<&str> {
        self.properties.style_id.as_deref()
    }

    pub fn push(&mut self, child: ParagraphChild) {
        self.children.push(child);
    }

    pub fn push_run(&mut self, run: Run) {
        self.children.push(ParagraphChild::Run(run));
    }

    /// Runs in order, including those inside hyperlinks
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().flat_map(|child| match child {
            ParagraphChild::Run(run) => std::slice::from_ref(run).iter(),
            ParagraphChild::Hyperlink(link) => link.runs.iter(),
            ParagraphChild::Raw(_) => Default::default(),
        })
    }

    /// Plain text of every run, including runs inside raw inline wrappers
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                ParagraphChild::Run(run) => out.push_str(&run.text()),
                ParagraphChild::Hyperlink(link) => link.runs.iter().for_each(|r| out.push_str(&r.text())),
                ParagraphChild::Raw(raw) => push_raw_text(raw, &mut out),
            }
        }
        out
    }

    /// Whether any single text node contains `needle`
    ///
    /// Text inside raw inline wrappers (`w:ins`, inline `w:sdt`, `w:smartTag`,
    /// `w:fldSimple`) is searched too.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.children.iter().any(|child| match child {
            ParagraphChild::Run(run) => run.texts().any(|t| t.contains(needle)),
            ParagraphChild::Hyperlink(link) => link
                .runs
                .iter()
                .any(|run| run.texts().any(|t| t.contains(needle))),
            ParagraphChild::Raw(raw) => raw_text_contains(raw, needle),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn from_element(element: XmlElement) -> Self {
        let mut paragraph = Paragraph {
            attributes: element.attributes,
            ..Self::default()
        };

        for node in element.children {
            let XmlNode::Element(child) = node else {
                continue;
            };
            if child.local_name() == "pPr" {
                paragraph.properties = ParagraphProperties::from_element(child);
            } else if child.local_name() == "r" {
                paragraph.push(ParagraphChild::Run(Run::from_element(child)));
            } else if child.local_name() == "hyperlink" {
                let link = Hyperlink::from_element(&child)
                    .map_or(ParagraphChild::Raw(child), ParagraphChild::Hyperlink);
                paragraph.push(link);
            } else {
                paragraph.push(ParagraphChild::Raw(child));
            }
        }

        paragraph
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:p");
        element.attributes = self.attributes.clone();
        if let Some(properties) = self.properties.to_element() {
            element.children.push(XmlNode::Element(properties));
        }
        for child in &self.children {
            let child = match child {
                ParagraphChild::Run(run) => run.to_element(),
                ParagraphChild::Hyperlink(link) => link.to_element(),
                ParagraphChild::Raw(raw) => raw.clone(),
            };
            element.children.push(XmlNode::Element(child));
        }
        element
    }
}

impl ParagraphProperties {
    fn from_element(element: XmlElement) -> Self {
        let mut properties = Self::default();
        for child in element.children.into_iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        }) {
            let name = child.local_name().to_string();
            match name.as_str() {
                "pStyle" => properties.style_id = val(&child),
                "jc" => properties.justification = val(&child),
                "numPr" => match NumberingRef::from_element(&child) {
                    Some(numbering) => properties.numbering = Some(numbering),
                    None => properties.extra.push(child),
                },
                _ => properties.extra.push(child),
            }
        }
        properties
    }

    fn to_element(&self) -> Option<XmlElement> {
        let mut children = Vec::new();
        if let Some(style) = &self.style_id {
            children.push(XmlElement::new("w:pStyle").with_attr("w:val", style));
        }
        if let Some(numbering) = &self.numbering {
            children.push(numbering.to_element());
        }
        if let Some(jc) = &self.justification {
            children.push(XmlElement::new("w:jc").with_attr("w:val", jc));
        }
        children.extend(self.extra.iter().cloned());
        sort_by_schema(&mut children, P_PR_ORDER);
        property_element("w:pPr", children)
    }
}

impl NumberingRef {
    fn from_element(element: &XmlElement) -> Option<Self> {
        let num_id = element.child("numId")?.attr("val")?.parse().ok()?;
        let level = element
            .child("ilvl")
            .and_then(|e| e.attr("val"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Some(Self { num_id, level })
    }

    fn to_element(self) -> XmlElement {
        XmlElement::new("w:numPr")
            .with_child(XmlElement::new("w:ilvl").with_attr("w:val", self.level.to_string()))
            .with_child(XmlElement::new("w:numId").with_attr("w:val", self.num_id.to_string()))
    }
}

// ============================================================================
// Runs
// ============================================================================

/// A `w:r` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub attributes: Vec<(String, String)>,
    pub properties: RunProperties,
    pub content: Vec<RunContent>,
}

/// Run formatting (`w:rPr`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunProperties {
    pub style_id: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    /// Font applied to ASCII, high ANSI and complex script text
    pub font: Option<String>,
    /// `superscript` or `subscript`
    pub vert_align: Option<String>,
    pub extra: Vec<XmlElement>,
}

/// Content of a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    Break,
    Tab,
    Raw(XmlElement),
}

impl Run {
    /// Create a run holding one text node
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: vec![RunContent::Text(text.into())],
            ..Self::default()
        }
    }

    /// Create a run holding a line break
    pub fn line_break() -> Self {
        Self {
            content: vec![RunContent::Break],
            ..Self::default()
        }
    }

    /// Builder: replace the formatting
    pub fn with_properties(mut self, properties: RunProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Text nodes of this run
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|c| match c {
            RunContent::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// Plain text, with tabs and breaks as `\t` and `\n`
    pub fn text(&self) -> String {
        let mut out = String::new();
        for content in &self.content {
            match content {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Tab => out.push('\t'),
                RunContent::Break => out.push('\n'),
                RunContent::Raw(_) => {}
            }
        }
        out
    }

    /// Whether the run holds text only
    pub fn is_plain_text(&self) -> bool {
        self.content.iter().all(|c| matches!(c, RunContent::Text(_)))
    }

    fn from_element(element: XmlElement) -> Self {
        let mut run = Run {
            attributes: element.attributes,
            ..Self::default()
        };

        for node in element.children {
            let XmlNode::Element(child) = node else {
                continue;
            };
            let name = child.local_name().to_string();
            let content = match name.as_str() {
                "rPr" => {
                    run.properties = RunProperties::from_element(child);
                    continue;
                }
                "t" => RunContent::Text(child.text()),
                "tab" => RunContent::Tab,
                "br" if child.attr("type").is_none() => RunContent::Break,
                _ => RunContent::Raw(child),
            };
            run.content.push(content);
        }

        run
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:r");
        element.attributes = self.attributes.clone();
        if let Some(properties) = self.properties.to_element() {
            element.children.push(XmlNode::Element(properties));
        }
        for content in &self.content {
            let child = match content {
                RunContent::Text(text) => text_element(text),
                RunContent::Break => XmlElement::new("w:br"),
                RunContent::Tab => XmlElement::new("w:tab"),
                RunContent::Raw(raw) => raw.clone(),
            };
            element.children.push(XmlNode::Element(child));
        }
        element
    }
}

/// Whether a `w:t` below `element` contains `needle`
fn raw_text_contains(element: &XmlElement, needle: &str) -> bool {
    if element.local_name() == "t" {
        return element.text().contains(needle);
    }
    element.elements().any(|e| raw_text_contains(e, needle))
}

fn push_raw_text(element: &XmlElement, out: &mut String) {
    if element.local_name() == "t" {
        out.push_str(&element.text());
        return;
    }
    for child in element.elements() {
        push_raw_text(child, out);
    }
}

fn text_element(text: &str) -> XmlElement {
    let mut element = XmlElement::new("w:t");
    let needs_preserve = text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ");
    if needs_preserve {
        element.set_attr("xml:space", "preserve");
    }
    if !text.is_empty() {
        element.children.push(XmlNode::Text(text.to_string()));
    }
    element
}

impl RunProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn from_element(element: XmlElement) -> Self {
        let mut properties = Self::default();
        for child in element.children.into_iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        }) {
            let name = child.local_name().to_string();
            match name.as_str() {
                "rStyle" => properties.style_id = val(&child),
                "b" => properties.bold = is_on(&child),
                "i" => properties.italic = is_on(&child),
                "strike" => properties.strike = is_on(&child),
                "vertAlign" => properties.vert_align = val(&child),
                _ => properties.extra.push(child),
            }
        }
        properties
    }

    fn to_element(&self) -> Option<XmlElement> {
        let mut children = Vec::new();
        if let Some(style) = &self.style_id {
            children.push(XmlElement::new("w:rStyle").with_attr("w:val", style));
        }
        if let Some(font) = &self.font {
            children.push(
                XmlElement::new("w:rFonts")
                    .with_attr("w:ascii", font)
                    .with_attr("w:hAnsi", font)
                    .with_attr("w:cs", font),
            );
        }
        for (on, name) in [(self.bold, "w:b"), (self.italic, "w:i"), (self.strike, "w:strike")] {
            if on {
                children.push(XmlElement::new(name));
            }
        }
        if let Some(align) = &self.vert_align {
            children.push(XmlElement::new("w:vertAlign").with_attr("w:val", align));
        }
        children.extend(
            self.extra
                .iter()
                .filter(|e| self.font.is_none() || e.local_name() != "rFonts")
                .cloned(),
        );
        sort_by_schema(&mut children, R_PR_ORDER);
        property_element("w:rPr", children)
    }
}

// ============================================================================
// Hyperlinks
// ============================================================================

/// A `w:hyperlink` holding runs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hyperlink {
    /// External target, as a relationship id
    pub rel_id: Option<String>,
    /// Internal target, as a bookmark name
    pub anchor: Option<String>,
    pub tooltip: Option<String>,
    pub runs: Vec<Run>,
}

impl Hyperlink {
    /// Link to an external relationship
    pub fn external(rel_id: impl Into<String>) -> Self {
        Self {
            rel_id: Some(rel_id.into()),
            ..Self::default()
        }
    }

    /// Link to a bookmark in the same document
    pub fn internal(anchor: impl Into<String>) -> Self {
        Self {
            anchor: Some(anchor.into()),
            ..Self::default()
        }
    }

    /// Parse a hyperlink whose children are all runs
    fn from_element(element: &XmlElement) -> Option<Self> {
        let mut link = Hyperlink::default();
        for (name, value) in &element.attributes {
            match name.as_str() {
                "r:id" => link.rel_id = Some(value.clone()),
                "w:anchor" => link.anchor = Some(value.clone()),
                "w:tooltip" => link.tooltip = Some(value.clone()),
                "w:history" => {}
                _ => return None,
            }
        }
        for child in element.elements() {
            if child.local_name() != "r" {
                return None;
            }
            link.runs.push(Run::from_element(child.clone()));
        }
        Some(link)
    }

    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:hyperlink");
        if let Some(id) = &self.rel_id {
            element.set_attr("r:id", id);
        }
        if let Some(anchor) = &self.anchor {
            element.set_attr("w:anchor", anchor);
        }
        if let Some(tooltip) = &self.tooltip {
            element.set_attr("w:tooltip", tooltip);
        }
        element.set_attr("w:history", "1");
        for run in &self.runs {
            element.children.push(XmlNode::Element(run.to_element()));
        }
        element
    }
}

// ============================================================================
// Tables
// ============================================================================

/// A `w:tbl` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub style_id: Option<String>,
    /// Remaining `w:tblPr` children
    pub properties: Vec<XmlElement>,
    /// Column widths in twips
    pub grid: Vec<u32>,
    pub rows: Vec<TableRow>,
}

/// A `w:tr` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    /// Repeat as header row on each page
    pub is_header: bool,
    /// Remaining `w:trPr` children
    pub properties: Vec<XmlElement>,
    pub cells: Vec<TableCell>,
}

/// A `w:tc` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    /// `w:tcPr` children
    pub properties: Vec<XmlElement>,
    pub content: Vec<BodyElement>,
}

impl Table {
    /// Create an auto-width table with evenly sized columns
    pub fn new(style_id: Option<String>, columns: usize) -> Self {
        let width = TEXT_WIDTH_TWIPS / columns.max(1) as u32;
        Self {
            style_id,
            properties: vec![
                XmlElement::new("w:tblW")
                    .with_attr("w:w", "0")
                    .with_attr("w:type", "auto"),
                XmlElement::new("w:tblLook")
                    .with_attr("w:val", "04A0")
                    .with_attr("w:firstRow", "1")
                    .with_attr("w:lastRow", "0")
                    .with_attr("w:firstColumn", "1")
                    .with_attr("w:lastColumn", "0")
                    .with_attr("w:noHBand", "0")
                    .with_attr("w:noVBand", "1"),
            ],
            grid: vec![width; columns],
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.grid.len()
    }

    /// Parse a table; `None` when it holds content the model does not cover
    fn from_element(element: &XmlElement) -> Option<Self> {
        let mut table = Table::default();
        for child in element.elements() {
            match child.local_name() {
                "tblPr" => {
                    for property in child.elements() {
                        if property.local_name() == "tblStyle" {
                            table.style_id = val(property);
                        } else {
                            table.properties.push(property.clone());
                        }
                    }
                }
                "tblGrid" => {
                    table.grid = child
                        .elements()
                        .filter_map(|col| col.attr("w").and_then(|w| w.parse().ok()))
                        .collect();
                }
                "tr" => table.rows.push(TableRow::from_element(child)?),
                _ => return None,
            }
        }
        Some(table)
    }

    fn to_element(&self) -> XmlElement {
        let mut properties = Vec::new();
        if let Some(style) = &self.style_id {
            properties.push(XmlElement::new("w:tblStyle").with_attr("w:val", style));
        }
        properties.extend(self.properties.iter().cloned());
        sort_by_schema(&mut properties, TBL_PR_ORDER);

        let mut element = XmlElement::new("w:tbl");
        let tbl_pr = property_element("w:tblPr", properties)
            .unwrap_or_else(|| XmlElement::new("w:tblPr"));
        element.children.push(XmlNode::Element(tbl_pr));

        let mut grid = XmlElement::new("w:tblGrid");
        for width in &self.grid {
            grid = grid.with_child(XmlElement::new("w:gridCol").with_attr("w:w", width.to_string()));
        }
        element.children.push(XmlNode::Element(grid));

        for row in &self.rows {
            element.children.push(XmlNode::Element(row.to_element()));
        }
        element
    }
}

impl TableRow {
    fn from_element(element: &XmlElement) -> Option<Self> {
        let mut row = TableRow::default();
        for child in element.elements() {
            match child.local_name() {
                "trPr" => {
                    for property in child.elements() {
                        if property.local_name() == "tblHeader" {
                            row.is_header = is_on(property);
                        } else {
                            row.properties.push(property.clone());
                        }
                    }
                }
                "tc" => row.cells.push(TableCell::from_element(child)),
                _ => return None,
            }
        }
        Some(row)
    }

    fn to_element(&self) -> XmlElement {
        let mut properties = self.properties.clone();
        if self.is_header {
            properties.push(XmlElement::new("w:tblHeader"));
        }
        sort_by_schema(&mut properties, TR_PR_ORDER);

        let mut element = XmlElement::new("w:tr");
        if let Some(tr_pr) = property_element("w:trPr", properties) {
            element.children.push(XmlNode::Element(tr_pr));
        }
        for cell in &self.cells {
            element.children.push(XmlNode::Element(cell.to_element()));
        }
        element
    }
}

impl TableCell {
    /// A cell holding one paragraph
    pub fn with_paragraph(paragraph: Paragraph) -> Self {
        Self {
            properties: Vec::new(),
            content: vec![BodyElement::Paragraph(paragraph)],
        }
    }

    fn from_element(element: &XmlElement) -> Self {
        let mut cell = TableCell::default();
        for child in element.elements() {
            if child.local_name() == "tcPr" {
                cell.properties = child.elements().cloned().collect();
            } else {
                cell.content.push(BodyElement::from_element(child.clone()));
            }
        }
        cell
    }

    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:tc");
        if let Some(tc_pr) = property_element("w:tcPr", self.properties.clone()) {
            element.children.push(XmlNode::Element(tc_pr));
        }
        for content in &self.content {
            element.children.push(XmlNode::Element(content.to_element()));
        }
        // A cell must end with a paragraph
        if !matches!(self.content.last(), Some(BodyElement::Paragraph(_))) {
            element.children.push(XmlNode::Element(XmlElement::new("w:p")));
        }
        element
    }
}
