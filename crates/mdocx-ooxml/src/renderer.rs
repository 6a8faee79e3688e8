//! Rendering a Markdown tree into an open package
//!
//! A [`Renderer`] appends WordprocessingML for a parsed [`Document`] to the
//! body of a [`DocumentPackage`]. It may register numbering instances and
//! hyperlink relationships on the package but never closes it.
//!
//! [`DocxRenderer`] is the default mapping:
//!
//! | Markdown        | WordprocessingML                                      |
//! |-----------------|-------------------------------------------------------|
//! | heading n       | paragraph styled `HeadingN`, wrapped in a bookmark    |
//! | paragraph       | paragraph with the configured body style              |
//! | emphasis        | `w:i`, `w:b`, `w:strike` run properties               |
//! | code span       | run with the code character style and font            |
//! | code block      | one code-styled paragraph per line                    |
//! | list            | list paragraphs referencing a fresh numbering instance |
//! | table           | `w:tbl` with a header row and column alignment        |
//! | link            | `w:hyperlink` by relationship or bookmark anchor      |
//! | thematic break  | empty paragraph with a bottom border                  |

use std::collections::{HashMap, HashSet};

use mdocx_ast::{
    Alignment, Block, CodeBlock, Document, FootnoteDefinition, FormatType, Heading, Inline,
    List, ListType, Table as MdTable,
};
use tracing::{debug, warn};

use crate::body::{
    BodyElement, Hyperlink, NumberingRef, Paragraph, ParagraphChild, Run, RunContent,
    RunProperties, Table, TableCell, TableRow,
};
use crate::error::{OoxmlError, Result};
use crate::package::DocumentPackage;
use crate::styles::{DocumentStyles, StyleIssue, StyleSheet};
use crate::xml::XmlElement;

/// Deepest list level WordprocessingML numbering supports
const MAX_LIST_LEVEL: u8 = 8;

const UNCHECKED_BOX: &str = "\u{2610} ";
const CHECKED_BOX: &str = "\u{2612} ";

/// Writes a parsed document into an open package
pub trait Renderer: Send + Sync {
    /// Append `document` to the package body using `styles`
    fn render(
        &self,
        package: &mut DocumentPackage<'_>,
        styles: &DocumentStyles,
        document: &Document,
    ) -> Result<()>;
}

/// Default Markdown to WordprocessingML renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DocxRenderer {
    fn render(
        &self,
        package: &mut DocumentPackage<'_>,
        styles: &DocumentStyles,
        document: &Document,
    ) -> Result<()> {
        let known_styles = package.style_sheet()?;
        let mut context = RenderContext::new(styles, known_styles);
        context.check_styles();
        // Template bookmarks keep their ids; ours start above them
        context.next_bookmark_id = package.body().max_bookmark_id().map_or(0, |id| u64::from(id) + 1);

        let mut out = Vec::new();
        for block in &document.blocks {
            context.block(package, block, Scope::default(), &mut out)?;
        }

        debug!(
            blocks = document.len(),
            elements = out.len(),
            lists = context.lists,
            "Rendered document"
        );
        package.body_mut().extend(out);

        if let Some(title) = document.title() {
            package.set_title(title);
        }
        Ok(())
    }
}

/// Where a block sits in the tree
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    in_quote: bool,
    list_level: Option<u8>,
}

struct RenderContext<'s> {
    styles: &'s DocumentStyles,
    known_styles: Option<StyleSheet>,
    warned_styles: HashSet<String>,
    warned_numbering: bool,
    next_bookmark_id: u64,
    slugs: HashMap<String, usize>,
    lists: usize,
}

impl<'s> RenderContext<'s> {
    fn new(styles: &'s DocumentStyles, known_styles: Option<StyleSheet>) -> Self {
        Self {
            styles,
            known_styles,
            warned_styles: HashSet::new(),
            warned_numbering: false,
            next_bookmark_id: 0,
            slugs: HashMap::new(),
            lists: 0,
        }
    }

    /// Warn about every configured style the template cannot provide
    fn check_styles(&mut self) {
        let Some(sheet) = &self.known_styles else {
            return;
        };
        for issue in sheet.check(self.styles) {
            match issue {
                StyleIssue::Missing(id) => {
                    warn!(style = %id, "Template does not define style");
                    self.warned_styles.insert(id);
                }
                StyleIssue::WrongType {
                    id,
                    expected,
                    found,
                } => {
                    warn!(style = %id, ?expected, ?found, "Template style has unexpected type");
                }
            }
        }
    }

    /// Return the style id, warning once when the template lacks it
    fn style(&mut self, id: &str) -> String {
        if let Some(sheet) = &self.known_styles {
            if !sheet.contains(id) && self.warned_styles.insert(id.to_string()) {
                warn!(style = id, "Template does not define style");
            }
        }
        id.to_string()
    }

    fn body_style(&mut self, scope: Scope) -> Option<String> {
        if scope.in_quote {
            let quote = self.styles.quote.clone();
            return Some(self.style(&quote));
        }
        let paragraph = self.styles.paragraph.clone()?;
        (!paragraph.is_empty()).then(|| self.style(&paragraph))
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    fn block(
        &mut self,
        package: &mut DocumentPackage<'_>,
        block: &Block,
        scope: Scope,
        out: &mut Vec<BodyElement>,
    ) -> Result<()> {
        match block {
            Block::Paragraph(para) => {
                let style = self.body_style(scope);
                let paragraph = self.paragraph(package, style, &para.inlines)?;
                out.push(paragraph.into());
            }
            Block::Heading(heading) => out.push(self.heading(package, heading)?.into()),
            Block::List(list) => self.list(package, list, scope, out)?,
            Block::Table(table) => {
                if let Some(table) = self.table(package, table)? {
                    out.push(table.into());
                }
            }
            Block::CodeBlock(code) => self.code_block(code, out),
            Block::Quote(quote) => {
                let inner = Scope {
                    in_quote: true,
                    ..scope
                };
                for block in &quote.blocks {
                    self.block(package, block, inner, out)?;
                }
            }
            Block::Html(html) => {
                for line in html.lines().filter(|l| !l.trim().is_empty()) {
                    let mut paragraph = Paragraph::new();
                    paragraph.properties.style_id = self.body_style(scope);
                    paragraph.push_run(Run::new(line));
                    out.push(paragraph.into());
                }
            }
            Block::FootnoteDefinition(footnote) => self.footnote(package, footnote, scope, out)?,
            Block::ThematicBreak => {
                let mut paragraph = Paragraph::new();
                paragraph.properties.extra.push(
                    XmlElement::new("w:pBdr").with_child(
                        XmlElement::new("w:bottom")
                            .with_attr("w:val", "single")
                            .with_attr("w:sz", "6")
                            .with_attr("w:space", "1")
                            .with_attr("w:color", "auto"),
                    ),
                );
                out.push(paragraph.into());
            }
        }
        Ok(())
    }

    fn paragraph(
        &mut self,
        package: &mut DocumentPackage<'_>,
        style: Option<String>,
        inlines: &[Inline],
    ) -> Result<Paragraph> {
        let mut paragraph = Paragraph::new();
        paragraph.properties.style_id = style;
        let mut children = Vec::new();
        self.inlines(package, inlines, &RunProperties::default(), &mut children)?;
        paragraph.children = merge_runs(children);
        Ok(paragraph)
    }

    fn heading(&mut self, package: &mut DocumentPackage<'_>, heading: &Heading) -> Result<Paragraph> {
        if !(1..=6).contains(&heading.level) {
            return Err(OoxmlError::Rendering(format!(
                "heading level {} is outside 1-6",
                heading.level
            )));
        }
        let style = self.styles.heading(heading.level);
        let style = self.style(&style);
        let mut paragraph = self.paragraph(package, Some(style), &heading.text)?;

        let name = match &heading.anchor {
            Some(anchor) => anchor.clone(),
            None => self.unique_slug(&mdocx_ast::plain_text(&heading.text)),
        };
        if !name.is_empty() {
            let id = self.next_bookmark_id.to_string();
            self.next_bookmark_id += 1;
            paragraph.children.insert(
                0,
                ParagraphChild::Raw(
                    XmlElement::new("w:bookmarkStart")
                        .with_attr("w:id", id.clone())
                        .with_attr("w:name", name),
                ),
            );
            paragraph.push(ParagraphChild::Raw(
                XmlElement::new("w:bookmarkEnd").with_attr("w:id", id),
            ));
        }
        Ok(paragraph)
    }

    /// GitHub-style heading slug, suffixed when already used
    fn unique_slug(&mut self, text: &str) -> String {
        let slug = slugify(text);
        if slug.is_empty() {
            return slug;
        }
        let count = self.slugs.entry(slug.clone()).or_insert(0);
        let unique = if *count == 0 {
            slug
        } else {
            format!("{slug}-{count}")
        };
        *count += 1;
        unique
    }

    fn code_block(&mut self, code: &CodeBlock, out: &mut Vec<BodyElement>) {
        let code_style = self.styles.code_block.clone();
        let style = self.style(&code_style);
        let properties = RunProperties {
            font: self.styles.code_font.clone(),
            ..RunProperties::default()
        };

        for line in code.lines() {
            let mut paragraph = Paragraph::with_style(style.clone());
            if !line.is_empty() {
                let mut content = Vec::new();
                for (i, part) in line.split('\t').enumerate() {
                    if i > 0 {
                        content.push(RunContent::Tab);
                    }
                    if !part.is_empty() {
                        content.push(RunContent::Text(part.to_string()));
                    }
                }
                paragraph.push_run(Run {
                    attributes: Vec::new(),
                    properties: properties.clone(),
                    content,
                });
            }
            out.push(paragraph.into());
        }
    }

    fn list(
        &mut self,
        package: &mut DocumentPackage<'_>,
        list: &List,
        scope: Scope,
        out: &mut Vec<BodyElement>,
    ) -> Result<()> {
        let level = scope
            .list_level
            .map_or(0, |parent| parent.saturating_add(1).min(MAX_LIST_LEVEL));
        let numbering = self
            .numbering_instance(package, list, level)?
            .map(|num_id| NumberingRef { num_id, level });
        self.lists += 1;

        let list_style = self.styles.list_paragraph.clone();
        let list_style = self.style(&list_style);
        let item_scope = Scope {
            list_level: Some(level),
            ..scope
        };

        for item in &list.items {
            let prefix = item.task.map(|checked| if checked { CHECKED_BOX } else { UNCHECKED_BOX });
            let mut first = true;

            if !matches!(item.content.first(), Some(Block::Paragraph(_))) {
                let mut paragraph = Paragraph::with_style(list_style.clone());
                paragraph.properties.numbering = numbering;
                if let Some(prefix) = prefix {
                    paragraph.push_run(Run::new(prefix));
                }
                out.push(paragraph.into());
                first = false;
            }

            for block in &item.content {
                match block {
                    Block::Paragraph(para) => {
                        let mut paragraph =
                            self.paragraph(package, Some(list_style.clone()), &para.inlines)?;
                        if first {
                            paragraph.properties.numbering = numbering;
                            if let Some(prefix) = prefix {
                                paragraph.children.insert(0, ParagraphChild::Run(Run::new(prefix)));
                                paragraph.children = merge_runs(paragraph.children);
                            }
                            first = false;
                        }
                        out.push(paragraph.into());
                    }
                    other => self.block(package, other, item_scope, out)?,
                }
            }
        }
        Ok(())
    }

    /// Fresh numbering instance for a list, or `None` when the template cannot number it
    fn numbering_instance(
        &mut self,
        package: &mut DocumentPackage<'_>,
        list: &List,
        level: u8,
    ) -> Result<Option<u32>> {
        let format = match list.list_type {
            ListType::Unordered => "bullet",
            ListType::Ordered => "decimal",
        };
        let Some(numbering) = package.numbering_mut() else {
            if !self.warned_numbering {
                warn!("Template has no numbering part; lists are rendered without numbers");
                self.warned_numbering = true;
            }
            return Ok(None);
        };
        let Some(abstract_id) = numbering.find_abstract_by_format(format) else {
            if !self.warned_numbering {
                warn!(format, "Template has no matching numbering definition");
                self.warned_numbering = true;
            }
            return Ok(None);
        };

        let num_id = match list.list_type {
            ListType::Unordered => numbering.add_instance(abstract_id)?,
            ListType::Ordered => {
                let start = list.start.unwrap_or(1);
                let start = u32::try_from(start).map_err(|_| {
                    OoxmlError::Rendering(format!("list start {start} is out of range"))
                })?;
                numbering.add_instance_with_start(abstract_id, level, start)?
            }
        };
        Ok(Some(num_id))
    }

    fn table(&mut self, package: &mut DocumentPackage<'_>, table: &MdTable) -> Result<Option<Table>> {
        let columns = table
            .rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0)
            .max(table.alignments.len());
        if columns == 0 {
            return Ok(None);
        }

        let table_style = self.styles.table.clone();
        let mut rendered = Table::new(Some(self.style(&table_style)), columns);

        for row in &table.rows {
            let base = RunProperties {
                bold: row.is_header,
                ..RunProperties::default()
            };
            let mut cells = Vec::with_capacity(columns);
            for column in 0..columns {
                let mut paragraph = Paragraph::new();
                paragraph.properties.justification = table
                    .alignments
                    .get(column)
                    .copied()
                    .flatten()
                    .map(|alignment| justification(alignment).to_string());
                if let Some(cell) = row.cells.get(column) {
                    let mut children = Vec::new();
                    self.inlines(package, &cell.inlines, &base, &mut children)?;
                    paragraph.children = merge_runs(children);
                }
                cells.push(TableCell::with_paragraph(paragraph));
            }
            rendered.rows.push(TableRow {
                is_header: row.is_header,
                properties: Vec::new(),
                cells,
            });
        }
        Ok(Some(rendered))
    }

    fn footnote(
        &mut self,
        package: &mut DocumentPackage<'_>,
        footnote: &FootnoteDefinition,
        scope: Scope,
        out: &mut Vec<BodyElement>,
    ) -> Result<()> {
        let start = out.len();
        for block in &footnote.blocks {
            self.block(package, block, scope, out)?;
        }

        let label = superscript(&footnote.label);
        match out.get_mut(start) {
            Some(BodyElement::Paragraph(paragraph)) => {
                paragraph.children.insert(0, ParagraphChild::Run(Run::new(" ")));
                paragraph.children.insert(0, ParagraphChild::Run(label));
            }
            _ => {
                let mut paragraph = Paragraph::new();
                paragraph.properties.style_id = self.body_style(scope);
                paragraph.push_run(label);
                out.insert(start, paragraph.into());
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inlines
    // ------------------------------------------------------------------

    fn inlines(
        &mut self,
        package: &mut DocumentPackage<'_>,
        inlines: &[Inline],
        properties: &RunProperties,
        out: &mut Vec<ParagraphChild>,
    ) -> Result<()> {
        for inline in inlines {
            self.inline(package, inline, properties, out)?;
        }
        Ok(())
    }

    fn inline(
        &mut self,
        package: &mut DocumentPackage<'_>,
        inline: &Inline,
        properties: &RunProperties,
        out: &mut Vec<ParagraphChild>,
    ) -> Result<()> {
        let run = |text: &str| {
            ParagraphChild::Run(Run::new(text).with_properties(properties.clone()))
        };

        match inline {
            Inline::Text(text) => out.push(run(text.as_str())),
            Inline::Format(format, inner) => {
                let mut formatted = properties.clone();
                match format {
                    FormatType::Emphasis => formatted.italic = true,
                    FormatType::Strong => formatted.bold = true,
                    FormatType::Strikethrough => formatted.strike = true,
                }
                self.inlines(package, inner, &formatted, out)?;
            }
            Inline::Code(code) => {
                let code_char = self.styles.code_char.clone();
                let code_properties = RunProperties {
                    style_id: Some(self.style(&code_char)),
                    font: self.styles.code_font.clone(),
                    ..properties.clone()
                };
                out.push(ParagraphChild::Run(
                    Run::new(code.as_str()).with_properties(code_properties),
                ));
            }
            Inline::Link(link) if link.url.is_empty() => {
                self.inlines(package, &link.text, properties, out)?;
            }
            Inline::Link(link) => {
                let hyperlink_style = self.styles.hyperlink.clone();
                let link_properties = RunProperties {
                    style_id: Some(self.style(&hyperlink_style)),
                    ..properties.clone()
                };
                let mut children = Vec::new();
                self.inlines(package, &link.text, &link_properties, &mut children)?;
                if children.is_empty() {
                    children.push(ParagraphChild::Run(
                        Run::new(link.url.as_str()).with_properties(link_properties),
                    ));
                }

                let mut hyperlink = if link.is_internal() {
                    Hyperlink::internal(&link.url[1..])
                } else {
                    let rel_id = package.relationships_mut().add_hyperlink(&link.url);
                    Hyperlink::external(rel_id)
                };
                hyperlink.tooltip = link.title.clone().filter(|t| !t.is_empty());
                hyperlink.runs = merge_runs(children)
                    .into_iter()
                    .flat_map(|child| match child {
                        ParagraphChild::Run(run) => vec![run],
                        ParagraphChild::Hyperlink(inner) => inner.runs,
                        ParagraphChild::Raw(_) => Vec::new(),
                    })
                    .collect();
                out.push(ParagraphChild::Hyperlink(hyperlink));
            }
            Inline::Image(image) => {
                let text = if image.alt.is_empty() {
                    image.src.as_str()
                } else {
                    image.alt.as_str()
                };
                out.push(run(text));
            }
            Inline::SoftBreak => out.push(run(" ")),
            Inline::HardBreak => out.push(ParagraphChild::Run(
                Run::line_break().with_properties(properties.clone()),
            )),
            Inline::Html(html) => out.push(run(html.as_str())),
            Inline::FootnoteReference(label) => out.push(ParagraphChild::Run(superscript(label))),
        }
        Ok(())
    }
}

fn superscript(text: &str) -> Run {
    Run::new(text).with_properties(RunProperties {
        vert_align: Some("superscript".to_string()),
        ..RunProperties::default()
    })
}

fn justification(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
    }
}

/// Lowercase, spaces to hyphens, punctuation dropped
fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                Some(c.to_lowercase().next().unwrap_or(c))
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// Join neighbouring text-only runs that share formatting
fn merge_runs(children: Vec<ParagraphChild>) -> Vec<ParagraphChild> {
    let mut merged: Vec<ParagraphChild> = Vec::with_capacity(children.len());
    for child in children {
        if let (Some(ParagraphChild::Run(previous)), ParagraphChild::Run(run)) =
            (merged.last_mut(), &child)
        {
            if previous.is_plain_text()
                && run.is_plain_text()
                && previous.properties == run.properties
                && previous.attributes == run.attributes
            {
                let text = run.text();
                match previous.content.last_mut() {
                    Some(RunContent::Text(existing)) => existing.push_str(&text),
                    _ => previous.content.push(RunContent::Text(text)),
                }
                continue;
            }
        }
        merged.push(child);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageBuffer;
    use crate::test_utils::{
        build_package, create_template, create_template_without_numbering, CONTENT_TYPES, STYLES,
    };
    use mdocx_ast::Paragraph as MdParagraph;

    fn render_into(template: Vec<u8>, markdown: &str) -> (PackageBuffer, Vec<BodyElement>) {
        let document = mdocx_core::parse(markdown).unwrap();
        let mut buffer = PackageBuffer::from_bytes(template);
        let elements = {
            let mut package = buffer.open().unwrap();
            package.clean();
            DocxRenderer
                .render(&mut package, &DocumentStyles::default(), &document)
                .unwrap();
            let elements = package.body().elements().to_vec();
            package.close().unwrap();
            elements
        };
        (buffer, elements)
    }

    fn render(markdown: &str) -> Vec<BodyElement> {
        render_into(create_template(), markdown).1
    }

    fn paragraph(element: &BodyElement) -> &Paragraph {
        element.as_paragraph().expect("Expected paragraph")
    }

    fn runs(paragraph: &Paragraph) -> Vec<&Run> {
        paragraph.runs().collect()
    }

    #[test]
    fn test_heading_and_emphasis() {
        let elements = render("# Title\n\nHello *world*.");
        assert_eq!(elements.len(), 2);

        let heading = paragraph(&elements[0]);
        assert_eq!(heading.style_id(), Some("Heading1"));
        assert_eq!(heading.text(), "Title");

        let body = paragraph(&elements[1]);
        assert_eq!(body.style_id(), None);
        let runs = runs(body);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(), "Hello ");
        assert!(!runs[0].properties.italic);
        assert_eq!(runs[1].text(), "world");
        assert!(runs[1].properties.italic);
        assert_eq!(runs[2].text(), ".");
    }

    #[test]
    fn test_heading_bookmarks() {
        let elements = render("## Getting Started!\n\n## Getting Started");
        let first = paragraph(&elements[0]);
        assert_eq!(first.style_id(), Some("Heading2"));
        let ParagraphChild::Raw(start) = &first.children[0] else {
            panic!("Expected bookmark start");
        };
        assert_eq!(start.local_name(), "bookmarkStart");
        assert_eq!(start.attr("name"), Some("getting-started"));
        assert!(matches!(first.children.last(), Some(ParagraphChild::Raw(e)) if e.local_name() == "bookmarkEnd"));

        let ParagraphChild::Raw(second) = &paragraph(&elements[1]).children[0] else {
            panic!("Expected bookmark start");
        };
        assert_eq!(second.attr("name"), Some("getting-started-1"));
        assert_eq!(second.attr("id"), Some("1"));
    }

    #[test]
    fn test_invalid_heading_level_fails() {
        let mut document = Document::new();
        document.push(Block::Heading(Heading {
            level: 7,
            text: vec![Inline::Text("Too deep".to_string())],
            anchor: None,
        }));

        let mut buffer = PackageBuffer::from_bytes(create_template());
        let mut package = buffer.open().unwrap();
        let err = DocxRenderer
            .render(&mut package, &DocumentStyles::default(), &document)
            .unwrap_err();
        assert!(matches!(err, OoxmlError::Rendering(_)));
    }

    #[test]
    fn test_soft_breaks_join_runs() {
        let elements = render("one\ntwo");
        let runs = runs(paragraph(&elements[0]));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text(), "one two");
    }

    #[test]
    fn test_hard_break() {
        let elements = render("one  \ntwo");
        let runs = runs(paragraph(&elements[0]));
        assert!(runs.iter().any(|r| r.content == vec![RunContent::Break]));
    }

    #[test]
    fn test_inline_code_and_strike() {
        let elements = render("use `cargo` ~~not make~~");
        let runs = runs(paragraph(&elements[0]));
        let code = runs.iter().find(|r| r.text() == "cargo").unwrap();
        assert_eq!(code.properties.style_id.as_deref(), Some("CodeChar"));
        assert_eq!(code.properties.font.as_deref(), Some("Consolas"));
        let struck = runs.iter().find(|r| r.text() == "not make").unwrap();
        assert!(struck.properties.strike);
    }

    #[test]
    fn test_code_block_lines_and_tabs() {
        let elements = render("```\nfirst\n\tsecond\n\n```");
        assert_eq!(elements.len(), 3);
        for element in &elements {
            assert_eq!(paragraph(element).style_id(), Some("SourceCode"));
        }
        let second = runs(paragraph(&elements[1]));
        assert_eq!(
            second[0].content,
            vec![RunContent::Tab, RunContent::Text("second".to_string())]
        );
        assert_eq!(second[0].properties.font.as_deref(), Some("Consolas"));
        assert!(paragraph(&elements[2]).is_empty());
    }

    #[test]
    fn test_quote_uses_quote_style() {
        let elements = render("> quoted\n>\n> twice");
        assert_eq!(elements.len(), 2);
        assert!(elements
            .iter()
            .all(|e| paragraph(e).style_id() == Some("Quote")));
    }

    #[test]
    fn test_lists_get_fresh_instances() {
        let (buffer, elements) = render_into(create_template(), "- a\n- b\n\ntext\n\n3. c\n4. d");
        assert_eq!(elements.len(), 5);

        let bullet = paragraph(&elements[0]).properties.numbering.unwrap();
        assert_eq!(bullet, NumberingRef { num_id: 1, level: 0 });
        assert_eq!(paragraph(&elements[1]).properties.numbering, Some(bullet));
        assert_eq!(paragraph(&elements[0]).style_id(), Some("ListParagraph"));

        let ordered = paragraph(&elements[3]).properties.numbering.unwrap();
        assert_eq!(ordered.num_id, 2);

        let mut buffer = buffer;
        let package = buffer.open().unwrap();
        let numbering = package.numbering().unwrap();
        assert_eq!(numbering.instance_count(), 2);
        assert_eq!(numbering.instance(1).unwrap().abstract_num_id, 0);
        let instance = numbering.instance(2).unwrap();
        assert_eq!(instance.abstract_num_id, 1);
        assert_eq!(instance.start_override(0), Some(3));
    }

    #[test]
    fn test_nested_list_level() {
        let elements = render("- outer\n  - inner");
        assert_eq!(elements.len(), 2);
        let outer = paragraph(&elements[0]).properties.numbering.unwrap();
        let inner = paragraph(&elements[1]).properties.numbering.unwrap();
        assert_eq!(outer.level, 0);
        assert_eq!(inner.level, 1);
        assert_ne!(outer.num_id, inner.num_id);
    }

    #[test]
    fn test_task_list_prefix() {
        let elements = render("- [ ] todo\n- [x] done");
        assert_eq!(paragraph(&elements[0]).text(), "\u{2610} todo");
        assert_eq!(paragraph(&elements[1]).text(), "\u{2612} done");
    }

    #[test]
    fn test_lists_without_numbering_part() {
        let (_, elements) = render_into(create_template_without_numbering(), "1. one\n2. two");
        assert_eq!(elements.len(), 2);
        let first = paragraph(&elements[0]);
        assert_eq!(first.style_id(), Some("ListParagraph"));
        assert!(first.properties.numbering.is_none());
    }

    #[test]
    fn test_table() {
        let elements = render("| A | B |\n|:-:|--:|\n| 1 | 2 |\n| 3 |");
        assert_eq!(elements.len(), 1);
        let BodyElement::Table(table) = &elements[0] else {
            panic!("Expected table");
        };
        assert_eq!(table.style_id.as_deref(), Some("TableGrid"));
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].is_header);
        assert!(!table.rows[1].is_header);

        let header_cell = table.rows[0].cells[0].content[0].as_paragraph().unwrap();
        assert_eq!(header_cell.properties.justification.as_deref(), Some("center"));
        assert!(header_cell.runs().all(|r| r.properties.bold));

        let right = table.rows[1].cells[1].content[0].as_paragraph().unwrap();
        assert_eq!(right.properties.justification.as_deref(), Some("right"));
        assert_eq!(right.text(), "2");

        // Short rows are padded
        assert_eq!(table.rows[2].cells.len(), 2);
    }

    #[test]
    fn test_links() {
        let (mut buffer, elements) = render_into(
            create_template(),
            "[site](https://example.com \"Example\") and [again](https://example.com) and [up](#intro)",
        );
        let links: Vec<&Hyperlink> = paragraph(&elements[0])
            .children
            .iter()
            .filter_map(|c| match c {
                ParagraphChild::Hyperlink(link) => Some(link),
                _ => None,
            })
            .collect();
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].tooltip.as_deref(), Some("Example"));
        assert_eq!(links[0].rel_id, links[1].rel_id);
        assert_eq!(links[0].runs[0].properties.style_id.as_deref(), Some("Hyperlink"));
        assert_eq!(links[2].anchor.as_deref(), Some("intro"));
        assert!(links[2].rel_id.is_none());

        let package = buffer.open().unwrap();
        let rel_id = links[0].rel_id.as_deref().unwrap();
        let rel = package.relationships().get(rel_id).unwrap();
        assert_eq!(rel.target, "https://example.com");
        assert_eq!(rel.target_mode.as_deref(), Some("External"));
    }

    #[test]
    fn test_image_renders_alt_text() {
        let elements = render("![diagram](img.png) ![](other.png)");
        assert_eq!(paragraph(&elements[0]).text(), "diagram other.png");
    }

    #[test]
    fn test_thematic_break_border() {
        let elements = render("above\n\n---\n\nbelow");
        assert_eq!(elements.len(), 3);
        let rule = paragraph(&elements[1]);
        assert!(rule.is_empty());
        assert_eq!(rule.properties.extra[0].local_name(), "pBdr");
    }

    #[test]
    fn test_title_from_first_heading() {
        let document = mdocx_core::parse("Intro\n\n# Report\n\n# Appendix").unwrap();
        let mut buffer = PackageBuffer::from_bytes(create_template());
        let mut package = buffer.open().unwrap();
        DocxRenderer
            .render(&mut package, &DocumentStyles::default(), &document)
            .unwrap();
        assert_eq!(package.title(), Some("Report"));
    }

    #[test]
    fn test_configured_paragraph_style() {
        let styles = DocumentStyles {
            paragraph: Some("BodyText".to_string()),
            ..DocumentStyles::default()
        };
        let mut document = Document::new();
        document.push(Block::Paragraph(MdParagraph {
            inlines: vec![Inline::Text("styled".to_string())],
        }));

        let mut buffer = PackageBuffer::from_bytes(create_template());
        let mut package = buffer.open().unwrap();
        package.clean();
        DocxRenderer.render(&mut package, &styles, &document).unwrap();
        assert_eq!(
            package.body().paragraphs()[0].style_id(),
            Some("BodyText")
        );
    }

    #[test]
    fn test_render_appends() {
        let mut buffer = PackageBuffer::from_bytes(create_template());
        let mut package = buffer.open().unwrap();
        let before = package.body().len();
        let document = mdocx_core::parse("appended").unwrap();
        DocxRenderer
            .render(&mut package, &DocumentStyles::default(), &document)
            .unwrap();
        assert_eq!(package.body().len(), before + 1);
        assert_eq!(package.body().elements()[before].as_paragraph().unwrap().text(), "appended");
    }

    #[test]
    fn test_heading_bookmarks_follow_template_ids() {
        let document_xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
            <w:p><w:bookmarkStart w:id="4" w:name="cover"/><w:r><w:t>Cover</w:t></w:r><w:bookmarkEnd w:id="4"/></w:p>
            <w:sdt><w:sdtContent><w:p><w:bookmarkStart w:id="9" w:name="toc"/><w:bookmarkEnd w:id="9"/></w:p></w:sdtContent></w:sdt>
            </w:body></w:document>"#;
        let template = build_package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("word/document.xml", document_xml),
            ("word/styles.xml", STYLES),
        ]);
        let mut buffer = PackageBuffer::from_bytes(template);
        let mut package = buffer.open().unwrap();
        let before = package.body().len();
        let document = mdocx_core::parse("# One\n\n# Two").unwrap();
        DocxRenderer
            .render(&mut package, &DocumentStyles::default(), &document)
            .unwrap();
        let ids: Vec<&str> = package.body().elements()[before..]
            .iter()
            .filter_map(|e| match &paragraph(e).children[0] {
                ParagraphChild::Raw(start) => start.attr("id"),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["10", "11"]);
    }

    #[test]
    fn test_missing_configured_styles_still_render() {
        let styles = DocumentStyles {
            quote: "MissingQuote".to_string(),
            code_char: "Heading1".to_string(),
            ..DocumentStyles::default()
        };
        let mut buffer = PackageBuffer::from_bytes(create_template());
        let mut package = buffer.open().unwrap();
        package.clean();
        let document = mdocx_core::parse("> quoted `code`").unwrap();
        DocxRenderer.render(&mut package, &styles, &document).unwrap();
        assert_eq!(
            package.body().paragraphs()[0].style_id(),
            Some("MissingQuote")
        );
    }

    #[test]
    fn test_merge_runs_respects_formatting() {
        let bold = RunProperties {
            bold: true,
            ..RunProperties::default()
        };
        let merged = merge_runs(vec![
            ParagraphChild::Run(Run::new("a")),
            ParagraphChild::Run(Run::new("b")),
            ParagraphChild::Run(Run::new("c").with_properties(bold)),
            ParagraphChild::Run(Run::line_break()),
            ParagraphChild::Run(Run::new("d")),
        ]);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World"), "hello-world");
        assert_eq!(slugify("  API_v2 - Notes "), "api_v2---notes");
        assert_eq!(slugify("!!!"), "");
    }
}
