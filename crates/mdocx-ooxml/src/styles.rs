//! Style definitions and style configuration
//!
//! [`StyleSheet`] reads the styles a template defines (`word/styles.xml`).
//! [`DocumentStyles`] is the configuration the renderer consumes: which style
//! id each Markdown construct maps to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::xml;

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// A style defined in the template
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub id: String,
    pub style_type: StyleType,
}

/// A configured style the template cannot provide as expected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleIssue {
    /// The template does not define the style
    Missing(String),
    /// The template defines the style with another type
    WrongType {
        id: String,
        expected: StyleType,
        found: StyleType,
    },
}

/// Styles defined by a template, keyed by style id
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
}

impl StyleSheet {
    /// Parse `word/styles.xml`
    pub fn parse(xml_bytes: &[u8]) -> Result<Self> {
        let root = xml::parse(xml_bytes)?;
        let mut sheet = StyleSheet::default();

        for element in root.elements().filter(|e| e.local_name() == "style") {
            let Some(id) = element.attr("styleId") else {
                continue;
            };
            let style_type = match element.attr("type") {
                Some("character") => StyleType::Character,
                Some("table") => StyleType::Table,
                Some("numbering") => StyleType::Numbering,
                _ => StyleType::Paragraph,
            };
            sheet.styles.insert(
                id.to_string(),
                Style {
                    id: id.to_string(),
                    style_type,
                },
            );
        }

        Ok(sheet)
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Configured styles that are missing or of the wrong type, in configuration order
    pub fn check(&self, styles: &DocumentStyles) -> Vec<StyleIssue> {
        let mut issues = Vec::new();
        for (id, expected) in styles.style_ids() {
            let issue = match self.get(id) {
                None => StyleIssue::Missing(id.to_string()),
                Some(style) if style.style_type != expected => StyleIssue::WrongType {
                    id: id.to_string(),
                    expected,
                    found: style.style_type,
                },
                Some(_) => continue,
            };
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
        issues
    }
}

/// Style ids and fonts the renderer applies
///
/// Every field has a default matching the standard template, so a partial
/// `[styles]` table in `mdocx.toml` only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStyles {
    /// Body paragraph style; `None` leaves the template default (Normal)
    pub paragraph: Option<String>,
    /// Heading styles for levels 1-6, in order
    pub headings: Vec<String>,
    pub quote: String,
    pub code_block: String,
    /// Character style for inline code
    pub code_char: String,
    /// Font forced onto code runs
    pub code_font: Option<String>,
    pub list_paragraph: String,
    /// Character style for hyperlink text
    pub hyperlink: String,
    pub table: String,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            paragraph: None,
            headings: (1..=6).map(|level| format!("Heading{level}")).collect(),
            quote: "Quote".to_string(),
            code_block: "SourceCode".to_string(),
            code_char: "CodeChar".to_string(),
            code_font: Some("Consolas".to_string()),
            list_paragraph: "ListParagraph".to_string(),
            hyperlink: "Hyperlink".to_string(),
            table: "TableGrid".to_string(),
        }
    }
}

impl DocumentStyles {
    /// Style for a heading level; falls back to `HeadingN` when not configured
    pub fn heading(&self, level: u8) -> String {
        usize::from(level)
            .checked_sub(1)
            .and_then(|index| self.headings.get(index))
            .cloned()
            .unwrap_or_else(|| format!("Heading{level}"))
    }

    /// Every style id this configuration refers to, with the type it must have
    pub fn style_ids(&self) -> Vec<(&str, StyleType)> {
        let mut ids: Vec<(&str, StyleType)> = self
            .headings
            .iter()
            .map(|id| (id.as_str(), StyleType::Paragraph))
            .collect();
        ids.extend(self.paragraph.as_deref().map(|id| (id, StyleType::Paragraph)));
        ids.extend([
            (self.quote.as_str(), StyleType::Paragraph),
            (self.code_block.as_str(), StyleType::Paragraph),
            (self.code_char.as_str(), StyleType::Character),
            (self.list_paragraph.as_str(), StyleType::Paragraph),
            (self.hyperlink.as_str(), StyleType::Character),
            (self.table.as_str(), StyleType::Table),
        ]);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/><w:basedOn w:val="Normal"/>
    <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
  </w:style>
  <w:style w:type="character" w:styleId="CodeChar"><w:name w:val="Code Char"/></w:style>
  <w:style w:type="table" w:styleId="TableGrid"/>
</w:styles>"#;

    #[test]
    fn test_parse_styles() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.get("Heading2").unwrap().style_type, StyleType::Paragraph);
        assert_eq!(sheet.get("CodeChar").unwrap().style_type, StyleType::Character);
        assert_eq!(sheet.get("TableGrid").unwrap().style_type, StyleType::Table);
        assert!(!sheet.contains("Quote"));
    }

    #[test]
    fn test_check_reports_missing_and_mistyped() {
        let sheet = StyleSheet::parse(STYLES).unwrap();
        let styles = DocumentStyles {
            headings: vec!["Heading2".to_string(), "Heading2".to_string()],
            quote: "Quote".to_string(),
            code_block: "CodeChar".to_string(),
            list_paragraph: "Normal".to_string(),
            hyperlink: "CodeChar".to_string(),
            ..DocumentStyles::default()
        };
        assert_eq!(
            sheet.check(&styles),
            vec![
                StyleIssue::Missing("Quote".to_string()),
                StyleIssue::WrongType {
                    id: "CodeChar".to_string(),
                    expected: StyleType::Paragraph,
                    found: StyleType::Character,
                },
            ]
        );
    }

    #[test]
    fn test_default_styles() {
        let styles = DocumentStyles::default();
        assert_eq!(styles.heading(1), "Heading1");
        assert_eq!(styles.heading(6), "Heading6");
        assert_eq!(styles.code_block, "SourceCode");
        assert!(styles.style_ids().contains(&("TableGrid", StyleType::Table)));
        assert!(styles.style_ids().contains(&("CodeChar", StyleType::Character)));
        assert!(!styles.style_ids().iter().any(|(id, _)| *id == "Normal"));
    }

    #[test]
    fn test_heading_fallback() {
        let styles = DocumentStyles {
            headings: vec!["Chapter".to_string()],
            ..DocumentStyles::default()
        };
        assert_eq!(styles.heading(1), "Chapter");
        assert_eq!(styles.heading(3), "Heading3");
    }

    #[test]
    fn test_partial_toml() {
        let styles: DocumentStyles = toml::from_str(
            r#"
paragraph = "BodyText"
code_font = "Fira Code"
"#,
        )
        .unwrap();
        assert_eq!(styles.paragraph.as_deref(), Some("BodyText"));
        assert_eq!(styles.code_font.as_deref(), Some("Fira Code"));
        assert_eq!(styles.quote, "Quote");
        assert_eq!(styles.headings.len(), 6);
    }
}
