//! Part relationships (`word/_rels/document.xml.rels`)
//!
//! Hyperlinks added by the renderer are registered here as external
//! relationships and referenced from the body by `r:id`.

use std::collections::HashSet;

use crate::error::Result;
use crate::xml::{self, escape_attr, XmlElement, XML_DECLARATION};

/// Package relationships namespace
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Hyperlink relationship type
pub const TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
/// Styles relationship type
pub const TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
/// Numbering relationship type
pub const TYPE_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";

/// A single relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `External` for URLs, `None` for parts inside the package
    pub target_mode: Option<String>,
}

/// One child of `Relationships`
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Known(Relationship),
    /// An entry without `Id` or `Target`, written back untouched
    Other(XmlElement),
}

impl Entry {
    fn id(&self) -> Option<&str> {
        match self {
            Entry::Known(rel) => Some(&rel.id),
            Entry::Other(element) => element.attr("Id"),
        }
    }
}

/// Relationships of one part, in document order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Entry>,
    next_id: u32,
}

impl Relationships {
    /// Create an empty relationship set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = xml::parse(xml)?;
        let mut rels = Self::new();

        for element in root.elements() {
            let entry = match (element.attr("Id"), element.attr("Target")) {
                (Some(id), Some(target)) if element.local_name() == "Relationship" => {
                    Entry::Known(Relationship {
                        id: id.to_string(),
                        rel_type: element.attr("Type").unwrap_or_default().to_string(),
                        target: target.to_string(),
                        target_mode: element.attr("TargetMode").map(str::to_string),
                    })
                }
                _ => Entry::Other(element.clone()),
            };
            rels.insert(entry);
        }

        Ok(rels)
    }

    fn insert(&mut self, entry: Entry) {
        if let Some(n) = entry.id().and_then(id_number) {
            self.next_id = self.next_id.max(n);
        }
        self.entries.push(entry);
    }

    /// An `rIdN` no entry uses, continuing after the highest one seen
    fn fresh_id(&self) -> String {
        let n = match self.next_id.checked_add(1) {
            Some(n) => n,
            None => {
                let used: HashSet<u32> =
                    self.entries.iter().filter_map(|e| e.id()).filter_map(id_number).collect();
                (1..=u32::MAX).find(|n| !used.contains(n)).unwrap_or(u32::MAX)
            }
        };
        format!("rId{n}")
    }

    /// Add a relationship and return its generated id
    pub fn add(
        &mut self,
        rel_type: impl Into<String>,
        target: impl Into<String>,
        target_mode: Option<&str>,
    ) -> String {
        let id = self.fresh_id();
        self.insert(Entry::Known(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
            target_mode: target_mode.map(str::to_string),
        }));
        id
    }

    /// Register an external hyperlink, reusing an existing entry for the same URL
    pub fn add_hyperlink(&mut self, url: &str) -> String {
        let existing = self.iter().find(|r| {
            r.rel_type == TYPE_HYPERLINK
                && r.target == url
                && r.target_mode.as_deref() == Some("External")
        });
        match existing {
            Some(rel) => rel.id.clone(),
            None => self.add(TYPE_HYPERLINK, url, Some("External")),
        }
    }

    /// Look up a relationship by id
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.iter().find(|r| r.id == id)
    }

    /// Iterate the well-formed relationships in document order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Known(rel) => Some(rel),
            Entry::Other(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a `.rels` part
    pub fn to_xml(&self) -> String {
        let mut xml = format!("{XML_DECLARATION}\n<Relationships xmlns=\"{RELATIONSHIPS_NS}\">");
        for entry in &self.entries {
            let rel = match entry {
                Entry::Known(rel) => rel,
                Entry::Other(element) => {
                    xml.push_str(&element.to_xml());
                    continue;
                }
            };
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_attr(&rel.id),
                escape_attr(&rel.rel_type),
                escape_attr(&rel.target)
            ));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape_attr(mode)));
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Numeric suffix of an `rIdN` identifier
fn id_number(id: &str) -> Option<u32> {
    id.get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("rid"))
        .and_then(|_| id[3..].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>"#;

    #[test]
    fn test_parse() {
        let rels = Relationships::parse(RELS).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get("rId1").unwrap().target, "styles.xml");
        assert_eq!(rels.get("rId5").unwrap().rel_type, TYPE_NUMBERING);
        assert!(rels.get("rId2").is_none());
    }

    #[test]
    fn test_new_ids_continue_after_highest() {
        let mut rels = Relationships::parse(RELS).unwrap();
        let id = rels.add_hyperlink("https://example.com");
        assert_eq!(id, "rId6");

        let rel = rels.get("rId6").unwrap();
        assert_eq!(rel.target_mode.as_deref(), Some("External"));
    }

    #[test]
    fn test_hyperlink_reused_for_same_url() {
        let mut rels = Relationships::new();
        let first = rels.add_hyperlink("https://example.com");
        let second = rels.add_hyperlink("https://example.com");
        let other = rels.add_hyperlink("https://example.org");
        assert_eq!(first, "rId1");
        assert_eq!(first, second);
        assert_eq!(other, "rId2");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_to_xml_reparses() {
        let mut rels = Relationships::parse(RELS).unwrap();
        rels.add_hyperlink("https://example.com/?a=1&b=\"2\"");

        let xml = rels.to_xml();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("a=1&amp;b=&quot;2&quot;"));

        let reparsed = Relationships::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 3);
        assert_eq!(
            reparsed.get("rId6").unwrap().target,
            "https://example.com/?a=1&b=\"2\""
        );
        let ids: Vec<_> = reparsed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId1", "rId5", "rId6"]);
    }

    #[test]
    fn test_entries_without_target_are_kept() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId7" Type="urn:vendor:placeholder"/>
</Relationships>"#;
        let mut rels = Relationships::parse(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.iter().count(), 1);
        assert_eq!(rels.add_hyperlink("https://example.com"), "rId8");

        let written = rels.to_xml();
        assert!(written.contains(r#"<Relationship Id="rId7" Type="urn:vendor:placeholder"/>"#));
        let reparsed = Relationships::parse(written.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 3);
        let ids: Vec<_> = reparsed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId1", "rId8"]);
    }

    #[test]
    fn test_highest_possible_id_does_not_overflow() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="t" Target="a.xml"/>
  <Relationship Id="rId4294967295" Type="t" Target="b.xml"/>
</Relationships>"#;
        let mut rels = Relationships::parse(xml).unwrap();
        assert_eq!(rels.add_hyperlink("https://example.com"), "rId2");
        assert_eq!(rels.add_hyperlink("https://example.org"), "rId3");
    }

    #[test]
    fn test_id_number() {
        assert_eq!(id_number("rId12"), Some(12));
        assert_eq!(id_number("RID3"), Some(3));
        assert_eq!(id_number("image1"), None);
        assert_eq!(id_number("rIdx"), None);
    }
}
