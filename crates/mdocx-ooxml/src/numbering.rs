//! Numbering definitions (`word/numbering.xml`)
//!
//! A numbering part holds abstract definitions (`w:abstractNum`, the level
//! formats) and instances (`w:num`) that paragraphs reference through
//! `w:numPr`. Each rendered list gets its own instance so its numbering
//! restarts independently.

use crate::error::{OoxmlError, Result};
use crate::xml::{self, XmlElement, XmlNode};

/// A `w:abstractNum` definition, kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractNum {
    pub id: u32,
    pub element: XmlElement,
}

impl AbstractNum {
    /// `w:numFmt` of the given level (`bullet`, `decimal`, ...)
    pub fn level_format(&self, level: u8) -> Option<&str> {
        let level = level.to_string();
        self.element
            .elements()
            .filter(|e| e.local_name() == "lvl")
            .find(|lvl| lvl.attr("ilvl") == Some(level.as_str()))
            .and_then(|lvl| lvl.child("numFmt"))
            .and_then(|fmt| fmt.attr("val"))
    }
}

/// A `w:num` instance
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub abstract_num_id: u32,
    /// `w:lvlOverride` elements, kept verbatim
    pub overrides: Vec<XmlElement>,
}

impl NumberingInstance {
    fn from_element(element: &XmlElement) -> Option<Self> {
        let num_id = element.attr("numId")?.parse().ok()?;
        let abstract_num_id = element.child("abstractNumId")?.attr("val")?.parse().ok()?;
        let overrides = element
            .elements()
            .filter(|e| e.local_name() == "lvlOverride")
            .cloned()
            .collect();
        Some(Self {
            num_id,
            abstract_num_id,
            overrides,
        })
    }

    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:num")
            .with_attr("w:numId", self.num_id.to_string())
            .with_child(
                XmlElement::new("w:abstractNumId")
                    .with_attr("w:val", self.abstract_num_id.to_string()),
            );
        for lvl_override in &self.overrides {
            element = element.with_child(lvl_override.clone());
        }
        element
    }

    /// Restart value for a level, if overridden
    pub fn start_override(&self, level: u8) -> Option<u32> {
        let level = level.to_string();
        self.overrides
            .iter()
            .find(|o| o.attr("ilvl") == Some(level.as_str()))
            .and_then(|o| o.child("startOverride"))
            .and_then(|s| s.attr("val"))
            .and_then(|v| v.parse().ok())
    }
}

/// The numbering part
#[derive(Debug, Clone, PartialEq)]
pub struct Numbering {
    /// Root element with its attributes; children are rebuilt on save
    root: XmlElement,
    /// Elements before the first definition (`w:numPicBullet`)
    head: Vec<XmlElement>,
    abstract_nums: Vec<AbstractNum>,
    instances: Vec<NumberingInstance>,
    /// Elements after the instances (`w:numIdMacAtCleanup`)
    tail: Vec<XmlElement>,
}

impl Numbering {
    /// Parse `word/numbering.xml`
    pub fn parse(xml_bytes: &[u8]) -> Result<Self> {
        let mut root = xml::parse(xml_bytes)?;
        if root.local_name() != "numbering" {
            return Err(OoxmlError::MalformedTemplate(format!(
                "numbering part has root <{}>",
                root.name
            )));
        }

        let children = std::mem::take(&mut root.children);
        let mut numbering = Numbering {
            root,
            head: Vec::new(),
            abstract_nums: Vec::new(),
            instances: Vec::new(),
            tail: Vec::new(),
        };

        for child in children.into_iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        }) {
            let seen_definitions =
                !numbering.abstract_nums.is_empty() || !numbering.instances.is_empty();
            let abstract_id = child
                .attr("abstractNumId")
                .and_then(|id| id.parse().ok())
                .filter(|_| child.local_name() == "abstractNum");

            if let Some(id) = abstract_id {
                numbering.abstract_nums.push(AbstractNum { id, element: child });
            } else if child.local_name() == "num" {
                match NumberingInstance::from_element(&child) {
                    Some(instance) => numbering.instances.push(instance),
                    None => {
                        return Err(OoxmlError::MalformedTemplate(
                            "numbering instance without numId or abstractNumId".into(),
                        ))
                    }
                }
            } else if seen_definitions {
                numbering.tail.push(child);
            } else {
                numbering.head.push(child);
            }
        }

        Ok(numbering)
    }

    pub fn abstract_nums(&self) -> &[AbstractNum] {
        &self.abstract_nums
    }

    pub fn instances(&self) -> &[NumberingInstance] {
        &self.instances
    }

    /// Number of abstract definitions
    pub fn definition_count(&self) -> usize {
        self.abstract_nums.len()
    }

    /// Number of instances
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance(&self, num_id: u32) -> Option<&NumberingInstance> {
        self.instances.iter().find(|i| i.num_id == num_id)
    }

    /// Remove every instance; abstract definitions stay
    pub fn clear_instances(&mut self) {
        self.instances.clear();
    }

    /// First abstract definition whose top level uses `format`
    pub fn find_abstract_by_format(&self, format: &str) -> Option<u32> {
        self.abstract_nums
            .iter()
            .find(|a| a.level_format(0) == Some(format))
            .map(|a| a.id)
    }

    /// Add an instance of an abstract definition and return its `numId`
    pub fn add_instance(&mut self, abstract_num_id: u32) -> Result<u32> {
        if !self.abstract_nums.iter().any(|a| a.id == abstract_num_id) {
            return Err(OoxmlError::Rendering(format!(
                "abstract numbering definition {abstract_num_id} does not exist"
            )));
        }
        let num_id = self.instances.iter().map(|i| i.num_id).max().unwrap_or(0) + 1;
        self.instances.push(NumberingInstance {
            num_id,
            abstract_num_id,
            overrides: Vec::new(),
        });
        Ok(num_id)
    }

    /// Add an instance whose `level` restarts at `start`
    pub fn add_instance_with_start(
        &mut self,
        abstract_num_id: u32,
        level: u8,
        start: u32,
    ) -> Result<u32> {
        let num_id = self.add_instance(abstract_num_id)?;
        let lvl_override = XmlElement::new("w:lvlOverride")
            .with_attr("w:ilvl", level.to_string())
            .with_child(XmlElement::new("w:startOverride").with_attr("w:val", start.to_string()));
        if let Some(instance) = self.instances.iter_mut().find(|i| i.num_id == num_id) {
            instance.overrides.push(lvl_override);
        }
        Ok(num_id)
    }

    /// Serialize the part
    pub fn to_xml(&self) -> String {
        let mut root = self.root.clone();
        root.children = self
            .head
            .iter()
            .cloned()
            .chain(self.abstract_nums.iter().map(|a| a.element.clone()))
            .chain(self.instances.iter().map(NumberingInstance::to_element))
            .chain(self.tail.iter().cloned())
            .map(XmlNode::Element)
            .collect();
        root.to_part_xml()
    }
}
