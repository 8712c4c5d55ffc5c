//! Numbering definitions (numbering.xml)
//!
//! The part model ([`Numbering`]), the generator that synthesizes list
//! definitions for a patch run ([`NumberingManager`]), the read-only
//! projection of a template's numbering ([`extract_existing_numbering`]) and
//! the strategies that decide whether a reference reuses template numbering
//! ([`NumberingStrategy`]).

mod abstract_num;
mod extractor;
mod level;
mod manager;
mod mapper;
mod num;
mod types;

pub use abstract_num::AbstractNum;
pub use extractor::{extract_existing_numbering, ExistingLevel, ExistingNumbering};
pub use level::{Level, LevelIndent, LevelOverride};
pub use manager::{
    numbering_token, ConcreteNumbering, NumberingDefinition, NumberingManager,
    NumberingReferenceMap, BULLET_GLYPHS, HANGING_INDENT, INDENT_STEP, MAX_LEVEL,
    MIN_GENERATED_DEPTH,
};
pub use mapper::{
    CompatibilityMapper, FreshAllocation, NumberingMapping, NumberingMappings, NumberingStrategy,
};
pub use num::Num;
pub use types::{ListConfig, ListConfigs, ListType, NumberFormat};

use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode, XmlDocument, R, W};

/// Numbering definitions from numbering.xml
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numbering {
    /// Root element name and attributes (children are rebuilt on write)
    root: RawXmlElement,
    /// Children before the first definition (e.g. `w:numPicBullet`)
    prelude: Vec<RawXmlNode>,
    /// Abstract numbering definitions, in document order
    pub abstract_nums: Vec<AbstractNum>,
    /// Numbering instances, in document order
    pub nums: Vec<Num>,
    /// Children after the last instance (e.g. `w:numIdMacAtCleanup`)
    trailing: Vec<RawXmlNode>,
}

impl Default for Numbering {
    fn default() -> Self {
        Self {
            root: RawXmlElement::new("w:numbering")
                .with_attr("xmlns:w", W)
                .with_attr("xmlns:r", R),
            prelude: Vec::new(),
            abstract_nums: Vec::new(),
            nums: Vec::new(),
            trailing: Vec::new(),
        }
    }
}

impl Numbering {
    /// Create a new empty numbering definitions
    pub fn new() -> Self {
        Numbering::default()
    }

    /// Parse numbering.xml content
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = XmlDocument::parse(xml.as_bytes())?;
        Ok(Self::from_element(&doc.root))
    }

    /// Read a parsed `w:numbering` root
    pub fn from_element(root: &RawXmlElement) -> Self {
        let mut numbering = Numbering {
            root: RawXmlElement {
                children: Vec::new(),
                self_closing: false,
                ..root.clone()
            },
            ..Numbering::default()
        };

        for child in &root.children {
            match child {
                RawXmlNode::Element(e) if e.local_name() == "abstractNum" => {
                    numbering.abstract_nums.push(AbstractNum::from_element(e));
                }
                RawXmlNode::Element(e) if e.local_name() == "num" => {
                    numbering.nums.push(Num::from_element(e));
                }
                // Inter-element whitespace is regenerated
                RawXmlNode::Text(t) if t.trim().is_empty() => {}
                other => {
                    if numbering.abstract_nums.is_empty() && numbering.nums.is_empty() {
                        numbering.prelude.push(other.clone());
                    } else {
                        numbering.trailing.push(other.clone());
                    }
                }
            }
        }

        numbering
    }

    /// Build the root element
    pub fn to_element(&self) -> RawXmlElement {
        let mut root = self.root.clone();
        root.children.extend(self.prelude.iter().cloned());
        root.children.extend(
            self.abstract_nums
                .iter()
                .map(|a| RawXmlNode::Element(a.to_element())),
        );
        root.children
            .extend(self.nums.iter().map(|n| RawXmlNode::Element(n.to_element())));
        root.children.extend(self.trailing.iter().cloned());
        root
    }

    /// Build the complete part
    pub fn to_document(&self) -> XmlDocument {
        XmlDocument::new(self.to_element())
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> Result<String> {
        self.to_document().to_xml()
    }

    /// One past the largest abstract numbering id in use
    pub fn next_abstract_id(&self) -> u32 {
        self.abstract_nums
            .iter()
            .map(|a| a.abstract_num_id + 1)
            .max()
            .unwrap_or(0)
    }

    /// One past the largest numbering id in use (numbering ids start at 1)
    pub fn next_num_id(&self) -> u32 {
        self.nums
            .iter()
            .map(|n| n.num_id + 1)
            .max()
            .unwrap_or(1)
    }

    /// Add an abstract definition under the next free id and return the id
    pub fn add_abstract_num(&mut self, mut abs_num: AbstractNum) -> u32 {
        let abs_id = self.next_abstract_id();
        abs_num.abstract_num_id = abs_id;
        self.abstract_nums.push(abs_num);
        abs_id
    }

    /// Add an instance of `abstract_num_id` under the next free id and return the id
    pub fn add_num(&mut self, abstract_num_id: u32, overrides: Vec<LevelOverride>) -> u32 {
        let num_id = self.next_num_id();
        let mut num = Num::new(num_id, abstract_num_id);
        num.level_overrides = overrides;
        self.nums.push(num);
        num_id
    }

    /// Abstract definition by id
    pub fn abstract_num(&self, id: u32) -> Option<&AbstractNum> {
        self.abstract_nums.iter().find(|a| a.abstract_num_id == id)
    }

    /// Mutable abstract definition by id
    pub fn abstract_num_mut(&mut self, id: u32) -> Option<&mut AbstractNum> {
        self.abstract_nums
            .iter_mut()
            .find(|a| a.abstract_num_id == id)
    }

    /// Numbering instance by id
    pub fn num(&self, num_id: u32) -> Option<&Num> {
        self.nums.iter().find(|n| n.num_id == num_id)
    }

    /// Get the level definition for a specific numId and level
    pub fn get_level(&self, num_id: u32, level: u8) -> Option<&Level> {
        let num = self.num(num_id)?;
        self.abstract_num(num.abstract_num_id)?.level(level)
    }

    /// Check if a numId represents a bullet list
    pub fn is_bullet_list(&self, num_id: u32) -> bool {
        self.get_level(num_id, 0)
            .and_then(|l| l.num_fmt.as_ref())
            .is_some_and(NumberFormat::is_bullet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml">
  <w:numPicBullet w:numPicBulletId="0"><w:pict/></w:numPicBullet>
  <w:abstractNum w:abstractNumId="0">
    <w:multiLevelType w:val="hybridMultilevel"/>
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="decimal"/>
      <w:lvlText w:val="%1."/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
    <w:lvl w:ilvl="1">
      <w:start w:val="1"/>
      <w:numFmt w:val="lowerLetter"/>
      <w:lvlText w:val="%2)"/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:multiLevelType w:val="hybridMultilevel"/>
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="bullet"/>
      <w:lvlText w:val="•"/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
  </w:abstractNum>
  <w:num w:numId="1">
    <w:abstractNumId w:val="0"/>
  </w:num>
  <w:num w:numId="2">
    <w:abstractNumId w:val="1"/>
  </w:num>
</w:numbering>"#;

    #[test]
    fn test_parse_numbering() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();

        assert_eq!(numbering.abstract_nums.len(), 2);
        assert_eq!(numbering.nums.len(), 2);

        let abs0 = numbering.abstract_num(0).unwrap();
        assert_eq!(abs0.multi_level_type, Some("hybridMultilevel".to_string()));
        assert_eq!(abs0.levels.len(), 2);

        let lvl0 = abs0.level(0).unwrap();
        assert_eq!(lvl0.start, Some(1));
        assert_eq!(lvl0.num_fmt, Some(NumberFormat::Decimal));
        assert_eq!(lvl0.level_text, Some("%1.".to_string()));

        assert_eq!(numbering.num(1).unwrap().abstract_num_id, 0);
    }

    #[test]
    fn test_is_bullet_list() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();

        assert!(!numbering.is_bullet_list(1));
        assert!(numbering.is_bullet_list(2));
        assert!(!numbering.is_bullet_list(99));
    }

    #[test]
    fn test_roundtrip_keeps_root_and_prelude() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        let xml = numbering.to_xml().unwrap();

        assert!(xml.contains(r#"xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml""#));
        assert!(xml.find("w:numPicBullet").unwrap() < xml.find("w:abstractNum").unwrap());

        let numbering2 = Numbering::from_xml(&xml).unwrap();
        assert_eq!(numbering, numbering2);
    }

    #[test]
    fn test_generated_ids_continue_after_existing() {
        let mut numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        let abs_id = numbering.add_abstract_num(AbstractNum::new(0));
        let num_id = numbering.add_num(abs_id, Vec::new());

        assert_eq!(abs_id, 2);
        assert_eq!(num_id, 3);

        let xml = numbering.to_xml().unwrap();
        let last_abstract = xml.rfind("<w:abstractNum ").unwrap();
        let first_num = xml.find("<w:num ").unwrap();
        assert!(last_abstract < first_num);
    }

    #[test]
    fn test_empty_numbering_ids() {
        let numbering = Numbering::new();
        assert_eq!(numbering.next_abstract_id(), 0);
        assert_eq!(numbering.next_num_id(), 1);
    }
}
