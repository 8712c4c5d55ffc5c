//! Style definitions (`w:style`)

use std::str::FromStr;

use crate::xml::{w_val, w_val_element, RawXmlElement};

/// Type of style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StyleType {
    /// Paragraph style
    #[default]
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
    /// Numbering style
    Numbering,
}

impl StyleType {
    /// Value of `w:type`
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleType::Paragraph => "paragraph",
            StyleType::Character => "character",
            StyleType::Table => "table",
            StyleType::Numbering => "numbering",
        }
    }
}

impl FromStr for StyleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "paragraph" => Ok(StyleType::Paragraph),
            "character" => Ok(StyleType::Character),
            "table" => Ok(StyleType::Table),
            "numbering" => Ok(StyleType::Numbering),
            other => Err(format!("unknown style type '{}'", other)),
        }
    }
}

/// A style definition from styles.xml or supplied with a patch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRecord {
    /// Style ID (`w:styleId`, referenced by `w:pStyle`, `w:rStyle`, `w:tblStyle`)
    pub id: String,
    pub style_type: StyleType,
    /// Display name
    pub name: Option<String>,
    /// Parent style ID
    pub based_on: Option<String>,
    /// Paragraph properties (`w:pPr`)
    pub paragraph_properties: Option<RawXmlElement>,
    /// Run properties (`w:rPr`)
    pub run_properties: Option<RawXmlElement>,
    /// Remaining children (e.g. `w:qFormat`, `w:tblPr`), preserved
    pub other: Vec<RawXmlElement>,
}

impl StyleRecord {
    /// Create a style with no properties
    pub fn new(id: impl Into<String>, style_type: StyleType) -> Self {
        Self {
            id: id.into(),
            style_type,
            name: None,
            based_on: None,
            paragraph_properties: None,
            run_properties: None,
            other: Vec::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the parent style
    pub fn with_based_on(mut self, based_on: impl Into<String>) -> Self {
        self.based_on = Some(based_on.into());
        self
    }

    /// Set paragraph properties; `ppr` must be a `w:pPr` element
    pub fn with_paragraph_properties(mut self, ppr: RawXmlElement) -> Self {
        self.paragraph_properties = Some(ppr);
        self
    }

    /// Set run properties; `rpr` must be a `w:rPr` element
    pub fn with_run_properties(mut self, rpr: RawXmlElement) -> Self {
        self.run_properties = Some(rpr);
        self
    }

    /// Read a `w:style` element. Returns `None` without a `w:styleId`.
    pub fn from_element(elem: &RawXmlElement) -> Option<Self> {
        let id = elem.attr("w:styleId")?;
        let style_type = elem
            .attr("w:type")
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();

        let mut record = StyleRecord::new(id, style_type);
        for child in elem.elements() {
            match child.name.as_str() {
                "w:name" => record.name = w_val(child).map(str::to_string),
                "w:basedOn" => record.based_on = w_val(child).map(str::to_string),
                "w:pPr" => record.paragraph_properties = Some(child.clone()),
                "w:rPr" => record.run_properties = Some(child.clone()),
                _ => record.other.push(child.clone()),
            }
        }
        Some(record)
    }

    /// Build the `w:style` element
    pub fn to_element(&self) -> RawXmlElement {
        let mut elem = RawXmlElement::new("w:style")
            .with_attr("w:type", self.style_type.as_str())
            .with_attr("w:styleId", self.id.as_str());

        if let Some(name) = &self.name {
            elem = elem.with_child(w_val_element("w:name", name.as_str()));
        }
        if let Some(based_on) = &self.based_on {
            elem = elem.with_child(w_val_element("w:basedOn", based_on.as_str()));
        }
        elem = elem.with_children(self.other.iter().cloned());
        if let Some(ppr) = &self.paragraph_properties {
            elem = elem.with_child(ppr.clone());
        }
        if let Some(rpr) = &self.run_properties {
            elem = elem.with_child(rpr.clone());
        }
        elem
    }

    /// Whether both definitions format text the same way: same type and
    /// identical paragraph and run properties
    pub fn is_compatible_with(&self, other: &StyleRecord) -> bool {
        self.style_type == other.style_type
            && self.paragraph_properties == other.paragraph_properties
            && self.run_properties == other.run_properties
    }
}
