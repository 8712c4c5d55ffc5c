//! Numbering instance definitions

use crate::xml::{w_val, w_val_element, RawXmlElement};

use super::level::LevelOverride;

/// Numbering instance (w:num)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Num {
    /// Numbering ID (referenced by paragraphs)
    pub num_id: u32,
    /// Referenced abstract numbering ID
    pub abstract_num_id: u32,
    /// Level overrides
    pub level_overrides: Vec<LevelOverride>,
    /// Element read from an existing part, written back untouched
    source: Option<RawXmlElement>,
}

impl Num {
    /// Create a new numbering instance
    pub fn new(num_id: u32, abstract_num_id: u32) -> Self {
        Num {
            num_id,
            abstract_num_id,
            level_overrides: Vec::new(),
            source: None,
        }
    }

    /// Add a level override
    pub fn with_override(mut self, level_override: LevelOverride) -> Self {
        self.level_overrides.push(level_override);
        self
    }

    /// Read a `w:num` element
    pub fn from_element(elem: &RawXmlElement) -> Self {
        let mut num = Num::new(
            elem.attr("w:numId")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            0,
        );

        for child in elem.elements() {
            match child.local_name() {
                "abstractNumId" => {
                    num.abstract_num_id = w_val(child).and_then(|v| v.parse().ok()).unwrap_or(0);
                }
                "lvlOverride" => num.level_overrides.push(LevelOverride::from_element(child)),
                _ => {}
            }
        }

        num.source = Some(elem.clone());
        num
    }

    /// Build the `w:num` element
    pub fn to_element(&self) -> RawXmlElement {
        if let Some(source) = &self.source {
            return source.clone();
        }

        RawXmlElement::new("w:num")
            .with_attr("w:numId", self.num_id.to_string())
            .with_child(w_val_element(
                "w:abstractNumId",
                self.abstract_num_id.to_string(),
            ))
            .with_children(self.level_overrides.iter().map(LevelOverride::to_element))
    }
}
