//! Abstract numbering definitions

use crate::xml::{w_val, w_val_element, RawXmlElement};

use super::level::Level;

/// Abstract numbering definition (w:abstractNum)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbstractNum {
    /// Abstract numbering ID
    pub abstract_num_id: u32,
    /// Multi-level type
    pub multi_level_type: Option<String>,
    /// Level definitions, sorted by index
    pub levels: Vec<Level>,
    /// Element read from an existing part, written back untouched
    source: Option<RawXmlElement>,
}

impl AbstractNum {
    /// Create a new abstract numbering definition
    pub fn new(id: u32) -> Self {
        AbstractNum {
            abstract_num_id: id,
            multi_level_type: Some("hybridMultilevel".to_string()),
            ..Default::default()
        }
    }

    /// Create a definition holding the given levels
    pub fn with_levels(id: u32, levels: Vec<Level>) -> Self {
        let mut abs = Self::new(id);
        for level in levels {
            abs.add_level(level);
        }
        abs
    }

    /// Add a level, replacing one with the same index
    pub fn add_level(&mut self, level: Level) {
        self.source = None;
        match self.levels.binary_search_by_key(&level.ilvl, |l| l.ilvl) {
            Ok(pos) => self.levels[pos] = level,
            Err(pos) => self.levels.insert(pos, level),
        }
    }

    /// Level definition by index
    pub fn level(&self, ilvl: u8) -> Option<&Level> {
        self.levels.iter().find(|l| l.ilvl == ilvl)
    }

    /// Whether this definition was read from an existing part
    pub fn is_existing(&self) -> bool {
        self.source.is_some()
    }

    /// Read a `w:abstractNum` element
    pub fn from_element(elem: &RawXmlElement) -> Self {
        let mut levels: Vec<Level> = elem
            .elements()
            .filter(|c| c.local_name() == "lvl")
            .map(Level::from_element)
            .collect();
        levels.sort_by_key(|l| l.ilvl);

        AbstractNum {
            abstract_num_id: elem
                .attr("w:abstractNumId")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            multi_level_type: elem
                .elements()
                .find(|c| c.local_name() == "multiLevelType")
                .and_then(w_val)
                .map(str::to_string),
            levels,
            source: Some(elem.clone()),
        }
    }

    /// Build the `w:abstractNum` element
    pub fn to_element(&self) -> RawXmlElement {
        if let Some(source) = &self.source {
            return source.clone();
        }

        let mut elem = RawXmlElement::new("w:abstractNum")
            .with_attr("w:abstractNumId", self.abstract_num_id.to_string());
        if let Some(mlt) = &self.multi_level_type {
            elem = elem.with_child(w_val_element("w:multiLevelType", mlt.as_str()));
        }
        elem.with_children(self.levels.iter().map(Level::to_element))
    }
}
