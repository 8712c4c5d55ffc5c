//! Level definitions for numbering

use crate::xml::{w_val, w_val_element, RawXmlElement};

use super::types::NumberFormat;

/// Level definition (w:lvl)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    /// Level index (0-8)
    pub ilvl: u8,
    /// Start value
    pub start: Option<u32>,
    /// Number format
    pub num_fmt: Option<NumberFormat>,
    /// Level text (e.g., "%1.", "%1.%2.")
    pub level_text: Option<String>,
    /// Level justification
    pub lvl_jc: Option<String>,
    /// Paragraph indentation for this level
    pub indent: Option<LevelIndent>,
}

/// Indentation of a list level, in twips
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelIndent {
    pub left: i32,
    pub hanging: i32,
}

/// Level override (w:lvlOverride)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelOverride {
    /// Level index
    pub ilvl: u8,
    /// Start override
    pub start_override: Option<u32>,
}

impl Level {
    /// Create a new level with the given index
    pub fn new(ilvl: u8) -> Self {
        Level {
            ilvl,
            start: Some(1),
            ..Default::default()
        }
    }

    /// Set the number format
    pub fn with_format(mut self, fmt: NumberFormat) -> Self {
        self.num_fmt = Some(fmt);
        self
    }

    /// Set the level text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.level_text = Some(text.into());
        self
    }

    /// Set the start value
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the justification
    pub fn with_justification(mut self, jc: impl Into<String>) -> Self {
        self.lvl_jc = Some(jc.into());
        self
    }

    /// Set the indentation
    pub fn with_indent(mut self, left: i32, hanging: i32) -> Self {
        self.indent = Some(LevelIndent { left, hanging });
        self
    }

    /// Read the fields this crate understands from a `w:lvl` element
    pub fn from_element(elem: &RawXmlElement) -> Self {
        let mut level = Level {
            ilvl: elem
                .attr("w:ilvl")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            ..Default::default()
        };

        for child in elem.elements() {
            match child.local_name() {
                "start" => level.start = w_val(child).and_then(|v| v.parse().ok()),
                "numFmt" => {
                    level.num_fmt = w_val(child).and_then(|v| v.parse().ok());
                }
                "lvlText" => level.level_text = w_val(child).map(str::to_string),
                "lvlJc" => level.lvl_jc = w_val(child).map(str::to_string),
                "pPr" => {
                    level.indent = child.child("w:ind").map(|ind| {
                        let twips = |names: &[&str]| {
                            names
                                .iter()
                                .find_map(|n| ind.attr(n))
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(0)
                        };
                        LevelIndent {
                            left: twips(&["w:left", "w:start"]),
                            hanging: twips(&["w:hanging"]),
                        }
                    });
                }
                _ => {}
            }
        }

        level
    }

    /// Build the `w:lvl` element
    pub fn to_element(&self) -> RawXmlElement {
        let mut elem = RawXmlElement::new("w:lvl").with_attr("w:ilvl", self.ilvl.to_string());

        if let Some(s) = self.start {
            elem = elem.with_child(w_val_element("w:start", s.to_string()));
        }
        if let Some(fmt) = &self.num_fmt {
            elem = elem.with_child(w_val_element("w:numFmt", fmt.as_str()));
        }
        if let Some(txt) = &self.level_text {
            elem = elem.with_child(w_val_element("w:lvlText", txt.as_str()));
        }
        if let Some(jc) = &self.lvl_jc {
            elem = elem.with_child(w_val_element("w:lvlJc", jc.as_str()));
        }
        if let Some(indent) = &self.indent {
            elem = elem.with_child(
                RawXmlElement::new("w:pPr").with_child(
                    RawXmlElement::new("w:ind")
                        .with_attr("w:left", indent.left.to_string())
                        .with_attr("w:hanging", indent.hanging.to_string())
                        .empty(),
                ),
            );
        }

        elem
    }
}

impl LevelOverride {
    /// Restart level `ilvl` at `start`
    pub fn restart(ilvl: u8, start: u32) -> Self {
        Self {
            ilvl,
            start_override: Some(start),
        }
    }

    /// Read a `w:lvlOverride` element
    pub fn from_element(elem: &RawXmlElement) -> Self {
        Self {
            ilvl: elem
                .attr("w:ilvl")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            start_override: elem
                .elements()
                .find(|c| c.local_name() == "startOverride")
                .and_then(w_val)
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Build the `w:lvlOverride` element
    pub fn to_element(&self) -> RawXmlElement {
        let elem = RawXmlElement::new("w:lvlOverride").with_attr("w:ilvl", self.ilvl.to_string());
        match self.start_override {
            Some(s) => elem.with_child(w_val_element("w:startOverride", s.to_string())),
            None => elem.empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_level_to_element() {
        let level = Level::new(1)
            .with_format(NumberFormat::Decimal)
            .with_text("%2.")
            .with_justification("start")
            .with_indent(1440, 360);

        assert_eq!(
            level.to_element().to_xml_string().unwrap(),
            concat!(
                r#"<w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="decimal"/>"#,
                r#"<w:lvlText w:val="%2."/><w:lvlJc w:val="start"/>"#,
                r#"<w:pPr><w:ind w:left="1440" w:hanging="360"/></w:pPr></w:lvl>"#
            )
        );
    }

    #[test]
    fn test_level_from_element() {
        let doc = XmlDocument::parse(
            br#"<w:lvl w:ilvl="2"><w:start w:val="3"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#9632;"/><w:pPr><w:ind w:start="2160" w:hanging="360"/></w:pPr><w:rPr><w:rFonts w:ascii="Symbol"/></w:rPr></w:lvl>"#,
        )
        .unwrap();
        let level = Level::from_element(&doc.root);

        assert_eq!(level.ilvl, 2);
        assert_eq!(level.start, Some(3));
        assert_eq!(level.num_fmt, Some(NumberFormat::Bullet));
        assert_eq!(level.level_text.as_deref(), Some("■"));
        assert_eq!(
            level.indent,
            Some(LevelIndent {
                left: 2160,
                hanging: 360
            })
        );
    }

    #[test]
    fn test_level_override_roundtrip() {
        let lo = LevelOverride::restart(0, 5);
        let elem = lo.to_element();
        assert_eq!(
            elem.to_xml_string().unwrap(),
            r#"<w:lvlOverride w:ilvl="0"><w:startOverride w:val="5"/></w:lvlOverride>"#
        );
        assert_eq!(LevelOverride::from_element(&elem), lo);
    }
}
