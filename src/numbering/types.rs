//! Numbering-related types and enums

use std::collections::BTreeMap;

/// Number format (`w:numFmt`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// 1, 2, 3
    Decimal,
    /// I, II, III
    UpperRoman,
    /// i, ii, iii
    LowerRoman,
    /// A, B, C
    UpperLetter,
    /// a, b, c
    LowerLetter,
    /// •
    Bullet,
    /// 01, 02, 03
    DecimalZero,
    /// None (no number)
    None,
    /// Other format (preserved as string)
    Other(String),
}

impl std::str::FromStr for NumberFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "decimal" => NumberFormat::Decimal,
            "upperRoman" => NumberFormat::UpperRoman,
            "lowerRoman" => NumberFormat::LowerRoman,
            "upperLetter" => NumberFormat::UpperLetter,
            "lowerLetter" => NumberFormat::LowerLetter,
            "bullet" => NumberFormat::Bullet,
            "decimalZero" => NumberFormat::DecimalZero,
            "none" => NumberFormat::None,
            other => NumberFormat::Other(other.to_string()),
        })
    }
}

impl NumberFormat {
    /// Convert to string
    pub fn as_str(&self) -> &str {
        match self {
            NumberFormat::Decimal => "decimal",
            NumberFormat::UpperRoman => "upperRoman",
            NumberFormat::LowerRoman => "lowerRoman",
            NumberFormat::UpperLetter => "upperLetter",
            NumberFormat::LowerLetter => "lowerLetter",
            NumberFormat::Bullet => "bullet",
            NumberFormat::DecimalZero => "decimalZero",
            NumberFormat::None => "none",
            NumberFormat::Other(s) => s,
        }
    }

    /// Check if this is a bullet format
    pub fn is_bullet(&self) -> bool {
        matches!(self, NumberFormat::Bullet)
    }
}

/// Shape of a generated list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListType {
    /// Decimal numbering (`1.`, `2.`, ...)
    Numbered,
    /// Bullet glyphs
    Bullet,
}

impl ListType {
    /// Infer the list shape from a reference name: any name containing
    /// `bullet` is a bullet list.
    pub fn from_reference(reference: &str) -> Self {
        if reference.contains("bullet") {
            ListType::Bullet
        } else {
            ListType::Numbered
        }
    }
}

/// Requested list for one numbering reference
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListConfig {
    /// Bullet or numbered
    pub list_type: ListType,
    /// Deepest level used by the content
    pub level: u8,
    /// First value of level 0 (1 when absent)
    pub start_number: Option<u32>,
}

impl ListConfig {
    /// Create a config starting at 1
    pub fn new(list_type: ListType, level: u8) -> Self {
        Self {
            list_type,
            level,
            start_number: None,
        }
    }

    /// Set the start number
    pub fn with_start_number(mut self, start: u32) -> Self {
        self.start_number = Some(start);
        self
    }
}

/// List configurations keyed by reference name, in name order
pub type ListConfigs = BTreeMap<String, ListConfig>;
