//! XML utilities and lossless element trees for package parts

mod document;
mod namespace;
mod raw;

pub use document::{XmlDeclaration, XmlDocument};
pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

/// Helper to get the w:val attribute (common in OOXML)
pub fn w_val(element: &RawXmlElement) -> Option<&str> {
    element.attr("w:val").or_else(|| element.attr("val"))
}

/// Build an empty `<name w:val="..."/>` element
pub fn w_val_element(name: &str, value: impl Into<String>) -> RawXmlElement {
    RawXmlElement::new(name).with_attr("w:val", value).empty()
}
