//! XML namespaces used in OOXML

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Relationships namespace
pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Drawing namespace
pub const WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// DrawingML main namespace
pub const A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// Pictures namespace
pub const PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// Markup compatibility namespace
pub const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
/// Word 2012 extensions namespace
pub const W15: &str = "http://schemas.microsoft.com/office/word/2012/wordml";
/// Office math namespace
pub const M: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
/// Content Types namespace
pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
/// Package Relationships namespace
pub const PR: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace declarations patched content may rely on in document.xml
pub fn document_namespaces() -> Vec<(&'static str, &'static str)> {
    vec![
        ("xmlns:mc", MC),
        ("xmlns:wp", WP),
        ("xmlns:r", R),
        ("xmlns:w15", W15),
        ("xmlns:m", M),
    ]
}

/// Prefix that must be listed in `mc:Ignorable` once `w15` is declared
pub const IGNORABLE_PREFIX: &str = "w15";
