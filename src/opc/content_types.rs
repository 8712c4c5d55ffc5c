//! Content Types handling for OPC packages
//!
//! Reads and writes `[Content_Types].xml`. Entries keep their document order
//! and registration only ever appends.

use crate::error::{Error, Result};
use crate::opc::PartUri;
use crate::xml::{RawXmlElement, XmlDocument, CT};

/// Content types definition for an OPC package
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentTypes {
    entries: Vec<ContentTypeEntry>,
}

/// One `<Default>` or `<Override>` declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentTypeEntry {
    /// Extension mapping, extension stored lowercase
    Default {
        extension: String,
        content_type: String,
    },
    /// Mapping for a single part
    Override {
        part_name: PartUri,
        content_type: String,
    },
}

impl ContentTypes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = XmlDocument::parse(xml.as_bytes())?;
        Self::from_element(&doc.root)
    }

    /// Read from a parsed `<Types>` root element
    pub fn from_element(root: &RawXmlElement) -> Result<Self> {
        let mut entries = Vec::new();

        for elem in root.elements() {
            match elem.local_name() {
                "Default" => entries.push(ContentTypeEntry::Default {
                    extension: required(elem, "Extension")?.to_lowercase(),
                    content_type: required(elem, "ContentType")?.to_string(),
                }),
                "Override" => entries.push(ContentTypeEntry::Override {
                    part_name: PartUri::new(required(elem, "PartName")?)?,
                    content_type: required(elem, "ContentType")?.to_string(),
                }),
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    /// Build the `[Content_Types].xml` part
    pub fn to_document(&self) -> XmlDocument {
        let root = RawXmlElement::new("Types")
            .with_attr("xmlns", CT)
            .with_children(self.entries.iter().map(|entry| match entry {
                ContentTypeEntry::Default {
                    extension,
                    content_type,
                } => RawXmlElement::new("Default")
                    .with_attr("Extension", extension.as_str())
                    .with_attr("ContentType", content_type.as_str())
                    .empty(),
                ContentTypeEntry::Override {
                    part_name,
                    content_type,
                } => RawXmlElement::new("Override")
                    .with_attr("PartName", part_name.as_str())
                    .with_attr("ContentType", content_type.as_str())
                    .empty(),
            }));

        XmlDocument::new(root)
    }

    /// Serialize to XML string
    pub fn to_xml(&self) -> Result<String> {
        self.to_document().to_xml()
    }

    /// Register an extension default unless one exists for that extension.
    ///
    /// Returns whether an entry was appended.
    pub fn add_default_if_absent(&mut self, extension: &str, content_type: &str) -> bool {
        let extension = extension.to_lowercase();
        if self.default_for(&extension).is_some() {
            return false;
        }
        self.entries.push(ContentTypeEntry::Default {
            extension,
            content_type: content_type.to_string(),
        });
        true
    }

    /// Register a part override unless the part already has one.
    ///
    /// Returns whether an entry was appended.
    pub fn add_override_if_absent(&mut self, uri: &PartUri, content_type: &str) -> bool {
        if self.override_for(uri).is_some() {
            return false;
        }
        self.entries.push(ContentTypeEntry::Override {
            part_name: uri.clone(),
            content_type: content_type.to_string(),
        });
        true
    }

    /// Content type declared for an extension
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            ContentTypeEntry::Default {
                extension: ext,
                content_type,
            } if ext.eq_ignore_ascii_case(extension) => Some(content_type.as_str()),
            _ => None,
        })
    }

    /// Content type declared for a specific part
    pub fn override_for(&self, uri: &PartUri) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            ContentTypeEntry::Override {
                part_name,
                content_type,
            } if part_name == uri => Some(content_type.as_str()),
            _ => None,
        })
    }

    /// Get the content type for a part
    pub fn get(&self, uri: &PartUri) -> Option<&str> {
        self.override_for(uri)
            .or_else(|| uri.extension().and_then(|ext| self.default_for(ext)))
    }

    /// Iterate over the declarations in document order
    pub fn iter(&self) -> impl Iterator<Item = &ContentTypeEntry> {
        self.entries.iter()
    }
}

fn required<'a>(elem: &'a RawXmlElement, attr: &str) -> Result<&'a str> {
    elem.attr(attr).ok_or_else(|| Error::MissingAttribute {
        element: elem.name.clone(),
        attr: attr.into(),
    })
}

/// Image extensions a patched document may embed, with their media types
pub const IMAGE_DEFAULTS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
];

// Common content types
pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const XML: &str = "application/xml";
pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
pub const NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
