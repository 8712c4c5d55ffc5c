//! Part representation for OPC packages

use crate::error::Result;
use crate::opc::PartUri;
use crate::xml::XmlDocument;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decoded content of a part
#[derive(Clone, Debug)]
pub enum PartData {
    /// XML or relationship part parsed into a tree
    Xml(XmlDocument),
    /// Anything carried through as opaque bytes
    Binary(Vec<u8>),
}

/// A part within an OPC package
#[derive(Clone, Debug)]
pub struct Part {
    /// Part URI
    uri: PartUri,
    /// Decoded data
    data: PartData,
    /// Bytes as read from the archive (or as supplied for new binary parts)
    raw: Vec<u8>,
    /// Whether the part must be re-serialized on save
    modified: bool,
}

impl Part {
    /// Classify and decode bytes read from the archive.
    ///
    /// Parts starting with a UTF-16 byte-order mark, and parts whose name
    /// does not end in `.xml` or `.rels`, stay opaque. XML that fails to
    /// parse is kept as bytes as well.
    pub fn from_raw(uri: PartUri, raw: Vec<u8>) -> Self {
        let data = if is_utf16(&raw) || !is_xml_name(&uri) {
            PartData::Binary(raw.clone())
        } else {
            let body = raw.strip_prefix(UTF8_BOM).unwrap_or(raw.as_slice());
            match XmlDocument::parse(body) {
                Ok(doc) => PartData::Xml(doc),
                Err(e) => {
                    log::warn!("Keeping {} as opaque bytes: {}", uri, e);
                    PartData::Binary(raw.clone())
                }
            }
        };

        Self {
            uri,
            data,
            raw,
            modified: false,
        }
    }

    /// Create a new XML part
    pub fn new_xml(uri: PartUri, doc: XmlDocument) -> Self {
        Self {
            uri,
            data: PartData::Xml(doc),
            raw: Vec::new(),
            modified: true,
        }
    }

    /// Create a new binary part
    pub fn new_binary(uri: PartUri, bytes: Vec<u8>) -> Self {
        Self {
            uri,
            data: PartData::Binary(bytes.clone()),
            raw: bytes,
            modified: false,
        }
    }

    /// Get the part URI
    pub fn uri(&self) -> &PartUri {
        &self.uri
    }

    /// Get the decoded data
    pub fn data(&self) -> &PartData {
        &self.data
    }

    /// Parsed XML tree, if this is an XML part
    pub fn xml(&self) -> Option<&XmlDocument> {
        match &self.data {
            PartData::Xml(doc) => Some(doc),
            PartData::Binary(_) => None,
        }
    }

    /// Whether the part was classified as XML
    pub fn is_xml(&self) -> bool {
        matches!(self.data, PartData::Xml(_))
    }

    /// Run `edit` against the XML tree; the part is marked modified when
    /// `edit` reports a change. Binary parts are left alone.
    pub fn update_xml<F>(&mut self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut XmlDocument) -> Result<bool>,
    {
        let PartData::Xml(doc) = &mut self.data else {
            return Ok(false);
        };
        let changed = edit(doc)?;
        if changed {
            self.modified = true;
        }
        Ok(changed)
    }

    /// Replace the XML tree and mark the part modified
    pub fn set_xml(&mut self, doc: XmlDocument) {
        self.data = PartData::Xml(doc);
        self.modified = true;
    }

    /// Check if the part has been modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Bytes to write on save: the original bytes unless modified
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match &self.data {
            PartData::Xml(doc) if self.modified => doc.to_bytes(),
            PartData::Binary(bytes) if self.modified => Ok(bytes.clone()),
            _ => Ok(self.raw.clone()),
        }
    }
}

fn is_utf16(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF])
}

fn is_xml_name(uri: &PartUri) -> bool {
    matches!(uri.extension(), Some(ext) if ext.eq_ignore_ascii_case("xml") || ext.eq_ignore_ascii_case("rels"))
}
