//! Relationship registries (`_rels/*.rels` parts)
//!
//! A registry keeps its entries in document order so that re-serializing an
//! untouched registry reproduces the same relationship sequence, and new ids
//! are allocated deterministically.

use crate::error::{Error, Result};
use crate::xml::{RawXmlElement, XmlDocument, PR};

/// Base value returned by [`Relationships::next_index`] for an empty registry
pub const FIRST_RELATIONSHIP_INDEX: u32 = 1;

/// Collection of relationships scoped to one source part
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

/// A single relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute) or external URL
    pub target: String,
    /// Target mode
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target (part within the package)
    #[default]
    Internal,
    /// External target (hyperlink, etc.)
    External,
}

impl Relationships {
    /// Create empty relationships
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = XmlDocument::parse(xml.as_bytes())?;
        Self::from_element(&doc.root)
    }

    /// Read from a parsed `<Relationships>` root element
    pub fn from_element(root: &RawXmlElement) -> Result<Self> {
        let items = root
            .elements()
            .filter(|e| e.local_name() == "Relationship")
            .map(parse_relationship)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { items })
    }

    /// Build the XML part for this registry
    pub fn to_document(&self) -> XmlDocument {
        let root = RawXmlElement::new("Relationships")
            .with_attr("xmlns", PR)
            .with_children(self.items.iter().map(|rel| {
                let mut elem = RawXmlElement::new("Relationship")
                    .with_attr("Id", rel.id.as_str())
                    .with_attr("Type", rel.rel_type.as_str())
                    .with_attr("Target", rel.target.as_str())
                    .empty();
                if rel.target_mode == TargetMode::External {
                    elem = elem.with_attr("TargetMode", "External");
                }
                elem
            }));

        XmlDocument::new(root)
    }

    /// Serialize to XML string
    pub fn to_xml(&self) -> Result<String> {
        self.to_document().to_xml()
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get a relationship by type (returns first match)
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Whether any relationship of the given type exists
    pub fn has_type(&self, rel_type: &str) -> bool {
        self.by_type(rel_type).is_some()
    }

    /// Whether the id is already taken
    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// One greater than the largest numeric `rIdN` in use, or
    /// [`FIRST_RELATIONSHIP_INDEX`] when none exist
    pub fn next_index(&self) -> u32 {
        self.items
            .iter()
            .filter_map(|r| relationship_index(&r.id))
            .max()
            .map(|max| max + 1)
            .unwrap_or(FIRST_RELATIONSHIP_INDEX)
    }

    /// Append a relationship with a caller-chosen ID.
    ///
    /// The caller is responsible for the ID being unique within the registry.
    pub fn add_with_id(&mut self, id: &str, rel_type: &str, target: &str, mode: TargetMode) {
        self.items.push(Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: mode,
        });
    }

    /// Append an internal relationship with the next free `rIdN` and return its ID
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = format!("rId{}", self.next_index());
        self.add_with_id(&id, rel_type, target, TargetMode::Internal);
        id
    }

    /// Iterate over all relationships in document order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Numeric part of an `rIdN` identifier
pub fn relationship_index(id: &str) -> Option<u32> {
    id.strip_prefix("rId")?.parse().ok()
}

fn parse_relationship(element: &RawXmlElement) -> Result<Relationship> {
    let required = |attr: &str| {
        element
            .attr(attr)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingAttribute {
                element: "Relationship".into(),
                attr: attr.into(),
            })
    };

    let target_mode = match element.attr("TargetMode") {
        Some("External") => TargetMode::External,
        _ => TargetMode::Internal,
    };

    Ok(Relationship {
        id: required("Id")?,
        rel_type: required("Type")?,
        target: required("Target")?,
        target_mode,
    })
}

// Well-known relationship types
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}
