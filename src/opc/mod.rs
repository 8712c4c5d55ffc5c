//! Open Packaging Convention (OPC) implementation
//!
//! This module handles the ZIP-based package format used by DOCX files.

pub mod content_types;
mod package;
mod part;
mod part_uri;
mod relationships;

pub use content_types::{ContentTypeEntry, ContentTypes};
pub use package::Package;
pub use part::{Part, PartData};
pub use part_uri::{well_known, PartUri};
pub use relationships::{
    rel_types, relationship_index, Relationship, Relationships, TargetMode,
    FIRST_RELATIONSHIP_INDEX,
};
