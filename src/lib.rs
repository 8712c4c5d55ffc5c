//! # linch-docx-patch
//!
//! Fill placeholders in DOCX templates.
//!
//! ## Features
//!
//! - Replace `{{name}}` placeholders with paragraphs, tables, runs, hyperlinks or images
//! - Generated list numbering, merged with the template's own numbering
//! - Relationships, content types and styles kept consistent
//! - Untouched parts written back byte for byte
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linch_docx_patch::{patch_document, Paragraph, Patch, PatchOptions, PatchOutput, Patches, Run};
//!
//! let template = std::fs::read("template.docx")?;
//!
//! let mut patches = Patches::new();
//! patches.insert("greeting".into(), Patch::paragraph([Run::new("Hello").bold()]));
//! patches.insert(
//!     "items".into(),
//!     Patch::document([
//!         Paragraph::new("First").with_numbering("bullet-list-ref", 0),
//!         Paragraph::new("Second").with_numbering("bullet-list-ref", 0),
//!     ]),
//! );
//!
//! if let PatchOutput::Bytes(bytes) = patch_document(&template, &patches, &PatchOptions::default())? {
//!     std::fs::write("output.docx", bytes)?;
//! }
//! ```

pub mod content;
pub mod error;
pub mod numbering;
pub mod opc;
pub mod patcher;
pub mod styles;
pub mod xml;

pub use content::{
    Alignment, Block, ExternalHyperlink, Image, ImageType, Inline, InternalHyperlink, Paragraph,
    Run, Table, TableCell, TableRow,
};
pub use error::{Error, Result};
pub use numbering::{CompatibilityMapper, FreshAllocation, NumberingStrategy};
pub use opc::{Package, Part, PartUri};
pub use patcher::{
    detect_patches, patch_document, patch_package, DetectedPatches, OutputType, Patch,
    PatchContent, PatchOptions, PatchOutput, Patches, PlaceholderDelimiters,
};
pub use styles::{StyleRecord, StyleType};
