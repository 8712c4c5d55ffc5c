//! Styles (styles.xml)
//!
//! Master style records read from the template, the style ids patch content
//! refers to, and the [`StyleMapper`] that decides which id each of them is
//! emitted under.

mod mapper;
mod record;

pub use mapper::StyleMapper;
pub use record::{StyleRecord, StyleType};

use std::collections::BTreeSet;

use crate::error::Result;
use crate::opc::{well_known, Package};
use crate::patcher::PatchContent;
use crate::xml::{RawXmlElement, RawXmlNode, W};

/// Every style defined in the template's styles.xml, in document order.
/// A template without styles.xml has no master styles.
pub fn extract_master_styles(package: &Package) -> Result<Vec<StyleRecord>> {
    let Some(part) = package.part(&well_known::styles()) else {
        return Ok(Vec::new());
    };
    let Some(doc) = part.xml() else {
        log::warn!("styles.xml is not readable XML, ignoring master styles");
        return Ok(Vec::new());
    };

    let styles: Vec<StyleRecord> = doc
        .root
        .elements()
        .filter(|e| e.name == "w:style")
        .filter_map(StyleRecord::from_element)
        .collect();

    log::debug!("Found {} master styles", styles.len());
    Ok(styles)
}

/// Style ids referenced by a patch's content (paragraph, run and table
/// styles, through tables and hyperlinks)
pub fn extract_patch_style_ids(content: &PatchContent) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    content.collect_style_ids(&mut ids);
    ids
}

/// Supplied definitions for `ids`, followed through their `w:basedOn` chain
/// as far as the supplied set reaches
pub fn patch_style_records(ids: &BTreeSet<String>, supplied: &[StyleRecord]) -> Vec<StyleRecord> {
    let mut pending: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut seen = BTreeSet::new();
    let mut records = Vec::new();

    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(style) = supplied.iter().find(|s| s.id == id) {
            if let Some(parent) = style.based_on.as_deref() {
                pending.push(parent);
            }
            records.push(style.clone());
        }
    }

    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

/// Root of an empty styles.xml
pub fn empty_styles_root() -> RawXmlElement {
    RawXmlElement::new("w:styles").with_attr("xmlns:w", W)
}

/// Append definitions to a `w:styles` root. Ids already defined are skipped.
/// Returns whether anything was added.
pub fn append_styles(root: &mut RawXmlElement, styles: &[StyleRecord]) -> bool {
    let mut added = false;
    for style in styles {
        let exists = root
            .elements()
            .any(|e| e.name == "w:style" && e.attr("w:styleId") == Some(style.id.as_str()));
        if !exists {
            root.children.push(RawXmlNode::Element(style.to_element()));
            added = true;
        }
    }
    if added {
        root.self_closing = false;
    }
    added
}
