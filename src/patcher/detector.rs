//! Discover which placeholders a template contains

use crate::error::Result;
use crate::opc::Package;
use crate::xml::RawXmlElement;

use super::options::PlaceholderDelimiters;
use super::replacer::paragraph_text;

/// Name fragments marking a placeholder as a list patch
const LIST_MARKERS: [&str; 3] = ["_list", "_numbered", "_bullet"];

/// Placeholders found in a template, in order of first appearance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetectedPatches {
    pub placeholders: Vec<String>,
    /// Placeholders whose name suggests list content
    pub list_patches: Vec<String>,
}

impl DetectedPatches {
    fn add(&mut self, name: &str) {
        if self.placeholders.iter().any(|p| p == name) {
            return;
        }
        self.placeholders.push(name.to_string());
        if LIST_MARKERS.iter().any(|m| name.contains(m)) {
            self.list_patches.push(name.to_string());
        }
    }
}

/// Scan the XML parts under `word/` for `{{name}}` placeholders
pub fn detect_patches(data: &[u8]) -> Result<DetectedPatches> {
    detect_patches_with(data, &PlaceholderDelimiters::default())
}

/// Scan for placeholders wrapped in custom delimiters
pub fn detect_patches_with(data: &[u8], delimiters: &PlaceholderDelimiters) -> Result<DetectedPatches> {
    delimiters.validate()?;
    let package = Package::from_bytes(data)?;
    Ok(detect_in_package(&package, delimiters))
}

/// Scan an opened package
pub fn detect_in_package(package: &Package, delimiters: &PlaceholderDelimiters) -> DetectedPatches {
    let mut detected = DetectedPatches::default();

    for part in package.parts() {
        let uri = part.uri();
        if !uri.as_str().starts_with("/word/") || uri.is_relationships() {
            continue;
        }
        let Some(doc) = part.xml() else {
            continue;
        };
        scan(&doc.root, delimiters, &mut detected);
    }

    log::debug!(
        "Detected {} placeholders ({} list patches)",
        detected.placeholders.len(),
        detected.list_patches.len()
    );
    detected
}

fn scan(elem: &RawXmlElement, delimiters: &PlaceholderDelimiters, detected: &mut DetectedPatches) {
    if elem.name == "w:p" {
        for name in placeholder_names(&paragraph_text(elem), delimiters) {
            detected.add(name);
        }
    }
    for child in elem.elements() {
        scan(child, delimiters, detected);
    }
}

/// Non-empty names between the delimiters, shortest match first
fn placeholder_names<'a>(text: &'a str, delimiters: &PlaceholderDelimiters) -> Vec<&'a str> {
    let (start, end) = (delimiters.start.as_str(), delimiters.end.as_str());
    let mut names = Vec::new();
    let mut rest = text;

    while let Some(s) = rest.find(start) {
        let after = &rest[s + start.len()..];
        match after.find(end) {
            Some(0) => rest = after,
            Some(e) => {
                names.push(&after[..e]);
                rest = &after[e + end.len()..];
            }
            None => break,
        }
    }
    names
}
