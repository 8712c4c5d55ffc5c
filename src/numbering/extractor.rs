//! Read-only projection of an existing numbering part

use crate::xml::{w_val, RawXmlElement};

/// One numbering instance found in a template, with its abstract definition's levels
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExistingNumbering {
    pub abstract_num_id: String,
    pub num_id: String,
    pub levels: Vec<ExistingLevel>,
}

/// Level summary of an existing definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExistingLevel {
    /// `w:ilvl` as written
    pub level: Option<String>,
    /// `w:numFmt` value
    pub format: Option<String>,
    /// `w:lvlText` value
    pub text: Option<String>,
}

impl ExistingNumbering {
    /// Whether the first level uses the `bullet` format
    pub fn is_bullet(&self) -> bool {
        self.levels
            .first()
            .and_then(|l| l.format.as_deref())
            .is_some_and(|f| f == "bullet")
    }
}

/// Collect every `w:num` below `root` (at any depth) and resolve it to its
/// `w:abstractNum`. Instances whose abstract definition is missing are skipped.
pub fn extract_existing_numbering(root: Option<&RawXmlElement>) -> Vec<ExistingNumbering> {
    let Some(root) = root else {
        return Vec::new();
    };

    let mut nums = Vec::new();
    let mut abstract_nums = Vec::new();
    collect(root, &mut nums, &mut abstract_nums);

    nums.into_iter()
        .filter_map(|num| {
            let num_id = num.attr("w:numId").unwrap_or_default().to_string();
            let abstract_num_id = num
                .elements()
                .find(|e| e.name == "w:abstractNumId")
                .and_then(w_val)
                .unwrap_or_default()
                .to_string();

            let abstract_num = abstract_nums
                .iter()
                .find(|a| a.attr("w:abstractNumId") == Some(abstract_num_id.as_str()))?;

            let levels = abstract_num
                .find_all("w:lvl")
                .into_iter()
                .map(|lvl| ExistingLevel {
                    level: lvl.attr("w:ilvl").map(str::to_string),
                    format: child_val(lvl, "w:numFmt"),
                    text: child_val(lvl, "w:lvlText"),
                })
                .collect();

            Some(ExistingNumbering {
                abstract_num_id,
                num_id,
                levels,
            })
        })
        .collect()
}

fn collect<'a>(
    elem: &'a RawXmlElement,
    nums: &mut Vec<&'a RawXmlElement>,
    abstract_nums: &mut Vec<&'a RawXmlElement>,
) {
    for child in elem.elements() {
        match child.name.as_str() {
            "w:num" => nums.push(child),
            "w:abstractNum" => abstract_nums.push(child),
            _ => {}
        }
        collect(child, nums, abstract_nums);
    }
}

fn child_val(elem: &RawXmlElement, name: &str) -> Option<String> {
    elem.child(name).and_then(w_val).map(str::to_string)
}
