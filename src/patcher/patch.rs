//! Replacement content bound to a placeholder name

use std::collections::{BTreeMap, BTreeSet};

use crate::content::{Block, Inline, NumberingReference, Paragraph};
use crate::numbering::{ListConfig, ListConfigs, ListType};
use crate::styles::StyleRecord;

/// Patches keyed by placeholder name
pub type Patches = BTreeMap<String, Patch>;

/// What a placeholder is replaced with
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchContent {
    /// Blocks replacing the whole paragraph that holds the placeholder
    Document(Vec<Block>),
    /// Inline content replacing just the placeholder text
    Paragraph(Vec<Inline>),
}

/// A patch: content plus the style definitions it brings along
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub content: PatchContent,
    /// Definitions for styles the content refers to
    pub styles: Vec<StyleRecord>,
}

impl Patch {
    /// Document-level patch
    pub fn document<I, B>(children: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Block>,
    {
        Self {
            content: PatchContent::Document(children.into_iter().map(Into::into).collect()),
            styles: Vec::new(),
        }
    }

    /// Paragraph-level patch
    pub fn paragraph<I, T>(children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Inline>,
    {
        Self {
            content: PatchContent::Paragraph(children.into_iter().map(Into::into).collect()),
            styles: Vec::new(),
        }
    }

    /// Attach style definitions
    pub fn with_styles(mut self, styles: Vec<StyleRecord>) -> Self {
        self.styles = styles;
        self
    }
}

impl PatchContent {
    pub(crate) fn collect_style_ids(&self, ids: &mut BTreeSet<String>) {
        match self {
            PatchContent::Document(blocks) => {
                for block in blocks {
                    block.collect_style_ids(ids);
                }
            }
            PatchContent::Paragraph(inlines) => {
                for inline in inlines {
                    inline.collect_style_ids(ids);
                }
            }
        }
    }

    /// Every paragraph of a document-level patch, tables included
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        if let PatchContent::Document(blocks) = self {
            for block in blocks {
                block.collect_paragraphs(&mut out);
            }
        }
        out
    }
}

/// List usage gathered from all document-level patches before substitution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberingIntents {
    /// One configuration per reference
    pub configs: ListConfigs,
    /// Every `(reference, instance)` pair in use
    pub instances: BTreeSet<(String, u32)>,
}

impl NumberingIntents {
    /// Scan document-level patches. The list type follows the reference name
    /// and the level is the deepest level used with that reference.
    pub fn collect(patches: &Patches) -> Self {
        let mut intents = NumberingIntents::default();

        for patch in patches.values() {
            for paragraph in patch.content.paragraphs() {
                if let Some(numbering) = paragraph.numbering() {
                    intents.record(numbering);
                }
            }
        }

        intents
    }

    fn record(&mut self, numbering: &NumberingReference) {
        let config = self
            .configs
            .entry(numbering.reference.clone())
            .or_insert_with(|| {
                ListConfig::new(ListType::from_reference(&numbering.reference), numbering.level)
            });
        config.level = config.level.max(numbering.level);
        self.instances
            .insert((numbering.reference.clone(), numbering.instance));
    }

    /// Check if no list is used
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
