//! Replacement content
//!
//! Patches carry trees of [`Block`] or [`Inline`] nodes. Rendering turns them
//! into WordprocessingML elements against a [`RenderContext`], which maps
//! style ids, checks numbering references and records the media and
//! hyperlinks the content introduces.

mod hyperlink;
mod image;
mod paragraph;
mod run;
mod table;

pub use hyperlink::{ConcreteHyperlink, ExternalHyperlink, HyperlinkAllocator, InternalHyperlink};
pub use image::{media_token, Image, ImageType, MediaCollection, MediaItem, EMU_PER_PIXEL};
pub use paragraph::{Alignment, NumberingReference, Paragraph, ParagraphProperties};
pub use run::{BreakType, Run, RunContent, RunProperties};
pub use table::{Table, TableCell, TableRow};

use std::collections::BTreeSet;

use crate::error::Result;
use crate::numbering::NumberingReferenceMap;
use crate::styles::StyleMapper;
use crate::xml::RawXmlElement;

/// Block-level content
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Content inside a paragraph
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Run(Run),
    ExternalHyperlink(ExternalHyperlink),
    InternalHyperlink(InternalHyperlink),
    ConcreteHyperlink(ConcreteHyperlink),
    Image(Image),
}

/// Everything rendering consults or records
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Name of the patch being rendered (for error context)
    pub patch: &'a str,
    pub styles: &'a StyleMapper,
    pub numbering: &'a NumberingReferenceMap,
    pub media: &'a mut MediaCollection,
    pub hyperlinks: &'a mut HyperlinkAllocator,
}

impl Block {
    /// Build the block element
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<RawXmlElement> {
        match self {
            Block::Paragraph(p) => p.render(ctx),
            Block::Table(t) => t.render(ctx),
        }
    }

    pub(crate) fn collect_style_ids(&self, ids: &mut BTreeSet<String>) {
        match self {
            Block::Paragraph(p) => p.collect_style_ids(ids),
            Block::Table(t) => t.collect_style_ids(ids),
        }
    }

    pub(crate) fn collect_paragraphs<'a>(&'a self, out: &mut Vec<&'a Paragraph>) {
        match self {
            Block::Paragraph(p) => out.push(p),
            Block::Table(t) => out.extend(t.paragraphs()),
        }
    }
}

impl Inline {
    /// Build the inline element
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> RawXmlElement {
        match self {
            Inline::Run(run) => run.render(ctx),
            Inline::ExternalHyperlink(link) => link.render(ctx),
            Inline::InternalHyperlink(link) => link.render(ctx),
            Inline::ConcreteHyperlink(link) => link.render(ctx),
            Inline::Image(image) => image.render(ctx),
        }
    }

    /// Visible text
    pub fn text(&self) -> String {
        match self {
            Inline::Run(run) => run.text(),
            Inline::ExternalHyperlink(ExternalHyperlink { children, .. })
            | Inline::InternalHyperlink(InternalHyperlink { children, .. })
            | Inline::ConcreteHyperlink(ConcreteHyperlink { children, .. }) => {
                children.iter().map(Run::text).collect()
            }
            Inline::Image(_) => String::new(),
        }
    }

    pub(crate) fn collect_style_ids(&self, ids: &mut BTreeSet<String>) {
        match self {
            Inline::Run(run) => run.collect_style_ids(ids),
            Inline::ExternalHyperlink(ExternalHyperlink { children, .. })
            | Inline::InternalHyperlink(InternalHyperlink { children, .. })
            | Inline::ConcreteHyperlink(ConcreteHyperlink { children, .. }) => {
                hyperlink::collect_run_styles(children, ids)
            }
            Inline::Image(_) => {}
        }
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

impl From<Run> for Inline {
    fn from(run: Run) -> Self {
        Inline::Run(run)
    }
}

impl From<ExternalHyperlink> for Inline {
    fn from(link: ExternalHyperlink) -> Self {
        Inline::ExternalHyperlink(link)
    }
}

impl From<InternalHyperlink> for Inline {
    fn from(link: InternalHyperlink) -> Self {
        Inline::InternalHyperlink(link)
    }
}

impl From<ConcreteHyperlink> for Inline {
    fn from(link: ConcreteHyperlink) -> Self {
        Inline::ConcreteHyperlink(link)
    }
}

impl From<Image> for Inline {
    fn from(image: Image) -> Self {
        Inline::Image(image)
    }
}

/// Owns what a [`RenderContext`] borrows
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RenderScope {
    pub styles: StyleMapper,
    pub numbering: NumberingReferenceMap,
    pub media: MediaCollection,
    pub hyperlinks: HyperlinkAllocator,
}

#[cfg(test)]
impl RenderScope {
    pub fn context(&mut self) -> RenderContext<'_> {
        RenderContext {
            patch: "test",
            styles: &self.styles,
            numbering: &self.numbering,
            media: &mut self.media,
            hyperlinks: &mut self.hyperlinks,
        }
    }
}
