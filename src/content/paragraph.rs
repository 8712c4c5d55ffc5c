//! Paragraph element (w:p)

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::numbering::{numbering_token, MAX_LEVEL};
use crate::xml::{w_val_element, RawXmlElement};

use super::{Inline, RenderContext, Run};

/// Paragraph element (w:p)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph properties
    pub properties: ParagraphProperties,
    /// Paragraph content
    pub children: Vec<Inline>,
}

/// Paragraph properties (w:pPr)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParagraphProperties {
    /// Style ID
    pub style: Option<String>,
    /// Justification
    pub alignment: Option<Alignment>,
    /// List membership
    pub numbering: Option<NumberingReference>,
    /// Start on a new page
    pub page_break_before: bool,
    /// Spacing before, in twips
    pub spacing_before: Option<u32>,
    /// Spacing after, in twips
    pub spacing_after: Option<u32>,
}

/// Paragraph justification (`w:jc`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Start,
    Left,
    Center,
    Right,
    End,
    Both,
}

impl Alignment {
    /// Convert to OOXML string value
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::End => "end",
            Alignment::Both => "both",
        }
    }
}

/// Binds a paragraph to a list: all paragraphs sharing `reference` and
/// `instance` continue the same numbering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberingReference {
    pub reference: String,
    pub level: u8,
    pub instance: u32,
}

impl Paragraph {
    /// Create a new paragraph with text
    pub fn new(text: impl Into<String>) -> Self {
        Paragraph {
            children: vec![Inline::Run(Run::new(text))],
            ..Default::default()
        }
    }

    /// Create a paragraph with no content
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a run
    pub fn with_run(mut self, run: Run) -> Self {
        self.children.push(Inline::Run(run));
        self
    }

    /// Append any inline content
    pub fn with_child(mut self, child: impl Into<Inline>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Set style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.properties.style = Some(style.into());
        self
    }

    /// Set justification
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.properties.alignment = Some(alignment);
        self
    }

    /// Put the paragraph in list `reference` (instance 0) at `level`
    pub fn with_numbering(self, reference: impl Into<String>, level: u8) -> Self {
        self.with_numbering_instance(reference, level, 0)
    }

    /// Put the paragraph in a specific instance of list `reference`; each
    /// instance restarts numbering
    pub fn with_numbering_instance(
        mut self,
        reference: impl Into<String>,
        level: u8,
        instance: u32,
    ) -> Self {
        self.properties.numbering = Some(NumberingReference {
            reference: reference.into(),
            level,
            instance,
        });
        self
    }

    /// Start on a new page
    pub fn with_page_break_before(mut self) -> Self {
        self.properties.page_break_before = true;
        self
    }

    /// Set spacing before and after, in twips
    pub fn with_spacing(mut self, before: u32, after: u32) -> Self {
        self.properties.spacing_before = Some(before);
        self.properties.spacing_after = Some(after);
        self
    }

    /// Get all text in this paragraph
    pub fn text(&self) -> String {
        self.children.iter().map(Inline::text).collect()
    }

    /// Get style ID
    pub fn style(&self) -> Option<&str> {
        self.properties.style.as_deref()
    }

    /// List membership, if any
    pub fn numbering(&self) -> Option<&NumberingReference> {
        self.properties.numbering.as_ref()
    }

    pub(crate) fn collect_style_ids(&self, ids: &mut BTreeSet<String>) {
        if let Some(style) = &self.properties.style {
            ids.insert(style.clone());
        }
        for child in &self.children {
            child.collect_style_ids(ids);
        }
    }

    /// Build the `w:p` element
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<RawXmlElement> {
        let mut p = RawXmlElement::new("w:p");
        if let Some(ppr) = self.properties.render(ctx)? {
            p = p.with_child(ppr);
        }
        for child in &self.children {
            p = p.with_child(child.render(ctx));
        }
        Ok(p)
    }
}

impl ParagraphProperties {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<Option<RawXmlElement>> {
        let mut children = Vec::new();

        if let Some(style) = &self.style {
            children.push(w_val_element("w:pStyle", ctx.styles.map(style)));
        }
        if self.page_break_before {
            children.push(RawXmlElement::new("w:pageBreakBefore").empty());
        }
        if let Some(numbering) = &self.numbering {
            if ctx
                .numbering
                .resolve(&numbering.reference, numbering.instance)
                .is_none()
            {
                return Err(Error::UnresolvedNumberingReference {
                    patch: ctx.patch.to_string(),
                    reference: numbering.reference.clone(),
                });
            }
            children.push(
                RawXmlElement::new("w:numPr")
                    .with_child(w_val_element(
                        "w:ilvl",
                        numbering.level.min(MAX_LEVEL).to_string(),
                    ))
                    .with_child(w_val_element(
                        "w:numId",
                        numbering_token(&numbering.reference, numbering.instance),
                    )),
            );
        }
        if self.spacing_before.is_some() || self.spacing_after.is_some() {
            let mut spacing = RawXmlElement::new("w:spacing");
            if let Some(before) = self.spacing_before {
                spacing = spacing.with_attr("w:before", before.to_string());
            }
            if let Some(after) = self.spacing_after {
                spacing = spacing.with_attr("w:after", after.to_string());
            }
            children.push(spacing.empty());
        }
        if let Some(alignment) = self.alignment {
            children.push(w_val_element("w:jc", alignment.as_str()));
        }

        Ok((!children.is_empty()).then(|| RawXmlElement::new("w:pPr").with_children(children)))
    }
}
