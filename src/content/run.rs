//! Run element (w:r) - a contiguous run of text with uniform formatting

use std::collections::BTreeSet;

use crate::xml::{w_val_element, RawXmlElement};

use super::RenderContext;

/// Run element (w:r)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    /// Run properties
    pub properties: RunProperties,
    /// Run content
    pub content: Vec<RunContent>,
}

/// Content within a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunContent {
    /// Text (w:t)
    Text(String),
    /// Tab (w:tab)
    Tab,
    /// Break (w:br)
    Break(BreakType),
}

/// Break type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    #[default]
    TextWrapping,
    Page,
    Column,
}

/// Run properties (w:rPr)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Style ID
    pub style: Option<String>,
    /// Bold
    pub bold: Option<bool>,
    /// Italic
    pub italic: Option<bool>,
    /// Underline type
    pub underline: Option<String>,
    /// Strike-through
    pub strike: Option<bool>,
    /// Font size (in half-points, e.g., 24 = 12pt)
    pub size: Option<u32>,
    /// Color (RGB hex)
    pub color: Option<String>,
    /// Highlight color
    pub highlight: Option<String>,
    /// Font (ASCII and high ANSI)
    pub font: Option<String>,
}

impl Run {
    /// Create a new run with text
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            content: vec![RunContent::Text(text.into())],
            ..Default::default()
        }
    }

    /// Create a run holding a page break
    pub fn page_break() -> Self {
        Run {
            content: vec![RunContent::Break(BreakType::Page)],
            ..Default::default()
        }
    }

    /// Set character style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.properties.style = Some(style.into());
        self
    }

    /// Set bold
    pub fn bold(mut self) -> Self {
        self.properties.bold = Some(true);
        self
    }

    /// Set italic
    pub fn italic(mut self) -> Self {
        self.properties.italic = Some(true);
        self
    }

    /// Set underline type (e.g. "single")
    pub fn underline(mut self, kind: impl Into<String>) -> Self {
        self.properties.underline = Some(kind.into());
        self
    }

    /// Set strike-through
    pub fn strike(mut self) -> Self {
        self.properties.strike = Some(true);
        self
    }

    /// Set font size in points
    pub fn size_pt(mut self, size: f32) -> Self {
        self.properties.size = Some((size * 2.0) as u32);
        self
    }

    /// Set color (RGB hex string)
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.properties.color = Some(color.into());
        self
    }

    /// Set highlight color
    pub fn highlight(mut self, color: impl Into<String>) -> Self {
        self.properties.highlight = Some(color.into());
        self
    }

    /// Set font
    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.properties.font = Some(font.into());
        self
    }

    /// Append a tab
    pub fn with_tab(mut self) -> Self {
        self.content.push(RunContent::Tab);
        self
    }

    /// Append a line break
    pub fn with_break(mut self) -> Self {
        self.content.push(RunContent::Break(BreakType::TextWrapping));
        self
    }

    /// Append text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(RunContent::Text(text.into()));
        self
    }

    /// Get text in this run
    pub fn text(&self) -> String {
        let mut result = String::new();
        for content in &self.content {
            match content {
                RunContent::Text(t) => result.push_str(t),
                RunContent::Tab => result.push('\t'),
                RunContent::Break(_) => result.push('\n'),
            }
        }
        result
    }

    pub(crate) fn collect_style_ids(&self, ids: &mut BTreeSet<String>) {
        if let Some(style) = &self.properties.style {
            ids.insert(style.clone());
        }
    }

    /// Build the `w:r` element
    pub fn render(&self, ctx: &RenderContext<'_>) -> RawXmlElement {
        let mut run = RawXmlElement::new("w:r");
        if let Some(rpr) = self.properties.render(ctx) {
            run = run.with_child(rpr);
        }
        run.with_children(self.content.iter().map(RunContent::render))
    }
}

impl RunContent {
    fn render(&self) -> RawXmlElement {
        match self {
            RunContent::Text(text) => {
                let mut t = RawXmlElement::new("w:t");
                // Preserve space if text has leading/trailing whitespace
                if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
                    t = t.with_attr("xml:space", "preserve");
                }
                t.with_text(text.as_str())
            }
            RunContent::Tab => RawXmlElement::new("w:tab").empty(),
            RunContent::Break(break_type) => {
                let br = RawXmlElement::new("w:br");
                match break_type {
                    BreakType::Page => br.with_attr("w:type", "page"),
                    BreakType::Column => br.with_attr("w:type", "column"),
                    BreakType::TextWrapping => br,
                }
                .empty()
            }
        }
    }
}

impl RunProperties {
    /// Build `w:rPr`, or `None` when no property is set
    fn render(&self, ctx: &RenderContext<'_>) -> Option<RawXmlElement> {
        let mut children = Vec::new();

        if let Some(style) = &self.style {
            children.push(w_val_element("w:rStyle", ctx.styles.map(style)));
        }
        if let Some(font) = &self.font {
            children.push(
                RawXmlElement::new("w:rFonts")
                    .with_attr("w:ascii", font.as_str())
                    .with_attr("w:hAnsi", font.as_str())
                    .empty(),
            );
        }
        for (flag, value) in [("w:b", self.bold), ("w:i", self.italic), ("w:strike", self.strike)] {
            match value {
                Some(true) => children.push(RawXmlElement::new(flag).empty()),
                Some(false) => children.push(w_val_element(flag, "false")),
                None => {}
            }
        }
        if let Some(color) = &self.color {
            children.push(w_val_element("w:color", color.as_str()));
        }
        if let Some(size) = self.size {
            children.push(w_val_element("w:sz", size.to_string()));
            children.push(w_val_element("w:szCs", size.to_string()));
        }
        if let Some(highlight) = &self.highlight {
            children.push(w_val_element("w:highlight", highlight.as_str()));
        }
        if let Some(underline) = &self.underline {
            children.push(w_val_element("w:u", underline.as_str()));
        }

        (!children.is_empty()).then(|| RawXmlElement::new("w:rPr").with_children(children))
    }
}
