//! Table elements (w:tbl, w:tr, w:tc)

use std::collections::BTreeSet;

use crate::error::Result;
use crate::xml::{w_val_element, RawXmlElement};

use super::{Block, Paragraph, RenderContext};

/// Default grid column width in twips
const DEFAULT_COLUMN_WIDTH: u32 = 2400;

/// Table element (w:tbl)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
    /// Table style ID
    pub style: Option<String>,
    /// Grid column widths in twips; missing columns use a default width
    pub column_widths: Vec<u32>,
}

/// Table row (w:tr)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Repeat as header row on each page
    pub header: bool,
}

/// Table cell (w:tc)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableCell {
    /// Cell content (paragraphs and nested tables)
    pub children: Vec<Block>,
    /// Cell width in twips
    pub width: Option<u32>,
    /// Grid span (horizontal merge)
    pub grid_span: Option<u32>,
}

impl Table {
    /// Create a table from rows
    pub fn new(rows: Vec<TableRow>) -> Self {
        Table {
            rows,
            ..Default::default()
        }
    }

    /// Create a table from a 2D array of strings
    pub fn from_data<S: Into<String> + Clone>(data: &[&[S]]) -> Self {
        Table::new(
            data.iter()
                .map(|row| TableRow::from_texts(row.iter().cloned()))
                .collect(),
        )
    }

    /// Set table style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Set column widths (in twips, 1/20 of a point)
    pub fn with_column_widths(mut self, widths: Vec<u32>) -> Self {
        self.column_widths = widths;
        self
    }

    /// Number of grid columns
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(TableRow::span)
            .max()
            .unwrap_or(0)
            .max(self.column_widths.len())
    }

    /// All paragraphs in the table, including nested tables
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        for cell in self.rows.iter().flat_map(|r| &r.cells) {
            for block in &cell.children {
                block.collect_paragraphs(&mut out);
            }
        }
        out
    }

    pub(crate) fn collect_style_ids(&self, ids: &mut BTreeSet<String>) {
        if let Some(style) = &self.style {
            ids.insert(style.clone());
        }
        for cell in self.rows.iter().flat_map(|r| &r.cells) {
            for block in &cell.children {
                block.collect_style_ids(ids);
            }
        }
    }

    /// Build the `w:tbl` element
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<RawXmlElement> {
        let mut tbl_pr = RawXmlElement::new("w:tblPr");
        if let Some(style) = &self.style {
            tbl_pr = tbl_pr.with_child(w_val_element("w:tblStyle", ctx.styles.map(style)));
        }
        tbl_pr = tbl_pr.with_child(
            RawXmlElement::new("w:tblW")
                .with_attr("w:w", "0")
                .with_attr("w:type", "auto")
                .empty(),
        );

        let grid = RawXmlElement::new("w:tblGrid").with_children((0..self.column_count()).map(|i| {
            let width = self
                .column_widths
                .get(i)
                .copied()
                .unwrap_or(DEFAULT_COLUMN_WIDTH);
            RawXmlElement::new("w:gridCol")
                .with_attr("w:w", width.to_string())
                .empty()
        }));

        let mut tbl = RawXmlElement::new("w:tbl").with_child(tbl_pr).with_child(grid);
        for row in &self.rows {
            tbl = tbl.with_child(row.render(ctx)?);
        }
        Ok(tbl)
    }
}

impl TableRow {
    /// Create a row from cells
    pub fn new(cells: Vec<TableCell>) -> Self {
        TableRow {
            cells,
            header: false,
        }
    }

    /// Create a row of text cells
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        TableRow::new(texts.into_iter().map(TableCell::new).collect())
    }

    /// Repeat this row at the top of each page
    pub fn as_header(mut self) -> Self {
        self.header = true;
        self
    }

    /// Number of grid columns covered by the cells
    fn span(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.grid_span.unwrap_or(1) as usize)
            .sum()
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<RawXmlElement> {
        let mut tr = RawXmlElement::new("w:tr");
        if self.header {
            tr = tr.with_child(
                RawXmlElement::new("w:trPr").with_child(RawXmlElement::new("w:tblHeader").empty()),
            );
        }
        for cell in &self.cells {
            tr = tr.with_child(cell.render(ctx)?);
        }
        Ok(tr)
    }
}

impl TableCell {
    /// Create a new cell with text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let paragraph = if text.is_empty() {
            Paragraph::empty()
        } else {
            Paragraph::new(text)
        };
        TableCell {
            children: vec![Block::Paragraph(paragraph)],
            ..Default::default()
        }
    }

    /// Create a cell from block content
    pub fn from_blocks(children: Vec<Block>) -> Self {
        TableCell {
            children,
            ..Default::default()
        }
    }

    /// Set cell width (in twips)
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Span several grid columns
    pub fn with_grid_span(mut self, span: u32) -> Self {
        self.grid_span = Some(span);
        self
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<RawXmlElement> {
        let mut tc = RawXmlElement::new("w:tc");

        let mut tc_pr = Vec::new();
        if let Some(width) = self.width {
            tc_pr.push(
                RawXmlElement::new("w:tcW")
                    .with_attr("w:w", width.to_string())
                    .with_attr("w:type", "dxa")
                    .empty(),
            );
        }
        if let Some(span) = self.grid_span {
            tc_pr.push(w_val_element("w:gridSpan", span.to_string()));
        }
        if !tc_pr.is_empty() {
            tc = tc.with_child(RawXmlElement::new("w:tcPr").with_children(tc_pr));
        }

        for block in &self.children {
            tc = tc.with_child(block.render(ctx)?);
        }
        // A cell must end with a paragraph
        if !matches!(self.children.last(), Some(Block::Paragraph(_))) {
            tc = tc.with_child(RawXmlElement::new("w:p").empty());
        }
        Ok(tc)
    }
}
