//! `\halign` and `\valign`.
//!
//! An alignment arrives with its preamble already split into per-column
//! templates and its rows split into cells (the AST builder does the
//! token-level work). This module does the three layout phases: template
//! application, column sizing, and row packing. TeX.2021.768-812, reduced
//! to the box level.

use log::warn;
use units::{Glue, Scaled};

use crate::node::{GlueNode, HBox, HNode, VBox, VNode};
use crate::pack::{hpack, vpack, Target, VOrient};

/// One column template `u # v`: material pasted before and after every
/// cell of the column.
#[derive(Debug, Clone, Default)]
pub struct ColumnTemplate {
    pub pre: Vec<HNode>,
    pub post: Vec<HNode>,
}

/// A parsed preamble: templates, the tabskip glues around them, and the
/// repetition point left by a trailing `&&`.
#[derive(Debug, Clone, Default)]
pub struct Preamble {
    pub columns: Vec<ColumnTemplate>,
    /// `tabskips[k]` precedes column `k`; the last entry follows the last
    /// column. Always `columns.len() + 1` long.
    pub tabskips: Vec<Glue>,
    /// Columns at or beyond this index reuse templates cyclically.
    pub repeat_from: Option<usize>,
}

impl Preamble {
    /// A preamble with the given templates and zero tabskips throughout.
    pub fn plain(columns: Vec<ColumnTemplate>) -> Preamble {
        let tabskips = vec![Glue::ZERO; columns.len() + 1];
        Preamble {
            columns,
            tabskips,
            repeat_from: None,
        }
    }

    /// The template for a (possibly repeated) column index.
    fn template(&self, col: usize) -> &ColumnTemplate {
        if col < self.columns.len() {
            return &self.columns[col];
        }
        match self.repeat_from {
            Some(from) if from < self.columns.len() => {
                let cycle = self.columns.len() - from;
                &self.columns[from + (col - from) % cycle]
            }
            // A fixed-arity preamble: extra cells reuse the last template.
            _ => &self.columns[self.columns.len() - 1],
        }
    }

    /// The tabskip preceding a column, following the same repetition.
    fn tabskip_before(&self, col: usize) -> Glue {
        if col < self.tabskips.len() - 1 {
            return self.tabskips[col];
        }
        match self.repeat_from {
            Some(from) if from < self.columns.len() => {
                let cycle = self.columns.len() - from;
                self.tabskips[from + (col - from) % cycle]
            }
            _ => self.tabskips[self.tabskips.len() - 2],
        }
    }

    /// The tabskip after the last column.
    fn trailing_tabskip(&self) -> Glue {
        match self.tabskips.last() {
            Some(g) => *g,
            None => Glue::ZERO,
        }
    }
}

/// One cell of a row, with its alignment flags.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub content: Vec<HNode>,
    /// `\omit`: the column template is skipped for this cell.
    pub omit: bool,
    /// Number of columns the cell covers; `\span` increments it.
    pub columns: usize,
    /// `\hidewidth` on either side: infinite glue that lets oversize
    /// content stick out of the column without widening it.
    pub hide_left: bool,
    pub hide_right: bool,
}

impl Cell {
    pub fn new(content: Vec<HNode>) -> Cell {
        Cell {
            content,
            omit: false,
            columns: 1,
            hide_left: false,
            hide_right: false,
        }
    }
}

/// A row of cells, or vertical material from `\noalign`.
#[derive(Debug, Clone)]
pub enum RowItem {
    Cells(Vec<Cell>),
    NoAlign(Vec<VNode>),
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub preamble: Preamble,
    pub rows: Vec<RowItem>,
}

/// `\hidewidth`: plain TeX's `\hideskip`, -1000pt plus 1fill. The large
/// negative natural width keeps the cell out of the column maximum; the
/// fill recovers the difference when the cell is set.
fn hidewidth() -> Glue {
    use units::GlueOrder;
    Glue {
        natural: Scaled(-1000 * 65536),
        stretch: Scaled::ONE,
        stretch_order: GlueOrder::Fill,
        shrink: Scaled::ZERO,
        shrink_order: GlueOrder::Normal,
    }
}

/// Lays out a horizontal alignment. Column widths are the maxima of the
/// natural cell widths; every cell is then set to its column width (or the
/// spanned width) and the rows are stacked in a vbox at natural height.
pub fn halign(a: &Alignment) -> VBox {
    // Phase 1: apply templates, measure every cell.
    let mut grid: Vec<Option<Vec<(HBox, usize)>>> = Vec::with_capacity(a.rows.len());
    let mut column_count = 0usize;
    for (row_index, row) in a.rows.iter().enumerate() {
        let RowItem::Cells(cells) = row else {
            grid.push(None);
            continue;
        };
        let mut built = Vec::with_capacity(cells.len());
        let mut col = 0usize;
        for cell in cells {
            let mut span = cell.columns.max(1);
            if cell.omit && span > 1 {
                // The sources leave this combination undefined; the
                // template-less reading wins and the span is dropped.
                warn!(
                    "align-span-omit: \\span meets \\omit in row {}, column {}; \\omit wins",
                    row_index + 1,
                    col + 1
                );
                span = 1;
            }
            let content = expand_cell(cell, a.preamble.template(col));
            built.push((hpack(content, Target::Natural).content, span));
            col += span;
        }
        column_count = column_count.max(col);
        grid.push(Some(built));
    }

    // Phase 2: column sizing from single-column cells, then widen the
    // last column of any spanned run that still cannot fit.
    let mut widths = vec![Scaled::ZERO; column_count];
    for row in grid.iter().flatten() {
        let mut col = 0usize;
        for (cell, span) in row {
            if *span == 1 {
                widths[col] = widths[col].max(cell.width);
            }
            col += span;
        }
    }
    for row in grid.iter().flatten() {
        let mut col = 0usize;
        for (cell, span) in row {
            if *span > 1 {
                let available = span_width(&widths, &a.preamble, col, *span);
                if cell.width > available {
                    let last = col + span - 1;
                    widths[last] += cell.width - available;
                }
            }
            col += span;
        }
    }

    // Phase 3: set every cell to its column width and interleave
    // tabskips.
    let mut out: Vec<VNode> = Vec::with_capacity(a.rows.len());
    for (row, built) in a.rows.iter().zip(grid) {
        let Some(built) = built else {
            if let RowItem::NoAlign(material) = row {
                out.extend(material.iter().cloned());
            }
            continue;
        };
        let mut nodes: Vec<HNode> = Vec::new();
        let mut col = 0usize;
        for (cell, span) in built {
            nodes.push(HNode::Glue(GlueNode::new(a.preamble.tabskip_before(col))));
            let target = span_width(&widths, &a.preamble, col, span);
            nodes.push(HNode::HBox(
                hpack(cell.children, Target::Exact(target)).content,
            ));
            col += span;
        }
        nodes.push(HNode::Glue(GlueNode::new(a.preamble.trailing_tabskip())));
        out.push(VNode::HBox(hpack(nodes, Target::Natural).content));
    }

    vpack(out, Target::Natural, VOrient::VBox).content
}

/// The width a run of `span` columns offers a cell: the column widths
/// plus the tabskips interior to the run.
fn span_width(widths: &[Scaled], preamble: &Preamble, col: usize, span: usize) -> Scaled {
    let mut w = Scaled::ZERO;
    for k in col..(col + span).min(widths.len()) {
        w += widths[k];
        if k > col {
            w += preamble.tabskip_before(k).natural;
        }
    }
    w
}

fn expand_cell(cell: &Cell, template: &ColumnTemplate) -> Vec<HNode> {
    let mut content = Vec::new();
    if cell.hide_left {
        content.push(HNode::Glue(GlueNode::new(hidewidth())));
    }
    if cell.omit {
        content.extend(cell.content.iter().cloned());
    } else {
        content.extend(template.pre.iter().cloned());
        content.extend(cell.content.iter().cloned());
        content.extend(template.post.iter().cloned());
    }
    if cell.hide_right {
        content.push(HNode::Glue(GlueNode::new(hidewidth())));
    }
    content
}

/// One column of a vertical alignment: cells are vertical lists.
#[derive(Debug, Clone)]
pub enum VRowItem {
    Cells(Vec<VCell>),
    NoAlign(Vec<HNode>),
}

#[derive(Debug, Clone, Default)]
pub struct VCell {
    pub content: Vec<VNode>,
    pub omit: bool,
    pub columns: usize,
}

/// Vertical templates paste vertical material around each cell.
#[derive(Debug, Clone, Default)]
pub struct VColumnTemplate {
    pub pre: Vec<VNode>,
    pub post: Vec<VNode>,
}

#[derive(Debug, Clone)]
pub struct VAlignment {
    pub templates: Vec<VColumnTemplate>,
    pub tabskips: Vec<Glue>,
    pub rows: Vec<VRowItem>,
}

/// `\valign`: the transposed dual of [`halign`]. "Columns" run
/// vertically; their shared dimension is the total extent, and the
/// finished columns sit side by side in an hbox.
pub fn valign(a: &VAlignment) -> HBox {
    let template = |col: usize| -> &VColumnTemplate {
        static EMPTY: VColumnTemplate = VColumnTemplate {
            pre: Vec::new(),
            post: Vec::new(),
        };
        a.templates.get(col).unwrap_or(&EMPTY)
    };
    let tabskip = |k: usize| -> Glue {
        a.tabskips.get(k).copied().unwrap_or(Glue::ZERO)
    };

    let mut grid: Vec<Option<Vec<(VBox, usize)>>> = Vec::with_capacity(a.rows.len());
    let mut column_count = 0usize;
    for row in &a.rows {
        let VRowItem::Cells(cells) = row else {
            grid.push(None);
            continue;
        };
        let mut built = Vec::with_capacity(cells.len());
        let mut col = 0usize;
        for cell in cells {
            let span = if cell.omit { 1 } else { cell.columns.max(1) };
            let mut content = Vec::new();
            if cell.omit {
                content.extend(cell.content.iter().cloned());
            } else {
                let t = template(col);
                content.extend(t.pre.iter().cloned());
                content.extend(cell.content.iter().cloned());
                content.extend(t.post.iter().cloned());
            }
            built.push((vpack(content, Target::Natural, VOrient::VTop).content, span));
            col += span;
        }
        column_count = column_count.max(col);
        grid.push(Some(built));
    }

    let mut extents = vec![Scaled::ZERO; column_count];
    for row in grid.iter().flatten() {
        let mut col = 0usize;
        for (cell, span) in row {
            if *span == 1 {
                extents[col] = extents[col].max(cell.height + cell.depth);
            }
            col += span;
        }
    }

    let mut out: Vec<HNode> = Vec::new();
    for (row, built) in a.rows.iter().zip(grid) {
        let Some(built) = built else {
            if let VRowItem::NoAlign(material) = row {
                out.extend(material.iter().cloned());
            }
            continue;
        };
        let mut nodes: Vec<VNode> = Vec::new();
        let mut col = 0usize;
        for (cell, span) in built {
            nodes.push(VNode::Glue(GlueNode::new(tabskip(col))));
            let target: Scaled = extents[col..(col + span).min(extents.len())]
                .iter()
                .copied()
                .sum();
            nodes.push(VNode::VBox(
                vpack(cell.children, Target::Exact(target), VOrient::VTop).content,
            ));
            col += span;
        }
        nodes.push(VNode::Glue(GlueNode::new(tabskip(col))));
        out.push(HNode::VBox(vpack(nodes, Target::Natural, VOrient::VTop).content));
    }

    hpack(out, Target::Natural).content
}
