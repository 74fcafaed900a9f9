//! The typesetting job driver.
//!
//! [`Job::run`] takes a built AST and a font set and produces a shipped
//! page plus the requested output encodings. The driver owns the glue
//! between the pipeline stages: text runs go through the [`hlist`]
//! shaper, paragraphs through the line breaker, formulas through the
//! math translator and layout, alignments through the table builder,
//! and the finished vertical list is packed, shipped and encoded.
//!
//! Problems that do not prevent producing *a* page are collected as
//! [`diag::Diagnostic`]s; the caller decides what severity is fatal.

pub mod diag;
pub mod hlist;
mod math;

use std::time::Instant;

use arena::Arena;
use fonts::{FontId, FontTable};
use galley::align::{self, Alignment, Cell, ColumnTemplate, Preamble, RowItem};
use galley::linebreak::{break_paragraph, Demerits, Params};
use galley::math::{mlist_to_hlist, MathContext, Style};
use galley::node::{Discretionary, GlueNode, HBox, HNode, Kern, VBox, VNode};
use galley::pack::{hbox_natural, hpack, vpack, Fault, Target, VOrient};
use galley::ship::{ship, PlacedBox};
use log::debug;
use texast::ast::{Ast, AstNode};
use texast::commands::{AlignCommand, BoxCommand, CommandKind, CommandSpec, GlueCommand};
use texast::{Span, MATH_ENVIRONMENTS};
use units::{Badness, Glue, Scaled, Unit};

use crate::diag::{Diagnostic, Diagnostics, Severity};
use crate::hlist::Shaper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Dvi,
    Json,
    Both,
}

impl OutputMode {
    fn wants_dvi(self) -> bool {
        matches!(self, OutputMode::Dvi | OutputMode::Both)
    }

    fn wants_json(self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Both)
    }
}

const PT: i32 = 65_536;

/// Everything a job can be told. [`Config::new`] fills in plain-TeX-like
/// defaults for the given measure.
#[derive(Debug, Clone)]
pub struct Config {
    pub line_width: Scaled,
    /// Badness threshold for feasible lines.
    pub tolerance: Badness,
    pub line_penalty: i32,
    pub hyphen_penalty: i32,
    pub adj_demerits: Demerits,
    pub double_hyphen_demerits: Demerits,
    pub emergency_stretch: Scaled,
    /// Distance between consecutive baselines.
    pub baseline_skip: Scaled,
    /// Minimum clearance when baseline_skip cannot be honored.
    pub line_skip: Scaled,
    /// Vertical glue between paragraphs.
    pub par_skip: Glue,
    /// First-line indentation of a fresh paragraph.
    pub indent: Scaled,
    pub mode: OutputMode,
    /// Comment string for the DVI preamble.
    pub comment: String,
    /// Hard stop: no new paragraph starts after this instant.
    pub deadline: Option<Instant>,
}

impl Config {
    pub fn new(line_width: Scaled) -> Config {
        Config {
            line_width,
            tolerance: 200,
            line_penalty: 10,
            hyphen_penalty: 50,
            adj_demerits: 10_000,
            double_hyphen_demerits: 10_000,
            emergency_stretch: Scaled::ZERO,
            baseline_skip: Scaled(12 * PT),
            line_skip: Scaled(PT),
            par_skip: Glue {
                stretch: Scaled(PT),
                ..Glue::ZERO
            },
            indent: Scaled(20 * PT),
            mode: OutputMode::Both,
            comment: "typeset output".into(),
            deadline: None,
        }
    }
}

/// The fonts a job sets with: one text font plus the symbol and
/// extension fonts math layout draws parameters and delimiters from.
pub struct FontSet {
    pub table: FontTable,
    pub text: FontId,
    pub sym: FontId,
    pub ext: FontId,
}

/// What a finished job hands back.
pub struct Outcome {
    /// The packed page.
    pub page: VBox,
    /// The page resolved to absolute positions.
    pub placed: PlacedBox,
    pub dvi: Option<Vec<u8>>,
    pub json: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

pub struct Job<'a> {
    pub config: Config,
    pub fonts: &'a FontSet,
}

impl Job<'_> {
    pub fn run(&self, ast: &Ast, arena: &Arena) -> Outcome {
        let mut diags = Diagnostics::new();
        let ctx = MathContext::new(
            &self.fonts.table,
            self.fonts.text,
            self.fonts.sym,
            self.fonts.ext,
        );
        let shaper = Shaper::new(&self.fonts.table, self.fonts.text);
        let mut setter = Setter {
            config: &self.config,
            ctx: &ctx,
            shaper,
            arena,
            diags: &mut diags,
            vlist: Vec::new(),
            par: Vec::new(),
            prev_depth: None,
            indent_next: true,
            stopped: false,
        };
        setter.items(&ast.items);
        setter.end_paragraph();
        let vlist = std::mem::take(&mut setter.vlist);
        drop(setter);

        let page = vpack(vlist, Target::Natural, VOrient::VBox).content;
        let placed = ship(&page);
        debug!(
            "page shipped: {}x{}+{} sp, {} children",
            placed.width.0,
            placed.height.0,
            placed.depth.0,
            placed.children.len()
        );

        let dvi = self.config.mode.wants_dvi().then(|| {
            dvi::emit::emit_document(&[&placed], &self.fonts.table, &self.config.comment)
        });
        let json = if self.config.mode.wants_json() {
            match layout_json::to_json(&placed) {
                Ok(s) => Some(s),
                Err(e) => {
                    diags.push(Diagnostic::new(
                        "json-error",
                        Severity::Error,
                        format!("layout serialization failed: {e}"),
                    ));
                    None
                }
            }
        } else {
            None
        };

        Outcome {
            page,
            placed,
            dvi,
            json,
            diagnostics: diags.into_items(),
        }
    }
}

/// The walking state: the open paragraph, the growing page list, and the
/// inter-line bookkeeping.
struct Setter<'a> {
    config: &'a Config,
    ctx: &'a MathContext<'a>,
    shaper: Shaper<'a>,
    arena: &'a Arena,
    diags: &'a mut Diagnostics,
    vlist: Vec<VNode>,
    par: Vec<HNode>,
    prev_depth: Option<Scaled>,
    /// The next paragraph gets a first-line indent. Cleared when a
    /// display interrupts a paragraph.
    indent_next: bool,
    stopped: bool,
}

impl Setter<'_> {
    fn items(&mut self, items: &[AstNode]) {
        let mut i = 0;
        while i < items.len() {
            if self.over_deadline() {
                return;
            }
            let node = &items[i];
            i += 1;
            match node {
                AstNode::Text { text, .. } => {
                    let s = self.arena.str(*text);
                    self.text(s);
                }
                AstNode::Math {
                    display,
                    children,
                    span,
                } => self.math(*display, children, *span),
                AstNode::Group { children, .. } => self.items(&children.items),
                AstNode::Environment { name, children, span } => {
                    if MATH_ENVIRONMENTS.contains(&name.as_str()) {
                        self.math(name != "math", children, *span);
                    } else {
                        self.items(&children.items);
                    }
                }
                AstNode::Known { command, args, span } => {
                    self.known(command, args, *span, items, &mut i);
                }
                AstNode::Unknown { name, args, span } => {
                    self.diags.push(
                        Diagnostic::new(
                            "unknown-command",
                            Severity::Warning,
                            format!("unknown command \\{name}; its arguments are set as given"),
                        )
                        .with_span(*span),
                    );
                    for arg in args {
                        self.items(&arg.items);
                    }
                }
                // Alignment tokens only mean something inside \halign,
                // which walks its body itself.
                AstNode::AlignTab { .. } | AstNode::RowEnd { .. } => {}
            }
        }
    }

    /// A text run: blank lines end the paragraph.
    fn text(&mut self, s: &str) {
        let mut rest = s;
        while let Some((before, after)) = split_blank_line(rest) {
            self.shaper.append_text(before, &mut self.par, self.diags);
            self.end_paragraph();
            self.indent_next = true;
            rest = after;
        }
        self.shaper.append_text(rest, &mut self.par, self.diags);
    }

    fn math(&mut self, display: bool, children: &Ast, span: Span) {
        let (items, style_override) =
            math::translate_math(&children.items, self.arena, self.ctx, self.diags);
        let base = if display { Style::DISPLAY } else { Style::TEXT };
        let style = style_override.unwrap_or(base);
        let nodes = match mlist_to_hlist(items, style, self.ctx) {
            Ok(nodes) => nodes,
            Err(e) => {
                // The formula is dropped; the paragraph continues.
                self.diags.push(
                    Diagnostic::new("math-error", Severity::Error, e.to_string())
                        .with_span(span),
                );
                return;
            }
        };
        if display {
            self.end_paragraph();
            self.indent_next = false;
            let mut line = Vec::with_capacity(nodes.len() + 2);
            line.push(HNode::Glue(GlueNode::new(Glue::fil())));
            line.extend(nodes);
            line.push(HNode::Glue(GlueNode::new(Glue::fil())));
            let packed = hpack(line, Target::Exact(self.config.line_width));
            self.append_line(packed.content);
        } else {
            self.par.extend(nodes);
        }
    }

    fn known(
        &mut self,
        command: &CommandSpec,
        args: &[Ast],
        span: Span,
        siblings: &[AstNode],
        i: &mut usize,
    ) {
        match command.kind {
            CommandKind::Par => {
                self.end_paragraph();
                self.indent_next = true;
            }
            CommandKind::Sectioning { level } => {
                self.end_paragraph();
                let skip = if level <= 1 { 12 * PT } else { 6 * PT };
                self.vskip(Glue {
                    natural: Scaled(skip),
                    stretch: Scaled(skip / 3),
                    shrink: Scaled(skip / 3),
                    ..Glue::ZERO
                });
                self.indent_next = false;
                for arg in args {
                    self.items(&arg.items);
                }
                self.end_paragraph();
                self.indent_next = true;
            }
            CommandKind::Literal { codepoint } => {
                if let Some(c) = char::from_u32(codepoint) {
                    if let Some(node) = self.shaper.char_node(c, self.diags) {
                        self.par.push(HNode::Char(node));
                    }
                }
            }
            CommandKind::Symbol { codepoint, .. } => {
                // A math symbol used in text keeps its glyph.
                if let Some(c) = char::from_u32(codepoint) {
                    if let Some(node) = self.shaper.char_node(c, self.diags) {
                        self.par.push(HNode::Char(node));
                    }
                }
            }
            CommandKind::Function => {
                self.shaper
                    .append_text(command.name, &mut self.par, self.diags);
            }
            CommandKind::Space { em_milli } => {
                let width = match self.shaper.quad.xn_over_d(em_milli.abs(), 1000) {
                    Ok((q, _)) if em_milli < 0 => -q,
                    Ok((q, _)) => q,
                    Err(_) => Scaled::ZERO,
                };
                self.par.push(HNode::Kern(Kern {
                    width,
                    explicit: true,
                }));
            }
            CommandKind::Discretionary => {
                self.par.push(HNode::Disc(Discretionary {
                    hyphen: true,
                    ..Discretionary::default()
                }));
            }
            CommandKind::Glue(g) => self.glue_command(g, span, siblings, i),
            CommandKind::Box(b) => {
                let content = self.collect_inline(args.first());
                match b {
                    BoxCommand::HBox => self.par.push(HNode::HBox(hbox_natural(content))),
                    BoxCommand::VBox | BoxCommand::VTop => {
                        let orient = if b == BoxCommand::VTop {
                            VOrient::VTop
                        } else {
                            VOrient::VBox
                        };
                        let inner = vec![VNode::HBox(hbox_natural(content))];
                        let packed = vpack(inner, Target::Natural, orient);
                        self.par.push(HNode::VBox(packed.content));
                    }
                }
            }
            CommandKind::Align(AlignCommand::Halign) => {
                self.end_paragraph();
                if let Some(body) = args.first() {
                    self.halign(body);
                }
            }
            CommandKind::Align(AlignCommand::Valign) => {
                self.end_paragraph();
                if let Some(body) = args.first() {
                    self.valign(body);
                }
            }
            // Row machinery outside an alignment body.
            CommandKind::Align(_) => {}
            CommandKind::FontSwitch(_) => {} // single-font setup
            CommandKind::TextFont(_) | CommandKind::Overline | CommandKind::Underline => {
                for arg in args {
                    self.items(&arg.items);
                }
            }
            CommandKind::Ignored => {}
            CommandKind::Fraction { .. }
            | CommandKind::InfixFraction { .. }
            | CommandKind::Radical
            | CommandKind::Accent { .. }
            | CommandKind::LeftDelim
            | CommandKind::RightDelim
            | CommandKind::SizedDelim { .. }
            | CommandKind::Style(_)
            | CommandKind::Limits { .. } => {
                self.diags.push(
                    Diagnostic::new(
                        "command-out-of-mode",
                        Severity::Note,
                        format!("\\{} is only meaningful in math mode", command.name),
                    )
                    .with_span(span),
                );
            }
        }
    }

    fn glue_command(
        &mut self,
        g: GlueCommand,
        span: Span,
        siblings: &[AstNode],
        i: &mut usize,
    ) {
        match g {
            GlueCommand::Hfil => self.par.push(HNode::Glue(GlueNode::new(Glue::fil()))),
            GlueCommand::Hfill => self.par.push(HNode::Glue(GlueNode::new(Glue::fill()))),
            GlueCommand::Hss => self.par.push(HNode::Glue(GlueNode::new(Glue::ss()))),
            GlueCommand::Vfil => {
                self.end_paragraph();
                self.vskip(Glue::fil());
            }
            GlueCommand::Vfill => {
                self.end_paragraph();
                self.vskip(Glue::fill());
            }
            GlueCommand::Vss => {
                self.end_paragraph();
                self.vskip(Glue::ss());
            }
            GlueCommand::SmallSkip => {
                self.end_paragraph();
                self.vskip(elastic_skip(3 * PT));
            }
            GlueCommand::MedSkip => {
                self.end_paragraph();
                self.vskip(elastic_skip(6 * PT));
            }
            GlueCommand::BigSkip => {
                self.end_paragraph();
                self.vskip(elastic_skip(12 * PT));
            }
            GlueCommand::Hskip | GlueCommand::Vskip | GlueCommand::Kern => {
                // The dimension rides in the following text run.
                let mut taken = None;
                if let Some(AstNode::Text { text, .. }) = siblings.get(*i) {
                    let s = self.arena.str(*text);
                    if let Some((amount, rest)) = parse_dimen(s) {
                        *i += 1;
                        taken = Some((amount, rest));
                    }
                }
                let Some((amount, rest)) = taken else {
                    self.diags.push(
                        Diagnostic::new(
                            "parse-error",
                            Severity::Warning,
                            "glue command without a dimension; ignored".into(),
                        )
                        .with_span(span),
                    );
                    return;
                };
                match g {
                    GlueCommand::Hskip => {
                        self.par
                            .push(HNode::Glue(GlueNode::new(Glue::fixed(amount))));
                    }
                    GlueCommand::Kern => self.par.push(HNode::Kern(Kern {
                        width: amount,
                        explicit: true,
                    })),
                    _ => {
                        self.end_paragraph();
                        self.vskip(Glue::fixed(amount));
                    }
                }
                self.text(rest);
            }
            GlueCommand::Mskip | GlueCommand::Mkern => {
                self.diags.push(
                    Diagnostic::new(
                        "command-out-of-mode",
                        Severity::Note,
                        "math glue outside a formula; ignored".into(),
                    )
                    .with_span(span),
                );
            }
        }
    }

    /// Runs the normal dispatch with the paragraph redirected into a
    /// scratch list, for box and cell content.
    fn collect_inline(&mut self, arg: Option<&Ast>) -> Vec<HNode> {
        let Some(arg) = arg else {
            return Vec::new();
        };
        let saved = std::mem::take(&mut self.par);
        self.items(&arg.items);
        std::mem::replace(&mut self.par, saved)
    }

    fn collect_inline_node(&mut self, node: &AstNode) -> Vec<HNode> {
        let saved = std::mem::take(&mut self.par);
        self.items(std::slice::from_ref(node));
        std::mem::replace(&mut self.par, saved)
    }

    /// `\halign{template\cr rows\cr}`: the first logical row is the
    /// preamble; `#` splits each column template around the cell body.
    fn halign(&mut self, body: &Ast) {
        let items = &body.items;
        let mut idx = 0;

        // Preamble.
        let mut columns: Vec<ColumnTemplate> = Vec::new();
        let mut repeat_from = None;
        let mut pre: Vec<HNode> = Vec::new();
        let mut post: Vec<HNode> = Vec::new();
        let mut in_post = false;
        let mut prev_was_tab = false;
        while idx < items.len() {
            let node = &items[idx];
            idx += 1;
            if is_row_end(node) {
                break;
            }
            if let AstNode::AlignTab { .. } = node {
                if prev_was_tab && pre.is_empty() && post.is_empty() && !in_post {
                    // A double tab marks the repetition point.
                    repeat_from = Some(columns.len());
                } else {
                    columns.push(ColumnTemplate {
                        pre: std::mem::take(&mut pre),
                        post: std::mem::take(&mut post),
                    });
                }
                in_post = false;
                prev_was_tab = true;
                continue;
            }
            prev_was_tab = false;
            if let AstNode::Text { text, .. } = node {
                let s = self.arena.str(*text);
                for (k, segment) in s.split('#').enumerate() {
                    if k > 0 {
                        in_post = true;
                    }
                    let target = if in_post { &mut post } else { &mut pre };
                    self.shaper.append_text(segment, target, self.diags);
                }
                continue;
            }
            let nodes = self.collect_inline_node(node);
            if in_post {
                post.extend(nodes);
            } else {
                pre.extend(nodes);
            }
        }
        columns.push(ColumnTemplate { pre, post });
        let tabskips = vec![Glue::ZERO; columns.len() + 1];

        // Rows.
        let mut rows: Vec<RowItem> = Vec::new();
        let mut row: Vec<Cell> = Vec::new();
        let mut cell = Cell::new(Vec::new());
        while idx < items.len() {
            let node = &items[idx];
            idx += 1;
            if let AstNode::AlignTab { .. } = node {
                row.push(std::mem::replace(&mut cell, Cell::new(Vec::new())));
                continue;
            }
            if is_row_end(node) {
                let cell_blank =
                    cell.content.is_empty() && !cell.omit && cell.columns <= 1;
                if !(row.is_empty() && cell_blank) {
                    row.push(std::mem::replace(&mut cell, Cell::new(Vec::new())));
                    rows.push(RowItem::Cells(std::mem::take(&mut row)));
                }
                continue;
            }
            if let AstNode::Known { command, args, span } = node {
                match command.kind {
                    CommandKind::Align(AlignCommand::Omit) => {
                        // \omit wins over \span when both appear.
                        cell.omit = true;
                        continue;
                    }
                    CommandKind::Align(AlignCommand::Span) => {
                        cell.columns = cell.columns.max(1) + 1;
                        continue;
                    }
                    CommandKind::Align(AlignCommand::Hidewidth) => {
                        if cell.content.is_empty() {
                            cell.hide_left = true;
                        } else {
                            cell.hide_right = true;
                        }
                        continue;
                    }
                    CommandKind::Align(AlignCommand::Noalign) => {
                        let content = self.collect_inline(args.first());
                        if !content.is_empty() {
                            rows.push(RowItem::NoAlign(vec![VNode::HBox(hbox_natural(
                                content,
                            ))]));
                        }
                        continue;
                    }
                    CommandKind::Align(AlignCommand::Tabskip) => {
                        self.diags.push(
                            Diagnostic::new(
                                "command-out-of-mode",
                                Severity::Note,
                                "\\tabskip assignments are not supported; ignored".into(),
                            )
                            .with_span(*span),
                        );
                        continue;
                    }
                    _ => {}
                }
            }
            let nodes = self.collect_inline_node(node);
            cell.content.extend(nodes);
        }
        // Material after the last \cr still forms a row.
        if !cell.content.is_empty() || !row.is_empty() {
            row.push(cell);
            rows.push(RowItem::Cells(row));
        }

        let alignment = Alignment {
            preamble: Preamble {
                columns,
                tabskips,
                repeat_from,
            },
            rows,
        };
        let table = align::halign(&alignment);
        self.append_vbox(table);
    }

    /// `\valign`: columns of stacked boxes set side by side. Cell content
    /// is set as one hbox per cell; templates are honored as hboxes too.
    fn valign(&mut self, body: &Ast) {
        use galley::align::{VAlignment, VCell, VColumnTemplate, VRowItem};

        let items = &body.items;
        let mut idx = 0;

        let mut templates: Vec<VColumnTemplate> = Vec::new();
        let mut pre: Vec<VNode> = Vec::new();
        let mut post: Vec<VNode> = Vec::new();
        let mut in_post = false;
        while idx < items.len() {
            let node = &items[idx];
            idx += 1;
            if is_row_end(node) {
                break;
            }
            if let AstNode::AlignTab { .. } = node {
                templates.push(VColumnTemplate {
                    pre: std::mem::take(&mut pre),
                    post: std::mem::take(&mut post),
                });
                in_post = false;
                continue;
            }
            if let AstNode::Text { text, .. } = node {
                let s = self.arena.str(*text);
                for (k, segment) in s.split('#').enumerate() {
                    if k > 0 {
                        in_post = true;
                    }
                    let mut nodes = Vec::new();
                    self.shaper.append_text(segment, &mut nodes, self.diags);
                    if !nodes.is_empty() {
                        let b = VNode::HBox(hbox_natural(nodes));
                        if in_post {
                            post.push(b);
                        } else {
                            pre.push(b);
                        }
                    }
                }
            }
        }
        templates.push(VColumnTemplate { pre, post });
        let tabskips = vec![Glue::ZERO; templates.len() + 1];

        let mut rows: Vec<VRowItem> = Vec::new();
        let mut row: Vec<VCell> = Vec::new();
        let mut cell = VCell::default();
        while idx < items.len() {
            let node = &items[idx];
            idx += 1;
            if let AstNode::AlignTab { .. } = node {
                row.push(std::mem::take(&mut cell));
                continue;
            }
            if is_row_end(node) {
                if !(row.is_empty() && cell.content.is_empty()) {
                    row.push(std::mem::take(&mut cell));
                    rows.push(VRowItem::Cells(std::mem::take(&mut row)));
                }
                continue;
            }
            if let AstNode::Known { command, .. } = node {
                if let CommandKind::Align(AlignCommand::Omit) = command.kind {
                    cell.omit = true;
                    continue;
                }
            }
            let nodes = self.collect_inline_node(node);
            if !nodes.is_empty() {
                cell.content.push(VNode::HBox(hbox_natural(nodes)));
            }
        }
        if !cell.content.is_empty() || !row.is_empty() {
            row.push(cell);
            rows.push(VRowItem::Cells(row));
        }

        let table = align::valign(&VAlignment {
            templates,
            tabskips,
            rows,
        });
        self.append_line(table);
    }

    fn end_paragraph(&mut self) {
        if self.par.is_empty() {
            return;
        }
        let nodes = std::mem::take(&mut self.par);
        let mut params = Params::new(self.config.line_width);
        params.tolerance = self.config.tolerance;
        params.line_penalty = self.config.line_penalty;
        params.hyphen_penalty = self.config.hyphen_penalty;
        params.adj_demerits = self.config.adj_demerits;
        params.double_hyphen_demerits = self.config.double_hyphen_demerits;
        params.emergency_stretch = self.config.emergency_stretch;
        if self.indent_next {
            params.indent = self.config.indent;
        }
        let broken = break_paragraph(nodes, &params);
        debug!(
            "paragraph: {} lines, pass {}, demerits {}",
            broken.lines.len(),
            broken.pass,
            broken.total_demerits
        );
        for (index, fault) in &broken.faults {
            match fault {
                Fault::Overfull { overrun } => self.diags.push(
                    Diagnostic::new(
                        "box-overfull",
                        Severity::Warning,
                        format!("overfull line {}", index + 1),
                    )
                    .with_sp("overrun", *overrun),
                ),
                Fault::Underfull { badness, shortfall } => self.diags.push(
                    Diagnostic::new(
                        "box-underfull",
                        Severity::Warning,
                        format!("underfull line {}", index + 1),
                    )
                    .with_detail("badness", *badness as i64)
                    .with_sp("shortfall", *shortfall),
                ),
            }
        }
        if !self.vlist.is_empty() {
            self.vlist
                .push(VNode::Glue(GlueNode::new(self.config.par_skip)));
        }
        for line in broken.lines {
            self.append_line(line.packed.content);
        }
    }

    /// Adds a finished line, inserting baseline glue against the previous
    /// box on the page.
    fn append_line(&mut self, b: HBox) {
        self.baseline_glue(b.height);
        self.prev_depth = Some(b.depth);
        self.vlist.push(VNode::HBox(b));
    }

    fn append_vbox(&mut self, b: VBox) {
        self.baseline_glue(b.height);
        self.prev_depth = Some(b.depth);
        self.vlist.push(VNode::VBox(b));
    }

    fn baseline_glue(&mut self, height: Scaled) {
        let Some(prev_depth) = self.prev_depth else {
            return;
        };
        let gap = self.config.baseline_skip - prev_depth - height;
        let gap = gap.max(self.config.line_skip);
        self.vlist.push(VNode::Glue(GlueNode::new(Glue::fixed(gap))));
    }

    fn vskip(&mut self, g: Glue) {
        self.vlist.push(VNode::Glue(GlueNode::new(g)));
    }

    fn over_deadline(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        let Some(deadline) = self.config.deadline else {
            return false;
        };
        if Instant::now() >= deadline {
            self.stopped = true;
            self.diags.push(Diagnostic::new(
                "deadline-exceeded",
                Severity::Error,
                "typesetting stopped at the deadline; output is partial".into(),
            ));
        }
        self.stopped
    }
}

fn is_row_end(node: &AstNode) -> bool {
    match node {
        AstNode::RowEnd { .. } => true,
        AstNode::Known { command, .. } => matches!(
            command.kind,
            CommandKind::Align(AlignCommand::Cr | AlignCommand::CrCr)
        ),
        _ => false,
    }
}

fn elastic_skip(natural: i32) -> Glue {
    Glue {
        natural: Scaled(natural),
        stretch: Scaled(natural / 3),
        shrink: Scaled(natural / 3),
        ..Glue::ZERO
    }
}

/// Splits a text run at the first blank line (a newline, optional
/// horizontal whitespace, another newline).
fn split_blank_line(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    for i in 0..bytes.len() {
        if bytes[i] != b'\n' {
            continue;
        }
        let mut j = i + 1;
        while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'\n' {
            return Some((&s[..i], &s[j + 1..]));
        }
    }
    None
}

/// Parses a leading dimension such as `12pt`, `-1.5pt` or `2in` from a
/// text run; returns the value and the remaining text.
fn parse_dimen(s: &str) -> Option<(Scaled, &str)> {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };
    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let integer: i32 = if pos > int_start {
        t[int_start..pos].parse().ok()?
    } else {
        0
    };
    let mut fraction = Scaled::ZERO;
    let mut saw_fraction = false;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let frac_start = pos;
        let mut num: i64 = 0;
        let mut denom: i64 = 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() && denom < 1_000_000_000 {
            num = num * 10 + (bytes[pos] - b'0') as i64;
            denom *= 10;
            pos += 1;
        }
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1; // extra digits beyond sp precision
        }
        saw_fraction = pos > frac_start;
        fraction = Scaled(((num * 65536 + denom / 2) / denom) as i32);
    }
    if pos == int_start && !saw_fraction {
        return None;
    }
    let after_number = t[pos..].trim_start();
    let unit = Unit::parse(after_number.get(..2)?)?;
    let rest = &after_number[2..];
    let value = Scaled::new(integer, fraction, unit).ok()?;
    Some((if negative { -value } else { value }, rest))
}
