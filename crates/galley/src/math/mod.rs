//! Math layout, after TeX's Appendix G.
//!
//! The input is a math list: atoms with a class, a nucleus and optional
//! scripts, plus fractions, radicals and fenced groups. `mlist_to_hlist`
//! translates it in two passes: the first resolves classes (Bin atoms
//! demote to Ord next to anything that cannot take a binary operator) and
//! lays out every item in its style; the second interleaves inter-atom
//! spacing from the 8x8 class table.

mod delims;
mod fractions;
mod scripts;

pub use delims::var_delimiter;

use fonts::{ExtParam, FontId, FontTable, MathParam};
use units::{Glue, GlueOrder, Scaled};

use crate::node::{CharNode, GlueNode, HBox, HNode, Kern};
use crate::pack::{hpack, hbox_natural, Target};

/// The four style sizes. Scripts and fraction parts step down this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StyleSize {
    Display,
    Text,
    Script,
    ScriptScript,
}

/// A style is a size plus crampedness; cramped styles raise superscripts
/// less.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub size: StyleSize,
    pub cramped: bool,
}

impl Style {
    pub const DISPLAY: Style = Style {
        size: StyleSize::Display,
        cramped: false,
    };
    pub const TEXT: Style = Style {
        size: StyleSize::Text,
        cramped: false,
    };

    pub fn cramp(self) -> Style {
        Style {
            cramped: true,
            ..self
        }
    }

    /// The style of a superscript. TeX.2021.702.
    pub fn sup(self) -> Style {
        let size = match self.size {
            StyleSize::Display | StyleSize::Text => StyleSize::Script,
            _ => StyleSize::ScriptScript,
        };
        Style { size, ..self }
    }

    /// The style of a subscript: superscript style, cramped.
    pub fn sub(self) -> Style {
        self.sup().cramp()
    }

    /// Fraction numerator style. TeX.2021.702.
    pub fn num(self) -> Style {
        let size = match self.size {
            StyleSize::Display => StyleSize::Text,
            StyleSize::Text => StyleSize::Script,
            _ => StyleSize::ScriptScript,
        };
        Style { size, ..self }
    }

    /// Fraction denominator style: numerator style, cramped.
    pub fn denom(self) -> Style {
        self.num().cramp()
    }

    pub fn is_display(self) -> bool {
        self.size == StyleSize::Display
    }

    /// Script and scriptscript styles drop medium and thick spacing.
    pub fn is_script(self) -> bool {
        self.size >= StyleSize::Script
    }
}

/// Atom classes, the row/column alphabet of the spacing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomClass {
    Ord,
    Op,
    Bin,
    Rel,
    Open,
    Close,
    Punct,
    Inner,
    Over,
    Under,
    Acc,
    Rad,
    Vcent,
}

impl AtomClass {
    /// Spacing-table index; the exotic classes space like Ord.
    fn spacing_index(self) -> usize {
        match self {
            AtomClass::Ord => 0,
            AtomClass::Op => 1,
            AtomClass::Bin => 2,
            AtomClass::Rel => 3,
            AtomClass::Open => 4,
            AtomClass::Close => 5,
            AtomClass::Punct => 6,
            AtomClass::Inner => 7,
            _ => 0,
        }
    }
}

/// A field of an atom: empty, a single symbol, a finished box, or a
/// nested math list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    #[default]
    Empty,
    Symbol(u32),
    Box(HBox),
    List(Vec<MathItem>),
}

impl Field {
    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Empty)
    }
}

/// When a big operator sets its scripts as limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limits {
    /// Limits in display style only.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub class: AtomClass,
    pub nucleus: Field,
    pub sup: Field,
    pub sub: Field,
    pub limits: Limits,
}

impl Atom {
    pub fn new(class: AtomClass, nucleus: Field) -> Atom {
        Atom {
            class,
            nucleus,
            sup: Field::Empty,
            sub: Field::Empty,
            limits: Limits::Auto,
        }
    }
}

/// A generalized fraction. `rule` of `None` takes the default rule
/// thickness; zero produces an atop.
#[derive(Debug, Clone, PartialEq)]
pub struct Fraction {
    pub num: Field,
    pub denom: Field,
    pub rule: Option<Scaled>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Radical {
    pub radicand: Field,
    pub degree: Option<Field>,
    /// Delimiter codepoint of the radical sign.
    pub delimiter: u32,
}

/// A fenced group: `\left d ... \right d`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fenced {
    pub left: u32,
    pub right: u32,
    pub inner: Vec<MathItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MathItem {
    Atom(Atom),
    Fraction(Fraction),
    Radical(Radical),
    Fenced(Fenced),
}

/// Errors fatal for one math list; the caller substitutes an error glyph
/// and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// A fraction or radical field that must not be empty is empty.
    MissingArgument(&'static str),
    /// A delimiter codepoint absent from the symbol font.
    BadDelimiter(u32),
    /// No glyph for a codepoint in any math font.
    MissingGlyph(u32),
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathError::MissingArgument(what) => write!(f, "missing {what} in math list"),
            MathError::BadDelimiter(cp) => write!(f, "bad delimiter U+{cp:04X}"),
            MathError::MissingGlyph(cp) => write!(f, "no math glyph for U+{cp:04X}"),
        }
    }
}

impl std::error::Error for MathError {}

/// The cached font parameters math layout works from. Fetched once per
/// job; never re-queried during layout.
#[derive(Debug, Clone, Copy)]
pub struct MathParams {
    pub x_height: Scaled,
    pub quad: Scaled,
    pub axis_height: Scaled,
    pub num1: Scaled,
    pub num2: Scaled,
    pub num3: Scaled,
    pub denom1: Scaled,
    pub denom2: Scaled,
    pub sup1: Scaled,
    pub sup2: Scaled,
    pub sup3: Scaled,
    pub sub1: Scaled,
    pub sub2: Scaled,
    pub sup_drop: Scaled,
    pub sub_drop: Scaled,
    pub delim1: Scaled,
    pub delim2: Scaled,
    pub default_rule_thickness: Scaled,
    pub big_op_spacing: [Scaled; 5],
}

/// Extra width after every sub/superscript; plain TeX's `\scriptspace`.
pub const SCRIPT_SPACE: Scaled = Scaled(32_768); // 0.5pt

/// Fonts and parameters for one math list. The same text font carries all
/// four style sizes; script glyphs keep their loaded size, while script
/// *positions* follow the per-style parameters.
pub struct MathContext<'a> {
    pub table: &'a FontTable,
    pub text_font: FontId,
    pub sym_font: FontId,
    pub ext_font: FontId,
    pub params: MathParams,
}

impl<'a> MathContext<'a> {
    pub fn new(
        table: &'a FontTable,
        text_font: FontId,
        sym_font: FontId,
        ext_font: FontId,
    ) -> MathContext<'a> {
        let sym = table.get(sym_font);
        let ext = table.get(ext_font);
        let p = |m| sym.math_param(m);
        let e = |m| ext.ext_param(m);
        MathContext {
            table,
            text_font,
            sym_font,
            ext_font,
            params: MathParams {
                x_height: p(MathParam::XHeight),
                quad: p(MathParam::Quad),
                axis_height: p(MathParam::AxisHeight),
                num1: p(MathParam::Num1),
                num2: p(MathParam::Num2),
                num3: p(MathParam::Num3),
                denom1: p(MathParam::Denom1),
                denom2: p(MathParam::Denom2),
                sup1: p(MathParam::Sup1),
                sup2: p(MathParam::Sup2),
                sup3: p(MathParam::Sup3),
                sub1: p(MathParam::Sub1),
                sub2: p(MathParam::Sub2),
                sup_drop: p(MathParam::SupDrop),
                sub_drop: p(MathParam::SubDrop),
                delim1: p(MathParam::Delim1),
                delim2: p(MathParam::Delim2),
                default_rule_thickness: e(ExtParam::DefaultRuleThickness),
                big_op_spacing: [
                    e(ExtParam::BigOpSpacing1),
                    e(ExtParam::BigOpSpacing2),
                    e(ExtParam::BigOpSpacing3),
                    e(ExtParam::BigOpSpacing4),
                    e(ExtParam::BigOpSpacing5),
                ],
            },
        }
    }

    /// Which font renders a given symbol: letters and digits come from the
    /// text font, everything else from the symbol font.
    pub fn font_for(&self, codepoint: u32) -> FontId {
        if char::from_u32(codepoint).is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.text_font
        } else {
            self.sym_font
        }
    }

    /// A char node for a symbol, with metrics resolved.
    pub fn char_node(&self, codepoint: u32) -> Result<CharNode, MathError> {
        let font = self.font_for(codepoint);
        let m = self
            .table
            .get(font)
            .glyph_metrics(codepoint)
            .ok_or(MathError::MissingGlyph(codepoint))?;
        Ok(CharNode {
            codepoint,
            font,
            width: m.advance,
            height: m.height,
            depth: m.depth,
            italic: m.italic_correction,
        })
    }

    /// Converts mu (1/18 of the quad) to sp.
    pub fn mu(&self, mu18: i32) -> Scaled {
        match self.params.quad.xn_over_d(mu18, 18) {
            Ok((q, _)) => q,
            Err(_) => Scaled::MAX_DIMEN,
        }
    }
}

/// An atom's nucleus (or any field) reduced to a finished hbox in the
/// given style. TeX's `clean_box`.
pub fn clean_box(field: &Field, style: Style, ctx: &MathContext) -> Result<HBox, MathError> {
    let list = match field {
        Field::Empty => Vec::new(),
        Field::Symbol(cp) => vec![HNode::Char(ctx.char_node(*cp)?)],
        Field::Box(b) => return Ok(b.clone()),
        Field::List(items) => mlist_to_hlist(items.clone(), style, ctx)?,
    };
    Ok(hbox_natural(list))
}

/// One translated item: its effective class and its horizontal material.
struct Translated {
    class: AtomClass,
    nodes: Vec<HNode>,
}

/// Lays out a math list as a horizontal list, tagging nothing: the caller
/// wraps the result in an hbox if it needs one.
pub fn mlist_to_hlist(
    items: Vec<MathItem>,
    style: Style,
    ctx: &MathContext,
) -> Result<Vec<HNode>, MathError> {
    let classes = resolve_classes(&items);
    let mut translated: Vec<Translated> = Vec::with_capacity(items.len());

    for (item, class) in items.into_iter().zip(classes) {
        let nodes = match item {
            MathItem::Atom(atom) => layout_atom(&atom, class, style, ctx)?,
            MathItem::Fraction(f) => fractions::make_fraction(&f, style, ctx)?,
            MathItem::Radical(r) => fractions::make_radical(&r, style, ctx)?,
            MathItem::Fenced(f) => make_fenced(&f, style, ctx)?,
        };
        translated.push(Translated { class, nodes });
    }

    // Second pass: inter-atom spacing.
    let mut out = Vec::new();
    let mut prev: Option<AtomClass> = None;
    for t in translated {
        if let Some(p) = prev {
            if let Some(glue) = atom_spacing(p, t.class, style, ctx) {
                out.push(HNode::Glue(GlueNode::new(glue)));
            }
        }
        out.extend(t.nodes);
        prev = Some(t.class);
    }
    Ok(out)
}

/// Resolves effective classes: a Bin with no binary context on either
/// side becomes Ord. TeX.2021.727-729.
fn resolve_classes(items: &[MathItem]) -> Vec<AtomClass> {
    let mut classes: Vec<AtomClass> = items.iter().map(item_class).collect();
    let mut prev: Option<usize> = None;
    for i in 0..classes.len() {
        match classes[i] {
            AtomClass::Bin => {
                let demote = match prev {
                    None => true,
                    Some(p) => matches!(
                        classes[p],
                        AtomClass::Bin
                            | AtomClass::Op
                            | AtomClass::Rel
                            | AtomClass::Open
                            | AtomClass::Punct
                    ),
                };
                if demote {
                    classes[i] = AtomClass::Ord;
                }
            }
            AtomClass::Rel | AtomClass::Close | AtomClass::Punct => {
                if let Some(p) = prev {
                    if classes[p] == AtomClass::Bin {
                        classes[p] = AtomClass::Ord;
                    }
                }
            }
            _ => {}
        }
        prev = Some(i);
    }
    // A trailing Bin is also demoted.
    if let Some(last) = classes.last_mut() {
        if *last == AtomClass::Bin {
            *last = AtomClass::Ord;
        }
    }
    classes
}

fn item_class(item: &MathItem) -> AtomClass {
    match item {
        MathItem::Atom(a) => a.class,
        MathItem::Fraction(_) => AtomClass::Inner,
        MathItem::Radical(_) => AtomClass::Rad,
        MathItem::Fenced(_) => AtomClass::Inner,
    }
}

/// Lays out one atom: nucleus in the current style, operators centered on
/// the axis, then scripts.
fn layout_atom(
    atom: &Atom,
    class: AtomClass,
    style: Style,
    ctx: &MathContext,
) -> Result<Vec<HNode>, MathError> {
    // Italic correction of a lone char nucleus; Op handling consumes it.
    let mut delta = Scaled::ZERO;
    if let Field::Symbol(cp) = &atom.nucleus {
        delta = ctx.char_node(*cp)?.italic;
    }

    let (nucleus, is_char) = match class {
        AtomClass::Op => {
            let (b, d) = make_op(atom, style, ctx)?;
            delta = d;
            (b, false)
        }
        AtomClass::Over => (make_over(&atom.nucleus, style, ctx)?, false),
        AtomClass::Under => (make_under(&atom.nucleus, style, ctx)?, false),
        // The accent lives in the sup field, so the atom takes no other
        // scripts.
        AtomClass::Acc => {
            return Ok(vec![HNode::HBox(scripts::make_accent(atom, style, ctx)?)]);
        }
        AtomClass::Vcent => (make_vcenter(&atom.nucleus, style, ctx)?, false),
        _ => {
            let is_char = matches!(atom.nucleus, Field::Symbol(_));
            (clean_box(&atom.nucleus, style, ctx)?, is_char)
        }
    };

    // Display-style operators with limits set their scripts above and
    // below instead of alongside.
    let wants_limits = class == AtomClass::Op
        && match atom.limits {
            Limits::Always => true,
            Limits::Auto => style.is_display(),
            Limits::Never => false,
        };
    if wants_limits && (!atom.sup.is_empty() || !atom.sub.is_empty()) {
        let b = scripts::make_limits(nucleus, delta, &atom.sup, &atom.sub, style, ctx)?;
        return Ok(vec![HNode::VBox(b)]);
    }

    if atom.sup.is_empty() && atom.sub.is_empty() {
        let mut nodes = vec![HNode::HBox(nucleus)];
        // An Op char keeps its italic correction as a kern when no
        // subscript follows.
        if class == AtomClass::Op && delta != Scaled::ZERO {
            nodes.push(HNode::Kern(Kern {
                width: delta,
                explicit: false,
            }));
        }
        return Ok(nodes);
    }

    scripts::attach_scripts(nucleus, is_char, delta, &atom.sup, &atom.sub, style, ctx)
}

/// Big operator treatment, TeX.2021.749: take the display-size variant if
/// one exists and center the glyph on the axis.
fn make_op(atom: &Atom, style: Style, ctx: &MathContext) -> Result<(HBox, Scaled), MathError> {
    let Field::Symbol(cp) = &atom.nucleus else {
        return Ok((clean_box(&atom.nucleus, style, ctx)?, Scaled::ZERO));
    };
    let font = ctx.font_for(*cp);
    let metrics = ctx
        .table
        .get(font)
        .glyph_metrics(*cp)
        .ok_or(MathError::MissingGlyph(*cp))?;
    let mut node = CharNode {
        codepoint: *cp,
        font,
        width: metrics.advance,
        height: metrics.height,
        depth: metrics.depth,
        italic: metrics.italic_correction,
    };
    if style.is_display() {
        // Successor glyph in the charlist chain, if the font has one.
        let total = node.height + node.depth;
        if let Some(fonts::SizedDelimiter::Glyph(big)) =
            ctx.table.get(font).sized_delimiter(*cp, total + Scaled(1))
        {
            if big != *cp {
                if let Some(m) = ctx.table.get(font).glyph_metrics(big) {
                    node = CharNode {
                        codepoint: big,
                        font,
                        width: m.advance,
                        height: m.height,
                        depth: m.depth,
                        italic: m.italic_correction,
                    };
                }
            }
        }
    }
    let delta = node.italic;
    let mut b = hbox_natural(vec![HNode::Char(node)]);
    // Center on the axis.
    b.shift = (b.height - b.depth).half() - ctx.params.axis_height;
    Ok((b, delta))
}

/// Overline: rule above the nucleus with 3x rule-thickness clearance.
/// TeX.2021.734.
fn make_over(field: &Field, style: Style, ctx: &MathContext) -> Result<HBox, MathError> {
    let b = clean_box(field, style.cramp(), ctx)?;
    let t = ctx.params.default_rule_thickness;
    Ok(fractions::overline_box(b, t))
}

/// Underline: rule below with the same clearances. TeX.2021.735.
fn make_under(field: &Field, style: Style, ctx: &MathContext) -> Result<HBox, MathError> {
    let b = clean_box(field, style, ctx)?;
    let t = ctx.params.default_rule_thickness;
    Ok(fractions::underline_box(b, t))
}

/// `\vcenter`: shift so the box centers on the axis. TeX.2021.736.
fn make_vcenter(field: &Field, style: Style, ctx: &MathContext) -> Result<HBox, MathError> {
    let mut b = clean_box(field, style, ctx)?;
    b.shift = (b.height - b.depth).half() - ctx.params.axis_height;
    Ok(b)
}

/// A fenced group: lay out the inner list, then grow both delimiters to
/// cover it, centered on the axis. TeX.2021.759-762.
fn make_fenced(f: &Fenced, style: Style, ctx: &MathContext) -> Result<Vec<HNode>, MathError> {
    let inner = mlist_to_hlist(f.inner.clone(), style, ctx)?;
    let b = hbox_natural(inner);
    let axis = ctx.params.axis_height;
    // Delimiter size covers the larger of the extents above/below the
    // axis, scaled by TeX's delimiter factor (901/1000) or shortfall
    // (5pt), whichever asks for more.
    let above = b.height - axis;
    let below = b.depth + axis;
    let max_extent = above.max(below);
    let target = (max_extent * 2).xn_over_d(901, 1000).map(|x| x.0).unwrap_or(max_extent)
        .max(max_extent * 2 - Scaled(5 * 65536));
    let left = delims::var_delimiter(f.left, target, ctx)?;
    let right = delims::var_delimiter(f.right, target, ctx)?;
    Ok(vec![left, HNode::HBox(b), right])
}

/// Inter-atom spacing, the 8x8 table of Appendix G. Medium and thick
/// spaces (and the conditional thin ones) vanish in script styles.
fn atom_spacing(left: AtomClass, right: AtomClass, style: Style, ctx: &MathContext) -> Option<Glue> {
    #[derive(Clone, Copy, PartialEq)]
    enum S {
        No,
        Thin,
        CThin,  // thin, suppressed in script styles
        CMed,   // medium, suppressed in script styles
        CThick, // thick, suppressed in script styles
    }
    use S::*;
    // Rows: left class; columns: right class.
    // Ord Op Bin Rel Open Close Punct Inner
    const TABLE: [[S; 8]; 8] = [
        [No, Thin, CMed, CThick, No, No, No, CThin],     // Ord
        [Thin, Thin, No, CThick, No, No, No, CThin],     // Op
        [CMed, CMed, No, No, CMed, No, No, CMed],        // Bin
        [CThick, CThick, No, No, CThick, No, No, CThick], // Rel
        [No, No, No, No, No, No, No, No],                // Open
        [No, Thin, CMed, CThick, No, No, No, CThin],     // Close
        [CThin, CThin, No, CThin, CThin, CThin, CThin, CThin], // Punct
        [CThin, Thin, CMed, CThick, CThin, No, CThin, CThin], // Inner
    ];
    let entry = TABLE[left.spacing_index()][right.spacing_index()];
    let suppressed = style.is_script();
    let glue = match entry {
        No => return None,
        Thin => thin_muskip(ctx),
        CThin if !suppressed => thin_muskip(ctx),
        CMed if !suppressed => med_muskip(ctx),
        CThick if !suppressed => thick_muskip(ctx),
        _ => return None,
    };
    Some(glue)
}

/// Plain TeX's `\thinmuskip = 3mu`.
fn thin_muskip(ctx: &MathContext) -> Glue {
    Glue::fixed(ctx.mu(3))
}

/// `\medmuskip = 4mu plus 2mu minus 4mu`.
fn med_muskip(ctx: &MathContext) -> Glue {
    Glue {
        natural: ctx.mu(4),
        stretch: ctx.mu(2),
        stretch_order: GlueOrder::Normal,
        shrink: ctx.mu(4),
        shrink_order: GlueOrder::Normal,
    }
}

/// `\thickmuskip = 5mu plus 5mu`.
fn thick_muskip(ctx: &MathContext) -> Glue {
    Glue {
        natural: ctx.mu(5),
        stretch: ctx.mu(5),
        stretch_order: GlueOrder::Normal,
        ..Glue::ZERO
    }
}

/// Wraps a laid-out math list in an hbox tagged nothing; helper for
/// callers that need a box.
pub fn math_hbox(
    items: Vec<MathItem>,
    style: Style,
    ctx: &MathContext,
) -> Result<HBox, MathError> {
    Ok(hpack(mlist_to_hlist(items, style, ctx)?, Target::Natural).content)
}

#[cfg(test)]
mod tests;
