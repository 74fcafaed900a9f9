//! Variable-size delimiters. TeX.2021.706-714.
//!
//! A delimiter grows in two stages: the font's charlist chain offers
//! successively larger glyphs, and past the largest glyph an extensible
//! recipe assembles the delimiter from cap, filler and optional middle
//! pieces stacked in a vbox.

use fonts::{FontId, SizedDelimiter};
use units::Scaled;

use crate::node::{CharNode, HBox, HNode, Kern, VNode};
use crate::pack::{hbox_natural, vpack, Target, VOrient};

use super::{MathContext, MathError};

/// Builds a delimiter at least `target` tall and centers it on the math
/// axis, ready to drop into a horizontal list.
pub fn var_delimiter(
    codepoint: u32,
    target: Scaled,
    ctx: &MathContext,
) -> Result<HNode, MathError> {
    let mut b = delimiter_box(codepoint, target, ctx)?;
    b.shift = (b.height - b.depth).half() - ctx.params.axis_height;
    Ok(HNode::HBox(b))
}

/// The delimiter box itself, baselined as built (no axis adjustment).
/// The extension font is consulted first; plain symbols that never grow
/// fall back to the symbol font.
pub(super) fn delimiter_box(
    codepoint: u32,
    target: Scaled,
    ctx: &MathContext,
) -> Result<HBox, MathError> {
    for font in [ctx.ext_font, ctx.sym_font] {
        let metrics = ctx.table.get(font);
        let Some(selected) = metrics.sized_delimiter(codepoint, target) else {
            continue;
        };
        return match selected {
            SizedDelimiter::Glyph(cp) => {
                let m = metrics
                    .glyph_metrics(cp)
                    .ok_or(MathError::MissingGlyph(cp))?;
                Ok(hbox_natural(vec![HNode::Char(CharNode {
                    codepoint: cp,
                    font,
                    width: m.advance,
                    height: m.height,
                    depth: m.depth,
                    italic: m.italic_correction,
                })]))
            }
            SizedDelimiter::Recipe(recipe) => {
                assemble(font, &recipe, target, ctx)
            }
        };
    }
    Err(MathError::BadDelimiter(codepoint))
}

/// Stacks extensible pieces to reach `target`. With a middle piece the
/// repeats are balanced above and below it. TeX.2021.713-714.
fn assemble(
    font: FontId,
    recipe: &fonts::ExtensibleRecipe,
    target: Scaled,
    ctx: &MathContext,
) -> Result<HBox, MathError> {
    let piece = |cp: u32| -> Result<CharNode, MathError> {
        let m = ctx
            .table
            .get(font)
            .glyph_metrics(cp)
            .ok_or(MathError::MissingGlyph(cp))?;
        Ok(CharNode {
            codepoint: cp,
            font,
            width: m.advance,
            height: m.height,
            depth: m.depth,
            italic: m.italic_correction,
        })
    };
    let extent = |c: &CharNode| c.height + c.depth;

    let top = recipe.top.map(&piece).transpose()?;
    let middle = recipe.middle.map(&piece).transpose()?;
    let bottom = recipe.bottom.map(&piece).transpose()?;
    let rep = piece(recipe.repeat)?;
    let rep_extent = extent(&rep);
    if rep_extent == Scaled::ZERO {
        return Err(MathError::BadDelimiter(recipe.repeat));
    }

    let mut fixed = Scaled::ZERO;
    for c in [&top, &middle, &bottom].into_iter().flatten() {
        fixed += extent(c);
    }

    // Repeat count: enough copies to reach the target, doubled per slot
    // when a middle piece splits the filler.
    let slots = if middle.is_some() { 2 } else { 1 };
    let mut reps = 0usize;
    while fixed + rep_extent * ((reps * slots) as i32) < target {
        reps += 1;
    }

    let mut list: Vec<VNode> = Vec::new();
    let push_char = |list: &mut Vec<VNode>, c: CharNode| {
        // Each piece sits flush under the previous one.
        list.push(VNode::HBox(hbox_natural(vec![HNode::Char(c)])));
    };
    if let Some(c) = top {
        push_char(&mut list, c);
    }
    for _ in 0..reps {
        push_char(&mut list, rep);
    }
    if let Some(c) = middle {
        push_char(&mut list, c);
        for _ in 0..reps {
            push_char(&mut list, rep);
        }
    }
    if let Some(c) = bottom {
        push_char(&mut list, c);
    }
    if list.is_empty() {
        push_char(&mut list, rep);
    }

    let mut v = vpack(list, Target::Natural, VOrient::VBox).content;
    // The assembly overshoots by less than one repeat; trim the overshoot
    // with a negative kern at the top so the target is met exactly when
    // possible.
    let total = v.height + v.depth;
    if total > target {
        let trim = (total - target).min(rep_extent);
        v.children.insert(
            0,
            VNode::Kern(Kern {
                width: Scaled::ZERO - trim,
                explicit: false,
            }),
        );
        v.height -= trim;
    }
    // The whole assembly rides above the baseline; callers re-shift.
    let total = v.height + v.depth;
    v.height = total;
    v.depth = Scaled::ZERO;
    Ok(hbox_natural(vec![HNode::VBox(v)]))
}
