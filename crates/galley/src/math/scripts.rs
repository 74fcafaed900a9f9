//! Script attachment: sub/superscripts, operator limits and accents.
//! TeX.2021.749-758.

use units::Scaled;

use crate::node::{GlueNode, HBox, HNode, Kern, VBox, VNode};
use crate::pack::{hbox_natural, hpack, vpack, Target, VOrient};

use super::{clean_box, Atom, Field, MathContext, MathError, Style, SCRIPT_SPACE};

/// Attaches scripts alongside the nucleus. `is_char` marks a lone-symbol
/// nucleus, which takes the script heights straight from the parameters
/// instead of dropping from the box edges. `delta` is the nucleus italic
/// correction; it separates a superscript from a slanted nucleus.
pub fn attach_scripts(
    nucleus: HBox,
    is_char: bool,
    delta: Scaled,
    sup: &Field,
    sub: &Field,
    style: Style,
    ctx: &MathContext,
) -> Result<Vec<HNode>, MathError> {
    let p = &ctx.params;
    let (mut shift_up, mut shift_down) = if is_char {
        (Scaled::ZERO, Scaled::ZERO)
    } else {
        (nucleus.height - p.sup_drop, nucleus.depth + p.sub_drop)
    };

    let mut out = vec![HNode::HBox(nucleus)];

    if sup.is_empty() {
        // Subscript alone. TeX.2021.757.
        let mut x = clean_box(sub, style.sub(), ctx)?;
        x.width += SCRIPT_SPACE;
        let clr = x.height - p.x_height.abs().xn_over_d(4, 5).map(|q| q.0).unwrap_or(Scaled::ZERO);
        shift_down = shift_down.max(p.sub1).max(clr);
        x.shift = shift_down;
        out.push(HNode::HBox(x));
        return Ok(out);
    }

    let mut x = clean_box(sup, style.sup(), ctx)?;
    x.width += SCRIPT_SPACE;
    // Minimum raise: sup3 when cramped, sup1 in display, sup2 otherwise;
    // never closer to the baseline than a quarter x-height under the
    // script's depth.
    let clr = if style.cramped {
        p.sup3
    } else if style.is_display() {
        p.sup1
    } else {
        p.sup2
    };
    let quarter = p.x_height.abs().xn_over_d(1, 4).map(|q| q.0).unwrap_or(Scaled::ZERO);
    shift_up = shift_up.max(clr).max(x.depth + quarter);

    if sub.is_empty() {
        // Superscript alone.
        x.shift = Scaled::ZERO - shift_up;
        if delta != Scaled::ZERO {
            out.push(HNode::Kern(Kern {
                width: delta,
                explicit: false,
            }));
        }
        out.push(HNode::HBox(x));
        return Ok(out);
    }

    // Both scripts: stack them in a vbox so they overlap horizontally.
    // TeX.2021.758.
    let mut y = clean_box(sub, style.sub(), ctx)?;
    y.width += SCRIPT_SPACE;
    shift_down = shift_down.max(p.sub2);

    // Keep 4 rule thicknesses of daylight between the scripts, stealing
    // from the subscript first, then pushing the superscript up while
    // keeping its bottom at least 4/5 x-height above the baseline.
    let t4 = p.default_rule_thickness * 4;
    let gap = (shift_up - x.depth) - (y.height - shift_down);
    if t4 > gap {
        shift_down += t4 - gap;
        let four_fifths = p.x_height.abs().xn_over_d(4, 5).map(|q| q.0).unwrap_or(Scaled::ZERO);
        let lift = four_fifths - (shift_up - x.depth);
        if lift.is_positive() {
            shift_up += lift;
            shift_down -= lift;
        }
    }

    // The superscript sits `delta` to the right of the subscript.
    x.shift = delta;
    let between = (shift_up - x.depth) - (y.height - shift_down);
    let mut stack = vpack(
        vec![
            VNode::HBox(x),
            VNode::Kern(Kern {
                width: between,
                explicit: false,
            }),
            VNode::HBox(y),
        ],
        Target::Natural,
        VOrient::VBox,
    )
    .content;
    // The stack's baseline is the superscript's; lift it by shift_up.
    stack.shift = Scaled::ZERO - shift_up;
    out.push(HNode::VBox(stack));
    Ok(out)
}

/// Limits above and below a display operator. The result replaces the
/// whole atom. TeX.2021.750.
pub fn make_limits(
    nucleus: HBox,
    delta: Scaled,
    sup: &Field,
    sub: &Field,
    style: Style,
    ctx: &MathContext,
) -> Result<VBox, MathError> {
    let p = &ctx.params;
    let upper = if sup.is_empty() {
        None
    } else {
        Some(clean_box(sup, style.sup(), ctx)?)
    };
    let lower = if sub.is_empty() {
        None
    } else {
        Some(clean_box(sub, style.sub(), ctx)?)
    };

    let width = nucleus
        .width
        .max(upper.as_ref().map_or(Scaled::ZERO, |b| b.width))
        .max(lower.as_ref().map_or(Scaled::ZERO, |b| b.width));

    let center = |b: HBox, offset: Scaled| -> HBox {
        let lead = (width - b.width).half() + offset;
        let mut r = hbox_natural(vec![
            HNode::Kern(Kern {
                width: lead,
                explicit: false,
            }),
            HNode::HBox(b),
        ]);
        r.width = width;
        r
    };

    // Upper limit moves right by half the italic correction, lower limit
    // left; the slant of the operator carries into the limits. Centering
    // the nucleus also absorbs its axis shift into the wrapper's height
    // and depth.
    let half_delta = delta.half();
    let centered_nucleus = center(nucleus, Scaled::ZERO);
    let nucleus_height = centered_nucleus.height;
    let nucleus_depth = centered_nucleus.depth;
    let mut list: Vec<VNode> = Vec::new();
    let mut above = Scaled::ZERO;
    if let Some(b) = upper {
        let b = center(b, half_delta);
        // big_op_spacing5 above, then at least big_op_spacing1 of glue,
        // raised to big_op_spacing3 total clearance from the operator.
        let clearance = p.big_op_spacing[0].max(p.big_op_spacing[2] - b.depth);
        above = p.big_op_spacing[4] + b.height + b.depth + clearance;
        list.push(VNode::Kern(Kern {
            width: p.big_op_spacing[4],
            explicit: false,
        }));
        list.push(VNode::HBox(b));
        list.push(VNode::Glue(GlueNode::new(units::Glue::fixed(clearance))));
    }
    list.push(VNode::HBox(centered_nucleus));
    if let Some(b) = lower {
        let b = center(b, Scaled::ZERO - half_delta);
        let clearance = p.big_op_spacing[1].max(p.big_op_spacing[3] - b.height);
        list.push(VNode::Glue(GlueNode::new(units::Glue::fixed(clearance))));
        list.push(VNode::HBox(b));
        list.push(VNode::Kern(Kern {
            width: p.big_op_spacing[4],
            explicit: false,
        }));
    }

    let mut v = vpack(list, Target::Natural, VOrient::VBox).content;
    // Reference point stays on the operator's baseline.
    let total = v.height + v.depth;
    v.height = above + nucleus_height;
    v.depth = total - v.height;
    debug_assert!(v.depth >= nucleus_depth);
    Ok(v)
}

/// A math accent over its nucleus. The accent skews by the nucleus slant
/// and drops onto short nuclei so the gap never exceeds the x-height.
/// TeX.2021.738.
pub fn make_accent(atom: &Atom, style: Style, ctx: &MathContext) -> Result<HBox, MathError> {
    // An accent atom stores its accent char in the sup field.
    let Field::Symbol(accent_cp) = &atom.sup else {
        return clean_box(&atom.nucleus, style, ctx);
    };
    let accent = ctx.char_node(*accent_cp)?;
    let base = clean_box(&atom.nucleus, style.cramp(), ctx)?;

    let clearance = base.height.min(ctx.params.x_height);
    // A skewed nucleus moves the accent with it.
    let skew = match &atom.nucleus {
        Field::Symbol(cp) => ctx.char_node(*cp)?.italic.half(),
        _ => Scaled::ZERO,
    };

    let lead = (base.width - accent.width).half() + skew;
    let accent_line = hpack(
        vec![
            HNode::Kern(Kern {
                width: lead,
                explicit: false,
            }),
            HNode::Char(accent),
        ],
        Target::Natural,
    )
    .content;
    let between = Scaled::ZERO - clearance;
    let base_width = base.width;
    let mut v = vpack(
        vec![
            VNode::HBox(accent_line),
            VNode::Kern(Kern {
                width: between,
                explicit: false,
            }),
            VNode::HBox(base),
        ],
        Target::Natural,
        VOrient::VTop,
    )
    .content;
    v.width = base_width;
    // Flatten back to an hbox so the atom stays horizontal material.
    Ok(hpack(vec![HNode::VBox(v)], Target::Natural).content)
}
