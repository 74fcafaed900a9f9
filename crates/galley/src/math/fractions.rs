//! Generalized fractions, radicals and over/underlines.
//! TeX.2021.734-737 and 743-748.

use units::Scaled;

use crate::node::{HBox, HNode, Kern, VNode};
use crate::pack::{fixed_rule, hbox_natural, vpack, Target, VOrient};

use super::{clean_box, delims, Fraction, MathContext, MathError, Radical, Style};

/// Plain TeX's `\nulldelimiterspace`, the kern standing in for an empty
/// fraction delimiter.
const NULL_DELIMITER_SPACE: Scaled = Scaled(78_643); // 1.2pt

/// Builds a fraction (or an atop, when the rule is zero) as horizontal
/// material. The numerator and denominator are centered over each other,
/// the rule sits on the math axis, and the whole construct is flanked by
/// null-delimiter kerns.
pub fn make_fraction(
    f: &Fraction,
    style: Style,
    ctx: &MathContext,
) -> Result<Vec<HNode>, MathError> {
    let p = &ctx.params;
    let t = p.default_rule_thickness;
    let rule = f.rule.unwrap_or(t);

    let mut num = clean_box(&f.num, style.num(), ctx)?;
    let mut den = clean_box(&f.denom, style.denom(), ctx)?;
    let width = num.width.max(den.width);
    num = center_to(num, width);
    den = center_to(den, width);

    // Initial shifts from the style parameters.
    let mut shift_up = if style.is_display() {
        p.num1
    } else if rule != Scaled::ZERO {
        p.num2
    } else {
        p.num3
    };
    let mut shift_down = if style.is_display() { p.denom1 } else { p.denom2 };

    let axis = p.axis_height;
    let list: Vec<VNode>;
    if rule == Scaled::ZERO {
        // An atop: keep a minimum clearance between the two boxes.
        let min_clr = if style.is_display() { t * 7 } else { t * 3 };
        let gap = (shift_up - num.depth) - (den.height - shift_down);
        if min_clr > gap {
            let delta = min_clr - gap;
            shift_up += delta.half();
            shift_down += delta - delta.half();
        }
        let between = (shift_up - num.depth) - (den.height - shift_down);
        list = vec![
            VNode::HBox(num),
            VNode::Kern(Kern {
                width: between,
                explicit: false,
            }),
            VNode::HBox(den),
        ];
    } else {
        // Clearance between each box and the rule; 3x the rule thickness
        // in display style.
        let min_clr = if style.is_display() { rule * 3 } else { rule };
        let half_rule = rule.half();
        let above_gap = (shift_up - num.depth) - (axis + half_rule);
        if min_clr > above_gap {
            shift_up += min_clr - above_gap;
        }
        let below_gap = (axis - (rule - half_rule)) - (den.height - shift_down);
        if min_clr > below_gap {
            shift_down += min_clr - below_gap;
        }
        let num_depth = num.depth;
        let den_height = den.height;
        list = vec![
            VNode::HBox(num),
            VNode::Kern(Kern {
                width: (shift_up - num_depth) - (axis + half_rule),
                explicit: false,
            }),
            VNode::Rule(fixed_rule(width, rule, Scaled::ZERO)),
            VNode::Kern(Kern {
                width: (axis - (rule - half_rule)) - (den_height - shift_down),
                explicit: false,
            }),
            VNode::HBox(den),
        ];
    }

    let num_height = match &list[0] {
        VNode::HBox(b) => b.height,
        _ => Scaled::ZERO,
    };
    let mut v = vpack(list, Target::Natural, VOrient::VBox).content;
    // Rebaseline: the numerator's baseline sits shift_up above the main
    // one.
    let total = v.height + v.depth;
    v.height = num_height + shift_up;
    v.depth = total - v.height;

    Ok(vec![
        HNode::Kern(Kern {
            width: NULL_DELIMITER_SPACE,
            explicit: false,
        }),
        HNode::VBox(v),
        HNode::Kern(Kern {
            width: NULL_DELIMITER_SPACE,
            explicit: false,
        }),
    ])
}

/// Builds a radical: the sign grown to cover the radicand, an overline
/// flush with the sign's top, and an optional degree riding the sign.
pub fn make_radical(
    r: &Radical,
    style: Style,
    ctx: &MathContext,
) -> Result<Vec<HNode>, MathError> {
    let p = &ctx.params;
    let t = p.default_rule_thickness;
    let x = clean_box(&r.radicand, style.cramp(), ctx)?;

    let mut clr = if style.is_display() {
        t + quarter(p.x_height.abs())
    } else {
        t + quarter(t)
    };
    let target = x.height + x.depth + clr + t;
    let mut sign = delims::delimiter_box(r.delimiter, target, ctx)?;

    // An oversize sign donates half its excess to the clearance.
    let excess = (sign.height + sign.depth) - target;
    if excess.is_positive() {
        clr += excess.half();
    }

    // Rule top sits clr + t above the radicand; the sign's top aligns
    // with it.
    let x_height_box = x.height;
    let body = overline_with_gap(x, clr, t);
    sign.shift = sign.height - (x_height_box + clr + t);

    let mut out = Vec::new();
    if let Some(degree) = &r.degree {
        let mut d = clean_box(
            degree,
            Style {
                size: super::StyleSize::ScriptScript,
                cramped: false,
            },
            ctx,
        )?;
        // The degree's bottom rides at 60% of the sign's extent above the
        // sign's bottom.
        let lift = (sign.height + sign.depth)
            .xn_over_d(3, 5)
            .map(|q| q.0)
            .unwrap_or(Scaled::ZERO);
        d.shift = sign.shift + sign.depth - lift - d.depth;
        out.push(HNode::HBox(d));
    }
    out.push(HNode::HBox(sign));
    out.push(HNode::VBox(body));
    Ok(out)
}

/// An overline with the standard 3x rule-thickness clearance, folded back
/// into an hbox.
pub(super) fn overline_box(b: HBox, t: Scaled) -> HBox {
    let v = overline_with_gap(b, t * 3, t);
    hbox_natural(vec![HNode::VBox(v)])
}

/// An underline: the rule hangs 3x its thickness below the box, and the
/// construct keeps one extra thickness of depth under the rule.
pub(super) fn underline_box(b: HBox, t: Scaled) -> HBox {
    let width = b.width;
    let v = vpack(
        vec![
            VNode::HBox(b),
            VNode::Kern(Kern {
                width: t * 3,
                explicit: false,
            }),
            VNode::Rule(fixed_rule(width, t, Scaled::ZERO)),
            VNode::Kern(Kern {
                width: t,
                explicit: false,
            }),
        ],
        Target::Natural,
        VOrient::VBox,
    )
    .content;
    hbox_natural(vec![HNode::VBox(v)])
}

/// TeX's `overbar`: kern t, rule t, kern `gap`, then the box, baselined
/// on the box.
fn overline_with_gap(b: HBox, gap: Scaled, t: Scaled) -> crate::node::VBox {
    let width = b.width;
    vpack(
        vec![
            VNode::Kern(Kern {
                width: t,
                explicit: false,
            }),
            VNode::Rule(fixed_rule(width, t, Scaled::ZERO)),
            VNode::Kern(Kern {
                width: gap,
                explicit: false,
            }),
            VNode::HBox(b),
        ],
        Target::Natural,
        VOrient::VBox,
    )
    .content
}

/// Centers a box inside `width` with a leading kern.
fn center_to(b: HBox, width: Scaled) -> HBox {
    if b.width == width {
        return b;
    }
    let lead = (width - b.width).half();
    let mut r = hbox_natural(vec![
        HNode::Kern(Kern {
            width: lead,
            explicit: false,
        }),
        HNode::HBox(b),
    ]);
    r.width = width;
    r
}

fn quarter(v: Scaled) -> Scaled {
    match v.xn_over_d(1, 4) {
        Ok((q, _)) => q,
        Err(_) => Scaled::ZERO,
    }
}
