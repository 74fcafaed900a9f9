//! Glue setting: packing lists into boxes at a target size.
//!
//! Packing is the only place glue-set ratios are computed. The rules are
//! TeX.2021.649 (hpack) and TeX.2021.668 (vpack): sum the natural sizes,
//! accumulate stretch and shrink per order, and set the ratio against the
//! highest order that has any elastic. Shrinking is capped at ratio 1;
//! going past the cap makes the box overfull.

use units::{badness, Badness, Elastic, GlueOrder, Scaled, INF_BAD};

use crate::node::{GlueSet, GlueSign, HBox, HNode, Rule, VBox, VNode};

/// The size a list is packed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Use the natural size (`\hbox{...}`).
    #[default]
    Natural,
    /// Exactly this size (`\hbox to`).
    Exact(Scaled),
    /// Natural size plus this amount (`\hbox spread`).
    Spread(Scaled),
}

impl Target {
    fn resolve(self, natural: Scaled) -> Scaled {
        match self {
            Target::Natural => natural,
            Target::Exact(w) => w,
            Target::Spread(s) => natural + s,
        }
    }
}

/// What went wrong, if anything, while setting glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Not enough stretch: the box is loose or underfull.
    Underfull { badness: Badness, shortfall: Scaled },
    /// More shrink was needed than existed; `overrun` is the excess in sp.
    Overfull { overrun: Scaled },
}

/// A packed box plus its quality report.
#[derive(Debug, Clone, PartialEq)]
pub struct Packed<B> {
    pub content: B,
    pub badness: Badness,
    pub fault: Option<Fault>,
}

/// Orientation of vertical packing: which child fixes the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VOrient {
    /// Baseline from the first child that has one.
    #[default]
    VBox,
    /// Baseline from the last child that has one.
    VTop,
}

/// Packs a horizontal list to the target width.
pub fn hpack(children: Vec<HNode>, target: Target) -> Packed<HBox> {
    let mut natural = Scaled::ZERO;
    let mut stretch = Elastic::ZERO;
    let mut shrink = Elastic::ZERO;
    let mut height = Scaled::ZERO;
    let mut depth = Scaled::ZERO;

    for child in &children {
        natural += child.natural_width();
        match child {
            HNode::Char(c) => {
                height = height.max(c.height);
                depth = depth.max(c.depth);
            }
            HNode::HBox(b) => {
                height = height.max(b.height - b.shift);
                depth = depth.max(b.depth + b.shift);
            }
            HNode::VBox(b) => {
                height = height.max(b.height - b.shift);
                depth = depth.max(b.depth + b.shift);
            }
            HNode::Rule(r) => {
                if let Some(h) = r.height {
                    height = height.max(h);
                }
                if let Some(d) = r.depth {
                    depth = depth.max(d);
                }
            }
            HNode::Glue(g) => {
                stretch.add(g.glue.stretch, g.glue.stretch_order);
                shrink.add(g.glue.shrink, g.glue.shrink_order);
            }
            HNode::Kern(_) | HNode::Penalty(_) => {}
            HNode::Disc(d) => {
                for inner in &d.no_break {
                    if let HNode::Char(c) = inner {
                        height = height.max(c.height);
                        depth = depth.max(c.depth);
                    }
                }
            }
        }
    }

    let width = target.resolve(natural);
    let (glue_set, badness, fault) = set_glue(width - natural, stretch, shrink);
    Packed {
        content: HBox {
            width,
            height,
            depth,
            shift: Scaled::ZERO,
            glue_set,
            children,
        },
        badness,
        fault,
    }
}

/// Packs a vertical list. The target applies to the box's total vertical
/// extent (height + depth). The baseline comes from the orienting child:
/// the first child with a baseline by default, the last for `VTop`. The
/// height/depth split is measured with the glue already set, so the stored
/// dimensions match what a renderer would measure.
pub fn vpack(children: Vec<VNode>, target: Target, orient: VOrient) -> Packed<VBox> {
    let mut extent = Scaled::ZERO; // top-to-bottom natural size
    let mut width = Scaled::ZERO;
    let mut stretch = Elastic::ZERO;
    let mut shrink = Elastic::ZERO;
    let mut baseline_child: Option<usize> = None;

    for (i, child) in children.iter().enumerate() {
        match child {
            VNode::HBox(b) => {
                width = width.max(b.width + b.shift);
                note_baseline(&mut baseline_child, i, orient);
            }
            VNode::VBox(b) => {
                width = width.max(b.width + b.shift);
                note_baseline(&mut baseline_child, i, orient);
            }
            VNode::Rule(r) => {
                if let Some(w) = r.width {
                    width = width.max(w);
                }
            }
            VNode::Glue(g) => {
                stretch.add(g.glue.stretch, g.glue.stretch_order);
                shrink.add(g.glue.shrink, g.glue.shrink_order);
            }
            VNode::Kern(_) | VNode::Penalty(_) => {}
        }
        extent += child.natural_extent();
    }

    let total = target.resolve(extent);
    let (glue_set, badness, fault) = set_glue(total - extent, stretch, shrink);

    // Baseline offset from the top, with the glue set.
    let height = match baseline_child {
        None => total,
        Some(idx) => {
            let mut offset = Scaled::ZERO;
            for child in &children[..idx] {
                offset += match child {
                    VNode::Glue(g) => glue_set.set_width(&g.glue),
                    other => other.natural_extent(),
                };
            }
            offset
                + match &children[idx] {
                    VNode::HBox(b) => b.height,
                    VNode::VBox(b) => b.height,
                    _ => Scaled::ZERO,
                }
        }
    };
    let depth = total - height;
    Packed {
        content: VBox {
            width,
            height,
            depth,
            shift: Scaled::ZERO,
            glue_set,
            children,
        },
        badness,
        fault,
    }
}

fn note_baseline(slot: &mut Option<usize>, candidate: usize, orient: VOrient) {
    match orient {
        VOrient::VBox => {
            if slot.is_none() {
                *slot = Some(candidate);
            }
        }
        VOrient::VTop => *slot = Some(candidate),
    }
}

/// Computes the glue setting for a size discrepancy `delta` given the
/// per-order elastic totals.
fn set_glue(delta: Scaled, stretch: Elastic, shrink: Elastic) -> (GlueSet, Badness, Option<Fault>) {
    if delta == Scaled::ZERO {
        return (GlueSet::NONE, 0, None);
    }
    if delta.is_positive() {
        let (total, order) = stretch.highest();
        if total == Scaled::ZERO {
            return (
                GlueSet::NONE,
                INF_BAD,
                Some(Fault::Underfull {
                    badness: INF_BAD,
                    shortfall: delta,
                }),
            );
        }
        let ratio = delta.0 as f64 / total.0 as f64;
        let b = if order == GlueOrder::Normal {
            badness(delta, total)
        } else {
            0 // infinite stretch absorbs anything
        };
        let fault = (b >= INF_BAD).then_some(Fault::Underfull {
            badness: b,
            shortfall: delta,
        });
        (
            GlueSet {
                ratio,
                sign: GlueSign::Stretching,
                order,
            },
            b,
            fault,
        )
    } else {
        let need = -delta;
        let (total, order) = shrink.highest();
        if total == Scaled::ZERO {
            return (
                GlueSet::NONE,
                INF_BAD,
                Some(Fault::Overfull { overrun: need }),
            );
        }
        if order == GlueOrder::Normal && need > total {
            // Shrink is capped at ratio 1; the rest sticks out.
            return (
                GlueSet {
                    ratio: 1.0,
                    sign: GlueSign::Shrinking,
                    order,
                },
                INF_BAD,
                Some(Fault::Overfull {
                    overrun: need - total,
                }),
            );
        }
        let ratio = need.0 as f64 / total.0 as f64;
        let b = if order == GlueOrder::Normal {
            badness(need, total)
        } else {
            0
        };
        (
            GlueSet {
                ratio,
                sign: GlueSign::Shrinking,
                order,
            },
            b,
            None,
        )
    }
}

/// Convenience: an hbox at its natural size.
pub fn hbox_natural(children: Vec<HNode>) -> HBox {
    hpack(children, Target::Natural).content
}

/// A rule with all dimensions fixed.
pub fn fixed_rule(width: Scaled, height: Scaled, depth: Scaled) -> Rule {
    Rule {
        width: Some(width),
        height: Some(height),
        depth: Some(depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{CharNode, GlueNode, Kern};
    use fonts::FontId;
    use units::Glue;

    fn ch(width: i32) -> HNode {
        HNode::Char(CharNode {
            codepoint: 'x' as u32,
            font: FontId(0),
            width: Scaled(width),
            height: Scaled(width / 2),
            depth: Scaled(width / 10),
            italic: Scaled::ZERO,
        })
    }

    #[test]
    fn natural_pack_sums_advances() {
        // Three chars with the classical cmr10 'A', 'B', 'A' advances.
        let packed = hpack(
            vec![ch(491520), ch(524288), ch(491520)],
            Target::Natural,
        );
        assert_eq!(packed.content.width, Scaled(1_507_328));
        assert_eq!(packed.badness, 0);
        assert!(packed.fault.is_none());
        assert_eq!(packed.content.height, Scaled(524288 / 2));
    }

    #[test]
    fn stretch_to_target() {
        let glue = Glue {
            natural: Scaled(100_000),
            stretch: Scaled(50_000),
            ..Glue::ZERO
        };
        let packed = hpack(
            vec![ch(500_000), HNode::Glue(GlueNode::new(glue)), ch(500_000)],
            Target::Exact(Scaled(1_200_000)),
        );
        let b = &packed.content;
        assert_eq!(b.width, Scaled(1_200_000));
        assert_eq!(b.glue_set.sign, GlueSign::Stretching);
        assert_eq!(b.glue_set.order, GlueOrder::Normal);
        assert!((b.glue_set.ratio - 2.0).abs() < 1e-9);
        // The glue renders at natural + 2 * stretch.
        assert_eq!(b.glue_set.set_width(&glue), Scaled(200_000));
    }

    #[test]
    fn fil_overrides_finite_stretch() {
        let finite = Glue {
            natural: Scaled(100_000),
            stretch: Scaled(50_000),
            ..Glue::ZERO
        };
        let packed = hpack(
            vec![
                ch(500_000),
                HNode::Glue(GlueNode::new(finite)),
                HNode::Glue(GlueNode::new(Glue::fil())),
                ch(500_000),
            ],
            Target::Exact(Scaled(1_200_000)),
        );
        let b = &packed.content;
        assert_eq!(b.glue_set.order, GlueOrder::Fil);
        assert_eq!(b.glue_set.sign, GlueSign::Stretching);
        // The finite glue is left at its natural size.
        assert_eq!(b.glue_set.set_width(&finite), Scaled(100_000));
        assert_eq!(packed.badness, 0);
        assert!(packed.fault.is_none());
    }

    #[test]
    fn overfull_reports_overrun() {
        let glue = Glue {
            natural: Scaled(100_000),
            shrink: Scaled(10_000),
            ..Glue::ZERO
        };
        let packed = hpack(
            vec![ch(500_000), HNode::Glue(GlueNode::new(glue))],
            Target::Exact(Scaled(550_000)),
        );
        // Needs to lose 50000 but can only shrink 10000.
        assert_eq!(
            packed.fault,
            Some(Fault::Overfull {
                overrun: Scaled(40_000)
            })
        );
        assert!((packed.content.glue_set.ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn underfull_without_stretch() {
        let packed = hpack(vec![ch(100)], Target::Exact(Scaled(200)));
        assert!(matches!(packed.fault, Some(Fault::Underfull { .. })));
        assert_eq!(packed.badness, INF_BAD);
        assert_eq!(packed.content.width, Scaled(200));
    }

    #[test]
    fn kern_counts_toward_width() {
        let packed = hpack(
            vec![
                ch(100),
                HNode::Kern(Kern {
                    width: Scaled(25),
                    explicit: true,
                }),
                ch(100),
            ],
            Target::Natural,
        );
        assert_eq!(packed.content.width, Scaled(225));
    }

    #[test]
    fn vpack_baseline_first_by_default_last_for_vtop() {
        let line = |h: i32, d: i32| {
            VNode::HBox(HBox {
                width: Scaled(1000),
                height: Scaled(h),
                depth: Scaled(d),
                ..HBox::default()
            })
        };
        let children = vec![line(100, 20), line(80, 30)];
        let packed = vpack(children.clone(), Target::Natural, VOrient::VBox);
        // Baseline on the first line: height 100, the rest is depth.
        assert_eq!(packed.content.height, Scaled(100));
        assert_eq!(packed.content.depth, Scaled(20 + 80 + 30));

        let packed = vpack(children, Target::Natural, VOrient::VTop);
        assert_eq!(packed.content.height, Scaled(100 + 20 + 80));
        assert_eq!(packed.content.depth, Scaled(30));
    }

    #[test]
    fn vpack_stretches_vertical_glue() {
        let line = |h: i32| {
            VNode::HBox(HBox {
                width: Scaled(1000),
                height: Scaled(h),
                depth: Scaled::ZERO,
                ..HBox::default()
            })
        };
        let glue = Glue {
            natural: Scaled(50),
            stretch: Scaled(25),
            ..Glue::ZERO
        };
        let packed = vpack(
            vec![line(100), VNode::Glue(GlueNode::new(glue)), line(100)],
            Target::Exact(Scaled(300)),
            VOrient::VBox,
        );
        // Natural extent 250, target 300: the glue doubles (ratio 2).
        assert_eq!(packed.content.glue_set.sign, GlueSign::Stretching);
        assert!((packed.content.glue_set.ratio - 2.0).abs() < 1e-9);
        // Baseline on the first line; the stretched glue is all depth.
        assert_eq!(packed.content.height, Scaled(100));
        assert_eq!(packed.content.depth, Scaled(200));
        assert_eq!(
            packed.content.height + packed.content.depth,
            Scaled(300)
        );
    }
}
