//! Ship-out: resolving a finished box tree to absolute positions.
//!
//! Boxes never carry positions while they are being built; a box's (x, y)
//! is decided by its parent when the tree is shipped. Shipping walks the
//! tree once and produces an immutable [`Placed`] tree in the DVI
//! coordinate convention: x grows rightward, y grows downward, and a
//! node's (x, y) is its reference point on the baseline. The page origin
//! (0, 0) is the reference point of the root box.

use fonts::FontId;
use units::Scaled;

use crate::node::{HBox, HNode, Rule, VBox, VNode};

/// A positioned element. Dimensions are copied from the source nodes so
/// consumers (DVI emitter, JSON writer, comparator) never walk back into
/// the unpositioned tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Char(PlacedChar),
    Rule(PlacedRule),
    Box(PlacedBox),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedChar {
    pub font: FontId,
    pub codepoint: u32,
    pub x: Scaled,
    pub y: Scaled,
    pub width: Scaled,
}

/// A rule, positioned by its bottom-left corner like a DVI `set_rule`
/// (the rule paints from (x, y) upward and rightward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedRule {
    pub x: Scaled,
    pub y: Scaled,
    pub width: Scaled,
    /// Full vertical size, height + depth of the source rule.
    pub height: Scaled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    pub kind: BoxKind,
    pub x: Scaled,
    pub y: Scaled,
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
    pub children: Vec<Placed>,
}

/// Ships a finished vertical box with its reference point at the origin.
pub fn ship(root: &VBox) -> PlacedBox {
    vlist_out(root, Scaled::ZERO, Scaled::ZERO)
}

fn hlist_out(b: &HBox, x: Scaled, y: Scaled) -> PlacedBox {
    let mut children = Vec::new();
    let mut h = x;
    for child in &b.children {
        match child {
            HNode::Char(c) => {
                children.push(Placed::Char(PlacedChar {
                    font: c.font,
                    codepoint: c.codepoint,
                    x: h,
                    y,
                    width: c.width,
                }));
                h += c.width;
            }
            HNode::HBox(inner) => {
                children.push(Placed::Box(hlist_out(inner, h, y + inner.shift)));
                h += inner.width;
            }
            HNode::VBox(inner) => {
                children.push(Placed::Box(vlist_out(inner, h, y + inner.shift)));
                h += inner.width;
            }
            HNode::Rule(r) => {
                let (rh, rd, rw) = rule_in_hlist(r, b);
                children.push(Placed::Rule(PlacedRule {
                    x: h,
                    y: y + rd,
                    width: rw,
                    height: rh + rd,
                }));
                h += rw;
            }
            HNode::Glue(g) => {
                h += b.glue_set.set_width(&g.glue);
            }
            HNode::Kern(k) => {
                h += k.width;
            }
            HNode::Penalty(_) => {}
            HNode::Disc(d) => {
                // An unbroken discretionary ships its no-break run.
                for inner in &d.no_break {
                    if let HNode::Char(c) = inner {
                        children.push(Placed::Char(PlacedChar {
                            font: c.font,
                            codepoint: c.codepoint,
                            x: h,
                            y,
                            width: c.width,
                        }));
                        h += c.width;
                    } else {
                        h += inner.natural_width();
                    }
                }
            }
        }
    }
    PlacedBox {
        kind: BoxKind::Horizontal,
        x,
        y,
        width: b.width,
        height: b.height,
        depth: b.depth,
        children,
    }
}

fn vlist_out(b: &VBox, x: Scaled, y: Scaled) -> PlacedBox {
    let mut children = Vec::new();
    // Walk from the top edge downward; the reference point is `height`
    // below the top.
    let mut v = y - b.height;
    for child in &b.children {
        match child {
            VNode::HBox(inner) => {
                v += inner.height;
                children.push(Placed::Box(hlist_out(inner, x + inner.shift, v)));
                v += inner.depth;
            }
            VNode::VBox(inner) => {
                v += inner.height;
                children.push(Placed::Box(vlist_out(inner, x + inner.shift, v)));
                v += inner.depth;
            }
            VNode::Rule(r) => {
                let rw = r.width.unwrap_or(b.width);
                let rh = r.height.unwrap_or(Scaled::ZERO);
                let rd = r.depth.unwrap_or(Scaled::ZERO);
                v += rh + rd;
                children.push(Placed::Rule(PlacedRule {
                    x,
                    y: v,
                    width: rw,
                    height: rh + rd,
                }));
            }
            VNode::Glue(g) => {
                v += b.glue_set.set_width(&g.glue);
            }
            VNode::Kern(k) => {
                v += k.width;
            }
            VNode::Penalty(_) => {}
        }
    }
    PlacedBox {
        kind: BoxKind::Vertical,
        x,
        y,
        width: b.width,
        height: b.height,
        depth: b.depth,
        children,
    }
}

/// Resolves a rule's dimensions inside a horizontal list: running height
/// and depth fill the enclosing box.
fn rule_in_hlist(r: &Rule, b: &HBox) -> (Scaled, Scaled, Scaled) {
    (
        r.height.unwrap_or(b.height),
        r.depth.unwrap_or(b.depth),
        r.width.unwrap_or(Scaled::ZERO),
    )
}

impl PlacedBox {
    /// Flattens to leaf events in reading order. Box boundaries are
    /// dropped; chars and rules survive. This is the event list the
    /// comparator works on.
    pub fn leaves(&self) -> Vec<Placed> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Placed>) {
        for child in &self.children {
            match child {
                Placed::Box(b) => b.collect_leaves(out),
                leaf => out.push(leaf.clone()),
            }
        }
    }
}
