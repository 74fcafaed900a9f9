//! JSON layout output and tolerance-aware comparison.
//!
//! The JSON form mirrors the shipped tree: every box, character and rule
//! becomes an object tagged with `"kind"`, with all coordinates and
//! dimensions as integers in sp, ordered exactly as shipped. For
//! comparison both a JSON tree and a DVI page flatten to the same typed
//! event list, which is matched strictly by sequence.

use serde::{Deserialize, Serialize};
use units::Scaled;

use dvi::read::{Page, Shipped};
use galley::ship::{BoxKind, Placed, PlacedBox};

mod compare;
pub use compare::{compare, Mismatch, DEFAULT_TOLERANCE};

/// One node of the serialized layout tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutNode {
    VBox {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        d: i32,
        children: Vec<LayoutNode>,
    },
    HBox {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        d: i32,
        children: Vec<LayoutNode>,
    },
    Char {
        font: u32,
        codepoint: u32,
        x: i32,
        y: i32,
        w: i32,
    },
    Rule {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
}

impl From<&PlacedBox> for LayoutNode {
    fn from(b: &PlacedBox) -> LayoutNode {
        let children = b.children.iter().map(LayoutNode::from).collect();
        match b.kind {
            BoxKind::Vertical => LayoutNode::VBox {
                x: b.x.0,
                y: b.y.0,
                w: b.width.0,
                h: b.height.0,
                d: b.depth.0,
                children,
            },
            BoxKind::Horizontal => LayoutNode::HBox {
                x: b.x.0,
                y: b.y.0,
                w: b.width.0,
                h: b.height.0,
                d: b.depth.0,
                children,
            },
        }
    }
}

impl From<&Placed> for LayoutNode {
    fn from(p: &Placed) -> LayoutNode {
        match p {
            Placed::Char(c) => LayoutNode::Char {
                font: c.font.0,
                codepoint: c.codepoint,
                x: c.x.0,
                y: c.y.0,
                w: c.width.0,
            },
            Placed::Rule(r) => LayoutNode::Rule {
                x: r.x.0,
                y: r.y.0,
                w: r.width.0,
                h: r.height.0,
            },
            Placed::Box(b) => b.into(),
        }
    }
}

/// Serializes a shipped page. The output is deterministic: same tree,
/// same bytes.
pub fn to_json(root: &PlacedBox) -> serde_json::Result<String> {
    serde_json::to_string(&LayoutNode::from(root))
}

pub fn from_json(s: &str) -> serde_json::Result<LayoutNode> {
    serde_json::from_str(s)
}

/// A typed leaf event, the common currency of the comparator. Box
/// boundaries carry no marks of their own and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Char {
        font: u32,
        codepoint: u32,
        x: Scaled,
        y: Scaled,
    },
    Rule {
        x: Scaled,
        y: Scaled,
        w: Scaled,
        h: Scaled,
    },
}

impl LayoutNode {
    /// Flattens to leaf events in reading order.
    pub fn events(&self) -> Vec<Event> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<Event>) {
        match self {
            LayoutNode::VBox { children, .. } | LayoutNode::HBox { children, .. } => {
                for child in children {
                    child.collect(out);
                }
            }
            LayoutNode::Char {
                font,
                codepoint,
                x,
                y,
                ..
            } => out.push(Event::Char {
                font: *font,
                codepoint: *codepoint,
                x: Scaled(*x),
                y: Scaled(*y),
            }),
            LayoutNode::Rule { x, y, w, h } => out.push(Event::Rule {
                x: Scaled(*x),
                y: Scaled(*y),
                w: Scaled(*w),
                h: Scaled(*h),
            }),
        }
    }
}

/// The events of a decoded DVI page. Kerns are motion, not marks, and
/// are dropped; character and rule positions already absorb them.
pub fn dvi_events(page: &Page) -> Vec<Event> {
    page.events
        .iter()
        .filter_map(|e| match e {
            Shipped::Char(c) => Some(Event::Char {
                font: c.font.0,
                codepoint: c.codepoint,
                x: c.x,
                y: c.y,
            }),
            Shipped::Rule(r) => Some(Event::Rule {
                x: r.x,
                y: r.y,
                w: r.width,
                h: r.height,
            }),
            Shipped::Kern(_) => None,
        })
        .collect()
}
