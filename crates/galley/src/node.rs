//! The box model.
//!
//! Two node alphabets, one per list direction. A box's dimensions always
//! reflect its contents: the packing functions in [`crate::pack`] are the
//! only constructors of non-empty boxes, and they compute width, height,
//! depth and the glue setting before handing the box up. Positions are not
//! stored here at all; they are resolved at ship-out (see [`crate::ship`]).

use fonts::FontId;
use units::{Glue, GlueOrder, Scaled};

/// An element of a horizontal list.
#[derive(Debug, Clone, PartialEq)]
pub enum HNode {
    Char(CharNode),
    HBox(HBox),
    VBox(VBox),
    Rule(Rule),
    Glue(GlueNode),
    Kern(Kern),
    Penalty(Penalty),
    Disc(Discretionary),
}

/// An element of a vertical list.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    HBox(HBox),
    VBox(VBox),
    Rule(Rule),
    Glue(GlueNode),
    Kern(Kern),
    Penalty(Penalty),
}

/// A single typeset character. The metrics are copied out of the font at
/// construction so the hot loops never call back into the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharNode {
    pub codepoint: u32,
    pub font: FontId,
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
    pub italic: Scaled,
}

/// How the elastic components of a packed box are to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlueSet {
    pub ratio: f64,
    pub sign: GlueSign,
    pub order: GlueOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlueSign {
    #[default]
    Normal,
    Stretching,
    Shrinking,
}

impl GlueSet {
    pub const NONE: GlueSet = GlueSet {
        ratio: 0.0,
        sign: GlueSign::Normal,
        order: GlueOrder::Normal,
    };

    /// The width a glue renders at under this setting.
    pub fn set_width(&self, g: &Glue) -> Scaled {
        match self.sign {
            GlueSign::Stretching if g.stretch_order == self.order => {
                g.natural + g.stretch.scale(self.ratio)
            }
            GlueSign::Shrinking if g.shrink_order == self.order => {
                g.natural - g.shrink.scale(self.ratio)
            }
            _ => g.natural,
        }
    }
}

/// A horizontal box. `shift` moves the box down when it appears in a
/// horizontal list and right when it appears in a vertical list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HBox {
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
    pub shift: Scaled,
    pub glue_set: GlueSet,
    pub children: Vec<HNode>,
}

/// A vertical box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VBox {
    pub width: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
    pub shift: Scaled,
    pub glue_set: GlueSet,
    pub children: Vec<VNode>,
}

/// A solid rectangle. `None` dimensions are "running": they take the
/// corresponding dimension of the enclosing box at ship-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rule {
    pub width: Option<Scaled>,
    pub height: Option<Scaled>,
    pub depth: Option<Scaled>,
}

/// Glue in a list. `leaders` marks glue whose space is filled with
/// repeated material by the output driver; the box model only tracks the
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlueNode {
    pub glue: Glue,
    pub leaders: bool,
}

impl GlueNode {
    pub fn new(glue: Glue) -> GlueNode {
        GlueNode {
            glue,
            leaders: false,
        }
    }
}

/// A fixed space. Implicit kerns come from lig/kern programs and permit
/// a following line break only when followed by glue; explicit kerns
/// (`\kern`) do not break at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kern {
    pub width: Scaled,
    pub explicit: bool,
}

/// A break-control item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty(pub i32);

impl Penalty {
    /// Breaks are forbidden at or above this value.
    pub const INFINITE: i32 = 10_000;
    /// Breaks are forced at or below this value.
    pub const EJECT: i32 = -10_000;

    pub fn forbids_break(&self) -> bool {
        self.0 >= Penalty::INFINITE
    }

    pub fn forces_break(&self) -> bool {
        self.0 <= Penalty::EJECT
    }
}

/// A discretionary break: `no_break` is typeset when the line does not
/// break here; `pre` ends the line and `post` starts the next one when it
/// does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Discretionary {
    pub pre: Vec<HNode>,
    pub post: Vec<HNode>,
    pub no_break: Vec<HNode>,
    /// True for hyphenation points, which attract double-hyphen demerits.
    pub hyphen: bool,
}

impl HNode {
    /// Whether a break after this item is legal when the next item is glue.
    /// TeX calls these the non-discardable items.
    pub fn precedes_break(&self) -> bool {
        matches!(
            self,
            HNode::Char(_) | HNode::HBox(_) | HNode::VBox(_) | HNode::Rule(_) | HNode::Disc(_)
        )
    }

    /// Natural width contribution when measuring a list.
    pub fn natural_width(&self) -> Scaled {
        match self {
            HNode::Char(c) => c.width,
            HNode::HBox(b) => b.width,
            HNode::VBox(b) => b.width,
            HNode::Rule(r) => r.width.unwrap_or(Scaled::ZERO),
            HNode::Glue(g) => g.glue.natural,
            HNode::Kern(k) => k.width,
            HNode::Penalty(_) => Scaled::ZERO,
            HNode::Disc(d) => d.no_break.iter().map(HNode::natural_width).sum(),
        }
    }
}

impl VNode {
    /// Vertical extent (height + depth) contribution.
    pub fn natural_extent(&self) -> Scaled {
        match self {
            VNode::HBox(b) => b.height + b.depth,
            VNode::VBox(b) => b.height + b.depth,
            VNode::Rule(r) => {
                r.height.unwrap_or(Scaled::ZERO) + r.depth.unwrap_or(Scaled::ZERO)
            }
            VNode::Glue(g) => g.glue.natural,
            VNode::Kern(k) => k.width,
            VNode::Penalty(_) => Scaled::ZERO,
        }
    }

    /// Rules and glue do not carry a baseline; everything else does.
    pub fn has_baseline(&self) -> bool {
        matches!(self, VNode::HBox(_) | VNode::VBox(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_width_respects_sign_and_order() {
        let g = Glue {
            natural: Scaled(100_000),
            stretch: Scaled(50_000),
            shrink: Scaled(25_000),
            ..Glue::ZERO
        };
        let stretching = GlueSet {
            ratio: 2.0,
            sign: GlueSign::Stretching,
            order: GlueOrder::Normal,
        };
        assert_eq!(stretching.set_width(&g), Scaled(200_000));

        let shrinking = GlueSet {
            ratio: 1.0,
            sign: GlueSign::Shrinking,
            order: GlueOrder::Normal,
        };
        assert_eq!(shrinking.set_width(&g), Scaled(75_000));

        // A fil-order setting leaves finite glue at its natural size.
        let fil = GlueSet {
            ratio: 3.0,
            sign: GlueSign::Stretching,
            order: GlueOrder::Fil,
        };
        assert_eq!(fil.set_width(&g), Scaled(100_000));
    }

    #[test]
    fn penalty_classification() {
        assert!(Penalty(Penalty::INFINITE).forbids_break());
        assert!(Penalty(Penalty::EJECT).forces_break());
        assert!(!Penalty(0).forbids_break());
        assert!(!Penalty(0).forces_break());
    }
}
