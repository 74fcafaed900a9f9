//! Glue records and per-order elastic accounting.

use crate::Scaled;

/// The infinity rank of a stretch or shrink component.
///
/// Order 0 is a finite amount of sp; orders 1 through 3 are the infinite
/// ranks fil, fill and filll. Any positive amount of a higher order
/// dominates every lower order when a box is set.
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GlueOrder {
    #[default]
    Normal = 0,
    Fil = 1,
    Fill = 2,
    Filll = 3,
}

impl GlueOrder {
    pub const ALL: [GlueOrder; 4] = [
        GlueOrder::Normal,
        GlueOrder::Fil,
        GlueOrder::Fill,
        GlueOrder::Filll,
    ];

    pub fn from_index(i: usize) -> Option<GlueOrder> {
        GlueOrder::ALL.get(i).copied()
    }
}

impl std::fmt::Display for GlueOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GlueOrder::Normal => "",
            GlueOrder::Fil => "fil",
            GlueOrder::Fill => "fill",
            GlueOrder::Filll => "filll",
        };
        write!(f, "{s}")
    }
}

/// Elastic inter-item spacing.
///
/// A glue has a natural size plus a stretch and a shrink component, each
/// with its own [`GlueOrder`]. Glues add componentwise; when the two
/// operands carry different orders in one direction, the higher order wins
/// and the lower-order amount is discarded, since it could never be
/// consumed anyway.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glue {
    pub natural: Scaled,
    pub stretch: Scaled,
    pub stretch_order: GlueOrder,
    pub shrink: Scaled,
    pub shrink_order: GlueOrder,
}

impl Glue {
    pub const ZERO: Glue = Glue {
        natural: Scaled::ZERO,
        stretch: Scaled::ZERO,
        stretch_order: GlueOrder::Normal,
        shrink: Scaled::ZERO,
        shrink_order: GlueOrder::Normal,
    };

    /// A rigid glue of the given size.
    pub fn fixed(natural: Scaled) -> Glue {
        Glue {
            natural,
            ..Glue::ZERO
        }
    }

    /// Zero natural size, one unit of first-order infinite stretch.
    /// This is `\hfil`/`\vfil`.
    pub fn fil() -> Glue {
        Glue {
            stretch: Scaled::ONE,
            stretch_order: GlueOrder::Fil,
            ..Glue::ZERO
        }
    }

    /// Zero natural size, one unit of second-order infinite stretch (`\hfill`).
    pub fn fill() -> Glue {
        Glue {
            stretch: Scaled::ONE,
            stretch_order: GlueOrder::Fill,
            ..Glue::ZERO
        }
    }

    /// One unit of infinite stretch *and* shrink (`\hss`).
    pub fn ss() -> Glue {
        Glue {
            stretch: Scaled::ONE,
            stretch_order: GlueOrder::Fil,
            shrink: Scaled::ONE,
            shrink_order: GlueOrder::Fil,
            ..Glue::ZERO
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Glue::ZERO
    }

    /// Scales all three components by `n/d`, saturating at the dimension
    /// bounds. Used when muskip glue is converted to sp.
    pub fn xn_over_d(&self, n: i32, d: i32) -> Glue {
        let f = |s: Scaled| match s.xn_over_d(n, d) {
            Ok((q, _)) => q,
            Err(_) => {
                if s.is_negative() {
                    -Scaled::MAX_DIMEN
                } else {
                    Scaled::MAX_DIMEN
                }
            }
        };
        Glue {
            natural: f(self.natural),
            stretch: f(self.stretch),
            stretch_order: self.stretch_order,
            shrink: f(self.shrink),
            shrink_order: self.shrink_order,
        }
    }
}

impl std::ops::Add for Glue {
    type Output = Glue;

    fn add(self, rhs: Glue) -> Glue {
        let (stretch, stretch_order) = add_component(
            self.stretch,
            self.stretch_order,
            rhs.stretch,
            rhs.stretch_order,
        );
        let (shrink, shrink_order) =
            add_component(self.shrink, self.shrink_order, rhs.shrink, rhs.shrink_order);
        Glue {
            natural: self.natural + rhs.natural,
            stretch,
            stretch_order,
            shrink,
            shrink_order,
        }
    }
}

impl std::ops::AddAssign for Glue {
    fn add_assign(&mut self, rhs: Glue) {
        *self = *self + rhs;
    }
}

fn add_component(
    a: Scaled,
    a_order: GlueOrder,
    b: Scaled,
    b_order: GlueOrder,
) -> (Scaled, GlueOrder) {
    match a_order.cmp(&b_order) {
        std::cmp::Ordering::Equal => (a + b, a_order),
        std::cmp::Ordering::Greater => (a, a_order),
        std::cmp::Ordering::Less => (b, b_order),
    }
}

impl std::fmt::Display for Glue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.natural)?;
        if self.stretch != Scaled::ZERO {
            write!(f, " plus {}{}", self.stretch, self.stretch_order)?;
        }
        if self.shrink != Scaled::ZERO {
            write!(f, " minus {}{}", self.shrink, self.shrink_order)?;
        }
        Ok(())
    }
}

/// Per-order elastic totals for one direction (stretch or shrink) of one box.
///
/// Packing accumulates every child glue's component into the slot for its
/// order, then reads off the highest order with a non-zero total.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elastic(pub [Scaled; 4]);

impl Elastic {
    pub const ZERO: Elastic = Elastic([Scaled::ZERO; 4]);

    pub fn add(&mut self, amount: Scaled, order: GlueOrder) {
        self.0[order as usize] += amount;
    }

    /// The highest order with a non-zero total, and that total.
    /// All-zero accumulators report order 0.
    pub fn highest(&self) -> (Scaled, GlueOrder) {
        for order in GlueOrder::ALL.iter().rev() {
            let total = self.0[*order as usize];
            if total != Scaled::ZERO {
                return (total, *order);
            }
        }
        (Scaled::ZERO, GlueOrder::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(v: i32) -> Scaled {
        Scaled(v)
    }

    #[test]
    fn add_same_order_is_componentwise() {
        let g1 = Glue {
            natural: sp(100),
            stretch: sp(10),
            shrink: sp(5),
            ..Glue::ZERO
        };
        let g2 = Glue {
            natural: sp(200),
            stretch: sp(30),
            shrink: sp(7),
            ..Glue::ZERO
        };
        let sum = g1 + g2;
        assert_eq!(sum.natural, sp(300));
        assert_eq!(sum.stretch, sp(40));
        assert_eq!(sum.shrink, sp(12));
        assert_eq!(sum.stretch_order, GlueOrder::Normal);
    }

    #[test]
    fn add_mixed_orders_keeps_highest() {
        let finite = Glue {
            natural: sp(100),
            stretch: sp(50),
            ..Glue::ZERO
        };
        let infinite = Glue::fil();
        let sum = finite + infinite;
        assert_eq!(sum.natural, sp(100));
        assert_eq!(sum.stretch, Scaled::ONE);
        assert_eq!(sum.stretch_order, GlueOrder::Fil);
        // Addition of natural parts is still exact.
        assert_eq!((sum + finite).natural, sp(200));
    }

    #[test]
    fn elastic_highest() {
        let mut e = Elastic::ZERO;
        assert_eq!(e.highest(), (Scaled::ZERO, GlueOrder::Normal));
        e.add(sp(50), GlueOrder::Normal);
        assert_eq!(e.highest(), (sp(50), GlueOrder::Normal));
        e.add(sp(1), GlueOrder::Fill);
        assert_eq!(e.highest(), (sp(1), GlueOrder::Fill));
        e.add(sp(2), GlueOrder::Fil);
        assert_eq!(e.highest(), (sp(1), GlueOrder::Fill));
    }

    #[test]
    fn display() {
        let g = Glue {
            natural: Scaled::ONE,
            stretch: Scaled::ONE / 2,
            stretch_order: GlueOrder::Fil,
            ..Glue::ZERO
        };
        assert_eq!(g.to_string(), "1.0pt plus 0.5ptfil");
    }
}
