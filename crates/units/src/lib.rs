//! Scaled-point arithmetic and glue records.
//!
//! Every length inside the typesetting pipeline is a [`Scaled`]: a signed
//! 32-bit fixed-point number with 1 pt = 2^16 sp. Conversions from other
//! units happen once, at input, via [`Unit`]. Elastic spacing is a [`Glue`]
//! record whose stretch and shrink components each carry a [`GlueOrder`].

use std::fmt::Write;

mod badness;
mod glue;

pub use badness::{badness, Badness, AWFUL_BAD, INF_BAD};
pub use glue::{Elastic, Glue, GlueOrder};

/// A length in scaled points.
///
/// The inner value is the length in points multiplied by 2^16, so the
/// type has 15 bits of integer part, 16 bits of fraction and a sign bit.
/// This is the numeric type defined in part 7 of TeX ("arithmetic with
/// scaled dimensions", TeX.2021.99 and onwards).
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaled(pub i32);

impl Scaled {
    pub const ZERO: Scaled = Scaled(0);

    /// One point.
    pub const ONE: Scaled = Scaled(1 << 16);

    /// The largest legal dimension, (2^30-1) sp.
    ///
    /// This is TeX's `max_dimen` (TeX.2021.421), not the maximum value of
    /// the underlying `i32`.
    pub const MAX_DIMEN: Scaled = Scaled((1 << 30) - 1);

    /// Converts an integer number of points.
    ///
    /// Returns an overflow error unless the input is in `(-2^14, 2^14)`.
    pub fn from_integer(i: i32) -> Result<Scaled, OverflowError> {
        if i.unsigned_abs() >= (1 << 14) {
            Err(OverflowError)
        } else {
            Ok(Scaled(i << 16))
        }
    }

    /// Converts a decimal fraction given as its digits, most significant
    /// first, into the fractional part of a scaled number.
    ///
    /// TeX.2021.102.
    pub fn from_decimal_digits(digits: &[u8]) -> Scaled {
        let mut a: i32 = 0;
        for d in digits.iter().rev() {
            a = (a + (*d as i32) * (1 << 17)) / 10;
        }
        Scaled((a + 1) / 2)
    }

    /// Builds a scaled number from an integer part, a fractional part in sp,
    /// and the unit both are expressed in.
    pub fn new(integer: i32, fraction: Scaled, unit: Unit) -> Result<Scaled, OverflowError> {
        let in_points = Scaled::from_integer(integer)? + fraction;
        if unit == Unit::Point {
            return Ok(in_points);
        }
        let (n, d) = unit.points_fraction();
        let (result, _) = in_points.xn_over_d(n, d)?;
        Ok(result)
    }

    /// Computes `self * n / d` exactly, returning the quotient and the
    /// remainder scaled by `2^16/d`.
    ///
    /// `n` and `d` must be in `[1, 2^16]`. TeX.2021.107 computes this with
    /// 32-bit arithmetic; we use 64-bit intermediates for the same result.
    pub fn xn_over_d(self, n: i32, d: i32) -> Result<(Scaled, Scaled), OverflowError> {
        debug_assert!((1..=1 << 16).contains(&n));
        debug_assert!((1..=1 << 16).contains(&d));
        let product = (self.0 as i64) * (n as i64);
        let quotient = product / (d as i64);
        if quotient.unsigned_abs() > Scaled::MAX_DIMEN.0 as u64 {
            return Err(OverflowError);
        }
        let remainder = (product % (d as i64)) as i32;
        Ok((Scaled(quotient as i32), Scaled(remainder)))
    }

    /// Computes `self * n + y`, checking for overflow. TeX.2021.105.
    pub fn nx_plus_y(self, n: i32, y: Scaled) -> Result<Scaled, OverflowError> {
        let result = (self.0 as i64) * (n as i64) + (y.0 as i64);
        if result.unsigned_abs() > Scaled::MAX_DIMEN.0 as u64 {
            Err(OverflowError)
        } else {
            Ok(Scaled(result as i32))
        }
    }

    /// Multiplies by a dimensionless ratio, rounding to the nearest sp.
    ///
    /// Used when applying a glue-set ratio to a stretch or shrink amount.
    /// The ratio is the one place the pipeline uses floating point; the
    /// result is immediately rounded back to sp.
    pub fn scale(self, ratio: f64) -> Scaled {
        let r = (self.0 as f64) * ratio;
        let clamped = r.clamp(-(Scaled::MAX_DIMEN.0 as f64), Scaled::MAX_DIMEN.0 as f64);
        Scaled(clamped.round() as i32)
    }

    /// Divides by two, rounding towards positive infinity.
    ///
    /// TeX.2021.100 uses this for centering computations so that two halves
    /// always recombine to the original.
    pub fn half(self) -> Scaled {
        Scaled((self.0 + 1) >> 1)
    }

    pub fn integer_part(self) -> i32 {
        self.0 / Scaled::ONE.0
    }

    pub fn fractional_part(self) -> Scaled {
        Scaled(self.0 % Scaled::ONE.0)
    }

    pub fn abs(self) -> Scaled {
        Scaled(self.0.abs())
    }

    pub fn min(self, other: Scaled) -> Scaled {
        Scaled(self.0.min(other.0))
    }

    pub fn max(self, other: Scaled) -> Scaled {
        Scaled(self.0.max(other.0))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

/// Error returned when a computation leaves the legal dimension range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowError;

impl std::fmt::Display for OverflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dimension too large")
    }
}

impl std::error::Error for OverflowError {}

impl std::fmt::Display for Scaled {
    /// Prints the shortest decimal fraction that rounds back to this value,
    /// followed by `pt`. TeX.2021.103.
    fn fmt(&self, fm: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            write!(fm, "-")?;
        }
        write!(fm, "{}.", self.abs().integer_part())?;
        let mut f = self.abs().fractional_part().0 * 10 + 5;
        let mut delta = 10;
        loop {
            if delta > Scaled::ONE.0 {
                f += 0o100000 - 50000;
            }
            fm.write_char((b'0' + (f / Scaled::ONE.0) as u8) as char)?;
            f = (f % Scaled::ONE.0) * 10;
            delta *= 10;
            if f <= delta {
                break;
            }
        }
        write!(fm, "pt")
    }
}

impl std::ops::Add for Scaled {
    type Output = Scaled;
    fn add(self, rhs: Scaled) -> Scaled {
        Scaled(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Scaled {
    fn add_assign(&mut self, rhs: Scaled) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Scaled {
    type Output = Scaled;
    fn sub(self, rhs: Scaled) -> Scaled {
        Scaled(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Scaled {
    fn sub_assign(&mut self, rhs: Scaled) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul<i32> for Scaled {
    type Output = Scaled;
    fn mul(self, rhs: i32) -> Scaled {
        Scaled(self.0 * rhs)
    }
}

impl std::ops::Div<i32> for Scaled {
    type Output = Scaled;
    fn div(self, rhs: i32) -> Scaled {
        Scaled(self.0 / rhs)
    }
}

impl std::ops::Neg for Scaled {
    type Output = Scaled;
    fn neg(self) -> Scaled {
        Scaled(-self.0)
    }
}

impl std::iter::Sum for Scaled {
    fn sum<I: Iterator<Item = Scaled>>(iter: I) -> Scaled {
        iter.fold(Scaled::ZERO, |a, b| a + b)
    }
}

/// A physical unit that lengths can be given in.
///
/// Defined in TeX.2021.458 and chapter 10 of the TeX book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Point,
    Pica,
    Inch,
    BigPoint,
    Centimeter,
    Millimeter,
    DidotPoint,
    Cicero,
    ScaledPoint,
}

impl Unit {
    /// Parses the two-character abbreviation, e.g. `"in"`.
    pub fn parse(s: &str) -> Option<Self> {
        use Unit::*;
        Some(match s {
            "pt" => Point,
            "pc" => Pica,
            "in" => Inch,
            "bp" => BigPoint,
            "cm" => Centimeter,
            "mm" => Millimeter,
            "dd" => DidotPoint,
            "cc" => Cicero,
            "sp" => ScaledPoint,
            _ => return None,
        })
    }

    /// The fraction `(n, d)` such that `x` of this unit is `xn/d` points.
    ///
    /// TeX.2021.458.
    pub fn points_fraction(self) -> (i32, i32) {
        use Unit::*;
        match self {
            Point => (1, 1),
            Pica => (12, 1),
            Inch => (7227, 100),
            BigPoint => (7227, 7200),
            Centimeter => (7227, 254),
            Millimeter => (7227, 2540),
            DidotPoint => (1238, 1157),
            Cicero => (14856, 1157),
            ScaledPoint => (1, 1 << 16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_integer_bounds() {
        assert_eq!(Scaled::from_integer(1), Ok(Scaled::ONE));
        assert_eq!(Scaled::from_integer(-3), Ok(Scaled(-3 << 16)));
        assert_eq!(Scaled::from_integer(1 << 14), Err(OverflowError));
        assert_eq!(Scaled::from_integer(-(1 << 14)), Err(OverflowError));
    }

    #[test]
    fn decimal_digits() {
        // 0.5pt is exactly 2^15 sp.
        assert_eq!(Scaled::from_decimal_digits(&[5]), Scaled(1 << 15));
        // 0.25pt is exactly 2^14 sp.
        assert_eq!(Scaled::from_decimal_digits(&[2, 5]), Scaled(1 << 14));
    }

    #[test]
    fn unit_conversion() {
        // 1in = 72.27pt = 72.27 * 65536 sp = 4736286.72, truncated.
        let one_inch = Scaled::new(1, Scaled::ZERO, Unit::Inch).unwrap();
        assert_eq!(one_inch, Scaled(4736286));
        // 1sp stays 1sp.
        let one_sp = Scaled(1 << 16).xn_over_d(1, 1 << 16).unwrap().0;
        assert_eq!(one_sp, Scaled(1));
    }

    #[test]
    fn xn_over_d_exact() {
        let (q, _) = Scaled(100).xn_over_d(3, 2).unwrap();
        assert_eq!(q, Scaled(150));
        assert!(Scaled::MAX_DIMEN.xn_over_d(1 << 16, 1).is_err());
    }

    #[test]
    fn half_rounds_up() {
        assert_eq!(Scaled(5).half(), Scaled(3));
        assert_eq!(Scaled(4).half(), Scaled(2));
        assert_eq!(Scaled(-5).half(), Scaled(-2));
    }

    #[test]
    fn display() {
        assert_eq!(Scaled::ONE.to_string(), "1.0pt");
        assert_eq!(Scaled(1 << 15).to_string(), "0.5pt");
        assert_eq!(Scaled(-(1 << 14)).to_string(), "-0.25pt");
    }

    #[test]
    fn scale_rounds() {
        assert_eq!(Scaled(100).scale(0.5), Scaled(50));
        assert_eq!(Scaled(50000).scale(2.0), Scaled(100000));
        assert_eq!(Scaled(3).scale(1.0 / 3.0), Scaled(1));
    }
}
