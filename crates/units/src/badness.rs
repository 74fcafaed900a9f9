//! TeX's integer badness function.

use crate::Scaled;

/// Badness 10000, TeX's `inf_bad`: the threshold at which a glue setting
/// is reported as infinitely bad.
pub const INF_BAD: Badness = 10_000;

/// A demerit value larger than any achievable badness-derived quantity,
/// TeX's `awful_bad` (TeX.2021.833).
pub const AWFUL_BAD: i64 = 0x3FFF_FFFF;

pub type Badness = i32;

/// Computes `min(100 * (t/s)^3, INF_BAD)` without floating point.
///
/// `t` is the amount a box must stretch or shrink and `s` the total
/// elastic available at the winning order. This is the integer algorithm
/// of TeX.2021.108: `r` approximates `t * (100/s)^(1/3)` and the result is
/// `(r^3 + 2^17) / 2^18`, which matches `round(100 t^3 / s^3)` to within
/// rounding at every representable input.
pub fn badness(t: Scaled, s: Scaled) -> Badness {
    let t = t.0;
    let s = s.0;
    if t == 0 {
        return 0;
    }
    if s <= 0 {
        return INF_BAD;
    }
    let r: i64 = if t <= 7_230_584 {
        (t as i64 * 297) / s as i64
    } else if s >= 1_663_497 {
        t as i64 / (s / 297) as i64
    } else {
        t as i64
    };
    if r > 1290 {
        INF_BAD
    } else {
        ((r * r * r + 0o400000) / 0o1000000) as Badness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_need_is_perfect() {
        assert_eq!(badness(Scaled::ZERO, Scaled::ZERO), 0);
        assert_eq!(badness(Scaled::ZERO, Scaled(100)), 0);
    }

    #[test]
    fn no_elastic_is_infinitely_bad() {
        assert_eq!(badness(Scaled(1), Scaled::ZERO), INF_BAD);
        assert_eq!(badness(Scaled(1), Scaled(-5)), INF_BAD);
    }

    #[test]
    fn unit_ratio_is_100() {
        // t == s: ratio 1, badness 100.
        assert_eq!(badness(Scaled(65536), Scaled(65536)), 100);
        assert_eq!(badness(Scaled(100), Scaled(100)), 100);
    }

    #[test]
    fn half_ratio() {
        // (1/2)^3 * 100 = 12.5, rounds to 12 or 13 depending on the
        // integer approximation; TeX gives 12 here.
        assert_eq!(badness(Scaled(50), Scaled(100)), 12);
    }

    #[test]
    fn cap_at_inf_bad() {
        assert_eq!(badness(Scaled(1_000_000), Scaled(1)), INF_BAD);
        // Ratio slightly above the representable ceiling.
        assert_eq!(badness(Scaled(65536 * 14), Scaled(65536)), INF_BAD);
    }

    #[test]
    fn large_operands_take_the_other_branches() {
        // t above 7230584 forces the s/297 branch.
        assert_eq!(badness(Scaled(8_000_000), Scaled(8_000_000)), 100);
        // Huge t with small s falls through to r = t.
        assert_eq!(badness(Scaled(8_000_000), Scaled(100)), INF_BAD);
    }
}
