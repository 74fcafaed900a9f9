//! Sequence comparison of typed event lists.
//!
//! Matching is strictly positional: event i of one list is compared to
//! event i of the other, never re-ordered. Identity fields (kind, font,
//! codepoint) must match exactly; coordinates and dimensions may differ
//! by up to the tolerance.

use serde::Serialize;

use crate::Event;

/// Default coordinate tolerance in sp.
pub const DEFAULT_TOLERANCE: i32 = 1;

/// One disagreement between the lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub index: usize,
    /// The event kind at this index ("char", "rule"), or "count" when
    /// one list ran out.
    pub kind: &'static str,
    pub field: &'static str,
    pub expected: i64,
    pub actual: i64,
    /// actual - expected; 0 for non-numeric disagreements.
    pub delta: i64,
}

/// Compares event lists within an absolute per-field tolerance. An empty
/// report means the lists agree.
pub fn compare(expected: &[Event], actual: &[Event], tolerance: i32) -> Vec<Mismatch> {
    let mut report = Vec::new();
    for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
        match (e, a) {
            (
                Event::Char {
                    font: ef,
                    codepoint: ec,
                    x: ex,
                    y: ey,
                },
                Event::Char {
                    font: af,
                    codepoint: ac,
                    x: ax,
                    y: ay,
                },
            ) => {
                let mut check = Checker::new(index, "char", tolerance, &mut report);
                check.exact("font", *ef as i64, *af as i64);
                check.exact("codepoint", *ec as i64, *ac as i64);
                check.near("x", ex.0, ax.0);
                check.near("y", ey.0, ay.0);
            }
            (
                Event::Rule {
                    x: ex,
                    y: ey,
                    w: ew,
                    h: eh,
                },
                Event::Rule {
                    x: ax,
                    y: ay,
                    w: aw,
                    h: ah,
                },
            ) => {
                let mut check = Checker::new(index, "rule", tolerance, &mut report);
                check.near("x", ex.0, ax.0);
                check.near("y", ey.0, ay.0);
                check.near("w", ew.0, aw.0);
                check.near("h", eh.0, ah.0);
            }
            (e, a) => report.push(Mismatch {
                index,
                kind: kind_name(e),
                field: "kind",
                expected: kind_code(e),
                actual: kind_code(a),
                delta: 0,
            }),
        }
    }
    if expected.len() != actual.len() {
        report.push(Mismatch {
            index: expected.len().min(actual.len()),
            kind: "count",
            field: "events",
            expected: expected.len() as i64,
            actual: actual.len() as i64,
            delta: actual.len() as i64 - expected.len() as i64,
        });
    }
    report
}

fn kind_name(e: &Event) -> &'static str {
    match e {
        Event::Char { .. } => "char",
        Event::Rule { .. } => "rule",
    }
}

fn kind_code(e: &Event) -> i64 {
    match e {
        Event::Char { .. } => 0,
        Event::Rule { .. } => 1,
    }
}

struct Checker<'a> {
    index: usize,
    kind: &'static str,
    tolerance: i64,
    report: &'a mut Vec<Mismatch>,
}

impl<'a> Checker<'a> {
    fn new(
        index: usize,
        kind: &'static str,
        tolerance: i32,
        report: &'a mut Vec<Mismatch>,
    ) -> Self {
        Checker {
            index,
            kind,
            tolerance: tolerance as i64,
            report,
        }
    }

    fn push(&mut self, field: &'static str, expected: i64, actual: i64) {
        self.report.push(Mismatch {
            index: self.index,
            kind: self.kind,
            field,
            expected,
            actual,
            delta: actual - expected,
        });
    }

    fn exact(&mut self, field: &'static str, expected: i64, actual: i64) {
        if expected != actual {
            self.push(field, expected, actual);
        }
    }

    fn near(&mut self, field: &'static str, expected: i32, actual: i32) {
        if (actual as i64 - expected as i64).abs() > self.tolerance {
            self.push(field, expected as i64, actual as i64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use units::Scaled;

    fn char_at(x: i32, y: i32) -> Event {
        Event::Char {
            font: 0,
            codepoint: 'a' as u32,
            x: Scaled(x),
            y: Scaled(y),
        }
    }

    #[test]
    fn identical_lists_produce_an_empty_report() {
        let events = vec![
            char_at(0, 0),
            Event::Rule {
                x: Scaled(0),
                y: Scaled(0),
                w: Scaled(100),
                h: Scaled(26_214),
            },
        ];
        assert!(compare(&events, &events, DEFAULT_TOLERANCE).is_empty());
    }

    #[test]
    fn one_sp_of_drift_is_within_the_default_tolerance() {
        let expected = vec![char_at(1000, 500)];
        let actual = vec![char_at(1001, 499)];
        assert!(compare(&expected, &actual, DEFAULT_TOLERANCE).is_empty());
    }

    #[test]
    fn two_sp_of_drift_is_reported_with_its_delta() {
        let expected = vec![char_at(1000, 0)];
        let actual = vec![char_at(1002, 0)];
        let report = compare(&expected, &actual, DEFAULT_TOLERANCE);
        assert_eq!(
            report,
            vec![Mismatch {
                index: 0,
                kind: "char",
                field: "x",
                expected: 1000,
                actual: 1002,
                delta: 2,
            }]
        );
    }

    #[test]
    fn codepoints_must_match_exactly() {
        let expected = vec![char_at(0, 0)];
        let actual = vec![Event::Char {
            font: 0,
            codepoint: 'b' as u32,
            x: Scaled(0),
            y: Scaled(0),
        }];
        let report = compare(&expected, &actual, 1_000_000);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].field, "codepoint");
    }

    #[test]
    fn a_kind_swap_is_a_single_mismatch() {
        let expected = vec![char_at(0, 0)];
        let actual = vec![Event::Rule {
            x: Scaled(0),
            y: Scaled(0),
            w: Scaled(1),
            h: Scaled(1),
        }];
        let report = compare(&expected, &actual, DEFAULT_TOLERANCE);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].field, "kind");
    }

    #[test]
    fn a_length_mismatch_is_reported_at_the_tail() {
        let expected = vec![char_at(0, 0), char_at(100, 0)];
        let actual = vec![char_at(0, 0)];
        let report = compare(&expected, &actual, DEFAULT_TOLERANCE);
        assert_eq!(
            report,
            vec![Mismatch {
                index: 1,
                kind: "count",
                field: "events",
                expected: 2,
                actual: 1,
                delta: -1,
            }]
        );
    }
}
