use std::sync::Arc;

use fonts::{
    ExtParam, ExtensibleRecipe, FontMetrics, FontTable, GlyphMetrics, MathParam, SizedDelimiter,
};
use units::Scaled;

use super::*;
use crate::node::HNode;

/// A hand-built math face: x-height 3.32pt-ish (217866sp), sup2 at
/// 258490sp, axis at 2.5pt, rule thickness 0.4pt. The bracket at
/// codepoint 91 grows through one larger glyph and then an extensible
/// recipe of 5pt pieces.
struct TestMathFont;

const BIG_BRACKET: u32 = 0xB0;
const EXT_TOP: u32 = 0xA0;
const EXT_BOT: u32 = 0xA1;
const EXT_REP: u32 = 0xA2;

impl FontMetrics for TestMathFont {
    fn name(&self) -> &str {
        "testmath"
    }

    fn at_size(&self) -> Scaled {
        Scaled(10 * 65536)
    }

    fn design_size(&self) -> Scaled {
        Scaled(10 * 65536)
    }

    fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics> {
        let g = |w: i32, h: i32, d: i32, italic: i32| GlyphMetrics {
            advance: Scaled(w),
            height: Scaled(h),
            depth: Scaled(d),
            italic_correction: Scaled(italic),
            is_extensible: false,
        };
        const CH_X: u32 = b'x' as u32;
        const CH_2: u32 = b'2' as u32;
        const CH_A: u32 = b'a' as u32;
        const CH_B: u32 = b'b' as u32;
        const CH_PLUS: u32 = b'+' as u32;
        const CH_EQ: u32 = b'=' as u32;
        const CH_LBRACKET: u32 = b'[' as u32;
        Some(match codepoint {
            CH_X => g(327_680, 217_866, 0, 0),
            CH_2 => g(294_912, 280_000, 0, 0),
            CH_A | CH_B => g(327_680, 283_000, 0, 0),
            CH_PLUS => g(511_181, 383_000, 55_000, 0),
            CH_EQ => g(511_181, 240_000, 0, 0),
            // An integral-like operator with a slant.
            0x222B => g(300_000, 400_000, 100_000, 60_000),
            CH_LBRACKET => g(180_000, 491_520, 163_840, 0),
            BIG_BRACKET => g(200_000, 655_360, 327_680, 0),
            EXT_TOP | EXT_BOT | EXT_REP => g(200_000, 327_680, 0, 0),
            _ => return None,
        })
    }

    fn kern(&self, _left: u32, _right: u32) -> Scaled {
        Scaled::ZERO
    }

    fn ligature(&self, _left: u32, _right: u32) -> Option<u32> {
        None
    }

    fn math_param(&self, param: MathParam) -> Scaled {
        Scaled(match param {
            MathParam::XHeight => 217_866,
            MathParam::Quad => 655_360,
            MathParam::AxisHeight => 163_840,
            MathParam::Num1 => 439_000,
            MathParam::Num2 => 320_000,
            MathParam::Num3 => 280_000,
            MathParam::Denom1 => 460_000,
            MathParam::Denom2 => 230_000,
            MathParam::Sup1 => 300_000,
            MathParam::Sup2 => 258_490,
            MathParam::Sup3 => 190_000,
            MathParam::Sub1 => 98_304,
            MathParam::Sub2 => 160_000,
            MathParam::SupDrop => 250_000,
            MathParam::SubDrop => 50_000,
            _ => 0,
        })
    }

    fn ext_param(&self, param: ExtParam) -> Scaled {
        Scaled(match param {
            ExtParam::DefaultRuleThickness => 26_214,
            ExtParam::BigOpSpacing1 => 72_090,
            ExtParam::BigOpSpacing2 => 108_748,
            ExtParam::BigOpSpacing3 => 131_072,
            ExtParam::BigOpSpacing4 => 39_322,
            ExtParam::BigOpSpacing5 => 65_536,
        })
    }

    fn sized_delimiter(&self, codepoint: u32, target: Scaled) -> Option<SizedDelimiter> {
        if codepoint != b'[' as u32 {
            // Everything else has no larger variants.
            self.glyph_metrics(codepoint)?;
            return Some(SizedDelimiter::Glyph(codepoint));
        }
        if target <= Scaled(491_520 + 163_840) {
            Some(SizedDelimiter::Glyph(codepoint))
        } else if target <= Scaled(655_360 + 327_680) {
            Some(SizedDelimiter::Glyph(BIG_BRACKET))
        } else {
            Some(SizedDelimiter::Recipe(ExtensibleRecipe {
                top: Some(EXT_TOP),
                middle: None,
                bottom: Some(EXT_BOT),
                repeat: EXT_REP,
            }))
        }
    }
}

fn test_table() -> FontTable {
    let mut table = FontTable::new();
    table.add(Arc::new(TestMathFont));
    table
}

fn ctx(table: &FontTable) -> MathContext<'_> {
    let id = fonts::FontId(0);
    MathContext::new(table, id, id, id)
}

fn ord(cp: u8) -> MathItem {
    MathItem::Atom(Atom::new(AtomClass::Ord, Field::Symbol(cp as u32)))
}

fn glue_count(nodes: &[HNode]) -> usize {
    nodes.iter().filter(|n| matches!(n, HNode::Glue(_))).count()
}

#[test]
fn medium_spacing_flanks_a_binary_operator() {
    let table = test_table();
    let ctx = ctx(&table);
    let items = vec![
        ord(b'a'),
        MathItem::Atom(Atom::new(AtomClass::Bin, Field::Symbol(b'+' as u32))),
        ord(b'b'),
    ];
    let nodes = mlist_to_hlist(items, Style::TEXT, &ctx).unwrap();
    assert_eq!(glue_count(&nodes), 2);
    // 4mu at quad 655360: 4/18 of a quad.
    let HNode::Glue(g) = &nodes[1] else {
        panic!("expected glue after the first atom");
    };
    assert_eq!(g.glue.natural, Scaled(655_360 * 4 / 18));
}

#[test]
fn leading_binary_demotes_to_ord() {
    let table = test_table();
    let ctx = ctx(&table);
    let items = vec![
        MathItem::Atom(Atom::new(AtomClass::Bin, Field::Symbol(b'+' as u32))),
        ord(b'a'),
    ];
    let nodes = mlist_to_hlist(items, Style::TEXT, &ctx).unwrap();
    assert_eq!(glue_count(&nodes), 0);
}

#[test]
fn binary_before_a_relation_demotes_to_ord() {
    let table = test_table();
    let ctx = ctx(&table);
    let items = vec![
        ord(b'a'),
        MathItem::Atom(Atom::new(AtomClass::Bin, Field::Symbol(b'+' as u32))),
        MathItem::Atom(Atom::new(AtomClass::Rel, Field::Symbol(b'=' as u32))),
        ord(b'b'),
    ];
    let nodes = mlist_to_hlist(items, Style::TEXT, &ctx).unwrap();
    // a<thin?>... the + becomes Ord: Ord-Ord none, Ord-Rel thick, Rel-Ord
    // thick.
    assert_eq!(glue_count(&nodes), 2);
    let HNode::Glue(g) = nodes
        .iter()
        .find(|n| matches!(n, HNode::Glue(_)))
        .unwrap()
    else {
        unreachable!()
    };
    assert_eq!(g.glue.natural, Scaled(655_360 * 5 / 18));
}

#[test]
fn script_style_drops_medium_and_thick_spacing() {
    let table = test_table();
    let ctx = ctx(&table);
    let items = vec![
        ord(b'a'),
        MathItem::Atom(Atom::new(AtomClass::Bin, Field::Symbol(b'+' as u32))),
        ord(b'b'),
    ];
    let style = Style {
        size: StyleSize::Script,
        cramped: false,
    };
    let nodes = mlist_to_hlist(items, style, &ctx).unwrap();
    assert_eq!(glue_count(&nodes), 0);
}

#[test]
fn thin_space_before_an_operator_survives_script_style() {
    let table = test_table();
    let ctx = ctx(&table);
    let items = vec![
        ord(b'a'),
        MathItem::Atom(Atom::new(AtomClass::Op, Field::Symbol(b'x' as u32))),
    ];
    let style = Style {
        size: StyleSize::Script,
        cramped: false,
    };
    let nodes = mlist_to_hlist(items, style, &ctx).unwrap();
    assert_eq!(glue_count(&nodes), 1);
}

#[test]
fn superscript_raise_is_the_sup2_parameter() {
    // Text style, char nucleus, shallow superscript: the raise is
    // max(0, sup2, depth + x_height/4) = sup2.
    let table = test_table();
    let ctx = ctx(&table);
    let mut atom = Atom::new(AtomClass::Ord, Field::Symbol(b'x' as u32));
    atom.sup = Field::Symbol(b'2' as u32);
    let nodes = mlist_to_hlist(vec![MathItem::Atom(atom)], Style::TEXT, &ctx).unwrap();
    assert_eq!(nodes.len(), 2);
    let HNode::HBox(sup) = &nodes[1] else {
        panic!("expected the superscript box");
    };
    assert_eq!(sup.shift, Scaled(-258_490));
    // Script space pads the script's width.
    assert_eq!(sup.width, Scaled(294_912) + SCRIPT_SPACE);
}

#[test]
fn subscript_drop_is_the_sub1_parameter() {
    let table = test_table();
    let ctx = ctx(&table);
    let mut atom = Atom::new(AtomClass::Ord, Field::Symbol(b'x' as u32));
    atom.sub = Field::Symbol(b'2' as u32);
    let nodes = mlist_to_hlist(vec![MathItem::Atom(atom)], Style::TEXT, &ctx).unwrap();
    let HNode::HBox(sub) = &nodes[1] else {
        panic!("expected the subscript box");
    };
    // max(0, sub1, height - 4/5 x_height) = max(98304, 280000 - 174292).
    assert_eq!(sub.shift, Scaled(105_708));
}

#[test]
fn double_scripts_keep_the_minimum_gap() {
    let table = test_table();
    let ctx = ctx(&table);
    let mut atom = Atom::new(AtomClass::Ord, Field::Symbol(b'x' as u32));
    atom.sup = Field::Symbol(b'2' as u32);
    atom.sub = Field::Symbol(b'2' as u32);
    let nodes = mlist_to_hlist(vec![MathItem::Atom(atom)], Style::TEXT, &ctx).unwrap();
    let HNode::VBox(stack) = &nodes[1] else {
        panic!("expected the script stack");
    };
    // The kern between the scripts is at least 4 rule thicknesses.
    let kern = stack
        .children
        .iter()
        .find_map(|n| match n {
            crate::node::VNode::Kern(k) => Some(k.width),
            _ => None,
        })
        .unwrap();
    assert!(kern >= Scaled(4 * 26_214));
}

#[test]
fn fraction_rule_sits_on_the_axis() {
    let table = test_table();
    let ctx = ctx(&table);
    let f = Fraction {
        num: Field::Symbol(b'a' as u32),
        denom: Field::Symbol(b'b' as u32),
        rule: None,
    };
    let nodes = mlist_to_hlist(vec![MathItem::Fraction(f)], Style::TEXT, &ctx).unwrap();
    // Null-delimiter kern, the stack, null-delimiter kern.
    assert_eq!(nodes.len(), 3);
    assert!(matches!(&nodes[0], HNode::Kern(k) if k.width == Scaled(78_643)));
    let HNode::VBox(v) = &nodes[1] else {
        panic!("expected the fraction stack");
    };
    // Locate the rule and sum the extent above it: it must straddle the
    // axis.
    let mut above = Scaled::ZERO;
    let mut found = false;
    for child in &v.children {
        if let crate::node::VNode::Rule(r) = child {
            found = true;
            let rule = r.height.unwrap();
            assert_eq!(rule, Scaled(26_214));
            // Rule top measured from the box top; convert to
            // baseline-relative.
            let top_from_baseline = v.height - above;
            assert_eq!(top_from_baseline, Scaled(163_840) + rule.half());
            break;
        }
        above += child.natural_extent();
    }
    assert!(found);
}

#[test]
fn atop_has_no_rule() {
    let table = test_table();
    let ctx = ctx(&table);
    let f = Fraction {
        num: Field::Symbol(b'a' as u32),
        denom: Field::Symbol(b'b' as u32),
        rule: Some(Scaled::ZERO),
    };
    let nodes = mlist_to_hlist(vec![MathItem::Fraction(f)], Style::TEXT, &ctx).unwrap();
    let HNode::VBox(v) = &nodes[1] else {
        panic!("expected the stack");
    };
    assert!(!v
        .children
        .iter()
        .any(|n| matches!(n, crate::node::VNode::Rule(_))));
}

#[test]
fn delimiter_selection_walks_the_size_chain() {
    let table = test_table();
    let ctx = ctx(&table);
    // Fits the base glyph.
    let small = delims::delimiter_box(b'[' as u32, Scaled(500_000), &ctx).unwrap();
    assert_eq!(small.height + small.depth, Scaled(491_520 + 163_840));
    // Needs the larger variant.
    let big = delims::delimiter_box(b'[' as u32, Scaled(800_000), &ctx).unwrap();
    assert_eq!(big.height + big.depth, Scaled(655_360 + 327_680));
    // Beyond the largest glyph: assembled from 5pt pieces. Fixed parts
    // cover 10pt, so 4 repeats reach 30pt for a 28pt target, trimmed back
    // to the target.
    let assembled = delims::delimiter_box(b'[' as u32, Scaled(28 * 65536), &ctx).unwrap();
    assert_eq!(assembled.height + assembled.depth, Scaled(28 * 65536));
}

#[test]
fn unknown_delimiter_is_an_error() {
    let table = test_table();
    let ctx = ctx(&table);
    assert_eq!(
        delims::delimiter_box(0xFFFF, Scaled(500_000), &ctx).unwrap_err(),
        MathError::BadDelimiter(0xFFFF)
    );
}

#[test]
fn display_operator_takes_limits() {
    let table = test_table();
    let ctx = ctx(&table);
    let mut atom = Atom::new(AtomClass::Op, Field::Symbol(0x222B));
    atom.sup = Field::Symbol(b'2' as u32);
    atom.sub = Field::Symbol(b'2' as u32);

    let display = mlist_to_hlist(
        vec![MathItem::Atom(atom.clone())],
        Style::DISPLAY,
        &ctx,
    )
    .unwrap();
    assert_eq!(display.len(), 1);
    assert!(matches!(&display[0], HNode::VBox(_)));

    // In text style the same atom keeps its scripts alongside.
    let text = mlist_to_hlist(vec![MathItem::Atom(atom)], Style::TEXT, &ctx).unwrap();
    assert!(matches!(&text[0], HNode::HBox(_)));
    assert!(text.len() > 1);
}

#[test]
fn fenced_group_covers_its_content() {
    let table = test_table();
    let ctx = ctx(&table);
    let fenced = Fenced {
        left: b'[' as u32,
        right: b'[' as u32,
        inner: vec![ord(b'a')],
    };
    let nodes = mlist_to_hlist(vec![MathItem::Fenced(fenced)], Style::TEXT, &ctx).unwrap();
    assert_eq!(nodes.len(), 3);
    assert!(matches!(&nodes[0], HNode::HBox(_)));
    assert!(matches!(&nodes[2], HNode::HBox(_)));
}

#[test]
fn styles_step_down() {
    assert_eq!(Style::DISPLAY.sup().size, StyleSize::Script);
    assert_eq!(Style::TEXT.sub().size, StyleSize::Script);
    assert!(Style::TEXT.sub().cramped);
    assert_eq!(Style::DISPLAY.num().size, StyleSize::Text);
    assert_eq!(Style::TEXT.denom().size, StyleSize::Script);
    assert!(Style::TEXT.denom().cramped);
    let ss = Style {
        size: StyleSize::Script,
        cramped: false,
    };
    assert_eq!(ss.sup().size, StyleSize::ScriptScript);
}
