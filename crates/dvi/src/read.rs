//! Reading a DVI file back into positioned events.
//!
//! The reader drives the DVI machine (position registers h and v, the
//! spacing variables w, x, y, z, and the position stack) over the command
//! stream and reports every character, rule, and horizontal motion with
//! absolute page coordinates. What it reports is the ground truth a
//! rendered page would show, independent of how the writer chose to
//! encode the motions.

use fonts::{FontId, FontTable};
use units::Scaled;

use crate::{Deserializer, DviError, Op, Var};

/// One positioned page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shipped {
    Char(ShippedChar),
    Rule(ShippedRule),
    Kern(ShippedKern),
}

/// A character set at (x, y), its reference point on the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippedChar {
    pub font: FontId,
    pub codepoint: u32,
    pub x: Scaled,
    pub y: Scaled,
}

/// A rule with bottom-left corner at (x, y), painting up and right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippedRule {
    pub x: Scaled,
    pub y: Scaled,
    pub width: Scaled,
    pub height: Scaled,
}

/// An explicit horizontal motion (`right`, `w`, `x`), reported from the
/// position where it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippedKern {
    pub x: Scaled,
    pub y: Scaled,
    pub amount: Scaled,
}

/// One decoded page: `\count0` and the events in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: i32,
    pub events: Vec<Shipped>,
}

/// Error for DVI data that decodes but cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    Dvi(DviError),
    /// A command arrived in a state where the format forbids it. The
    /// string names the violation.
    Malformed(&'static str),
    /// A font number with no definition in the supplied table.
    UnknownFont(u32),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Dvi(e) => e.fmt(f),
            ReadError::Malformed(what) => write!(f, "malformed DVI file: {what}"),
            ReadError::UnknownFont(n) => write!(f, "DVI font {n} is not in the font table"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Dvi(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DviError> for ReadError {
    fn from(e: DviError) -> Self {
        ReadError::Dvi(e)
    }
}

/// Decodes every page in `bytes`. Character advances are resolved against
/// `fonts`; the writer assigns DVI font numbers equal to [`FontId`]
/// indices, so the same table serves both directions.
pub fn read_pages(bytes: &[u8], fonts: &FontTable) -> Result<Vec<Page>, ReadError> {
    let mut result = Ok(());
    let mut pages = Vec::new();
    let mut machine: Option<Machine> = None;
    let mut in_postamble = false;
    for op in Deserializer::new(bytes, &mut result) {
        match op {
            Op::Preamble { .. } | Op::NoOp | Op::Extension(_) => {}
            Op::DefineFont { number, .. } => {
                if number as usize >= fonts.len() {
                    return Err(ReadError::UnknownFont(number));
                }
            }
            Op::BeginPage { parameters, .. } => {
                if machine.is_some() {
                    return Err(ReadError::Malformed("bop inside a page"));
                }
                if in_postamble {
                    return Err(ReadError::Malformed("bop after the postamble"));
                }
                machine = Some(Machine::new(parameters[0]));
            }
            Op::EndPage => {
                let m = machine
                    .take()
                    .ok_or(ReadError::Malformed("eop outside a page"))?;
                if !m.stack.is_empty() {
                    return Err(ReadError::Malformed("eop with a non-empty stack"));
                }
                pages.push(Page {
                    number: m.number,
                    events: m.events,
                });
            }
            Op::BeginPostamble { .. } => {
                if machine.is_some() {
                    return Err(ReadError::Malformed("post inside a page"));
                }
                in_postamble = true;
            }
            Op::EndPostamble { .. } => break,
            op => {
                let m = machine
                    .as_mut()
                    .ok_or(ReadError::Malformed("page content outside bop/eop"))?;
                m.execute(op, fonts)?;
            }
        }
    }
    result?;
    if machine.is_some() {
        return Err(ReadError::Malformed("data ended inside a page"));
    }
    Ok(pages)
}

/// The DVI machine state for one page. TeX.2021.584.
struct Machine {
    number: i32,
    h: Scaled,
    v: Scaled,
    vars: [Scaled; 4],
    stack: Vec<(Scaled, Scaled, [Scaled; 4])>,
    font: Option<FontId>,
    events: Vec<Shipped>,
}

impl Machine {
    fn new(number: i32) -> Machine {
        Machine {
            number,
            h: Scaled::ZERO,
            v: Scaled::ZERO,
            vars: [Scaled::ZERO; 4],
            stack: Vec::new(),
            font: None,
            events: Vec::new(),
        }
    }

    fn execute(&mut self, op: Op, fonts: &FontTable) -> Result<(), ReadError> {
        match op {
            Op::Char { code, advance } => {
                let font = self
                    .font
                    .ok_or(ReadError::Malformed("character set before any font"))?;
                self.events.push(Shipped::Char(ShippedChar {
                    font,
                    codepoint: code,
                    x: self.h,
                    y: self.v,
                }));
                if advance {
                    let width = fonts
                        .get(font)
                        .glyph_metrics(code)
                        .map(|m| m.advance)
                        .unwrap_or(Scaled::ZERO);
                    self.h += width;
                }
            }
            Op::Rule {
                height,
                width,
                advance,
            } => {
                self.events.push(Shipped::Rule(ShippedRule {
                    x: self.h,
                    y: self.v,
                    width: Scaled(width),
                    height: Scaled(height),
                }));
                if advance {
                    self.h += Scaled(width);
                }
            }
            Op::Push => self.stack.push((self.h, self.v, self.vars)),
            Op::Pop => {
                let (h, v, vars) = self
                    .stack
                    .pop()
                    .ok_or(ReadError::Malformed("pop on an empty stack"))?;
                self.h = h;
                self.v = v;
                self.vars = vars;
            }
            Op::Right(d) => self.move_h(Scaled(d)),
            Op::Down(d) => self.v += Scaled(d),
            Op::Move(var) => self.apply_var(var, self.vars[var as usize]),
            Op::SetVar(var, d) => {
                self.vars[var as usize] = Scaled(d);
                self.apply_var(var, Scaled(d));
            }
            Op::Font(number) => {
                if number as usize >= fonts.len() {
                    return Err(ReadError::UnknownFont(number));
                }
                self.font = Some(FontId(number));
            }
            // The dispatcher in read_pages handles everything else.
            _ => return Err(ReadError::Malformed("unexpected structural command")),
        }
        Ok(())
    }

    fn move_h(&mut self, amount: Scaled) {
        self.events.push(Shipped::Kern(ShippedKern {
            x: self.h,
            y: self.v,
            amount,
        }));
        self.h += amount;
    }

    fn apply_var(&mut self, var: Var, amount: Scaled) {
        match var {
            Var::W | Var::X => self.move_h(amount),
            Var::Y | Var::Z => self.v += amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::emit_document;
    use fonts::{ExtParam, FontMetrics, GlyphMetrics, MathParam, SizedDelimiter};
    use galley::node::{CharNode, HNode, Kern, Rule, VNode};
    use galley::pack::{hpack, vpack, Target, VOrient};
    use galley::ship::ship;
    use std::sync::Arc;

    struct FixedFont;

    impl FontMetrics for FixedFont {
        fn name(&self) -> &str {
            "fixed10"
        }
        fn at_size(&self) -> Scaled {
            Scaled(655_360)
        }
        fn design_size(&self) -> Scaled {
            Scaled(655_360)
        }
        fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics> {
            (codepoint < 128).then_some(GlyphMetrics {
                advance: Scaled(327_680),
                height: Scaled(400_000),
                depth: Scaled::ZERO,
                italic_correction: Scaled::ZERO,
                is_extensible: false,
            })
        }
        fn kern(&self, _: u32, _: u32) -> Scaled {
            Scaled::ZERO
        }
        fn ligature(&self, _: u32, _: u32) -> Option<u32> {
            None
        }
        fn math_param(&self, _: MathParam) -> Scaled {
            Scaled::ZERO
        }
        fn ext_param(&self, _: ExtParam) -> Scaled {
            Scaled::ZERO
        }
        fn sized_delimiter(&self, _: u32, _: Scaled) -> Option<SizedDelimiter> {
            None
        }
    }

    fn table() -> FontTable {
        let mut t = FontTable::new();
        t.add(Arc::new(FixedFont));
        t
    }

    fn ch(c: char, font: FontId) -> HNode {
        HNode::Char(CharNode {
            codepoint: c as u32,
            font,
            width: Scaled(327_680),
            height: Scaled(400_000),
            depth: Scaled::ZERO,
            italic: Scaled::ZERO,
        })
    }

    fn chars(page: &Page) -> Vec<&ShippedChar> {
        page.events
            .iter()
            .filter_map(|e| match e {
                Shipped::Char(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn emitted_page_reads_back_with_the_same_positions() {
        let fonts = table();
        let font = FontId(0);
        let line = hpack(
            vec![
                ch('a', font),
                HNode::Kern(Kern {
                    width: Scaled(50_000),
                    explicit: true,
                }),
                ch('b', font),
            ],
            Target::Natural,
        )
        .content;
        let page = vpack(vec![VNode::HBox(line)], Target::Natural, VOrient::VBox).content;
        let placed = ship(&page);

        let bytes = emit_document(&[&placed], &fonts, "test page");
        let pages = read_pages(&bytes, &fonts).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);

        let cs = chars(&pages[0]);
        assert_eq!(cs.len(), 2);
        assert_eq!((cs[0].codepoint, cs[0].x, cs[0].y), ('a' as u32, Scaled(0), Scaled(0)));
        assert_eq!(
            (cs[1].codepoint, cs[1].x, cs[1].y),
            ('b' as u32, Scaled(377_680), Scaled(0))
        );
    }

    #[test]
    fn rules_read_back_at_their_bottom_left_corner() {
        let fonts = table();
        let line = hpack(
            vec![HNode::Rule(Rule {
                width: Some(Scaled(100_000)),
                height: Some(Scaled(26_214)),
                depth: Some(Scaled::ZERO),
            })],
            Target::Natural,
        )
        .content;
        let page = vpack(vec![VNode::HBox(line)], Target::Natural, VOrient::VBox).content;
        let placed = ship(&page);

        let bytes = emit_document(&[&placed], &fonts, "");
        let pages = read_pages(&bytes, &fonts).unwrap();
        let rules: Vec<_> = pages[0]
            .events
            .iter()
            .filter_map(|e| match e {
                Shipped::Rule(r) => Some(*r),
                _ => None,
            })
            .collect();
        assert_eq!(
            rules,
            vec![ShippedRule {
                x: Scaled(0),
                y: Scaled(0),
                width: Scaled(100_000),
                height: Scaled(26_214),
            }]
        );
    }

    #[test]
    fn the_file_is_padded_to_a_multiple_of_four() {
        let fonts = table();
        let page = vpack(vec![], Target::Natural, VOrient::VBox).content;
        let placed = ship(&page);
        for comment in ["", "x", "xy", "xyz"] {
            let bytes = emit_document(&[&placed], &fonts, comment);
            assert_eq!(bytes.len() % 4, 0);
            let trailer = bytes.iter().rev().take_while(|&&b| b == 223).count();
            assert!(trailer >= 4, "only {trailer} trailing 223 bytes");
        }
    }

    #[test]
    fn each_font_is_defined_once_before_first_use() {
        let fonts = table();
        let font = FontId(0);
        let line = hpack(vec![ch('a', font), ch('b', font)], Target::Natural).content;
        let page = vpack(vec![VNode::HBox(line)], Target::Natural, VOrient::VBox).content;
        let placed = ship(&page);

        let bytes = emit_document(&[&placed], &fonts, "");
        let mut result = Ok(());
        let ops: Vec<Op> = Deserializer::new(&bytes, &mut result).collect();
        assert_eq!(result, Ok(()));

        let post_at = ops
            .iter()
            .position(|op| matches!(op, Op::BeginPostamble { .. }))
            .unwrap();
        let defs_in_pages = ops[..post_at]
            .iter()
            .filter(|op| matches!(op, Op::DefineFont { .. }))
            .count();
        let defs_in_postamble = ops[post_at..]
            .iter()
            .filter(|op| matches!(op, Op::DefineFont { .. }))
            .count();
        assert_eq!(defs_in_pages, 1);
        assert_eq!(defs_in_postamble, 1);

        let def_at = ops
            .iter()
            .position(|op| matches!(op, Op::DefineFont { .. }))
            .unwrap();
        let first_char = ops
            .iter()
            .position(|op| matches!(op, Op::Char { .. }))
            .unwrap();
        assert!(def_at < first_char);
    }

    #[test]
    fn bop_back_pointers_chain_the_pages() {
        let fonts = table();
        let page = vpack(vec![], Target::Natural, VOrient::VBox).content;
        let placed = ship(&page);
        let bytes = emit_document(&[&placed, &placed, &placed], &fonts, "");

        let mut result = Ok(());
        let pointers: Vec<i32> = Deserializer::new(&bytes, &mut result)
            .filter_map(|op| match op {
                Op::BeginPage { previous, .. } => Some(previous),
                _ => None,
            })
            .collect();
        assert_eq!(result, Ok(()));
        assert_eq!(pointers.len(), 3);
        assert_eq!(pointers[0], -1);
        // Each later pointer is the offset of the previous bop, which
        // follows the preamble or the previous (empty) page.
        assert!(pointers[1] > 0 && pointers[2] > pointers[1]);

        // And the postamble points at the final bop.
        let final_page = Deserializer::new(&bytes, &mut result)
            .find_map(|op| match op {
                Op::BeginPostamble { final_page, .. } => Some(final_page),
                _ => None,
            })
            .unwrap();
        assert_eq!(final_page, pointers[2]);

        let pages = read_pages(&bytes, &fonts).unwrap();
        assert_eq!(
            pages.iter().map(|p| p.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn a_character_before_any_font_is_malformed() {
        let fonts = table();
        let mut bytes = Vec::new();
        Op::BeginPage {
            parameters: [0; 10],
            previous: -1,
        }
        .serialize(&mut bytes);
        Op::Char {
            code: 65,
            advance: true,
        }
        .serialize(&mut bytes);
        Op::EndPage.serialize(&mut bytes);
        assert_eq!(
            read_pages(&bytes, &fonts),
            Err(ReadError::Malformed("character set before any font"))
        );
    }

    #[test]
    fn pop_on_an_empty_stack_is_malformed() {
        let fonts = table();
        let mut bytes = Vec::new();
        Op::BeginPage {
            parameters: [0; 10],
            previous: -1,
        }
        .serialize(&mut bytes);
        Op::Pop.serialize(&mut bytes);
        assert_eq!(
            read_pages(&bytes, &fonts),
            Err(ReadError::Malformed("pop on an empty stack"))
        );
    }
}
