//! The DVI ("device independent") output format.
//!
//! A DVI file is a flat stream of byte-coded commands: a preamble, one or
//! more pages bracketed by `bop`/`eop`, and a postamble that repeats the
//! font definitions (TeX.2021.583-591). [`Op`] models one command;
//! [`Deserializer`] iterates the commands in raw bytes and [`serialize`]
//! is its inverse.
//!
//! Two higher layers sit on the command stream. [`emit`] walks a shipped
//! page tree and writes a complete file, defining each font on first use.
//! [`read`] drives a cursor over a file and recovers the logical list of
//! positioned characters and rules, which is the ground truth the
//! comparison tests work against.

mod decode;
mod encode;
pub mod emit;
pub mod read;

/// A spacing variable in DVI data.
///
/// `w` and `x` hold horizontal amounts, `y` and `z` vertical ones. A
/// [`Op::SetVar`] stores a distance and moves by it; a following
/// [`Op::Move`] repeats the motion in one byte. TeX.2021.584.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Var {
    W = 0,
    X = 1,
    Y = 2,
    Z = 3,
}

/// One DVI command.
///
/// Variants bundle the size-variant op codes: `set_char_0..127`,
/// `set1..4` and `put1..4` all map to [`Op::Char`], and so on. The
/// payloads follow TeX.2021.585.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Typeset a character with its reference point at (h, v).
    /// `advance` distinguishes `set` (h moves by the character's width)
    /// from `put` (h stays).
    Char { code: u32, advance: bool },
    /// Typeset a rectangle with its bottom-left corner at (h, v),
    /// painting up and to the right. Nothing is painted unless both
    /// dimensions are positive. `advance` distinguishes `set_rule` from
    /// `put_rule`.
    Rule {
        height: i32,
        width: i32,
        advance: bool,
    },
    /// `nop`: do nothing.
    NoOp,
    /// `bop`: start a page. Resets (h, v, w, x, y, z) to zero, empties
    /// the stack and leaves the current font undefined.
    BeginPage {
        /// `\count0`-`\count9` at ship-out time.
        parameters: [i32; 10],
        /// Byte offset of the previous `bop`, -1 for the first page.
        previous: i32,
    },
    /// `eop`: end the page; the stack must be empty again.
    EndPage,
    /// Push (h, v, w, x, y, z) onto the position stack. The font is not
    /// part of the stack.
    Push,
    /// Pop the position stack.
    Pop,
    /// Move h by the payload (negative moves left): `right1..4`.
    Right(i32),
    /// Move by the current value of a variable: `w0`, `x0`, `y0`, `z0`.
    Move(Var),
    /// Set a variable and move by its new value: `w1..4` and friends.
    SetVar(Var, i32),
    /// Move v by the payload (negative moves up): `down1..4`.
    Down(i32),
    /// Select a font defined earlier: `fnt_num_0..63`, `fnt1..4`.
    Font(u32),
    /// `xxx1..4`: an uninterpreted extension blob.
    Extension(Vec<u8>),
    /// `fnt_def1..4`. Each font is defined once among the pages (before
    /// its first use) and once again in the postamble.
    DefineFont {
        number: u32,
        /// Checksum of the metrics file, echoed so drivers can detect a
        /// mismatched font.
        checksum: u32,
        /// Scale factor in DVI units (sp); widths in the font scale by
        /// this.
        at_size: u32,
        /// Design size in DVI units.
        design_size: u32,
        /// Font directory; empty selects the system default.
        area: String,
        name: String,
    },
    /// `pre`: identifies the format and the units. TeX writes numerator
    /// 25400000 and denominator 473628672, making one DVI unit one sp.
    Preamble {
        format: u8,
        numerator: u32,
        denominator: u32,
        /// 1000 times the magnification.
        magnification: u32,
        comment: String,
    },
    /// `post`: starts the postamble summary.
    BeginPostamble {
        /// Byte offset of the final `bop`.
        final_page: i32,
        numerator: u32,
        denominator: u32,
        magnification: u32,
        /// Height-plus-depth of the tallest page.
        tallest: u32,
        widest: u32,
        max_stack_depth: u16,
        pages: u16,
    },
    /// `post_post`: the postamble pointer, the format byte again, and at
    /// least four 223 bytes padding the file to a multiple of four.
    EndPostamble {
        postamble: i32,
        format: u8,
        trailer_223s: usize,
    },
}

impl Op {
    /// Reads the next command off the front of `b`, returning it with the
    /// unconsumed tail. `Ok(None)` means the slice is exhausted.
    pub fn deserialize(b: &[u8]) -> Result<Option<(Self, &[u8])>, DviError> {
        decode::decode(b)
    }

    /// Appends this command's bytes to `b`, choosing the shortest op-code
    /// variant that holds the payload.
    pub fn serialize(&self, b: &mut Vec<u8>) {
        encode::encode(self, b)
    }
}

/// Error for malformed DVI bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DviError {
    /// An op code that is not defined by the format.
    InvalidOpCode(u8),
    /// The data ended inside the payload of the given op code.
    Truncated(u8),
}

impl std::fmt::Display for DviError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DviError::InvalidOpCode(op) => write!(f, "invalid DVI op code {op}"),
            DviError::Truncated(op) => {
                write!(f, "DVI data ended inside the payload of op code {op}")
            }
        }
    }
}

impl std::error::Error for DviError {}

/// Iterator over the commands in raw DVI bytes.
///
/// Errors surface through the side-channel result so the iterator
/// composes; commands before the error are still yielded.
pub struct Deserializer<'a> {
    b: &'a [u8],
    result: &'a mut Result<(), DviError>,
}

impl<'a> Deserializer<'a> {
    pub fn new(b: &'a [u8], result: &'a mut Result<(), DviError>) -> Self {
        Self { b, result }
    }
}

impl Iterator for Deserializer<'_> {
    type Item = Op;

    fn next(&mut self) -> Option<Self::Item> {
        match Op::deserialize(self.b) {
            Ok(None) => None,
            Ok(Some((op, b))) => {
                self.b = b;
                Some(op)
            }
            Err(err) => {
                *self.result = Err(err);
                None
            }
        }
    }
}

/// Serializes a sequence of commands to bytes.
pub fn serialize<I: IntoIterator<Item = Op>>(i: I) -> Vec<u8> {
    let mut v = vec![];
    for op in i {
        op.serialize(&mut v);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_serialize_test(want: Vec<u8>, op: Op) {
        let mut got = vec![];
        op.serialize(&mut got);
        assert_eq!(got, want);
    }

    fn run_deserialize_test(b: Vec<u8>, want: Op) {
        let mut result = Ok(());
        let got: Vec<Op> = Deserializer::new(&b, &mut result).collect();
        assert_eq!(Ok(()), result);
        assert_eq!(got, vec![want]);
    }

    macro_rules! serde_tests {
        ( $( ($name: ident, [ $($elem: expr),+], $op: expr ), )+  ) => {
            $(
            mod $name {
                use super::*;

                #[test]
                fn test_serialize() {
                    let b = vec![ $( $elem, )+ ];
                    run_serialize_test(b, $op);
                }

                #[test]
                fn test_deserialize() {
                    let b = vec![ $( $elem, )+ ];
                    run_deserialize_test(b, $op);
                }
            }
            )+
        };
    }

    serde_tests!(
        (
            set_char_direct,
            [65],
            Op::Char {
                code: 65,
                advance: true
            }
        ),
        (
            set1,
            [128, 200],
            Op::Char {
                code: 200,
                advance: true
            }
        ),
        (
            set2,
            [129, 1, 2],
            Op::Char {
                code: 258,
                advance: true
            }
        ),
        (
            set3,
            [130, 1, 2, 3],
            Op::Char {
                code: 256 * 256 + 2 * 256 + 3,
                advance: true
            }
        ),
        (
            set4,
            [131, 255, 255, 255, 255],
            Op::Char {
                code: u32::MAX,
                advance: true
            }
        ),
        (
            put1,
            [133, 7],
            Op::Char {
                code: 7,
                advance: false
            }
        ),
        (
            set_rule,
            [132, 0, 0, 0, 1, 0, 0, 0, 2],
            Op::Rule {
                height: 1,
                width: 2,
                advance: true
            }
        ),
        (
            put_rule,
            [137, 0, 0, 0, 1, 0, 0, 0, 2],
            Op::Rule {
                height: 1,
                width: 2,
                advance: false
            }
        ),
        (nop, [138], Op::NoOp),
        (
            bop,
            [
                139, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0,
                0, 7, 0, 0, 0, 8, 0, 0, 0, 9, 255, 255, 255, 255, 0, 0, 0, 1
            ],
            Op::BeginPage {
                parameters: [1, 2, 3, 4, 5, 6, 7, 8, 9, -1],
                previous: 1
            }
        ),
        (eop, [140], Op::EndPage),
        (push, [141], Op::Push),
        (pop, [142], Op::Pop),
        (right1, [143, 2], Op::Right(2)),
        (right1_negative, [143, 255], Op::Right(-1)),
        (right2, [144, 1, 2], Op::Right(256 + 2)),
        (right2_most_negative, [144, 128, 0], Op::Right(-(1 << 15))),
        (right3, [145, 1, 0, 2], Op::Right(256 * 256 + 2)),
        (
            right3_negative,
            [145, 255, 127, 255],
            Op::Right(-(1 << 15) - 1)
        ),
        (right4, [146, 1, 0, 0, 2], Op::Right(256 * 256 * 256 + 2)),
        (right4_most_negative, [146, 128, 0, 0, 0], Op::Right(i32::MIN)),
        (w0, [147], Op::Move(Var::W)),
        (w1, [148, 2], Op::SetVar(Var::W, 2)),
        (x0, [152], Op::Move(Var::X)),
        (x2, [154, 1, 2], Op::SetVar(Var::X, 256 + 2)),
        (down1, [157, 5], Op::Down(5)),
        (down2, [158, 0, 128], Op::Down(1 << 7)),
        (down3, [159, 127, 255, 255], Op::Down((1 << 23) - 1)),
        (down3_most_negative, [159, 128, 0, 0], Op::Down(-(1 << 23))),
        (down4, [160, 0, 128, 0, 0], Op::Down(1 << 23)),
        (y0, [161], Op::Move(Var::Y)),
        (z1, [167, 2], Op::SetVar(Var::Z, 2)),
        (fnt_num_0, [171], Op::Font(0)),
        (fnt_num_63, [234], Op::Font(63)),
        (fnt1, [235, 64], Op::Font(64)),
        (fnt2, [236, 1, 0], Op::Font(256)),
        (
            xxx1,
            [239, 5, 0, 1, 2, 3, 4],
            Op::Extension(vec![0, 1, 2, 3, 4])
        ),
        (
            fnt_def1,
            [243, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 5, 99, 109, 114, 49, 48],
            Op::DefineFont {
                number: 1,
                checksum: 2,
                at_size: 3,
                design_size: 4,
                area: "".to_string(),
                name: "cmr10".to_string(),
            }
        ),
        (
            fnt_def2,
            [244, 1, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 5, 0, 99, 109, 114, 49, 48],
            Op::DefineFont {
                number: 256 + 1,
                checksum: 2,
                at_size: 3,
                design_size: 4,
                area: "cmr10".to_string(),
                name: "".to_string(),
            }
        ),
        (
            pre,
            [247, 2, 0, 0, 0, 3, 0, 0, 0, 5, 0, 0, 3, 232, 3, 65, 66, 67],
            Op::Preamble {
                format: 2,
                numerator: 3,
                denominator: 5,
                magnification: 1000,
                comment: "ABC".to_string(),
            }
        ),
        (
            post,
            [
                248, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, 0, 7,
                0, 8
            ],
            Op::BeginPostamble {
                final_page: 1,
                numerator: 2,
                denominator: 3,
                magnification: 4,
                tallest: 5,
                widest: 6,
                max_stack_depth: 7,
                pages: 8,
            }
        ),
        (
            post_post,
            [249, 0, 0, 0, 2, 2, 223, 223, 223, 223],
            Op::EndPostamble {
                postamble: 2,
                format: 2,
                trailer_223s: 4
            }
        ),
    );

    #[test]
    fn truncated_payload_is_an_error() {
        assert_eq!(Op::deserialize(&[129, 1]), Err(DviError::Truncated(129)));
    }

    #[test]
    fn undefined_op_code_is_an_error() {
        assert_eq!(Op::deserialize(&[254]), Err(DviError::InvalidOpCode(254)));
    }

    #[test]
    fn exhausted_slice_is_none() {
        assert_eq!(Op::deserialize(&[]), Ok(None));
    }

    #[test]
    fn deserializer_stops_at_the_error() {
        let bytes = vec![157, 5, 255];
        let mut result = Ok(());
        let ops: Vec<Op> = Deserializer::new(&bytes, &mut result).collect();
        assert_eq!(ops, vec![Op::Down(5)]);
        assert_eq!(result, Err(DviError::InvalidOpCode(255)));
    }
}
