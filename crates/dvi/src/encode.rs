//! Command-to-bytes encoding.
//!
//! Multi-byte payloads are big-endian. Ops with size variants get the
//! shortest variant that holds the payload, matching what TeX itself
//! writes (TeX.2021.598-600).

use crate::{Op, Var};

pub fn encode(op: &Op, b: &mut Vec<u8>) {
    let mut w = Writer(b);
    match op {
        Op::Char { code, advance } => {
            if *advance && *code < 128 {
                w.u8(*code as u8);
            } else {
                let base = if *advance { 128 } else { 133 };
                w.op_u32(base, *code);
            }
        }
        Op::Rule {
            height,
            width,
            advance,
        } => {
            w.u8(if *advance { 132 } else { 137 });
            w.i32(*height);
            w.i32(*width);
        }
        Op::NoOp => w.u8(138),
        Op::BeginPage {
            parameters,
            previous,
        } => {
            w.u8(139);
            for p in parameters {
                w.i32(*p);
            }
            w.i32(*previous);
        }
        Op::EndPage => w.u8(140),
        Op::Push => w.u8(141),
        Op::Pop => w.u8(142),
        Op::Right(d) => w.op_i32(143, *d),
        Op::Move(var) => w.u8(match var {
            Var::W => 147,
            Var::X => 152,
            Var::Y => 161,
            Var::Z => 166,
        }),
        Op::SetVar(var, d) => {
            let base = match var {
                Var::W => 148,
                Var::X => 153,
                Var::Y => 162,
                Var::Z => 167,
            };
            w.op_i32(base, *d);
        }
        Op::Down(d) => w.op_i32(157, *d),
        Op::Font(f) => {
            if *f < 64 {
                w.u8(171 + *f as u8);
            } else {
                w.op_u32(235, *f);
            }
        }
        Op::Extension(data) => {
            w.op_u32(239, data.len() as u32);
            w.0.extend_from_slice(data);
        }
        Op::DefineFont {
            number,
            checksum,
            at_size,
            design_size,
            area,
            name,
        } => {
            w.op_u32(243, *number);
            w.u32(*checksum);
            w.u32(*at_size);
            w.u32(*design_size);
            w.u8(area.len() as u8);
            w.u8(name.len() as u8);
            w.0.extend_from_slice(area.as_bytes());
            w.0.extend_from_slice(name.as_bytes());
        }
        Op::Preamble {
            format,
            numerator,
            denominator,
            magnification,
            comment,
        } => {
            w.u8(247);
            w.u8(*format);
            w.u32(*numerator);
            w.u32(*denominator);
            w.u32(*magnification);
            w.u8(comment.len() as u8);
            w.0.extend_from_slice(comment.as_bytes());
        }
        Op::BeginPostamble {
            final_page,
            numerator,
            denominator,
            magnification,
            tallest,
            widest,
            max_stack_depth,
            pages,
        } => {
            w.u8(248);
            w.i32(*final_page);
            w.u32(*numerator);
            w.u32(*denominator);
            w.u32(*magnification);
            w.u32(*tallest);
            w.u32(*widest);
            w.u16(*max_stack_depth);
            w.u16(*pages);
        }
        Op::EndPostamble {
            postamble,
            format,
            trailer_223s,
        } => {
            w.u8(249);
            w.i32(*postamble);
            w.u8(*format);
            for _ in 0..*trailer_223s {
                w.u8(223);
            }
        }
    }
}

struct Writer<'a>(&'a mut Vec<u8>);

impl Writer<'_> {
    fn u8(&mut self, v: u8) {
        self.0.push(v);
    }
    fn u16(&mut self, v: u16) {
        self.0.extend_from_slice(&v.to_be_bytes());
    }
    fn u32(&mut self, v: u32) {
        self.0.extend_from_slice(&v.to_be_bytes());
    }
    fn i32(&mut self, v: i32) {
        self.0.extend_from_slice(&v.to_be_bytes());
    }
    /// Writes `base + (n-1)` followed by the n-byte unsigned payload.
    fn op_u32(&mut self, base: u8, v: u32) {
        let n: usize = match v {
            0..=0xff => 1,
            0x100..=0xffff => 2,
            0x1_0000..=0xff_ffff => 3,
            _ => 4,
        };
        self.0.push(base + (n as u8) - 1);
        self.0.extend_from_slice(&v.to_be_bytes()[4 - n..]);
    }
    /// Writes `base + (n-1)` followed by the n-byte two's-complement
    /// payload.
    fn op_i32(&mut self, base: u8, v: i32) {
        let n: usize = if (-(1 << 7)..1 << 7).contains(&v) {
            1
        } else if (-(1 << 15)..1 << 15).contains(&v) {
            2
        } else if (-(1 << 23)..1 << 23).contains(&v) {
            3
        } else {
            4
        };
        self.0.push(base + (n as u8) - 1);
        self.0.extend_from_slice(&v.to_be_bytes()[4 - n..]);
    }
}
