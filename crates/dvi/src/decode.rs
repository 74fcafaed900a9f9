//! Bytes-to-command decoding.

use crate::{DviError, Op, Var};

pub fn decode(b: &[u8]) -> Result<Option<(Op, &[u8])>, DviError> {
    let Some((&code, rest)) = b.split_first() else {
        return Ok(None);
    };
    let mut r = Reader { b: rest, code };
    let op = match code {
        0..=127 => Op::Char {
            code: code as u32,
            advance: true,
        },
        128..=131 => Op::Char {
            code: r.unsigned(code as usize - 127)?,
            advance: true,
        },
        132 => Op::Rule {
            height: r.i32()?,
            width: r.i32()?,
            advance: true,
        },
        133..=136 => Op::Char {
            code: r.unsigned(code as usize - 132)?,
            advance: false,
        },
        137 => Op::Rule {
            height: r.i32()?,
            width: r.i32()?,
            advance: false,
        },
        138 => Op::NoOp,
        139 => {
            let mut parameters = [0_i32; 10];
            for p in &mut parameters {
                *p = r.i32()?;
            }
            Op::BeginPage {
                parameters,
                previous: r.i32()?,
            }
        }
        140 => Op::EndPage,
        141 => Op::Push,
        142 => Op::Pop,
        143..=146 => Op::Right(r.signed(code as usize - 142)?),
        147 => Op::Move(Var::W),
        148..=151 => Op::SetVar(Var::W, r.signed(code as usize - 147)?),
        152 => Op::Move(Var::X),
        153..=156 => Op::SetVar(Var::X, r.signed(code as usize - 152)?),
        157..=160 => Op::Down(r.signed(code as usize - 156)?),
        161 => Op::Move(Var::Y),
        162..=165 => Op::SetVar(Var::Y, r.signed(code as usize - 161)?),
        166 => Op::Move(Var::Z),
        167..=170 => Op::SetVar(Var::Z, r.signed(code as usize - 166)?),
        171..=234 => Op::Font(code as u32 - 171),
        235..=238 => Op::Font(r.unsigned(code as usize - 234)?),
        239..=242 => {
            let len = r.unsigned(code as usize - 238)? as usize;
            Op::Extension(r.take(len)?.to_vec())
        }
        243..=246 => {
            let number = r.unsigned(code as usize - 242)?;
            let checksum = r.u32()?;
            let at_size = r.u32()?;
            let design_size = r.u32()?;
            let area_len = r.unsigned(1)? as usize;
            let name_len = r.unsigned(1)? as usize;
            let area = String::from_utf8_lossy(r.take(area_len)?).into_owned();
            let name = String::from_utf8_lossy(r.take(name_len)?).into_owned();
            Op::DefineFont {
                number,
                checksum,
                at_size,
                design_size,
                area,
                name,
            }
        }
        247 => {
            let format = r.unsigned(1)? as u8;
            let numerator = r.u32()?;
            let denominator = r.u32()?;
            let magnification = r.u32()?;
            let comment_len = r.unsigned(1)? as usize;
            let comment = String::from_utf8_lossy(r.take(comment_len)?).into_owned();
            Op::Preamble {
                format,
                numerator,
                denominator,
                magnification,
                comment,
            }
        }
        248 => Op::BeginPostamble {
            final_page: r.i32()?,
            numerator: r.u32()?,
            denominator: r.u32()?,
            magnification: r.u32()?,
            tallest: r.u32()?,
            widest: r.u32()?,
            max_stack_depth: r.u16()?,
            pages: r.u16()?,
        },
        249 => {
            let postamble = r.i32()?;
            let format = r.unsigned(1)? as u8;
            let mut trailer_223s = 0;
            while let Some((&223, rest)) = r.b.split_first() {
                trailer_223s += 1;
                r.b = rest;
            }
            Op::EndPostamble {
                postamble,
                format,
                trailer_223s,
            }
        }
        250..=255 => return Err(DviError::InvalidOpCode(code)),
    };
    Ok(Some((op, r.b)))
}

struct Reader<'a> {
    b: &'a [u8],
    code: u8,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], DviError> {
        let (head, tail) = self
            .b
            .split_at_checked(len)
            .ok_or(DviError::Truncated(self.code))?;
        self.b = tail;
        Ok(head)
    }
    /// Big-endian unsigned value of `n` bytes, 1 <= n <= 4.
    fn unsigned(&mut self, n: usize) -> Result<u32, DviError> {
        let mut v: u32 = 0;
        for &byte in self.take(n)? {
            v = (v << 8) | byte as u32;
        }
        Ok(v)
    }
    /// Big-endian two's-complement value of `n` bytes, 1 <= n <= 4.
    fn signed(&mut self, n: usize) -> Result<i32, DviError> {
        let bytes = self.take(n)?;
        let mut v: i32 = bytes[0] as i8 as i32;
        for &byte in &bytes[1..] {
            v = (v << 8) | byte as i32;
        }
        Ok(v)
    }
    fn u16(&mut self) -> Result<u16, DviError> {
        Ok(self.unsigned(2)? as u16)
    }
    fn u32(&mut self) -> Result<u32, DviError> {
        self.unsigned(4)
    }
    fn i32(&mut self) -> Result<i32, DviError> {
        self.signed(4)
    }
}
