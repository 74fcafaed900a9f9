//! Writing a complete DVI file from shipped pages.
//!
//! The emitter walks each [`PlacedBox`] tree in reading order, bracketing
//! every box with `push`/`pop` and moving the cursor with relative
//! `right`/`down` commands. Fonts are defined the first time a character
//! from them is set, and all definitions are repeated in the postamble as
//! the format requires.

use fonts::{FontId, FontTable};
use galley::ship::{Placed, PlacedBox};
use units::Scaled;

use crate::Op;

/// TeX's unit fraction: 25400000/473628672 units of 10^-7 m per DVI unit,
/// which makes one DVI unit one sp. TeX.2021.587.
pub const UNIT_NUMERATOR: u32 = 25_400_000;
pub const UNIT_DENOMINATOR: u32 = 473_628_672;

/// The DVI format identification byte TeX writes.
pub const FORMAT: u8 = 2;

/// Serializes shipped pages to a complete DVI file.
pub fn emit_document(pages: &[&PlacedBox], fonts: &FontTable, comment: &str) -> Vec<u8> {
    let mut e = Emitter::new(comment);
    for page in pages {
        e.page(page, fonts);
    }
    e.finish(fonts)
}

/// Incremental document writer: preamble at construction, one call per
/// page, postamble on [`Emitter::finish`].
pub struct Emitter {
    bytes: Vec<u8>,
    /// Byte offset of the most recent `bop`, -1 before the first page.
    last_bop: i32,
    pages: u16,
    max_stack_depth: u16,
    tallest: Scaled,
    widest: Scaled,
    /// Fonts in definition order. The DVI font number is the [`FontId`]
    /// index, so the reader can resolve widths against the same table.
    defined: Vec<FontId>,
}

impl Emitter {
    pub fn new(comment: &str) -> Emitter {
        let mut bytes = Vec::new();
        Op::Preamble {
            format: FORMAT,
            numerator: UNIT_NUMERATOR,
            denominator: UNIT_DENOMINATOR,
            magnification: 1000,
            comment: comment.into(),
        }
        .serialize(&mut bytes);
        Emitter {
            bytes,
            last_bop: -1,
            pages: 0,
            max_stack_depth: 0,
            tallest: Scaled::ZERO,
            widest: Scaled::ZERO,
            defined: Vec::new(),
        }
    }

    pub fn page(&mut self, page: &PlacedBox, fonts: &FontTable) {
        let bop = self.bytes.len() as i32;
        self.pages += 1;
        let mut parameters = [0_i32; 10];
        parameters[0] = self.pages as i32;
        Op::BeginPage {
            parameters,
            previous: self.last_bop,
        }
        .serialize(&mut self.bytes);
        self.last_bop = bop;
        self.tallest = self.tallest.max(page.height + page.depth);
        self.widest = self.widest.max(page.width);

        let mut cursor = Cursor {
            h: Scaled::ZERO,
            v: Scaled::ZERO,
            font: None,
            depth: 0,
        };
        self.walk(page, &mut cursor, fonts);
        Op::EndPage.serialize(&mut self.bytes);
    }

    fn walk(&mut self, b: &PlacedBox, cursor: &mut Cursor, fonts: &FontTable) {
        for child in &b.children {
            match child {
                Placed::Char(c) => {
                    self.move_to(cursor, c.x, c.y);
                    self.select_font(cursor, c.font, fonts);
                    Op::Char {
                        code: c.codepoint,
                        advance: true,
                    }
                    .serialize(&mut self.bytes);
                    cursor.h += c.width;
                }
                Placed::Rule(r) => {
                    self.move_to(cursor, r.x, r.y);
                    Op::Rule {
                        height: r.height.0,
                        width: r.width.0,
                        advance: false,
                    }
                    .serialize(&mut self.bytes);
                }
                Placed::Box(inner) => {
                    Op::Push.serialize(&mut self.bytes);
                    cursor.depth += 1;
                    self.max_stack_depth = self.max_stack_depth.max(cursor.depth);
                    let (h, v) = (cursor.h, cursor.v);
                    self.walk(inner, cursor, fonts);
                    Op::Pop.serialize(&mut self.bytes);
                    cursor.depth -= 1;
                    // pop restores the position but not the font.
                    cursor.h = h;
                    cursor.v = v;
                }
            }
        }
    }

    fn move_to(&mut self, cursor: &mut Cursor, x: Scaled, y: Scaled) {
        if x != cursor.h {
            Op::Right((x - cursor.h).0).serialize(&mut self.bytes);
            cursor.h = x;
        }
        if y != cursor.v {
            Op::Down((y - cursor.v).0).serialize(&mut self.bytes);
            cursor.v = y;
        }
    }

    fn select_font(&mut self, cursor: &mut Cursor, font: FontId, fonts: &FontTable) {
        if cursor.font == Some(font) {
            return;
        }
        if !self.defined.contains(&font) {
            self.define_font(font, fonts);
            self.defined.push(font);
        }
        Op::Font(font.0).serialize(&mut self.bytes);
        cursor.font = Some(font);
    }

    fn define_font(&mut self, font: FontId, fonts: &FontTable) {
        let metrics = fonts.get(font);
        Op::DefineFont {
            number: font.0,
            checksum: metrics.checksum(),
            at_size: metrics.at_size().0 as u32,
            design_size: metrics.design_size().0 as u32,
            area: String::new(),
            name: metrics.name().into(),
        }
        .serialize(&mut self.bytes);
    }

    /// Writes the postamble and returns the finished file. The trailer
    /// pads with at least four 223 bytes to a multiple of four.
    pub fn finish(mut self, fonts: &FontTable) -> Vec<u8> {
        let postamble = self.bytes.len() as i32;
        Op::BeginPostamble {
            final_page: self.last_bop,
            numerator: UNIT_NUMERATOR,
            denominator: UNIT_DENOMINATOR,
            magnification: 1000,
            tallest: self.tallest.0 as u32,
            widest: self.widest.0 as u32,
            max_stack_depth: self.max_stack_depth,
            pages: self.pages,
        }
        .serialize(&mut self.bytes);
        for font in std::mem::take(&mut self.defined) {
            self.define_font(font, fonts);
        }
        // post_post before padding: op, pointer, format byte.
        let unpadded = self.bytes.len() + 1 + 4 + 1;
        let trailer_223s = 4 + (4 - unpadded % 4) % 4;
        Op::EndPostamble {
            postamble,
            format: FORMAT,
            trailer_223s,
        }
        .serialize(&mut self.bytes);
        self.bytes
    }
}

struct Cursor {
    h: Scaled,
    v: Scaled,
    font: Option<FontId>,
    depth: u16,
}
