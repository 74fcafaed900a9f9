//! TeX font metric (.tfm) files.
//!
//! The file layout is the one fixed by TFtoPL: a 24-byte section table of
//! twelve big-endian u16s, then the header, char-info, width/height/depth/
//! italic, lig/kern, kern, extensible, and parameter arrays. Dimensions are
//! stored as fix_words (signed, 20 fraction bits) in multiples of the design
//! size; we resolve them to sp at load time, at the requested size.

use crate::{
    ExtParam, ExtensibleRecipe, FontError, FontMetrics, GlyphMetrics, MathParam, SizedDelimiter,
};
use units::Scaled;

/// How a char-info entry's remainder byte is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharTag {
    None,
    /// Remainder indexes the lig/kern program.
    LigKern(u8),
    /// Remainder is the next larger character in a chain.
    List(u8),
    /// Remainder indexes the extensible recipe table.
    Ext(u8),
}

#[derive(Debug, Clone, Copy)]
struct CharEntry {
    metrics: GlyphMetrics,
    tag: CharTag,
}

/// A loaded TFM font with all dimensions resolved to sp.
pub struct TfmFont {
    name: String,
    at_size: Scaled,
    design_size: Scaled,
    checksum: u32,
    first_char: u32,
    chars: Vec<Option<CharEntry>>,
    lig_kern: Vec<[u8; 4]>,
    kerns: Vec<Scaled>,
    exten: Vec<[u8; 4]>,
    /// fontdimen 1..=np, scaled; index 0 unused.
    params: Vec<Scaled>,
}

impl TfmFont {
    pub fn from_path(
        path: &std::path::Path,
        at: Option<Scaled>,
    ) -> Result<TfmFont, FontError> {
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        TfmFont::from_bytes(&name, &data, at)
    }

    /// Parses TFM bytes. `at` overrides the design size ("at 12pt"); when
    /// absent the font loads at its design size.
    pub fn from_bytes(name: &str, data: &[u8], at: Option<Scaled>) -> Result<TfmFont, FontError> {
        let mut r = Reader { data, pos: 0 };
        let lf = r.u16()? as usize;
        let lh = r.u16()? as usize;
        let bc = r.u16()? as u32;
        let ec = r.u16()? as u32;
        let nw = r.u16()? as usize;
        let nh = r.u16()? as usize;
        let nd = r.u16()? as usize;
        let ni = r.u16()? as usize;
        let nl = r.u16()? as usize;
        let nk = r.u16()? as usize;
        let ne = r.u16()? as usize;
        let np = r.u16()? as usize;

        let n_chars = if ec < bc { 0 } else { (ec - bc + 1) as usize };
        let expected = 6 + lh + n_chars + nw + nh + nd + ni + nl + nk + ne + np;
        if lf != expected || data.len() < lf * 4 {
            return Err(FontError::Malformed(format!(
                "section table is inconsistent (lf={lf}, expected {expected})"
            )));
        }
        if lh < 2 {
            return Err(FontError::Malformed("header shorter than 2 words".into()));
        }

        let checksum = r.u32()?;
        let design_fix = r.i32()?;
        if design_fix <= 0 {
            return Err(FontError::Malformed("non-positive design size".into()));
        }
        // fix_word in pt to sp: 20 fraction bits down to 16.
        let design_size = Scaled((design_fix >> 4).max(1));
        for _ in 2..lh {
            r.u32()?;
        }
        let at_size = at.unwrap_or(design_size);

        let char_info: Vec<[u8; 4]> = (0..n_chars)
            .map(|_| r.quad())
            .collect::<Result<_, _>>()?;
        let widths = r.fix_words(nw, at_size)?;
        let heights = r.fix_words(nh, at_size)?;
        let depths = r.fix_words(nd, at_size)?;
        let italics = r.fix_words(ni, at_size)?;
        let lig_kern: Vec<[u8; 4]> = (0..nl).map(|_| r.quad()).collect::<Result<_, _>>()?;
        let kerns = r.fix_words(nk, at_size)?;
        let exten: Vec<[u8; 4]> = (0..ne).map(|_| r.quad()).collect::<Result<_, _>>()?;

        let mut params = vec![Scaled::ZERO; np + 1];
        for (i, p) in params.iter_mut().enumerate().skip(1) {
            let fix = r.i32()?;
            // Slant (param 1) is a pure ratio, never multiplied by the size.
            *p = if i == 1 {
                Scaled(((fix as i64) >> 4) as i32)
            } else {
                scale(fix, at_size)
            };
        }

        let lookup = |v: &[Scaled], i: u8, what: &str| -> Result<Scaled, FontError> {
            v.get(i as usize)
                .copied()
                .ok_or_else(|| FontError::Malformed(format!("{what} index {i} out of range")))
        };

        let mut chars = Vec::with_capacity(n_chars);
        for raw in &char_info {
            let [wi, hd, it, rem] = *raw;
            if wi == 0 {
                chars.push(None);
                continue;
            }
            let metrics = GlyphMetrics {
                advance: lookup(&widths, wi, "width")?,
                height: lookup(&heights, hd >> 4, "height")?,
                depth: lookup(&depths, hd & 0xF, "depth")?,
                italic_correction: lookup(&italics, it >> 2, "italic")?,
                is_extensible: it & 0b11 == 3,
            };
            let tag = match it & 0b11 {
                1 => CharTag::LigKern(rem),
                2 => CharTag::List(rem),
                3 => CharTag::Ext(rem),
                _ => CharTag::None,
            };
            chars.push(Some(CharEntry { metrics, tag }));
        }

        Ok(TfmFont {
            name: name.to_string(),
            at_size,
            design_size,
            checksum,
            first_char: bc,
            chars,
            lig_kern,
            kerns,
            exten,
            params,
        })
    }

    fn entry(&self, codepoint: u32) -> Option<&CharEntry> {
        let idx = codepoint.checked_sub(self.first_char)? as usize;
        self.chars.get(idx)?.as_ref()
    }

    /// Walks the lig/kern program for `left`, looking for `right`.
    fn lig_kern_op(&self, left: u32, right: u32) -> Option<(u8, u8)> {
        let start = match self.entry(left)?.tag {
            CharTag::LigKern(r) => r as usize,
            _ => return None,
        };
        let mut i = start;
        // A first instruction with skip > 128 redirects to a long program.
        if let Some([skip, _, op, rem]) = self.lig_kern.get(i) {
            if *skip > 128 {
                i = 256 * (*op as usize) + *rem as usize;
            }
        }
        let mut steps = 0;
        while let Some([skip, next, op, rem]) = self.lig_kern.get(i) {
            if *skip <= 128 && *next as u32 == right {
                return Some((*op, *rem));
            }
            if *skip >= 128 {
                return None;
            }
            i += 1 + *skip as usize;
            steps += 1;
            if steps > self.lig_kern.len() {
                return None; // malformed program, bail out of the cycle
            }
        }
        None
    }
}

impl FontMetrics for TfmFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn at_size(&self) -> Scaled {
        self.at_size
    }

    fn design_size(&self) -> Scaled {
        self.design_size
    }

    fn checksum(&self) -> u32 {
        self.checksum
    }

    fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics> {
        self.entry(codepoint).map(|e| e.metrics)
    }

    fn kern(&self, left: u32, right: u32) -> Scaled {
        match self.lig_kern_op(left, right) {
            Some((op, rem)) if op >= 128 => {
                let idx = 256 * (op as usize - 128) + rem as usize;
                self.kerns.get(idx).copied().unwrap_or(Scaled::ZERO)
            }
            _ => Scaled::ZERO,
        }
    }

    fn ligature(&self, left: u32, right: u32) -> Option<u32> {
        match self.lig_kern_op(left, right) {
            // Op 0 is the plain LIG substitution; the exotic retaining ops
            // (1..=11) are not used by the fonts we target.
            Some((0, rem)) => Some(rem as u32),
            _ => None,
        }
    }

    fn math_param(&self, param: MathParam) -> Scaled {
        self.params
            .get(param as usize)
            .copied()
            .unwrap_or(Scaled::ZERO)
    }

    fn ext_param(&self, param: ExtParam) -> Scaled {
        self.params
            .get(param as usize)
            .copied()
            .unwrap_or(Scaled::ZERO)
    }

    fn sized_delimiter(&self, codepoint: u32, target: Scaled) -> Option<SizedDelimiter> {
        let mut c = codepoint;
        let mut hops = 0;
        loop {
            let entry = self.entry(c)?;
            let total = entry.metrics.height + entry.metrics.depth;
            match entry.tag {
                _ if total >= target => return Some(SizedDelimiter::Glyph(c)),
                CharTag::List(next) => {
                    c = next as u32;
                    hops += 1;
                    if hops > self.chars.len() {
                        return Some(SizedDelimiter::Glyph(c)); // cycle guard
                    }
                }
                CharTag::Ext(rem) => {
                    let [top, mid, bot, rep] = *self.exten.get(rem as usize)?;
                    let part = |b: u8| if b == 0 { None } else { Some(b as u32) };
                    return Some(SizedDelimiter::Recipe(ExtensibleRecipe {
                        top: part(top),
                        middle: part(mid),
                        bottom: part(bot),
                        repeat: rep as u32,
                    }));
                }
                // End of the chain: the largest variant available.
                _ => return Some(SizedDelimiter::Glyph(c)),
            }
        }
    }
}

/// Multiplies a fix_word (20 fraction bits) by a size in sp.
fn scale(fix: i32, z: Scaled) -> Scaled {
    Scaled((((fix as i64) * (z.0 as i64)) >> 20) as i32)
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], FontError> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(FontError::Malformed("file truncated".into()));
        }
        let s = &self.data[self.pos..end];
        self.pos = end;
        Ok(s)
    }

    fn u16(&mut self) -> Result<u16, FontError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, FontError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, FontError> {
        Ok(self.u32()? as i32)
    }

    fn quad(&mut self) -> Result<[u8; 4], FontError> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn fix_words(&mut self, n: usize, z: Scaled) -> Result<Vec<Scaled>, FontError> {
        (0..n).map(|_| Ok(scale(self.i32()?, z))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One fix_word = value in design-size multiples with 20 fraction bits.
    fn fix(numer: i64, denom: i64) -> i32 {
        ((numer << 20) / denom) as i32
    }

    /// Builds a two-character font ('A', 'B') at design size 10pt with one
    /// kern pair A+B and one A+B ligature disabled (kern takes the slot).
    fn sample_font() -> Vec<u8> {
        let lh = 2usize;
        let bc = 65usize;
        let ec = 66usize;
        let nw = 3usize; // index 0 reserved
        let nh = 2usize;
        let nd = 2usize;
        let ni = 1usize;
        let nl = 1usize;
        let nk = 1usize;
        let ne = 0usize;
        let np = 7usize;
        let lf = 6 + lh + (ec - bc + 1) + nw + nh + nd + ni + nl + nk + ne + np;

        let mut out: Vec<u8> = Vec::new();
        for v in [lf, lh, bc, ec, nw, nh, nd, ni, nl, nk, ne, np] {
            out.extend((v as u16).to_be_bytes());
        }
        out.extend(0xDEADBEEFu32.to_be_bytes()); // checksum
        out.extend(fix(10, 1).to_be_bytes()); // design size 10pt
        // char A: width 1, height 1, depth 0, italic 0, lig/kern tag -> 0
        out.extend([1u8, 0x10, 0b0000_0001, 0]);
        // char B: width 2, height 1, depth 1, no tag
        out.extend([2u8, 0x11, 0, 0]);
        // widths: 0, 0.5, 0.75 of design size
        out.extend(0i32.to_be_bytes());
        out.extend(fix(1, 2).to_be_bytes());
        out.extend(fix(3, 4).to_be_bytes());
        // heights: 0, 0.7
        out.extend(0i32.to_be_bytes());
        out.extend(fix(7, 10).to_be_bytes());
        // depths: 0, 0.2
        out.extend(0i32.to_be_bytes());
        out.extend(fix(1, 5).to_be_bytes());
        // italics: 0
        out.extend(0i32.to_be_bytes());
        // lig/kern: on 'B' apply kern 0 (op 128, rem 0); stop.
        out.extend([128u8, 66, 128, 0]);
        // kerns: -0.1
        out.extend(fix(-1, 10).to_be_bytes());
        // params 1..7: slant 0, space 1/3, stretch 1/6, shrink 1/9,
        // x-height 0.43, quad 1, extra 1/9
        out.extend(0i32.to_be_bytes());
        out.extend(fix(1, 3).to_be_bytes());
        out.extend(fix(1, 6).to_be_bytes());
        out.extend(fix(1, 9).to_be_bytes());
        out.extend(fix(43, 100).to_be_bytes());
        out.extend(fix(1, 1).to_be_bytes());
        out.extend(fix(1, 9).to_be_bytes());
        assert_eq!(out.len(), lf * 4);
        out
    }

    #[test]
    fn parses_the_sample_font() {
        let f = TfmFont::from_bytes("sample", &sample_font(), None).unwrap();
        assert_eq!(f.design_size(), Scaled(10 * 65536));
        assert_eq!(f.at_size(), Scaled(10 * 65536));
        assert_eq!(f.checksum(), 0xDEADBEEF);

        let a = f.glyph_metrics('A' as u32).unwrap();
        assert_eq!(a.advance, Scaled(5 * 65536)); // 0.5 * 10pt
        // 0.7 * 10pt, one sp under 7pt from fix_word truncation.
        assert_eq!(a.height, Scaled(7 * 65536 - 1));
        assert_eq!(a.depth, Scaled::ZERO);
        let b = f.glyph_metrics('B' as u32).unwrap();
        assert_eq!(b.advance, Scaled(65536 * 15 / 2)); // 0.75 * 10pt

        assert!(f.glyph_metrics('C' as u32).is_none());
        assert!(f.glyph_metrics(10).is_none());
    }

    #[test]
    fn at_size_rescales() {
        let f = TfmFont::from_bytes("sample", &sample_font(), Some(Scaled(20 * 65536))).unwrap();
        let a = f.glyph_metrics('A' as u32).unwrap();
        assert_eq!(a.advance, Scaled(10 * 65536)); // 0.5 * 20pt
        assert_eq!(f.design_size(), Scaled(10 * 65536));
    }

    #[test]
    fn kern_pair() {
        let f = TfmFont::from_bytes("sample", &sample_font(), None).unwrap();
        // -0.1 * 10pt = -1pt
        assert_eq!(f.kern('A' as u32, 'B' as u32), Scaled(-65536));
        assert_eq!(f.kern('B' as u32, 'A' as u32), Scaled::ZERO);
        assert_eq!(f.ligature('A' as u32, 'B' as u32), None);
    }

    #[test]
    fn fontdimens() {
        let f = TfmFont::from_bytes("sample", &sample_font(), None).unwrap();
        // space = 10pt/3
        assert_eq!(f.math_param(MathParam::Space), Scaled(10 * 65536 / 3));
        assert_eq!(f.math_param(MathParam::Quad), Scaled(10 * 65536));
        // Parameters beyond np read as zero.
        assert_eq!(f.math_param(MathParam::AxisHeight), Scaled::ZERO);
    }

    #[test]
    fn truncated_file_is_rejected() {
        let mut data = sample_font();
        data.truncate(data.len() - 8);
        assert!(matches!(
            TfmFont::from_bytes("sample", &data, None),
            Err(FontError::Malformed(_))
        ));
    }
}
