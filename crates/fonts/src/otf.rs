//! OpenType/TrueType metrics via `ttf-parser`.
//!
//! Advances and bounding boxes are read in font units and rescaled to sp at
//! the requested size. The math parameters that TFM fonts carry as
//! fontdimens have no direct OpenType counterpart here; they are
//! synthesized from the em size and x-height with the fixed fraction table
//! [`SYNTH_PARAMS`]. The table is a policy, documented once, applied to
//! every face, so two jobs over the same text differ only by the faces'
//! own advances.

use crate::{
    ExtParam, FontError, FontMetrics, GlyphMetrics, MathParam, SizedDelimiter,
};
use units::Scaled;

/// Math-parameter synthesis table: per-mille of the quad (em) width,
/// except `XHeight` and `AxisHeight` which come from the face itself.
/// The per-mille values follow the classical symbol-font proportions.
pub const SYNTH_PARAMS: [(MathParam, i32); 15] = [
    (MathParam::Num1, 677),
    (MathParam::Num2, 394),
    (MathParam::Num3, 444),
    (MathParam::Denom1, 686),
    (MathParam::Denom2, 345),
    (MathParam::Sup1, 413),
    (MathParam::Sup2, 363),
    (MathParam::Sup3, 289),
    (MathParam::Sub1, 150),
    (MathParam::Sub2, 247),
    (MathParam::SupDrop, 386),
    (MathParam::SubDrop, 50),
    (MathParam::Delim1, 2390),
    (MathParam::Delim2, 1010),
    (MathParam::Quad, 1000),
];

/// Extension-font parameter synthesis, per-mille of the em.
pub const SYNTH_EXT_PARAMS: [(ExtParam, i32); 6] = [
    (ExtParam::DefaultRuleThickness, 40),
    (ExtParam::BigOpSpacing1, 111),
    (ExtParam::BigOpSpacing2, 166),
    (ExtParam::BigOpSpacing3, 200),
    (ExtParam::BigOpSpacing4, 600),
    (ExtParam::BigOpSpacing5, 100),
];

/// Interword-space synthesis, per-mille of the em: natural, stretch, shrink.
const SYNTH_SPACE: (i32, i32, i32) = (333, 167, 111);

/// A loaded OpenType face. The raw file bytes are owned here; the
/// `ttf-parser` face is re-created per lookup group via `as_face`, which is
/// cheap (the crate only validates offsets at parse time).
pub struct OtfFont {
    name: String,
    data: Vec<u8>,
    at_size: Scaled,
    units_per_em: i32,
    x_height: i32,
}

impl OtfFont {
    pub fn from_path(path: &std::path::Path, at: Scaled) -> Result<OtfFont, FontError> {
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        OtfFont::from_bytes(&name, data, at)
    }

    pub fn from_bytes(name: &str, data: Vec<u8>, at: Scaled) -> Result<OtfFont, FontError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| FontError::Malformed(e.to_string()))?;
        let units_per_em = face.units_per_em() as i32;
        if units_per_em <= 0 {
            return Err(FontError::Malformed("unitsPerEm is zero".into()));
        }
        // Faces without an x-height record get the 45%-of-em fallback.
        let x_height = face
            .x_height()
            .map(|x| x as i32)
            .unwrap_or(units_per_em * 45 / 100);
        Ok(OtfFont {
            name: name.to_string(),
            data,
            at_size: at,
            units_per_em,
            x_height,
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    /// Font units to sp at the loaded size.
    fn to_sp(&self, font_units: i32) -> Scaled {
        Scaled(((font_units as i64 * self.at_size.0 as i64) / self.units_per_em as i64) as i32)
    }

    fn per_mille(&self, v: i32) -> Scaled {
        Scaled(((v as i64 * self.at_size.0 as i64) / 1000) as i32)
    }
}

impl FontMetrics for OtfFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn at_size(&self) -> Scaled {
        self.at_size
    }

    fn design_size(&self) -> Scaled {
        self.at_size
    }

    fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics> {
        let face = self.face()?;
        let c = char::from_u32(codepoint)?;
        let id = face.glyph_index(c)?;
        let advance = face.glyph_hor_advance(id)? as i32;
        let (height, depth) = match face.glyph_bounding_box(id) {
            Some(bb) => (bb.y_max.max(0) as i32, (-(bb.y_min.min(0) as i32))),
            // Blank glyphs (e.g. the space) have no outline.
            None => (0, 0),
        };
        Some(GlyphMetrics {
            advance: self.to_sp(advance),
            height: self.to_sp(height),
            depth: self.to_sp(depth),
            italic_correction: Scaled::ZERO,
            is_extensible: false,
        })
    }

    fn kern(&self, left: u32, right: u32) -> Scaled {
        let Some(face) = self.face() else {
            return Scaled::ZERO;
        };
        let pair = (|| {
            let l = face.glyph_index(char::from_u32(left)?)?;
            let r = face.glyph_index(char::from_u32(right)?)?;
            let kern = face.tables().kern?;
            for sub in kern.subtables {
                if !sub.horizontal {
                    continue;
                }
                if let Some(v) = sub.glyphs_kerning(l, r) {
                    return Some(v as i32);
                }
            }
            None
        })();
        pair.map(|v| self.to_sp(v)).unwrap_or(Scaled::ZERO)
    }

    fn ligature(&self, _left: u32, _right: u32) -> Option<u32> {
        // GSUB substitution is shaping, not metrics; this provider exposes
        // no ligatures.
        None
    }

    fn math_param(&self, param: MathParam) -> Scaled {
        match param {
            MathParam::Slant => Scaled::ZERO,
            MathParam::Space => self.per_mille(SYNTH_SPACE.0),
            MathParam::SpaceStretch => self.per_mille(SYNTH_SPACE.1),
            MathParam::SpaceShrink => self.per_mille(SYNTH_SPACE.2),
            MathParam::ExtraSpace => self.per_mille(SYNTH_SPACE.2),
            MathParam::XHeight => self.to_sp(self.x_height),
            MathParam::AxisHeight => self.to_sp(self.x_height).half(),
            other => SYNTH_PARAMS
                .iter()
                .find(|(p, _)| *p == other)
                .map(|(_, pm)| self.per_mille(*pm))
                .unwrap_or(Scaled::ZERO),
        }
    }

    fn ext_param(&self, param: ExtParam) -> Scaled {
        SYNTH_EXT_PARAMS
            .iter()
            .find(|(p, _)| *p == param)
            .map(|(_, pm)| self.per_mille(*pm))
            .unwrap_or(Scaled::ZERO)
    }

    fn sized_delimiter(&self, codepoint: u32, _target: Scaled) -> Option<SizedDelimiter> {
        // OpenType size variants live in the MATH table, which this
        // provider does not read; the base glyph is the only candidate.
        let face = self.face()?;
        face.glyph_index(char::from_u32(codepoint)?)?;
        Some(SizedDelimiter::Glyph(codepoint))
    }
}
