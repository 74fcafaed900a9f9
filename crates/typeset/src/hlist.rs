//! Text runs to horizontal lists.
//!
//! The shaper turns characters into char nodes with the font's pair
//! kerns and ligatures applied, interword glue taken from the font's
//! space parameters, and hyphenation discretionaries inserted at the
//! pattern table's break points. Missing glyphs substitute the font's
//! .notdef and warn once per (font, codepoint).

use fonts::{FontId, FontTable, MathParam};
use galley::hyphen::Patterns;
use galley::linebreak::hyphen_disc;
use galley::node::{CharNode, Discretionary, GlueNode, HNode};
use galley::pack::hbox_natural;
use units::{Glue, Scaled};

use crate::diag::Diagnostics;

/// Per-font shaping state; cheap to build, one per font switch.
pub struct Shaper<'a> {
    table: &'a FontTable,
    pub font: FontId,
    /// Interword glue from fontdimens 2-4.
    pub space: Glue,
    pub quad: Scaled,
}

impl<'a> Shaper<'a> {
    pub fn new(table: &'a FontTable, font: FontId) -> Shaper<'a> {
        let metrics = table.get(font);
        let space = Glue {
            natural: metrics.math_param(MathParam::Space),
            stretch: metrics.math_param(MathParam::SpaceStretch),
            shrink: metrics.math_param(MathParam::SpaceShrink),
            ..Glue::ZERO
        };
        Shaper {
            table,
            font,
            space,
            quad: metrics.math_param(MathParam::Quad),
        }
    }

    /// A char node, substituting .notdef (codepoint 0) when the font has
    /// no glyph. `None` when even .notdef is absent; the character is
    /// then dropped.
    pub fn char_node(&self, c: char, diags: &mut Diagnostics) -> Option<CharNode> {
        let metrics = self.table.get(self.font);
        let codepoint = c as u32;
        let (codepoint, m) = match metrics.glyph_metrics(codepoint) {
            Some(m) => (codepoint, m),
            None => {
                diags.missing_glyph(self.font.0, codepoint);
                (0, metrics.glyph_metrics(0)?)
            }
        };
        Some(CharNode {
            codepoint,
            font: self.font,
            width: m.advance,
            height: m.height,
            depth: m.depth,
            italic: m.italic_correction,
        })
    }

    /// Appends a text run: words shaped with ligatures, kerns and
    /// hyphenation points, spaces as interword glue. Newlines count as
    /// spaces; consecutive spaces collapse.
    pub fn append_text(&self, text: &str, out: &mut Vec<HNode>, diags: &mut Diagnostics) {
        let mut word = String::new();
        let mut pending_space = false;
        for c in text.chars() {
            if c.is_whitespace() {
                self.flush_word(&mut word, out, diags);
                pending_space = true;
                continue;
            }
            if pending_space {
                if !out.is_empty() {
                    out.push(HNode::Glue(GlueNode::new(self.space)));
                }
                pending_space = false;
            }
            if c.is_alphabetic() {
                word.push(c);
                continue;
            }
            self.flush_word(&mut word, out, diags);
            if c == '-' {
                // An explicit hyphen permits a following break.
                if let Some(node) = self.char_node('-', diags) {
                    out.push(HNode::Char(node));
                    out.push(HNode::Disc(Discretionary {
                        hyphen: true,
                        ..Discretionary::default()
                    }));
                }
                continue;
            }
            if let Some(node) = self.char_node(c, diags) {
                self.push_kerned(node, out);
            }
        }
        self.flush_word(&mut word, out, diags);
        if pending_space && !out.is_empty() {
            out.push(HNode::Glue(GlueNode::new(self.space)));
        }
    }

    /// A finished word: hyphenation points partition it, ligatures and
    /// kerns apply within each fragment.
    fn flush_word(&self, word: &mut String, out: &mut Vec<HNode>, diags: &mut Diagnostics) {
        if word.is_empty() {
            return;
        }
        let breaks = Patterns::english().break_points(word);
        let chars: Vec<char> = word.chars().collect();
        let mut start = 0;
        for stop in breaks.iter().copied().chain([chars.len()]) {
            if start > 0 {
                if let Some(hyphen) = self.char_node('-', diags) {
                    out.push(HNode::Disc(hyphen_disc(hyphen)));
                }
            }
            self.fragment(&chars[start..stop], out, diags);
            start = stop;
        }
        word.clear();
    }

    /// Ligature substitution then pair kerns over one unbreakable run.
    fn fragment(&self, chars: &[char], out: &mut Vec<HNode>, diags: &mut Diagnostics) {
        let metrics = self.table.get(self.font);
        let mut codepoints: Vec<u32> = chars.iter().map(|&c| c as u32).collect();
        let mut i = 0;
        while i + 1 < codepoints.len() {
            match metrics.ligature(codepoints[i], codepoints[i + 1]) {
                Some(lig) => {
                    codepoints[i] = lig;
                    codepoints.remove(i + 1);
                    // The ligature may itself ligate with what follows.
                }
                None => i += 1,
            }
        }
        for cp in codepoints {
            let c = char::from_u32(cp).unwrap_or('\u{FFFD}');
            if let Some(node) = self.char_node(c, diags) {
                self.push_kerned(node, out);
            }
        }
    }

    /// Pushes a char node, preceded by the pair kern against the previous
    /// char of the same font when the metrics define one.
    fn push_kerned(&self, node: CharNode, out: &mut Vec<HNode>) {
        if let Some(HNode::Char(prev)) = out.last() {
            if prev.font == self.font {
                let kern = self.table.get(self.font).kern(prev.codepoint, node.codepoint);
                if kern != Scaled::ZERO {
                    out.push(HNode::Kern(galley::node::Kern {
                        width: kern,
                        explicit: false,
                    }));
                }
            }
        }
        out.push(HNode::Char(node));
    }

    /// A word set in an hbox at natural width, for operator names and
    /// similar labels.
    pub fn text_hbox(&self, text: &str, diags: &mut Diagnostics) -> galley::node::HBox {
        let mut nodes = Vec::new();
        self.append_text(text, &mut nodes, diags);
        hbox_natural(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fonts::{ExtParam, FontMetrics, GlyphMetrics, SizedDelimiter};
    use std::sync::Arc;

    /// Fixed-width test font with one ligature (f+i) and one kern (A,V).
    struct ShapeFont;

    const LIG_FI: u32 = 0xFB01;

    impl FontMetrics for ShapeFont {
        fn name(&self) -> &str {
            "shape10"
        }
        fn at_size(&self) -> Scaled {
            Scaled(655_360)
        }
        fn design_size(&self) -> Scaled {
            Scaled(655_360)
        }
        fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics> {
            if codepoint == 0 || codepoint < 0x80 || codepoint == LIG_FI {
                Some(GlyphMetrics {
                    advance: Scaled(300_000),
                    height: Scaled(400_000),
                    depth: Scaled::ZERO,
                    italic_correction: Scaled::ZERO,
                    is_extensible: false,
                })
            } else {
                None
            }
        }
        fn kern(&self, left: u32, right: u32) -> Scaled {
            if (left, right) == ('A' as u32, 'V' as u32) {
                Scaled(-20_000)
            } else {
                Scaled::ZERO
            }
        }
        fn ligature(&self, left: u32, right: u32) -> Option<u32> {
            ((left, right) == ('f' as u32, 'i' as u32)).then_some(LIG_FI)
        }
        fn math_param(&self, param: MathParam) -> Scaled {
            match param {
                MathParam::Space => Scaled(218_453),
                MathParam::SpaceStretch => Scaled(109_226),
                MathParam::SpaceShrink => Scaled(72_818),
                MathParam::Quad => Scaled(655_360),
                _ => Scaled::ZERO,
            }
        }
        fn ext_param(&self, _: ExtParam) -> Scaled {
            Scaled::ZERO
        }
        fn sized_delimiter(&self, _: u32, _: Scaled) -> Option<SizedDelimiter> {
            None
        }
    }

    fn shaper_table() -> FontTable {
        let mut t = FontTable::new();
        t.add(Arc::new(ShapeFont));
        t
    }

    fn codepoints(nodes: &[HNode]) -> Vec<u32> {
        nodes
            .iter()
            .filter_map(|n| match n {
                HNode::Char(c) => Some(c.codepoint),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn spaces_become_interword_glue() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("a b", &mut out, &mut diags);
        let glues: Vec<&GlueNode> = out
            .iter()
            .filter_map(|n| match n {
                HNode::Glue(g) => Some(g),
                _ => None,
            })
            .collect();
        assert_eq!(glues.len(), 1);
        assert_eq!(glues[0].glue.natural, Scaled(218_453));
        assert_eq!(glues[0].glue.stretch, Scaled(109_226));
        assert_eq!(glues[0].glue.shrink, Scaled(72_818));
    }

    #[test]
    fn consecutive_whitespace_collapses() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("a  \n b", &mut out, &mut diags);
        let glue_count = out.iter().filter(|n| matches!(n, HNode::Glue(_))).count();
        assert_eq!(glue_count, 1);
    }

    #[test]
    fn ligatures_substitute_and_rescan() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("fin", &mut out, &mut diags);
        assert_eq!(codepoints(&out), vec![LIG_FI, 'n' as u32]);
    }

    #[test]
    fn pair_kerns_land_between_chars() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("AV", &mut out, &mut diags);
        assert_eq!(out.len(), 3);
        let HNode::Kern(k) = &out[1] else {
            panic!("expected a kern, got {:?}", out[1]);
        };
        assert_eq!(k.width, Scaled(-20_000));
        assert!(!k.explicit);
    }

    #[test]
    fn hyphenation_points_become_discretionaries() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("hyphenation", &mut out, &mut diags);
        let discs: Vec<&Discretionary> = out
            .iter()
            .filter_map(|n| match n {
                HNode::Disc(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(discs.len(), 2); // hy-phen-ation
        assert!(discs.iter().all(|d| d.hyphen));
        assert_eq!(discs[0].pre.len(), 1);
    }

    #[test]
    fn explicit_hyphens_allow_a_break_after() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("x-y", &mut out, &mut diags);
        assert!(matches!(out[0], HNode::Char(_)));
        assert!(matches!(out[1], HNode::Char(_))); // the hyphen itself
        let HNode::Disc(d) = &out[2] else {
            panic!("expected a discretionary after the hyphen");
        };
        assert!(d.pre.is_empty());
    }

    #[test]
    fn missing_glyphs_substitute_notdef_and_warn_once() {
        let table = shaper_table();
        let shaper = Shaper::new(&table, FontId(0));
        let mut diags = Diagnostics::new();
        let mut out = Vec::new();
        shaper.append_text("é é", &mut out, &mut diags);
        assert_eq!(codepoints(&out), vec![0, 0]);
        assert_eq!(diags.items().len(), 1);
        assert_eq!(diags.items()[0].code, "font-missing-glyph");
    }
}
