//! Font metric providers.
//!
//! Layout never touches font files directly: it sees the [`FontMetrics`]
//! trait, which exposes glyph boxes, pair kerns, ligatures, the 22 math
//! parameters, and sized-delimiter selection. Two providers implement it:
//!
//! - [`tfm::TfmFont`] reads Knuth's font metric files and reproduces the
//!   classical metrics exactly. This is the provider for DVI-producing runs.
//! - [`otf::OtfFont`] reads an OpenType/TrueType face with `ttf-parser`,
//!   rescales font-unit advances to sp at the requested size, and
//!   synthesizes the math parameters it cannot observe.

use std::sync::Arc;

use units::Scaled;

pub mod otf;
pub mod tfm;

/// Per-job font identifier. The job's font table is append-only, so an id
/// stays valid for the whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

/// Metrics of one glyph, all in sp at the font's loaded size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub advance: Scaled,
    pub height: Scaled,
    pub depth: Scaled,
    pub italic_correction: Scaled,
    /// True when the glyph heads an extensible recipe (TFM `ext` tag).
    pub is_extensible: bool,
}

/// Result of sized-delimiter selection: either a single glyph that is tall
/// enough, or a vertical recipe assembled from extensible pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizedDelimiter {
    Glyph(u32),
    Recipe(ExtensibleRecipe),
}

/// A vertical extensible: top and bottom caps, optional middle, and a
/// repeatable filler. Zero-valued parts are absent (TFM convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensibleRecipe {
    pub top: Option<u32>,
    pub middle: Option<u32>,
    pub bottom: Option<u32>,
    pub repeat: u32,
}

/// The TeX math font dimensions, `\fontdimen` 1 through 22.
///
/// Parameters 1-7 exist in every font; 8-22 only in math symbol and math
/// extension fonts. Layout fetches them once per job and caches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MathParam {
    Slant = 1,
    Space = 2,
    SpaceStretch = 3,
    SpaceShrink = 4,
    XHeight = 5,
    Quad = 6,
    ExtraSpace = 7,
    Num1 = 8,
    Num2 = 9,
    Num3 = 10,
    Denom1 = 11,
    Denom2 = 12,
    Sup1 = 13,
    Sup2 = 14,
    Sup3 = 15,
    Sub1 = 16,
    Sub2 = 17,
    SupDrop = 18,
    SubDrop = 19,
    Delim1 = 20,
    Delim2 = 21,
    AxisHeight = 22,
}

/// The extension-font parameters (`\fontdimen` 8-13 of family 3), named
/// as Appendix G names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtParam {
    DefaultRuleThickness = 8,
    BigOpSpacing1 = 9,
    BigOpSpacing2 = 10,
    BigOpSpacing3 = 11,
    BigOpSpacing4 = 12,
    BigOpSpacing5 = 13,
}

/// The provider contract. All values are sp at the loaded size; providers
/// are read-only after load and safe to share across jobs.
pub trait FontMetrics: Send + Sync {
    /// Face name for diagnostics and DVI `fnt_def`.
    fn name(&self) -> &str;

    /// The size the font was loaded at.
    fn at_size(&self) -> Scaled;

    /// The design size recorded in the font, for DVI font definitions.
    fn design_size(&self) -> Scaled;

    /// Checksum for DVI font definitions; 0 when the format has none.
    fn checksum(&self) -> u32 {
        0
    }

    /// Metrics for one codepoint; `None` when the font has no such glyph.
    fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics>;

    /// Kern between a glyph pair, 0 if none.
    fn kern(&self, left: u32, right: u32) -> Scaled;

    /// Ligature replacement for a glyph pair, if the font defines one.
    fn ligature(&self, left: u32, right: u32) -> Option<u32>;

    /// `\fontdimen` lookup; 0 for parameters the font does not carry.
    fn math_param(&self, param: MathParam) -> Scaled;

    /// Extension-font parameter lookup; 0 when absent.
    fn ext_param(&self, param: ExtParam) -> Scaled;

    /// Selects a variant of `codepoint` at least `target` tall
    /// (height + depth), or an extensible recipe when no single glyph is
    /// big enough. `None` if the codepoint is absent entirely.
    fn sized_delimiter(&self, codepoint: u32, target: Scaled) -> Option<SizedDelimiter>;
}

/// Errors raised while loading a font. A missing font is fatal for the job.
#[derive(Debug)]
pub enum FontError {
    Io(std::io::Error),
    /// The file is not a valid instance of its format. The string names
    /// what was malformed.
    Malformed(String),
    NotFound { name: String },
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::Io(e) => write!(f, "font i/o error: {e}"),
            FontError::Malformed(what) => write!(f, "malformed font file: {what}"),
            FontError::NotFound { name } => write!(f, "font not found: {name}"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FontError {
    fn from(e: std::io::Error) -> Self {
        FontError::Io(e)
    }
}

/// The per-job font table: local ids to shared metric providers.
/// Append-only, so every issued [`FontId`] stays valid.
#[derive(Default)]
pub struct FontTable {
    fonts: Vec<Arc<dyn FontMetrics>>,
}

impl FontTable {
    pub fn new() -> FontTable {
        FontTable::default()
    }

    pub fn add(&mut self, font: Arc<dyn FontMetrics>) -> FontId {
        self.fonts.push(font);
        FontId(self.fonts.len() as u32 - 1)
    }

    pub fn get(&self, id: FontId) -> &dyn FontMetrics {
        self.fonts[id.0 as usize].as_ref()
    }

    pub fn share(&self, id: FontId) -> Arc<dyn FontMetrics> {
        Arc::clone(&self.fonts[id.0 as usize])
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FontId, &dyn FontMetrics)> {
        self.fonts
            .iter()
            .enumerate()
            .map(|(i, f)| (FontId(i as u32), f.as_ref()))
    }
}
