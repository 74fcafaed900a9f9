//! The fixed command table.
//!
//! Every control sequence the pipeline understands is listed here with
//! its semantic kind and argument count. Lookup is by name; anything
//! absent stays an opaque node in the AST. Symbol codepoints are
//! Unicode; the font providers map them to glyphs.

use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub kind: CommandKind,
    /// Braced arguments the builder captures after the command.
    pub arity: u8,
}

/// Math atom classes as the command table knows them. The layout crate
/// has its own richer classification; this one only distinguishes what
/// the table needs to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathClass {
    Ord,
    Op,
    Bin,
    Rel,
    Open,
    Close,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Roman,
    Bold,
    Italic,
    Slanted,
    SmallCaps,
    SansSerif,
    Typewriter,
    Emphasis,
    Calligraphic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathStyle {
    Display,
    Text,
    Script,
    ScriptScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueCommand {
    Hfil,
    Hfill,
    Hss,
    Vfil,
    Vfill,
    Vss,
    /// Takes a glue specification from the following text.
    Hskip,
    Vskip,
    /// Takes a dimension from the following text.
    Kern,
    Mskip,
    Mkern,
    SmallSkip,
    MedSkip,
    BigSkip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxCommand {
    HBox,
    VBox,
    VTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignCommand {
    Halign,
    Valign,
    Noalign,
    Omit,
    Span,
    Cr,
    CrCr,
    Hidewidth,
    Tabskip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// A math symbol with a fixed codepoint and class.
    Symbol { codepoint: u32, class: MathClass },
    /// An upright operator name (`\sin`): set as roman text, spaced as
    /// an operator without limits.
    Function,
    /// A character the command escapes (`\&`, `\%`, `\ `), any mode.
    Literal { codepoint: u32 },
    /// `\frac`-style stacking; `rule: false` is `\atop`-style.
    Fraction { rule: bool },
    /// Infix form inside a group (`\over`, `\atop`).
    InfixFraction { rule: bool },
    Radical,
    /// A math accent placed over its argument.
    Accent { codepoint: u32 },
    /// `\left`/`\right`; the delimiter is the following token.
    LeftDelim,
    RightDelim,
    /// A fixed-size delimiter request (`\bigl` and friends); the factor
    /// is in half `\delimiterfactor`-free steps: 1 = big, 2 = Big...
    SizedDelim { steps: u8 },
    /// Declaration form (`\bf`): applies to the rest of the group.
    FontSwitch(FontStyle),
    /// Argument form (`\textbf{..}`, `\mathbf{..}`).
    TextFont(FontStyle),
    Sectioning { level: u8 },
    /// Fixed horizontal space in thousandths of an em (negative allowed).
    Space { em_milli: i32 },
    Glue(GlueCommand),
    Box(BoxCommand),
    Align(AlignCommand),
    Style(MathStyle),
    Limits { on: bool },
    /// `\-`: a discretionary hyphen.
    Discretionary,
    Par,
    Overline,
    Underline,
    /// Recognized and dropped (`\relax`, `\protect`, ...).
    Ignored,
}

/// Looks a control-sequence name up in the fixed table.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    static INDEX: OnceLock<HashMap<&'static str, &'static CommandSpec>> = OnceLock::new();
    INDEX
        .get_or_init(|| TABLE.iter().map(|spec| (spec.name, spec)).collect())
        .get(name)
        .copied()
}

macro_rules! cmd {
    ($name:literal, $kind:expr) => {
        CommandSpec {
            name: $name,
            kind: $kind,
            arity: 0,
        }
    };
    ($name:literal, $kind:expr, $arity:literal) => {
        CommandSpec {
            name: $name,
            kind: $kind,
            arity: $arity,
        }
    };
}

macro_rules! sym {
    ($name:literal, $cp:literal, $class:ident) => {
        CommandSpec {
            name: $name,
            kind: CommandKind::Symbol {
                codepoint: $cp,
                class: MathClass::$class,
            },
            arity: 0,
        }
    };
}

use CommandKind as K;

static TABLE: &[CommandSpec] = &[
    // Greek, lowercase.
    sym!("alpha", 0x03B1, Ord),
    sym!("beta", 0x03B2, Ord),
    sym!("gamma", 0x03B3, Ord),
    sym!("delta", 0x03B4, Ord),
    sym!("epsilon", 0x03F5, Ord),
    sym!("varepsilon", 0x03B5, Ord),
    sym!("zeta", 0x03B6, Ord),
    sym!("eta", 0x03B7, Ord),
    sym!("theta", 0x03B8, Ord),
    sym!("vartheta", 0x03D1, Ord),
    sym!("iota", 0x03B9, Ord),
    sym!("kappa", 0x03BA, Ord),
    sym!("lambda", 0x03BB, Ord),
    sym!("mu", 0x03BC, Ord),
    sym!("nu", 0x03BD, Ord),
    sym!("xi", 0x03BE, Ord),
    sym!("pi", 0x03C0, Ord),
    sym!("varpi", 0x03D6, Ord),
    sym!("rho", 0x03C1, Ord),
    sym!("varrho", 0x03F1, Ord),
    sym!("sigma", 0x03C3, Ord),
    sym!("varsigma", 0x03C2, Ord),
    sym!("tau", 0x03C4, Ord),
    sym!("upsilon", 0x03C5, Ord),
    sym!("phi", 0x03D5, Ord),
    sym!("varphi", 0x03C6, Ord),
    sym!("chi", 0x03C7, Ord),
    sym!("psi", 0x03C8, Ord),
    sym!("omega", 0x03C9, Ord),
    // Greek, uppercase.
    sym!("Gamma", 0x0393, Ord),
    sym!("Delta", 0x0394, Ord),
    sym!("Theta", 0x0398, Ord),
    sym!("Lambda", 0x039B, Ord),
    sym!("Xi", 0x039E, Ord),
    sym!("Pi", 0x03A0, Ord),
    sym!("Sigma", 0x03A3, Ord),
    sym!("Upsilon", 0x03A5, Ord),
    sym!("Phi", 0x03A6, Ord),
    sym!("Psi", 0x03A8, Ord),
    sym!("Omega", 0x03A9, Ord),
    // Large operators.
    sym!("sum", 0x2211, Op),
    sym!("prod", 0x220F, Op),
    sym!("coprod", 0x2210, Op),
    sym!("int", 0x222B, Op),
    sym!("oint", 0x222E, Op),
    sym!("bigcap", 0x22C2, Op),
    sym!("bigcup", 0x22C3, Op),
    sym!("bigsqcup", 0x2A06, Op),
    sym!("bigvee", 0x22C1, Op),
    sym!("bigwedge", 0x22C0, Op),
    sym!("bigodot", 0x2A00, Op),
    sym!("bigotimes", 0x2A02, Op),
    sym!("bigoplus", 0x2A01, Op),
    sym!("biguplus", 0x2A04, Op),
    // Binary operators.
    sym!("pm", 0x00B1, Bin),
    sym!("mp", 0x2213, Bin),
    sym!("times", 0x00D7, Bin),
    sym!("div", 0x00F7, Bin),
    sym!("ast", 0x2217, Bin),
    sym!("star", 0x22C6, Bin),
    sym!("circ", 0x2218, Bin),
    sym!("bullet", 0x2219, Bin),
    sym!("cdot", 0x22C5, Bin),
    sym!("cap", 0x2229, Bin),
    sym!("cup", 0x222A, Bin),
    sym!("uplus", 0x228E, Bin),
    sym!("sqcap", 0x2293, Bin),
    sym!("sqcup", 0x2294, Bin),
    sym!("vee", 0x2228, Bin),
    sym!("wedge", 0x2227, Bin),
    sym!("setminus", 0x2216, Bin),
    sym!("wr", 0x2240, Bin),
    sym!("diamond", 0x22C4, Bin),
    sym!("triangleleft", 0x25C3, Bin),
    sym!("triangleright", 0x25B9, Bin),
    sym!("oplus", 0x2295, Bin),
    sym!("ominus", 0x2296, Bin),
    sym!("otimes", 0x2297, Bin),
    sym!("oslash", 0x2298, Bin),
    sym!("odot", 0x2299, Bin),
    sym!("dagger", 0x2020, Bin),
    sym!("ddagger", 0x2021, Bin),
    sym!("amalg", 0x2A3F, Bin),
    // Relations.
    sym!("leq", 0x2264, Rel),
    sym!("le", 0x2264, Rel),
    sym!("geq", 0x2265, Rel),
    sym!("ge", 0x2265, Rel),
    sym!("neq", 0x2260, Rel),
    sym!("ne", 0x2260, Rel),
    sym!("equiv", 0x2261, Rel),
    sym!("sim", 0x223C, Rel),
    sym!("simeq", 0x2243, Rel),
    sym!("approx", 0x2248, Rel),
    sym!("cong", 0x2245, Rel),
    sym!("ll", 0x226A, Rel),
    sym!("gg", 0x226B, Rel),
    sym!("subset", 0x2282, Rel),
    sym!("supset", 0x2283, Rel),
    sym!("subseteq", 0x2286, Rel),
    sym!("supseteq", 0x2287, Rel),
    sym!("sqsubseteq", 0x2291, Rel),
    sym!("sqsupseteq", 0x2292, Rel),
    sym!("in", 0x2208, Rel),
    sym!("ni", 0x220B, Rel),
    sym!("notin", 0x2209, Rel),
    sym!("vdash", 0x22A2, Rel),
    sym!("dashv", 0x22A3, Rel),
    sym!("perp", 0x22A5, Rel),
    sym!("mid", 0x2223, Rel),
    sym!("parallel", 0x2225, Rel),
    sym!("propto", 0x221D, Rel),
    sym!("models", 0x22A7, Rel),
    sym!("asymp", 0x224D, Rel),
    sym!("prec", 0x227A, Rel),
    sym!("succ", 0x227B, Rel),
    sym!("preceq", 0x2AAF, Rel),
    sym!("succeq", 0x2AB0, Rel),
    sym!("doteq", 0x2250, Rel),
    sym!("smile", 0x2323, Rel),
    sym!("frown", 0x2322, Rel),
    // Arrows.
    sym!("leftarrow", 0x2190, Rel),
    sym!("gets", 0x2190, Rel),
    sym!("rightarrow", 0x2192, Rel),
    sym!("to", 0x2192, Rel),
    sym!("leftrightarrow", 0x2194, Rel),
    sym!("Leftarrow", 0x21D0, Rel),
    sym!("Rightarrow", 0x21D2, Rel),
    sym!("Leftrightarrow", 0x21D4, Rel),
    sym!("mapsto", 0x21A6, Rel),
    sym!("hookleftarrow", 0x21A9, Rel),
    sym!("hookrightarrow", 0x21AA, Rel),
    sym!("uparrow", 0x2191, Rel),
    sym!("downarrow", 0x2193, Rel),
    sym!("updownarrow", 0x2195, Rel),
    sym!("Uparrow", 0x21D1, Rel),
    sym!("Downarrow", 0x21D3, Rel),
    sym!("nearrow", 0x2197, Rel),
    sym!("searrow", 0x2198, Rel),
    sym!("swarrow", 0x2199, Rel),
    sym!("nwarrow", 0x2196, Rel),
    sym!("longrightarrow", 0x27F6, Rel),
    sym!("longleftarrow", 0x27F5, Rel),
    sym!("longleftrightarrow", 0x27F7, Rel),
    sym!("Longrightarrow", 0x27F9, Rel),
    sym!("Longleftarrow", 0x27F8, Rel),
    sym!("Longleftrightarrow", 0x27FA, Rel),
    sym!("longmapsto", 0x27FC, Rel),
    // Delimiters as symbols.
    sym!("langle", 0x27E8, Open),
    sym!("rangle", 0x27E9, Close),
    sym!("lceil", 0x2308, Open),
    sym!("rceil", 0x2309, Close),
    sym!("lfloor", 0x230A, Open),
    sym!("rfloor", 0x230B, Close),
    sym!("lbrace", 0x007B, Open),
    sym!("rbrace", 0x007D, Close),
    sym!("lbrack", 0x005B, Open),
    sym!("rbrack", 0x005D, Close),
    sym!("lgroup", 0x27EE, Open),
    sym!("rgroup", 0x27EF, Close),
    sym!("vert", 0x007C, Ord),
    sym!("Vert", 0x2016, Ord),
    sym!("backslash", 0x005C, Ord),
    // Ordinary symbols.
    sym!("infty", 0x221E, Ord),
    sym!("partial", 0x2202, Ord),
    sym!("nabla", 0x2207, Ord),
    sym!("forall", 0x2200, Ord),
    sym!("exists", 0x2203, Ord),
    sym!("neg", 0x00AC, Ord),
    sym!("lnot", 0x00AC, Ord),
    sym!("emptyset", 0x2205, Ord),
    sym!("aleph", 0x2135, Ord),
    sym!("hbar", 0x210F, Ord),
    sym!("imath", 0x0131, Ord),
    sym!("jmath", 0x0237, Ord),
    sym!("ell", 0x2113, Ord),
    sym!("wp", 0x2118, Ord),
    sym!("Re", 0x211C, Ord),
    sym!("Im", 0x2111, Ord),
    sym!("prime", 0x2032, Ord),
    sym!("top", 0x22A4, Ord),
    sym!("bot", 0x22A5, Ord),
    sym!("angle", 0x2220, Ord),
    sym!("triangle", 0x25B3, Ord),
    sym!("surd", 0x221A, Ord),
    sym!("clubsuit", 0x2663, Ord),
    sym!("diamondsuit", 0x2662, Ord),
    sym!("heartsuit", 0x2661, Ord),
    sym!("spadesuit", 0x2660, Ord),
    sym!("flat", 0x266D, Ord),
    sym!("natural", 0x266E, Ord),
    sym!("sharp", 0x266F, Ord),
    sym!("cdots", 0x22EF, Ord),
    sym!("ldots", 0x2026, Ord),
    sym!("vdots", 0x22EE, Ord),
    sym!("ddots", 0x22F1, Ord),
    sym!("dots", 0x2026, Ord),
    // Punctuation.
    sym!("colon", 0x003A, Punct),
    sym!("cdotp", 0x22C5, Punct),
    sym!("ldotp", 0x002E, Punct),
    // Operator names set in roman.
    cmd!("arccos", K::Function),
    cmd!("arcsin", K::Function),
    cmd!("arctan", K::Function),
    cmd!("arg", K::Function),
    cmd!("cos", K::Function),
    cmd!("cosh", K::Function),
    cmd!("cot", K::Function),
    cmd!("coth", K::Function),
    cmd!("csc", K::Function),
    cmd!("deg", K::Function),
    cmd!("det", K::Function),
    cmd!("dim", K::Function),
    cmd!("exp", K::Function),
    cmd!("gcd", K::Function),
    cmd!("hom", K::Function),
    cmd!("inf", K::Function),
    cmd!("ker", K::Function),
    cmd!("lg", K::Function),
    cmd!("lim", K::Function),
    cmd!("liminf", K::Function),
    cmd!("limsup", K::Function),
    cmd!("ln", K::Function),
    cmd!("log", K::Function),
    cmd!("max", K::Function),
    cmd!("min", K::Function),
    cmd!("Pr", K::Function),
    cmd!("sec", K::Function),
    cmd!("sin", K::Function),
    cmd!("sinh", K::Function),
    cmd!("sup", K::Function),
    cmd!("tan", K::Function),
    cmd!("tanh", K::Function),
    // Math accents.
    cmd!("hat", K::Accent { codepoint: 0x0302 }, 1),
    cmd!("check", K::Accent { codepoint: 0x030C }, 1),
    cmd!("tilde", K::Accent { codepoint: 0x0303 }, 1),
    cmd!("acute", K::Accent { codepoint: 0x0301 }, 1),
    cmd!("grave", K::Accent { codepoint: 0x0300 }, 1),
    cmd!("dot", K::Accent { codepoint: 0x0307 }, 1),
    cmd!("ddot", K::Accent { codepoint: 0x0308 }, 1),
    cmd!("breve", K::Accent { codepoint: 0x0306 }, 1),
    cmd!("bar", K::Accent { codepoint: 0x0304 }, 1),
    cmd!("vec", K::Accent { codepoint: 0x20D7 }, 1),
    cmd!("widehat", K::Accent { codepoint: 0x0302 }, 1),
    cmd!("widetilde", K::Accent { codepoint: 0x0303 }, 1),
    // Fractions and radicals.
    cmd!("frac", K::Fraction { rule: true }, 2),
    cmd!("over", K::InfixFraction { rule: true }),
    cmd!("atop", K::InfixFraction { rule: false }),
    cmd!("sqrt", K::Radical, 1),
    // Delimiter sizing.
    cmd!("left", K::LeftDelim, 1),
    cmd!("right", K::RightDelim, 1),
    cmd!("bigl", K::SizedDelim { steps: 1 }, 1),
    cmd!("bigr", K::SizedDelim { steps: 1 }, 1),
    cmd!("big", K::SizedDelim { steps: 1 }, 1),
    cmd!("Bigl", K::SizedDelim { steps: 2 }, 1),
    cmd!("Bigr", K::SizedDelim { steps: 2 }, 1),
    cmd!("Big", K::SizedDelim { steps: 2 }, 1),
    cmd!("biggl", K::SizedDelim { steps: 3 }, 1),
    cmd!("biggr", K::SizedDelim { steps: 3 }, 1),
    cmd!("bigg", K::SizedDelim { steps: 3 }, 1),
    cmd!("Biggl", K::SizedDelim { steps: 4 }, 1),
    cmd!("Biggr", K::SizedDelim { steps: 4 }, 1),
    cmd!("Bigg", K::SizedDelim { steps: 4 }, 1),
    // Styles and limits.
    cmd!("displaystyle", K::Style(MathStyle::Display)),
    cmd!("textstyle", K::Style(MathStyle::Text)),
    cmd!("scriptstyle", K::Style(MathStyle::Script)),
    cmd!("scriptscriptstyle", K::Style(MathStyle::ScriptScript)),
    cmd!("limits", K::Limits { on: true }),
    cmd!("nolimits", K::Limits { on: false }),
    // Font declarations and their argument forms.
    cmd!("rm", K::FontSwitch(FontStyle::Roman)),
    cmd!("bf", K::FontSwitch(FontStyle::Bold)),
    cmd!("it", K::FontSwitch(FontStyle::Italic)),
    cmd!("sl", K::FontSwitch(FontStyle::Slanted)),
    cmd!("sc", K::FontSwitch(FontStyle::SmallCaps)),
    cmd!("sf", K::FontSwitch(FontStyle::SansSerif)),
    cmd!("tt", K::FontSwitch(FontStyle::Typewriter)),
    cmd!("em", K::FontSwitch(FontStyle::Emphasis)),
    cmd!("cal", K::FontSwitch(FontStyle::Calligraphic)),
    cmd!("textrm", K::TextFont(FontStyle::Roman), 1),
    cmd!("textbf", K::TextFont(FontStyle::Bold), 1),
    cmd!("textit", K::TextFont(FontStyle::Italic), 1),
    cmd!("textsl", K::TextFont(FontStyle::Slanted), 1),
    cmd!("textsc", K::TextFont(FontStyle::SmallCaps), 1),
    cmd!("textsf", K::TextFont(FontStyle::SansSerif), 1),
    cmd!("texttt", K::TextFont(FontStyle::Typewriter), 1),
    cmd!("emph", K::TextFont(FontStyle::Emphasis), 1),
    cmd!("mathrm", K::TextFont(FontStyle::Roman), 1),
    cmd!("mathbf", K::TextFont(FontStyle::Bold), 1),
    cmd!("mathit", K::TextFont(FontStyle::Italic), 1),
    cmd!("mathsf", K::TextFont(FontStyle::SansSerif), 1),
    cmd!("mathtt", K::TextFont(FontStyle::Typewriter), 1),
    cmd!("mathcal", K::TextFont(FontStyle::Calligraphic), 1),
    // Sectioning.
    cmd!("part", K::Sectioning { level: 0 }, 1),
    cmd!("chapter", K::Sectioning { level: 1 }, 1),
    cmd!("section", K::Sectioning { level: 2 }, 1),
    cmd!("subsection", K::Sectioning { level: 3 }, 1),
    cmd!("subsubsection", K::Sectioning { level: 4 }, 1),
    cmd!("paragraph", K::Sectioning { level: 5 }, 1),
    cmd!("subparagraph", K::Sectioning { level: 6 }, 1),
    // Fixed spaces. One em is 1000; math thin/med/thick spaces are
    // 3/18, 4/18, 5/18 em.
    cmd!(",", K::Space { em_milli: 167 }),
    cmd!(":", K::Space { em_milli: 222 }),
    cmd!(";", K::Space { em_milli: 278 }),
    cmd!("!", K::Space { em_milli: -167 }),
    cmd!("quad", K::Space { em_milli: 1000 }),
    cmd!("qquad", K::Space { em_milli: 2000 }),
    cmd!("enspace", K::Space { em_milli: 500 }),
    cmd!("enskip", K::Space { em_milli: 500 }),
    cmd!("thinspace", K::Space { em_milli: 167 }),
    cmd!("negthinspace", K::Space { em_milli: -167 }),
    // Glue and kerns.
    cmd!("hfil", K::Glue(GlueCommand::Hfil)),
    cmd!("hfill", K::Glue(GlueCommand::Hfill)),
    cmd!("hss", K::Glue(GlueCommand::Hss)),
    cmd!("vfil", K::Glue(GlueCommand::Vfil)),
    cmd!("vfill", K::Glue(GlueCommand::Vfill)),
    cmd!("vss", K::Glue(GlueCommand::Vss)),
    cmd!("hskip", K::Glue(GlueCommand::Hskip)),
    cmd!("vskip", K::Glue(GlueCommand::Vskip)),
    cmd!("kern", K::Glue(GlueCommand::Kern)),
    cmd!("mskip", K::Glue(GlueCommand::Mskip)),
    cmd!("mkern", K::Glue(GlueCommand::Mkern)),
    cmd!("smallskip", K::Glue(GlueCommand::SmallSkip)),
    cmd!("medskip", K::Glue(GlueCommand::MedSkip)),
    cmd!("bigskip", K::Glue(GlueCommand::BigSkip)),
    // Boxes.
    cmd!("hbox", K::Box(BoxCommand::HBox), 1),
    cmd!("vbox", K::Box(BoxCommand::VBox), 1),
    cmd!("vtop", K::Box(BoxCommand::VTop), 1),
    cmd!("mbox", K::Box(BoxCommand::HBox), 1),
    // Alignment.
    cmd!("halign", K::Align(AlignCommand::Halign), 1),
    cmd!("valign", K::Align(AlignCommand::Valign), 1),
    cmd!("noalign", K::Align(AlignCommand::Noalign), 1),
    cmd!("omit", K::Align(AlignCommand::Omit)),
    cmd!("span", K::Align(AlignCommand::Span)),
    cmd!("cr", K::Align(AlignCommand::Cr)),
    cmd!("crcr", K::Align(AlignCommand::CrCr)),
    cmd!("hidewidth", K::Align(AlignCommand::Hidewidth)),
    cmd!("tabskip", K::Align(AlignCommand::Tabskip)),
    // Escaped characters.
    cmd!("&", K::Literal { codepoint: 0x26 }),
    cmd!("%", K::Literal { codepoint: 0x25 }),
    cmd!("$", K::Literal { codepoint: 0x24 }),
    cmd!("#", K::Literal { codepoint: 0x23 }),
    cmd!("_", K::Literal { codepoint: 0x5F }),
    cmd!("{", K::Literal { codepoint: 0x7B }),
    cmd!("}", K::Literal { codepoint: 0x7D }),
    cmd!(" ", K::Literal { codepoint: 0x20 }),
    // Paragraphs, breaks, and leftovers.
    cmd!("par", K::Par),
    cmd!("-", K::Discretionary),
    cmd!("/", K::Ignored), // italic correction: metrics apply it
    cmd!("noindent", K::Ignored),
    cmd!("indent", K::Ignored),
    cmd!("relax", K::Ignored),
    cmd!("protect", K::Ignored),
    cmd!("ignorespaces", K::Ignored),
    cmd!("strut", K::Ignored),
    cmd!("phantom", K::Ignored, 1),
    cmd!("vphantom", K::Ignored, 1),
    cmd!("hphantom", K::Ignored, 1),
    cmd!("smash", K::Ignored, 1),
    cmd!("underline", K::Underline, 1),
    cmd!("overline", K::Overline, 1),
    cmd!("centerline", K::Box(BoxCommand::HBox), 1),
];
