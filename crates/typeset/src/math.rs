//! AST math content to math lists.
//!
//! The translator flattens the AST into a token stream (characters and
//! resolved commands), classifies characters, attaches `^`/`_` scripts to
//! the preceding atom, and maps the command table's math kinds onto the
//! layout crate's items. Problems are diagnostics, never panics: unknown
//! commands typeset their arguments as plain content, a missing script
//! argument leaves the field empty.

use arena::Arena;
use galley::math::{self, Atom, AtomClass, Fenced, Field, Fraction, Limits, MathContext, MathItem, Radical, Style, StyleSize};
use galley::node::{HNode, Kern};
use galley::pack::hbox_natural;
use texast::ast::AstNode;
use texast::commands::{BoxCommand, CommandKind, GlueCommand, MathClass, MathStyle};
use units::Scaled;

use crate::diag::{Diagnostic, Diagnostics, Severity};
use crate::hlist::Shaper;

/// The radical sign.
const SQRT: u32 = 0x221A;
/// The prime mark `'` attaches as.
const PRIME: u32 = 0x2032;

/// Translates the children of a math node. A leading style command
/// (`\displaystyle` and friends) is returned separately for the caller
/// to lay the list out in.
pub fn translate_math(
    items: &[AstNode],
    arena: &Arena,
    ctx: &MathContext,
    diags: &mut Diagnostics,
) -> (Vec<MathItem>, Option<Style>) {
    let mut t = Translator {
        arena,
        ctx,
        diags,
        style: None,
    };
    let out = t.list(items);
    let style = t.style;
    (out, style)
}

struct Translator<'a, 'd> {
    arena: &'a Arena,
    ctx: &'a MathContext<'a>,
    diags: &'d mut Diagnostics,
    style: Option<Style>,
}

enum Tok<'a> {
    Char(char),
    Node(&'a AstNode),
}

/// Flattens AST items into characters and nodes.
struct Stream<'a> {
    arena: &'a Arena,
    items: &'a [AstNode],
    idx: usize,
    /// Chars of the current text run, reversed so `pop` walks forward.
    buf: Vec<char>,
}

impl<'a> Stream<'a> {
    fn new(items: &'a [AstNode], arena: &'a Arena) -> Stream<'a> {
        Stream {
            arena,
            items,
            idx: 0,
            buf: Vec::new(),
        }
    }

    fn next(&mut self) -> Option<Tok<'a>> {
        loop {
            if let Some(c) = self.buf.pop() {
                return Some(Tok::Char(c));
            }
            let node = self.items.get(self.idx)?;
            self.idx += 1;
            if let AstNode::Text { text, .. } = node {
                self.buf = self.arena.str(*text).chars().rev().collect();
                continue;
            }
            return Some(Tok::Node(node));
        }
    }

    /// The next token that is not whitespace.
    fn next_solid(&mut self) -> Option<Tok<'a>> {
        loop {
            match self.next()? {
                Tok::Char(c) if c.is_whitespace() => continue,
                tok => return Some(tok),
            }
        }
    }
}

impl Translator<'_, '_> {
    fn list(&mut self, items: &[AstNode]) -> Vec<MathItem> {
        let mut stream = Stream::new(items, self.arena);
        self.run(&mut stream, None)
    }

    /// Main loop; stops at the given closing kind (for `\left...\right`)
    /// or at end of stream.
    fn run(&mut self, stream: &mut Stream, until_right: Option<&mut u32>) -> Vec<MathItem> {
        let mut out: Vec<MathItem> = Vec::new();
        // An infix \over splits the current list; the numerator waits
        // here while the denominator accumulates in `out`.
        let mut stash: Option<(Vec<MathItem>, Option<Scaled>)> = None;
        let mut until_right = until_right;
        while let Some(tok) = stream.next() {
            match tok {
                Tok::Char(c) => self.character(c, stream, &mut out),
                Tok::Node(node) => {
                    if let AstNode::Known { command, .. } = node {
                        match command.kind {
                            CommandKind::RightDelim => {
                                if let Some(cp) = until_right.as_deref_mut() {
                                    if let AstNode::Known { args, .. } = node {
                                        *cp = self.delimiter_code(args.first().map(|a| a.items.as_slice()));
                                    }
                                    return self.finish(out, stash);
                                }
                                self.note(node, "\\right without a matching \\left");
                                continue;
                            }
                            CommandKind::InfixFraction { rule } => {
                                if stash.is_some() {
                                    self.note(node, "multiple \\over in one group");
                                    continue;
                                }
                                let rule = if rule { None } else { Some(Scaled::ZERO) };
                                stash = Some((std::mem::take(&mut out), rule));
                                continue;
                            }
                            _ => {}
                        }
                    }
                    self.node(node, stream, &mut out);
                }
            }
        }
        if until_right.is_some() {
            self.diags.push(Diagnostic::new(
                "math-error",
                Severity::Error,
                "\\left without a matching \\right".into(),
            ));
        }
        self.finish(out, stash)
    }

    fn finish(
        &mut self,
        out: Vec<MathItem>,
        stash: Option<(Vec<MathItem>, Option<Scaled>)>,
    ) -> Vec<MathItem> {
        match stash {
            None => out,
            Some((num, rule)) => vec![MathItem::Fraction(Fraction {
                num: Field::List(num),
                denom: Field::List(out),
                rule,
            })],
        }
    }

    fn character(&mut self, c: char, stream: &mut Stream, out: &mut Vec<MathItem>) {
        match c {
            c if c.is_whitespace() => {}
            '^' => {
                let field = self.script_field(stream);
                attach_script(out, field, true);
            }
            '_' => {
                let field = self.script_field(stream);
                attach_script(out, field, false);
            }
            '\'' => attach_script(out, Field::Symbol(PRIME), true),
            _ => {
                let class = char_class(c);
                out.push(MathItem::Atom(Atom::new(class, Field::Symbol(c as u32))));
            }
        }
    }

    fn node(&mut self, node: &AstNode, stream: &mut Stream, out: &mut Vec<MathItem>) {
        match node {
            AstNode::Group { children, .. } => {
                let items = self.list(&children.items);
                out.push(MathItem::Atom(Atom::new(
                    AtomClass::Ord,
                    Field::List(items),
                )));
            }
            AstNode::Known { command, args, .. } => {
                self.known(command, args, node, stream, out)
            }
            AstNode::Unknown { name, args, .. } => {
                self.diags.push(
                    Diagnostic::new(
                        "unknown-command",
                        Severity::Warning,
                        format!("unknown command \\{name}; its arguments are set as given"),
                    )
                    .with_span(node.span()),
                );
                for arg in args {
                    out.extend(self.list(&arg.items));
                }
            }
            AstNode::Environment { children, .. } => out.extend(self.list(&children.items)),
            AstNode::Math { children, .. } => out.extend(self.list(&children.items)),
            // Alignment structure has no meaning inside a formula.
            AstNode::AlignTab { .. } | AstNode::RowEnd { .. } => {}
            AstNode::Text { .. } => {} // consumed by the stream
        }
    }

    fn known(
        &mut self,
        command: &texast::commands::CommandSpec,
        args: &[texast::Ast],
        node: &AstNode,
        stream: &mut Stream,
        out: &mut Vec<MathItem>,
    ) {
        match command.kind {
            CommandKind::Symbol { codepoint, class } => {
                out.push(MathItem::Atom(Atom::new(
                    atom_class(class),
                    Field::Symbol(codepoint),
                )));
            }
            CommandKind::Literal { codepoint } => {
                out.push(MathItem::Atom(Atom::new(
                    AtomClass::Ord,
                    Field::Symbol(codepoint),
                )));
            }
            CommandKind::Function => {
                let shaper = Shaper::new(self.ctx.table, self.ctx.text_font);
                let b = shaper.text_hbox(command.name, self.diags);
                let mut atom = Atom::new(AtomClass::Op, Field::Box(b));
                atom.limits = Limits::Never;
                out.push(MathItem::Atom(atom));
            }
            CommandKind::Fraction { rule } => {
                let rule = if rule { None } else { Some(Scaled::ZERO) };
                out.push(MathItem::Fraction(Fraction {
                    num: self.arg_field(args, 0),
                    denom: self.arg_field(args, 1),
                    rule,
                }));
            }
            CommandKind::Radical => {
                out.push(MathItem::Radical(Radical {
                    radicand: self.arg_field(args, 0),
                    degree: None,
                    delimiter: SQRT,
                }));
            }
            CommandKind::Accent { codepoint } => {
                let mut atom = Atom::new(AtomClass::Acc, self.arg_field(args, 0));
                atom.sup = Field::Symbol(codepoint);
                out.push(MathItem::Atom(atom));
            }
            CommandKind::LeftDelim => {
                let left = self.delimiter_code(args.first().map(|a| a.items.as_slice()));
                let mut right = 0;
                let inner = self.run(stream, Some(&mut right));
                if left == 0 || right == 0 {
                    // A null delimiter on either side; keep the content
                    // without fences.
                    out.extend(inner);
                } else {
                    out.push(MathItem::Fenced(Fenced { left, right, inner }));
                }
            }
            CommandKind::RightDelim => {} // handled in run()
            CommandKind::SizedDelim { steps } => {
                // \big is 8.5pt total, each step adds 3pt.
                let target = Scaled(557_056) + Scaled(196_608) * (steps as i32 - 1);
                let cp = self.delimiter_code(args.first().map(|a| a.items.as_slice()));
                match math::var_delimiter(cp, target, self.ctx) {
                    Ok(HNode::HBox(b)) => {
                        let class = match command.name.as_bytes().last() {
                            Some(b'l') => AtomClass::Open,
                            Some(b'r') => AtomClass::Close,
                            _ => AtomClass::Ord,
                        };
                        out.push(MathItem::Atom(Atom::new(class, Field::Box(b))));
                    }
                    Ok(_) | Err(_) => {
                        self.math_error(node, format!("no delimiter for U+{cp:04X}"));
                    }
                }
            }
            CommandKind::Style(s) => {
                if out.is_empty() && self.style.is_none() {
                    self.style = Some(match s {
                        MathStyle::Display => Style::DISPLAY,
                        MathStyle::Text => Style::TEXT,
                        MathStyle::Script => Style {
                            size: StyleSize::Script,
                            cramped: false,
                        },
                        MathStyle::ScriptScript => Style {
                            size: StyleSize::ScriptScript,
                            cramped: false,
                        },
                    });
                } else {
                    self.note(node, "mid-list style changes are not applied");
                }
            }
            CommandKind::Limits { on } => {
                if let Some(MathItem::Atom(atom)) = out.last_mut() {
                    atom.limits = if on { Limits::Always } else { Limits::Never };
                }
            }
            CommandKind::Space { em_milli } => {
                // xn_over_d wants a positive multiplier; \! is negative.
                let width = match self.ctx.params.quad.xn_over_d(em_milli.abs(), 1000) {
                    Ok((q, _)) if em_milli < 0 => -q,
                    Ok((q, _)) => q,
                    Err(_) => Scaled::ZERO,
                };
                let b = hbox_natural(vec![HNode::Kern(Kern {
                    width,
                    explicit: true,
                })]);
                out.push(MathItem::Atom(Atom::new(AtomClass::Ord, Field::Box(b))));
            }
            CommandKind::Overline => {
                out.push(MathItem::Atom(Atom::new(
                    AtomClass::Over,
                    self.arg_field(args, 0),
                )));
            }
            CommandKind::Underline => {
                out.push(MathItem::Atom(Atom::new(
                    AtomClass::Under,
                    self.arg_field(args, 0),
                )));
            }
            CommandKind::Box(BoxCommand::HBox | BoxCommand::VBox | BoxCommand::VTop) => {
                // Box contents are text, not math.
                let shaper = Shaper::new(self.ctx.table, self.ctx.text_font);
                let text = self.plain_text(args);
                let b = shaper.text_hbox(&text, self.diags);
                out.push(MathItem::Atom(Atom::new(AtomClass::Ord, Field::Box(b))));
            }
            CommandKind::TextFont(_) => {
                // Single-family setup: the styled content keeps its shape.
                if let Some(arg) = args.first() {
                    out.extend(self.list(&arg.items));
                }
            }
            CommandKind::FontSwitch(_) | CommandKind::Ignored => {}
            CommandKind::Glue(GlueCommand::Mskip | GlueCommand::Mkern) => {
                // The dimension rides in the following text; a thin space
                // is the common case and our approximation.
                let b = hbox_natural(vec![HNode::Kern(Kern {
                    width: self.ctx.mu(3),
                    explicit: true,
                })]);
                out.push(MathItem::Atom(Atom::new(AtomClass::Ord, Field::Box(b))));
            }
            CommandKind::InfixFraction { .. } => {} // handled in run()
            CommandKind::Glue(_)
            | CommandKind::Align(_)
            | CommandKind::Sectioning { .. }
            | CommandKind::Par
            | CommandKind::Discretionary => {
                self.note(node, "not supported inside a formula");
            }
        }
    }

    /// The argument field of `^` or `_`: the next solid token.
    fn script_field(&mut self, stream: &mut Stream) -> Field {
        match stream.next_solid() {
            None => {
                self.diags.push(Diagnostic::new(
                    "math-error",
                    Severity::Error,
                    "script character at the end of a formula".into(),
                ));
                Field::Empty
            }
            Some(Tok::Char(c)) => Field::Symbol(c as u32),
            Some(Tok::Node(AstNode::Group { children, .. })) => {
                Field::List(self.list(&children.items))
            }
            Some(Tok::Node(node)) => {
                let mut items = Vec::new();
                let mut empty = Stream::new(&[], self.arena);
                self.node(node, &mut empty, &mut items);
                Field::List(items)
            }
        }
    }

    /// An argument as a field, collapsing a lone ordinary symbol.
    fn arg_field(&mut self, args: &[texast::Ast], n: usize) -> Field {
        let Some(arg) = args.get(n) else {
            return Field::Empty;
        };
        let items = self.list(&arg.items);
        match items.as_slice() {
            [MathItem::Atom(Atom {
                class: AtomClass::Ord,
                nucleus: Field::Symbol(cp),
                sup: Field::Empty,
                sub: Field::Empty,
                ..
            })] => Field::Symbol(*cp),
            _ => Field::List(items),
        }
    }

    /// The delimiter codepoint named by a `\left`/`\right`/`\bigl`
    /// argument: a single character or a symbol command.
    fn delimiter_code(&mut self, items: Option<&[AstNode]>) -> u32 {
        let Some(items) = items else { return 0 };
        let mut stream = Stream::new(items, self.arena);
        match stream.next_solid() {
            // The period is the null delimiter.
            Some(Tok::Char('.')) => 0,
            Some(Tok::Char(c)) => c as u32,
            Some(Tok::Node(AstNode::Known { command, .. })) => match command.kind {
                CommandKind::Symbol { codepoint, .. } => codepoint,
                _ => 0,
            },
            _ => 0,
        }
    }

    /// The concatenated text content of box arguments.
    fn plain_text(&self, args: &[texast::Ast]) -> String {
        let mut s = String::new();
        for arg in args {
            for item in &arg.items {
                if let AstNode::Text { text, .. } = item {
                    s.push_str(self.arena.str(*text));
                }
            }
        }
        s
    }

    fn note(&mut self, node: &AstNode, message: &str) {
        self.diags.push(
            Diagnostic::new("math-unsupported", Severity::Note, message.into())
                .with_span(node.span()),
        );
    }

    fn math_error(&mut self, node: &AstNode, message: String) {
        self.diags.push(
            Diagnostic::new("math-error", Severity::Error, message).with_span(node.span()),
        );
    }
}

/// Attaches a script to the last atom, wrapping non-atom items.
fn attach_script(out: &mut Vec<MathItem>, field: Field, sup: bool) {
    let needs_wrap = match out.last() {
        Some(MathItem::Atom(atom)) => {
            let slot = if sup { &atom.sup } else { &atom.sub };
            !slot.is_empty()
        }
        Some(_) => true,
        None => false,
    };
    if needs_wrap {
        let inner = out.pop().map(|item| vec![item]).unwrap_or_default();
        out.push(MathItem::Atom(Atom::new(
            AtomClass::Ord,
            Field::List(inner),
        )));
    } else if out.is_empty() {
        out.push(MathItem::Atom(Atom::new(AtomClass::Ord, Field::Empty)));
    }
    if let Some(MathItem::Atom(atom)) = out.last_mut() {
        if sup {
            atom.sup = field;
        } else {
            atom.sub = field;
        }
    }
}

/// Character classification in math mode.
fn char_class(c: char) -> AtomClass {
    match c {
        '+' | '*' => AtomClass::Bin,
        '-' => AtomClass::Bin,
        '=' | '<' | '>' => AtomClass::Rel,
        '(' | '[' => AtomClass::Open,
        ')' | ']' | '!' | '?' => AtomClass::Close,
        ',' | ';' => AtomClass::Punct,
        _ => AtomClass::Ord,
    }
}

/// The table's class alphabet onto the layout crate's.
fn atom_class(class: MathClass) -> AtomClass {
    match class {
        MathClass::Ord => AtomClass::Ord,
        MathClass::Op => AtomClass::Op,
        MathClass::Bin => AtomClass::Bin,
        MathClass::Rel => AtomClass::Rel,
        MathClass::Open => AtomClass::Open,
        MathClass::Close => AtomClass::Close,
        MathClass::Punct => AtomClass::Punct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fonts::{ExtParam, FontId, FontMetrics, FontTable, GlyphMetrics, MathParam, SizedDelimiter};
    use std::sync::Arc;
    use texast::{build, cst};

    struct MathTestFont;

    impl FontMetrics for MathTestFont {
        fn name(&self) -> &str {
            "mathtest10"
        }
        fn at_size(&self) -> Scaled {
            Scaled(655_360)
        }
        fn design_size(&self) -> Scaled {
            Scaled(655_360)
        }
        fn glyph_metrics(&self, codepoint: u32) -> Option<GlyphMetrics> {
            (codepoint < 0x80).then_some(GlyphMetrics {
                advance: Scaled(300_000),
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
        fn math_param(&self, param: MathParam) -> Scaled {
            match param {
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

    /// Parses `$...$` source and translates the formula's contents.
    fn translate(source: &str) -> (Vec<MathItem>, Diagnostics) {
        let mut arena = Arena::new();
        let nodes = cst::parse(source.as_bytes());
        let ast = build(&nodes, source.as_bytes(), &mut arena).unwrap();
        let math = ast
            .items
            .iter()
            .find_map(|n| match n {
                AstNode::Math { children, .. } => Some(children),
                _ => None,
            })
            .expect("no formula in test source");
        let table = {
            let mut t = FontTable::new();
            t.add(Arc::new(MathTestFont));
            t
        };
        let ctx = MathContext::new(&table, FontId(0), FontId(0), FontId(0));
        let mut diags = Diagnostics::new();
        let (items, _) = translate_math(&math.items, &arena, &ctx, &mut diags);
        (items, diags)
    }

    fn atom(item: &MathItem) -> &Atom {
        match item {
            MathItem::Atom(a) => a,
            other => panic!("expected an atom, got {other:?}"),
        }
    }

    #[test]
    fn characters_classify_by_role() {
        let (items, _) = translate("$a+b=c,$");
        let classes: Vec<AtomClass> = items.iter().map(|i| atom(i).class).collect();
        assert_eq!(
            classes,
            vec![
                AtomClass::Ord,
                AtomClass::Bin,
                AtomClass::Ord,
                AtomClass::Rel,
                AtomClass::Ord,
                AtomClass::Punct,
            ]
        );
    }

    #[test]
    fn superscript_attaches_to_previous_atom() {
        let (items, _) = translate("$x^2$");
        assert_eq!(items.len(), 1);
        let a = atom(&items[0]);
        assert_eq!(a.nucleus, Field::Symbol('x' as u32));
        assert_eq!(a.sup, Field::Symbol('2' as u32));
        assert!(a.sub.is_empty());
    }

    #[test]
    fn braced_subscript_becomes_a_list() {
        let (items, _) = translate("$a_{ij}$");
        let a = atom(&items[0]);
        let Field::List(sub) = &a.sub else {
            panic!("expected a list subscript, got {:?}", a.sub);
        };
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn double_superscript_wraps_the_atom() {
        let (items, _) = translate("$x^2^3$");
        // The second script wraps the scripted atom in a new Ord atom.
        assert_eq!(items.len(), 1);
        let outer = atom(&items[0]);
        assert_eq!(outer.sup, Field::Symbol('3' as u32));
        assert!(matches!(outer.nucleus, Field::List(_)));
    }

    #[test]
    fn prime_is_a_superscript() {
        let (items, _) = translate("$f'$");
        let a = atom(&items[0]);
        assert_eq!(a.sup, Field::Symbol(PRIME));
    }

    #[test]
    fn frac_builds_a_fraction_with_the_default_rule() {
        let (items, _) = translate("$\\frac{1}{2}$");
        let MathItem::Fraction(f) = &items[0] else {
            panic!("expected a fraction, got {:?}", items[0]);
        };
        assert_eq!(f.num, Field::Symbol('1' as u32));
        assert_eq!(f.denom, Field::Symbol('2' as u32));
        assert_eq!(f.rule, None);
    }

    #[test]
    fn infix_over_splits_the_group() {
        let (items, _) = translate("${a \\over b}$");
        let a = atom(&items[0]);
        let Field::List(inner) = &a.nucleus else {
            panic!("expected a group nucleus");
        };
        assert_eq!(inner.len(), 1);
        let MathItem::Fraction(f) = &inner[0] else {
            panic!("expected a fraction from \\over");
        };
        assert_eq!(f.rule, None);
        let (items, _) = translate("${a \\atop b}$");
        let Field::List(inner) = &atom(&items[0]).nucleus else {
            panic!("expected a group nucleus");
        };
        let MathItem::Fraction(f) = &inner[0] else {
            panic!("expected a fraction from \\atop");
        };
        assert_eq!(f.rule, Some(Scaled::ZERO));
    }

    #[test]
    fn left_right_collect_a_fenced_group() {
        let (items, _) = translate("$\\left( x+y \\right)$");
        let MathItem::Fenced(f) = &items[0] else {
            panic!("expected a fenced group, got {:?}", items[0]);
        };
        assert_eq!(f.left, '(' as u32);
        assert_eq!(f.right, ')' as u32);
        assert_eq!(f.inner.len(), 3);
    }

    #[test]
    fn missing_right_reports_and_keeps_content() {
        let (items, diags) = translate("$\\left( x$");
        assert!(diags.items().iter().any(|d| d.code == "math-error"));
        // The content survives unfenced.
        assert!(!items.is_empty());
    }

    #[test]
    fn sqrt_builds_a_radical() {
        let (items, _) = translate("$\\sqrt{x}$");
        let MathItem::Radical(r) = &items[0] else {
            panic!("expected a radical, got {:?}", items[0]);
        };
        assert_eq!(r.delimiter, SQRT);
        assert_eq!(r.radicand, Field::Symbol('x' as u32));
    }

    #[test]
    fn named_symbols_carry_their_codepoint_and_class() {
        let (items, _) = translate("$\\alpha \\leq \\beta$");
        assert_eq!(atom(&items[0]).nucleus, Field::Symbol(0x03B1));
        assert_eq!(atom(&items[1]).class, AtomClass::Rel);
        assert_eq!(atom(&items[2]).nucleus, Field::Symbol(0x03B2));
    }

    #[test]
    fn accents_ride_in_the_superscript_field() {
        let (items, _) = translate("$\\hat{x}$");
        let a = atom(&items[0]);
        assert_eq!(a.class, AtomClass::Acc);
        assert_eq!(a.nucleus, Field::Symbol('x' as u32));
        assert!(matches!(a.sup, Field::Symbol(_)));
    }

    #[test]
    fn operator_names_are_boxed_ops_without_limits() {
        let (items, _) = translate("$\\sin x$");
        let a = atom(&items[0]);
        assert_eq!(a.class, AtomClass::Op);
        assert_eq!(a.limits, Limits::Never);
        assert!(matches!(a.nucleus, Field::Box(_)));
    }

    #[test]
    fn unknown_commands_warn_and_keep_arguments() {
        let (items, diags) = translate("$\\mystery{x}$");
        assert!(diags.items().iter().any(|d| d.code == "unknown-command"));
        assert_eq!(items.len(), 1);
        assert_eq!(atom(&items[0]).nucleus, Field::Symbol('x' as u32));
    }

    #[test]
    fn leading_displaystyle_returns_a_style_override() {
        let mut arena = Arena::new();
        let source = b"$\\displaystyle x$";
        let nodes = cst::parse(source);
        let ast = build(&nodes, source, &mut arena).unwrap();
        let AstNode::Math { children, .. } = &ast.items[0] else {
            panic!("expected a formula");
        };
        let table = {
            let mut t = FontTable::new();
            t.add(Arc::new(MathTestFont));
            t
        };
        let ctx = MathContext::new(&table, FontId(0), FontId(0), FontId(0));
        let mut diags = Diagnostics::new();
        let (items, style) = translate_math(&children.items, &arena, &ctx, &mut diags);
        assert_eq!(style, Some(Style::DISPLAY));
        assert_eq!(items.len(), 1);
    }
}
