//! The concrete-syntax-tree contract, plus a stand-in reader.
//!
//! The builder consumes [`CstNode`] values and does not care who made
//! them. [`parse`] is a deliberately small reader that covers the syntax
//! the pipeline exercises: control sequences, braced groups,
//! `\begin`/`\end` environments, `$`/`$$` math shifts, alignment tabs,
//! row ends, and `%` comments. It is forgiving; structural validation
//! (balanced environments, argument counts) belongs to the builder.

/// A half-open byte range into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    /// The smallest span covering both.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CstKind {
    /// A maximal run of ordinary characters, including spaces.
    Text,
    /// A control sequence, without its backslash.
    Command { name: String },
    /// A `{...}` group; the delimiters are not children.
    Group,
    /// `\begin{name} ... \end{name}`. `closed` is false when the end of
    /// input arrived first; the builder turns that into an error.
    Environment { name: String, closed: bool },
    /// `$...$`.
    InlineMath,
    /// `$$...$$`.
    DisplayMath,
    /// `&`.
    AlignTab,
    /// `\\`.
    RowEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstNode {
    pub kind: CstKind,
    pub span: Span,
    pub children: Vec<CstNode>,
}

impl CstNode {
    fn leaf(kind: CstKind, span: Span) -> CstNode {
        CstNode {
            kind,
            span,
            children: Vec::new(),
        }
    }
}

/// Reads `source` into a CST. Never fails: an unclosed group, math shift
/// or environment simply extends to the end of the input, and a stray
/// closing brace is treated as text.
pub fn parse(source: &[u8]) -> Vec<CstNode> {
    let mut reader = Reader { source, pos: 0 };
    reader.nodes(&mut Vec::new())
}

struct Reader<'a> {
    source: &'a [u8],
    pos: usize,
}

/// What the current nesting level is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Closer {
    Brace,
    Math { display: bool },
    Environment(String),
}

impl Reader<'_> {
    /// Reads nodes until the innermost closer (or end of input). The
    /// closer itself is consumed; `closers` is popped by the caller.
    fn nodes(&mut self, closers: &mut Vec<Closer>) -> Vec<CstNode> {
        let mut out = Vec::new();
        while let Some(&byte) = self.source.get(self.pos) {
            let start = self.pos;
            match byte {
                b'%' => {
                    while !matches!(self.source.get(self.pos), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                b'{' => {
                    self.pos += 1;
                    closers.push(Closer::Brace);
                    let children = self.nodes(closers);
                    out.push(CstNode {
                        kind: CstKind::Group,
                        span: Span::new(start, self.pos),
                        children,
                    });
                }
                b'}' => {
                    if closers.last() == Some(&Closer::Brace) {
                        self.pos += 1;
                        closers.pop();
                        return out;
                    }
                    // Stray closer: keep it as text.
                    self.pos += 1;
                    out.push(CstNode::leaf(CstKind::Text, Span::new(start, self.pos)));
                }
                b'$' => {
                    let display = self.source.get(self.pos + 1) == Some(&b'$');
                    let width = if display { 2 } else { 1 };
                    if matches!(closers.last(), Some(Closer::Math { .. })) {
                        self.pos += width;
                        closers.pop();
                        return out;
                    }
                    self.pos += width;
                    closers.push(Closer::Math { display });
                    let children = self.nodes(closers);
                    let kind = if display {
                        CstKind::DisplayMath
                    } else {
                        CstKind::InlineMath
                    };
                    out.push(CstNode {
                        kind,
                        span: Span::new(start, self.pos),
                        children,
                    });
                }
                b'&' => {
                    self.pos += 1;
                    out.push(CstNode::leaf(CstKind::AlignTab, Span::new(start, self.pos)));
                }
                b'\\' => {
                    let name = self.control_sequence();
                    let span = Span::new(start, self.pos);
                    match name.as_str() {
                        "\\" => out.push(CstNode::leaf(CstKind::RowEnd, span)),
                        "begin" => {
                            let env = self.brace_word().unwrap_or_default();
                            closers.push(Closer::Environment(env.clone()));
                            let depth = closers.len();
                            let children = self.nodes(closers);
                            // nodes() pops the closer when it sees the
                            // matching \end.
                            let closed = closers.len() < depth;
                            if !closed {
                                closers.pop();
                            }
                            out.push(CstNode {
                                kind: CstKind::Environment { name: env, closed },
                                span: Span::new(start, self.pos),
                                children,
                            });
                        }
                        "end" => {
                            let env = self.brace_word().unwrap_or_default();
                            if closers.last() == Some(&Closer::Environment(env.clone())) {
                                closers.pop();
                                return out;
                            }
                            // Mismatched \end: surface it to the builder.
                            out.push(CstNode::leaf(
                                CstKind::Command {
                                    name: format!("end{env}"),
                                },
                                Span::new(start, self.pos),
                            ));
                        }
                        _ => out.push(CstNode::leaf(CstKind::Command { name }, span)),
                    }
                }
                _ => {
                    while let Some(&b) = self.source.get(self.pos) {
                        if matches!(b, b'%' | b'{' | b'}' | b'$' | b'&' | b'\\') {
                            break;
                        }
                        self.pos += 1;
                    }
                    out.push(CstNode::leaf(CstKind::Text, Span::new(start, self.pos)));
                }
            }
        }
        out
    }

    /// Consumes a `\` and its name: a run of ASCII letters, or a single
    /// non-letter byte.
    fn control_sequence(&mut self) -> String {
        self.pos += 1; // the backslash
        let start = self.pos;
        while matches!(self.source.get(self.pos), Some(b) if b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos == start && self.pos < self.source.len() {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.source[start..self.pos]).into_owned()
    }

    /// Consumes `{word}` after `\begin`/`\end`, returning the word.
    fn brace_word(&mut self) -> Option<String> {
        if self.source.get(self.pos) != Some(&b'{') {
            return None;
        }
        self.pos += 1;
        let start = self.pos;
        while !matches!(self.source.get(self.pos), None | Some(b'}')) {
            self.pos += 1;
        }
        let word = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
        if self.source.get(self.pos) == Some(&b'}') {
            self.pos += 1;
        }
        Some(word)
    }
}
