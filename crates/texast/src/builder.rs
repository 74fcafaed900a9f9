//! CST to AST.
//!
//! The builder resolves commands, captures their arguments, interns text
//! runs in the job arena, and tracks the ambient mode with a small
//! stack. It is strict exactly where the contract demands: unbalanced
//! environments and missing arguments fail the build with the offending
//! span; everything else (unknown commands included) survives into the
//! AST for downstream components to judge.

use arena::{Arena, ArenaError};
use log::trace;

use crate::ast::{Ast, AstNode, Mode};
use crate::commands::{lookup, AlignCommand, CommandKind};
use crate::cst::{CstKind, CstNode, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// A `\begin` with no matching `\end`, or the reverse.
    UnbalancedEnvironment { name: String },
    /// A command ended the input (or its group) before its arguments.
    MissingArgument { command: String },
    Arena(ArenaError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub span: Span,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            BuildErrorKind::UnbalancedEnvironment { name } => {
                write!(f, "unbalanced environment `{name}`")
            }
            BuildErrorKind::MissingArgument { command } => {
                write!(f, "missing argument of \\{command}")
            }
            BuildErrorKind::Arena(e) => e.fmt(f),
        }?;
        write!(f, " at bytes {}..{}", self.span.start, self.span.end)
    }
}

impl std::error::Error for BuildError {}

/// Builds the AST for a parsed source. Text payloads land in `arena`.
pub fn build(cst: &[CstNode], source: &[u8], arena: &mut Arena) -> Result<Ast, BuildError> {
    let mut builder = Builder {
        source,
        arena,
        modes: vec![Mode::Text],
    };
    Ok(Ast {
        items: builder.nodes(cst)?,
    })
}

struct Builder<'s, 'a> {
    source: &'s [u8],
    arena: &'a mut Arena,
    modes: Vec<Mode>,
}

/// Environments whose body is math.
pub const MATH_ENVIRONMENTS: &[&str] = &[
    "math",
    "displaymath",
    "equation",
    "equation*",
    "align",
    "align*",
    "eqnarray",
    "gather",
    "gather*",
];

impl Builder<'_, '_> {
    fn mode(&self) -> Mode {
        *self.modes.last().unwrap_or(&Mode::Text)
    }

    fn intern(&mut self, span: Span) -> Result<AstNode, BuildError> {
        let text = String::from_utf8_lossy(&self.source[span.start..span.end]);
        let text = self
            .arena
            .alloc_str(&text)
            .map_err(|e| BuildError {
                kind: BuildErrorKind::Arena(e),
                span,
            })?;
        Ok(AstNode::Text {
            text,
            mode: self.mode(),
            span,
        })
    }

    fn nodes(&mut self, cst: &[CstNode]) -> Result<Vec<AstNode>, BuildError> {
        let mut out = Vec::new();
        let mut i = 0;
        while let Some(node) = cst.get(i) {
            i += 1;
            match &node.kind {
                CstKind::Text => out.push(self.intern(node.span)?),
                CstKind::Command { name } => {
                    self.command(name, node.span, cst, &mut i, &mut out)?;
                }
                CstKind::Group => {
                    let children = Ast {
                        items: self.nodes(&node.children)?,
                    };
                    out.push(AstNode::Group {
                        children,
                        span: node.span,
                    });
                }
                CstKind::InlineMath | CstKind::DisplayMath => {
                    let display = node.kind == CstKind::DisplayMath;
                    self.modes.push(Mode::Math);
                    let children = Ast {
                        items: self.nodes(&node.children)?,
                    };
                    self.modes.pop();
                    out.push(AstNode::Math {
                        display,
                        children,
                        span: node.span,
                    });
                }
                CstKind::Environment { name, closed } => {
                    if !closed {
                        return Err(BuildError {
                            kind: BuildErrorKind::UnbalancedEnvironment { name: name.clone() },
                            span: node.span,
                        });
                    }
                    let is_math = MATH_ENVIRONMENTS.contains(&name.as_str());
                    if is_math {
                        self.modes.push(Mode::Math);
                    }
                    let children = Ast {
                        items: self.nodes(&node.children)?,
                    };
                    if is_math {
                        self.modes.pop();
                    }
                    out.push(AstNode::Environment {
                        name: name.clone(),
                        children,
                        span: node.span,
                    });
                }
                CstKind::AlignTab => out.push(AstNode::AlignTab { span: node.span }),
                CstKind::RowEnd => {
                    self.leave_preamble();
                    out.push(AstNode::RowEnd { span: node.span });
                }
            }
        }
        Ok(out)
    }

    /// The first row end inside an alignment closes the template.
    fn leave_preamble(&mut self) {
        if let Some(top) = self.modes.last_mut() {
            if *top == Mode::Preamble {
                *top = Mode::Text;
            }
        }
    }

    fn command(
        &mut self,
        name: &str,
        span: Span,
        cst: &[CstNode],
        i: &mut usize,
        out: &mut Vec<AstNode>,
    ) -> Result<(), BuildError> {
        // A mismatched \end arrives from the reader as a pseudo-command.
        if let Some(env) = name.strip_prefix("end") {
            if !env.is_empty() && lookup(name).is_none() {
                return Err(BuildError {
                    kind: BuildErrorKind::UnbalancedEnvironment {
                        name: env.to_string(),
                    },
                    span,
                });
            }
        }
        let Some(spec) = lookup(name) else {
            trace!("unknown command \\{name}, capturing trailing groups");
            let mut args = Vec::new();
            while let Some(next) = cst.get(*i) {
                if next.kind != CstKind::Group {
                    break;
                }
                args.push(Ast {
                    items: self.nodes(&next.children)?,
                });
                *i += 1;
            }
            out.push(AstNode::Unknown {
                name: name.to_string(),
                args,
                span,
            });
            return Ok(());
        };

        if let CommandKind::Align(AlignCommand::Cr | AlignCommand::CrCr) = spec.kind {
            self.leave_preamble();
        }
        let template_arg = matches!(
            spec.kind,
            CommandKind::Align(AlignCommand::Halign | AlignCommand::Valign)
        );

        let mut args = Vec::new();
        let mut spill = Vec::new();
        for n in 0..spec.arity {
            if template_arg && n == 0 {
                self.modes.push(Mode::Preamble);
            }
            let arg = self.capture_arg(name, span, cst, i, &mut spill);
            if template_arg && n == 0 {
                self.modes.pop();
            }
            args.push(arg?);
        }
        out.push(AstNode::Known {
            command: spec,
            args,
            span,
        });
        // Anything left over from splitting a text run resumes after the
        // command node.
        out.append(&mut spill);
        Ok(())
    }

    /// Captures one argument: a group, a single command token, or the
    /// first character of a text run (the rest of the run spills back
    /// into the stream).
    fn capture_arg(
        &mut self,
        command: &str,
        command_span: Span,
        cst: &[CstNode],
        i: &mut usize,
        spill: &mut Vec<AstNode>,
    ) -> Result<Ast, BuildError> {
        let missing = |span| BuildError {
            kind: BuildErrorKind::MissingArgument {
                command: command.to_string(),
            },
            span,
        };
        loop {
            let Some(node) = cst.get(*i) else {
                return Err(missing(command_span));
            };
            match &node.kind {
                CstKind::Group => {
                    *i += 1;
                    return Ok(Ast {
                        items: self.nodes(&node.children)?,
                    });
                }
                CstKind::Text => {
                    let raw = &self.source[node.span.start..node.span.end];
                    let text = String::from_utf8_lossy(raw);
                    let trimmed = text.trim_start();
                    let Some(c) = trimmed.chars().next() else {
                        // Whitespace only; the argument is further along.
                        *i += 1;
                        continue;
                    };
                    *i += 1;
                    let offset = text.len() - trimmed.len();
                    let start = node.span.start + offset;
                    let arg_span = Span::new(start, start + c.len_utf8());
                    let arg = self.intern(arg_span)?;
                    let rest = Span::new(arg_span.end, node.span.end);
                    if rest.start < rest.end {
                        spill.push(self.intern(rest)?);
                    }
                    return Ok(Ast { items: vec![arg] });
                }
                CstKind::Command { name } => {
                    // A bare control sequence is a one-token argument
                    // (\hat\alpha, \left\langle).
                    *i += 1;
                    let name = name.clone();
                    let mut items = Vec::new();
                    self.command(&name, node.span, cst, i, &mut items)?;
                    return Ok(Ast { items });
                }
                _ => return Err(missing(node.span)),
            }
        }
    }
}
