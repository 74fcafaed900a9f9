//! Semantic nodes.
//!
//! The AST keeps source spans everywhere so downstream diagnostics can
//! point back into the input. Text payloads are interned in the job
//! arena; the AST itself only carries handles.

use arena::StrHandle;

use crate::commands::CommandSpec;
use crate::cst::Span;

/// What surrounds a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Math,
    /// Inside an alignment template, before the first row.
    Preamble,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub items: Vec<AstNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// A run of ordinary characters and the mode it appeared in.
    Text {
        text: StrHandle,
        mode: Mode,
        span: Span,
    },
    /// A command resolved against the fixed table, with its captured
    /// arguments.
    Known {
        command: &'static CommandSpec,
        args: Vec<Ast>,
        span: Span,
    },
    /// A command the table does not know. Consecutive groups after it
    /// are captured as arguments so downstream components see the whole
    /// construct when they refuse it.
    Unknown {
        name: String,
        args: Vec<Ast>,
        span: Span,
    },
    Group {
        children: Ast,
        span: Span,
    },
    Math {
        display: bool,
        children: Ast,
        span: Span,
    },
    Environment {
        name: String,
        children: Ast,
        span: Span,
    },
    /// `&` in an alignment body or preamble.
    AlignTab {
        span: Span,
    },
    /// `\\` (and `\cr` arrives as a Known node).
    RowEnd {
        span: Span,
    },
}

impl AstNode {
    pub fn span(&self) -> Span {
        match self {
            AstNode::Text { span, .. }
            | AstNode::Known { span, .. }
            | AstNode::Unknown { span, .. }
            | AstNode::Group { span, .. }
            | AstNode::Math { span, .. }
            | AstNode::Environment { span, .. }
            | AstNode::AlignTab { span }
            | AstNode::RowEnd { span } => *span,
        }
    }
}
