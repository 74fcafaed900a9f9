//! The semantic TeX tree and its builder.
//!
//! The pipeline does not parse TeX source itself; an external parser
//! produces a concrete syntax tree and the [`build`] function turns that
//! CST into an AST of semantic nodes. Commands are resolved against a
//! fixed table ([`commands`]); anything not in the table survives as an
//! opaque node so downstream components can refuse it with a clear
//! diagnostic instead of this crate guessing.
//!
//! [`cst`] defines the CST contract and ships a small reader for it, used
//! by the command-line driver and the tests.

pub mod ast;
pub mod builder;
pub mod commands;
pub mod cst;

pub use ast::{Ast, AstNode, Mode};
pub use builder::{build, BuildError, BuildErrorKind, MATH_ENVIRONMENTS};
pub use cst::{CstKind, CstNode, Span};
