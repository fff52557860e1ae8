// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexing and parsing for Sable source text.
//!
//! This module contains the syntactic front end: a full-fidelity lexer, a
//! recursive-descent parser with speculative disambiguation, and the syntax
//! tree they produce. The pipeline is:
//!
//! ```text
//! Source text → Lexer → Tokens (with trivia) → Parser → Syntax tree + diagnostics
//! ```
//!
//! Two properties hold unconditionally, for well-formed and malformed input
//! alike:
//!
//! - **Totality.** Parsing never fails. Every input produces a complete
//!   tree; errors surface as [`Diagnostic`]s and as missing or skipped
//!   tokens inside the tree.
//! - **Exact reconstruction.** `node.to_string()` reproduces the consumed
//!   source text byte for byte, trivia included.
//!
//! # Examples
//!
//! ```
//! use sable_core::syntax::{ParseOptions, parse_expression};
//!
//! let (expr, diagnostics) = parse_expression("a + b * c", 0, &ParseOptions::default());
//! assert!(diagnostics.is_empty());
//! assert_eq!(expr.to_string(), "a + b * c");
//! ```

pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;
pub mod tree;

pub use diagnostics::{Diagnostic, ErrorCode, Severity, SyntaxError, diagnostics_in};
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::Span;
pub use token::{ContextualKeyword, Keyword, LiteralValue, Token, TokenKind, Trivia};
pub use tree::{
    Block, CompilationUnit, Expression, Name, Pattern, Statement, SyntaxKind, TokenWalk, Type,
};

/// Whether the lexer recognizes `///` doc comments as distinct trivia.
///
/// Skipping documentation folds `///` runs into ordinary line-comment
/// trivia, which is cheaper when callers don't need them. Source
/// reconstruction is unaffected either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentationMode {
    /// Recognize doc comments as [`Trivia::DocComment`].
    #[default]
    Parse,
    /// Treat doc comments as plain line comments.
    Skip,
}

/// The language level the parser accepts.
///
/// Later levels are strict supersets of earlier ones. Constructs above the
/// configured level still parse (the tree shape is identical) but carry a
/// [`ErrorCode::FeatureNotAvailable`] diagnostic, so tooling on older
/// levels sees the same tree a newer compiler would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LanguageLevel {
    /// The base language.
    V1,
    /// Adds ranges (`..`), `??=`, using-declarations, and target-typed
    /// `new`.
    V2,
    /// Adds `>>>`, raw interpolated strings, and `await foreach`.
    #[default]
    V3,
}

impl LanguageLevel {
    /// Returns the level's display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2 => "V2",
            Self::V3 => "V3",
        }
    }
}

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// The accepted language level.
    pub language_level: LanguageLevel,
    /// Doc-comment handling.
    pub documentation: DocumentationMode,
}

/// Parses a single expression from `source`, starting at byte `offset`.
///
/// Spans in the tree and diagnostics are absolute within `source`, so a
/// caller embedding a snippet in a larger document gets correct positions
/// for free. Tokens after the expression are not consumed; parsing a
/// complete input is the job of [`parse_compilation_unit`]. Never fails:
/// malformed input yields a tree with missing/skipped tokens plus
/// diagnostics.
#[must_use]
pub fn parse_expression(
    source: &str,
    offset: usize,
    options: &ParseOptions,
) -> (Expression, Vec<Diagnostic>) {
    tracing::debug!(len = source.len(), offset, "parsing expression");
    let (tokens, diagnostics) = Lexer::new(source, offset, options.documentation).lex();
    let mut parser = Parser::new(source, tokens, diagnostics, *options);
    let expr = parser.parse_expression_root();
    (expr, parser.finish())
}

/// Parses a single statement from `source`, starting at byte `offset`.
///
/// Tokens after the statement are not consumed. Never fails.
#[must_use]
pub fn parse_statement(
    source: &str,
    offset: usize,
    options: &ParseOptions,
) -> (Statement, Vec<Diagnostic>) {
    tracing::debug!(len = source.len(), offset, "parsing statement");
    let (tokens, diagnostics) = Lexer::new(source, offset, options.documentation).lex();
    let mut parser = Parser::new(source, tokens, diagnostics, *options);
    let stmt = parser.parse_statement_root();
    (stmt, parser.finish())
}

/// Parses source text from byte `offset` to the end as a sequence of
/// statements.
///
/// Consumes every token; anything unparseable is preserved in the tree as
/// skipped trivia, so the returned unit reconstructs `source[offset..]`
/// exactly.
#[must_use]
pub fn parse_compilation_unit(
    source: &str,
    offset: usize,
    options: &ParseOptions,
) -> (CompilationUnit, Vec<Diagnostic>) {
    tracing::debug!(len = source.len(), offset, "parsing compilation unit");
    let (tokens, diagnostics) = Lexer::new(source, offset, options.documentation).lex();
    let mut parser = Parser::new(source, tokens, diagnostics, *options);
    let unit = parser.parse_compilation_unit();
    (unit, parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_levels_are_ordered() {
        assert!(LanguageLevel::V1 < LanguageLevel::V2);
        assert!(LanguageLevel::V2 < LanguageLevel::V3);
        assert_eq!(LanguageLevel::default(), LanguageLevel::V3);
    }

    #[test]
    fn parse_expression_round_trips() {
        let (expr, diagnostics) = parse_expression("1 + 2 * 3", 0, &ParseOptions::default());
        assert!(diagnostics.is_empty());
        assert_eq!(expr.to_string(), "1 + 2 * 3");
    }

    #[test]
    fn parse_expression_at_offset_keeps_spans_absolute() {
        let source = "xx 1 + 2";
        let (expr, diagnostics) = parse_expression(source, 3, &ParseOptions::default());
        assert!(diagnostics.is_empty());
        assert_eq!(expr.to_string(), "1 + 2");
        assert_eq!(expr.span(), Span::new(3, 8));
    }

    #[test]
    fn parse_compilation_unit_round_trips_malformed_input() {
        let source = "int x = ; while) { }";
        let (unit, diagnostics) = parse_compilation_unit(source, 0, &ParseOptions::default());
        assert!(!diagnostics.is_empty());
        assert_eq!(unit.to_string(), source);
    }
}
