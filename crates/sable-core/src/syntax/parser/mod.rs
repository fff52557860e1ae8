// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Sable source code.
//!
//! The parser builds a full-fidelity syntax tree from a token stream. It is
//! designed for IDE use with comprehensive error recovery and diagnostics.
//!
//! # Design Philosophy
//!
//! - **Error recovery is mandatory** - the parser MUST always produce a tree
//! - **Multiple errors** - report all errors, don't stop at the first
//! - **Precise spans** - every diagnostic points to an exact source location
//! - **Exact reconstruction** - the tree reproduces the input byte for byte
//!
//! # Error recovery
//!
//! Three mechanisms keep the tree complete on malformed input:
//!
//! 1. **Missing tokens.** When the grammar requires a token that isn't
//!    there, [`Parser::expect`] synthesizes a zero-width token flagged
//!    `is_missing` and records a diagnostic, then parsing continues.
//! 2. **Skipped tokens.** A token that fits nowhere is wrapped as
//!    [`Trivia::Skipped`] and attached to the leading trivia of the next
//!    token, so reconstruction stays lossless.
//! 3. **Synchronization points.** After an unparseable statement the parser
//!    skips forward to a statement boundary (`;`, `}`, or a statement
//!    keyword) before trying again.
//!
//! # Speculative parsing
//!
//! Ambiguous constructs (`A<B> c` vs `a < b > c`, cast vs parenthesized
//! expression, lambda vs tuple) are resolved by checkpointing the cursor,
//! attempting one interpretation, and rolling back when it doesn't commit.
//! Rollback also undoes `>`-token splits, so speculation composes.

use super::diagnostics::{Diagnostic, ErrorCode};
use super::token::{Token, TokenKind, Trivia};
use super::tree::{CompilationUnit, Expression, Name, Statement};
use super::{LanguageLevel, ParseOptions, Span};

mod disambiguation;
mod expressions;
mod interpolation;
mod precedence;
mod statements;

#[cfg(test)]
mod property_tests;

/// Maximum expression nesting depth before the parser refuses to recurse
/// further.
///
/// As a second line of defence, `stacker::maybe_grow` is used at the
/// expression entry point so that deeply nested (but within-limit) input
/// cannot overflow the stack.
const MAX_NESTING_DEPTH: usize = 64;

/// A saved parser position for speculative parsing.
///
/// Restoring a checkpoint rewinds the cursor, drops diagnostics recorded
/// since the save, and undoes any `>`-token splits performed since.
#[derive(Debug, Clone, Copy)]
pub(super) struct Checkpoint {
    current: usize,
    diagnostics_len: usize,
    splits_len: usize,
}

/// An undo-log entry for a split `>`-family token.
#[derive(Debug)]
struct SplitUndo {
    index: usize,
    original: Token,
}

/// The Sable parser.
///
/// Holds the token stream (always terminated by an EOF token), a cursor,
/// and the diagnostic bag. Submodules add `impl` blocks for expressions,
/// statements, disambiguation, and interpolated strings.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    current: usize,
    diagnostics: Vec<Diagnostic>,
    options: ParseOptions,
    nesting_depth: usize,
    splits: Vec<SplitUndo>,
}

impl<'src> Parser<'src> {
    /// Creates a parser over a lexed token stream.
    ///
    /// `diagnostics` seeds the bag with the lexer's diagnostics so callers
    /// get one combined, ordered list. The stream must end with an EOF
    /// token, which the lexer guarantees.
    #[must_use]
    pub fn new(
        source: &'src str,
        tokens: Vec<Token>,
        diagnostics: Vec<Diagnostic>,
        options: ParseOptions,
    ) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind().is_eof()),
            "token stream must end with EOF"
        );
        Self {
            source,
            tokens,
            current: 0,
            diagnostics,
            options,
            nesting_depth: 0,
            splits: Vec::new(),
        }
    }

    /// Consumes the parser and returns the accumulated diagnostics.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Parses a single expression, leaving any trailing tokens unconsumed.
    pub fn parse_expression_root(&mut self) -> Expression {
        self.parse_expression()
    }

    /// Parses a single statement, leaving any trailing tokens unconsumed.
    pub fn parse_statement_root(&mut self) -> Statement {
        self.parse_statement()
    }

    /// Parses the whole token stream as a statement sequence.
    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            let before = self.current;
            statements.push(self.parse_statement());
            // Forward progress is an invariant; if a statement consumed
            // nothing, skip the offending token rather than loop.
            if self.current == before && !self.is_at_end() {
                let token = self.advance();
                self.error_with_args(
                    ErrorCode::UnexpectedToken,
                    token.span(),
                    [token.text().to_owned()],
                );
                self.attach_skipped(token);
            }
        }
        let eof = self.advance();
        CompilationUnit { statements, eof }
    }

    // ========================================================================
    // Cursor primitives
    // ========================================================================

    /// Returns the current token without consuming it.
    pub(super) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub(super) fn current_kind(&self) -> TokenKind {
        self.current_token().kind()
    }

    /// Returns the token `offset` positions ahead (clamped to EOF).
    pub(super) fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Returns `true` if the cursor is at the EOF token.
    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Consumes and returns the current token.
    ///
    /// At EOF this returns a clone of the EOF token without moving, so the
    /// parser can never run off the end of the stream.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !token.kind().is_eof() {
            self.current += 1;
        }
        token
    }

    /// Returns `true` if the current token has the given kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Returns the end offset of the last consumed token, or the start of
    /// the current token when nothing has been consumed yet.
    ///
    /// Missing tokens are synthesized here so they sit flush against the
    /// text that precedes them.
    pub(super) fn previous_end(&self) -> u32 {
        if self.current == 0 {
            self.current_token().span().start()
        } else {
            self.tokens[self.current - 1].span().end()
        }
    }

    /// Synthesizes a zero-width missing token of `kind` at the current
    /// position.
    pub(super) fn missing_token(&self, kind: TokenKind) -> Token {
        Token::missing(kind, self.previous_end())
    }

    /// Consumes a token of `kind`, or synthesizes a missing one and records
    /// a [`ErrorCode::TokenExpected`] diagnostic.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Token {
        if let Some(token) = self.eat(kind) {
            return token;
        }
        let missing = self.missing_token(kind);
        let text = kind.fixed_text().unwrap_or("?");
        self.error_with_args(ErrorCode::TokenExpected, missing.span(), [text]);
        missing
    }

    /// Consumes a token of `kind`, or synthesizes a missing one and records
    /// a diagnostic with the given code.
    pub(super) fn expect_with_code(&mut self, kind: TokenKind, code: ErrorCode) -> Token {
        if let Some(token) = self.eat(kind) {
            return token;
        }
        let missing = self.missing_token(kind);
        self.error(code, missing.span());
        missing
    }

    /// Consumes the given reserved keyword, or synthesizes a missing one
    /// and records a [`ErrorCode::TokenExpected`] diagnostic.
    pub(super) fn expect_keyword(
        &mut self,
        keyword: crate::syntax::token::Keyword,
        text: &'static str,
    ) -> Token {
        if let Some(token) = self.eat(TokenKind::Keyword(keyword)) {
            return token;
        }
        let missing = self.missing_token(TokenKind::Keyword(keyword));
        self.error_with_args(ErrorCode::TokenExpected, missing.span(), [text]);
        missing
    }

    /// Consumes an identifier tagged with the given contextual keyword, or
    /// synthesizes a missing identifier and records a diagnostic naming the
    /// expected word.
    pub(super) fn expect_contextual(
        &mut self,
        keyword: crate::syntax::token::ContextualKeyword,
        text: &'static str,
    ) -> Token {
        if self.current_token().is_contextual(keyword) {
            return self.advance();
        }
        let missing = self.missing_token(TokenKind::Identifier);
        self.error_with_args(ErrorCode::TokenExpected, missing.span(), [text]);
        missing
    }

    /// Consumes an identifier, or synthesizes a missing one with
    /// [`ErrorCode::IdentifierExpected`].
    pub(super) fn expect_identifier(&mut self) -> Token {
        self.expect_with_code(TokenKind::Identifier, ErrorCode::IdentifierExpected)
    }

    /// Consumes a `;`, or synthesizes a missing one with
    /// [`ErrorCode::SemicolonExpected`].
    pub(super) fn expect_semicolon(&mut self) -> Token {
        self.expect_with_code(TokenKind::Semicolon, ErrorCode::SemicolonExpected)
    }

    // ========================================================================
    // Token splitting
    // ========================================================================

    /// Splits a leading `>` off the current `>`-family token and returns it.
    ///
    /// The lexer applies maximal munch, so `List<List<int>>` ends with one
    /// `>>` token. When the type grammar needs a single `>`, the first
    /// character is split off (keeping the original leading trivia) and the
    /// remainder replaces the current token in place. The split is recorded
    /// in an undo log so checkpoint rollback stays sound.
    ///
    /// Callers must check [`TokenKind::starts_with_greater`] first; a plain
    /// `>` is consumed whole.
    pub(super) fn split_greater(&mut self) -> Token {
        let original = self.current_token().clone();
        debug_assert!(original.kind().starts_with_greater());
        if original.kind() == TokenKind::Greater {
            return self.advance();
        }

        let remainder_kind = match original.kind() {
            TokenKind::GreaterEquals => TokenKind::Equals,
            TokenKind::GreaterGreater => TokenKind::Greater,
            TokenKind::GreaterGreaterEquals => TokenKind::GreaterEquals,
            TokenKind::GreaterGreaterGreater => TokenKind::GreaterGreater,
            _ => TokenKind::GreaterGreaterEquals, // `>>>=` minus its first `>`
        };

        let start = original.span().start();
        let mut first = Token::new(TokenKind::Greater, ">", Span::new(start, start + 1));
        first.set_leading_trivia(original.leading_trivia().to_vec());

        let remainder_text = &original.text()[1..];
        let mut remainder = Token::new(
            remainder_kind,
            remainder_text,
            Span::new(start + 1, original.span().end()),
        );
        remainder.set_trailing_trivia(original.trailing_trivia().to_vec());

        self.splits.push(SplitUndo {
            index: self.current,
            original,
        });
        self.tokens[self.current] = remainder;
        first
    }

    // ========================================================================
    // Speculation
    // ========================================================================

    /// Saves the current parser position.
    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            diagnostics_len: self.diagnostics.len(),
            splits_len: self.splits.len(),
        }
    }

    /// Restores a previously saved position, undoing token splits and
    /// dropping diagnostics recorded since the save.
    pub(super) fn rewind(&mut self, checkpoint: Checkpoint) {
        while self.splits.len() > checkpoint.splits_len {
            let Some(undo) = self.splits.pop() else { break };
            self.tokens[undo.index] = undo.original;
        }
        self.diagnostics.truncate(checkpoint.diagnostics_len);
        self.current = checkpoint.current;
    }

    // ========================================================================
    // Diagnostics and recovery
    // ========================================================================

    /// Records an error diagnostic.
    pub(super) fn error(&mut self, code: ErrorCode, span: Span) {
        self.diagnostics.push(Diagnostic::error(code, span));
    }

    /// Records an error diagnostic with message arguments.
    pub(super) fn error_with_args(
        &mut self,
        code: ErrorCode,
        span: Span,
        args: impl IntoIterator<Item = impl Into<ecow::EcoString>>,
    ) {
        self.diagnostics
            .push(Diagnostic::error(code, span).with_args(args));
    }

    /// Records a [`ErrorCode::FeatureNotAvailable`] diagnostic when the
    /// configured language level is below `required`.
    ///
    /// The construct still parses either way; the tree shape is identical
    /// across levels.
    pub(super) fn require_level(&mut self, required: LanguageLevel, feature: &str, span: Span) {
        if self.options.language_level < required {
            self.error_with_args(
                ErrorCode::FeatureNotAvailable,
                span,
                [feature, self.options.language_level.name()],
            );
        }
    }

    /// Wraps `token` as skipped trivia on the leading trivia of the current
    /// token, preserving it for exact reconstruction.
    pub(super) fn attach_skipped(&mut self, token: Token) {
        let index = self.current.min(self.tokens.len() - 1);
        self.tokens[index].prepend_leading_trivia(vec![Trivia::Skipped(Box::new(token))]);
    }

    // ========================================================================
    // Nesting guard
    // ========================================================================

    /// Bumps the nesting depth, producing an error placeholder when it
    /// exceeds [`MAX_NESTING_DEPTH`]. Call [`Self::leave_nesting`] on every
    /// path where this returns `Ok`.
    pub(super) fn enter_nesting(&mut self) -> Result<(), Expression> {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            self.nesting_depth -= 1;
            let span = self.current_token().span();
            self.error(ErrorCode::TooDeepNesting, span);
            return Err(self.missing_identifier_expression());
        }
        Ok(())
    }

    /// Decrements the nesting depth.
    pub(super) fn leave_nesting(&mut self) {
        self.nesting_depth -= 1;
    }

    /// Bumps the nesting depth for a speculative scan.
    ///
    /// Returns `false` at the limit; the scan fails quietly, the caller
    /// rewinds, and the non-speculative path reports the depth error.
    /// Call [`Self::leave_nesting`] on every path where this returns `true`.
    pub(super) fn enter_scan_nesting(&mut self) -> bool {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            return false;
        }
        self.nesting_depth += 1;
        true
    }

    /// Runs `f` with headroom for deep recursion.
    ///
    /// `stacker::maybe_grow` allocates a new stack segment when the red
    /// zone is reached, so within-limit nesting cannot overflow.
    pub(super) fn with_stack_headroom<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        stacker::maybe_grow(64 * 1024, 1024 * 1024, || f(self))
    }

    /// Builds the zero-width placeholder expression used when an expression
    /// was required but nothing usable was present.
    pub(super) fn missing_identifier_expression(&self) -> Expression {
        Expression::Name(Name::Identifier {
            identifier: self.missing_token(TokenKind::Identifier),
        })
    }

    /// Returns the configured parse options.
    pub(super) fn options(&self) -> ParseOptions {
        self.options
    }

    /// Returns the source text being parsed.
    pub(super) fn source(&self) -> &'src str {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;
    use crate::syntax::{DocumentationMode, ParseOptions};
    use pretty_assertions::assert_eq;

    fn parser_for(source: &str) -> Parser<'_> {
        let (tokens, diagnostics) = Lexer::new(source, 0, DocumentationMode::Parse).lex();
        Parser::new(source, tokens, diagnostics, ParseOptions::default())
    }

    #[test]
    fn advance_is_saturating_at_eof() {
        let mut parser = parser_for("x");
        assert_eq!(parser.advance().text(), "x");
        assert!(parser.advance().kind().is_eof());
        assert!(parser.advance().kind().is_eof());
    }

    #[test]
    fn expect_synthesizes_missing_token() {
        let mut parser = parser_for("a");
        let _ = parser.advance();
        let semicolon = parser.expect_semicolon();
        assert!(semicolon.is_missing());
        assert_eq!(semicolon.span(), Span::empty(1));
        let diagnostics = parser.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::SemicolonExpected);
    }

    #[test]
    fn split_greater_leaves_remainder_in_place() {
        let mut parser = parser_for(">>");
        let first = parser.split_greater();
        assert_eq!(first.kind(), TokenKind::Greater);
        assert_eq!(first.span(), Span::new(0, 1));
        assert_eq!(parser.current_kind(), TokenKind::Greater);
        assert_eq!(parser.current_token().span(), Span::new(1, 2));
    }

    #[test]
    fn split_greater_handles_compound_assignment() {
        let mut parser = parser_for(">>>=");
        let first = parser.split_greater();
        assert_eq!(first.kind(), TokenKind::Greater);
        assert_eq!(parser.current_kind(), TokenKind::GreaterGreaterEquals);
        assert_eq!(parser.current_token().text(), ">>=");
    }

    #[test]
    fn rewind_undoes_splits_and_diagnostics() {
        let mut parser = parser_for(">>");
        let checkpoint = parser.checkpoint();
        let _ = parser.split_greater();
        parser.error(ErrorCode::TypeExpected, Span::new(0, 1));
        parser.rewind(checkpoint);
        assert_eq!(parser.current_kind(), TokenKind::GreaterGreater);
        assert_eq!(parser.current_token().text(), ">>");
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn attach_skipped_preserves_text() {
        let mut parser = parser_for("@ x");
        let bad = parser.advance();
        parser.attach_skipped(bad);
        let next = parser.advance();
        assert_eq!(next.full_text(), "@ x");
    }

    #[test]
    fn nesting_guard_reports_after_limit() {
        let mut parser = parser_for("x");
        for _ in 0..MAX_NESTING_DEPTH {
            assert!(parser.enter_nesting().is_ok());
        }
        assert!(parser.enter_nesting().is_err());
        let diagnostics = parser.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::TooDeepNesting);
    }
}
