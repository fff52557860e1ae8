// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics for the Sable front end.
//!
//! Parsing never fails: every malformed input produces a complete tree plus
//! an ordered list of [`Diagnostic`]s. Diagnostics are created at the point
//! a violation is detected and appended to a bag (a plain `Vec`) threaded
//! through the parser; they are never mutated afterwards.
//!
//! Each diagnostic carries a stable [`ErrorCode`], a severity, a byte span,
//! and an ordered argument list used for message formatting. They integrate
//! with [`miette`] for rendered reports.

use ecow::EcoString;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use super::Span;

/// The closed taxonomy of syntax diagnostics.
///
/// Codes are stable across releases so tooling can match on them:
/// `SB0xxx` are lexical, `SB1xxx` are syntactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // === Lexical (SB0xxx) ===
    /// An unrecognized character in the input.
    InvalidCharacter,
    /// A string literal with no closing quote.
    UnterminatedString,
    /// A block comment with no closing `*/`.
    UnterminatedComment,
    /// A malformed numeric literal.
    InvalidNumber,
    /// A malformed or unterminated character literal.
    InvalidCharLiteral,
    /// A raw string whose closing quote run doesn't match its opening run.
    RawStringDelimiterMismatch,

    // === Syntactic (SB1xxx) ===
    /// A token appeared where the grammar allows nothing of its kind.
    UnexpectedToken,
    /// A token that cannot begin an expression appeared in term position.
    InvalidExprTerm,
    /// A statement's `;` terminator was absent.
    SemicolonExpected,
    /// An expression was required but nothing expression-like was present.
    ExpressionExpected,
    /// An identifier was required.
    IdentifierExpected,
    /// A specific token was required (the expected text is the argument).
    TokenExpected,
    /// A type was required.
    TypeExpected,
    /// A statement was required.
    StatementExpected,
    /// An `else` with no preceding `if`.
    ElseWithoutIf,
    /// A `switch` governing expression must be parenthesized.
    SwitchParensExpected,
    /// The left-hand side of an assignment is not an assignable shape.
    InvalidAssignmentTarget,
    /// A conditional expression inside an interpolation hole must be
    /// parenthesized (its `:` would be read as the format clause).
    ConditionalInInterpolation,
    /// An interpolation hole with no expression: `$"{}"`.
    EmptyInterpolationHole,
    /// A construct that is gated off at the configured language level.
    FeatureNotAvailable,
    /// Expression nesting exceeded the parser's depth limit.
    TooDeepNesting,
}

impl ErrorCode {
    /// Returns the stable diagnostic code string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidCharacter => "SB0001",
            Self::UnterminatedString => "SB0002",
            Self::UnterminatedComment => "SB0003",
            Self::InvalidNumber => "SB0004",
            Self::InvalidCharLiteral => "SB0005",
            Self::RawStringDelimiterMismatch => "SB0006",
            Self::UnexpectedToken => "SB1001",
            Self::InvalidExprTerm => "SB1002",
            Self::SemicolonExpected => "SB1003",
            Self::ExpressionExpected => "SB1004",
            Self::IdentifierExpected => "SB1005",
            Self::TokenExpected => "SB1006",
            Self::TypeExpected => "SB1007",
            Self::StatementExpected => "SB1008",
            Self::ElseWithoutIf => "SB1009",
            Self::SwitchParensExpected => "SB1010",
            Self::InvalidAssignmentTarget => "SB1011",
            Self::ConditionalInInterpolation => "SB1012",
            Self::EmptyInterpolationHole => "SB1013",
            Self::FeatureNotAvailable => "SB1014",
            Self::TooDeepNesting => "SB1015",
        }
    }

    /// Renders the message template for this code with `args` substituted
    /// positionally for `{0}`, `{1}`, ...
    #[must_use]
    pub fn message(self, args: &[EcoString]) -> String {
        let template = match self {
            Self::InvalidCharacter => "unexpected character '{0}'",
            Self::UnterminatedString => "unterminated string literal",
            Self::UnterminatedComment => "unterminated block comment",
            Self::InvalidNumber => "invalid numeric literal '{0}'",
            Self::InvalidCharLiteral => "invalid character literal",
            Self::RawStringDelimiterMismatch => {
                "raw string closing delimiter must be {0} quote(s) to match the opening delimiter"
            }
            Self::UnexpectedToken => "unexpected token '{0}'",
            Self::InvalidExprTerm => "invalid expression term '{0}'",
            Self::SemicolonExpected => "';' expected",
            Self::ExpressionExpected => "expression expected",
            Self::IdentifierExpected => "identifier expected",
            Self::TokenExpected => "'{0}' expected",
            Self::TypeExpected => "type expected",
            Self::StatementExpected => "statement expected",
            Self::ElseWithoutIf => "'else' without a preceding 'if'",
            Self::SwitchParensExpected => {
                "the governing expression of a 'switch' statement must be parenthesized"
            }
            Self::InvalidAssignmentTarget => {
                "the left-hand side of an assignment must be a variable, member, element, \
                 or tuple of assignable targets"
            }
            Self::ConditionalInInterpolation => {
                "a conditional expression inside an interpolated string hole must be \
                 parenthesized; ':' begins the format clause"
            }
            Self::EmptyInterpolationHole => "empty interpolation hole; an expression is required",
            Self::FeatureNotAvailable => "'{0}' is not available at language level {1} or below",
            Self::TooDeepNesting => "expression nesting is too deep",
        };

        let mut message = String::from(template);
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An error that makes the syntax invalid (but never stops parsing).
    Error,
    /// A warning that should be addressed.
    Warning,
    /// A hint or informational note.
    Hint,
}

/// A diagnostic message with a stable code, span, and formatting arguments.
///
/// # Examples
///
/// ```
/// use sable_core::syntax::{Diagnostic, ErrorCode, Span};
///
/// let diag = Diagnostic::error(ErrorCode::SemicolonExpected, Span::new(3, 3));
/// assert_eq!(diag.code.code(), "SB1003");
/// assert_eq!(diag.to_string(), "';' expected");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: ErrorCode,
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The source location.
    pub span: Span,
    /// Ordered message-formatting arguments.
    pub args: Vec<EcoString>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with no arguments.
    #[must_use]
    pub fn error(code: ErrorCode, span: Span) -> Self {
        Self {
            code,
            severity: Severity::Error,
            span,
            args: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with no arguments.
    #[must_use]
    pub fn warning(code: ErrorCode, span: Span) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            span,
            args: Vec::new(),
        }
    }

    /// Attaches message-formatting arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<EcoString>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Converts this diagnostic into a renderable [`SyntaxError`].
    #[must_use]
    pub fn to_report(&self) -> SyntaxError {
        SyntaxError {
            code: self.code.code(),
            message: self.to_string(),
            span: self.span,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code.message(&self.args))
    }
}

/// A rendered syntax diagnostic for reporting through [`miette`].
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("{message}")]
pub struct SyntaxError {
    /// The stable diagnostic code.
    pub code: &'static str,
    /// The rendered message.
    pub message: String,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

/// Returns the diagnostics whose spans fall entirely within `span`.
///
/// This is the per-node diagnostics view: nodes don't own the bag, so
/// consumers filter the parse's diagnostic list by the node's span.
pub fn diagnostics_in(diagnostics: &[Diagnostic], span: Span) -> impl Iterator<Item = &Diagnostic> {
    diagnostics.iter().filter(move |d| span.contains(d.span))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::InvalidCharacter.code(), "SB0001");
        assert_eq!(ErrorCode::UnexpectedToken.code(), "SB1001");
        assert_eq!(ErrorCode::FeatureNotAvailable.code(), "SB1014");
    }

    #[test]
    fn message_with_args() {
        let diag =
            Diagnostic::error(ErrorCode::InvalidExprTerm, Span::new(0, 7)).with_args(["private"]);
        assert_eq!(diag.to_string(), "invalid expression term 'private'");
    }

    #[test]
    fn message_with_multiple_args() {
        let diag = Diagnostic::error(ErrorCode::FeatureNotAvailable, Span::new(0, 3))
            .with_args(["unsigned right shift", "V2"]);
        assert_eq!(
            diag.to_string(),
            "'unsigned right shift' is not available at language level V2 or below"
        );
    }

    #[test]
    fn message_without_args() {
        let diag = Diagnostic::error(ErrorCode::ExpressionExpected, Span::new(4, 4));
        assert_eq!(diag.to_string(), "expression expected");
    }

    #[test]
    fn diagnostics_in_filters_by_containment() {
        let diags = vec![
            Diagnostic::error(ErrorCode::SemicolonExpected, Span::new(2, 4)),
            Diagnostic::error(ErrorCode::ExpressionExpected, Span::new(8, 12)),
        ];
        let inside: Vec<_> = diagnostics_in(&diags, Span::new(0, 5)).collect();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].code, ErrorCode::SemicolonExpected);
    }

    #[test]
    fn to_report_renders() {
        let diag = Diagnostic::error(ErrorCode::SemicolonExpected, Span::new(3, 3));
        let report = diag.to_report();
        assert_eq!(report.code, "SB1003");
        assert_eq!(report.message, "';' expected");
    }
}
