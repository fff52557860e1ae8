// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Operator precedence tables for expression parsing.
//!
//! Precedence is handled with precedence climbing: each binary level loops
//! over same-level operators (so long left-leaning chains never recurse)
//! and recurses only for tighter-binding right operands. The table below is
//! the single source of truth; adding an operator means adding one entry.
//!
//! Levels from loosest to tightest:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | Assignment | `=` `+=` `-=` `*=` `/=` `%=` `&=` `\|=` `^=` `<<=` `>>=` `>>>=` `??=` |
//! | Conditional | `?:` |
//! | Coalescing | `??` |
//! | ConditionalOr | `\|\|` |
//! | ConditionalAnd | `&&` |
//! | LogicalOr | `\|` |
//! | LogicalXor | `^` |
//! | LogicalAnd | `&` |
//! | Equality | `==` `!=` |
//! | Relational | `<` `>` `<=` `>=` `is` `as` |
//! | Shift | `<<` `>>` `>>>` |
//! | Additive | `+` `-` |
//! | Multiplicative | `*` `/` `%` |
//! | Range | `..` |
//! | Unary | `+` `-` `!` `~` `++` `--` `&` `*` `await` |
//! | Cast | `(T)e` |
//! | Primary | literals, names, invocation, access |
//!
//! Assignment and `??` are right-associative; everything else is left.

use crate::syntax::token::{Keyword, TokenKind};

/// A precedence level. Higher variants bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    /// The loosest level; accepts any expression.
    Expression,
    Assignment,
    Conditional,
    Coalescing,
    ConditionalOr,
    ConditionalAnd,
    LogicalOr,
    LogicalXor,
    LogicalAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Range,
    Unary,
    Cast,
    Primary,
}

impl Precedence {
    /// Returns the next-tighter level, used as the minimum for the right
    /// operand of a left-associative operator.
    pub(crate) const fn next(self) -> Self {
        match self {
            Self::Expression => Self::Assignment,
            Self::Assignment => Self::Conditional,
            Self::Conditional => Self::Coalescing,
            Self::Coalescing => Self::ConditionalOr,
            Self::ConditionalOr => Self::ConditionalAnd,
            Self::ConditionalAnd => Self::LogicalOr,
            Self::LogicalOr => Self::LogicalXor,
            Self::LogicalXor => Self::LogicalAnd,
            Self::LogicalAnd => Self::Equality,
            Self::Equality => Self::Relational,
            Self::Relational => Self::Shift,
            Self::Shift => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Range,
            Self::Range => Self::Unary,
            Self::Unary => Self::Cast,
            Self::Cast | Self::Primary => Self::Primary,
        }
    }
}

/// Precedence and associativity for one binary operator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BinaryOp {
    /// The operator's precedence level.
    pub precedence: Precedence,
    /// `true` for right-associative operators.
    pub right_assoc: bool,
}

impl BinaryOp {
    const fn left(precedence: Precedence) -> Self {
        Self {
            precedence,
            right_assoc: false,
        }
    }

    const fn right(precedence: Precedence) -> Self {
        Self {
            precedence,
            right_assoc: true,
        }
    }
}

/// Looks up the binary operator table entry for a token kind.
///
/// Returns `None` for tokens that are not binary operators, which the
/// expression parser treats as the end of the expression. `is` and `as`
/// appear here at Relational level even though their right-hand sides are
/// a pattern and a type rather than an expression.
pub(crate) fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::QuestionQuestion => BinaryOp::right(Precedence::Coalescing),
        TokenKind::PipePipe => BinaryOp::left(Precedence::ConditionalOr),
        TokenKind::AmpAmp => BinaryOp::left(Precedence::ConditionalAnd),
        TokenKind::Pipe => BinaryOp::left(Precedence::LogicalOr),
        TokenKind::Caret => BinaryOp::left(Precedence::LogicalXor),
        TokenKind::Amp => BinaryOp::left(Precedence::LogicalAnd),
        TokenKind::EqualsEquals | TokenKind::BangEquals => BinaryOp::left(Precedence::Equality),
        TokenKind::Less
        | TokenKind::LessEquals
        | TokenKind::Greater
        | TokenKind::GreaterEquals
        | TokenKind::Keyword(Keyword::Is)
        | TokenKind::Keyword(Keyword::As) => BinaryOp::left(Precedence::Relational),
        TokenKind::LessLess | TokenKind::GreaterGreater | TokenKind::GreaterGreaterGreater => {
            BinaryOp::left(Precedence::Shift)
        }
        TokenKind::Plus | TokenKind::Minus => BinaryOp::left(Precedence::Additive),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
            BinaryOp::left(Precedence::Multiplicative)
        }
        TokenKind::DotDot => BinaryOp::left(Precedence::Range),
        _ => return None,
    })
}

/// Returns `true` for assignment operator tokens (simple and compound).
pub(crate) fn is_assignment_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Equals
            | TokenKind::PlusEquals
            | TokenKind::MinusEquals
            | TokenKind::StarEquals
            | TokenKind::SlashEquals
            | TokenKind::PercentEquals
            | TokenKind::AmpEquals
            | TokenKind::PipeEquals
            | TokenKind::CaretEquals
            | TokenKind::LessLessEquals
            | TokenKind::GreaterGreaterEquals
            | TokenKind::GreaterGreaterGreaterEquals
            | TokenKind::QuestionQuestionEquals
    )
}

/// Returns `true` for tokens that can begin a prefix unary expression.
pub(crate) fn is_prefix_unary_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Amp
            | TokenKind::Star
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let mul = binary_operator(TokenKind::Star).unwrap();
        let add = binary_operator(TokenKind::Plus).unwrap();
        assert!(mul.precedence > add.precedence);
    }

    #[test]
    fn range_binds_tighter_than_multiplicative() {
        let range = binary_operator(TokenKind::DotDot).unwrap();
        let mul = binary_operator(TokenKind::Star).unwrap();
        assert!(range.precedence > mul.precedence);
    }

    #[test]
    fn shift_sits_between_relational_and_additive() {
        let shift = binary_operator(TokenKind::LessLess).unwrap();
        let rel = binary_operator(TokenKind::Less).unwrap();
        let add = binary_operator(TokenKind::Plus).unwrap();
        assert!(shift.precedence > rel.precedence);
        assert!(shift.precedence < add.precedence);
    }

    #[test]
    fn coalescing_is_right_associative() {
        assert!(binary_operator(TokenKind::QuestionQuestion).unwrap().right_assoc);
        assert!(!binary_operator(TokenKind::Plus).unwrap().right_assoc);
    }

    #[test]
    fn is_and_as_are_relational() {
        assert_eq!(
            binary_operator(TokenKind::Keyword(Keyword::Is))
                .unwrap()
                .precedence,
            Precedence::Relational
        );
        assert_eq!(
            binary_operator(TokenKind::Keyword(Keyword::As))
                .unwrap()
                .precedence,
            Precedence::Relational
        );
    }

    #[test]
    fn assignment_operators_are_recognized() {
        assert!(is_assignment_operator(TokenKind::Equals));
        assert!(is_assignment_operator(TokenKind::QuestionQuestionEquals));
        assert!(is_assignment_operator(TokenKind::GreaterGreaterGreaterEquals));
        assert!(!is_assignment_operator(TokenKind::EqualsEquals));
    }
}
