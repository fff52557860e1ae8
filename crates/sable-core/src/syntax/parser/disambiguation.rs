// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Speculative parsing for ambiguous constructs.
//!
//! Several Sable surface forms cannot be classified by bounded lookahead:
//!
//! - `a < b > c` — relational chain or generic name `a<b>` applied to `c`?
//! - `(a) - b` — subtraction of a parenthesized name, or a cast of `-b`?
//! - `a * b;` — multiplication, or a pointer declaration?
//! - `(x, y) => e` — tuple expression or lambda parameter list?
//!
//! Each is resolved the same way: save a [`Checkpoint`], scan one
//! interpretation without emitting diagnostics, and commit only when a
//! decisive follow token appears; otherwise rewind and take the other
//! reading. Scans here never record diagnostics, so rolled-back attempts
//! leave no trace.
//!
//! [`Checkpoint`]: super::Checkpoint

use crate::syntax::token::{ContextualKeyword, Keyword, Token, TokenKind};
use crate::syntax::tree::{
    ArrayRankSpecifier, Name, SeparatedList, TupleTypeElement, Type, TypeArgumentList,
};

use super::Parser;
use crate::syntax::diagnostics::ErrorCode;

/// How a statement-leading token run shapes up after a type scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DeclarationShape {
    /// Not a declaration; parse as an expression statement.
    None,
    /// `Type name ...` followed by `=`, `,`, `;`, or EOF.
    Variable,
    /// `Type name (` — a local function header.
    Function,
}

impl Parser<'_> {
    // ========================================================================
    // Types
    // ========================================================================

    /// Parses a type, synthesizing a missing name (and recording
    /// [`ErrorCode::TypeExpected`]) when nothing type-like is present.
    pub(super) fn parse_type(&mut self) -> Type {
        if let Some(ty) = self.scan_type() {
            return ty;
        }
        let span = self.current_token().span();
        self.error(ErrorCode::TypeExpected, span);
        Type::Name(Name::Identifier {
            identifier: self.missing_token(TokenKind::Identifier),
        })
    }

    /// Attempts to scan a type at the cursor.
    ///
    /// On success the type is consumed; on failure the cursor is rewound
    /// and no diagnostics are recorded.
    pub(super) fn scan_type(&mut self) -> Option<Type> {
        let checkpoint = self.checkpoint();
        match self.scan_type_inner(false) {
            Some(ty) => Some(ty),
            None => {
                self.rewind(checkpoint);
                None
            }
        }
    }

    /// Like [`Self::scan_type`], but for the type of an `is` pattern.
    ///
    /// In `x is T ? a : b` the `?` belongs to a conditional expression, not
    /// a nullable type, so a trailing `?` is consumed only when what
    /// follows could not be a conditional's branches.
    pub(super) fn scan_type_in_pattern(&mut self) -> Option<Type> {
        let checkpoint = self.checkpoint();
        match self.scan_type_inner(true) {
            Some(ty) => Some(ty),
            None => {
                self.rewind(checkpoint);
                None
            }
        }
    }

    /// Depth-guarded recursion point for type scanning.
    ///
    /// Tuple types, `ref` types, and type argument lists all recurse
    /// through here, so pathological inputs like hundreds of nested
    /// parens are cut off at the same depth limit as expressions. A scan
    /// over the limit simply fails; the caller rewinds and the
    /// non-speculative parse reports the depth.
    fn scan_type_inner(&mut self, in_pattern: bool) -> Option<Type> {
        if !self.enter_scan_nesting() {
            return None;
        }
        let ty = self.with_stack_headroom(|p| p.scan_suffixed_type(in_pattern));
        self.leave_nesting();
        ty
    }

    fn scan_suffixed_type(&mut self, in_pattern: bool) -> Option<Type> {
        let mut ty = self.scan_core_type()?;
        loop {
            match self.current_kind() {
                TokenKind::Question if in_pattern && self.nullable_would_be_conditional() => break,
                TokenKind::Question => {
                    let question = self.advance();
                    ty = Type::Nullable {
                        element: Box::new(ty),
                        question,
                    };
                }
                TokenKind::Star => {
                    let star = self.advance();
                    ty = Type::Pointer {
                        element: Box::new(ty),
                        star,
                    };
                }
                TokenKind::OpenBracket if self.rank_specifier_ahead() => {
                    let mut ranks = Vec::new();
                    while self.check(TokenKind::OpenBracket) && self.rank_specifier_ahead() {
                        ranks.push(self.scan_rank_specifier());
                    }
                    ty = Type::Array {
                        element: Box::new(ty),
                        ranks,
                    };
                }
                _ => break,
            }
        }
        Some(ty)
    }

    /// Returns `true` if the `?` at the cursor reads as a conditional
    /// operator rather than a nullable-type suffix.
    fn nullable_would_be_conditional(&self) -> bool {
        let next = self.peek_at(1);
        next.kind() == TokenKind::Colon || token_can_start_expression(next)
    }

    fn scan_core_type(&mut self) -> Option<Type> {
        match self.current_kind() {
            TokenKind::Keyword(k) if k.is_predefined_type() => Some(Type::Predefined {
                keyword: self.advance(),
            }),
            TokenKind::Keyword(Keyword::Ref) => {
                let ref_keyword = self.advance();
                let ty = self.scan_type_inner(false)?;
                Some(Type::Ref {
                    ref_keyword,
                    ty: Box::new(ty),
                })
            }
            TokenKind::OpenParen => self.scan_tuple_type(),
            TokenKind::Identifier => {
                let mut ty = Type::Name(self.scan_name()?);
                while self.check(TokenKind::Dot) {
                    let dot = self.advance();
                    let right = self.scan_name()?;
                    ty = Type::Qualified {
                        left: Box::new(ty),
                        dot,
                        right,
                    };
                }
                Some(ty)
            }
            _ => None,
        }
    }

    /// Scans a tuple type: `(int a, string b)`. At least two elements are
    /// required, which is what distinguishes it from a parenthesized
    /// expression during speculation.
    fn scan_tuple_type(&mut self) -> Option<Type> {
        let open = self.eat(TokenKind::OpenParen)?;
        let mut elements = SeparatedList::new();
        loop {
            let ty = self.scan_type_inner(false)?;
            let name = self.eat(TokenKind::Identifier);
            elements.items.push(TupleTypeElement { ty, name });
            match self.eat(TokenKind::Comma) {
                Some(comma) => elements.separators.push(comma),
                None => break,
            }
        }
        if elements.items.len() < 2 {
            return None;
        }
        let close = self.eat(TokenKind::CloseParen)?;
        Some(Type::Tuple {
            open,
            elements,
            close,
        })
    }

    /// Scans a simple or generic name. A `<` that doesn't scan as a type
    /// argument list leaves the name plain and the `<` unconsumed.
    fn scan_name(&mut self) -> Option<Name> {
        let identifier = self.eat(TokenKind::Identifier)?;
        if self.check(TokenKind::Less) {
            let checkpoint = self.checkpoint();
            if let Some(type_arguments) = self.scan_type_argument_list() {
                return Some(Name::Generic {
                    identifier,
                    type_arguments,
                });
            }
            self.rewind(checkpoint);
        }
        Some(Name::Identifier { identifier })
    }

    /// Scans `<T, U>` at the cursor. The closing `>` may be split out of a
    /// `>>`-family token; that is how `List<List<int>>` closes both lists.
    fn scan_type_argument_list(&mut self) -> Option<TypeArgumentList> {
        let open = self.eat(TokenKind::Less)?;
        let mut arguments = SeparatedList::new();
        loop {
            arguments.items.push(self.scan_type_inner(false)?);
            match self.eat(TokenKind::Comma) {
                Some(comma) => arguments.separators.push(comma),
                None => break,
            }
        }
        if !self.current_kind().starts_with_greater() {
            return None;
        }
        let close = self.split_greater();
        Some(TypeArgumentList {
            open,
            arguments,
            close,
        })
    }

    /// Returns `true` if the bracket at the cursor is a rank specifier
    /// (only commas up to `]`), as opposed to an element access.
    pub(super) fn rank_specifier_ahead(&self) -> bool {
        let mut offset = 1;
        while self.peek_at(offset).kind() == TokenKind::Comma {
            offset += 1;
        }
        self.peek_at(offset).kind() == TokenKind::CloseBracket
    }

    pub(super) fn scan_rank_specifier(&mut self) -> ArrayRankSpecifier {
        let open = self.advance();
        let mut sizes = SeparatedList::new();
        while let Some(comma) = self.eat(TokenKind::Comma) {
            sizes.separators.push(comma);
        }
        let close = self.advance(); // `]`, guaranteed by rank_specifier_ahead
        ArrayRankSpecifier { open, sizes, close }
    }

    // ========================================================================
    // Generic name vs relational chain
    // ========================================================================

    /// Decides whether a `<` after an expression-position identifier opens
    /// a type argument list.
    ///
    /// The scan commits only when the list closes with a `>` and the next
    /// token is one that can follow a generic name but not a relational
    /// comparison (`(`, `)`, `]`, `:`, `;`, `,`, `.`, ...). Otherwise the
    /// cursor rewinds, including any `>`-splits, and the `<` is parsed as
    /// a relational operator. In type context (after `is`, in casts, in
    /// declarations) no follow-token check applies; the list commits as
    /// soon as it closes.
    pub(super) fn speculate_type_argument_list(&mut self) -> Option<TypeArgumentList> {
        debug_assert!(self.check(TokenKind::Less));
        let checkpoint = self.checkpoint();
        let Some(list) = self.scan_type_argument_list() else {
            self.rewind(checkpoint);
            return None;
        };
        if type_argument_list_commits(self.current_kind()) {
            Some(list)
        } else {
            self.rewind(checkpoint);
            None
        }
    }

    // ========================================================================
    // Cast vs parenthesized expression
    // ========================================================================

    /// Attempts to read `( Type )` as a cast header.
    ///
    /// Commits when the parenthesized run scans as a type and either the
    /// type could not be an expression (predefined, nullable, pointer,
    /// array, tuple) or the following token unambiguously starts an
    /// operand. `(a) - b` therefore stays a subtraction while `(int) - b`
    /// is a cast of `-b`.
    pub(super) fn try_parse_cast_header(&mut self) -> Option<(Token, Type, Token)> {
        debug_assert!(self.check(TokenKind::OpenParen));
        let checkpoint = self.checkpoint();
        let open = self.advance();
        let Some(ty) = self.scan_type() else {
            self.rewind(checkpoint);
            return None;
        };
        let Some(close) = self.eat(TokenKind::CloseParen) else {
            self.rewind(checkpoint);
            return None;
        };
        let commits = match ty {
            Type::Predefined { .. }
            | Type::Nullable { .. }
            | Type::Pointer { .. }
            | Type::Array { .. }
            | Type::Tuple { .. }
            | Type::Ref { .. } => true,
            Type::Name(_) | Type::Qualified { .. } => self.cast_operand_ahead(),
        };
        if commits {
            Some((open, ty, close))
        } else {
            self.rewind(checkpoint);
            None
        }
    }

    /// Returns `true` if the current token can only be the start of a cast
    /// operand, never a binary-operator continuation.
    fn cast_operand_ahead(&self) -> bool {
        match self.current_kind() {
            TokenKind::Identifier
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::InterpolatedString
            | TokenKind::Bang
            | TokenKind::Tilde => true,
            TokenKind::Keyword(k) => {
                k.is_predefined_type()
                    || matches!(
                        k,
                        Keyword::New
                            | Keyword::This
                            | Keyword::Base
                            | Keyword::Typeof
                            | Keyword::Default
                            | Keyword::Sizeof
                            | Keyword::Checked
                            | Keyword::Unchecked
                            | Keyword::True
                            | Keyword::False
                            | Keyword::Null
                    )
            }
            _ => false,
        }
    }

    // ========================================================================
    // Declaration vs expression statement
    // ========================================================================

    /// Classifies the statement at the cursor as a declaration, a local
    /// function, or neither. Pure lookahead: the cursor does not move.
    pub(super) fn scan_declaration_shape(&mut self) -> DeclarationShape {
        // Fast paths that need no speculation.
        if let TokenKind::Keyword(k) = self.current_kind() {
            if k.is_predefined_type() {
                // `int.MaxValue` is member access on a predefined type.
                return if self.peek_at(1).kind() == TokenKind::Dot {
                    DeclarationShape::None
                } else if self.declaration_shape_after_type(1) == DeclarationShape::Function {
                    DeclarationShape::Function
                } else {
                    DeclarationShape::Variable
                };
            }
            if k == Keyword::Ref {
                return DeclarationShape::Variable;
            }
        }
        if self.current_token().is_contextual(ContextualKeyword::Var)
            && self.peek_at(1).kind() == TokenKind::Identifier
        {
            return DeclarationShape::Variable;
        }

        let checkpoint = self.checkpoint();
        let shape = if self.scan_type().is_some() && self.check(TokenKind::Identifier) {
            match self.peek_at(1).kind() {
                TokenKind::Equals | TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eof => {
                    DeclarationShape::Variable
                }
                TokenKind::OpenParen => DeclarationShape::Function,
                _ => DeclarationShape::None,
            }
        } else {
            DeclarationShape::None
        };
        self.rewind(checkpoint);
        shape
    }

    /// Peeks past a known single-token type at `offset` to spot a local
    /// function header.
    fn declaration_shape_after_type(&self, offset: usize) -> DeclarationShape {
        if self.peek_at(offset).kind() == TokenKind::Identifier
            && self.peek_at(offset + 1).kind() == TokenKind::OpenParen
        {
            DeclarationShape::Function
        } else {
            DeclarationShape::Variable
        }
    }

    // ========================================================================
    // Lambda lookahead
    // ========================================================================

    /// Returns `true` if the cursor sits on a lambda expression:
    /// `x => ...`, `(params) => ...`, or either form prefixed by `async`.
    /// Pure lookahead.
    pub(super) fn looks_like_lambda(&mut self) -> bool {
        if self.current_token().is_contextual(ContextualKeyword::Async) {
            let checkpoint = self.checkpoint();
            let _ = self.advance();
            let result = !self.current_token().is_contextual(ContextualKeyword::Async)
                && self.looks_like_lambda();
            self.rewind(checkpoint);
            return result;
        }
        match self.current_kind() {
            TokenKind::Identifier => self.peek_at(1).kind() == TokenKind::EqualsGreater,
            TokenKind::OpenParen => {
                let checkpoint = self.checkpoint();
                let result = self.scan_lambda_parameter_list();
                self.rewind(checkpoint);
                result
            }
            _ => false,
        }
    }

    /// Scans `( [modifiers] [Type] name, ... ) =>` speculatively.
    fn scan_lambda_parameter_list(&mut self) -> bool {
        let _ = self.advance(); // `(`
        if self.eat(TokenKind::CloseParen).is_some() {
            return self.check(TokenKind::EqualsGreater);
        }
        loop {
            while matches!(
                self.current_kind(),
                TokenKind::Keyword(Keyword::Ref)
                    | TokenKind::Keyword(Keyword::Out)
                    | TokenKind::Keyword(Keyword::In)
            ) {
                let _ = self.advance();
            }
            // Either `Type name` or a bare `name`; a scanned plain name
            // with no identifier after it is the parameter itself.
            if self.scan_type().is_none() {
                return false;
            }
            let _ = self.eat(TokenKind::Identifier);
            match self.current_kind() {
                TokenKind::Comma => {
                    let _ = self.advance();
                }
                TokenKind::CloseParen => break,
                _ => return false,
            }
        }
        let _ = self.advance(); // `)`
        self.check(TokenKind::EqualsGreater)
    }

    // ========================================================================
    // Start-set queries
    // ========================================================================

    /// Returns `true` if the current token can begin an expression.
    pub(super) fn can_start_expression(&self) -> bool {
        token_can_start_expression(self.current_token())
    }
}

/// Returns `true` if `token` can begin an expression.
pub(super) fn token_can_start_expression(token: &Token) -> bool {
    match token.kind() {
        TokenKind::Identifier
        | TokenKind::IntLiteral
        | TokenKind::FloatLiteral
        | TokenKind::StringLiteral
        | TokenKind::CharLiteral
        | TokenKind::InterpolatedString
        | TokenKind::OpenParen
        | TokenKind::DotDot
        | TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Bang
        | TokenKind::Tilde
        | TokenKind::PlusPlus
        | TokenKind::MinusMinus
        | TokenKind::Amp
        | TokenKind::Star => true,
        TokenKind::Keyword(k) => {
            k.is_predefined_type()
                || matches!(
                    k,
                    Keyword::New
                        | Keyword::This
                        | Keyword::Base
                        | Keyword::Typeof
                        | Keyword::Default
                        | Keyword::Sizeof
                        | Keyword::Checked
                        | Keyword::Unchecked
                        | Keyword::Throw
                        | Keyword::True
                        | Keyword::False
                        | Keyword::Null
                )
        }
        _ => false,
    }
}

/// Tokens that can follow a generic name but never a relational
/// comparison, committing a speculative type argument list.
fn type_argument_list_commits(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::OpenParen
            | TokenKind::CloseParen
            | TokenKind::OpenBracket
            | TokenKind::CloseBracket
            | TokenKind::CloseBrace
            | TokenKind::Colon
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::Dot
            | TokenKind::Question
            | TokenKind::QuestionDot
            | TokenKind::EqualsEquals
            | TokenKind::BangEquals
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::AmpAmp
            | TokenKind::PipePipe
            | TokenKind::Amp
            | TokenKind::Eof
    )
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
    fn scans_nested_generic_closed_by_shift_token() {
        let mut parser = parser_for("List<List<int>>");
        let ty = parser.scan_type().expect("type");
        assert_eq!(ty.to_string(), "List<List<int>>");
        assert!(parser.is_at_end());
    }

    #[test]
    fn scans_array_and_nullable_suffixes() {
        let mut parser = parser_for("int[,][]?");
        let ty = parser.scan_type().expect("type");
        assert_eq!(ty.to_string(), "int[,][]?");
    }

    #[test]
    fn element_access_is_not_a_rank_specifier() {
        let mut parser = parser_for("a[3]");
        let ty = parser.scan_type().expect("type");
        // Only the name scans; `[3]` stays for the expression parser.
        assert_eq!(ty.to_string(), "a");
        assert_eq!(parser.current_kind(), TokenKind::OpenBracket);
    }

    #[test]
    fn relational_chain_does_not_commit_as_generic() {
        let mut parser = parser_for("< i >> 2");
        // Cursor on `<` as the expression parser would be after `a`.
        let result = parser.speculate_type_argument_list();
        assert!(result.is_none());
        // The `>>` token is restored whole after rewind.
        let kinds: Vec<_> = (0..4).map(|i| parser.peek_at(i).kind()).collect();
        assert!(kinds.contains(&TokenKind::GreaterGreater));
    }

    #[test]
    fn generic_name_commits_before_open_paren() {
        let mut parser = parser_for("<int>(x)");
        let list = parser.speculate_type_argument_list().expect("commits");
        assert_eq!(list.arguments.items.len(), 1);
        assert_eq!(parser.current_kind(), TokenKind::OpenParen);
    }

    #[test]
    fn cast_commits_for_predefined_type() {
        let mut parser = parser_for("(int) - x");
        let header = parser.try_parse_cast_header();
        assert!(header.is_some());
    }

    #[test]
    fn subtraction_after_parenthesized_name_is_not_a_cast() {
        let mut parser = parser_for("(a) - x");
        assert!(parser.try_parse_cast_header().is_none());
        assert_eq!(parser.current_kind(), TokenKind::OpenParen);
    }

    #[test]
    fn cast_of_name_commits_before_identifier() {
        let mut parser = parser_for("(a) x");
        assert!(parser.try_parse_cast_header().is_some());
    }

    #[test]
    fn pointer_declaration_shape() {
        let mut parser = parser_for("a * b;");
        assert_eq!(parser.scan_declaration_shape(), DeclarationShape::Variable);
        // Pure lookahead: cursor unmoved.
        assert_eq!(parser.current_token().text(), "a");
    }

    #[test]
    fn invocation_is_not_a_declaration() {
        let mut parser = parser_for("a(b);");
        assert_eq!(parser.scan_declaration_shape(), DeclarationShape::None);
    }

    #[test]
    fn local_function_shape() {
        let mut parser = parser_for("int f(int x) { }");
        assert_eq!(parser.scan_declaration_shape(), DeclarationShape::Function);
    }

    #[test]
    fn deep_paren_type_scan_is_bounded() {
        // Each `(` recurses once through the tuple-type scan; the depth
        // limit must stop it long before the stack runs out.
        let source = format!("{}int{}", "(".repeat(300), ")".repeat(300));
        let mut parser = parser_for(&source);
        assert!(parser.scan_type().is_none());
        assert_eq!(parser.current_kind(), TokenKind::OpenParen);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn lambda_lookahead() {
        assert!(parser_for("x => x").looks_like_lambda());
        assert!(parser_for("() => 1").looks_like_lambda());
        assert!(parser_for("(int a, b) => a").looks_like_lambda());
        assert!(!parser_for("(a, b)").looks_like_lambda());
        assert!(!parser_for("(a + b) * c").looks_like_lambda());
    }
}
