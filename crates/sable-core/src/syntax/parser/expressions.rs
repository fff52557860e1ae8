// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! Binary operators are handled with precedence climbing over the table in
//! [`super::precedence`]: a loop consumes same-level left-associative
//! operators iteratively and recurses only for tighter-binding right
//! operands, so long `a + b + c + ...` chains cost no stack. Assignment,
//! the conditional operator, `is`, `as`, and ranges have bespoke handling
//! because their right-hand sides aren't plain expressions.
//!
//! Every recursion point passes through [`Parser::parse_sub_expression`],
//! which enforces the nesting limit and grows the stack when needed.

use crate::syntax::diagnostics::ErrorCode;
use crate::syntax::token::{ContextualKeyword, Keyword, Token, TokenKind};
use crate::syntax::tree::{
    AnonymousObjectMember, Argument, ArgumentList, ArrayRankSpecifier, BracketedArgumentList,
    Expression, FromClause, Initializer, LambdaBody, LambdaParameters, Name, Ordering, Parameter,
    ParameterList, Pattern, QueryBody, QueryClause, QueryContinuation, SelectOrGroup,
    SeparatedList, TupleExpressionElement, Type,
};
use crate::syntax::LanguageLevel;

use super::disambiguation::token_can_start_expression;
use super::precedence::{self, Precedence};
use super::Parser;

impl Parser<'_> {
    /// Parses an expression at the loosest precedence.
    pub(super) fn parse_expression(&mut self) -> Expression {
        self.parse_sub_expression(Precedence::Expression)
    }

    /// Parses an expression accepting only operators at or above `min`.
    pub(super) fn parse_sub_expression(&mut self, min: Precedence) -> Expression {
        match self.enter_nesting() {
            Ok(()) => {}
            Err(placeholder) => return placeholder,
        }
        let result = self.with_stack_headroom(|p| p.parse_sub_expression_inner(min));
        self.leave_nesting();
        result
    }

    fn parse_sub_expression_inner(&mut self, min: Precedence) -> Expression {
        let mut left = self.parse_unary_or_term();
        loop {
            let kind = self.current_kind();

            if precedence::is_assignment_operator(kind) && min <= Precedence::Assignment {
                if !is_assignment_target(&left) {
                    self.error(ErrorCode::InvalidAssignmentTarget, left.span());
                }
                let operator = self.advance();
                if operator.kind() == TokenKind::QuestionQuestionEquals {
                    self.require_level(LanguageLevel::V2, "'??='", operator.span());
                }
                if operator.kind() == TokenKind::GreaterGreaterGreaterEquals {
                    self.require_level(LanguageLevel::V3, "'>>>='", operator.span());
                }
                // Right-associative: `a = b = c` is `a = (b = c)`.
                let right = self.parse_sub_expression(Precedence::Assignment);
                left = Expression::Assignment {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                };
                continue;
            }

            if kind == TokenKind::Question && min <= Precedence::Conditional {
                let question = self.advance();
                let when_true = self.parse_sub_expression(Precedence::Assignment);
                let colon = self.expect(TokenKind::Colon);
                let when_false = self.parse_sub_expression(Precedence::Conditional);
                left = Expression::Conditional {
                    condition: Box::new(left),
                    question,
                    when_true: Box::new(when_true),
                    colon,
                    when_false: Box::new(when_false),
                };
                continue;
            }

            if kind == TokenKind::Keyword(Keyword::Is) && min <= Precedence::Relational {
                let is_keyword = self.advance();
                let pattern = self.parse_pattern();
                left = Expression::IsPattern {
                    expr: Box::new(left),
                    is_keyword,
                    pattern,
                };
                continue;
            }

            if kind == TokenKind::Keyword(Keyword::As) && min <= Precedence::Relational {
                let as_keyword = self.advance();
                let ty = self.parse_type();
                left = Expression::As {
                    expr: Box::new(left),
                    as_keyword,
                    ty,
                };
                continue;
            }

            if kind == TokenKind::DotDot && min <= Precedence::Range {
                let operator = self.advance();
                self.require_level(LanguageLevel::V2, "range expressions", operator.span());
                let right = if self.can_start_expression() {
                    Some(Box::new(self.parse_sub_expression(Precedence::Unary)))
                } else {
                    None
                };
                left = Expression::Range {
                    left: Some(Box::new(left)),
                    operator,
                    right,
                };
                continue;
            }

            let Some(op) = precedence::binary_operator(kind) else {
                break;
            };
            if op.precedence < min {
                break;
            }
            let operator = self.advance();
            if operator.kind() == TokenKind::GreaterGreaterGreater {
                self.require_level(LanguageLevel::V3, "'>>>'", operator.span());
            }
            let next_min = if op.right_assoc {
                op.precedence
            } else {
                op.precedence.next()
            };
            let right = self.parse_sub_expression(next_min);
            left = Expression::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            };
        }
        left
    }

    // ========================================================================
    // Unary and term
    // ========================================================================

    fn parse_unary_or_term(&mut self) -> Expression {
        let kind = self.current_kind();

        // Prefix range: `..`, `..x`.
        if kind == TokenKind::DotDot {
            let operator = self.advance();
            self.require_level(LanguageLevel::V2, "range expressions", operator.span());
            let right = if self.can_start_expression() {
                Some(Box::new(self.parse_sub_expression(Precedence::Unary)))
            } else {
                None
            };
            return Expression::Range {
                left: None,
                operator,
                right,
            };
        }

        if precedence::is_prefix_unary_operator(kind) {
            let operator = self.advance();
            let operand = self.parse_sub_expression(Precedence::Unary);
            return Expression::PrefixUnary {
                operator,
                operand: Box::new(operand),
            };
        }

        if self.current_token().is_contextual(ContextualKeyword::Await)
            && token_can_start_expression(self.peek_at(1))
        {
            let await_keyword = self.advance();
            let operand = self.parse_sub_expression(Precedence::Unary);
            return Expression::Await {
                await_keyword,
                operand: Box::new(operand),
            };
        }

        if kind == TokenKind::Keyword(Keyword::Throw) {
            let throw_keyword = self.advance();
            let expr = self.parse_sub_expression(Precedence::Assignment);
            return Expression::Throw {
                throw_keyword,
                expr: Box::new(expr),
            };
        }

        if self.looks_like_lambda() {
            return self.parse_lambda();
        }

        if kind == TokenKind::OpenParen {
            if let Some((open, ty, close)) = self.try_parse_cast_header() {
                let operand = self.parse_sub_expression(Precedence::Unary);
                return Expression::Cast {
                    open,
                    ty,
                    close,
                    operand: Box::new(operand),
                };
            }
        }

        let term = self.parse_term();
        self.parse_postfix(term)
    }

    fn parse_postfix(&mut self, mut expr: Expression) -> Expression {
        loop {
            match self.current_kind() {
                TokenKind::Dot | TokenKind::QuestionDot | TokenKind::MinusGreater => {
                    let operator = self.advance();
                    let name = self.parse_member_name();
                    expr = Expression::MemberAccess {
                        target: Box::new(expr),
                        operator,
                        name,
                    };
                }
                TokenKind::OpenParen => {
                    let arguments = self.parse_argument_list();
                    expr = Expression::Invocation {
                        callee: Box::new(expr),
                        arguments,
                    };
                }
                TokenKind::OpenBracket => {
                    let arguments = self.parse_bracketed_argument_list();
                    expr = Expression::ElementAccess {
                        target: Box::new(expr),
                        arguments,
                    };
                }
                TokenKind::Question if self.peek_at(1).kind() == TokenKind::OpenBracket => {
                    let question = self.advance();
                    let arguments = self.parse_bracketed_argument_list();
                    expr = Expression::ConditionalElementAccess {
                        target: Box::new(expr),
                        question,
                        arguments,
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::Bang => {
                    let operator = self.advance();
                    expr = Expression::PostfixUnary {
                        operand: Box::new(expr),
                        operator,
                    };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_member_name(&mut self) -> Name {
        let identifier = self.expect_identifier();
        if self.check(TokenKind::Less) {
            if let Some(type_arguments) = self.speculate_type_argument_list() {
                return Name::Generic {
                    identifier,
                    type_arguments,
                };
            }
        }
        Name::Identifier { identifier }
    }

    // ========================================================================
    // Primary terms
    // ========================================================================

    fn parse_term(&mut self) -> Expression {
        match self.current_kind() {
            TokenKind::Identifier => {
                if self.looks_like_query() {
                    return self.parse_query_expression();
                }
                let identifier = self.advance();
                if self.check(TokenKind::Less) {
                    if let Some(type_arguments) = self.speculate_type_argument_list() {
                        return Expression::Name(Name::Generic {
                            identifier,
                            type_arguments,
                        });
                    }
                }
                Expression::Name(Name::Identifier { identifier })
            }
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral => Expression::Literal {
                token: self.advance(),
            },
            TokenKind::InterpolatedString => self.parse_interpolated_string(),
            TokenKind::OpenParen => self.parse_parenthesized_or_tuple(),
            TokenKind::Keyword(keyword) => self.parse_keyword_term(keyword),
            _ => self.invalid_term(),
        }
    }

    fn parse_keyword_term(&mut self, keyword: Keyword) -> Expression {
        match keyword {
            Keyword::True | Keyword::False | Keyword::Null => Expression::Literal {
                token: self.advance(),
            },
            Keyword::This => Expression::This {
                token: self.advance(),
            },
            Keyword::Base => Expression::Base {
                token: self.advance(),
            },
            Keyword::New => self.parse_new_expression(),
            Keyword::Typeof => {
                let (keyword, open, ty, close) = self.parse_type_query();
                Expression::Typeof {
                    keyword,
                    open,
                    ty,
                    close,
                }
            }
            Keyword::Sizeof => {
                let (keyword, open, ty, close) = self.parse_type_query();
                Expression::Sizeof {
                    keyword,
                    open,
                    ty,
                    close,
                }
            }
            Keyword::Default => {
                if self.peek_at(1).kind() == TokenKind::OpenParen {
                    let (keyword, open, ty, close) = self.parse_type_query();
                    Expression::Default {
                        keyword,
                        open,
                        ty,
                        close,
                    }
                } else {
                    // The bare `default` literal.
                    Expression::Literal {
                        token: self.advance(),
                    }
                }
            }
            Keyword::Checked | Keyword::Unchecked => {
                let keyword = self.advance();
                let open = self.expect(TokenKind::OpenParen);
                let expr = self.parse_expression();
                let close = self.expect(TokenKind::CloseParen);
                Expression::CheckedExpression {
                    keyword,
                    open,
                    expr: Box::new(expr),
                    close,
                }
            }
            k if k.is_predefined_type() => Expression::PredefinedType {
                keyword: self.advance(),
            },
            _ => self.invalid_term(),
        }
    }

    /// `typeof(T)` / `sizeof(T)` / `default(T)` header-and-type shape.
    fn parse_type_query(&mut self) -> (Token, Token, Type, Token) {
        let keyword = self.advance();
        let open = self.expect(TokenKind::OpenParen);
        let ty = self.parse_type();
        let close = self.expect(TokenKind::CloseParen);
        (keyword, open, ty, close)
    }

    /// Reports the token that cannot begin an expression and produces the
    /// zero-width placeholder. The token is NOT consumed; whoever owns the
    /// enclosing construct decides whether to skip it.
    fn invalid_term(&mut self) -> Expression {
        let token = self.current_token();
        let span = token.span();
        let text = if token.kind().is_eof() {
            "end of file".to_owned()
        } else {
            token.text().to_owned()
        };
        self.error_with_args(ErrorCode::InvalidExprTerm, span, [text]);
        self.missing_identifier_expression()
    }

    fn parse_parenthesized_or_tuple(&mut self) -> Expression {
        let open = self.advance();
        let first = self.parse_tuple_element();
        if self.check(TokenKind::Comma) {
            let mut elements = SeparatedList::new();
            elements.items.push(first);
            while let Some(comma) = self.eat(TokenKind::Comma) {
                elements.separators.push(comma);
                if self.check(TokenKind::CloseParen) {
                    break;
                }
                elements.items.push(self.parse_tuple_element());
            }
            let close = self.expect(TokenKind::CloseParen);
            return Expression::Tuple {
                open,
                elements,
                close,
            };
        }
        let close = self.expect(TokenKind::CloseParen);
        match first {
            TupleExpressionElement {
                name: None,
                colon: None,
                value,
            } => Expression::Parenthesized {
                open,
                expr: Box::new(value),
                close,
            },
            // A single named element still renders as a one-element tuple.
            element => {
                let mut elements = SeparatedList::new();
                elements.items.push(element);
                Expression::Tuple {
                    open,
                    elements,
                    close,
                }
            }
        }
    }

    fn parse_tuple_element(&mut self) -> TupleExpressionElement {
        if self.check(TokenKind::Identifier) && self.peek_at(1).kind() == TokenKind::Colon {
            let name = self.advance();
            let colon = self.advance();
            let value = self.parse_expression();
            return TupleExpressionElement {
                name: Some(name),
                colon: Some(colon),
                value,
            };
        }
        TupleExpressionElement {
            name: None,
            colon: None,
            value: self.parse_expression(),
        }
    }

    // ========================================================================
    // Creation expressions
    // ========================================================================

    fn parse_new_expression(&mut self) -> Expression {
        let new_keyword = self.advance();

        // `new { a = 1 }` — anonymous object.
        if self.check(TokenKind::OpenBrace) {
            return self.parse_anonymous_object(new_keyword);
        }

        // `new[] { ... }` — implicitly typed array.
        if self.check(TokenKind::OpenBracket) {
            let open_bracket = self.advance();
            let mut commas = Vec::new();
            while let Some(comma) = self.eat(TokenKind::Comma) {
                commas.push(comma);
            }
            let close_bracket = self.expect(TokenKind::CloseBracket);
            let initializer = self.parse_initializer();
            return Expression::ImplicitArrayCreation {
                new_keyword,
                open_bracket,
                commas,
                close_bracket,
                initializer,
            };
        }

        // `new(args)` — target-typed.
        if self.check(TokenKind::OpenParen) {
            self.require_level(LanguageLevel::V2, "target-typed 'new'", new_keyword.span());
            let arguments = self.parse_argument_list();
            let initializer = if self.check(TokenKind::OpenBrace) {
                Some(self.parse_initializer())
            } else {
                None
            };
            return Expression::ObjectCreation {
                new_keyword,
                ty: None,
                arguments: Some(arguments),
                initializer,
            };
        }

        let ty = self.parse_type();

        // `new T[size]` — the first rank carries expressions, which the
        // plain type grammar never consumes.
        if self.check(TokenKind::OpenBracket) {
            let sized = self.parse_sized_rank_specifier();
            let mut ranks = vec![sized];
            while self.check(TokenKind::OpenBracket) && self.rank_specifier_ahead() {
                ranks.push(self.scan_rank_specifier());
            }
            let ty = Type::Array {
                element: Box::new(ty),
                ranks,
            };
            let initializer = if self.check(TokenKind::OpenBrace) {
                Some(self.parse_initializer())
            } else {
                None
            };
            return Expression::ArrayCreation {
                new_keyword,
                ty,
                initializer,
            };
        }

        // `new T[] { ... }` — the type already absorbed its empty ranks.
        if matches!(ty, Type::Array { .. }) {
            let initializer = if self.check(TokenKind::OpenBrace) {
                Some(self.parse_initializer())
            } else {
                None
            };
            return Expression::ArrayCreation {
                new_keyword,
                ty,
                initializer,
            };
        }

        let arguments = if self.check(TokenKind::OpenParen) {
            Some(self.parse_argument_list())
        } else {
            None
        };
        let initializer = if self.check(TokenKind::OpenBrace) {
            Some(self.parse_initializer())
        } else {
            None
        };
        if arguments.is_none() && initializer.is_none() {
            let span = self.current_token().span();
            self.error_with_args(ErrorCode::TokenExpected, span, ["("]);
        }
        Expression::ObjectCreation {
            new_keyword,
            ty: Some(ty),
            arguments,
            initializer,
        }
    }

    fn parse_sized_rank_specifier(&mut self) -> ArrayRankSpecifier {
        let open = self.advance();
        let mut sizes = SeparatedList::new();
        while !self.check(TokenKind::CloseBracket) && !self.is_at_end() {
            if !self.check(TokenKind::Comma) {
                sizes.items.push(self.parse_expression());
            }
            match self.eat(TokenKind::Comma) {
                Some(comma) => sizes.separators.push(comma),
                None => break,
            }
        }
        let close = self.expect(TokenKind::CloseBracket);
        ArrayRankSpecifier { open, sizes, close }
    }

    fn parse_anonymous_object(&mut self, new_keyword: Token) -> Expression {
        let open = self.advance();
        let mut members = SeparatedList::new();
        while !self.check(TokenKind::CloseBrace) && !self.is_at_end() {
            let member = if self.check(TokenKind::Identifier)
                && self.peek_at(1).kind() == TokenKind::Equals
            {
                let name = self.advance();
                let equals = self.advance();
                let value = self.parse_expression();
                AnonymousObjectMember {
                    name: Some(name),
                    equals: Some(equals),
                    value,
                }
            } else {
                AnonymousObjectMember {
                    name: None,
                    equals: None,
                    value: self.parse_expression(),
                }
            };
            members.items.push(member);
            match self.eat(TokenKind::Comma) {
                Some(comma) => members.separators.push(comma),
                None => break,
            }
        }
        let close = self.expect(TokenKind::CloseBrace);
        Expression::AnonymousObject {
            new_keyword,
            open,
            members,
            close,
        }
    }

    /// Parses `{ ... }` object, collection, or array initializers. Nested
    /// `{ ... }` elements recurse.
    pub(super) fn parse_initializer(&mut self) -> Initializer {
        let open = self.expect(TokenKind::OpenBrace);
        let mut expressions = SeparatedList::new();
        while !self.check(TokenKind::CloseBrace) && !self.is_at_end() {
            let expr = if self.check(TokenKind::OpenBrace) {
                Expression::Initializer(self.parse_initializer())
            } else {
                self.parse_expression()
            };
            expressions.items.push(expr);
            match self.eat(TokenKind::Comma) {
                Some(comma) => expressions.separators.push(comma),
                None => break,
            }
        }
        let close = self.expect(TokenKind::CloseBrace);
        Initializer {
            open,
            expressions,
            close,
        }
    }

    // ========================================================================
    // Argument lists
    // ========================================================================

    pub(super) fn parse_argument_list(&mut self) -> ArgumentList {
        let open = self.expect(TokenKind::OpenParen);
        let (arguments, close) = self.parse_arguments_until(TokenKind::CloseParen);
        ArgumentList {
            open,
            arguments,
            close,
        }
    }

    pub(super) fn parse_bracketed_argument_list(&mut self) -> BracketedArgumentList {
        let open = self.expect(TokenKind::OpenBracket);
        let (arguments, close) = self.parse_arguments_until(TokenKind::CloseBracket);
        BracketedArgumentList {
            open,
            arguments,
            close,
        }
    }

    fn parse_arguments_until(&mut self, close_kind: TokenKind) -> (SeparatedList<Argument>, Token) {
        let mut arguments = SeparatedList::new();
        while !self.check(close_kind) && !self.is_at_end() {
            arguments.items.push(self.parse_argument());
            match self.eat(TokenKind::Comma) {
                Some(comma) => arguments.separators.push(comma),
                None => break,
            }
        }
        let close = self.expect(close_kind);
        (arguments, close)
    }

    fn parse_argument(&mut self) -> Argument {
        let (name, colon) =
            if self.check(TokenKind::Identifier) && self.peek_at(1).kind() == TokenKind::Colon {
                (Some(self.advance()), Some(self.advance()))
            } else {
                (None, None)
            };
        let modifier = match self.current_kind() {
            TokenKind::Keyword(Keyword::Ref | Keyword::Out | Keyword::In) => Some(self.advance()),
            _ => None,
        };
        Argument {
            name,
            colon,
            modifier,
            value: self.parse_expression(),
        }
    }

    // ========================================================================
    // Lambdas
    // ========================================================================

    fn parse_lambda(&mut self) -> Expression {
        let async_keyword = if self.current_token().is_contextual(ContextualKeyword::Async) {
            Some(self.advance())
        } else {
            None
        };
        let parameters = if self.check(TokenKind::Identifier) {
            LambdaParameters::Single(self.advance())
        } else {
            LambdaParameters::List(self.parse_parameter_list())
        };
        let arrow = self.expect(TokenKind::EqualsGreater);
        let body = if self.check(TokenKind::OpenBrace) {
            LambdaBody::Block(self.parse_block())
        } else {
            LambdaBody::Expression(Box::new(self.parse_sub_expression(Precedence::Assignment)))
        };
        Expression::Lambda {
            async_keyword,
            parameters,
            arrow,
            body,
        }
    }

    pub(super) fn parse_parameter_list(&mut self) -> ParameterList {
        let open = self.expect(TokenKind::OpenParen);
        let mut parameters = SeparatedList::new();
        while !self.check(TokenKind::CloseParen) && !self.is_at_end() {
            parameters.items.push(self.parse_parameter());
            match self.eat(TokenKind::Comma) {
                Some(comma) => parameters.separators.push(comma),
                None => break,
            }
        }
        let close = self.expect(TokenKind::CloseParen);
        ParameterList {
            open,
            parameters,
            close,
        }
    }

    fn parse_parameter(&mut self) -> Parameter {
        let mut modifiers = Vec::new();
        while matches!(
            self.current_kind(),
            TokenKind::Keyword(Keyword::Ref | Keyword::Out | Keyword::In)
        ) {
            modifiers.push(self.advance());
        }
        // `Type name` or a bare untyped `name`.
        let checkpoint = self.checkpoint();
        if let Some(ty) = self.scan_type() {
            if self.check(TokenKind::Identifier) {
                let identifier = self.advance();
                return Parameter {
                    modifiers,
                    ty: Some(ty),
                    identifier,
                };
            }
            self.rewind(checkpoint);
        }
        Parameter {
            modifiers,
            ty: None,
            identifier: self.expect_identifier(),
        }
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    /// Parses the pattern after `is`.
    ///
    /// Type parsing here is committed: a `<` after a name binds as type
    /// arguments whenever the list scans, with no follow-token check. That
    /// is why `e is a < i >> 2` reads as `(e is a<i>) > 2`.
    pub(super) fn parse_pattern(&mut self) -> Pattern {
        if self.current_token().is_contextual(ContextualKeyword::Not) {
            let not_keyword = self.advance();
            return Pattern::Not {
                not_keyword,
                pattern: Box::new(self.parse_pattern()),
            };
        }
        if self.current_token().is_contextual(ContextualKeyword::Var)
            && self.peek_at(1).kind() == TokenKind::Identifier
        {
            let var_keyword = self.advance();
            let identifier = self.advance();
            return Pattern::Var {
                var_keyword,
                identifier,
            };
        }
        if self.check(TokenKind::OpenParen) {
            let open = self.advance();
            let pattern = self.parse_pattern();
            let close = self.expect(TokenKind::CloseParen);
            return Pattern::Parenthesized {
                open,
                pattern: Box::new(pattern),
                close,
            };
        }

        let type_ahead = match self.current_kind() {
            TokenKind::Identifier => true,
            TokenKind::Keyword(k) => k.is_predefined_type(),
            _ => false,
        };
        if type_ahead {
            if let Some(ty) = self.scan_type_in_pattern() {
                if self.check(TokenKind::Identifier) {
                    let identifier = self.advance();
                    return Pattern::Declaration { ty, identifier };
                }
                return Pattern::Type { ty };
            }
        }

        // Constant pattern: parsed below relational so the enclosing
        // comparison operators stay with the `is` expression's parent.
        Pattern::Constant {
            expr: Box::new(self.parse_sub_expression(Precedence::Shift)),
        }
    }

    // ========================================================================
    // Query expressions
    // ========================================================================

    fn looks_like_query(&mut self) -> bool {
        if !self.current_token().is_contextual(ContextualKeyword::From) {
            return false;
        }
        let checkpoint = self.checkpoint();
        let _ = self.advance();
        let direct = self.check(TokenKind::Identifier)
            && self.peek_at(1).kind() == TokenKind::Keyword(Keyword::In);
        let typed = !direct
            && self.scan_type().is_some()
            && self.check(TokenKind::Identifier)
            && self.peek_at(1).kind() == TokenKind::Keyword(Keyword::In);
        self.rewind(checkpoint);
        direct || typed
    }

    fn parse_query_expression(&mut self) -> Expression {
        let from = Box::new(self.parse_from_clause());
        let body = Box::new(self.parse_query_body());
        Expression::Query { from, body }
    }

    fn parse_from_clause(&mut self) -> FromClause {
        let from_keyword = self.advance();
        let ty = if self.check(TokenKind::Identifier)
            && self.peek_at(1).kind() == TokenKind::Keyword(Keyword::In)
        {
            None
        } else {
            Some(self.parse_type())
        };
        let identifier = self.expect_identifier();
        let in_keyword = self.expect_keyword(Keyword::In, "in");
        let expr = self.parse_sub_expression(Precedence::Assignment);
        FromClause {
            from_keyword,
            ty,
            identifier,
            in_keyword,
            expr,
        }
    }

    fn parse_query_body(&mut self) -> QueryBody {
        let mut clauses = Vec::new();
        loop {
            let contextual = self.current_token().contextual();
            match contextual {
                Some(ContextualKeyword::From) if self.looks_like_query() => {
                    clauses.push(QueryClause::From(self.parse_from_clause()));
                }
                Some(ContextualKeyword::Where) => {
                    let where_keyword = self.advance();
                    let condition = self.parse_sub_expression(Precedence::Assignment);
                    clauses.push(QueryClause::Where {
                        where_keyword,
                        condition,
                    });
                }
                Some(ContextualKeyword::Let) => {
                    let let_keyword = self.advance();
                    let identifier = self.expect_identifier();
                    let equals = self.expect(TokenKind::Equals);
                    let expr = self.parse_sub_expression(Precedence::Assignment);
                    clauses.push(QueryClause::Let {
                        let_keyword,
                        identifier,
                        equals,
                        expr,
                    });
                }
                Some(ContextualKeyword::Orderby) => {
                    let orderby_keyword = self.advance();
                    let mut orderings = SeparatedList::new();
                    loop {
                        let expr = self.parse_sub_expression(Precedence::Assignment);
                        let direction = if matches!(
                            self.current_token().contextual(),
                            Some(ContextualKeyword::Ascending | ContextualKeyword::Descending)
                        ) {
                            Some(self.advance())
                        } else {
                            None
                        };
                        orderings.items.push(Ordering { expr, direction });
                        match self.eat(TokenKind::Comma) {
                            Some(comma) => orderings.separators.push(comma),
                            None => break,
                        }
                    }
                    clauses.push(QueryClause::OrderBy {
                        orderby_keyword,
                        orderings,
                    });
                }
                Some(ContextualKeyword::Join) => {
                    clauses.push(self.parse_join_clause());
                }
                _ => break,
            }
        }
        let select_or_group = self.parse_select_or_group();
        let continuation = if self.current_token().is_contextual(ContextualKeyword::Into) {
            let into_keyword = self.advance();
            let identifier = self.expect_identifier();
            let body = self.parse_query_body();
            Some(Box::new(QueryContinuation {
                into_keyword,
                identifier,
                body,
            }))
        } else {
            None
        };
        QueryBody {
            clauses,
            select_or_group,
            continuation,
        }
    }

    fn parse_join_clause(&mut self) -> QueryClause {
        let join_keyword = self.advance();
        let ty = if self.check(TokenKind::Identifier)
            && self.peek_at(1).kind() == TokenKind::Keyword(Keyword::In)
        {
            None
        } else {
            Some(self.parse_type())
        };
        let identifier = self.expect_identifier();
        let in_keyword = self.expect_keyword(Keyword::In, "in");
        let source = self.parse_sub_expression(Precedence::Assignment);
        let on_keyword = self.expect_contextual(ContextualKeyword::On, "on");
        let left = self.parse_sub_expression(Precedence::Assignment);
        let equals_keyword = self.expect_contextual(ContextualKeyword::Equals, "equals");
        let right = self.parse_sub_expression(Precedence::Assignment);
        let (into_keyword, into_identifier) =
            if self.current_token().is_contextual(ContextualKeyword::Into) {
                (Some(self.advance()), Some(self.expect_identifier()))
            } else {
                (None, None)
            };
        QueryClause::Join {
            join_keyword,
            ty,
            identifier,
            in_keyword,
            source,
            on_keyword,
            left,
            equals_keyword,
            right,
            into_keyword,
            into_identifier,
        }
    }

    fn parse_select_or_group(&mut self) -> SelectOrGroup {
        if self.current_token().is_contextual(ContextualKeyword::Select) {
            let select_keyword = self.advance();
            let expr = self.parse_sub_expression(Precedence::Assignment);
            return SelectOrGroup::Select {
                select_keyword,
                expr,
            };
        }
        if self.current_token().is_contextual(ContextualKeyword::Group) {
            let group_keyword = self.advance();
            let expr = self.parse_sub_expression(Precedence::Assignment);
            let by_keyword = self.expect_contextual(ContextualKeyword::By, "by");
            let by_expr = self.parse_sub_expression(Precedence::Assignment);
            return SelectOrGroup::Group {
                group_keyword,
                expr,
                by_keyword,
                by_expr,
            };
        }
        let missing = self.missing_token(TokenKind::Identifier);
        self.error_with_args(ErrorCode::TokenExpected, missing.span(), ["select"]);
        SelectOrGroup::Select {
            select_keyword: missing,
            expr: self.missing_identifier_expression(),
        }
    }
}

/// Shapes that may appear on the left of an assignment operator.
fn is_assignment_target(expr: &Expression) -> bool {
    match expr {
        Expression::Name(_)
        | Expression::MemberAccess { .. }
        | Expression::ElementAccess { .. }
        | Expression::ConditionalElementAccess { .. }
        | Expression::Tuple { .. } => true,
        // `*p = x` through a pointer.
        Expression::PrefixUnary { operator, .. } => operator.kind() == TokenKind::Star,
        Expression::Parenthesized { expr, .. } => is_assignment_target(expr),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tree::SyntaxKind;
    use crate::syntax::{parse_expression, ParseOptions};
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> Expression {
        let (expr, diagnostics) = parse_expression(source, 0, &ParseOptions::default());
        assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
        assert_eq!(expr.to_string(), source, "reconstruction differs");
        expr
    }

    fn parse_any(source: &str) -> (Expression, Vec<crate::syntax::Diagnostic>) {
        parse_expression(source, 0, &ParseOptions::default())
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_ok("1 + 2 * 3");
        let Expression::Binary { operator, right, .. } = &expr else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(operator.text(), "+");
        assert_eq!(right.kind(), SyntaxKind::MultiplyExpression);
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse_ok("a = b = c");
        let Expression::Assignment { right, .. } = &expr else {
            panic!("expected assignment");
        };
        assert_eq!(right.kind(), SyntaxKind::SimpleAssignmentExpression);
    }

    #[test]
    fn coalesce_is_right_associative() {
        let expr = parse_ok("a ?? b ?? c");
        let Expression::Binary { right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(right.kind(), SyntaxKind::CoalesceExpression);
    }

    #[test]
    fn shift_is_left_associative() {
        let expr = parse_ok("1 << 2 << 3");
        let Expression::Binary { left, operator, .. } = &expr else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(operator.text(), "<<");
        assert_eq!(left.kind(), SyntaxKind::LeftShiftExpression);
    }

    #[test]
    fn coalesce_assignment_nests_to_the_right() {
        let expr = parse_ok("a ??= b ??= c");
        let Expression::Assignment { right, .. } = &expr else {
            panic!("expected assignment");
        };
        assert_eq!(right.kind(), SyntaxKind::CoalesceAssignmentExpression);
    }

    #[test]
    fn range_binds_tighter_than_shift() {
        // `1<<2..3>>4` groups as `(1 << (2..3)) >> 4`.
        let expr = parse_ok("1<<2..3>>4");
        let Expression::Binary { left, operator, .. } = &expr else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(operator.text(), ">>");
        let Expression::Binary {
            operator: inner,
            right,
            ..
        } = &**left
        else {
            panic!("expected binary, got {left:?}");
        };
        assert_eq!(inner.text(), "<<");
        assert_eq!(right.kind(), SyntaxKind::RangeExpression);
    }

    #[test]
    fn conditional_chains_to_the_right() {
        let expr = parse_ok("a ? b : c ? d : e");
        let Expression::Conditional { when_false, .. } = &expr else {
            panic!("expected conditional");
        };
        assert_eq!(when_false.kind(), SyntaxKind::ConditionalExpression);
    }

    #[test]
    fn relational_chain_wins_over_generic_name() {
        let expr = parse_ok("a < i >> 2");
        let Expression::Binary { operator, right, .. } = &expr else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(operator.text(), "<");
        assert_eq!(right.kind(), SyntaxKind::RightShiftExpression);
    }

    #[test]
    fn generic_name_commits_when_invoked() {
        let expr = parse_ok("a<i>(2)");
        let Expression::Invocation { callee, .. } = &expr else {
            panic!("expected invocation, got {expr:?}");
        };
        assert_eq!(callee.kind(), SyntaxKind::GenericName);
    }

    #[test]
    fn is_pattern_takes_generic_type_eagerly() {
        // `e is a < i >> 2` parses as `(e is a<i>) > 2`.
        let expr = parse_ok("e is a < i >> 2");
        let Expression::Binary { left, operator, .. } = &expr else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(operator.text(), ">");
        let Expression::IsPattern { pattern, .. } = &**left else {
            panic!("expected is-pattern, got {left:?}");
        };
        let Pattern::Type { ty } = pattern else {
            panic!("expected type pattern, got {pattern:?}");
        };
        assert_eq!(ty.to_string(), "a < i >");
    }

    #[test]
    fn is_type_question_reads_as_conditional() {
        let expr = parse_ok("x is T ? a : b");
        assert_eq!(expr.kind(), SyntaxKind::ConditionalExpression);
    }

    #[test]
    fn is_nullable_type_at_end() {
        let expr = parse_ok("x is T?");
        let Expression::IsPattern { pattern, .. } = &expr else {
            panic!("expected is-pattern");
        };
        let Pattern::Type { ty } = pattern else {
            panic!("expected type pattern");
        };
        assert_eq!(ty.kind(), SyntaxKind::NullableType);
    }

    #[test]
    fn is_not_null_pattern() {
        let expr = parse_ok("x is not null");
        let Expression::IsPattern { pattern, .. } = &expr else {
            panic!("expected is-pattern");
        };
        assert_eq!(pattern.kind(), SyntaxKind::NotPattern);
    }

    #[test]
    fn declaration_pattern_binds_a_variable() {
        let expr = parse_ok("x is string s");
        let Expression::IsPattern { pattern, .. } = &expr else {
            panic!("expected is-pattern");
        };
        assert_eq!(pattern.kind(), SyntaxKind::DeclarationPattern);
    }

    #[test]
    fn cast_of_predefined_type() {
        let expr = parse_ok("(int) - x");
        assert_eq!(expr.kind(), SyntaxKind::CastExpression);
    }

    #[test]
    fn parenthesized_name_subtraction_is_not_a_cast() {
        let expr = parse_ok("(a) - x");
        assert_eq!(expr.kind(), SyntaxKind::SubtractExpression);
    }

    #[test]
    fn conditional_access_chain() {
        let expr = parse_ok("a?.b?[1]");
        assert_eq!(expr.kind(), SyntaxKind::ConditionalElementAccessExpression);
    }

    #[test]
    fn null_suppression_is_postfix() {
        let expr = parse_ok("a!.b");
        let Expression::MemberAccess { target, .. } = &expr else {
            panic!("expected member access");
        };
        assert_eq!(target.kind(), SyntaxKind::SuppressNullableWarningExpression);
    }

    #[test]
    fn range_forms() {
        assert_eq!(parse_ok("1..2").kind(), SyntaxKind::RangeExpression);
        assert_eq!(parse_ok("..2").kind(), SyntaxKind::RangeExpression);
        assert_eq!(parse_ok("1..").kind(), SyntaxKind::RangeExpression);
        assert_eq!(parse_ok("..").kind(), SyntaxKind::RangeExpression);
    }

    #[test]
    fn range_binds_tighter_than_multiplication() {
        let expr = parse_ok("a * b..c");
        let Expression::Binary { operator, right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(operator.text(), "*");
        assert_eq!(right.kind(), SyntaxKind::RangeExpression);
    }

    #[test]
    fn range_is_gated_below_v2() {
        let options = ParseOptions {
            language_level: crate::syntax::LanguageLevel::V1,
            ..ParseOptions::default()
        };
        let (expr, diagnostics) = parse_expression("1..2", 0, &options);
        assert_eq!(expr.kind(), SyntaxKind::RangeExpression);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::FeatureNotAvailable)
        );
    }

    #[test]
    fn lambda_forms() {
        assert_eq!(parse_ok("x => x + 1").kind(), SyntaxKind::SimpleLambdaExpression);
        assert_eq!(
            parse_ok("(a, b) => a").kind(),
            SyntaxKind::ParenthesizedLambdaExpression
        );
        assert_eq!(
            parse_ok("(int a, b) => { return a; }").kind(),
            SyntaxKind::ParenthesizedLambdaExpression
        );
        assert_eq!(
            parse_ok("async x => x").kind(),
            SyntaxKind::SimpleLambdaExpression
        );
    }

    #[test]
    fn tuple_vs_parenthesized() {
        assert_eq!(parse_ok("(a, b)").kind(), SyntaxKind::TupleExpression);
        assert_eq!(parse_ok("(a + b)").kind(), SyntaxKind::ParenthesizedExpression);
        assert_eq!(parse_ok("(x: 1, y: 2)").kind(), SyntaxKind::TupleExpression);
    }

    #[test]
    fn creation_forms() {
        assert_eq!(parse_ok("new T()").kind(), SyntaxKind::ObjectCreationExpression);
        assert_eq!(
            parse_ok("new List<int> { 1, 2 }").kind(),
            SyntaxKind::ObjectCreationExpression
        );
        assert_eq!(parse_ok("new(1, 2)").kind(), SyntaxKind::ImplicitObjectCreationExpression);
        assert_eq!(parse_ok("new int[3]").kind(), SyntaxKind::ArrayCreationExpression);
        assert_eq!(
            parse_ok("new int[] { 1, 2 }").kind(),
            SyntaxKind::ArrayCreationExpression
        );
        assert_eq!(
            parse_ok("new[] { 1, 2 }").kind(),
            SyntaxKind::ImplicitArrayCreationExpression
        );
        assert_eq!(
            parse_ok("new { a = 1, b }").kind(),
            SyntaxKind::AnonymousObjectCreationExpression
        );
    }

    #[test]
    fn type_query_forms() {
        assert_eq!(parse_ok("typeof(int)").kind(), SyntaxKind::TypeofExpression);
        assert_eq!(parse_ok("sizeof(int)").kind(), SyntaxKind::SizeofExpression);
        assert_eq!(parse_ok("default(int)").kind(), SyntaxKind::DefaultExpression);
        assert_eq!(parse_ok("default").kind(), SyntaxKind::DefaultLiteral);
        assert_eq!(parse_ok("checked(a + b)").kind(), SyntaxKind::CheckedExpression);
        assert_eq!(parse_ok("unchecked(a + b)").kind(), SyntaxKind::UncheckedExpression);
    }

    #[test]
    fn predefined_type_member_access() {
        let expr = parse_ok("int.MaxValue");
        let Expression::MemberAccess { target, .. } = &expr else {
            panic!("expected member access");
        };
        assert_eq!(target.kind(), SyntaxKind::PredefinedType);
    }

    #[test]
    fn await_prefix() {
        let expr = parse_ok("await f()");
        assert_eq!(expr.kind(), SyntaxKind::AwaitExpression);
        // `await` alone stays an identifier.
        assert_eq!(parse_ok("await").kind(), SyntaxKind::IdentifierName);
    }

    #[test]
    fn throw_on_coalesce_right() {
        let expr = parse_ok("a ?? throw b");
        let Expression::Binary { right, .. } = &expr else {
            panic!("expected binary");
        };
        assert_eq!(right.kind(), SyntaxKind::ThrowExpression);
    }

    #[test]
    fn query_expression() {
        let expr =
            parse_ok("from x in xs where x > 0 orderby x descending select x * 2");
        assert_eq!(expr.kind(), SyntaxKind::QueryExpression);
    }

    #[test]
    fn query_group_with_continuation() {
        let expr = parse_ok("from x in xs group x by x.Key into g select g");
        let Expression::Query { body, .. } = &expr else {
            panic!("expected query");
        };
        assert!(body.continuation.is_some());
    }

    #[test]
    fn query_nested_in_from_source() {
        let expr = parse_ok("from x in (from y in ys select y) select x");
        let Expression::Query { from, .. } = &expr else {
            panic!("expected query");
        };
        let Expression::Parenthesized { expr: inner, .. } = &from.expr else {
            panic!("expected parenthesized source, got {:?}", from.expr);
        };
        assert_eq!(inner.kind(), SyntaxKind::QueryExpression);
    }

    #[test]
    fn query_join() {
        let expr = parse_ok("from a in xs join b in ys on a.Id equals b.Id select a");
        assert_eq!(expr.kind(), SyntaxKind::QueryExpression);
    }

    #[test]
    fn invalid_assignment_target_is_reported() {
        let (expr, diagnostics) = parse_any("1 + 2 = x");
        assert_eq!(expr.kind(), SyntaxKind::SimpleAssignmentExpression);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::InvalidAssignmentTarget)
        );
        assert_eq!(expr.to_string(), "1 + 2 = x");
    }

    #[test]
    fn missing_operand_recovers() {
        let (expr, diagnostics) = parse_any("1 + ");
        assert_eq!(expr.kind(), SyntaxKind::AddExpression);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::InvalidExprTerm);
        assert_eq!(expr.to_string(), "1 + ");
    }

    #[test]
    fn deep_nesting_is_capped_not_crashed() {
        let source = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        let (expr, diagnostics) = parse_any(&source);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::TooDeepNesting)
        );
        // Still a tree, still never panics.
        let _ = expr.span();
    }

    #[test]
    fn comments_survive_round_trip() {
        let source = "a /* mid */ + b // tail";
        let (expr, diagnostics) = parse_any(source);
        assert!(diagnostics.is_empty());
        assert_eq!(expr.to_string(), source);
    }
}
