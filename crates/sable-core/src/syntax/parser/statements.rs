// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsing.
//!
//! Dispatch is by leading token. The hard case is a statement that starts
//! with an identifier or type keyword: `a * b;` may be a multiplication or
//! a pointer declaration, and `int f(int x) { }` is a local function. Those
//! are classified up front by [`Parser::scan_declaration_shape`], which is
//! pure lookahead, so the committed parse never backtracks.
//!
//! Recovery contract: every statement production consumes at least one
//! token or synthesizes its way to completion, and malformed tails are
//! preserved as skipped trivia on the terminating token so the statement
//! still reconstructs its exact source text.

use crate::syntax::diagnostics::ErrorCode;
use crate::syntax::token::{ContextualKeyword, Keyword, Token, TokenKind, Trivia};
use crate::syntax::tree::{
    Block, CatchClause, CatchDeclaration, CatchFilter, ElseClause, EqualsValueClause,
    Expression, FinallyClause, ForInitializer, GotoTarget, ResourceClause, SeparatedList,
    Statement, SwitchLabel, SwitchSection, VariableDeclaration, VariableDeclarator,
};
use crate::syntax::LanguageLevel;

use super::disambiguation::{token_can_start_expression, DeclarationShape};
use super::Parser;

impl Parser<'_> {
    /// Parses a single statement. Always makes progress on non-empty input
    /// except at a `}` or EOF, where it reports
    /// [`ErrorCode::StatementExpected`] and synthesizes an empty statement.
    pub(super) fn parse_statement(&mut self) -> Statement {
        self.with_stack_headroom(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Statement {
        match self.current_kind() {
            TokenKind::OpenBrace => Statement::Block(self.parse_block()),
            TokenKind::Semicolon => Statement::Empty {
                semicolon: self.advance(),
            },
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::Else) => self.parse_else_without_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenKind::Keyword(Keyword::Do) => self.parse_do_statement(),
            TokenKind::Keyword(Keyword::For) => self.parse_for_statement(),
            TokenKind::Keyword(Keyword::Foreach) => self.parse_foreach_statement(None),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch_statement(),
            TokenKind::Keyword(Keyword::Break) => {
                let break_keyword = self.advance();
                let semicolon = self.expect_semicolon();
                Statement::Break {
                    break_keyword,
                    semicolon,
                }
            }
            TokenKind::Keyword(Keyword::Continue) => {
                let continue_keyword = self.advance();
                let semicolon = self.expect_semicolon();
                Statement::Continue {
                    continue_keyword,
                    semicolon,
                }
            }
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenKind::Keyword(Keyword::Throw) => self.parse_throw_statement(),
            TokenKind::Keyword(Keyword::Goto) => self.parse_goto_statement(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try_statement(),
            TokenKind::Keyword(Keyword::Checked | Keyword::Unchecked)
                if self.peek_at(1).kind() == TokenKind::OpenBrace =>
            {
                let keyword = self.advance();
                let block = self.parse_block();
                Statement::Checked { keyword, block }
            }
            TokenKind::Keyword(Keyword::Unsafe)
                if self.peek_at(1).kind() == TokenKind::OpenBrace =>
            {
                let unsafe_keyword = self.advance();
                let block = self.parse_block();
                Statement::Unsafe {
                    unsafe_keyword,
                    block,
                }
            }
            TokenKind::Keyword(Keyword::Lock) => self.parse_lock_statement(),
            TokenKind::Keyword(Keyword::Using) => self.parse_using_statement(None),
            TokenKind::Keyword(Keyword::Fixed) => self.parse_fixed_statement(),
            TokenKind::Keyword(
                Keyword::Const | Keyword::Static | Keyword::Unsafe,
            ) => self.parse_modified_declaration(),
            TokenKind::Keyword(Keyword::Private | Keyword::Protected | Keyword::Public) => {
                self.parse_unexpected_token_statement()
            }
            TokenKind::Identifier => self.parse_identifier_statement(),
            TokenKind::CloseBrace | TokenKind::Eof => {
                let span = self.current_token().span();
                self.error(ErrorCode::StatementExpected, span);
                Statement::Empty {
                    semicolon: self.missing_token(TokenKind::Semicolon),
                }
            }
            _ => self.parse_declaration_or_expression_statement(Vec::new()),
        }
    }

    /// Statements opening with an identifier: labels, contextual keywords
    /// (`yield`, `await`, `async`, `var`), or a declaration/expression.
    fn parse_identifier_statement(&mut self) -> Statement {
        if self.peek_at(1).kind() == TokenKind::Colon {
            let label = self.advance();
            let colon = self.advance();
            let statement = Box::new(self.parse_statement());
            return Statement::Labeled {
                label,
                colon,
                statement,
            };
        }
        match self.current_token().contextual() {
            Some(ContextualKeyword::Yield)
                if matches!(
                    self.peek_at(1).kind(),
                    TokenKind::Keyword(Keyword::Return | Keyword::Break)
                ) =>
            {
                self.parse_yield_statement()
            }
            Some(ContextualKeyword::Await) => match self.peek_at(1).kind() {
                TokenKind::Keyword(Keyword::Using) => {
                    let await_keyword = self.advance();
                    self.parse_using_statement(Some(await_keyword))
                }
                TokenKind::Keyword(Keyword::Foreach) => {
                    let await_keyword = self.advance();
                    self.require_level(
                        LanguageLevel::V3,
                        "'await foreach'",
                        await_keyword.span(),
                    );
                    self.parse_foreach_statement(Some(await_keyword))
                }
                // `await` followed by an operand is an await expression;
                // the declaration shape scan would read `await f()` as a
                // local function header.
                _ if token_can_start_expression(self.peek_at(1)) => {
                    self.parse_expression_statement()
                }
                _ => self.parse_declaration_or_expression_statement(Vec::new()),
            },
            Some(ContextualKeyword::Async) if !self.looks_like_lambda() => {
                self.parse_modified_declaration()
            }
            _ => self.parse_declaration_or_expression_statement(Vec::new()),
        }
    }

    /// Parses a `{ ... }` block, recovering inside it statement by
    /// statement.
    pub(super) fn parse_block(&mut self) -> Block {
        let open = self.expect(TokenKind::OpenBrace);
        let mut statements = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.is_at_end() {
            let before = self.current;
            statements.push(self.parse_statement());
            if self.current == before {
                let token = self.advance();
                self.error_with_args(
                    ErrorCode::UnexpectedToken,
                    token.span(),
                    [token.text().to_owned()],
                );
                self.attach_skipped(token);
            }
        }
        let close = self.expect(TokenKind::CloseBrace);
        Block {
            open,
            statements,
            close,
        }
    }

    /// Returns `true` if the current token unambiguously begins a statement.
    /// Synchronization stops here instead of skipping further.
    pub(super) fn at_statement_start(&self) -> bool {
        match self.current_kind() {
            TokenKind::OpenBrace | TokenKind::Semicolon => true,
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::If
                    | Keyword::While
                    | Keyword::Do
                    | Keyword::For
                    | Keyword::Foreach
                    | Keyword::Switch
                    | Keyword::Break
                    | Keyword::Continue
                    | Keyword::Return
                    | Keyword::Throw
                    | Keyword::Goto
                    | Keyword::Try
                    | Keyword::Lock
                    | Keyword::Using
                    | Keyword::Fixed
                    | Keyword::Const
            ),
            TokenKind::Identifier => matches!(
                self.current_token().contextual(),
                Some(ContextualKeyword::Var | ContextualKeyword::Yield)
            ),
            _ => false,
        }
    }

    // ========================================================================
    // Selection and iteration
    // ========================================================================

    fn parse_if_statement(&mut self) -> Statement {
        let if_keyword = self.advance();
        let (open, condition, close) = self.parse_paren_condition();
        let statement = Box::new(self.parse_statement());
        let else_clause = if self.check(TokenKind::Keyword(Keyword::Else)) {
            let else_keyword = self.advance();
            let statement = Box::new(self.parse_statement());
            Some(ElseClause {
                else_keyword,
                statement,
            })
        } else {
            None
        };
        Statement::If {
            if_keyword,
            open,
            condition,
            close,
            statement,
            else_clause,
        }
    }

    /// A bare `else` is reported and wrapped in a synthesized `if` so the
    /// else body still gets parsed (and re-checked) as a statement.
    fn parse_else_without_if(&mut self) -> Statement {
        let span = self.current_token().span();
        self.error(ErrorCode::ElseWithoutIf, span);
        let if_keyword = self.missing_token(TokenKind::Keyword(Keyword::If));
        let open = self.missing_token(TokenKind::OpenParen);
        let condition = self.missing_identifier_expression();
        let close = self.missing_token(TokenKind::CloseParen);
        let statement = Box::new(Statement::Empty {
            semicolon: self.missing_token(TokenKind::Semicolon),
        });
        let else_keyword = self.advance();
        let else_body = Box::new(self.parse_statement());
        Statement::If {
            if_keyword,
            open,
            condition,
            close,
            statement,
            else_clause: Some(ElseClause {
                else_keyword,
                statement: else_body,
            }),
        }
    }

    fn parse_while_statement(&mut self) -> Statement {
        let while_keyword = self.advance();
        let (open, condition, close) = self.parse_paren_condition();
        let body = Box::new(self.parse_statement());
        Statement::While {
            while_keyword,
            open,
            condition,
            close,
            body,
        }
    }

    fn parse_do_statement(&mut self) -> Statement {
        let do_keyword = self.advance();
        let body = Box::new(self.parse_statement());
        let while_keyword = self.expect_keyword(Keyword::While, "while");
        let (open, condition, close) = self.parse_paren_condition();
        let semicolon = self.expect_semicolon();
        Statement::Do {
            do_keyword,
            body,
            while_keyword,
            open,
            condition,
            close,
            semicolon,
        }
    }

    fn parse_for_statement(&mut self) -> Statement {
        let for_keyword = self.advance();
        let open = self.expect(TokenKind::OpenParen);
        let initializer = if self.check(TokenKind::Semicolon) {
            None
        } else if self.scan_declaration_shape() == DeclarationShape::Variable {
            Some(ForInitializer::Declaration(
                self.parse_variable_declaration(),
            ))
        } else {
            Some(ForInitializer::Expressions(self.parse_expression_list()))
        };
        let first_semicolon = self.expect_semicolon();
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        let second_semicolon = self.expect_semicolon();
        let incrementors = if self.check(TokenKind::CloseParen) {
            SeparatedList::new()
        } else {
            self.parse_expression_list()
        };
        let close = self.expect(TokenKind::CloseParen);
        let body = Box::new(self.parse_statement());
        Statement::For {
            for_keyword,
            open,
            initializer,
            first_semicolon,
            condition,
            second_semicolon,
            incrementors,
            close,
            body,
        }
    }

    fn parse_foreach_statement(&mut self, await_keyword: Option<Token>) -> Statement {
        let foreach_keyword = self.expect_keyword(Keyword::Foreach, "foreach");
        let open = self.expect(TokenKind::OpenParen);
        let ty = self.parse_type();
        let identifier = self.expect_identifier();
        let in_keyword = self.expect_keyword(Keyword::In, "in");
        let expr = self.parse_expression();
        let close = self.expect(TokenKind::CloseParen);
        let body = Box::new(self.parse_statement());
        Statement::ForEach {
            await_keyword,
            foreach_keyword,
            open,
            ty,
            identifier,
            in_keyword,
            expr,
            close,
            body,
        }
    }

    fn parse_switch_statement(&mut self) -> Statement {
        let switch_keyword = self.advance();
        let (open_paren, governing, close_paren) = if self.check(TokenKind::OpenParen) {
            self.parse_paren_condition()
        } else {
            // The governing expression must be parenthesized; parse it
            // anyway so `switch x {` recovers with the right shape.
            let span = self.current_token().span();
            self.error(ErrorCode::SwitchParensExpected, span);
            let open = self.missing_token(TokenKind::OpenParen);
            let governing = if self.can_start_expression() {
                self.parse_expression()
            } else {
                self.missing_identifier_expression()
            };
            let close = self.missing_token(TokenKind::CloseParen);
            (open, governing, close)
        };
        let open_brace = self.expect(TokenKind::OpenBrace);
        let mut sections = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.is_at_end() {
            if self.at_switch_label() {
                sections.push(self.parse_switch_section());
            } else {
                let token = self.advance();
                self.error_with_args(
                    ErrorCode::UnexpectedToken,
                    token.span(),
                    [token.text().to_owned()],
                );
                self.attach_skipped(token);
            }
        }
        let close_brace = self.expect(TokenKind::CloseBrace);
        Statement::Switch {
            switch_keyword,
            open_paren,
            governing,
            close_paren,
            open_brace,
            sections,
            close_brace,
        }
    }

    fn at_switch_label(&self) -> bool {
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Case) => true,
            TokenKind::Keyword(Keyword::Default) => {
                self.peek_at(1).kind() == TokenKind::Colon
            }
            _ => false,
        }
    }

    fn parse_switch_section(&mut self) -> SwitchSection {
        let mut labels = Vec::new();
        while self.at_switch_label() {
            if self.check(TokenKind::Keyword(Keyword::Case)) {
                let case_keyword = self.advance();
                let value = if self.check(TokenKind::Colon) {
                    let span = self.current_token().span();
                    self.error(ErrorCode::ExpressionExpected, span);
                    self.missing_identifier_expression()
                } else {
                    self.parse_expression()
                };
                let colon = self.expect(TokenKind::Colon);
                labels.push(SwitchLabel::Case {
                    case_keyword,
                    value,
                    colon,
                });
            } else {
                let default_keyword = self.advance();
                let colon = self.expect(TokenKind::Colon);
                labels.push(SwitchLabel::Default {
                    default_keyword,
                    colon,
                });
            }
        }
        let mut statements = Vec::new();
        while !self.at_switch_label()
            && !self.check(TokenKind::CloseBrace)
            && !self.is_at_end()
        {
            let before = self.current;
            statements.push(self.parse_statement());
            if self.current == before {
                let token = self.advance();
                self.error_with_args(
                    ErrorCode::UnexpectedToken,
                    token.span(),
                    [token.text().to_owned()],
                );
                self.attach_skipped(token);
            }
        }
        SwitchSection { labels, statements }
    }

    // ========================================================================
    // Jumps
    // ========================================================================

    fn parse_return_statement(&mut self) -> Statement {
        let return_keyword = self.advance();
        let expr = if self.check(TokenKind::Semicolon) || !self.can_start_expression() {
            None
        } else {
            Some(self.parse_expression())
        };
        let semicolon = self.expect_semicolon();
        Statement::Return {
            return_keyword,
            expr,
            semicolon,
        }
    }

    fn parse_yield_statement(&mut self) -> Statement {
        let yield_keyword = self.advance();
        let return_or_break = if self.check(TokenKind::Keyword(Keyword::Break)) {
            self.advance()
        } else {
            self.expect_keyword(Keyword::Return, "return")
        };
        let expr = if return_or_break.is_keyword(Keyword::Break)
            || self.check(TokenKind::Semicolon)
            || !self.can_start_expression()
        {
            None
        } else {
            Some(self.parse_expression())
        };
        let semicolon = self.expect_semicolon();
        Statement::Yield {
            yield_keyword,
            return_or_break,
            expr,
            semicolon,
        }
    }

    fn parse_goto_statement(&mut self) -> Statement {
        let goto_keyword = self.advance();
        let target = match self.current_kind() {
            TokenKind::Keyword(Keyword::Case) => {
                let case_keyword = self.advance();
                let value = Box::new(self.parse_expression());
                GotoTarget::Case {
                    case_keyword,
                    value,
                }
            }
            TokenKind::Keyword(Keyword::Default) => GotoTarget::Default {
                default_keyword: self.advance(),
            },
            _ => GotoTarget::Label(self.expect_identifier()),
        };
        let semicolon = self.expect_semicolon();
        Statement::Goto {
            goto_keyword,
            target,
            semicolon,
        }
    }

    fn parse_throw_statement(&mut self) -> Statement {
        let throw_keyword = self.advance();
        // Bare `throw;` rethrows inside a catch.
        let expr = if self.check(TokenKind::Semicolon) || !self.can_start_expression() {
            None
        } else {
            Some(self.parse_expression())
        };
        let semicolon = self.expect_semicolon();
        Statement::Throw {
            throw_keyword,
            expr,
            semicolon,
        }
    }

    // ========================================================================
    // Exception handling
    // ========================================================================

    fn parse_try_statement(&mut self) -> Statement {
        let try_keyword = self.advance();
        let block = self.parse_block();
        let mut catches = Vec::new();
        while self.check(TokenKind::Keyword(Keyword::Catch)) {
            catches.push(self.parse_catch_clause());
        }
        let finally = if self.check(TokenKind::Keyword(Keyword::Finally)) {
            let finally_keyword = self.advance();
            let block = self.parse_block();
            Some(FinallyClause {
                finally_keyword,
                block,
            })
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            let span = self.current_token().span();
            self.error_with_args(ErrorCode::TokenExpected, span, ["catch"]);
        }
        Statement::Try {
            try_keyword,
            block,
            catches,
            finally,
        }
    }

    fn parse_catch_clause(&mut self) -> CatchClause {
        let catch_keyword = self.advance();
        let declaration = if self.check(TokenKind::OpenParen) {
            let open = self.advance();
            let ty = self.parse_type();
            let identifier = self.eat(TokenKind::Identifier);
            let close = self.expect(TokenKind::CloseParen);
            Some(CatchDeclaration {
                open,
                ty,
                identifier,
                close,
            })
        } else {
            None
        };
        let filter = if self.current_token().is_contextual(ContextualKeyword::When) {
            let when_keyword = self.advance();
            let open = self.expect(TokenKind::OpenParen);
            let condition = self.parse_expression();
            let close = self.expect(TokenKind::CloseParen);
            Some(CatchFilter {
                when_keyword,
                open,
                condition,
                close,
            })
        } else {
            None
        };
        let block = self.parse_block();
        CatchClause {
            catch_keyword,
            declaration,
            filter,
            block,
        }
    }

    // ========================================================================
    // Resource statements
    // ========================================================================

    fn parse_lock_statement(&mut self) -> Statement {
        let lock_keyword = self.advance();
        let (open, expr, close) = self.parse_paren_condition();
        let body = Box::new(self.parse_statement());
        Statement::Lock {
            lock_keyword,
            open,
            expr,
            close,
            body,
        }
    }

    /// Parses both `using (...)` statements and `using T x = ...;`
    /// declarations, either optionally prefixed by `await`.
    fn parse_using_statement(&mut self, await_keyword: Option<Token>) -> Statement {
        let using_keyword = self.expect_keyword(Keyword::Using, "using");
        if self.check(TokenKind::OpenParen) {
            let open = self.advance();
            let resource = if self.scan_declaration_shape() == DeclarationShape::Variable {
                ResourceClause::Declaration(self.parse_variable_declaration())
            } else {
                ResourceClause::Expression(self.parse_expression())
            };
            let close = self.expect(TokenKind::CloseParen);
            let body = Box::new(self.parse_statement());
            return Statement::Using {
                await_keyword,
                using_keyword,
                open,
                resource,
                close,
                body,
            };
        }
        self.require_level(
            LanguageLevel::V2,
            "using declarations",
            using_keyword.span(),
        );
        let declaration = self.parse_variable_declaration();
        let semicolon = self.expect_semicolon();
        Statement::LocalDeclaration {
            await_keyword,
            using_keyword: Some(using_keyword),
            modifiers: Vec::new(),
            declaration,
            semicolon,
        }
    }

    fn parse_fixed_statement(&mut self) -> Statement {
        let fixed_keyword = self.advance();
        let open = self.expect(TokenKind::OpenParen);
        let declaration = self.parse_variable_declaration();
        let close = self.expect(TokenKind::CloseParen);
        let body = Box::new(self.parse_statement());
        Statement::Fixed {
            fixed_keyword,
            open,
            declaration,
            close,
            body,
        }
    }

    // ========================================================================
    // Declarations and expression statements
    // ========================================================================

    /// `const`/`static`/`unsafe`/`async`-prefixed local declarations and
    /// functions.
    fn parse_modified_declaration(&mut self) -> Statement {
        let mut modifiers = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Keyword(Keyword::Const | Keyword::Static | Keyword::Unsafe) => {
                    modifiers.push(self.advance());
                }
                TokenKind::Identifier
                    if self.current_token().is_contextual(ContextualKeyword::Async)
                        && !self.looks_like_lambda() =>
                {
                    modifiers.push(self.advance());
                }
                _ => break,
            }
        }
        self.parse_declaration_or_expression_statement(modifiers)
    }

    fn parse_declaration_or_expression_statement(&mut self, modifiers: Vec<Token>) -> Statement {
        match self.scan_declaration_shape() {
            DeclarationShape::Function => self.parse_local_function(modifiers),
            DeclarationShape::Variable => {
                let declaration = self.parse_variable_declaration();
                let semicolon = self.expect_semicolon();
                Statement::LocalDeclaration {
                    await_keyword: None,
                    using_keyword: None,
                    modifiers,
                    declaration,
                    semicolon,
                }
            }
            DeclarationShape::None if !self.can_start_expression() => {
                self.parse_unexpected_token_statement()
            }
            DeclarationShape::None => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Statement {
        let expr = self.parse_expression();
        let mut semicolon = self.expect_semicolon();
        if semicolon.is_missing() {
            self.recover_statement_tail(&mut semicolon);
        }
        Statement::Expression { expr, semicolon }
    }

    fn parse_local_function(&mut self, modifiers: Vec<Token>) -> Statement {
        let return_type = self.parse_type();
        let identifier = self.expect_identifier();
        let parameters = self.parse_parameter_list();
        let body = self.parse_block();
        Statement::LocalFunction {
            modifiers,
            return_type,
            identifier,
            parameters,
            body,
        }
    }

    pub(super) fn parse_variable_declaration(&mut self) -> VariableDeclaration {
        let ty = self.parse_type();
        let mut declarators = SeparatedList::new();
        loop {
            let identifier = self.expect_identifier();
            let initializer = if let Some(equals) = self.eat(TokenKind::Equals) {
                let value = self.parse_expression();
                Some(EqualsValueClause { equals, value })
            } else {
                None
            };
            declarators.items.push(VariableDeclarator {
                identifier,
                initializer,
            });
            match self.eat(TokenKind::Comma) {
                Some(comma) => declarators.separators.push(comma),
                None => break,
            }
        }
        VariableDeclaration { ty, declarators }
    }

    fn parse_expression_list(&mut self) -> SeparatedList<Expression> {
        let mut expressions = SeparatedList::new();
        loop {
            expressions.items.push(self.parse_expression());
            match self.eat(TokenKind::Comma) {
                Some(comma) => expressions.separators.push(comma),
                None => break,
            }
        }
        expressions
    }

    // ========================================================================
    // Shared recovery helpers
    // ========================================================================

    /// `( expr )` header shared by `if`, `while`, `do`, `lock`, and
    /// `switch`. An immediately closing paren reports
    /// [`ErrorCode::ExpressionExpected`] rather than blaming the `)` itself.
    fn parse_paren_condition(&mut self) -> (Token, Expression, Token) {
        let open = self.expect(TokenKind::OpenParen);
        let condition = if self.check(TokenKind::CloseParen) {
            let span = self.current_token().span();
            self.error(ErrorCode::ExpressionExpected, span);
            self.missing_identifier_expression()
        } else {
            self.parse_expression()
        };
        let close = self.expect(TokenKind::CloseParen);
        (open, condition, close)
    }

    /// A token that can start neither a statement nor an expression.
    ///
    /// The token is reported, the statement degenerates to an empty
    /// expression statement, and the offender rides out as skipped trivia
    /// on the missing semicolon so reconstruction stays exact.
    fn parse_unexpected_token_statement(&mut self) -> Statement {
        let span = self.current_token().span();
        let text = self.current_token().text().to_owned();
        self.error_with_args(ErrorCode::UnexpectedToken, span, [text]);
        let expr = self.parse_expression();
        let mut semicolon = self.expect_semicolon();
        // Only a synthesized `;` may absorb the tail: prepending trivia to
        // a real one would emit the tail ahead of it.
        if semicolon.is_missing() {
            self.recover_statement_tail(&mut semicolon);
        }
        Statement::Expression { expr, semicolon }
    }

    /// After a missing semicolon, consumes tokens that can neither start a
    /// statement nor an expression and preserves them as skipped trivia on
    /// the synthesized semicolon, keeping the malformed tail inside this
    /// statement's text.
    fn recover_statement_tail(&mut self, semicolon: &mut Token) {
        let mut skipped = Vec::new();
        while !self.is_at_end() {
            if self.check(TokenKind::CloseBrace)
                || self.at_statement_start()
                || self.can_start_expression()
            {
                break;
            }
            let token = self.advance();
            skipped.push(Trivia::Skipped(Box::new(token)));
        }
        if !skipped.is_empty() {
            semicolon.prepend_leading_trivia(skipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tree::SyntaxKind;
    use crate::syntax::{parse_compilation_unit, parse_statement, Diagnostic, ParseOptions};
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> Statement {
        let (stmt, diagnostics) = parse_statement(source, 0, &ParseOptions::default());
        assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
        assert_eq!(stmt.to_string(), source, "reconstruction differs");
        stmt
    }

    fn parse_any(source: &str) -> (Statement, Vec<Diagnostic>) {
        parse_statement(source, 0, &ParseOptions::default())
    }

    #[test]
    fn block_and_empty() {
        assert_eq!(parse_ok("{ ; ; }").kind(), SyntaxKind::Block);
        assert_eq!(parse_ok(";").kind(), SyntaxKind::EmptyStatement);
    }

    #[test]
    fn declaration_vs_expression_statement() {
        assert_eq!(
            parse_ok("int x = 1, y = 2;").kind(),
            SyntaxKind::LocalDeclarationStatement
        );
        assert_eq!(
            parse_ok("a * b;").kind(),
            SyntaxKind::LocalDeclarationStatement
        );
        assert_eq!(parse_ok("a(b);").kind(), SyntaxKind::ExpressionStatement);
        assert_eq!(
            parse_ok("var x = f();").kind(),
            SyntaxKind::LocalDeclarationStatement
        );
        assert_eq!(
            parse_ok("int.Parse(s);").kind(),
            SyntaxKind::ExpressionStatement
        );
    }

    #[test]
    fn local_function() {
        let stmt = parse_ok("int Add(int a, int b) { return a + b; }");
        assert_eq!(stmt.kind(), SyntaxKind::LocalFunctionStatement);
        let stmt = parse_ok("static int Zero() { return 0; }");
        let Statement::LocalFunction { modifiers, .. } = &stmt else {
            panic!("expected local function");
        };
        assert_eq!(modifiers.len(), 1);
    }

    #[test]
    fn if_else_chain() {
        let stmt = parse_ok("if (a) x(); else if (b) y(); else z();");
        let Statement::If { else_clause, .. } = &stmt else {
            panic!("expected if");
        };
        let else_clause = else_clause.as_ref().unwrap();
        assert_eq!(else_clause.statement.kind(), SyntaxKind::IfStatement);
    }

    #[test]
    fn loops() {
        assert_eq!(
            parse_ok("while (x < 10) x++;").kind(),
            SyntaxKind::WhileStatement
        );
        assert_eq!(
            parse_ok("do { x--; } while (x > 0);").kind(),
            SyntaxKind::DoStatement
        );
        assert_eq!(
            parse_ok("for (int i = 0; i < n; i++) f(i);").kind(),
            SyntaxKind::ForStatement
        );
        assert_eq!(parse_ok("for (;;) { }").kind(), SyntaxKind::ForStatement);
        assert_eq!(
            parse_ok("foreach (var item in items) use(item);").kind(),
            SyntaxKind::ForEachStatement
        );
    }

    #[test]
    fn switch_with_sections() {
        let stmt = parse_ok("switch (x) { case 1: case 2: f(); break; default: g(); break; }");
        let Statement::Switch { sections, .. } = &stmt else {
            panic!("expected switch");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].labels.len(), 2);
    }

    #[test]
    fn jumps() {
        assert_eq!(parse_ok("break;").kind(), SyntaxKind::BreakStatement);
        assert_eq!(parse_ok("continue;").kind(), SyntaxKind::ContinueStatement);
        assert_eq!(parse_ok("return;").kind(), SyntaxKind::ReturnStatement);
        assert_eq!(parse_ok("return x + 1;").kind(), SyntaxKind::ReturnStatement);
        assert_eq!(
            parse_ok("yield return x;").kind(),
            SyntaxKind::YieldReturnStatement
        );
        assert_eq!(
            parse_ok("yield break;").kind(),
            SyntaxKind::YieldBreakStatement
        );
        assert_eq!(parse_ok("goto done;").kind(), SyntaxKind::GotoStatement);
        assert_eq!(
            parse_ok("goto case 1;").kind(),
            SyntaxKind::GotoCaseStatement
        );
        assert_eq!(
            parse_ok("goto default;").kind(),
            SyntaxKind::GotoDefaultStatement
        );
        assert_eq!(parse_ok("throw;").kind(), SyntaxKind::ThrowStatement);
        assert_eq!(parse_ok("throw e;").kind(), SyntaxKind::ThrowStatement);
    }

    #[test]
    fn labeled_statement() {
        let stmt = parse_ok("retry: f();");
        assert_eq!(stmt.kind(), SyntaxKind::LabeledStatement);
    }

    #[test]
    fn try_catch_finally() {
        let stmt = parse_ok(
            "try { f(); } catch (IOException e) when (e.Code == 2) { g(); } catch { } finally { h(); }",
        );
        let Statement::Try {
            catches, finally, ..
        } = &stmt
        else {
            panic!("expected try");
        };
        assert_eq!(catches.len(), 2);
        assert!(catches[0].filter.is_some());
        assert!(catches[1].declaration.is_none());
        assert!(finally.is_some());
    }

    #[test]
    fn try_without_handler_is_reported() {
        let (stmt, diagnostics) = parse_any("try { f(); }");
        assert_eq!(stmt.kind(), SyntaxKind::TryStatement);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::TokenExpected);
    }

    #[test]
    fn resource_statements() {
        assert_eq!(
            parse_ok("using (var f = Open()) { }").kind(),
            SyntaxKind::UsingStatement
        );
        assert_eq!(parse_ok("using (stream) { }").kind(), SyntaxKind::UsingStatement);
        assert_eq!(parse_ok("lock (gate) { }").kind(), SyntaxKind::LockStatement);
        assert_eq!(
            parse_ok("fixed (byte* p = buffer) { }").kind(),
            SyntaxKind::FixedStatement
        );
        assert_eq!(parse_ok("checked { }").kind(), SyntaxKind::CheckedStatement);
        assert_eq!(
            parse_ok("unchecked { }").kind(),
            SyntaxKind::UncheckedStatement
        );
        assert_eq!(parse_ok("unsafe { }").kind(), SyntaxKind::UnsafeStatement);
    }

    #[test]
    fn using_declaration() {
        let stmt = parse_ok("using var f = Open();");
        let Statement::LocalDeclaration { using_keyword, .. } = &stmt else {
            panic!("expected declaration");
        };
        assert!(using_keyword.is_some());
    }

    #[test]
    fn using_declaration_is_gated_below_v2() {
        let options = ParseOptions {
            language_level: crate::syntax::LanguageLevel::V1,
            ..ParseOptions::default()
        };
        let (stmt, diagnostics) = crate::syntax::parse_statement("using var f = Open();", 0, &options);
        assert_eq!(stmt.kind(), SyntaxKind::LocalDeclarationStatement);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::FeatureNotAvailable)
        );
    }

    #[test]
    fn await_forms() {
        assert_eq!(parse_ok("await f();").kind(), SyntaxKind::ExpressionStatement);
        let stmt = parse_ok("await using (var f = Open()) { }");
        let Statement::Using { await_keyword, .. } = &stmt else {
            panic!("expected using");
        };
        assert!(await_keyword.is_some());
        let stmt = parse_ok("await foreach (var x in xs) { }");
        let Statement::ForEach { await_keyword, .. } = &stmt else {
            panic!("expected foreach");
        };
        assert!(await_keyword.is_some());
    }

    #[test]
    fn const_declaration() {
        let stmt = parse_ok("const int Max = 10;");
        let Statement::LocalDeclaration { modifiers, .. } = &stmt else {
            panic!("expected declaration");
        };
        assert_eq!(modifiers.len(), 1);
    }

    #[test]
    fn else_without_if_recovers() {
        let (stmt, diagnostics) = parse_any("else f();");
        assert_eq!(stmt.kind(), SyntaxKind::IfStatement);
        assert_eq!(stmt.to_string(), "else f();");
        assert!(diagnostics.iter().any(|d| d.code == ErrorCode::ElseWithoutIf));
    }

    #[test]
    fn switch_without_parens_recovers() {
        let (stmt, diagnostics) = parse_any("switch x { default: break; }");
        assert_eq!(stmt.kind(), SyntaxKind::SwitchStatement);
        assert_eq!(stmt.to_string(), "switch x { default: break; }");
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::SwitchParensExpected)
        );
    }

    #[test]
    fn empty_condition_is_reported() {
        let (stmt, diagnostics) = parse_any("if () f();");
        assert_eq!(stmt.kind(), SyntaxKind::IfStatement);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::ExpressionExpected);
    }

    #[test]
    fn modifier_keyword_statement_recovers_losslessly() {
        let (stmt, diagnostics) = parse_any("private");
        assert_eq!(stmt.kind(), SyntaxKind::ExpressionStatement);
        // The offending token survives as skipped trivia.
        assert_eq!(stmt.to_string(), "private");
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::UnexpectedToken,
                ErrorCode::InvalidExprTerm,
                ErrorCode::SemicolonExpected,
            ]
        );
    }

    #[test]
    fn missing_semicolon_splits_statements() {
        let (unit, diagnostics) =
            parse_compilation_unit("a() b();", 0, &ParseOptions::default());
        assert_eq!(unit.to_string(), "a() b();");
        assert_eq!(unit.statements.len(), 2);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::SemicolonExpected)
        );
    }

    #[test]
    fn recovery_never_reorders_a_consumed_semicolon() {
        // `<` drags expression recovery through the real `;`; the junk
        // after it must stay after it in the reconstruction.
        let source = "a:<;\u{10a3f}";
        let (unit, diagnostics) = parse_compilation_unit(source, 0, &ParseOptions::default());
        assert_eq!(unit.to_string(), source);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn compilation_unit_recovers_per_statement() {
        let source = "int x = ; while) { } f();";
        let (unit, diagnostics) = parse_compilation_unit(source, 0, &ParseOptions::default());
        assert_eq!(unit.to_string(), source);
        assert!(!diagnostics.is_empty());
        // The last statement still parses cleanly.
        assert_eq!(
            unit.statements.last().map(Statement::kind),
            Some(SyntaxKind::ExpressionStatement)
        );
    }
}
