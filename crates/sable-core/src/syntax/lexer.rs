// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Sable source code.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written for maximum control over error recovery and IDE features.
//!
//! # Design Principles
//!
//! - **Error recovery**: Never panic on malformed input; emit diagnostics
//!   and keep scanning
//! - **Trivia preservation**: Whitespace, comments, and line directives are
//!   attached to tokens so the token stream reproduces the source exactly
//! - **Precise spans**: Every token carries its exact source location
//!
//! Interpolated string literals are lexed as a single
//! [`TokenKind::InterpolatedString`] token covering the whole literal
//! (brace and quote nesting tracked); the parser's interpolation
//! sub-scanner re-enters lexing for each hole.
//!
//! # Example
//!
//! ```
//! use sable_core::syntax::{DocumentationMode, Lexer, TokenKind};
//!
//! let (tokens, diagnostics) = Lexer::new("x + 1", 0, DocumentationMode::Parse).lex();
//! assert!(diagnostics.is_empty());
//! // x, +, 1, and the end-of-file marker
//! assert_eq!(tokens.len(), 4);
//! assert_eq!(tokens[0].kind(), TokenKind::Identifier);
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::diagnostics::{Diagnostic, ErrorCode};
use super::token::{ContextualKeyword, Keyword, LiteralValue, Token, TokenKind, Trivia};
use super::{DocumentationMode, Span};

/// A lexer that tokenizes Sable source code.
///
/// The lexer never fails completely. Unknown characters and unterminated
/// literals produce error tokens and diagnostics, allowing parsing to
/// continue.
pub struct Lexer<'src> {
    /// The full source text (spans are absolute into this).
    source: &'src str,
    /// Character iterator over `source[base..]` with positions relative
    /// to `base`.
    chars: Peekable<CharIndices<'src>>,
    /// Byte offset the iterator positions are relative to.
    base: usize,
    /// Current absolute byte position in source.
    position: usize,
    /// Whether `///` runs become structured doc trivia or plain comments.
    documentation: DocumentationMode,
    /// Pending trivia to attach to the next token.
    pending_trivia: Vec<Trivia>,
    /// Diagnostics produced during scanning.
    diagnostics: Vec<Diagnostic>,
    /// Whether the previous consumed character ended a line (directives are
    /// only recognized at the start of a line).
    at_line_start: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer over `source`, starting at byte `offset`.
    ///
    /// Spans on the produced tokens are absolute offsets into `source`.
    #[must_use]
    pub fn new(source: &'src str, offset: usize, documentation: DocumentationMode) -> Self {
        let start = offset.min(source.len());
        Self {
            source,
            chars: source[start..].char_indices().peekable(),
            base: start,
            position: start,
            documentation,
            pending_trivia: Vec::new(),
            diagnostics: Vec::new(),
            at_line_start: true,
        }
    }

    /// Lexes the entire input, returning the token stream (ending with an
    /// EOF token) and any lexical diagnostics.
    #[must_use]
    pub fn lex(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind().is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    // ========================================================================
    // Character Management
    // ========================================================================

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is the same as
    /// `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.source[self.position..].chars().nth(n)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = self.base + pos + c.len_utf8();
        self.at_line_start = c == '\n';
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    /// Skips whitespace, comments, and line directives, collecting them as
    /// trivia. When `stop_after_newline` is set, a whitespace run is cut
    /// just after its first newline so the remainder becomes leading trivia
    /// of the next token (trailing trivia never spans lines).
    fn collect_trivia(&mut self, trivia: &mut Vec<Trivia>, stop_after_newline: bool) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    let start = self.current_position();
                    let mut saw_newline = false;
                    while let Some(c) = self.peek_char() {
                        if !matches!(c, ' ' | '\t' | '\r' | '\n') {
                            break;
                        }
                        self.advance();
                        if c == '\n' && stop_after_newline {
                            saw_newline = true;
                            break;
                        }
                    }
                    let text = self.text_for(self.span_from(start));
                    trivia.push(Trivia::Whitespace(EcoString::from(text)));
                    if saw_newline {
                        return;
                    }
                }
                Some('/')
                    if self.peek_char_n(1) == Some('/')
                        && self.peek_char_n(2) == Some('/')
                        && self.peek_char_n(3) != Some('/')
                        && self.documentation == DocumentationMode::Parse =>
                {
                    let start = self.current_position();
                    self.advance_while(|c| c != '\n');
                    let text = self.text_for(self.span_from(start));
                    trivia.push(Trivia::DocComment(EcoString::from(text)));
                }
                Some('/') if self.peek_char_n(1) == Some('/') => {
                    let start = self.current_position();
                    self.advance_while(|c| c != '\n');
                    let text = self.text_for(self.span_from(start));
                    trivia.push(Trivia::LineComment(EcoString::from(text)));
                }
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    self.lex_block_comment(trivia);
                }
                Some('#') if self.at_line_start => {
                    let start = self.current_position();
                    self.advance_while(|c| c != '\n');
                    let text = self.text_for(self.span_from(start));
                    trivia.push(Trivia::LineDirective(EcoString::from(text)));
                }
                _ => return,
            }
        }
    }

    /// Lexes a block comment `/* ... */`, diagnosing a missing terminator.
    fn lex_block_comment(&mut self, trivia: &mut Vec<Trivia>) {
        let start = self.current_position();
        self.advance(); // /
        self.advance(); // *
        let mut terminated = false;
        while let Some(c) = self.advance() {
            if c == '*' && self.peek_char() == Some('/') {
                self.advance();
                terminated = true;
                break;
            }
        }
        let span = self.span_from(start);
        if !terminated {
            self.diagnostics
                .push(Diagnostic::error(ErrorCode::UnterminatedComment, span));
        }
        trivia.push(Trivia::BlockComment(EcoString::from(self.text_for(span))));
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Lexes the next token, attaching leading and trailing trivia.
    fn next_token(&mut self) -> Token {
        let mut leading = std::mem::take(&mut self.pending_trivia);
        self.collect_trivia(&mut leading, false);

        let start = self.current_position();
        let Some(c) = self.peek_char() else {
            let mut token = Token::new(TokenKind::Eof, "", Span::empty(start));
            token.set_leading_trivia(leading);
            return token;
        };

        let (kind, value, contextual) = self.lex_token_kind(c, start);
        let span = self.span_from(start);
        let mut token = Token::new(kind, self.text_for(span), span);
        if let Some(value) = value {
            token = token.with_value(value);
        }
        if let Some(contextual) = contextual {
            token = token.with_contextual(contextual);
        }
        token.set_leading_trivia(leading);

        // Trailing trivia runs to the end of the line (inclusive); anything
        // on the next line becomes the following token's leading trivia.
        let mut trailing = Vec::new();
        self.collect_trivia(&mut trailing, true);
        token.set_trailing_trivia(trailing);

        token
    }

    /// Dispatches on the first character of a token.
    #[expect(clippy::too_many_lines, reason = "flat single-character dispatch")]
    fn lex_token_kind(
        &mut self,
        c: char,
        start: u32,
    ) -> (TokenKind, Option<LiteralValue>, Option<ContextualKeyword>) {
        match c {
            c if c.is_ascii_digit() => return self.lex_number(start),
            c if c == '_' || c.is_alphabetic() => return self.lex_identifier_or_keyword(start),
            '"' => return (self.lex_string(start), None, None),
            '\'' => return self.lex_character(start),
            '@' => match self.peek_char_n(1) {
                Some('"') => return (self.lex_verbatim_string(start), None, None),
                Some('$') => return (self.lex_interpolated(start), None, None),
                Some(c2) if c2 == '_' || c2.is_alphabetic() => {
                    // Verbatim identifier: `@if` is the identifier `if`.
                    self.advance();
                    self.advance_while(|c| c == '_' || c.is_alphanumeric());
                    return (TokenKind::Identifier, None, None);
                }
                _ => {}
            },
            '$' => return (self.lex_interpolated(start), None, None),
            _ => {}
        }

        // Punctuation and operators, longest match first.
        self.advance();
        let kind = match c {
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,
            '.' => {
                if self.peek_char() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '?' => match self.peek_char() {
                Some('.') => {
                    self.advance();
                    TokenKind::QuestionDot
                }
                Some('?') => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::QuestionQuestionEquals
                    } else {
                        TokenKind::QuestionQuestion
                    }
                }
                _ => TokenKind::Question,
            },
            '+' => match self.peek_char() {
                Some('+') => {
                    self.advance();
                    TokenKind::PlusPlus
                }
                Some('=') => {
                    self.advance();
                    TokenKind::PlusEquals
                }
                _ => TokenKind::Plus,
            },
            '-' => match self.peek_char() {
                Some('-') => {
                    self.advance();
                    TokenKind::MinusMinus
                }
                Some('=') => {
                    self.advance();
                    TokenKind::MinusEquals
                }
                Some('>') => {
                    self.advance();
                    TokenKind::MinusGreater
                }
                _ => TokenKind::Minus,
            },
            '*' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::StarEquals
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::SlashEquals
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::PercentEquals
                } else {
                    TokenKind::Percent
                }
            }
            '&' => match self.peek_char() {
                Some('&') => {
                    self.advance();
                    TokenKind::AmpAmp
                }
                Some('=') => {
                    self.advance();
                    TokenKind::AmpEquals
                }
                _ => TokenKind::Amp,
            },
            '|' => match self.peek_char() {
                Some('|') => {
                    self.advance();
                    TokenKind::PipePipe
                }
                Some('=') => {
                    self.advance();
                    TokenKind::PipeEquals
                }
                _ => TokenKind::Pipe,
            },
            '^' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::CaretEquals
                } else {
                    TokenKind::Caret
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::BangEquals
                } else {
                    TokenKind::Bang
                }
            }
            '=' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::EqualsEquals
                }
                Some('>') => {
                    self.advance();
                    TokenKind::EqualsGreater
                }
                _ => TokenKind::Equals,
            },
            '<' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::LessEquals
                }
                Some('<') => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::LessLessEquals
                    } else {
                        TokenKind::LessLess
                    }
                }
                _ => TokenKind::Less,
            },
            '>' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::GreaterEquals
                }
                Some('>') => {
                    self.advance();
                    match self.peek_char() {
                        Some('=') => {
                            self.advance();
                            TokenKind::GreaterGreaterEquals
                        }
                        Some('>') => {
                            self.advance();
                            if self.peek_char() == Some('=') {
                                self.advance();
                                TokenKind::GreaterGreaterGreaterEquals
                            } else {
                                TokenKind::GreaterGreaterGreater
                            }
                        }
                        _ => TokenKind::GreaterGreater,
                    }
                }
                _ => TokenKind::Greater,
            },
            _ => {
                let span = self.span_from(start);
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::InvalidCharacter, span)
                        .with_args([EcoString::from(c.to_string())]),
                );
                TokenKind::Error
            }
        };
        (kind, None, None)
    }

    /// Lexes an identifier, keyword, or contextually-tagged identifier.
    fn lex_identifier_or_keyword(
        &mut self,
        start: u32,
    ) -> (TokenKind, Option<LiteralValue>, Option<ContextualKeyword>) {
        self.advance();
        self.advance_while(|c| c == '_' || c.is_alphanumeric());
        let text = self.text_for(self.span_from(start));
        if let Some(keyword) = Keyword::from_str(text) {
            (TokenKind::Keyword(keyword), None, None)
        } else {
            (
                TokenKind::Identifier,
                None,
                ContextualKeyword::from_str(text),
            )
        }
    }

    /// Lexes a numeric literal: decimal, hex (`0x`), binary (`0b`), with
    /// `_` digit separators, decimal point, exponent, and type suffixes.
    fn lex_number(
        &mut self,
        start: u32,
    ) -> (TokenKind, Option<LiteralValue>, Option<ContextualKeyword>) {
        if self.peek_char() == Some('0')
            && matches!(self.peek_char_n(1), Some('x' | 'X' | 'b' | 'B'))
        {
            self.advance();
            let radix = if matches!(self.advance(), Some('x' | 'X')) {
                16
            } else {
                2
            };
            self.advance_while(|c| c.is_ascii_hexdigit() || c == '_');
            self.advance_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            let span = self.span_from(start);
            let text = self.text_for(span);
            let digits: String = text[2..]
                .trim_end_matches(['u', 'U', 'l', 'L'])
                .chars()
                .filter(|&c| c != '_')
                .collect();
            return match u64::from_str_radix(&digits, radix) {
                Ok(value) => (
                    TokenKind::IntLiteral,
                    Some(LiteralValue::Int(value)),
                    None,
                ),
                Err(_) => {
                    self.diagnostics.push(
                        Diagnostic::error(ErrorCode::InvalidNumber, span)
                            .with_args([EcoString::from(text)]),
                    );
                    (TokenKind::IntLiteral, None, None)
                }
            };
        }

        self.advance_while(|c| c.is_ascii_digit() || c == '_');

        let mut is_float = false;
        // A decimal point only continues the number if a digit follows;
        // `1..2` keeps the integer `1` ahead of a `..` token.
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek_char(), Some('e' | 'E'))
            && (self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
                || (matches!(self.peek_char_n(1), Some('+' | '-'))
                    && self.peek_char_n(2).is_some_and(|c| c.is_ascii_digit())))
        {
            is_float = true;
            self.advance();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.advance();
            }
            self.advance_while(|c| c.is_ascii_digit());
        }
        let mut float_suffix = false;
        if matches!(self.peek_char(), Some('f' | 'F' | 'd' | 'D' | 'm' | 'M')) {
            float_suffix = true;
            self.advance();
        } else {
            self.advance_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        }

        let span = self.span_from(start);
        let text = self.text_for(span);
        let digits: String = text
            .trim_end_matches(['u', 'U', 'l', 'L', 'f', 'F', 'd', 'D', 'm', 'M'])
            .chars()
            .filter(|&c| c != '_')
            .collect();

        if is_float || float_suffix {
            match digits.parse::<f64>() {
                Ok(value) => (
                    TokenKind::FloatLiteral,
                    Some(LiteralValue::Float(value)),
                    None,
                ),
                Err(_) => {
                    self.diagnostics.push(
                        Diagnostic::error(ErrorCode::InvalidNumber, span)
                            .with_args([EcoString::from(text)]),
                    );
                    (TokenKind::FloatLiteral, None, None)
                }
            }
        } else {
            match digits.parse::<u64>() {
                Ok(value) => (
                    TokenKind::IntLiteral,
                    Some(LiteralValue::Int(value)),
                    None,
                ),
                Err(_) => {
                    self.diagnostics.push(
                        Diagnostic::error(ErrorCode::InvalidNumber, span)
                            .with_args([EcoString::from(text)]),
                    );
                    (TokenKind::IntLiteral, None, None)
                }
            }
        }
    }

    /// Lexes a regular string literal with backslash escapes.
    fn lex_string(&mut self, start: u32) -> TokenKind {
        self.advance(); // opening "
        let mut value = EcoString::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorCode::UnterminatedString,
                        self.span_from(start),
                    ));
                    return TokenKind::StringLiteral;
                }
                Some('"') => {
                    self.advance();
                    return TokenKind::StringLiteral;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(c) = self.lex_escape() {
                        value.push(c);
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }

    /// Lexes a verbatim string literal `@"..."` where `""` escapes a quote
    /// and newlines are allowed.
    fn lex_verbatim_string(&mut self, start: u32) -> TokenKind {
        self.advance(); // @
        self.advance(); // "
        loop {
            match self.peek_char() {
                None => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorCode::UnterminatedString,
                        self.span_from(start),
                    ));
                    return TokenKind::StringLiteral;
                }
                Some('"') => {
                    self.advance();
                    if self.peek_char() == Some('"') {
                        self.advance(); // escaped quote
                    } else {
                        return TokenKind::StringLiteral;
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Processes one backslash escape (the backslash is already consumed).
    fn lex_escape(&mut self) -> Option<char> {
        let c = self.advance()?;
        Some(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let d = self.peek_char()?.to_digit(16)?;
                    self.advance();
                    code = code * 16 + d;
                }
                char::from_u32(code)?
            }
            other => other,
        })
    }

    /// Lexes a character literal `'a'`.
    fn lex_character(
        &mut self,
        start: u32,
    ) -> (TokenKind, Option<LiteralValue>, Option<ContextualKeyword>) {
        self.advance(); // opening '
        let value = match self.peek_char() {
            None | Some('\n' | '\'') => None,
            Some('\\') => {
                self.advance();
                self.lex_escape()
            }
            Some(c) => {
                self.advance();
                Some(c)
            }
        };
        if self.peek_char() == Some('\'') {
            self.advance();
        } else {
            self.diagnostics.push(Diagnostic::error(
                ErrorCode::InvalidCharLiteral,
                self.span_from(start),
            ));
            return (TokenKind::CharLiteral, None, None);
        }
        match value {
            Some(c) => (
                TokenKind::CharLiteral,
                Some(LiteralValue::Char(c)),
                None,
            ),
            None => {
                self.diagnostics.push(Diagnostic::error(
                    ErrorCode::InvalidCharLiteral,
                    self.span_from(start),
                ));
                (TokenKind::CharLiteral, None, None)
            }
        }
    }

    // ========================================================================
    // Interpolated Strings
    // ========================================================================

    /// Lexes an entire interpolated string literal (`$"..."`, `$@"..."`,
    /// `@$"..."`, or raw `$$"""..."""`) as a single token.
    ///
    /// The scanner tracks brace depth and nested string literals so the
    /// token ends at the literal's real terminator; the parser decomposes
    /// the text later. Holes are opened by a run of `{` at least as long as
    /// the `$` sigil count (for raw forms); `{{`/`}}` escape in non-raw
    /// forms.
    fn lex_interpolated(&mut self, start: u32) -> TokenKind {
        let mut dollars = 0usize;
        let mut verbatim = false;
        while let Some(c) = self.peek_char() {
            match c {
                '$' => {
                    dollars += 1;
                    self.advance();
                }
                '@' if !verbatim => {
                    verbatim = true;
                    self.advance();
                }
                _ => break,
            }
        }

        // Count the opening quote run. Three or more quotes open a raw
        // interpolated string.
        let mut quotes = 0usize;
        while self.peek_char() == Some('"') {
            quotes += 1;
            self.advance();
        }
        if quotes == 0 {
            // `$` followed by something that isn't a string at all.
            let span = self.span_from(start);
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::InvalidCharacter, span)
                    .with_args([EcoString::from("$")]),
            );
            return TokenKind::Error;
        }
        if quotes == 2 {
            // `$""` is a complete empty interpolated string.
            return TokenKind::InterpolatedString;
        }

        if quotes >= 3 {
            self.scan_raw_interpolated(start, dollars, quotes)
        } else {
            self.scan_interpolated_body(start, verbatim)
        }
    }

    /// Scans a non-raw interpolated string body up to its closing quote.
    fn scan_interpolated_body(&mut self, start: u32, verbatim: bool) -> TokenKind {
        let mut brace_depth = 0usize;
        loop {
            match self.peek_char() {
                None => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorCode::UnterminatedString,
                        self.span_from(start),
                    ));
                    return TokenKind::InterpolatedString;
                }
                Some('\n') if !verbatim && brace_depth == 0 => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorCode::UnterminatedString,
                        self.span_from(start),
                    ));
                    return TokenKind::InterpolatedString;
                }
                Some('\\') if !verbatim && brace_depth == 0 => {
                    self.advance();
                    self.advance();
                }
                Some('{') if brace_depth == 0 => {
                    // `{{` escapes; a lone `{` (or the last of an odd run)
                    // opens a hole.
                    let mut run = 0usize;
                    while self.peek_char() == Some('{') {
                        run += 1;
                        self.advance();
                    }
                    if run % 2 == 1 {
                        brace_depth = 1;
                    }
                }
                Some('}') if brace_depth == 1 => {
                    self.advance();
                    brace_depth = 0;
                }
                Some('{') => {
                    // Inside a hole: nested braces (object initializers).
                    self.advance();
                    brace_depth += 1;
                }
                Some('}') => {
                    // `}}` escapes and stray `}` at depth zero are text.
                    self.advance();
                    brace_depth = brace_depth.saturating_sub(1);
                }
                Some('"') if brace_depth == 0 => {
                    self.advance();
                    return TokenKind::InterpolatedString;
                }
                Some('"' | '$' | '@') if brace_depth > 0 => {
                    // A nested string literal inside a hole; skip it whole.
                    self.skip_nested_string();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scans a raw interpolated string: closing delimiter is a quote run of
    /// the same length as the opening run; holes open with `dollars` braces.
    fn scan_raw_interpolated(&mut self, start: u32, dollars: usize, quotes: usize) -> TokenKind {
        let mut brace_depth = 0usize;
        loop {
            match self.peek_char() {
                None => {
                    self.diagnostics.push(
                        Diagnostic::error(
                            ErrorCode::RawStringDelimiterMismatch,
                            self.span_from(start),
                        )
                        .with_args([EcoString::from(quotes.to_string())]),
                    );
                    return TokenKind::InterpolatedString;
                }
                Some('"') if brace_depth == 0 => {
                    let mut run = 0usize;
                    while self.peek_char() == Some('"') {
                        run += 1;
                        self.advance();
                    }
                    if run >= quotes {
                        return TokenKind::InterpolatedString;
                    }
                    // Shorter quote runs are literal text.
                }
                Some('{') if brace_depth == 0 => {
                    let mut run = 0usize;
                    while self.peek_char() == Some('{') && run < dollars {
                        run += 1;
                        self.advance();
                    }
                    if run == dollars {
                        brace_depth = 1;
                    }
                }
                Some('{') => {
                    self.advance();
                    brace_depth += 1;
                }
                Some('}') => {
                    self.advance();
                    brace_depth = brace_depth.saturating_sub(1);
                }
                Some('"' | '$' | '@') if brace_depth > 0 => {
                    self.skip_nested_string();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Skips a complete nested string literal inside an interpolation hole
    /// (regular, verbatim, char-adjacent `$`, or nested interpolation).
    fn skip_nested_string(&mut self) {
        let mut verbatim = false;
        while matches!(self.peek_char(), Some('$' | '@')) {
            if self.peek_char() == Some('@') {
                verbatim = true;
            }
            self.advance();
        }
        if self.peek_char() != Some('"') {
            return;
        }
        let mut quotes = 0usize;
        while self.peek_char() == Some('"') {
            quotes += 1;
            self.advance();
        }
        if quotes == 2 && self.peek_char() != Some('"') {
            return; // empty string
        }
        let closing = if quotes >= 3 { quotes } else { 1 };
        let mut depth = 0usize;
        loop {
            match self.peek_char() {
                None => return,
                Some('\\') if !verbatim && closing == 1 && depth == 0 => {
                    self.advance();
                    self.advance();
                }
                Some('{') => {
                    self.advance();
                    depth += 1;
                }
                Some('}') => {
                    self.advance();
                    depth = depth.saturating_sub(1);
                }
                Some('"') if depth == 0 => {
                    let mut run = 0usize;
                    while self.peek_char() == Some('"') {
                        run += 1;
                        self.advance();
                    }
                    if closing == 1 && verbatim && run % 2 == 1 {
                        return;
                    }
                    if closing == 1 && !verbatim {
                        return;
                    }
                    if run >= closing {
                        return;
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_source(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        Lexer::new(source, 0, DocumentationMode::Parse).lex()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, _) = lex_source(source);
        tokens
            .into_iter()
            .map(|t| t.kind())
            .filter(|k| !k.is_eof())
            .collect()
    }

    #[test]
    fn lex_empty() {
        let (tokens, diagnostics) = lex_source("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].kind().is_eof());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lex_identifiers_and_keywords() {
        assert_eq!(
            kinds("foo if while"),
            vec![
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::If),
                TokenKind::Keyword(Keyword::While),
            ]
        );
    }

    #[test]
    fn lex_contextual_keywords_are_identifiers() {
        let (tokens, _) = lex_source("var yield");
        assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        assert!(tokens[0].is_contextual(ContextualKeyword::Var));
        assert!(tokens[1].is_contextual(ContextualKeyword::Yield));
    }

    #[test]
    fn lex_verbatim_identifier() {
        let (tokens, _) = lex_source("@if");
        assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        assert_eq!(tokens[0].text(), "@if");
    }

    #[test]
    fn lex_integers() {
        let (tokens, diagnostics) = lex_source("42 0xFF 0b1010 1_000 7ul");
        assert!(diagnostics.is_empty());
        let values: Vec<_> = tokens
            .iter()
            .filter(|t| !t.kind().is_eof())
            .map(|t| t.value().cloned())
            .collect();
        assert_eq!(
            values,
            vec![
                Some(LiteralValue::Int(42)),
                Some(LiteralValue::Int(255)),
                Some(LiteralValue::Int(10)),
                Some(LiteralValue::Int(1000)),
                Some(LiteralValue::Int(7)),
            ]
        );
    }

    #[test]
    fn lex_floats() {
        let (tokens, diagnostics) = lex_source("3.14 2.5e10 1e-3 2f");
        assert!(diagnostics.is_empty());
        assert!(
            tokens
                .iter()
                .filter(|t| !t.kind().is_eof())
                .all(|t| t.kind() == TokenKind::FloatLiteral)
        );
    }

    #[test]
    fn integer_before_dot_dot_stays_integer() {
        assert_eq!(
            kinds("1..2"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::DotDot,
                TokenKind::IntLiteral,
            ]
        );
    }

    #[test]
    fn lex_strings() {
        let (tokens, diagnostics) = lex_source(r#""hello" @"c:\tmp""#);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind(), TokenKind::StringLiteral);
        assert_eq!(tokens[1].kind(), TokenKind::StringLiteral);
        assert_eq!(tokens[1].text(), r#"@"c:\tmp""#);
    }

    #[test]
    fn lex_unterminated_string() {
        let (tokens, diagnostics) = lex_source("\"abc");
        assert_eq!(tokens[0].kind(), TokenKind::StringLiteral);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::UnterminatedString);
    }

    #[test]
    fn lex_char_literals() {
        let (tokens, diagnostics) = lex_source(r"'a' '\n'");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].value(), Some(&LiteralValue::Char('a')));
        assert_eq!(tokens[1].value(), Some(&LiteralValue::Char('\n')));
    }

    #[test]
    fn lex_multi_character_operators() {
        assert_eq!(
            kinds(">>> >>>= ??= ?? ?. .. => <<="),
            vec![
                TokenKind::GreaterGreaterGreater,
                TokenKind::GreaterGreaterGreaterEquals,
                TokenKind::QuestionQuestionEquals,
                TokenKind::QuestionQuestion,
                TokenKind::QuestionDot,
                TokenKind::DotDot,
                TokenKind::EqualsGreater,
                TokenKind::LessLessEquals,
            ]
        );
    }

    #[test]
    fn adjacent_greaters_merge() {
        // The lexer merges maximally; the parser re-splits when a `>`
        // closes a type-argument list.
        assert_eq!(kinds("a>>b").len(), 3);
        assert_eq!(kinds("a>>b")[1], TokenKind::GreaterGreater);
    }

    #[test]
    fn lex_trivia_round_trip() {
        let source = "  x // one\n  /* two */ y\n";
        let (tokens, diagnostics) = lex_source(source);
        assert!(diagnostics.is_empty());
        let mut out = String::new();
        for token in &tokens {
            token.write_text(&mut out);
        }
        assert_eq!(out, source);
    }

    #[test]
    fn trailing_trivia_stops_after_newline() {
        let (tokens, _) = lex_source("x\n  y");
        // `x` owns the newline; the indent belongs to `y`.
        assert_eq!(tokens[0].full_text(), "x\n");
        assert_eq!(tokens[1].full_text(), "  y");
    }

    #[test]
    fn doc_comments_depend_on_mode() {
        let (tokens, _) = lex_source("/// docs\nx");
        assert!(
            tokens[0]
                .leading_trivia()
                .iter()
                .any(|t| matches!(t, Trivia::DocComment(_)))
        );

        let (tokens, _) = Lexer::new("/// docs\nx", 0, DocumentationMode::Skip).lex();
        assert!(
            tokens[0]
                .leading_trivia()
                .iter()
                .all(|t| !matches!(t, Trivia::DocComment(_)))
        );
    }

    #[test]
    fn line_directive_is_trivia() {
        let source = "#line 7 \"a.sb\"\nx";
        let (tokens, diagnostics) = lex_source(source);
        assert!(diagnostics.is_empty());
        assert!(
            tokens[0]
                .leading_trivia()
                .iter()
                .any(|t| matches!(t, Trivia::LineDirective(_)))
        );
        let mut out = String::new();
        for token in &tokens {
            token.write_text(&mut out);
        }
        assert_eq!(out, source);
    }

    #[test]
    fn hash_mid_line_is_error_not_directive() {
        let (tokens, diagnostics) = lex_source("x # y");
        assert_eq!(tokens[1].kind(), TokenKind::Error);
        assert_eq!(diagnostics[0].code, ErrorCode::InvalidCharacter);
    }

    #[test]
    fn lex_interpolated_simple() {
        let (tokens, diagnostics) = lex_source(r#"$"x = {x}""#);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind(), TokenKind::InterpolatedString);
        assert_eq!(tokens[0].text(), r#"$"x = {x}""#);
    }

    #[test]
    fn lex_interpolated_with_escaped_braces() {
        let (tokens, diagnostics) = lex_source(r#"$"{{{12}}}""#);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind(), TokenKind::InterpolatedString);
        assert_eq!(tokens[0].text(), r#"$"{{{12}}}""#);
        assert!(tokens[1].kind().is_eof());
    }

    #[test]
    fn lex_interpolated_nested_string_in_hole() {
        let source = r#"$"a{f("}x")}b""#;
        let (tokens, diagnostics) = lex_source(source);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].text(), source);
    }

    #[test]
    fn lex_interpolated_nested_interpolation() {
        let source = r#"$"a{$"inner {x}"}b""#;
        let (tokens, diagnostics) = lex_source(source);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].text(), source);
    }

    #[test]
    fn lex_raw_interpolated() {
        let source = "$\"\"\"a {x} b\"\"\"";
        let (tokens, diagnostics) = lex_source(source);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind(), TokenKind::InterpolatedString);
        assert_eq!(tokens[0].text(), source);
    }

    #[test]
    fn raw_interpolated_short_close_is_unterminated() {
        // Opened with three quotes, "closed" with two: never terminates.
        let source = "$\"\"\"abc\"\"";
        let (_, diagnostics) = lex_source(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::RawStringDelimiterMismatch);
    }

    #[test]
    fn lex_verbatim_interpolated() {
        let source = "$@\"line1\nline2 {x}\"";
        let (tokens, diagnostics) = lex_source(source);
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].text(), source);
    }

    #[test]
    fn lex_with_offset() {
        let (tokens, _) = Lexer::new("abc def", 4, DocumentationMode::Parse).lex();
        assert_eq!(tokens[0].text(), "def");
        assert_eq!(tokens[0].span(), Span::new(4, 7));
    }

    #[test]
    fn unterminated_block_comment_diagnosed() {
        let (tokens, diagnostics) = lex_source("/* open");
        assert!(tokens[0].kind().is_eof());
        assert_eq!(diagnostics[0].code, ErrorCode::UnterminatedComment);
    }
}
