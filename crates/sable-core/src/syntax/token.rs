// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for Sable lexical analysis.
//!
//! This module defines the tokens produced by the lexer. Tokens are
//! full-fidelity: each one carries its raw source text, its decoded literal
//! value (where applicable), and the whitespace/comment trivia around it,
//! so that any sequence of tokens can reproduce its source text exactly.
//!
//! # Token Structure
//!
//! Each token consists of:
//! - A [`TokenKind`] indicating the lexical category
//! - The raw source text and a [`Span`] locating it
//! - Leading and trailing [`Trivia`] for exact source reconstruction
//! - An `is_missing` flag for zero-width tokens synthesized during error
//!   recovery
//! - An optional contextual keyword tag: a word like `var` or `yield` is
//!   lexically an identifier but acts as a keyword in certain grammar
//!   positions

use ecow::EcoString;

use super::Span;

/// A reserved keyword.
///
/// Reserved keywords are never identifiers. Words that are keywords only in
/// certain positions (`var`, `yield`, `when`, ...) are lexed as identifiers
/// and tagged with a [`ContextualKeyword`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names are the keywords themselves")]
pub enum Keyword {
    As,
    Base,
    Bool,
    Break,
    Byte,
    Case,
    Catch,
    Char,
    Checked,
    Const,
    Continue,
    Decimal,
    Default,
    Do,
    Double,
    Else,
    False,
    Finally,
    Fixed,
    Float,
    For,
    Foreach,
    Goto,
    If,
    In,
    Int,
    Is,
    Lock,
    Long,
    New,
    Null,
    Object,
    Out,
    Private,
    Protected,
    Public,
    Ref,
    Return,
    Sbyte,
    Short,
    Sizeof,
    Static,
    String,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Uint,
    Ulong,
    Unchecked,
    Unsafe,
    Ushort,
    Using,
    Void,
    While,
}

impl Keyword {
    /// Looks up a keyword from its source text.
    #[must_use]
    pub fn from_str(text: &str) -> Option<Self> {
        Some(match text {
            "as" => Self::As,
            "base" => Self::Base,
            "bool" => Self::Bool,
            "break" => Self::Break,
            "byte" => Self::Byte,
            "case" => Self::Case,
            "catch" => Self::Catch,
            "char" => Self::Char,
            "checked" => Self::Checked,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "decimal" => Self::Decimal,
            "default" => Self::Default,
            "do" => Self::Do,
            "double" => Self::Double,
            "else" => Self::Else,
            "false" => Self::False,
            "finally" => Self::Finally,
            "fixed" => Self::Fixed,
            "float" => Self::Float,
            "for" => Self::For,
            "foreach" => Self::Foreach,
            "goto" => Self::Goto,
            "if" => Self::If,
            "in" => Self::In,
            "int" => Self::Int,
            "is" => Self::Is,
            "lock" => Self::Lock,
            "long" => Self::Long,
            "new" => Self::New,
            "null" => Self::Null,
            "object" => Self::Object,
            "out" => Self::Out,
            "private" => Self::Private,
            "protected" => Self::Protected,
            "public" => Self::Public,
            "ref" => Self::Ref,
            "return" => Self::Return,
            "sbyte" => Self::Sbyte,
            "short" => Self::Short,
            "sizeof" => Self::Sizeof,
            "static" => Self::Static,
            "string" => Self::String,
            "switch" => Self::Switch,
            "this" => Self::This,
            "throw" => Self::Throw,
            "true" => Self::True,
            "try" => Self::Try,
            "typeof" => Self::Typeof,
            "uint" => Self::Uint,
            "ulong" => Self::Ulong,
            "unchecked" => Self::Unchecked,
            "unsafe" => Self::Unsafe,
            "ushort" => Self::Ushort,
            "using" => Self::Using,
            "void" => Self::Void,
            "while" => Self::While,
            _ => return None,
        })
    }

    /// Returns `true` if this keyword names a predefined type
    /// (`int`, `string`, `bool`, ...).
    #[must_use]
    pub const fn is_predefined_type(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::Char
                | Self::Decimal
                | Self::Double
                | Self::Float
                | Self::Int
                | Self::Long
                | Self::Object
                | Self::Sbyte
                | Self::Short
                | Self::String
                | Self::Uint
                | Self::Ulong
                | Self::Ushort
                | Self::Void
        )
    }
}

/// A word that is a keyword only in certain grammar positions.
///
/// The lexer tags identifiers whose text matches one of these so the
/// parser can cheaply check `token.is_contextual(ContextualKeyword::Var)`
/// without string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names are the keywords themselves")]
pub enum ContextualKeyword {
    Ascending,
    Async,
    Await,
    By,
    Descending,
    Equals,
    From,
    Group,
    Into,
    Join,
    Let,
    Not,
    On,
    Orderby,
    Select,
    Var,
    When,
    Where,
    Yield,
}

impl ContextualKeyword {
    /// Looks up a contextual keyword from its source text.
    #[must_use]
    pub fn from_str(text: &str) -> Option<Self> {
        Some(match text {
            "ascending" => Self::Ascending,
            "async" => Self::Async,
            "await" => Self::Await,
            "by" => Self::By,
            "descending" => Self::Descending,
            "equals" => Self::Equals,
            "from" => Self::From,
            "group" => Self::Group,
            "into" => Self::Into,
            "join" => Self::Join,
            "let" => Self::Let,
            "not" => Self::Not,
            "on" => Self::On,
            "orderby" => Self::Orderby,
            "select" => Self::Select,
            "var" => Self::Var,
            "when" => Self::When,
            "where" => Self::Where,
            "yield" => Self::Yield,
            _ => return None,
        })
    }
}

/// The decoded value of a literal token.
///
/// The raw source text stays on the [`Token`]; this is the cooked value
/// (escapes processed, digit separators removed).
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// An integer literal value.
    Int(u64),
    /// A floating-point literal value.
    Float(f64),
    /// A character literal value.
    Char(char),
    /// A string literal value with escapes processed.
    String(EcoString),
}

/// The kind of token, not including source location, text, or trivia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals and names ===
    /// An identifier: `foo`, `myVariable`. May carry a contextual keyword tag.
    Identifier,
    /// A reserved keyword: `if`, `while`, `int`, ...
    Keyword(Keyword),
    /// An integer literal: `42`, `0xFF`, `1_000`
    IntLiteral,
    /// A floating-point literal: `3.14`, `2.5e10`, `1f`
    FloatLiteral,
    /// A string literal: `"hello"` or verbatim `@"c:\tmp"`
    StringLiteral,
    /// A character literal: `'a'`, `'\n'`
    CharLiteral,
    /// An entire interpolated string literal: `$"x = {x}"`.
    ///
    /// Lexed as one token (with brace/quote nesting tracked); the parser's
    /// interpolation sub-scanner decomposes it into segments and holes.
    InterpolatedString,

    // === Delimiters ===
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,

    // === Punctuation and operators ===
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `??`
    QuestionQuestion,
    /// `??=`
    QuestionQuestionEquals,
    /// `=>`
    EqualsGreater,
    /// `+`
    Plus,
    /// `++`
    PlusPlus,
    /// `+=`
    PlusEquals,
    /// `-`
    Minus,
    /// `--`
    MinusMinus,
    /// `-=`
    MinusEquals,
    /// `->`
    MinusGreater,
    /// `*`
    Star,
    /// `*=`
    StarEquals,
    /// `/`
    Slash,
    /// `/=`
    SlashEquals,
    /// `%`
    Percent,
    /// `%=`
    PercentEquals,
    /// `&`
    Amp,
    /// `&&`
    AmpAmp,
    /// `&=`
    AmpEquals,
    /// `|`
    Pipe,
    /// `||`
    PipePipe,
    /// `|=`
    PipeEquals,
    /// `^`
    Caret,
    /// `^=`
    CaretEquals,
    /// `!`
    Bang,
    /// `!=`
    BangEquals,
    /// `~`
    Tilde,
    /// `=`
    Equals,
    /// `==`
    EqualsEquals,
    /// `<`
    Less,
    /// `<=`
    LessEquals,
    /// `<<`
    LessLess,
    /// `<<=`
    LessLessEquals,
    /// `>`
    Greater,
    /// `>=`
    GreaterEquals,
    /// `>>`
    GreaterGreater,
    /// `>>=`
    GreaterGreaterEquals,
    /// `>>>`
    GreaterGreaterGreater,
    /// `>>>=`
    GreaterGreaterGreaterEquals,

    // === Special ===
    /// End of file. Owns any trailing file trivia in its leading trivia.
    Eof,
    /// Invalid/unrecognized text, preserved for error recovery.
    Error,
}

impl TokenKind {
    /// Returns `true` if this token is a literal value.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::FloatLiteral
                | Self::StringLiteral
                | Self::CharLiteral
                | Self::InterpolatedString
        )
    }

    /// Returns `true` if this is the end-of-file marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns `true` if this is an error token.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns `true` for tokens that begin with a `>` character and can be
    /// split so a single `>` closes a type-argument list.
    #[must_use]
    pub const fn starts_with_greater(&self) -> bool {
        matches!(
            self,
            Self::Greater
                | Self::GreaterEquals
                | Self::GreaterGreater
                | Self::GreaterGreaterEquals
                | Self::GreaterGreaterGreater
                | Self::GreaterGreaterGreaterEquals
        )
    }

    /// Returns the fixed source text for punctuation/operator tokens, or
    /// `None` for tokens whose text varies (identifiers, literals, errors).
    #[must_use]
    pub const fn fixed_text(&self) -> Option<&'static str> {
        Some(match self {
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::OpenBracket => "[",
            Self::CloseBracket => "]",
            Self::OpenBrace => "{",
            Self::CloseBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::Question => "?",
            Self::QuestionDot => "?.",
            Self::QuestionQuestion => "??",
            Self::QuestionQuestionEquals => "??=",
            Self::EqualsGreater => "=>",
            Self::Plus => "+",
            Self::PlusPlus => "++",
            Self::PlusEquals => "+=",
            Self::Minus => "-",
            Self::MinusMinus => "--",
            Self::MinusEquals => "-=",
            Self::MinusGreater => "->",
            Self::Star => "*",
            Self::StarEquals => "*=",
            Self::Slash => "/",
            Self::SlashEquals => "/=",
            Self::Percent => "%",
            Self::PercentEquals => "%=",
            Self::Amp => "&",
            Self::AmpAmp => "&&",
            Self::AmpEquals => "&=",
            Self::Pipe => "|",
            Self::PipePipe => "||",
            Self::PipeEquals => "|=",
            Self::Caret => "^",
            Self::CaretEquals => "^=",
            Self::Bang => "!",
            Self::BangEquals => "!=",
            Self::Tilde => "~",
            Self::Equals => "=",
            Self::EqualsEquals => "==",
            Self::Less => "<",
            Self::LessEquals => "<=",
            Self::LessLess => "<<",
            Self::LessLessEquals => "<<=",
            Self::Greater => ">",
            Self::GreaterEquals => ">=",
            Self::GreaterGreater => ">>",
            Self::GreaterGreaterEquals => ">>=",
            Self::GreaterGreaterGreater => ">>>",
            Self::GreaterGreaterGreaterEquals => ">>>=",
            _ => return None,
        })
    }
}

/// Trivia represents non-grammatical content attached to a token.
///
/// Preserving trivia enables bit-exact source reconstruction from the
/// syntax tree, including for malformed input: tokens the parser skips
/// during error recovery are wrapped as [`Trivia::Skipped`] rather than
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum Trivia {
    /// Whitespace (spaces, tabs, newlines)
    Whitespace(EcoString),

    /// A line comment: `// comment text`
    LineComment(EcoString),

    /// A block comment: `/* comment text */`
    BlockComment(EcoString),

    /// A doc comment: `/// doc text` (only when documentation parsing is on)
    DocComment(EcoString),

    /// A preprocessor-style line directive: `#line 7 "file.sb"`
    LineDirective(EcoString),

    /// An unexpected token the parser skipped during error recovery.
    ///
    /// The full token (with its own trivia) is preserved so reconstruction
    /// stays lossless.
    Skipped(Box<Token>),
}

impl Trivia {
    /// Writes the exact source text of this trivia into `out`.
    pub fn write_text(&self, out: &mut String) {
        match self {
            Self::Whitespace(s)
            | Self::LineComment(s)
            | Self::BlockComment(s)
            | Self::DocComment(s)
            | Self::LineDirective(s) => out.push_str(s),
            Self::Skipped(token) => token.write_text(out),
        }
    }

    /// Returns `true` if this trivia contains a newline.
    #[must_use]
    pub fn contains_newline(&self) -> bool {
        match self {
            Self::Whitespace(s)
            | Self::LineComment(s)
            | Self::BlockComment(s)
            | Self::DocComment(s)
            | Self::LineDirective(s) => s.contains('\n'),
            Self::Skipped(token) => {
                token.leading_trivia().iter().any(Self::contains_newline)
                    || token.trailing_trivia().iter().any(Self::contains_newline)
            }
        }
    }

    /// Returns `true` if this is whitespace.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace(_))
    }

    /// Returns `true` if this is a comment.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(
            self,
            Self::LineComment(_) | Self::BlockComment(_) | Self::DocComment(_)
        )
    }

    /// Returns `true` if this is a skipped-token wrapper.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// A token with its raw text, source location, and surrounding trivia.
///
/// # Examples
///
/// ```
/// use sable_core::syntax::{Span, Token, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier, "foo", Span::new(0, 3));
/// assert_eq!(token.kind(), TokenKind::Identifier);
/// assert_eq!(token.text(), "foo");
/// assert!(!token.is_missing());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    text: EcoString,
    span: Span,
    value: Option<LiteralValue>,
    contextual: Option<ContextualKeyword>,
    is_missing: bool,
    leading_trivia: Vec<Trivia>,
    trailing_trivia: Vec<Trivia>,
}

impl Token {
    /// Creates a new token with no trivia.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            value: None,
            contextual: None,
            is_missing: false,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }

    /// Creates a zero-width missing token of the given kind at `offset`.
    ///
    /// Missing tokens contribute no text to reconstruction but keep the
    /// tree shape complete after error recovery.
    #[must_use]
    pub fn missing(kind: TokenKind, offset: u32) -> Self {
        Self {
            kind,
            text: EcoString::new(),
            span: Span::empty(offset),
            value: None,
            contextual: None,
            is_missing: true,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }

    /// Attaches a decoded literal value.
    #[must_use]
    pub fn with_value(mut self, value: LiteralValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Tags this token as a contextual keyword.
    #[must_use]
    pub fn with_contextual(mut self, contextual: ContextualKeyword) -> Self {
        self.contextual = Some(contextual);
        self
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the raw source text of this token (empty for missing tokens).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the source span of this token (excluding trivia).
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the decoded literal value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&LiteralValue> {
        self.value.as_ref()
    }

    /// Returns the contextual keyword tag, if any.
    #[must_use]
    pub fn contextual(&self) -> Option<ContextualKeyword> {
        self.contextual
    }

    /// Returns `true` if this token matches the given contextual keyword.
    #[must_use]
    pub fn is_contextual(&self, keyword: ContextualKeyword) -> bool {
        self.contextual == Some(keyword)
    }

    /// Returns `true` if this token was synthesized during error recovery.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.is_missing
    }

    /// Returns `true` if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Returns the trivia that precedes this token.
    #[must_use]
    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.leading_trivia
    }

    /// Returns the trivia that follows this token.
    #[must_use]
    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.trailing_trivia
    }

    /// Sets the leading trivia for this token.
    pub fn set_leading_trivia(&mut self, trivia: Vec<Trivia>) {
        self.leading_trivia = trivia;
    }

    /// Sets the trailing trivia for this token.
    pub fn set_trailing_trivia(&mut self, trivia: Vec<Trivia>) {
        self.trailing_trivia = trivia;
    }

    /// Prepends trivia before the current leading trivia.
    ///
    /// Used to attach skipped tokens to the next real (or missing) token.
    pub fn prepend_leading_trivia(&mut self, mut trivia: Vec<Trivia>) {
        trivia.append(&mut self.leading_trivia);
        self.leading_trivia = trivia;
    }

    /// Writes the exact source text of this token, including its trivia.
    pub fn write_text(&self, out: &mut String) {
        for trivia in &self.leading_trivia {
            trivia.write_text(out);
        }
        out.push_str(&self.text);
        for trivia in &self.trailing_trivia {
            trivia.write_text(out);
        }
    }

    /// Returns the exact source text of this token, including its trivia.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(Keyword::from_str("if"), Some(Keyword::If));
        assert_eq!(Keyword::from_str("foreach"), Some(Keyword::Foreach));
        assert_eq!(Keyword::from_str("var"), None); // contextual, not reserved
        assert_eq!(Keyword::from_str("zebra"), None);
    }

    #[test]
    fn contextual_keyword_lookup() {
        assert_eq!(
            ContextualKeyword::from_str("var"),
            Some(ContextualKeyword::Var)
        );
        assert_eq!(
            ContextualKeyword::from_str("yield"),
            Some(ContextualKeyword::Yield)
        );
        assert_eq!(ContextualKeyword::from_str("if"), None);
    }

    #[test]
    fn predefined_type_keywords() {
        assert!(Keyword::Int.is_predefined_type());
        assert!(Keyword::String.is_predefined_type());
        assert!(Keyword::Void.is_predefined_type());
        assert!(!Keyword::If.is_predefined_type());
        assert!(!Keyword::New.is_predefined_type());
    }

    #[test]
    fn fixed_text_for_operators() {
        assert_eq!(TokenKind::QuestionQuestionEquals.fixed_text(), Some("??="));
        assert_eq!(
            TokenKind::GreaterGreaterGreaterEquals.fixed_text(),
            Some(">>>=")
        );
        assert_eq!(TokenKind::Identifier.fixed_text(), None);
    }

    #[test]
    fn greater_prefixed_tokens() {
        assert!(TokenKind::GreaterGreater.starts_with_greater());
        assert!(TokenKind::GreaterGreaterGreaterEquals.starts_with_greater());
        assert!(!TokenKind::Less.starts_with_greater());
    }

    #[test]
    fn missing_token_is_zero_width() {
        let token = Token::missing(TokenKind::Semicolon, 7);
        assert!(token.is_missing());
        assert_eq!(token.text(), "");
        assert!(token.span().is_empty());
        assert_eq!(token.span().start(), 7);
        assert_eq!(token.full_text(), "");
    }

    #[test]
    fn token_full_text_includes_trivia() {
        let mut token = Token::new(TokenKind::Identifier, "foo", Span::new(2, 5));
        token.set_leading_trivia(vec![Trivia::Whitespace("  ".into())]);
        token.set_trailing_trivia(vec![Trivia::LineComment("// hi".into())]);
        assert_eq!(token.full_text(), "  foo// hi");
    }

    #[test]
    fn skipped_trivia_preserves_token_text() {
        let mut skipped = Token::new(
            TokenKind::Keyword(Keyword::Private),
            "private",
            Span::new(0, 7),
        );
        skipped.set_trailing_trivia(vec![Trivia::Whitespace(" ".into())]);

        let mut target = Token::missing(TokenKind::Semicolon, 8);
        target.prepend_leading_trivia(vec![Trivia::Skipped(Box::new(skipped))]);
        assert_eq!(target.full_text(), "private ");
    }

    #[test]
    fn prepend_leading_trivia_keeps_order() {
        let mut token = Token::new(TokenKind::Identifier, "x", Span::new(4, 5));
        token.set_leading_trivia(vec![Trivia::Whitespace(" ".into())]);
        token.prepend_leading_trivia(vec![Trivia::LineComment("// a".into())]);
        assert_eq!(token.full_text(), "// a x");
    }

    #[test]
    fn contextual_tagging() {
        let token = Token::new(TokenKind::Identifier, "var", Span::new(0, 3))
            .with_contextual(ContextualKeyword::Var);
        assert!(token.is_contextual(ContextualKeyword::Var));
        assert!(!token.is_contextual(ContextualKeyword::Yield));
    }
}
