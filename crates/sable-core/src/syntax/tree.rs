// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The Sable syntax tree.
//!
//! Every grammar production is a variant of a closed sum type
//! ([`Expression`], [`Statement`], [`Type`], [`Pattern`]) holding exactly
//! its grammatical children — tokens and child nodes — in source order.
//! Nodes are built bottom-up and never mutated once linked into a parent.
//!
//! # Exact reconstruction
//!
//! Concatenating the full text (trivia + token text) of every token
//! reachable from a node reproduces exactly the source substring the node
//! spans. This holds for malformed input too: missing tokens contribute
//! empty text, and skipped tokens ride along as trivia. The invariant is
//! what makes `node.to_string()` a faithful inverse of parsing.
//!
//! All text and span queries are derived from one traversal primitive,
//! [`TokenWalk::for_each_token`], which visits every token in a node in
//! source order.

use super::Span;
use super::diagnostics::{Diagnostic, diagnostics_in};
use super::token::{Token, TokenKind};

/// The kind of a syntax node, one per grammar production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names mirror the grammar directly")]
pub enum SyntaxKind {
    // Literals and names
    NumericLiteral,
    StringLiteral,
    CharacterLiteral,
    TrueLiteral,
    FalseLiteral,
    NullLiteral,
    DefaultLiteral,
    InterpolatedStringExpression,
    IdentifierName,
    GenericName,
    ThisExpression,
    BaseExpression,

    // Types
    PredefinedType,
    QualifiedName,
    NullableType,
    PointerType,
    ArrayType,
    TupleType,
    RefType,

    // Grouping and creation
    ParenthesizedExpression,
    TupleExpression,
    CastExpression,
    ObjectCreationExpression,
    ImplicitObjectCreationExpression,
    ArrayCreationExpression,
    ImplicitArrayCreationExpression,
    AnonymousObjectCreationExpression,
    InitializerExpression,

    // Unary
    UnaryPlusExpression,
    UnaryMinusExpression,
    LogicalNotExpression,
    BitwiseNotExpression,
    PreIncrementExpression,
    PreDecrementExpression,
    AddressOfExpression,
    PointerIndirectionExpression,
    AwaitExpression,
    PostIncrementExpression,
    PostDecrementExpression,
    SuppressNullableWarningExpression,

    // Access and invocation
    InvocationExpression,
    ElementAccessExpression,
    SimpleMemberAccessExpression,
    PointerMemberAccessExpression,
    ConditionalAccessExpression,
    ConditionalElementAccessExpression,

    // Binary
    AddExpression,
    SubtractExpression,
    MultiplyExpression,
    DivideExpression,
    ModuloExpression,
    LeftShiftExpression,
    RightShiftExpression,
    UnsignedRightShiftExpression,
    LogicalOrExpression,
    LogicalAndExpression,
    BitwiseOrExpression,
    BitwiseAndExpression,
    ExclusiveOrExpression,
    EqualsExpression,
    NotEqualsExpression,
    LessThanExpression,
    LessThanOrEqualExpression,
    GreaterThanExpression,
    GreaterThanOrEqualExpression,
    CoalesceExpression,
    RangeExpression,
    IsPatternExpression,
    AsExpression,

    // Assignment
    SimpleAssignmentExpression,
    AddAssignmentExpression,
    SubtractAssignmentExpression,
    MultiplyAssignmentExpression,
    DivideAssignmentExpression,
    ModuloAssignmentExpression,
    AndAssignmentExpression,
    OrAssignmentExpression,
    ExclusiveOrAssignmentExpression,
    LeftShiftAssignmentExpression,
    RightShiftAssignmentExpression,
    UnsignedRightShiftAssignmentExpression,
    CoalesceAssignmentExpression,

    // Other expressions
    ConditionalExpression,
    SimpleLambdaExpression,
    ParenthesizedLambdaExpression,
    TypeofExpression,
    DefaultExpression,
    SizeofExpression,
    CheckedExpression,
    UncheckedExpression,
    ThrowExpression,
    QueryExpression,

    // Patterns
    TypePattern,
    DeclarationPattern,
    VarPattern,
    ConstantPattern,
    ParenthesizedPattern,
    NotPattern,

    // Statements
    Block,
    EmptyStatement,
    LabeledStatement,
    ExpressionStatement,
    LocalDeclarationStatement,
    LocalFunctionStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForEachStatement,
    SwitchStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    YieldReturnStatement,
    YieldBreakStatement,
    GotoStatement,
    GotoCaseStatement,
    GotoDefaultStatement,
    ThrowStatement,
    TryStatement,
    CheckedStatement,
    UncheckedStatement,
    UnsafeStatement,
    LockStatement,
    UsingStatement,
    FixedStatement,

    // Roots
    CompilationUnit,
}

// ============================================================================
// Token traversal
// ============================================================================

/// Visits every token reachable from a node, in source order.
///
/// `span()`, `Display`, and diagnostics filtering are all derived from this
/// single traversal, so a node variant only has to get its child order
/// right once.
pub trait TokenWalk {
    /// Calls `f` on each token of this node, in source order.
    fn for_each_token(&self, f: &mut dyn FnMut(&Token));
}

impl TokenWalk for Token {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        f(self);
    }
}

impl<T: TokenWalk> TokenWalk for Box<T> {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        (**self).for_each_token(f);
    }
}

impl<T: TokenWalk> TokenWalk for Option<T> {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        if let Some(inner) = self {
            inner.for_each_token(f);
        }
    }
}

impl<T: TokenWalk> TokenWalk for Vec<T> {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        for item in self {
            item.for_each_token(f);
        }
    }
}

/// Computes the span of any walkable node by merging its token spans.
fn span_of(node: &dyn TokenWalk) -> Span {
    let mut span: Option<Span> = None;
    node.for_each_token(&mut |token| {
        span = Some(match span {
            Some(s) => s.merge(token.span()),
            None => token.span(),
        });
    });
    span.unwrap_or_default()
}

/// Writes the exact source text of any walkable node.
fn write_node(node: &dyn TokenWalk, out: &mut String) {
    node.for_each_token(&mut |token| token.write_text(out));
}

macro_rules! impl_token_walk {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl TokenWalk for $ty {
            fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
                $(self.$field.for_each_token(f);)*
            }
        }
    };
}

macro_rules! impl_display {
    ($($ty:ty),* $(,)?) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut out = String::new();
                write_node(self, &mut out);
                f.write_str(&out)
            }
        })*
    };
}

// ============================================================================
// Shared list and clause shapes
// ============================================================================

/// A comma- (or otherwise-) separated list of nodes with its separator
/// tokens, interleaved `item sep item sep item`.
///
/// The list tolerates degenerate shapes from error recovery: more
/// separators than items (e.g. array ranks `[,]`) or a trailing separator.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparatedList<T> {
    /// The list items.
    pub items: Vec<T>,
    /// The separator tokens between (and possibly after) items.
    pub separators: Vec<Token>,
}

impl<T> SeparatedList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            separators: Vec::new(),
        }
    }

    /// Returns `true` if the list has no items and no separators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.separators.is_empty()
    }
}

impl<T> Default for SeparatedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TokenWalk> TokenWalk for SeparatedList<T> {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        let mut items = self.items.iter();
        let mut separators = self.separators.iter();
        loop {
            match (items.next(), separators.next()) {
                (Some(item), Some(sep)) => {
                    item.for_each_token(f);
                    sep.for_each_token(f);
                }
                (Some(item), None) => item.for_each_token(f),
                (None, Some(sep)) => sep.for_each_token(f),
                (None, None) => break,
            }
        }
    }
}

/// A simple or generic name: `foo` or `List<int>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Name {
    /// A plain identifier.
    Identifier {
        /// The identifier token.
        identifier: Token,
    },
    /// A generic name with a type-argument list.
    Generic {
        /// The identifier token.
        identifier: Token,
        /// The `<...>` type arguments.
        type_arguments: TypeArgumentList,
    },
}

impl Name {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Identifier { .. } => SyntaxKind::IdentifierName,
            Self::Generic { .. } => SyntaxKind::GenericName,
        }
    }

    /// Returns the identifier token.
    #[must_use]
    pub fn identifier(&self) -> &Token {
        match self {
            Self::Identifier { identifier } | Self::Generic { identifier, .. } => identifier,
        }
    }
}

impl TokenWalk for Name {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Identifier { identifier } => identifier.for_each_token(f),
            Self::Generic {
                identifier,
                type_arguments,
            } => {
                identifier.for_each_token(f);
                type_arguments.for_each_token(f);
            }
        }
    }
}

/// A `<T, U>` type-argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeArgumentList {
    /// The `<` token.
    pub open: Token,
    /// The type arguments.
    pub arguments: SeparatedList<Type>,
    /// The `>` token (possibly split out of a `>>`-family token).
    pub close: Token,
}

impl_token_walk!(TypeArgumentList { open, arguments, close });

/// A parenthesized argument list: `(a, ref b, name: c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentList {
    /// The `(` token.
    pub open: Token,
    /// The arguments.
    pub arguments: SeparatedList<Argument>,
    /// The `)` token.
    pub close: Token,
}

impl_token_walk!(ArgumentList { open, arguments, close });

/// A bracketed argument list: `[i, j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketedArgumentList {
    /// The `[` token.
    pub open: Token,
    /// The arguments.
    pub arguments: SeparatedList<Argument>,
    /// The `]` token.
    pub close: Token,
}

impl_token_walk!(BracketedArgumentList { open, arguments, close });

/// A single argument, optionally named and/or modified (`ref`/`out`/`in`).
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// The argument name, for `name:` arguments.
    pub name: Option<Token>,
    /// The `:` after the name.
    pub colon: Option<Token>,
    /// A `ref`, `out`, or `in` modifier.
    pub modifier: Option<Token>,
    /// The argument value.
    pub value: Expression,
}

impl_token_walk!(Argument { name, colon, modifier, value });

/// A variable declaration: a type followed by one or more declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The declared type (or `var`).
    pub ty: Type,
    /// The declarators.
    pub declarators: SeparatedList<VariableDeclarator>,
}

impl_token_walk!(VariableDeclaration { ty, declarators });

/// One declared variable with an optional initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// The variable name.
    pub identifier: Token,
    /// The `= value` clause, if present.
    pub initializer: Option<EqualsValueClause>,
}

impl_token_walk!(VariableDeclarator { identifier, initializer });

/// An `= value` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsValueClause {
    /// The `=` token.
    pub equals: Token,
    /// The initializer value.
    pub value: Expression,
}

impl_token_walk!(EqualsValueClause { equals, value });

/// A parenthesized parameter list for lambdas and local functions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterList {
    /// The `(` token.
    pub open: Token,
    /// The parameters.
    pub parameters: SeparatedList<Parameter>,
    /// The `)` token.
    pub close: Token,
}

impl_token_walk!(ParameterList { open, parameters, close });

/// A single parameter, optionally typed and modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// `ref`/`out`/`in` modifiers.
    pub modifiers: Vec<Token>,
    /// The parameter type (absent in implicitly-typed lambdas).
    pub ty: Option<Type>,
    /// The parameter name.
    pub identifier: Token,
}

impl_token_walk!(Parameter { modifiers, ty, identifier });

/// A `{ ... }` initializer: object, collection, or array initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    /// The `{` token.
    pub open: Token,
    /// The initializer expressions (assignments, values, or nested
    /// initializers).
    pub expressions: SeparatedList<Expression>,
    /// The `}` token.
    pub close: Token,
}

impl_token_walk!(Initializer { open, expressions, close });

/// One member of an anonymous object: `a = 1` or a bare projection `b.c`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousObjectMember {
    /// The member name, for explicitly named members.
    pub name: Option<Token>,
    /// The `=` after the name.
    pub equals: Option<Token>,
    /// The member value.
    pub value: Expression,
}

impl_token_walk!(AnonymousObjectMember { name, equals, value });

/// One element of a tuple expression, optionally named.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpressionElement {
    /// The element name.
    pub name: Option<Token>,
    /// The `:` after the name.
    pub colon: Option<Token>,
    /// The element value.
    pub value: Expression,
}

impl_token_walk!(TupleExpressionElement { name, colon, value });

/// One element of a tuple type, optionally named.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleTypeElement {
    /// The element type.
    pub ty: Type,
    /// The element name.
    pub name: Option<Token>,
}

impl_token_walk!(TupleTypeElement { ty, name });

/// An array rank specifier: `[ ]`, `[,]`, or `[3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRankSpecifier {
    /// The `[` token.
    pub open: Token,
    /// The rank sizes (empty for unsized ranks; commas without items for
    /// `[,]`).
    pub sizes: SeparatedList<Expression>,
    /// The `]` token.
    pub close: Token,
}

impl_token_walk!(ArrayRankSpecifier { open, sizes, close });

// ============================================================================
// Types
// ============================================================================

/// A type as it appears in source: casts, declarations, generics, `typeof`.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// A predefined keyword type: `int`, `string`, `void`, ...
    Predefined {
        /// The type keyword token.
        keyword: Token,
    },
    /// A simple or generic name (also covers contextual `var`).
    Name(Name),
    /// A dotted name: `A.B<C>`.
    Qualified {
        /// The qualifier.
        left: Box<Type>,
        /// The `.` token.
        dot: Token,
        /// The rightmost name.
        right: Name,
    },
    /// A nullable type: `T?`.
    Nullable {
        /// The element type.
        element: Box<Type>,
        /// The `?` token.
        question: Token,
    },
    /// A pointer type: `T*`.
    Pointer {
        /// The element type.
        element: Box<Type>,
        /// The `*` token.
        star: Token,
    },
    /// An array type: `T[]`, `T[,][]`.
    Array {
        /// The element type.
        element: Box<Type>,
        /// The rank specifiers, outermost first.
        ranks: Vec<ArrayRankSpecifier>,
    },
    /// A tuple type: `(int a, string b)`.
    Tuple {
        /// The `(` token.
        open: Token,
        /// The elements.
        elements: SeparatedList<TupleTypeElement>,
        /// The `)` token.
        close: Token,
    },
    /// A `ref` type prefix in locals: `ref T`.
    Ref {
        /// The `ref` keyword.
        ref_keyword: Token,
        /// The referenced type.
        ty: Box<Type>,
    },
}

impl Type {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Predefined { .. } => SyntaxKind::PredefinedType,
            Self::Name(name) => name.kind(),
            Self::Qualified { .. } => SyntaxKind::QualifiedName,
            Self::Nullable { .. } => SyntaxKind::NullableType,
            Self::Pointer { .. } => SyntaxKind::PointerType,
            Self::Array { .. } => SyntaxKind::ArrayType,
            Self::Tuple { .. } => SyntaxKind::TupleType,
            Self::Ref { .. } => SyntaxKind::RefType,
        }
    }

    /// Returns the source span of this type.
    #[must_use]
    pub fn span(&self) -> Span {
        span_of(self)
    }
}

impl TokenWalk for Type {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Predefined { keyword } => keyword.for_each_token(f),
            Self::Name(name) => name.for_each_token(f),
            Self::Qualified { left, dot, right } => {
                left.for_each_token(f);
                dot.for_each_token(f);
                right.for_each_token(f);
            }
            Self::Nullable { element, question } => {
                element.for_each_token(f);
                question.for_each_token(f);
            }
            Self::Pointer { element, star } => {
                element.for_each_token(f);
                star.for_each_token(f);
            }
            Self::Array { element, ranks } => {
                element.for_each_token(f);
                ranks.for_each_token(f);
            }
            Self::Tuple {
                open,
                elements,
                close,
            } => {
                open.for_each_token(f);
                elements.for_each_token(f);
                close.for_each_token(f);
            }
            Self::Ref { ref_keyword, ty } => {
                ref_keyword.for_each_token(f);
                ty.for_each_token(f);
            }
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// A pattern after `is`. Bounded at this layer: recursive property and
/// positional patterns belong to the semantic grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// A bare type pattern: `e is T`.
    Type {
        /// The matched type.
        ty: Type,
    },
    /// A declaration pattern: `e is T x`.
    Declaration {
        /// The matched type.
        ty: Type,
        /// The declared variable.
        identifier: Token,
    },
    /// A `var` pattern: `e is var x`.
    Var {
        /// The contextual `var` token.
        var_keyword: Token,
        /// The declared variable.
        identifier: Token,
    },
    /// A constant pattern: `e is 42`.
    Constant {
        /// The constant expression.
        expr: Box<Expression>,
    },
    /// A parenthesized pattern: `e is (T)`.
    Parenthesized {
        /// The `(` token.
        open: Token,
        /// The inner pattern.
        pattern: Box<Pattern>,
        /// The `)` token.
        close: Token,
    },
    /// A negated pattern: `e is not null`.
    Not {
        /// The contextual `not` token.
        not_keyword: Token,
        /// The negated pattern.
        pattern: Box<Pattern>,
    },
}

impl Pattern {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Type { .. } => SyntaxKind::TypePattern,
            Self::Declaration { .. } => SyntaxKind::DeclarationPattern,
            Self::Var { .. } => SyntaxKind::VarPattern,
            Self::Constant { .. } => SyntaxKind::ConstantPattern,
            Self::Parenthesized { .. } => SyntaxKind::ParenthesizedPattern,
            Self::Not { .. } => SyntaxKind::NotPattern,
        }
    }

    /// Returns the source span of this pattern.
    #[must_use]
    pub fn span(&self) -> Span {
        span_of(self)
    }
}

impl TokenWalk for Pattern {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Type { ty } => ty.for_each_token(f),
            Self::Declaration { ty, identifier } => {
                ty.for_each_token(f);
                identifier.for_each_token(f);
            }
            Self::Var {
                var_keyword,
                identifier,
            } => {
                var_keyword.for_each_token(f);
                identifier.for_each_token(f);
            }
            Self::Constant { expr } => expr.for_each_token(f),
            Self::Parenthesized {
                open,
                pattern,
                close,
            } => {
                open.for_each_token(f);
                pattern.for_each_token(f);
                close.for_each_token(f);
            }
            Self::Not {
                not_keyword,
                pattern,
            } => {
                not_keyword.for_each_token(f);
                pattern.for_each_token(f);
            }
        }
    }
}

// ============================================================================
// Interpolated strings
// ============================================================================

/// One part of an interpolated string: literal text or an expression hole.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolatedPart {
    /// A literal text segment (escaped braces stay in the raw text).
    Text {
        /// The text token.
        token: Token,
    },
    /// An expression hole: `{expr}` or `{expr:format}`.
    Hole {
        /// The opening brace run.
        open_brace: Token,
        /// The hole expression.
        expr: Box<Expression>,
        /// The format clause, if present.
        format: Option<FormatClause>,
        /// The closing brace run.
        close_brace: Token,
    },
}

impl TokenWalk for InterpolatedPart {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Text { token } => token.for_each_token(f),
            Self::Hole {
                open_brace,
                expr,
                format,
                close_brace,
            } => {
                open_brace.for_each_token(f);
                expr.for_each_token(f);
                format.for_each_token(f);
                close_brace.for_each_token(f);
            }
        }
    }
}

/// An interpolation format clause: `:N2` in `{x:N2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatClause {
    /// The `:` token.
    pub colon: Token,
    /// The raw format text.
    pub text: Token,
}

impl_token_walk!(FormatClause { colon, text });

// ============================================================================
// Query expressions
// ============================================================================

/// A `from` clause: `from T x in source`.
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    /// The contextual `from` token.
    pub from_keyword: Token,
    /// An optional range variable type.
    pub ty: Option<Type>,
    /// The range variable.
    pub identifier: Token,
    /// The `in` keyword.
    pub in_keyword: Token,
    /// The source expression.
    pub expr: Expression,
}

impl_token_walk!(FromClause { from_keyword, ty, identifier, in_keyword, expr });

/// One ordering in an `orderby` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    /// The key expression.
    pub expr: Expression,
    /// The contextual `ascending`/`descending` token, if present.
    pub direction: Option<Token>,
}

impl_token_walk!(Ordering { expr, direction });

/// A query body clause between the leading `from` and the final
/// `select`/`group`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// An additional `from` clause.
    From(FromClause),
    /// A `where` clause.
    Where {
        /// The contextual `where` token.
        where_keyword: Token,
        /// The filter condition.
        condition: Expression,
    },
    /// A `let` clause.
    Let {
        /// The contextual `let` token.
        let_keyword: Token,
        /// The introduced variable.
        identifier: Token,
        /// The `=` token.
        equals: Token,
        /// The bound expression.
        expr: Expression,
    },
    /// An `orderby` clause.
    OrderBy {
        /// The contextual `orderby` token.
        orderby_keyword: Token,
        /// The orderings.
        orderings: SeparatedList<Ordering>,
    },
    /// A `join` clause.
    Join {
        /// The contextual `join` token.
        join_keyword: Token,
        /// An optional range variable type.
        ty: Option<Type>,
        /// The joined range variable.
        identifier: Token,
        /// The `in` keyword.
        in_keyword: Token,
        /// The joined source.
        source: Expression,
        /// The contextual `on` token.
        on_keyword: Token,
        /// The left key.
        left: Expression,
        /// The contextual `equals` token.
        equals_keyword: Token,
        /// The right key.
        right: Expression,
        /// The contextual `into` token for group joins.
        into_keyword: Option<Token>,
        /// The group-join variable.
        into_identifier: Option<Token>,
    },
}

impl TokenWalk for QueryClause {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::From(clause) => clause.for_each_token(f),
            Self::Where {
                where_keyword,
                condition,
            } => {
                where_keyword.for_each_token(f);
                condition.for_each_token(f);
            }
            Self::Let {
                let_keyword,
                identifier,
                equals,
                expr,
            } => {
                let_keyword.for_each_token(f);
                identifier.for_each_token(f);
                equals.for_each_token(f);
                expr.for_each_token(f);
            }
            Self::OrderBy {
                orderby_keyword,
                orderings,
            } => {
                orderby_keyword.for_each_token(f);
                orderings.for_each_token(f);
            }
            Self::Join {
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
            } => {
                join_keyword.for_each_token(f);
                ty.for_each_token(f);
                identifier.for_each_token(f);
                in_keyword.for_each_token(f);
                source.for_each_token(f);
                on_keyword.for_each_token(f);
                left.for_each_token(f);
                equals_keyword.for_each_token(f);
                right.for_each_token(f);
                into_keyword.for_each_token(f);
                into_identifier.for_each_token(f);
            }
        }
    }
}

/// The final `select` or `group .. by` of a query body.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOrGroup {
    /// A `select` clause.
    Select {
        /// The contextual `select` token.
        select_keyword: Token,
        /// The projection.
        expr: Expression,
    },
    /// A `group .. by` clause.
    Group {
        /// The contextual `group` token.
        group_keyword: Token,
        /// The grouped element.
        expr: Expression,
        /// The contextual `by` token.
        by_keyword: Token,
        /// The grouping key.
        by_expr: Expression,
    },
}

impl TokenWalk for SelectOrGroup {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Select {
                select_keyword,
                expr,
            } => {
                select_keyword.for_each_token(f);
                expr.for_each_token(f);
            }
            Self::Group {
                group_keyword,
                expr,
                by_keyword,
                by_expr,
            } => {
                group_keyword.for_each_token(f);
                expr.for_each_token(f);
                by_keyword.for_each_token(f);
                by_expr.for_each_token(f);
            }
        }
    }
}

/// A query body: clauses, a final select/group, and an optional `into`
/// continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBody {
    /// The body clauses in order.
    pub clauses: Vec<QueryClause>,
    /// The final `select` or `group`.
    pub select_or_group: SelectOrGroup,
    /// The `into` continuation, if present.
    pub continuation: Option<Box<QueryContinuation>>,
}

impl_token_walk!(QueryBody { clauses, select_or_group, continuation });

/// A query continuation: `into g ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContinuation {
    /// The contextual `into` token.
    pub into_keyword: Token,
    /// The continuation variable.
    pub identifier: Token,
    /// The continued body.
    pub body: QueryBody,
}

impl_token_walk!(QueryContinuation { into_keyword, identifier, body });

// ============================================================================
// Lambdas
// ============================================================================

/// Lambda parameters: a bare identifier or a parenthesized list.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaParameters {
    /// A single untyped parameter: `x => ...`.
    Single(Token),
    /// A parenthesized list: `(x, int y) => ...`.
    List(ParameterList),
}

impl TokenWalk for LambdaParameters {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Single(token) => token.for_each_token(f),
            Self::List(list) => list.for_each_token(f),
        }
    }
}

/// A lambda body: an expression or a block.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    /// An expression body.
    Expression(Box<Expression>),
    /// A block body.
    Block(Block),
}

impl TokenWalk for LambdaBody {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Expression(expr) => expr.for_each_token(f),
            Self::Block(block) => block.for_each_token(f),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node. Each variant holds exactly its grammatical children
/// in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal: numeric, string, char, `true`, `false`, `null`, or the
    /// bare `default` literal.
    Literal {
        /// The literal token.
        token: Token,
    },
    /// An interpolated string.
    InterpolatedString {
        /// The opening sigils and quote run: `$"`, `$@"`, `$$"""`, ...
        start: Token,
        /// The text segments and holes.
        parts: Vec<InterpolatedPart>,
        /// The closing quote run (missing when unterminated).
        end: Token,
    },
    /// A simple or generic name used as a value.
    Name(Name),
    /// A predefined type keyword used as a value: `int.MaxValue`.
    PredefinedType {
        /// The type keyword token.
        keyword: Token,
    },
    /// `this`.
    This {
        /// The `this` keyword.
        token: Token,
    },
    /// `base`.
    Base {
        /// The `base` keyword.
        token: Token,
    },
    /// A parenthesized expression.
    Parenthesized {
        /// The `(` token.
        open: Token,
        /// The inner expression.
        expr: Box<Expression>,
        /// The `)` token.
        close: Token,
    },
    /// A tuple expression: `(a, b)` or `(x: 1, y: 2)`.
    Tuple {
        /// The `(` token.
        open: Token,
        /// The elements.
        elements: SeparatedList<TupleExpressionElement>,
        /// The `)` token.
        close: Token,
    },
    /// A cast: `(T)operand`.
    Cast {
        /// The `(` token.
        open: Token,
        /// The target type.
        ty: Type,
        /// The `)` token.
        close: Token,
        /// The casted operand.
        operand: Box<Expression>,
    },
    /// A prefix unary expression: `-x`, `!x`, `++x`, `&x`, `*p`, ...
    PrefixUnary {
        /// The operator token.
        operator: Token,
        /// The operand.
        operand: Box<Expression>,
    },
    /// An `await` expression.
    Await {
        /// The contextual `await` token.
        await_keyword: Token,
        /// The awaited operand.
        operand: Box<Expression>,
    },
    /// A postfix unary expression: `x++`, `x--`, or `x!`.
    PostfixUnary {
        /// The operand.
        operand: Box<Expression>,
        /// The operator token.
        operator: Token,
    },
    /// A binary expression.
    Binary {
        /// The left operand.
        left: Box<Expression>,
        /// The operator token.
        operator: Token,
        /// The right operand.
        right: Box<Expression>,
    },
    /// An assignment expression (simple or compound).
    Assignment {
        /// The assignment target.
        left: Box<Expression>,
        /// The operator token.
        operator: Token,
        /// The assigned value.
        right: Box<Expression>,
    },
    /// A conditional (ternary) expression.
    Conditional {
        /// The condition.
        condition: Box<Expression>,
        /// The `?` token.
        question: Token,
        /// The consequence.
        when_true: Box<Expression>,
        /// The `:` token.
        colon: Token,
        /// The alternative.
        when_false: Box<Expression>,
    },
    /// A range expression; either operand may be absent (`..`, `1..`,
    /// `..1`).
    Range {
        /// The left operand, if present.
        left: Option<Box<Expression>>,
        /// The `..` token.
        operator: Token,
        /// The right operand, if present.
        right: Option<Box<Expression>>,
    },
    /// An `is`-pattern test.
    IsPattern {
        /// The tested expression.
        expr: Box<Expression>,
        /// The `is` keyword.
        is_keyword: Token,
        /// The pattern.
        pattern: Pattern,
    },
    /// An `as` conversion.
    As {
        /// The converted expression.
        expr: Box<Expression>,
        /// The `as` keyword.
        as_keyword: Token,
        /// The target type.
        ty: Type,
    },
    /// An invocation: `f(a, b)`.
    Invocation {
        /// The invoked expression.
        callee: Box<Expression>,
        /// The arguments.
        arguments: ArgumentList,
    },
    /// An element access: `a[i]`.
    ElementAccess {
        /// The accessed expression.
        target: Box<Expression>,
        /// The bracketed arguments.
        arguments: BracketedArgumentList,
    },
    /// A member access: `a.b`, `a?.b`, or `p->b`.
    MemberAccess {
        /// The accessed expression.
        target: Box<Expression>,
        /// The `.`, `?.`, or `->` token.
        operator: Token,
        /// The member name.
        name: Name,
    },
    /// A conditional element access: `a?[i]`.
    ConditionalElementAccess {
        /// The accessed expression.
        target: Box<Expression>,
        /// The `?` token.
        question: Token,
        /// The bracketed arguments.
        arguments: BracketedArgumentList,
    },
    /// A lambda expression.
    Lambda {
        /// The contextual `async` token, if present.
        async_keyword: Option<Token>,
        /// The parameters.
        parameters: LambdaParameters,
        /// The `=>` token.
        arrow: Token,
        /// The body.
        body: LambdaBody,
    },
    /// An object creation: `new T(args) { ... }` or target-typed
    /// `new(args)`.
    ObjectCreation {
        /// The `new` keyword.
        new_keyword: Token,
        /// The created type (absent for target-typed `new`).
        ty: Option<Type>,
        /// The constructor arguments.
        arguments: Option<ArgumentList>,
        /// The object/collection initializer.
        initializer: Option<Initializer>,
    },
    /// An array creation: `new T[3]` or `new T[] { ... }`.
    ArrayCreation {
        /// The `new` keyword.
        new_keyword: Token,
        /// The array type (carries rank specifiers and sizes).
        ty: Type,
        /// The array initializer.
        initializer: Option<Initializer>,
    },
    /// An implicitly-typed array creation: `new[] { 1, 2 }`.
    ImplicitArrayCreation {
        /// The `new` keyword.
        new_keyword: Token,
        /// The `[` token.
        open_bracket: Token,
        /// Rank commas for multi-dimensional forms.
        commas: Vec<Token>,
        /// The `]` token.
        close_bracket: Token,
        /// The initializer.
        initializer: Initializer,
    },
    /// An anonymous object: `new { a = 1, b }`.
    AnonymousObject {
        /// The `new` keyword.
        new_keyword: Token,
        /// The `{` token.
        open: Token,
        /// The members.
        members: SeparatedList<AnonymousObjectMember>,
        /// The `}` token.
        close: Token,
    },
    /// A `{ ... }` initializer in expression position (nested inside
    /// another initializer).
    Initializer(Initializer),
    /// A `typeof(T)` expression.
    Typeof {
        /// The `typeof` keyword.
        keyword: Token,
        /// The `(` token.
        open: Token,
        /// The queried type.
        ty: Type,
        /// The `)` token.
        close: Token,
    },
    /// A `default(T)` expression.
    Default {
        /// The `default` keyword.
        keyword: Token,
        /// The `(` token.
        open: Token,
        /// The target type.
        ty: Type,
        /// The `)` token.
        close: Token,
    },
    /// A `sizeof(T)` expression.
    Sizeof {
        /// The `sizeof` keyword.
        keyword: Token,
        /// The `(` token.
        open: Token,
        /// The measured type.
        ty: Type,
        /// The `)` token.
        close: Token,
    },
    /// A `checked(e)` or `unchecked(e)` expression.
    CheckedExpression {
        /// The `checked`/`unchecked` keyword.
        keyword: Token,
        /// The `(` token.
        open: Token,
        /// The inner expression.
        expr: Box<Expression>,
        /// The `)` token.
        close: Token,
    },
    /// A `throw e` expression.
    Throw {
        /// The `throw` keyword.
        throw_keyword: Token,
        /// The thrown expression.
        expr: Box<Expression>,
    },
    /// A query expression.
    Query {
        /// The leading `from` clause.
        from: Box<FromClause>,
        /// The query body.
        body: Box<QueryBody>,
    },
}

impl Expression {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        use super::token::Keyword as Kw;
        match self {
            Self::Literal { token } => match token.kind() {
                TokenKind::IntLiteral | TokenKind::FloatLiteral => SyntaxKind::NumericLiteral,
                TokenKind::StringLiteral => SyntaxKind::StringLiteral,
                TokenKind::CharLiteral => SyntaxKind::CharacterLiteral,
                TokenKind::Keyword(Kw::True) => SyntaxKind::TrueLiteral,
                TokenKind::Keyword(Kw::False) => SyntaxKind::FalseLiteral,
                TokenKind::Keyword(Kw::Null) => SyntaxKind::NullLiteral,
                TokenKind::Keyword(Kw::Default) => SyntaxKind::DefaultLiteral,
                // Missing identifiers synthesized during recovery.
                _ => SyntaxKind::IdentifierName,
            },
            Self::InterpolatedString { .. } => SyntaxKind::InterpolatedStringExpression,
            Self::Name(name) => name.kind(),
            Self::PredefinedType { .. } => SyntaxKind::PredefinedType,
            Self::This { .. } => SyntaxKind::ThisExpression,
            Self::Base { .. } => SyntaxKind::BaseExpression,
            Self::Parenthesized { .. } => SyntaxKind::ParenthesizedExpression,
            Self::Tuple { .. } => SyntaxKind::TupleExpression,
            Self::Cast { .. } => SyntaxKind::CastExpression,
            Self::PrefixUnary { operator, .. } => match operator.kind() {
                TokenKind::Plus => SyntaxKind::UnaryPlusExpression,
                TokenKind::Minus => SyntaxKind::UnaryMinusExpression,
                TokenKind::Bang => SyntaxKind::LogicalNotExpression,
                TokenKind::Tilde => SyntaxKind::BitwiseNotExpression,
                TokenKind::PlusPlus => SyntaxKind::PreIncrementExpression,
                TokenKind::MinusMinus => SyntaxKind::PreDecrementExpression,
                TokenKind::Amp => SyntaxKind::AddressOfExpression,
                _ => SyntaxKind::PointerIndirectionExpression,
            },
            Self::Await { .. } => SyntaxKind::AwaitExpression,
            Self::PostfixUnary { operator, .. } => match operator.kind() {
                TokenKind::PlusPlus => SyntaxKind::PostIncrementExpression,
                TokenKind::MinusMinus => SyntaxKind::PostDecrementExpression,
                _ => SyntaxKind::SuppressNullableWarningExpression,
            },
            Self::Binary { operator, .. } => match operator.kind() {
                TokenKind::Plus => SyntaxKind::AddExpression,
                TokenKind::Minus => SyntaxKind::SubtractExpression,
                TokenKind::Star => SyntaxKind::MultiplyExpression,
                TokenKind::Slash => SyntaxKind::DivideExpression,
                TokenKind::Percent => SyntaxKind::ModuloExpression,
                TokenKind::LessLess => SyntaxKind::LeftShiftExpression,
                TokenKind::GreaterGreater => SyntaxKind::RightShiftExpression,
                TokenKind::GreaterGreaterGreater => SyntaxKind::UnsignedRightShiftExpression,
                TokenKind::PipePipe => SyntaxKind::LogicalOrExpression,
                TokenKind::AmpAmp => SyntaxKind::LogicalAndExpression,
                TokenKind::Pipe => SyntaxKind::BitwiseOrExpression,
                TokenKind::Amp => SyntaxKind::BitwiseAndExpression,
                TokenKind::Caret => SyntaxKind::ExclusiveOrExpression,
                TokenKind::EqualsEquals => SyntaxKind::EqualsExpression,
                TokenKind::BangEquals => SyntaxKind::NotEqualsExpression,
                TokenKind::Less => SyntaxKind::LessThanExpression,
                TokenKind::LessEquals => SyntaxKind::LessThanOrEqualExpression,
                TokenKind::Greater => SyntaxKind::GreaterThanExpression,
                TokenKind::GreaterEquals => SyntaxKind::GreaterThanOrEqualExpression,
                _ => SyntaxKind::CoalesceExpression,
            },
            Self::Assignment { operator, .. } => match operator.kind() {
                TokenKind::Equals => SyntaxKind::SimpleAssignmentExpression,
                TokenKind::PlusEquals => SyntaxKind::AddAssignmentExpression,
                TokenKind::MinusEquals => SyntaxKind::SubtractAssignmentExpression,
                TokenKind::StarEquals => SyntaxKind::MultiplyAssignmentExpression,
                TokenKind::SlashEquals => SyntaxKind::DivideAssignmentExpression,
                TokenKind::PercentEquals => SyntaxKind::ModuloAssignmentExpression,
                TokenKind::AmpEquals => SyntaxKind::AndAssignmentExpression,
                TokenKind::PipeEquals => SyntaxKind::OrAssignmentExpression,
                TokenKind::CaretEquals => SyntaxKind::ExclusiveOrAssignmentExpression,
                TokenKind::LessLessEquals => SyntaxKind::LeftShiftAssignmentExpression,
                TokenKind::GreaterGreaterEquals => SyntaxKind::RightShiftAssignmentExpression,
                TokenKind::GreaterGreaterGreaterEquals => {
                    SyntaxKind::UnsignedRightShiftAssignmentExpression
                }
                _ => SyntaxKind::CoalesceAssignmentExpression,
            },
            Self::Conditional { .. } => SyntaxKind::ConditionalExpression,
            Self::Range { .. } => SyntaxKind::RangeExpression,
            Self::IsPattern { .. } => SyntaxKind::IsPatternExpression,
            Self::As { .. } => SyntaxKind::AsExpression,
            Self::Invocation { .. } => SyntaxKind::InvocationExpression,
            Self::ElementAccess { .. } => SyntaxKind::ElementAccessExpression,
            Self::MemberAccess { operator, .. } => match operator.kind() {
                TokenKind::QuestionDot => SyntaxKind::ConditionalAccessExpression,
                TokenKind::MinusGreater => SyntaxKind::PointerMemberAccessExpression,
                _ => SyntaxKind::SimpleMemberAccessExpression,
            },
            Self::ConditionalElementAccess { .. } => SyntaxKind::ConditionalElementAccessExpression,
            Self::Lambda { parameters, .. } => match parameters {
                LambdaParameters::Single(_) => SyntaxKind::SimpleLambdaExpression,
                LambdaParameters::List(_) => SyntaxKind::ParenthesizedLambdaExpression,
            },
            Self::ObjectCreation { ty, .. } => {
                if ty.is_some() {
                    SyntaxKind::ObjectCreationExpression
                } else {
                    SyntaxKind::ImplicitObjectCreationExpression
                }
            }
            Self::ArrayCreation { .. } => SyntaxKind::ArrayCreationExpression,
            Self::ImplicitArrayCreation { .. } => SyntaxKind::ImplicitArrayCreationExpression,
            Self::AnonymousObject { .. } => SyntaxKind::AnonymousObjectCreationExpression,
            Self::Initializer(_) => SyntaxKind::InitializerExpression,
            Self::Typeof { .. } => SyntaxKind::TypeofExpression,
            Self::Default { .. } => SyntaxKind::DefaultExpression,
            Self::Sizeof { .. } => SyntaxKind::SizeofExpression,
            Self::CheckedExpression { keyword, .. } => {
                if keyword.is_keyword(Kw::Checked) {
                    SyntaxKind::CheckedExpression
                } else {
                    SyntaxKind::UncheckedExpression
                }
            }
            Self::Throw { .. } => SyntaxKind::ThrowExpression,
            Self::Query { .. } => SyntaxKind::QueryExpression,
        }
    }

    /// Returns the source span of this expression (excluding trivia).
    #[must_use]
    pub fn span(&self) -> Span {
        span_of(self)
    }

    /// Returns the diagnostics from `all` whose spans fall within this node.
    pub fn diagnostics_in<'a>(
        &self,
        all: &'a [Diagnostic],
    ) -> impl Iterator<Item = &'a Diagnostic> {
        diagnostics_in(all, self.span())
    }

    /// Returns `true` if this is a synthesized missing-identifier
    /// placeholder produced by error recovery.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Name(Name::Identifier { identifier }) => identifier.is_missing(),
            _ => false,
        }
    }
}

impl TokenWalk for Expression {
    #[expect(clippy::too_many_lines, reason = "one arm per grammar production")]
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Literal { token } | Self::This { token } | Self::Base { token } => {
                token.for_each_token(f);
            }
            Self::PredefinedType { keyword } => keyword.for_each_token(f),
            Self::InterpolatedString { start, parts, end } => {
                start.for_each_token(f);
                parts.for_each_token(f);
                end.for_each_token(f);
            }
            Self::Name(name) => name.for_each_token(f),
            Self::Parenthesized { open, expr, close } => {
                open.for_each_token(f);
                expr.for_each_token(f);
                close.for_each_token(f);
            }
            Self::Tuple {
                open,
                elements,
                close,
            } => {
                open.for_each_token(f);
                elements.for_each_token(f);
                close.for_each_token(f);
            }
            Self::Cast {
                open,
                ty,
                close,
                operand,
            } => {
                open.for_each_token(f);
                ty.for_each_token(f);
                close.for_each_token(f);
                operand.for_each_token(f);
            }
            Self::PrefixUnary { operator, operand } => {
                operator.for_each_token(f);
                operand.for_each_token(f);
            }
            Self::Await {
                await_keyword,
                operand,
            } => {
                await_keyword.for_each_token(f);
                operand.for_each_token(f);
            }
            Self::PostfixUnary { operand, operator } => {
                operand.for_each_token(f);
                operator.for_each_token(f);
            }
            Self::Binary {
                left,
                operator,
                right,
            }
            | Self::Assignment {
                left,
                operator,
                right,
            } => {
                left.for_each_token(f);
                operator.for_each_token(f);
                right.for_each_token(f);
            }
            Self::Conditional {
                condition,
                question,
                when_true,
                colon,
                when_false,
            } => {
                condition.for_each_token(f);
                question.for_each_token(f);
                when_true.for_each_token(f);
                colon.for_each_token(f);
                when_false.for_each_token(f);
            }
            Self::Range {
                left,
                operator,
                right,
            } => {
                left.for_each_token(f);
                operator.for_each_token(f);
                right.for_each_token(f);
            }
            Self::IsPattern {
                expr,
                is_keyword,
                pattern,
            } => {
                expr.for_each_token(f);
                is_keyword.for_each_token(f);
                pattern.for_each_token(f);
            }
            Self::As {
                expr,
                as_keyword,
                ty,
            } => {
                expr.for_each_token(f);
                as_keyword.for_each_token(f);
                ty.for_each_token(f);
            }
            Self::Invocation { callee, arguments } => {
                callee.for_each_token(f);
                arguments.for_each_token(f);
            }
            Self::ElementAccess { target, arguments } => {
                target.for_each_token(f);
                arguments.for_each_token(f);
            }
            Self::MemberAccess {
                target,
                operator,
                name,
            } => {
                target.for_each_token(f);
                operator.for_each_token(f);
                name.for_each_token(f);
            }
            Self::ConditionalElementAccess {
                target,
                question,
                arguments,
            } => {
                target.for_each_token(f);
                question.for_each_token(f);
                arguments.for_each_token(f);
            }
            Self::Lambda {
                async_keyword,
                parameters,
                arrow,
                body,
            } => {
                async_keyword.for_each_token(f);
                parameters.for_each_token(f);
                arrow.for_each_token(f);
                body.for_each_token(f);
            }
            Self::ObjectCreation {
                new_keyword,
                ty,
                arguments,
                initializer,
            } => {
                new_keyword.for_each_token(f);
                ty.for_each_token(f);
                arguments.for_each_token(f);
                initializer.for_each_token(f);
            }
            Self::ArrayCreation {
                new_keyword,
                ty,
                initializer,
            } => {
                new_keyword.for_each_token(f);
                ty.for_each_token(f);
                initializer.for_each_token(f);
            }
            Self::ImplicitArrayCreation {
                new_keyword,
                open_bracket,
                commas,
                close_bracket,
                initializer,
            } => {
                new_keyword.for_each_token(f);
                open_bracket.for_each_token(f);
                commas.for_each_token(f);
                close_bracket.for_each_token(f);
                initializer.for_each_token(f);
            }
            Self::AnonymousObject {
                new_keyword,
                open,
                members,
                close,
            } => {
                new_keyword.for_each_token(f);
                open.for_each_token(f);
                members.for_each_token(f);
                close.for_each_token(f);
            }
            Self::Initializer(initializer) => initializer.for_each_token(f),
            Self::Typeof {
                keyword,
                open,
                ty,
                close,
            }
            | Self::Default {
                keyword,
                open,
                ty,
                close,
            }
            | Self::Sizeof {
                keyword,
                open,
                ty,
                close,
            } => {
                keyword.for_each_token(f);
                open.for_each_token(f);
                ty.for_each_token(f);
                close.for_each_token(f);
            }
            Self::CheckedExpression {
                keyword,
                open,
                expr,
                close,
            } => {
                keyword.for_each_token(f);
                open.for_each_token(f);
                expr.for_each_token(f);
                close.for_each_token(f);
            }
            Self::Throw {
                throw_keyword,
                expr,
            } => {
                throw_keyword.for_each_token(f);
                expr.for_each_token(f);
            }
            Self::Query { from, body } => {
                from.for_each_token(f);
                body.for_each_token(f);
            }
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A `{ ... }` statement block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The `{` token.
    pub open: Token,
    /// The contained statements.
    pub statements: Vec<Statement>,
    /// The `}` token.
    pub close: Token,
}

impl_token_walk!(Block { open, statements, close });

/// An `else` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    /// The `else` keyword.
    pub else_keyword: Token,
    /// The else body.
    pub statement: Box<Statement>,
}

impl_token_walk!(ElseClause { else_keyword, statement });

/// A `catch` clause with optional declaration and `when` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// The `catch` keyword.
    pub catch_keyword: Token,
    /// The `(T e)` declaration, if present.
    pub declaration: Option<CatchDeclaration>,
    /// The `when (cond)` filter, if present.
    pub filter: Option<CatchFilter>,
    /// The handler block.
    pub block: Block,
}

impl_token_walk!(CatchClause { catch_keyword, declaration, filter, block });

/// A catch declaration: `(ExceptionType name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchDeclaration {
    /// The `(` token.
    pub open: Token,
    /// The exception type.
    pub ty: Type,
    /// The exception variable, if named.
    pub identifier: Option<Token>,
    /// The `)` token.
    pub close: Token,
}

impl_token_walk!(CatchDeclaration { open, ty, identifier, close });

/// A catch filter: `when (condition)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchFilter {
    /// The contextual `when` token.
    pub when_keyword: Token,
    /// The `(` token.
    pub open: Token,
    /// The filter condition.
    pub condition: Expression,
    /// The `)` token.
    pub close: Token,
}

impl_token_walk!(CatchFilter { when_keyword, open, condition, close });

/// A `finally` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FinallyClause {
    /// The `finally` keyword.
    pub finally_keyword: Token,
    /// The finally block.
    pub block: Block,
}

impl_token_walk!(FinallyClause { finally_keyword, block });

/// A switch section: one or more labels followed by statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchSection {
    /// The section labels.
    pub labels: Vec<SwitchLabel>,
    /// The section statements.
    pub statements: Vec<Statement>,
}

impl_token_walk!(SwitchSection { labels, statements });

/// A `case value:` or `default:` label.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchLabel {
    /// A `case value:` label.
    Case {
        /// The `case` keyword.
        case_keyword: Token,
        /// The case value.
        value: Expression,
        /// The `:` token.
        colon: Token,
    },
    /// A `default:` label.
    Default {
        /// The `default` keyword.
        default_keyword: Token,
        /// The `:` token.
        colon: Token,
    },
}

impl TokenWalk for SwitchLabel {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Case {
                case_keyword,
                value,
                colon,
            } => {
                case_keyword.for_each_token(f);
                value.for_each_token(f);
                colon.for_each_token(f);
            }
            Self::Default {
                default_keyword,
                colon,
            } => {
                default_keyword.for_each_token(f);
                colon.for_each_token(f);
            }
        }
    }
}

/// A `for` statement initializer: a declaration or an expression list.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInitializer {
    /// A variable declaration.
    Declaration(VariableDeclaration),
    /// A comma-separated expression list.
    Expressions(SeparatedList<Expression>),
}

impl TokenWalk for ForInitializer {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Declaration(declaration) => declaration.for_each_token(f),
            Self::Expressions(expressions) => expressions.for_each_token(f),
        }
    }
}

/// The resource of a `using` or `fixed` statement header.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceClause {
    /// A declaration resource: `using (var f = Open())`.
    Declaration(VariableDeclaration),
    /// An expression resource: `using (stream)`.
    Expression(Expression),
}

impl TokenWalk for ResourceClause {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Declaration(declaration) => declaration.for_each_token(f),
            Self::Expression(expression) => expression.for_each_token(f),
        }
    }
}

/// The target of a `goto` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum GotoTarget {
    /// `goto label;`
    Label(Token),
    /// `goto case value;`
    Case {
        /// The `case` keyword.
        case_keyword: Token,
        /// The case value.
        value: Box<Expression>,
    },
    /// `goto default;`
    Default {
        /// The `default` keyword.
        default_keyword: Token,
    },
}

impl TokenWalk for GotoTarget {
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Label(token) => token.for_each_token(f),
            Self::Case {
                case_keyword,
                value,
            } => {
                case_keyword.for_each_token(f);
                value.for_each_token(f);
            }
            Self::Default { default_keyword } => default_keyword.for_each_token(f),
        }
    }
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A `{ ... }` block.
    Block(Block),
    /// A bare `;`.
    Empty {
        /// The `;` token.
        semicolon: Token,
    },
    /// A labeled statement: `label: stmt`.
    Labeled {
        /// The label identifier.
        label: Token,
        /// The `:` token.
        colon: Token,
        /// The labeled statement.
        statement: Box<Statement>,
    },
    /// An expression statement.
    Expression {
        /// The expression.
        expr: Expression,
        /// The `;` terminator (missing when absent).
        semicolon: Token,
    },
    /// A local declaration, including `using`-declaration and modifier
    /// (`const`/`ref`) forms.
    LocalDeclaration {
        /// The contextual `await` token for `await using` declarations.
        await_keyword: Option<Token>,
        /// The `using` keyword for using-declarations.
        using_keyword: Option<Token>,
        /// `const`/`static` modifiers.
        modifiers: Vec<Token>,
        /// The declaration.
        declaration: VariableDeclaration,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A local function declaration.
    LocalFunction {
        /// `static`/`unsafe`/contextual `async` modifiers.
        modifiers: Vec<Token>,
        /// The return type.
        return_type: Type,
        /// The function name.
        identifier: Token,
        /// The parameters.
        parameters: ParameterList,
        /// The function body.
        body: Block,
    },
    /// An `if` statement with optional `else`.
    If {
        /// The `if` keyword (missing when synthesized for a bare `else`).
        if_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The condition.
        condition: Expression,
        /// The `)` token.
        close: Token,
        /// The then-branch.
        statement: Box<Statement>,
        /// The `else` clause, if present.
        else_clause: Option<ElseClause>,
    },
    /// A `while` statement.
    While {
        /// The `while` keyword.
        while_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The condition.
        condition: Expression,
        /// The `)` token.
        close: Token,
        /// The loop body.
        body: Box<Statement>,
    },
    /// A `do ... while (...)` statement.
    Do {
        /// The `do` keyword.
        do_keyword: Token,
        /// The loop body.
        body: Box<Statement>,
        /// The `while` keyword.
        while_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The condition.
        condition: Expression,
        /// The `)` token.
        close: Token,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A classic `for` statement.
    For {
        /// The `for` keyword.
        for_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The initializer, if present.
        initializer: Option<ForInitializer>,
        /// The first `;`.
        first_semicolon: Token,
        /// The condition, if present.
        condition: Option<Expression>,
        /// The second `;`.
        second_semicolon: Token,
        /// The incrementors.
        incrementors: SeparatedList<Expression>,
        /// The `)` token.
        close: Token,
        /// The loop body.
        body: Box<Statement>,
    },
    /// A `foreach` statement.
    ForEach {
        /// The contextual `await` token, if present.
        await_keyword: Option<Token>,
        /// The `foreach` keyword.
        foreach_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The iteration variable type.
        ty: Type,
        /// The iteration variable.
        identifier: Token,
        /// The `in` keyword.
        in_keyword: Token,
        /// The iterated expression.
        expr: Expression,
        /// The `)` token.
        close: Token,
        /// The loop body.
        body: Box<Statement>,
    },
    /// A `switch` statement.
    Switch {
        /// The `switch` keyword.
        switch_keyword: Token,
        /// The `(` token (missing when the governing expression was not
        /// parenthesized).
        open_paren: Token,
        /// The governing expression.
        governing: Expression,
        /// The `)` token.
        close_paren: Token,
        /// The `{` token.
        open_brace: Token,
        /// The switch sections.
        sections: Vec<SwitchSection>,
        /// The `}` token.
        close_brace: Token,
    },
    /// A `break;` statement.
    Break {
        /// The `break` keyword.
        break_keyword: Token,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A `continue;` statement.
    Continue {
        /// The `continue` keyword.
        continue_keyword: Token,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A `return` statement.
    Return {
        /// The `return` keyword.
        return_keyword: Token,
        /// The returned expression, if present.
        expr: Option<Expression>,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A `yield return` or `yield break` statement.
    Yield {
        /// The contextual `yield` token.
        yield_keyword: Token,
        /// The `return` or `break` keyword.
        return_or_break: Token,
        /// The yielded expression (for `yield return`).
        expr: Option<Expression>,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A `goto` statement (plain, `case`, or `default`).
    Goto {
        /// The `goto` keyword.
        goto_keyword: Token,
        /// The jump target.
        target: GotoTarget,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A `throw` statement.
    Throw {
        /// The `throw` keyword.
        throw_keyword: Token,
        /// The thrown expression (absent for rethrow).
        expr: Option<Expression>,
        /// The `;` terminator.
        semicolon: Token,
    },
    /// A `try`/`catch`/`finally` statement.
    Try {
        /// The `try` keyword.
        try_keyword: Token,
        /// The protected block.
        block: Block,
        /// The catch clauses.
        catches: Vec<CatchClause>,
        /// The finally clause, if present.
        finally: Option<FinallyClause>,
    },
    /// A `checked { ... }` or `unchecked { ... }` statement.
    Checked {
        /// The `checked`/`unchecked` keyword.
        keyword: Token,
        /// The block.
        block: Block,
    },
    /// An `unsafe { ... }` statement.
    Unsafe {
        /// The `unsafe` keyword.
        unsafe_keyword: Token,
        /// The block.
        block: Block,
    },
    /// A `lock (expr) stmt` statement.
    Lock {
        /// The `lock` keyword.
        lock_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The locked expression.
        expr: Expression,
        /// The `)` token.
        close: Token,
        /// The body.
        body: Box<Statement>,
    },
    /// A `using (...) stmt` statement.
    Using {
        /// The contextual `await` token, if present.
        await_keyword: Option<Token>,
        /// The `using` keyword.
        using_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The resource.
        resource: ResourceClause,
        /// The `)` token.
        close: Token,
        /// The body.
        body: Box<Statement>,
    },
    /// A `fixed (...) stmt` statement.
    Fixed {
        /// The `fixed` keyword.
        fixed_keyword: Token,
        /// The `(` token.
        open: Token,
        /// The pinned declaration.
        declaration: VariableDeclaration,
        /// The `)` token.
        close: Token,
        /// The body.
        body: Box<Statement>,
    },
}

impl Statement {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        use super::token::Keyword as Kw;
        match self {
            Self::Block(_) => SyntaxKind::Block,
            Self::Empty { .. } => SyntaxKind::EmptyStatement,
            Self::Labeled { .. } => SyntaxKind::LabeledStatement,
            Self::Expression { .. } => SyntaxKind::ExpressionStatement,
            Self::LocalDeclaration { .. } => SyntaxKind::LocalDeclarationStatement,
            Self::LocalFunction { .. } => SyntaxKind::LocalFunctionStatement,
            Self::If { .. } => SyntaxKind::IfStatement,
            Self::While { .. } => SyntaxKind::WhileStatement,
            Self::Do { .. } => SyntaxKind::DoStatement,
            Self::For { .. } => SyntaxKind::ForStatement,
            Self::ForEach { .. } => SyntaxKind::ForEachStatement,
            Self::Switch { .. } => SyntaxKind::SwitchStatement,
            Self::Break { .. } => SyntaxKind::BreakStatement,
            Self::Continue { .. } => SyntaxKind::ContinueStatement,
            Self::Return { .. } => SyntaxKind::ReturnStatement,
            Self::Yield {
                return_or_break, ..
            } => {
                if return_or_break.is_keyword(Kw::Break) {
                    SyntaxKind::YieldBreakStatement
                } else {
                    SyntaxKind::YieldReturnStatement
                }
            }
            Self::Goto { target, .. } => match target {
                GotoTarget::Label(_) => SyntaxKind::GotoStatement,
                GotoTarget::Case { .. } => SyntaxKind::GotoCaseStatement,
                GotoTarget::Default { .. } => SyntaxKind::GotoDefaultStatement,
            },
            Self::Throw { .. } => SyntaxKind::ThrowStatement,
            Self::Try { .. } => SyntaxKind::TryStatement,
            Self::Checked { keyword, .. } => {
                if keyword.is_keyword(Kw::Checked) {
                    SyntaxKind::CheckedStatement
                } else {
                    SyntaxKind::UncheckedStatement
                }
            }
            Self::Unsafe { .. } => SyntaxKind::UnsafeStatement,
            Self::Lock { .. } => SyntaxKind::LockStatement,
            Self::Using { .. } => SyntaxKind::UsingStatement,
            Self::Fixed { .. } => SyntaxKind::FixedStatement,
        }
    }

    /// Returns the source span of this statement (excluding trivia).
    #[must_use]
    pub fn span(&self) -> Span {
        span_of(self)
    }

    /// Returns the diagnostics from `all` whose spans fall within this node.
    pub fn diagnostics_in<'a>(
        &self,
        all: &'a [Diagnostic],
    ) -> impl Iterator<Item = &'a Diagnostic> {
        diagnostics_in(all, self.span())
    }
}

impl TokenWalk for Statement {
    #[expect(clippy::too_many_lines, reason = "one arm per grammar production")]
    fn for_each_token(&self, f: &mut dyn FnMut(&Token)) {
        match self {
            Self::Block(block) => block.for_each_token(f),
            Self::Empty { semicolon } => semicolon.for_each_token(f),
            Self::Labeled {
                label,
                colon,
                statement,
            } => {
                label.for_each_token(f);
                colon.for_each_token(f);
                statement.for_each_token(f);
            }
            Self::Expression { expr, semicolon } => {
                expr.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::LocalDeclaration {
                await_keyword,
                using_keyword,
                modifiers,
                declaration,
                semicolon,
            } => {
                await_keyword.for_each_token(f);
                using_keyword.for_each_token(f);
                modifiers.for_each_token(f);
                declaration.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::LocalFunction {
                modifiers,
                return_type,
                identifier,
                parameters,
                body,
            } => {
                modifiers.for_each_token(f);
                return_type.for_each_token(f);
                identifier.for_each_token(f);
                parameters.for_each_token(f);
                body.for_each_token(f);
            }
            Self::If {
                if_keyword,
                open,
                condition,
                close,
                statement,
                else_clause,
            } => {
                if_keyword.for_each_token(f);
                open.for_each_token(f);
                condition.for_each_token(f);
                close.for_each_token(f);
                statement.for_each_token(f);
                else_clause.for_each_token(f);
            }
            Self::While {
                while_keyword,
                open,
                condition,
                close,
                body,
            } => {
                while_keyword.for_each_token(f);
                open.for_each_token(f);
                condition.for_each_token(f);
                close.for_each_token(f);
                body.for_each_token(f);
            }
            Self::Do {
                do_keyword,
                body,
                while_keyword,
                open,
                condition,
                close,
                semicolon,
            } => {
                do_keyword.for_each_token(f);
                body.for_each_token(f);
                while_keyword.for_each_token(f);
                open.for_each_token(f);
                condition.for_each_token(f);
                close.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::For {
                for_keyword,
                open,
                initializer,
                first_semicolon,
                condition,
                second_semicolon,
                incrementors,
                close,
                body,
            } => {
                for_keyword.for_each_token(f);
                open.for_each_token(f);
                initializer.for_each_token(f);
                first_semicolon.for_each_token(f);
                condition.for_each_token(f);
                second_semicolon.for_each_token(f);
                incrementors.for_each_token(f);
                close.for_each_token(f);
                body.for_each_token(f);
            }
            Self::ForEach {
                await_keyword,
                foreach_keyword,
                open,
                ty,
                identifier,
                in_keyword,
                expr,
                close,
                body,
            } => {
                await_keyword.for_each_token(f);
                foreach_keyword.for_each_token(f);
                open.for_each_token(f);
                ty.for_each_token(f);
                identifier.for_each_token(f);
                in_keyword.for_each_token(f);
                expr.for_each_token(f);
                close.for_each_token(f);
                body.for_each_token(f);
            }
            Self::Switch {
                switch_keyword,
                open_paren,
                governing,
                close_paren,
                open_brace,
                sections,
                close_brace,
            } => {
                switch_keyword.for_each_token(f);
                open_paren.for_each_token(f);
                governing.for_each_token(f);
                close_paren.for_each_token(f);
                open_brace.for_each_token(f);
                sections.for_each_token(f);
                close_brace.for_each_token(f);
            }
            Self::Break {
                break_keyword,
                semicolon,
            } => {
                break_keyword.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::Continue {
                continue_keyword,
                semicolon,
            } => {
                continue_keyword.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::Return {
                return_keyword,
                expr,
                semicolon,
            } => {
                return_keyword.for_each_token(f);
                expr.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::Yield {
                yield_keyword,
                return_or_break,
                expr,
                semicolon,
            } => {
                yield_keyword.for_each_token(f);
                return_or_break.for_each_token(f);
                expr.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::Goto {
                goto_keyword,
                target,
                semicolon,
            } => {
                goto_keyword.for_each_token(f);
                target.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::Throw {
                throw_keyword,
                expr,
                semicolon,
            } => {
                throw_keyword.for_each_token(f);
                expr.for_each_token(f);
                semicolon.for_each_token(f);
            }
            Self::Try {
                try_keyword,
                block,
                catches,
                finally,
            } => {
                try_keyword.for_each_token(f);
                block.for_each_token(f);
                catches.for_each_token(f);
                finally.for_each_token(f);
            }
            Self::Checked { keyword, block } => {
                keyword.for_each_token(f);
                block.for_each_token(f);
            }
            Self::Unsafe {
                unsafe_keyword,
                block,
            } => {
                unsafe_keyword.for_each_token(f);
                block.for_each_token(f);
            }
            Self::Lock {
                lock_keyword,
                open,
                expr,
                close,
                body,
            } => {
                lock_keyword.for_each_token(f);
                open.for_each_token(f);
                expr.for_each_token(f);
                close.for_each_token(f);
                body.for_each_token(f);
            }
            Self::Using {
                await_keyword,
                using_keyword,
                open,
                resource,
                close,
                body,
            } => {
                await_keyword.for_each_token(f);
                using_keyword.for_each_token(f);
                open.for_each_token(f);
                resource.for_each_token(f);
                close.for_each_token(f);
                body.for_each_token(f);
            }
            Self::Fixed {
                fixed_keyword,
                open,
                declaration,
                close,
                body,
            } => {
                fixed_keyword.for_each_token(f);
                open.for_each_token(f);
                declaration.for_each_token(f);
                close.for_each_token(f);
                body.for_each_token(f);
            }
        }
    }
}

// ============================================================================
// Compilation unit
// ============================================================================

/// A whole parsed source text: statements up to end of file.
///
/// The EOF token owns any trailing file trivia, so the unit round-trips the
/// entire input.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// The top-level statements.
    pub statements: Vec<Statement>,
    /// The end-of-file token.
    pub eof: Token,
}

impl CompilationUnit {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        SyntaxKind::CompilationUnit
    }

    /// Returns the source span of the unit.
    #[must_use]
    pub fn span(&self) -> Span {
        span_of(self)
    }

    /// Returns the diagnostics from `all` whose spans fall within this node.
    pub fn diagnostics_in<'a>(
        &self,
        all: &'a [Diagnostic],
    ) -> impl Iterator<Item = &'a Diagnostic> {
        diagnostics_in(all, self.span())
    }
}

impl_token_walk!(CompilationUnit { statements, eof });

impl_display!(
    Expression,
    Statement,
    Type,
    Pattern,
    CompilationUnit,
    Block,
    VariableDeclaration,
    Name,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;
    use crate::syntax::token::Keyword;

    #[expect(clippy::cast_possible_truncation, reason = "test data")]
    fn ident(text: &str, start: u32) -> Token {
        Token::new(
            TokenKind::Identifier,
            text,
            Span::new(start, start + text.len() as u32),
        )
    }

    #[test]
    fn binary_expression_text_and_span() {
        let mut a = ident("a", 0);
        a.set_trailing_trivia(vec![crate::syntax::Trivia::Whitespace(" ".into())]);
        let mut plus = Token::new(TokenKind::Plus, "+", Span::new(2, 3));
        plus.set_trailing_trivia(vec![crate::syntax::Trivia::Whitespace(" ".into())]);
        let b = ident("b", 4);

        let expr = Expression::Binary {
            left: Box::new(Expression::Name(Name::Identifier { identifier: a })),
            operator: plus,
            right: Box::new(Expression::Name(Name::Identifier { identifier: b })),
        };

        assert_eq!(expr.to_string(), "a + b");
        assert_eq!(expr.span(), Span::new(0, 5));
        assert_eq!(expr.kind(), SyntaxKind::AddExpression);
    }

    #[test]
    fn missing_tokens_contribute_no_text() {
        let expr = Expression::Name(Name::Identifier {
            identifier: Token::missing(TokenKind::Identifier, 3),
        });
        assert_eq!(expr.to_string(), "");
        assert!(expr.is_missing());
        assert_eq!(expr.span(), Span::empty(3));
    }

    #[test]
    fn separated_list_interleaves() {
        let list = SeparatedList {
            items: vec![
                Expression::Name(Name::Identifier {
                    identifier: ident("a", 0),
                }),
                Expression::Name(Name::Identifier {
                    identifier: ident("b", 2),
                }),
            ],
            separators: vec![Token::new(TokenKind::Comma, ",", Span::new(1, 2))],
        };
        let mut out = String::new();
        list.for_each_token(&mut |t| t.write_text(&mut out));
        assert_eq!(out, "a,b");
    }

    #[test]
    fn separated_list_with_only_separators() {
        // Array rank `[,]` has a comma but no size expressions.
        let list: SeparatedList<Expression> = SeparatedList {
            items: vec![],
            separators: vec![Token::new(TokenKind::Comma, ",", Span::new(1, 2))],
        };
        let mut out = String::new();
        list.for_each_token(&mut |t| t.write_text(&mut out));
        assert_eq!(out, ",");
    }

    #[test]
    fn statement_kind_discriminates_yield_forms() {
        let stmt = Statement::Yield {
            yield_keyword: ident("yield", 0),
            return_or_break: Token::new(
                TokenKind::Keyword(Keyword::Break),
                "break",
                Span::new(6, 11),
            ),
            expr: None,
            semicolon: Token::new(TokenKind::Semicolon, ";", Span::new(11, 12)),
        };
        assert_eq!(stmt.kind(), SyntaxKind::YieldBreakStatement);
    }

    #[test]
    fn assignment_kind_from_operator() {
        let expr = Expression::Assignment {
            left: Box::new(Expression::Name(Name::Identifier {
                identifier: ident("a", 0),
            })),
            operator: Token::new(TokenKind::QuestionQuestionEquals, "??=", Span::new(1, 4)),
            right: Box::new(Expression::Name(Name::Identifier {
                identifier: ident("b", 4),
            })),
        };
        assert_eq!(expr.kind(), SyntaxKind::CoalesceAssignmentExpression);
    }

    #[test]
    fn diagnostics_filtered_by_node_span() {
        use crate::syntax::diagnostics::{Diagnostic, ErrorCode};
        let expr = Expression::Name(Name::Identifier {
            identifier: ident("abc", 10),
        });
        let diags = vec![
            Diagnostic::error(ErrorCode::IdentifierExpected, Span::new(11, 12)),
            Diagnostic::error(ErrorCode::SemicolonExpected, Span::new(20, 21)),
        ];
        let within: Vec<_> = expr.diagnostics_in(&diags).collect();
        assert_eq!(within.len(), 1);
    }
}
