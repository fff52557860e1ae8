// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Interpolated string decomposition.
//!
//! The lexer hands the parser an entire interpolated string literal as one
//! token. This module re-scans that token's text and splits it into literal
//! segments and expression holes. Each hole's expression slice is re-lexed
//! against the original source (truncated at the slice end, so spans stay
//! absolute) and parsed with a fresh sub-parser whose diagnostics merge
//! into the main bag. Every byte of the original token lands in exactly one
//! synthesized token or its trivia, so reconstruction stays exact.
//!
//! The scanner here mirrors the lexer's brace and quote tracking, so the
//! hole extents it finds always agree with where the lexer ended the token.
//! On top of that it skips nested string and character literals when
//! looking for the format-clause `:`, so `'{c}'` contents can't masquerade
//! as a format separator.

use crate::syntax::diagnostics::ErrorCode;
use crate::syntax::token::{Token, TokenKind, Trivia};
use crate::syntax::tree::{Expression, FormatClause, InterpolatedPart, Name};
use crate::syntax::{LanguageLevel, Lexer, Span};

use super::Parser;

impl Parser<'_> {
    /// Decomposes the current interpolated string token into its parts.
    ///
    /// The caller has checked that the current token is
    /// [`TokenKind::InterpolatedString`]; the whole literal (sigils, quote
    /// runs, text, and holes) is consumed here.
    #[expect(clippy::too_many_lines, reason = "one linear scan over the literal")]
    pub(super) fn parse_interpolated_string(&mut self) -> Expression {
        let token = self.advance();
        let base = token.span().start();
        let text = token.text();
        let bytes = text.as_bytes();

        // Opening sigils: any mix of `$` and `@`, then the quote run.
        let mut pos = 0usize;
        let mut dollars = 0usize;
        let mut verbatim = false;
        while pos < bytes.len() {
            match bytes[pos] {
                b'$' => dollars += 1,
                b'@' => verbatim = true,
                _ => break,
            }
            pos += 1;
        }
        let quote_start = pos;
        let mut quotes = 0usize;
        while pos < bytes.len() && bytes[pos] == b'"' {
            quotes += 1;
            pos += 1;
        }

        if quotes == 2 && pos == text.len() {
            // `$""`: the first quote opens the literal, the second closes it.
            let open_end = quote_start + 1;
            let mut start = Token::new(
                TokenKind::InterpolatedString,
                &text[..open_end],
                Span::new(base, offset(base, open_end)),
            );
            start.set_leading_trivia(token.leading_trivia().to_vec());
            let mut end = Token::new(
                TokenKind::InterpolatedString,
                "\"",
                Span::new(offset(base, open_end), offset(base, pos)),
            );
            end.set_trailing_trivia(token.trailing_trivia().to_vec());
            return Expression::InterpolatedString {
                start,
                parts: Vec::new(),
                end,
            };
        }

        let raw = quotes >= 3;
        if raw {
            self.require_level(LanguageLevel::V3, "raw interpolated strings", token.span());
        }

        let mut start = Token::new(
            TokenKind::InterpolatedString,
            &text[..pos],
            Span::new(base, offset(base, pos)),
        );
        start.set_leading_trivia(token.leading_trivia().to_vec());

        let mut parts = Vec::new();
        let mut seg_start = pos;
        let mut end = None;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' if !raw && !verbatim => {
                    pos += 1;
                    pos += char_width(text, pos);
                }
                b'"' if !raw && verbatim && bytes.get(pos + 1) == Some(&b'"') => {
                    // Escaped verbatim quote, stays in the text segment.
                    pos += 2;
                }
                b'"' => {
                    let run_start = pos;
                    let mut run = 0usize;
                    while pos < bytes.len() && bytes[pos] == b'"' {
                        run += 1;
                        pos += 1;
                    }
                    if raw && run < quotes {
                        // A shorter quote run inside a raw literal is text.
                        continue;
                    }
                    push_text(&mut parts, text, base, seg_start, run_start);
                    let mut closing = Token::new(
                        TokenKind::InterpolatedString,
                        &text[run_start..pos],
                        Span::new(offset(base, run_start), offset(base, pos)),
                    );
                    closing.set_trailing_trivia(token.trailing_trivia().to_vec());
                    end = Some(closing);
                    seg_start = pos;
                    break;
                }
                b'{' => {
                    let run_start = pos;
                    let limit = if raw { dollars } else { usize::MAX };
                    let mut run = 0usize;
                    while pos < bytes.len() && bytes[pos] == b'{' && run < limit {
                        run += 1;
                        pos += 1;
                    }
                    let opens = if raw { run == dollars } else { run % 2 == 1 };
                    if !opens {
                        // `{{` pairs (or short raw runs) are literal text.
                        continue;
                    }
                    // In non-raw forms any escaped pairs in the run stay in
                    // the preceding segment; only the last `{` opens.
                    let brace_start = if raw { run_start } else { pos - 1 };
                    push_text(&mut parts, text, base, seg_start, brace_start);
                    let open_brace = Token::new(
                        TokenKind::OpenBrace,
                        &text[brace_start..pos],
                        Span::new(offset(base, brace_start), offset(base, pos)),
                    );
                    let (hole, resume) =
                        self.parse_interpolation_hole(text, base, open_brace, pos);
                    parts.push(hole);
                    pos = resume;
                    seg_start = pos;
                }
                b'}' => {
                    // `}}` pairs and stray `}` at the text level are text.
                    while pos < bytes.len() && bytes[pos] == b'}' {
                        pos += 1;
                    }
                }
                _ => pos += char_width(text, pos),
            }
        }

        let end = match end {
            Some(end) => end,
            None => {
                // Unterminated literal (the lexer has already diagnosed it).
                push_text(&mut parts, text, base, seg_start, text.len());
                let mut missing =
                    Token::missing(TokenKind::InterpolatedString, offset(base, text.len()));
                missing.set_trailing_trivia(token.trailing_trivia().to_vec());
                missing
            }
        };
        Expression::InterpolatedString { start, parts, end }
    }

    /// Parses one hole starting just past its opening brace run.
    ///
    /// Returns the hole part and the text offset at which to resume literal
    /// scanning: just past the closing `}`, or the end of the token when
    /// the hole never closes.
    fn parse_interpolation_hole(
        &mut self,
        text: &str,
        base: u32,
        open_brace: Token,
        hole_start: usize,
    ) -> (InterpolatedPart, usize) {
        let shape = scan_hole(text, hole_start);
        if let (Some(question), Some(_)) = (shape.question, shape.colon) {
            self.error(
                ErrorCode::ConditionalInInterpolation,
                Span::new(offset(base, question), offset(base, question + 1)),
            );
        }

        let hole_end = shape.close_brace.unwrap_or(text.len());
        let expr_end = shape.colon.unwrap_or(hole_end);
        let (expr, leftovers) =
            self.parse_hole_expression(offset(base, hole_start), offset(base, expr_end));

        let mut format = shape.colon.map(|colon| FormatClause {
            colon: Token::new(
                TokenKind::Colon,
                ":",
                Span::new(offset(base, colon), offset(base, colon + 1)),
            ),
            text: Token::new(
                TokenKind::StringLiteral,
                &text[colon + 1..hole_end],
                Span::new(offset(base, colon + 1), offset(base, hole_end)),
            ),
        });
        let mut close_brace = match shape.close_brace {
            Some(close) => Token::new(
                TokenKind::CloseBrace,
                "}",
                Span::new(offset(base, close), offset(base, close + 1)),
            ),
            None => Token::missing(TokenKind::CloseBrace, offset(base, text.len())),
        };
        if !leftovers.is_empty() {
            match format.as_mut() {
                Some(clause) => clause.colon.prepend_leading_trivia(leftovers),
                None => close_brace.prepend_leading_trivia(leftovers),
            }
        }

        let resume = shape.close_brace.map_or(text.len(), |close| close + 1);
        (
            InterpolatedPart::Hole {
                open_brace,
                expr: Box::new(expr),
                format,
                close_brace,
            },
            resume,
        )
    }

    /// Re-lexes and parses the expression slice of one hole.
    ///
    /// Lexing runs over the original source truncated at `end`, so token
    /// spans stay absolute and the lexer cannot read past the hole. Tokens
    /// the expression does not consume come back as skipped trivia so the
    /// caller can keep them in the tree.
    fn parse_hole_expression(&mut self, start: u32, end: u32) -> (Expression, Vec<Trivia>) {
        let bounded = &self.source()[..end as usize];
        let (tokens, lex_diagnostics) =
            Lexer::new(bounded, start as usize, self.options().documentation).lex();

        if tokens.len() == 1 {
            // Nothing but EOF: the hole is empty (modulo trivia).
            self.diagnostics.extend(lex_diagnostics);
            self.error(ErrorCode::EmptyInterpolationHole, Span::new(start, end));
            let trivia = tokens[0].leading_trivia().to_vec();
            let expr = Expression::Name(Name::Identifier {
                identifier: Token::missing(TokenKind::Identifier, start),
            });
            return (expr, trivia);
        }

        let mut sub = Parser::new(bounded, tokens, lex_diagnostics, self.options());
        let expr = sub.parse_expression_root();
        let mut leftovers = Vec::new();
        while !sub.is_at_end() {
            let extra = sub.advance();
            if leftovers.is_empty() {
                sub.error_with_args(
                    ErrorCode::UnexpectedToken,
                    extra.span(),
                    [extra.text().to_owned()],
                );
            }
            leftovers.push(Trivia::Skipped(Box::new(extra)));
        }
        let eof = sub.advance();
        leftovers.extend(eof.leading_trivia().iter().cloned());
        self.diagnostics.extend(sub.finish());
        (expr, leftovers)
    }
}

/// The text-level shape of one interpolation hole.
struct HoleShape {
    /// Offset of the closing `}`, if the hole closes within the token.
    close_brace: Option<usize>,
    /// Offset of the top-level `:` that begins the format clause.
    colon: Option<usize>,
    /// Offset of a bare top-level conditional `?` seen before the colon.
    question: Option<usize>,
}

/// Finds the extent of a hole and its top-level `:`/`?` positions.
///
/// Top-level means at brace depth one and outside any parentheses,
/// brackets, or nested literals. A `?` that begins `??`, `?.`, or `?[` is
/// an operator of its own and never marks a conditional.
fn scan_hole(text: &str, start: usize) -> HoleShape {
    let bytes = text.as_bytes();
    let mut pos = start;
    let mut brace_depth = 1usize;
    let mut group_depth = 0usize;
    let mut colon = None;
    let mut question = None;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                brace_depth += 1;
                pos += 1;
            }
            b'}' => {
                brace_depth -= 1;
                if brace_depth == 0 {
                    return HoleShape {
                        close_brace: Some(pos),
                        colon,
                        question,
                    };
                }
                pos += 1;
            }
            b'(' | b'[' => {
                group_depth += 1;
                pos += 1;
            }
            b')' | b']' => {
                group_depth = group_depth.saturating_sub(1);
                pos += 1;
            }
            b'"' | b'$' | b'@' => pos = skip_nested_string(text, pos),
            b'\'' => pos = skip_char_literal(text, pos),
            b':' => {
                if brace_depth == 1 && group_depth == 0 && colon.is_none() {
                    colon = Some(pos);
                }
                pos += 1;
            }
            b'?' if brace_depth == 1 && group_depth == 0 && colon.is_none() => {
                match bytes.get(pos + 1) {
                    Some(b'?' | b'.') => pos += 2,
                    next => {
                        if question.is_none() && next != Some(&b'[') {
                            question = Some(pos);
                        }
                        pos += 1;
                    }
                }
            }
            _ => pos += char_width(text, pos),
        }
    }
    HoleShape {
        close_brace: None,
        colon,
        question,
    }
}

/// Returns the offset just past a string literal starting at `pos`.
///
/// Handles regular, verbatim, interpolated, and raw forms with the same
/// nesting rules the lexer uses. When the sigils turn out not to start a
/// string (a verbatim identifier, say) only the sigils are consumed.
fn skip_nested_string(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut verbatim = false;
    while matches!(bytes.get(pos), Some(b'$' | b'@')) {
        if bytes[pos] == b'@' {
            verbatim = true;
        }
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'"') {
        return pos;
    }
    let mut quotes = 0usize;
    while bytes.get(pos) == Some(&b'"') {
        quotes += 1;
        pos += 1;
    }
    if quotes == 2 {
        return pos; // empty string
    }
    let closing = if quotes >= 3 { quotes } else { 1 };
    let mut depth = 0usize;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if !verbatim && closing == 1 && depth == 0 => {
                pos += 1;
                pos += char_width(text, pos);
            }
            b'{' => {
                depth += 1;
                pos += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                pos += 1;
            }
            b'"' if depth == 0 => {
                let mut run = 0usize;
                while bytes.get(pos) == Some(&b'"') {
                    run += 1;
                    pos += 1;
                }
                if closing == 1 {
                    if !verbatim || run % 2 == 1 {
                        return pos;
                    }
                } else if run >= closing {
                    return pos;
                }
            }
            _ => pos += char_width(text, pos),
        }
    }
    pos
}

/// Returns the offset just past a character literal starting at `pos`.
fn skip_char_literal(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    pos += 1; // opening quote
    match bytes.get(pos) {
        Some(b'\\') => {
            pos += 1;
            pos += char_width(text, pos);
        }
        Some(b'\'') | None => {}
        Some(_) => pos += char_width(text, pos),
    }
    if bytes.get(pos) == Some(&b'\'') {
        pos += 1;
    }
    pos
}

/// Appends a literal text segment covering `text[from..to]`, if non-empty.
fn push_text(parts: &mut Vec<InterpolatedPart>, text: &str, base: u32, from: usize, to: usize) {
    if from < to {
        parts.push(InterpolatedPart::Text {
            token: Token::new(
                TokenKind::StringLiteral,
                &text[from..to],
                Span::new(offset(base, from), offset(base, to)),
            ),
        });
    }
}

/// Width in bytes of the character at `pos` (zero at the end of text).
fn char_width(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(0, char::len_utf8)
}

/// Converts a byte offset within the token's text to an absolute offset.
#[expect(
    clippy::cast_possible_truncation,
    reason = "source files over 4GB are not supported"
)]
fn offset(base: u32, rel: usize) -> u32 {
    base + rel as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tree::SyntaxKind;
    use crate::syntax::{parse_expression, Diagnostic, ParseOptions};
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> Expression {
        let (expr, diagnostics) = parse_expression(source, 0, &ParseOptions::default());
        assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
        assert_eq!(expr.to_string(), source, "reconstruction differs");
        expr
    }

    fn parse_any(source: &str) -> (Expression, Vec<Diagnostic>) {
        parse_expression(source, 0, &ParseOptions::default())
    }

    fn parts_of(expr: &Expression) -> &[InterpolatedPart] {
        let Expression::InterpolatedString { parts, .. } = expr else {
            panic!("expected interpolated string, got {expr:?}");
        };
        parts
    }

    #[test]
    fn simple_hole() {
        let expr = parse_ok(r#"$"x = {x}""#);
        assert_eq!(expr.kind(), SyntaxKind::InterpolatedStringExpression);
        let parts = parts_of(&expr);
        assert_eq!(parts.len(), 2);
        let InterpolatedPart::Text { token } = &parts[0] else {
            panic!("expected text part");
        };
        assert_eq!(token.text(), "x = ");
        let InterpolatedPart::Hole { expr, format, .. } = &parts[1] else {
            panic!("expected hole part");
        };
        assert_eq!(expr.to_string(), "x");
        assert!(format.is_none());
    }

    #[test]
    fn escaped_braces_around_hole() {
        // `{{` and `}}` stay literal; only the odd brace opens the hole.
        let expr = parse_ok(r#"$"{{{12}}}""#);
        let parts = parts_of(&expr);
        assert_eq!(parts.len(), 3);
        let InterpolatedPart::Text { token } = &parts[0] else {
            panic!("expected leading text");
        };
        assert_eq!(token.text(), "{{");
        let InterpolatedPart::Hole { expr, .. } = &parts[1] else {
            panic!("expected hole");
        };
        assert_eq!(expr.to_string(), "12");
        let InterpolatedPart::Text { token } = &parts[2] else {
            panic!("expected trailing text");
        };
        assert_eq!(token.text(), "}}");
    }

    #[test]
    fn format_clause() {
        let expr = parse_ok(r#"$"{x:N2}""#);
        let parts = parts_of(&expr);
        let InterpolatedPart::Hole { expr, format, .. } = &parts[0] else {
            panic!("expected hole");
        };
        assert_eq!(expr.to_string(), "x");
        let format = format.as_ref().unwrap();
        assert_eq!(format.colon.text(), ":");
        assert_eq!(format.text.text(), "N2");
    }

    #[test]
    fn colon_inside_char_literal_is_not_a_format_clause() {
        let expr = parse_ok(r#"$"{c == ':'}""#);
        let parts = parts_of(&expr);
        let InterpolatedPart::Hole { format, .. } = &parts[0] else {
            panic!("expected hole");
        };
        assert!(format.is_none());
    }

    #[test]
    fn bare_conditional_in_hole_is_diagnosed() {
        let source = r#"$"{a ? b : c}""#;
        let (expr, diagnostics) = parse_any(source);
        assert_eq!(expr.to_string(), source);
        assert_eq!(diagnostics[0].code, ErrorCode::ConditionalInInterpolation);
        // The colon went to the format clause, not the conditional.
        let parts = parts_of(&expr);
        let InterpolatedPart::Hole { format, .. } = &parts[0] else {
            panic!("expected hole");
        };
        assert!(format.is_some());
    }

    #[test]
    fn parenthesized_conditional_in_hole_is_fine() {
        parse_ok(r#"$"{(a ? b : c)}""#);
    }

    #[test]
    fn empty_hole_is_diagnosed() {
        let source = r#"$"{}""#;
        let (expr, diagnostics) = parse_any(source);
        assert_eq!(expr.to_string(), source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::EmptyInterpolationHole);
    }

    #[test]
    fn empty_literal() {
        let expr = parse_ok(r#"$"""#);
        assert!(parts_of(&expr).is_empty());
    }

    #[test]
    fn nested_string_with_brace_in_hole() {
        parse_ok(r#"$"a{f("}x")}b""#);
    }

    #[test]
    fn nested_interpolation_in_hole() {
        let expr = parse_ok(r#"$"a{$"inner {x}"}b""#);
        let parts = parts_of(&expr);
        let InterpolatedPart::Hole { expr, .. } = &parts[1] else {
            panic!("expected hole");
        };
        assert_eq!(expr.kind(), SyntaxKind::InterpolatedStringExpression);
    }

    #[test]
    fn verbatim_interpolated_spans_lines() {
        parse_ok("$@\"line1\nline2 {x}\"");
    }

    #[test]
    fn raw_interpolated_round_trips() {
        let expr = parse_ok("$\"\"\"a {x} b\"\"\"");
        assert_eq!(parts_of(&expr).len(), 3);
    }

    #[test]
    fn raw_interpolated_is_gated_below_v3() {
        let options = ParseOptions {
            language_level: LanguageLevel::V2,
            ..ParseOptions::default()
        };
        let source = "$\"\"\"a {x} b\"\"\"";
        let (expr, diagnostics) = parse_expression(source, 0, &options);
        assert_eq!(expr.to_string(), source);
        assert_eq!(diagnostics[0].code, ErrorCode::FeatureNotAvailable);
    }

    #[test]
    fn double_dollar_raw_needs_double_braces() {
        let expr = parse_ok("$$\"\"\"{x} {{y}}\"\"\"");
        let parts = parts_of(&expr);
        // `{x}` is literal text; `{{y}}` is the only hole.
        let InterpolatedPart::Text { token } = &parts[0] else {
            panic!("expected text part");
        };
        assert_eq!(token.text(), "{x} ");
        let InterpolatedPart::Hole { expr, .. } = &parts[1] else {
            panic!("expected hole");
        };
        assert_eq!(expr.to_string(), "y");
    }

    #[test]
    fn unterminated_in_hole_still_reconstructs() {
        let source = r#"$"{x"#;
        let (expr, diagnostics) = parse_any(source);
        assert_eq!(expr.to_string(), source);
        assert_eq!(diagnostics[0].code, ErrorCode::UnterminatedString);
        let Expression::InterpolatedString { end, .. } = &expr else {
            panic!("expected interpolated string");
        };
        assert!(end.is_missing());
    }

    #[test]
    fn leftover_hole_tokens_are_skipped_trivia() {
        let source = r#"$"{x y}""#;
        let (expr, diagnostics) = parse_any(source);
        assert_eq!(expr.to_string(), source);
        assert!(
            diagnostics
                .iter()
                .any(|d| d.code == ErrorCode::UnexpectedToken)
        );
    }

    #[test]
    fn member_access_on_interpolated_string() {
        let expr = parse_ok(r#"$"{x}".Length"#);
        assert_eq!(expr.kind(), SyntaxKind::SimpleMemberAccessExpression);
    }
}
