// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the Sable parser.
//!
//! These tests use `proptest` to verify parser invariants over generated
//! inputs:
//!
//! 1. **Parser never panics** — arbitrary string input always returns a result
//! 2. **Exact reconstruction** — `unit.to_string()` reproduces the input byte
//!    for byte, malformed input included
//! 3. **Diagnostic spans within input** — all spans have `end <= input.len()`
//! 4. **Error messages are user-facing** — no internal type names in
//!    diagnostics

use proptest::prelude::*;

use crate::syntax::{parse_compilation_unit, parse_expression, ParseOptions};

// ============================================================================
// Near-valid Sable generators
// ============================================================================

/// Sable fragments for composing near-valid inputs.
///
/// Most are valid Sable; a few are intentionally malformed to exercise the
/// recovery paths when mutated by the generators.
const FRAGMENTS: &[&str] = &[
    "42;",
    "3.14f;",
    "int x = 42;",
    "var y = x + 1;",
    "x += 1;",
    "a = b = c;",
    "x ??= fallback;",
    "a < i >> 2;",
    "e is a < i >> 2;",
    "e is int n;",
    "x?.y?[0] ?? z;",
    "(int)x + 1;",
    "1..2;",
    "..;",
    "1<<2..3>>4;",
    "f(a, b: 2, ref c);",
    "list[i, j] = 0;",
    "new List<int>(4) { 1, 2, 3 };",
    "new int[3, 4];",
    "new[] { 1, 2 };",
    "var p = new { X = 1, Y = 2 };",
    "(a, b) => a + b;",
    "async x => await f(x);",
    "$\"x = {x:N2}\";",
    "$\"{{{12}}}\";",
    "if (a < b) { f(); } else g();",
    "while (p != null) p = p.Next;",
    "do { n++; } while (n < 10);",
    "for (int i = 0; i < n; i++) sum += i;",
    "foreach (var x in xs) yield return x;",
    "switch (x) { case 1: break; default: break; }",
    "try { f(); } catch (E e) when (g) { } finally { h(); }",
    "using var file = Open();",
    "using (var file = Open()) { }",
    "lock (gate) counter++;",
    "int Twice(int v) { return v * 2; }",
    "goto case 2;",
    "throw new E(\"boom\");",
    "from x in xs where x > 0 select x;",
    "private",
    "int x = ;",
    "if () { }",
    "a() b();",
];

/// Generates a Sable fragment from the seed corpus.
fn valid_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(FRAGMENTS).prop_map(std::string::ToString::to_string)
}

/// Generates a truncated fragment (cut at a random char boundary).
fn truncated_fragment() -> impl Strategy<Value = String> {
    valid_fragment().prop_flat_map(|s| {
        let len = s.len();
        if len <= 1 {
            Just(s).boxed()
        } else {
            (1..len)
                .prop_map(move |mut cut| {
                    while cut > 0 && !s.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    s[..cut].to_string()
                })
                .boxed()
        }
    })
}

/// Generates input with mismatched brackets via single-pass char mapping.
fn mismatched_brackets() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| {
        s.chars()
            .map(|ch| match ch {
                '(' => '[',
                '[' => '{',
                ')' => '}',
                _ => ch,
            })
            .collect()
    })
}

/// Generates input with all semicolons removed.
fn missing_semicolons() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| s.replace(';', " "))
}

/// Generates input with duplicated operators.
fn duplicated_operators() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| s.replace('+', "+ +").replace('<', "< <"))
}

/// Generates two fragments glued together without a separator.
fn glued_fragments() -> impl Strategy<Value = String> {
    (valid_fragment(), valid_fragment()).prop_map(|(a, b)| format!("{a} {b}"))
}

/// Generates a near-valid Sable input using one of several mutations.
fn near_valid_sable() -> impl Strategy<Value = String> {
    prop_oneof![
        valid_fragment(),
        truncated_fragment(),
        mismatched_brackets(),
        missing_semicolons(),
        duplicated_operators(),
        glued_fragments(),
    ]
}

// ============================================================================
// Property tests
// ============================================================================

/// Internal names that should never appear in user-facing diagnostics.
const INTERNAL_NAMES: &[&str] = &[
    "TokenKind",
    "Expression::",
    "Statement::",
    "unwrap()",
    "panic!",
    "unreachable!",
    "internal error",
];

/// Default is 512 cases for standard CI; override via `PROPTEST_CASES` env
/// var for nightly extended runs (e.g., `PROPTEST_CASES=10000`).
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: the parser never panics on arbitrary string input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,500}") {
        let (_unit, _diagnostics) = parse_compilation_unit(&input, 0, &ParseOptions::default());
    }

    /// Property 1b: never panics on near-valid structured input, which
    /// exercises recovery paths more deeply than uniform noise.
    #[test]
    fn parser_never_panics_near_valid(input in near_valid_sable()) {
        let (_unit, _diagnostics) = parse_compilation_unit(&input, 0, &ParseOptions::default());
    }

    /// Property 2: exact reconstruction, well-formed or not.
    ///
    /// Every byte of the input must come back out of the tree: missing
    /// tokens are zero-width and anything unparseable rides along as
    /// skipped trivia.
    #[test]
    fn compilation_unit_round_trips(input in "\\PC{0,500}") {
        let (unit, _diagnostics) = parse_compilation_unit(&input, 0, &ParseOptions::default());
        prop_assert_eq!(unit.to_string(), input);
    }

    /// Property 2b: exact reconstruction on near-valid input.
    #[test]
    fn near_valid_round_trips(input in near_valid_sable()) {
        let (unit, _diagnostics) = parse_compilation_unit(&input, 0, &ParseOptions::default());
        prop_assert_eq!(unit.to_string(), input);
    }

    /// Property 2c: a lone expression reconstructs a prefix of the input
    /// (the expression entry point leaves trailing tokens unconsumed).
    #[test]
    fn expression_reconstructs_a_prefix(input in near_valid_sable()) {
        let (expr, _diagnostics) = parse_expression(&input, 0, &ParseOptions::default());
        let text = expr.to_string();
        prop_assert!(
            input.starts_with(&text),
            "expression text {:?} is not a prefix of input {:?}",
            text,
            input,
        );
    }

    /// Property 3: all diagnostic spans are within the input bounds.
    #[test]
    fn diagnostic_spans_within_input(input in "\\PC{0,500}") {
        let (_unit, diagnostics) = parse_compilation_unit(&input, 0, &ParseOptions::default());
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for diag in &diagnostics {
            prop_assert!(
                diag.span.end() <= input_len,
                "diagnostic span end {} exceeds input length {} for input {:?}: {}",
                diag.span.end(),
                input_len,
                input,
                diag,
            );
            prop_assert!(
                diag.span.start() <= diag.span.end(),
                "diagnostic span start {} > end {} for input {:?}: {}",
                diag.span.start(),
                diag.span.end(),
                input,
                diag,
            );
        }
    }

    /// Property 4: error messages are user-facing (no internal type names).
    #[test]
    fn error_messages_are_user_facing(input in near_valid_sable()) {
        let (_unit, diagnostics) = parse_compilation_unit(&input, 0, &ParseOptions::default());
        for diag in &diagnostics {
            let message = diag.to_string();
            for internal in INTERNAL_NAMES {
                prop_assert!(
                    !message.contains(internal),
                    "diagnostic message contains internal name {:?}: {:?} (input: {:?})",
                    internal,
                    message,
                    input,
                );
            }
        }
    }
}
