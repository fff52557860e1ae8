// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Sable compiler core.
//!
//! This crate contains the syntactic front end of the Sable toolchain:
//! - Lexical analysis (tokenization with full trivia preservation)
//! - Parsing (error-tolerant syntax tree construction)
//! - Diagnostics (structured, span-carrying error reports)
//!
//! The front end is designed as a language service, prioritizing
//! IDE responsiveness and error tolerance over batch compilation speed.

#![doc = include_str!("../../../README.md")]

pub mod syntax;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::syntax::{
        Diagnostic, Expression, ParseOptions, Span, Statement, parse_compilation_unit,
        parse_expression, parse_statement,
    };
}
