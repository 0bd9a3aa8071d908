//! Declaration-level Java parser.
//!
//! [`parse`] turns a compilation unit into an [`ast::CompilationUnit`] holding package,
//! imports and type declarations down to member signatures, field initializers and
//! annotation values. Method bodies are skipped. Parsing never fails: malformed input yields
//! partial declarations plus [`ParseError`]s.

pub mod ast;
mod expr;
mod lexer;
mod literals;
mod parser;

use serde::Serialize;

pub use ast::*;
pub use literals::{
    parse_double_literal, parse_float_literal, parse_int_literal, parse_literal,
    parse_long_literal, unescape_char_literal, unescape_string_literal, unescape_text_block,
    LiteralError, LiteralValue,
};

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub range: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: Span) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parse {
    compilation_unit: CompilationUnit,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn compilation_unit(&self) -> &CompilationUnit {
        &self.compilation_unit
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_parts(self) -> (CompilationUnit, Vec<ParseError>) {
        (self.compilation_unit, self.errors)
    }
}

pub fn parse(text: &str) -> Parse {
    let (tokens, mut errors) = lexer::Lexer::new(text).tokenize();
    let mut parser = parser::Parser::new(tokens, text.len());
    let compilation_unit = parser.parse_compilation_unit();
    errors.append(&mut parser.errors);
    errors.sort_by_key(|error| error.range.start);
    tracing::trace!(
        target: "jmodel.syntax",
        types = compilation_unit.types.len(),
        errors = errors.len(),
        "parsed compilation unit"
    );
    Parse {
        compilation_unit,
        errors,
    }
}

/// Parses a standalone expression, e.g. a constant typed by a user.
pub fn parse_expression(text: &str) -> (Expr, Vec<ParseError>) {
    let (tokens, mut errors) = lexer::Lexer::new(text).tokenize();
    let mut parser = parser::Parser::new(tokens, text.len());
    let expr = parser.parse_expr_or_opaque(&[]);
    if !parser.is_eof() {
        parser.error_here("unexpected token after expression");
    }
    errors.append(&mut parser.errors);
    (expr, errors)
}

/// Zero-based line and UTF-8 column of a byte offset.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let col = before.rfind('\n').map_or(offset, |idx| offset - idx - 1);
    (line, col)
}
