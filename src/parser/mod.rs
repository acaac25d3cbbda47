//! C++ source code front end
//!
//! This module transforms C++ source text into an Abstract Syntax Tree (AST):
//! - [`normalizer`]: preprocessor directives → normalized logical lines
//! - [`lexer`]: Tokenization (source text → tokens and trivia)
//! - [`parse`]: Parsing (tokens → AST) with the error-recovery state machine
//! - [`ast`]: AST node definitions
//! - [`diagnostic`]: problems reported by the lexer and the parser
//! - [`keywords`]: shared keyword and operator tables
//!
//! # Scope
//!
//! The grammar is a syntactic subset of C++20, enough for pattern-based rules:
//! - Namespaces, classes, enums, templates, functions and variables
//! - All statements, including range `for`, `try` and labels
//! - Expressions with full operator precedence, lambdas and casts
//! - Preprocessor directives are kept as single tokens and never expanded
//! - No semantic analysis: types, overloads and templates are not resolved
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
pub mod diagnostic;
mod expressions;
pub mod keywords;
pub mod lexer;
pub mod normalizer;
pub mod parse;
mod statements;

#[cfg(test)]
mod property_tests;

pub use ast::{AstNode, NodeKind, SourceLocation, Span};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use lexer::{tokenize, LexError, Lexer, Token, TokenKind, TokenStream, Trivia, TriviaKind};
pub use normalizer::{normalize, LogicalLine};
pub use parse::{parse, ParseError, ParseOutcome, Parser, ParserState};
