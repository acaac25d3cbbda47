//! Per-file analysis pipeline
//!
//! One [`Pipeline`] owns one configuration and runs source text through the
//! lexer and the parser. Nothing is shared between pipelines except the
//! static keyword tables, so files can be analyzed on separate threads with
//! one pipeline each.

use std::path::PathBuf;

use tracing::debug;

use crate::checks::{CheckRegistry, Violation};
use crate::config::{AnalysisConfig, Charset};
use crate::parser::{
    parse, tokenize, AstNode, Diagnostic, LogicalLine, ParserState, Token, Trivia,
};
use crate::source::SourceFile;

/// Everything known about one file after lexing and parsing
#[derive(Debug, Clone)]
pub struct Analysis {
    pub path: PathBuf,
    pub charset: Charset,
    pub decode_error: bool,
    pub tokens: Vec<Token>,
    pub trivia: Vec<Trivia>,
    pub logical_lines: Vec<LogicalLine>,
    /// Translation unit; partial when strict parsing failed
    pub ast: AstNode,
    /// Lexer and parser diagnostics ordered by position.
    ///
    /// Strict mode stops at the first parse error, so at most one entry has
    /// [`DiagnosticKind::ParseError`](crate::parser::DiagnosticKind::ParseError).
    /// Lexer errors are collected over the whole file in both modes and come
    /// on top of it.
    pub diagnostics: Vec<Diagnostic>,
    pub state: ParserState,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, source: &SourceFile) -> Analysis {
        let stream = tokenize(&source.text);
        let outcome = parse(&stream.tokens, self.config.error_recovery);

        let mut diagnostics: Vec<Diagnostic> = stream.errors.iter().map(Diagnostic::from).collect();
        diagnostics.extend(outcome.diagnostics);
        // stable: a lexer error stays ahead of a parse error at the same spot
        diagnostics.sort_by_key(|d| (d.line, d.column));

        debug!(
            path = %source.path.display(),
            tokens = stream.tokens.len(),
            diagnostics = diagnostics.len(),
            state = ?outcome.state,
            "analyzed file"
        );

        Analysis {
            path: source.path.clone(),
            charset: source.charset,
            decode_error: source.decode_error,
            tokens: stream.tokens,
            trivia: stream.trivia,
            logical_lines: stream.logical_lines,
            ast: outcome.ast,
            diagnostics,
            state: outcome.state,
        }
    }

    /// Runs the registered checks over an analysis
    pub fn check(&self, analysis: &Analysis, registry: &mut CheckRegistry) -> Vec<Violation> {
        registry.run(analysis)
    }
}
