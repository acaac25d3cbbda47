// Diagnostics collected while lexing and parsing one file

use std::fmt;

use super::ast::SourceLocation;
use super::lexer::LexError;
use super::parse::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    LexError,
    ParseError,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::LexError => "LexError",
            DiagnosticKind::ParseError => "ParseError",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem; `message` is the full rendered error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        Diagnostic {
            line: err.location.line,
            column: err.location.column,
            message: err.to_string(),
            kind: DiagnosticKind::LexError,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic {
            line: err.location.line,
            column: err.location.column,
            message: err.to_string(),
            kind: DiagnosticKind::ParseError,
        }
    }
}
