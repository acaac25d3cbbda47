//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, token helpers, the error-recovery state machine and
//! the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, recovery and coordination
//! - `declarations`: namespaces, classes, enums, templates, simple declarations
//! - `statements`: statements inside function bodies
//! - `expressions`: expressions with precedence climbing
//!
//! # Error recovery
//!
//! Every repeated construct (declarations of a translation unit or namespace,
//! class members, statements of a block) goes through
//! [`Parser::parse_sequence`]. In strict mode the first error travels up to
//! [`Parser::parse`], which records it and stops. In recovery mode the sequence
//! records one diagnostic per run of bad input, skips to a synchronization
//! token at the nesting depth where the failing item started and carries on.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use thiserror::Error;
use tracing::trace;

use crate::parser::ast::*;
use crate::parser::diagnostic::Diagnostic;
use crate::parser::keywords;
use crate::parser::lexer::{Token, TokenKind};

/// Deepest syntactic nesting accepted: blocks, statements, declarations,
/// parenthesized and unary sub-expressions, initializer lists.
///
/// Chains that only grow sideways (`else if`, `a = b = c`, `x + y + z`) are
/// read in loops and never count against it. Reaching the limit takes a few
/// MiB of stack; the binary's worker threads get 16 MiB.
const MAX_NESTING: usize = 256;

/// Returned for reads past the end of a token slice without EOF
static END_OF_INPUT: Token = Token {
    kind: TokenKind::Eof,
    value: String::new(),
    span: Span { start: 0, end: 0 },
    location: SourceLocation { line: 1, column: 1 },
};

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

/// Error-recovery state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    Normal,
    /// Skipping a run of unexpected input; no new diagnostic until an item parses
    Recovering,
    /// Strict mode hit an error; terminal
    Failed,
}

/// Result of parsing one translation unit
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Always a `TranslationUnit`, partial when parsing failed
    pub ast: AstNode,
    pub diagnostics: Vec<Diagnostic>,
    pub state: ParserState,
}

/// Item parser used by [`Parser::parse_sequence`]
pub(crate) type ItemParser<'t> = fn(&mut Parser<'t>) -> Result<AstNode, ParseError>;

/// Recursive descent parser for C++
pub struct Parser<'t> {
    pub(crate) tokens: &'t [Token],
    pub(crate) position: usize,
    /// Open `(`, `[` and `{` consumed so far
    pub(crate) depth: usize,
    nesting: usize,
    state: ParserState,
    error_recovery: bool,
    /// Set once the first recovery happened; copied onto every later node
    recovered: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], error_recovery: bool) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            nesting: 0,
            state: ParserState::Normal,
            error_recovery,
            recovered: false,
            diagnostics: Vec::new(),
        }
    }

    /// Parse the whole token stream into a translation unit
    pub fn parse(mut self) -> ParseOutcome {
        let mut children = Vec::new();

        if let Err(err) = self.parse_sequence(&mut children, None, Self::parse_declaration) {
            trace!(line = err.location.line, "strict parse failed: {}", err.message);
            self.diagnostics.push(Diagnostic::from(&err));
            self.state = ParserState::Failed;
            self.position = self.tokens.len().saturating_sub(1);
        }

        let ast = AstNode {
            kind: NodeKind::TranslationUnit,
            children,
            tokens: 0..self.tokens.len(),
            location: SourceLocation::default(),
            recovered: self.recovered,
        };

        ParseOutcome {
            ast,
            diagnostics: self.diagnostics,
            state: self.state,
        }
    }

    // ===== Sequences and recovery =====

    /// Parse items until `closer` (not consumed) or end of file.
    pub(crate) fn parse_sequence(
        &mut self,
        children: &mut Vec<AstNode>,
        closer: Option<&str>,
        item: ItemParser<'t>,
    ) -> Result<(), ParseError> {
        loop {
            self.collect_directives(children);

            let token = self.peek();
            if token.kind == TokenKind::Eof || closer.is_some_and(|c| token.is_punct(c)) {
                return Ok(());
            }

            let start = self.position;
            let base_depth = self.depth;
            match item(self) {
                Ok(node) => {
                    if self.state == ParserState::Recovering {
                        self.state = ParserState::Normal;
                    }
                    children.push(node);
                    if self.position <= start {
                        self.advance();
                    }
                }
                Err(err) if self.error_recovery => self.recover(err, base_depth, start),
                Err(err) => return Err(err),
            }
        }
    }

    fn recover(&mut self, err: ParseError, base_depth: usize, start: usize) {
        if self.state == ParserState::Normal {
            self.diagnostics.push(Diagnostic::from(&err));
        }
        trace!(line = err.location.line, depth = base_depth, "recovering: {}", err.message);

        self.state = ParserState::Recovering;
        self.recovered = true;
        self.synchronize(base_depth);

        if self.position <= start {
            self.advance();
        }
    }

    /// Discard tokens until a point where the enclosing sequence can resume.
    fn synchronize(&mut self, base_depth: usize) {
        loop {
            let Some(token) = self.tokens.get(self.position) else {
                return;
            };
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Preprocessor if self.depth <= base_depth => break,
                TokenKind::Preprocessor => self.position += 1,
                TokenKind::Punctuation => match token.value.as_str() {
                    ";" if self.depth <= base_depth => {
                        self.advance();
                        break;
                    }
                    "}" if self.depth <= base_depth => break,
                    "}" if self.depth == base_depth + 1 => {
                        self.advance();
                        break;
                    }
                    // a closer the failing item never opened
                    ")" | "]" if self.depth <= base_depth => self.position += 1,
                    _ => {
                        self.advance();
                    }
                },
                _ => {
                    self.advance();
                }
            }
        }
        trace!(position = self.position, depth = self.depth, "synchronized");
    }

    /// Turn directives at the current position into nodes
    pub(crate) fn collect_directives(&mut self, children: &mut Vec<AstNode>) {
        while let Some(token) = self.tokens.get(self.position) {
            if token.kind != TokenKind::Preprocessor {
                break;
            }
            children.push(AstNode {
                kind: NodeKind::PreprocessorDirective,
                children: Vec::new(),
                tokens: self.position..self.position + 1,
                location: token.location,
                recovered: self.recovered,
            });
            self.position += 1;
        }
    }

    /// Run `f` one nesting level deeper, failing on runaway nesting
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.check_nesting(0)?;
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    /// Fails when `pending` more levels on top of the current ones would
    /// exceed the nesting limit
    pub(crate) fn check_nesting(&self, pending: usize) -> Result<(), ParseError> {
        if self.nesting + pending >= MAX_NESTING {
            return Err(self.error_here("Nesting too deep"));
        }
        Ok(())
    }

    // ===== Node construction =====

    /// Index of the next significant token, where a node starting now begins
    pub(crate) fn mark(&self) -> usize {
        let mut index = self.position;
        while self
            .tokens
            .get(index)
            .is_some_and(|t| t.kind == TokenKind::Preprocessor)
        {
            index += 1;
        }
        index
    }

    pub(crate) fn finish(&self, kind: NodeKind, start: usize, children: Vec<AstNode>) -> AstNode {
        let location = self
            .tokens
            .get(start)
            .map_or_else(SourceLocation::default, |t| t.location);
        AstNode {
            kind,
            children,
            tokens: start..self.position.max(start),
            location,
            recovered: self.recovered,
        }
    }

    // ===== Helper methods =====

    /// Current significant token; directives are skipped
    pub(crate) fn peek(&self) -> &'t Token {
        self.tokens.get(self.mark()).unwrap_or(&END_OF_INPUT)
    }

    /// The `n`-th significant token after the current one
    pub(crate) fn peek_ahead(&self, n: usize) -> &'t Token {
        self.tokens[self.position.min(self.tokens.len())..]
            .iter()
            .filter(|t| t.kind != TokenKind::Preprocessor)
            .nth(n)
            .unwrap_or(&END_OF_INPUT)
    }

    pub(crate) fn advance(&mut self) -> &'t Token {
        let index = self.mark();
        let Some(token) = self.tokens.get(index) else {
            return &END_OF_INPUT;
        };
        if token.kind == TokenKind::Eof {
            return token;
        }

        if token.kind == TokenKind::Punctuation {
            match token.value.as_str() {
                "(" | "[" | "{" => self.depth += 1,
                ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
        self.position = index + 1;
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn check_punct(&self, value: &str) -> bool {
        self.peek().is_punct(value)
    }

    /// Operator check; alternative spellings match their symbolic form
    pub(crate) fn check_op(&self, value: &str) -> bool {
        is_operator(self.peek(), value)
    }

    pub(crate) fn check_keyword(&self, value: &str) -> bool {
        self.peek().is_keyword(value)
    }

    pub(crate) fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn match_punct(&mut self, value: &str) -> bool {
        if self.check_punct(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_op(&mut self, value: &str) -> bool {
        if self.check_op(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, value: &str) -> bool {
        if self.check_keyword(value) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `"{message}, found {token}"` at the current token
    pub(crate) fn error_here(&self, message: &str) -> ParseError {
        ParseError {
            message: format!("{}, found {}", message, self.peek()),
            location: self.current_location(),
        }
    }

    pub(crate) fn unexpected(&self) -> ParseError {
        let token = self.peek();
        ParseError {
            message: format!("Unexpected {token}"),
            location: token.location,
        }
    }

    pub(crate) fn expect_punct(&mut self, value: &str, message: &str) -> Result<(), ParseError> {
        if self.match_punct(value) {
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    pub(crate) fn expect_op(&mut self, value: &str, message: &str) -> Result<(), ParseError> {
        if self.match_op(value) {
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct("(", &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct(")", &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct("{", &format!("Expected '{{' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct("}", &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct(";", &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<&'t Token, ParseError> {
        if self.check_kind(TokenKind::Identifier) {
            Ok(self.advance())
        } else {
            Err(self.error_here("Expected identifier"))
        }
    }

    // ===== Skipping =====

    /// Consume a bracketed group, from its opener through the matching closer
    pub(crate) fn skip_balanced(&mut self, ctx: &str) -> Result<(), ParseError> {
        let closer = match self.peek().value.as_str() {
            "(" => ")",
            "[" => "]",
            _ => "}",
        };
        let outer = self.depth;
        self.advance();
        while self.depth > outer {
            if self.is_at_end() {
                return Err(self.error_here(&format!("Expected '{closer}' {ctx}")));
            }
            self.advance();
        }
        Ok(())
    }

    /// Consume `<...>`, counting `>>` as two closers
    pub(crate) fn skip_template_arguments(&mut self) -> Result<(), ParseError> {
        self.advance(); // '<'
        let mut angles = 1usize;

        while angles > 0 {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => {
                    return Err(self.error_here("Expected '>' after template arguments"));
                }
                TokenKind::Punctuation => match token.value.as_str() {
                    "(" | "[" => self.skip_balanced("in template arguments")?,
                    ";" | "{" | "}" | ")" | "]" => {
                        return Err(self.error_here("Expected '>' after template arguments"));
                    }
                    _ => {
                        self.advance();
                    }
                },
                TokenKind::Operator => {
                    match token.value.as_str() {
                        "<" => angles += 1,
                        ">" => angles -= 1,
                        ">>" => angles = angles.saturating_sub(2),
                        _ => {}
                    }
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    /// Consume tokens through the next `;` at the current depth
    pub(crate) fn skip_to_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return Err(self.error_here(&format!("Expected ';' {ctx}"))),
                TokenKind::Punctuation => match token.value.as_str() {
                    ";" => {
                        self.advance();
                        return Ok(());
                    }
                    "(" | "[" | "{" => self.skip_balanced(ctx)?,
                    ")" | "]" | "}" => return Err(self.error_here(&format!("Expected ';' {ctx}"))),
                    _ => {
                        self.advance();
                    }
                },
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Whether the `<` at significant offset `at` opens a template argument list.
    ///
    /// Looks for the matching `>` within a bounded window; the token after it
    /// must be one that can follow a template-id. In a `declaration` context a
    /// declarator (name, `*`, `&`) may follow as well.
    pub(crate) fn template_arguments_ahead(&self, at: usize, declaration: bool) -> bool {
        const WINDOW: usize = 64;

        let mut tokens = self.tokens[self.position.min(self.tokens.len())..]
            .iter()
            .filter(|t| t.kind != TokenKind::Preprocessor)
            .skip(at);
        if !tokens.next().is_some_and(|t| is_operator(t, "<")) {
            return false;
        }

        let mut angles = 1usize;
        let mut brackets = 0usize;
        for token in tokens.by_ref().take(WINDOW) {
            match (token.kind, token.value.as_str()) {
                (TokenKind::Eof, _) => return false,
                (TokenKind::Punctuation, ";" | "{" | "}") => return false,
                (TokenKind::Punctuation, "(" | "[") => brackets += 1,
                (TokenKind::Punctuation, ")" | "]") => {
                    if brackets == 0 {
                        return false;
                    }
                    brackets -= 1;
                }
                (TokenKind::Operator, _) if brackets == 0 => {
                    let op = keywords::canonical_operator(&token.value);
                    match op {
                        "&&" | "||" => return false,
                        "<" => angles += 1,
                        ">" => angles -= 1,
                        ">>" => angles = angles.saturating_sub(2),
                        _ => {}
                    }
                }
                _ => {}
            }
            if angles == 0 {
                break;
            }
        }
        if angles > 0 {
            return false;
        }

        tokens.next().is_some_and(|next| match next.kind {
            TokenKind::Punctuation => matches!(next.value.as_str(), "(" | "{" | ")" | ";" | "," | "]" | "}"),
            TokenKind::Operator => match keywords::canonical_operator(&next.value) {
                "::" | "..." => true,
                "*" | "&" | "&&" => declaration,
                "==" | "!=" | "||" | "?" | ":" => !declaration,
                _ => false,
            },
            TokenKind::Identifier => declaration,
            TokenKind::Eof => true,
            _ => false,
        })
    }
}

/// Operator test on a token; alternative spellings match their symbolic form
pub(crate) fn is_operator(token: &Token, value: &str) -> bool {
    token.kind == TokenKind::Operator && keywords::canonical_operator(&token.value) == value
}

/// Parse a token stream in one go
pub fn parse(tokens: &[Token], error_recovery: bool) -> ParseOutcome {
    Parser::new(tokens, error_recovery).parse()
}
