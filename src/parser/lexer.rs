//! Lexer (tokenizer) for C++ source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Preprocessor directives are not interpreted: each one becomes a single
//! [`TokenKind::Preprocessor`] token whose value is the normalized logical line
//! (see [`normalizer`](super::normalizer)).
//!
//! Whitespace and comments are kept aside as [`Trivia`], so tokens and trivia
//! together cover every byte of the input. Lexical problems never abort the scan;
//! they are collected as [`LexError`]s next to the tokens.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use super::ast::{SourceLocation, Span};
use super::keywords::{self, PUNCTUATION};
use super::normalizer::{self, LogicalLine};

/// Token classes forming the contract between tokenizer and parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Preprocessor,
    Identifier,
    Keyword,
    Number,
    String,
    Character,
    Operator,
    Punctuation,
    Eof,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Preprocessor => "PREPROCESSOR",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Character => "CHARACTER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Punctuation => "PUNCTUATION",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its normalized value and original position.
///
/// `value` is the source text of the token, except for directives where it is
/// the normalized logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
    pub location: SourceLocation,
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }

    pub fn is_punct(&self, value: &str) -> bool {
        self.is(TokenKind::Punctuation, value)
    }

    pub fn is_op(&self, value: &str) -> bool {
        self.is(TokenKind::Operator, value)
    }

    pub fn is_keyword(&self, value: &str) -> bool {
        self.is(TokenKind::Keyword, value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Preprocessor => write!(f, "directive '{}'", self.value),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.value),
            TokenKind::Keyword => write!(f, "'{}'", self.value),
            TokenKind::Number => write!(f, "number {}", self.value),
            TokenKind::String => write!(f, "string literal {}", self.value),
            TokenKind::Character => write!(f, "char literal {}", self.value),
            TokenKind::Operator | TokenKind::Punctuation => write!(f, "'{}'", self.value),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// Discarded source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    /// Blanks, line breaks and backslash line joins
    Whitespace,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub span: Span,
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexer error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Everything the lexer produces for one file
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    /// Tokens in source order, always terminated by an EOF token
    pub tokens: Vec<Token>,
    pub trivia: Vec<Trivia>,
    /// One entry per directive, in source order
    pub logical_lines: Vec<LogicalLine>,
    pub errors: Vec<LexError>,
}

impl TokenStream {
    /// Stitches tokens and trivia back together in position order.
    ///
    /// For every input this returns the original text exactly.
    pub fn reconstruct(&self, source: &str) -> String {
        let mut pieces: Vec<Span> = self
            .tokens
            .iter()
            .map(|t| t.span)
            .chain(self.trivia.iter().map(|t| t.span))
            .filter(|span| !span.is_empty())
            .collect();
        pieces.sort_by_key(|span| span.start);
        pieces.iter().map(|span| &source[span.as_range()]).collect()
    }
}

/// Lexer for C++ source code
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    /// Only blanks seen since the last line break, so `#` starts a directive
    at_line_start: bool,
    stream: TokenStream,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            stream: TokenStream::default(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> TokenStream {
        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                let eof = Token {
                    kind: TokenKind::Eof,
                    value: String::new(),
                    span: Span::new(self.position, self.position),
                    location: self.current_location(),
                };
                self.stream.tokens.push(eof);
                break;
            }

            if self.at_line_start && self.peek() == Some('#') {
                self.preprocessor_directive();
                continue;
            }

            self.at_line_start = false;
            let token = self.next_token();
            self.stream.tokens.push(token);
        }

        self.stream
    }

    /// Get next token
    fn next_token(&mut self) -> Token {
        let start = self.position;
        let loc = self.current_location();

        if let Some(kind) = self.encoding_prefixed_literal() {
            return self.finish(kind, start, loc);
        }

        let Some(ch) = self.peek() else {
            return self.finish(TokenKind::Eof, start, loc);
        };

        let kind = match ch {
            '"' => {
                self.quoted_literal('"', loc);
                TokenKind::String
            }
            '\'' => {
                self.quoted_literal('\'', loc);
                TokenKind::Character
            }
            '0'..='9' => self.number_literal(),
            '.' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => self.number_literal(),
            c if is_identifier_start(c) => self.identifier_or_keyword(),
            _ => self.operator_or_punctuation(ch, loc),
        };

        self.finish(kind, start, loc)
    }

    fn finish(&self, kind: TokenKind, start: usize, location: SourceLocation) -> Token {
        Token {
            kind,
            value: self.input[start..self.position].to_string(),
            span: Span::new(start, self.position),
            location,
        }
    }

    /// String and character literals with an encoding prefix (`L`, `u8`, ...)
    /// or raw strings (`R"x(...)x"`).
    fn encoding_prefixed_literal(&mut self) -> Option<TokenKind> {
        const RAW_PREFIXES: [&str; 5] = ["u8R\"", "uR\"", "UR\"", "LR\"", "R\""];
        const PREFIXES: [&str; 4] = ["u8", "u", "U", "L"];

        let rest = self.rest();
        if !rest.starts_with(['u', 'U', 'L', 'R']) {
            return None;
        }

        let loc = self.current_location();
        if let Some(prefix) = RAW_PREFIXES.iter().find(|p| rest.starts_with(**p)) {
            self.advance_by(prefix.len() - 1);
            self.raw_string_literal(loc);
            return Some(TokenKind::String);
        }

        let prefix = PREFIXES.iter().find(|p| rest.starts_with(**p))?;
        let quote = rest[prefix.len()..].chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        self.advance_by(prefix.len());
        self.quoted_literal(quote, loc);
        Some(if quote == '"' {
            TokenKind::String
        } else {
            TokenKind::Character
        })
    }

    /// Parse a `"..."` or `'...'` literal, including any user-defined suffix.
    ///
    /// A raw line break leaves the literal unterminated. An unterminated string
    /// takes the rest of the file; a character literal ends with its line.
    fn quoted_literal(&mut self, quote: char, opened_at: SourceLocation) {
        self.advance(); // opening quote

        loop {
            match self.peek() {
                Some(ch) if ch == quote => {
                    self.advance();
                    self.identifier_tail();
                    return;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(is_line_terminator) {
                        self.consume_line_terminator();
                    } else {
                        self.advance();
                    }
                }
                Some(ch) if !is_line_terminator(ch) => {
                    self.advance();
                }
                _ => {
                    if quote == '"' {
                        self.unterminated_string(opened_at);
                    } else {
                        self.error("Unterminated character literal".to_string(), opened_at);
                    }
                    return;
                }
            }
        }
    }

    /// Parse a raw string literal; the lexer stands on the opening quote.
    fn raw_string_literal(&mut self, opened_at: SourceLocation) {
        const MAX_DELIMITER_LEN: usize = 16;

        self.advance(); // opening quote
        let rest = self.rest();
        let delimiter_len = rest
            .char_indices()
            .take(MAX_DELIMITER_LEN + 1)
            .find(|&(_, c)| c == '(' || c == ')' || c == '\\' || c == '"' || c.is_whitespace())
            .filter(|&(_, c)| c == '(')
            .map(|(i, _)| i);

        let Some(delimiter_len) = delimiter_len else {
            self.error("Invalid raw string delimiter".to_string(), opened_at);
            self.quoted_literal_body('"', opened_at);
            return;
        };

        let closing = format!("){}\"", &rest[..delimiter_len]);
        match rest[delimiter_len..].find(&closing) {
            Some(offset) => {
                let end = self.position + delimiter_len + offset + closing.len();
                while self.position < end {
                    self.advance_any();
                }
                self.identifier_tail();
            }
            None => {
                self.error("Unterminated raw string literal".to_string(), opened_at);
                self.skip_to_end();
            }
        }
    }

    /// Body of an ordinary literal when the opening quote is already consumed
    fn quoted_literal_body(&mut self, quote: char, opened_at: SourceLocation) {
        loop {
            match self.peek() {
                Some(ch) if ch == quote => {
                    self.advance();
                    return;
                }
                Some('\\') => {
                    self.advance();
                    if !self.peek().is_some_and(is_line_terminator) {
                        self.advance();
                    }
                }
                Some(ch) if !is_line_terminator(ch) => {
                    self.advance();
                }
                _ => {
                    if quote == '"' {
                        self.unterminated_string(opened_at);
                    } else {
                        self.error("Unterminated character literal".to_string(), opened_at);
                    }
                    return;
                }
            }
        }
    }

    /// A string left open at a line break swallows the rest of the file
    fn unterminated_string(&mut self, opened_at: SourceLocation) {
        self.error("Unterminated string literal".to_string(), opened_at);
        self.skip_to_end();
    }

    fn skip_to_end(&mut self) {
        while !self.is_at_end() {
            self.advance_any();
        }
    }

    /// Parse a numeric literal.
    ///
    /// Follows the preprocessing-number shape: digits, letters, `_`, `.`, digit
    /// separators and signed exponents, so radix prefixes, suffixes and
    /// hexadecimal floats all come out as one token.
    fn number_literal(&mut self) -> TokenKind {
        let mut prev = self.advance().unwrap_or('0');

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else if matches!(ch, '+' | '-') && matches!(prev, 'e' | 'E' | 'p' | 'P') {
                self.advance();
            } else if ch == '\''
                && prev.is_ascii_alphanumeric()
                && self.peek_ahead(1).is_some_and(|c| c.is_ascii_alphanumeric())
            {
                self.advance();
            } else {
                break;
            }
            prev = ch;
        }

        TokenKind::Number
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.position;
        self.advance();
        self.identifier_tail();

        let word = &self.input[start..self.position];
        if keywords::is_keyword(word) {
            TokenKind::Keyword
        } else if keywords::is_alternative_operator(word) {
            TokenKind::Operator
        } else {
            TokenKind::Identifier
        }
    }

    fn identifier_tail(&mut self) {
        while self.peek().is_some_and(is_identifier_continue) {
            self.advance();
        }
    }

    fn operator_or_punctuation(&mut self, ch: char, loc: SourceLocation) -> TokenKind {
        if let Some(op) = keywords::longest_operator(self.rest()) {
            self.advance_by(op.len());
            return TokenKind::Operator;
        }

        self.advance();
        if !PUNCTUATION.contains(&ch) {
            self.error(format!("Unexpected character: '{}'", ch.escape_debug()), loc);
        }
        TokenKind::Punctuation
    }

    /// Scan a directive starting at `#` into one token
    fn preprocessor_directive(&mut self) {
        let loc = self.current_location();
        let directive = normalizer::scan_directive(self.input, self.position, loc);

        self.position = directive.span.end;
        self.line = directive.end.line;
        self.column = directive.end.column;
        self.at_line_start = false;

        if let Some(error) = directive.error {
            self.push_error(error);
        }
        self.stream.tokens.push(Token {
            kind: TokenKind::Preprocessor,
            value: directive.line.text.clone(),
            span: directive.span,
            location: loc,
        });
        self.stream.logical_lines.push(directive.line);
    }

    /// Skip whitespace and comments, recording them as trivia
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let start = self.position;
            let kind = match self.peek() {
                Some(c) if is_blank(c) || is_line_terminator(c) => {
                    self.skip_whitespace();
                    TriviaKind::Whitespace
                }
                Some('\\') if self.peek_ahead(1).is_some_and(is_line_terminator) => {
                    self.skip_whitespace();
                    TriviaKind::Whitespace
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    self.skip_line_comment();
                    TriviaKind::LineComment
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    self.skip_block_comment();
                    TriviaKind::BlockComment
                }
                _ => break,
            };
            self.stream.trivia.push(Trivia {
                kind,
                span: Span::new(start, self.position),
            });
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if is_blank(ch) {
                self.advance();
            } else if is_line_terminator(ch) {
                self.consume_line_terminator();
                self.at_line_start = true;
            } else if ch == '\\' && self.peek_ahead(1).is_some_and(is_line_terminator) {
                // a joined line break does not start a new logical line
                self.advance();
                self.consume_line_terminator();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comment (// ...), not including the line break
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\\' && self.peek_ahead(1).is_some_and(is_line_terminator) {
                self.advance();
                self.consume_line_terminator();
            } else if is_line_terminator(ch) {
                break;
            } else {
                self.advance();
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return;
            }
            self.advance_any();
        }

        self.error("Unterminated block comment".to_string(), start_loc);
    }

    fn error(&mut self, message: String, location: SourceLocation) {
        self.push_error(LexError { message, location });
    }

    fn push_error(&mut self, error: LexError) {
        trace!(line = error.location.line, "{}", error.message);
        self.stream.errors.push(error);
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Advance over one character that is not a line break
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        self.column += 1;
        Some(ch)
    }

    /// Advance over one character, line breaks included
    fn advance_any(&mut self) {
        match self.peek() {
            Some(ch) if is_line_terminator(ch) => self.consume_line_terminator(),
            Some(_) => {
                self.advance();
            }
            None => {}
        }
    }

    fn advance_by(&mut self, chars: usize) {
        for _ in 0..chars {
            self.advance();
        }
    }

    /// Consumes `\n`, `\r\n` or a lone `\r` as one line break.
    fn consume_line_terminator(&mut self) {
        if self.advance() == Some('\r') && self.peek() == Some('\n') {
            self.position += 1;
        }
        self.line += 1;
        self.column = 1;
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokenizes `source` in one pass.
pub fn tokenize(source: &str) -> TokenStream {
    Lexer::new(source).tokenize()
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\x0b' | '\x0c')
}

fn is_line_terminator(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_values(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .tokens
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    }

    fn values(source: &str) -> Vec<String> {
        tokenize(source).tokens.into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("int main() { return 0; }").tokens;
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Punctuation,
                TokenKind::Punctuation,
                TokenKind::Punctuation,
                TokenKind::Keyword,
                TokenKind::Number,
                TokenKind::Punctuation,
                TokenKind::Punctuation,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[1].value, "main");
        assert_eq!(tokens[1].location, SourceLocation::new(1, 5));
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds_and_values(">>="),
            vec![(TokenKind::Operator, ">>=".to_string()), (TokenKind::Eof, String::new())]
        );
        assert_eq!(values("a<<=b->*c<=>d...")[..8], ["a", "<<=", "b", "->*", "c", "<=>", "d", "..."]);
        assert_eq!(values("x+++y")[..4], ["x", "++", "+", "y"]);
    }

    #[test]
    fn test_whitespace_and_comments_separate_operators() {
        assert_eq!(values("> >=")[..2], [">", ">="]);
        assert_eq!(values("+/**/+")[..2], ["+", "+"]);
    }

    #[test]
    fn test_comments() {
        let stream = tokenize("int x; // comment\nint y; /* block\ncomment */ int z;");
        let words: Vec<&str> = stream.tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(words, vec!["int", "x", ";", "int", "y", ";", "int", "z", ";", ""]);
        assert_eq!(stream.tokens[6].location, SourceLocation::new(3, 12));
        assert!(stream.trivia.iter().any(|t| t.kind == TriviaKind::BlockComment));
    }

    #[test]
    fn test_number_literals() {
        for literal in ["42", "0x1F", "0b1010'0101", "1'000'000", "3.14f", ".5", "1e+10", "0x1p-3", "10ULL", "1.0e-5L"] {
            let tokens = tokenize(literal).tokens;
            assert_eq!(tokens.len(), 2, "{literal}");
            assert_eq!(tokens[0].kind, TokenKind::Number, "{literal}");
            assert_eq!(tokens[0].value, literal);
        }
    }

    #[test]
    fn test_string_and_char_literals() {
        let tokens = tokenize(r#"L"wide" u8"utf" 'a' u'b' "a\"b" "x"s R"d(raw " )" text)d""#).tokens;
        let literals: Vec<(TokenKind, &str)> = tokens[..7].iter().map(|t| (t.kind, t.value.as_str())).collect();
        assert_eq!(
            literals,
            vec![
                (TokenKind::String, "L\"wide\""),
                (TokenKind::String, "u8\"utf\""),
                (TokenKind::Character, "'a'"),
                (TokenKind::Character, "u'b'"),
                (TokenKind::String, r#""a\"b""#),
                (TokenKind::String, "\"x\"s"),
                (TokenKind::String, r#"R"d(raw " )" text)d""#),
            ]
        );
    }

    #[test]
    fn test_prefix_letters_alone_are_identifiers() {
        assert_eq!(
            kinds_and_values("u8 L R")[..3],
            [
                (TokenKind::Identifier, "u8".to_string()),
                (TokenKind::Identifier, "L".to_string()),
                (TokenKind::Identifier, "R".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_string_spans_lines() {
        let stream = tokenize("auto s = R\"(a\nb)\"; int x;");
        let int_kw = &stream.tokens[5];
        assert_eq!(int_kw.value, "int");
        assert_eq!(int_kw.location.line, 2);
    }

    #[test]
    fn test_unterminated_string_runs_to_eof() {
        let source = "char* s = \"abc;\nint x = \"y\";\n";
        let stream = tokenize(source);
        assert_eq!(stream.errors.len(), 1);
        assert_eq!(stream.errors[0].location, SourceLocation::new(1, 11));
        assert_eq!(stream.errors[0].message, "Unterminated string literal");

        let literal = &stream.tokens[4];
        assert_eq!(literal.kind, TokenKind::String);
        assert_eq!(literal.span.end, source.len());
        assert_eq!(stream.tokens.len(), 6);
        assert_eq!(stream.tokens[5].kind, TokenKind::Eof);
        assert_eq!(stream.reconstruct(source), source);
    }

    #[test]
    fn test_unterminated_character_stops_at_line_end() {
        let stream = tokenize("char c = 'x;\nint y;");
        assert_eq!(stream.errors.len(), 1);
        assert_eq!(stream.errors[0].message, "Unterminated character literal");
        assert!(stream.tokens.iter().any(|t| t.value == "y" && t.location.line == 2));
    }

    #[test]
    fn test_unterminated_block_comment_reaches_eof() {
        let stream = tokenize("int a; /* never closed\nint b;");
        assert_eq!(stream.errors.len(), 1);
        assert_eq!(stream.errors[0].location, SourceLocation::new(1, 8));
        assert_eq!(stream.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(stream.tokens.len(), 4);
    }

    #[test]
    fn test_unexpected_character_is_reported_and_kept() {
        let stream = tokenize("a @ b");
        assert_eq!(stream.tokens[1].kind, TokenKind::Punctuation);
        assert_eq!(stream.tokens[1].value, "@");
        assert_eq!(stream.errors.len(), 1);
    }

    #[test]
    fn test_alternative_operators() {
        assert_eq!(kinds_and_values("a and b")[1], (TokenKind::Operator, "and".to_string()));
    }

    #[test]
    fn test_preprocessor_directives() {
        for (source, expected) in [
            ("#include <iostream>", "#include <iostream>"),
            ("# include <iostream>", "# include <iostream>"),
            (" # include <iostream>", "# include <iostream>"),
            ("#define lala", "#define lala"),
            (" # define lala", "# define lala"),
        ] {
            let tokens = tokenize(source).tokens;
            assert_eq!(tokens.len(), 2, "{source}");
            assert_eq!(tokens[0].kind, TokenKind::Preprocessor);
            assert_eq!(tokens[0].value, expected);
        }
        assert_eq!(tokenize("#define\\\ncontinued line").tokens.len(), 2);
    }

    #[test]
    fn test_code_after_directive() {
        let tokens = tokenize("#include <iostream>\n1").tokens;
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].location.line, 2);
    }

    #[test]
    fn test_directive_location_is_line_of_hash() {
        let stream = tokenize("int a;\n#define A B/*C\n\n\nC*/D\nint b;");
        let directive = &stream.tokens[3];
        assert_eq!(directive.kind, TokenKind::Preprocessor);
        assert_eq!(directive.value, "#define A BD");
        assert_eq!(directive.location, SourceLocation::new(2, 1));
        let b = stream.tokens.iter().find(|t| t.value == "b").expect("b");
        assert_eq!(b.location.line, 6);
        assert_eq!(stream.logical_lines[0].end_line, 5);
    }

    #[test]
    fn test_hash_inside_line_is_an_operator() {
        let tokens = tokenize("a # b ## c").tokens;
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[3].value, "##");
    }

    #[test]
    fn test_hash_after_line_join_is_not_a_directive() {
        let tokens = tokenize("x \\\n#y").tokens;
        assert_eq!(tokens[1].kind, TokenKind::Operator);
    }

    #[test]
    fn test_round_trip_reconstructs_source() {
        let source = "  #define A B/*C\r\n*/D\n/* c */ int x = 1'0; // tail\\\n more\n\"s\\\"\" 'c' @ \\\n";
        let stream = tokenize(source);
        assert_eq!(stream.reconstruct(source), source);
    }
}
