//! Preprocessor line normalizer
//!
//! Turns one preprocessor directive, starting at its `#`, into a single
//! [`LogicalLine`]:
//! - a backslash directly before a line terminator joins the next physical line,
//!   and the pair is replaced by one space
//! - `//` comments end the logical line; their text is dropped
//! - `/* */` comments are dropped with no replacement, even across lines
//! - string and character literals are copied verbatim, comment openers inside
//!   them included
//!
//! The scan is an explicit state machine ([`ScanState`]) over the raw text, so it
//! is a single forward pass that cannot loop. An unterminated block comment or
//! string runs to end of file (the rest of a string is copied as it stands), an
//! unterminated character literal stops at the end of the logical line, and each
//! is reported once at its opening position.
//!
//! Ordinary code never goes through here; the lexer only hands over text that
//! begins a logical line with `#`.

use super::ast::{SourceLocation, Span};
use super::lexer::{LexError, Lexer};

/// A directive after continuation joining and comment removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    /// First physical line (the line of the `#`)
    pub start_line: usize,
    /// Last physical line consumed, inclusive
    pub end_line: usize,
}

impl LogicalLine {
    /// Number of physical lines this logical line was assembled from
    pub fn physical_lines(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Result of scanning one directive
#[derive(Debug, Clone)]
pub struct Directive {
    pub line: LogicalLine,
    /// Original bytes consumed, from the `#` up to (not including) the line
    /// terminator that ends the directive
    pub span: Span,
    /// Position right after the directive
    pub end: SourceLocation,
    pub error: Option<LexError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InLineComment,
    InBlockComment { opened_at: SourceLocation },
    InString { escape_pending: bool, opened_at: SourceLocation },
    InChar { escape_pending: bool, opened_at: SourceLocation },
}

/// Normalizes every directive of `source`, in order.
///
/// Ordinary code is passed over untouched (it yields no logical lines).
pub fn normalize(source: &str) -> Vec<LogicalLine> {
    Lexer::new(source).tokenize().logical_lines
}

/// Scans the directive whose `#` sits at byte `start` / `location`.
pub fn scan_directive(input: &str, start: usize, location: SourceLocation) -> Directive {
    let mut scanner = DirectiveScanner {
        input,
        position: start,
        line: location.line,
        column: location.column,
        text: String::new(),
        in_number: false,
    };
    let error = scanner.run();

    let text = scanner.text.trim_end().to_string();
    Directive {
        line: LogicalLine {
            text,
            start_line: location.line,
            end_line: scanner.line,
        },
        span: Span::new(start, scanner.position),
        end: SourceLocation::new(scanner.line, scanner.column),
        error,
    }
}

struct DirectiveScanner<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    text: String,
    /// Whether the text emitted so far ends inside a pp-number, where `'` is a
    /// digit separator rather than the start of a character literal
    in_number: bool,
}

impl DirectiveScanner<'_> {
    fn run(&mut self) -> Option<LexError> {
        let mut state = ScanState::Normal;

        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                match state {
                    ScanState::InBlockComment { .. } => {
                        self.consume_line_terminator();
                        continue;
                    }
                    ScanState::InString { opened_at, .. } => {
                        self.copy_rest();
                        return Some(unterminated("string literal", opened_at));
                    }
                    ScanState::InChar { opened_at, .. } => {
                        return Some(unterminated("character literal", opened_at));
                    }
                    ScanState::Normal | ScanState::InLineComment => return None,
                }
            }

            if ch == '\\'
                && !matches!(state, ScanState::InBlockComment { .. })
                && self.peek_ahead(1).is_some_and(is_line_terminator)
            {
                self.advance();
                self.consume_line_terminator();
                if state != ScanState::InLineComment {
                    self.emit_separator();
                }
                continue;
            }

            state = match state {
                ScanState::Normal => self.scan_normal(ch),
                ScanState::InLineComment => {
                    self.advance();
                    ScanState::InLineComment
                }
                ScanState::InBlockComment { opened_at } => {
                    if ch == '*' && self.peek_ahead(1) == Some('/') {
                        self.advance();
                        self.advance();
                        ScanState::Normal
                    } else {
                        self.advance();
                        ScanState::InBlockComment { opened_at }
                    }
                }
                ScanState::InString {
                    escape_pending,
                    opened_at,
                } => {
                    self.copy(ch);
                    match (escape_pending, ch) {
                        (true, _) => ScanState::InString {
                            escape_pending: false,
                            opened_at,
                        },
                        (false, '\\') => ScanState::InString {
                            escape_pending: true,
                            opened_at,
                        },
                        (false, '"') => ScanState::Normal,
                        (false, _) => ScanState::InString {
                            escape_pending: false,
                            opened_at,
                        },
                    }
                }
                ScanState::InChar {
                    escape_pending,
                    opened_at,
                } => {
                    self.copy(ch);
                    match (escape_pending, ch) {
                        (true, _) => ScanState::InChar {
                            escape_pending: false,
                            opened_at,
                        },
                        (false, '\\') => ScanState::InChar {
                            escape_pending: true,
                            opened_at,
                        },
                        (false, '\'') => ScanState::Normal,
                        (false, _) => ScanState::InChar {
                            escape_pending: false,
                            opened_at,
                        },
                    }
                }
            };
        }

        match state {
            ScanState::InBlockComment { opened_at } => Some(unterminated("block comment", opened_at)),
            ScanState::InString { opened_at, .. } => Some(unterminated("string literal", opened_at)),
            ScanState::InChar { opened_at, .. } => Some(unterminated("character literal", opened_at)),
            ScanState::Normal | ScanState::InLineComment => None,
        }
    }

    fn scan_normal(&mut self, ch: char) -> ScanState {
        let here = self.location();
        match ch {
            '/' if self.peek_ahead(1) == Some('/') => {
                self.advance();
                self.advance();
                ScanState::InLineComment
            }
            '/' if self.peek_ahead(1) == Some('*') => {
                self.advance();
                self.advance();
                ScanState::InBlockComment { opened_at: here }
            }
            '"' => {
                self.copy(ch);
                self.in_number = false;
                ScanState::InString {
                    escape_pending: false,
                    opened_at: here,
                }
            }
            '\'' if self.in_number && self.peek_ahead(1).is_some_and(|c| c.is_ascii_alphanumeric()) => {
                self.copy(ch);
                ScanState::Normal
            }
            '\'' => {
                self.copy(ch);
                self.in_number = false;
                ScanState::InChar {
                    escape_pending: false,
                    opened_at: here,
                }
            }
            _ => {
                let continues_word = self
                    .text
                    .chars()
                    .next_back()
                    .is_some_and(|prev| is_word_char(prev) || prev == '\'');
                if is_word_char(ch) {
                    if !continues_word {
                        self.in_number = ch.is_ascii_digit();
                    }
                } else {
                    self.in_number = false;
                }
                self.copy(ch);
                ScanState::Normal
            }
        }
    }

    /// Copies everything up to end of file unchanged, line breaks included
    fn copy_rest(&mut self) {
        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                let from = self.position;
                self.consume_line_terminator();
                self.text.push_str(&self.input[from..self.position]);
            } else {
                self.copy(ch);
            }
        }
    }

    /// Replacement for a joined line break
    fn emit_separator(&mut self) {
        self.text.push(' ');
        self.in_number = false;
    }

    fn copy(&mut self, ch: char) {
        self.text.push(ch);
        self.advance();
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input[self.position..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        self.column += 1;
        Some(ch)
    }

    /// Consumes `\n`, `\r\n` or a lone `\r` as one line break.
    fn consume_line_terminator(&mut self) {
        if self.advance() == Some('\r') && self.peek() == Some('\n') {
            self.position += 1;
        }
        self.line += 1;
        self.column = 1;
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn is_line_terminator(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

fn unterminated(what: &str, location: SourceLocation) -> LexError {
    LexError {
        message: format!("Unterminated {what}"),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(source: &str) -> LogicalLine {
        scan_directive(source, 0, SourceLocation::new(1, 1)).line
    }

    #[test]
    fn test_continuation_becomes_single_space() {
        let line = normalized("#define M\\\n0");
        assert_eq!(line.text, "#define M 0");
        assert_eq!((line.start_line, line.end_line), (1, 2));
    }

    #[test]
    fn test_continuation_with_crlf() {
        assert_eq!(normalized("#define M\\\r\n0\r\n").text, "#define M 0");
    }

    #[test]
    fn test_block_comment_is_removed_without_replacement() {
        assert_eq!(normalized("#define A B/*CCC*/\n").text, "#define A B");
        assert_eq!(normalized("#define A B/**/C\n").text, "#define A BC");
        assert_eq!(normalized("#define A B/*-\"str\"-*/C\n").text, "#define A BC");
    }

    #[test]
    fn test_multiline_block_comment_extends_range() {
        let directive = scan_directive("#define A B/*C\n\n\nC*/D\n", 0, SourceLocation::new(1, 1));
        assert_eq!(directive.line.text, "#define A BD");
        assert_eq!(directive.line.start_line, 1);
        assert_eq!(directive.line.end_line, 4);
        assert_eq!(directive.line.physical_lines(), 4);
        assert!(directive.error.is_none());
    }

    #[test]
    fn test_comment_openers_inside_literals_are_kept() {
        assert_eq!(normalized("#define A \"a/*\" B\n").text, "#define A \"a/*\" B");
        assert_eq!(normalized("#define A \"-str/*\"-/*CCC*/\n").text, "#define A \"-str/*\"-");
        assert_eq!(normalized("#define S '/' '\\''\n").text, "#define S '/' '\\''");
    }

    #[test]
    fn test_line_comment_drops_rest_of_line() {
        assert_eq!(normalized("#define A B//-/*-\"str\"-*/\n").text, "#define A B");
    }

    #[test]
    fn test_stray_block_comment_closer_is_text() {
        assert_eq!(normalized("#define A B*/\n").text, "#define A B*/");
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        assert_eq!(normalized("#define Q \"a\\\"//b\"\n").text, "#define Q \"a\\\"//b\"");
    }

    #[test]
    fn test_digit_separator_is_not_a_char_literal() {
        let directive = scan_directive("#if X > 1'000 // big\n", 0, SourceLocation::new(1, 1));
        assert_eq!(directive.line.text, "#if X > 1'000");
        assert!(directive.error.is_none());
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_eof() {
        let source = "#define A B /* open\nint x;\n";
        let directive = scan_directive(source, 0, SourceLocation::new(1, 1));
        assert_eq!(directive.line.text, "#define A B");
        assert_eq!(directive.span.end, source.len());
        let error = directive.error.expect("unterminated comment reported");
        assert_eq!(error.location, SourceLocation::new(1, 13));
        assert!(error.message.contains("block comment"));
    }

    #[test]
    fn test_unterminated_string_runs_to_eof() {
        let source = "#define S \"open\nint x = 1; // tail\n#include <y>\n";
        let directive = scan_directive(source, 0, SourceLocation::new(1, 1));
        assert_eq!(directive.span.end, source.len());
        assert_eq!(directive.line.end_line, 4);
        assert_eq!(
            directive.line.text,
            "#define S \"open\nint x = 1; // tail\n#include <y>"
        );
        let error = directive.error.expect("unterminated string reported");
        assert_eq!(error.location, SourceLocation::new(1, 11));
        assert!(error.message.contains("string literal"));

        // the copied rest reads the same way again
        let again = normalize(&directive.line.text);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].text, directive.line.text);
    }

    #[test]
    fn test_unterminated_character_stops_at_line_end() {
        let source = "#error don't do this\nint x;\n";
        let directive = scan_directive(source, 0, SourceLocation::new(1, 1));
        assert_eq!(directive.line.text, "#error don't do this");
        assert_eq!(directive.line.end_line, 1);
        let error = directive.error.expect("unterminated literal reported");
        assert_eq!(error.location, SourceLocation::new(1, 11));
    }

    #[test]
    fn test_trailing_line_comment_continues_over_backslash() {
        let directive = scan_directive("#define A 1 // c \\\nstill comment\nint x;", 0, SourceLocation::new(1, 1));
        assert_eq!(directive.line.text, "#define A 1");
        assert_eq!(directive.line.end_line, 2);
    }

    #[test]
    fn test_normalize_skips_ordinary_code() {
        let lines = normalize("int a; /* #define NOT */\n  # include <iostream>\n\"#x\";\n#define B 2 \\\n + 3\n");
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["# include <iostream>", "#define B 2   + 3"]);
        assert_eq!((lines[1].start_line, lines[1].end_line), (4, 5));
    }

    #[test]
    fn test_normalization_is_a_fixed_point() {
        for source in [
            "#define A B/*C\n\n\nC*/D\n",
            "#define M\\\n0",
            "#define A \"a/*\" B // tail\n",
            "#if X > 1'000 /* c */ && Y\n",
        ] {
            for line in normalize(source) {
                let again = normalize(&line.text);
                assert_eq!(again.len(), 1);
                assert_eq!(again[0].text, line.text);
            }
        }
    }
}
