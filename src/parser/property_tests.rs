//! Property-based tests for the C++ front end.
//!
//! These tests use `proptest` to check invariants over generated inputs:
//!
//! 1. **Lexer never panics** and always ends with exactly one EOF token
//! 2. **Round trip**: tokens plus trivia reproduce the input byte for byte
//! 3. **Spans are ordered** and never overlap
//! 4. **Normalization is idempotent** on every logical line it produces
//! 5. **Parser terminates** in both modes; strict mode reports at most once

use proptest::prelude::*;

use super::lexer::{tokenize, TokenKind};
use super::normalizer::normalize;
use super::parse::{parse, ParserState};

/// Pieces of C++ and preprocessor text, including the awkward ones
const FRAGMENTS: &[&str] = &[
    "#", "#define A ", "#include <x.h>", "  # if X", "int", " ", "\t", "\n", "\r\n", "\r",
    "\\\n", "\\", "//", "/*", "*/", "\"", "'", "\"s/*\"", "'\\''", "R\"d(", ")d\"", "u8", "L",
    "0x1F", "1'000", ".5e+3", "x", "_y", "{", "}", "(", ")", "[", "]", ";", ",", ">>=", "<=>",
    "->*", "::", "<", ">", "=", "+", "?", ":", "@", "é", "if", "for", "return", "class", "template",
    "goto", "and",
];

fn cxx_like() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..60).prop_map(|parts| parts.concat())
}

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn lexer_never_panics(input in "\\PC{0,300}") {
        let stream = tokenize(&input);
        prop_assert_eq!(stream.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn eof_appears_exactly_once(input in cxx_like()) {
        let stream = tokenize(&input);
        let eofs = stream.tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(stream.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn tokens_and_trivia_cover_the_input(input in cxx_like()) {
        let stream = tokenize(&input);
        prop_assert_eq!(stream.reconstruct(&input), input);
    }

    #[test]
    fn arbitrary_text_round_trips(input in "\\PC{0,300}") {
        let stream = tokenize(&input);
        prop_assert_eq!(stream.reconstruct(&input), input);
    }

    #[test]
    fn token_spans_are_ordered(input in cxx_like()) {
        let stream = tokenize(&input);
        for pair in stream.tokens.windows(2) {
            prop_assert!(
                pair[0].span.end <= pair[1].span.start,
                "{:?} overlaps {:?}",
                pair[0],
                pair[1]
            );
            prop_assert!(pair[0].location <= pair[1].location);
        }
        for token in &stream.tokens {
            prop_assert!(token.span.end <= input.len());
        }
    }

    #[test]
    fn normalization_is_idempotent(input in cxx_like()) {
        for line in normalize(&input) {
            let again = normalize(&line.text);
            prop_assert_eq!(again.len(), 1, "{:?}", line.text);
            prop_assert_eq!(&again[0].text, &line.text);
        }
    }

    #[test]
    fn parser_terminates_in_recovery_mode(input in cxx_like()) {
        let stream = tokenize(&input);
        let outcome = parse(&stream.tokens, true);
        prop_assert_ne!(outcome.state, ParserState::Failed);
    }

    #[test]
    fn strict_mode_reports_at_most_once(input in cxx_like()) {
        let stream = tokenize(&input);
        let outcome = parse(&stream.tokens, false);
        prop_assert!(outcome.diagnostics.len() <= 1);
        prop_assert_eq!(outcome.state == ParserState::Failed, outcome.diagnostics.len() == 1);
    }
}
