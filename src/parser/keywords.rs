// Read-only keyword and operator tables shared by every lexer/parser instance

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

/// Reserved words of C++20
const KEYWORD_LIST: &[&str] = &[
    "alignas", "alignof", "asm", "auto", "bool", "break", "case", "catch", "char",
    "char8_t", "char16_t", "char32_t", "class", "concept", "const", "consteval",
    "constexpr", "constinit", "const_cast", "continue", "co_await", "co_return",
    "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for",
    "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace", "new",
    "noexcept", "nullptr", "operator", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this",
    "thread_local", "throw", "true", "try", "typedef", "typeid", "typename", "union",
    "unsigned", "using", "virtual", "void", "volatile", "wchar_t", "while",
];

/// Operator spellings, including the alternative tokens (`and`, `bitor`, ...)
const OPERATOR_LIST: &[&str] = &[
    // three characters
    "<=>", "->*", "<<=", ">>=", "...",
    // two characters
    "::", "->", ".*", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "##",
    // one character
    "+", "-", "*", "/", "%", "^", "&", "|", "~", "!", "=", "<", ">", ".", "?", ":",
    "#",
];

/// Alternative spellings and the operator each one stands for
const ALTERNATIVE_TOKENS: &[(&str, &str)] = &[
    ("and", "&&"),
    ("and_eq", "&="),
    ("bitand", "&"),
    ("bitor", "|"),
    ("compl", "~"),
    ("not", "!"),
    ("not_eq", "!="),
    ("or", "||"),
    ("or_eq", "|="),
    ("xor", "^"),
    ("xor_eq", "^="),
];

/// Punctuators that never combine with a following character
pub const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ';', ','];

/// Length in bytes of the longest operator spelling
const MAX_OPERATOR_LEN: usize = 3;

static KEYWORDS: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| KEYWORD_LIST.iter().copied().collect());

static OPERATORS: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| OPERATOR_LIST.iter().copied().collect());

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

/// True for identifiers that are really operator spellings (`and`, `not_eq`, ...)
pub fn is_alternative_operator(word: &str) -> bool {
    ALTERNATIVE_TOKENS.iter().any(|(alt, _)| *alt == word)
}

/// Maps an alternative token to its symbolic form; other spellings pass through.
pub fn canonical_operator(spelling: &str) -> &str {
    ALTERNATIVE_TOKENS
        .iter()
        .find(|(alt, _)| *alt == spelling)
        .map_or(spelling, |&(_, op)| op)
}

/// Longest operator spelling at the start of `rest` (maximal munch).
pub fn longest_operator(rest: &str) -> Option<&'static str> {
    (1..=MAX_OPERATOR_LEN.min(rest.len()))
        .rev()
        .filter_map(|len| rest.get(..len))
        .find_map(|candidate| OPERATORS.get(candidate).copied())
}

/// Keywords that can begin a declaration inside a block
pub fn is_decl_specifier_keyword(word: &str) -> bool {
    matches!(
        word,
        "alignas"
            | "auto"
            | "bool"
            | "char"
            | "char8_t"
            | "char16_t"
            | "char32_t"
            | "class"
            | "const"
            | "consteval"
            | "constexpr"
            | "constinit"
            | "decltype"
            | "double"
            | "enum"
            | "explicit"
            | "extern"
            | "float"
            | "friend"
            | "inline"
            | "int"
            | "long"
            | "mutable"
            | "namespace"
            | "register"
            | "short"
            | "signed"
            | "static"
            | "static_assert"
            | "struct"
            | "template"
            | "thread_local"
            | "typedef"
            | "typename"
            | "union"
            | "unsigned"
            | "using"
            | "virtual"
            | "void"
            | "volatile"
            | "wchar_t"
    )
}

/// Keywords naming (part of) a type, usable in casts and functional notation
pub fn is_type_keyword(word: &str) -> bool {
    matches!(
        word,
        "auto"
            | "bool"
            | "char"
            | "char8_t"
            | "char16_t"
            | "char32_t"
            | "const"
            | "decltype"
            | "double"
            | "float"
            | "int"
            | "long"
            | "short"
            | "signed"
            | "typename"
            | "unsigned"
            | "void"
            | "volatile"
            | "wchar_t"
    )
}

/// Keywords that only make sense inside a function body
pub fn is_statement_keyword(word: &str) -> bool {
    matches!(
        word,
        "break"
            | "case"
            | "catch"
            | "co_return"
            | "continue"
            | "do"
            | "else"
            | "for"
            | "goto"
            | "if"
            | "return"
            | "switch"
            | "try"
            | "while"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_operator_prefers_longer_spelling() {
        assert_eq!(longest_operator(">>=1"), Some(">>="));
        assert_eq!(longest_operator(">>1"), Some(">>"));
        assert_eq!(longest_operator(">1"), Some(">"));
        assert_eq!(longest_operator("->*p"), Some("->*"));
        assert_eq!(longest_operator("@"), None);
    }

    #[test]
    fn test_longest_operator_respects_char_boundaries() {
        assert_eq!(longest_operator("<é"), Some("<"));
        assert_eq!(longest_operator("é"), None);
    }

    #[test]
    fn test_keyword_tables() {
        assert!(is_keyword("constexpr"));
        assert!(!is_keyword("override"));
        assert!(is_alternative_operator("bitand"));
        assert_eq!(canonical_operator("not_eq"), "!=");
        assert_eq!(canonical_operator("+="), "+=");
    }
}
