//! Extraction of `@name` placeholders from query text.

use std::sync::LazyLock;

use regex::Regex;

/// The character introducing a query parameter.
pub const SIGIL: char = '@';

// Text skipped by the quote-aware lexer; only the final alternative captures a placeholder.
const SKIPPED: [&str; 10] = [
    // template expressions, e.g.: `#{#table}`
    r"#\{(?:'(?:[^']|'')*'|[^}'])*\}",
    // `#` comments, when they start a line or follow a blank
    r"(?:^|[ \t])#(?:[^{\n][^\n]*|$)",
    r"--[^\n]*",
    r"/\*.*?\*/",
    // raw strings, where backslashes do not escape
    r#"\b(?:[bB]?[rR]|[rR][bB])(?:'''.*?'''|""".*?"""|'[^'\n]*'|"[^"\n]*")"#,
    r"'''(?:[^\\]|\\.)*?'''",
    r#""""(?:[^\\]|\\.)*?""""#,
    r"'(?:[^'\\]|\\.)*'",
    r#""(?:[^"\\]|\\.)*""#,
    r"`(?:[^`\\]|\\.)*`",
];

const PLACEHOLDER: &str = r"@(\S+)";

static QUOTE_AWARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?sm){}|{}", SKIPPED.join("|"), PLACEHOLDER)).unwrap()
});

static NAIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PLACEHOLDER).unwrap());

/// How placeholders are recognized in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagLexing {
    /// The sigil is ignored inside string literals, quoted identifiers, comments and `#{...}`
    /// template expressions.
    #[default]
    QuoteAware,
    /// Every sigil followed by non-whitespace is a placeholder, wherever it appears.
    Naive,
}

impl TagLexing {
    fn regex(self) -> &'static Regex {
        match self {
            TagLexing::QuoteAware => &QUOTE_AWARE,
            TagLexing::Naive => &NAIVE,
        }
    }
}

/// Returns the names of the placeholders in `sql`, without their sigil, in order of appearance.
///
/// A placeholder is the sigil followed by a run of non-whitespace characters; the whole run is
/// the name. Repeated placeholders appear once per occurrence.
pub fn extract_tags(sql: &str, lexing: TagLexing) -> Vec<String> {
    lexing
        .regex()
        .captures_iter(sql)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}
