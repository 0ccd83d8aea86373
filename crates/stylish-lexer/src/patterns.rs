//! Named lexical primitives. Each is a plain `regex::Regex`; the
//! scanner treats position 0 of whatever suffix it is handed as the anchor,
//! so none of these carry an explicit `^`.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single named regular-expression primitive consumed via `Scanner::scan`.
pub struct Pattern {
    /// Human-facing identifier, used by the error reporter's pattern-name
    /// table and by `Scanner::capture` bookkeeping (comments are excluded
    /// by name, not by some separate comment flag).
    pub name: &'static str,
    pub regex: Regex,
    /// Block and line comments are elided from capture spans.
    pub is_comment: bool,
}

impl Pattern {
    fn new(name: &'static str, re: &str) -> Self {
        Self {
            name,
            regex: Regex::new(re).unwrap_or_else(|e| panic!("bad pattern {name}: {e}")),
            is_comment: false,
        }
    }

    fn new_comment(name: &'static str, re: &str) -> Self {
        Self {
            name,
            regex: Regex::new(re).unwrap_or_else(|e| panic!("bad pattern {name}: {e}")),
            is_comment: true,
        }
    }
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        pub static $name: Lazy<Pattern> = Lazy::new(|| Pattern::new(stringify!($name), $re));
    };
}

macro_rules! comment_pattern {
    ($name:ident, $re:expr) => {
        pub static $name: Lazy<Pattern> =
            Lazy::new(|| Pattern::new_comment(stringify!($name), $re));
    };
}

pattern!(S, r"[ \t\r\n\f]+");
pattern!(CDO, r"<!--");
pattern!(CDC, r"-->");
comment_pattern!(COMMENT, r"/\*(?:[^*]|\*+[^*/])*\*+/");
comment_pattern!(SINGLE_LINE_COMMENT, r"//[^\n]*");

pattern!(IDENT, r"-?[a-zA-Z_][a-zA-Z0-9_-]*");
pattern!(
    NUMBER,
    r"[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?|\.[0-9]+|[0-9]+"
);
pattern!(
    URI,
    r#"url\(\s*(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|[^)'"]*)\s*\)"#
);
pattern!(FUNCTION, r"-?[a-zA-Z_][a-zA-Z0-9_-]*\(");
pattern!(HASH, r"#[a-zA-Z0-9_-]+");
pattern!(
    UNICODERANGE,
    r"[uU]\+[0-9a-fA-F?]{1,6}(?:-[0-9a-fA-F]{1,6})?"
);

pattern!(PLUS, r"\+");
pattern!(GREATER, r">");
pattern!(TILDE, r"~");
pattern!(NOT, r":not\(");
pattern!(INCLUDES, r"~=");
pattern!(DASHMATCH, r"\|=");
pattern!(PREFIXMATCH, r"\^=");
pattern!(SUFFIXMATCH, r"\$=");
pattern!(SUBSTRINGMATCH, r"\*=");
pattern!(IMPORTANT, r"!\s*important");

// Interpolation-aware string literals. The "open" forms start at
// the opening quote; the "mid" forms resume after an interpolation closes
// (no leading quote). Capture group 1 is present iff the match stopped at
// `#{` rather than the closing quote; `Scanner::group(1)` exposes this to
// the grammar engine's continuation-detection logic.
pattern!(
    DOUBLE_STRING_OPEN,
    r#""(?:[^"\\#]|\\.|\#(?!\{))*(?:(\#\{)|")"#
);
pattern!(DOUBLE_STRING_MID, r#"(?:[^"\\#]|\\.|\#(?!\{))*(?:(\#\{)|")"#);
pattern!(
    SINGLE_STRING_OPEN,
    r#"'(?:[^'\\#]|\\.|\#(?!\{))*(?:(\#\{)|')"#
);
pattern!(SINGLE_STRING_MID, r#"(?:[^'\\#]|\\.|\#(?!\{))*(?:(\#\{)|')"#);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_matches_leading_identifier() {
        let m = IDENT.regex.find("color: red").unwrap();
        assert_eq!(m.as_str(), "color");
    }

    #[test]
    fn function_requires_open_paren() {
        assert!(FUNCTION.regex.find("rgba(").is_some());
        assert_eq!(FUNCTION.regex.find("rgba(").unwrap().as_str(), "rgba(");
    }

    #[test]
    fn double_string_open_stops_at_interpolation() {
        let caps = DOUBLE_STRING_OPEN.regex.captures(r#""a#{$x}"#).unwrap();
        assert!(caps.get(1).is_some());
    }

    #[test]
    fn double_string_open_closes_without_interpolation() {
        let caps = DOUBLE_STRING_OPEN.regex.captures(r#""plain""#).unwrap();
        assert!(caps.get(1).is_none());
    }
}
