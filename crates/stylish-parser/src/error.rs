//! The error reporter: one message shape, built from the
//! scanner's position at the moment a committed production found a required
//! token missing.

use miette::{Diagnostic, NamedSource, SourceSpan};
use stylish_lexer::Scanner;
use thiserror::Error as ThisError;

/// The parser's single error kind: a syntax error, fatal, carrying the
/// formatted message and the 1-based line it occurred on. `miette`'s
/// `Diagnostic` derive is additive decoration for callers that want
/// source-span highlighting; the message text is exactly what the error
/// reporter's rules mandate and is what tests assert against.
#[derive(Debug, Clone, ThisError, Diagnostic)]
#[error("{message}")]
pub struct Error {
    pub message: String,
    pub line: usize,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
}

impl Error {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Build the canonical `Invalid CSS after "...": expected X, was "..."`
/// message from the scanner's current position.
pub(crate) fn syntax_error(scanner: &Scanner<'_>, file: &str, fallback_expected: &str) -> Error {
    let expected = scanner
        .expected()
        .map(str::to_string)
        .unwrap_or_else(|| fallback_expected.to_string());
    let before = context_before(scanner.source(), scanner.position());
    let after = context_after(scanner.source(), scanner.position());
    let message = format!("Invalid CSS after \"{before}\": expected {expected}, was \"{after}\"");
    Error {
        message,
        line: scanner.line(),
        src: NamedSource::new(file, scanner.source().to_string()),
        span: (scanner.position(), 0).into(),
    }
}

/// Up to the last 15 characters of `source[..position]`. Any newline inside
/// that window elides everything up to and including it (the window never
/// crosses back over a line break), trailing spaces/tabs are trimmed, and a
/// `"..."` prefix marks truncation.
fn context_before(source: &str, position: usize) -> String {
    let full = &source[..position];
    let window_start = floor_char_boundary(full, full.len().saturating_sub(15));
    let window = &full[window_start..];
    let newline_idx = window.rfind('\n');
    let after_newline = match newline_idx {
        Some(idx) => &window[idx + 1..],
        None => window,
    };
    let trimmed = after_newline.trim_end_matches([' ', '\t']);
    // Once a newline bounds the window, that is a genuine line start, not a
    // mid-content truncation. The "..." marker is reserved for the case
    // where the 15-character cap cut into a line with nothing to anchor on.
    let truncated = window_start > 0 && newline_idx.is_none();
    if truncated {
        format!("...{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Up to the next 15 characters of `source[position..]`. A leading newline
/// is stripped before measuring; the window stops at the first remaining
/// newline; a `"..."` suffix marks truncation.
fn context_after(source: &str, position: usize) -> String {
    let full = &source[position..];
    let stripped = full.strip_prefix('\n').unwrap_or(full);
    let window_end = floor_char_boundary(stripped, stripped.len().min(15));
    let window = &stripped[..window_end];
    let (visible, cut_at_newline) = match window.find('\n') {
        Some(idx) => (&window[..idx], true),
        None => (window, false),
    };
    let truncated = cut_at_newline || window_end < stripped.len();
    if truncated {
        format!("{visible}...")
    } else {
        visible.to_string()
    }
}

/// `str::floor_char_boundary` is still unstable; this is the same idea:
/// walk back from `index` until it lands on a UTF-8 character boundary.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_before_truncates_with_ellipsis() {
        let source = "a".repeat(30);
        assert_eq!(
            context_before(&source, 30),
            format!("...{}", "a".repeat(15))
        );
    }

    #[test]
    fn context_before_elides_preceding_newline() {
        let source = "color: red;\nhover";
        let before = context_before(source, source.len());
        assert_eq!(before, "hover");
    }

    #[test]
    fn context_after_stops_at_next_newline() {
        let source = "abc\ndef";
        assert_eq!(context_after(source, 0), "abc...");
    }

    #[test]
    fn context_after_strips_leading_newline() {
        let source = "\nabc";
        assert_eq!(context_after(source, 0), "abc");
    }
}
