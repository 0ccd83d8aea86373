use crate::patterns::Pattern;

/// A saved cursor position, for the single backtracking point the grammar
/// engine is allowed to use. The capture stack is deliberately not
/// part of the bookmark: no capture region straddles that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    position: usize,
    line: usize,
}

/// Position-tracking cursor over the source text.
///
/// `source` is held for the lifetime of one `parse` call; nothing here
/// mutates it. Everything else (`position`, `line`, the last match's
/// capture groups, the pending `expected` label, and the capture stack) is
/// mutable scanning state.
pub struct Scanner<'a> {
    source: &'a str,
    position: usize,
    line: usize,
    last_groups: Vec<Option<String>>,
    expected: Option<String>,
    capture_stack: Vec<String>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            last_groups: Vec::new(),
            expected: None,
            capture_stack: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    /// The unconsumed suffix of the source.
    pub fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    /// Capture group `idx` (1-based, as in the grammar's `group(1)` usage)
    /// of the most recent successful `scan`. Group 0 (the whole match) is
    /// not stored separately; callers that need it already have the
    /// returned matched text.
    pub fn group(&self, idx: usize) -> Option<&str> {
        self.last_groups.get(idx).and_then(|g| g.as_deref())
    }

    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            position: self.position,
            line: self.line,
        }
    }

    pub fn restore(&mut self, bookmark: Bookmark) {
        self.position = bookmark.position;
        self.line = bookmark.line;
    }

    /// The expectation label most recently advertised via `set_expected`,
    /// if no successful token match has cleared it since.
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn set_expected(&mut self, label: impl Into<String>) {
        self.expected = Some(label.into());
    }

    pub fn clear_expected(&mut self) {
        self.expected = None;
    }

    /// Attempt to match `pattern` anchored at the current position. On
    /// success, advances `position`/`line`, records capture groups, clears
    /// `expected`, and appends the matched text to every live capture
    /// buffer (unless `pattern` is a comment pattern). Returns `None`
    /// without touching any state on failure.
    pub fn scan(&mut self, pattern: &Pattern) -> Option<&'a str> {
        let rest = self.rest();
        let caps = pattern.regex.captures(rest)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        let text = whole.as_str();
        // Index 0 is kept as a placeholder so `group(1)` addresses the
        // regex's capture group 1 directly, matching the grammar's
        // `group(1)`-style usage.
        self.last_groups = (0..caps.len())
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect();
        self.advance(text);
        if !pattern.is_comment {
            for buf in &mut self.capture_stack {
                buf.push_str(text);
            }
        }
        self.expected = None;
        Some(text)
    }

    /// Non-consuming lookahead equivalent of `scan`.
    pub fn peek(&self, pattern: &Pattern) -> bool {
        let rest = self.rest();
        matches!(pattern.regex.find(rest), Some(m) if m.start() == 0)
    }

    /// The next character without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume exactly one character, independent of any named pattern.
    /// Used by the expression sub-parser boundary for raw punctuation it
    /// has no reason to name (balanced parens, single operator glyphs).
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        let len = ch.len_utf8();
        let text = &self.source[self.position..self.position + len];
        self.advance(text);
        for buf in &mut self.capture_stack {
            buf.push(ch);
        }
        self.expected = None;
        Some(ch)
    }

    fn advance(&mut self, text: &str) {
        self.line += text.matches('\n').count();
        self.position += text.len();
    }

    /// Push a fresh capture buffer, run `body`, then pop it and return the
    /// text accumulated while it was live. Buffers nest: while more
    /// than one is on the stack, every consumed token is appended to all of
    /// them, which is how an outer capture spanning an inner one sees the
    /// inner text too.
    pub fn capture<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> (T, String) {
        self.push_capture();
        let result = body(self);
        (result, self.pop_capture())
    }

    /// Manual half of [`Scanner::capture`], for callers that need to invoke
    /// something other than a `&mut Scanner` closure (e.g. a grammar-engine
    /// method that also touches the expression sub-parser) while a buffer is
    /// live. Must be paired with a later `pop_capture`.
    pub fn push_capture(&mut self) {
        self.capture_stack.push(String::new());
    }

    /// Pop and return the buffer pushed by the matching `push_capture`.
    pub fn pop_capture(&mut self) -> String {
        self.capture_stack
            .pop()
            .expect("pop_capture called without a matching push_capture")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{IDENT, S};

    #[test]
    fn scan_advances_position_and_line() {
        let mut s = Scanner::new("foo\nbar");
        let m = s.scan(&IDENT).unwrap();
        assert_eq!(m, "foo");
        assert_eq!(s.position(), 3);
        assert_eq!(s.line(), 1);
        s.scan(&S).unwrap();
        assert_eq!(s.line(), 2);
    }

    #[test]
    fn scan_failure_leaves_state_untouched() {
        let mut s = Scanner::new("123abc");
        let before = s.bookmark();
        assert!(s.scan(&IDENT).is_none());
        assert_eq!(s.bookmark(), before);
    }

    #[test]
    fn bookmark_restore_round_trips() {
        let mut s = Scanner::new("foo bar");
        let mark = s.bookmark();
        s.scan(&IDENT).unwrap();
        s.scan(&S).unwrap();
        s.restore(mark);
        assert_eq!(s.position(), 0);
        assert_eq!(s.line(), 1);
    }

    #[test]
    fn capture_collects_consumed_text_excluding_comments() {
        let mut s = Scanner::new("foo bar");
        let (_, text) = s.capture(|s| {
            s.scan(&IDENT).unwrap();
            s.scan(&S).unwrap();
            s.scan(&IDENT).unwrap();
        });
        assert_eq!(text, "foo bar");
    }

    #[test]
    fn nested_capture_buffers_both_see_inner_text() {
        let mut s = Scanner::new("foobar");
        let (_, outer) = s.capture(|s| {
            let (_, inner) = s.capture(|s| {
                s.scan(&IDENT).unwrap();
            });
            assert_eq!(inner, "foobar");
        });
        assert_eq!(outer, "foobar");
    }
}
