//! Expression sub-parser boundary ("SassScript") for the Stylish dialect.
//!
//! The grammar engine in `stylish-parser` treats everything on the other
//! side of this trait as opaque: it hands the sub-parser a shared
//! `&mut Scanner` so both sides advance the same cursor, and gets back a
//! `stylish_ast::Expr`/`ArgList` whose `raw` field it never inspects.
//!
//! `DefaultExpressionParser` is the one concrete implementation this
//! workspace ships: just enough of the value grammar (literals, `#{}`
//! interpolation, balanced parens/brackets, argument lists) to parse every
//! value position the dialect's own grammar delegates here, without
//! pretending to be a full SassScript implementation.

mod error;

use stylish_ast::{ArgList, Expr, Span};
use stylish_lexer::{patterns, Scanner};

pub use error::ExprError;

pub type ExprResult<T> = Result<T, ExprError>;

/// The delegation boundary the grammar engine calls through. Generic rather
/// than a trait object (`&mut dyn ExpressionParser`) so the default
/// implementation monomorphizes without a vtable in this hot parsing path.
pub trait ExpressionParser {
    /// Parse one expression up to a natural terminator (`;`, `}`, `)`, a
    /// trailing `!important`, or end of input, whichever the surrounding
    /// grammar implies).
    fn parse(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<Expr>;

    /// Parse one expression, stopping immediately before any of the given
    /// literal words (used by `@for ... from <expr> to|through`).
    fn parse_until(&mut self, scanner: &mut Scanner<'_>, stop_words: &[&str]) -> ExprResult<Expr>;

    /// Parse a single `#{...}` body, including the closing brace. The
    /// scanner must be positioned at the opening `#{`.
    fn parse_interpolated(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<Expr>;

    /// Parse a parenthesized, comma-separated parameter list for a
    /// `@mixin` definition. An absent `(...)` yields an empty list (mixins
    /// may take no arguments).
    fn parse_mixin_definition_arglist(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<ArgList>;

    /// Parse a parenthesized, comma-separated argument list for an
    /// `@include` invocation.
    fn parse_mixin_include_arglist(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<ArgList>;
}

/// The concrete expression sub-parser used by `stylish_parser::parse`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExpressionParser;

impl DefaultExpressionParser {
    pub fn new() -> Self {
        Self
    }

    fn skip_ws(&self, scanner: &mut Scanner<'_>) {
        while scanner.scan(&patterns::S).is_some() || scanner.scan(&patterns::COMMENT).is_some() {
        }
    }

    /// The leading word of `rest` (after skipping whitespace), without
    /// consuming anything. Used to test `stop_words` membership.
    fn peek_word<'s>(&self, rest: &'s str) -> Option<&'s str> {
        let trimmed = rest.trim_start_matches([' ', '\t', '\r', '\n', '\x0c']);
        let end = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(trimmed.len());
        if end == 0 {
            None
        } else {
            Some(&trimmed[..end])
        }
    }

    /// Consume one interpolated string literal (either quote style),
    /// resolving any embedded `#{...}` interpolations as it goes.
    fn consume_string(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<()> {
        let line = scanner.line();
        let double = scanner.peek_char() == Some('"');
        let (open, mid) = if double {
            (&patterns::DOUBLE_STRING_OPEN, &patterns::DOUBLE_STRING_MID)
        } else {
            (&patterns::SINGLE_STRING_OPEN, &patterns::SINGLE_STRING_MID)
        };
        scanner
            .scan(open)
            .ok_or(ExprError::UnterminatedString { line })?;
        // Group 1 is present iff the match stopped at `#{` rather than the
        // closing quote (continuation detection via capture-group
        // emptiness).
        let mut opened_interpolation = scanner.group(1).is_some();
        while opened_interpolation {
            self.consume_interpolation_body(scanner)?;
            scanner
                .scan(mid)
                .ok_or(ExprError::UnterminatedString { line })?;
            opened_interpolation = scanner.group(1).is_some();
        }
        Ok(())
    }

    /// Consume the body of a `#{...}` that the scanner has already advanced
    /// past the opening `#{` of (used both by `consume_string`'s embedded
    /// interpolations and by `parse_interpolated` itself).
    fn consume_interpolation_body(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<()> {
        let line = scanner.line();
        let mut depth = 1i32;
        loop {
            match scanner.peek_char() {
                None => return Err(ExprError::UnterminatedInterpolation { line }),
                Some('"') | Some('\'') => self.consume_string(scanner)?,
                Some('{') => {
                    depth += 1;
                    scanner.bump();
                }
                Some('}') => {
                    depth -= 1;
                    scanner.bump();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {
                    scanner.bump();
                }
            }
        }
    }
}

impl ExpressionParser for DefaultExpressionParser {
    fn parse(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<Expr> {
        self.parse_until(scanner, &[])
    }

    fn parse_until(&mut self, scanner: &mut Scanner<'_>, stop_words: &[&str]) -> ExprResult<Expr> {
        let line = scanner.line();
        let start = scanner.position();
        let mut depth = 0i32;
        loop {
            let rest = scanner.rest();
            if rest.is_empty() {
                break;
            }
            if depth == 0 {
                if rest.starts_with(';')
                    || rest.starts_with('}')
                    || rest.starts_with(')')
                    || (rest.starts_with('{') && !rest.starts_with("#{"))
                    || scanner.peek(&patterns::IMPORTANT)
                {
                    break;
                }
                if !stop_words.is_empty() {
                    if let Some(word) = self.peek_word(rest) {
                        if stop_words.contains(&word) {
                            break;
                        }
                    }
                }
            }
            match scanner.peek_char() {
                Some('"') | Some('\'') => self.consume_string(scanner)?,
                Some('#') if rest.starts_with("#{") => {
                    // Consumed as one atomic unit rather than character by
                    // character: stepping one char at a time would leave the
                    // scanner sitting right after the `#` with `rest` now
                    // starting with a bare `{`, which the depth-0 check above
                    // would then misread as the declaration's own nested
                    // block opening.
                    scanner.bump();
                    scanner.bump();
                    self.consume_interpolation_body(scanner)?;
                }
                Some('(') | Some('[') => {
                    depth += 1;
                    scanner.bump();
                }
                Some(')') | Some(']') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    scanner.bump();
                }
                Some(_) => {
                    scanner.bump();
                }
                None => break,
            }
        }
        let end = scanner.position();
        if end == start {
            return Err(ExprError::Empty { line });
        }
        Ok(Expr::new(
            &scanner.source()[start..end],
            Span::new(start, end),
        ))
    }

    fn parse_interpolated(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<Expr> {
        let line = scanner.line();
        let start = scanner.position();
        if !scanner.rest().starts_with("#{") {
            return Err(ExprError::Empty { line });
        }
        scanner.bump();
        scanner.bump();
        self.consume_interpolation_body(scanner)?;
        let end = scanner.position();
        Ok(Expr::new(
            &scanner.source()[start..end],
            Span::new(start, end),
        ))
    }

    fn parse_mixin_definition_arglist(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<ArgList> {
        self.parse_arglist(scanner)
    }

    fn parse_mixin_include_arglist(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<ArgList> {
        self.parse_arglist(scanner)
    }
}

impl DefaultExpressionParser {
    fn parse_arglist(&mut self, scanner: &mut Scanner<'_>) -> ExprResult<ArgList> {
        let line = scanner.line();
        self.skip_ws(scanner);
        let start = scanner.position();
        if scanner.peek_char() != Some('(') {
            return Ok(ArgList::new(String::new(), Span::new(start, start)));
        }
        scanner.bump();
        let mut depth = 1i32;
        loop {
            match scanner.peek_char() {
                None => return Err(ExprError::UnterminatedArgList { line }),
                Some('"') | Some('\'') => self.consume_string(scanner)?,
                Some('(') => {
                    depth += 1;
                    scanner.bump();
                }
                Some(')') => {
                    depth -= 1;
                    scanner.bump();
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    scanner.bump();
                }
            }
        }
        let end = scanner.position();
        Ok(ArgList::new(
            &scanner.source()[start..end],
            Span::new(start, end),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stops_at_semicolon() {
        let mut s = Scanner::new("3px; color: red");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse(&mut s).unwrap();
        assert_eq!(expr.raw, "3px");
        assert_eq!(s.rest(), "; color: red");
    }

    #[test]
    fn parse_stops_before_important_suffix() {
        let mut s = Scanner::new("red !important; rest");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse(&mut s).unwrap();
        assert_eq!(expr.raw, "red ");
        assert_eq!(s.rest(), "!important; rest");
    }

    #[test]
    fn parse_stops_at_semicolon_past_embedded_interpolation() {
        // The `#{...}` must be swallowed as one atomic unit. Consuming it
        // one character at a time would leave `rest` starting with a bare
        // `{` right after the `#`, which looks exactly like the start of a
        // declaration's own nested block and would truncate the value.
        let mut s = Scanner::new("#{$c} solid; rest");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse(&mut s).unwrap();
        assert_eq!(expr.raw, "#{$c} solid");
        assert_eq!(s.rest(), "; rest");
    }

    #[test]
    fn parse_handles_interpolation_adjacent_to_block_brace() {
        let mut s = Scanner::new("#{$c} { next }");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse(&mut s).unwrap();
        assert_eq!(expr.raw, "#{$c} ");
        assert_eq!(s.rest(), "{ next }");
    }

    #[test]
    fn parse_until_stops_before_keyword() {
        let mut s = Scanner::new("1 to 3");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse_until(&mut s, &["to", "through"]).unwrap();
        assert_eq!(expr.raw, "1 ");
        assert_eq!(s.rest(), "to 3");
    }

    #[test]
    fn parse_handles_nested_parens() {
        let mut s = Scanner::new("rgba(0, 0, 0, .5); next");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse(&mut s).unwrap();
        assert_eq!(expr.raw, "rgba(0, 0, 0, .5)");
    }

    #[test]
    fn parse_skips_semicolons_inside_strings() {
        let mut s = Scanner::new(r#""a;b"; rest"#);
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse(&mut s).unwrap();
        assert_eq!(expr.raw, r#""a;b""#);
    }

    #[test]
    fn parse_interpolated_consumes_through_closing_brace() {
        let mut s = Scanner::new("#{$x + 1} rest");
        let mut p = DefaultExpressionParser::new();
        let expr = p.parse_interpolated(&mut s).unwrap();
        assert_eq!(expr.raw, "#{$x + 1}");
        assert_eq!(s.rest(), " rest");
    }

    #[test]
    fn arglist_without_parens_is_empty() {
        let mut s = Scanner::new("{ }");
        let mut p = DefaultExpressionParser::new();
        let args = p.parse_mixin_definition_arglist(&mut s).unwrap();
        assert_eq!(args.raw, "");
        assert_eq!(s.rest(), "{ }");
    }

    #[test]
    fn arglist_captures_balanced_parens() {
        let mut s = Scanner::new("($a, $b: 1) { }");
        let mut p = DefaultExpressionParser::new();
        let args = p.parse_mixin_definition_arglist(&mut s).unwrap();
        assert_eq!(args.raw, "($a, $b: 1)");
        assert_eq!(s.rest(), " { }");
    }
}
