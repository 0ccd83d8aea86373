use stylish_ast::{Node, Rule};
use stylish_expr::ExpressionParser;
use stylish_lexer::patterns;

use super::{Parser, PResult};
use crate::alt::Alt;
use crate::error::Error;

impl<'a, P: ExpressionParser> Parser<'a, P> {
    /// `ruleset`: one or more comma-separated `selector`s, then a braced
    /// block. Each selector is parsed structurally (combinators,
    /// simple selector sequences, attribute/pseudo/negation atoms) rather
    /// than guessed from raw text, so that garbage input is rejected right
    /// here instead of being accepted as a selector by accident; the AST
    /// still only needs the flattened source text per selector, which
    /// is what the capture stack gives us for free as a byproduct of the
    /// structural walk.
    pub(crate) fn try_ruleset(&mut self) -> PResult<Node> {
        let line = self.scanner.line();
        let bookmark = self.scanner.bookmark();

        let mut selectors = Vec::new();
        match self.try_selector()? {
            Alt::Matched(first) => selectors.push(first),
            Alt::NoMatch => {
                self.scanner.restore(bookmark);
                return Ok(Alt::NoMatch);
            }
        }
        loop {
            self.skip_ws_inline();
            if self.scanner.peek_char() != Some(',') {
                break;
            }
            self.scanner.bump();
            self.skip_ws_inline();
            match self.try_selector()? {
                Alt::Matched(sel) => selectors.push(sel),
                Alt::NoMatch => return Err(self.error("selector")),
            }
        }

        self.skip_ws_inline();
        if self.scanner.peek_char() != Some('{') {
            self.scanner.restore(bookmark);
            return Ok(Alt::NoMatch);
        }
        let children = self.braced_block()?;
        Ok(Alt::Matched(Node::Rule(Rule {
            line,
            selector: selectors,
            children,
        })))
    }

    /// `selector`: optional leading combinator, one `simple_selector_sequence`,
    /// then zero or more `(combinator, simple_selector_sequence)` pairs.
    /// Returns the selector's own source text trimmed, or
    /// `NoMatch` (scanner untouched) if not even a leading atom is present.
    fn try_selector(&mut self) -> PResult<String> {
        let bookmark = self.scanner.bookmark();
        self.scanner.push_capture();
        let matched = self.selector_body();
        let raw = self.scanner.pop_capture();
        match matched {
            Ok(true) => Ok(Alt::Matched(raw.trim().to_string())),
            Ok(false) => {
                self.scanner.restore(bookmark);
                Ok(Alt::NoMatch)
            }
            Err(e) => Err(e),
        }
    }

    /// The body of `try_selector`, without the bookmark/capture plumbing.
    /// Lookahead between atoms is done by inspecting `rest()` directly
    /// rather than a nested bookmark/restore, since a capture buffer is live
    /// for the whole call and the grammar's sole sanctioned backtracking
    /// point is `declaration_or_ruleset`. Nothing in here may
    /// straddle it with a second one.
    fn selector_body(&mut self) -> Result<bool, Error> {
        if matches!(self.scanner.peek_char(), Some('+') | Some('>') | Some('~')) {
            self.scanner.bump();
            self.skip_ws_inline();
        }
        if !self.simple_selector_sequence()? {
            return Ok(false);
        }
        loop {
            let rest = self.scanner.rest();
            let ws_len = rest.len() - rest.trim_start_matches([' ', '\t', '\r', '\n', '\x0c']).len();
            let after_ws = &rest[ws_len..];
            let Some(next) = after_ws.chars().next() else {
                break;
            };
            if matches!(next, '+' | '>' | '~') {
                self.skip_ws_inline();
                self.scanner.bump();
                self.skip_ws_inline();
                if !self.simple_selector_sequence()? {
                    return Err(self.error("simple selector"));
                }
                continue;
            }
            if ws_len > 0 && starts_selector_atom(after_ws) {
                self.skip_ws_inline();
                if self.simple_selector_sequence()? {
                    continue;
                }
            }
            break;
        }
        Ok(true)
    }

    /// One-or-more selector atoms with no separating whitespace.
    /// `false` (no state change) if the
    /// very first atom fails to match.
    fn simple_selector_sequence(&mut self) -> Result<bool, Error> {
        if !self.selector_atom()? {
            return Ok(false);
        }
        while self.selector_atom()? {}
        Ok(true)
    }

    /// One atom: element name, `#id`, `.class`, `[attr]`, `:not(...)`,
    /// pseudo, `&`, `#{...}` interpolation, or `*`.
    fn selector_atom(&mut self) -> Result<bool, Error> {
        match self.scanner.peek_char() {
            Some('.') => {
                self.scanner.bump();
                self.scanner.set_expected("class name".to_string());
                self.scanner
                    .scan(&patterns::IDENT)
                    .ok_or_else(|| self.error("class name"))?;
                Ok(true)
            }
            Some('&') | Some('*') => {
                self.scanner.bump();
                Ok(true)
            }
            Some(':') => {
                self.pseudo_or_negation()?;
                Ok(true)
            }
            Some('[') => {
                self.attrib()?;
                Ok(true)
            }
            Some('#') if self.scanner.rest().starts_with("#{") => {
                self.expr_interpolated()?;
                Ok(true)
            }
            Some('#') => {
                self.scanner
                    .scan(&patterns::HASH)
                    .ok_or_else(|| self.error("id selector"))?;
                Ok(true)
            }
            _ => Ok(self.scanner.scan(&patterns::IDENT).is_some()),
        }
    }

    /// `negation` (`:not(` + one restricted atom + `)`) or `pseudo` (one or
    /// two colons, then a functional pseudo or a plain identifier).
    fn pseudo_or_negation(&mut self) -> Result<(), Error> {
        if self.scanner.rest().starts_with(":not(") {
            self.scanner
                .scan(&patterns::NOT)
                .expect("starts_with(\":not(\") checked above");
            if !self.negation_inner_atom()? {
                return Err(self.error("selector inside :not(...)"));
            }
            return self.expect_char(')', "\")\"");
        }

        self.expect_char(':', "\":\"")?;
        if self.scanner.peek_char() == Some(':') {
            self.scanner.bump();
        }
        if self.scanner.peek(&patterns::FUNCTION) {
            self.scanner.scan(&patterns::FUNCTION);
            self.skip_ws_inline();
            while self.scanner.peek_char() != Some(')') {
                if !self.pseudo_function_term()? {
                    break;
                }
                self.skip_ws_inline();
            }
            self.expect_char(')', "\")\"")?;
        } else {
            self.scanner.set_expected("pseudo-class name".to_string());
            self.scanner
                .scan(&patterns::IDENT)
                .ok_or_else(|| self.error("pseudo-class name"))?;
        }
        Ok(())
    }

    /// The restricted atom set `:not(...)` itself may contain: element
    /// name, `#id`, `.class`, attribute, or pseudo. No nested `:not(...)`,
    /// `&`, or bare `*`.
    fn negation_inner_atom(&mut self) -> Result<bool, Error> {
        match self.scanner.peek_char() {
            Some('.') | Some('#') | Some('[') => self.selector_atom(),
            Some(':') if !self.scanner.rest().starts_with(":not(") => self.selector_atom(),
            _ => Ok(self.scanner.scan(&patterns::IDENT).is_some()),
        }
    }

    /// One term of a functional pseudo's argument list: `+`, `-`, number,
    /// interpolated string, identifier, or interpolation.
    fn pseudo_function_term(&mut self) -> Result<bool, Error> {
        match self.scanner.peek_char() {
            Some('+') | Some('-') => {
                self.scanner.bump();
                Ok(true)
            }
            Some('"') => {
                self.scanner
                    .scan(&patterns::DOUBLE_STRING_OPEN)
                    .ok_or_else(|| self.error("closing quote"))?;
                Ok(true)
            }
            Some('\'') => {
                self.scanner
                    .scan(&patterns::SINGLE_STRING_OPEN)
                    .ok_or_else(|| self.error("closing quote"))?;
                Ok(true)
            }
            Some('#') if self.scanner.rest().starts_with("#{") => {
                self.expr_interpolated()?;
                Ok(true)
            }
            _ => Ok(self.scanner.scan(&patterns::NUMBER).is_some()
                || self.scanner.scan(&patterns::IDENT).is_some()),
        }
    }

    /// `[...]` attribute selector: namespace-qualified name, optional
    /// matcher and value.
    fn attrib(&mut self) -> Result<(), Error> {
        self.expect_char('[', "\"[\"")?;
        self.skip_ws_inline();
        self.attrib_name()?;
        self.skip_ws_inline();

        let matcher_patterns = [
            &patterns::INCLUDES,
            &patterns::DASHMATCH,
            &patterns::PREFIXMATCH,
            &patterns::SUFFIXMATCH,
            &patterns::SUBSTRINGMATCH,
        ];
        let mut has_matcher = matcher_patterns
            .iter()
            .any(|p| self.scanner.scan(p).is_some());
        if !has_matcher && self.scanner.peek_char() == Some('=') {
            self.scanner.bump();
            has_matcher = true;
        }
        if has_matcher {
            self.skip_ws_inline();
            self.attrib_value()?;
            self.skip_ws_inline();
        }
        self.expect_char(']', "\"]\"")
    }

    /// Attribute name, with namespace forms `E|E`, `E|`, `*|E`, `|E`, `E`.
    fn attrib_name(&mut self) -> Result<(), Error> {
        if self.scanner.peek_char() == Some('|') {
            self.scanner.bump();
            self.scanner.set_expected("attribute name".to_string());
            self.scanner
                .scan(&patterns::IDENT)
                .ok_or_else(|| self.error("attribute name"))?;
            return Ok(());
        }

        let consumed_prefix = if self.scanner.peek_char() == Some('*') {
            self.scanner.bump();
            true
        } else {
            self.scanner.scan(&patterns::IDENT).is_some()
        };
        if !consumed_prefix {
            self.scanner.set_expected("attribute name".to_string());
            return Err(self.error("attribute name"));
        }
        // `E|` (bare trailing bar) and `E|E` (namespaced) both allow an
        // optional local name after the bar; the `|=` matcher is reserved.
        if self.scanner.peek_char() == Some('|') && !self.scanner.rest().starts_with("|=") {
            self.scanner.bump();
            self.scanner.scan(&patterns::IDENT);
        }
        Ok(())
    }

    fn attrib_value(&mut self) -> Result<(), Error> {
        match self.scanner.peek_char() {
            Some('"') => {
                self.scanner
                    .scan(&patterns::DOUBLE_STRING_OPEN)
                    .ok_or_else(|| self.error("closing quote"))?;
            }
            Some('\'') => {
                self.scanner
                    .scan(&patterns::SINGLE_STRING_OPEN)
                    .ok_or_else(|| self.error("closing quote"))?;
            }
            Some('#') if self.scanner.rest().starts_with("#{") => {
                self.expr_interpolated()?;
            }
            _ => {
                self.scanner.set_expected("attribute value".to_string());
                self.scanner
                    .scan(&patterns::IDENT)
                    .ok_or_else(|| self.error("attribute value"))?;
            }
        }
        Ok(())
    }
}

/// Does `text` (already known to be the remainder after skipping
/// whitespace) start with something `selector_atom` would accept? Used only
/// to decide whether trailing whitespace is a descendant combinator versus
/// the boundary before `{`, `,`, `;`, or EOF. A cheap first-character check
/// mirroring `selector_atom`'s own dispatch, not a full re-parse.
fn starts_selector_atom(text: &str) -> bool {
    match text.chars().next() {
        Some('.') | Some('&') | Some('*') | Some(':') | Some('[') => true,
        Some('#') => true,
        Some(_) => patterns::IDENT
            .regex
            .find(text)
            .map(|m| m.start() == 0)
            .unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Parser;
    use stylish_expr::DefaultExpressionParser;

    fn selector_of(source: &str) -> Vec<String> {
        let mut parser =
            Parser::with_expression_parser(source, "<test>", DefaultExpressionParser::new());
        match parser.try_ruleset().unwrap() {
            Alt::Matched(Node::Rule(rule)) => rule.selector,
            Alt::Matched(other) => panic!("expected Rule, got {other:?}"),
            Alt::NoMatch => panic!("expected a match for {source:?}"),
        }
    }

    #[test]
    fn plain_type_selector() {
        assert_eq!(selector_of("a { }"), vec!["a".to_string()]);
    }

    #[test]
    fn comma_separated_list() {
        assert_eq!(
            selector_of("a, b.class { }"),
            vec!["a".to_string(), "b.class".to_string()]
        );
    }

    #[test]
    fn pseudo_class_attaches_without_whitespace() {
        assert_eq!(selector_of("a:hover { }"), vec!["a:hover".to_string()]);
    }

    #[test]
    fn descendant_combinator_is_whitespace() {
        assert_eq!(selector_of("div p { }"), vec!["div p".to_string()]);
    }

    #[test]
    fn explicit_combinator_with_no_surrounding_space() {
        assert_eq!(selector_of("div>p { }"), vec!["div>p".to_string()]);
    }

    #[test]
    fn attribute_selector_with_matcher_and_value() {
        assert_eq!(
            selector_of(r#"a[href^="https"] { }"#),
            vec![r#"a[href^="https"]"#.to_string()]
        );
    }

    #[test]
    fn negation_with_inner_class() {
        assert_eq!(
            selector_of("li:not(.first) { }"),
            vec!["li:not(.first)".to_string()]
        );
    }

    #[test]
    fn functional_pseudo_with_numeric_argument() {
        assert_eq!(
            selector_of("li:nth-child(2) { }"),
            vec!["li:nth-child(2)".to_string()]
        );
    }

    #[test]
    fn ampersand_parent_reference() {
        assert_eq!(selector_of("&.active { }"), vec!["&.active".to_string()]);
    }

    #[test]
    fn non_selector_input_is_no_match() {
        let mut parser =
            Parser::with_expression_parser("; rest", "<test>", DefaultExpressionParser::new());
        assert!(matches!(parser.try_ruleset().unwrap(), Alt::NoMatch));
    }
}
