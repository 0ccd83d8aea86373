use stylish_ast::{Declaration, Node};
use stylish_expr::ExpressionParser;
use stylish_lexer::patterns;
use tracing::trace;

use super::{Parser, PResult};
use crate::alt::Alt;
use crate::error::Error;

impl<'a, P: ExpressionParser> Parser<'a, P> {
    /// The single backtracking point. Tries `declaration` first;
    /// on anything short of full success, restores the bookmark and tries
    /// `ruleset`. If both fail, the error that wins depends on whether the
    /// declaration attempt had committed to looking property-like
    /// (`use_property_exception`) by the time it failed.
    pub(crate) fn declaration_or_ruleset(&mut self) -> Result<Node, Error> {
        let bookmark = self.scanner.bookmark();
        let saved_flag = self.use_property_exception;
        self.use_property_exception = false;

        let outcome = match self.try_declaration() {
            Ok(Alt::Matched(node)) => Ok(node),
            Ok(Alt::NoMatch) => {
                trace!("declaration did not match, trying ruleset");
                self.scanner.restore(bookmark);
                match self.try_ruleset()? {
                    Alt::Matched(node) => Ok(node),
                    Alt::NoMatch => Err(self.error("selector or declaration")),
                }
            }
            Err(candidate_a) => {
                let exception = self.use_property_exception;
                trace!(
                    use_property_exception = exception,
                    "declaration committed then failed, trying ruleset"
                );
                self.scanner.restore(bookmark);
                match self.try_ruleset() {
                    Ok(Alt::Matched(node)) => Ok(node),
                    Ok(Alt::NoMatch) => Err(if exception {
                        candidate_a
                    } else {
                        self.error("selector or declaration")
                    }),
                    Err(ruleset_err) => Err(if exception { candidate_a } else { ruleset_err }),
                }
            }
        };

        self.use_property_exception = saved_flag;
        outcome
    }

    /// `declaration`: `[*]property(=expr | : [ws] [expr] [!important]) [{ children }]`.
    /// Returns `NoMatch` only when the very first token doesn't
    /// look like a property at all; once a property name and `:`/`=` are
    /// seen, any further failure is a committed `Err`.
    fn try_declaration(&mut self) -> PResult<Node> {
        let line = self.scanner.line();
        let mut exception = self.scanner.peek_char() == Some('*');
        if exception {
            self.scanner.bump();
        }

        let name = match self.property_name_tokens()? {
            Some(name) => name,
            None => {
                self.use_property_exception = exception;
                return Ok(Alt::NoMatch);
            }
        };

        if self.scanner.peek_char() == Some('=') {
            self.scanner.bump();
            self.skip_ws_inline();
            self.use_property_exception = true;
            let value = self.expr()?;
            return self.finish_declaration(line, name, vec![value.raw.trim().to_string()], None, false);
        }

        if self.scanner.peek_char() != Some(':') {
            self.use_property_exception = exception;
            return Ok(Alt::NoMatch);
        }
        self.scanner.bump();

        let ws_after_colon = self.scanner.peek(&patterns::S);
        if ws_after_colon {
            exception = true;
        }
        self.skip_ws_inline();

        let mut value_tokens = Vec::new();
        if self.scanner.peek_char() != Some('{') {
            let starts_like_ident = matches!(
                self.scanner.peek_char(),
                Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '#' || c == '"' || c == '\''
            );
            if !starts_like_ident {
                exception = true;
            }
            self.use_property_exception = exception;
            let value = self.expr()?;
            value_tokens.push(value.raw.trim().to_string());
        }

        self.skip_ws_inline();
        self.scanner.scan(&patterns::IMPORTANT);
        self.skip_ws_inline();

        let require_block = self.scanner.peek_char() == Some('{');
        if require_block && !value_tokens.is_empty() && !ws_after_colon {
            // "a:b { ... }" is ambiguous with a pseudo-selector ruleset, but
            // unambiguously a mistake if the author meant nested properties.
            // Raised unconditionally: this makes `try_declaration`
            // commit to an `Err` here instead of quietly accepting `{ ... }`
            // as the declaration's own nested children, so
            // `declaration_or_ruleset` always gets a chance to retry
            // `try_ruleset`, which is what resolves input like
            // `a:hover { ... }` to a `Rule` instead of a bogus `Declaration`
            // whose value is `hover`. If the ruleset retry *also* fails,
            // this message (not a generic one) surfaces, since it flagged
            // itself as property-like below.
            exception = true;
            self.use_property_exception = exception;
            self.nested_property_spacing_error = true;
            return Err(self.error(
                "a space is required between a property and its definition when it has other properties nested beneath it",
            ));
        }

        self.use_property_exception = exception;
        let children = if require_block {
            Some(self.braced_block()?)
        } else {
            None
        };
        self.finish_declaration(line, name, value_tokens, children, require_block)
    }

    fn finish_declaration(
        &mut self,
        line: usize,
        name: Vec<String>,
        value: Vec<String>,
        children: Option<Vec<Node>>,
        require_block: bool,
    ) -> PResult<Node> {
        if !require_block {
            match self.scanner.peek_char() {
                Some(';') | Some('}') | None => {}
                _ => return Err(self.error("\";\"")),
            }
        }
        Ok(Alt::Matched(Node::Declaration(Declaration {
            line,
            name,
            value,
            children,
            require_block,
        })))
    }

    /// `property`: identifier(s) and `#{...}` interpolations, alternating.
    /// `None` when the current position isn't even the start of
    /// an identifier or interpolation.
    fn property_name_tokens(&mut self) -> Result<Option<Vec<String>>, Error> {
        let mut tokens = Vec::new();
        loop {
            if let Some(ident) = self.scanner.scan(&patterns::IDENT) {
                tokens.push(ident.to_string());
            } else if self.scanner.rest().starts_with("#{") {
                let expr = self.expr_interpolated()?;
                tokens.push(expr.raw);
            } else {
                break;
            }
        }
        if tokens.is_empty() {
            Ok(None)
        } else {
            Ok(Some(tokens))
        }
    }
}
