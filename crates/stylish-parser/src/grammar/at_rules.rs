use stylish_ast::{Debug, Directive, For, If, Import, MixinDefinition, MixinInvocation, Node, While};
use stylish_expr::ExpressionParser;
use stylish_lexer::patterns;

use super::Parser;
use crate::error::Error;

const SPECIALIZED: &[&str] = &["mixin", "include", "debug", "for", "while", "if", "import"];

impl<'a, P: ExpressionParser> Parser<'a, P> {
    /// `@name ...`. Dispatches to one of the seven specialized
    /// productions by name (after normalizing `-` to `_`), or falls back to
    /// a generic directive that captures its raw argument text.
    pub(crate) fn at_rule(&mut self) -> Result<Node, Error> {
        let line = self.scanner.line();
        self.expect_char('@', "\"@\"")?;
        let name = self.expect_ident("at-rule name")?;
        let normalized = name.replace('-', "_");

        if SPECIALIZED.contains(&normalized.as_str()) {
            match normalized.as_str() {
                "mixin" => self.mixin_definition(line),
                "include" => self.mixin_invocation(line),
                "debug" => self.debug_directive(line),
                "for" => self.for_directive(line),
                "while" => self.while_directive(line),
                "if" => self.if_directive(line),
                "import" => self.import_directive(line),
                _ => unreachable!("SPECIALIZED set and this match must stay in sync"),
            }
        } else {
            self.generic_directive(line, &name)
        }
    }

    fn mixin_definition(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        let name = self.expect_ident("mixin name")?;
        let params = self
            .expr_parser
            .parse_mixin_definition_arglist(&mut self.scanner)
            .map_err(|e| self.error(e.label()))?;
        self.skip_ws_inline();
        let children = self.braced_block()?;
        Ok(Node::MixinDefinition(MixinDefinition {
            line,
            name,
            params,
            children,
        }))
    }

    fn mixin_invocation(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        let name = self.expect_ident("mixin name")?;
        let args = self
            .expr_parser
            .parse_mixin_include_arglist(&mut self.scanner)
            .map_err(|e| self.error(e.label()))?;
        Ok(Node::MixinInvocation(MixinInvocation { line, name, args }))
    }

    fn debug_directive(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        let expr = self.expr()?;
        Ok(Node::Debug(Debug { line, expr }))
    }

    /// `@for !i from <expr> (to|through) <expr> { ... }`.
    fn for_directive(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        self.expect_char('!', "\"!\"")?;
        let variable = self.expect_ident("loop variable")?;
        self.skip_ws_inline();
        self.expect_word("from")?;
        self.skip_ws_inline();
        let from = self.expr_until(&["to", "through"])?;
        self.skip_ws_inline();
        let inclusive = if self.consume_word("through") {
            true
        } else if self.consume_word("to") {
            false
        } else {
            return Err(self.error("\"to\" or \"through\""));
        };
        self.skip_ws_inline();
        let to = self.expr()?;
        self.skip_ws_inline();
        let children = self.braced_block()?;
        Ok(Node::For(For {
            line,
            variable,
            from,
            to,
            inclusive,
            children,
        }))
    }

    fn while_directive(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        let condition = self.expr()?;
        self.skip_ws_inline();
        let children = self.braced_block()?;
        Ok(Node::While(While {
            line,
            condition,
            children,
        }))
    }

    fn if_directive(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        let condition = self.expr()?;
        self.skip_ws_inline();
        let children = self.braced_block()?;
        Ok(Node::If(If {
            line,
            condition,
            children,
        }))
    }

    /// `@import <string|uri> [, <media>]*`. A non-empty media list
    /// rewrites this into a generic `Directive` rather than an `Import`,
    /// because at that point it no longer describes a plain file import.
    fn import_directive(&mut self, line: usize) -> Result<Node, Error> {
        self.skip_ws_inline();
        let (raw_path, inner_path) = self.import_path()?;
        let (_, media_raw) = self.scanner.capture(|s| loop {
            if s.scan(&patterns::COMMENT).is_some() || s.scan(&patterns::SINGLE_LINE_COMMENT).is_some()
            {
                continue;
            }
            match s.peek_char() {
                None | Some(';') | Some('{') => break,
                Some(_) => {
                    s.bump();
                }
            }
        });
        let media = media_raw.trim();
        if media.is_empty() {
            Ok(Node::Import(Import {
                line,
                path: inner_path,
            }))
        } else {
            Ok(Node::Directive(Directive {
                line,
                text: format!("@import {raw_path} {media}"),
                children: None,
            }))
        }
    }

    /// Returns `(raw matched text including quotes/url(), unquoted inner path)`.
    fn import_path(&mut self) -> Result<(String, String), Error> {
        match self.scanner.peek_char() {
            Some('"') => {
                self.scanner.set_expected("quoted import path".to_string());
                let raw = self
                    .scanner
                    .scan(&patterns::DOUBLE_STRING_OPEN)
                    .ok_or_else(|| self.error("quoted import path"))?
                    .to_string();
                let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("").to_string();
                Ok((raw, inner))
            }
            Some('\'') => {
                self.scanner.set_expected("quoted import path".to_string());
                let raw = self
                    .scanner
                    .scan(&patterns::SINGLE_STRING_OPEN)
                    .ok_or_else(|| self.error("quoted import path"))?
                    .to_string();
                let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("").to_string();
                Ok((raw, inner))
            }
            _ => {
                self.scanner.set_expected("import path".to_string());
                let raw = self
                    .scanner
                    .scan(&patterns::URI)
                    .ok_or_else(|| self.error("import path"))?
                    .to_string();
                let inner = raw
                    .trim_start_matches("url(")
                    .trim_end_matches(')')
                    .trim()
                    .trim_matches(['"', '\''])
                    .to_string();
                Ok((raw, inner))
            }
        }
    }

    /// Any `@name` outside the specialized set: capture the raw
    /// argument text, build `"@<name> <args>"` trimmed, and optionally
    /// consume a brace block (e.g. `@media screen { ... }`).
    fn generic_directive(&mut self, line: usize, name: &str) -> Result<Node, Error> {
        let (_, args) = self.scanner.capture(|s| loop {
            if s.scan(&patterns::COMMENT).is_some() || s.scan(&patterns::SINGLE_LINE_COMMENT).is_some()
            {
                continue;
            }
            match s.peek_char() {
                None | Some(';') | Some('{') | Some('}') => break,
                Some(_) => {
                    s.bump();
                }
            }
        });
        let text = format!("@{name} {}", args.trim()).trim().to_string();
        self.skip_ws_inline();
        let children = if self.scanner.peek_char() == Some('{') {
            Some(self.braced_block()?)
        } else {
            None
        };
        Ok(Node::Directive(Directive {
            line,
            text,
            children,
        }))
    }
}
