mod at_rules;
mod declarations;
mod selectors;
mod variables;

use stylish_ast::{Comment, Node, Root};
use stylish_expr::ExpressionParser;
use stylish_lexer::{patterns, Scanner};
use tracing::{debug, warn};

use crate::alt::Alt;
use crate::error::{self, Error};

/// The recursive-descent grammar engine. Generic over the expression
/// sub-parser so the default implementation monomorphizes without a vtable.
pub struct Parser<'a, P: ExpressionParser> {
    pub(crate) scanner: Scanner<'a>,
    pub(crate) expr_parser: P,
    pub(crate) file: String,
    /// Set whenever the declaration alternative commits to a
    /// property-like interpretation; read by the backtracking
    /// point to choose which error to surface if both alternatives fail.
    pub(crate) use_property_exception: bool,
    /// Set by `try_declaration` immediately before returning the
    /// missing-space nested-property error, so `declaration_or_ruleset` can
    /// recognize that specific failure apart from any other committed
    /// error a declaration attempt might raise.
    pub(crate) nested_property_spacing_error: bool,
}

impl<'a, P: ExpressionParser> Parser<'a, P> {
    pub fn with_expression_parser(source: &'a str, file: impl Into<String>, expr_parser: P) -> Self {
        Self {
            scanner: Scanner::new(source),
            expr_parser,
            file: file.into(),
            use_property_exception: false,
            nested_property_spacing_error: false,
        }
    }

    pub fn parse_stylesheet(mut self) -> Result<Root, Error> {
        let children = match self.block_contents() {
            Ok(children) => children,
            Err(err) => {
                warn!(line = err.line, message = %err.message(), "stylesheet parse failed");
                return Err(err);
            }
        };
        if !self.scanner.is_eof() {
            let err = self.error("selector or at-rule");
            warn!(line = err.line, message = %err.message(), "stylesheet parse failed");
            return Err(err);
        }
        debug!(children = children.len(), "stylesheet parsed");
        Ok(Root::new(children))
    }

    /// Repeatedly attach children until the enclosing block (or the whole
    /// source, at the top level) is exhausted. Leading whitespace/comments
    /// before each child are consumed here; block comments become `Comment`
    /// children of `parent`.
    pub(crate) fn block_contents(&mut self) -> Result<Vec<Node>, Error> {
        let mut children = Vec::new();
        loop {
            children.extend(self.skip_trivia());
            if self.scanner.is_eof() || self.scanner.peek_char() == Some('}') {
                break;
            }
            let node = self.child()?;
            let owns_brace = Self::owns_trailing_brace(&node);
            children.push(node);
            children.extend(self.skip_trivia());
            match self.scanner.peek_char() {
                Some(';') => {
                    self.scanner.bump();
                }
                Some('}') | None => {}
                _ if owns_brace => {}
                _ => return Err(self.error("\";\"")),
            }
        }
        Ok(children)
    }

    fn child(&mut self) -> Result<Node, Error> {
        match self.scanner.peek_char() {
            Some('@') => self.at_rule(),
            Some('!') => self.variable(),
            _ => self.declaration_or_ruleset(),
        }
    }

    /// Children whose own grammar already consumed a closing `}` don't
    /// require a `;` separator before the next sibling.
    fn owns_trailing_brace(node: &Node) -> bool {
        matches!(
            node,
            Node::Rule(_) | Node::MixinDefinition(_) | Node::For(_) | Node::While(_) | Node::If(_)
        ) || matches!(node, Node::Directive(d) if d.children.is_some())
            || matches!(node, Node::Declaration(d) if d.children.is_some())
    }

    fn skip_trivia(&mut self) -> Vec<Node> {
        let mut comments = Vec::new();
        loop {
            if self.scanner.scan(&patterns::S).is_some() {
                continue;
            }
            if let Some(node) = self.try_block_comment() {
                comments.push(node);
                continue;
            }
            if self.scanner.scan(&patterns::SINGLE_LINE_COMMENT).is_some() {
                continue;
            }
            break;
        }
        comments
    }

    fn try_block_comment(&mut self) -> Option<Node> {
        let line = self.scanner.line();
        let text = self.scanner.scan(&patterns::COMMENT)?;
        Some(Node::Comment(Comment {
            line,
            text: normalize_comment_indentation(text),
        }))
    }

    /// Whitespace/comments that don't belong to any node (inside at-rule
    /// argument lists, selectors, etc). Unlike `skip_trivia`, these never
    /// become `Comment` children.
    pub(crate) fn skip_ws_inline(&mut self) {
        while self.scanner.scan(&patterns::S).is_some()
            || self.scanner.scan(&patterns::COMMENT).is_some()
            || self.scanner.scan(&patterns::SINGLE_LINE_COMMENT).is_some()
        {}
    }

    pub(crate) fn expect_char(&mut self, ch: char, label: &str) -> Result<(), Error> {
        if self.scanner.peek_char() == Some(ch) {
            self.scanner.bump();
            Ok(())
        } else {
            Err(self.error(label))
        }
    }

    pub(crate) fn braced_block(&mut self) -> Result<Vec<Node>, Error> {
        self.expect_char('{', "\"{\"")?;
        let children = self.block_contents()?;
        self.skip_trivia();
        self.expect_char('}', "\"}\"")?;
        Ok(children)
    }

    /// Consume one identifier word literally equal to `word` (e.g. `from`,
    /// `to`, `through`) if present, without consuming anything otherwise.
    pub(crate) fn consume_word(&mut self, word: &str) -> bool {
        let bookmark = self.scanner.bookmark();
        match self.scanner.scan(&patterns::IDENT) {
            Some(text) if text == word => true,
            _ => {
                self.scanner.restore(bookmark);
                false
            }
        }
    }

    /// Consume a fixed literal string (e.g. `||`) if it appears next,
    /// character by character through the scanner so line/capture-stack
    /// bookkeeping stays correct.
    pub(crate) fn consume_literal(&mut self, literal: &str) -> bool {
        if self.scanner.rest().starts_with(literal) {
            for _ in 0..literal.chars().count() {
                self.scanner.bump();
            }
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_word(&mut self, word: &str) -> Result<(), Error> {
        if self.consume_word(word) {
            Ok(())
        } else {
            Err(self.error(&format!("\"{word}\"")))
        }
    }

    pub(crate) fn expect_ident(&mut self, label: &str) -> Result<String, Error> {
        self.scanner.set_expected(label.to_string());
        self.scanner
            .scan(&patterns::IDENT)
            .map(str::to_string)
            .ok_or_else(|| self.error(label))
    }

    pub(crate) fn error(&self, expected: &str) -> Error {
        error::syntax_error(&self.scanner, &self.file, expected)
    }

    pub(crate) fn expr(&mut self) -> Result<stylish_ast::Expr, Error> {
        self.expr_parser
            .parse(&mut self.scanner)
            .map_err(|e| error::syntax_error(&self.scanner, &self.file, e.label()))
    }

    pub(crate) fn expr_until(&mut self, stop_words: &[&str]) -> Result<stylish_ast::Expr, Error> {
        self.expr_parser
            .parse_until(&mut self.scanner, stop_words)
            .map_err(|e| error::syntax_error(&self.scanner, &self.file, e.label()))
    }

    pub(crate) fn expr_interpolated(&mut self) -> Result<stylish_ast::Expr, Error> {
        self.expr_parser
            .parse_interpolated(&mut self.scanner)
            .map_err(|e| error::syntax_error(&self.scanner, &self.file, e.label()))
    }
}

/// Leading-indentation tabs are normalized to spaces; the rest of a
/// preserved block comment's text is left untouched.
fn normalize_comment_indentation(text: &str) -> String {
    text.lines()
        .map(|line| {
            let stripped = line.trim_start_matches('\t');
            let tabs = line.len() - stripped.len();
            format!("{}{}", " ".repeat(tabs), stripped)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) type PResult<T> = Result<Alt<T>, Error>;
