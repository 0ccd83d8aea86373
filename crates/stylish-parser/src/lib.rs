//! Recursive-descent grammar engine and error reporter for the Stylish
//! stylesheet dialect.
//!
//! The only public entry points are [`parse`] and [`parse_named`]; the
//! [`Parser`] type and its `grammar` module are the engine underneath, kept
//! `pub(crate)` apart from the generic struct itself so that an embedder
//! could in principle supply their own [`ExpressionParser`], though the
//! workspace only ever instantiates it with `DefaultExpressionParser`.

mod alt;
mod error;
mod grammar;

use stylish_ast::Root;
use stylish_expr::DefaultExpressionParser;

pub use error::Error;
pub use grammar::Parser;
pub use stylish_expr::{ExprError, ExpressionParser};

/// Parse `source` into a [`Root`], using `"<stylesheet>"` as the
/// diagnostic source name.
pub fn parse(source: &str) -> Result<Root, Error> {
    parse_named(source, "<stylesheet>")
}

/// Parse `source` into a [`Root`], attributing errors to `file` (threaded
/// into the [`Error`]'s `miette::Diagnostic` source, for embedders that
/// render several files' worth of diagnostics together).
pub fn parse_named(source: &str, file: &str) -> Result<Root, Error> {
    Parser::with_expression_parser(source, file, DefaultExpressionParser::new()).parse_stylesheet()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stylish_ast::Node;

    #[test]
    fn simple_rule_with_declaration() {
        let root = parse("a { color: red; }").unwrap();
        assert_eq!(root.children.len(), 1);
        match &root.children[0] {
            Node::Rule(rule) => {
                assert_eq!(rule.selector, vec!["a".to_string()]);
                assert_eq!(rule.children.len(), 1);
                match &rule.children[0] {
                    Node::Declaration(decl) => {
                        assert_eq!(decl.name, vec!["color".to_string()]);
                        assert_eq!(decl.value, vec!["red".to_string()]);
                    }
                    other => panic!("expected declaration, got {other:?}"),
                }
            }
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn pseudo_selector_resolves_to_ruleset_not_declaration() {
        let root = parse("a:hover { color: red }").unwrap();
        match &root.children[0] {
            Node::Rule(rule) => assert_eq!(rule.selector, vec!["a:hover".to_string()]),
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn position_reaches_end_of_source_on_success() {
        let source = "a { color: red; }\nb { color: blue; }";
        parse(source).unwrap();
    }

    #[test]
    fn malformed_input_reports_line_and_message_shape() {
        let err = parse("a { color: ; }").unwrap_err();
        assert!(err.message().starts_with("Invalid CSS after"));
        assert_eq!(err.line, 1);
    }
}
