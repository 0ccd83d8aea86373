//! The raw token lists attached to selectors, declarations, and directive
//! arguments reproduce the corresponding source text (modulo dropped
//! comments and normalized whitespace).

use pretty_assertions::assert_eq;
use stylish_ast::Node;
use stylish_parser::parse;

fn parse_ok(source: &str) -> stylish_ast::Root {
    parse(source).unwrap_or_else(|e| panic!("parse failed for {source:?}: {}", e.message()))
}

#[test]
fn selector_text_reproduces_source_between_compound_atoms() {
    let root = parse_ok("div.card > p:first-child, a[href^=\"https\"] { color: red; }");
    match &root.children[0] {
        Node::Rule(rule) => {
            assert_eq!(
                rule.selector,
                vec![
                    "div.card > p:first-child".to_string(),
                    "a[href^=\"https\"]".to_string(),
                ]
            );
        }
        other => panic!("expected Rule, got {other:?}"),
    }
}

#[test]
fn declaration_name_and_value_reproduce_source_tokens() {
    let root = parse_ok("a { margin: 0 auto !important; }");
    match &root.children[0] {
        Node::Rule(rule) => match &rule.children[0] {
            Node::Declaration(decl) => {
                assert_eq!(decl.name, vec!["margin".to_string()]);
                assert_eq!(decl.value, vec!["0 auto".to_string()]);
            }
            other => panic!("expected Declaration, got {other:?}"),
        },
        other => panic!("expected Rule, got {other:?}"),
    }
}

#[test]
fn interpolated_declaration_value_is_not_mistaken_for_a_nested_block() {
    let root = parse_ok("a { border: #{$width} solid; color: blue; }");
    match &root.children[0] {
        Node::Rule(rule) => {
            assert_eq!(rule.children.len(), 2);
            match &rule.children[0] {
                Node::Declaration(decl) => {
                    assert_eq!(decl.name, vec!["border".to_string()]);
                    assert_eq!(decl.value, vec!["#{$width} solid".to_string()]);
                    assert!(decl.children.is_none());
                }
                other => panic!("expected Declaration, got {other:?}"),
            }
        }
        other => panic!("expected Rule, got {other:?}"),
    }
}

#[test]
fn interpolated_property_name_round_trips_as_a_single_token_run() {
    let root = parse_ok("a { #{$prop}-color: red; }");
    match &root.children[0] {
        Node::Rule(rule) => match &rule.children[0] {
            Node::Declaration(decl) => {
                assert_eq!(decl.name, vec!["#{$prop}".to_string(), "color".to_string()]);
            }
            other => panic!("expected Declaration, got {other:?}"),
        },
        other => panic!("expected Rule, got {other:?}"),
    }
}

#[test]
fn generic_directive_text_reproduces_trimmed_argument_source() {
    let root = parse_ok("@media   screen   and (min-width: 768px) { a { color: red; } }");
    match &root.children[0] {
        Node::Directive(d) => {
            assert_eq!(d.text, "@media screen   and (min-width: 768px)");
        }
        other => panic!("expected Directive, got {other:?}"),
    }
}

#[test]
fn generic_directive_without_block_still_captures_argument_text() {
    let root = parse_ok("@charset \"UTF-8\";");
    match &root.children[0] {
        Node::Directive(d) => {
            assert_eq!(d.text, "@charset \"UTF-8\"");
            assert!(d.children.is_none());
        }
        other => panic!("expected Directive, got {other:?}"),
    }
}

#[test]
fn selector_whitespace_between_combinators_is_preserved_as_single_text_run() {
    let root = parse_ok("ul   >   li { color: red; }");
    match &root.children[0] {
        Node::Rule(rule) => assert_eq!(rule.selector, vec!["ul   >   li".to_string()]),
        other => panic!("expected Rule, got {other:?}"),
    }
}

#[test]
fn ampersand_nested_selector_round_trips() {
    let root = parse_ok("a { &:hover { color: red; } }");
    match &root.children[0] {
        Node::Rule(outer) => match &outer.children[0] {
            Node::Rule(inner) => assert_eq!(inner.selector, vec!["&:hover".to_string()]),
            other => panic!("expected nested Rule, got {other:?}"),
        },
        other => panic!("expected Rule, got {other:?}"),
    }
}
