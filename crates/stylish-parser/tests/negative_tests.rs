//! Negative integration tests for the Stylish grammar engine.
//!
//! Each case feeds malformed input through the public `parse` entry and
//! asserts on the exact message shape the error reporter produces, not just
//! "is an error", since the message text (the 15-character context windows
//! and the expected-construct label) is itself an observable contract.

use pretty_assertions::assert_eq;
use stylish_parser::parse;

#[test]
fn missing_value_reports_expected_expression() {
    let err = parse("a { color: ; }").unwrap_err();
    assert!(
        err.message().starts_with("Invalid CSS after"),
        "got: {}",
        err.message()
    );
    assert_eq!(err.line, 1);
}

#[test]
fn unterminated_block_comment_is_rejected() {
    let err = parse("a { color: red; } /* never closes").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn unclosed_brace_reports_expected_closing_brace() {
    let err = parse("a { color: red;").unwrap_err();
    assert!(err.message().contains("\"}\""), "got: {}", err.message());
}

#[test]
fn for_directive_without_to_or_through_is_rejected() {
    let err = parse("@for !i from 1 { }").unwrap_err();
    assert!(
        err.message().contains("\"to\" or \"through\""),
        "got: {}",
        err.message()
    );
}

#[test]
fn variable_without_equals_is_rejected() {
    let err = parse("!x 3px;").unwrap_err();
    assert!(err.message().contains("\"=\""), "got: {}", err.message());
}

#[test]
fn no_space_before_nested_property_block_is_rejected() {
    let err = parse("p { a:b { c: d; } }").unwrap_err();
    assert!(
        err.message()
            .contains("a space is required between a property and its definition"),
        "got: {}",
        err.message()
    );
}

#[test]
fn unterminated_interpolation_is_rejected() {
    let err = parse("a { color: #{$x; }").unwrap_err();
    assert!(err.message().contains("}"), "got: {}", err.message());
}

#[test]
fn garbage_at_top_level_reports_selector_or_at_rule() {
    let err = parse(";;;").unwrap_err();
    assert!(
        err.message().contains("selector") || err.message().contains("declaration"),
        "got: {}",
        err.message()
    );
}

#[test]
fn error_context_before_is_truncated_to_fifteen_chars() {
    let source = format!("{} {{ : ; }}", "a".repeat(40));
    let err = parse(&source).unwrap_err();
    // The context-before window never exceeds 15 characters plus the "..."
    // truncation marker.
    let quoted = err
        .message()
        .split("after \"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("message carries a quoted context-before window");
    assert!(quoted.len() <= 18, "window too long: {quoted:?}");
}
