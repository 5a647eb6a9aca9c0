//! Integration tests for grammar construction and validation

use strand_foundation::ErrorKind;
use strand_grammar::common::{decimal_sint, decimal_uint};
use strand_grammar::{Element, GrammarBuilder, Node};

// =============================================================================
// Building
// =============================================================================

#[test]
fn grammar_is_frozen_snapshot_of_builder() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.range(b'0', b'9');
    let seq = g.sequence([a, b]);
    let grammar = g.build(seq).unwrap();

    assert_eq!(grammar.len(), 3);
    assert_eq!(grammar.root(), seq);
    assert!(matches!(grammar.node(a).unwrap(), Node::Literal(b'a')));
    assert!(matches!(grammar.node(seq).unwrap(), Node::Sequence(members) if members == &vec![a, b]));
}

#[test]
fn with_root_shares_nodes() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let many = g.many(a);
    let grammar = g.build(many).unwrap();

    let inner = grammar.with_root(a).unwrap();
    assert_eq!(inner.root(), a);
    assert_eq!(inner.len(), grammar.len());
}

#[test]
fn reachable_ignores_unused_nodes() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let _unused = g.literal(b'z');
    let opt = g.optional(a);
    let grammar = g.build(opt).unwrap();

    let reachable = grammar.reachable();
    assert_eq!(reachable.len(), 2);
    assert!(reachable.contains(&a));
    assert!(reachable.contains(&opt));
}

#[test]
fn describe_prefers_names() {
    let mut g = GrammarBuilder::new();
    let e = g.literal(b'e');
    let digit = g.range(b'0', b'9');
    let named = g.name(digit, "digit");
    let keyword = g.bytes(b"null");
    let seq = g.sequence([named, e, keyword]);
    let grammar = g.build(seq).unwrap();

    assert_eq!(grammar.describe(e), "'e'");
    assert_eq!(grammar.describe(named), "digit");
    assert_eq!(grammar.describe(keyword), "\"null\"");
    assert_eq!(grammar.name_of(named), Some("digit"));
    assert_eq!(grammar.name_of(e), None);
}

#[test]
fn common_integers_are_named() {
    let mut g = GrammarBuilder::new();
    let uint = decimal_uint(&mut g);
    let sint = decimal_sint(&mut g);
    let both = g.sequence([uint, sint]);
    let grammar = g.build(both).unwrap();

    assert_eq!(grammar.describe(uint), "unsigned decimal");
    assert_eq!(grammar.describe(sint), "signed decimal");
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn empty_range_rejected() {
    let mut g = GrammarBuilder::new();
    let bad = g.range(b'z', b'a');
    let error = g.build(bad).unwrap_err();
    assert!(matches!(error.kind, ErrorKind::InvalidGrammar(_)));
}

#[test]
fn odd_integer_width_rejected() {
    let mut g = GrammarBuilder::new();
    let bad = g.unsigned(3);
    assert!(g.build(bad).is_err());
}

#[test]
fn exact_repetition_builds() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let exact = g.repeat_n(a, 3);
    assert!(g.build(exact).is_ok());
}

#[test]
fn foreign_root_rejected() {
    let mut other = GrammarBuilder::new();
    let foreign = other.literal(b'x');

    let mut g = GrammarBuilder::new();
    g.literal(b'a');
    let error = g.build(foreign).unwrap_err();
    assert!(matches!(error.kind, ErrorKind::ForeignNode { .. }));
}

#[test]
fn foreign_child_rejected() {
    let mut other = GrammarBuilder::new();
    let foreign = other.literal(b'x');

    let mut g = GrammarBuilder::new();
    let seq = g.sequence([foreign]);
    let error = g.build(seq).unwrap_err();
    assert!(matches!(error.kind, ErrorKind::ForeignNode { .. }));
}

#[test]
fn length_value_accepts_node_elements() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let pair = g.any_byte();
    let lv = g.length_value(count, Element::Node(pair));
    let grammar = g.build(lv).unwrap();
    assert_eq!(grammar.node(lv).unwrap().children(), vec![count, pair]);
}
