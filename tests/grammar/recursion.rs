//! Integration tests for recursive rules

use strand_foundation::ErrorKind;
use strand_grammar::{GrammarBuilder, Node};

#[test]
fn placeholder_is_usable_before_binding() {
    let mut g = GrammarBuilder::new();
    let value = g.indirect();
    let l = g.literal(b'l');
    let e = g.literal(b'e');
    let items = g.many(value);
    let list = g.sequence([l, items, e]);
    let digit = g.range(b'0', b'9');
    let any = g.choice([digit, list]);
    g.bind_indirect(value, any).unwrap();

    let grammar = g.build(value).unwrap();
    assert_eq!(grammar.resolve(value), any);
    assert!(matches!(grammar.node(value).unwrap(), Node::Indirect(Some(target)) if *target == any));
}

#[test]
fn unbound_placeholder_fails_build() {
    let mut g = GrammarBuilder::new();
    let value = g.indirect();
    let many = g.many(value);
    let error = g.build(many).unwrap_err();
    assert_eq!(error.kind, ErrorKind::UnboundIndirection { node: value.index() });
    assert!(error.is_fatal());
}

#[test]
fn rebinding_is_rejected() {
    let mut g = GrammarBuilder::new();
    let value = g.indirect();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    g.bind_indirect(value, a).unwrap();

    let error = g.bind_indirect(value, b).unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::IndirectionAlreadyBound { node: value.index() }
    );

    let grammar = g.build(value).unwrap();
    assert_eq!(grammar.resolve(value), a);
}

#[test]
fn binding_a_non_placeholder_is_rejected() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    let error = g.bind_indirect(a, b).unwrap_err();
    assert!(matches!(error.kind, ErrorKind::NotAnIndirection { .. }));
}

#[test]
fn placeholder_cycle_without_definition_rejected() {
    let mut g = GrammarBuilder::new();
    let first = g.indirect();
    let second = g.indirect();
    g.bind_indirect(first, second).unwrap();
    g.bind_indirect(second, first).unwrap();

    let error = g.build(first).unwrap_err();
    assert!(matches!(error.kind, ErrorKind::InvalidGrammar(_)));
}

#[test]
fn mutual_recursion_builds() {
    let mut g = GrammarBuilder::new();
    let even = g.indirect();
    let odd = g.indirect();

    let a = g.literal(b'a');
    let end = g.end();
    let after_even = g.sequence([a, odd]);
    let even_def = g.choice([end, after_even]);
    let odd_def = g.sequence([a, even]);
    g.bind_indirect(even, even_def).unwrap();
    g.bind_indirect(odd, odd_def).unwrap();

    let grammar = g.build(even).unwrap();
    assert_eq!(grammar.resolve(odd), odd_def);
    assert!(grammar.reachable().contains(&odd_def));
}
