//! Integration tests for failure reporting

use std::thread;

use strand_engine::config::DEFAULT_MAX_DEPTH;
use strand_engine::{Parser, ParserConfig, parse};
use strand_foundation::ErrorKind;
use strand_grammar::{Grammar, GrammarBuilder};

/// `list := 'l' value* 'e'`, `value := digit | list`
fn nested_lists() -> Grammar {
    let mut g = GrammarBuilder::new();
    let value = g.indirect();
    let l = g.literal(b'l');
    let e = g.literal(b'e');
    let items = g.many(value);
    let list = g.sequence([l, items, e]);
    let digit = g.range(b'0', b'9');
    let any = g.choice([digit, list]);
    g.bind_indirect(value, any).unwrap();
    g.build(value).unwrap()
}

#[test]
fn three_levels_of_nesting() {
    let grammar = nested_lists();
    let parsed = Parser::new(&grammar).parse_outcome(b"lll7eee").unwrap();
    assert_eq!(parsed.consumed, 7);
    assert_eq!(parsed.token.to_string(), "['l' [['l' [['l' ['7'] 'e']] 'e']] 'e']");
}

fn nested(levels: usize) -> Vec<u8> {
    let mut input = vec![b'l'; levels];
    input.push(b'7');
    input.extend(std::iter::repeat_n(b'e', levels));
    input
}

#[test]
fn nesting_near_default_limit_fits_thread_stack() {
    // each level costs four invocations
    let levels = (DEFAULT_MAX_DEPTH - 16) / 4;
    let outcome = thread::spawn(move || {
        let grammar = nested_lists();
        Parser::new(&grammar).parse_outcome(&nested(levels))
    })
    .join()
    .unwrap();
    assert_eq!(outcome.unwrap().consumed, 2 * levels + 1);
}

#[test]
fn nesting_past_default_limit_is_fatal() {
    let levels = DEFAULT_MAX_DEPTH / 4 + 8;
    let error = thread::spawn(move || {
        let grammar = nested_lists();
        Parser::new(&grammar).parse(&nested(levels))
    })
    .join()
    .unwrap()
    .unwrap_err();
    assert!(error.is_fatal());
    assert_eq!(
        error.kind,
        ErrorKind::RecursionLimit {
            limit: DEFAULT_MAX_DEPTH
        }
    );
}

#[test]
fn unterminated_nested_list() {
    let grammar = nested_lists();
    let error = parse(&grammar, b"lll7ee").unwrap_err();
    assert_eq!(error.kind, ErrorKind::InputExhausted);
    assert_eq!(error.position, Some(6));
}

#[test]
fn mismatch_deep_inside_reports_its_position() {
    let grammar = nested_lists();
    let error = parse(&grammar, b"ll1x").unwrap_err();
    assert_eq!(error.position, Some(3));
    assert_eq!(
        error.kind,
        ErrorKind::LiteralMismatch {
            expected: b'e',
            found: b'x'
        }
    );
}

#[test]
fn all_alternatives_failed_at_start() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    let choice = g.choice([a, b]);
    let grammar = g.build(choice).unwrap();

    let error = parse(&grammar, b"c").unwrap_err();
    assert_eq!(error.kind, ErrorKind::AllAlternativesFailed);
    assert_eq!(error.position, Some(0));
}

#[test]
fn empty_input_is_exhausted() {
    let grammar = nested_lists();
    let error = parse(&grammar, b"").unwrap_err();
    assert_eq!(error.position, Some(0));
}

#[test]
fn failed_parse_is_repeatable() {
    let grammar = nested_lists();
    let parser = Parser::new(&grammar);
    let first = parser.parse(b"ll1l2x").unwrap_err();
    for _ in 0..3 {
        assert_eq!(parser.parse(b"ll1l2x").unwrap_err(), first);
    }
    assert!(parser.parse(b"l1e").is_ok());
    assert_eq!(parser.parse(b"ll1l2x").unwrap_err(), first);
}

#[test]
fn packrat_reports_same_failure() {
    let grammar = nested_lists();
    let plain = Parser::new(&grammar);
    let packrat = Parser::new(&grammar).with_config(ParserConfig::packrat());

    for input in [&b"ll1l2x"[..], b"lll7ee", b"x", b"l1l2el"] {
        assert_eq!(plain.parse(input), packrat.parse(input), "{input:?}");
    }
}

#[test]
fn parse_from_inner_node() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    let seq = g.sequence([a, b]);
    let grammar = g.build(seq).unwrap();

    let parser = Parser::new(&grammar);
    assert!(parser.parse_node(b, b"b").is_ok());
    assert!(parser.parse(b"b").is_err());
}
