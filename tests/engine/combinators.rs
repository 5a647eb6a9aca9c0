//! Integration tests for combinator semantics

use strand_engine::{ParseObserver, Parser, ParserConfig, parse};
use strand_foundation::{ErrorKind, Token};
use strand_grammar::common::decimal_uint;
use strand_grammar::{Element, GrammarBuilder, NodeId};

/// Records which nodes were entered, in order.
#[derive(Default)]
struct Entered(Vec<(NodeId, usize)>);

impl ParseObserver for Entered {
    fn enter(&mut self, node: NodeId, position: usize, _depth: usize) {
        self.0.push((node, position));
    }
}

// =============================================================================
// Choice
// =============================================================================

#[test]
fn choice_commits_to_first_success() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let any = g.any_byte();
    let choice = g.choice([a, any]);
    let grammar = g.build(choice).unwrap();

    let mut entered = Entered::default();
    let parsed = Parser::new(&grammar)
        .parse_with_observer(b"a", &mut entered)
        .unwrap();
    assert_eq!(parsed.token, Token::Byte(b'a'));
    assert!(!entered.0.iter().any(|(node, _)| *node == any));
}

#[test]
fn choice_retries_from_start_position() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    let c = g.literal(b'c');
    let ab = g.sequence([a, b]);
    let ac = g.sequence([a, c]);
    let choice = g.choice([ab, ac]);
    let grammar = g.build(choice).unwrap();

    let mut entered = Entered::default();
    let parsed = Parser::new(&grammar)
        .parse_with_observer(b"ac", &mut entered)
        .unwrap();

    assert_eq!(parsed.token, Token::seq([Token::Byte(b'a'), Token::Byte(b'c')]));
    assert!(entered.0.contains(&(ac, 0)));
}

// =============================================================================
// Sequence, Optional, Repetition
// =============================================================================

#[test]
fn sequence_collects_member_tokens() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let digit = g.range(b'0', b'9');
    let seq = g.sequence([a, digit]);
    let grammar = g.build(seq).unwrap();

    assert_eq!(
        parse(&grammar, b"a7").unwrap(),
        Token::seq([Token::Byte(b'a'), Token::Byte(b'7')])
    );
}

#[test]
fn optional_produces_none_without_consuming() {
    let mut g = GrammarBuilder::new();
    let minus = g.literal(b'-');
    let opt = g.optional(minus);
    let grammar = g.build(opt).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"7").unwrap();
    assert_eq!(parsed.token, Token::None);
    assert_eq!(parsed.consumed, 0);
}

#[test]
fn many_without_match_is_empty_success() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let many = g.many(a);
    let grammar = g.build(many).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"bbb").unwrap();
    assert_eq!(parsed.token, Token::seq([]));
    assert_eq!(parsed.consumed, 0);
}

#[test]
fn many1_without_match_fails() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let many1 = g.many1(a);
    let grammar = g.build(many1).unwrap();

    let error = parse(&grammar, b"bbb").unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::RepetitionUnsatisfied { min: 1, matched: 0 }
    );
    assert_eq!(error.position, Some(0));
}

#[test]
fn many1_partial_element_reports_deeper_failure() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    let ab = g.sequence([a, b]);
    let many1 = g.many1(ab);
    let grammar = g.build(many1).unwrap();

    let error = parse(&grammar, b"ax").unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::LiteralMismatch {
            expected: b'b',
            found: b'x'
        }
    );
    assert_eq!(error.position, Some(1));
}

#[test]
fn many_stops_before_failing_element() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let many = g.many(a);
    let grammar = g.build(many).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"aab").unwrap();
    assert_eq!(parsed.consumed, 2);
}

#[test]
fn many_of_nullable_terminates() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let opt = g.optional(a);
    let many = g.many(opt);
    let grammar = g.build(many).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"aab").unwrap();
    assert_eq!(parsed.consumed, 2);
}

#[test]
fn separated_list() {
    let mut g = GrammarBuilder::new();
    let digit = g.range(b'0', b'9');
    let comma = g.literal(b',');
    let list = g.sep_by(digit, comma);
    let grammar = g.build(list).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"1,2,3,").unwrap();
    assert_eq!(parsed.consumed, 5);
    assert_eq!(parsed.token.as_seq().unwrap().len(), 3);
}

#[test]
fn middle_keeps_inner_token() {
    let mut g = GrammarBuilder::new();
    let open = g.literal(b'(');
    let digit = g.range(b'0', b'9');
    let close = g.literal(b')');
    let middle = g.middle(open, digit, close);
    let grammar = g.build(middle).unwrap();

    assert_eq!(parse(&grammar, b"(4)").unwrap(), Token::Byte(b'4'));
}

// =============================================================================
// Actions
// =============================================================================

#[test]
fn action_transforms_token() {
    let mut g = GrammarBuilder::new();
    let uint = decimal_uint(&mut g);
    let grammar = g.build(uint).unwrap();
    assert_eq!(parse(&grammar, b"1234").unwrap(), Token::UInt(1234));
}

#[test]
fn action_rejection_fails_node() {
    let mut g = GrammarBuilder::new();
    let uint = decimal_uint(&mut g);
    let grammar = g.build(uint).unwrap();

    let error = parse(&grammar, b"99999999999999999999").unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::ActionRejected {
            action: "decimal-uint".to_string()
        }
    );
}

#[test]
fn rejected_alternative_falls_through() {
    let mut g = GrammarBuilder::new();
    let digit = g.range(b'0', b'9');
    let even = g.action(digit, "even", |token| {
        token.as_byte().filter(|b| b % 2 == 0).map(|_| token)
    });
    let any = g.any_byte();
    let choice = g.choice([even, any]);
    let grammar = g.build(choice).unwrap();

    assert_eq!(parse(&grammar, b"3").unwrap(), Token::Byte(b'3'));
}

// =============================================================================
// Length-Prefixed Values
// =============================================================================

#[test]
fn length_value_reads_declared_bytes() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let lv = g.length_value(count, Element::Byte);
    let grammar = g.build(lv).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"\x03abcd").unwrap();
    assert_eq!(parsed.token, Token::bytes(b"abc"));
    assert_eq!(parsed.consumed, 4);
}

#[test]
fn length_value_overrun_fails() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let lv = g.length_value(count, Element::Byte);
    let grammar = g.build(lv).unwrap();

    let error = parse(&grammar, b"\x05abc").unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::DeclaredLengthExceedsInput {
            declared: 5,
            remaining: 3
        }
    );
    assert_eq!(error.position, Some(1));
}

#[test]
fn length_value_overrun_backtracks() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let lv = g.length_value(count, Element::Byte);
    let fallback = g.any_byte();
    let choice = g.choice([lv, fallback]);
    let grammar = g.build(choice).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"\x05abc").unwrap();
    assert_eq!(parsed.token, Token::Byte(5));
    assert_eq!(parsed.consumed, 1);
}

#[test]
fn length_value_of_nodes() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let word = g.unsigned(2);
    let lv = g.length_value(count, Element::Node(word));
    let grammar = g.build(lv).unwrap();

    let token = parse(&grammar, b"\x02\x00\x01\x01\x00").unwrap();
    assert_eq!(token, Token::seq([Token::UInt(1), Token::UInt(256)]));
}

#[test]
fn length_value_of_zero_width_nodes() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let nothing_consumed = g.epsilon();
    let lv = g.length_value(count, Element::Node(nothing_consumed));
    let grammar = g.build(lv).unwrap();

    let parsed = Parser::new(&grammar).parse_outcome(b"\x03").unwrap();
    assert_eq!(parsed.token, Token::seq([Token::None, Token::None, Token::None]));
    assert_eq!(parsed.consumed, 1);
}

#[test]
fn length_value_node_overrun_reports_element_failure() {
    let mut g = GrammarBuilder::new();
    let count = g.unsigned(1);
    let word = g.unsigned(2);
    let lv = g.length_value(count, Element::Node(word));
    let grammar = g.build(lv).unwrap();

    let error = parse(&grammar, b"\x03\x00\x01\x00").unwrap_err();
    assert_eq!(error.kind, ErrorKind::InputExhausted);
    assert_eq!(error.position, Some(4));
}

#[test]
fn non_count_length_is_fatal() {
    let mut g = GrammarBuilder::new();
    let digit = g.range(b'0', b'9');
    let digits = g.many1(digit);
    let lv = g.length_value(digits, Element::Byte);
    let grammar = g.build(lv).unwrap();

    let error = parse(&grammar, b"3abc").unwrap_err();
    assert!(error.is_fatal());
    assert!(matches!(error.kind, ErrorKind::InvalidLength { .. }));
}

// =============================================================================
// End of Input and Recursion
// =============================================================================

#[test]
fn trailing_input_allowed_by_default() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let grammar = g.build(a).unwrap();

    let parser = Parser::new(&grammar);
    assert_eq!(parser.parse_outcome(b"abc").unwrap().consumed, 1);

    let strict = parser.with_config(ParserConfig::strict());
    let error = strict.parse(b"abc").unwrap_err();
    assert_eq!(error.kind, ErrorKind::TrailingInput { remaining: 2 });
    assert_eq!(error.position, Some(1));
}

#[test]
fn end_node_enforces_full_input() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let end = g.end();
    let seq = g.sequence([a, end]);
    let grammar = g.build(seq).unwrap();

    assert!(parse(&grammar, b"a").is_ok());
    assert!(parse(&grammar, b"ab").is_err());
}

#[test]
fn left_recursion_hits_depth_limit() {
    let mut g = GrammarBuilder::new();
    let expr = g.indirect();
    let plus = g.literal(b'+');
    let digit = g.range(b'0', b'9');
    let sum = g.sequence([expr, plus, digit]);
    let def = g.choice([sum, digit]);
    g.bind_indirect(expr, def).unwrap();
    let grammar = g.build(expr).unwrap();

    let parser = Parser::new(&grammar).with_config(ParserConfig::default().with_max_depth(64));
    let error = parser.parse(b"1+2").unwrap_err();
    assert!(matches!(error.kind, ErrorKind::RecursionLimit { limit: 64 }));
    assert!(error.is_fatal());
}
