//! Property tests for the engine

use proptest::prelude::*;
use strand_engine::{Parser, ParserConfig};
use strand_foundation::TokenSeq;
use strand_grammar::{Grammar, GrammarBuilder};

/// `value := digit | 'l' value* 'e'`
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

fn input() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'l', b'e', b'1', b'x']), 0..24)
}

proptest! {
    #[test]
    fn parsing_is_deterministic(bytes in input()) {
        let grammar = nested_lists();
        let parser = Parser::new(&grammar);
        prop_assert_eq!(parser.parse_outcome(&bytes), parser.parse_outcome(&bytes));
    }

    #[test]
    fn packrat_agrees_with_plain(bytes in input()) {
        let grammar = nested_lists();
        let plain = Parser::new(&grammar);
        let packrat = Parser::new(&grammar).with_config(ParserConfig::packrat());
        prop_assert_eq!(plain.parse_outcome(&bytes), packrat.parse_outcome(&bytes));
    }

    #[test]
    fn failure_position_within_input(bytes in input()) {
        let grammar = nested_lists();
        if let Err(error) = Parser::new(&grammar).parse(&bytes) {
            let position = error.position.unwrap();
            prop_assert!(position <= bytes.len());
        }
    }

    #[test]
    fn many_consumes_longest_prefix(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut g = GrammarBuilder::new();
        let digit = g.range(b'0', b'9');
        let many = g.many(digit);
        let grammar = g.build(many).unwrap();

        let parsed = Parser::new(&grammar).parse_outcome(&bytes).unwrap();
        let expected = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        prop_assert_eq!(parsed.consumed, expected);
        prop_assert_eq!(parsed.token.as_seq().map(TokenSeq::len), Some(expected));
    }
}
