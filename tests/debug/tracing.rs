//! Integration tests for parse tracing

use strand_debug::{TraceEvent, Tracer, TracerConfig};
use strand_engine::{Parser, ParserConfig};
use strand_grammar::{Grammar, GrammarBuilder};

fn keyword_list() -> Grammar {
    let mut g = GrammarBuilder::new();
    let null = g.bytes(b"null");
    let t = g.bytes(b"true");
    let word = g.choice([null, t]);
    let word = g.name(word, "keyword");
    let comma = g.literal(b',');
    let list = g.sep_by1(word, comma);
    g.build(list).unwrap()
}

#[test]
fn disabled_tracer_records_nothing() {
    let grammar = keyword_list();
    let mut tracer = Tracer::disabled();
    Parser::new(&grammar)
        .parse_with_observer(b"null,true", &mut tracer)
        .unwrap();
    assert!(tracer.buffer().is_empty());
    assert_eq!(tracer.parse_count(), 0);
}

#[test]
fn trace_is_bracketed_by_parse_boundaries() {
    let grammar = keyword_list();
    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    Parser::new(&grammar)
        .parse_with_observer(b"null,true", &mut tracer)
        .unwrap();

    let records = tracer.buffer().records_for_parse(1);
    assert!(matches!(records[0].event, TraceEvent::ParseStart { input_len: 9, .. }));
    assert!(matches!(
        records.last().unwrap().event,
        TraceEvent::ParseEnd {
            consumed: Some(9),
            error: None
        }
    ));

    let enters = tracer.buffer().by_event_type("enter").len();
    let exits = tracer.buffer().by_event_type("matched").len()
        + tracer.buffer().by_event_type("failed").len();
    assert_eq!(enters, exits);
}

#[test]
fn human_trace_uses_names_and_depth() {
    let grammar = keyword_list();
    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    Parser::new(&grammar)
        .parse_with_observer(b"true", &mut tracer)
        .unwrap();

    let text = tracer.format_last_parse();
    assert!(text.contains("P0001 === PARSE"));
    assert!(text.contains("  > keyword @0"));
    assert!(text.contains("- \"null\" @0"));
    assert!(text.contains("+ keyword 0..4"));
    assert!(text.ends_with("=== PARSE END OK (4 bytes) ==="));
}

#[test]
fn json_trace_is_an_array() {
    let grammar = keyword_list();
    let mut tracer = Tracer::new(TracerConfig::new().enabled().json());
    let _ = Parser::new(&grammar).parse_with_observer(b"nope", &mut tracer);

    let json = tracer.format_last_parse();
    assert!(json.starts_with("[{"));
    assert!(json.contains("\"type\":\"parse-end\""));
    assert!(json.contains("\"kind\":\"bytes-mismatch\""));
}

#[test]
fn event_filter_keeps_selected_types() {
    let grammar = keyword_list();
    let config = TracerConfig::new()
        .enabled()
        .filter_events(vec!["failed".to_string()]);
    let mut tracer = Tracer::new(config);
    Parser::new(&grammar)
        .parse_with_observer(b"true", &mut tracer)
        .unwrap();

    assert!(!tracer.buffer().is_empty());
    assert!(tracer.buffer().iter().all(|r| r.event_type() == "failed"));
}

#[test]
fn parses_are_numbered() {
    let grammar = keyword_list();
    let parser = Parser::new(&grammar);
    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    parser.parse_with_observer(b"null", &mut tracer).unwrap();
    parser.parse_with_observer(b"true", &mut tracer).unwrap();

    assert_eq!(tracer.parse_count(), 2);
    let stats = tracer.stats();
    assert_eq!(stats.oldest_parse, Some(1));
    assert_eq!(stats.newest_parse, Some(2));
}

#[test]
fn memo_hits_are_traced() {
    let mut g = GrammarBuilder::new();
    let a = g.literal(b'a');
    let b = g.literal(b'b');
    let c = g.literal(b'c');
    let ab = g.sequence([a, b]);
    let ac = g.sequence([a, c]);
    let choice = g.choice([ab, ac]);
    let grammar = g.build(choice).unwrap();

    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    Parser::new(&grammar)
        .with_config(ParserConfig::packrat())
        .parse_with_observer(b"ac", &mut tracer)
        .unwrap();

    let hits = tracer.buffer().by_event_type("memo-hit");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].event.node(), Some(a));
}

#[test]
fn fatal_errors_are_traced_as_aborts() {
    let mut g = GrammarBuilder::new();
    let expr = g.indirect();
    let plus = g.literal(b'+');
    let sum = g.sequence([expr, plus]);
    g.bind_indirect(expr, sum).unwrap();
    let grammar = g.build(expr).unwrap();

    let mut tracer = Tracer::new(TracerConfig::new().enabled().with_buffer_size(64));
    let error = Parser::new(&grammar)
        .with_config(ParserConfig::default().with_max_depth(16))
        .parse_with_observer(b"+", &mut tracer)
        .unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(tracer.buffer().by_event_type("aborted").len(), 1);
    assert!(tracer.buffer().len() <= 64);
}
