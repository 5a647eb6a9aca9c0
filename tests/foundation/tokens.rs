//! Integration tests for tokens and token sequences

use strand_foundation::{Token, TokenSeq, TokenType};

// =============================================================================
// Tags and Accessors
// =============================================================================

#[test]
fn tag_selects_payload() {
    let tokens = [
        (Token::None, TokenType::None),
        (Token::Byte(b'x'), TokenType::Byte),
        (Token::UInt(7), TokenType::UInt),
        (Token::SInt(-7), TokenType::SInt),
        (Token::bytes(b"ab"), TokenType::Bytes),
        (Token::seq([]), TokenType::Seq),
    ];
    for (token, tag) in tokens {
        assert_eq!(token.token_type(), tag);
    }
}

#[test]
fn mismatched_access_returns_none() {
    let token = Token::UInt(3);
    assert_eq!(token.as_uint(), Some(3));
    assert_eq!(token.as_sint(), None);
    assert_eq!(token.as_byte(), None);
    assert!(token.as_bytes().is_none());
    assert!(token.as_seq().is_none());
}

#[test]
fn counts_accept_bytes_and_unsigned() {
    assert_eq!(Token::Byte(200).as_count(), Some(200));
    assert_eq!(Token::UInt(1 << 40).as_count(), Some(1 << 40));
    assert_eq!(Token::SInt(5).as_count(), None);
}

#[test]
fn collect_bytes_requires_all_bytes() {
    let digits = Token::seq([Token::Byte(b'4'), Token::Byte(b'2')]);
    assert_eq!(digits.collect_bytes(), Some(b"42".to_vec()));

    let mixed = Token::seq([Token::Byte(b'4'), Token::UInt(2)]);
    assert_eq!(mixed.collect_bytes(), None);
}

#[test]
fn node_count_includes_nested() {
    let token = Token::seq([
        Token::Byte(b'l'),
        Token::seq([Token::SInt(1), Token::SInt(2)]),
        Token::Byte(b'e'),
    ]);
    assert_eq!(token.node_count(), 6);
}

#[test]
fn display_renders_tree() {
    let token = Token::seq([Token::Byte(b'i'), Token::SInt(-3), Token::bytes(b"hi")]);
    assert_eq!(token.to_string(), "['i' -3i \"hi\"]");
}

#[test]
fn conversions() {
    assert_eq!(Token::from(b'a'), Token::Byte(b'a'));
    assert_eq!(Token::from(9u64), Token::UInt(9));
    assert_eq!(Token::from(-9i64), Token::SInt(-9));
    assert_eq!(Token::from(&b"xy"[..]), Token::bytes(b"xy"));
}

// =============================================================================
// Token Sequences
// =============================================================================

#[test]
fn push_back_leaves_original_untouched() {
    let original: TokenSeq = [Token::Byte(b'a')].into_iter().collect();
    let extended = original.push_back(Token::Byte(b'b'));

    assert_eq!(original.len(), 1);
    assert_eq!(extended.len(), 2);
    assert_eq!(extended.last(), Some(&Token::Byte(b'b')));
}

#[test]
fn push_in_place() {
    let mut seq = TokenSeq::new();
    assert!(seq.is_empty());
    seq.push(Token::UInt(1));
    seq.push(Token::UInt(2));
    assert_eq!(seq.first(), Some(&Token::UInt(1)));
    assert_eq!(seq.get(1), Some(&Token::UInt(2)));
    assert_eq!(seq.iter().count(), 2);
}

#[test]
fn clones_compare_equal() {
    let token = Token::seq([Token::bytes(b"k"), Token::UInt(1)]);
    let copy = token.clone();
    assert_eq!(token, copy);
}
