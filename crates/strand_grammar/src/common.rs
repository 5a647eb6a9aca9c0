//! Reusable building blocks.
//!
//! Decimal integers show up in most text and length-prefixed formats, so
//! the digit-string-to-integer actions live here rather than in every client.

use strand_foundation::Token;

use crate::builder::GrammarBuilder;
use crate::node::NodeId;

/// One or more ASCII digits; produces a sequence of byte tokens.
pub fn digits(g: &mut GrammarBuilder) -> NodeId {
    let digit = g.range(b'0', b'9');
    let digits = g.many1(digit);
    g.name(digits, "digits")
}

/// An unsigned decimal integer; produces a `UInt` token.
///
/// Rejects values that overflow `u64`.
pub fn decimal_uint(g: &mut GrammarBuilder) -> NodeId {
    let digits = digits(g);
    let uint = g.action(digits, "decimal-uint", |token| {
        parse_decimal(&token.collect_bytes()?).map(Token::UInt)
    });
    g.name(uint, "unsigned decimal")
}

/// A signed decimal integer with an optional leading `-`; produces an
/// `SInt` token.
///
/// Rejects values outside the `i64` range.
pub fn decimal_sint(g: &mut GrammarBuilder) -> NodeId {
    let minus = g.literal(b'-');
    let sign = g.optional(minus);
    let digits = digits(g);
    let signed = g.sequence([sign, digits]);
    let sint = g.action(signed, "decimal-sint", |token| {
        let parts = token.as_seq()?;
        let negative = !parts.first()?.is_none();
        let magnitude = parse_decimal(&parts.get(1)?.collect_bytes()?)?;
        apply_sign(negative, magnitude).map(Token::SInt)
    });
    g.name(sint, "signed decimal")
}

/// Parses ASCII digits into a `u64`, returning `None` on overflow or on a
/// non-digit byte.
#[must_use]
pub fn parse_decimal(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u64, |acc, &d| {
        if !d.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}

/// Applies a sign to a magnitude, returning `None` if it leaves `i64`.
#[must_use]
pub fn apply_sign(negative: bool, magnitude: u64) -> Option<i64> {
    let wide = i128::from(magnitude);
    i64::try_from(if negative { -wide } else { wide }).ok()
}
