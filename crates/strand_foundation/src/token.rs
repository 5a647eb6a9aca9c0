//! The token type produced by every successful match.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::TokenSeq;

/// Tagged value produced by a successful match.
///
/// Tokens are immutable and cheaply cloneable. Byte payloads are copied out
/// of the input, so a token never borrows the buffer it was parsed from.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Token {
    /// No value (optional that did not match, lookahead, epsilon).
    #[default]
    None,
    /// A single byte.
    Byte(u8),
    /// Unsigned integer.
    UInt(u64),
    /// Signed integer.
    SInt(i64),
    /// Byte string.
    Bytes(Arc<[u8]>),
    /// Ordered sequence of tokens.
    Seq(TokenSeq),
}

/// The tag of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenType {
    /// [`Token::None`].
    None,
    /// [`Token::Byte`].
    Byte,
    /// [`Token::UInt`].
    UInt,
    /// [`Token::SInt`].
    SInt,
    /// [`Token::Bytes`].
    Bytes,
    /// [`Token::Seq`].
    Seq,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Byte => "byte",
            Self::UInt => "unsigned-integer",
            Self::SInt => "signed-integer",
            Self::Bytes => "byte-string",
            Self::Seq => "sequence",
        };
        f.write_str(name)
    }
}

impl Token {
    /// Returns the tag of this token.
    #[must_use]
    pub const fn token_type(&self) -> TokenType {
        match self {
            Self::None => TokenType::None,
            Self::Byte(_) => TokenType::Byte,
            Self::UInt(_) => TokenType::UInt,
            Self::SInt(_) => TokenType::SInt,
            Self::Bytes(_) => TokenType::Bytes,
            Self::Seq(_) => TokenType::Seq,
        }
    }

    /// Creates a byte-string token by copying `bytes`.
    #[must_use]
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::Bytes(Arc::from(bytes))
    }

    /// Creates a sequence token from a list of tokens.
    #[must_use]
    pub fn seq(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self::Seq(tokens.into_iter().collect())
    }

    /// Returns true if this is the `none` token.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Attempts to extract a byte.
    #[must_use]
    pub const fn as_byte(&self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an unsigned integer.
    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a signed integer.
    #[must_use]
    pub const fn as_sint(&self) -> Option<i64> {
        match self {
            Self::SInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a byte string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract a sequence.
    #[must_use]
    pub const fn as_seq(&self) -> Option<&TokenSeq> {
        match self {
            Self::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets this token as a count: a `UInt`, or a `Byte` widened.
    ///
    /// Length-prefixed combinators accept either.
    #[must_use]
    pub const fn as_count(&self) -> Option<u64> {
        match self {
            Self::UInt(n) => Some(*n),
            Self::Byte(b) => Some(*b as u64),
            _ => None,
        }
    }

    /// Collects the bytes of a sequence of `Byte` tokens.
    ///
    /// Returns `None` if this is not a sequence or any element is not a byte.
    #[must_use]
    pub fn collect_bytes(&self) -> Option<Vec<u8>> {
        self.as_seq()?.iter().map(Token::as_byte).collect()
    }

    /// Counts this token and every token nested inside it.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Seq(items) => 1 + items.iter().map(Token::node_count).sum::<usize>(),
            _ => 1,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Byte(b) => write!(f, "Byte({:?})", char::from(*b)),
            Self::UInt(n) => write!(f, "UInt({n})"),
            Self::SInt(n) => write!(f, "SInt({n})"),
            Self::Bytes(b) => write!(f, "Bytes(b\"{}\")", b.escape_ascii()),
            Self::Seq(s) => f.debug_tuple("Seq").field(s).finish(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Byte(b) => write!(f, "'{}'", b.escape_ascii()),
            Self::UInt(n) => write!(f, "{n}"),
            Self::SInt(n) => write!(f, "{n}i"),
            Self::Bytes(b) => write!(f, "\"{}\"", b.escape_ascii()),
            Self::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<u8> for Token {
    fn from(b: u8) -> Self {
        Self::Byte(b)
    }
}

impl From<u64> for Token {
    fn from(n: u64) -> Self {
        Self::UInt(n)
    }
}

impl From<i64> for Token {
    fn from(n: i64) -> Self {
        Self::SInt(n)
    }
}

impl From<&[u8]> for Token {
    fn from(b: &[u8]) -> Self {
        Self::bytes(b)
    }
}

impl From<TokenSeq> for Token {
    fn from(s: TokenSeq) -> Self {
        Self::Seq(s)
    }
}
