//! Successful parse outcome.

use std::fmt;

use strand_foundation::Token;

/// A successful parse: the root token and how many bytes it consumed.
///
/// Tokens own their byte payloads, so a `Parsed` never borrows the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parsed {
    /// The token produced by the root node.
    pub token: Token,
    /// Bytes consumed from the start of the input.
    pub consumed: usize,
}

impl Parsed {
    /// Creates a new outcome.
    #[must_use]
    pub fn new(token: Token, consumed: usize) -> Self {
        Self { token, consumed }
    }

    /// Returns the token, dropping the consumed count.
    #[must_use]
    pub fn into_token(self) -> Token {
        self.token
    }
}

impl fmt::Display for Parsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.token, self.consumed)
    }
}
