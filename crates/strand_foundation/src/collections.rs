//! Persistent token sequences with structural sharing.
//!
//! A thin wrapper around the `im` crate's persistent vector. Backtracking
//! and semantic actions clone sequence tokens freely, so clones must be O(1).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Persistent sequence of tokens.
///
/// Cloning is O(1). Modifications return a new sequence sharing structure
/// with the original.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TokenSeq(im::Vector<Token>);

impl TokenSeq {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Returns the number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a token by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.0.get(index)
    }

    /// Returns a new sequence with the token appended.
    #[must_use]
    pub fn push_back(&self, token: Token) -> Self {
        let mut new = self.0.clone();
        new.push_back(token);
        Self(new)
    }

    /// Appends a token in place.
    ///
    /// Used by the engine while it owns the sequence being built.
    pub fn push(&mut self, token: Token) {
        self.0.push_back(token);
    }

    /// Returns an iterator over the tokens.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.0.iter()
    }

    /// Returns the first token.
    #[must_use]
    pub fn first(&self) -> Option<&Token> {
        self.0.front()
    }

    /// Returns the last token.
    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.0.back()
    }
}

impl fmt::Debug for TokenSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for TokenSeq {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for TokenSeq {}

impl Hash for TokenSeq {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for token in self.iter() {
            token.hash(state);
        }
    }
}

impl FromIterator<Token> for TokenSeq {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(im::Vector::from_iter(iter))
    }
}

impl From<Vec<Token>> for TokenSeq {
    fn from(tokens: Vec<Token>) -> Self {
        tokens.into_iter().collect()
    }
}

impl IntoIterator for TokenSeq {
    type Item = Token;
    type IntoIter = im::vector::ConsumingIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenSeq {
    type Item = &'a Token;
    type IntoIter = im::vector::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
