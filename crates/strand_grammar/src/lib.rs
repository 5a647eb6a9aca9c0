//! Combinator grammar model for Strand.
//!
//! Grammars are assembled bottom-up with a [`GrammarBuilder`]: leaves
//! (literals, ranges, byte strings) first, then compounds (sequence, choice,
//! repetition, actions, length-prefixed values). Recursive rules are declared
//! with [`GrammarBuilder::indirect`] and bound later with
//! [`GrammarBuilder::bind_indirect`]. [`GrammarBuilder::build`] validates the
//! arena and freezes it into an immutable, thread-safe [`Grammar`].
//!
//! ```text
//! let mut g = GrammarBuilder::new();
//! let value = g.indirect();
//! let items = g.many(value);
//! let list = g.sequence([l, items, e]);
//! let any = g.choice([int, list]);
//! g.bind_indirect(value, any)?;
//! let grammar = g.build(value)?;
//! ```
//!
//! # Modules
//!
//! - [`node`] - Node variants, node ids, actions, byte sets
//! - [`builder`] - Combinator constructors and indirection binding
//! - [`grammar`] - The frozen grammar graph
//! - [`common`] - Reusable building blocks (decimal integers)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod common;
pub mod grammar;
pub mod node;

pub use builder::GrammarBuilder;
pub use grammar::Grammar;
pub use node::{Action, ByteSet, Element, Node, NodeId};
