//! Combinator constructors.
//!
//! Every constructor appends one node to the builder's arena and returns its
//! id; existing nodes are never modified, with the single exception of
//! binding an indirection placeholder.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use strand_foundation::{Error, ErrorKind, Result, Token};

use crate::grammar::Grammar;
use crate::node::{Action, ByteSet, Element, Node, NodeId};

/// Source of arena ids, so node ids from different builders never collide.
static NEXT_GRAMMAR_ID: AtomicU32 = AtomicU32::new(1);

/// Builds a grammar bottom-up.
///
/// ```text
/// let mut g = GrammarBuilder::new();
/// let digit = g.range(b'0', b'9');
/// let number = g.many1(digit);
/// let grammar = g.build(number)?;
/// ```
#[derive(Debug)]
pub struct GrammarBuilder {
    id: u32,
    nodes: Vec<Node>,
    names: HashMap<usize, Arc<str>>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    /// Creates an empty builder with a fresh arena id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAMMAR_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Returns the number of nodes created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no nodes have been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, node: Node) -> NodeId {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeId {
            grammar: self.id,
            index,
        }
    }

    // =========================================================================
    // Terminals
    // =========================================================================

    /// Matches exactly `byte`; produces a byte token.
    pub fn literal(&mut self, byte: u8) -> NodeId {
        self.push(Node::Literal(byte))
    }

    /// Matches one byte in `low..=high`; produces a byte token.
    pub fn range(&mut self, low: u8, high: u8) -> NodeId {
        self.push(Node::Range { low, high })
    }

    /// Matches one byte contained in `bytes`.
    pub fn in_set(&mut self, bytes: &[u8]) -> NodeId {
        self.push(Node::Set(ByteSet::from_bytes(bytes)))
    }

    /// Matches one byte not contained in `bytes`.
    pub fn not_in_set(&mut self, bytes: &[u8]) -> NodeId {
        self.push(Node::Set(ByteSet::from_bytes(bytes).complement()))
    }

    /// Matches an exact byte string; produces a byte-string token.
    pub fn bytes(&mut self, literal: &[u8]) -> NodeId {
        self.push(Node::Bytes(Arc::from(literal)))
    }

    /// Matches any single byte.
    pub fn any_byte(&mut self) -> NodeId {
        self.push(Node::AnyByte)
    }

    /// Matches a big-endian unsigned integer of `width` bytes (1, 2, 4 or 8).
    pub fn unsigned(&mut self, width: u8) -> NodeId {
        self.push(Node::Unsigned { width })
    }

    /// Matches a big-endian signed integer of `width` bytes (1, 2, 4 or 8).
    pub fn signed(&mut self, width: u8) -> NodeId {
        self.push(Node::Signed { width })
    }

    /// Succeeds only at end of input.
    pub fn end(&mut self) -> NodeId {
        self.push(Node::End)
    }

    /// Always succeeds with a `none` token, consuming nothing.
    pub fn epsilon(&mut self) -> NodeId {
        self.push(Node::Epsilon)
    }

    /// Always fails.
    pub fn nothing(&mut self) -> NodeId {
        self.push(Node::Nothing)
    }

    // =========================================================================
    // Compounds
    // =========================================================================

    /// Matches each node in order; produces a sequence of their tokens.
    pub fn sequence(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(Node::Sequence(nodes.into_iter().collect()))
    }

    /// Tries each node in order; the first success wins.
    pub fn choice(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(Node::Choice(nodes.into_iter().collect()))
    }

    /// Matches `node` or succeeds with `none` without consuming.
    pub fn optional(&mut self, node: NodeId) -> NodeId {
        self.push(Node::Optional(node))
    }

    /// Zero or more repetitions.
    pub fn many(&mut self, node: NodeId) -> NodeId {
        self.push(Node::Repeat {
            node,
            min: 0,
            max: None,
        })
    }

    /// One or more repetitions.
    pub fn many1(&mut self, node: NodeId) -> NodeId {
        self.push(Node::Repeat {
            node,
            min: 1,
            max: None,
        })
    }

    /// Exactly `count` repetitions.
    pub fn repeat_n(&mut self, node: NodeId, count: usize) -> NodeId {
        self.push(Node::Repeat {
            node,
            min: count,
            max: Some(count),
        })
    }

    /// Zero or more `node`s separated by `separator`.
    pub fn sep_by(&mut self, node: NodeId, separator: NodeId) -> NodeId {
        self.push(Node::SepBy {
            node,
            separator,
            min: 0,
        })
    }

    /// One or more `node`s separated by `separator`.
    pub fn sep_by1(&mut self, node: NodeId, separator: NodeId) -> NodeId {
        self.push(Node::SepBy {
            node,
            separator,
            min: 1,
        })
    }

    /// Matches `keep` then `skip`, keeping `keep`'s token.
    pub fn left(&mut self, keep: NodeId, skip: NodeId) -> NodeId {
        self.push(Node::Pick {
            members: vec![keep, skip],
            keep: 0,
        })
    }

    /// Matches `skip` then `keep`, keeping `keep`'s token.
    pub fn right(&mut self, skip: NodeId, keep: NodeId) -> NodeId {
        self.push(Node::Pick {
            members: vec![skip, keep],
            keep: 1,
        })
    }

    /// Matches `open`, `keep`, `close`, keeping `keep`'s token.
    pub fn middle(&mut self, open: NodeId, keep: NodeId, close: NodeId) -> NodeId {
        self.push(Node::Pick {
            members: vec![open, keep, close],
            keep: 1,
        })
    }

    /// Runs `node`, then `transform` on its token; `None` rejects the match.
    pub fn action(
        &mut self,
        node: NodeId,
        name: impl Into<Arc<str>>,
        transform: impl Fn(Token) -> Option<Token> + Send + Sync + 'static,
    ) -> NodeId {
        self.push(Node::Action {
            node,
            action: Action::new(name, transform),
        })
    }

    /// Runs `length` for a count `n`, then consumes `n` elements.
    pub fn length_value(&mut self, length: NodeId, element: Element) -> NodeId {
        self.push(Node::LengthValue { length, element })
    }

    /// Succeeds if `node` would match here; consumes nothing.
    pub fn and(&mut self, node: NodeId) -> NodeId {
        self.push(Node::Lookahead {
            node,
            positive: true,
        })
    }

    /// Succeeds if `node` would not match here; consumes nothing.
    pub fn not(&mut self, node: NodeId) -> NodeId {
        self.push(Node::Lookahead {
            node,
            positive: false,
        })
    }

    /// Skips ASCII whitespace, then matches `node`.
    pub fn whitespace(&mut self, node: NodeId) -> NodeId {
        self.push(Node::Whitespace(node))
    }

    // =========================================================================
    // Indirection
    // =========================================================================

    /// Creates an unbound placeholder usable immediately as a reference.
    pub fn indirect(&mut self) -> NodeId {
        self.push(Node::Indirect(None))
    }

    /// Installs the definition of a placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if `placeholder` is not an indirection, is already
    /// bound, or either id belongs to another builder.
    pub fn bind_indirect(&mut self, placeholder: NodeId, definition: NodeId) -> Result<()> {
        self.check_owned(placeholder)?;
        self.check_owned(definition)?;

        match &mut self.nodes[placeholder.index()] {
            Node::Indirect(slot @ None) => {
                *slot = Some(definition);
                Ok(())
            }
            Node::Indirect(Some(_)) => Err(Error::new(ErrorKind::IndirectionAlreadyBound {
                node: placeholder.index(),
            })),
            _ => Err(Error::new(ErrorKind::NotAnIndirection {
                node: placeholder.index(),
            })),
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Attaches a diagnostic name to a node and returns the node.
    pub fn name(&mut self, node: NodeId, label: impl Into<Arc<str>>) -> NodeId {
        if node.grammar == self.id {
            self.names.insert(node.index(), label.into());
        }
        node
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Validates the arena and freezes it into a [`Grammar`] rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if any node refers to a foreign or out-of-range id,
    /// any indirection is unbound or bound only to other indirections in a
    /// cycle, or a terminal has invalid parameters.
    pub fn build(self, root: NodeId) -> Result<Grammar> {
        self.check_owned(root)?;

        for (index, node) in self.nodes.iter().enumerate() {
            for child in node.children() {
                self.check_owned(child)?;
            }
            self.check_node(index, node)?;
        }

        Ok(Grammar::from_parts(self.id, self.nodes, self.names, root))
    }

    fn check_owned(&self, id: NodeId) -> Result<()> {
        if id.grammar == self.id && id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::ForeignNode { node: id.index() }))
        }
    }

    fn check_node(&self, index: usize, node: &Node) -> Result<()> {
        match node {
            Node::Indirect(None) => Err(Error::unbound_indirection(index)),
            Node::Indirect(Some(_)) => self.check_indirection_chain(index),
            Node::Range { low, high } if low > high => Err(Error::new(
                ErrorKind::InvalidGrammar(format!("node #{index}: empty range {low}..={high}")),
            )),
            Node::Unsigned { width } | Node::Signed { width }
                if !matches!(width, 1 | 2 | 4 | 8) =>
            {
                Err(Error::new(ErrorKind::InvalidGrammar(format!(
                    "node #{index}: integer width must be 1, 2, 4 or 8, got {width}"
                ))))
            }
            Node::Repeat {
                min, max: Some(max), ..
            } if max < min => Err(Error::new(ErrorKind::InvalidGrammar(format!(
                "node #{index}: repetition max {max} below min {min}"
            )))),
            Node::Pick { members, keep } if *keep >= members.len() => Err(Error::new(
                ErrorKind::InvalidGrammar(format!("node #{index}: pick index out of range")),
            )),
            _ => Ok(()),
        }
    }

    /// Rejects placeholders that resolve only to other placeholders forever.
    fn check_indirection_chain(&self, start: usize) -> Result<()> {
        let mut current = start;
        for _ in 0..=self.nodes.len() {
            match &self.nodes[current] {
                Node::Indirect(Some(next)) => current = next.index(),
                Node::Indirect(None) => return Err(Error::unbound_indirection(current)),
                _ => return Ok(()),
            }
        }
        Err(Error::new(ErrorKind::InvalidGrammar(format!(
            "node #{start}: indirection cycle with no definition"
        ))))
    }
}
