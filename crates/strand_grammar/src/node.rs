//! Grammar node variants and their supporting types.

use std::fmt;
use std::sync::Arc;

use strand_foundation::Token;

// =============================================================================
// Node Id
// =============================================================================

/// Handle to a node in a grammar arena.
///
/// Ids are tagged with the arena they came from, so a node from one builder
/// cannot silently be used inside another.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId {
    pub(crate) grammar: u32,
    pub(crate) index: u32,
}

impl NodeId {
    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the id of the arena this node belongs to.
    #[must_use]
    pub const fn grammar_id(self) -> u32 {
        self.grammar
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@g{})", self.index, self.grammar)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

// =============================================================================
// Action
// =============================================================================

/// Signature of a semantic action: replace the token, or reject with `None`.
pub type ActionFn = dyn Fn(Token) -> Option<Token> + Send + Sync;

/// A named semantic action applied to the token of a matched node.
///
/// Actions must be pure: the engine may memoize their results.
#[derive(Clone)]
pub struct Action {
    name: Arc<str>,
    func: Arc<ActionFn>,
}

impl Action {
    /// Creates a new action.
    pub fn new(
        name: impl Into<Arc<str>>,
        func: impl Fn(Token) -> Option<Token> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the action's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the action to a token.
    #[must_use]
    pub fn apply(&self, token: Token) -> Option<Token> {
        (self.func)(token)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.name)
    }
}

// =============================================================================
// Byte Set
// =============================================================================

/// A set of bytes stored as a 256-bit bitmap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 4])
    }

    /// Creates a set containing the given bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self::new();
        for &b in bytes {
            set.insert(b);
        }
        set
    }

    /// Adds a byte.
    pub fn insert(&mut self, b: u8) {
        self.0[usize::from(b >> 6)] |= 1u64 << (b & 63);
    }

    /// Returns true if the byte is in the set.
    #[must_use]
    pub const fn contains(&self, b: u8) -> bool {
        self.0[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }

    /// Returns the complement of this set.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self([!self.0[0], !self.0[1], !self.0[2], !self.0[3]])
    }

    /// Returns the number of bytes in the set.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.0[0].count_ones()
            + self.0[1].count_ones()
            + self.0[2].count_ones()
            + self.0[3].count_ones()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|&b| self.contains(b))
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSet[")?;
        for b in self.iter() {
            write!(f, "{}", b.escape_ascii())?;
        }
        write!(f, "]")
    }
}

// =============================================================================
// Element
// =============================================================================

/// What a length-prefixed value counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    /// Raw bytes, collected into a byte-string token.
    Byte,
    /// Repetitions of a node, collected into a sequence token.
    Node(NodeId),
}

// =============================================================================
// Node
// =============================================================================

/// A grammar node.
///
/// Nodes are immutable once the grammar is built. Compound nodes refer to
/// their children by [`NodeId`]; cycles exist only through [`Node::Indirect`].
#[derive(Clone, Debug)]
pub enum Node {
    /// Exactly one byte.
    Literal(u8),
    /// One byte within `low..=high`.
    Range {
        /// Lower bound (inclusive).
        low: u8,
        /// Upper bound (inclusive).
        high: u8,
    },
    /// One byte in a set.
    Set(ByteSet),
    /// An exact byte string.
    Bytes(Arc<[u8]>),
    /// Any single byte.
    AnyByte,
    /// Big-endian unsigned integer of `width` bytes.
    Unsigned {
        /// Width in bytes (1, 2, 4 or 8).
        width: u8,
    },
    /// Big-endian two's-complement integer of `width` bytes.
    Signed {
        /// Width in bytes (1, 2, 4 or 8).
        width: u8,
    },
    /// Ordered conjunction.
    Sequence(Vec<NodeId>),
    /// A sequence that keeps only one member's token.
    Pick {
        /// Members, matched in order.
        members: Vec<NodeId>,
        /// Index of the member whose token is kept.
        keep: usize,
    },
    /// Ordered choice; the first success wins.
    Choice(Vec<NodeId>),
    /// Zero or one.
    Optional(NodeId),
    /// Bounded repetition.
    Repeat {
        /// The repeated node.
        node: NodeId,
        /// Minimum repetitions.
        min: usize,
        /// Maximum repetitions (`None` = unbounded).
        max: Option<usize>,
    },
    /// Separated repetition; separator tokens are dropped.
    SepBy {
        /// The element node.
        node: NodeId,
        /// The separator node.
        separator: NodeId,
        /// Minimum elements (0 or 1).
        min: usize,
    },
    /// Post-process a matched token.
    Action {
        /// The inner node.
        node: NodeId,
        /// The transform.
        action: Action,
    },
    /// A count followed by that many elements.
    LengthValue {
        /// Node producing the count.
        length: NodeId,
        /// What is counted.
        element: Element,
    },
    /// Zero-width assertion.
    Lookahead {
        /// The asserted node.
        node: NodeId,
        /// `true` for "and", `false` for "not".
        positive: bool,
    },
    /// Skip ASCII whitespace, then match the node.
    Whitespace(NodeId),
    /// Succeeds only at end of input.
    End,
    /// Always succeeds, consuming nothing.
    Epsilon,
    /// Always fails.
    Nothing,
    /// Placeholder for a recursive rule; `None` until bound.
    Indirect(Option<NodeId>),
}

impl Node {
    /// Short kind name used in traces and descriptions.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Range { .. } => "range",
            Self::Set(_) => "set",
            Self::Bytes(_) => "bytes",
            Self::AnyByte => "any-byte",
            Self::Unsigned { .. } => "unsigned",
            Self::Signed { .. } => "signed",
            Self::Sequence(_) => "sequence",
            Self::Pick { .. } => "pick",
            Self::Choice(_) => "choice",
            Self::Optional(_) => "optional",
            Self::Repeat { .. } => "repeat",
            Self::SepBy { .. } => "sep-by",
            Self::Action { .. } => "action",
            Self::LengthValue { .. } => "length-value",
            Self::Lookahead { .. } => "lookahead",
            Self::Whitespace(_) => "whitespace",
            Self::End => "end",
            Self::Epsilon => "epsilon",
            Self::Nothing => "nothing",
            Self::Indirect(_) => "indirect",
        }
    }

    /// Returns true for nodes that consume input directly rather than
    /// through children.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Literal(_)
                | Self::Range { .. }
                | Self::Set(_)
                | Self::Bytes(_)
                | Self::AnyByte
                | Self::Unsigned { .. }
                | Self::Signed { .. }
                | Self::End
                | Self::Epsilon
                | Self::Nothing
        )
    }

    /// Returns the children this node refers to.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Sequence(members) | Self::Pick { members, .. } | Self::Choice(members) => {
                members.clone()
            }
            Self::Optional(node)
            | Self::Repeat { node, .. }
            | Self::Action { node, .. }
            | Self::Lookahead { node, .. }
            | Self::Whitespace(node)
            | Self::Indirect(Some(node)) => vec![*node],
            Self::SepBy {
                node, separator, ..
            } => vec![*node, *separator],
            Self::LengthValue { length, element } => match element {
                Element::Byte => vec![*length],
                Element::Node(node) => vec![*length, *node],
            },
            _ => Vec::new(),
        }
    }
}
