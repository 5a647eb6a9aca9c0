//! The frozen grammar graph.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strand_foundation::{Error, ErrorKind, Result};

use crate::node::{Node, NodeId};

/// An immutable grammar: an arena of nodes plus a root.
///
/// Cloning is O(1); clones share the arena. A grammar is `Send + Sync` and
/// may be used by any number of concurrent parses.
#[derive(Clone)]
pub struct Grammar {
    arena: Arc<Arena>,
    root: NodeId,
}

struct Arena {
    id: u32,
    nodes: Vec<Node>,
    names: HashMap<usize, Arc<str>>,
}

impl Grammar {
    pub(crate) fn from_parts(
        id: u32,
        nodes: Vec<Node>,
        names: HashMap<usize, Arc<str>>,
        root: NodeId,
    ) -> Self {
        Self {
            arena: Arc::new(Arena { id, nodes, names }),
            root,
        }
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns a grammar sharing this arena with a different root.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not belong to this grammar.
    pub fn with_root(&self, root: NodeId) -> Result<Self> {
        self.check(root)?;
        Ok(Self {
            arena: Arc::clone(&self.arena),
            root,
        })
    }

    /// Returns the number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.nodes.len()
    }

    /// Returns true if the arena is empty (never, for a built grammar).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.nodes.is_empty()
    }

    /// Returns true if `id` belongs to this grammar.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.grammar == self.arena.id && id.index() < self.arena.nodes.len()
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::ForeignNode { node: id.index() }))
        }
    }

    /// Looks up a node.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this grammar.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.check(id)?;
        Ok(&self.arena.nodes[id.index()])
    }

    /// Follows indirections to the node that actually does the matching.
    ///
    /// Returns `id` itself if it is not an indirection or is foreign.
    #[must_use]
    pub fn resolve(&self, id: NodeId) -> NodeId {
        let mut current = id;
        // build() guarantees chains terminate
        while let Ok(Node::Indirect(Some(next))) = self.node(current) {
            current = *next;
        }
        current
    }

    /// Returns the diagnostic name attached to a node, if any.
    #[must_use]
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        if !self.contains(id) {
            return None;
        }
        self.arena.names.get(&id.index()).map(AsRef::as_ref)
    }

    /// Iterates over all node ids in arena order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.arena.nodes.len()).map(|index| NodeId {
            grammar: self.arena.id,
            index: index as u32,
        })
    }

    /// Describes a node for diagnostics: its name, or a rendering of what it
    /// matches.
    #[must_use]
    pub fn describe(&self, id: NodeId) -> String {
        if let Some(name) = self.name_of(id) {
            return name.to_string();
        }
        let Ok(node) = self.node(id) else {
            return format!("<foreign {id}>");
        };
        match node {
            Node::Literal(b) => format!("'{}'", b.escape_ascii()),
            Node::Range { low, high } => {
                format!("['{}'-'{}']", low.escape_ascii(), high.escape_ascii())
            }
            Node::Set(set) => format!("{set:?}"),
            Node::Bytes(bytes) => format!("\"{}\"", bytes.escape_ascii()),
            Node::AnyByte => "any byte".to_string(),
            Node::Unsigned { width } => format!("u{}", u32::from(*width) * 8),
            Node::Signed { width } => format!("i{}", u32::from(*width) * 8),
            Node::End => "end of input".to_string(),
            Node::Indirect(Some(target)) => self.describe(self.resolve(*target)),
            Node::Action { action, .. } => format!("{} {id}", action.name()),
            other => format!("{} {id}", other.kind_name()),
        }
    }

    /// Lists node ids reachable from the root, in depth-first order.
    #[must_use]
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !self.contains(id) || seen[id.index()] {
                continue;
            }
            seen[id.index()] = true;
            order.push(id);
            let children = self.arena.nodes[id.index()].children();
            stack.extend(children.into_iter().rev());
        }
        order
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("id", &self.arena.id)
            .field("nodes", &self.arena.nodes.len())
            .field("root", &self.root)
            .finish()
    }
}
