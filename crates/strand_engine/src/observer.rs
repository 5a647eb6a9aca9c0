//! Observation hook for parse events.
//!
//! The engine reports every node invocation to a [`ParseObserver`]. The
//! default [`NoopObserver`] compiles to nothing, so an unobserved parse pays
//! no tracing cost.

use strand_foundation::{Error, ErrorKind, Result};
use strand_grammar::{Grammar, NodeId};

use crate::outcome::Parsed;

/// Receives parse events from the engine.
///
/// All methods default to doing nothing.
#[allow(unused_variables)]
pub trait ParseObserver {
    /// Called once before the root node is invoked.
    fn parse_start(&mut self, grammar: &Grammar, root: NodeId, input: &[u8]) {}

    /// Called once with the final result.
    fn parse_end(&mut self, result: &Result<Parsed>) {}

    /// A node is about to be tried at `position`.
    fn enter(&mut self, node: NodeId, position: usize, depth: usize) {}

    /// A node matched `start..end`.
    fn matched(&mut self, node: NodeId, start: usize, end: usize, depth: usize) {}

    /// A node tried at `start` failed; `kind` and `position` describe why.
    fn failed(
        &mut self,
        node: NodeId,
        start: usize,
        kind: &ErrorKind,
        position: usize,
        depth: usize,
    ) {
    }

    /// A memoized result was reused instead of re-running the node.
    fn memo_hit(&mut self, node: NodeId, position: usize, depth: usize) {}

    /// A fatal error aborted the parse.
    fn aborted(&mut self, error: &Error) {}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ParseObserver for NoopObserver {}

impl<O: ParseObserver + ?Sized> ParseObserver for &mut O {
    fn parse_start(&mut self, grammar: &Grammar, root: NodeId, input: &[u8]) {
        (**self).parse_start(grammar, root, input);
    }

    fn parse_end(&mut self, result: &Result<Parsed>) {
        (**self).parse_end(result);
    }

    fn enter(&mut self, node: NodeId, position: usize, depth: usize) {
        (**self).enter(node, position, depth);
    }

    fn matched(&mut self, node: NodeId, start: usize, end: usize, depth: usize) {
        (**self).matched(node, start, end, depth);
    }

    fn failed(
        &mut self,
        node: NodeId,
        start: usize,
        kind: &ErrorKind,
        position: usize,
        depth: usize,
    ) {
        (**self).failed(node, start, kind, position, depth);
    }

    fn memo_hit(&mut self, node: NodeId, position: usize, depth: usize) {
        (**self).memo_hit(node, position, depth);
    }

    fn aborted(&mut self, error: &Error) {
        (**self).aborted(error);
    }
}

/// Fans every event out to two observers, first `.0` then `.1`.
impl<A: ParseObserver, B: ParseObserver> ParseObserver for (A, B) {
    fn parse_start(&mut self, grammar: &Grammar, root: NodeId, input: &[u8]) {
        self.0.parse_start(grammar, root, input);
        self.1.parse_start(grammar, root, input);
    }

    fn parse_end(&mut self, result: &Result<Parsed>) {
        self.0.parse_end(result);
        self.1.parse_end(result);
    }

    fn enter(&mut self, node: NodeId, position: usize, depth: usize) {
        self.0.enter(node, position, depth);
        self.1.enter(node, position, depth);
    }

    fn matched(&mut self, node: NodeId, start: usize, end: usize, depth: usize) {
        self.0.matched(node, start, end, depth);
        self.1.matched(node, start, end, depth);
    }

    fn failed(
        &mut self,
        node: NodeId,
        start: usize,
        kind: &ErrorKind,
        position: usize,
        depth: usize,
    ) {
        self.0.failed(node, start, kind, position, depth);
        self.1.failed(node, start, kind, position, depth);
    }

    fn memo_hit(&mut self, node: NodeId, position: usize, depth: usize) {
        self.0.memo_hit(node, position, depth);
        self.1.memo_hit(node, position, depth);
    }

    fn aborted(&mut self, error: &Error) {
        self.0.aborted(error);
        self.1.aborted(error);
    }
}
