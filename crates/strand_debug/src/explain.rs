//! Failure explanations.
//!
//! An [`Explainer`] watches a parse and keeps the set of things the grammar
//! would have accepted at the furthest failure position: the terminals that
//! failed there, with a named node standing in for everything beneath it
//! when it fails without consuming input.
//! After a failed parse it produces a [`FailureReport`]:
//!
//! ```text
//! parse failed: input exhausted at byte 23
//! expected one of: 'e', digits
//!   d1:Xi1e1:Yi2e1:Z5:hello
//!                          ^
//! ```

use std::fmt;

use strand_engine::{ParseObserver, Parsed};
use strand_foundation::{Error, ErrorKind, Result};
use strand_grammar::{Grammar, NodeId};

use crate::trace::{TraceBuffer, TraceEvent};

/// Bytes of context shown before the caret.
const CONTEXT_BEFORE: usize = 32;
/// Bytes of context shown after the caret.
const CONTEXT_AFTER: usize = 16;

// =============================================================================
// Failure Report
// =============================================================================

/// Why a parse failed, in terms of the grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
    /// The error the parse returned.
    pub error: Error,
    /// Descriptions of what would have been accepted at the error position.
    pub expected: Vec<String>,
    /// The input around the error position with a caret under it.
    pub excerpt: String,
}

impl FailureReport {
    /// Rebuilds a report from the newest parse recorded in a trace buffer.
    ///
    /// Returns `None` if that parse succeeded or its records were evicted.
    #[must_use]
    pub fn from_trace(buffer: &TraceBuffer, grammar: &Grammar, input: &[u8]) -> Option<Self> {
        let parse = buffer.newest_parse()?;
        let mut explainer = Explainer::new();
        for record in buffer.records_for_parse(parse) {
            match &record.event {
                TraceEvent::ParseStart { root, .. } => explainer.parse_start(grammar, *root, input),
                TraceEvent::ParseEnd { error, .. } => {
                    explainer.error = error.clone();
                }
                TraceEvent::Enter { node, position } => {
                    explainer.enter(*node, *position, record.depth);
                }
                TraceEvent::Matched { node, start, end } => {
                    explainer.matched(*node, *start, *end, record.depth);
                }
                TraceEvent::Failed {
                    node,
                    start,
                    kind,
                    position,
                } => explainer.failed(*node, *start, kind, *position, record.depth),
                TraceEvent::MemoHit { .. } | TraceEvent::Aborted { .. } => {}
            }
        }
        explainer.report()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "parse failed: {}", self.error)?;
        match self.expected.as_slice() {
            [] => {}
            [only] => writeln!(f, "expected: {only}")?,
            many => writeln!(f, "expected one of: {}", many.join(", "))?,
        }
        write!(f, "{}", self.excerpt)
    }
}

/// Renders the bytes around `position` on one line and a caret under
/// `position` on the next. Non-printable bytes are escaped.
#[must_use]
pub fn caret_excerpt(input: &[u8], position: usize) -> String {
    let position = position.min(input.len());
    let start = position.saturating_sub(CONTEXT_BEFORE);
    let end = (position + CONTEXT_AFTER).min(input.len());

    let escaped = |bytes: &[u8]| bytes.escape_ascii().to_string();
    let before = escaped(&input[start..position]);
    let after = escaped(&input[position..end]);

    let lead = if start > 0 { "..." } else { "" };
    let tail = if end < input.len() { "..." } else { "" };
    let pad = " ".repeat(lead.len() + before.len());
    format!("  {lead}{before}{after}{tail}\n  {pad}^")
}

// =============================================================================
// Explainer
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct Frame {
    /// Length of `expected` when the node was entered.
    mark: usize,
    /// Furthest failure position when the node was entered.
    furthest: Option<usize>,
}

/// Observer that collects expectations at the furthest failure.
#[derive(Debug, Default)]
pub struct Explainer {
    grammar: Option<Grammar>,
    input: Vec<u8>,
    furthest: Option<usize>,
    expected: Vec<String>,
    stack: Vec<Frame>,
    error: Option<Error>,
}

impl Explainer {
    /// Creates an explainer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the furthest failure position seen in the last parse.
    #[must_use]
    pub fn furthest(&self) -> Option<usize> {
        self.furthest
    }

    /// Returns the expectations collected at the furthest position.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Builds a report for the last parse, if it failed.
    #[must_use]
    pub fn report(&self) -> Option<FailureReport> {
        let error = self.error.clone()?;
        let position = error.position.or(self.furthest).unwrap_or(0);
        let expected = if self.furthest == Some(position) {
            self.expected.clone()
        } else {
            Vec::new()
        };
        Some(FailureReport {
            excerpt: caret_excerpt(&self.input, position),
            error,
            expected,
        })
    }

    fn expect(&mut self, label: String) {
        if !self.expected.contains(&label) {
            self.expected.push(label);
        }
    }
}

impl ParseObserver for Explainer {
    fn parse_start(&mut self, grammar: &Grammar, _root: NodeId, input: &[u8]) {
        self.grammar = Some(grammar.clone());
        self.input = input.to_vec();
        self.furthest = None;
        self.expected.clear();
        self.stack.clear();
        self.error = None;
    }

    fn parse_end(&mut self, result: &Result<Parsed>) {
        self.error = result.as_ref().err().cloned();
    }

    fn enter(&mut self, _node: NodeId, _position: usize, _depth: usize) {
        self.stack.push(Frame {
            mark: self.expected.len(),
            furthest: self.furthest,
        });
    }

    fn matched(&mut self, _node: NodeId, _start: usize, _end: usize, _depth: usize) {
        self.stack.pop();
    }

    fn failed(
        &mut self,
        node: NodeId,
        start: usize,
        _kind: &ErrorKind,
        position: usize,
        _depth: usize,
    ) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        if self.furthest.is_some_and(|furthest| position < furthest) {
            return;
        }
        if self.furthest != Some(position) {
            self.furthest = Some(position);
            self.expected.clear();
        }
        let Some(grammar) = self.grammar.clone() else {
            return;
        };

        if let Some(name) = grammar.name_of(node) {
            if position > start {
                // failed after consuming input; the internals say more
                return;
            }
            let keep = if frame.furthest == Some(position) {
                frame.mark.min(self.expected.len())
            } else {
                0
            };
            self.expected.truncate(keep);
            self.expect(name.to_string());
        } else if grammar.node(node).is_ok_and(|n| n.is_terminal()) || self.expected.is_empty() {
            self.expect(grammar.describe(node));
        }
    }
}
