//! Trace event and record types.
//!
//! This module defines the events that can be traced during a parse.

use strand_foundation::{Error, ErrorKind};
use strand_grammar::NodeId;

// =============================================================================
// Trace Event
// =============================================================================

/// Events that can be traced during a parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// A parse has started.
    ParseStart {
        /// The node the parse starts from.
        root: NodeId,
        /// Length of the input in bytes.
        input_len: usize,
    },

    /// A parse has ended.
    ParseEnd {
        /// Bytes consumed, if the parse succeeded.
        consumed: Option<usize>,
        /// The error, if the parse failed.
        error: Option<Error>,
    },

    /// A node is about to be tried.
    Enter {
        /// The node.
        node: NodeId,
        /// Where it is tried.
        position: usize,
    },

    /// A node matched.
    Matched {
        /// The node.
        node: NodeId,
        /// Start of the matched span.
        start: usize,
        /// End of the matched span.
        end: usize,
    },

    /// A node failed.
    Failed {
        /// The node.
        node: NodeId,
        /// Where it was tried.
        start: usize,
        /// Why it failed.
        kind: ErrorKind,
        /// Where the failure was detected.
        position: usize,
    },

    /// A memoized result was reused.
    MemoHit {
        /// The node.
        node: NodeId,
        /// Where it was tried.
        position: usize,
    },

    /// A fatal error aborted the parse.
    Aborted {
        /// The error.
        error: Error,
    },
}

impl TraceEvent {
    /// Returns a short name for the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ParseStart { .. } => "parse-start",
            Self::ParseEnd { .. } => "parse-end",
            Self::Enter { .. } => "enter",
            Self::Matched { .. } => "matched",
            Self::Failed { .. } => "failed",
            Self::MemoHit { .. } => "memo-hit",
            Self::Aborted { .. } => "aborted",
        }
    }

    /// Returns true if this is a parse boundary event.
    #[must_use]
    pub fn is_parse_boundary(&self) -> bool {
        matches!(self, Self::ParseStart { .. } | Self::ParseEnd { .. })
    }

    /// Returns the node this event concerns, if any.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Enter { node, .. }
            | Self::Matched { node, .. }
            | Self::Failed { node, .. }
            | Self::MemoHit { node, .. } => Some(*node),
            Self::ParseStart { root, .. } => Some(*root),
            Self::ParseEnd { .. } | Self::Aborted { .. } => None,
        }
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A timestamped trace record.
#[derive(Clone, Debug)]
pub struct TraceRecord {
    /// Unique record ID within the session.
    pub id: u64,
    /// Which parse of the session this event belongs to.
    pub parse: u64,
    /// Nesting depth of the node invocation (0 for parse boundaries).
    pub depth: usize,
    /// Timestamp in nanoseconds since session start.
    pub timestamp_ns: u64,
    /// The trace event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, parse: u64, depth: usize, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            parse,
            depth,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
