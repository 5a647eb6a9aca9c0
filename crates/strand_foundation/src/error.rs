//! Error types for the Strand system.
//!
//! Uses `thiserror` for ergonomic error definition. Ordinary match failures
//! and programming misuse share one [`ErrorKind`] enum; [`ErrorKind::is_fatal`]
//! tells them apart.

use thiserror::Error;

use crate::token::TokenType;

/// Result alias used across Strand.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Strand operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}{}", at_position(.position))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Byte offset into the input, for errors raised while parsing.
    pub position: Option<usize>,
}

#[allow(clippy::ref_option)]
fn at_position(position: &Option<usize>) -> String {
    position.map(|p| format!(" at byte {p}")).unwrap_or_default()
}

impl Error {
    /// Creates a new error with the given kind and no position.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    /// Creates a new error at the given input position.
    #[must_use]
    pub fn at(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }

    /// Sets the input position.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Returns true if this error is programming misuse rather than a
    /// failed match.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Creates an unbound indirection error.
    #[must_use]
    pub fn unbound_indirection(node: usize) -> Self {
        Self::new(ErrorKind::UnboundIndirection { node })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // =========================================================================
    // Match failures
    // =========================================================================
    /// Ran out of bytes mid-match.
    #[error("input exhausted")]
    InputExhausted,

    /// A literal byte did not match.
    #[error("literal mismatch: expected {}, found {}", show(.expected), show(.found))]
    LiteralMismatch {
        /// The byte the grammar asked for.
        expected: u8,
        /// The byte in the input.
        found: u8,
    },

    /// A byte fell outside an inclusive range.
    #[error("range mismatch: expected {}..={}, found {}", show(.low), show(.high), show(.found))]
    RangeMismatch {
        /// Lower bound (inclusive).
        low: u8,
        /// Upper bound (inclusive).
        high: u8,
        /// The byte in the input.
        found: u8,
    },

    /// A byte was not accepted by a byte set.
    #[error("set mismatch: found {}", show(.found))]
    SetMismatch {
        /// The byte in the input.
        found: u8,
    },

    /// A literal byte string did not match.
    #[error("byte string mismatch at offset {offset} of literal")]
    BytesMismatch {
        /// Offset inside the literal where the input diverged.
        offset: usize,
    },

    /// Every branch of a choice failed.
    #[error("all alternatives failed")]
    AllAlternativesFailed,

    /// A one-or-more repetition matched zero times.
    #[error("repetition unsatisfied: needed at least {min}, matched {matched}")]
    RepetitionUnsatisfied {
        /// Minimum repetitions required.
        min: usize,
        /// Repetitions actually matched.
        matched: usize,
    },

    /// A semantic action refused the matched value.
    #[error("action rejected: {action}")]
    ActionRejected {
        /// Name of the action.
        action: String,
    },

    /// A length-prefixed value requests more bytes than remain.
    #[error("declared length {declared} exceeds remaining input {remaining}")]
    DeclaredLengthExceedsInput {
        /// The declared length.
        declared: u64,
        /// Bytes remaining after the length prefix.
        remaining: usize,
    },

    /// Input remained after the grammar finished and end of input was required.
    #[error("trailing input: {remaining} unconsumed bytes")]
    TrailingInput {
        /// Bytes left unconsumed.
        remaining: usize,
    },

    /// A positive or negative lookahead did not hold.
    #[error("lookahead failed")]
    LookaheadFailed,

    /// A node that never matches was reached.
    #[error("no match")]
    NoMatch,

    /// A token did not have the shape a client expected.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the client expected.
        expected: String,
        /// The tag of the token it got.
        found: TokenType,
    },

    // =========================================================================
    // Programming misuse (fatal)
    // =========================================================================
    /// A recursive placeholder was used before it was bound.
    #[error("unbound indirection: node #{node}")]
    UnboundIndirection {
        /// Arena index of the placeholder.
        node: usize,
    },

    /// A recursive placeholder was bound twice.
    #[error("indirection already bound: node #{node}")]
    IndirectionAlreadyBound {
        /// Arena index of the placeholder.
        node: usize,
    },

    /// A bind target was not a placeholder.
    #[error("node #{node} is not an indirection")]
    NotAnIndirection {
        /// Arena index of the node.
        node: usize,
    },

    /// A node id from a different grammar (or out of range) was used.
    #[error("foreign node: #{node}")]
    ForeignNode {
        /// Arena index of the node.
        node: usize,
    },

    /// A length node produced a token that is not a count.
    #[error("invalid length token: expected unsigned integer, got {actual}")]
    InvalidLength {
        /// The tag of the produced token.
        actual: TokenType,
    },

    /// An invalid argument was passed to a grammar constructor.
    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    /// Nested node invocations exceeded the configured limit.
    #[error("recursion limit exceeded ({limit})")]
    RecursionLimit {
        /// The configured limit.
        limit: usize,
    },

    // =========================================================================
    // Result lifecycle and boundary
    // =========================================================================
    /// A parse result was read after it was released.
    #[error("parse result already released")]
    ResultReleased,

    /// An empty result handle was read.
    #[error("empty parse result handle")]
    EmptyResult,

    /// I/O failure at the program boundary.
    #[error("io error: {0}")]
    Io(String),

    /// Serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns true for programming misuse that aborts a parse outright.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnboundIndirection { .. }
                | Self::IndirectionAlreadyBound { .. }
                | Self::NotAnIndirection { .. }
                | Self::ForeignNode { .. }
                | Self::InvalidLength { .. }
                | Self::InvalidGrammar(_)
                | Self::RecursionLimit { .. }
                | Self::Internal(_)
        )
    }

    /// Short kebab-case name, stable for machine-readable output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InputExhausted => "input-exhausted",
            Self::LiteralMismatch { .. } => "literal-mismatch",
            Self::RangeMismatch { .. } => "range-mismatch",
            Self::SetMismatch { .. } => "set-mismatch",
            Self::BytesMismatch { .. } => "bytes-mismatch",
            Self::AllAlternativesFailed => "all-alternatives-failed",
            Self::RepetitionUnsatisfied { .. } => "repetition-unsatisfied",
            Self::ActionRejected { .. } => "action-rejected",
            Self::DeclaredLengthExceedsInput { .. } => "declared-length-exceeds-input",
            Self::TrailingInput { .. } => "trailing-input",
            Self::LookaheadFailed => "lookahead-failed",
            Self::NoMatch => "no-match",
            Self::UnexpectedToken { .. } => "unexpected-token",
            Self::UnboundIndirection { .. } => "unbound-indirection",
            Self::IndirectionAlreadyBound { .. } => "indirection-already-bound",
            Self::NotAnIndirection { .. } => "not-an-indirection",
            Self::ForeignNode { .. } => "foreign-node",
            Self::InvalidLength { .. } => "invalid-length",
            Self::InvalidGrammar(_) => "invalid-grammar",
            Self::RecursionLimit { .. } => "recursion-limit",
            Self::ResultReleased => "result-released",
            Self::EmptyResult => "empty-result",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

/// Renders a byte as a quoted printable character or hex escape.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn show(b: &u8) -> String {
    format!("'{}'", b.escape_ascii())
}
