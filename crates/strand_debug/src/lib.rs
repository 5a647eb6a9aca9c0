//! Parse tracing and failure explanation for Strand.
//!
//! This crate provides:
//! - [`Tracer`] - Records parse events into a bounded ring buffer
//! - [`TraceFormatter`] - Human-readable and JSON rendering of records
//! - [`Explainer`] - Collects what the grammar expected at the furthest failure
//! - [`FailureReport`] - "expected one of: ..." with a caret excerpt

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod explain;
pub mod trace;

pub use explain::{Explainer, FailureReport, caret_excerpt};
pub use trace::{
    HumanFormatter, JsonFormatter, TraceBuffer, TraceBufferStats, TraceEvent, TraceFormatter,
    TraceOutput, TraceRecord, Tracer, TracerConfig,
};
