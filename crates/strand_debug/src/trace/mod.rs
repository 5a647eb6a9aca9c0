//! Tracing system for Strand.
//!
//! Records every node invocation of a parse with zero overhead when
//! disabled. Supports both human-readable and JSON output formats.
//!
//! # Example
//!
//! ```text
//! let mut tracer = Tracer::new(TracerConfig::new().enabled().to_stderr());
//! parser.parse_with_observer(input, &mut tracer)?;
//! for record in tracer.buffer().recent(10) { ... }
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{TraceEvent, TraceRecord};

use std::io::{self, Write};
use std::time::Instant;

use strand_engine::{ParseObserver, Parsed};
use strand_foundation::{Error, ErrorKind, Result};
use strand_grammar::{Grammar, NodeId};

// =============================================================================
// Trace Output
// =============================================================================

/// Where trace output should be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// No output (traces still recorded in buffer).
    #[default]
    None,
    /// Write to stderr as each record is made.
    Stderr,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in buffer.
    pub buffer_size: usize,
    /// Where to output traces.
    pub output: TraceOutput,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Filter for specific event types (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: buffer::DEFAULT_BUFFER_SIZE,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to output to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to filter event types.
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records parse events.
///
/// Pass it to [`Parser::parse_with_observer`](strand_engine::Parser::parse_with_observer).
/// Designed for zero overhead when disabled: every callback returns
/// immediately if tracing is off.
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    grammar: Option<Grammar>,
    parse_count: u64,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl Tracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer_size = config.buffer_size;
        Self {
            config,
            buffer: TraceBuffer::new(buffer_size),
            grammar: None,
            parse_count: 0,
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a tracer with default configuration (disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that outputs to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Returns the number of parses started while enabled.
    #[must_use]
    pub fn parse_count(&self) -> u64 {
        self.parse_count
    }

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Sets the trace output destination.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Returns the grammar of the most recent traced parse.
    #[must_use]
    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    /// Records a trace event.
    ///
    /// This is the main entry point for recording events. It's designed
    /// to be as fast as possible when tracing is disabled.
    #[inline]
    pub fn record(&mut self, depth: usize, event: TraceEvent) {
        if !self.config.enabled {
            return;
        }

        self.record_internal(depth, event);
    }

    fn record_internal(&mut self, depth: usize, event: TraceEvent) {
        if !self.config.event_filter.is_empty()
            && !self
                .config
                .event_filter
                .iter()
                .any(|t| t == event.event_type())
        {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        self.buffer
            .push(self.parse_count, depth, timestamp_ns, event);

        if self.config.output == TraceOutput::Stderr {
            if let (Some(record), Some(grammar)) = (self.buffer.last(), &self.grammar) {
                let line = self.format_record(record, grammar);
                let _ = writeln!(io::stderr(), "{line}");
            }
        }
    }

    /// Formats a record using the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord, grammar: &Grammar) -> String {
        if self.config.json_format {
            self.json_formatter.format(record, grammar)
        } else {
            self.human_formatter.format(record, grammar)
        }
    }

    /// Formats multiple records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord], grammar: &Grammar) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records, grammar)
        } else {
            self.human_formatter.format_many(records, grammar)
        }
    }

    /// Formats every record of the most recent parse.
    #[must_use]
    pub fn format_last_parse(&self) -> String {
        let Some(grammar) = &self.grammar else {
            return String::new();
        };
        let records = self.buffer.records_for_parse(self.parse_count);
        self.format_records(&records, grammar)
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Clears the trace buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ParseObserver for Tracer {
    fn parse_start(&mut self, grammar: &Grammar, root: NodeId, input: &[u8]) {
        if !self.config.enabled {
            return;
        }
        self.parse_count += 1;
        self.grammar = Some(grammar.clone());
        self.record(
            0,
            TraceEvent::ParseStart {
                root,
                input_len: input.len(),
            },
        );
    }

    fn parse_end(&mut self, result: &Result<Parsed>) {
        let (consumed, error) = match result {
            Ok(parsed) => (Some(parsed.consumed), None),
            Err(error) => (None, Some(error.clone())),
        };
        self.record(0, TraceEvent::ParseEnd { consumed, error });
    }

    #[inline]
    fn enter(&mut self, node: NodeId, position: usize, depth: usize) {
        self.record(depth, TraceEvent::Enter { node, position });
    }

    #[inline]
    fn matched(&mut self, node: NodeId, start: usize, end: usize, depth: usize) {
        self.record(depth, TraceEvent::Matched { node, start, end });
    }

    #[inline]
    fn failed(
        &mut self,
        node: NodeId,
        start: usize,
        kind: &ErrorKind,
        position: usize,
        depth: usize,
    ) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(
            depth,
            TraceEvent::Failed {
                node,
                start,
                kind: kind.clone(),
                position,
            },
        );
    }

    #[inline]
    fn memo_hit(&mut self, node: NodeId, position: usize, depth: usize) {
        self.record(depth, TraceEvent::MemoHit { node, position });
    }

    fn aborted(&mut self, error: &Error) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(
            0,
            TraceEvent::Aborted {
                error: error.clone(),
            },
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
