//! Trace output formatters.
//!
//! Provides human-readable and JSON formatters for trace records. Records
//! store node ids; the grammar is consulted at format time to describe them.

use strand_grammar::{Grammar, NodeId};

use super::record::{TraceEvent, TraceRecord};

// =============================================================================
// Trace Formatter Trait
// =============================================================================

/// Trait for formatting trace records.
pub trait TraceFormatter {
    /// Formats a single trace record to a string.
    fn format(&self, record: &TraceRecord, grammar: &Grammar) -> String;

    /// Formats multiple records.
    fn format_many(&self, records: &[&TraceRecord], grammar: &Grammar) -> String {
        records
            .iter()
            .map(|r| self.format(r, grammar))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats trace records in human-readable form, indented by depth.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record IDs.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a new human formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to show timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Builder method to show record IDs.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    /// Formats timestamp in microseconds.
    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ns: u64) -> String {
        let us = ns / 1000;
        if us >= 1_000_000 {
            format!("{:.3}s", us as f64 / 1_000_000.0)
        } else if us >= 1000 {
            format!("{:.3}ms", us as f64 / 1000.0)
        } else {
            format!("{us}us")
        }
    }
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord, grammar: &Grammar) -> String {
        use std::fmt::Write;
        let mut prefix = String::new();

        if self.show_ids {
            let _ = write!(prefix, "[{:06}] ", record.id);
        }

        let _ = write!(prefix, "P{:04} ", record.parse);

        if self.show_timestamps {
            let _ = write!(
                prefix,
                "{:>10} ",
                Self::format_timestamp(record.timestamp_ns)
            );
        }

        let indent = "  ".repeat(record.depth);
        let describe = |node: NodeId| grammar.describe(node);

        let event_str = match &record.event {
            TraceEvent::ParseStart { root, input_len } => {
                format!("=== PARSE {} ({input_len} bytes) ===", describe(*root))
            }
            TraceEvent::ParseEnd {
                consumed: Some(consumed),
                ..
            } => format!("=== PARSE END OK ({consumed} bytes) ==="),
            TraceEvent::ParseEnd { error, .. } => match error {
                Some(error) => format!("=== PARSE END FAILED: {error} ==="),
                None => "=== PARSE END FAILED ===".to_string(),
            },
            TraceEvent::Enter { node, position } => {
                format!("{indent}> {} @{position}", describe(*node))
            }
            TraceEvent::Matched { node, start, end } => {
                format!("{indent}+ {} {start}..{end}", describe(*node))
            }
            TraceEvent::Failed {
                node,
                start,
                kind,
                position,
            } => format!(
                "{indent}- {} @{start}: {kind} at byte {position}",
                describe(*node)
            ),
            TraceEvent::MemoHit { node, position } => {
                format!("{indent}= {} @{position} (memo)", describe(*node))
            }
            TraceEvent::Aborted { error } => format!("!!! ABORTED: {error}"),
        };

        format!("{prefix}{event_str}")
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats trace records as JSON, one object per record.
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter {
    /// Whether to pretty-print arrays of records.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for pretty printing.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Escapes a string for JSON.
    fn escape_string(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {
                    use std::fmt::Write;
                    let _ = write!(out, "\\u{:04x}", u32::from(c));
                }
                c => out.push(c),
            }
        }
        out
    }

    fn node_json(node: NodeId, grammar: &Grammar) -> String {
        format!(
            "\"node\":{},\"label\":\"{}\"",
            node.index(),
            Self::escape_string(&grammar.describe(node))
        )
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord, grammar: &Grammar) -> String {
        let event_data = match &record.event {
            TraceEvent::ParseStart { root, input_len } => {
                format!("{},\"input_len\":{input_len}", Self::node_json(*root, grammar))
            }
            TraceEvent::ParseEnd { consumed, error } => {
                let consumed = consumed.map_or_else(|| "null".to_string(), |c| c.to_string());
                let error = error.as_ref().map_or_else(
                    || "null".to_string(),
                    |e| {
                        format!(
                            "{{\"kind\":\"{}\",\"message\":\"{}\",\"position\":{}}}",
                            e.kind.name(),
                            Self::escape_string(&e.kind.to_string()),
                            e.position
                                .map_or_else(|| "null".to_string(), |p| p.to_string())
                        )
                    },
                );
                format!("\"consumed\":{consumed},\"error\":{error}")
            }
            TraceEvent::Enter { node, position } | TraceEvent::MemoHit { node, position } => {
                format!("{},\"position\":{position}", Self::node_json(*node, grammar))
            }
            TraceEvent::Matched { node, start, end } => format!(
                "{},\"start\":{start},\"end\":{end}",
                Self::node_json(*node, grammar)
            ),
            TraceEvent::Failed {
                node,
                start,
                kind,
                position,
            } => format!(
                "{},\"start\":{start},\"kind\":\"{}\",\"message\":\"{}\",\"position\":{position}",
                Self::node_json(*node, grammar),
                kind.name(),
                Self::escape_string(&kind.to_string())
            ),
            TraceEvent::Aborted { error } => format!(
                "\"kind\":\"{}\",\"message\":\"{}\"",
                error.kind.name(),
                Self::escape_string(&error.to_string())
            ),
        };

        format!(
            "{{\"id\":{},\"parse\":{},\"depth\":{},\"timestamp_ns\":{},\"type\":\"{}\",{}}}",
            record.id,
            record.parse,
            record.depth,
            record.timestamp_ns,
            record.event_type(),
            event_data
        )
    }

    fn format_many(&self, records: &[&TraceRecord], grammar: &Grammar) -> String {
        let items: Vec<_> = records.iter().map(|r| self.format(r, grammar)).collect();
        if self.pretty {
            format!("[\n  {}\n]", items.join(",\n  "))
        } else {
            format!("[{}]", items.join(","))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
