//! Integration tests for Layer 3: Debug
//!
//! Tests for parse tracing and failure explanations.

mod tracing;
