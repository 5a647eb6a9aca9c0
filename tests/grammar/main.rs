//! Integration tests for Layer 1: Grammar
//!
//! Tests for grammar construction, validation, and recursive rules.

mod construction;
mod recursion;
