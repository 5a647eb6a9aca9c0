//! Integration tests for Layer 4: Runtime
//!
//! Tests for the bencode client, serialization, document generation, and
//! the REPL.

mod generate;
mod repl;
