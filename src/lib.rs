//! Strand - Parser combinators for byte buffers
//!
//! This crate re-exports all layers of the Strand system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: strand_runtime    - Bencode grammar, serialization, REPL, CLI
//! Layer 3: strand_debug      - Tracing, failure explanations
//! Layer 2: strand_engine     - Parse engine, configuration, result handles
//! Layer 1: strand_grammar    - Combinator nodes, grammar builder
//! Layer 0: strand_foundation - Core types (Token, Error)
//! ```

pub use strand_debug as debug;
pub use strand_engine as engine;
pub use strand_foundation as foundation;
pub use strand_grammar as grammar;
pub use strand_runtime as runtime;
