//! Bencode grammar, serialization, REPL, and CLI for Strand.
//!
//! This crate provides:
//! - [`BencodeGrammar`] - The bencode encoding as a Strand grammar
//! - [`Bencode`] - Decoded bencode values
//! - [`serialize`] - JSON and `MessagePack` encoding of tokens and values
//! - [`generate`] - Deterministic random bencode documents
//! - [`Repl`] - Interactive bencode parser

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bencode;
pub mod editor;
pub mod generate;
pub mod repl;
pub mod serialize;

pub use bencode::{Bencode, BencodeGrammar, decode};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use generate::{GenerateConfig, generate, generate_document};
pub use repl::{Repl, Reply};
